use crate::bundle::{Arg, Bundle, Element, Record};
use crate::error::{WireError, WireResult};
use crate::osc::{
    padded_len, read_blob, read_f32, read_i32, read_string, read_timetag, write_blob, write_f32,
    write_i32, write_string, write_timetag,
};

const BUNDLE_MARKER: &str = "#bundle";

pub fn encode_bundle(bundle: &Bundle) -> Vec<u8> {
    let mut out = Vec::new();
    write_string(&mut out, BUNDLE_MARKER);
    write_timetag(&mut out, bundle.timetag);
    for element in &bundle.elements {
        let content = encode_element(element);
        write_i32(&mut out, content.len() as i32);
        out.extend_from_slice(&content);
    }
    out
}

fn encode_element(element: &Element) -> Vec<u8> {
    match element {
        Element::Bundle(b) => encode_bundle(b),
        Element::Record(r) => encode_record(r),
    }
}

pub fn encode_record(record: &Record) -> Vec<u8> {
    let mut out = Vec::new();
    write_string(&mut out, &record.path);
    write_string(&mut out, &record.type_tags);
    for arg in &record.args {
        match arg {
            Arg::Int(v) => write_i32(&mut out, *v),
            Arg::Float(v) => write_f32(&mut out, *v),
            Arg::Str(s) => write_string(&mut out, s),
            Arg::Blob(b) => write_blob(&mut out, b),
            Arg::Time(t) => write_timetag(&mut out, *t),
        }
    }
    out
}

pub fn decode_bundle(bytes: &[u8]) -> WireResult<Bundle> {
    let mut pos = 0;
    let marker = read_string(bytes, &mut pos)?;
    if marker != BUNDLE_MARKER {
        return Err(WireError::NotABundle);
    }
    let timetag = read_timetag(bytes, &mut pos)?;
    let mut elements = Vec::new();
    while pos < bytes.len() {
        let size = read_i32(bytes, &mut pos)? as usize;
        let end = pos + size;
        let slice = bytes
            .get(pos..end)
            .ok_or(WireError::Truncated("bundle element"))?;
        elements.push(decode_element(slice)?);
        pos = end;
    }
    Ok(Bundle { timetag, elements })
}

fn decode_element(bytes: &[u8]) -> WireResult<Element> {
    let marker_len = padded_len(BUNDLE_MARKER.len() + 1);
    if bytes.len() >= marker_len && bytes.starts_with(BUNDLE_MARKER.as_bytes()) {
        Ok(Element::Bundle(decode_bundle(bytes)?))
    } else {
        Ok(Element::Record(decode_record(bytes)?))
    }
}

pub fn decode_record(bytes: &[u8]) -> WireResult<Record> {
    let mut pos = 0;
    let path = read_string(bytes, &mut pos)?;
    let type_tags = read_string(bytes, &mut pos)?;
    let mut args = Vec::with_capacity(type_tags.len().saturating_sub(1));
    for tag in type_tags.chars().skip(1) {
        let arg = match tag {
            'i' => Arg::Int(read_i32(bytes, &mut pos)?),
            'f' => Arg::Float(read_f32(bytes, &mut pos)?),
            's' => Arg::Str(read_string(bytes, &mut pos)?),
            'b' => Arg::Blob(read_blob(bytes, &mut pos)?),
            't' => Arg::Time(read_timetag(bytes, &mut pos)?),
            _ => {
                return Err(WireError::TypeTagMismatch { path, type_tags });
            }
        };
        args.push(arg);
    }
    Ok(Record {
        path,
        type_tags,
        args,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuio2_types::Timetag;

    #[test]
    fn empty_bundle_round_trips() {
        let bundle = Bundle::new(Timetag::new(100, 0));
        let bytes = encode_bundle(&bundle);
        let decoded = decode_bundle(&bytes).unwrap();
        assert_eq!(decoded, bundle);
    }

    #[test]
    fn bundle_with_one_record_round_trips() {
        let mut bundle = Bundle::new(Timetag::IMMEDIATE);
        bundle.push_record(Record::new(
            "/tuio2/alv",
            vec![Arg::Int(1), Arg::Int(2), Arg::Int(3)],
        ));
        let bytes = encode_bundle(&bundle);
        let decoded = decode_bundle(&bytes).unwrap();
        assert_eq!(decoded.records().len(), 1);
        assert_eq!(decoded.records()[0].path, "/tuio2/alv");
    }

    #[test]
    fn nested_bundle_round_trips() {
        let mut inner = Bundle::new(Timetag::IMMEDIATE);
        inner.push_record(Record::new("/tuio2/frm", vec![Arg::Int(1)]));
        let mut outer = Bundle::new(Timetag::IMMEDIATE);
        outer.push_bundle(inner);
        outer.push_record(Record::new("/tuio2/alv", vec![]));
        let bytes = encode_bundle(&outer);
        let decoded = decode_bundle(&bytes).unwrap();
        assert_eq!(decoded.records().len(), 2);
    }

    #[test]
    fn unknown_path_record_still_decodes() {
        let mut bundle = Bundle::new(Timetag::IMMEDIATE);
        bundle.push_record(Record::new("/unknown/path", vec![Arg::Str("x".into())]));
        let bytes = encode_bundle(&bundle);
        let decoded = decode_bundle(&bytes).unwrap();
        assert_eq!(decoded.records()[0].path, "/unknown/path");
    }
}
