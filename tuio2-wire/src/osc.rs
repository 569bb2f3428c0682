//! OSC-style scalar encoding: big-endian 32-bit ints and floats, 4-byte
//! aligned null-terminated strings, length-prefixed 4-byte aligned blobs,
//! and 8-byte big-endian timetags.

use tuio2_types::Timetag;

use crate::error::{WireError, WireResult};

/// Length, in bytes, after padding `len` raw bytes (including any
/// terminator already counted in `len`) up to the next 4-byte boundary.
pub fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

pub fn write_i32(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_be_bytes());
}

pub fn write_f32(out: &mut Vec<u8>, v: f32) {
    out.extend_from_slice(&v.to_be_bytes());
}

pub fn write_timetag(out: &mut Vec<u8>, v: Timetag) {
    out.extend_from_slice(&v.0.to_be_bytes());
}

pub fn write_string(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(s.as_bytes());
    let padded = padded_len(s.len() + 1);
    out.resize(out.len() + (padded - s.len()), 0);
}

pub fn write_blob(out: &mut Vec<u8>, blob: &[u8]) {
    write_i32(out, blob.len() as i32);
    out.extend_from_slice(blob);
    let padded = padded_len(blob.len());
    out.resize(out.len() + (padded - blob.len()), 0);
}

pub fn read_i32(buf: &[u8], pos: &mut usize) -> WireResult<i32> {
    let end = *pos + 4;
    let bytes = buf.get(*pos..end).ok_or(WireError::Truncated("int32"))?;
    *pos = end;
    Ok(i32::from_be_bytes(bytes.try_into().unwrap()))
}

pub fn read_f32(buf: &[u8], pos: &mut usize) -> WireResult<f32> {
    let end = *pos + 4;
    let bytes = buf.get(*pos..end).ok_or(WireError::Truncated("float32"))?;
    *pos = end;
    Ok(f32::from_be_bytes(bytes.try_into().unwrap()))
}

pub fn read_timetag(buf: &[u8], pos: &mut usize) -> WireResult<Timetag> {
    let end = *pos + 8;
    let bytes = buf.get(*pos..end).ok_or(WireError::Truncated("timetag"))?;
    *pos = end;
    Ok(Timetag(u64::from_be_bytes(bytes.try_into().unwrap())))
}

pub fn read_string(buf: &[u8], pos: &mut usize) -> WireResult<String> {
    let start = *pos;
    let nul = buf[start..]
        .iter()
        .position(|&b| b == 0)
        .ok_or(WireError::Truncated("string terminator"))?;
    let raw = &buf[start..start + nul];
    let s = std::str::from_utf8(raw).map_err(|_| WireError::InvalidUtf8)?.to_owned();
    let padded = padded_len(nul + 1);
    let end = start + padded;
    if end > buf.len() {
        return Err(WireError::Truncated("string padding"));
    }
    *pos = end;
    Ok(s)
}

pub fn read_blob(buf: &[u8], pos: &mut usize) -> WireResult<Vec<u8>> {
    let len = read_i32(buf, pos)? as usize;
    let start = *pos;
    let end = start + len;
    let raw = buf.get(start..end).ok_or(WireError::Truncated("blob body"))?.to_vec();
    let padded = padded_len(len);
    let new_pos = start + padded;
    if new_pos > buf.len() {
        return Err(WireError::Truncated("blob padding"));
    }
    *pos = new_pos;
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_round_trips_with_padding() {
        let mut buf = Vec::new();
        write_string(&mut buf, "ab");
        assert_eq!(buf.len(), 4);
        let mut pos = 0;
        assert_eq!(read_string(&buf, &mut pos).unwrap(), "ab");
        assert_eq!(pos, 4);
    }

    #[test]
    fn blob_round_trips_with_padding() {
        let mut buf = Vec::new();
        write_blob(&mut buf, &[1, 2, 3]);
        let mut pos = 0;
        assert_eq!(read_blob(&buf, &mut pos).unwrap(), vec![1, 2, 3]);
        assert_eq!(pos, buf.len());
    }

    #[test]
    fn timetag_round_trips() {
        let mut buf = Vec::new();
        write_timetag(&mut buf, Timetag::new(7, 9));
        let mut pos = 0;
        assert_eq!(read_timetag(&buf, &mut pos).unwrap(), Timetag::new(7, 9));
    }
}
