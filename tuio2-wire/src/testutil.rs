//! Bundle fixtures shared across this crate's and `touchd`'s test modules.

use tuio2_types::contact::Position;
use tuio2_types::coords::Point2;
use tuio2_types::ids::SessionId;
use tuio2_types::message::{
    AliveSetMessage, ComponentIdHolder, FrameMessage, Message, OutputModeHolder, PointerMessage,
    SessionIdHolder, TypeUser,
};
use tuio2_types::ids::FrameId;
use tuio2_types::Timetag;

use crate::bundle::{Arg, Bundle, Record};
use crate::codec;

/// A single `/tuio2/ptr` record naming one contact, wrapped in its own
/// bundle, with no frame or alive-set record alongside it.
pub fn single_pointer_bundle(session: u32, x: f64, y: f64) -> Bundle {
    let message = Message::Pointer(PointerMessage {
        session: SessionIdHolder {
            session_id: SessionId(session),
        },
        type_user: TypeUser::default(),
        component: ComponentIdHolder::default(),
        position: Position::D2(Point2::new(x, y)),
        velocity: None,
        accel: None,
        output_mode: OutputModeHolder::Only2D,
    });
    let mut bundle = Bundle::new(Timetag::IMMEDIATE);
    for record in crate::registry::imprint(&message) {
        bundle.push_record(record);
    }
    bundle
}

/// A bundle carrying only an alive-set record, as a source emits when a
/// frame drops every contact without replacing them.
pub fn alive_set_only_bundle(sessions: &[u32]) -> Bundle {
    let message = Message::AliveSet(AliveSetMessage {
        session_ids: sessions.iter().map(|&s| SessionId(s)).collect(),
    });
    let mut bundle = Bundle::new(Timetag::IMMEDIATE);
    for record in crate::registry::imprint(&message) {
        bundle.push_record(record);
    }
    bundle
}

/// A frame record followed by an alive-set record and one pointer, the
/// minimal well-formed frame a source would actually send.
pub fn minimal_frame_bundle(frame_id: u32, session: u32) -> Bundle {
    let frame = Message::Frame(FrameMessage {
        frame_id: FrameId(frame_id),
        timetag: Timetag::now(),
        source_address: 0,
        instance_id: 1,
        app_name: "fixture".to_owned(),
        sensor_width: 1920,
        sensor_height: 1080,
    });
    let alive = Message::AliveSet(AliveSetMessage {
        session_ids: vec![SessionId(session)],
    });
    let pointer = Message::Pointer(PointerMessage {
        session: SessionIdHolder {
            session_id: SessionId(session),
        },
        type_user: TypeUser::default(),
        component: ComponentIdHolder::default(),
        position: Position::D2(Point2::new(0.5, 0.5)),
        velocity: None,
        accel: None,
        output_mode: OutputModeHolder::Only2D,
    });
    let mut bundle = Bundle::new(Timetag::now());
    for message in [&frame, &alive, &pointer] {
        for record in crate::registry::imprint(message) {
            bundle.push_record(record);
        }
    }
    bundle
}

/// A bundle nesting an inner bundle one level deep, the shape a multiplexer
/// produces when it forwards an upstream frame verbatim alongside its own.
pub fn nested_bundle(inner_path: &str) -> Bundle {
    let mut inner = Bundle::new(Timetag::IMMEDIATE);
    inner.push_record(Record::new(inner_path, vec![Arg::Int(1)]));
    let mut outer = Bundle::new(Timetag::IMMEDIATE);
    outer.push_bundle(inner);
    outer
}

/// A record at a path no parser recognizes, to exercise the
/// log-and-discard path without rejecting the enclosing bundle.
pub fn unknown_path_bundle() -> Bundle {
    let mut bundle = Bundle::new(Timetag::IMMEDIATE);
    bundle.push_record(Record::new(
        "/experimental/not-in-catalogue",
        vec![Arg::Str("payload".into())],
    ));
    bundle
}

pub fn encode(bundle: &Bundle) -> Vec<u8> {
    codec::encode_bundle(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_pointer_bundle_decodes_to_one_message() {
        let bundle = single_pointer_bundle(3, 0.1, 0.2);
        let bytes = encode(&bundle);
        let messages = crate::decode_frame(&bytes).unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn unknown_path_bundle_decodes_to_no_messages() {
        let bundle = unknown_path_bundle();
        let bytes = encode(&bundle);
        let messages = crate::decode_frame(&bytes).unwrap();
        assert!(messages.is_empty());
    }

    #[test]
    fn minimal_frame_bundle_carries_frame_alive_and_pointer() {
        let bundle = minimal_frame_bundle(1, 42);
        let bytes = encode(&bundle);
        let messages = crate::decode_frame(&bytes).unwrap();
        assert_eq!(messages.len(), 3);
    }

    #[test]
    fn nested_bundle_flattens_to_its_inner_record() {
        let bundle = nested_bundle("/tuio2/alv");
        assert_eq!(bundle.records().len(), 1);
    }
}
