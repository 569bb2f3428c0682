//! OSC-style nested bundle codec for the TUIO2 message catalogue.
//!
//! Three layers, bottom to top:
//! - [`osc`]: scalar encoding for ints, floats, strings, blobs and timetags.
//! - [`bundle`] / [`codec`]: the recursive bundle framing, independent of
//!   what any particular record means.
//! - [`registry`]: translates catalogue [`Message`](tuio2_types::message::Message)s
//!   to and from [`Record`](bundle::Record)s, plus [`graph_codec`] for the
//!   association messages' embedded topology graphs.
//!
//! [`encode_frame`] and [`decode_frame`] are the entry points most callers
//! want: a frame's worth of messages in, a wire-ready buffer out, and back.

pub mod bundle;
pub mod codec;
pub mod error;
pub mod graph_codec;
pub mod osc;
pub mod registry;

#[cfg(test)]
pub mod testutil;

use tuio2_types::message::Message;
use tuio2_types::Timetag;

pub use bundle::{Arg, Bundle, Element, Record};
pub use error::{WireError, WireResult};
pub use graph_codec::AssocKind;

/// Encodes a sequence of messages as a single top-level bundle. Each message
/// may imprint more than one record (none currently do, but the catalogue
/// leaves room for it), and they are appended in order.
pub fn encode_frame(timetag: Timetag, messages: &[Message]) -> Vec<u8> {
    let mut bundle = Bundle::new(timetag);
    for message in messages {
        for record in registry::imprint(message) {
            bundle.push_record(record);
        }
    }
    codec::encode_bundle(&bundle)
}

/// Decodes a bundle off the wire into its catalogue messages. Records at
/// paths the catalogue doesn't recognize are logged and skipped rather than
/// rejecting the bundle; see [`registry::parse_record`].
pub fn decode_frame(bytes: &[u8]) -> WireResult<Vec<Message>> {
    let bundle = codec::decode_bundle(bytes)?;
    let mut messages = Vec::new();
    for record in bundle.records() {
        messages.extend(registry::parse_record(record)?);
    }
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuio2_types::contact::Position;
    use tuio2_types::coords::Point2;
    use tuio2_types::ids::SessionId;
    use tuio2_types::message::{
        AliveSetMessage, ComponentIdHolder, OutputModeHolder, PointerMessage, SessionIdHolder,
        TypeUser,
    };

    #[test]
    fn encode_decode_frame_round_trips_multiple_records() {
        let messages = vec![
            Message::AliveSet(AliveSetMessage {
                session_ids: vec![SessionId(1), SessionId(2)],
            }),
            Message::Pointer(PointerMessage {
                session: SessionIdHolder {
                    session_id: SessionId(1),
                },
                type_user: TypeUser::default(),
                component: ComponentIdHolder::default(),
                position: Position::D2(Point2::new(10.0, 20.0)),
                velocity: None,
                accel: None,
                output_mode: OutputModeHolder::Only2D,
            }),
        ];
        let bytes = encode_frame(Timetag::IMMEDIATE, &messages);
        let decoded = decode_frame(&bytes).unwrap();
        assert_eq!(decoded.len(), 2);
    }

    #[test]
    fn decode_frame_rejects_non_bundle_payload() {
        let mut bytes = Vec::new();
        osc::write_string(&mut bytes, "/tuio2/alv");
        osc::write_string(&mut bytes, ",");
        let err = decode_frame(&bytes).unwrap_err();
        assert!(matches!(err, WireError::NotABundle));
    }
}
