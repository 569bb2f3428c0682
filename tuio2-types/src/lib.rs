//! Scalar identifiers, coordinate primitives, the contact model and the
//! closed message catalogue for the TUIO2 sensing core. Wire encoding lives
//! in `tuio2-wire`; the generic graph engine instantiated here lives in
//! `tuio2-graph`.

pub mod contact;
pub mod coords;
pub mod error;
pub mod ids;
pub mod message;
pub mod timetag;
pub mod topology;

pub use contact::{Contact, History, OutputMode, Position};
pub use error::TuioError;
pub use ids::{
    ComponentId, FrameId, SessionId, SlotId, TrackingId, TuId, TypeId, UserId, Uuid128,
};
pub use timetag::Timetag;
