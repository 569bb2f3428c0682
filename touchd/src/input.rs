//! The OS input layer boundary: named out of scope by the core (§1 —
//! "device enumeration and file-descriptor I/O against the operating
//! system's input layer" is an external collaborator). `touchd` ships
//! exactly one concrete [`InputSource`]: trace-file replay. A live evdev
//! source would implement the same trait from outside this crate.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::DeviceError;
use crate::trace::{TimedEvent, Trace, BTN_TOUCH};

/// One raw sample off the device's event stream, already demultiplexed
/// from the wire `(type, code, value)` triple into the shapes the tracker
/// cares about.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RawEvent {
    Abs { code: i32, value: i32 },
    Key { code: i32, value: i32 },
    SynMtReport,
    SynReport,
    SynDropped,
}

/// A source of raw input events, paired with the axis capability list the
/// device reported at open time. The tracker consults the capability list
/// once, at construction, to build its [`crate::axis::AxisMapping`] ranges.
pub trait InputSource {
    fn axis_capabilities(&self) -> &[crate::trace::AxisCapability];

    /// Reads the next event, blocking if necessary. Returns `Ok(None)` at
    /// end of stream (e.g. trace replay exhausted, or the device closed).
    fn next_event(&mut self) -> Result<Option<RawEvent>, DeviceError>;
}

/// Replays a recorded trace file as if it were a live device, honouring
/// the recorded inter-event delays scaled by `-d/--delay`.
pub struct TraceReplaySource {
    axes: Vec<crate::trace::AxisCapability>,
    events: std::vec::IntoIter<TimedEvent>,
    delay_scale: f64,
    last_timestamp: Option<(u64, u64)>,
}

impl TraceReplaySource {
    pub fn new(trace: Trace, delay_scale: f64) -> Self {
        Self {
            axes: trace.axes,
            events: trace.events.into_iter(),
            delay_scale,
            last_timestamp: None,
        }
    }

    pub fn open(path: &str, delay_scale: f64) -> Result<Self, DeviceError> {
        let mut file = std::fs::File::open(path).map_err(|e| DeviceError::Unavailable {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        let trace = crate::trace::read_trace(&mut file).map_err(|e| DeviceError::Unavailable {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(trace, delay_scale))
    }
}

impl InputSource for TraceReplaySource {
    fn axis_capabilities(&self) -> &[crate::trace::AxisCapability] {
        &self.axes
    }

    fn next_event(&mut self) -> Result<Option<RawEvent>, DeviceError> {
        let Some(timed) = self.events.next() else {
            return Ok(None);
        };
        if self.delay_scale > 0.0 {
            if let Some((sec, usec)) = self.last_timestamp {
                let elapsed = (timed.sec as i64 - sec as i64) as f64
                    + (timed.usec as i64 - usec as i64) as f64 / 1_000_000.0;
                if elapsed > 0.0 {
                    std::thread::sleep(Duration::from_secs_f64(elapsed * self.delay_scale));
                }
            }
        }
        self.last_timestamp = Some((timed.sec, timed.usec));
        Ok(Some(timed.event))
    }
}

/// Convenience used by the event loop: whether a raw key event toggles the
/// BTN_TOUCH workaround counter.
pub fn is_btn_touch(code: i32) -> bool {
    code == BTN_TOUCH as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxisRange;
    use crate::trace::AxisCapability;

    fn sample_trace() -> Trace {
        Trace {
            axes: vec![AxisCapability {
                code: 0x35,
                range: AxisRange {
                    min: 0,
                    max: 1000,
                    fuzz: 0,
                    flat: 0,
                    resolution: 1,
                },
                value: 0,
            }],
            events: vec![
                TimedEvent {
                    sec: 0,
                    usec: 0,
                    event: RawEvent::Abs { code: 0x35, value: 10 },
                },
                TimedEvent {
                    sec: 0,
                    usec: 0,
                    event: RawEvent::SynReport,
                },
            ],
        }
    }

    #[test]
    fn replay_yields_events_in_order_then_none() {
        let mut source = TraceReplaySource::new(sample_trace(), 0.0);
        assert_eq!(
            source.next_event().unwrap(),
            Some(RawEvent::Abs { code: 0x35, value: 10 })
        );
        assert_eq!(source.next_event().unwrap(), Some(RawEvent::SynReport));
        assert_eq!(source.next_event().unwrap(), None);
    }

    #[test]
    fn capability_list_is_exposed() {
        let source = TraceReplaySource::new(sample_trace(), 0.0);
        assert_eq!(source.axis_capabilities().len(), 1);
    }
}
