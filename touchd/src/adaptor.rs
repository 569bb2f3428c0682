//! The adaptor chain (§4.F): ordered message transforms applied between
//! user-level append and wire emission. Each adaptor implements
//! [`Adaptor::process`] over a [`MessageBundle`] — the pre-wire value the
//! server assembles each commit, before [`tuio2_wire::encode_frame`] turns
//! it into bytes. Adaptors never share mutable state; they are composed by
//! ordered containment in a `Vec<Box<dyn Adaptor>>`.

use std::collections::HashSet;

use regex::Regex;
use tuio2_types::ids::{FrameId, SessionId};
use tuio2_types::message::Message;
use tuio2_types::topology::{SensorPurpose, TranslationMode};
use tuio2_types::Timetag;

/// The pre-wire value a commit cycle assembles: one frame's worth of
/// metadata, the alive set, and the payload messages, all still mutable.
/// The server encodes this to bytes only after the full chain has run.
#[derive(Debug, Clone)]
pub struct MessageBundle {
    pub frame_id: FrameId,
    pub timetag: Timetag,
    pub alive: Vec<SessionId>,
    pub payload: Vec<Message>,
}

impl MessageBundle {
    pub fn new(frame_id: FrameId, timetag: Timetag) -> Self {
        Self {
            frame_id,
            timetag,
            alive: Vec::new(),
            payload: Vec::new(),
        }
    }
}

/// A stage in the emission pipeline. `process` consumes one bundle and
/// produces its replacement (dropping, duplicating or rewriting messages
/// is all expressed as a different return value).
pub trait Adaptor {
    fn process(&mut self, bundle: MessageBundle) -> MessageBundle;
}

/// Merges temporally-adjacent bundles from multiple logical sources:
/// highest frame id, latest timetag, union of alive sets, concatenated
/// payload. Buffers one bundle per source id until all registered sources
/// have reported for the current round, then emits the merge.
pub struct Multiplexing {
    source_count: usize,
    pending: Vec<MessageBundle>,
}

impl Multiplexing {
    pub fn new(source_count: usize) -> Self {
        Self {
            source_count: source_count.max(1),
            pending: Vec::new(),
        }
    }
}

impl Adaptor for Multiplexing {
    fn process(&mut self, bundle: MessageBundle) -> MessageBundle {
        self.pending.push(bundle);
        if self.pending.len() < self.source_count {
            // Not enough sources have reported yet for this round; hold
            // this one back by returning an empty placeholder. The caller
            // (server) treats an all-empty bundle as "nothing to send yet"
            // — see `MessageBundle::is_empty`.
            return MessageBundle::new(FrameId(0), Timetag::IMMEDIATE);
        }
        let batch = std::mem::take(&mut self.pending);
        let frame_id = batch.iter().map(|b| b.frame_id).max().unwrap_or(FrameId(0));
        let timetag = batch.iter().map(|b| b.timetag).max().unwrap_or(Timetag::IMMEDIATE);
        let mut alive_seen = HashSet::new();
        let mut alive = Vec::new();
        let mut payload = Vec::new();
        for b in batch {
            for id in b.alive {
                if alive_seen.insert(id) {
                    alive.push(id);
                }
            }
            payload.extend(b.payload);
        }
        MessageBundle {
            frame_id,
            timetag,
            alive,
            payload,
        }
    }
}

impl MessageBundle {
    pub fn is_empty(&self) -> bool {
        self.alive.is_empty() && self.payload.is_empty() && self.frame_id == FrameId(0)
    }
}

/// Multiplies positions by per-axis factors, optionally scaling velocity
/// and acceleration magnitude accordingly.
pub struct Scaling {
    pub sx: f64,
    pub sy: f64,
    pub sz: f64,
    pub scale_derivatives: bool,
}

impl Scaling {
    pub fn uniform(factor: f64) -> Self {
        Self {
            sx: factor,
            sy: factor,
            sz: factor,
            scale_derivatives: true,
        }
    }
}

impl Adaptor for Scaling {
    fn process(&mut self, mut bundle: MessageBundle) -> MessageBundle {
        for message in &mut bundle.payload {
            self.scale_message(message);
        }
        bundle
    }
}

impl Scaling {
    fn scale_position(&self, p: &mut tuio2_types::contact::Position) {
        use tuio2_types::contact::Position;
        match p {
            Position::D2(pt) => {
                pt.x *= self.sx;
                pt.y *= self.sy;
            }
            Position::D3(pt) => {
                pt.x *= self.sx;
                pt.y *= self.sy;
                pt.z *= self.sz;
            }
        }
    }

    fn scale_pointer(&self, m: &mut tuio2_types::message::PointerMessage) {
        self.scale_position(&mut m.position);
        if self.scale_derivatives {
            if let Some(v) = &mut m.velocity {
                v.x *= self.sx;
                v.y *= self.sy;
                v.z *= self.sz;
            }
            if let Some(a) = &mut m.accel {
                *a *= (self.sx + self.sy + self.sz) / 3.0;
            }
        }
    }

    fn scale_message(&self, message: &mut Message) {
        use tuio2_types::message::Message::*;
        match message {
            Pointer(m) => self.scale_pointer(m),
            Token(m) => self.scale_pointer(&mut m.pointer),
            Bounds(m) => self.scale_position(&mut m.position),
            AreaGeometry(m) => {
                for span in &mut m.spans {
                    span.center.x *= self.sx;
                    span.center.y *= self.sy;
                    span.radius *= (self.sx + self.sy) / 2.0;
                }
            }
            _ => {}
        }
    }
}

/// Translates then rotates coordinates into a target viewport; optionally
/// strips messages whose centroid falls outside the target box.
pub struct ViewportProjector {
    pub viewport: tuio2_types::topology::Viewport,
    pub strip_outside: bool,
}

impl Adaptor for ViewportProjector {
    fn process(&mut self, mut bundle: MessageBundle) -> MessageBundle {
        bundle.payload.retain_mut(|message| self.project(message));
        bundle
    }
}

impl ViewportProjector {
    /// Returns `false` when the message should be dropped (projected
    /// outside the viewport's box and `strip_outside` is set).
    fn project(&self, message: &mut Message) -> bool {
        use tuio2_types::contact::Position;
        use tuio2_types::message::Message::*;

        let transform = |p: Position, vp: &tuio2_types::topology::Viewport| -> Position {
            match p {
                Position::D2(pt) => {
                    let translated = pt.translate(vp.center.x, vp.center.y);
                    Position::D2(translated.rotate_around(vp.center, vp.orientation))
                }
                Position::D3(pt) => {
                    let translated = pt.translate(vp.center.x, vp.center.y, 0.0);
                    Position::D3(translated.rotate_around(
                        tuio2_types::coords::Point3::new(vp.center.x, vp.center.y, 0.0),
                        vp.orientation,
                        0.0,
                        0.0,
                    ))
                }
            }
        };

        let inside = |p: Position| self.viewport.contains_unrotated(p.as_point3().xy());

        match message {
            Pointer(m) => {
                m.position = transform(m.position, &self.viewport);
                !self.strip_outside || inside(m.position)
            }
            Token(m) => {
                m.pointer.position = transform(m.pointer.position, &self.viewport);
                !self.strip_outside || inside(m.pointer.position)
            }
            Bounds(m) => {
                m.position = transform(m.position, &self.viewport);
                !self.strip_outside || inside(m.position)
            }
            _ => true,
        }
    }
}

/// Tags outgoing messages with the sensor's translation mode and purpose.
/// Since the message catalogue has no generic "tag" field, the marker
/// expresses itself by injecting a `/dtuio/sensor` record once per bundle
/// rather than mutating existing payload messages.
pub struct CoordinateMarker {
    pub uuid: tuio2_types::ids::Uuid128,
    pub translation_mode: TranslationMode,
    pub purpose: SensorPurpose,
}

impl Adaptor for CoordinateMarker {
    fn process(&mut self, mut bundle: MessageBundle) -> MessageBundle {
        bundle.payload.push(Message::Sensor(tuio2_types::message::SensorMessage {
            uuid: self.uuid,
            translation_mode: self.translation_mode,
            purpose: self.purpose,
        }));
        bundle
    }
}

/// Holds a static list of messages (typically sensor-topology metadata)
/// and injects them into every Nth outgoing bundle.
pub struct AppendOnInterval {
    pub messages: Vec<Message>,
    pub interval: u64,
    count: u64,
}

impl AppendOnInterval {
    pub fn new(messages: Vec<Message>, interval: u64) -> Self {
        Self {
            messages,
            interval: interval.max(1),
            count: 0,
        }
    }
}

impl Adaptor for AppendOnInterval {
    fn process(&mut self, mut bundle: MessageBundle) -> MessageBundle {
        self.count += 1;
        if self.count % self.interval == 0 {
            bundle.payload.extend(self.messages.iter().cloned());
        }
        bundle
    }
}

/// Drops messages whose path matches a configured regular expression.
pub struct Filter {
    pattern: Regex,
}

impl Filter {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }
}

impl Adaptor for Filter {
    fn process(&mut self, mut bundle: MessageBundle) -> MessageBundle {
        bundle.payload.retain(|m| !self.pattern.is_match(m.path()));
        bundle
    }
}

/// Wraps a nested adaptor chain: messages matched by a regular expression
/// are fed into the sub-chain and the sub-chain's output replaces them;
/// unmatched messages pass through untouched.
pub struct Apply {
    pattern: Regex,
    sub_chain: Vec<Box<dyn Adaptor>>,
}

impl Apply {
    pub fn new(pattern: &str, sub_chain: Vec<Box<dyn Adaptor>>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            sub_chain,
        })
    }
}

impl Adaptor for Apply {
    fn process(&mut self, bundle: MessageBundle) -> MessageBundle {
        let (matched, unmatched): (Vec<Message>, Vec<Message>) =
            bundle.payload.into_iter().partition(|m| self.pattern.is_match(m.path()));

        let mut sub_bundle = MessageBundle {
            frame_id: bundle.frame_id,
            timetag: bundle.timetag,
            alive: bundle.alive.clone(),
            payload: matched,
        };
        for stage in &mut self.sub_chain {
            sub_bundle = stage.process(sub_bundle);
        }

        let mut payload = unmatched;
        payload.extend(sub_bundle.payload);
        MessageBundle {
            frame_id: bundle.frame_id,
            timetag: bundle.timetag,
            alive: bundle.alive,
            payload,
        }
    }
}

/// Runs a bundle through an ordered chain of adaptors, left to right.
pub fn run_chain(chain: &mut [Box<dyn Adaptor>], mut bundle: MessageBundle) -> MessageBundle {
    for adaptor in chain {
        bundle = adaptor.process(bundle);
    }
    bundle
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuio2_types::contact::Position;
    use tuio2_types::coords::Point2;
    use tuio2_types::message::{ComponentIdHolder, OutputModeHolder, PointerMessage, SessionIdHolder, TypeUser};

    fn pointer_at(x: f64, y: f64) -> Message {
        Message::Pointer(PointerMessage {
            session: SessionIdHolder {
                session_id: SessionId(1),
            },
            type_user: TypeUser::default(),
            component: ComponentIdHolder::default(),
            position: Position::D2(Point2::new(x, y)),
            velocity: None,
            accel: None,
            output_mode: OutputModeHolder::Only2D,
        })
    }

    #[test]
    fn scaling_multiplies_position() {
        let mut bundle = MessageBundle::new(FrameId(1), Timetag::IMMEDIATE);
        bundle.payload.push(pointer_at(1.0, 2.0));
        let mut scaling = Scaling::uniform(2.0);
        let out = scaling.process(bundle);
        match &out.payload[0] {
            Message::Pointer(p) => assert_eq!(p.position, Position::D2(Point2::new(2.0, 4.0))),
            _ => panic!(),
        }
    }

    #[test]
    fn filter_drops_matching_path() {
        let mut bundle = MessageBundle::new(FrameId(1), Timetag::IMMEDIATE);
        bundle.payload.push(pointer_at(0.0, 0.0));
        let mut filter = Filter::new(r"^/tuio2/ptr$").unwrap();
        let out = filter.process(bundle);
        assert!(out.payload.is_empty());
    }

    #[test]
    fn append_on_interval_injects_every_nth_bundle() {
        let extra = vec![pointer_at(9.0, 9.0)];
        let mut stage = AppendOnInterval::new(extra, 2);
        let b1 = stage.process(MessageBundle::new(FrameId(1), Timetag::IMMEDIATE));
        assert!(b1.payload.is_empty());
        let b2 = stage.process(MessageBundle::new(FrameId(2), Timetag::IMMEDIATE));
        assert_eq!(b2.payload.len(), 1);
    }

    #[test]
    fn multiplexing_merges_once_every_source_reports() {
        let mut mux = Multiplexing::new(2);
        let mut a = MessageBundle::new(FrameId(3), Timetag::new(10, 0));
        a.alive.push(SessionId(1));
        let empty = mux.process(a);
        assert!(empty.is_empty());

        let mut b = MessageBundle::new(FrameId(5), Timetag::new(12, 0));
        b.alive.push(SessionId(2));
        let merged = mux.process(b);
        assert_eq!(merged.frame_id, FrameId(5));
        assert_eq!(merged.alive.len(), 2);
    }
}
