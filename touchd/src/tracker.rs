//! The contact-tracker state machine (§4.G): turns a raw per-axis event
//! stream from either multitouch convention into a stable set of
//! [`Contact`]s and, once per sync group, a batch of pointer/bounds
//! messages plus the session-id churn the server needs to apply.
//!
//! Two input conventions coexist in the wild and are told apart from the
//! first distinguishing event: a raw `slot` axis implies Type-B
//! (slot-addressed, persistent per-slot identity); a `SYN_MT_REPORT` marker
//! before any slot axis implies Type-A (anonymous batch, re-matched by
//! nearest neighbour every sync group). A tracker commits to whichever
//! convention it detects first and never switches mid-stream.

use std::collections::{HashMap, HashSet};

use tuio2_types::contact::{Contact, OutputMode, Position};
use tuio2_types::coords::{Point2, Point3};
use tuio2_types::ids::{SessionId, SlotId, TrackingId};
use tuio2_types::message::{
    component_of, output_mode_of, type_user_of, AngleHolder, BoundsMessage, ComponentIdHolder,
    EllipseAxesHolder, Message, PointerMessage, SessionIdHolder, TypeUser,
};

use crate::axis::{AxisMapping, LogicalAxis};
use crate::input::RawEvent;
use crate::server::SessionIdAllocator;
use crate::trace::AxisCapability;

type ComponentMap = HashMap<LogicalAxis, (f64, i32)>;

fn insert_component(map: &mut ComponentMap, axis: LogicalAxis, value: f64, priority: i32) {
    match map.get(&axis) {
        Some(&(_, existing_priority)) if existing_priority > priority => {}
        _ => {
            map.insert(axis, (value, priority));
        }
    }
}

fn position_from(components: &ComponentMap) -> Option<Position> {
    let x = components.get(&LogicalAxis::X).map(|&(v, _)| v)?;
    let y = components.get(&LogicalAxis::Y).map(|&(v, _)| v)?;
    match components.get(&LogicalAxis::Z) {
        Some(&(z, _)) => Some(Position::D3(Point3::new(x, y, z))),
        None => Some(Position::D2(Point2::new(x, y))),
    }
}

/// Combines a tuple's axes with a contact's previous position, so a sync
/// group that only reports a changed axis (not a full X/Y/Z tuple) still
/// produces a sensible position instead of being dropped.
fn merge_position(components: &ComponentMap, previous: Position) -> Position {
    let prev3 = previous.as_point3();
    let x = components.get(&LogicalAxis::X).map(|&(v, _)| v).unwrap_or(prev3.x);
    let y = components.get(&LogicalAxis::Y).map(|&(v, _)| v).unwrap_or(prev3.y);
    match (components.get(&LogicalAxis::Z), previous) {
        (Some(&(z, _)), _) => Position::D3(Point3::new(x, y, z)),
        (None, Position::D3(_)) => Position::D3(Point3::new(x, y, prev3.z)),
        (None, Position::D2(_)) => Position::D2(Point2::new(x, y)),
    }
}

fn squared_distance(a: Position, b: Position) -> f64 {
    let a = a.as_point3();
    let b = b.as_point3();
    (a.x - b.x).powi(2) + (a.y - b.y).powi(2) + (a.z - b.z).powi(2)
}

/// One finger or object's axis samples since the last sync boundary.
/// `release` is set the moment a `tracking_id == -1` sample arrives for
/// this tuple's slot (Type-B) or current position (Type-A).
#[derive(Debug, Clone, Default)]
struct PendingTuple {
    components: ComponentMap,
    release: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotPhase {
    Live,
    Dying,
}

struct MainEntry {
    contact: Contact,
    phase: SlotPhase,
    send: bool,
    slot: Option<SlotId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Convention {
    #[default]
    Unknown,
    TypeA,
    TypeB,
}

/// The result of one commit phase: the messages to stage, and the
/// session-id bookkeeping the server must apply to its own alive set and
/// allocator.
#[derive(Debug, Default)]
pub struct TrackerCommit {
    pub messages: Vec<Message>,
    pub newly_alive: Vec<SessionId>,
    pub released: Vec<SessionId>,
}

pub struct Tracker {
    mapping: AxisMapping,
    convention: Convention,
    touch_active: i32,
    join_distance_limit: f64,
    output_mode: OutputMode,

    current_slot: SlotId,
    pending_by_slot: HashMap<SlotId, PendingTuple>,

    current_pending: PendingTuple,
    operational: Vec<PendingTuple>,

    main: Vec<MainEntry>,
}

impl Tracker {
    pub fn new(mapping: AxisMapping, join_distance_limit: f64, output_mode: OutputMode) -> Self {
        Self {
            mapping,
            convention: Convention::Unknown,
            touch_active: 0,
            join_distance_limit,
            output_mode,
            current_slot: SlotId(0),
            pending_by_slot: HashMap::new(),
            current_pending: PendingTuple::default(),
            operational: Vec::new(),
            main: Vec::new(),
        }
    }

    /// Rebuilds the axis-mapping's capability ranges from a freshly
    /// re-enumerated device, as the wrapper does after a `SYN_DROPPED`.
    pub fn refresh_ranges(&mut self, capabilities: &[AxisCapability]) {
        for cap in capabilities {
            self.mapping.set_range(cap.code, cap.range);
        }
    }

    fn active_tuple(&mut self) -> &mut PendingTuple {
        match self.convention {
            Convention::TypeB => self.pending_by_slot.entry(self.current_slot).or_default(),
            _ => &mut self.current_pending,
        }
    }

    /// Applies one raw event to the tracker's pending state. `SYN_REPORT`
    /// is not handled here — the caller recognizes it and invokes
    /// [`Tracker::commit`] instead, since that phase needs the server's
    /// session-id allocator.
    pub fn feed(&mut self, event: RawEvent) {
        match event {
            RawEvent::Abs { code, value } => self.handle_abs(code, value),
            RawEvent::Key { code, value } => self.handle_key(code, value),
            RawEvent::SynMtReport => self.handle_mt_report(),
            RawEvent::SynDropped => self.handle_dropped(),
            RawEvent::SynReport => {}
        }
    }

    fn handle_abs(&mut self, code: i32, value: i32) {
        let (logical, priority) = self.mapping.lookup(code);
        match logical {
            LogicalAxis::Slot => {
                if self.convention == Convention::Unknown {
                    self.convention = Convention::TypeB;
                }
                self.current_slot = SlotId(value);
                self.pending_by_slot.entry(self.current_slot).or_default();
            }
            LogicalAxis::TrackingId => {
                if value == TrackingId::RELEASE.0 {
                    self.active_tuple().release = true;
                } else {
                    let tuple = self.active_tuple();
                    insert_component(&mut tuple.components, LogicalAxis::TrackingId, value as f64, priority);
                }
            }
            LogicalAxis::Ignore => {}
            other => {
                let normalized = self.mapping.normalize(code, value);
                insert_component(&mut self.active_tuple().components, other, normalized, priority);
            }
        }
    }

    fn handle_key(&mut self, code: i32, value: i32) {
        if crate::input::is_btn_touch(code) {
            self.touch_active = if value != 0 {
                self.touch_active + 1
            } else {
                (self.touch_active - 1).max(0)
            };
        }
    }

    fn handle_mt_report(&mut self) {
        if self.convention == Convention::Unknown {
            self.convention = Convention::TypeA;
        }
        let finished = std::mem::take(&mut self.current_pending);
        self.operational.push(finished);
    }

    /// `SYN_DROPPED`: the input buffer overflowed. Pending samples are
    /// discarded; live contacts are left untouched and will be re-observed
    /// (or time out through the touch-active workaround) on the next sync.
    fn handle_dropped(&mut self) {
        self.pending_by_slot.clear();
        self.operational.clear();
        self.current_pending = PendingTuple::default();
    }

    /// Commit phase (`SYN_REPORT`): merges this sync group's samples into
    /// the main contact buffer and returns the messages and session-id
    /// churn to apply. `allocator` must already have had `begin_frame`
    /// called for the frame this commit's messages will ship in.
    pub fn commit(&mut self, allocator: &mut SessionIdAllocator, now: f64) -> TrackerCommit {
        let incoming_empty = match self.convention {
            Convention::TypeB => self.pending_by_slot.is_empty(),
            _ => self.operational.is_empty(),
        };
        if self.touch_active <= 0 && incoming_empty {
            for entry in &mut self.main {
                entry.phase = SlotPhase::Dying;
            }
        }

        let mut newly_alive = Vec::new();
        match self.convention {
            Convention::TypeB => self.merge_type_b(allocator, now, &mut newly_alive),
            _ => self.merge_type_a(allocator, now, &mut newly_alive),
        }

        self.finalize(newly_alive)
    }

    /// Releases every live contact and emits one final commit, as the
    /// wrapper does when the underlying device closes.
    pub fn shutdown(&mut self) -> TrackerCommit {
        self.pending_by_slot.clear();
        self.operational.clear();
        for entry in &mut self.main {
            entry.phase = SlotPhase::Dying;
        }
        self.finalize(Vec::new())
    }

    fn merge_type_b(&mut self, allocator: &mut SessionIdAllocator, now: f64, newly_alive: &mut Vec<SessionId>) {
        let tuples: Vec<(SlotId, PendingTuple)> = self.pending_by_slot.drain().collect();
        for (slot, tuple) in tuples {
            if let Some(entry) = self.main.iter_mut().find(|e| e.slot == Some(slot)) {
                if tuple.release {
                    entry.phase = SlotPhase::Dying;
                } else {
                    let changed = apply_tuple(&mut entry.contact, &tuple.components, now);
                    entry.send = changed;
                    entry.phase = SlotPhase::Live;
                }
            } else if !tuple.release {
                if let Some(position) = position_from(&tuple.components) {
                    let session_id = allocator.allocate();
                    let mut contact = Contact::new(session_id, position);
                    contact.output_mode = self.output_mode;
                    apply_tuple(&mut contact, &tuple.components, now);
                    self.main.push(MainEntry {
                        contact,
                        phase: SlotPhase::Live,
                        send: true,
                        slot: Some(slot),
                    });
                    newly_alive.push(session_id);
                }
            }
        }
    }

    fn merge_type_a(&mut self, allocator: &mut SessionIdAllocator, now: f64, newly_alive: &mut Vec<SessionId>) {
        let operational = std::mem::take(&mut self.operational);
        let op_positions: Vec<Option<Position>> =
            operational.iter().map(|t| position_from(&t.components)).collect();
        let main_positions: Vec<Position> = self.main.iter().map(|e| e.contact.position).collect();

        let limit_sq = self.join_distance_limit * self.join_distance_limit;
        let mut candidates: Vec<(usize, usize, f64)> = Vec::new();
        for (i, op_pos) in op_positions.iter().enumerate() {
            let Some(op_pos) = op_pos else { continue };
            for (j, main_pos) in main_positions.iter().enumerate() {
                candidates.push((i, j, squared_distance(*op_pos, *main_pos)));
            }
        }
        candidates.sort_by(|a, b| {
            a.2.partial_cmp(&b.2)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
                .then(a.1.cmp(&b.1))
        });

        let mut used_op = HashSet::new();
        let mut used_main = HashSet::new();
        let mut pairs = Vec::new();
        for (i, j, d) in candidates {
            if d > limit_sq || used_op.contains(&i) || used_main.contains(&j) {
                continue;
            }
            used_op.insert(i);
            used_main.insert(j);
            pairs.push((i, j));
        }

        for (i, j) in &pairs {
            if operational[*i].release {
                self.main[*j].phase = SlotPhase::Dying;
                continue;
            }
            let changed = apply_tuple(&mut self.main[*j].contact, &operational[*i].components, now);
            self.main[*j].send = changed;
            self.main[*j].phase = SlotPhase::Live;
        }

        for j in 0..self.main.len() {
            if !used_main.contains(&j) {
                self.main[j].phase = SlotPhase::Dying;
            }
        }

        for (i, tuple) in operational.iter().enumerate() {
            if used_op.contains(&i) || tuple.release {
                continue;
            }
            let Some(position) = op_positions[i] else { continue };
            let session_id = allocator.allocate();
            let mut contact = Contact::new(session_id, position);
            contact.output_mode = self.output_mode;
            apply_tuple(&mut contact, &tuple.components, now);
            self.main.push(MainEntry {
                contact,
                phase: SlotPhase::Live,
                send: true,
                slot: None,
            });
            newly_alive.push(session_id);
        }
    }

    fn finalize(&mut self, newly_alive: Vec<SessionId>) -> TrackerCommit {
        let mut messages = Vec::new();
        let mut released = Vec::new();

        self.main.retain_mut(|entry| match entry.phase {
            SlotPhase::Dying => {
                released.push(entry.contact.session_id);
                false
            }
            SlotPhase::Live => {
                if entry.send {
                    messages.push(pointer_message(&entry.contact));
                    if entry.contact.shape_major.is_some() {
                        messages.push(bounds_message(&entry.contact));
                    }
                    entry.send = false;
                }
                true
            }
        });

        TrackerCommit {
            messages,
            newly_alive,
            released,
        }
    }
}

/// Writes a tuple's scalar fields into a contact and records its new
/// position via [`Contact::observe`] (refreshing velocity/acceleration
/// history). Returns whether anything tracked actually changed.
fn apply_tuple(contact: &mut Contact, components: &ComponentMap, now: f64) -> bool {
    let mut changed = false;

    if let Some(position) = position_from(components) {
        if position != contact.position {
            changed = true;
        }
        contact.observe(now, position);
    }

    macro_rules! apply_scalar {
        ($axis:expr, $field:expr) => {
            if let Some(&(value, _)) = components.get(&$axis) {
                if $field != Some(value) {
                    changed = true;
                }
                $field = Some(value);
            }
        };
    }
    apply_scalar!(LogicalAxis::Pressure, contact.pressure);
    apply_scalar!(LogicalAxis::Major, contact.shape_major);
    apply_scalar!(LogicalAxis::Minor, contact.shape_minor);
    apply_scalar!(LogicalAxis::Orientation, contact.orientation);
    apply_scalar!(LogicalAxis::Width, contact.width);

    changed
}

fn pointer_message(contact: &Contact) -> Message {
    Message::Pointer(PointerMessage {
        session: SessionIdHolder {
            session_id: contact.session_id,
        },
        type_user: type_user_of(contact.type_id, contact.user_id),
        component: component_of(contact.component_id),
        position: contact.position,
        velocity: contact.velocity,
        accel: contact.acceleration,
        output_mode: output_mode_of(contact.output_mode),
    })
}

fn bounds_message(contact: &Contact) -> Message {
    let major = contact.shape_major.unwrap_or(0.0);
    let minor = contact.shape_minor.unwrap_or(major);
    Message::Bounds(BoundsMessage {
        session: SessionIdHolder {
            session_id: contact.session_id,
        },
        position: contact.position,
        angle: AngleHolder {
            angle: contact.orientation.unwrap_or(0.0),
        },
        axes: EllipseAxesHolder { major, minor },
        area: std::f64::consts::PI * (major / 2.0) * (minor / 2.0),
        output_mode: output_mode_of(contact.output_mode),
    })
}
