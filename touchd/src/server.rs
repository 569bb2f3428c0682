//! The server endpoint (§4.E): owns the UDP socket, the per-frame staging
//! buffer, the live-session set and the session-id allocator, and runs the
//! adaptor chain immediately before encoding and sending a bundle.
//!
//! Send protocol, once per commit cycle: a `/tuio2/frm` frame message, a
//! `/tuio2/alv` alive-set listing every session id currently live, then the
//! staged payload messages in append order — exactly the shape
//! [`tuio2_wire::encode_frame`] expects.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::net::{ToSocketAddrs, UdpSocket};

use tuio2_types::ids::{FrameId, SessionId};
use tuio2_types::message::{FrameMessage, Message};
use tuio2_types::Timetag;

use crate::adaptor::{run_chain, Adaptor, MessageBundle};

/// Hands out session ids from a monotonically increasing counter, skipping
/// any id currently marked live. A released id only re-enters the pool once
/// it has gone a full bundle interval without being reused — concretely, an
/// id released while building bundle `N` cannot be handed out again until
/// bundle `N + 2`, so that a client which only just received `N`'s alive set
/// (the first one it is absent from) cannot observe it "jump" to a new
/// contact in the very next bundle it receives.
#[derive(Debug, Default)]
pub struct SessionIdAllocator {
    next_counter: u32,
    live: HashSet<u32>,
    released_at_frame: HashMap<u32, u32>,
    reusable: BTreeSet<u32>,
}

impl SessionIdAllocator {
    pub fn new() -> Self {
        Self {
            next_counter: 1,
            ..Default::default()
        }
    }

    /// Must be called once per commit cycle, before any `allocate` calls for
    /// that cycle, with the frame id the about-to-be-built bundle will
    /// carry. Promotes ids that have now cleared their lag window into the
    /// reusable pool.
    pub fn begin_frame(&mut self, frame_id: u32) {
        let ready: Vec<u32> = self
            .released_at_frame
            .iter()
            .filter(|&(_, &released_at)| frame_id > released_at + 1)
            .map(|(&id, _)| id)
            .collect();
        for id in ready {
            self.released_at_frame.remove(&id);
            self.reusable.insert(id);
        }
    }

    pub fn allocate(&mut self) -> SessionId {
        let id = if let Some(&id) = self.reusable.iter().next() {
            self.reusable.remove(&id);
            id
        } else {
            loop {
                let candidate = self.next_counter;
                self.next_counter = self.next_counter.wrapping_add(1);
                if self.next_counter == 0 {
                    self.next_counter = 1;
                }
                if candidate != 0 && !self.live.contains(&candidate) {
                    break candidate;
                }
            }
        };
        self.live.insert(id);
        SessionId(id)
    }

    /// Marks `id` no longer live as of the cycle that will emit `current_frame`.
    pub fn release(&mut self, id: SessionId, current_frame: u32) {
        self.live.remove(&id.0);
        self.released_at_frame.insert(id.0, current_frame);
    }

    pub fn is_live(&self, id: SessionId) -> bool {
        self.live.contains(&id.0)
    }
}

/// Everything a `/tuio2/frm` message carries besides the frame id and
/// timetag, fixed for the lifetime of one server.
#[derive(Debug, Clone)]
pub struct SourceIdentity {
    pub source_address: u32,
    pub instance_id: u32,
    pub app_name: String,
    pub sensor_width: u32,
    pub sensor_height: u32,
}

/// Owns the UDP socket and the commit protocol. Tracker(s) and the
/// topology publisher append to the staging buffer; `commit` runs the
/// adaptor chain over the assembled bundle and sends it.
pub struct Server {
    socket: UdpSocket,
    identity: SourceIdentity,
    next_frame_id: FrameId,
    allocator: SessionIdAllocator,
    alive: Vec<SessionId>,
    staging: Vec<Message>,
    adaptors: Vec<Box<dyn Adaptor>>,
}

impl Server {
    pub fn bind<A: ToSocketAddrs>(target: A, identity: SourceIdentity) -> std::io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(target)?;
        Ok(Self {
            socket,
            identity,
            next_frame_id: FrameId(0),
            allocator: SessionIdAllocator::new(),
            alive: Vec::new(),
            staging: Vec::new(),
            adaptors: Vec::new(),
        })
    }

    pub fn push_adaptor(&mut self, adaptor: Box<dyn Adaptor>) {
        self.adaptors.push(adaptor);
    }

    pub fn allocator_mut(&mut self) -> &mut SessionIdAllocator {
        &mut self.allocator
    }

    /// Marks a session id alive for the upcoming and subsequent bundles,
    /// until `retire_session` is called.
    pub fn mark_alive(&mut self, id: SessionId) {
        if !self.alive.contains(&id) {
            self.alive.push(id);
        }
    }

    /// Removes a session id from the alive set and releases it back to the
    /// allocator, tagged with the frame about to be emitted. Callers must
    /// invoke `begin_commit` first so `next_frame_id` already holds that
    /// bundle's id.
    pub fn retire_session(&mut self, id: SessionId) {
        self.alive.retain(|&live| live != id);
        self.allocator.release(id, self.next_frame_id.0);
    }

    pub fn stage(&mut self, message: Message) {
        self.staging.push(message);
    }

    pub fn stage_all(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.staging.extend(messages);
    }

    /// Advances the frame counter, runs `begin_frame` on the allocator so
    /// callers can allocate new session ids that are valid for the bundle
    /// this cycle will emit, and returns that frame id. Call this first in
    /// a commit cycle, before `Tracker::commit` allocates or releases ids
    /// and before `Server::commit` sends the assembled bundle.
    pub fn begin_commit(&mut self) -> FrameId {
        self.next_frame_id = self.next_frame_id.next();
        self.allocator.begin_frame(self.next_frame_id.0);
        self.next_frame_id
    }

    /// Assembles the staged bundle, runs the adaptor chain, encodes it and
    /// sends it over UDP. A socket failure is logged and swallowed — per
    /// the core's transport contract, a single dropped frame is not a fatal
    /// condition.
    pub fn commit(&mut self, frame_id: FrameId, timetag: Timetag) {
        let bundle = MessageBundle {
            frame_id,
            timetag,
            alive: self.alive.clone(),
            payload: std::mem::take(&mut self.staging),
        };
        let bundle = run_chain(&mut self.adaptors, bundle);

        let mut messages = Vec::with_capacity(bundle.payload.len() + 2);
        messages.push(Message::Frame(FrameMessage {
            frame_id: bundle.frame_id,
            timetag: bundle.timetag,
            source_address: self.identity.source_address,
            instance_id: self.identity.instance_id,
            app_name: self.identity.app_name.clone(),
            sensor_width: self.identity.sensor_width,
            sensor_height: self.identity.sensor_height,
        }));
        messages.push(Message::AliveSet(tuio2_types::message::AliveSetMessage {
            session_ids: bundle.alive,
        }));
        messages.extend(bundle.payload);

        let bytes = tuio2_wire::encode_frame(bundle.timetag, &messages);
        if let Err(error) = self.socket.send(&bytes) {
            tracing::warn!(%error, "dropping bundle: socket send failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_skips_live_ids_and_never_hands_out_none() {
        let mut alloc = SessionIdAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert_ne!(a, b);
        assert!(!a.is_none());
        assert!(!b.is_none());
    }

    #[test]
    fn released_id_is_not_reused_in_the_very_next_bundle() {
        let mut alloc = SessionIdAllocator::new();
        alloc.begin_frame(1);
        let a = alloc.allocate();
        alloc.release(a, 2);

        alloc.begin_frame(2);
        let b = alloc.allocate();
        assert_ne!(a, b, "id released for bundle 2 must not reappear in bundle 2's own allocations");

        alloc.begin_frame(3);
        let c = alloc.allocate();
        assert_ne!(a, c, "must not be reused in bundle N+1 (bundle 3, released at 2)");

        alloc.begin_frame(4);
        let d = alloc.allocate();
        assert_eq!(a, d, "becomes reusable from bundle N+2 onward");
    }

    #[test]
    fn retired_session_leaves_alive_set() {
        let identity = SourceIdentity {
            source_address: 0,
            instance_id: 1,
            app_name: "touchd".into(),
            sensor_width: 1920,
            sensor_height: 1080,
        };
        let mut server = Server::bind("127.0.0.1:0", identity).unwrap();
        let id = server.allocator_mut().allocate();
        server.mark_alive(id);
        assert!(server.alive.contains(&id));
        server.retire_session(id);
        assert!(!server.alive.contains(&id));
        assert!(!server.allocator.is_live(id));
    }
}
