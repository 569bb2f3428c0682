//! The closed message catalogue: every message type the wire codec can
//! produce or consume. New message kinds are never added by a plugin —
//! adding one here is how the catalogue grows.

use crate::contact::{OutputMode, Position};
use crate::coords::{Accel, Angle, Point2, Velocity3};
use crate::ids::{ComponentId, FrameId, SessionId, TypeId, UserId, Uuid128};
use crate::timetag::Timetag;
use crate::topology::{SensorPurpose, TranslationMode};

use super::mixins::{
    AngleHolder, ComponentIdHolder, EllipseAxesHolder, LinkTopology, OutputModeHolder,
    RotationHolder, SessionIdHolder, TypeUser,
};

/// The mandatory first payload element of every bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMessage {
    pub frame_id: FrameId,
    pub timetag: Timetag,
    pub source_address: u32,
    pub instance_id: u32,
    pub app_name: String,
    pub sensor_width: u32,
    pub sensor_height: u32,
}

/// The set of session ids currently alive at this source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AliveSetMessage {
    pub session_ids: Vec<SessionId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointerMessage {
    pub session: SessionIdHolder,
    pub type_user: TypeUser,
    pub component: ComponentIdHolder,
    pub position: Position,
    pub velocity: Option<Velocity3>,
    pub accel: Option<Accel>,
    pub output_mode: OutputModeHolder,
}

/// A rigid-body token: everything a pointer carries, plus orientation and
/// its derivatives.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenMessage {
    pub pointer: PointerMessage,
    pub angle: AngleHolder,
    pub rotation: RotationHolder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundsMessage {
    pub session: SessionIdHolder,
    pub position: Position,
    pub angle: AngleHolder,
    pub axes: EllipseAxesHolder,
    pub area: f64,
    pub output_mode: OutputModeHolder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolMessage {
    pub session: SessionIdHolder,
    pub type_user: TypeUser,
    pub component: ComponentIdHolder,
    pub payload: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscSpan {
    pub center: Point2,
    pub radius: f64,
}

/// Area geometry: the union of disc spans anchored at a contact's reported
/// touch centers, approximating an arbitrary blob shape.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaGeometryMessage {
    pub session: SessionIdHolder,
    pub spans: Vec<DiscSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkAssociationMessage {
    pub session: SessionIdHolder,
    pub topology: LinkTopology,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListAssociationMessage {
    pub session: SessionIdHolder,
    pub topology: LinkTopology,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeAssociationMessage {
    pub session: SessionIdHolder,
    pub topology: LinkTopology,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorMessage {
    pub uuid: Uuid128,
    pub translation_mode: TranslationMode,
    pub purpose: SensorPurpose,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMessage {
    pub uuid: Uuid128,
    pub width: f64,
    pub height: f64,
    pub center: Point2,
    pub orientation: Angle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupMessage {
    pub uuid: Uuid128,
    pub group_uuid: Uuid128,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighbourMessage {
    pub uuid: Uuid128,
    pub neighbour_uuid: Uuid128,
    pub azimuth: Angle,
    pub altitude: Angle,
    pub distance: f64,
}

/// Every message kind the catalogue admits. Dispatch is a plain `match` —
/// the catalogue is closed, so there is no trait-object indirection here.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Frame(FrameMessage),
    AliveSet(AliveSetMessage),
    Pointer(PointerMessage),
    Token(TokenMessage),
    Bounds(BoundsMessage),
    Symbol(SymbolMessage),
    AreaGeometry(AreaGeometryMessage),
    LinkAssociation(LinkAssociationMessage),
    ListAssociation(ListAssociationMessage),
    TreeAssociation(TreeAssociationMessage),
    Sensor(SensorMessage),
    Viewport(ViewportMessage),
    Group(GroupMessage),
    Neighbour(NeighbourMessage),
}

impl Message {
    /// The OSC-style path this message is carried under.
    pub fn path(&self) -> &'static str {
        match self {
            Message::Frame(_) => "/tuio2/frm",
            Message::AliveSet(_) => "/tuio2/alv",
            Message::Pointer(m) => match m.position {
                Position::D2(_) => "/tuio2/ptr",
                Position::D3(_) => "/tuio2/p3d",
            },
            Message::Token(m) => match m.pointer.position {
                Position::D2(_) => "/tuio2/tok",
                Position::D3(_) => "/tuio2/t3d",
            },
            Message::Bounds(m) => match m.position {
                Position::D2(_) => "/tuio2/bnd",
                Position::D3(_) => "/tuio2/b3d",
            },
            Message::Symbol(_) => "/tuio2/sym",
            Message::AreaGeometry(_) => "/tuio2/arg",
            Message::LinkAssociation(_) => "/tuio2/lia",
            Message::ListAssociation(_) => "/tuio2/lla",
            Message::TreeAssociation(_) => "/tuio2/lta",
            Message::Sensor(_) => "/dtuio/sensor",
            Message::Viewport(_) => "/dtuio/viewport",
            Message::Group(_) => "/dtuio/group",
            Message::Neighbour(_) => "/dtuio/neighbour",
        }
    }

    /// A short human-readable rendering, used by diagnostics and the trace
    /// recorder's `-v/--verbose` echo; not part of the wire format.
    pub fn pretty_print(&self) -> String {
        match self {
            Message::Frame(m) => format!(
                "frm#{} {}x{} app={:?}",
                m.frame_id.0, m.sensor_width, m.sensor_height, m.app_name
            ),
            Message::AliveSet(m) => format!("alv {:?}", m.session_ids.iter().map(|s| s.0).collect::<Vec<_>>()),
            Message::Pointer(m) => format!(
                "ptr s{} @({:.3},{:.3})",
                m.session.session_id.0,
                m.position.x(),
                m.position.y()
            ),
            Message::Token(m) => format!(
                "tok s{} @({:.3},{:.3}) angle={:.3}",
                m.pointer.session.session_id.0,
                m.pointer.position.x(),
                m.pointer.position.y(),
                m.angle.angle
            ),
            Message::Bounds(m) => format!(
                "bnd s{} major={:.3} minor={:.3}",
                m.session.session_id.0, m.axes.major, m.axes.minor
            ),
            Message::Symbol(m) => format!("sym s{} {:?}", m.session.session_id.0, m.payload),
            Message::AreaGeometry(m) => format!("arg s{} spans={}", m.session.session_id.0, m.spans.len()),
            Message::LinkAssociation(m) => format!(
                "lia s{} nodes={} edges={}",
                m.session.session_id.0,
                m.topology.graph.node_count(),
                m.topology.graph.edge_count()
            ),
            Message::ListAssociation(m) => format!(
                "lla s{} nodes={}",
                m.session.session_id.0,
                m.topology.graph.node_count()
            ),
            Message::TreeAssociation(m) => format!(
                "lta s{} nodes={}",
                m.session.session_id.0,
                m.topology.graph.node_count()
            ),
            Message::Sensor(m) => format!("sensor {}", m.uuid),
            Message::Viewport(m) => format!("viewport {} {}x{}", m.uuid, m.width, m.height),
            Message::Group(m) => format!("group {} in {}", m.uuid, m.group_uuid),
            Message::Neighbour(m) => format!("neighbour {} -> {}", m.uuid, m.neighbour_uuid),
        }
    }

    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            Message::Pointer(m) => Some(m.session.session_id),
            Message::Token(m) => Some(m.pointer.session.session_id),
            Message::Bounds(m) => Some(m.session.session_id),
            Message::Symbol(m) => Some(m.session.session_id),
            Message::AreaGeometry(m) => Some(m.session.session_id),
            Message::LinkAssociation(m) => Some(m.session.session_id),
            Message::ListAssociation(m) => Some(m.session.session_id),
            Message::TreeAssociation(m) => Some(m.session.session_id),
            Message::Frame(_)
            | Message::AliveSet(_)
            | Message::Sensor(_)
            | Message::Viewport(_)
            | Message::Group(_)
            | Message::Neighbour(_) => None,
        }
    }
}

pub fn output_mode_of(output_mode: OutputMode) -> OutputModeHolder {
    match output_mode {
        OutputMode::Only2D => OutputModeHolder::Only2D,
        OutputMode::Only3D => OutputModeHolder::Only3D,
        OutputMode::Both => OutputModeHolder::Both,
    }
}

pub fn type_user_of(type_id: TypeId, user_id: UserId) -> TypeUser {
    TypeUser { type_id, user_id }
}

pub fn component_of(component_id: ComponentId) -> ComponentIdHolder {
    ComponentIdHolder { component_id }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_path_depends_on_dimensionality() {
        let base = PointerMessage {
            session: SessionIdHolder {
                session_id: SessionId(1),
            },
            type_user: TypeUser::default(),
            component: ComponentIdHolder::default(),
            position: Position::D2(Point2::new(0.0, 0.0)),
            velocity: None,
            accel: None,
            output_mode: OutputModeHolder::Only2D,
        };
        assert_eq!(Message::Pointer(base.clone()).path(), "/tuio2/ptr");

        let mut three_d = base;
        three_d.position = Position::D3(crate::coords::Point3::new(0.0, 0.0, 0.0));
        assert_eq!(Message::Pointer(three_d).path(), "/tuio2/p3d");
    }

    #[test]
    fn non_session_messages_report_no_session_id() {
        let frame = Message::Frame(FrameMessage {
            frame_id: FrameId(1),
            timetag: Timetag::IMMEDIATE,
            source_address: 0,
            instance_id: 0,
            app_name: String::new(),
            sensor_width: 1920,
            sensor_height: 1080,
        });
        assert_eq!(frame.session_id(), None);
    }
}
