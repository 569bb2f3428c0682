mod catalogue;
mod mixins;

pub use catalogue::{
    component_of, output_mode_of, type_user_of, AliveSetMessage, AreaGeometryMessage,
    BoundsMessage, DiscSpan, FrameMessage, GroupMessage, LinkAssociationMessage,
    ListAssociationMessage, Message, NeighbourMessage, PointerMessage, SensorMessage,
    SymbolMessage, TokenMessage, TreeAssociationMessage, ViewportMessage,
};
pub use mixins::{
    AngleHolder, ComponentIdHolder, EllipseAxesHolder, LinkTopology, OutputModeHolder, PortPair,
    RotationHolder, SessionIdHolder, TypeUser,
};
