//! Layout and relationship engine for an intensity-encoded emotional spine.
//!
//! Records go in; positioned entities, edge sets, a hit-test index and the
//! hover state come out, all owned by a [`VisualizationSession`].

pub mod ambient;
pub mod color;
pub mod edges;
pub mod encoding;
pub mod gate;
pub mod interaction;
pub mod layout;
pub mod protocol;
pub mod record;
pub mod session;
pub mod spatial;

pub use ambient::{fog_for_distance, AmbientField, AmbientParams, Fog, FogTracker};
pub use color::{lighten, resolve_color, Color, Emotion};
pub use edges::{build_edges, Edge, EdgeSet, EdgeSetKind, EdgeSets, EdgeStyle};
pub use encoding::{resolve_blur, resolve_opacity, resolve_size, EncodingParams, Visual};
pub use gate::ReadyGate;
pub use interaction::{
    edge_emphasis, highlights, EdgeEmphasis, Highlight, InteractionMachine, InteractionState,
    Transition,
};
pub use layout::{layout, viewport_projection, Guide, GuideError, LayoutParams, LayoutStrategy, PositionedEntity, StrategyKind, Viewport};
pub use protocol::Msg;
pub use record::{normalize_records, Intensity, Ordinal, RawRecord, Record, RecordError};
pub use session::{LoadTicket, Rebuild, RenderPayload, VisualizationSession};
pub use spatial::{Ray, SpatialIndex};
