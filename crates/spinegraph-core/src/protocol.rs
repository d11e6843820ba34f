use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::ambient::{AmbientParams, Fog};
use crate::layout::StrategyKind;
use crate::record::Ordinal;
use crate::session::RenderPayload;

pub const PROTOCOL_VERSION: &str = "spinegraph/1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Msg {
    Hello { version: String },
    /// Sent once after `Hello`; the field is regenerated from these params.
    Ambient { params: AmbientParams },
    RequestPayload,
    Payload { payload: Box<RenderPayload> },
    PointerRay { origin: Vec3, dir: Vec3 },
    /// Cursor in viewport pixels; picks under the golden-angle layout.
    PointerScreen { x: f32, y: f32 },
    PointerLeave,
    Viewport { width: f32, height: f32 },
    Camera { eye: Vec3, target: Vec3 },
    SetStrategy { strategy: StrategyKind },
    ActiveChanged { previous: Option<Ordinal>, active: Option<Ordinal> },
    Tick { elapsed: f32, fog: Option<Fog> },
    Reload,
    Ping,
    Pong,
}

impl Msg {
    pub fn hello() -> Self {
        Msg::Hello {
            version: PROTOCOL_VERSION.to_string(),
        }
    }

    pub fn payload(payload: RenderPayload) -> Self {
        Msg::Payload {
            payload: Box::new(payload),
        }
    }

    /// JSON body of one frame.
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn decode(frame: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(frame)
    }
}
