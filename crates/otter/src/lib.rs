#![forbid(unsafe_code)]

//! Headless force-directed layout for dashboard node graphs.
//!
//! `otter` positions dashboard entities (projects, stats, quick actions) as physically simulated
//! nodes. A host supplies a [`NodeSet`], calls [`AnimationDriver::frame`] once per display refresh,
//! and receives immutable [`Snapshot`]s to draw. Rendering and pointer handling stay outside.

pub mod config;
pub mod driver;
pub mod edges;
pub mod error;
pub mod force;
pub mod geom;
pub mod node;
pub mod placement;
pub mod snapshot;
pub mod state;

pub use config::{Canvas, ForceConstants, LayoutConfig, RadiusTable};
pub use driver::{
    AnimationDriver, AnimationHandle, DriverStatus, FixedFrames, FrameSource, SubscriptionId,
};
pub use edges::{Edge, resolve};
pub use error::{Error, Result};
pub use force::ForceSimulator;
pub use geom::{Point, Vec2};
pub use node::{Node, NodeKind, NodeSet};
pub use placement::spiral;
pub use snapshot::Snapshot;
pub use state::{Body, SimulationState};
