//! Map sync engine and its rendering boundary.

mod backend;
mod diff;
mod engine;
mod scene;

pub use backend::{MapBackend, MarkerLabel, MarkerSpec, MarkerStyle};
pub use diff::{MarkerDiff, Placement};
pub use engine::{MapConfig, MapPhase, MapSync};
pub use scene::{CameraView, MapScene, MarkerView, SceneMap, SceneMarker, SceneStats};
