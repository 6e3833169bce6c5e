pub mod camera;
pub mod gesture;
pub mod lighting;
pub mod mesh;
pub mod picking;
pub mod viewer;

pub use camera::{Camera, CameraUniform, css_viewport, screen_to_ndc};
pub use gesture::{GestureController, GestureOutcome, GesturePhase, PointerDelta, RotationState};
pub use lighting::{LightUniform, MaterialUniform};
pub use mesh::{Mesh, Vertex};
pub use picking::{AABB, Ray, SurfaceHit, pick_surface};
pub use viewer::{PickOutcome, SelectedSurface, ViewerSnapshot, ViewerState};

// Re-export glam types for consistent version usage
pub use glam;
