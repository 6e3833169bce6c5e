pub mod color;
pub mod components;
pub mod config;
pub mod error;
pub mod layout;
pub mod math;
pub mod model;
pub mod overlay;

// Re-exports
pub use color::Color;
pub use components::{ModelUniform, Transform};
pub use config::{CameraConfig, LightingConfig, OverlayConfig, ViewerConfig};
pub use error::{Result, ViewerError};
pub use layout::{LayoutImage, LayoutMap};
pub use math::AABB;
pub use model::{Model, Surface};
pub use overlay::OverlayViewport;
