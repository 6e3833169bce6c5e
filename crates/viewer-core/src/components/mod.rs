pub mod transform;

pub use transform::{ModelUniform, Transform};
