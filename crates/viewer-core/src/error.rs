//! Error types shared by the viewer crates.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    /// The packaged asset could not be resolved or downloaded.
    #[error("failed to fetch asset {url}: {reason}")]
    AssetFetch { url: String, reason: String },

    #[error("failed to parse model: {0}")]
    Gltf(#[from] gltf::Error),

    /// Buffer referenced by a primitive is missing from the document.
    #[error("buffer {0} is not available")]
    UnsupportedBuffer(usize),

    #[error("model contains no drawable surfaces")]
    EmptyModel,

    #[error("invalid layout map: {0}")]
    LayoutMap(#[source] serde_json::Error),

    #[error("invalid viewer config: {0}")]
    Config(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
