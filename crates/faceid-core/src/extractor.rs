//! Descriptor extraction interface.
//!
//! The detection and recognition networks live outside this workspace
//! (face-api style detect-and-describe); the session only needs model
//! readiness and a single-face descriptor per image.

use crate::types::Descriptor;
use async_trait::async_trait;
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("model assets not found: {0}")]
    ModelNotFound(String),
    #[error("models not loaded")]
    ModelNotReady,
    #[error("inference failed: {0}")]
    InferenceFailed(String),
}

/// Detect-and-describe collaborator.
///
/// `detect` returns `Ok(None)` when no face is present: that is a normal
/// result, not an error. `Err` is reserved for lower-level faults such as a
/// model that is not loaded or an inference failure.
#[async_trait]
pub trait DescriptorExtractor: Send + Sync {
    /// Load detector, landmark, and recognition models from `model_dir`.
    async fn load_models(&self, model_dir: &str) -> Result<(), ExtractorError>;

    /// Describe the most prominent face in `image`.
    async fn detect(&self, image: &DynamicImage) -> Result<Option<Descriptor>, ExtractorError>;
}
