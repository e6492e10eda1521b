//! Reference acquisition: fetch the reference image, decode it, and
//! describe the face in it once per session.

use crate::http::{HttpClient, RequestDescriptor, TransportError};
use faceid_core::{Descriptor, DescriptorExtractor, ExtractorError};
use thiserror::Error;

const DEFAULT_METHOD: &str = "GET";

#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("Failed to fetch reference image")]
    Fetch(#[source] TransportError),
    #[error("Failed to fetch reference image")]
    Status(u16),
    #[error("Failed to decode reference image")]
    Decode(String),
    #[error("No face detected in reference image")]
    NoFace,
    #[error("Failed to process reference image")]
    Extraction(#[source] ExtractorError),
}

pub struct ReferenceAcquirer<'a> {
    http: &'a dyn HttpClient,
    extractor: &'a dyn DescriptorExtractor,
}

impl<'a> ReferenceAcquirer<'a> {
    pub fn new(http: &'a dyn HttpClient, extractor: &'a dyn DescriptorExtractor) -> Self {
        Self { http, extractor }
    }

    /// Fetch, decode, and describe the reference image.
    ///
    /// Only the descriptor survives this call; the payload and decoded
    /// image are dropped before it returns.
    pub async fn acquire(&self, request: &RequestDescriptor) -> Result<Descriptor, ReferenceError> {
        let method = request.method_or(DEFAULT_METHOD);
        let response = self
            .http
            .send(method, request)
            .await
            .map_err(ReferenceError::Fetch)?;

        if !response.is_success() {
            tracing::warn!(url = %request.url, status = response.status, "reference fetch rejected");
            return Err(ReferenceError::Status(response.status));
        }

        let bytes = response.body;
        tracing::debug!(bytes = bytes.len(), "reference image fetched");

        let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|e| ReferenceError::Decode(e.to_string()))?
            .map_err(|e| ReferenceError::Decode(e.to_string()))?;

        let descriptor = self
            .extractor
            .detect(&image)
            .await
            .map_err(ReferenceError::Extraction)?
            .ok_or(ReferenceError::NoFace)?;

        tracing::info!(
            width = image.width(),
            height = image.height(),
            dim = descriptor.len(),
            "reference descriptor acquired"
        );

        Ok(descriptor)
    }
}
