//! Validation request and token extraction.

use crate::http::{HttpClient, RequestDescriptor, TransportError};
use thiserror::Error;

const DEFAULT_METHOD: &str = "POST";

/// Response keys checked for the token, in priority order.
const TOKEN_FIELDS: [&str; 2] = ["token", "access_token"];

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Validation failed")]
    Transport(#[source] TransportError),
    #[error("Validation failed")]
    Status(u16),
    #[error("Validation failed")]
    Malformed(#[source] serde_json::Error),
    #[error("Validation response contained no token")]
    MissingToken,
}

pub struct ValidationSubmitter<'a> {
    http: &'a dyn HttpClient,
}

impl<'a> ValidationSubmitter<'a> {
    pub fn new(http: &'a dyn HttpClient) -> Self {
        Self { http }
    }

    pub async fn submit(&self, request: &RequestDescriptor) -> Result<String, ValidationError> {
        let method = request.method_or(DEFAULT_METHOD);
        let response = self
            .http
            .send(method, request)
            .await
            .map_err(ValidationError::Transport)?;

        if !response.is_success() {
            tracing::warn!(url = %request.url, status = response.status, "validation rejected");
            return Err(ValidationError::Status(response.status));
        }

        let body: serde_json::Value =
            serde_json::from_slice(&response.body).map_err(ValidationError::Malformed)?;
        extract_token(&body).ok_or(ValidationError::MissingToken)
    }
}

/// First non-empty string among [`TOKEN_FIELDS`].
fn extract_token(body: &serde_json::Value) -> Option<String> {
    TOKEN_FIELDS.iter().find_map(|field| {
        body.get(field)
            .and_then(serde_json::Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_owned)
    })
}
