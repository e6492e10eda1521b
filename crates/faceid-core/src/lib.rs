//! faceid-core — Face descriptors and distance matching.
//!
//! Descriptors come from an external detect-and-describe collaborator
//! ([`DescriptorExtractor`]); this crate owns the vector type and the
//! Euclidean threshold decision.

pub mod extractor;
pub mod types;

pub use extractor::{DescriptorExtractor, ExtractorError};
pub use types::{Descriptor, EuclideanMatcher, MatchResult, DEFAULT_MATCH_THRESHOLD};
