use serde::{Deserialize, Serialize};

/// Default maximum Euclidean distance for two descriptors to count as the same face.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.6;

/// Face descriptor: a fixed-length embedding of the most prominent face in an image
/// (128-dimensional for the face-api recognition net).
///
/// Immutable once constructed; the values are only reachable through a slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    values: Vec<f32>,
}

impl Descriptor {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Compute Euclidean distance between two descriptors.
    ///
    /// Callers are expected to check [`len`](Self::len) first; extra
    /// trailing values on the longer descriptor are ignored.
    pub fn euclidean_distance(&self, other: &Descriptor) -> f32 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

impl From<Vec<f32>> for Descriptor {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

/// Result of comparing a live descriptor against the reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    pub matched: bool,
    /// Euclidean distance between probe and reference.
    pub distance: f32,
}

/// Distance-threshold matcher.
///
/// A probe matches when its distance to the reference is strictly below the
/// threshold; a distance equal to the threshold is a non-match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EuclideanMatcher {
    threshold: f32,
}

impl EuclideanMatcher {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn compare(&self, probe: &Descriptor, reference: &Descriptor) -> MatchResult {
        let distance = probe.euclidean_distance(reference);
        MatchResult {
            matched: distance < self.threshold,
            distance,
        }
    }
}

impl Default for EuclideanMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_THRESHOLD)
    }
}
