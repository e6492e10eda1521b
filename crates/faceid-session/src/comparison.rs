//! Live comparison loop.
//!
//! One detection per tick, awaited inline: a tick never starts while the
//! previous detection is still in flight, and dropping the future between
//! ticks abandons the loop without side effects.

use faceid_core::{Descriptor, DescriptorExtractor, EuclideanMatcher, ExtractorError};
use faceid_media::{ActiveCamera, CameraError};
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, Interval, MissedTickBehavior};

#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("frame capture failed: {0}")]
    Frame(#[from] CameraError),
    #[error("descriptor extraction failed: {0}")]
    Extraction(#[from] ExtractorError),
    #[error("descriptor length {live} does not match reference length {reference}")]
    DimensionMismatch { live: usize, reference: usize },
}

/// Evidence for a confirmed match.
#[derive(Debug, Clone, Copy)]
pub struct MatchEvidence {
    pub distance: f32,
    pub tick: u64,
}

pub struct ComparisonLoop {
    reference: Descriptor,
    matcher: EuclideanMatcher,
    interval: Interval,
    ticks: u64,
}

impl ComparisonLoop {
    /// The first tick fires one `period` after construction.
    pub fn new(reference: Descriptor, threshold: f32, period: Duration) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            reference,
            matcher: EuclideanMatcher::new(threshold),
            interval,
            ticks: 0,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Tick until a live descriptor falls under the threshold.
    ///
    /// Frames without a face are skipped. Any extractor or capture fault
    /// ends the loop with an error.
    pub async fn run_until_match(
        &mut self,
        extractor: &dyn DescriptorExtractor,
        camera: &mut ActiveCamera,
    ) -> Result<MatchEvidence, RecognitionError> {
        loop {
            self.interval.tick().await;
            self.ticks += 1;

            let frame = camera.next_frame().await?;
            let Some(live) = extractor.detect(&frame.image).await? else {
                tracing::debug!(tick = self.ticks, "no face in frame; skipping tick");
                continue;
            };

            if live.len() != self.reference.len() {
                return Err(RecognitionError::DimensionMismatch {
                    live: live.len(),
                    reference: self.reference.len(),
                });
            }

            let result = self.matcher.compare(&live, &self.reference);
            tracing::debug!(
                tick = self.ticks,
                distance = result.distance,
                threshold = self.matcher.threshold(),
                "compared live face"
            );

            if result.matched {
                tracing::info!(tick = self.ticks, distance = result.distance, "face matched");
                return Ok(MatchEvidence {
                    distance: result.distance,
                    tick: self.ticks,
                });
            }
        }
    }
}
