//! Camera access and stream ownership.
//!
//! The capture subsystem itself (getUserMedia, V4L2, ...) sits behind
//! [`MediaSource`]. [`ActiveCamera`] is the only owner of a granted stream
//! and stops every track when it is stopped or dropped, so a session can
//! never leak camera access on an early return or cancellation.

use crate::frame::Frame;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("device busy")]
    DeviceBusy,
    #[error("capture failed: {0}")]
    CaptureFailed(String),
    #[error("stream already stopped")]
    Stopped,
}

/// Grants access to a live camera stream.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn request_camera_stream(&self) -> Result<Box<dyn CameraStream>, CameraError>;
}

/// A granted live video stream.
#[async_trait]
pub trait CameraStream: Send {
    /// Current video frame.
    async fn next_frame(&mut self) -> Result<Frame, CameraError>;

    /// Stop every track of the stream. Must be idempotent.
    fn stop_all_tracks(&mut self);
}

/// Exclusive handle to a granted camera stream.
pub struct ActiveCamera {
    stream: Option<Box<dyn CameraStream>>,
    frames_read: u64,
}

impl ActiveCamera {
    /// Request a stream from `source` and take ownership of it.
    pub async fn acquire(source: &dyn MediaSource) -> Result<Self, CameraError> {
        let stream = source.request_camera_stream().await?;
        tracing::info!("camera stream granted");
        Ok(Self::from_stream(stream))
    }

    pub fn from_stream(stream: Box<dyn CameraStream>) -> Self {
        Self {
            stream: Some(stream),
            frames_read: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    pub async fn next_frame(&mut self) -> Result<Frame, CameraError> {
        let stream = self.stream.as_mut().ok_or(CameraError::Stopped)?;
        let frame = stream.next_frame().await?;
        self.frames_read += 1;
        Ok(frame)
    }

    /// Stop all tracks. Safe to call more than once.
    pub fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_all_tracks();
            tracing::info!(frames = self.frames_read, "camera stream stopped");
        }
    }
}

impl Drop for ActiveCamera {
    fn drop(&mut self) {
        self.stop();
    }
}
