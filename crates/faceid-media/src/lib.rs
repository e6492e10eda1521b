//! faceid-media — Media abstraction for live camera capture.
//!
//! Defines the camera collaborator traits and the [`ActiveCamera`]
//! ownership guard that guarantees tracks are stopped on every exit path.

pub mod camera;
pub mod frame;

pub use camera::{ActiveCamera, CameraError, CameraStream, MediaSource};
pub use frame::Frame;
