//! Frame ingestion sources.
//!
//! The bridge owns its camera exclusively for the process lifetime. Only the
//! synthetic `stub://` backend is built in; real capture hardware sits
//! behind the `FrameSource` seam as an external collaborator.

mod camera;

use anyhow::Result;

use crate::frame::Frame;

pub use camera::{CameraConfig, CameraSource, CameraStats};

/// Capture collaborator.
///
/// A fault from `next_frame` is fatal to the frame loop: the loop drains and
/// terminates rather than attempting reconnection.
pub trait FrameSource {
    fn open(&mut self) -> Result<()>;
    fn next_frame(&mut self) -> Result<Frame>;
    fn close(&mut self);
}
