//! Display/streaming seam.
//!
//! The original deployment serves annotated frames to a browser; here the
//! viewer sits behind the `Streamer` trait as an external collaborator. The
//! built-in `ConsoleStreamer` logs overlay text and carries the cooperative
//! exit flag the daemon wires to SIGINT.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;

use crate::frame::Frame;

/// Display/streaming collaborator.
pub trait Streamer {
    /// Push a frame and its overlay text lines to the viewer.
    fn send(&mut self, frame: &Frame, lines: &[String]) -> Result<()>;

    /// Polled once per frame by the loop driver. Cooperative only: an
    /// operator cannot interrupt mid-frame.
    fn exit_requested(&self) -> bool;

    /// Release the stream handle.
    fn close(&mut self);
}

/// Streamer that logs overlay text instead of serving video.
pub struct ConsoleStreamer {
    exit: Arc<AtomicBool>,
    frames_sent: u64,
}

impl ConsoleStreamer {
    pub fn new() -> Self {
        Self::with_exit_flag(Arc::new(AtomicBool::new(false)))
    }

    pub fn with_exit_flag(exit: Arc<AtomicBool>) -> Self {
        Self {
            exit,
            frames_sent: 0,
        }
    }

    /// Shared exit flag, for wiring to a SIGINT handler.
    pub fn exit_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.exit)
    }
}

impl Default for ConsoleStreamer {
    fn default() -> Self {
        Self::new()
    }
}

impl Streamer for ConsoleStreamer {
    fn send(&mut self, frame: &Frame, lines: &[String]) -> Result<()> {
        self.frames_sent += 1;
        log::debug!(
            "frame {} ({}x{}): {}",
            frame.seq,
            frame.width,
            frame.height,
            lines.join(" | ")
        );
        Ok(())
    }

    fn exit_requested(&self) -> bool {
        self.exit.load(Ordering::Relaxed)
    }

    fn close(&mut self) {
        log::info!("streamer closed after {} frames", self.frames_sent);
    }
}

/// Test double that requests exit after a fixed number of frames.
pub struct ScriptedStreamer {
    exit_after: u64,
    frames_sent: u64,
    closed: bool,
    sent_lines: Vec<Vec<String>>,
}

impl ScriptedStreamer {
    pub fn exit_after(frames: u64) -> Self {
        Self {
            exit_after: frames,
            frames_sent: 0,
            closed: false,
            sent_lines: Vec::new(),
        }
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn sent_lines(&self) -> &[Vec<String>] {
        &self.sent_lines
    }
}

impl Streamer for ScriptedStreamer {
    fn send(&mut self, _frame: &Frame, lines: &[String]) -> Result<()> {
        self.frames_sent += 1;
        self.sent_lines.push(lines.to_vec());
        Ok(())
    }

    fn exit_requested(&self) -> bool {
        self.frames_sent >= self.exit_after
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
