use anyhow::{bail, Result};

use crate::frame::Frame;
use crate::ingest::FrameSource;

/// Configuration for a camera source.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    /// Device URL. `stub://` selects the synthetic backend.
    pub url: String,
    /// Target frame rate, advisory for the synthetic backend.
    pub target_fps: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            url: "stub://camera0".to_string(),
            target_fps: 30,
            width: 640,
            height: 480,
        }
    }
}

/// Camera source with a deterministic synthetic backend for `stub://` URLs.
pub struct CameraSource {
    config: CameraConfig,
    frame_count: u64,
    /// Simulated scene state; bumps occasionally so detections shift.
    scene_state: u8,
    opened: bool,
}

impl CameraSource {
    pub fn new(config: CameraConfig) -> Result<Self> {
        if !config.url.starts_with("stub://") {
            bail!(
                "camera url {} requires an external capture backend; only stub:// is built in",
                config.url
            );
        }
        Ok(Self {
            config,
            frame_count: 0,
            scene_state: 0,
            opened: false,
        })
    }

    pub fn stats(&self) -> CameraStats {
        CameraStats {
            frames_captured: self.frame_count,
            url: self.config.url.clone(),
        }
    }

    /// Generate synthetic pixel data.
    ///
    /// Fills the frame with a pattern mixing frame count, scene state, and
    /// position, so consecutive frames differ and the scene "changes" every
    /// 50 frames.
    fn generate_synthetic_pixels(&mut self) -> Vec<u8> {
        let pixel_count = (self.config.width * self.config.height * 3) as usize;

        if self.frame_count % 50 == 0 {
            self.scene_state = self.scene_state.wrapping_add(1);
        }

        let mut pixels = vec![0u8; pixel_count];
        for (i, pixel) in pixels.iter_mut().enumerate() {
            *pixel = ((i as u64 + self.frame_count + u64::from(self.scene_state)) % 256) as u8;
        }
        pixels
    }
}

impl FrameSource for CameraSource {
    fn open(&mut self) -> Result<()> {
        self.opened = true;
        log::info!("CameraSource: opened {} (synthetic)", self.config.url);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame> {
        if !self.opened {
            bail!("camera {} is not open", self.config.url);
        }
        self.frame_count += 1;
        let pixels = self.generate_synthetic_pixels();
        Ok(Frame::new(
            pixels,
            self.config.width,
            self.config.height,
            self.frame_count,
        ))
    }

    fn close(&mut self) {
        if self.opened {
            self.opened = false;
            log::info!(
                "CameraSource: closed {} after {} frames",
                self.config.url,
                self.frame_count
            );
        }
    }
}

/// Statistics for a camera source.
#[derive(Clone, Debug)]
pub struct CameraStats {
    pub frames_captured: u64,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub_config() -> CameraConfig {
        CameraConfig {
            url: "stub://test".to_string(),
            target_fps: 30,
            width: 64,
            height: 48,
        }
    }

    #[test]
    fn produces_frames_with_configured_size() -> Result<()> {
        let mut source = CameraSource::new(stub_config())?;
        source.open()?;

        let frame = source.next_frame()?;
        assert_eq!(frame.width, 64);
        assert_eq!(frame.height, 48);
        assert_eq!(frame.pixels.len(), 64 * 48 * 3);
        assert_eq!(frame.seq, 1);
        Ok(())
    }

    #[test]
    fn consecutive_frames_differ() -> Result<()> {
        let mut source = CameraSource::new(stub_config())?;
        source.open()?;

        let first = source.next_frame()?;
        let second = source.next_frame()?;
        assert_ne!(first.pixels, second.pixels);
        assert_eq!(second.seq, 2);
        Ok(())
    }

    #[test]
    fn rejects_non_stub_urls() {
        let config = CameraConfig {
            url: "v4l2:///dev/video0".to_string(),
            ..stub_config()
        };
        assert!(CameraSource::new(config).is_err());
    }

    #[test]
    fn reading_before_open_fails() -> Result<()> {
        let mut source = CameraSource::new(stub_config())?;
        assert!(source.next_frame().is_err());
        Ok(())
    }
}
