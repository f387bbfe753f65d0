use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ingest::CameraConfig;
use crate::slots::CapacityMap;
use crate::threshold::DEFAULT_CONFIDENCE;

const DEFAULT_CAMERA_URL: &str = "stub://camera0";
const DEFAULT_CAMERA_FPS: u32 = 30;
const DEFAULT_CAMERA_WIDTH: u32 = 640;
const DEFAULT_CAMERA_HEIGHT: u32 = 480;
const DEFAULT_WARMUP_MS: u64 = 2_000;
const DEFAULT_HATCH_SLOTS: usize = 3;
const DEFAULT_BALL_SLOTS: usize = 3;
const DEFAULT_TAPE_SLOTS: usize = 6;

#[derive(Debug, Deserialize, Default)]
struct BridgeConfigFile {
    camera: Option<CameraConfigFile>,
    slots: Option<SlotsConfigFile>,
    confidence: Option<ConfidenceConfigFile>,
    warmup_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    url: Option<String>,
    target_fps: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct SlotsConfigFile {
    hatch: Option<usize>,
    ball: Option<usize>,
    tape: Option<usize>,
    reset_all_trailing: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct ConfidenceConfigFile {
    default: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub camera: CameraConfig,
    pub capacities: CapacityMap,
    /// `false` keeps the legacy deactivate-first-unused-only behavior.
    pub reset_all_trailing_slots: bool,
    pub default_confidence: f64,
    pub warmup: Duration,
}

impl BridgeConfig {
    /// Load from the file named by `VISION_CONFIG` (if any), then apply env
    /// overrides, then validate.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Same as `load`, with an explicit config path taking precedence over
    /// the `VISION_CONFIG` env var.
    pub fn load_from(explicit_path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var("VISION_CONFIG").ok().map(PathBuf::from);
        let path = explicit_path.map(Path::to_path_buf).or(env_path);
        let file_cfg = match path.as_deref() {
            Some(path) => Some(read_config_file(path)?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: BridgeConfigFile) -> Self {
        let camera = CameraConfig {
            url: file
                .camera
                .as_ref()
                .and_then(|camera| camera.url.clone())
                .unwrap_or_else(|| DEFAULT_CAMERA_URL.to_string()),
            target_fps: file
                .camera
                .as_ref()
                .and_then(|camera| camera.target_fps)
                .unwrap_or(DEFAULT_CAMERA_FPS),
            width: file
                .camera
                .as_ref()
                .and_then(|camera| camera.width)
                .unwrap_or(DEFAULT_CAMERA_WIDTH),
            height: file
                .camera
                .as_ref()
                .and_then(|camera| camera.height)
                .unwrap_or(DEFAULT_CAMERA_HEIGHT),
        };
        let capacities = CapacityMap::new(
            file.slots
                .as_ref()
                .and_then(|slots| slots.hatch)
                .unwrap_or(DEFAULT_HATCH_SLOTS),
            file.slots
                .as_ref()
                .and_then(|slots| slots.ball)
                .unwrap_or(DEFAULT_BALL_SLOTS),
            file.slots
                .as_ref()
                .and_then(|slots| slots.tape)
                .unwrap_or(DEFAULT_TAPE_SLOTS),
        );
        let reset_all_trailing_slots = file
            .slots
            .and_then(|slots| slots.reset_all_trailing)
            .unwrap_or(false);
        let default_confidence = file
            .confidence
            .and_then(|confidence| confidence.default)
            .unwrap_or(DEFAULT_CONFIDENCE);
        let warmup = Duration::from_millis(file.warmup_ms.unwrap_or(DEFAULT_WARMUP_MS));
        Self {
            camera,
            capacities,
            reset_all_trailing_slots,
            default_confidence,
            warmup,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("VISION_CAMERA_URL") {
            if !url.trim().is_empty() {
                self.camera.url = url;
            }
        }
        if let Ok(confidence) = std::env::var("VISION_DEFAULT_CONFIDENCE") {
            self.default_confidence = confidence
                .parse()
                .map_err(|_| anyhow!("VISION_DEFAULT_CONFIDENCE must be a number"))?;
        }
        if let Ok(reset) = std::env::var("VISION_RESET_TRAILING_SLOTS") {
            self.reset_all_trailing_slots = match reset.trim() {
                "1" | "true" => true,
                "0" | "false" => false,
                other => {
                    return Err(anyhow!(
                        "VISION_RESET_TRAILING_SLOTS must be true/false, got {:?}",
                        other
                    ))
                }
            };
        }
        if let Ok(warmup) = std::env::var("VISION_WARMUP_MS") {
            let ms: u64 = warmup
                .parse()
                .map_err(|_| anyhow!("VISION_WARMUP_MS must be an integer number of ms"))?;
            self.warmup = Duration::from_millis(ms);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for category in crate::slots::Category::ALL {
            if self.capacities.capacity(category) == 0 {
                return Err(anyhow!("{} slot capacity must be greater than zero", category));
            }
        }
        if !(0.0..=1.0).contains(&self.default_confidence) {
            return Err(anyhow!(
                "default confidence must be within [0, 1], got {}",
                self.default_confidence
            ));
        }
        if self.camera.target_fps == 0 {
            return Err(anyhow!("camera target_fps must be at least 1"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<BridgeConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
