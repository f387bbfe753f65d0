//! Operator confidence threshold, read live from the shared table.
//!
//! The driver-station dashboard writes the threshold as text into a single
//! shared-table key. It is resolved once per frame and never cached, so the
//! operator can tune detection live while the robot runs.

use crate::table::SharedTable;

/// Dashboard key the operator writes the threshold into.
pub const THRESHOLD_KEY: &str = "SmartDashboard/DB/String 3";

/// Fallback when the key is missing or unparseable.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Resolves the operator-supplied confidence threshold.
#[derive(Clone, Copy, Debug)]
pub struct ThresholdResolver {
    default: f64,
}

impl ThresholdResolver {
    pub fn new(default: f64) -> Self {
        Self { default }
    }

    /// Seed the dashboard key so the operator sees the current default at
    /// startup. A failed seed is not fatal; the per-frame read falls back to
    /// the default anyway.
    pub fn seed(&self, table: &mut dyn SharedTable) {
        if let Err(e) = table.put_string(THRESHOLD_KEY, &self.default.to_string()) {
            log::warn!("failed to seed confidence threshold: {}", e);
        }
    }

    /// Read and parse the threshold. Missing key or parse failure falls back
    /// to the default. The numeric range is intentionally not validated: an
    /// out-of-range value passes through to the detector unchanged.
    pub fn resolve(&self, table: &dyn SharedTable) -> f64 {
        match table.get_string(THRESHOLD_KEY) {
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(value) => value,
                Err(_) => {
                    log::debug!(
                        "unparseable confidence threshold {:?}, using default {}",
                        raw,
                        self.default
                    );
                    self.default
                }
            },
            None => self.default,
        }
    }
}

impl Default for ThresholdResolver {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE)
    }
}
