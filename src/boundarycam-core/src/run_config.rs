//! Run configuration: the recognized options from spec §6, loadable from
//! TOML with the same per-field `#[serde(default = "...")]` pattern
//! `test_config::TestConfig` uses.

use std::path::Path;

use serde::{Deserialize, Serialize};

fn default_sample_interval() -> f64 {
    1.0
}
fn default_start_time() -> f64 {
    0.0
}
fn default_min_confidence() -> f32 {
    0.4
}
fn default_padding_before() -> f64 {
    12.0
}
fn default_padding_after() -> f64 {
    5.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Frames-per-decision cadence.
    #[serde(default = "default_sample_interval")]
    pub sample_interval_seconds: f64,

    /// Seek offset into the source video.
    #[serde(default = "default_start_time")]
    pub start_time_seconds: f64,

    /// Optional hard cap on sampled frames, for testing.
    #[serde(default)]
    pub max_frames: Option<u64>,

    /// OCR mean-confidence gate.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,

    /// Capability hint for the OCR recognizer; the core itself never
    /// branches on this, it is forwarded to `WindowsScoreReader::new`.
    #[serde(default)]
    pub use_gpu: bool,

    /// Clip padding in seconds, before and after the event timestamp.
    #[serde(default = "default_padding_before")]
    pub padding_before: f64,
    #[serde(default = "default_padding_after")]
    pub padding_after: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sample_interval_seconds: default_sample_interval(),
            start_time_seconds: default_start_time(),
            max_frames: None,
            min_confidence: default_min_confidence(),
            use_gpu: false,
            padding_before: default_padding_before(),
            padding_after: default_padding_after(),
        }
    }
}

impl RunConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.sample_interval_seconds, 1.0);
        assert_eq!(cfg.start_time_seconds, 0.0);
        assert_eq!(cfg.max_frames, None);
        assert_eq!(cfg.min_confidence, 0.4);
        assert!(!cfg.use_gpu);
        assert_eq!(cfg.padding_before, 12.0);
        assert_eq!(cfg.padding_after, 5.0);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg: RunConfig = toml::from_str("min_confidence = 0.6\n").unwrap();
        assert_eq!(cfg.min_confidence, 0.6);
        assert_eq!(cfg.sample_interval_seconds, 1.0);
    }
}
