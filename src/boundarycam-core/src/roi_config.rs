//! ROI configuration, persisted as JSON with a fixed key set (spec §6).

use std::path::Path;

use serde::{Deserialize, Serialize};

use boundarycam_vision::Rect;

fn default_roi_x() -> i32 {
    216
}
fn default_roi_y() -> i32 {
    940
}
fn default_roi_width() -> i32 {
    170
}
fn default_roi_height() -> i32 {
    70
}
fn default_overs_roi_x() -> i32 {
    216
}
fn default_overs_roi_y() -> i32 {
    1010
}
fn default_overs_roi_width() -> i32 {
    100
}
fn default_overs_roi_height() -> i32 {
    40
}

/// The two fixed scoreboard rectangles, calibrated for 1080p broadcast.
/// Missing keys fall back to these defaults; the file is written back
/// with exactly these eight keys and two-space indentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiConfig {
    #[serde(default = "default_roi_x")]
    pub roi_x: i32,
    #[serde(default = "default_roi_y")]
    pub roi_y: i32,
    #[serde(default = "default_roi_width")]
    pub roi_width: i32,
    #[serde(default = "default_roi_height")]
    pub roi_height: i32,
    #[serde(default = "default_overs_roi_x")]
    pub overs_roi_x: i32,
    #[serde(default = "default_overs_roi_y")]
    pub overs_roi_y: i32,
    #[serde(default = "default_overs_roi_width")]
    pub overs_roi_width: i32,
    #[serde(default = "default_overs_roi_height")]
    pub overs_roi_height: i32,
}

impl Default for RoiConfig {
    fn default() -> Self {
        Self {
            roi_x: default_roi_x(),
            roi_y: default_roi_y(),
            roi_width: default_roi_width(),
            roi_height: default_roi_height(),
            overs_roi_x: default_overs_roi_x(),
            overs_roi_y: default_overs_roi_y(),
            overs_roi_width: default_overs_roi_width(),
            overs_roi_height: default_overs_roi_height(),
        }
    }
}

impl RoiConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let writer = std::fs::File::create(path)?;
        let mut serializer = serde_json::Serializer::with_formatter(
            writer,
            serde_json::ser::PrettyFormatter::with_indent(b"  "),
        );
        serde::Serialize::serialize(self, &mut serializer)?;
        Ok(())
    }

    pub fn score_rect(&self) -> Rect {
        Rect::new(self.roi_x, self.roi_y, self.roi_width, self.roi_height)
    }

    pub fn overs_rect(&self) -> Rect {
        Rect::new(
            self.overs_roi_x,
            self.overs_roi_y,
            self.overs_roi_width,
            self.overs_roi_height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_1080p_calibration() {
        let cfg = RoiConfig::default();
        assert_eq!(cfg.roi_x, 216);
        assert_eq!(cfg.roi_y, 940);
        assert_eq!(cfg.overs_roi_width, 100);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg: RoiConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, RoiConfig::default());
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = RoiConfig::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roi.json");
        cfg.save(&path).unwrap();
        let loaded = RoiConfig::from_file(&path).unwrap();
        assert_eq!(cfg, loaded);
    }
}
