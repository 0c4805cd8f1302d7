use std::path::PathBuf;

use boundarycam_detect::Event;

/// Padding applied around an event when deriving its clip window.
#[derive(Debug, Clone, Copy)]
pub struct ClipPadding {
    pub before_seconds: f64,
    pub after_seconds: f64,
}

impl Default for ClipPadding {
    fn default() -> Self {
        Self {
            before_seconds: 12.0,
            after_seconds: 5.0,
        }
    }
}

/// A derived per-event clip request: `start_seconds = max(0, event.ts -
/// before)`, `duration_seconds = before + after`.
#[derive(Debug, Clone)]
pub struct ClipSpec {
    pub event: Event,
    pub source_path: PathBuf,
    pub start_seconds: f64,
    pub duration_seconds: f64,
}

impl ClipSpec {
    pub fn new(event: Event, source_path: PathBuf, padding: ClipPadding) -> Self {
        let start_seconds = (event.timestamp_seconds - padding.before_seconds).max(0.0);
        let duration_seconds = padding.before_seconds + padding.after_seconds;
        Self {
            event,
            source_path,
            start_seconds,
            duration_seconds,
        }
    }
}

/// `{video_stem}_clip_{index:03}_{KIND}_{ts_int}.{container_ext}`, `index`
/// 1-based in emission order, `ts_int` the floor of the event timestamp.
pub fn clip_filename(video_stem: &str, index: usize, event: &Event, container_ext: &str) -> String {
    format!(
        "{}_clip_{:03}_{}_{}.{}",
        video_stem,
        index,
        event.kind.as_str(),
        event.timestamp_seconds.floor() as i64,
        container_ext
    )
}
