//! Opaque progress reporting used by long-running pipeline stages
//! (spec §4.7).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Sampling,
    Ocr,
    Assembling,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Sampling => "sampling",
            Stage::Ocr => "ocr",
            Stage::Assembling => "assembling",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressCounters {
    pub frames_processed: u64,
    pub ocr_success: u64,
    pub ocr_fail: u64,
    pub events: u64,
    pub clips: u64,
}

/// Receives progress callbacks. Calls must be monotone non-decreasing in
/// `percent` within a stage (spec §4.7); implementations need not enforce
/// this themselves, callers are expected to uphold it.
pub trait ProgressSink {
    fn progress(&mut self, stage: Stage, percent: f32, counters: ProgressCounters);
}

/// Discards all progress callbacks.
#[derive(Debug, Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn progress(&mut self, _stage: Stage, _percent: f32, _counters: ProgressCounters) {}
}

/// Logs progress via `tracing`, at most once per whole percentage point
/// per stage to avoid flooding logs on short, fast-sampled videos.
#[derive(Debug, Default)]
pub struct LoggingProgressSink {
    last_logged_percent: Option<(Stage, u32)>,
}

impl ProgressSink for LoggingProgressSink {
    fn progress(&mut self, stage: Stage, percent: f32, counters: ProgressCounters) {
        let bucket = percent.round() as u32;
        if self.last_logged_percent == Some((stage, bucket)) {
            return;
        }
        self.last_logged_percent = Some((stage, bucket));
        tracing::info!(
            "{stage}: {bucket}% (frames={}, ocr_ok={}, ocr_fail={}, events={}, clips={})",
            counters.frames_processed,
            counters.ocr_success,
            counters.ocr_fail,
            counters.events,
            counters.clips,
        );
    }
}
