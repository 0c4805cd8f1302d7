//! Top-level orchestration: `Sampler → ROI+Preproc → OCR → Parser →
//! Detector → {events}`, then `{events} + video → Assembler →
//! {clips, supercut}` (spec §2, §6's conceptual `run` entry point).

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use boundarycam_assembler::{Assembler, AssemblyOutput, ClipPadding, MediaTool};
use boundarycam_detect::{Event, EventDetector, Observation};
use boundarycam_ocr::ScoreReader;
use boundarycam_vision::{estimate_sample_count, extract_and_preprocess, video_stem, FrameSampler, SamplerConfig};

use crate::error::Result;
use crate::progress::{ProgressCounters, ProgressSink, Stage};
use crate::roi_config::RoiConfig;
use crate::run_config::RunConfig;

/// The fraction of processed frames that, if OCR failed to produce a
/// score on them, triggers a caller-visible warning (spec §7).
const OCR_FAILURE_WARNING_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub events: Vec<Event>,
    pub clip_paths: Vec<PathBuf>,
    pub supercut_path: Option<PathBuf>,
    pub counters: ProgressCounters,
}

/// Drives one end-to-end run over a single video. Owns no state across
/// calls to [`Pipeline::run`]; every call is independent, which is what
/// makes determinism (spec §5) checkable by running twice.
pub struct Pipeline<R: ScoreReader, T: MediaTool> {
    reader: R,
    assembler: Assembler<T>,
}

impl<R: ScoreReader, T: MediaTool> Pipeline<R, T> {
    pub fn new(reader: R, media_tool: T, run_config: &RunConfig, container_ext: impl Into<String>) -> Self {
        let padding = ClipPadding {
            before_seconds: run_config.padding_before,
            after_seconds: run_config.padding_after,
        };
        Self {
            reader,
            assembler: Assembler::new(media_tool, padding, container_ext),
        }
    }

    pub fn run(
        &mut self,
        source_path: &Path,
        roi_config: &RoiConfig,
        run_config: &RunConfig,
        output_dir: &Path,
        progress: &mut dyn ProgressSink,
        mut is_cancelled: impl FnMut() -> bool,
    ) -> Result<RunOutput> {
        let sampler_config = SamplerConfig {
            start_time_seconds: run_config.start_time_seconds,
            sample_interval_seconds: run_config.sample_interval_seconds,
            max_frames: run_config.max_frames,
        };

        let expected_samples = estimate_sample_count(source_path, sampler_config);
        let sampler = FrameSampler::open(source_path, sampler_config)?;

        let mut detector = EventDetector::new();
        let mut events = Vec::new();
        let mut counters = ProgressCounters::default();

        for sample in sampler {
            if is_cancelled() {
                info!("run cancelled after {} frames", counters.frames_processed);
                break;
            }
            let frame = sample?;
            counters.frames_processed += 1;

            let percent = match expected_samples {
                Some(total) if total > 0 => {
                    (counters.frames_processed as f32 / total as f32 * 100.0).min(99.0)
                }
                _ => 0.0,
            };
            progress.progress(Stage::Sampling, percent, counters);

            let score_roi = extract_and_preprocess(
                &frame.pixels,
                frame.width,
                frame.height,
                roi_config.score_rect(),
            )?;
            let overs_roi = extract_and_preprocess(
                &frame.pixels,
                frame.width,
                frame.height,
                roi_config.overs_rect(),
            )?;

            let prev_wickets = detector.last_wickets();
            let (score, _confidence, _raw_text) = self.reader.read_score(&score_roi, prev_wickets)?;
            let overs = self.reader.read_overs(&overs_roi)?;

            if score.is_some() {
                counters.ocr_success += 1;
            } else {
                counters.ocr_fail += 1;
            }

            let mut obs = Observation::new(frame.timestamp_seconds);
            obs.score = score;
            obs.overs = overs;

            if let Some(event) = detector.observe(&obs) {
                counters.events += 1;
                events.push(event);
            }

            progress.progress(Stage::Ocr, percent, counters);
        }
        progress.progress(Stage::Sampling, 100.0, counters);
        progress.progress(Stage::Ocr, 100.0, counters);

        if counters.frames_processed > 0 {
            let failure_rate = counters.ocr_fail as f64 / counters.frames_processed as f64;
            if failure_rate >= OCR_FAILURE_WARNING_THRESHOLD {
                warn!(
                    "high OCR failure rate: {:.0}% of {} frames",
                    failure_rate * 100.0,
                    counters.frames_processed
                );
            }
        }

        let stem = video_stem(source_path);
        let stem = stem.to_string_lossy();

        progress.progress(Stage::Assembling, 0.0, counters);
        let AssemblyOutput {
            clip_paths,
            supercut_path,
        } = self
            .assembler
            .assemble(&events, source_path, &stem, output_dir, &mut is_cancelled)?;
        counters.clips = clip_paths.len() as u64;
        progress.progress(Stage::Assembling, 100.0, counters);

        Ok(RunOutput {
            events,
            clip_paths,
            supercut_path,
            counters,
        })
    }
}
