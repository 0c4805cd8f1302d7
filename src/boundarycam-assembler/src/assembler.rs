use std::path::{Path, PathBuf};

use tracing::{info, warn};

use boundarycam_detect::Event;

use crate::error::{AssemblerError, Result};
use crate::media_tool::MediaTool;
use crate::spec::{clip_filename, ClipPadding, ClipSpec};

/// Output of a completed assembly run.
#[derive(Debug, Clone, Default)]
pub struct AssemblyOutput {
    pub clip_paths: Vec<PathBuf>,
    pub supercut_path: Option<PathBuf>,
}

/// Deterministically derives per-event clip specs and drives a
/// [`MediaTool`] to produce clips and a supercut. Clip indexing and
/// ordering follow emission order, per spec §5's ordering guarantees.
pub struct Assembler<T: MediaTool> {
    tool: T,
    padding: ClipPadding,
    container_ext: String,
}

impl<T: MediaTool> Assembler<T> {
    pub fn new(tool: T, padding: ClipPadding, container_ext: impl Into<String>) -> Self {
        Self {
            tool,
            padding,
            container_ext: container_ext.into(),
        }
    }

    /// Extracts a per-event clip for each event (skipping and logging
    /// failures) and concatenates the successful clips into a supercut.
    /// On cancellation between events, already-written clips are kept and
    /// no supercut is produced for the remaining, un-processed events.
    pub fn assemble(
        &mut self,
        events: &[Event],
        source_path: &Path,
        video_stem: &str,
        output_dir: &Path,
        mut is_cancelled: impl FnMut() -> bool,
    ) -> Result<AssemblyOutput> {
        std::fs::create_dir_all(output_dir)
            .map_err(|e| AssemblerError::OutputDirUnavailable(output_dir.to_path_buf(), e))?;

        info!(
            "extracting {} clips ({}s before, {}s after)",
            events.len(),
            self.padding.before_seconds,
            self.padding.after_seconds
        );

        let mut clip_paths = Vec::new();
        for (i, event) in events.iter().enumerate() {
            if is_cancelled() {
                info!("assembly cancelled after {} clips", clip_paths.len());
                return Ok(AssemblyOutput {
                    clip_paths,
                    supercut_path: None,
                });
            }

            let spec = ClipSpec::new(*event, source_path.to_path_buf(), self.padding);
            let filename = clip_filename(video_stem, i + 1, event, &self.container_ext);
            let output_path = output_dir.join(&filename);

            match self.tool.trim_clip(
                &spec.source_path,
                spec.start_seconds,
                spec.duration_seconds,
                &output_path,
            ) {
                Ok(true) => clip_paths.push(output_path),
                Ok(false) => warn!("clip extraction failed, skipping: {}", filename),
                Err(e) => warn!("clip extraction errored, skipping {}: {}", filename, e),
            }
        }

        if clip_paths.is_empty() {
            return Ok(AssemblyOutput {
                clip_paths,
                supercut_path: None,
            });
        }

        let supercut_path = output_dir.join(format!("{}_supercut.{}", video_stem, self.container_ext));
        let list_file = supercut_path.with_extension("txt");
        let supercut_path = match self.tool.concat(&clip_paths, &supercut_path, &list_file) {
            Ok(true) => Some(supercut_path),
            Ok(false) => {
                warn!("supercut concatenation failed; per-event clips remain");
                None
            }
            Err(e) => {
                warn!("supercut concatenation errored: {}", e);
                None
            }
        };

        Ok(AssemblyOutput {
            clip_paths,
            supercut_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media_tool::tests::RecordingMediaTool;
    use boundarycam_detect::{EventKind, ScoreState};
    use std::path::PathBuf;

    fn event(kind: EventKind, ts: f64) -> Event {
        Event {
            kind,
            timestamp_seconds: ts,
            score_before: ScoreState::resolved(100, 2),
            score_after: ScoreState::resolved(104, 2),
            overs_at_event: None,
        }
    }

    #[test]
    fn clips_ordered_and_indexed_by_emission_order() {
        let events = vec![event(EventKind::Four, 5.0), event(EventKind::Six, 20.0)];
        let tool = RecordingMediaTool::new_all_succeed();
        let mut assembler = Assembler::new(tool, ClipPadding::default(), "mp4");

        let out = assembler
            .assemble(
                &events,
                Path::new("/videos/match.mp4"),
                "match",
                Path::new("/out"),
                || false,
            )
            .unwrap();

        assert_eq!(out.clip_paths.len(), 2);
        assert!(out.clip_paths[0].to_string_lossy().contains("clip_001_FOUR_5"));
        assert!(out.clip_paths[1].to_string_lossy().contains("clip_002_SIX_20"));
        assert!(out.supercut_path.is_some());
        assert_eq!(
            assembler.tool.concat_calls[0].0,
            vec![out.clip_paths[0].clone(), out.clip_paths[1].clone()]
        );
    }

    #[test]
    fn failed_clip_is_skipped_but_pipeline_continues() {
        let events = vec![event(EventKind::Four, 5.0), event(EventKind::Six, 20.0)];
        let tool = RecordingMediaTool::fail_indices(vec![0]);
        let mut assembler = Assembler::new(tool, ClipPadding::default(), "mp4");

        let out = assembler
            .assemble(
                &events,
                Path::new("/videos/match.mp4"),
                "match",
                Path::new("/out"),
                || false,
            )
            .unwrap();

        assert_eq!(out.clip_paths.len(), 1);
        assert!(out.clip_paths[0].to_string_lossy().contains("clip_002_SIX"));
    }

    #[test]
    fn failed_concat_leaves_clips_but_no_supercut() {
        let events = vec![event(EventKind::Four, 5.0)];
        let tool = RecordingMediaTool::concat_fails();
        let mut assembler = Assembler::new(tool, ClipPadding::default(), "mp4");

        let out = assembler
            .assemble(
                &events,
                Path::new("/videos/match.mp4"),
                "match",
                Path::new("/out"),
                || false,
            )
            .unwrap();

        assert_eq!(out.clip_paths.len(), 1);
        assert_eq!(out.supercut_path, None);
    }

    #[test]
    fn cancellation_stops_without_supercut_but_keeps_written_clips() {
        let events = vec![
            event(EventKind::Four, 5.0),
            event(EventKind::Six, 20.0),
            event(EventKind::Wicket, 40.0),
        ];
        let tool = RecordingMediaTool::new_all_succeed();
        let mut assembler = Assembler::new(tool, ClipPadding::default(), "mp4");

        let mut calls = 0;
        let out = assembler
            .assemble(
                &events,
                Path::new("/videos/match.mp4"),
                "match",
                Path::new("/out"),
                || {
                    calls += 1;
                    calls > 1
                },
            )
            .unwrap();

        assert_eq!(out.clip_paths.len(), 1);
        assert_eq!(out.supercut_path, None);
    }

    #[allow(dead_code)]
    fn unused(_: PathBuf) {}
}
