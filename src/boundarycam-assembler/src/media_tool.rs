//! Assembler isolation (spec §9): the clip step is an I/O-bound external
//! process shell, kept behind [`MediaTool`] so tests can replace it with a
//! call-recording fake instead of running a real encoder.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::error::Result;

/// Drives a streaming media tool capable of stream-copy trimming and
/// concat-demuxer concatenation.
pub trait MediaTool {
    /// Stream-copy-trims `source` starting at `start_seconds` for
    /// `duration_seconds` into `output`. Returns whether the tool
    /// succeeded; a `false` result is a clip-level failure, not a
    /// pipeline failure (spec §4.6/§7).
    fn trim_clip(
        &mut self,
        source: &Path,
        start_seconds: f64,
        duration_seconds: f64,
        output: &Path,
    ) -> Result<bool>;

    /// Concatenates `inputs` in order into `output` via the tool's concat
    /// demuxer against `list_file`. Returns whether concatenation
    /// succeeded.
    fn concat(&mut self, inputs: &[PathBuf], output: &Path, list_file: &Path) -> Result<bool>;
}

/// Drives `ffmpeg` as an external subprocess, ported from `extract_clips`
/// / `create_supercut` in the original Python implementation and from the
/// subprocess idiom in `memoire-processing::encoder::VideoEncoder`.
#[derive(Debug, Default)]
pub struct FfmpegMediaTool;

impl MediaTool for FfmpegMediaTool {
    fn trim_clip(
        &mut self,
        source: &Path,
        start_seconds: f64,
        duration_seconds: f64,
        output: &Path,
    ) -> Result<bool> {
        let mut cmd = Command::new("ffmpeg");
        cmd.arg("-ss")
            .arg(format!("{:.3}", start_seconds))
            .arg("-i")
            .arg(source)
            .arg("-t")
            .arg(format!("{:.3}", duration_seconds))
            .arg("-c")
            .arg("copy")
            .arg("-avoid_negative_ts")
            .arg("1")
            .arg("-y")
            .arg(output);

        debug!("running ffmpeg clip trim: {:?}", cmd);
        let result = cmd.output()?;
        if !result.status.success() {
            warn!(
                "ffmpeg clip extraction failed: {}",
                String::from_utf8_lossy(&result.stderr)
            );
            return Ok(false);
        }
        Ok(true)
    }

    fn concat(&mut self, inputs: &[PathBuf], output: &Path, list_file: &Path) -> Result<bool> {
        if inputs.is_empty() {
            return Ok(false);
        }

        let mut list_contents = String::new();
        for clip in inputs {
            let absolute = clip.canonicalize().unwrap_or_else(|_| clip.clone());
            list_contents.push_str(&format!("file '{}'\n", absolute.display()));
        }
        std::fs::write(list_file, list_contents)?;

        let mut cmd = Command::new("ffmpeg");
        cmd.arg("-f")
            .arg("concat")
            .arg("-safe")
            .arg("0")
            .arg("-i")
            .arg(list_file)
            .arg("-c")
            .arg("copy")
            .arg("-y")
            .arg(output);

        debug!("running ffmpeg concat: {:?}", cmd);
        let result = cmd.output()?;

        if result.status.success() {
            let _ = std::fs::remove_file(list_file);
            Ok(true)
        } else {
            warn!(
                "ffmpeg concat failed: {}",
                String::from_utf8_lossy(&result.stderr)
            );
            Ok(false)
        }
    }
}

/// Checks whether `ffmpeg` is callable, ported from
/// `memoire-processing::encoder::check_ffmpeg`.
pub fn check_ffmpeg() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Records the ordered `(source, start, duration, output)` quadruples
    /// it was asked to trim and the clip lists it was asked to concat,
    /// per spec §9's "assembler isolation" design note, without touching
    /// the filesystem or spawning a real encoder.
    #[derive(Debug, Default)]
    pub struct RecordingMediaTool {
        pub trim_calls: Vec<(PathBuf, f64, f64, PathBuf)>,
        pub concat_calls: Vec<(Vec<PathBuf>, PathBuf)>,
        fail_trim_indices: Vec<usize>,
        fail_concat: bool,
    }

    impl RecordingMediaTool {
        pub fn new_all_succeed() -> Self {
            Self::default()
        }

        pub fn fail_indices(indices: Vec<usize>) -> Self {
            Self {
                fail_trim_indices: indices,
                ..Self::default()
            }
        }

        pub fn concat_fails() -> Self {
            Self {
                fail_concat: true,
                ..Self::default()
            }
        }
    }

    impl MediaTool for RecordingMediaTool {
        fn trim_clip(
            &mut self,
            source: &Path,
            start_seconds: f64,
            duration_seconds: f64,
            output: &Path,
        ) -> Result<bool> {
            let index = self.trim_calls.len();
            self.trim_calls.push((
                source.to_path_buf(),
                start_seconds,
                duration_seconds,
                output.to_path_buf(),
            ));
            Ok(!self.fail_trim_indices.contains(&index))
        }

        fn concat(&mut self, inputs: &[PathBuf], output: &Path, _list_file: &Path) -> Result<bool> {
            self.concat_calls.push((inputs.to_vec(), output.to_path_buf()));
            Ok(!self.fail_concat)
        }
    }
}
