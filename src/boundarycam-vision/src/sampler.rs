//! Lazy, finite, non-restartable frame sampling over a source video.
//!
//! Grounded on the subprocess idiom in `VideoEncoder::start_ffmpeg_pipe`
//! (long-lived piped ffmpeg process) and
//! `Indexer::extract_frame_from_video_static` (raw RGBA stdout reading,
//! ffprobe dimension fallback) from the teacher repo, combined into a
//! single long-lived decode pipe rather than one ffmpeg invocation per
//! frame.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::error::{Result, VisionError};

/// One decoded-and-kept frame: its absolute index in the source video, its
/// timestamp derived from that index and the source fps, and its raw
/// RGBA pixel buffer.
pub struct SampledFrame {
    pub frame_index: u64,
    pub timestamp_seconds: f64,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

struct VideoInfo {
    fps: f64,
    width: u32,
    height: u32,
}

fn probe_video(video_path: &Path) -> Result<VideoInfo> {
    let output = Command::new("ffprobe")
        .arg("-v")
        .arg("error")
        .arg("-select_streams")
        .arg("v:0")
        .arg("-show_entries")
        .arg("stream=width,height,r_frame_rate")
        .arg("-of")
        .arg("csv=p=0")
        .arg(video_path)
        .output()
        .map_err(|e| VisionError::ProbeFailed(e.to_string()))?;

    if !output.status.success() {
        return Err(VisionError::SourceUnreadable(format!(
            "ffprobe exited with status {:?}",
            output.status.code()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.lines().next().unwrap_or_default();
    let parts: Vec<&str> = line.trim().split(',').collect();
    if parts.len() != 3 {
        return Err(VisionError::ProbeFailed(format!(
            "invalid ffprobe output: {}",
            line
        )));
    }

    let width: u32 = parts[0]
        .parse()
        .map_err(|_| VisionError::ProbeFailed(format!("bad width: {}", parts[0])))?;
    let height: u32 = parts[1]
        .parse()
        .map_err(|_| VisionError::ProbeFailed(format!("bad height: {}", parts[1])))?;
    let fps = parse_frame_rate(parts[2])?;

    if fps <= 0.0 {
        return Err(VisionError::ZeroFrameRate);
    }

    Ok(VideoInfo { fps, width, height })
}

/// Parses ffprobe's `r_frame_rate`, a rational like `"30000/1001"` or `"25/1"`.
fn parse_frame_rate(raw: &str) -> Result<f64> {
    let raw = raw.trim();
    if let Some((num, den)) = raw.split_once('/') {
        let num: f64 = num
            .parse()
            .map_err(|_| VisionError::ProbeFailed(format!("bad frame rate: {}", raw)))?;
        let den: f64 = den
            .parse()
            .map_err(|_| VisionError::ProbeFailed(format!("bad frame rate: {}", raw)))?;
        if den == 0.0 {
            return Err(VisionError::ZeroFrameRate);
        }
        Ok(num / den)
    } else {
        raw.parse()
            .map_err(|_| VisionError::ProbeFailed(format!("bad frame rate: {}", raw)))
    }
}

/// Configuration for [`FrameSampler::open`].
#[derive(Debug, Clone, Copy)]
pub struct SamplerConfig {
    pub start_time_seconds: f64,
    pub sample_interval_seconds: f64,
    pub max_frames: Option<u64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            start_time_seconds: 0.0,
            sample_interval_seconds: 1.0,
            max_frames: None,
        }
    }
}

/// Iterates sampled frames from a source video. Non-restartable: each
/// instance owns one decode subprocess, consumed once.
pub struct FrameSampler {
    child: Child,
    stdout: ChildStdout,
    width: u32,
    height: u32,
    fps: f64,
    frame_skip: u64,
    next_frame_index: u64,
    frames_yielded: u64,
    max_frames: Option<u64>,
    frame_byte_size: usize,
    finished: bool,
}

impl FrameSampler {
    /// Opens `video_path`, seeks to `config.start_time_seconds`, and
    /// prepares to iterate sampled frames.
    pub fn open(video_path: &Path, config: SamplerConfig) -> Result<Self> {
        let info = probe_video(video_path)?;

        let frame_skip = ((info.fps * config.sample_interval_seconds).round() as i64).max(1) as u64;
        let start_frame_index = (config.start_time_seconds * info.fps).round().max(0.0) as u64;

        let mut cmd = Command::new("ffmpeg");
        cmd.arg("-ss")
            .arg(format!("{:.3}", config.start_time_seconds))
            .arg("-i")
            .arg(video_path)
            .arg("-f")
            .arg("rawvideo")
            .arg("-pix_fmt")
            .arg("rgba")
            .arg("-")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        let mut child = cmd.spawn().map_err(VisionError::SpawnFailed)?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| VisionError::SourceUnreadable("failed to capture stdout".into()))?;

        Ok(Self {
            child,
            stdout,
            width: info.width,
            height: info.height,
            fps: info.fps,
            frame_skip,
            next_frame_index: start_frame_index,
            frames_yielded: 0,
            max_frames: config.max_frames,
            frame_byte_size: (info.width * info.height * 4) as usize,
            finished: false,
        })
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reads and discards `count` whole frames from the decode pipe.
    fn skip_frames(&mut self, count: u64) -> Result<bool> {
        let mut scratch = vec![0u8; self.frame_byte_size];
        for _ in 0..count {
            if !self.read_exact_frame(&mut scratch)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn read_exact_frame(&mut self, buf: &mut [u8]) -> Result<bool> {
        match self.stdout.read_exact(buf) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(VisionError::Io(e)),
        }
    }

    fn next_sample(&mut self) -> Result<Option<SampledFrame>> {
        if self.finished {
            return Ok(None);
        }
        if let Some(max) = self.max_frames {
            if self.frames_yielded >= max {
                self.finished = true;
                return Ok(None);
            }
        }

        // The first kept frame is the one right after the seek; subsequent
        // frames skip `frame_skip - 1` frames first.
        if self.frames_yielded > 0 && !self.skip_frames(self.frame_skip - 1)? {
            self.finished = true;
            return Ok(None);
        }

        let mut pixels = vec![0u8; self.frame_byte_size];
        if !self.read_exact_frame(&mut pixels)? {
            self.finished = true;
            return Ok(None);
        }

        let frame_index = self.next_frame_index;
        let timestamp_seconds = frame_index as f64 / self.fps;
        self.next_frame_index += self.frame_skip;
        self.frames_yielded += 1;

        Ok(Some(SampledFrame {
            frame_index,
            timestamp_seconds,
            width: self.width,
            height: self.height,
            pixels,
        }))
    }
}

impl Iterator for FrameSampler {
    type Item = Result<SampledFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_sample().transpose()
    }
}

impl Drop for FrameSampler {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Best-effort estimate of how many samples a run over `video_path` will
/// produce, for progress-percentage purposes only; never used for
/// correctness. Returns `None` if `ffprobe` can't report a duration.
pub fn estimate_sample_count(
    video_path: &Path,
    config: SamplerConfig,
) -> Option<u64> {
    let info = probe_video(video_path).ok()?;
    let output = Command::new("ffprobe")
        .arg("-v")
        .arg("error")
        .arg("-show_entries")
        .arg("format=duration")
        .arg("-of")
        .arg("csv=p=0")
        .arg(video_path)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let duration: f64 = String::from_utf8_lossy(&output.stdout).trim().parse().ok()?;
    let remaining = (duration - config.start_time_seconds).max(0.0);
    let frame_skip = ((info.fps * config.sample_interval_seconds).round() as i64).max(1) as f64;
    let interval_seconds = frame_skip / info.fps;
    if interval_seconds <= 0.0 {
        return None;
    }
    let estimated = (remaining / interval_seconds).ceil() as u64;
    Some(match config.max_frames {
        Some(max) => estimated.min(max),
        None => estimated,
    })
}

pub fn video_stem(video_path: &Path) -> PathBuf {
    video_path
        .file_stem()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("video"))
}
