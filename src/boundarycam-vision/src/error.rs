use thiserror::Error;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("video source unreadable: {0}")]
    SourceUnreadable(String),

    #[error("video has zero or unknown frame rate")]
    ZeroFrameRate,

    #[error("failed to spawn ffmpeg: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("ffmpeg exited with status {0:?}")]
    FfmpegFailed(Option<i32>),

    #[error("failed to run ffprobe: {0}")]
    ProbeFailed(String),

    #[error("unexpected frame buffer size: got {got}, expected {expected}")]
    UnexpectedFrameSize { got: usize, expected: usize },

    #[error("opencv error: {0}")]
    OpenCv(#[from] opencv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VisionError>;
