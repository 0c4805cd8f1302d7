use thiserror::Error;

/// Fatal-to-a-run failures (spec §7, category 1). Per-frame and per-clip
/// failures are recoverable and never surface as a `CoreError`; they are
/// only reflected in progress counters.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Vision(#[from] boundarycam_vision::VisionError),

    #[error(transparent)]
    Ocr(#[from] boundarycam_ocr::OcrError),

    #[error(transparent)]
    Assembler(#[from] boundarycam_assembler::AssemblerError),

    #[error("ROI config file malformed: {0}")]
    RoiConfigMalformed(#[from] serde_json::Error),

    #[error("run config file malformed: {0}")]
    RunConfigMalformed(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
