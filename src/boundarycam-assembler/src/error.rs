use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssemblerError {
    #[error("failed to create output directory {0:?}: {1}")]
    OutputDirUnavailable(std::path::PathBuf, #[source] std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AssemblerError>;
