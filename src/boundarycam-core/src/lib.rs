//! Orchestration, configuration, and CLI surface for the scoreboard
//! event detector and highlight assembler.

pub mod colored_logger;
pub mod csv_export;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod roi_config;
pub mod run_config;

pub use csv_export::save_events_csv;
pub use error::{CoreError, Result};
pub use pipeline::{Pipeline, RunOutput};
pub use progress::{LoggingProgressSink, NullProgressSink, ProgressCounters, ProgressSink, Stage};
pub use roi_config::RoiConfig;
pub use run_config::RunConfig;
