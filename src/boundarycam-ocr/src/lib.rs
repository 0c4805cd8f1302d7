//! Scoreboard OCR as a replaceable capability (spec §9).
//!
//! The rest of the core is written against [`ScoreReader`], never against
//! [`WindowsScoreReader`] directly, so the pipeline and its tests can run
//! with [`FakeScoreReader`] instead.

pub mod engine;
pub mod error;
pub mod fake;
pub mod reader;

pub use engine::{WindowsScoreReader, SCORE_ALLOWLIST};
pub use error::{OcrError, Result};
pub use fake::FakeScoreReader;
pub use reader::ScoreReader;
