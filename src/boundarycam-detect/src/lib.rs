//! Pure score-text parsing and the cricket event-detection state machine.
//!
//! This crate has no I/O and no external dependencies beyond `serde`: it
//! is the "testable core" the rest of the workspace is built around
//! (OCR, vision, and assembly crates all depend on these types but never
//! the reverse).

pub mod detector;
pub mod parser;
pub mod types;

pub use detector::{DetectorState, EventDetector};
pub use parser::{parse_overs, parse_score};
pub use types::{Event, EventKind, Observation, Overs, ScoreState};
