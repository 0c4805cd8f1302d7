//! The OCR-as-a-capability boundary (spec §9): the rest of the core is
//! written against this trait, never against a concrete recognizer.

use opencv::core::Mat;

use boundarycam_detect::{Overs, ScoreState};

use crate::error::Result;

/// A text-region reader restricted to an allowlist, with a confidence
/// signal, per spec §4.3.
pub trait ScoreReader {
    /// Reads a score ROI image. Returns `score = None` when confidence is
    /// below the reader's gate or parsing fails; `confidence` is always
    /// returned so callers can track OCR failure rates.
    fn read_score(
        &mut self,
        image: &Mat,
        prev_wickets: Option<i8>,
    ) -> Result<(Option<ScoreState>, f32, String)>;

    /// Reads an overs ROI image. No confidence gate: overs are secondary.
    fn read_overs(&mut self, image: &Mat) -> Result<Option<Overs>>;
}
