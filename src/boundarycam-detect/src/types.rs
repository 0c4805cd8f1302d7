//! Value types shared by the parser and the event detector.

use serde::{Deserialize, Serialize};

/// A cricket score, either fully resolved or runs-only.
///
/// `RunsOnly` is produced when the parser can recover the runs digits but
/// has no reliable signal for wickets (strategy 4 in
/// [`crate::parser::parse_score`]). Downstream code treats a runs-only
/// score's wicket count as `-1`, both when comparing with `== -1` and with
/// `>= 0` — this dual usage is pinned by design, not a bug (spec §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreState {
    Resolved { runs: u16, wickets: i8 },
    RunsOnly { runs: u16 },
}

impl ScoreState {
    pub fn resolved(runs: u16, wickets: i8) -> Self {
        Self::Resolved { runs, wickets }
    }

    pub fn runs_only(runs: u16) -> Self {
        Self::RunsOnly { runs }
    }

    pub fn runs(&self) -> u16 {
        match *self {
            ScoreState::Resolved { runs, .. } => runs,
            ScoreState::RunsOnly { runs } => runs,
        }
    }

    /// Wicket count, or `-1` when this score is runs-only.
    pub fn wickets(&self) -> i8 {
        match *self {
            ScoreState::Resolved { wickets, .. } => wickets,
            ScoreState::RunsOnly { .. } => -1,
        }
    }
}

impl std::fmt::Display for ScoreState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            ScoreState::Resolved { runs, wickets } => write!(f, "{}/{}", runs, wickets),
            ScoreState::RunsOnly { runs } => write!(f, "{}", runs),
        }
    }
}

/// Completed overs and balls bowled in the current over, `ball in 0..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Overs {
    pub over: u8,
    pub ball: u8,
}

impl Overs {
    pub fn new(over: u8, ball: u8) -> Self {
        Self { over, ball }
    }
}

/// One sampled-and-parsed frame, as seen by the event detector.
#[derive(Debug, Clone)]
pub struct Observation {
    pub timestamp_seconds: f64,
    pub score: Option<ScoreState>,
    pub overs: Option<Overs>,
    pub ocr_confidence: f32,
    pub raw_text: String,
}

impl Observation {
    pub fn new(timestamp_seconds: f64) -> Self {
        Self {
            timestamp_seconds,
            score: None,
            overs: None,
            ocr_confidence: 0.0,
            raw_text: String::new(),
        }
    }

    pub fn with_score(mut self, score: ScoreState) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_overs(mut self, overs: Overs) -> Self {
        self.overs = Some(overs);
        self
    }
}

/// A semantic match occurrence derived from a score transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Four,
    Six,
    Wicket,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Four => "FOUR",
            EventKind::Six => "SIX",
            EventKind::Wicket => "WICKET",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An emitted match event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub timestamp_seconds: f64,
    pub score_before: ScoreState,
    pub score_after: ScoreState,
    pub overs_at_event: Option<Overs>,
}

impl Event {
    /// Human description of the form `Score: <before> → <after>`, per spec §6.
    pub fn description(&self) -> String {
        format!("Score: {} → {}", self.score_before, self.score_after)
    }
}
