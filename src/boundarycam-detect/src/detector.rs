//! The event-detection state machine.
//!
//! Ported from `EventDetector` in the original `ocr_engine.py`, generalized
//! into an explicit transition function over a plain record per spec §9
//! ("state-machine clarity over clever dispatch"). Bounded histories are
//! index-based rings (`ArrayVec`-style via fixed-size `[i16; H]` plus a
//! length/cursor pair), never reallocated in the hot path.

use crate::types::{Event, EventKind, Observation, Overs, ScoreState};

/// Number of historical runs/wickets samples retained for median smoothing.
pub const HISTORY_SIZE: usize = 5;
/// Minimum seconds between two emitted events.
pub const COOLDOWN_SECONDS: f64 = 10.0;
/// Largest plausible single-ball run increment before a jump is treated as
/// a new baseline rather than an event.
pub const MAX_RUNS_PER_BALL: i32 = 8;
/// Seconds a lower score must persist before it is accepted as a reset
/// (innings change) rather than OCR noise.
pub const RESET_PERSISTENCE_SECONDS: f64 = 60.0;
/// Consecutive identical observations required before a score is
/// considered for smoothing.
pub const CONFIRMATION: u32 = 2;

const PLAUSIBLE_RUNS: std::ops::RangeInclusive<u16> = 0..=400;
const PLAUSIBLE_WICKETS: std::ops::RangeInclusive<i8> = 0..=10;

/// A fixed-capacity ring buffer of length `HISTORY_SIZE`.
#[derive(Debug, Clone)]
struct Ring {
    buf: [i16; HISTORY_SIZE],
    len: usize,
    next: usize,
}

impl Ring {
    fn new() -> Self {
        Self {
            buf: [0; HISTORY_SIZE],
            len: 0,
            next: 0,
        }
    }

    fn push(&mut self, value: i16) {
        self.buf[self.next] = value;
        self.next = (self.next + 1) % HISTORY_SIZE;
        if self.len < HISTORY_SIZE {
            self.len += 1;
        }
    }

    fn is_full(&self) -> bool {
        self.len == HISTORY_SIZE
    }

    fn snapshot(&self) -> Vec<i16> {
        self.buf[..self.len].to_vec()
    }
}

/// `sorted(values)[len(values) // 2]` — a direct sorted-index lookup, not
/// an average of the two middle values on an even-length input. This
/// matches `ocr_engine.py`'s `_get_median_score` exactly, which is not the
/// textbook median for even-length inputs.
fn median(mut values: Vec<i16>) -> i16 {
    values.sort_unstable();
    values[values.len() / 2]
}

/// Mutable state owned exclusively by the single logical consumer of the
/// observation stream.
#[derive(Debug, Clone)]
pub struct DetectorState {
    last_stable_score: Option<ScoreState>,
    last_over: Option<Overs>,
    runs_history: Ring,
    wickets_history: Ring,
    last_event_time: f64,
    reset_candidate: Option<ScoreState>,
    reset_candidate_time: f64,
    pending_score: Option<ScoreState>,
    pending_count: u32,
}

impl Default for DetectorState {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorState {
    pub fn new() -> Self {
        Self {
            last_stable_score: None,
            last_over: None,
            runs_history: Ring::new(),
            wickets_history: Ring::new(),
            last_event_time: f64::NEG_INFINITY,
            reset_candidate: None,
            reset_candidate_time: 0.0,
            pending_score: None,
            pending_count: 0,
        }
    }

    /// The most recently accepted stable score, if any.
    pub fn last_stable_score(&self) -> Option<ScoreState> {
        self.last_stable_score
    }
}

/// The event-detection state machine: a pure transition function over
/// [`DetectorState`].
#[derive(Debug, Default)]
pub struct EventDetector {
    state: DetectorState,
}

impl EventDetector {
    pub fn new() -> Self {
        Self {
            state: DetectorState::new(),
        }
    }

    /// The wicket count of the last stable score, used to gate the
    /// parser's last-digit heuristic for subsequent frames.
    pub fn last_wickets(&self) -> Option<i8> {
        self.state.last_stable_score.map(|s| s.wickets())
    }

    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    /// Feed one observation, returning an [`Event`] if this observation
    /// completed a transition that should be reported. The detector never
    /// fails: implausible, missing, or contradictory inputs simply
    /// produce `None` without corrupting state.
    pub fn observe(&mut self, obs: &Observation) -> Option<Event> {
        let score = obs.score?;
        if !is_plausible(&score) {
            return None;
        }

        // New-ball gate.
        if let Some(overs) = obs.overs {
            if let Some(last_over) = self.state.last_over {
                if !(overs > last_over) {
                    self.push_history(&score);
                    return None;
                }
            }
            self.state.last_over = Some(overs);
        }

        // Cooldown gate.
        if obs.timestamp_seconds - self.state.last_event_time < COOLDOWN_SECONDS {
            self.push_history(&score);
            return None;
        }

        // Confirmation buffer.
        if self.state.pending_score == Some(score) {
            self.state.pending_count += 1;
        } else {
            self.state.pending_score = Some(score);
            self.state.pending_count = 1;
        }
        if self.state.pending_count < CONFIRMATION {
            return None;
        }

        self.push_history(&score);

        if !self.state.runs_history.is_full() || !self.state.wickets_history.is_full() {
            return None;
        }

        let median_runs = median(self.state.runs_history.snapshot());
        let wicket_samples: Vec<i16> = self
            .state
            .wickets_history
            .snapshot()
            .into_iter()
            .filter(|&w| w >= 0)
            .collect();
        let median_wickets = if wicket_samples.is_empty() {
            0
        } else {
            median(wicket_samples)
        };
        let stable = ScoreState::resolved(median_runs as u16, median_wickets as i8);

        let last_stable = match self.state.last_stable_score {
            None => {
                self.state.last_stable_score = Some(stable);
                return None;
            }
            Some(s) => s,
        };

        if stable == last_stable {
            return None;
        }

        let runs_diff = stable.runs() as i32 - last_stable.runs() as i32;
        let wickets_diff = if stable.wickets() >= 0 && last_stable.wickets() >= 0 {
            stable.wickets() as i32 - last_stable.wickets() as i32
        } else {
            0
        };

        if runs_diff < 0 {
            if self.state.reset_candidate == Some(stable) {
                if obs.timestamp_seconds - self.state.reset_candidate_time
                    > RESET_PERSISTENCE_SECONDS
                {
                    self.state.last_stable_score = Some(stable);
                    self.state.reset_candidate = None;
                }
                // Else: still persisting, leave reset_candidate_time untouched
                // so the window actually accumulates.
            } else {
                self.state.reset_candidate = Some(stable);
                self.state.reset_candidate_time = obs.timestamp_seconds;
            }
            return None;
        }
        self.state.reset_candidate = None;

        if runs_diff > MAX_RUNS_PER_BALL && wickets_diff != 1 {
            self.state.last_stable_score = Some(stable);
            return None;
        }

        let kind = classify(runs_diff, wickets_diff);
        self.state.last_stable_score = Some(stable);

        let kind = kind?;
        self.state.last_event_time = obs.timestamp_seconds;
        Some(Event {
            kind,
            timestamp_seconds: obs.timestamp_seconds,
            score_before: last_stable,
            score_after: stable,
            overs_at_event: obs.overs,
        })
    }

    fn push_history(&mut self, score: &ScoreState) {
        self.state.runs_history.push(score.runs() as i16);
        self.state.wickets_history.push(score.wickets() as i16);
    }
}

fn is_plausible(score: &ScoreState) -> bool {
    if !PLAUSIBLE_RUNS.contains(&score.runs()) {
        return false;
    }
    if score.wickets() < 0 {
        // Runs-only scores carry no wicket information to validate.
        return true;
    }
    PLAUSIBLE_WICKETS.contains(&score.wickets())
}

/// Classification order is load-bearing: WICKET takes priority over runs,
/// then the fuzzy SIX window, then exact FOUR.
fn classify(runs_diff: i32, wickets_diff: i32) -> Option<EventKind> {
    if wickets_diff == 1 {
        return Some(EventKind::Wicket);
    }
    if (5..=7).contains(&runs_diff) {
        return Some(EventKind::Six);
    }
    if runs_diff == 4 {
        return Some(EventKind::Four);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Observation;

    fn obs(ts: f64, runs: u16, wickets: i8) -> Observation {
        Observation::new(ts).with_score(ScoreState::resolved(runs, wickets))
    }

    fn obs_runs_only(ts: f64, runs: u16) -> Observation {
        Observation::new(ts).with_score(ScoreState::runs_only(runs))
    }

    #[test]
    fn simple_four() {
        let mut d = EventDetector::new();
        let mut events = Vec::new();
        for t in 0..5 {
            events.extend(d.observe(&obs(t as f64, 100, 2)));
        }
        for t in 5..10 {
            events.extend(d.observe(&obs(t as f64, 104, 2)));
        }
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Four);
        assert_eq!(events[0].score_before, ScoreState::resolved(100, 2));
        assert_eq!(events[0].score_after, ScoreState::resolved(104, 2));
        assert!(events[0].timestamp_seconds >= 5.0);
    }

    #[test]
    fn wicket_priority_over_runs() {
        let mut d = EventDetector::new();
        let mut events = Vec::new();
        for t in 0..5 {
            events.extend(d.observe(&obs(t as f64, 200, 4)));
        }
        for t in 5..10 {
            events.extend(d.observe(&obs(t as f64, 204, 5)));
        }
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Wicket);
        assert_eq!(events[0].score_after, ScoreState::resolved(204, 5));
    }

    #[test]
    fn fuzzy_six() {
        let mut d = EventDetector::new();
        let mut events = Vec::new();
        for t in 0..5 {
            events.extend(d.observe(&obs(t as f64, 150, 3)));
        }
        for t in 5..10 {
            events.extend(d.observe(&obs(t as f64, 155, 3)));
        }
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Six);
    }

    #[test]
    fn huge_jump_absorbed_silently() {
        let mut d = EventDetector::new();
        let mut events = Vec::new();
        for t in 0..5 {
            events.extend(d.observe(&obs(t as f64, 224, 0)));
        }
        for (i, t) in (10..13).enumerate() {
            events.extend(d.observe(&obs(t as f64, 257, 1)));
            let _ = i;
        }
        for t in 13..16 {
            events.extend(d.observe(&obs(t as f64, 261, 1)));
        }
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Four);
        assert_eq!(events[0].score_before, ScoreState::resolved(257, 1));
        assert_eq!(events[0].score_after, ScoreState::resolved(261, 1));
    }

    #[test]
    fn oscillating_noise_emits_nothing() {
        let mut d = EventDetector::new();
        let mut events = Vec::new();
        for t in 0..5 {
            events.extend(d.observe(&obs(t as f64, 52, 0)));
        }
        let pattern = [5u16, 52, 5, 52];
        for (i, runs) in pattern.iter().enumerate() {
            events.extend(d.observe(&obs((5 + i) as f64, *runs, 0)));
        }
        assert_eq!(events.len(), 0);
        assert_eq!(d.state().last_stable_score(), Some(ScoreState::resolved(52, 0)));
    }

    #[test]
    fn cooldown_blocks_second_event_within_window() {
        let mut d = EventDetector::new();
        let mut events = Vec::new();
        for t in 0..5 {
            events.extend(d.observe(&obs(t as f64, 100, 2)));
        }
        // Emit a FOUR around t=5.
        for t in 5..7 {
            events.extend(d.observe(&obs(t as f64, 104, 2)));
        }
        assert_eq!(events.len(), 1);
        let first_event_time = events[0].timestamp_seconds;

        for t in 7..12 {
            events.extend(d.observe(&obs(t as f64, 108, 2)));
        }
        assert_eq!(events.len(), 1, "no second event before cooldown elapses");
        assert!(first_event_time + COOLDOWN_SECONDS > 12.0 - 1.0);
    }

    #[test]
    fn innings_reset_after_persistence_window() {
        let mut d = EventDetector::new();
        let mut events = Vec::new();
        for t in 0..5 {
            events.extend(d.observe(&obs(t as f64, 200, 5)));
        }
        let mut t = 10.0;
        while t < 80.0 {
            events.extend(d.observe(&obs(t, 0, 0)));
            t += 1.0;
        }
        assert!(events.is_empty(), "no events during reset persistence window");

        for extra in 0..5 {
            events.extend(d.observe(&obs(t + extra as f64, 4, 0)));
        }
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Four);
    }

    #[test]
    fn median_even_count_uses_sorted_index_not_average() {
        assert_eq!(median(vec![2, 3, 4, 5]), 4);
        assert_eq!(median(vec![2, 2, 3, 4, 5]), 3);
    }

    #[test]
    fn wickets_median_with_runs_only_frame_uses_sorted_index() {
        // A `RunsOnly` frame in the window drops out of the wickets
        // filter, which can leave an even count of valid wicket samples.
        // The sorted-index lookup and a naive average of the two middle
        // values disagree whenever those two values differ, so this pins
        // `ocr_engine.py::_get_median_score`'s behavior against that
        // regression.
        let mut d = EventDetector::new();

        // Ten confirmed (300, 2) observations fill the window with all
        // 2s and establish a stable score with zero events; the window
        // is now [2, 2, 2, 2, 2].
        for t in 0..10 {
            d.observe(&obs(t as f64, 300, 2));
        }
        assert_eq!(d.state().last_stable_score(), Some(ScoreState::resolved(300, 2)));

        // Each pair below is confirmed (same score seen twice) and pushes
        // exactly one new sample, evicting the oldest. Window after each
        // pair: [2,2,2,2,3], then [2,2,2,3,4] — the median (sorted index
        // 2) stays 2 in both cases, so no event fires and `last_event_time`
        // stays untouched, which matters because it keeps the cooldown
        // gate from engaging below.
        d.observe(&obs(100.0, 300, 3));
        d.observe(&obs(101.0, 300, 3));
        assert_eq!(d.state().last_stable_score(), Some(ScoreState::resolved(300, 2)));

        d.observe(&obs(102.0, 300, 4));
        d.observe(&obs(103.0, 300, 4));
        assert_eq!(d.state().last_stable_score(), Some(ScoreState::resolved(300, 2)));

        // Window becomes [2,2,3,4,5]; median (sorted index 2) is now 3,
        // which differs from the stable (300, 2) and fires a WICKET
        // event, advancing `last_stable_score` to (300, 3) and arming the
        // cooldown.
        d.observe(&obs(104.0, 300, 5));
        d.observe(&obs(105.0, 300, 5));
        assert_eq!(d.state().last_stable_score(), Some(ScoreState::resolved(300, 3)));

        // Past the 10-second cooldown, push a confirmed runs-only (300)
        // frame twice. Window becomes [2,3,4,5,-1]; filtering out the
        // negative wicket leaves exactly four valid samples: [2,3,4,5].
        d.observe(&obs_runs_only(120.0, 300));
        d.observe(&obs_runs_only(121.0, 300));

        let stable = d.state().last_stable_score().unwrap();
        assert_eq!(stable.runs(), 300);
        assert_eq!(
            stable.wickets(),
            4,
            "sorted-index median of [2, 3, 4, 5] is 4, not the average 3"
        );
    }
}
