//! Pure OCR-text-to-score and text-to-overs parsing.
//!
//! Ported from the original `ocr_engine.py` `clean_ocr_text`/`parse_score`/
//! `parse_overs` functions. The glyph-correction table and strategy order
//! are load-bearing and must not be "improved" (spec §9).

use crate::types::{Overs, ScoreState};

/// Glyph corrections applied before any parse strategy runs.
///
/// `b`/`G`/`g → 6` collides with the valid `B → 8` correction on some
/// glyphs; this is a known quirk of the source OCR corrections and is
/// pinned, not a bug.
fn apply_glyph_corrections(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'O' | 'o' => '0',
            'S' | 's' => '5',
            'I' | 'l' | '|' => '1',
            'B' => '8',
            'b' | 'G' | 'g' => '6',
            other => other,
        })
        .collect()
}

fn keep_chars(text: &str, allowed: impl Fn(char) -> bool) -> String {
    text.chars().filter(|c| allowed(*c)).collect()
}

/// Parse OCR'd score text into a [`ScoreState`] using four ordered
/// strategies, returning the first that succeeds.
///
/// `prev_wickets` gates strategy 3 (the last-digit heuristic) and is
/// typically the wicket count from the previously accepted stable score.
pub fn parse_score(text: &str, prev_wickets: Option<i8>) -> Option<ScoreState> {
    let corrected = apply_glyph_corrections(text);

    // Strategy 1: strict slash.
    if let Some(state) = parse_strict_slash(&corrected) {
        return Some(state);
    }

    // Strategy 2: space-separated, on the glyph-corrected text.
    if let Some(state) = parse_space_separated(&corrected) {
        return Some(state);
    }

    // Strategy 3: last-digit heuristic, gated on prev_wickets.
    if let Some(state) = parse_last_digit_heuristic(&corrected, prev_wickets) {
        return Some(state);
    }

    // Strategy 4: runs-only fallback.
    parse_runs_only(&corrected)
}

fn parse_strict_slash(corrected: &str) -> Option<ScoreState> {
    // `f` and backtick additionally normalize to `/` in this phase only.
    let normalized: String = corrected
        .chars()
        .map(|c| match c {
            'f' | '`' => '/',
            other => other,
        })
        .collect();
    let stripped = keep_chars(&normalized, |c| c.is_ascii_digit() || c == '/');

    let (runs_str, wickets_str) = split_once_single_slash(&stripped)?;
    if runs_str.is_empty() || runs_str.len() > 3 {
        return None;
    }
    if wickets_str.is_empty() || wickets_str.len() > 2 {
        return None;
    }
    let runs: u16 = runs_str.parse().ok()?;
    let wickets: i16 = wickets_str.parse().ok()?;
    if runs > 999 || !(0..=10).contains(&wickets) {
        return None;
    }
    Some(ScoreState::resolved(runs, wickets as i8))
}

/// Splits on `/`, requiring exactly one separator.
fn split_once_single_slash(s: &str) -> Option<(&str, &str)> {
    let mut parts = s.splitn(3, '/');
    let first = parts.next()?;
    let second = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((first, second))
}

fn parse_space_separated(corrected: &str) -> Option<ScoreState> {
    let trimmed = corrected.trim();
    let mut fields = trimmed.split_whitespace();
    let runs_str = fields.next()?;
    let wickets_str = fields.next()?;
    if fields.next().is_some() {
        return None;
    }
    if !runs_str.chars().all(|c| c.is_ascii_digit()) || runs_str.is_empty() || runs_str.len() > 3 {
        return None;
    }
    if !wickets_str.chars().all(|c| c.is_ascii_digit())
        || wickets_str.is_empty()
        || wickets_str.len() > 2
    {
        return None;
    }
    let runs: u16 = runs_str.parse().ok()?;
    let wickets: i16 = wickets_str.parse().ok()?;
    if runs > 999 || !(0..=10).contains(&wickets) {
        return None;
    }
    Some(ScoreState::resolved(runs, wickets as i8))
}

fn parse_last_digit_heuristic(corrected: &str, prev_wickets: Option<i8>) -> Option<ScoreState> {
    let prev_wickets = prev_wickets?;
    let digits: Vec<char> = corrected.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 2 {
        return None;
    }
    let last_digit = digits.last().unwrap().to_digit(10).unwrap() as i8;
    if last_digit != prev_wickets && last_digit != prev_wickets + 1 {
        return None;
    }
    let runs_digits: String = digits[..digits.len() - 1].iter().collect();
    if runs_digits.is_empty() || runs_digits.len() > 3 {
        return None;
    }
    let runs: u16 = runs_digits.parse().ok()?;
    if runs > 999 {
        return None;
    }
    Some(ScoreState::resolved(runs, last_digit))
}

fn parse_runs_only(corrected: &str) -> Option<ScoreState> {
    let digits: String = corrected.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() || digits.len() > 3 {
        return None;
    }
    let runs: u16 = digits.parse().ok()?;
    if runs > 999 {
        return None;
    }
    Some(ScoreState::runs_only(runs))
}

/// Parse OCR'd overs text (`"14.2"`) into an `(over, ball)` pair.
///
/// Accepts only `over <= 50` and `ball <= 5`.
pub fn parse_overs(text: &str) -> Option<Overs> {
    let stripped = keep_chars(text, |c| c.is_ascii_digit() || c == '.');
    let (over_str, ball_str) = split_once_single_dot(&stripped)?;
    if over_str.is_empty() || over_str.len() > 2 || ball_str.len() != 1 {
        return None;
    }
    let over: u8 = over_str.parse().ok()?;
    let ball: u8 = ball_str.parse().ok()?;
    if over > 50 || ball > 5 {
        return None;
    }
    Some(Overs::new(over, ball))
}

fn split_once_single_dot(s: &str) -> Option<(&str, &str)> {
    let mut parts = s.splitn(3, '.');
    let first = parts.next()?;
    let second = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((first, second))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_slash() {
        assert_eq!(parse_score("145/3", None), Some(ScoreState::resolved(145, 3)));
    }

    #[test]
    fn space_separated() {
        assert_eq!(parse_score("145 3", None), Some(ScoreState::resolved(145, 3)));
    }

    #[test]
    fn last_digit_heuristic_matches_prev_wickets() {
        assert_eq!(
            parse_score("1453", Some(3)),
            Some(ScoreState::resolved(145, 3))
        );
    }

    #[test]
    fn last_digit_heuristic_without_prev_wickets_overflows_to_none() {
        // 1453 has 4 digits; without prev_wickets strategy 3 is skipped and
        // the runs-only fallback rejects 1453 > 999.
        assert_eq!(parse_score("1453", None), None);
    }

    #[test]
    fn glyph_corrections_apply_before_strict_slash() {
        assert_eq!(parse_score("O/S", None), Some(ScoreState::resolved(0, 5)));
    }

    #[test]
    fn overs_valid() {
        assert_eq!(parse_overs("14.2"), Some(Overs::new(14, 2)));
    }

    #[test]
    fn overs_ball_out_of_range() {
        assert_eq!(parse_overs("14.7"), None);
    }

    #[test]
    fn overs_over_out_of_range() {
        assert_eq!(parse_overs("51.0"), None);
    }

    #[test]
    fn runs_only_fallback() {
        assert_eq!(parse_score("257", None), Some(ScoreState::runs_only(257)));
    }

    #[test]
    fn runs_only_rejects_too_many_digits() {
        assert_eq!(parse_score("12345", None), None);
    }
}
