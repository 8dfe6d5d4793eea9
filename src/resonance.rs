// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbit Vitality Engine - Resonance Detector
//
// Looks for a repeating pattern in an entity's event history. Three
// independent analyzers each score the history in [0, 1]; the strongest
// pattern wins and counts as resonance once it clears the threshold.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::Event;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum strength for a pattern to count as resonance.
pub const RESONANCE_THRESHOLD: f64 = 0.7;

/// Events required before any analyzer runs.
pub const MIN_HISTORY: usize = 3;

const AMPLIFICATION_GAIN: f64 = 0.5;
const MS_PER_HOUR: f64 = 3_600_000.0;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Events arrive at a steady cadence.
    TimeRegularity,
    /// One event type dominates the history.
    ActionDominance,
    /// Event values keep moving the same way.
    ValueTrend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResonancePattern {
    pub kind: PatternKind,
    /// Events per hour for time regularity; occurrences of the dominant type
    /// for action dominance; pairs moving in the dominant direction for
    /// value trends.
    pub frequency: f64,
    pub strength: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResonanceResult {
    pub found: bool,
    pub strength: f64,
    pub amplification: f64,
    pub pattern: Option<ResonancePattern>,
}

impl ResonanceResult {
    pub fn not_found() -> Self {
        Self { found: false, strength: 0.0, amplification: 1.0, pattern: None }
    }

    fn from_pattern(pattern: ResonancePattern) -> Self {
        let strength = pattern.strength.clamp(0.0, 1.0);
        let found = strength >= RESONANCE_THRESHOLD;
        let amplification = if found { 1.0 + strength * AMPLIFICATION_GAIN } else { 1.0 };
        Self { found, strength, amplification, pattern: Some(pattern) }
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Run every analyzer over `history` and keep the strongest pattern.
///
/// Histories shorter than [`MIN_HISTORY`] are reported as not found. On equal
/// strength the earlier analyzer (time, then action, then value) wins.
pub fn find_resonant_path(history: &[Event]) -> ResonanceResult {
    if history.len() < MIN_HISTORY {
        return ResonanceResult::not_found();
    }

    let candidates = [
        time_regularity(history),
        action_dominance(history),
        value_trend(history),
    ];

    let best = candidates
        .into_iter()
        .flatten()
        .fold(None::<ResonancePattern>, |best, p| match best {
            Some(b) if b.strength >= p.strength => Some(b),
            _ => Some(p),
        });

    match best {
        Some(pattern) => ResonanceResult::from_pattern(pattern),
        None => ResonanceResult::not_found(),
    }
}

/// Coefficient of variation of inter-event intervals, inverted.
///
/// Not applicable when every event shares a timestamp.
fn time_regularity(history: &[Event]) -> Option<ResonancePattern> {
    let intervals: Vec<f64> = history
        .windows(2)
        .map(|w| w[1].timestamp.abs_diff(w[0].timestamp) as f64)
        .collect();

    let mean = mean(&intervals);
    if mean <= 0.0 {
        return None;
    }
    let variance = intervals.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / intervals.len() as f64;
    let cv = variance.sqrt() / mean;
    let strength = (1.0 - cv).max(0.0);
    let per_hour = MS_PER_HOUR / mean;

    Some(ResonancePattern {
        kind: PatternKind::TimeRegularity,
        frequency: per_hour,
        strength,
        description: format!("activity every {:.1}h (cv {:.2})", mean / MS_PER_HOUR, cv),
    })
}

/// Share of events carrying the most frequent type.
fn action_dominance(history: &[Event]) -> Option<ResonancePattern> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for event in history {
        *counts.entry(event.kind.as_str()).or_default() += 1;
    }

    // Ties resolve to the lexically smallest type so results are reproducible.
    let (kind, count) = counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))?;
    let strength = count as f64 / history.len() as f64;

    Some(ResonancePattern {
        kind: PatternKind::ActionDominance,
        frequency: count as f64,
        strength,
        description: format!("'{}' in {}/{} events", kind, count, history.len()),
    })
}

/// Share of consecutive valued pairs moving in the dominant direction.
fn value_trend(history: &[Event]) -> Option<ResonancePattern> {
    let values: Vec<f64> = history.iter().filter_map(Event::finite_value).collect();
    if values.len() < MIN_HISTORY {
        return None;
    }

    let pairs = values.len() - 1;
    let rising = values.windows(2).filter(|w| w[1] > w[0]).count();
    let falling = values.windows(2).filter(|w| w[1] < w[0]).count();
    let (direction, moving) = if rising >= falling {
        ("increasing", rising)
    } else {
        ("decreasing", falling)
    };
    let strength = moving as f64 / pairs as f64;

    Some(ResonancePattern {
        kind: PatternKind::ValueTrend,
        frequency: moving as f64,
        strength,
        description: format!("values {} in {}/{} steps", direction, moving, pairs),
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: u64 = 3_600_000;

    fn events(spec: &[(u64, &str, Option<f64>)]) -> Vec<Event> {
        spec.iter()
            .map(|&(t, k, v)| {
                let e = Event::new(t, k);
                match v {
                    Some(v) => e.with_value(v),
                    None => e,
                }
            })
            .collect()
    }

    #[test]
    fn test_short_history_not_found() {
        assert_eq!(find_resonant_path(&[]), ResonanceResult::not_found());
        let two = events(&[(0, "commit", None), (HOUR, "commit", None)]);
        let r = find_resonant_path(&two);
        assert!(!r.found);
        assert_eq!(r.strength, 0.0);
        assert_eq!(r.amplification, 1.0);
    }

    #[test]
    fn test_perfectly_regular_cadence() {
        let history = events(&[
            (0, "a", None),
            (24 * HOUR, "b", None),
            (48 * HOUR, "c", None),
            (72 * HOUR, "d", None),
        ]);
        let r = find_resonant_path(&history);
        assert!(r.found);
        assert!((r.strength - 1.0).abs() < 1e-9);
        assert!((r.amplification - 1.5).abs() < 1e-9);
        let p = r.pattern.unwrap();
        assert_eq!(p.kind, PatternKind::TimeRegularity);
        assert!((p.frequency - 1.0 / 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_action_dominance_wins_on_irregular_timing() {
        let history = events(&[
            (0, "commit", None),
            (HOUR, "commit", None),
            (30 * HOUR, "commit", None),
            (31 * HOUR, "view", None),
        ]);
        let r = find_resonant_path(&history);
        let p = r.pattern.unwrap();
        assert_eq!(p.kind, PatternKind::ActionDominance);
        assert!((r.strength - 0.75).abs() < 1e-9);
        assert!(r.found);
    }

    #[test]
    fn test_value_trend_detects_monotonic_growth() {
        let history = events(&[
            (0, "a", Some(1.0)),
            (HOUR, "b", Some(2.0)),
            (50 * HOUR, "c", Some(3.0)),
            (51 * HOUR, "d", Some(5.0)),
        ]);
        let r = find_resonant_path(&history);
        let p = r.pattern.unwrap();
        assert_eq!(p.kind, PatternKind::ValueTrend);
        assert_eq!(r.strength, 1.0);
        assert!(p.description.contains("increasing"));
    }

    #[test]
    fn test_below_threshold_not_found() {
        let history = events(&[
            (0, "a", Some(1.0)),
            (HOUR, "b", Some(3.0)),
            (10 * HOUR, "c", Some(2.0)),
            (11 * HOUR, "d", Some(4.0)),
            (40 * HOUR, "e", Some(1.0)),
        ]);
        let r = find_resonant_path(&history);
        assert!(!r.found);
        assert!(r.strength < RESONANCE_THRESHOLD);
        assert_eq!(r.amplification, 1.0);
    }

    #[test]
    fn test_non_finite_values_are_skipped() {
        let history = events(&[
            (0, "a", Some(1.0)),
            (HOUR, "b", Some(f64::NAN)),
            (5 * HOUR, "c", Some(2.0)),
            (6 * HOUR, "d", Some(f64::INFINITY)),
        ]);
        // Only two finite values remain; value trend does not apply
        assert!(value_trend(&history).is_none());
        let r = find_resonant_path(&history);
        assert!((0.0..=1.0).contains(&r.strength));
    }

    #[test]
    fn test_simultaneous_events_skip_time_analyzer() {
        let history = events(&[(5, "a", None), (5, "b", None), (5, "c", None)]);
        assert!(time_regularity(&history).is_none());
        let r = find_resonant_path(&history);
        assert_eq!(r.pattern.unwrap().kind, PatternKind::ActionDominance);
    }

    #[test]
    fn test_deterministic_tie_break_on_types() {
        let history = events(&[(0, "zeta", None), (0, "alpha", None), (0, "zeta", None), (0, "alpha", None)]);
        let p = action_dominance(&history).unwrap();
        assert!(p.description.starts_with("'alpha'"));
    }
}
