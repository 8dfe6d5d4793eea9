// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbit Vitality Engine - Decay Model
//
// Energy attenuates exponentially with time since last activity. Past the
// 72-hour golden time the rate triples, and past 144 hours the entity is
// flagged critical.

use serde::{Deserialize, Serialize};

use crate::types::LastSeen;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Hours of inactivity before the accelerated rate applies.
pub const GOLDEN_TIME_HOURS: f64 = 72.0;

/// Hours of inactivity past which decay is critical.
pub const CRITICAL_HOURS: f64 = 144.0;

/// Per-hour rate inside the golden time.
pub const BASE_DECAY_RATE: f64 = 0.05;

/// Per-hour rate once the golden time has passed.
pub const ACCELERATED_DECAY_RATE: f64 = 0.15;

/// Per-hour constant of the half-life helper.
///
/// Unrelated to the applied rates above and intentionally not unified with
/// them; which one product wants for long-horizon projections is unresolved.
pub const HALF_LIFE_DECAY_CONSTANT: f64 = 0.001;

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecayStatus {
    Stable,
    Decaying,
    Critical,
}

impl DecayStatus {
    pub fn from_hours(hours_past: f64) -> Self {
        if hours_past > CRITICAL_HOURS {
            Self::Critical
        } else if hours_past > GOLDEN_TIME_HOURS {
            Self::Decaying
        } else {
            Self::Stable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayResult {
    pub value: f64,
    pub original: f64,
    pub hours_past: f64,
    pub decay_rate: f64,
    pub status: DecayStatus,
    pub loss_percentage: f64,
}

impl DecayResult {
    fn unchanged(energy: f64) -> Self {
        Self {
            value: energy,
            original: energy,
            hours_past: 0.0,
            decay_rate: 0.0,
            status: DecayStatus::Stable,
            loss_percentage: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Core decay logic
// ---------------------------------------------------------------------------

/// Rate that applies after `hours_past` hours of inactivity.
pub fn decay_rate_for(hours_past: f64) -> f64 {
    if hours_past > GOLDEN_TIME_HOURS {
        ACCELERATED_DECAY_RATE
    } else {
        BASE_DECAY_RATE
    }
}

/// Attenuate `energy` by the time elapsed since `last_seen`.
///
/// Without a `last_seen` the energy is echoed back untouched. Negative
/// energies are floored at zero; non-finite energies are treated as zero.
pub fn decay(energy: f64, last_seen: Option<LastSeen>, now_ms: u64) -> DecayResult {
    let energy = if energy.is_finite() { energy.max(0.0) } else { 0.0 };

    let Some(last_seen) = last_seen else {
        return DecayResult::unchanged(energy);
    };

    let hours_past = last_seen.hours_since(now_ms);
    let decay_rate = decay_rate_for(hours_past);
    let value = (energy * (-decay_rate * hours_past).exp()).max(0.0);
    let loss_percentage = if energy > 0.0 {
        (energy - value) / energy * 100.0
    } else {
        0.0
    };

    DecayResult {
        value,
        original: energy,
        hours_past,
        decay_rate,
        status: DecayStatus::from_hours(hours_past),
        loss_percentage,
    }
}

// ---------------------------------------------------------------------------
// Half-life helper
// ---------------------------------------------------------------------------

/// Slow long-horizon attenuation: `energy × e^(-0.001 × hours)`.
pub fn half_life_decay(energy: f64, hours: f64) -> f64 {
    if !energy.is_finite() || !hours.is_finite() {
        return 0.0;
    }
    (energy * (-HALF_LIFE_DECAY_CONSTANT * hours.max(0.0)).exp()).max(0.0)
}

/// Hours for the half-life helper to halve a value (~693h).
pub fn half_life_hours() -> f64 {
    std::f64::consts::LN_2 / HALF_LIFE_DECAY_CONSTANT
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const NOW: u64 = 1_700_000_000_000;

    #[test]
    fn test_zero_hours_is_identity() {
        for e in [0.0, 0.5, 1.0, 42.0, 180.0] {
            let r = decay(e, Some(LastSeen::Hours(0.0)), NOW);
            assert_eq!(r.value, e);
            assert_eq!(r.status, DecayStatus::Stable);
            assert_eq!(r.loss_percentage, 0.0);
        }
    }

    #[test]
    fn test_missing_last_seen_is_unchanged() {
        let r = decay(80.0, None, NOW);
        assert_eq!(r.value, 80.0);
        assert_eq!(r.original, 80.0);
        assert_eq!(r.decay_rate, 0.0);
    }

    #[test]
    fn test_golden_time_boundary_uses_base_rate() {
        // Scenario: energy=100 at exactly 72h stays on the base rate
        let r = decay(100.0, Some(LastSeen::Hours(72.0)), NOW);
        assert_eq!(r.decay_rate, BASE_DECAY_RATE);
        assert!((r.value - 100.0 * (-3.6f64).exp()).abs() < 1e-9);
        assert!((r.value - 2.73).abs() < 0.01);
        assert_eq!(r.status, DecayStatus::Stable);
    }

    #[test]
    fn test_past_golden_time_accelerates() {
        let r = decay(100.0, Some(LastSeen::Hours(73.0)), NOW);
        assert_eq!(r.decay_rate, ACCELERATED_DECAY_RATE);
        assert_eq!(r.status, DecayStatus::Decaying);

        let r = decay(100.0, Some(LastSeen::Hours(145.0)), NOW);
        assert_eq!(r.status, DecayStatus::Critical);
        assert!(r.loss_percentage > 99.0);
    }

    #[test]
    fn test_timestamp_last_seen() {
        let ten_hours_ago = NOW - 10 * 3_600_000;
        let r = decay(50.0, Some(LastSeen::Timestamp(ten_hours_ago)), NOW);
        assert!((r.hours_past - 10.0).abs() < 1e-9);
        assert!((r.value - 50.0 * (-0.5f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn test_negative_and_nan_energy_floor_to_zero() {
        assert_eq!(decay(-10.0, Some(LastSeen::Hours(5.0)), NOW).value, 0.0);
        let r = decay(f64::NAN, Some(LastSeen::Hours(5.0)), NOW);
        assert_eq!(r.value, 0.0);
        assert_eq!(r.loss_percentage, 0.0);
    }

    #[test]
    fn test_decay_is_monotonic_in_time() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            let e: f64 = rng.gen_range(0.01..250.0);
            let h1: f64 = rng.gen_range(0.0..300.0);
            let h2: f64 = h1 + rng.gen_range(0.0..100.0);
            let v1 = decay(e, Some(LastSeen::Hours(h1)), NOW).value;
            let v2 = decay(e, Some(LastSeen::Hours(h2)), NOW).value;
            assert!(v1 >= v2, "e={e} h1={h1} v1={v1} h2={h2} v2={v2}");
        }
    }

    #[test]
    fn test_half_life_helper() {
        let h = half_life_hours();
        assert!((h - 693.147).abs() < 0.01);
        assert!((half_life_decay(1.0, h) - 0.5).abs() < 1e-9);
        assert_eq!(half_life_decay(1.0, -5.0), 1.0);
        assert_eq!(half_life_decay(f64::INFINITY, 1.0), 0.0);
    }
}
