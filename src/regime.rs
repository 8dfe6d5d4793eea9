// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbit Vitality Engine - Regime Classifier
//
// Assigns one of five dynamical regimes from raw energy, inertia and
// resonance. Rules are evaluated in strict priority order; the first match
// wins. Classification is a pure function of its inputs.

use serde::{Deserialize, Serialize};

use crate::resonance::ResonanceResult;
use crate::types::{EnergyLevel, NormalizedEnergy, RawEnergy, Regime};

// ─── Thresholds (raw energy scale) ──────────────────────────────────────────

/// Resonance must be stronger than this to select RESONANT.
///
/// Deliberately stricter than `resonance::RESONANCE_THRESHOLD` (0.7):
/// resonance can be found without dominating the regime.
pub const RESONANT_STRENGTH: f64 = 0.8;
pub const DECAYING_ENERGY: f64 = 20.0;
pub const ESCAPE_ENERGY: f64 = 150.0;
pub const ESCAPE_MAX_INERTIA: f64 = 5.0;
pub const CHAOTIC_INERTIA: f64 = 50.0;

const HEALTHY_MULTIPLIER: f64 = 1.1;
const UNHEALTHY_MULTIPLIER: f64 = 0.8;

// ─── Classification ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeClassification {
    pub regime: Regime,
    pub stability: f64,
    pub energy_level: EnergyLevel,
}

/// Pick the regime for the given inputs.
///
/// 1. resonance found and stronger than 0.8 → RESONANT
/// 2. energy < 20 → DECAYING
/// 3. energy > 150 and inertia < 5 → ESCAPE
/// 4. inertia > 50 → CHAOTIC
/// 5. otherwise → STABLE
pub fn determine_regime(energy: RawEnergy, inertia: f64, resonance: &ResonanceResult) -> Regime {
    let e = energy.value();
    if resonance.found && resonance.strength > RESONANT_STRENGTH {
        Regime::Resonant
    } else if e < DECAYING_ENERGY {
        Regime::Decaying
    } else if e > ESCAPE_ENERGY && inertia < ESCAPE_MAX_INERTIA {
        Regime::Escape
    } else if inertia > CHAOTIC_INERTIA {
        Regime::Chaotic
    } else {
        Regime::Stable
    }
}

/// Base stability scaled by energy health and clamped to [0, 1].
pub fn stability_score(regime: Regime, level: EnergyLevel) -> f64 {
    let multiplier = if level.is_healthy() { HEALTHY_MULTIPLIER } else { UNHEALTHY_MULTIPLIER };
    (regime.base_stability() * multiplier).clamp(0.0, 1.0)
}

/// Full classification. `energy_ceiling` converts raw energy to the
/// normalized scale for the health check and nowhere else.
pub fn classify(
    energy: RawEnergy,
    inertia: f64,
    resonance: &ResonanceResult,
    energy_ceiling: f64,
) -> RegimeClassification {
    let regime = determine_regime(energy, inertia, resonance);
    let energy_level = EnergyLevel::classify(NormalizedEnergy::from_raw(energy, energy_ceiling));
    RegimeClassification {
        regime,
        stability: stability_score(regime, energy_level),
        energy_level,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
