// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbit Vitality Engine - Reaction Simulator
//
// Evaluates a hypothetical action against an entity's current state: how
// much thrust the action carries, whether it breaks the entity's inertia,
// and where the entity would land afterwards.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::adapter::to_decimal;
use crate::inertia::inertia;
use crate::types::{Entity, Regime};

// ─── Constants ──────────────────────────────────────────────────────────────

/// Multiplier for action types outside the table.
pub const DEFAULT_ACTION_MULTIPLIER: f64 = 1.0;

/// Largest multiplier in the table; quality scores are relative to it.
pub const MAX_ACTION_MULTIPLIER: f64 = 3.0;

const REVENUE_FACTOR: Decimal = dec!(0.1);

// Post-action regime check (raw energy). Simpler than the full classifier.
const POST_ACTION_ESCAPE: f64 = 150.0;
const POST_ACTION_DECAYING: f64 = 30.0;

const BLOCKED_STABILITY: f64 = 0.5;
const BLOCKED_PROBABILITY: f64 = 0.3;

const BASE_CONFIDENCE: f64 = 0.7;
const MAX_CONFIDENCE: f64 = 0.95;
const HISTORY_BONUS: f64 = 0.1;
const DEEP_HISTORY_BONUS: f64 = 0.1;
const STRONG_ACTION_BONUS: f64 = 0.05;

// ─── Action Type ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Commit,
    Invest,
    Connect,
    Create,
    Update,
    Review,
    Share,
    View,
    Browse,
    Idle,
    Presentation,
    Consult,
    Attendance,
    /// Any tag not in the table.
    #[serde(other)]
    Unknown,
}

impl ActionType {
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Commit => 2.0,
            Self::Invest => 1.8,
            Self::Connect => 1.5,
            Self::Create => 1.7,
            Self::Update => 1.2,
            Self::Review => 1.1,
            Self::Share => 1.3,
            Self::View => 0.5,
            Self::Browse => 0.3,
            Self::Idle => 0.1,
            Self::Presentation => 3.0,
            Self::Consult => 1.5,
            Self::Attendance => 1.0,
            Self::Unknown => DEFAULT_ACTION_MULTIPLIER,
        }
    }

    /// Actions that earn the extra confidence bonus.
    pub fn is_strong(&self) -> bool {
        matches!(self, Self::Commit | Self::Invest | Self::Connect)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Invest => "invest",
            Self::Connect => "connect",
            Self::Create => "create",
            Self::Update => "update",
            Self::Review => "review",
            Self::Share => "share",
            Self::View => "view",
            Self::Browse => "browse",
            Self::Idle => "idle",
            Self::Presentation => "presentation",
            Self::Consult => "consult",
            Self::Attendance => "attendance",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for ActionType {
    type Err = std::convert::Infallible;

    /// Unrecognized tags map to [`ActionType::Unknown`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "commit" => Self::Commit,
            "invest" => Self::Invest,
            "connect" => Self::Connect,
            "create" => Self::Create,
            "update" => Self::Update,
            "review" => Self::Review,
            "share" => Self::Share,
            "view" => Self::View,
            "browse" => Self::Browse,
            "idle" => Self::Idle,
            "presentation" => Self::Presentation,
            "consult" => Self::Consult,
            "attendance" => Self::Attendance,
            _ => Self::Unknown,
        })
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Effective Mass ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

impl ImpactLevel {
    pub fn from_mass(value: f64) -> Self {
        if value >= 1.5 {
            Self::High
        } else if value >= 0.8 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveMass {
    pub value: f64,
    pub impact_level: ImpactLevel,
    /// `value / 3.0`, capped at 1.
    pub quality_score: f64,
}

/// Thrust carried by an action: `multiplier × intensity`.
///
/// Negative or non-finite intensities count as zero.
pub fn effective_mass(action: ActionType, intensity: f64) -> EffectiveMass {
    let intensity = if intensity.is_finite() { intensity.max(0.0) } else { 0.0 };
    let value = action.multiplier() * intensity;
    EffectiveMass {
        value,
        impact_level: ImpactLevel::from_mass(value),
        quality_score: (value / MAX_ACTION_MULTIPLIER).min(1.0),
    }
}

// ─── Simulation ─────────────────────────────────────────────────────────────

/// Where the entity lands after the action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeTransition {
    pub regime: Regime,
    pub stability: f64,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSimulationResult {
    pub action: ActionType,
    pub effective_mass: EffectiveMass,
    pub reaction_yield: f64,
    pub overcomes_inertia: bool,
    pub new_energy: f64,
    pub new_regime: RegimeTransition,
    pub expected_revenue: Decimal,
    pub confidence: f64,
}

/// Regime after an action, from raw energy alone.
///
/// Only the ESCAPE and DECAYING thresholds are consulted; this is not the
/// full classifier.
pub fn post_action_regime(new_energy: f64) -> Regime {
    if new_energy > POST_ACTION_ESCAPE {
        Regime::Escape
    } else if new_energy < POST_ACTION_DECAYING {
        Regime::Decaying
    } else {
        Regime::Stable
    }
}

/// Confidence in a simulation given how much history backs it.
pub fn simulation_confidence(history_len: usize, action: ActionType) -> f64 {
    let mut confidence = BASE_CONFIDENCE;
    if history_len > 10 {
        confidence += HISTORY_BONUS;
    }
    if history_len > 20 {
        confidence += DEEP_HISTORY_BONUS;
    }
    if action.is_strong() {
        confidence += STRONG_ACTION_BONUS;
    }
    confidence.min(MAX_CONFIDENCE)
}

/// Apply `action` at `intensity` to `entity`, currently in `current_regime`.
///
/// The action moves the entity only when its effective mass reaches half of
/// the entity's break force; otherwise the regime is kept with reduced
/// stability and the energy is unchanged.
pub fn simulate(
    entity: &Entity,
    action: ActionType,
    intensity: f64,
    current_regime: Regime,
) -> ActionSimulationResult {
    let mass = effective_mass(action, intensity);
    let efficiency = if entity.efficiency.is_finite() { entity.efficiency.max(0.0) } else { 0.0 };
    let reaction_yield = mass.value * efficiency;

    let resistance = inertia(
        Some(entity.mass),
        Some(entity.friction_coefficient),
        Some(entity.connection_count),
    );
    let current_energy = if entity.energy.is_finite() { entity.energy.max(0.0) } else { 0.0 };
    let overcomes_inertia = mass.value >= resistance.break_force / 2.0;

    let (new_energy, new_regime) = if overcomes_inertia {
        let new_energy = current_energy + reaction_yield;
        let regime = post_action_regime(new_energy);
        let probability = if resistance.break_force > 0.0 {
            (mass.value / resistance.break_force).clamp(BLOCKED_STABILITY, 1.0)
        } else {
            1.0
        };
        let transition = RegimeTransition {
            regime,
            stability: regime.base_stability(),
            probability,
        };
        (new_energy, transition)
    } else {
        let transition = RegimeTransition {
            regime: current_regime,
            stability: BLOCKED_STABILITY,
            probability: BLOCKED_PROBABILITY,
        };
        (current_energy, transition)
    };

    let conversion = if entity.conversion_rate.is_finite() { entity.conversion_rate } else { 0.0 };
    let expected_revenue = (to_decimal(reaction_yield) * REVENUE_FACTOR * to_decimal(conversion)).round_dp(6);

    ActionSimulationResult {
        action,
        effective_mass: mass,
        reaction_yield,
        overcomes_inertia,
        new_energy,
        new_regime,
        expected_revenue,
        confidence: simulation_confidence(entity.history.len(), action),
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Event;

    fn entity_with_history(energy: f64, events: usize) -> Entity {
        let mut e = Entity::new("m-1", energy);
        e.history = (0..events).map(|i| Event::new(i as u64 * 1000, "commit")).collect();
        e
    }

    #[test]
    fn test_commit_effective_mass() {
        let m = effective_mass(ActionType::Commit, 1.0);
        assert_eq!(m.value, 2.0);
        assert_eq!(m.impact_level, ImpactLevel::High);
        assert!((m.quality_score - 0.667).abs() < 0.001);
    }

    #[test]
    fn test_impact_levels_and_quality_cap() {
        assert_eq!(effective_mass(ActionType::View, 1.0).impact_level, ImpactLevel::Low);
        assert_eq!(effective_mass(ActionType::Attendance, 1.0).impact_level, ImpactLevel::Medium);
        assert_eq!(effective_mass(ActionType::Presentation, 5.0).quality_score, 1.0);
        assert_eq!(effective_mass(ActionType::Commit, -2.0).value, 0.0);
        assert_eq!(effective_mass(ActionType::Commit, f64::NAN).value, 0.0);
    }

    #[test]
    fn test_unknown_actions_use_default_multiplier() {
        let a: ActionType = "teleport".parse().unwrap();
        assert_eq!(a, ActionType::Unknown);
        assert_eq!(a.multiplier(), DEFAULT_ACTION_MULTIPLIER);
        assert_eq!("  Commit ".parse::<ActionType>().unwrap(), ActionType::Commit);
        let parsed: ActionType = serde_json::from_str("\"dance\"").unwrap();
        assert_eq!(parsed, ActionType::Unknown);
    }

    #[test]
    fn test_weak_action_is_blocked_by_inertia() {
        // Default inertia break force 7.35 → gate at 3.675
        let e = entity_with_history(100.0, 0);
        let r = simulate(&e, ActionType::Commit, 1.0, Regime::Chaotic);
        assert!(!r.overcomes_inertia);
        assert_eq!(r.new_regime.regime, Regime::Chaotic);
        assert_eq!(r.new_regime.stability, 0.5);
        assert_eq!(r.new_regime.probability, 0.3);
        assert_eq!(r.new_energy, 100.0);
    }

    #[test]
    fn test_strong_action_moves_entity() {
        let e = entity_with_history(100.0, 0);
        let r = simulate(&e, ActionType::Presentation, 2.0, Regime::Stable);
        // 3.0 * 2.0 = 6.0 ≥ 3.675
        assert!(r.overcomes_inertia);
        assert!((r.reaction_yield - 6.0 * 0.85).abs() < 1e-9);
        assert!((r.new_energy - 105.1).abs() < 1e-9);
        assert_eq!(r.new_regime.regime, Regime::Stable);
        assert_eq!(r.expected_revenue, dec!(0.51));
    }

    #[test]
    fn test_post_action_thresholds() {
        assert_eq!(post_action_regime(150.1), Regime::Escape);
        assert_eq!(post_action_regime(150.0), Regime::Stable);
        assert_eq!(post_action_regime(29.9), Regime::Decaying);
        assert_eq!(post_action_regime(30.0), Regime::Stable);
    }

    #[test]
    fn test_push_into_escape() {
        let mut e = entity_with_history(148.0, 0);
        e.friction_coefficient = 0.1;
        let r = simulate(&e, ActionType::Commit, 2.0, Regime::Stable);
        assert!(r.overcomes_inertia);
        assert_eq!(r.new_regime.regime, Regime::Escape);
        assert_eq!(r.new_regime.probability, 1.0);
    }

    #[test]
    fn test_confidence_ladder() {
        assert!((simulation_confidence(0, ActionType::View) - 0.7).abs() < 1e-9);
        assert!((simulation_confidence(11, ActionType::View) - 0.8).abs() < 1e-9);
        assert!((simulation_confidence(21, ActionType::View) - 0.9).abs() < 1e-9);
        assert!((simulation_confidence(21, ActionType::Invest) - 0.95).abs() < 1e-9);
        assert!(simulation_confidence(500, ActionType::Connect) <= 0.95);
        assert!((simulation_confidence(0, ActionType::Connect) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_uses_entity_history() {
        let e = entity_with_history(50.0, 15);
        let r = simulate(&e, ActionType::Review, 1.0, Regime::Stable);
        assert!((r.confidence - 0.8).abs() < 1e-9);
    }
}
