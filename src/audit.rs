// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbit Vitality Engine - System Auditor
//
// Aggregates per-entity results into system health. The audit compares the
// total potential against the previous audit; the previous total travels in
// an explicit `AuditSession` value owned by the caller.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::alert::{Alert, AlertKind, Severity};
use crate::regime::RegimeClassification;
use crate::types::{Entity, EntityId, EnergyLevel, Regime};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Distances below this are treated as this, so a finished goal stays finite.
pub const MIN_DISTANCE_TO_GOAL: f64 = 0.1;

/// Drop relative to the previous total that signals collapse.
pub const COLLAPSE_DROP_RATIO: f64 = 0.1;

/// Share of DECAYING entities past which the population alert is critical.
const MASS_DECAY_CRITICAL_SHARE: f64 = 0.5;

// ---------------------------------------------------------------------------
// System audit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    Stable,
    Declining,
    CollapseWarning,
}

/// State carried from one audit to the next.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AuditSession {
    pub previous_total: Option<f64>,
    pub audits: u64,
}

impl AuditSession {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    pub total_potential: f64,
    pub previous_total: Option<f64>,
    pub delta: f64,
    /// Delta relative to the previous total, in percent (0 without one).
    pub delta_percentage: f64,
    pub status: AuditStatus,
}

impl AuditResult {
    /// Session to pass into the next audit.
    pub fn next_session(&self, session: &AuditSession) -> AuditSession {
        AuditSession {
            previous_total: Some(self.total_potential),
            audits: session.audits + 1,
        }
    }
}

/// Potential contributed by one entity: `mass / max(distance, 0.1)`.
pub fn entity_potential(entity: &Entity) -> f64 {
    let mass = if entity.mass.is_finite() && entity.mass > 0.0 { entity.mass } else { 1.0 };
    let distance = if entity.distance_to_goal.is_finite() {
        entity.distance_to_goal.max(MIN_DISTANCE_TO_GOAL)
    } else {
        MIN_DISTANCE_TO_GOAL
    };
    mass / distance
}

pub fn audit_status(delta: f64, previous: Option<f64>) -> AuditStatus {
    match previous {
        Some(prev) if delta < -COLLAPSE_DROP_RATIO * prev => AuditStatus::CollapseWarning,
        _ if delta < 0.0 => AuditStatus::Declining,
        _ => AuditStatus::Stable,
    }
}

/// Sum the population's potential and compare it with the session's
/// previous total. The first audit of a session has zero delta.
pub fn audit_system(entities: &[Entity], session: &AuditSession) -> AuditResult {
    let total_potential: f64 = entities.iter().map(entity_potential).sum();
    let delta = session.previous_total.map_or(0.0, |prev| total_potential - prev);
    let delta_percentage = match session.previous_total {
        Some(prev) if prev != 0.0 => delta / prev * 100.0,
        _ => 0.0,
    };
    let status = audit_status(delta, session.previous_total);

    if status != AuditStatus::Stable {
        info!(total_potential, delta, ?status, "system audit flagged decline");
    }

    AuditResult {
        total_potential,
        previous_total: session.previous_total,
        delta,
        delta_percentage,
        status,
    }
}

// ---------------------------------------------------------------------------
// Batch summary
// ---------------------------------------------------------------------------

/// Per-entity inputs the batch summary needs.
#[derive(Debug, Clone, Copy)]
pub struct Classified<'a> {
    pub id: &'a EntityId,
    pub energy: f64,
    pub classification: &'a RegimeClassification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub by_regime: BTreeMap<Regime, usize>,
    pub average_energy: f64,
    pub healthy_count: usize,
}

/// Group by regime, average energy, and count healthy members.
pub fn summarize(items: &[Classified<'_>]) -> BatchSummary {
    let mut by_regime: BTreeMap<Regime, usize> = Regime::ALL.iter().map(|r| (*r, 0)).collect();
    for item in items {
        *by_regime.entry(item.classification.regime).or_default() += 1;
    }
    let average_energy = if items.is_empty() {
        0.0
    } else {
        items.iter().map(|i| i.energy).sum::<f64>() / items.len() as f64
    };
    BatchSummary {
        total: items.len(),
        by_regime,
        average_energy,
        healthy_count: items
            .iter()
            .filter(|i| i.classification.energy_level.is_healthy())
            .count(),
    }
}

/// Population-level alerts: mass decay, chaos, and critical-energy members.
pub fn population_alerts(
    items: &[Classified<'_>],
    decaying_threshold: f64,
    now_ms: u64,
    ttl_ms: u64,
) -> Vec<Alert> {
    let mut alerts = Vec::new();
    if items.is_empty() {
        return alerts;
    }

    let ids_where = |pred: &dyn Fn(&Classified<'_>) -> bool| -> Vec<EntityId> {
        items.iter().filter(|i| pred(*i)).map(|i| i.id.clone()).collect()
    };

    let decaying = ids_where(&|i| i.classification.regime == Regime::Decaying);
    let share = decaying.len() as f64 / items.len() as f64;
    if share > decaying_threshold {
        let severity = if share > MASS_DECAY_CRITICAL_SHARE { Severity::Critical } else { Severity::Warning };
        alerts.push(Alert::new(
            AlertKind::MassDecay,
            severity,
            format!("{:.0}% of entities are decaying", share * 100.0),
            decaying,
            now_ms,
            ttl_ms,
        ));
    }

    let chaotic = ids_where(&|i| i.classification.regime == Regime::Chaotic);
    if !chaotic.is_empty() {
        alerts.push(Alert::new(
            AlertKind::ChaosDetected,
            Severity::Warning,
            format!("{} chaotic entit{}", chaotic.len(), if chaotic.len() == 1 { "y" } else { "ies" }),
            chaotic,
            now_ms,
            ttl_ms,
        ));
    }

    let critical = ids_where(&|i| i.classification.energy_level == EnergyLevel::Critical);
    if !critical.is_empty() {
        alerts.push(Alert::new(
            AlertKind::ExtinctionImminent,
            Severity::Critical,
            format!("{} entities at critical energy", critical.len()),
            critical,
            now_ms,
            ttl_ms,
        ));
    }

    alerts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: &str, mass: f64, distance: f64) -> Entity {
        let mut e = Entity::new(id, 50.0);
        e.mass = mass;
        e.distance_to_goal = distance;
        e
    }

    fn classification(regime: Regime, level: EnergyLevel) -> RegimeClassification {
        RegimeClassification { regime, stability: 0.5, energy_level: level }
    }

    #[test]
    fn test_potential_guards_distance() {
        assert!((entity_potential(&entity("a", 2.0, 4.0)) - 0.5).abs() < 1e-9);
        assert!((entity_potential(&entity("a", 1.0, 0.0)) - 10.0).abs() < 1e-9);
        assert!((entity_potential(&entity("a", 1.0, -3.0)) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_first_audit_is_stable() {
        let result = audit_system(&[entity("a", 1.0, 1.0)], &AuditSession::new());
        assert_eq!(result.status, AuditStatus::Stable);
        assert_eq!(result.delta, 0.0);
        assert_eq!(result.previous_total, None);
    }

    #[test]
    fn test_session_threads_previous_total() {
        let session = AuditSession::new();
        let first = audit_system(&[entity("a", 10.0, 1.0)], &session);
        let session = first.next_session(&session);
        assert_eq!(session.previous_total, Some(10.0));
        assert_eq!(session.audits, 1);

        // 10 → 9.5: small decline
        let second = audit_system(&[entity("a", 9.5, 1.0)], &session);
        assert_eq!(second.status, AuditStatus::Declining);
        assert!((second.delta_percentage + 5.0).abs() < 1e-9);

        // 10 → 8: collapse warning
        let third = audit_system(&[entity("a", 8.0, 1.0)], &session);
        assert_eq!(third.status, AuditStatus::CollapseWarning);

        // 10 → 12: growth
        let fourth = audit_system(&[entity("a", 12.0, 1.0)], &session);
        assert_eq!(fourth.status, AuditStatus::Stable);
    }

    #[test]
    fn test_exactly_ten_percent_drop_is_declining() {
        assert_eq!(audit_status(-1.0, Some(10.0)), AuditStatus::Declining);
        assert_eq!(audit_status(-1.01, Some(10.0)), AuditStatus::CollapseWarning);
    }

    #[test]
    fn test_summary_counts() {
        let ids: Vec<EntityId> = ["a", "b", "c"].iter().map(|s| EntityId::from(*s)).collect();
        let cs = [
            classification(Regime::Stable, EnergyLevel::Normal),
            classification(Regime::Stable, EnergyLevel::High),
            classification(Regime::Decaying, EnergyLevel::Critical),
        ];
        let items: Vec<Classified<'_>> = ids
            .iter()
            .zip(cs.iter())
            .zip([100.0, 150.0, 5.0])
            .map(|((id, c), energy)| Classified { id, energy, classification: c })
            .collect();
        let s = summarize(&items);
        assert_eq!(s.total, 3);
        assert_eq!(s.by_regime[&Regime::Stable], 2);
        assert_eq!(s.by_regime[&Regime::Decaying], 1);
        assert_eq!(s.by_regime[&Regime::Chaotic], 0);
        assert_eq!(s.healthy_count, 2);
        assert!((s.average_energy - 85.0).abs() < 1e-9);
    }

    #[test]
    fn test_population_alerts() {
        let ids: Vec<EntityId> = ["a", "b", "c"].iter().map(|s| EntityId::from(*s)).collect();
        let cs = [
            classification(Regime::Decaying, EnergyLevel::Critical),
            classification(Regime::Chaotic, EnergyLevel::Normal),
            classification(Regime::Stable, EnergyLevel::Normal),
        ];
        let items: Vec<Classified<'_>> = ids
            .iter()
            .zip(cs.iter())
            .map(|(id, c)| Classified { id, energy: 10.0, classification: c })
            .collect();
        let alerts = population_alerts(&items, 0.3, 0, 60_000);
        let kinds: Vec<AlertKind> = alerts.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::MassDecay, AlertKind::ChaosDetected, AlertKind::ExtinctionImminent]);
        // 1/3 decaying: above 30%, below 50%
        assert_eq!(alerts[0].severity, Severity::Warning);
        assert_eq!(alerts[1].affected_entity_ids, vec![EntityId::from("b")]);
    }

    #[test]
    fn test_quiet_population_has_no_alerts() {
        let id = EntityId::from("a");
        let c = classification(Regime::Stable, EnergyLevel::Normal);
        let items = [Classified { id: &id, energy: 80.0, classification: &c }];
        assert!(population_alerts(&items, 0.3, 0, 60_000).is_empty());
        assert!(population_alerts(&[], 0.3, 0, 60_000).is_empty());
    }
}
