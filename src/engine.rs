// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbit Vitality Engine - Engine Facade
//
// The library surface a host dashboard calls: per-entity evaluation, action
// simulation, metric recording, system audit and batch evaluation. Every
// method has an `_at` twin taking the clock explicitly, so identical inputs
// give identical outputs.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;

use crate::adapter;
use crate::alert::{Alert, AlertListener};
use crate::audit::{self, AuditResult, AuditSession, BatchSummary, Classified};
use crate::config::EngineConfig;
use crate::decay::{decay, DecayResult};
use crate::error::{ensure_finite, Result};
use crate::inertia::{inertia, InertiaResult};
use crate::reaction::{self, ActionSimulationResult, ActionType};
use crate::regime::{classify, RegimeClassification};
use crate::resonance::{find_resonant_path, ResonanceResult};
use crate::trend::{MetricInput, MetricSample, TrendPredictor, TrendReport};
use crate::types::{Entity, EntityId, RawEnergy, Regime};

// ─── Clock ──────────────────────────────────────────────────────────────────

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = Date, js_name = now)]
    fn date_now() -> f64;
}

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        date_now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

// ─── Results ────────────────────────────────────────────────────────────────

/// Everything computed for one entity on the main pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityEvaluation {
    pub id: EntityId,
    pub decay: DecayResult,
    pub inertia: InertiaResult,
    pub resonance: ResonanceResult,
    pub classification: RegimeClassification,
}

impl EntityEvaluation {
    pub fn regime(&self) -> Regime {
        self.classification.regime
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub results: Vec<EntityEvaluation>,
    pub summary: BatchSummary,
    pub alerts: Vec<Alert>,
    /// Entities left out because their inputs were not numbers.
    pub skipped: Vec<EntityId>,
}

/// Decay, inertia and resonance feed the classifier; energy is classified
/// after decay.
pub fn evaluate(entity: &Entity, config: &EngineConfig, now_ms: u64) -> Result<EntityEvaluation> {
    let energy = ensure_finite("energy", entity.energy)?;

    let decay = decay(energy, entity.last_activity, now_ms);
    let inertia = inertia(
        Some(entity.mass),
        Some(entity.friction_coefficient),
        Some(entity.connection_count),
    );
    let resonance = find_resonant_path(&entity.history);
    let classification = classify(
        RawEnergy(decay.value),
        inertia.value,
        &resonance,
        config.raw_energy_ceiling,
    );

    debug!(
        entity = %entity.id,
        energy = decay.value,
        inertia = inertia.value,
        resonance = resonance.strength,
        regime = %classification.regime,
        "entity classified"
    );

    Ok(EntityEvaluation {
        id: entity.id.clone(),
        decay,
        inertia,
        resonance,
        classification,
    })
}

// ─── Engine ─────────────────────────────────────────────────────────────────

/// Stateless evaluation plus the one stateful path: the trend predictor.
#[wasm_bindgen]
#[derive(Debug)]
pub struct VitalityEngine {
    config: EngineConfig,
    predictor: TrendPredictor,
}

impl Default for VitalityEngine {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl VitalityEngine {
    pub fn with_config(config: EngineConfig) -> Self {
        let predictor = TrendPredictor::new(&config);
        Self { config, predictor }
    }

    pub fn from_env() -> Self {
        Self::with_config(EngineConfig::from_env())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // --- Evaluation ---------------------------------------------------------

    pub fn evaluate_entity(&self, entity: &Entity) -> Result<EntityEvaluation> {
        self.evaluate_entity_at(entity, now_ms())
    }

    pub fn evaluate_entity_at(&self, entity: &Entity, now_ms: u64) -> Result<EntityEvaluation> {
        evaluate(entity, &self.config, now_ms)
    }

    // --- Reaction -----------------------------------------------------------

    pub fn simulate_action(
        &self,
        entity: &Entity,
        action: ActionType,
        intensity: f64,
    ) -> Result<ActionSimulationResult> {
        self.simulate_action_at(entity, action, intensity, now_ms())
    }

    /// Simulate `action` from the entity's currently classified regime.
    pub fn simulate_action_at(
        &self,
        entity: &Entity,
        action: ActionType,
        intensity: f64,
        now_ms: u64,
    ) -> Result<ActionSimulationResult> {
        let intensity = ensure_finite("intensity", intensity)?;
        let current = self.evaluate_entity_at(entity, now_ms)?;
        let result = reaction::simulate(entity, action, intensity, current.regime());
        debug!(
            entity = %entity.id,
            %action,
            moved = result.overcomes_inertia,
            regime = %result.new_regime.regime,
            "action simulated"
        );
        Ok(result)
    }

    // --- Trends -------------------------------------------------------------

    pub fn record_metric(&mut self, entity_id: &EntityId, input: MetricInput) -> Result<Vec<Alert>> {
        self.record_metric_at(entity_id, input, now_ms())
    }

    pub fn record_metric_at(
        &mut self,
        entity_id: &EntityId,
        input: MetricInput,
        now_ms: u64,
    ) -> Result<Vec<Alert>> {
        ensure_finite("k", input.k)?;
        ensure_finite("i", input.i)?;
        ensure_finite("omega", input.omega)?;
        ensure_finite("r", input.r)?;
        Ok(self.predictor.record(entity_id, MetricSample::new(input, now_ms)))
    }

    pub fn trend(&self, entity_id: &EntityId) -> Option<TrendReport> {
        self.predictor.trend(entity_id)
    }

    pub fn subscribe(&mut self, listener: Box<dyn AlertListener>) {
        self.predictor.subscribe(listener);
    }

    pub fn predictor(&self) -> &TrendPredictor {
        &self.predictor
    }

    pub fn forget(&mut self, entity_id: &EntityId) -> bool {
        self.predictor.forget(entity_id)
    }

    // --- Population ---------------------------------------------------------

    pub fn audit_system(&self, entities: &[Entity], session: &AuditSession) -> AuditResult {
        audit::audit_system(entities, session)
    }

    pub fn batch_evaluate(&self, entities: &[Entity]) -> BatchReport {
        self.batch_evaluate_at(entities, now_ms())
    }

    /// Evaluate every entity, summarize the population and raise population
    /// alerts. Entities with non-numeric inputs are skipped, not fatal.
    pub fn batch_evaluate_at(&self, entities: &[Entity], now_ms: u64) -> BatchReport {
        let mut results = Vec::with_capacity(entities.len());
        let mut skipped = Vec::new();
        for entity in entities {
            match self.evaluate_entity_at(entity, now_ms) {
                Ok(evaluation) => results.push(evaluation),
                Err(e) => {
                    warn!(entity = %entity.id, error = %e, "skipping entity in batch");
                    skipped.push(entity.id.clone());
                }
            }
        }

        let items: Vec<Classified<'_>> = results
            .iter()
            .map(|r| Classified {
                id: &r.id,
                energy: r.decay.value,
                classification: &r.classification,
            })
            .collect();
        let summary = audit::summarize(&items);
        let alerts = audit::population_alerts(
            &items,
            self.config.decaying_population_threshold,
            now_ms,
            self.config.alert_ttl_ms,
        );

        BatchReport { results, summary, alerts, skipped }
    }

    pub fn batch_evaluate_records(&self, records: &[serde_json::Value]) -> BatchReport {
        self.batch_evaluate_records_at(records, now_ms())
    }

    /// Batch evaluation straight from host records. Records the adapter
    /// rejects are listed in `skipped` alongside entities that fail
    /// evaluation.
    pub fn batch_evaluate_records_at(&self, records: &[serde_json::Value], now_ms: u64) -> BatchReport {
        let (entities, rejected) = adapter::normalize_entities_lenient(records);
        let mut report = self.batch_evaluate_at(&entities, now_ms);
        let mut skipped = rejected;
        skipped.append(&mut report.skipped);
        report.skipped = skipped;
        report
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::types::{Event, LastSeen};

    const NOW: u64 = 1_700_000_000_000;

    #[test]
    fn test_evaluate_classifies_decayed_energy() {
        let engine = VitalityEngine::default();
        let mut e = Entity::new("m-1", 100.0);
        e.last_activity = Some(LastSeen::Hours(72.0));
        let r = engine.evaluate_entity_at(&e, NOW).unwrap();
        // 100 → ~2.73 after 72h, below the DECAYING threshold
        assert!((r.decay.value - 2.73).abs() < 0.01);
        assert_eq!(r.regime(), Regime::Decaying);
    }

    #[test]
    fn test_evaluate_rejects_nan_energy() {
        let engine = VitalityEngine::default();
        let e = Entity::new("bad", f64::NAN);
        let err = engine.evaluate_entity_at(&e, NOW).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { field: "energy", .. }));
    }

    #[test]
    fn test_simulation_starts_from_classified_regime() {
        let engine = VitalityEngine::default();
        let mut e = Entity::new("m-2", 100.0);
        e.mass = 20.0;
        e.friction_coefficient = 0.5;
        // inertia 98 → CHAOTIC; a view cannot move it
        let r = engine.simulate_action_at(&e, ActionType::View, 1.0, NOW).unwrap();
        assert!(!r.overcomes_inertia);
        assert_eq!(r.new_regime.regime, Regime::Chaotic);
    }

    #[test]
    fn test_simulation_rejects_nan_intensity() {
        let engine = VitalityEngine::default();
        let e = Entity::new("m", 10.0);
        assert!(engine.simulate_action_at(&e, ActionType::Commit, f64::NAN, NOW).is_err());
    }

    #[test]
    fn test_record_metric_validates_inputs() {
        let mut engine = VitalityEngine::default();
        let id = EntityId::from("t");
        let bad = MetricInput { k: f64::INFINITY, i: 0.0, omega: 0.0, r: 0.0 };
        assert!(engine.record_metric_at(&id, bad, NOW).is_err());
        assert_eq!(engine.predictor().sample_count(&id), 0);
    }

    #[test]
    fn test_batch_from_records_keeps_good_entities() {
        let engine = VitalityEngine::default();
        let records = vec![
            serde_json::json!({"id": "ok", "energy": 100.0}),
            serde_json::json!({"id": "bad", "energy": "lots"}),
            serde_json::json!({"id": "steady", "potential": 60.0, "node_mass": 2.0}),
        ];
        let report = engine.batch_evaluate_records_at(&records, NOW);
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.skipped, vec![EntityId::from("bad")]);
    }

    #[test]
    fn test_batch_skips_invalid_entities() {
        let engine = VitalityEngine::default();
        let mut chaotic = Entity::new("heavy", 100.0);
        chaotic.mass = 20.0;
        let mut resonant = Entity::new("steady", 60.0);
        resonant.history = (0..5).map(|n| Event::new(n * 3_600_000, "commit")).collect();
        let entities = vec![
            Entity::new("ok", 100.0),
            Entity::new("nan", f64::NAN),
            chaotic,
            resonant,
        ];
        let report = engine.batch_evaluate_at(&entities, NOW);
        assert_eq!(report.results.len(), 3);
        assert_eq!(report.skipped, vec![EntityId::from("nan")]);
        assert_eq!(report.summary.by_regime[&Regime::Chaotic], 1);
        assert_eq!(report.summary.by_regime[&Regime::Resonant], 1);
        assert!(report.alerts.iter().any(|a| a.kind == crate::alert::AlertKind::ChaosDetected));
    }
}
