// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbit Vitality Engine

pub mod types;
pub mod error;
pub mod config;
pub mod decay;
pub mod inertia;
pub mod resonance;
pub mod regime;
pub mod reaction;
pub mod alert;
pub mod trend;
pub mod audit;
pub mod adapter;
pub mod engine;

pub use types::*;
pub use alert::{Alert, AlertKind, AlertListener, Severity};
pub use audit::{AuditResult, AuditSession, AuditStatus};
pub use config::EngineConfig;
pub use engine::{BatchReport, EntityEvaluation, VitalityEngine};
pub use error::EngineError;
pub use reaction::{ActionSimulationResult, ActionType};
pub use trend::{MetricInput, TrendReport};

use serde::Serialize;
use wasm_bindgen::prelude::*;

// ─── WASM Interface ──────────────────────────────────────────────────────────

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

fn entity_from_js(value: JsValue) -> Result<Entity, JsValue> {
    let record: serde_json::Value = serde_wasm_bindgen::from_value(value)?;
    adapter::normalize_entity(&record).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn entities_from_js(value: JsValue) -> Result<Vec<Entity>, JsValue> {
    let records: Vec<serde_json::Value> = serde_wasm_bindgen::from_value(value)?;
    adapter::normalize_entities(&records).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[derive(Serialize)]
struct AuditReply {
    result: AuditResult,
    session: AuditSession,
}

#[wasm_bindgen]
impl VitalityEngine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        VitalityEngine::default()
    }

    /// Classify one host entity record.
    pub fn evaluate(&self, entity: JsValue) -> Result<JsValue, JsValue> {
        let entity = entity_from_js(entity)?;
        let evaluation = self
            .evaluate_entity(&entity)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_js(&evaluation)
    }

    /// Simulate an action tag (unknown tags use the default multiplier).
    pub fn simulate(&self, entity: JsValue, action: &str, intensity: f64) -> Result<JsValue, JsValue> {
        let entity = entity_from_js(entity)?;
        let action: ActionType = action.parse().unwrap_or(ActionType::Unknown);
        let result = self
            .simulate_action(&entity, action, intensity)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_js(&result)
    }

    /// Record a metric sample; returns the alerts it raised.
    pub fn record(&mut self, entity_id: &str, k: f64, i: f64, omega: f64, r: f64) -> Result<JsValue, JsValue> {
        let alerts = self
            .record_metric(&EntityId::from(entity_id), MetricInput { k, i, omega, r })
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_js(&alerts)
    }

    /// Current trend report, or `null` with too few samples.
    #[wasm_bindgen(js_name = trend)]
    pub fn trend_js(&self, entity_id: &str) -> Result<JsValue, JsValue> {
        match self.trend(&EntityId::from(entity_id)) {
            Some(report) => to_js(&report),
            None => Ok(JsValue::NULL),
        }
    }

    /// Audit a population. Pass the returned `session` into the next call.
    pub fn audit(&self, entities: JsValue, session: JsValue) -> Result<JsValue, JsValue> {
        let entities = entities_from_js(entities)?;
        let session: AuditSession = if session.is_null() || session.is_undefined() {
            AuditSession::new()
        } else {
            serde_wasm_bindgen::from_value(session)?
        };
        let result = self.audit_system(&entities, &session);
        to_js(&AuditReply { session: result.next_session(&session), result })
    }

    /// Evaluate a population. Records that cannot be read are listed in
    /// `skipped` instead of failing the call.
    pub fn batch(&self, entities: JsValue) -> Result<JsValue, JsValue> {
        let records: Vec<serde_json::Value> = serde_wasm_bindgen::from_value(entities)?;
        to_js(&self.batch_evaluate_records(&records))
    }
}
