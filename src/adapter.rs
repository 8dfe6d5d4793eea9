//! Adapter layer: normalizes heterogeneous host records into the canonical
//! [`Entity`] and converts f64 amounts to `Decimal` for revenue figures.
//!
//! Hosts send entities in several shapes (`mass` or `node_mass`, `energy` or
//! `potential`, camelCase or snake_case). All field fallbacks live here so
//! the core only ever sees one schema.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{EngineError, Result};
use crate::types::*;

/// Convert f64 to Decimal (lossy but sufficient for projections).
pub fn to_decimal(v: f64) -> Decimal {
    Decimal::from_f64(v).unwrap_or(Decimal::ZERO)
}

/// Convert Decimal to f64.
pub fn from_decimal(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// First present key among `keys`.
fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k).filter(|v| !v.is_null()))
}

/// Optional numeric field. Present but non-numeric is an error.
fn number(obj: &Map<String, Value>, name: &'static str, keys: &[&str]) -> Result<Option<f64>> {
    match field(obj, keys) {
        None => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| EngineError::invalid(name, format!("expected a number, got {v}"))),
    }
}

/// Normalize one host record into an [`Entity`].
///
/// Energy is required and must be numeric; every other field falls back to
/// its default. Malformed history entries are skipped.
pub fn normalize_entity(record: &Value) -> Result<Entity> {
    let obj = record
        .as_object()
        .ok_or_else(|| EngineError::invalid("entity", "expected an object"))?;

    let id = match field(obj, &["id", "entity_id", "entityId", "node_id"]) {
        Some(Value::String(s)) => EntityId(s.clone()),
        Some(Value::Number(n)) => EntityId(n.to_string()),
        Some(other) => return Err(EngineError::invalid("id", format!("expected a string, got {other}"))),
        None => return Err(EngineError::invalid("id", "missing")),
    };

    let energy = number(obj, "energy", &["energy", "potential", "node_energy"])?
        .ok_or_else(|| EngineError::invalid("energy", "missing"))?;

    let kind = match field(obj, &["kind", "entity_type", "entityType"]).and_then(Value::as_str) {
        Some("task") => EntityKind::Task,
        Some("node") => EntityKind::Node,
        _ => EntityKind::Member,
    };

    let mut entity = Entity::new(id, energy);
    entity.kind = kind;

    if let Some(m) = number(obj, "mass", &["mass", "node_mass", "nodeMass"])? {
        entity.mass = m;
    }
    if let Some(f) = number(obj, "friction_coefficient", &["friction_coefficient", "frictionCoefficient", "friction"])? {
        entity.friction_coefficient = f;
    }
    if let Some(c) = number(obj, "connection_count", &["connection_count", "connectionCount", "connections"])? {
        entity.connection_count = if c.is_finite() && c > 0.0 { c.min(u32::MAX as f64) as u32 } else { 0 };
    }
    if let Some(e) = number(obj, "efficiency", &["efficiency"])? {
        entity.efficiency = e;
    }
    if let Some(r) = number(obj, "conversion_rate", &["conversion_rate", "conversionRate"])? {
        entity.conversion_rate = r;
    }
    if let Some(i) = number(obj, "interaction_index", &["interaction_index", "interactionIndex", "I"])? {
        entity.interaction_index = i;
    }
    if let Some(o) = number(obj, "entropy", &["entropy", "omega"])? {
        entity.entropy = o;
    }
    if let Some(u) = number(obj, "urgency", &["urgency"])? {
        entity.urgency = u;
    }
    if let Some(d) = number(obj, "distance_to_goal", &["distance_to_goal", "distanceToGoal"])? {
        entity.distance_to_goal = d;
    }
    if let Some(l) = number(obj, "last_activity", &["last_activity", "lastActivity", "last_seen", "lastSeen"])? {
        entity.last_activity = Some(LastSeen::from_raw(l));
    }

    if let Some(history) = field(obj, &["history", "events"]) {
        entity.history = normalize_history(&entity.id, history);
    }

    Ok(entity)
}

/// Keep the well-formed entries of a history array, in order.
pub fn normalize_history(owner: &EntityId, history: &Value) -> Vec<Event> {
    let Some(entries) = history.as_array() else {
        warn!(entity = %owner, "history is not an array; ignoring");
        return Vec::new();
    };

    let events: Vec<Event> = entries.iter().filter_map(normalize_event).collect();
    let skipped = entries.len() - events.len();
    if skipped > 0 {
        warn!(entity = %owner, skipped, "dropped malformed history entries");
    }
    events
}

fn normalize_event(entry: &Value) -> Option<Event> {
    let obj = entry.as_object()?;
    let timestamp = field(obj, &["timestamp", "ts", "time"])?.as_f64()?;
    if !timestamp.is_finite() || timestamp < 0.0 {
        return None;
    }
    let kind = field(obj, &["type", "kind", "action"])?.as_str()?.to_string();

    let mut event = Event::new(timestamp as u64, kind);
    event.value = field(obj, &["value", "amount"])
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite());
    if let Some(Value::Object(meta)) = field(obj, &["metadata", "meta"]) {
        event.metadata = meta.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    }
    Some(event)
}

/// Normalize a batch, failing on the first record with an unusable energy.
pub fn normalize_entities(records: &[Value]) -> Result<Vec<Entity>> {
    records.iter().map(normalize_entity).collect()
}

/// Normalize a batch, setting aside records that cannot be normalized.
///
/// Rejected records are reported by their id when one can be read, and by
/// their position (`#3`) otherwise.
pub fn normalize_entities_lenient(records: &[Value]) -> (Vec<Entity>, Vec<EntityId>) {
    let mut entities = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    for (index, record) in records.iter().enumerate() {
        match normalize_entity(record) {
            Ok(entity) => entities.push(entity),
            Err(e) => {
                let id = record
                    .as_object()
                    .and_then(|obj| field(obj, &["id", "entity_id", "entityId", "node_id"]))
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .unwrap_or_else(|| format!("#{index}"));
                warn!(entity = %id, error = %e, "skipping record in batch");
                rejected.push(EntityId(id));
            }
        }
    }
    (entities, rejected)
}
