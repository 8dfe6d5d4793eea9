// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbit Vitality Engine - Type Definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Raw numbers below this are elapsed hours; anything else is a ms timestamp.
pub const LAST_SEEN_HOURS_CUTOFF: f64 = 10_000.0;

pub const DEFAULT_MASS: f64 = 1.0;
pub const DEFAULT_FRICTION: f64 = 0.5;
pub const DEFAULT_EFFICIENCY: f64 = 0.85;
pub const DEFAULT_CONVERSION_RATE: f64 = 1.0;
pub const DEFAULT_DISTANCE_TO_GOAL: f64 = 1.0;

const MS_PER_HOUR: f64 = 3_600_000.0;

// ─── Identity ────────────────────────────────────────────────────────────────

/// Identifier of a tracked entity (member, task or node).
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self { EntityId(s) }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self { EntityId(s.to_string()) }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    #[default]
    Member,
    Task,
    Node,
}

// ─── Energy Scales ───────────────────────────────────────────────────────────

/// Energy on the unbounded orbital scale (roughly 0..200+).
///
/// Regime thresholds (20, 150, ...) are expressed on this scale.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
pub struct RawEnergy(pub f64);

/// Energy on the 0..1 vitality scale used by the level bands.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
pub struct NormalizedEnergy(pub f64);

impl RawEnergy {
    pub fn value(self) -> f64 { self.0 }
}

impl NormalizedEnergy {
    pub fn value(self) -> f64 { self.0 }

    /// The single bridge between the two scales: `raw / ceiling`.
    ///
    /// Not clamped above, so energies past the ceiling land in the
    /// `Overflow` band. A non-positive ceiling yields zero.
    pub fn from_raw(raw: RawEnergy, ceiling: f64) -> Self {
        if ceiling <= 0.0 || !ceiling.is_finite() {
            return Self(0.0);
        }
        Self((raw.0 / ceiling).max(0.0))
    }
}

/// Vitality band of a normalized energy value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EnergyLevel {
    Critical,
    Low,
    Normal,
    High,
    Overflow,
}

impl EnergyLevel {
    pub fn classify(energy: NormalizedEnergy) -> Self {
        let e = energy.0;
        if e >= 1.0 {
            Self::Overflow
        } else if e >= 0.7 {
            Self::High
        } else if e >= 0.3 {
            Self::Normal
        } else if e >= 0.1 {
            Self::Low
        } else {
            Self::Critical
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Normal | Self::High)
    }
}

/// `0.3 <= energy < 1.0` on the normalized scale.
pub fn is_healthy(energy: NormalizedEnergy) -> bool {
    EnergyLevel::classify(energy).is_healthy()
}

// ─── Activity ────────────────────────────────────────────────────────────────

/// When an entity was last active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LastSeen {
    /// Elapsed hours, given directly.
    Hours(f64),
    /// Milliseconds since the Unix epoch.
    Timestamp(u64),
}

impl LastSeen {
    /// Interpret a bare number the way host records encode it.
    /// Non-finite input counts as just seen.
    pub fn from_raw(raw: f64) -> Self {
        if !raw.is_finite() {
            Self::Hours(0.0)
        } else if raw < LAST_SEEN_HOURS_CUTOFF {
            Self::Hours(raw.max(0.0))
        } else {
            Self::Timestamp(raw as u64)
        }
    }

    /// Elapsed hours relative to `now_ms`, never negative.
    pub fn hours_since(&self, now_ms: u64) -> f64 {
        match *self {
            Self::Hours(h) if h.is_finite() => h.max(0.0),
            Self::Hours(_) => 0.0,
            Self::Timestamp(t) => now_ms.saturating_sub(t) as f64 / MS_PER_HOUR,
        }
    }
}

/// A single behavioral event in an entity's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Event {
    pub fn new(timestamp: u64, kind: impl Into<String>) -> Self {
        Self { timestamp, kind: kind.into(), value: None, metadata: BTreeMap::new() }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    /// Value, if present and finite.
    pub fn finite_value(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite())
    }
}

// ─── Entity ──────────────────────────────────────────────────────────────────

/// Canonical tracked entity. Heterogeneous host shapes are normalized into
/// this by `adapter::normalize_entity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    #[serde(default)]
    pub kind: EntityKind,
    pub energy: f64,
    #[serde(default = "default_mass")]
    pub mass: f64,
    #[serde(default = "default_friction")]
    pub friction_coefficient: f64,
    #[serde(default)]
    pub connection_count: u32,
    #[serde(default)]
    pub last_activity: Option<LastSeen>,
    /// Caller-owned; the engine only reads it.
    #[serde(default)]
    pub history: Vec<Event>,
    #[serde(default = "default_efficiency")]
    pub efficiency: f64,
    #[serde(default = "default_conversion_rate")]
    pub conversion_rate: f64,
    /// Interaction index "I", -1..+1.
    #[serde(default)]
    pub interaction_index: f64,
    /// Entropy "Ω", 0..1.
    #[serde(default)]
    pub entropy: f64,
    #[serde(default)]
    pub urgency: f64,
    #[serde(default = "default_distance_to_goal")]
    pub distance_to_goal: f64,
}

fn default_mass() -> f64 { DEFAULT_MASS }
fn default_friction() -> f64 { DEFAULT_FRICTION }
fn default_efficiency() -> f64 { DEFAULT_EFFICIENCY }
fn default_conversion_rate() -> f64 { DEFAULT_CONVERSION_RATE }
fn default_distance_to_goal() -> f64 { DEFAULT_DISTANCE_TO_GOAL }

impl Entity {
    pub fn new(id: impl Into<EntityId>, energy: f64) -> Self {
        Self {
            id: id.into(),
            kind: EntityKind::default(),
            energy,
            mass: DEFAULT_MASS,
            friction_coefficient: DEFAULT_FRICTION,
            connection_count: 0,
            last_activity: None,
            history: Vec::new(),
            efficiency: DEFAULT_EFFICIENCY,
            conversion_rate: DEFAULT_CONVERSION_RATE,
            interaction_index: 0.0,
            entropy: 0.0,
            urgency: 0.0,
            distance_to_goal: DEFAULT_DISTANCE_TO_GOAL,
        }
    }

    pub fn raw_energy(&self) -> RawEnergy {
        RawEnergy(self.energy)
    }
}

// ─── Regime ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    Stable,
    Decaying,
    Escape,
    Resonant,
    Chaotic,
}

impl Regime {
    pub const ALL: [Regime; 5] = [
        Regime::Stable,
        Regime::Decaying,
        Regime::Escape,
        Regime::Resonant,
        Regime::Chaotic,
    ];

    /// Stability before the energy-health multiplier is applied.
    pub fn base_stability(&self) -> f64 {
        match self {
            Self::Stable => 0.9,
            Self::Resonant => 0.95,
            Self::Decaying => 0.3,
            Self::Escape => 0.2,
            Self::Chaotic => 0.1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Stable => "STABLE",
            Self::Decaying => "DECAYING",
            Self::Escape => "ESCAPE",
            Self::Resonant => "RESONANT",
            Self::Chaotic => "CHAOTIC",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
