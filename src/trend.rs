// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbit Vitality Engine - Trend Predictor
//
// Keeps a bounded FIFO of (K, I, Ω, r) samples per entity, compares the two
// halves of the window to label each axis rising, falling or stable, and
// projects the next value from the last two points. Alerts raised by a
// sample are handed to every listener before `record` returns.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

use crate::alert::{Alert, AlertKind, AlertListener, Severity};
use crate::config::EngineConfig;
use crate::types::EntityId;

// ─── Constants ──────────────────────────────────────────────────────────────

/// Half-to-half average change that counts as a trend.
pub const TREND_THRESHOLD: f64 = 0.05;

/// Scale applied per projection step.
pub const STEP_SCALE: f64 = 0.1;

const CONFLICT_I: f64 = -0.2;
const CONFLICT_CRITICAL_I: f64 = -0.5;
const EFFICIENCY_K: f64 = 0.5;
const EFFICIENCY_CRITICAL_K: f64 = 0.3;
const ENTROPY_OMEGA: f64 = 0.7;
const ENTROPY_CRITICAL_OMEGA: f64 = 0.85;
const EXTINCTION_K: f64 = 0.3;
const SYNERGY_I: f64 = 0.7;

// ─── Samples ────────────────────────────────────────────────────────────────

/// Metric values supplied by the host, before they are timestamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricInput {
    /// Efficiency / mass.
    pub k: f64,
    /// Interaction / cooperation, -1..+1.
    pub i: f64,
    /// Entropy, 0..1.
    pub omega: f64,
    /// Growth rate.
    pub r: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub k: f64,
    pub i: f64,
    pub omega: f64,
    pub r: f64,
    pub timestamp: u64,
}

impl MetricSample {
    pub fn new(input: MetricInput, timestamp: u64) -> Self {
        Self { k: input.k, i: input.i, omega: input.omega, r: input.r, timestamp }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
}

impl TrendDirection {
    pub fn from_delta(delta: f64) -> Self {
        if delta > TREND_THRESHOLD {
            Self::Rising
        } else if delta < -TREND_THRESHOLD {
            Self::Falling
        } else {
            Self::Stable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trends {
    pub k: TrendDirection,
    pub i: TrendDirection,
    pub omega: TrendDirection,
    pub r: TrendDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictedMetrics {
    pub k: f64,
    pub i: f64,
    pub omega: f64,
    pub r: f64,
    pub steps: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub samples: usize,
    pub trends: Trends,
    pub predicted: PredictedMetrics,
}

// ─── Pure helpers ───────────────────────────────────────────────────────────

fn mean_of<F: Fn(&MetricSample) -> f64>(samples: impl Iterator<Item = MetricSample>, f: F) -> f64 {
    let (sum, n) = samples.fold((0.0, 0usize), |(s, n), x| (s + f(&x), n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

/// Later half average minus earlier half average, per axis.
pub fn analyze_trends(history: &VecDeque<MetricSample>) -> Trends {
    let mid = history.len() / 2;
    let axis = |f: fn(&MetricSample) -> f64| {
        let early = mean_of(history.iter().take(mid).copied(), f);
        let late = mean_of(history.iter().skip(mid).copied(), f);
        TrendDirection::from_delta(late - early)
    };
    Trends {
        k: axis(|s| s.k),
        i: axis(|s| s.i),
        omega: axis(|s| s.omega),
        r: axis(|s| s.r),
    }
}

/// `last + (last - prev) × steps × 0.1` on every axis.
///
/// Only the final two samples contribute; this is a one-step slope
/// projection, not a regression.
pub fn extrapolate(prev: &MetricSample, last: &MetricSample, steps: u32) -> PredictedMetrics {
    let scale = steps as f64 * STEP_SCALE;
    let project = |p: f64, l: f64| l + (l - p) * scale;
    PredictedMetrics {
        k: project(prev.k, last.k),
        i: project(prev.i, last.i),
        omega: project(prev.omega, last.omega),
        r: project(prev.r, last.r),
        steps,
    }
}

/// Alerts implied by a prediction for one entity.
pub fn alerts_for(
    entity_id: &EntityId,
    report: &TrendReport,
    now_ms: u64,
    ttl_ms: u64,
) -> Vec<Alert> {
    let p = &report.predicted;
    let t = &report.trends;
    let ids = || vec![entity_id.clone()];
    let mut alerts = Vec::new();

    if p.i < CONFLICT_I && t.i == TrendDirection::Falling {
        let severity = if p.i < CONFLICT_CRITICAL_I { Severity::Critical } else { Severity::Warning };
        alerts.push(Alert::new(
            AlertKind::ConflictPredicted,
            severity,
            format!("{entity_id}: interaction heading to {:.2}", p.i),
            ids(),
            now_ms,
            ttl_ms,
        ));
    }
    if p.k < EFFICIENCY_K && t.k == TrendDirection::Falling {
        let severity = if p.k < EFFICIENCY_CRITICAL_K { Severity::Critical } else { Severity::Warning };
        alerts.push(Alert::new(
            AlertKind::EfficiencyDrop,
            severity,
            format!("{entity_id}: efficiency heading to {:.2}", p.k),
            ids(),
            now_ms,
            ttl_ms,
        ));
    }
    if p.omega > ENTROPY_OMEGA && t.omega == TrendDirection::Rising {
        let severity = if p.omega > ENTROPY_CRITICAL_OMEGA { Severity::Critical } else { Severity::Warning };
        alerts.push(Alert::new(
            AlertKind::EntropySpike,
            severity,
            format!("{entity_id}: entropy heading to {:.2}", p.omega),
            ids(),
            now_ms,
            ttl_ms,
        ));
    }
    if p.k < EXTINCTION_K {
        alerts.push(Alert::new(
            AlertKind::ExtinctionImminent,
            Severity::Critical,
            format!("{entity_id}: projected K {:.2} below survival floor", p.k),
            ids(),
            now_ms,
            ttl_ms,
        ));
    }
    if p.i > SYNERGY_I && t.i == TrendDirection::Rising {
        alerts.push(Alert::new(
            AlertKind::SynergyOpportunity,
            Severity::Info,
            format!("{entity_id}: interaction climbing to {:.2}", p.i),
            ids(),
            now_ms,
            ttl_ms,
        ));
    }

    alerts
}

// ─── Predictor ──────────────────────────────────────────────────────────────

/// Owns the per-entity rolling histories and the alert listeners.
///
/// Single writer: `record` takes `&mut self`. Hosts recording from several
/// producers wrap the predictor in a lock or keep one per partition.
pub struct TrendPredictor {
    histories: HashMap<EntityId, VecDeque<MetricSample>>,
    listeners: Vec<Box<dyn AlertListener>>,
    capacity: usize,
    min_samples: usize,
    steps: u32,
    alert_ttl_ms: u64,
}

impl Default for TrendPredictor {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl TrendPredictor {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            histories: HashMap::new(),
            listeners: Vec::new(),
            capacity: config.trend_capacity.max(2),
            min_samples: config.min_prediction_samples.max(2),
            steps: config.prediction_steps,
            alert_ttl_ms: config.alert_ttl_ms,
        }
    }

    /// Register an observer for every future alert.
    pub fn subscribe(&mut self, listener: Box<dyn AlertListener>) {
        self.listeners.push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Append a sample, evict the oldest past capacity, and return (and
    /// deliver) any alerts the new prediction raises.
    pub fn record(&mut self, entity_id: &EntityId, sample: MetricSample) -> Vec<Alert> {
        let history = self.histories.entry(entity_id.clone()).or_default();
        history.push_back(sample);
        while history.len() > self.capacity {
            history.pop_front();
        }

        let Some(report) = self.trend(entity_id) else {
            return Vec::new();
        };
        let alerts = alerts_for(entity_id, &report, sample.timestamp, self.alert_ttl_ms);
        if !alerts.is_empty() {
            debug!(entity = %entity_id, count = alerts.len(), "trend alerts raised");
        }

        for listener in self.listeners.iter_mut() {
            for alert in &alerts {
                listener.on_alert(alert);
            }
        }
        alerts
    }

    /// Trends and projection for an entity, or `None` below the sample floor.
    pub fn trend(&self, entity_id: &EntityId) -> Option<TrendReport> {
        let history = self.histories.get(entity_id)?;
        if history.len() < self.min_samples {
            return None;
        }
        let last = history.back()?;
        let prev = history.get(history.len() - 2)?;
        Some(TrendReport {
            samples: history.len(),
            trends: analyze_trends(history),
            predicted: extrapolate(prev, last, self.steps),
        })
    }

    pub fn sample_count(&self, entity_id: &EntityId) -> usize {
        self.histories.get(entity_id).map_or(0, VecDeque::len)
    }

    pub fn history(&self, entity_id: &EntityId) -> Option<&VecDeque<MetricSample>> {
        self.histories.get(entity_id)
    }

    /// Drop everything recorded for an entity.
    pub fn forget(&mut self, entity_id: &EntityId) -> bool {
        self.histories.remove(entity_id).is_some()
    }
}

impl std::fmt::Debug for TrendPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrendPredictor")
            .field("entities", &self.histories.len())
            .field("listeners", &self.listeners.len())
            .field("capacity", &self.capacity)
            .field("min_samples", &self.min_samples)
            .finish()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
