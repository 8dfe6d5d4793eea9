// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbit Vitality Engine - Alerts
//
// Typed alerts raised by the trend predictor (per entity) and by batch
// evaluation (per population), plus the observer seam used to deliver them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::mpsc;

use crate::types::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    ConflictPredicted,
    EfficiencyDrop,
    EntropySpike,
    ExtinctionImminent,
    SynergyOpportunity,
    /// Too large a share of the population is decaying.
    MassDecay,
    /// At least one entity is in the CHAOTIC regime.
    ChaosDetected,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConflictPredicted => "conflict_predicted",
            Self::EfficiencyDrop => "efficiency_drop",
            Self::EntropySpike => "entropy_spike",
            Self::ExtinctionImminent => "extinction_imminent",
            Self::SynergyOpportunity => "synergy_opportunity",
            Self::MassDecay => "mass_decay",
            Self::ChaosDetected => "chaos_detected",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub affected_entity_ids: Vec<EntityId>,
    pub created_at: u64,
    pub expires_at: u64,
}

impl Alert {
    pub fn new(
        kind: AlertKind,
        severity: Severity,
        message: impl Into<String>,
        affected_entity_ids: Vec<EntityId>,
        now_ms: u64,
        ttl_ms: u64,
    ) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            affected_entity_ids,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_ms),
        }
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// Receives alerts synchronously as they are raised.
///
/// Listeners only see the alert; they have no handle back to the producer,
/// so they cannot record samples while a delivery is in progress.
pub trait AlertListener {
    fn on_alert(&mut self, alert: &Alert);
}

/// A channel sender is a listener; the receiver becomes a drainable queue.
impl AlertListener for mpsc::Sender<Alert> {
    fn on_alert(&mut self, alert: &Alert) {
        // A dropped receiver just means nobody is draining any more.
        let _ = self.send(alert.clone());
    }
}

impl<F: FnMut(&Alert)> AlertListener for F {
    fn on_alert(&mut self, alert: &Alert) {
        self(alert)
    }
}
