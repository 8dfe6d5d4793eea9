// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Orbit Vitality Engine - Inertia Calculator

use serde::{Deserialize, Serialize};

use crate::types::{DEFAULT_FRICTION, DEFAULT_MASS};

const GRAVITY: f64 = 9.8;
const CONNECTION_WEIGHT: f64 = 0.2;

/// Force required to break inertia, relative to its value.
pub const BREAK_FORCE_FACTOR: f64 = 1.5;

/// Inputs as they were actually used, after defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InertiaComponents {
    pub mass: f64,
    pub friction: f64,
    pub connections: u32,
    pub connection_density: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InertiaResult {
    pub value: f64,
    pub break_force: f64,
    pub components: InertiaComponents,
}

impl InertiaResult {
    /// Whether `force` is enough to move the entity.
    pub fn can_overcome(&self, force: f64) -> bool {
        force >= self.break_force
    }
}

/// `1 + log10(connections + 1) × 0.2`
pub fn connection_density(connections: u32) -> f64 {
    1.0 + (connections as f64 + 1.0).log10() * CONNECTION_WEIGHT
}

/// Resistance to change: `mass × friction × 9.8 × density`.
///
/// Missing or unusable inputs fall back to mass 1.0, friction 0.5 and zero
/// connections. Friction is clamped to [0, 1].
pub fn inertia(mass: Option<f64>, friction: Option<f64>, connections: Option<u32>) -> InertiaResult {
    let mass = mass.filter(|m| m.is_finite() && *m > 0.0).unwrap_or(DEFAULT_MASS);
    let friction = friction
        .filter(|f| f.is_finite())
        .map(|f| f.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_FRICTION);
    let connections = connections.unwrap_or(0);
    let density = connection_density(connections);

    let value = mass * friction * GRAVITY * density;
    InertiaResult {
        value,
        break_force: value * BREAK_FORCE_FACTOR,
        components: InertiaComponents {
            mass,
            friction,
            connections,
            connection_density: density,
        },
    }
}
