// Scenario Definitions — synthetic cohorts with expected population outcomes
// Each scenario draws a cohort, evaluates it, audits it twice and feeds the
// trend predictor; pass criteria check the shape of the result.

use orbit_engine::{AlertKind, Regime};

// ─── Cohort Profile ─────────────────────────────────────────────────────────

pub struct Cohort {
    pub prefix: &'static str,
    pub size: u32,
    pub energy: (f64, f64),
    pub mass: (f64, f64),
    pub friction: (f64, f64),
    pub max_connections: u32,
    /// Hours since last activity, drawn uniformly.
    pub idle_hours: (f64, f64),
    /// Event count range, inclusive.
    pub events: (u32, u32),
    pub cadence_hours: f64,
    /// Relative spread of event intervals (0 = metronome).
    pub jitter: f64,
    /// Probability an event is `focus_action` instead of a weighted draw.
    pub focus: f64,
    pub focus_action: &'static str,
    /// Per-step drift of (K, I, Ω) fed to the trend predictor.
    pub drift: (f64, f64, f64),
}

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub cohort: Cohort,
    /// Trend samples recorded per run.
    pub metric_steps: u32,
    /// Share of members whose distance to goal grows before the second audit.
    pub drift_share: f64,
    pub criteria: PassCriteria,
}

pub struct PassCriteria {
    /// Regime and the minimum share of the population it must hold.
    pub dominant: Option<(Regime, f64)>,
    pub required_alerts: Vec<AlertKind>,
    pub forbidden_alerts: Vec<AlertKind>,
    pub expect_collapse_warning: bool,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            dominant: None,
            required_alerts: Vec::new(),
            forbidden_alerts: Vec::new(),
            expect_collapse_warning: false,
        }
    }
}

// ─── Scenarios ──────────────────────────────────────────────────────────────

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "HEALTHY_TEAM",
            label: "Active team, irregular cadence",
            category: "baseline",
            cohort: Cohort {
                prefix: "member",
                size: 40,
                energy: (60.0, 140.0),
                mass: (0.5, 3.0),
                friction: (0.2, 0.8),
                max_connections: 12,
                idle_hours: (0.0, 2.0),
                events: (6, 12),
                cadence_hours: 8.0,
                jitter: 0.9,
                focus: 0.0,
                focus_action: "view",
                drift: (0.0, 0.0, 0.0),
            },
            metric_steps: 20,
            drift_share: 0.0,
            criteria: PassCriteria {
                dominant: Some((Regime::Stable, 0.6)),
                forbidden_alerts: vec![AlertKind::MassDecay, AlertKind::ExtinctionImminent],
                ..Default::default()
            },
        },
        Scenario {
            name: "RITUAL_CADENCE",
            label: "Daily stand-up rhythm",
            category: "resonance",
            cohort: Cohort {
                prefix: "ritual",
                size: 40,
                energy: (40.0, 120.0),
                mass: (0.5, 3.0),
                friction: (0.2, 0.8),
                max_connections: 8,
                idle_hours: (0.0, 6.0),
                events: (6, 20),
                cadence_hours: 24.0,
                jitter: 0.02,
                focus: 0.9,
                focus_action: "commit",
                drift: (0.0, 0.01, 0.0),
            },
            metric_steps: 20,
            drift_share: 0.0,
            criteria: PassCriteria {
                dominant: Some((Regime::Resonant, 0.7)),
                forbidden_alerts: vec![AlertKind::MassDecay],
                ..Default::default()
            },
        },
        Scenario {
            name: "DORMANT_COHORT",
            label: "Members idle for days",
            category: "decay",
            cohort: Cohort {
                prefix: "dormant",
                size: 40,
                energy: (30.0, 120.0),
                mass: (0.5, 3.0),
                friction: (0.2, 0.8),
                max_connections: 6,
                idle_hours: (80.0, 200.0),
                events: (6, 10),
                cadence_hours: 30.0,
                jitter: 0.9,
                focus: 0.0,
                focus_action: "view",
                drift: (-0.05, -0.02, 0.03),
            },
            metric_steps: 12,
            drift_share: 0.6,
            criteria: PassCriteria {
                dominant: Some((Regime::Decaying, 0.9)),
                required_alerts: vec![
                    AlertKind::MassDecay,
                    AlertKind::ExtinctionImminent,
                    AlertKind::EfficiencyDrop,
                ],
                expect_collapse_warning: true,
                ..Default::default()
            },
        },
        Scenario {
            name: "HEAVY_BUREAUCRACY",
            label: "Massive, tightly coupled nodes",
            category: "chaos",
            cohort: Cohort {
                prefix: "node",
                size: 30,
                energy: (50.0, 140.0),
                mass: (12.0, 25.0),
                friction: (0.6, 0.9),
                max_connections: 40,
                idle_hours: (0.0, 4.0),
                events: (6, 10),
                cadence_hours: 12.0,
                jitter: 0.9,
                focus: 0.0,
                focus_action: "review",
                drift: (0.0, -0.08, 0.04),
            },
            metric_steps: 15,
            drift_share: 0.0,
            criteria: PassCriteria {
                dominant: Some((Regime::Chaotic, 0.8)),
                required_alerts: vec![AlertKind::ChaosDetected, AlertKind::ConflictPredicted],
                ..Default::default()
            },
        },
        Scenario {
            name: "BREAKOUT_STARTUP",
            label: "Light, high-energy founders",
            category: "escape",
            cohort: Cohort {
                prefix: "founder",
                size: 12,
                energy: (160.0, 220.0),
                mass: (0.3, 0.8),
                friction: (0.2, 0.5),
                max_connections: 0,
                idle_hours: (0.0, 0.5),
                events: (6, 8),
                cadence_hours: 5.0,
                jitter: 0.9,
                focus: 0.0,
                focus_action: "invest",
                drift: (0.02, 0.05, 0.0),
            },
            metric_steps: 20,
            drift_share: 0.0,
            criteria: PassCriteria {
                dominant: Some((Regime::Escape, 0.6)),
                forbidden_alerts: vec![AlertKind::MassDecay],
                ..Default::default()
            },
        },
    ]
}
