// Benchmark Report Types
// Structured output for offline analysis of engine behaviour per cohort

use orbit_engine::{AlertKind, Regime};
use serde::Serialize;
use std::collections::BTreeMap;

// ─── Statistics (per-metric Monte Carlo aggregation) ────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n: 0 };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let stderr = std_dev / (n as f64).sqrt();
        let z = 1.96; // 95% CI
        Self {
            mean,
            std_dev,
            ci_lower: mean - z * stderr,
            ci_upper: mean + z * stderr,
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct BenchResult {
    pub scenario: String,
    pub seed: u64,
    pub pass: bool,
    pub failures: Vec<String>,
    pub population: usize,
    pub events: u32,
    pub by_regime: BTreeMap<Regime, usize>,
    pub dominant_share: f64,
    pub healthy_share: f64,
    pub average_energy: f64,
    /// Summed projected revenue of one commit per member.
    pub expected_revenue: f64,
    pub population_alerts: Vec<AlertKind>,
    pub trend_alerts: Vec<AlertKind>,
    pub first_total_potential: f64,
    pub second_total_potential: f64,
    pub audit_delta_pct: f64,
    pub collapse_warning: bool,
    pub elapsed_ms: f64,
    pub entities_per_sec: f64,
}

// ─── Monte Carlo Report (per-scenario aggregation) ──────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloReport {
    pub scenario_name: String,
    pub label: String,
    pub category: String,
    pub n_runs: usize,
    pub pass_rate: f64,
    pub dominant_share: Stats,
    pub healthy_share: Stats,
    pub average_energy: Stats,
    pub expected_revenue: Stats,
    pub audit_delta_pct: Stats,
    pub alert_count: Stats,
    pub elapsed_ms: Stats,
    pub entities_per_sec: Stats,
    pub individual_runs: Vec<BenchResult>,
}

// ─── Regime Coverage ────────────────────────────────────────────────────────

/// Which regimes and alert kinds the suite managed to produce at least once.
#[derive(Debug, Clone, Serialize)]
pub struct Coverage {
    pub regimes_seen: Vec<Regime>,
    pub alerts_seen: Vec<AlertKind>,
}

impl Coverage {
    pub fn all_regimes(&self) -> bool {
        Regime::ALL.iter().all(|r| self.regimes_seen.contains(r))
    }
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub n_runs_per_scenario: usize,
    pub summary: Summary,
    pub coverage: Coverage,
    pub scenarios: Vec<MonteCarloReport>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}
