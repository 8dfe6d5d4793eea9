// Monte Carlo Infrastructure — N runs per scenario with statistical aggregation
// Each scenario runs N times with seeds base..base+N, computing mean ± 95% CI

use orbit_engine::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::mpsc;
use std::time::Instant;

use crate::population::PopulationGenerator;
use crate::report::*;
use crate::scenarios::Scenario;

/// Fixed evaluation clock so runs are reproducible (2026-01-01T00:00:00Z).
pub const BENCH_NOW_MS: u64 = 1_767_225_600_000;

/// Spacing between recorded trend samples.
const METRIC_INTERVAL_MS: u64 = 60_000;

/// Distance multiplier for members that lose track of their goal.
const GOAL_DRIFT_FACTOR: f64 = 10.0;

fn push_unique(kinds: &mut Vec<AlertKind>, kind: AlertKind) {
    if !kinds.contains(&kind) {
        kinds.push(kind);
    }
}

/// Run a single scenario iteration with a specific seed.
pub fn run_single(scenario: &Scenario, seed: u64) -> BenchResult {
    let start = Instant::now();
    let mut failures = Vec::new();

    let rng = ChaCha8Rng::seed_from_u64(seed);
    let mut population = PopulationGenerator::new(rng, BENCH_NOW_MS);
    let mut members = population.generate(&scenario.cohort);

    let mut engine = VitalityEngine::default();
    let (tx, rx) = mpsc::channel();
    engine.subscribe(Box::new(tx));

    // Classification
    let batch = engine.batch_evaluate_at(&members, BENCH_NOW_MS);
    if !batch.skipped.is_empty() {
        failures.push(format!("{} members skipped", batch.skipped.len()));
    }
    let total = batch.summary.total.max(1) as f64;

    let mut population_alerts = Vec::new();
    for alert in &batch.alerts {
        push_unique(&mut population_alerts, alert.kind);
    }

    // A commit from every member
    let mut expected_revenue = 0.0;
    for member in &members {
        match engine.simulate_action_at(member, ActionType::Commit, 1.0, BENCH_NOW_MS) {
            Ok(sim) => expected_revenue += adapter::from_decimal(sim.expected_revenue),
            Err(e) => failures.push(format!("simulate {}: {e}", member.id)),
        }
    }

    // Audit before and after goal drift
    let session = AuditSession::new();
    let first = engine.audit_system(&members, &session);
    let session = first.next_session(&session);
    let drifting = (members.len() as f64 * scenario.drift_share).round() as usize;
    for member in members.iter_mut().take(drifting) {
        member.distance_to_goal *= GOAL_DRIFT_FACTOR;
    }
    let second = engine.audit_system(&members, &session);
    let collapse_warning = second.status == AuditStatus::CollapseWarning;

    // Team-level trend
    let team = EntityId::from(format!("{}-team", scenario.cohort.prefix));
    let mut trend_alerts = Vec::new();
    let mut returned = 0usize;
    for step in 0..scenario.metric_steps {
        let input = population.metric(&scenario.cohort, step);
        let at = BENCH_NOW_MS + step as u64 * METRIC_INTERVAL_MS;
        match engine.record_metric_at(&team, input, at) {
            Ok(alerts) => {
                returned += alerts.len();
                for alert in &alerts {
                    push_unique(&mut trend_alerts, alert.kind);
                }
            }
            Err(e) => failures.push(format!("metric step {step}: {e}")),
        }
    }
    let delivered = rx.try_iter().count();
    if delivered != returned {
        failures.push(format!("listener saw {delivered} alerts, record returned {returned}"));
    }

    // Criteria
    let criteria = &scenario.criteria;
    let share_of = |regime: Regime| batch.summary.by_regime.get(&regime).copied().unwrap_or(0) as f64 / total;
    let dominant_share = match criteria.dominant {
        Some((regime, min_share)) => {
            let share = share_of(regime);
            if share < min_share {
                failures.push(format!("{regime} share {:.2} < {min_share:.2}", share));
            }
            share
        }
        None => Regime::ALL.iter().map(|r| share_of(*r)).fold(0.0, f64::max),
    };

    let raised = |kind: &AlertKind| population_alerts.contains(kind) || trend_alerts.contains(kind);
    for kind in &criteria.required_alerts {
        if !raised(kind) {
            failures.push(format!("missing alert {kind:?}"));
        }
    }
    for kind in &criteria.forbidden_alerts {
        if raised(kind) {
            failures.push(format!("unexpected alert {kind:?}"));
        }
    }
    if criteria.expect_collapse_warning != collapse_warning {
        failures.push(format!("second audit status {:?}", second.status));
    }

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    let elapsed_secs = (elapsed_ms / 1000.0).max(1e-9);

    BenchResult {
        scenario: scenario.name.to_string(),
        seed,
        pass: failures.is_empty(),
        failures,
        population: members.len(),
        events: population.event_count,
        by_regime: batch.summary.by_regime.clone(),
        dominant_share,
        healthy_share: batch.summary.healthy_count as f64 / total,
        average_energy: batch.summary.average_energy,
        expected_revenue,
        population_alerts,
        trend_alerts,
        first_total_potential: first.total_potential,
        second_total_potential: second.total_potential,
        audit_delta_pct: second.delta_percentage,
        collapse_warning,
        elapsed_ms,
        entities_per_sec: members.len() as f64 / elapsed_secs,
    }
}

/// Run Monte Carlo: N runs of a scenario, aggregate stats.
pub fn run_monte_carlo(scenario: &Scenario, n_runs: usize, base_seed: u64) -> MonteCarloReport {
    let mut results = Vec::with_capacity(n_runs);
    for i in 0..n_runs {
        let seed = base_seed + i as u64;
        results.push(run_single(scenario, seed));
    }

    aggregate(scenario, results)
}

/// Aggregate individual runs into a MonteCarloReport.
fn aggregate(scenario: &Scenario, results: Vec<BenchResult>) -> MonteCarloReport {
    let n = results.len();
    let passed = results.iter().filter(|r| r.pass).count();
    let pass_rate = if n == 0 { 0.0 } else { passed as f64 / n as f64 };

    let stat = |f: fn(&BenchResult) -> f64| Stats::from_samples(&results.iter().map(f).collect::<Vec<_>>());

    MonteCarloReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        n_runs: n,
        pass_rate,
        dominant_share: stat(|r| r.dominant_share),
        healthy_share: stat(|r| r.healthy_share),
        average_energy: stat(|r| r.average_energy),
        expected_revenue: stat(|r| r.expected_revenue),
        audit_delta_pct: stat(|r| r.audit_delta_pct),
        alert_count: stat(|r| (r.population_alerts.len() + r.trend_alerts.len()) as f64),
        elapsed_ms: stat(|r| r.elapsed_ms),
        entities_per_sec: stat(|r| r.entities_per_sec),
        individual_runs: results,
    }
}
