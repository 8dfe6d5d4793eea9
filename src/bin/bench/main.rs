// Orbit Benchmark Runner v1.0.0 — cohort-level validation of the vitality engine
// Monte Carlo (N=30), seedable PRNG, synthetic populations per scenario
//
// Usage:
//   cargo run --release --bin bench                      # Run all scenarios (30 runs each)
//   cargo run --release --bin bench -- --runs 5          # Quick mode (5 runs each)
//   cargo run --release --bin bench -- DORMANT           # Filter by name, label or category
//   cargo run --release --bin bench -- --seed 42         # Custom base seed

mod monte_carlo;
mod population;
mod report;
mod scenarios;

use orbit_engine::{AlertKind, Regime};
use report::*;
use scenarios::*;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Share of runs that must pass for a scenario to pass.
const PASS_THRESHOLD: f64 = 0.933;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    runs: usize,
    seed: u64,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        runs: 30,
        seed: 0,
        filter: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--runs" => {
                i += 1;
                if i < args.len() {
                    cli.runs = args[i].parse().unwrap_or(30);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    let cli = parse_args();
    let all_scenarios = scenarios();

    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios.iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower)
                          || s.label.to_lowercase().contains(&f_lower)
                          || s.category.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No scenarios match filter: {:?}", cli.filter);
        std::process::exit(1);
    }

    println!("\n  Orbit Benchmark Runner v1.0.0");
    println!("  PRNG: ChaCha8Rng | Runs/scenario: {} | Base seed: {}", cli.runs, cli.seed);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!("  {:<34} {:>5} {:>12} {:>9} {:>8} {:>7} {:>8}",
        "Scenario", "Pass%", "Dominant%", "Healthy%", "AvgE", "Alerts", "Time");
    println!("  {}", "-".repeat(90));

    let suite_start = Instant::now();
    let mut mc_reports = Vec::new();

    for scenario in &to_run {
        let report = monte_carlo::run_monte_carlo(scenario, cli.runs, cli.seed);

        let pass_pct = report.pass_rate * 100.0;
        let dominant = report.dominant_share.mean * 100.0;
        let dominant_ci = (report.dominant_share.ci_upper - report.dominant_share.ci_lower) / 2.0 * 100.0;
        let status = if report.pass_rate >= PASS_THRESHOLD { "PASS" } else { "FAIL" };

        println!("  {:<34} {:>4}% {:>6.1}±{:<4.1} {:>8.1}% {:>8.1} {:>7.1} {:>6.2}ms  {}",
            report.label,
            pass_pct as u32,
            dominant, dominant_ci,
            report.healthy_share.mean * 100.0,
            report.average_energy.mean,
            report.alert_count.mean,
            report.elapsed_ms.mean,
            status,
        );

        mc_reports.push(report);
    }

    let suite_elapsed = suite_start.elapsed();

    // ─── Coverage ───────────────────────────────────────────────────────

    let regimes_seen: Vec<Regime> = Regime::ALL
        .iter()
        .copied()
        .filter(|regime| mc_reports.iter()
            .flat_map(|r| r.individual_runs.iter())
            .any(|run| run.by_regime.get(regime).copied().unwrap_or(0) > 0))
        .collect();

    let mut alerts_seen: Vec<AlertKind> = Vec::new();
    for run in mc_reports.iter().flat_map(|r| r.individual_runs.iter()) {
        for kind in run.population_alerts.iter().chain(run.trend_alerts.iter()) {
            if !alerts_seen.contains(kind) {
                alerts_seen.push(*kind);
            }
        }
    }

    let coverage = Coverage { regimes_seen, alerts_seen };

    // ─── Summary ────────────────────────────────────────────────────────

    let total = mc_reports.len();
    let passed = mc_reports.iter().filter(|r| r.pass_rate >= PASS_THRESHOLD).count();
    let failed = total - passed;

    println!("  {}", "-".repeat(90));
    println!("  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s\n",
        total, passed, failed, suite_elapsed.as_secs_f64());

    println!("  Coverage:");
    println!("    Regimes seen: {:?}{}", coverage.regimes_seen,
        if coverage.all_regimes() { " (all)" } else { "" });
    println!("    Alerts seen:  {:?}\n", coverage.alerts_seen);

    for report in mc_reports.iter().filter(|r| r.pass_rate < PASS_THRESHOLD) {
        if let Some(run) = report.individual_runs.iter().find(|run| !run.pass) {
            println!("  {} seed {}: {}", report.scenario_name, run.seed, run.failures.join("; "));
        }
    }

    // ─── Write JSON Report ──────────────────────────────────────────────

    let ts = SystemTime::now().duration_since(UNIX_EPOCH).expect("clock before epoch").as_millis();
    let timestamp = format!("{}", ts);

    let report = BenchReport {
        timestamp: timestamp.clone(),
        version: "1.0.0",
        prng: "ChaCha8Rng",
        n_runs_per_scenario: cli.runs,
        summary: Summary {
            total,
            passed,
            failed,
            pass_rate: passed as f64 / total as f64,
        },
        coverage,
        scenarios: mc_reports,
    };

    let dir = std::path::Path::new("benchmark-results");
    if !dir.exists() {
        std::fs::create_dir_all(dir).expect("Failed to create benchmark-results/");
    }
    let path = dir.join(format!("bench-{}.json", timestamp));
    let json = serde_json::to_string_pretty(&report).expect("Failed to serialize");
    std::fs::write(&path, &json).expect("Failed to write benchmark file");
    println!("  Results saved to: {}\n", path.display());

    if failed > 0 {
        std::process::exit(1);
    }
}
