//! Tunables for the engine facade.
//!
//! The model constants themselves (golden time, decay rates, regime
//! thresholds) live next to the code that uses them; this struct only holds
//! the knobs a host is expected to adjust.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Raw energy that maps to 1.0 on the normalized scale.
    /// Default: `200.0`
    pub raw_energy_ceiling: f64,

    /// Samples kept per entity by the trend predictor (FIFO).
    /// Default: `100`
    pub trend_capacity: usize,

    /// Samples required before a prediction is produced.
    /// Default: `5`
    pub min_prediction_samples: usize,

    /// Extrapolation horizon in steps.
    /// Default: `10`
    pub prediction_steps: u32,

    /// Lifetime of an alert after it is raised.
    /// Default: `60_000`
    pub alert_ttl_ms: u64,

    /// Share of DECAYING entities above which a population alert fires.
    /// Default: `0.3`
    pub decaying_population_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            raw_energy_ceiling:            200.0,
            trend_capacity:                100,
            min_prediction_samples:        5,
            prediction_steps:              10,
            alert_ttl_ms:                  60_000,
            decaying_population_threshold: 0.3,
        }
    }
}

impl EngineConfig {
    /// Load from environment variables, falling back to defaults.
    ///
    /// | Variable                 | Default  |
    /// |--------------------------|----------|
    /// | `ORBIT_ENERGY_CEILING`   | `200.0`  |
    /// | `ORBIT_TREND_CAPACITY`   | `100`    |
    /// | `ORBIT_MIN_SAMPLES`      | `5`      |
    /// | `ORBIT_PREDICTION_STEPS` | `10`     |
    /// | `ORBIT_ALERT_TTL_MS`     | `60000`  |
    /// | `ORBIT_DECAY_POPULATION` | `0.3`    |
    pub fn from_env() -> Self {
        fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
            std::env::var(key)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default)
        }

        let def = Self::default();
        Self {
            raw_energy_ceiling:            env_or("ORBIT_ENERGY_CEILING", def.raw_energy_ceiling),
            trend_capacity:                env_or("ORBIT_TREND_CAPACITY", def.trend_capacity).max(2),
            min_prediction_samples:        env_or("ORBIT_MIN_SAMPLES", def.min_prediction_samples).max(2),
            prediction_steps:              env_or("ORBIT_PREDICTION_STEPS", def.prediction_steps),
            alert_ttl_ms:                  env_or("ORBIT_ALERT_TTL_MS", def.alert_ttl_ms),
            decaying_population_threshold: env_or("ORBIT_DECAY_POPULATION", def.decaying_population_threshold),
        }
    }
}
