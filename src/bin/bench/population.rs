// Population Generator — seedable synthetic cohorts
// Members with activity histories drawn from a cohort profile

use orbit_engine::{Entity, Event, LastSeen, MetricInput};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::scenarios::Cohort;

const HOUR_MS: u64 = 3_600_000;

/// Action tags with relative draw weights
const ACTION_WEIGHTS: [(&str, f64); 6] = [
    ("view", 0.35),
    ("comment", 0.25),
    ("commit", 0.15),
    ("review", 0.12),
    ("share", 0.08),
    ("invest", 0.05),
];

pub struct PopulationGenerator {
    rng: ChaCha8Rng,
    now_ms: u64,
    pub member_count: u32,
    pub event_count: u32,
}

impl PopulationGenerator {
    pub fn new(rng: ChaCha8Rng, now_ms: u64) -> Self {
        Self { rng, now_ms, member_count: 0, event_count: 0 }
    }

    /// Draw `cohort.size` members.
    pub fn generate(&mut self, cohort: &Cohort) -> Vec<Entity> {
        (0..cohort.size).map(|_| self.member(cohort)).collect()
    }

    fn member(&mut self, cohort: &Cohort) -> Entity {
        let n = self.member_count;
        self.member_count += 1;

        let (lo, hi) = cohort.energy;
        let mut e = Entity::new(format!("{}-{n}", cohort.prefix), self.rng.gen_range(lo..hi));
        e.mass = self.rng.gen_range(cohort.mass.0..cohort.mass.1);
        e.friction_coefficient = self.rng.gen_range(cohort.friction.0..cohort.friction.1);
        e.connection_count = self.rng.gen_range(0..cohort.max_connections + 1);
        e.distance_to_goal = self.rng.gen_range(0.5..5.0);

        let idle_hours = self.rng.gen_range(cohort.idle_hours.0..cohort.idle_hours.1);
        let last = self.now_ms - (idle_hours * HOUR_MS as f64) as u64;
        e.last_activity = Some(LastSeen::Timestamp(last));
        e.history = self.history(cohort, last);
        e
    }

    /// Events ending at `last`. `jitter` 0 gives a perfectly regular cadence.
    fn history(&mut self, cohort: &Cohort, last: u64) -> Vec<Event> {
        let len = self.rng.gen_range(cohort.events.0..=cohort.events.1) as usize;
        let cadence = cohort.cadence_hours * HOUR_MS as f64;
        let mut events = Vec::with_capacity(len);
        let mut t = last;
        for _ in 0..len {
            let kind = if self.rng.gen::<f64>() < cohort.focus {
                cohort.focus_action
            } else {
                select_action(&mut self.rng)
            };
            events.push(Event::new(t, kind));
            let jitter = 1.0 + self.rng.gen_range(-cohort.jitter..=cohort.jitter);
            t = t.saturating_sub((cadence * jitter).max(1.0) as u64);
        }
        events.reverse();
        self.event_count += events.len() as u32;
        events
    }

    /// One (K, I, Ω, r) reading following the cohort's drift per step.
    pub fn metric(&mut self, cohort: &Cohort, step: u32) -> MetricInput {
        let s = step as f64;
        let (dk, di, domega) = cohort.drift;
        let noise = |rng: &mut ChaCha8Rng| rng.gen_range(-0.01..0.01);
        MetricInput {
            k: (0.8 + dk * s + noise(&mut self.rng)).max(0.0),
            i: (0.2 + di * s + noise(&mut self.rng)).clamp(-1.0, 1.0),
            omega: (0.3 + domega * s + noise(&mut self.rng)).clamp(0.0, 1.0),
            r: dk + noise(&mut self.rng),
        }
    }
}

fn select_action(rng: &mut ChaCha8Rng) -> &'static str {
    let total: f64 = ACTION_WEIGHTS.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen::<f64>() * total;
    for (action, weight) in ACTION_WEIGHTS {
        if roll < weight {
            return action;
        }
        roll -= weight;
    }
    ACTION_WEIGHTS[0].0
}
