#[cfg(test)]
mod tests {
    use orbit_engine::decay::decay;
    use orbit_engine::inertia::inertia;
    use orbit_engine::reaction::{effective_mass, ImpactLevel};
    use orbit_engine::regime::determine_regime;
    use orbit_engine::resonance::{find_resonant_path, ResonanceResult};
    use orbit_engine::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use serde_json::json;
    use std::sync::mpsc;

    const NOW: u64 = 1_700_000_000_000;
    const HOUR: u64 = 3_600_000;

    fn random_entity(rng: &mut ChaCha8Rng, n: usize) -> Entity {
        let mut e = Entity::new(format!("m-{n}"), rng.gen_range(0.0..220.0));
        e.mass = rng.gen_range(0.5..8.0);
        e.friction_coefficient = rng.gen_range(0.0..1.0);
        e.connection_count = rng.gen_range(0..50);
        e.last_activity = Some(LastSeen::Hours(rng.gen_range(0.0..200.0)));
        let start = NOW - 30 * 24 * HOUR;
        let mut t = start;
        e.history = (0..rng.gen_range(0..25))
            .map(|_| {
                t += rng.gen_range(1..48) * HOUR;
                Event::new(t, ["commit", "view", "share"][rng.gen_range(0..3)])
                    .with_value(rng.gen_range(0.0..10.0))
            })
            .collect();
        e
    }

    // ========== Core Properties ==========

    #[test]
    fn test_no_elapsed_time_no_decay() {
        for e in [0.0, 0.3, 1.0, 75.0, 199.0] {
            assert_eq!(decay(e, Some(LastSeen::Hours(0.0)), NOW).value, e);
        }
    }

    #[test]
    fn test_decay_scenario_golden_time() {
        let r = decay(100.0, Some(LastSeen::Hours(72.0)), NOW);
        assert_eq!(r.decay_rate, 0.05);
        assert!((r.value - 2.73).abs() < 0.01);
    }

    #[test]
    fn test_inertia_scenario_defaults() {
        let r = inertia(Some(1.0), Some(0.5), None);
        assert!((r.value - 4.9).abs() < 1e-9);
        assert!((r.break_force - 7.35).abs() < 1e-9);
    }

    #[test]
    fn test_effective_mass_scenario_commit() {
        let m = effective_mass(ActionType::Commit, 1.0);
        assert_eq!(m.value, 2.0);
        assert_eq!(m.impact_level, ImpactLevel::High);
        assert!((m.quality_score - 0.667).abs() < 0.001);
    }

    #[test]
    fn test_high_inertia_regime_scenario() {
        let none = ResonanceResult::not_found();
        // High inertia with ordinary energy is chaotic
        assert_eq!(determine_regime(RawEnergy(100.0), 60.0, &none), Regime::Chaotic);
        // At energy 10 the DECAYING rule has priority
        assert_eq!(determine_regime(RawEnergy(10.0), 60.0, &none), Regime::Decaying);
    }

    #[test]
    fn test_short_history_has_no_resonance() {
        let history = vec![Event::new(0, "commit"), Event::new(HOUR, "commit")];
        let r = find_resonant_path(&history);
        assert!(!r.found);
        assert_eq!(r.strength, 0.0);
    }

    #[test]
    fn test_healthy_band_edges() {
        assert!(is_healthy(NormalizedEnergy(0.3)));
        assert!(!is_healthy(NormalizedEnergy(1.0)));
        assert!(!is_healthy(NormalizedEnergy(0.29)));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let engine = VitalityEngine::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for n in 0..50 {
            let e = random_entity(&mut rng, n);
            let a = engine.evaluate_entity_at(&e, NOW).unwrap();
            let b = engine.evaluate_entity_at(&e, NOW).unwrap();
            assert_eq!(serde_json::to_vec(&a).unwrap(), serde_json::to_vec(&b).unwrap());
            assert!((0.0..=1.0).contains(&a.resonance.strength));
            assert!((0.0..=1.0).contains(&a.classification.stability));
            assert_eq!(a.inertia.break_force, a.inertia.value * 1.5);
        }
    }

    #[test]
    fn test_evaluation_never_mutates_history() {
        let engine = VitalityEngine::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let e = random_entity(&mut rng, 0);
        let before = e.clone();
        engine.evaluate_entity_at(&e, NOW).unwrap();
        engine.simulate_action_at(&e, ActionType::Invest, 2.0, NOW).unwrap();
        assert_eq!(e, before);
    }

    // ========== Trend Predictor ==========

    #[test]
    fn test_fewer_than_five_samples_is_silent() {
        let mut engine = VitalityEngine::default();
        let (tx, rx) = mpsc::channel();
        engine.subscribe(Box::new(tx));
        let id = EntityId::from("team-a");
        for n in 0..4 {
            let alerts = engine
                .record_metric_at(&id, MetricInput { k: 0.1, i: -0.9, omega: 0.99, r: -1.0 }, NOW + n)
                .unwrap();
            assert!(alerts.is_empty());
        }
        assert!(engine.trend(&id).is_none());
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn test_collapsing_team_raises_alerts() {
        let mut engine = VitalityEngine::default();
        let (tx, rx) = mpsc::channel();
        engine.subscribe(Box::new(tx));
        let id = EntityId::from("team-b");
        let samples = [
            (0.95, 0.5, 0.2),
            (0.9, 0.3, 0.3),
            (0.7, 0.0, 0.5),
            (0.5, -0.3, 0.7),
            (0.35, -0.6, 0.8),
        ];
        let mut last = Vec::new();
        for (n, (k, i, omega)) in samples.into_iter().enumerate() {
            last = engine
                .record_metric_at(&id, MetricInput { k, i, omega, r: 0.0 }, NOW + n as u64 * 1000)
                .unwrap();
        }
        let kinds: Vec<AlertKind> = last.iter().map(|a| a.kind).collect();
        assert!(kinds.contains(&AlertKind::ConflictPredicted));
        assert!(kinds.contains(&AlertKind::EfficiencyDrop));
        assert!(kinds.contains(&AlertKind::EntropySpike));
        assert!(kinds.contains(&AlertKind::ExtinctionImminent));
        assert!(last.iter().all(|a| a.expires_at == NOW + 4000 + 60_000));
        // Projected I ≈ -0.9, K ≈ 0.2 and Ω ≈ 0.9 are all past the critical lines
        for kind in [AlertKind::ConflictPredicted, AlertKind::EfficiencyDrop, AlertKind::EntropySpike] {
            let alert = last.iter().find(|a| a.kind == kind).unwrap();
            assert_eq!(alert.severity, Severity::Critical, "{kind:?}");
        }

        let report = engine.trend(&id).unwrap();
        assert_eq!(report.samples, 5);
        assert_eq!(rx.try_iter().count(), last.len());
    }

    #[test]
    fn test_mixed_host_batch_skips_unreadable_records() {
        let engine = VitalityEngine::default();
        let records = vec![
            json!({"id": "ok", "energy": 100.0}),
            json!({"id": "bad", "energy": "lots"}),
            json!({"id": "quiet", "energy": 5.0}),
        ];
        let report = engine.batch_evaluate_records_at(&records, NOW);
        assert_eq!(report.skipped, vec![EntityId::from("bad")]);
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.by_regime[&Regime::Decaying], 1);
    }

    // ========== Population ==========

    #[test]
    fn test_audit_session_round_trip() {
        let engine = VitalityEngine::default();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut population: Vec<Entity> = (0..20).map(|n| random_entity(&mut rng, n)).collect();

        let session = AuditSession::new();
        let first = engine.audit_system(&population, &session);
        assert_eq!(first.status, AuditStatus::Stable);
        let session = first.next_session(&session);

        // Half the population drifts far from its goal
        for e in population.iter_mut().take(10) {
            e.distance_to_goal = 50.0;
        }
        let second = engine.audit_system(&population, &session);
        assert!(second.delta < 0.0);
        assert_eq!(second.status, AuditStatus::CollapseWarning);
    }

    #[test]
    fn test_batch_flags_decaying_population() {
        let engine = VitalityEngine::default();
        let mut population = Vec::new();
        for n in 0..10 {
            let mut e = Entity::new(format!("idle-{n}"), 40.0);
            // Four days without activity
            e.last_activity = Some(LastSeen::Timestamp(NOW - 96 * HOUR));
            population.push(e);
        }
        population.push(Entity::new("active", 120.0));

        let report = engine.batch_evaluate_at(&population, NOW);
        assert_eq!(report.summary.total, 11);
        assert_eq!(report.summary.by_regime[&Regime::Decaying], 10);
        let mass_decay = report
            .alerts
            .iter()
            .find(|a| a.kind == AlertKind::MassDecay)
            .expect("mass decay alert");
        assert_eq!(mass_decay.severity, Severity::Critical);
        assert_eq!(mass_decay.affected_entity_ids.len(), 10);
        assert!(report.alerts.iter().any(|a| a.kind == AlertKind::ExtinctionImminent));
    }

    // ========== Host Records ==========

    #[test]
    fn test_host_record_through_adapter() {
        let engine = VitalityEngine::default();
        let record = json!({
            "id": "node-3",
            "potential": 170.0,
            "node_mass": 0.5,
            "friction": 0.5,
            "lastActivity": 0,
            "history": [
                {"timestamp": NOW - 3 * HOUR, "type": "commit"},
                {"timestamp": NOW - 2 * HOUR, "type": "review"},
                {"broken": true},
                {"timestamp": NOW - HOUR, "type": "share"}
            ]
        });
        let entity = adapter::normalize_entity(&record).unwrap();
        assert_eq!(entity.history.len(), 3);
        let eval = engine.evaluate_entity_at(&entity, NOW).unwrap();
        // Perfectly regular hourly cadence resonates
        assert_eq!(eval.regime(), Regime::Resonant);

        let err = adapter::normalize_entity(&json!({"id": "x", "energy": [1]})).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
    }

    #[test]
    fn test_escape_velocity_without_resonance() {
        let engine = VitalityEngine::default();
        let mut e = Entity::new("rocket", 170.0);
        e.mass = 0.5;
        e.history = vec![Event::new(0, "a"), Event::new(HOUR, "b"), Event::new(30 * HOUR, "c")];
        // inertia 0.5 * 0.5 * 9.8 = 2.45 < 5
        let eval = engine.evaluate_entity_at(&e, NOW).unwrap();
        assert_eq!(eval.regime(), Regime::Escape);
        assert_eq!(eval.classification.energy_level, EnergyLevel::High);
    }
}
