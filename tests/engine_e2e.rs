use std::sync::Arc;
use std::time::Duration;

use spectral_attention::{
    entropy, focus, EigenSpectrum, EngineConfig, EvolutionCoefficients, ModeBaselines, SimulationEngine,
    SimulationMode, SimulationParams, ValidationError, Vector,
};

fn quiet_config(baseline: [f64; 5]) -> EngineConfig {
    EngineConfig {
        baselines: ModeBaselines::uniform(EigenSpectrum::from(baseline)),
        evolution: EvolutionCoefficients {
            noise: 0.0,
            ..EvolutionCoefficients::default()
        },
        seed: Some(1),
        ..EngineConfig::default()
    }
}

#[test]
fn single_axis_disparity_projects_to_full_focus() {
    let mut engine = SimulationEngine::with_state(
        quiet_config([1.0; 5]),
        SimulationParams::still(SimulationMode::Stable),
        Vector::from([0.0; 5]),
        Vector::from([1.0, 0.0, 0.0, 0.0, 0.0]),
        EigenSpectrum::from([1.0, 0.0, 0.0, 0.0, 0.0]),
    )
    .unwrap();
    engine.start();

    let record = engine.step(1.0 / 60.0).unwrap();
    let s = engine.snapshot();

    assert_eq!(s.disparity.as_slice(), &[1.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(s.spectral_coefficients.as_slice(), &[1.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(s.eigen_spectrum[0], 1.0);
    assert_eq!(record.intensity, 1.0);
    assert_eq!(record.entropy, 0.0);
    assert_eq!(record.focus, 1.0);
    assert_eq!(record.eigenvalues, s.eigen_spectrum);
}

#[test]
fn uniform_coefficients_have_maximal_entropy() {
    let c = [1.0; 5];
    assert!((entropy(&c) - 5.0_f64.ln()).abs() < 1e-12);
    assert!((entropy(&c) - 1.609).abs() < 1e-3);
    assert!((focus(&c) - 0.2).abs() < 1e-12);
}

#[test]
fn perturb_mode_bumps_one_axis_immediately() {
    let mut engine = SimulationEngine::with_state(
        quiet_config([1.0; 5]),
        SimulationParams::still(SimulationMode::Stable),
        Vector::zeros(5),
        Vector::zeros(5),
        EigenSpectrum::from([1.0; 5]),
    )
    .unwrap();
    let stream = engine.subscribe();

    engine.perturb_mode(2).unwrap();
    assert_eq!(engine.snapshot().eigen_spectrum.as_slice(), &[1.0, 1.0, 1.5, 1.0, 1.0]);
    let published = stream.recv_timeout(Duration::from_millis(100)).unwrap();
    assert_eq!(published.eigen_spectrum.as_slice(), &[1.0, 1.0, 1.5, 1.0, 1.0]);

    assert!(matches!(
        engine.perturb_mode(9),
        Err(ValidationError::InvalidAxis { axis: 9, dimensions: 5 })
    ));
}

#[test]
fn still_dynamics_keep_disparity_equal_to_body_minus_identity() {
    let mut engine = SimulationEngine::with_params(
        EngineConfig::seeded(21),
        SimulationParams::still(SimulationMode::Dissonance),
    )
    .unwrap();
    engine.start();

    for _ in 0..50 {
        engine.step(0.016).unwrap();
        let s = engine.snapshot();
        assert_eq!(s.disparity, &s.body - &s.identity);
        assert_eq!(s.spectral_coefficients, s.eigen_spectrum.project(&s.disparity));
        assert_eq!(s.conscious, s.spectral_coefficients);
    }
}

#[test]
fn long_run_respects_every_bound() {
    let mut engine = SimulationEngine::new(EngineConfig::seeded(2024)).unwrap();
    engine.start();

    let modes = SimulationMode::ALL;
    for i in 0..1_000 {
        if i % 250 == 0 {
            engine.set_mode(modes[(i / 250) % modes.len()]);
        }
        let prev = engine.snapshot();
        let record = engine.step(0.016).unwrap();

        assert!(record.eigenvalues.iter().all(|v| *v >= 0.01));
        assert!(record.intensity >= 0.0);
        assert!(record.entropy >= 0.0 && record.entropy <= 5.0_f64.ln() + 1e-12);
        assert!(record.focus >= 0.0 && record.focus <= 1.0);

        let s = engine.snapshot();
        assert_eq!(s.disparity, &prev.body - &prev.identity);
        assert!(s.history.len() <= 100);
    }

    let s = engine.snapshot();
    assert_eq!(s.history.len(), 100);
    let seqs: Vec<u64> = s.history.iter().map(|r| r.sequence).collect();
    assert_eq!(seqs, (901..=1_000).collect::<Vec<_>>());
    assert!(s.history.iter().zip(s.history.iter().skip(1)).all(|(a, b)| a.timestamp < b.timestamp));
}

#[test]
fn reset_then_no_steps_yields_clean_state() {
    let mut engine = SimulationEngine::new(EngineConfig::seeded(5)).unwrap();
    engine.start();
    for _ in 0..10 {
        engine.step(0.016);
    }
    engine.reset();

    let s = engine.snapshot();
    assert_eq!(s.conscious, Vector::zeros(5));
    assert_eq!(s.spectral_coefficients, Vector::zeros(5));
    assert!(s.history.is_empty());
    assert_eq!(s.sequence, 0);
}

#[test]
fn start_stop_twice_changes_nothing_after_first_call() {
    let mut engine = SimulationEngine::new(EngineConfig::seeded(5)).unwrap();
    let before = engine.snapshot();

    assert!(engine.start());
    assert!(!engine.start());
    assert!(engine.stop());
    assert!(!engine.stop());

    assert!(Arc::ptr_eq(&before, &engine.snapshot()));
}

#[test]
fn independent_engines_do_not_interfere() {
    let mut a = SimulationEngine::new(EngineConfig::seeded(3)).unwrap();
    let mut b = SimulationEngine::new(EngineConfig::seeded(3)).unwrap();
    a.start();
    b.start();

    for _ in 0..10 {
        a.step(0.016);
    }
    b.perturb_mode(0).unwrap();

    assert_ne!(a.run_id(), b.run_id());
    assert_eq!(a.snapshot().sequence, 10);
    assert_eq!(b.snapshot().sequence, 0);
    assert_eq!(a.snapshot().eigen_spectrum.len(), b.snapshot().eigen_spectrum.len());
}

#[test]
fn snapshots_serialize_to_json() {
    let mut engine = SimulationEngine::new(EngineConfig::seeded(8)).unwrap();
    engine.start();
    engine.step(0.016).unwrap();

    let snapshot = engine.snapshot();
    let json = serde_json::to_value(&*snapshot).unwrap();
    assert_eq!(json["sequence"], 1);
    assert_eq!(json["identity"].as_array().unwrap().len(), 5);
    assert_eq!(json["history"]["records"].as_array().unwrap().len(), 1);
    assert_eq!(json["history"]["capacity"], 100);
}
