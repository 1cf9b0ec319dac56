use std::io::Write;

use spectral_attention::{EngineConfig, SimulationEngine, SimulationMode, ValidationError};

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn load_applies_file_overrides() {
    let file = write_config(
        r#"
        seed = 99
        history_capacity = 8
        perturbation_bump = 1.0

        [evolution]
        drift = 0.1
        "#,
    );

    let config = EngineConfig::load(file.path()).unwrap();
    assert_eq!(config.seed, Some(99));
    assert_eq!(config.history_capacity, 8);
    assert_eq!(config.evolution.drift, 0.1);
    assert_eq!(config.evolution.floor, 0.01);

    let mut engine = SimulationEngine::new(config).unwrap();
    engine.start();
    for _ in 0..20 {
        engine.step(0.016).unwrap();
    }
    assert_eq!(engine.snapshot().history.len(), 8);
}

#[test]
fn two_dimensional_engine_from_file() {
    let file = write_config(
        r#"
        dimensions = 2
        seed = 4

        [baselines]
        stable = [1.0, 0.2]
        dissonance = [0.7, 0.7]
        aha = [2.0, 0.05]
        altered = [0.5, 0.5]
        "#,
    );

    let config = EngineConfig::load(file.path()).unwrap();
    let mut engine = SimulationEngine::new(config).unwrap();
    engine.set_mode(SimulationMode::Aha);
    engine.start();
    let record = engine.step(0.016).unwrap();

    assert_eq!(record.eigenvalues.len(), 2);
    assert_eq!(engine.snapshot().dimensions(), 2);
    assert!(engine.perturb_mode(2).is_err());
}

#[test]
fn mismatched_baseline_is_rejected() {
    let file = write_config(
        r#"
        [baselines]
        stable = [1.0, 0.8, 0.4]
        "#,
    );

    let err = EngineConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidConfig { .. }));
}

#[test]
fn missing_file_is_an_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let err = EngineConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn saved_config_loads_back_identically() {
    let config = EngineConfig {
        history_capacity: 32,
        ..EngineConfig::seeded(3)
    };
    let file = write_config(&config.to_toml());

    assert_eq!(EngineConfig::load(file.path()).unwrap(), config);
}

#[test]
fn oversized_history_is_rejected_before_engine_construction() {
    let file = write_config("history_capacity = 4000000000000000000\n");
    let err = EngineConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidConfig { .. }));

    let config = EngineConfig {
        history_capacity: usize::MAX,
        ..EngineConfig::seeded(1)
    };
    assert!(matches!(
        SimulationEngine::new(config),
        Err(ValidationError::InvalidConfig { .. })
    ));
}
