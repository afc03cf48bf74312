//! Tests for exploration configuration.

use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        optimize_start_palette = true
        vision = ["normal", "protanopia", "tritanopia"]
        out_of_gamut_weight = 250.0
        skip_binary = true

        [locking]
        ratio = 0.25
        seed = 7

        [termination]
        max_evaluations = 1000
        function_tolerance = 1e-8
    "#;

    let config = ExplorationConfig::from_toml_str(toml).unwrap();
    assert!(config.optimize_start_palette);
    assert_eq!(config.movable_layer(), 0);
    assert_eq!(config.vision.len(), 3);
    assert_eq!(config.out_of_gamut_weight, 250.0);
    assert!(config.skip_binary);
    let locking = config.locking.as_ref().unwrap();
    assert_eq!(locking.ratio, Some(0.25));
    assert_eq!(locking.seed, Some(7));
    assert!(locking.indices.is_empty());
    assert_eq!(config.max_evaluations(), Some(1000));
    assert_eq!(config.termination.unwrap().function_tolerance, Some(1e-8));
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        vision: [normal, deuteranopia]
        subspace: [false, true, true]
        locking:
          indices: [1, 2]
    "#;

    let config = ExplorationConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(
        config.vision,
        vec![VisionType::Normal, VisionType::Deuteranopia]
    );
    assert_eq!(config.subspace, Some(vec![false, true, true]));
    assert_eq!(config.locking.unwrap().indices, vec![1, 2]);
    assert!(!config.optimize_start_palette);
}

#[test]
fn test_defaults() {
    let config = ExplorationConfig::from_toml_str("").unwrap();
    assert_eq!(config, ExplorationConfig::default());
    assert_eq!(config.vision, vec![VisionType::Normal]);
    assert_eq!(config.out_of_gamut_weight, 1000.0);
    assert_eq!(config.interpolation_time, 0.0);
    assert_eq!(config.finite_difference_epsilon, 1e-6);
    assert_eq!(config.movable_layer(), 1);
    assert!(config.validate().is_ok());
}

#[test]
fn test_builder() {
    let config = ExplorationConfig::new()
        .with_optimize_start_palette(true)
        .with_vision(vec![VisionType::Normal, VisionType::Tritanopia])
        .with_subspace(vec![true, false, true])
        .with_locked_indices(vec![0])
        .with_locked_ratio(0.5, 42)
        .with_max_evaluations(200);

    let locking = config.locking.as_ref().unwrap();
    assert_eq!(locking.indices, vec![0]);
    assert_eq!(locking.ratio, Some(0.5));
    assert_eq!(config.max_evaluations(), Some(200));
    assert!(config.validate().is_ok());
}

#[test]
fn test_unknown_vision_type_is_a_parse_error() {
    let err = ExplorationConfig::from_toml_str(r#"vision = ["ultraviolet"]"#).unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn test_validate_rejects_vision_lists() {
    let too_many = ExplorationConfig::new().with_vision(vec![
        VisionType::Normal,
        VisionType::Protanopia,
        VisionType::Deuteranopia,
        VisionType::Tritanopia,
    ]);
    assert!(matches!(too_many.validate(), Err(ConfigError::Invalid(_))));

    let twice = ExplorationConfig::new().with_vision(vec![VisionType::Normal, VisionType::Normal]);
    assert!(matches!(twice.validate(), Err(ConfigError::Invalid(_))));

    let none = ExplorationConfig::new().with_vision(Vec::new());
    assert!(matches!(none.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_validate_rejects_out_of_range_values() {
    let mask = ExplorationConfig::new().with_subspace(vec![false, false, false]);
    assert!(mask.validate().is_err());

    let time = ExplorationConfig::new().with_interpolation_time(1.5);
    assert!(time.validate().is_err());

    let ratio = ExplorationConfig::new().with_locked_ratio(-0.1, 0);
    assert!(ratio.validate().is_err());

    let epsilon = ExplorationConfig {
        finite_difference_epsilon: 0.0,
        ..ExplorationConfig::default()
    };
    assert!(epsilon.validate().is_err());
}

#[test]
fn test_missing_file_is_io_error() {
    let err = ExplorationConfig::load("/nonexistent/exploration.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
