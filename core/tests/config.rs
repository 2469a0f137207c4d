//! Configuration loading tests.

use amlsynth_core::config::GeneratorConfig;
use std::fs;

const CONF_JSON: &str = r#"{
  "general": { "random_seed": 1234, "total_steps": 720 },
  "default": {
    "min_amount": 200.0,
    "max_amount": 2000.0,
    "min_balance": 10000.0,
    "max_balance": 100000.0
  },
  "input": {
    "directory": "paramFiles",
    "accounts": "accounts.csv",
    "alert_patterns": "alertPatterns.csv",
    "degree": "degree.csv",
    "transaction_type": "transactionType.csv",
    "is_aggregated_accounts": true
  },
  "temporal": {
    "directory": "outputs",
    "accounts": "accounts.csv",
    "transactions": "transactions.csv",
    "alert_members": "alert_members.csv"
  },
  "graph_generator": {
    "degree_threshold": 3,
    "high_risk_countries": "XX, YY",
    "high_risk_business": ""
  }
}"#;

#[test]
fn config_loads_from_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");
    fs::write(&path, CONF_JSON).unwrap();

    let conf = GeneratorConfig::load(path.to_str().unwrap()).unwrap();
    assert_eq!(conf.seed(), 1234);
    assert_eq!(conf.general.total_steps, 720);
    assert_eq!(conf.default.min_amount, 200.0);
    assert_eq!(conf.default.transaction_model, None);
    assert!(conf.input.is_aggregated_accounts);
    assert_eq!(conf.output.directory, "outputs", "temporal section maps to outputs");
    assert_eq!(conf.graph_generator.degree_threshold, 3);

    let countries = conf.high_risk_countries();
    assert!(countries.contains("XX") && countries.contains("YY"));
    assert!(conf.high_risk_business().is_empty());
}

#[test]
fn missing_seed_defaults_to_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");
    let json = CONF_JSON.replace(r#""random_seed": 1234, "#, "");
    fs::write(&path, json).unwrap();

    let conf = GeneratorConfig::load(path.to_str().unwrap()).unwrap();
    assert_eq!(conf.seed(), 0);
}

#[test]
fn unreadable_config_is_an_error() {
    let err = GeneratorConfig::load("/nonexistent/conf.json").unwrap_err();
    assert!(err.to_string().contains("Cannot read"));
}

#[test]
fn input_and_output_paths_join_their_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");
    fs::write(&path, CONF_JSON).unwrap();

    let conf = GeneratorConfig::load(path.to_str().unwrap()).unwrap();
    assert_eq!(
        conf.input_path(&conf.input.degree),
        std::path::Path::new("paramFiles").join("degree.csv")
    );
    assert_eq!(
        conf.output_path(&conf.output.transactions),
        std::path::Path::new("outputs").join("transactions.csv")
    );
}
