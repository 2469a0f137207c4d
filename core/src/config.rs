//! Run configuration, loaded from a single JSON file.
//!
//! The file layout mirrors the parameter convention of the upstream
//! data sets: `general`, `default`, `input`, `temporal` (outputs) and
//! `graph_generator` sections. Parameter CSV files referenced by the
//! `input` section are resolved relative to `input.directory`.

use crate::types::Step;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    #[serde(default)]
    pub random_seed: Option<u64>,
    pub total_steps: Step,
}

/// Default amount / balance / step parameters applied when an input row
/// does not carry its own values.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultConfig {
    pub min_amount: f64,
    pub max_amount: f64,
    #[serde(default)]
    pub min_balance: Option<f64>,
    #[serde(default)]
    pub max_balance: Option<f64>,
    #[serde(default)]
    pub start_step: Option<Step>,
    #[serde(default)]
    pub end_step: Option<Step>,
    #[serde(default)]
    pub start_range: Option<Step>,
    #[serde(default)]
    pub end_range: Option<Step>,
    #[serde(default)]
    pub transaction_model: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub directory: String,
    pub accounts: String,
    pub alert_patterns: String,
    pub degree: String,
    pub transaction_type: String,
    pub is_aggregated_accounts: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub directory: String,
    pub accounts: String,
    pub transactions: String,
    pub alert_members: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphGeneratorConfig {
    pub degree_threshold: usize,
    #[serde(default)]
    pub high_risk_countries: String,
    #[serde(default)]
    pub high_risk_business: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    pub general: GeneralConfig,
    pub default: DefaultConfig,
    pub input: InputConfig,
    // The output section keeps its historical name in the file format.
    #[serde(rename = "temporal")]
    pub output: OutputConfig,
    pub graph_generator: GraphGeneratorConfig,
}

impl GeneratorConfig {
    /// Load a configuration JSON file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let conf: GeneratorConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(conf)
    }

    /// Master seed for the run. Absent seeds default to 0 so a config
    /// without one still produces a reproducible network.
    pub fn seed(&self) -> u64 {
        match self.general.random_seed {
            Some(s) => s,
            None => {
                log::warn!("No random_seed in config, defaulting to 0");
                0
            }
        }
    }

    pub fn input_path(&self, file: &str) -> PathBuf {
        Path::new(&self.input.directory).join(file)
    }

    pub fn output_path(&self, file: &str) -> PathBuf {
        Path::new(&self.output.directory).join(file)
    }

    pub fn high_risk_countries(&self) -> HashSet<String> {
        split_csv_set(&self.graph_generator.high_risk_countries)
    }

    pub fn high_risk_business(&self) -> HashSet<String> {
        split_csv_set(&self.graph_generator.high_risk_business)
    }

    /// Config with hardcoded defaults for use in tests. Input/output file
    /// names are placeholders; tests drive the loaders with their own paths.
    pub fn default_test() -> Self {
        Self {
            general: GeneralConfig {
                random_seed: Some(42),
                total_steps: 365,
            },
            default: DefaultConfig {
                min_amount: 100.0,
                max_amount: 1000.0,
                min_balance: Some(5_000.0),
                max_balance: Some(100_000.0),
                start_step: None,
                end_step: None,
                start_range: None,
                end_range: None,
                transaction_model: Some(1),
            },
            input: InputConfig {
                directory: "paramFiles".into(),
                accounts: "accounts.csv".into(),
                alert_patterns: "alertPatterns.csv".into(),
                degree: "degree.csv".into(),
                transaction_type: "transactionType.csv".into(),
                is_aggregated_accounts: true,
            },
            output: OutputConfig {
                directory: "outputs".into(),
                accounts: "accounts.csv".into(),
                transactions: "transactions.csv".into(),
                alert_members: "alert_members.csv".into(),
            },
            graph_generator: GraphGeneratorConfig {
                degree_threshold: 2,
                high_risk_countries: String::new(),
                high_risk_business: String::new(),
            },
        }
    }
}

fn split_csv_set(joined: &str) -> HashSet<String> {
    joined
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
