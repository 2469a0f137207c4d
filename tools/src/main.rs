//! synth-runner: headless transaction-network synthesizer.
//!
//! Usage:
//!   synth-runner --conf conf.json
//!   synth-runner --conf conf.json --seed 12345 --out /tmp/outputs

use amlsynth_core::{config::GeneratorConfig, generator::TransactionGenerator};
use anyhow::Result;
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let conf_path = find_arg(&args, "--conf").unwrap_or_else(|| "conf.json".to_string());

    let mut conf = GeneratorConfig::load(&conf_path)?;
    if let Some(seed) = find_arg(&args, "--seed") {
        conf.general.random_seed = Some(seed.parse()?);
    }
    if let Some(out_dir) = find_arg(&args, "--out") {
        conf.output.directory = out_dir;
    }

    println!("amlsynth — synth-runner");
    println!("  conf:     {conf_path}");
    println!("  seed:     {}", conf.seed());
    println!("  steps:    {}", conf.general.total_steps);
    println!("  inputs:   {}", conf.input.directory);
    println!("  outputs:  {}", conf.output.directory);
    println!();

    let mut generator = TransactionGenerator::new(conf);
    let summary = generator.run()?;

    println!("=== RUN SUMMARY ===");
    println!("  finished at:     {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("  accounts:        {}", summary.accounts);
    println!("  backbone txns:   {}", summary.backbone_transactions);
    println!("  total txns:      {}", summary.total_transactions);
    println!("  alert groups:    {}", summary.alert_groups);
    println!("  fraud subjects:  {}", summary.fraud_subjects);
    Ok(())
}

fn find_arg(args: &[String], flag: &str) -> Option<String> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].clone())
}
