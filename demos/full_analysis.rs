//! End-to-end demo: generate a synthetic scenario, analyze it, and
//! print the report.

use forensics_engine::engine::ForensicsEngine;
use forensics_engine::simulation::test_data::{generate_scenario, ScenarioConfig};

fn main() {
    env_logger::init();

    let config = ScenarioConfig::default();
    let batch = generate_scenario(&config);
    println!(
        "Generated {} transactions across {} accounts (seed {})\n",
        batch.len(),
        batch.accounts().len(),
        config.seed
    );

    let report = ForensicsEngine::new().analyze(&batch);
    println!("{}", report);
}
