//! forensics-engine CLI
//!
//! Analyze transaction batches for money-muling patterns from the
//! command line.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a CSV feed
//! forensics-engine analyze --input transactions.csv
//!
//! # Same, as JSON to a file
//! forensics-engine analyze --input transactions.csv --format json --output report.json
//!
//! # Generate a synthetic scenario for testing
//! forensics-engine generate --normal 700 --seed 42 --output test_data.csv
//! ```

use forensics_engine::engine::ForensicsEngine;
use forensics_engine::ingest;
use forensics_engine::simulation::test_data::{generate_scenario, ScenarioConfig};
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"forensics-engine — money-mule network detection

USAGE:
    forensics-engine <COMMAND> [OPTIONS]

COMMANDS:
    analyze     Run the detection pipeline on a transaction batch
    generate    Generate a synthetic scenario batch (for testing)
    help        Show this message

OPTIONS (analyze):
    --input <FILE>      Path to a .csv or .json transaction file
    --format <FORMAT>   Output format: text (default) or json
    --output <FILE>     Write the report to a file instead of stdout

OPTIONS (generate):
    --normal <N>        Number of background transactions (default: 700)
    --seed <N>          RNG seed (default: 42)
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    forensics-engine analyze --input transactions.csv
    forensics-engine analyze --input transactions.json --format json
    forensics-engine generate --normal 2000 --output test_data.csv"#
    );
}

fn cmd_analyze(args: &[String]) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let content = fs::read_to_string(&path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let parsed = if path.ends_with(".json") {
        ingest::from_json_str(&content)
    } else {
        ingest::from_csv_str(&content)
    };
    let batch = parsed.unwrap_or_else(|e| {
        eprintln!("Ingestion error: {}", e);
        process::exit(1);
    });

    let report = ForensicsEngine::new().analyze(&batch);

    let rendered = if format == "json" {
        serde_json::to_string_pretty(&report).unwrap_or_else(|e| {
            eprintln!("Error serializing report: {}", e);
            process::exit(1);
        })
    } else {
        format!("{}", report)
    };

    match output_path {
        Some(out) => {
            fs::write(&out, &rendered).unwrap_or_else(|e| {
                eprintln!("Error writing to '{}': {}", out, e);
                process::exit(1);
            });
            eprintln!(
                "Analyzed {} transactions → {}",
                report.metadata.total_transactions, out
            );
        }
        None => println!("{}", rendered),
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = ScenarioConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--normal" => {
                i += 1;
                config.normal_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--normal requires a number");
                        process::exit(1);
                    });
            }
            "--seed" => {
                i += 1;
                config.seed = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--seed requires a number");
                    process::exit(1);
                });
            }
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let batch = generate_scenario(&config);

    let mut csv = String::from("transaction_id,sender_id,receiver_id,amount,timestamp\n");
    for txn in batch.transactions() {
        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            txn.transaction_id(),
            txn.sender(),
            txn.receiver(),
            txn.amount(),
            txn.timestamp().format("%Y-%m-%d %H:%M:%S")
        ));
    }

    match output_path {
        Some(path) => {
            fs::write(&path, &csv).unwrap_or_else(|e| {
                eprintln!("Error writing to '{}': {}", path, e);
                process::exit(1);
            });
            eprintln!("Generated {} transactions → {}", batch.len(), path);
        }
        None => print!("{}", csv),
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "analyze" => cmd_analyze(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
