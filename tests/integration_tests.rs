use forensics_engine::engine::ForensicsEngine;
use forensics_engine::graph::shell_chain::detect_shell_chains;
use forensics_engine::graph::transaction_graph::TransactionGraph;
use forensics_engine::ingest;
use forensics_engine::simulation::test_data::{generate_scenario, ScenarioConfig};

fn embedded_only() -> ScenarioConfig {
    ScenarioConfig {
        normal_count: 0,
        ..Default::default()
    }
}

/// Full pipeline over the embedded patterns with no background noise:
/// every planted structure must surface, every legitimate archetype
/// must stay out.
#[test]
fn full_pipeline_embedded_scenario() {
    let batch = generate_scenario(&embedded_only());
    let report = ForensicsEngine::new().analyze(&batch);

    // The three planted rings, identified by member set.
    let expected_rings: [&[&str]; 3] = [
        &["ACC_C01", "ACC_C02", "ACC_C03"],
        &["ACC_C04", "ACC_C05", "ACC_C06", "ACC_C07"],
        &["ACC_C08", "ACC_C09", "ACC_C10", "ACC_C11", "ACC_C12"],
    ];
    for expected in expected_rings {
        let found = report.fraud_rings.iter().any(|ring| {
            let mut members: Vec<&str> =
                ring.member_accounts.iter().map(|m| m.as_str()).collect();
            members.sort_unstable();
            members == expected
        });
        assert!(found, "missing ring {:?}", expected);
    }
    for ring in &report.fraud_rings {
        assert_eq!(ring.pattern_type, "cycle");
        assert!(ring.risk_score >= 25.0 && ring.risk_score <= 100.0);
    }

    // Smurfing targets carry the right tags.
    let fan_in = report
        .suspicious_accounts
        .iter()
        .find(|a| a.account_id.as_str() == "ACC_SMURF_IN")
        .expect("fan-in target flagged");
    assert!(fan_in
        .detected_patterns
        .contains(&"fan_in_smurfing".to_string()));

    let fan_out = report
        .suspicious_accounts
        .iter()
        .find(|a| a.account_id.as_str() == "ACC_SMURF_OUT")
        .expect("fan-out target flagged");
    assert!(fan_out
        .detected_patterns
        .contains(&"fan_out_smurfing".to_string()));

    // The planted shell chain surfaces intact.
    let graph = TransactionGraph::build(&batch);
    let chains = detect_shell_chains(&graph);
    let full_path = ["ACC_SRC", "ACC_SH1", "ACC_SH2", "ACC_SH3", "ACC_SH4", "ACC_DEST"];
    assert!(
        chains.iter().any(|c| {
            let path: Vec<&str> = c.path.iter().map(|p| p.as_str()).collect();
            path == full_path
        }),
        "planted shell chain not found"
    );

    // Legitimate archetypes are excluded.
    for excluded in ["ACC_PAYROLL", "ACC_SALARY_RX", "ACC_MERCHANT"] {
        assert!(
            report
                .suspicious_accounts
                .iter()
                .all(|a| a.account_id.as_str() != excluded),
            "{} must not be flagged",
            excluded
        );
    }

    // Ring members share a ring id and the length tag.
    for member in ["ACC_C01", "ACC_C02", "ACC_C03"] {
        let account = report
            .suspicious_accounts
            .iter()
            .find(|a| a.account_id.as_str() == member)
            .expect("ring member flagged");
        assert!(account.ring_id.is_some());
        assert!(account
            .detected_patterns
            .contains(&"cycle_length_3".to_string()));
    }

    // Summary is consistent with the body.
    assert_eq!(
        report.summary.suspicious_accounts_flagged,
        report.suspicious_accounts.len()
    );
    assert_eq!(report.summary.fraud_rings_detected, report.fraud_rings.len());
    assert_eq!(
        report.summary.total_accounts_analyzed,
        batch.accounts().len()
    );
}

/// Report-shape invariants hold even with heavy background noise.
#[test]
fn noisy_scenario_report_invariants() {
    let batch = generate_scenario(&ScenarioConfig::default());
    let report = ForensicsEngine::new().analyze(&batch);

    // Ordered by score, descending.
    for pair in report.suspicious_accounts.windows(2) {
        assert!(pair[0].suspicion_score >= pair[1].suspicion_score);
    }

    for account in &report.suspicious_accounts {
        assert!(account.suspicion_score >= 20.0);
        assert!(account.suspicion_score <= 100.0);
        assert!(!account.detected_patterns.is_empty());
        // No duplicate tags
        let mut tags = account.detected_patterns.clone();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), account.detected_patterns.len());
    }

    // Identifier formats.
    for (i, ring) in report.fraud_rings.iter().enumerate() {
        assert_eq!(ring.ring_id, format!("RING_{:03}", i + 1));
    }
    assert!(report.fraud_rings.len() <= 100);

    // The legitimate archetypes stay excluded despite the noise.
    for excluded in ["ACC_PAYROLL", "ACC_SALARY_RX", "ACC_MERCHANT"] {
        assert!(report
            .suspicious_accounts
            .iter()
            .all(|a| a.account_id.as_str() != excluded));
    }
}

/// Two runs over the same batch produce identical reports (processing
/// time aside, which is wall clock).
#[test]
fn analysis_is_deterministic() {
    let batch = generate_scenario(&ScenarioConfig::default());
    let engine = ForensicsEngine::new();

    let mut first = serde_json::to_value(engine.analyze(&batch)).unwrap();
    let mut second = serde_json::to_value(engine.analyze(&batch)).unwrap();
    first["summary"]["processing_time_seconds"] = 0.0.into();
    second["summary"]["processing_time_seconds"] = 0.0.into();
    assert_eq!(first, second);
}

/// CSV in, report out.
#[test]
fn csv_ingest_to_report() {
    let csv = "\
transaction_id,sender_id,receiver_id,amount,timestamp
TXN_000001,ACC_A,ACC_B,30000.00,2025-01-06 08:00:00
TXN_000002,ACC_A,ACC_B,30000.00,2025-01-06 08:30:00
TXN_000003,ACC_B,ACC_C,30000.00,2025-01-06 09:00:00
TXN_000004,ACC_B,ACC_C,30000.00,2025-01-06 09:30:00
TXN_000005,ACC_C,ACC_A,30000.00,2025-01-06 10:00:00
TXN_000006,ACC_C,ACC_A,30000.00,2025-01-06 10:30:00
";
    let batch = ingest::from_csv_str(csv).expect("valid csv");
    assert_eq!(batch.len(), 6);

    let report = ForensicsEngine::new().analyze(&batch);
    assert_eq!(report.fraud_rings.len(), 1);
    assert_eq!(report.fraud_rings[0].ring_id, "RING_001");
    assert_eq!(report.suspicious_accounts.len(), 3);
    for account in &report.suspicious_accounts {
        assert_eq!(account.ring_id.as_deref(), Some("RING_001"));
    }
}

/// An empty batch is valid and produces the all-zero report.
#[test]
fn empty_csv_produces_empty_report() {
    let batch = ingest::from_csv_str("transaction_id,sender_id,receiver_id,amount,timestamp\n")
        .expect("header-only csv is valid");
    let report = ForensicsEngine::new().analyze(&batch);

    assert!(report.suspicious_accounts.is_empty());
    assert!(report.fraud_rings.is_empty());
    assert_eq!(report.summary.total_accounts_analyzed, 0);
    assert_eq!(report.summary.suspicious_accounts_flagged, 0);
    assert_eq!(report.summary.fraud_rings_detected, 0);
    assert!(report.graph_data.nodes.is_empty());
    assert!(report.graph_data.edges.is_empty());
}

/// The serialized report carries exactly the contracted top-level keys
/// and the visualization payload mirrors the graph.
#[test]
fn report_json_contract() {
    let batch = generate_scenario(&embedded_only());
    let report = ForensicsEngine::new().analyze(&batch);
    let json = serde_json::to_value(&report).unwrap();

    let object = json.as_object().unwrap();
    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["fraud_rings", "graph_data", "summary", "suspicious_accounts"]
    );

    let nodes = json["graph_data"]["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), batch.accounts().len());
    for node in nodes {
        assert!(node["data"]["id"].is_string());
        assert!(node["data"]["is_suspicious"].is_boolean());
    }
    let edges = json["graph_data"]["edges"].as_array().unwrap();
    assert!(!edges.is_empty());
    for edge in edges {
        assert!(edge["data"]["count"].as_u64().unwrap() >= 1);
    }
}

/// Suspicious accounts never intersect the false-positive set.
#[test]
fn flagged_accounts_not_legitimate() {
    use forensics_engine::detection::false_positive::legitimate_accounts;

    let batch = generate_scenario(&ScenarioConfig::default());
    let graph = TransactionGraph::build(&batch);
    let legitimate = legitimate_accounts(&graph);
    let report = ForensicsEngine::new().analyze(&batch);

    for account in &report.suspicious_accounts {
        assert!(
            !legitimate.contains(&account.account_id),
            "{} is both flagged and legitimate",
            account.account_id
        );
    }
}
