//! Scripts and configuration loaded from disk

use std::io::Write;
use temporal_store::prelude::*;
use temporal_store::query::{run_script, CommandOutput};

const SESSION_SCRIPT: &str = r#"
# sessions expire, profiles keep history
SET_TTL 100 session token abc123 50
SET 100 profile name "Alice"
SET 100 profile city NYC
GET 149 session token
GET 150 session token
CAS 200 profile name Alice "Alice Smith"
CAD 250 profile city NYC
SET_AT 300 profile city LA 275
GET_AT 400 profile name 150
GET_AT 400 profile city 260
SCAN 400 profile
SCAN_PREFIX 400 profile na
STATS
"#;

#[tokio::test]
async fn runs_script_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SESSION_SCRIPT.as_bytes()).unwrap();

    let text = tokio::fs::read_to_string(file.path()).await.unwrap();
    let store = TemporalStore::new();
    let outputs = run_script(&store, &text).unwrap();

    let rendered: Vec<String> = outputs.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "ok",
            "ok",
            "ok",
            "abc123",
            "(nil)",
            "true",
            "true",
            "ok",
            "Alice",
            "(nil)",
            "[city(LA), name(Alice Smith)]",
            "[name(Alice Smith)]",
            "keys=2 fields=3 versions=6 tombstones=1",
        ]
    );
    assert_eq!(outputs[5], CommandOutput::Applied(true));
}

#[test]
fn json_output_is_line_oriented() {
    let store = TemporalStore::new();
    let outputs = run_script(&store, "SET 1 k f v\nHISTORY k f\n").unwrap();
    let lines: Vec<String> = outputs.iter().map(|o| o.to_json().unwrap()).collect();

    assert_eq!(lines[0], r#"{"type":"unit"}"#);
    let history: serde_json::Value = serde_json::from_str(&lines[1]).unwrap();
    assert_eq!(history["type"], "history");
    assert_eq!(history["result"][0]["effective"], 1);
    assert_eq!(history["result"][0]["kind"]["value"], "v");
    assert!(lines.iter().all(|l| !l.contains('\n')));
}

#[test]
fn parse_errors_report_line() {
    let store = TemporalStore::new();
    let err = run_script(&store, "SET 1 k f v\n\nGET one k f\n").unwrap_err();
    match err {
        Error::Parse { line, .. } => assert_eq!(line, 3),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn store_from_config_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "shard_amount = 16\n[log]\nlevel = \"info\"\njson = true").unwrap();

    let config = StoreConfig::from_file(file.path()).unwrap();
    assert_eq!(config.shard_amount, Some(16));
    assert!(config.log.json);

    let store = TemporalStore::with_config(&config).unwrap();
    store.set(Timestamp::new(1), "k", "f", "v");
    assert_eq!(store.scan(Timestamp::new(1), "k"), vec!["f(v)"]);
}

#[test]
fn store_rejects_unvalidated_config() {
    let config = StoreConfig {
        shard_amount: Some(3),
        ..Default::default()
    };
    match TemporalStore::with_config(&config) {
        Err(Error::Configuration(message)) => assert!(message.contains("power of two")),
        other => panic!("unexpected {other:?}"),
    }
}
