//! Golden wire-format tests.
//!
//! The golden files are the contract with the computation server. If a field
//! is renamed or its null handling changes, these tests fail and force a
//! protocol version discussion.

use livegrid_protocol::{decode_batch, encode_request, CellUpdateRequest, CellUpdateResponse};

fn golden(name: &str) -> serde_json::Value {
    let path = format!("tests/golden/{}", name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Cannot read {}: {}", path, e));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("Cannot parse {}: {}", path, e))
}

#[test]
fn test_golden_request_set() {
    let request = CellUpdateRequest::new(2, 3, Some("=B4".into()));
    let encoded: serde_json::Value = serde_json::from_str(&encode_request(&request).unwrap()).unwrap();
    assert_eq!(encoded, golden("request-set.json"));
}

#[test]
fn test_golden_request_clear() {
    let request = CellUpdateRequest::new(0, 0, None);
    let encoded: serde_json::Value = serde_json::from_str(&encode_request(&request).unwrap()).unwrap();
    assert_eq!(encoded, golden("request-clear.json"));

    // Deletion must be an explicit null, not a missing key.
    let obj = encoded.as_object().unwrap();
    assert!(obj.contains_key("expression"));
    assert!(obj["expression"].is_null());
}

#[test]
fn test_golden_batch_recalc() {
    let text = golden("batch-recalc.json").to_string();
    let batch = decode_batch(&text).unwrap();

    assert_eq!(
        batch,
        vec![
            CellUpdateResponse { col: 2, row: 3, value: Some("42".into()), error: None },
            CellUpdateResponse { col: 0, row: 7, value: Some("84".into()), error: None },
            CellUpdateResponse {
                col: 1,
                row: 1,
                value: None,
                error: Some("Unknown function FOO".into()),
            },
        ]
    );
}
