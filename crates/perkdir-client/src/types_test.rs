use serde_json::json;

use super::*;

#[test]
fn parses_bare_array() {
    let body = json!([
        { "_id": "p1", "title": "10% Off Widgets", "merchant": { "_id": "m1", "name": "Acme" } },
        { "_id": "p2", "title": "Free Coffee", "merchant": "Bean Co" }
    ])
    .to_string();
    let records = parse_perks_body(&body, "test").unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].merchant().unwrap().name, "Bean Co");
}

#[test]
fn parses_perks_envelope() {
    let body = json!({ "perks": [{ "title": "Deal", "merchant": "Acme" }] }).to_string();
    let records = parse_perks_body(&body, "test").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title(), Some("Deal"));
}

#[test]
fn drops_non_object_entries() {
    let body = json!([42, "nope", null, { "title": "Kept", "merchant": "Acme" }]).to_string();
    let records = parse_perks_body(&body, "test").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title(), Some("Kept"));
}

#[test]
fn unparseable_entry_is_dropped_without_disturbing_its_neighbours() {
    assert!(parse_entry(1, json!("nope"), "test").is_none());
    assert!(parse_entry(0, json!({ "title": "Deal" }), "test").is_some());

    let body = json!([
        { "_id": "p1", "title": "First", "merchant": "Acme" },
        ["not", "a", "perk"],
        { "_id": "p3", "title": "Third", "merchant": "Acme" }
    ])
    .to_string();
    let records = parse_perks_body(&body, "test").unwrap();
    let ids: Vec<_> = records.iter().map(|r| r.id.as_deref()).collect();
    assert_eq!(ids, vec![Some("p1"), Some("p3")]);
}

#[test]
fn keeps_records_carrying_both_id_and_mongo_id() {
    let body = json!([
        { "_id": "p1", "id": "p1", "title": "10% Off Widgets", "merchant": { "_id": "m1", "id": "m1", "name": "Acme" } },
        { "_id": "p2", "id": "p2", "title": "Free Coffee", "merchant": "Bean Co" }
    ])
    .to_string();
    let records = parse_perks_body(&body, "test").unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id.as_deref(), Some("p1"));
    assert_eq!(records[0].merchant().unwrap().name, "Acme");
}

#[test]
fn keeps_records_with_missing_fields() {
    let body = json!([{ "_id": "p1" }]).to_string();
    let records = parse_perks_body(&body, "test").unwrap();
    assert_eq!(records.len(), 1);
    assert!(!records[0].is_well_formed());
}

#[test]
fn rejects_invalid_json() {
    let result = parse_perks_body("<html>oops</html>", "perks endpoint");
    assert!(
        matches!(result, Err(ClientError::Deserialize { ref context, .. }) if context == "perks endpoint"),
        "expected Deserialize error, got: {result:?}"
    );
}

#[test]
fn rejects_object_without_perks_key() {
    let result = parse_perks_body(&json!({ "data": [] }).to_string(), "test");
    assert!(matches!(result, Err(ClientError::Deserialize { .. })));
}
