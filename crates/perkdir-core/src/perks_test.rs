use serde_json::json;

use super::*;

fn parse(value: serde_json::Value) -> PerkRecord {
    serde_json::from_value(value).expect("record should deserialize")
}

// -----------------------------------------------------------------------
// normalize_merchant
// -----------------------------------------------------------------------

#[test]
fn normalize_merchant_keeps_embedded_id_and_name() {
    let merchant = normalize_merchant(&MerchantRef::embedded("m1", "Acme")).unwrap();
    assert_eq!(merchant.id, "m1");
    assert_eq!(merchant.name, "Acme");
    assert!(!merchant.is_name_only());
}

#[test]
fn normalize_merchant_uses_bare_string_as_id_and_name() {
    let merchant = normalize_merchant(&MerchantRef::bare("  Acme ")).unwrap();
    assert_eq!(merchant.id, "Acme");
    assert_eq!(merchant.name, "Acme");
    assert!(merchant.is_name_only());
}

#[test]
fn normalize_merchant_falls_back_to_whichever_half_is_present() {
    let id_only = MerchantRef::Embedded {
        id: Some("m9".to_owned()),
        name: None,
    };
    let name_only = MerchantRef::Embedded {
        id: None,
        name: Some("Globex".to_owned()),
    };
    assert_eq!(normalize_merchant(&id_only).unwrap().name, "m9");
    assert_eq!(normalize_merchant(&name_only).unwrap().id, "Globex");
}

#[test]
fn normalize_merchant_rejects_blank_values() {
    assert!(normalize_merchant(&MerchantRef::bare("   ")).is_none());
    let blank = MerchantRef::Embedded {
        id: Some(String::new()),
        name: Some(" ".to_owned()),
    };
    assert!(normalize_merchant(&blank).is_none());
}

// -----------------------------------------------------------------------
// PerkRecord deserialization
// -----------------------------------------------------------------------

#[test]
fn deserializes_embedded_merchant_with_mongo_ids() {
    let record = parse(json!({
        "_id": "p1",
        "title": "10% Off Widgets",
        "merchant": { "_id": "m1", "name": "Acme" },
        "visibility": "public"
    }));
    assert_eq!(record.id.as_deref(), Some("p1"));
    assert_eq!(record.title(), Some("10% Off Widgets"));
    assert_eq!(record.merchant, Some(MerchantRef::embedded("m1", "Acme")));
    assert_eq!(record.visibility, Visibility::Public);
}

#[test]
fn accepts_records_carrying_both_id_and_mongo_id() {
    let record = parse(json!({
        "_id": "p1",
        "id": "p1",
        "title": "10% Off Widgets",
        "merchant": { "_id": "m1", "id": "m1", "name": "Acme" }
    }));
    assert_eq!(record.id.as_deref(), Some("p1"));
    assert_eq!(record.title(), Some("10% Off Widgets"));
    assert!(!record.extra.contains_key("_id"));

    let record = parse(json!({ "_id": "mongo", "id": "virtual", "title": "Deal", "merchant": "Acme" }));
    assert_eq!(record.id.as_deref(), Some("virtual"));
}

#[test]
fn deserializes_bare_string_merchant() {
    let record = parse(json!({ "id": "p2", "title": "Free Coffee", "merchant": "Bean Co" }));
    let merchant = record.merchant().unwrap();
    assert_eq!(merchant.id, "Bean Co");
    assert_eq!(merchant.name, "Bean Co");
}

#[test]
fn stringifies_numeric_ids() {
    let record = parse(json!({ "id": 7, "title": "Deal", "merchant": { "id": 42, "name": "Initech" } }));
    assert_eq!(record.id.as_deref(), Some("7"));
    assert_eq!(record.merchant().unwrap().id, "42");
}

#[test]
fn missing_title_and_merchant_do_not_fail_the_record() {
    let record = parse(json!({ "id": "p3", "merchant": null, "title": true }));
    assert!(record.title.is_none());
    assert!(record.merchant.is_none());
    assert!(!record.is_well_formed());

    let record = parse(json!({ "id": "p4", "merchant": ["not", "a", "merchant"] }));
    assert!(record.title().is_none());
    assert!(record.merchant().is_none());
}

#[test]
fn blank_title_is_treated_as_missing() {
    let record = parse(json!({ "title": "   ", "merchant": "Acme" }));
    assert!(record.title().is_none());
}

#[test]
fn private_visibility_is_recognized_and_unknown_defaults_to_public() {
    let private = parse(json!({ "title": "Secret", "merchant": "Acme", "visibility": "Private" }));
    assert_eq!(private.visibility, Visibility::Private);

    let unknown = parse(json!({ "title": "Odd", "merchant": "Acme", "visibility": "unlisted" }));
    assert_eq!(unknown.visibility, Visibility::Public);

    let absent = parse(json!({ "title": "Plain", "merchant": "Acme" }));
    assert_eq!(absent.visibility, Visibility::Public);
}

#[test]
fn unmodeled_fields_are_kept_in_extra() {
    let record = parse(json!({
        "title": "Half Price Pizza",
        "merchant": "Slice",
        "description": "Tuesdays only",
        "category": "food",
        "discountPercent": 50
    }));
    assert_eq!(record.description.as_deref(), Some("Tuesdays only"));
    assert_eq!(record.extra.get("category"), Some(&json!("food")));
    assert_eq!(record.extra.get("discountPercent"), Some(&json!(50)));
    assert!(!record.extra.contains_key("title"));
}

#[test]
fn serialized_record_deserializes_to_the_same_merchant() {
    let record = PerkRecord::new("p1", "10% Off Widgets", MerchantRef::embedded("m1", "Acme"));
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["merchant"], json!({ "id": "m1", "name": "Acme" }));
    let back: PerkRecord = serde_json::from_value(value).unwrap();
    assert_eq!(back.merchant(), record.merchant());
}
