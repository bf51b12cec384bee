//! Integration tests for schema construction and comparison.
//!
//! Exercises the public schema surface end to end: duplicate rejection,
//! order-sensitive equality against the order-insensitive subset family,
//! Arrow round trips and serialization through serde and the wire format.

use lattix::{DataType, Schema, SchemaError, WireFormat};

fn user_schema() -> Schema {
    Schema::from_pairs(vec![
        ("id", DataType::int64().non_nullable()),
        ("name", DataType::string()),
        ("signup_ts", DataType::timestamp_tz("UTC")),
        ("tags", DataType::array(DataType::string())),
    ])
    .expect("valid schema")
}

#[test]
fn test_construction_rejects_duplicates_listing_each_name_once() {
    let err = Schema::from_pairs(vec![
        ("id", DataType::int64()),
        ("name", DataType::string()),
        ("id", DataType::int32()),
        ("name", DataType::string()),
        ("id", DataType::int16()),
    ])
    .expect_err("duplicate names must be rejected");

    match err {
        SchemaError::DuplicateColumnNames { names } => {
            assert_eq!(
                names,
                vec!["id".to_string(), "name".to_string()],
                "each duplicated name should appear once, in first-seen order"
            );
        }
        other => panic!("expected DuplicateColumnNames, got {other:?}"),
    }
}

#[test]
fn test_lookup_surface() {
    let schema = user_schema();

    assert_eq!(schema.len(), 4);
    assert!(!schema.is_empty());
    assert_eq!(schema.names(), &["id", "name", "signup_ts", "tags"]);
    assert!(schema.contains("signup_ts"));
    assert!(!schema.contains("missing"));
    assert_eq!(schema.position("name"), Some(1));
    assert_eq!(schema.get("id"), Some(&DataType::int64().non_nullable()));
    assert_eq!(schema.name_at(3).unwrap(), "tags");

    let err = schema.field_type("missing").unwrap_err();
    assert_eq!(err.to_string(), "column 'missing' is not in the schema");

    let err = schema.name_at(9).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::IndexOutOfRange { index: 9, len: 4 }
    ));
}

#[test]
fn test_equality_is_order_sensitive() {
    let ab = Schema::from_pairs(vec![
        ("a", DataType::int64()),
        ("b", DataType::string()),
    ])
    .unwrap();
    let ba = Schema::from_pairs(vec![
        ("b", DataType::string()),
        ("a", DataType::int64()),
    ])
    .unwrap();

    assert_ne!(ab, ba, "column order is part of schema identity");

    // The set comparisons see through the reordering.
    assert!(ab.is_subset(&ba));
    assert!(ab.is_superset(&ba));
    assert!(!ab.is_strict_subset(&ba));
    assert!(!ab.is_strict_superset(&ba));
}

#[test]
fn test_subset_superset_family() {
    let table = user_schema();
    let view = Schema::from_pairs(vec![
        ("name", DataType::string()),
        ("id", DataType::int64().non_nullable()),
    ])
    .unwrap();
    let retyped = Schema::from_pairs(vec![
        ("name", DataType::string()),
        ("id", DataType::int32().non_nullable()),
    ])
    .unwrap();

    assert!(view.is_subset(&table), "a narrower view fits in the table");
    assert!(view.is_strict_subset(&table));
    assert!(table.is_superset(&view));
    assert!(table.is_strict_superset(&view));

    // A type change breaks the pair, not just the name.
    assert!(!retyped.is_subset(&table));
    assert!(!table.is_superset(&retyped));

    // Every schema is a non-strict subset and superset of itself.
    assert!(table.is_subset(&table));
    assert!(table.is_superset(&table));
    assert!(!table.is_strict_subset(&table));
    assert!(!table.is_strict_superset(&table));
}

#[test]
fn test_delete_preserves_remaining_order() {
    let schema = user_schema();

    let trimmed = schema.delete(&["name", "tags"]).unwrap();
    assert_eq!(trimmed.names(), &["id", "signup_ts"]);
    assert_eq!(trimmed.position("signup_ts"), Some(1));

    // The source schema is untouched.
    assert_eq!(schema.len(), 4);

    let err = schema.delete(&["name", "missing"]).unwrap_err();
    assert_eq!(err.to_string(), "column 'missing' is not in the schema");
}

#[test]
fn test_append_revalidates_collisions() {
    let left = Schema::from_pairs(vec![("id", DataType::int64())]).unwrap();
    let right = Schema::from_pairs(vec![
        ("score", DataType::float64()),
        ("rank", DataType::int32()),
    ])
    .unwrap();

    let combined = left.append(&right).unwrap();
    assert_eq!(combined.names(), &["id", "score", "rank"]);

    let clashing = Schema::from_pairs(vec![("id", DataType::string())]).unwrap();
    let err = left.append(&clashing).unwrap_err();
    assert_eq!(err.to_string(), "duplicate column name(s): id");
}

#[test]
fn test_display_aligns_types_on_longest_name() {
    let schema = Schema::from_pairs(vec![
        ("foo", DataType::int64()),
        ("bar", DataType::int64().non_nullable()),
    ])
    .unwrap();
    assert_eq!(
        schema.to_string(),
        "Schema {\n  foo  int64\n  bar  int64[non-nullable]\n}"
    );

    let uneven = Schema::from_pairs(vec![
        ("id", DataType::int64()),
        ("signup_ts", DataType::timestamp_tz("UTC")),
    ])
    .unwrap();
    assert_eq!(
        uneven.to_string(),
        "Schema {\n  id         int64\n  signup_ts  timestamp('UTC')\n}"
    );

    assert_eq!(Schema::empty().to_string(), "Schema {\n}");
}

#[test]
fn test_arrow_round_trip_preserves_order_and_nullability() {
    let schema = user_schema();

    let arrow_schema = schema.to_arrow().expect("should render as Arrow");
    assert_eq!(arrow_schema.fields().len(), 4);
    assert!(!arrow_schema.field(0).is_nullable(), "id is non-nullable");
    assert!(arrow_schema.field(1).is_nullable());

    let recovered = Schema::from_arrow(&arrow_schema).expect("should recover");
    assert_eq!(recovered, schema, "round trip should preserve identity");
}

#[test]
fn test_bincode_round_trip_rebuilds_position_index() {
    let schema = user_schema();

    let bytes = bincode::serde::encode_to_vec(&schema, bincode::config::standard())
        .expect("schema should encode");
    let (decoded, _): (Schema, usize) =
        bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
            .expect("schema should decode");

    assert_eq!(decoded, schema);
    // The name index is rebuilt, not transported.
    assert_eq!(decoded.position("tags"), Some(3));
    assert_eq!(
        decoded.get("signup_ts"),
        Some(&DataType::timestamp_tz("UTC"))
    );
}

#[test]
fn test_bincode_rejects_forged_duplicate_payload() {
    // A struct with two fields and a 2-tuple encode identically under
    // bincode, so this forges the serialized shape of a schema whose names
    // collide. Decoding must run the same integrity check as construction.
    let forged = (
        vec!["dup".to_string(), "dup".to_string()],
        vec![DataType::int64(), DataType::int64()],
    );
    let bytes = bincode::serde::encode_to_vec(&forged, bincode::config::standard()).unwrap();

    let result: Result<(Schema, usize), _> =
        bincode::serde::decode_from_slice(&bytes, bincode::config::standard());
    assert!(
        result.is_err(),
        "a forged payload with duplicate names must not decode"
    );
}

#[test]
fn test_wire_format_round_trip() {
    let schemas = vec![
        Schema::empty(),
        user_schema(),
        Schema::from_pairs(vec![
            ("amount", DataType::decimal(12, 2).non_nullable()),
            (
                "attributes",
                DataType::map(DataType::string(), DataType::string()),
            ),
        ])
        .unwrap(),
    ];

    for schema in schemas {
        let mut buffer = Vec::new();
        schema.encode(&mut buffer).expect("schema should encode");
        assert_eq!(
            buffer.len(),
            schema.encoded_size(),
            "encoded_size should match the bytes actually written for {schema}"
        );

        let decoded = Schema::decode(&mut buffer.as_slice()).expect("schema should decode");
        assert_eq!(decoded, schema, "wire round trip should preserve identity");
    }
}
