//! Tests for row generation over an in-memory schema.

use chrono::{NaiveDate, NaiveDateTime};
use cli_seeder::config::SeederConfig;
use cli_seeder::error::SeedError;
use cli_seeder::schema::{
    ColumnDefinition, ColumnType, ForeignKeyConstraint, MemorySchema, RowRecord, Value,
};
use cli_seeder::session::{GenerationSession, ParentContext, RowBuilder};
use cli_seeder::warnings::GenerationWarning;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn row(pairs: &[(&str, Value)]) -> RowRecord {
    pairs
        .iter()
        .map(|(c, v)| (c.to_string(), v.clone()))
        .collect()
}

fn hotel_parent() -> ParentContext {
    ParentContext {
        primary_key: Value::Int(7),
        foreign_key_name: "hotel_id".to_string(),
        display_value: "Grand Hotel".to_string(),
    }
}

/// bookings(id, hotel_id, guest_email, created_at) with existing max id 42
fn bookings_schema() -> MemorySchema {
    let mut schema = MemorySchema::new();
    schema.add_table(
        "bookings",
        vec![
            ColumnDefinition::new("id", ColumnType::BigInt),
            ColumnDefinition::new("hotel_id", ColumnType::BigInt),
            ColumnDefinition::new("guest_email", ColumnType::String),
            ColumnDefinition::new("created_at", ColumnType::DateTime),
        ],
    );
    for id in [40, 42, 41] {
        schema.push_row(
            "bookings",
            row(&[("id", Value::Int(id)), ("hotel_id", Value::Int(1))]),
        );
    }
    schema
}

fn generate(
    schema: &MemorySchema,
    config: &SeederConfig,
    table: &str,
    parent: Option<ParentContext>,
    count: i64,
) -> GenerationSession {
    let mut session = GenerationSession::start(schema, config, table, parent, count).unwrap();
    RowBuilder::new(schema, config)
        .unwrap()
        .with_seed(Some(11))
        .with_now(now())
        .generate(&mut session)
        .unwrap();
    session
}

// =============================================================================
// Booking example
// =============================================================================

#[test]
fn test_bookings_for_parent_hotel() {
    let schema = bookings_schema();
    let config = SeederConfig::default();
    let session = generate(&schema, &config, "bookings", Some(hotel_parent()), 3);

    assert_eq!(session.rows.len(), 3);

    let ids: Vec<_> = session.rows.iter().map(|r| r.get("id").cloned()).collect();
    assert_eq!(
        ids,
        vec![
            Some(Value::Int(43)),
            Some(Value::Int(44)),
            Some(Value::Int(45))
        ]
    );
    assert_eq!(session.running_max_id, 45);

    let window_start = NaiveDate::from_ymd_opt(2023, 12, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let window_end = NaiveDate::from_ymd_opt(2024, 12, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();

    for row in &session.rows {
        assert_eq!(row.get("hotel_id"), Some(&Value::Int(7)));

        let email = row.get("guest_email").unwrap().display();
        let (local, domain) = email.split_once('@').expect("email shape");
        assert!(!local.is_empty());
        assert!(domain.contains('.'));

        let created_at = row.get("created_at").unwrap().display();
        let parsed = NaiveDateTime::parse_from_str(&created_at, "%Y-%m-%d %H:%M:%S").unwrap();
        assert!(parsed >= window_start && parsed <= window_end);
    }
}

#[test]
fn test_rows_have_exactly_declared_columns() {
    let schema = bookings_schema();
    let config = SeederConfig::default();
    let session = generate(&schema, &config, "bookings", None, 5);

    for row in &session.rows {
        let columns: Vec<&str> = row.columns().collect();
        assert_eq!(columns, vec!["id", "hotel_id", "guest_email", "created_at"]);
    }
}

#[test]
fn test_empty_table_starts_at_one() {
    let mut schema = MemorySchema::new();
    schema.add_table("tags", vec![ColumnDefinition::new("id", ColumnType::BigInt)]);
    let session = generate(&schema, &SeederConfig::default(), "tags", None, 2);

    assert_eq!(session.rows[0].get("id"), Some(&Value::Int(1)));
    assert_eq!(session.rows[1].get("id"), Some(&Value::Int(2)));
}

#[test]
fn test_custom_primary_key_name() {
    let mut schema = MemorySchema::new();
    schema.add_table(
        "legacy",
        vec![
            ColumnDefinition::new("uid", ColumnType::BigInt),
            ColumnDefinition::new("label", ColumnType::String),
        ],
    );
    schema.push_row("legacy", row(&[("uid", Value::Int(9))]));
    let config = SeederConfig {
        primary_key: "uid".to_string(),
        ..Default::default()
    };

    let session = generate(&schema, &config, "legacy", None, 1);
    assert_eq!(session.rows[0].get("uid"), Some(&Value::Int(10)));
}

// =============================================================================
// Failure semantics
// =============================================================================

#[test]
fn test_non_positive_row_count_aborts_before_generation() {
    let schema = bookings_schema();
    let config = SeederConfig::default();
    for count in [0, -5] {
        let err = GenerationSession::start(&schema, &config, "bookings", None, count).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SeedError>(),
            Some(SeedError::InvalidRowCount(_))
        ));
    }
    assert_eq!(schema.rows("bookings").len(), 3);
}

#[test]
fn test_exhausted_key_column_is_an_error() {
    let mut schema = MemorySchema::new();
    schema
        .add_table("tags", vec![ColumnDefinition::new("id", ColumnType::BigInt)])
        .push_row("tags", row(&[("id", Value::Int(i64::MAX))]));
    let config = SeederConfig::default();

    let mut session = GenerationSession::start(&schema, &config, "tags", None, 1).unwrap();
    let err = RowBuilder::new(&schema, &config)
        .unwrap()
        .generate(&mut session)
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SeedError>(),
        Some(SeedError::KeyExhausted { column, .. }) if column == "id"
    ));
    assert_eq!(session.running_max_id, i64::MAX);
    assert!(session.rows.is_empty());
}

#[test]
fn test_largest_row_count_starts_a_session() {
    let schema = bookings_schema();
    let session =
        GenerationSession::start(&schema, &SeederConfig::default(), "bookings", None, i64::MAX)
            .unwrap();
    assert!(session.rows.is_empty());
    assert_eq!(session.running_max_id, 42);
}

#[test]
fn test_unsupported_type_does_not_abort() {
    let mut schema = MemorySchema::new();
    schema.add_table(
        "invoices",
        vec![
            ColumnDefinition::new("id", ColumnType::BigInt),
            ColumnDefinition::new("amount", ColumnType::Other("DECIMAL(10,2)".to_string())),
            ColumnDefinition::new("paid", ColumnType::Boolean),
        ],
    );

    let session = generate(&schema, &SeederConfig::default(), "invoices", None, 4);

    assert_eq!(session.rows.len(), 4);
    for row in &session.rows {
        assert_eq!(row.get("amount"), Some(&Value::Null));
        assert!(matches!(row.get("paid"), Some(Value::Bool(_))));
    }
    // one warning per column, not per row
    assert_eq!(session.warnings.count(), 1);
    assert_eq!(
        session.warnings.warnings()[0],
        GenerationWarning::UnsupportedType {
            table: "invoices".to_string(),
            column: "amount".to_string(),
            data_type: "decimal(10,2)".to_string(),
        }
    );
}

// =============================================================================
// Foreign keys
// =============================================================================

fn rooms_schema() -> MemorySchema {
    let mut schema = MemorySchema::new();
    schema
        .add_table(
            "rooms",
            vec![
                ColumnDefinition::new("id", ColumnType::BigInt),
                ColumnDefinition::new("hotel_id", ColumnType::BigInt),
            ],
        )
        .add_table(
            "bookings",
            vec![
                ColumnDefinition::new("id", ColumnType::BigInt),
                ColumnDefinition::new("hotel_id", ColumnType::BigInt),
                ColumnDefinition::new("room_id", ColumnType::BigInt),
            ],
        )
        .add_foreign_key(
            "bookings",
            ForeignKeyConstraint::new(&["room_id"], "rooms", &["id"]),
        );
    for (id, hotel) in [(100, 7), (101, 7), (200, 8)] {
        schema.push_row(
            "rooms",
            row(&[("id", Value::Int(id)), ("hotel_id", Value::Int(hotel))]),
        );
    }
    schema
}

#[test]
fn test_foreign_key_prefers_parent_siblings() {
    let schema = rooms_schema();
    let session = generate(
        &schema,
        &SeederConfig::default(),
        "bookings",
        Some(hotel_parent()),
        10,
    );

    for row in &session.rows {
        let room = row.get("room_id").and_then(Value::as_int).unwrap();
        assert!(room == 100 || room == 101, "room {} is not in hotel 7", room);
    }
    assert!(!session.warnings.has_warnings());
}

#[test]
fn test_same_seed_picks_same_related_rows() {
    let schema = rooms_schema();
    let config = SeederConfig::default();
    let rooms = || {
        generate(&schema, &config, "bookings", None, 12)
            .rows
            .iter()
            .map(|r| r.get("room_id").cloned())
            .collect::<Vec<_>>()
    };
    assert_eq!(rooms(), rooms());
}

#[test]
fn test_foreign_key_without_rows_falls_back_to_type() {
    let schema = rooms_schema();
    // no room belongs to hotel 99
    let parent = ParentContext {
        primary_key: Value::Int(99),
        ..hotel_parent()
    };

    let session = generate(&schema, &SeederConfig::default(), "bookings", Some(parent), 2);

    for row in &session.rows {
        assert!(matches!(row.get("room_id"), Some(Value::Int(_))));
    }
    assert!(matches!(
        session.warnings.warnings(),
        [GenerationWarning::ForeignKeyUnresolved { .. }]
    ));
}

#[test]
fn test_key_suffix_without_constraint_is_never_unset() {
    let mut schema = MemorySchema::new();
    schema.add_table(
        "events",
        vec![
            ColumnDefinition::new("id", ColumnType::BigInt),
            ColumnDefinition::new("venue_id", ColumnType::BigInt),
            ColumnDefinition::new("external_id", ColumnType::String),
        ],
    );

    let session = generate(&schema, &SeederConfig::default(), "events", None, 3);
    for row in &session.rows {
        assert!(matches!(row.get("venue_id"), Some(Value::Int(_))));
        assert!(matches!(row.get("external_id"), Some(Value::Text(_))));
    }
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_yaml_overrides_and_ranges() {
    let yaml = r#"
seed: 5
data_types:
  bigint:
    min: 10
    max: 20
  date:
    from: "-1 week"
    to: today
    format: "%d.%m.%Y"
tables:
  invoices:
    billing_mode:
      values: [prepaid, postpaid]
"#;
    let config: SeederConfig = serde_yaml_ng::from_str(yaml).unwrap();
    config.validate().unwrap();

    let mut schema = MemorySchema::new();
    schema.add_table(
        "invoices",
        vec![
            ColumnDefinition::new("quantity", ColumnType::BigInt),
            ColumnDefinition::new("billing_mode", ColumnType::String),
            ColumnDefinition::new("issued_on", ColumnType::Date),
        ],
    );

    let session = generate(&schema, &config, "invoices", None, 20);
    for row in &session.rows {
        let quantity = row.get("quantity").and_then(Value::as_int).unwrap();
        assert!((10..=20).contains(&quantity));

        let mode = row.get("billing_mode").unwrap().display();
        assert!(mode == "prepaid" || mode == "postpaid");

        let issued = row.get("issued_on").unwrap().display();
        let date = NaiveDate::parse_from_str(&issued, "%d.%m.%Y").unwrap();
        assert!(date >= NaiveDate::from_ymd_opt(2024, 6, 8).unwrap());
        assert!(date <= NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
    }
}
