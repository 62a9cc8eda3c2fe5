use rekord::{build, mapping, RecordType, RekordError, Value};

/// Person construct with a nested Address default, the canonical shape for
/// these tests: `name`, `last_name`, then `address` with `city`, `zip`,
/// `street`.
fn person_type() -> RecordType {
    let address = build("Address")
        .field("city")
        .field("zip")
        .field("street")
        .build()
        .unwrap();
    build("Person")
        .field("name")
        .field("last_name")
        .nested("address", &address)
        .build()
        .unwrap()
}

#[test]
fn partial_input_fills_nested_default_with_absence_values() {
    let person = person_type();
    let john = person.create(&mapping! { "name" => "John", "last_name" => "Doe" });

    let address = john.get("address").unwrap().as_record().unwrap();
    assert_eq!(address.get("city").unwrap(), &Value::Null);
    assert_eq!(address.get("zip").unwrap(), &Value::Null);
    assert_eq!(address.get("street").unwrap(), &Value::Null);
}

#[test]
fn compact_mapping_drops_absent_and_empty_nested() {
    let person = person_type();
    let john = person.create(&mapping! { "name" => "John", "last_name" => "Doe" });

    let compact = john.to_mapping_compact();
    assert_eq!(
        compact,
        mapping! { "name" => "John", "last_name" => "Doe" }
    );

    // A partially filled nested record survives, compacted.
    let with_city = person.create(&mapping! {
        "name" => "John",
        "address" => mapping! { "city" => "Anytown" },
    });
    let compact = with_city.to_mapping_compact();
    assert_eq!(
        compact.get("address"),
        Some(&Value::Map(mapping! { "city" => "Anytown" }))
    );
    assert!(!compact.contains_key("last_name"));
}

#[test]
fn full_input_reaches_nested_record_by_position_and_path() {
    let person = person_type();
    let john = person.create(&mapping! {
        "name" => "John",
        "last_name" => "Doe",
        "address" => mapping! {
            "city" => "Anytown",
            "zip" => "45678",
            "street" => "123 Main St",
        },
    });

    let last = john.get(-1).unwrap();
    assert_eq!(last, john.get("address").unwrap());
    assert_eq!(
        john.dig(["address", "city"]).unwrap(),
        Some(&Value::from("Anytown"))
    );
    assert_eq!(
        john.dig(["address", "street"]).unwrap(),
        Some(&Value::from("123 Main St"))
    );
}

#[test]
fn update_overrides_by_name_and_keeps_the_rest() {
    let person = person_type();
    let john = person.create(&mapping! {
        "name" => "John",
        "last_name" => "Doe",
        "address" => mapping! { "city" => "Anytown", "zip" => "45678" },
    });
    let address_before = john.get("address").unwrap().clone();
    let snapshot = john.to_mapping();

    let fred = john.update(&mapping! { "name" => "Fred" });
    assert_eq!(fred.get("name").unwrap(), &Value::from("Fred"));
    assert_eq!(fred.get("last_name").unwrap(), &Value::from("Doe"));
    assert_eq!(fred.get("address").unwrap(), &address_before);

    // The receiver is untouched.
    assert_eq!(john.to_mapping(), snapshot);
    assert_eq!(john.get("name").unwrap(), &Value::from("John"));
}

#[test]
fn update_can_rebuild_a_nested_record_from_a_raw_mapping() {
    let person = person_type();
    let john = person.create(&mapping! {
        "name" => "John",
        "address" => mapping! { "city" => "Anytown" },
    });

    let moved = john.update(&mapping! {
        "address" => mapping! { "city" => "Springfield" },
    });
    assert_eq!(
        moved.dig(["address", "city"]).unwrap(),
        Some(&Value::from("Springfield"))
    );
    // Rebuilt from the override alone: other sub-fields reset to defaults.
    assert_eq!(
        moved.dig(["address", "zip"]).unwrap(),
        Some(&Value::Null)
    );
}

#[test]
fn access_misses_are_typed_errors() {
    let person = person_type();
    let john = person.create(&mapping! { "name" => "John" });

    assert_eq!(
        john.get("unknown_name"),
        Err(RekordError::UnknownAttribute("unknown_name".into()))
    );
    assert_eq!(
        john.get(99),
        Err(RekordError::OutOfRange { index: 99, len: 3 })
    );
}

#[test]
fn json_input_builds_records() {
    let person = person_type();
    let input = Value::from(serde_json::json!({
        "name": "John",
        "last_name": "Doe",
        "address": { "city": "Anytown", "zip": "45678", "street": "123 Main St" },
        "unknown": "dropped",
    }));
    let john = person.create(input.as_map().unwrap());

    assert_eq!(john.get("name").unwrap(), &Value::from("John"));
    assert_eq!(
        john.dig(["address", "zip"]).unwrap(),
        Some(&Value::from("45678"))
    );
}

#[test]
fn serialized_record_equals_serialized_mapping_view() {
    let person = person_type();
    let john = person.create(&mapping! {
        "name" => "John",
        "address" => mapping! { "city" => "Anytown" },
    });

    let direct = serde_json::to_value(&john).unwrap();
    let via_mapping = serde_json::to_value(john.to_mapping()).unwrap();
    assert_eq!(direct, via_mapping);
    assert_eq!(direct["address"]["city"], serde_json::json!("Anytown"));
}

#[test]
fn records_carry_time_and_id_scalars() {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    let ty = build("Event")
        .field("id")
        .field("at")
        .build()
        .unwrap();
    let id = Uuid::new_v4();
    let at = Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap();
    let event = ty.create(&mapping! { "id" => id, "at" => at });

    assert_eq!(event.get("id").unwrap().as_id(), Some(id));
    assert_eq!(event.get("at").unwrap().as_time(), Some(at));
}
