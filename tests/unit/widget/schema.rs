use serde_json::json;

use super::*;

fn card_schema() -> ObjectSchema {
    ObjectSchema::new()
        .field(FieldSpec::new("title", FieldKind::Text { max_length: Some(10) }).required())
        .field(FieldSpec::new("width", FieldKind::number_in(0.0, 4000.0)))
        .field(FieldSpec::new("accent", FieldKind::Color))
        .field(FieldSpec::new("align", FieldKind::one_of(["left", "right"])))
        .field(FieldSpec::new(
            "items",
            FieldKind::list_of(FieldKind::Object {
                fields: vec![FieldSpec::new("label", FieldKind::text()).required()],
            }),
        ))
}

#[test]
fn accepts_valid_input() {
    let v = card_schema()
        .validate(
            &json!({"title": "Hi", "width": 300, "align": "left", "items": [{"label": "a"}]}),
            UnknownFields::Strict,
        )
        .unwrap();
    assert_eq!(v["width"], json!(300));
    assert_eq!(v["items"][0]["label"], json!("a"));
}

#[test]
fn errors_carry_field_paths() {
    let s = card_schema();
    let err = s.validate(&json!({}), UnknownFields::Strict).unwrap_err();
    assert_eq!(err.path(), Some("$.title"));

    let err = s
        .validate(&json!({"title": "x", "width": "wide"}), UnknownFields::Strict)
        .unwrap_err();
    assert_eq!(err.path(), Some("$.width"));

    let err = s
        .validate(
            &json!({"title": "x", "items": [{"label": "a"}, {"label": "b"}, {}]}),
            UnknownFields::Strict,
        )
        .unwrap_err();
    assert_eq!(err.path(), Some("$.items[2].label"));

    let err = s
        .validate(&json!({"title": "x", "accent": "blue"}), UnknownFields::Strict)
        .unwrap_err();
    assert_eq!(err.path(), Some("$.accent"));

    let err = s
        .validate(&json!({"title": "much too long"}), UnknownFields::Strict)
        .unwrap_err();
    assert_eq!(err.path(), Some("$.title"));
}

#[test]
fn unknown_fields_depend_on_mode() {
    let s = card_schema();
    let raw = json!({"title": "x", "legacy": 1});

    let err = s.validate(&raw, UnknownFields::Strict).unwrap_err();
    assert_eq!(err.path(), Some("$.legacy"));

    let kept = s.validate(&raw, UnknownFields::Lenient).unwrap();
    assert_eq!(kept["legacy"], json!(1));
}

#[test]
fn null_section_is_an_empty_object() {
    let v = ObjectSchema::new().validate(&Value::Null, UnknownFields::Strict).unwrap();
    assert_eq!(v, json!({}));
}

#[test]
fn describe_lists_fields_in_order() {
    let meta = card_schema().describe_fields();
    let names: Vec<_> = meta.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["title", "width", "accent", "align", "items"]);
    assert!(meta[0].required);
    assert_eq!(meta[3].options, ["left", "right"]);
    assert_eq!(meta[4].kind, "list");
}

#[test]
fn loads_from_json() {
    let s: ObjectSchema = serde_json::from_value(json!({
        "fields": [
            {"name": "count", "kind": "integer", "min": 0, "required": true},
            {"name": "tags", "kind": "list", "items": {"kind": "text"}, "maxItems": 2}
        ]
    }))
    .unwrap();
    assert_eq!(s.fields[0].kind, FieldKind::Integer { min: Some(0), max: None });
    let err = s
        .validate(&json!({"count": -1}), UnknownFields::Strict)
        .unwrap_err();
    assert_eq!(err.path(), Some("$.count"));
    let err = s
        .validate(&json!({"count": 1, "tags": ["a", "b", "c"]}), UnknownFields::Strict)
        .unwrap_err();
    assert_eq!(err.path(), Some("$.tags"));
}
