use serde_json::json;

use super::*;
use crate::transform::placement::Geometry;
use crate::widget::schema::{FieldKind, FieldSpec, ObjectSchema};

fn obj(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(m) => m,
        _ => panic!("expected object"),
    }
}

fn banner() -> WidgetDefinition {
    WidgetDefinition::new("acme", "banner")
        .with_parameters(
            SchemaSection::new(
                ObjectSchema::new()
                    .field(FieldSpec::new("width", FieldKind::number_in(0.0, 2000.0)))
                    .field(FieldSpec::new("height", FieldKind::number_in(0.0, 2000.0)))
                    .field(FieldSpec::new("title", FieldKind::text())),
            )
            .with_field_config(json!({"title": {"widget": "textarea"}})),
        )
        .with_appear(SchemaSection::new(
            ObjectSchema::new().field(FieldSpec::new("from", FieldKind::one_of(["left", "top"]))),
        ))
        .with_defaults(obj(json!({"width": 400, "height": 200, "x": 10, "theme": "dark"})))
}

fn registry() -> WidgetRegistry {
    let mut r = WidgetRegistry::new();
    r.register(banner()).unwrap();
    r
}

#[test]
fn register_rejects_duplicates() {
    let mut r = registry();
    let err = r.register(banner()).unwrap_err();
    assert!(matches!(err, StageError::DuplicateWidget { .. }));
    assert_eq!(r.len(), 1);

    r.register(WidgetDefinition::new("other", "banner")).unwrap();
    assert_eq!(r.keys(), vec![("acme", "banner"), ("other", "banner")]);

    assert!(r.unregister("acme", "banner").is_some());
    assert!(r.unregister("acme", "banner").is_none());
    r.register(banner()).unwrap();
}

#[test]
fn defaults_fill_absent_fields() {
    let r = registry();
    let out = r
        .resolve_parameters("acme", "banner", &Map::new(), UnknownFields::Strict)
        .unwrap();
    assert_eq!(
        out.values,
        json!({"width": 400, "height": 200, "x": 10, "theme": "dark"})
    );

    let out = r
        .resolve_parameters(
            "acme",
            "banner",
            &obj(json!({"width": 500})),
            UnknownFields::Strict,
        )
        .unwrap();
    assert_eq!(out.values["width"], json!(500));
    assert_eq!(out.values["height"], json!(200));
    assert_eq!(out.field_config, json!({"title": {"widget": "textarea"}}));
    assert_eq!(out.fields.len(), 3);
}

#[test]
fn undeclared_defaults_fill_without_a_matching_field() {
    let mut r = WidgetRegistry::new();
    r.register(
        WidgetDefinition::new("acme", "card")
            .with_parameters(SchemaSection::new(
                ObjectSchema::new().field(FieldSpec::new("title", FieldKind::text())),
            ))
            .with_defaults(obj(json!({"width": 400, "height": 200}))),
    )
    .unwrap();

    let out = r
        .resolve_parameters("acme", "card", &Map::new(), UnknownFields::Lenient)
        .unwrap();
    assert_eq!(out.values, json!({"width": 400, "height": 200}));

    let out = r
        .resolve_parameters(
            "acme",
            "card",
            &obj(json!({"title": "Hi", "width": 10})),
            UnknownFields::Lenient,
        )
        .unwrap();
    assert_eq!(out.values, json!({"title": "Hi", "width": 10, "height": 200}));
}

#[test]
fn null_user_value_falls_back_to_default() {
    let r = registry();
    let out = r
        .resolve_parameters(
            "acme",
            "banner",
            &obj(json!({"width": null})),
            UnknownFields::Strict,
        )
        .unwrap();
    assert_eq!(out.values["width"], json!(400));
}

#[test]
fn parameter_errors_are_rooted_at_the_section() {
    let r = registry();
    let err = r
        .resolve_parameters(
            "acme",
            "banner",
            &obj(json!({"title": 5})),
            UnknownFields::Strict,
        )
        .unwrap_err();
    assert_eq!(err.path(), Some("$.parameters.title"));

    let err = r
        .resolve_appear("acme", "banner", &obj(json!({"from": "right"})), UnknownFields::Strict)
        .unwrap_err();
    assert_eq!(err.path(), Some("$.appear.from"));
}

#[test]
fn unknown_widget_is_reported() {
    let r = registry();
    let err = r
        .resolve_parameters("acme", "nope", &Map::new(), UnknownFields::Lenient)
        .unwrap_err();
    assert!(matches!(
        err,
        StageError::WidgetNotFound { ref widget_id, .. } if widget_id == "nope"
    ));
}

#[test]
fn absent_sections_resolve_to_empty() {
    let r = registry();
    let out = r
        .resolve_disappear("acme", "banner", &obj(json!({"x": 1})), UnknownFields::Strict)
        .unwrap();
    assert_eq!(out.values, json!({}));
    assert_eq!(out.field_config, Value::Null);
    assert!(out.fields.is_empty());
}

#[test]
fn instantiate_seeds_geometry_from_defaults() {
    let r = registry();
    let e = r
        .instantiate("acme", "banner", obj(json!({"title": "Hello"})))
        .unwrap();
    assert_eq!(
        e.geometry(),
        &Geometry {
            x: 10.0,
            width: Some(400.0),
            height: Some(200.0),
            ..Geometry::default()
        }
    );
    let props = e.widget_props().unwrap();
    assert_eq!(props.parameters["title"], json!("Hello"));
    assert_eq!(props.parameters["width"], json!(400));
    assert!(props.parameters.get("theme").is_none());
    let again = r
        .resolve_parameters("acme", "banner", &props.parameters, UnknownFields::Strict)
        .unwrap();
    assert_eq!(again.values["theme"], json!("dark"));

    assert!(r.instantiate("acme", "banner", obj(json!({"bogus": 1}))).is_err());
}

#[test]
fn inspector_metadata_lists_sections() {
    let r = registry();
    let m = r.inspector_metadata("acme", "banner").unwrap();
    assert_eq!(m.parameters.as_ref().unwrap().fields[2].name, "title");
    assert!(m.appear.is_some());
    assert!(m.disappear.is_none());
    assert_eq!(m.defaults["theme"], json!("dark"));
}
