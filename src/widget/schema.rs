//! Parameter schemas for widget definitions.
//!
//! [`ParamSchema`] is the capability a widget package provides for each of its parameter
//! sections. [`ObjectSchema`] is the built-in, serde-loadable implementation used by
//! [`crate::WidgetDefinitionDoc`].

use std::fmt;

use serde_json::{Map, Value};

use crate::foundation::core::is_hex_color;
use crate::foundation::error::{StageError, StageResult};

/// Handling of fields a schema does not declare.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFields {
    /// Reject with a validation error at the field's path.
    Strict,
    /// Keep the field verbatim and log a warning.
    #[default]
    Lenient,
}

/// Editor-facing description of one declared field.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMeta {
    /// Field key.
    pub name: String,
    /// Field kind name (`number`, `text`, `list`, ...).
    pub kind: String,
    /// Whether the field must be present after defaults are applied.
    pub required: bool,
    /// Human label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Longer help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Allowed values of an enum field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Nested fields of an object field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldMeta>,
}

/// Validation capability of one widget parameter section.
///
/// `validate` returns the normalized value or a [`StageError::Validation`] whose path is rooted
/// at `$` (the section object itself).
pub trait ParamSchema: Send + Sync + fmt::Debug {
    /// Validate `raw` and return the normalized object.
    fn validate(&self, raw: &Value, unknown: UnknownFields) -> StageResult<Value>;

    /// Declared fields, in declaration order.
    fn describe_fields(&self) -> Vec<FieldMeta>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathElem {
    Field(String),
    Index(usize),
}

fn format_path(path: &[PathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match p {
            PathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            PathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

fn err_at(path: &[PathElem], msg: impl Into<String>) -> StageError {
    StageError::validation_at(format_path(path), msg)
}

/// Value kind of a schema field.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldKind {
    /// Any JSON number, optionally bounded.
    Number {
        /// Inclusive lower bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        /// Inclusive upper bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// Whole number, optionally bounded.
    Integer {
        /// Inclusive lower bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        /// Inclusive upper bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    /// `true`/`false`.
    Boolean,
    /// String, optionally length-limited (in characters).
    Text {
        /// Maximum length in characters.
        #[serde(
            default,
            rename = "maxLength",
            skip_serializing_if = "Option::is_none"
        )]
        max_length: Option<usize>,
    },
    /// `#rgb`, `#rrggbb` or `#rrggbbaa`.
    Color,
    /// Non-empty string without whitespace.
    Url,
    /// One of a fixed set of strings.
    Enum {
        /// Allowed values.
        options: Vec<String>,
    },
    /// Homogeneous array.
    List {
        /// Kind of every item.
        items: Box<FieldKind>,
        /// Minimum item count.
        #[serde(
            default,
            rename = "minItems",
            skip_serializing_if = "Option::is_none"
        )]
        min_items: Option<usize>,
        /// Maximum item count.
        #[serde(
            default,
            rename = "maxItems",
            skip_serializing_if = "Option::is_none"
        )]
        max_items: Option<usize>,
    },
    /// Nested object with its own declared fields.
    Object {
        /// Declared nested fields.
        fields: Vec<FieldSpec>,
    },
}

impl FieldKind {
    /// Unbounded number.
    pub fn number() -> Self {
        Self::Number {
            min: None,
            max: None,
        }
    }

    /// Number within `[min, max]`.
    pub fn number_in(min: f64, max: f64) -> Self {
        Self::Number {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Unlimited text.
    pub fn text() -> Self {
        Self::Text { max_length: None }
    }

    /// Enum over `options`.
    pub fn one_of<S: Into<String>>(options: impl IntoIterator<Item = S>) -> Self {
        Self::Enum {
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// Unbounded list of `items`.
    pub fn list_of(items: FieldKind) -> Self {
        Self::List {
            items: Box::new(items),
            min_items: None,
            max_items: None,
        }
    }

    /// Kind name as shown to editors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Number { .. } => "number",
            Self::Integer { .. } => "integer",
            Self::Boolean => "boolean",
            Self::Text { .. } => "text",
            Self::Color => "color",
            Self::Url => "url",
            Self::Enum { .. } => "enum",
            Self::List { .. } => "list",
            Self::Object { .. } => "object",
        }
    }

    fn validate(
        &self,
        v: &Value,
        unknown: UnknownFields,
        path: &mut Vec<PathElem>,
    ) -> StageResult<Value> {
        match self {
            Self::Number { min, max } => {
                let n = v
                    .as_f64()
                    .ok_or_else(|| err_at(path, format!("expected a number, got {}", type_of(v))))?;
                if let Some(min) = min
                    && n < *min
                {
                    return Err(err_at(path, format!("must be >= {min}, got {n}")));
                }
                if let Some(max) = max
                    && n > *max
                {
                    return Err(err_at(path, format!("must be <= {max}, got {n}")));
                }
                Ok(v.clone())
            }
            Self::Integer { min, max } => {
                let n = v.as_i64().ok_or_else(|| {
                    err_at(path, format!("expected an integer, got {}", type_of(v)))
                })?;
                if let Some(min) = min
                    && n < *min
                {
                    return Err(err_at(path, format!("must be >= {min}, got {n}")));
                }
                if let Some(max) = max
                    && n > *max
                {
                    return Err(err_at(path, format!("must be <= {max}, got {n}")));
                }
                Ok(v.clone())
            }
            Self::Boolean => {
                if v.is_boolean() {
                    Ok(v.clone())
                } else {
                    Err(err_at(path, format!("expected a boolean, got {}", type_of(v))))
                }
            }
            Self::Text { max_length } => {
                let s = expect_str(v, path)?;
                if let Some(max) = max_length
                    && s.chars().count() > *max
                {
                    return Err(err_at(path, format!("must be at most {max} characters")));
                }
                Ok(v.clone())
            }
            Self::Color => {
                let s = expect_str(v, path)?;
                if !is_hex_color(s) {
                    return Err(err_at(path, format!("'{s}' is not a hex color")));
                }
                Ok(v.clone())
            }
            Self::Url => {
                let s = expect_str(v, path)?;
                if s.is_empty() || s.chars().any(char::is_whitespace) {
                    return Err(err_at(path, "must be a non-empty url without whitespace"));
                }
                Ok(v.clone())
            }
            Self::Enum { options } => {
                let s = expect_str(v, path)?;
                if !options.iter().any(|o| o == s) {
                    return Err(err_at(
                        path,
                        format!("'{s}' is not one of [{}]", options.join(", ")),
                    ));
                }
                Ok(v.clone())
            }
            Self::List {
                items,
                min_items,
                max_items,
            } => {
                let arr = v
                    .as_array()
                    .ok_or_else(|| err_at(path, format!("expected a list, got {}", type_of(v))))?;
                if let Some(min) = min_items
                    && arr.len() < *min
                {
                    return Err(err_at(path, format!("must have at least {min} items")));
                }
                if let Some(max) = max_items
                    && arr.len() > *max
                {
                    return Err(err_at(path, format!("must have at most {max} items")));
                }
                let mut out = Vec::with_capacity(arr.len());
                for (i, item) in arr.iter().enumerate() {
                    path.push(PathElem::Index(i));
                    out.push(items.validate(item, unknown, path)?);
                    path.pop();
                }
                Ok(Value::Array(out))
            }
            Self::Object { fields } => validate_object(fields, v, unknown, path),
        }
    }
}

fn expect_str<'a>(v: &'a Value, path: &[PathElem]) -> StageResult<&'a str> {
    v.as_str()
        .ok_or_else(|| err_at(path, format!("expected a string, got {}", type_of(v))))
}

fn type_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// One declared field of an [`ObjectSchema`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Field key.
    pub name: String,
    /// Value kind and its constraints.
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Must be present after defaults are applied.
    #[serde(default)]
    pub required: bool,
    /// Human label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldSpec {
    /// Optional field of `kind`.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            label: None,
            description: None,
        }
    }

    /// Mark as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the human label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn meta(&self) -> FieldMeta {
        FieldMeta {
            name: self.name.clone(),
            kind: self.kind.name().to_owned(),
            required: self.required,
            label: self.label.clone(),
            description: self.description.clone(),
            options: match &self.kind {
                FieldKind::Enum { options } => options.clone(),
                _ => Vec::new(),
            },
            fields: match &self.kind {
                FieldKind::Object { fields } => fields.iter().map(FieldSpec::meta).collect(),
                _ => Vec::new(),
            },
        }
    }
}

/// Declarative object schema: an ordered list of typed fields.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ObjectSchema {
    /// Declared fields in display order.
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl ObjectSchema {
    /// Schema with no fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field declaration.
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }
}

impl ParamSchema for ObjectSchema {
    fn validate(&self, raw: &Value, unknown: UnknownFields) -> StageResult<Value> {
        if raw.is_null() {
            return validate_object(&self.fields, &Value::Object(Map::new()), unknown, &mut vec![]);
        }
        validate_object(&self.fields, raw, unknown, &mut vec![])
    }

    fn describe_fields(&self) -> Vec<FieldMeta> {
        self.fields.iter().map(FieldSpec::meta).collect()
    }
}

fn validate_object(
    fields: &[FieldSpec],
    raw: &Value,
    unknown: UnknownFields,
    path: &mut Vec<PathElem>,
) -> StageResult<Value> {
    let obj = raw
        .as_object()
        .ok_or_else(|| err_at(path, format!("expected an object, got {}", type_of(raw))))?;

    let mut out = Map::new();
    for field in fields {
        path.push(PathElem::Field(field.name.clone()));
        match obj.get(&field.name) {
            Some(v) if !v.is_null() => {
                out.insert(field.name.clone(), field.kind.validate(v, unknown, path)?);
            }
            _ if field.required => return Err(err_at(path, "required field is missing")),
            _ => {}
        }
        path.pop();
    }

    for (key, v) in obj {
        if fields.iter().any(|f| &f.name == key) {
            continue;
        }
        match unknown {
            UnknownFields::Strict => {
                path.push(PathElem::Field(key.clone()));
                return Err(err_at(path, "unknown field"));
            }
            UnknownFields::Lenient => {
                tracing::warn!(field = %key, at = %format_path(path), "keeping unknown widget field");
                out.insert(key.clone(), v.clone());
            }
        }
    }
    Ok(Value::Object(out))
}

#[cfg(test)]
#[path = "../../tests/unit/widget/schema.rs"]
mod tests;
