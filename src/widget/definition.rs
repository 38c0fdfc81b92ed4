use std::sync::Arc;

use serde_json::{Map, Value};

use crate::foundation::error::{StageError, StageResult};
use crate::widget::schema::{ObjectSchema, ParamSchema};

/// One parameter section of a widget definition: a validator plus opaque editor config.
#[derive(Clone, Debug)]
pub struct SchemaSection {
    /// Validator for the section's object.
    pub schema: Arc<dyn ParamSchema>,
    /// Editor configuration handed through to the inspector untouched.
    pub field_config: Value,
}

impl SchemaSection {
    /// Section with no field config.
    pub fn new(schema: impl ParamSchema + 'static) -> Self {
        Self {
            schema: Arc::new(schema),
            field_config: Value::Null,
        }
    }

    /// Attach editor field config.
    pub fn with_field_config(mut self, field_config: Value) -> Self {
        self.field_config = field_config;
        self
    }
}

/// Externally supplied widget description, keyed by `(scope, name)`.
#[derive(Clone, Debug)]
pub struct WidgetDefinition {
    /// Package namespace.
    pub scope: String,
    /// Widget name within `scope`.
    pub name: String,
    /// User parameter schema.
    pub parameters: Option<SchemaSection>,
    /// Entry phase parameter schema.
    pub appear: Option<SchemaSection>,
    /// Exit phase parameter schema.
    pub disappear: Option<SchemaSection>,
    /// Default parameter values; geometry keys also seed new instances.
    pub defaults: Map<String, Value>,
}

impl WidgetDefinition {
    /// Definition with no sections and no defaults.
    pub fn new(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            name: name.into(),
            parameters: None,
            appear: None,
            disappear: None,
            defaults: Map::new(),
        }
    }

    /// Set the parameter section.
    pub fn with_parameters(mut self, section: SchemaSection) -> Self {
        self.parameters = Some(section);
        self
    }

    /// Set the appear section.
    pub fn with_appear(mut self, section: SchemaSection) -> Self {
        self.appear = Some(section);
        self
    }

    /// Set the disappear section.
    pub fn with_disappear(mut self, section: SchemaSection) -> Self {
        self.disappear = Some(section);
        self
    }

    /// Replace the defaults.
    pub fn with_defaults(mut self, defaults: Map<String, Value>) -> Self {
        self.defaults = defaults;
        self
    }

    pub(crate) fn validate(&self) -> StageResult<()> {
        if self.scope.trim().is_empty() {
            return Err(StageError::validation_at("$.scope", "must be non-empty"));
        }
        if self.name.trim().is_empty() {
            return Err(StageError::validation_at("$.name", "must be non-empty"));
        }
        Ok(())
    }
}

/// JSON form of a section, using the built-in [`ObjectSchema`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSectionDoc {
    /// Declared fields.
    #[serde(default)]
    pub schema: ObjectSchema,
    /// Editor configuration.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub field_config: Value,
}

/// JSON form of a [`WidgetDefinition`], as shipped by widget packages.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDefinitionDoc {
    /// Package namespace.
    pub scope: String,
    /// Widget name within `scope`.
    pub name: String,
    /// User parameter section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<SchemaSectionDoc>,
    /// Entry phase section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appear: Option<SchemaSectionDoc>,
    /// Exit phase section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disappear: Option<SchemaSectionDoc>,
    /// Default values.
    #[serde(default)]
    pub defaults: Map<String, Value>,
}

impl From<SchemaSectionDoc> for SchemaSection {
    fn from(doc: SchemaSectionDoc) -> Self {
        SchemaSection::new(doc.schema).with_field_config(doc.field_config)
    }
}

impl From<WidgetDefinitionDoc> for WidgetDefinition {
    fn from(doc: WidgetDefinitionDoc) -> Self {
        Self {
            scope: doc.scope,
            name: doc.name,
            parameters: doc.parameters.map(Into::into),
            appear: doc.appear.map(Into::into),
            disappear: doc.disappear.map(Into::into),
            defaults: doc.defaults,
        }
    }
}

/// Parse a JSON array of widget definitions.
pub fn parse_widget_definitions(json: &str) -> StageResult<Vec<WidgetDefinition>> {
    let docs: Vec<WidgetDefinitionDoc> = serde_json::from_str(json)?;
    Ok(docs.into_iter().map(Into::into).collect())
}
