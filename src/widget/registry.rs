//! Registry of widget definitions and parameter resolution against their schemas.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{
    element::model::{Element, ElementKind, WidgetProps},
    foundation::error::{StageError, StageResult},
    widget::definition::{SchemaSection, WidgetDefinition},
    widget::schema::{FieldMeta, UnknownFields},
};

/// Validated parameters of one section plus what an editor needs to present them.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedParameters {
    /// Normalized values (an object; empty when the section is absent).
    pub values: Value,
    /// Section field config; `null` when the section is absent.
    pub field_config: Value,
    /// Declared field metadata.
    pub fields: Vec<FieldMeta>,
}

impl ResolvedParameters {
    fn empty() -> Self {
        Self {
            values: Value::Object(Map::new()),
            field_config: Value::Null,
            fields: Vec::new(),
        }
    }
}

/// Editor metadata of one section.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionMetadata {
    /// Opaque editor config.
    pub field_config: Value,
    /// Declared fields.
    pub fields: Vec<FieldMeta>,
}

/// Everything an inspector panel needs to edit one widget kind.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectorMetadata {
    /// Package namespace.
    pub scope: String,
    /// Widget name.
    pub widget_id: String,
    /// Parameter section, if declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<SectionMetadata>,
    /// Appear section, if declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appear: Option<SectionMetadata>,
    /// Disappear section, if declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disappear: Option<SectionMetadata>,
    /// Definition defaults.
    pub defaults: Map<String, Value>,
}

/// Keys of `defaults` that seed the geometry of new instances.
const GEOMETRY_KEYS: [&str; 7] = ["x", "y", "width", "height", "rotation", "scale", "opacity"];

/// Widget definitions keyed by `(scope, name)`.
///
/// Populate it up front, then share it (it is `Send + Sync`) with every resolver.
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    defs: HashMap<(String, String), Arc<WidgetDefinition>>,
}

impl WidgetRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Register a definition; a second definition for the same `(scope, name)` is rejected.
    pub fn register(&mut self, definition: WidgetDefinition) -> StageResult<()> {
        definition.validate()?;
        let key = (definition.scope.clone(), definition.name.clone());
        if self.defs.contains_key(&key) {
            return Err(StageError::DuplicateWidget {
                scope: key.0,
                name: key.1,
            });
        }
        tracing::debug!(scope = %key.0, name = %key.1, "widget registered");
        self.defs.insert(key, Arc::new(definition));
        Ok(())
    }

    /// Remove a definition, returning it if it was registered.
    pub fn unregister(&mut self, scope: &str, name: &str) -> Option<Arc<WidgetDefinition>> {
        let removed = self.defs.remove(&(scope.to_owned(), name.to_owned()));
        if removed.is_some() {
            tracing::debug!(scope, name, "widget unregistered");
        }
        removed
    }

    /// Look up a definition.
    pub fn get(&self, scope: &str, widget_id: &str) -> StageResult<&Arc<WidgetDefinition>> {
        self.defs
            .get(&(scope.to_owned(), widget_id.to_owned()))
            .ok_or_else(|| StageError::WidgetNotFound {
                scope: scope.to_owned(),
                widget_id: widget_id.to_owned(),
            })
    }

    /// Registered `(scope, name)` pairs, sorted.
    pub fn keys(&self) -> Vec<(&str, &str)> {
        let mut keys: Vec<_> = self
            .defs
            .keys()
            .map(|(s, n)| (s.as_str(), n.as_str()))
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Validate user parameters and fill absent fields from the definition defaults.
    ///
    /// Defaults for declared fields are merged before validation, so they can satisfy a required
    /// field and are checked like user input. Defaults for undeclared keys are added verbatim
    /// after validation. A present field is never overridden. Error paths are rooted at
    /// `$.parameters`.
    pub fn resolve_parameters(
        &self,
        scope: &str,
        widget_id: &str,
        user: &Map<String, Value>,
        unknown: UnknownFields,
    ) -> StageResult<ResolvedParameters> {
        let def = self.get(scope, widget_id)?;
        let Some(section) = &def.parameters else {
            warn_dropped(scope, widget_id, "parameters", user);
            return Ok(ResolvedParameters::empty());
        };

        let fields = section.schema.describe_fields();
        let mut merged = user.clone();
        for f in &fields {
            if merged.get(&f.name).is_none_or(Value::is_null)
                && let Some(d) = def.defaults.get(&f.name)
            {
                merged.insert(f.name.clone(), d.clone());
            }
        }
        let mut resolved =
            resolve_section(section, fields, &Value::Object(merged), unknown, "parameters")?;
        if let Value::Object(values) = &mut resolved.values {
            for (key, d) in &def.defaults {
                if !values.contains_key(key) {
                    values.insert(key.clone(), d.clone());
                }
            }
        }
        Ok(resolved)
    }

    /// Validate appear-phase parameters (no defaults merge).
    pub fn resolve_appear(
        &self,
        scope: &str,
        widget_id: &str,
        raw: &Map<String, Value>,
        unknown: UnknownFields,
    ) -> StageResult<ResolvedParameters> {
        let def = self.get(scope, widget_id)?;
        self.resolve_phase(def.appear.as_ref(), scope, widget_id, raw, unknown, "appear")
    }

    /// Validate disappear-phase parameters (no defaults merge).
    pub fn resolve_disappear(
        &self,
        scope: &str,
        widget_id: &str,
        raw: &Map<String, Value>,
        unknown: UnknownFields,
    ) -> StageResult<ResolvedParameters> {
        let def = self.get(scope, widget_id)?;
        self.resolve_phase(def.disappear.as_ref(), scope, widget_id, raw, unknown, "disappear")
    }

    fn resolve_phase(
        &self,
        section: Option<&SchemaSection>,
        scope: &str,
        widget_id: &str,
        raw: &Map<String, Value>,
        unknown: UnknownFields,
        name: &str,
    ) -> StageResult<ResolvedParameters> {
        match section {
            Some(section) => {
                let fields = section.schema.describe_fields();
                resolve_section(section, fields, &Value::Object(raw.clone()), unknown, name)
            }
            None => {
                warn_dropped(scope, widget_id, name, raw);
                Ok(ResolvedParameters::empty())
            }
        }
    }

    /// Build a new widget element with validated parameters.
    ///
    /// Numeric geometry keys in the definition defaults (`x`, `y`, `width`, `height`,
    /// `rotation`, `scale`, `opacity`) seed the element geometry. Unknown parameter fields are
    /// rejected.
    pub fn instantiate(
        &self,
        scope: &str,
        widget_id: &str,
        parameters: Map<String, Value>,
    ) -> StageResult<Element> {
        let def = self.get(scope, widget_id)?;
        let resolved = self.resolve_parameters(scope, widget_id, &parameters, UnknownFields::Strict)?;
        let mut values = match resolved.values {
            Value::Object(m) => m,
            _ => Map::new(),
        };
        // undeclared defaults come back on every resolve; storing them would fail strict mode
        values.retain(|key, _| resolved.fields.iter().any(|f| &f.name == key));

        let mut props = WidgetProps::new(scope, widget_id);
        props.parameters = values;
        let mut element = Element::new(ElementKind::Widget(props));

        let mut geometry = *element.geometry();
        for key in GEOMETRY_KEYS {
            let Some(v) = def.defaults.get(key) else {
                continue;
            };
            let n = v.as_f64().ok_or_else(|| {
                StageError::validation_at(format!("$.defaults.{key}"), "expected a number")
            })?;
            match key {
                "x" => geometry.x = n,
                "y" => geometry.y = n,
                "width" => geometry.width = Some(n),
                "height" => geometry.height = Some(n),
                "rotation" => geometry.rotation = n,
                "scale" => geometry.scale = n,
                _ => geometry.opacity = n,
            }
        }
        element.set_geometry(geometry)?;
        element.validate()?;
        tracing::debug!(scope, widget_id, element = %element.id(), "widget instantiated");
        Ok(element)
    }

    /// Field configs and metadata of every declared section.
    pub fn inspector_metadata(&self, scope: &str, widget_id: &str) -> StageResult<InspectorMetadata> {
        let def = self.get(scope, widget_id)?;
        let meta = |s: &Option<SchemaSection>| {
            s.as_ref().map(|s| SectionMetadata {
                field_config: s.field_config.clone(),
                fields: s.schema.describe_fields(),
            })
        };
        Ok(InspectorMetadata {
            scope: def.scope.clone(),
            widget_id: def.name.clone(),
            parameters: meta(&def.parameters),
            appear: meta(&def.appear),
            disappear: meta(&def.disappear),
            defaults: def.defaults.clone(),
        })
    }
}

fn resolve_section(
    section: &SchemaSection,
    fields: Vec<FieldMeta>,
    raw: &Value,
    unknown: UnknownFields,
    name: &str,
) -> StageResult<ResolvedParameters> {
    let values = section
        .schema
        .validate(raw, unknown)
        .map_err(|e| rebase_path(e, name))?;
    Ok(ResolvedParameters {
        values,
        field_config: section.field_config.clone(),
        fields,
    })
}

/// Move a schema error rooted at `$` under `$.<section>`.
fn rebase_path(err: StageError, section: &str) -> StageError {
    match err {
        StageError::Validation { path, message } => {
            let rest = path.strip_prefix('$').unwrap_or(&path);
            StageError::Validation {
                path: format!("$.{section}{rest}"),
                message,
            }
        }
        other => other,
    }
}

fn warn_dropped(scope: &str, widget_id: &str, section: &str, raw: &Map<String, Value>) {
    if !raw.is_empty() {
        tracing::warn!(
            scope,
            widget_id,
            section,
            count = raw.len(),
            "widget declares no schema for section; values ignored"
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widget/registry.rs"]
mod tests;
