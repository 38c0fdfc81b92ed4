/// Convenience result type used across stagekit.
pub type StageResult<T> = Result<T, StageError>;

/// Top-level error taxonomy used by authoring and resolution APIs.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    /// Bad property value/type or bad widget parameter.
    ///
    /// `path` points at the offending field (`$.parameters.title`); it is empty when the error is
    /// not tied to a single field.
    #[error("validation error: {}", fmt_path_message(.path, .message))]
    Validation {
        /// JSON-style path of the offending field.
        path: String,
        /// Human readable reason.
        message: String,
    },

    /// Animation time range with `end < start`.
    #[error("invalid range: end {end} is before start {start}")]
    InvalidRange {
        /// Range start in seconds.
        start: f64,
        /// Range end in seconds.
        end: f64,
    },

    /// Dangling element id.
    #[error("element not found: {0}")]
    NotFound(String),

    /// `(scope, widget_id)` did not resolve to a registered definition.
    #[error("widget not found: {scope}/{widget_id}")]
    WidgetNotFound {
        /// Widget scope (package namespace).
        scope: String,
        /// Widget name within the scope.
        widget_id: String,
    },

    /// `(scope, name)` is already registered.
    #[error("widget already registered: {scope}/{name}")]
    DuplicateWidget {
        /// Widget scope (package namespace).
        scope: String,
        /// Widget name within the scope.
        name: String,
    },

    /// The same animation instance was appended twice to one element.
    #[error("animation {animation_id} is already attached to element {element_id}")]
    DuplicateAnimation {
        /// Element the animation was appended to.
        element_id: String,
        /// Instance id of the animation.
        animation_id: String,
    },

    /// Element attached to a second owner, or an attach that would form a cycle.
    #[error("ownership error: {0}")]
    Ownership(String),

    /// Unknown animation `type`.
    #[error("unsupported animation type '{0}'")]
    UnsupportedAnimation(String),

    /// Errors when serializing or deserializing documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn fmt_path_message(path: &str, message: &str) -> String {
    if path.is_empty() {
        message.to_owned()
    } else {
        format!("{path}: {message}")
    }
}

impl StageError {
    /// Build a [`StageError::Validation`] value that is not tied to a field.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            path: String::new(),
            message: msg.into(),
        }
    }

    /// Build a [`StageError::Validation`] value for the field at `path`.
    pub fn validation_at(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Build a [`StageError::NotFound`] value.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    /// Build a [`StageError::Ownership`] value.
    pub fn ownership(msg: impl Into<String>) -> Self {
        Self::Ownership(msg.into())
    }

    /// Build a [`StageError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Field path of a validation error, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Validation { path, .. } if !path.is_empty() => Some(path.as_str()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for StageError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

/// Reject NaN and infinities for the numeric field `field`.
pub(crate) fn ensure_finite(field: &str, v: f64) -> StageResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(StageError::validation_at(
            format!("$.{field}"),
            format!("must be finite, got {v}"),
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
