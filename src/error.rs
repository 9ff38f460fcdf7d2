//! Error types and JSON error reports.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Placement error for a type-level `@auth` without `@model`.
pub const AUTH_REQUIRES_MODEL: &str = "Types annotated with @auth must also be annotated with @model.";

/// Placement error for `operations` on fields of a type without `@model`.
pub const OPERATIONS_ON_NON_MODEL_FIELD: &str = "@auth rules on fields within types that does not have @model directive cannot specify 'operations' argument as there are operations will be generated by the CLI.";

/// Placement error for `operations` on fields of a root operation type.
pub const OPERATIONS_ON_ROOT_FIELD: &str = "@auth rules on fields within Query, Mutation, Subscription cannot specify 'operations' argument as these rules are already on an operation already.";

/// Placement error for `@auth` on interface fields, input fields or enum values.
pub const AUTH_ON_NON_OBJECT_MEMBER: &str =
    "@auth directives are only supported on object types and their fields.";

/// Transformer error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Directive placed or combined illegally
    InvalidDirective,
    /// Directive appears more than once on a node
    DuplicateDirective,
    /// Required directive argument is absent
    MissingArgument,
    /// Directive argument has the wrong shape or value
    InvalidArgument,
    /// Rule names a provider the API does not configure
    UnknownProvider,
    /// Schema text could not be parsed
    ParseError,
    /// Transformer configuration is invalid
    ConfigError,
    /// Generated resource collides with an existing template entry
    ResourceConflict,
    /// File or serialization failure in the outer layer
    IoError,
}

impl ErrorCode {
    /// Get the code as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidDirective => "INVALID_DIRECTIVE",
            Self::DuplicateDirective => "DUPLICATE_DIRECTIVE",
            Self::MissingArgument => "MISSING_ARGUMENT",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::UnknownProvider => "UNKNOWN_PROVIDER",
            Self::ParseError => "PARSE_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::ResourceConflict => "RESOURCE_CONFLICT",
            Self::IoError => "IO_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that abort a transformation run.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// Message text is part of the contract; callers match on it.
    #[error("{0}")]
    InvalidDirective(String),

    #[error("duplicate @{directive} directive on '{node}'")]
    DuplicateDirective { directive: String, node: String },

    #[error("@{directive} directive on '{node}' is missing required argument '{argument}'")]
    MissingArgument {
        directive: String,
        argument: String,
        node: String,
    },

    #[error("invalid '{argument}' argument on '{node}': {message}")]
    InvalidArgument {
        argument: String,
        node: String,
        message: String,
    },

    #[error("@auth directive with '{provider}' provider found, but the project has no {provider_name} authentication provider configured.")]
    UnknownProvider {
        provider: String,
        provider_name: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Resource '{0}' already exists in the template")]
    ResourceConflict(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TransformError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidDirective(_) => ErrorCode::InvalidDirective,
            Self::DuplicateDirective { .. } => ErrorCode::DuplicateDirective,
            Self::MissingArgument { .. } => ErrorCode::MissingArgument,
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::UnknownProvider { .. } => ErrorCode::UnknownProvider,
            Self::Parse(_) => ErrorCode::ParseError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::ResourceConflict(_) => ErrorCode::ResourceConflict,
            Self::Io(_) | Self::Yaml(_) | Self::Json(_) => ErrorCode::IoError,
        }
    }

    pub(crate) fn invalid_argument(
        argument: &str,
        node: &str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            argument: argument.to_string(),
            node: node.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T, E = TransformError> = std::result::Result<T, E>;

/// Build a JSON error report for a failed run.
///
/// The shape follows GraphQL error objects so tooling that already reads
/// `errors[].extensions.code` can consume it unchanged.
pub fn error_report(error: &TransformError) -> Value {
    let mut report = json!({
        "message": error.to_string(),
        "extensions": {
            "code": error.code().as_str(),
        }
    });

    match error {
        TransformError::DuplicateDirective { directive, node } => {
            report["extensions"]["directive"] = json!(directive);
            report["extensions"]["node"] = json!(node);
        }
        TransformError::MissingArgument { argument, node, .. }
        | TransformError::InvalidArgument { argument, node, .. } => {
            report["extensions"]["argument"] = json!(argument);
            report["extensions"]["node"] = json!(node);
        }
        TransformError::UnknownProvider { provider, .. } => {
            report["extensions"]["provider"] = json!(provider);
        }
        _ => {}
    }

    json!({ "errors": [report] })
}
