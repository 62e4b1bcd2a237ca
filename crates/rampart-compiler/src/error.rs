use serde::{Deserialize, Serialize};
use thiserror::Error;

use rampart_httprule::TemplateError;
use rampart_schema::SchemaError;

/// Errors produced while compiling bindings.
///
/// Every variant that concerns a method carries its fully-qualified name.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Catalog loading or message lookup failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// E2004: A method's request or response type is not in the catalog.
    #[error("E2004: {method}: unresolved {role} type '{name}'")]
    UnresolvedMessageType {
        method: String,
        role: &'static str,
        name: String,
        #[source]
        source: SchemaError,
    },

    /// E4001: A binding's path template does not parse.
    #[error("E4001: {method}: invalid path template '{template}': {source}")]
    InvalidPathTemplate {
        method: String,
        template: String,
        #[source]
        source: TemplateError,
    },

    /// E4002: A path parameter, body or response body selector does not resolve.
    #[error("E4002: {method}: {source}")]
    InvalidFieldPath {
        method: String,
        #[source]
        source: FieldPathError,
    },

    /// E4003: GET rule with a body selector.
    #[error("E4003: must not set request body when http method is GET: {0}")]
    GetWithBody(String),

    /// E4004: DELETE rule with a body selector while not allowed.
    #[error(
        "E4004: must not set request body when http method is DELETE except allow_delete_body option is true: {0}"
    )]
    DeleteWithBody(String),

    /// E4005: Path parameters on a client-streaming method.
    #[error("E4005: cannot use path parameter in client streaming: {method} ({template})")]
    StreamingPathParam { method: String, template: String },

    /// E4006: Structurally invalid HTTP rule.
    #[error("E4006: {location}: {source}")]
    InvalidRule {
        location: String,
        #[source]
        source: RuleError,
    },

    /// E4007: A path parameter targets a message that is not a well-known wrapper.
    #[error(
        "E4007: {method}: {path} is a message type. Message types cannot be used as path parameters, use a scalar value type (such as string) instead"
    )]
    MessagePathParam { method: String, path: String },

    /// E4008: A path parameter resolved to no field at all.
    #[error("E4008: {method}: invalid field access list for {path}")]
    EmptyFieldPath { method: String, path: String },

    /// E4009: Naming-convention method spec without a verb.
    #[error("E4009: ragnarok.MethodSpec is missing .method on method {method}")]
    MissingNamingVerb { method: String },

    /// E4010: Naming-convention endpoint without any alias.
    #[error("E4010: ragnarok.EndpointOptions has no aliases on service {service}, needed by method {method}")]
    MissingNamingAlias { service: String, method: String },

    /// E4011: Two methods registered under the same name in one run.
    #[error("E4011: duplicate method: {0}")]
    DuplicateMethod(String),

    /// E4012: Override rule without a selector.
    #[error("E4012: http rule #{0} in service configuration has no selector")]
    MissingSelector(usize),

    /// Manifest or service configuration parsing error.
    #[error("manifest error: {0}")]
    Manifest(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CompileError {
    /// Stable diagnostic code, e.g. `E4003`.
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::Schema(e) => match e {
                SchemaError::Parse(_) => "E2001",
                SchemaError::DuplicateMessage(_) => "E2002",
                SchemaError::MissingTypeName { .. } => "E2003",
                SchemaError::MessageNotFound { .. } => "E2004",
                SchemaError::ExtensionTypeMismatch { .. } => "E2005",
                SchemaError::DuplicateFile(_) => "E2006",
            },
            CompileError::UnresolvedMessageType { .. } => "E2004",
            CompileError::InvalidPathTemplate { .. } => "E4001",
            CompileError::InvalidFieldPath { .. } => "E4002",
            CompileError::GetWithBody(_) => "E4003",
            CompileError::DeleteWithBody(_) => "E4004",
            CompileError::StreamingPathParam { .. } => "E4005",
            CompileError::InvalidRule { .. } => "E4006",
            CompileError::MessagePathParam { .. } => "E4007",
            CompileError::EmptyFieldPath { .. } => "E4008",
            CompileError::MissingNamingVerb { .. } => "E4009",
            CompileError::MissingNamingAlias { .. } => "E4010",
            CompileError::DuplicateMethod(_) => "E4011",
            CompileError::MissingSelector(_) => "E4012",
            CompileError::Manifest(_) => "E4013",
            CompileError::Io(_) => "E1000",
            CompileError::Json(_) => "E1001",
        }
    }
}

/// Field path resolution failures.
#[derive(Debug, Error)]
pub enum FieldPathError {
    /// A segment names no field of the message it is looked up in.
    #[error("no field \"{path}\" found in {root}")]
    NotFound { path: String, root: String },

    /// A non-terminal segment is a scalar.
    #[error("not an aggregate type: {field} in {path}")]
    NotAggregate { field: String, path: String },

    /// An optional field takes part in a path parameter.
    #[error("optional field not allowed in field path: {field} in {path}")]
    OptionalField { field: String, path: String },

    /// The message type of an intermediate field is unknown.
    #[error(transparent)]
    Lookup(#[from] SchemaError),
}

/// Structural problems of a single HTTP rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// An additional binding carries its own additional bindings.
    #[error("additional_binding in additional_binding not allowed")]
    NestedAdditionalBindings,

    /// More than one of get/put/post/delete/patch/custom is set.
    #[error("http rule sets more than one pattern: {}", .0.join(", "))]
    ConflictingPatterns(Vec<&'static str>),
}

/// A non-fatal issue found during compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileWarning {
    /// Warning code (e.g. "E4100").
    pub code: String,
    pub message: String,
    /// Method, selector or file the warning refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}
