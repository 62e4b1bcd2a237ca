use thiserror::Error;

/// Errors produced while loading or querying the schema catalog (E2001–E2006).
#[derive(Debug, Error)]
pub enum SchemaError {
    /// E2001: YAML/JSON parse error.
    #[error("E2001: catalog parse error: {0}")]
    Parse(String),

    /// E2002: Two messages share the same fully-qualified name.
    #[error("E2002: duplicate message: {0}")]
    DuplicateMessage(String),

    /// E2003: An aggregate or enum field does not name its type.
    #[error("E2003: field '{field}' in {message} is missing type_name")]
    MissingTypeName { field: String, message: String },

    /// E2004: A referenced message cannot be found.
    #[error("E2004: no message found: {name} (looked up from '{location}')")]
    MessageNotFound { name: String, location: String },

    /// E2005: An extension is present but its payload has the wrong shape.
    #[error("E2005: extension {extension} on {target} is not a valid {expected}: {reason}")]
    ExtensionTypeMismatch {
        extension: String,
        target: String,
        expected: &'static str,
        reason: String,
    },

    /// E2006: Two catalog entries share the same file name.
    #[error("E2006: duplicate file: {0}")]
    DuplicateFile(String),
}
