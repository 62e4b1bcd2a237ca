use thiserror::Error;

/// Errors produced while parsing a path template (E3001–E3009).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// E3001: Template does not start with a slash.
    #[error("E3001: path template must start with '/': {0}")]
    MissingLeadingSlash(String),

    /// E3002: A segment is empty (`//` or trailing `/`).
    #[error("E3002: empty segment at offset {offset} in {template}")]
    EmptySegment { template: String, offset: usize },

    /// E3003: Unexpected character.
    #[error("E3003: unexpected character '{found}' at offset {offset} in {template}")]
    UnexpectedChar {
        template: String,
        offset: usize,
        found: char,
    },

    /// E3004: Template ended inside a variable.
    #[error("E3004: unterminated variable in {0}")]
    UnterminatedVariable(String),

    /// E3005: A variable contains another variable.
    #[error("E3005: nested variable at offset {offset} in {template}")]
    NestedVariable { template: String, offset: usize },

    /// E3006: Malformed field path inside a variable.
    #[error("E3006: invalid field path at offset {offset} in {template}")]
    InvalidFieldPath { template: String, offset: usize },

    /// E3007: `**` used before the last segment.
    #[error("E3007: '**' must be the last segment in {0}")]
    DeepWildcardNotLast(String),

    /// E3008: The same field path is captured twice.
    #[error("E3008: field path '{field}' captured more than once in {template}")]
    DuplicateVariable { template: String, field: String },

    /// E3009: Verb suffix is empty or malformed.
    #[error("E3009: invalid verb in {0}")]
    InvalidVerb(String),
}
