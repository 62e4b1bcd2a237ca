//! Typed payloads of the method and service extensions understood by the catalog.

use serde::{Deserialize, Serialize};

/// Standard per-method HTTP annotation.
pub const HTTP_EXTENSION: &str = "google.api.http";

/// Service-level naming-convention extension (group/version/aliases).
pub const ENDPOINT_EXTENSION: &str = "ragnarok.endpoint";

/// Method-level companion of [`ENDPOINT_EXTENSION`].
pub const METHOD_EXTENSION: &str = "ragnarok.method";

/// An HTTP rule as written in annotations or service configuration files.
///
/// Exactly one of `get`, `put`, `post`, `delete`, `patch` or `custom` is
/// expected to be set. Rules may nest arbitrarily here; the compiler decides
/// how deep nesting may go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpRule {
    /// Fully-qualified method the rule applies to (service configuration only).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomHttpPattern>,
    /// Request field bound to the HTTP body (`*` for the whole request).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
    /// Response field serialized as the HTTP body.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub response_body: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_bindings: Vec<HttpRule>,
}

/// A verb outside the standard five.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomHttpPattern {
    pub kind: String,
    pub path: String,
}

/// Resource naming metadata attached to a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointOptions {
    #[serde(default)]
    pub gv: GroupVersion,
    /// Resource aliases; the first one is used in synthesized paths.
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// API group and version of a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupVersion {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
}

/// Per-method naming-convention spec.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodSpec {
    /// Logical operation name (`list`, `show`, `reboot`, ...).
    #[serde(default)]
    pub name: String,
    /// HTTP verb, matched case-insensitively.
    #[serde(default)]
    pub method: String,
    /// Whether the operation addresses the collection by UID.
    #[serde(default)]
    pub search: bool,
}
