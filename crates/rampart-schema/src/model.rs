use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::annotations::{EndpointOptions, HttpRule, MethodSpec};

/// A parsed schema catalog: one entry per source file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub files: Vec<FileDescriptor>,
}

impl Catalog {
    /// Append the files of another catalog.
    pub fn extend(&mut self, other: Catalog) {
        self.files.extend(other.files);
    }
}

/// A single schema file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// File name (e.g. "compute/v1/instances.proto").
    pub name: String,
    /// Dotted package name; empty for the root namespace.
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub messages: Vec<MessageDescriptor>,
    #[serde(default)]
    pub services: Vec<ServiceDescriptor>,
}

/// A message type, possibly with nested message types.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageDescriptor {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub nested: Vec<MessageDescriptor>,
}

/// A field of a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Referenced message or enum (required for `message`, `group` and `enum`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Explicit presence marker (`optional` keyword).
    #[serde(default)]
    pub optional: bool,
}

/// Field kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Bytes,
    Uint32,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
    Enum,
    Message,
    Group,
}

impl FieldKind {
    /// Message and group fields can be walked into by a field path.
    pub fn is_aggregate(self) -> bool {
        matches!(self, FieldKind::Message | FieldKind::Group)
    }

    /// Kinds that must name the type they refer to.
    pub fn requires_type_name(self) -> bool {
        matches!(self, FieldKind::Message | FieldKind::Group | FieldKind::Enum)
    }
}

/// A service and its methods.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
    /// Raw service options keyed by extension name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, serde_json::Value>,
    /// Decoded `ragnarok.endpoint` extension.
    #[serde(skip)]
    pub endpoint: Option<EndpointOptions>,
}

/// An RPC method.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    /// Request message type name, resolved relative to the file package.
    pub input_type: String,
    /// Response message type name, resolved relative to the file package.
    pub output_type: String,
    #[serde(default)]
    pub client_streaming: bool,
    #[serde(default)]
    pub server_streaming: bool,
    /// Raw method options keyed by extension name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, serde_json::Value>,
    /// Decoded `google.api.http` extension.
    #[serde(skip)]
    pub http: Option<HttpRule>,
    /// Decoded `ragnarok.method` extension.
    #[serde(skip)]
    pub method_spec: Option<MethodSpec>,
}
