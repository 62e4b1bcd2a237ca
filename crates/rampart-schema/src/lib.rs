//! Schema catalog for RPC services.
//!
//! Reads YAML/JSON catalogs describing files, messages, fields and services,
//! decodes the known method/service extensions (`google.api.http`,
//! `ragnarok.endpoint`, `ragnarok.method`) and indexes every message by its
//! fully-qualified name for lookup.

pub mod annotations;
pub mod error;
pub mod model;
pub mod parser;
pub mod registry;

pub use annotations::{
    CustomHttpPattern, EndpointOptions, GroupVersion, HttpRule, MethodSpec, ENDPOINT_EXTENSION,
    HTTP_EXTENSION, METHOD_EXTENSION,
};
pub use error::SchemaError;
pub use model::{
    Catalog, FieldDescriptor, FieldKind, FileDescriptor, MessageDescriptor, MethodDescriptor,
    ServiceDescriptor,
};
pub use parser::parse_catalog;
pub use registry::{is_well_known_type, Field, Message, SchemaRegistry, WELL_KNOWN_TYPES};
