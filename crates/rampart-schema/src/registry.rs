//! Fully-qualified message index over a loaded catalog.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::SchemaError;
use crate::model::{Catalog, FieldDescriptor, FieldKind, FileDescriptor, MessageDescriptor};

/// Messages wrapping a single scalar value; these may be bound like scalars.
pub const WELL_KNOWN_TYPES: &[&str] = &[
    ".google.protobuf.Timestamp",
    ".google.protobuf.Duration",
    ".google.protobuf.DoubleValue",
    ".google.protobuf.FloatValue",
    ".google.protobuf.Int64Value",
    ".google.protobuf.UInt64Value",
    ".google.protobuf.Int32Value",
    ".google.protobuf.UInt32Value",
    ".google.protobuf.BoolValue",
    ".google.protobuf.StringValue",
    ".google.protobuf.BytesValue",
];

/// Whether `type_name` is a recognized single-scalar wrapper type.
pub fn is_well_known_type(type_name: &str) -> bool {
    WELL_KNOWN_TYPES.contains(&type_name)
}

/// A loaded message type.
#[derive(Debug)]
pub struct Message {
    fqmn: String,
    name: String,
    fields: Vec<Arc<Field>>,
}

impl Message {
    /// Fully-qualified name, e.g. `.compute.v1.Instance.Status`.
    pub fn fqmn(&self) -> &str {
        &self.fqmn
    }

    /// Short name as declared.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Arc<Field>] {
        &self.fields
    }

    /// Look up a field by exact name.
    pub fn field(&self, name: &str) -> Option<&Arc<Field>> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A loaded message field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    kind: FieldKind,
    type_name: Option<String>,
    optional: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            type_name: None,
            optional: false,
        }
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Referenced message or enum type, if any.
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_aggregate(&self) -> bool {
        self.kind.is_aggregate()
    }
}

impl From<&FieldDescriptor> for Field {
    fn from(desc: &FieldDescriptor) -> Self {
        Self {
            name: desc.name.clone(),
            kind: desc.kind,
            type_name: desc.type_name.clone(),
            optional: desc.optional,
        }
    }
}

/// Read-only view of every message in a catalog, keyed by fully-qualified name.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    files: Vec<FileDescriptor>,
    messages: HashMap<String, Arc<Message>>,
}

impl SchemaRegistry {
    /// Index all messages of `catalog`, nested ones included.
    pub fn new(catalog: Catalog) -> Result<Self, SchemaError> {
        let mut messages = HashMap::new();
        let mut file_names = HashSet::new();

        for file in &catalog.files {
            if !file_names.insert(file.name.as_str()) {
                return Err(SchemaError::DuplicateFile(file.name.clone()));
            }
            let scope = if file.package.is_empty() {
                String::new()
            } else {
                format!(".{}", file.package)
            };
            for msg in &file.messages {
                register_message(&mut messages, &scope, msg)?;
            }
        }

        tracing::debug!(
            files = catalog.files.len(),
            messages = messages.len(),
            "schema registry loaded"
        );

        Ok(Self {
            files: catalog.files,
            messages,
        })
    }

    /// Files in catalog order.
    pub fn files(&self) -> &[FileDescriptor] {
        &self.files
    }

    /// Look up a file by name.
    pub fn file(&self, name: &str) -> Option<&FileDescriptor> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Look up a message by its exact fully-qualified name.
    pub fn message(&self, fqmn: &str) -> Option<&Arc<Message>> {
        self.messages.get(fqmn)
    }

    /// Number of indexed messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Resolve `name` as seen from `location`.
    ///
    /// A name with a leading dot is absolute. Otherwise it is tried in
    /// `location`, then in each enclosing scope up to the root namespace.
    pub fn lookup_msg(&self, location: &str, name: &str) -> Result<Arc<Message>, SchemaError> {
        if name.starts_with('.') {
            return self
                .messages
                .get(name)
                .cloned()
                .ok_or_else(|| SchemaError::MessageNotFound {
                    name: name.to_string(),
                    location: location.to_string(),
                });
        }

        let location = location.trim_start_matches('.');
        let mut components: Vec<&str> = if location.is_empty() {
            Vec::new()
        } else {
            location.split('.').collect()
        };

        loop {
            let candidate = if components.is_empty() {
                format!(".{}", name)
            } else {
                format!(".{}.{}", components.join("."), name)
            };
            if let Some(msg) = self.messages.get(&candidate) {
                return Ok(Arc::clone(msg));
            }
            if components.pop().is_none() {
                break;
            }
        }

        Err(SchemaError::MessageNotFound {
            name: name.to_string(),
            location: location.to_string(),
        })
    }
}

fn register_message(
    messages: &mut HashMap<String, Arc<Message>>,
    scope: &str,
    desc: &MessageDescriptor,
) -> Result<(), SchemaError> {
    let fqmn = format!("{}.{}", scope, desc.name);

    for field in &desc.fields {
        if field.kind.requires_type_name()
            && field.type_name.as_deref().map_or(true, str::is_empty)
        {
            return Err(SchemaError::MissingTypeName {
                field: field.name.clone(),
                message: fqmn,
            });
        }
    }

    let message = Message {
        fqmn: fqmn.clone(),
        name: desc.name.clone(),
        fields: desc.fields.iter().map(|f| Arc::new(Field::from(f))).collect(),
    };
    if messages.insert(fqmn.clone(), Arc::new(message)).is_some() {
        return Err(SchemaError::DuplicateMessage(fqmn));
    }

    for nested in &desc.nested {
        register_message(messages, &fqmn, nested)?;
    }
    Ok(())
}
