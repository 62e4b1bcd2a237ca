//! Dotted field path resolution against the message graph.

use std::sync::Arc;

use rampart_schema::{Message, SchemaRegistry};

use crate::error::FieldPathError;
use crate::model::{FieldPath, FieldPathComponent};

/// Resolve `path` (e.g. `metadata.uid`) starting at `root`.
///
/// An empty path resolves to an empty [`FieldPath`]. Every segment but the
/// last must be a message or group field; with `is_path_param`, no segment
/// may be an optional field.
pub fn resolve_field_path(
    registry: &SchemaRegistry,
    root: &Arc<Message>,
    path: &str,
    is_path_param: bool,
) -> Result<FieldPath, FieldPathError> {
    if path.is_empty() {
        return Ok(FieldPath::default());
    }

    let mut msg = Arc::clone(root);
    let mut components: Vec<FieldPathComponent> = Vec::new();
    for segment in path.split('.') {
        if let Some(prev) = components.last() {
            let prev = &prev.target;
            match prev.type_name() {
                Some(type_name) if prev.is_aggregate() => {
                    msg = registry.lookup_msg(msg.fqmn(), type_name)?;
                }
                _ => {
                    return Err(FieldPathError::NotAggregate {
                        field: prev.name().to_string(),
                        path: path.to_string(),
                    })
                }
            }
        }

        tracing::trace!(segment, scope = msg.fqmn(), "field lookup");
        let field = msg
            .field(segment)
            .ok_or_else(|| FieldPathError::NotFound {
                path: path.to_string(),
                root: root.fqmn().to_string(),
            })?;
        if is_path_param && field.is_optional() {
            return Err(FieldPathError::OptionalField {
                field: field.name().to_string(),
                path: path.to_string(),
            });
        }
        components.push(FieldPathComponent {
            name: segment.to_string(),
            owner: msg.fqmn().to_string(),
            target: Arc::clone(field),
        });
    }
    Ok(FieldPath::new(components))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::registry;

    fn root(reg: &SchemaRegistry, name: &str) -> Arc<Message> {
        Arc::clone(reg.message(name).unwrap())
    }

    #[test]
    fn empty_path_is_whole_message() {
        let reg = registry();
        let path = resolve_field_path(&reg, &root(&reg, ".compute.v1.Instance"), "", true).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn resolves_nested_path() {
        let reg = registry();
        let path =
            resolve_field_path(&reg, &root(&reg, ".compute.v1.Instance"), "metadata.uid", true)
                .unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path.components()[0].name, "metadata");
        assert!(path.components()[0].target.is_aggregate());
        assert_eq!(path.target().unwrap().name(), "uid");
        assert_eq!(path.to_string(), "metadata.uid");
    }

    #[test]
    fn resolves_relative_type_names_from_current_message() {
        let reg = registry();
        // Instance.metadata -> Metadata (package scope), Metadata.labels -> Metadata.Labels (nested scope)
        let path = resolve_field_path(
            &reg,
            &root(&reg, ".compute.v1.Instance"),
            "metadata.labels.env",
            false,
        )
        .unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.target().unwrap().name(), "env");
        let owners: Vec<_> = path.components().iter().map(|c| c.owner.as_str()).collect();
        assert_eq!(
            owners,
            vec![
                ".compute.v1.Instance",
                ".compute.v1.Metadata",
                ".compute.v1.Metadata.Labels"
            ]
        );
    }

    #[test]
    fn resolution_is_idempotent() {
        let reg = registry();
        let instance = root(&reg, ".compute.v1.Instance");
        let first = resolve_field_path(&reg, &instance, "metadata.uid", true).unwrap();
        let second = resolve_field_path(&reg, &instance, "metadata.uid", true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_field_names_path_and_root() {
        let reg = registry();
        let err = resolve_field_path(&reg, &root(&reg, ".compute.v1.Instance"), "metadata.nope", false)
            .unwrap_err();
        assert!(matches!(err, FieldPathError::NotFound { .. }));
        let message = err.to_string();
        assert!(message.contains("metadata.nope"));
        assert!(message.contains(".compute.v1.Instance"));
    }

    #[test]
    fn scalar_cannot_be_walked_into() {
        let reg = registry();
        let err = resolve_field_path(&reg, &root(&reg, ".compute.v1.Instance"), "uid.value", false)
            .unwrap_err();
        match err {
            FieldPathError::NotAggregate { field, path } => {
                assert_eq!(field, "uid");
                assert_eq!(path, "uid.value");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn enum_is_not_aggregate() {
        let reg = registry();
        let err = resolve_field_path(&reg, &root(&reg, ".compute.v1.Instance"), "state.name", false)
            .unwrap_err();
        assert!(matches!(err, FieldPathError::NotAggregate { .. }));
    }

    #[test]
    fn optional_field_rejected_only_for_path_params() {
        let reg = registry();
        let instance = root(&reg, ".compute.v1.Instance");

        let err = resolve_field_path(&reg, &instance, "note", true).unwrap_err();
        assert!(matches!(err, FieldPathError::OptionalField { ref field, .. } if field == "note"));
        assert!(resolve_field_path(&reg, &instance, "note", false).is_ok());

        // optional intermediate segment
        let err = resolve_field_path(&reg, &instance, "spec.size", true).unwrap_err();
        assert!(matches!(err, FieldPathError::OptionalField { ref field, .. } if field == "spec"));
        assert!(resolve_field_path(&reg, &instance, "spec.size", false).is_ok());
    }

    #[test]
    fn unknown_intermediate_type_is_lookup_error() {
        let reg = registry();
        let err = resolve_field_path(&reg, &root(&reg, ".compute.v1.Broken"), "dangling.x", false)
            .unwrap_err();
        assert!(matches!(err, FieldPathError::Lookup(_)));
    }
}
