//! Shared schema fixtures for unit tests.

use rampart_schema::{parse_catalog, FileDescriptor, SchemaRegistry};

pub const TYPES: &str = r#"
files:
  - name: compute/v1/types.proto
    package: compute.v1
    messages:
      - name: Instance
        fields:
          - { name: uid, type: string }
          - { name: UID, type: string }
          - { name: metadata, type: message, type_name: .compute.v1.Metadata }
          - { name: note, type: string, optional: true }
          - { name: spec, type: message, type_name: Spec, optional: true }
          - { name: state, type: enum, type_name: State }
          - { name: owner, type: message, type_name: Metadata }
          - { name: created, type: message, type_name: .google.protobuf.Timestamp }
          - { name: display_name, type: message, type_name: .google.protobuf.StringValue }
      - name: Metadata
        fields:
          - { name: uid, type: string }
          - { name: labels, type: message, type_name: Labels }
        nested:
          - name: Labels
            fields:
              - { name: env, type: string }
      - name: Spec
        fields:
          - { name: size, type: int32 }
      - name: Chunk
        fields:
          - { name: name, type: string }
          - { name: data, type: bytes }
      - name: Empty
      - name: Broken
        fields:
          - { name: dangling, type: message, type_name: Missing }
  - name: google/protobuf/wrappers.proto
    package: google.protobuf
    messages:
      - name: Timestamp
        fields:
          - { name: seconds, type: int64 }
          - { name: nanos, type: int32 }
      - name: StringValue
        fields:
          - { name: value, type: string }
"#;

/// Registry over [`TYPES`].
pub fn registry() -> SchemaRegistry {
    SchemaRegistry::new(parse_catalog(TYPES).expect("fixture parses")).expect("fixture indexes")
}

/// First file of a catalog snippet, with extensions decoded.
pub fn file(yaml: &str) -> FileDescriptor {
    parse_catalog(yaml)
        .expect("fixture parses")
        .files
        .into_iter()
        .next()
        .expect("fixture has a file")
}

/// Registry over [`TYPES`] plus the files of `yaml`.
pub fn registry_with(yaml: &str) -> SchemaRegistry {
    let mut catalog = parse_catalog(TYPES).expect("fixture parses");
    catalog.extend(parse_catalog(yaml).expect("fixture parses"));
    SchemaRegistry::new(catalog).expect("fixture indexes")
}
