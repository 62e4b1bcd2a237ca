use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::annotations::{HttpRule, ENDPOINT_EXTENSION, HTTP_EXTENSION, METHOD_EXTENSION};
use crate::error::SchemaError;
use crate::model::Catalog;

/// Parse a schema catalog from a YAML/JSON string.
///
/// Known extensions are decoded here, once; everything downstream only
/// checks for their presence.
pub fn parse_catalog(input: &str) -> Result<Catalog, SchemaError> {
    // JSON is valid YAML
    let mut catalog: Catalog =
        serde_yaml::from_str(input).map_err(|e| SchemaError::Parse(e.to_string()))?;

    for file in &mut catalog.files {
        for service in &mut file.services {
            let target = qualify(&file.package, &service.name);
            service.endpoint = decode_extension(
                &service.options,
                ENDPOINT_EXTENSION,
                &target,
                "EndpointOptions",
            )?;

            for method in &mut service.methods {
                let target = format!("{}.{}", target, method.name);
                method.http =
                    decode_extension(&method.options, HTTP_EXTENSION, &target, "HttpRule")?;
                if let Some(rule) = &method.http {
                    reject_selector(rule, &target)?;
                }
                method.method_spec =
                    decode_extension(&method.options, METHOD_EXTENSION, &target, "MethodSpec")?;
            }
        }
    }

    Ok(catalog)
}

/// `selector` only means something in service configuration rules.
fn reject_selector(rule: &HttpRule, target: &str) -> Result<(), SchemaError> {
    let nested = rule.additional_bindings.iter().any(|b| !b.selector.is_empty());
    if rule.selector.is_empty() && !nested {
        return Ok(());
    }
    Err(SchemaError::ExtensionTypeMismatch {
        extension: HTTP_EXTENSION.to_string(),
        target: target.to_string(),
        expected: "HttpRule",
        reason: "selector is only allowed in service configuration".to_string(),
    })
}

/// Decode one extension payload, if present.
fn decode_extension<T: DeserializeOwned>(
    options: &BTreeMap<String, Value>,
    extension: &str,
    target: &str,
    expected: &'static str,
) -> Result<Option<T>, SchemaError> {
    let Some(value) = options.get(extension) else {
        return Ok(None);
    };
    serde_json::from_value(value.clone())
        .map(Some)
        .map_err(|e| SchemaError::ExtensionTypeMismatch {
            extension: extension.to_string(),
            target: target.to_string(),
            expected,
            reason: e.to_string(),
        })
}

fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        format!(".{}", name)
    } else {
        format!(".{}.{}", package, name)
    }
}
