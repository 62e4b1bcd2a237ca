//! Out-of-band HTTP rules from a service configuration file.
//!
//! The file follows the `google.api.Service` YAML layout; only the `http`
//! section is read:
//!
//! ```yaml
//! type: google.api.Service
//! config_version: 3
//! http:
//!   rules:
//!     - selector: compute.v1.InstanceService.Reboot
//!       post: /v1/instances/{uid}:reboot
//!       body: "*"
//! ```

use std::collections::HashMap;

use serde::Deserialize;

use rampart_schema::HttpRule;

use crate::error::CompileError;
use crate::rule::PrimaryRule;

/// Service configuration document. Keys other than `http` are accepted and ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ServiceConfig {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub config_version: Option<u32>,
    #[serde(default)]
    pub http: HttpSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct HttpSection {
    #[serde(default)]
    pub rules: Vec<HttpRule>,
}

/// Override rules keyed by fully-qualified method name.
///
/// Populated completely before compilation starts and read-only afterwards.
#[derive(Debug, Default, Clone)]
pub struct OverrideTable {
    rules: HashMap<String, Vec<PrimaryRule>>,
    /// Selectors in first-registration order.
    order: Vec<String>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule for `selector`. A missing leading dot is added.
    pub fn add(&mut self, selector: &str, rule: PrimaryRule) {
        let key = if selector.starts_with('.') {
            selector.to_string()
        } else {
            format!(".{}", selector)
        };
        if !self.rules.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.rules.entry(key).or_default().push(rule);
    }

    /// Append every rule of `other`, after the rules already present.
    pub fn extend(&mut self, other: OverrideTable) {
        let OverrideTable { mut rules, order } = other;
        for selector in order {
            for rule in rules.remove(&selector).unwrap_or_default() {
                self.add(&selector, rule);
            }
        }
    }

    /// Rules registered for `fqmn`, in registration order.
    pub fn lookup(&self, fqmn: &str) -> &[PrimaryRule] {
        self.rules.get(fqmn).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every selector with at least one rule.
    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Total number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Build a table from a parsed service configuration.
    pub fn from_service_config(config: &ServiceConfig) -> Result<Self, CompileError> {
        let mut table = Self::new();
        for (i, raw) in config.http.rules.iter().enumerate() {
            if raw.selector.is_empty() {
                return Err(CompileError::MissingSelector(i));
            }
            let rule =
                PrimaryRule::from_annotation(raw).map_err(|source| CompileError::InvalidRule {
                    location: raw.selector.clone(),
                    source,
                })?;
            table.add(&raw.selector, rule);
        }
        tracing::debug!(
            selectors = table.order.len(),
            rules = table.len(),
            "override rules loaded"
        );
        Ok(table)
    }

    /// Parse a service configuration from YAML.
    pub fn from_yaml(input: &str) -> Result<Self, CompileError> {
        let config: ServiceConfig = serde_yaml::from_str(input)
            .map_err(|e| CompileError::Manifest(format!("invalid service configuration: {}", e)))?;
        Self::from_service_config(&config)
    }
}
