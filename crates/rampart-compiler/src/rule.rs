//! Validated HTTP rules.
//!
//! Raw [`HttpRule`] annotations allow any nesting and any combination of
//! pattern fields. Here they become a closed [`HttpPattern`] plus exactly two
//! levels: a [`PrimaryRule`] owning its [`AdditionalRule`]s.

use rampart_schema::HttpRule;

use crate::error::RuleError;

/// Verb and path template of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpPattern {
    Get(String),
    Put(String),
    Post(String),
    Delete(String),
    Patch(String),
    Custom { kind: String, path: String },
}

impl HttpPattern {
    /// Map a verb name (case-insensitive) onto a pattern. Unknown verbs
    /// become [`HttpPattern::Custom`] with the verb kept as written.
    pub fn from_verb(verb: &str, path: impl Into<String>) -> Self {
        let path = path.into();
        match verb.to_ascii_uppercase().as_str() {
            "GET" => HttpPattern::Get(path),
            "PUT" => HttpPattern::Put(path),
            "POST" => HttpPattern::Post(path),
            "DELETE" => HttpPattern::Delete(path),
            "PATCH" => HttpPattern::Patch(path),
            _ => HttpPattern::Custom {
                kind: verb.to_string(),
                path,
            },
        }
    }

    /// HTTP method string of the binding.
    pub fn verb(&self) -> &str {
        match self {
            HttpPattern::Get(_) => "GET",
            HttpPattern::Put(_) => "PUT",
            HttpPattern::Post(_) => "POST",
            HttpPattern::Delete(_) => "DELETE",
            HttpPattern::Patch(_) => "PATCH",
            HttpPattern::Custom { kind, .. } => kind,
        }
    }

    /// Raw path template.
    pub fn path(&self) -> &str {
        match self {
            HttpPattern::Get(path)
            | HttpPattern::Put(path)
            | HttpPattern::Post(path)
            | HttpPattern::Delete(path)
            | HttpPattern::Patch(path)
            | HttpPattern::Custom { path, .. } => path,
        }
    }
}

/// The part shared by primary and additional rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rule {
    /// `None` when the annotation sets no pattern; such a rule yields no binding.
    pub pattern: Option<HttpPattern>,
    /// Request body selector: `""` none, `"*"` whole request, else a field path.
    pub body: String,
    /// Response body selector: `""` or `"*"` none, else a field path.
    pub response_body: String,
}

impl Rule {
    pub fn new(pattern: HttpPattern) -> Self {
        Self {
            pattern: Some(pattern),
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_response_body(mut self, response_body: impl Into<String>) -> Self {
        self.response_body = response_body.into();
        self
    }

    fn from_annotation(rule: &HttpRule) -> Result<Self, RuleError> {
        Ok(Self {
            pattern: pattern_of(rule)?,
            body: rule.body.clone(),
            response_body: rule.response_body.clone(),
        })
    }
}

/// An extra URL for the same method. Cannot nest further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditionalRule(pub Rule);

/// A top-level rule together with its additional bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryRule {
    pub rule: Rule,
    pub additional_bindings: Vec<AdditionalRule>,
}

impl PrimaryRule {
    pub fn new(rule: Rule) -> Self {
        Self {
            rule,
            additional_bindings: Vec::new(),
        }
    }

    pub fn with_additional(mut self, rule: Rule) -> Self {
        self.additional_bindings.push(AdditionalRule(rule));
        self
    }

    /// Convert a raw annotation, rejecting additional bindings nested inside
    /// additional bindings.
    pub fn from_annotation(rule: &HttpRule) -> Result<Self, RuleError> {
        let additional_bindings = rule
            .additional_bindings
            .iter()
            .map(|additional| {
                if !additional.additional_bindings.is_empty() {
                    return Err(RuleError::NestedAdditionalBindings);
                }
                Rule::from_annotation(additional).map(AdditionalRule)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rule: Rule::from_annotation(rule)?,
            additional_bindings,
        })
    }

    /// The primary rule followed by its additional rules, in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        std::iter::once(&self.rule).chain(self.additional_bindings.iter().map(|a| &a.0))
    }
}

/// Pick the pattern of a raw rule. Empty strings count as unset.
fn pattern_of(rule: &HttpRule) -> Result<Option<HttpPattern>, RuleError> {
    let set = |value: &Option<String>| value.as_deref().filter(|p| !p.is_empty()).map(str::to_string);

    let mut patterns = Vec::new();
    if let Some(path) = set(&rule.get) {
        patterns.push(("get", HttpPattern::Get(path)));
    }
    if let Some(path) = set(&rule.put) {
        patterns.push(("put", HttpPattern::Put(path)));
    }
    if let Some(path) = set(&rule.post) {
        patterns.push(("post", HttpPattern::Post(path)));
    }
    if let Some(path) = set(&rule.delete) {
        patterns.push(("delete", HttpPattern::Delete(path)));
    }
    if let Some(path) = set(&rule.patch) {
        patterns.push(("patch", HttpPattern::Patch(path)));
    }
    if let Some(custom) = &rule.custom {
        patterns.push((
            "custom",
            HttpPattern::Custom {
                kind: custom.kind.clone(),
                path: custom.path.clone(),
            },
        ));
    }

    if patterns.len() > 1 {
        return Err(RuleError::ConflictingPatterns(
            patterns.iter().map(|(name, _)| *name).collect(),
        ));
    }
    Ok(patterns.pop().map(|(_, pattern)| pattern))
}
