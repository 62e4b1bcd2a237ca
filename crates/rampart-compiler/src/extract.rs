//! HTTP rule discovery for a single method.
//!
//! Rules come from three places, in this order:
//! 1. the method itself: a `ragnarok.method` spec under a `ragnarok.endpoint`
//!    service is turned into a synthesized rule, otherwise a literal
//!    `google.api.http` annotation is used;
//! 2. the override table;
//! 3. a `POST /<service>/<method>` fallback, only when nothing else matched
//!    and unbound methods are to be exposed.

use rampart_schema::{EndpointOptions, MethodDescriptor, MethodSpec, ServiceDescriptor};

use crate::error::CompileError;
use crate::options::CompileOptions;
use crate::overrides::OverrideTable;
use crate::rule::{HttpPattern, PrimaryRule, Rule};

/// Collect the rules of `method` in discovery order.
///
/// `fqsn` is the fully-qualified name of `service`.
pub fn extract_rules(
    overrides: &OverrideTable,
    options: &CompileOptions,
    service: &ServiceDescriptor,
    fqsn: &str,
    method: &MethodDescriptor,
) -> Result<Vec<PrimaryRule>, CompileError> {
    let fqmn = format!("{}.{}", fqsn, method.name);
    let mut rules = Vec::new();

    match (&service.endpoint, &method.method_spec) {
        (Some(endpoint), Some(spec)) => {
            if let Some(rule) = synthesize_rule(endpoint, spec, fqsn, &fqmn)? {
                rules.push(rule);
            }
        }
        _ => {
            if let Some(http) = &method.http {
                let rule = PrimaryRule::from_annotation(http).map_err(|source| {
                    CompileError::InvalidRule {
                        location: fqmn.clone(),
                        source,
                    }
                })?;
                rules.push(rule);
            }
        }
    }

    rules.extend(overrides.lookup(&fqmn).iter().cloned());

    if rules.is_empty() {
        if options.generate_unbound_methods {
            rules.push(default_rule(fqsn, &method.name));
        } else if options.warn_on_unbound_methods {
            tracing::warn!(method = %fqmn, "no HttpRule found for method");
        } else {
            tracing::info!(method = %fqmn, "no HttpRule found for method");
        }
    }

    tracing::trace!(method = %fqmn, rules = rules.len(), "rules extracted");
    Ok(rules)
}

/// Build the naming-convention rule for a method.
///
/// Returns `None` when the spec has no logical name; that method is then
/// only reachable through overrides or the fallback.
pub fn synthesize_rule(
    endpoint: &EndpointOptions,
    spec: &MethodSpec,
    fqsn: &str,
    fqmn: &str,
) -> Result<Option<PrimaryRule>, CompileError> {
    if spec.name.is_empty() {
        tracing::warn!(
            method = %fqmn,
            "ragnarok.MethodSpec is missing .name, generation is partially skipped"
        );
        return Ok(None);
    }
    if spec.method.is_empty() {
        return Err(CompileError::MissingNamingVerb {
            method: fqmn.to_string(),
        });
    }
    let alias = endpoint
        .aliases
        .first()
        .ok_or_else(|| CompileError::MissingNamingAlias {
            service: fqsn.to_string(),
            method: fqmn.to_string(),
        })?;

    let mut path = format!("/{}/{}/{}", endpoint.gv.group, endpoint.gv.version, alias);
    let name = spec.name.to_lowercase();
    if spec.search {
        match name.as_str() {
            "list" => {}
            "show" | "delete" => path.push_str("/{UID}"),
            _ => {
                path.push_str("/{UID}/");
                path.push_str(&name);
            }
        }
    } else {
        path.push_str("/{metadata.uid}/");
        path.push_str(&name);
    }

    tracing::debug!(method = %fqmn, verb = %spec.method, path = %path, "synthesized rule");
    Ok(Some(PrimaryRule::new(Rule::new(HttpPattern::from_verb(
        &spec.method,
        path,
    )))))
}

/// `POST /<fqsn without leading dot>/<method>` with the whole request as body.
pub fn default_rule(fqsn: &str, method: &str) -> PrimaryRule {
    let path = format!("/{}/{}", fqsn.trim_start_matches('.'), method);
    PrimaryRule::new(Rule::new(HttpPattern::Post(path)).with_body("*"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleError;
    use crate::testing::file;
    use rampart_schema::GroupVersion;

    const FILE: &str = r#"
files:
  - name: compute/v1/instances.proto
    package: compute.v1
    services:
      - name: InstanceService
        options:
          ragnarok.endpoint:
            gv: { group: compute, version: v1 }
            aliases: [instances, vms]
        methods:
          - name: Show
            input_type: Instance
            output_type: Instance
            options:
              ragnarok.method: { name: Show, method: get, search: true }
              google.api.http: { get: "/ignored/{uid}" }
          - name: Nameless
            input_type: Instance
            output_type: Instance
            options:
              ragnarok.method: { method: GET }
              google.api.http: { get: "/ignored/{uid}" }
          - name: Annotated
            input_type: Instance
            output_type: Instance
            options:
              google.api.http: { get: "/v1/annotated/{uid}" }
          - name: Bare
            input_type: Instance
            output_type: Instance
      - name: PlainService
        methods:
          - name: Get
            input_type: Instance
            output_type: Instance
            options:
              google.api.http:
                get: /v1/plain/{uid}
                additional_bindings:
                  - get: /v1/plain/{uid}/again
          - name: Broken
            input_type: Instance
            output_type: Instance
            options:
              google.api.http:
                get: /v1/x
                additional_bindings:
                  - get: /v2/x
                    additional_bindings: [{ get: /v3/x }]
"#;

    const INSTANCES: &str = ".compute.v1.InstanceService";
    const PLAIN: &str = ".compute.v1.PlainService";

    fn endpoint() -> EndpointOptions {
        EndpointOptions {
            gv: GroupVersion {
                group: "compute".into(),
                version: "v1".into(),
            },
            aliases: vec!["instances".into()],
        }
    }

    fn spec(name: &str, verb: &str, search: bool) -> MethodSpec {
        MethodSpec {
            name: name.into(),
            method: verb.into(),
            search,
        }
    }

    fn synthesized(name: &str, verb: &str, search: bool) -> HttpPattern {
        synthesize_rule(&endpoint(), &spec(name, verb, search), INSTANCES, "m")
            .unwrap()
            .unwrap()
            .rule
            .pattern
            .unwrap()
    }

    fn extract(
        overrides: &OverrideTable,
        options: &CompileOptions,
        service: usize,
        method: &str,
    ) -> Result<Vec<PrimaryRule>, CompileError> {
        let file = file(FILE);
        let service = &file.services[service];
        let fqsn = format!(".compute.v1.{}", service.name);
        let method = service.methods.iter().find(|m| m.name == method).unwrap();
        extract_rules(overrides, options, service, &fqsn, method)
    }

    #[test]
    fn search_show_appends_uid() {
        assert_eq!(
            synthesized("show", "GET", true),
            HttpPattern::Get("/compute/v1/instances/{UID}".into())
        );
        assert_eq!(
            synthesized("Delete", "delete", true),
            HttpPattern::Delete("/compute/v1/instances/{UID}".into())
        );
    }

    #[test]
    fn search_list_appends_nothing() {
        assert_eq!(
            synthesized("LIST", "GET", true),
            HttpPattern::Get("/compute/v1/instances".into())
        );
    }

    #[test]
    fn search_other_appends_uid_and_name() {
        assert_eq!(
            synthesized("Resize", "POST", true),
            HttpPattern::Post("/compute/v1/instances/{UID}/resize".into())
        );
    }

    #[test]
    fn non_search_appends_metadata_uid_and_name() {
        assert_eq!(
            synthesized("reboot", "POST", false),
            HttpPattern::Post("/compute/v1/instances/{metadata.uid}/reboot".into())
        );
        // applies to conventional names too
        assert_eq!(
            synthesized("show", "GET", false),
            HttpPattern::Get("/compute/v1/instances/{metadata.uid}/show".into())
        );
    }

    #[test]
    fn unknown_verb_becomes_custom() {
        assert_eq!(
            synthesized("ping", "HEAD", true),
            HttpPattern::Custom {
                kind: "HEAD".into(),
                path: "/compute/v1/instances/{UID}/ping".into()
            }
        );
    }

    #[test]
    fn missing_name_skips_synthesis() {
        let rule = synthesize_rule(&endpoint(), &spec("", "GET", true), INSTANCES, "m").unwrap();
        assert!(rule.is_none());
    }

    #[test]
    fn missing_verb_is_fatal() {
        let err = synthesize_rule(&endpoint(), &spec("show", "", true), INSTANCES, ".a.B.Show")
            .unwrap_err();
        assert!(matches!(err, CompileError::MissingNamingVerb { ref method } if method == ".a.B.Show"));
    }

    #[test]
    fn missing_alias_is_fatal() {
        let endpoint = EndpointOptions {
            aliases: Vec::new(),
            ..endpoint()
        };
        let fqmn = format!("{}.Show", INSTANCES);
        let err =
            synthesize_rule(&endpoint, &spec("show", "GET", true), INSTANCES, &fqmn).unwrap_err();
        assert_eq!(err.code(), "E4010");
        match &err {
            CompileError::MissingNamingAlias { service, method } => {
                assert_eq!(service, INSTANCES);
                assert_eq!(method, &fqmn);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains(".compute.v1.InstanceService.Show"));
    }

    #[test]
    fn default_rule_posts_whole_request() {
        let rule = default_rule(".compute.v1.InstanceService", "Reboot");
        assert_eq!(
            rule.rule.pattern,
            Some(HttpPattern::Post("/compute.v1.InstanceService/Reboot".into()))
        );
        assert_eq!(rule.rule.body, "*");
        assert!(rule.additional_bindings.is_empty());
    }

    #[test]
    fn naming_convention_wins_over_annotation() {
        let rules = extract(&OverrideTable::new(), &CompileOptions::default(), 0, "Show").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(
            rules[0].rule.pattern,
            Some(HttpPattern::Get("/compute/v1/instances/{UID}".into()))
        );
    }

    #[test]
    fn nameless_spec_yields_no_rule() {
        let rules =
            extract(&OverrideTable::new(), &CompileOptions::default(), 0, "Nameless").unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn annotation_used_without_method_spec() {
        let rules =
            extract(&OverrideTable::new(), &CompileOptions::default(), 0, "Annotated").unwrap();
        assert_eq!(
            rules[0].rule.pattern,
            Some(HttpPattern::Get("/v1/annotated/{uid}".into()))
        );

        let rules = extract(&OverrideTable::new(), &CompileOptions::default(), 1, "Get").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].additional_bindings.len(), 1);
    }

    #[test]
    fn overrides_follow_primary_rule() {
        let mut overrides = OverrideTable::new();
        overrides.add(
            "compute.v1.InstanceService.Show",
            PrimaryRule::new(Rule::new(HttpPattern::Get("/v2/instances/{UID}".into()))),
        );
        let rules = extract(&overrides, &CompileOptions::default(), 0, "Show").unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(
            rules[1].rule.pattern,
            Some(HttpPattern::Get("/v2/instances/{UID}".into()))
        );
    }

    #[test]
    fn overrides_suppress_fallback() {
        let mut overrides = OverrideTable::new();
        overrides.add(
            "compute.v1.InstanceService.Bare",
            PrimaryRule::new(Rule::new(HttpPattern::Put("/bare".into()))),
        );
        let options = CompileOptions::new().with_generate_unbound_methods(true);
        let rules = extract(&overrides, &options, 0, "Bare").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].rule.pattern, Some(HttpPattern::Put("/bare".into())));
    }

    #[test]
    fn unbound_method_without_fallback() {
        let options = CompileOptions::new().with_warn_on_unbound_methods(true);
        let rules = extract(&OverrideTable::new(), &options, 0, "Bare").unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn unbound_method_with_fallback() {
        let options = CompileOptions::new().with_generate_unbound_methods(true);
        let rules = extract(&OverrideTable::new(), &options, 0, "Bare").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(
            rules[0].rule.pattern,
            Some(HttpPattern::Post("/compute.v1.InstanceService/Bare".into()))
        );
        assert_eq!(rules[0].rule.body, "*");
    }

    #[test]
    fn nested_annotation_is_invalid_rule() {
        let err = extract(&OverrideTable::new(), &CompileOptions::default(), 1, "Broken")
            .unwrap_err();
        match err {
            CompileError::InvalidRule { location, source } => {
                assert_eq!(location, format!("{}.Broken", PLAIN));
                assert_eq!(source, RuleError::NestedAdditionalBindings);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
