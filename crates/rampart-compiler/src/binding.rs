//! Turns validated rules into bindings of a method.

use std::sync::Arc;

use rampart_httprule::parse;
use rampart_schema::{is_well_known_type, Message, SchemaRegistry};

use crate::error::CompileError;
use crate::field_path::resolve_field_path;
use crate::model::{Binding, Body, Method, Parameter};
use crate::options::CompileOptions;
use crate::rule::{HttpPattern, PrimaryRule, Rule};

/// Builds bindings against one registry with one set of options.
pub struct BindingBuilder<'a> {
    registry: &'a SchemaRegistry,
    options: &'a CompileOptions,
}

impl<'a> BindingBuilder<'a> {
    pub fn new(registry: &'a SchemaRegistry, options: &'a CompileOptions) -> Self {
        Self { registry, options }
    }

    /// Attach a binding for `primary` and for each of its additional rules.
    pub fn add_bindings(&self, method: &mut Method, primary: &PrimaryRule) -> Result<(), CompileError> {
        for rule in primary.rules() {
            if let Some(binding) = self.build(method, rule, method.bindings.len())? {
                method.bindings.push(binding);
            }
        }
        Ok(())
    }

    /// Build one binding at position `index`. A rule without a pattern yields `None`.
    pub fn build(
        &self,
        method: &Method,
        rule: &Rule,
        index: usize,
    ) -> Result<Option<Binding>, CompileError> {
        let Some(pattern) = &rule.pattern else {
            return Ok(None);
        };
        let fqmn = method.fqmn();

        match pattern {
            HttpPattern::Get(_) if !rule.body.is_empty() => {
                return Err(CompileError::GetWithBody(fqmn));
            }
            HttpPattern::Delete(_) if !rule.body.is_empty() && !self.options.allow_delete_body => {
                return Err(CompileError::DeleteWithBody(fqmn));
            }
            _ => {}
        }

        let template = pattern.path();
        let path_tmpl = parse(template)
            .map_err(|source| CompileError::InvalidPathTemplate {
                method: fqmn.clone(),
                template: template.to_string(),
                source,
            })?
            .compile();

        if method.client_streaming && !path_tmpl.fields().is_empty() {
            return Err(CompileError::StreamingPathParam {
                method: fqmn,
                template: template.to_string(),
            });
        }

        let path_params = path_tmpl
            .fields()
            .iter()
            .map(|path| self.new_param(method, &fqmn, path))
            .collect::<Result<Vec<_>, _>>()?;

        let body = self.new_body(&fqmn, &method.request_type, &rule.body)?;
        let response_body = self.new_response(&fqmn, &method.response_type, &rule.response_body)?;

        tracing::debug!(
            method = %fqmn,
            verb = pattern.verb(),
            template = %path_tmpl,
            index,
            "binding created"
        );

        Ok(Some(Binding {
            index,
            http_method: pattern.verb().to_string(),
            path_tmpl,
            path_params,
            body,
            response_body,
        }))
    }

    fn new_param(&self, method: &Method, fqmn: &str, path: &str) -> Result<Parameter, CompileError> {
        let field_path = resolve_field_path(self.registry, &method.request_type, path, true)
            .map_err(|source| CompileError::InvalidFieldPath {
                method: fqmn.to_string(),
                source,
            })?;

        let Some(target) = field_path.target().cloned() else {
            return Err(CompileError::EmptyFieldPath {
                method: fqmn.to_string(),
                path: path.to_string(),
            });
        };
        if target.is_aggregate() {
            let owner = field_path
                .components()
                .last()
                .map(|c| c.owner.as_str())
                .unwrap_or_else(|| method.request_type.fqmn());
            let wrapper = target.type_name().is_some_and(|name| {
                self.registry
                    .lookup_msg(owner, name)
                    .map(|msg| is_well_known_type(msg.fqmn()))
                    .unwrap_or_else(|_| is_well_known_type(&absolute(name)))
            });
            if !wrapper {
                return Err(CompileError::MessagePathParam {
                    method: fqmn.to_string(),
                    path: path.to_string(),
                });
            }
        }

        Ok(Parameter {
            method: fqmn.to_string(),
            field_path,
            target,
        })
    }

    /// `""`: no body, `"*"`: whole request, else a request field path.
    fn new_body(
        &self,
        fqmn: &str,
        request: &Arc<Message>,
        selector: &str,
    ) -> Result<Option<Body>, CompileError> {
        match selector {
            "" => Ok(None),
            "*" => Ok(Some(Body::default())),
            path => self.resolve_body(fqmn, request, path).map(Some),
        }
    }

    /// `""` and `"*"`: whole response, else a response field path.
    fn new_response(
        &self,
        fqmn: &str,
        response: &Arc<Message>,
        selector: &str,
    ) -> Result<Option<Body>, CompileError> {
        match selector {
            "" | "*" => Ok(None),
            path => self.resolve_body(fqmn, response, path).map(Some),
        }
    }

    fn resolve_body(
        &self,
        fqmn: &str,
        root: &Arc<Message>,
        path: &str,
    ) -> Result<Body, CompileError> {
        let field_path = resolve_field_path(self.registry, root, path, false).map_err(|source| {
            CompileError::InvalidFieldPath {
                method: fqmn.to_string(),
                source,
            }
        })?;
        Ok(Body { field_path })
    }
}

fn absolute(type_name: &str) -> String {
    if type_name.starts_with('.') {
        type_name.to_string()
    } else {
        format!(".{}", type_name)
    }
}
