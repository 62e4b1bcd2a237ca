//! Per-file assembly of services, methods and bindings.

use std::collections::HashMap;
use std::sync::Arc;

use rampart_schema::{FileDescriptor, MethodDescriptor, SchemaRegistry, ServiceDescriptor};

use crate::binding::BindingBuilder;
use crate::error::{CompileError, CompileWarning};
use crate::extract::extract_rules;
use crate::index::MethodIndex;
use crate::model::{fqsn, Method, Service};
use crate::options::CompileOptions;
use crate::overrides::OverrideTable;

/// Services of one schema file that are exposed over HTTP.
#[derive(Debug)]
pub struct CompiledFile {
    pub name: String,
    pub services: Vec<Service>,
}

/// Outcome of a full compilation run.
#[derive(Debug)]
pub struct CompileResult {
    /// Compiled files in catalog order.
    pub files: Vec<CompiledFile>,
    /// Every method of the run, exposed or not.
    pub index: MethodIndex,
    /// Non-fatal findings, sorted.
    pub warnings: Vec<CompileWarning>,
}

impl CompileResult {
    /// Number of bindings across all files.
    pub fn routes_count(&self) -> usize {
        self.files
            .iter()
            .flat_map(|f| &f.services)
            .flat_map(|s| s.exposed_methods())
            .map(|m| m.bindings.len())
            .sum()
    }
}

/// Compiles schema files against a registry and a populated override table.
pub struct Compiler<'a> {
    registry: &'a SchemaRegistry,
    overrides: &'a OverrideTable,
    options: CompileOptions,
}

impl<'a> Compiler<'a> {
    pub fn new(
        registry: &'a SchemaRegistry,
        overrides: &'a OverrideTable,
        options: CompileOptions,
    ) -> Self {
        Self {
            registry,
            overrides,
            options,
        }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile every file of the registry, stopping at the first failing one.
    pub fn compile(&self) -> Result<CompileResult, CompileError> {
        let mut index = MethodIndex::new();
        let mut files = Vec::new();
        for file in self.registry.files() {
            let services = self.compile_file(file, &mut index)?;
            files.push(CompiledFile {
                name: file.name.clone(),
                services,
            });
        }

        let mut warnings: Vec<CompileWarning> = self
            .overrides
            .selectors()
            .filter(|selector| !index.contains(selector))
            .map(|selector| CompileWarning {
                code: "E4100".to_string(),
                message: format!("no method matches override selector {}", selector),
                location: Some(selector.to_string()),
            })
            .collect();
        warnings.extend(detect_route_conflicts(&files));
        warnings.sort_by(|a, b| {
            (&a.location, &a.code, &a.message).cmp(&(&b.location, &b.code, &b.message))
        });

        tracing::debug!(
            files = files.len(),
            methods = index.len(),
            warnings = warnings.len(),
            "compilation finished"
        );
        Ok(CompileResult {
            files,
            index,
            warnings,
        })
    }

    /// Compile one file.
    ///
    /// Methods are registered in `index` only when the whole file succeeds.
    /// The returned list holds the services with at least one exposed method.
    pub fn compile_file(
        &self,
        file: &FileDescriptor,
        index: &mut MethodIndex,
    ) -> Result<Vec<Service>, CompileError> {
        let mut local = MethodIndex::new();
        let mut services = Vec::new();

        for desc in &file.services {
            let service = self.compile_service(file, desc, &mut local)?;
            if service.exposed_methods().next().is_none() {
                tracing::debug!(service = %service.fqsn(), "service has no bindings, dropped");
                continue;
            }
            services.push(service);
        }

        index.merge(local)?;
        tracing::debug!(file = %file.name, services = services.len(), "file compiled");
        Ok(services)
    }

    fn compile_service(
        &self,
        file: &FileDescriptor,
        desc: &ServiceDescriptor,
        index: &mut MethodIndex,
    ) -> Result<Service, CompileError> {
        let fqsn = fqsn(&file.package, &desc.name);
        let mut methods = Vec::with_capacity(desc.methods.len());

        for md in &desc.methods {
            let method = self
                .compile_method(file, desc, &fqsn, md)
                .inspect_err(|e| {
                    tracing::error!(
                        method = %format!("{}.{}", fqsn, md.name),
                        code = e.code(),
                        error = %e,
                        "method compilation failed"
                    )
                })?;
            let method = Arc::new(method);
            index.register(Arc::clone(&method))?;
            methods.push(method);
        }

        Ok(Service {
            name: desc.name.clone(),
            package: file.package.clone(),
            file: file.name.clone(),
            force_prefixed_name: self.options.standalone,
            methods,
        })
    }

    fn compile_method(
        &self,
        file: &FileDescriptor,
        service: &ServiceDescriptor,
        fqsn: &str,
        desc: &MethodDescriptor,
    ) -> Result<Method, CompileError> {
        let scope = if file.package.is_empty() {
            String::new()
        } else {
            format!(".{}", file.package)
        };
        let fqmn = format!("{}.{}", fqsn, desc.name);
        let lookup = |role: &'static str, name: &str| {
            self.registry
                .lookup_msg(&scope, name)
                .map_err(|source| CompileError::UnresolvedMessageType {
                    method: fqmn.clone(),
                    role,
                    name: name.to_string(),
                    source,
                })
        };
        let request_type = lookup("request", &desc.input_type)?;
        let response_type = lookup("response", &desc.output_type)?;

        let mut method = Method {
            name: desc.name.clone(),
            service: fqsn.to_string(),
            request_type,
            response_type,
            client_streaming: desc.client_streaming,
            server_streaming: desc.server_streaming,
            bindings: Vec::new(),
        };

        let rules = extract_rules(self.overrides, &self.options, service, fqsn, desc)?;
        let builder = BindingBuilder::new(self.registry, &self.options);
        for rule in &rules {
            builder.add_bindings(&mut method, rule)?;
        }

        tracing::debug!(
            method = %method.fqmn(),
            bindings = method.bindings.len(),
            "method compiled"
        );
        Ok(method)
    }
}

/// Warn about bindings that share a verb and a template shape.
///
/// `GET /v1/{id}` and `GET /v1/{name}` match the same requests; only the
/// first one registered would ever be reached.
pub fn detect_route_conflicts(files: &[CompiledFile]) -> Vec<CompileWarning> {
    let mut seen: HashMap<(String, String), String> = HashMap::new();
    let mut warnings = Vec::new();

    for file in files {
        for service in &file.services {
            for method in service.exposed_methods() {
                for binding in &method.bindings {
                    let location = format!("{} #{}", method.fqmn(), binding.index);
                    let key = (binding.http_method.clone(), binding.path_tmpl.shape());
                    match seen.get(&key) {
                        Some(first) => warnings.push(CompileWarning {
                            code: "E4101".to_string(),
                            message: format!(
                                "{} {} conflicts with the route bound by {}",
                                binding.http_method, binding.path_tmpl, first
                            ),
                            location: Some(location),
                        }),
                        None => {
                            seen.insert(key, location);
                        }
                    }
                }
            }
        }
    }
    warnings
}
