//! Route table artifact (`routes.json`) consumed by the gateway router.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use rampart_schema::FieldKind;

use crate::compiler::CompileResult;
use crate::error::{CompileError, CompileWarning};
use crate::model::{Binding, Body, Method, Service};

/// Current route table format version.
pub const ROUTE_TABLE_VERSION: u32 = 1;

/// Compiler version (from Cargo.toml).
pub const COMPILER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteTable {
    pub route_table_version: u32,
    pub compiler_version: String,
    pub sources: Vec<SourceFile>,
    pub routes_count: usize,
    pub services: Vec<RouteService>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<CompileWarning>,
}

/// An input file and its SHA-256.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub file: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteService {
    /// Reported name (package-prefixed in standalone mode).
    pub name: String,
    pub fqsn: String,
    /// Schema file that declares the service.
    pub file: String,
    pub methods: Vec<RouteMethod>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteMethod {
    pub name: String,
    pub fqmn: String,
    pub request_type: String,
    pub response_type: String,
    #[serde(default)]
    pub client_streaming: bool,
    #[serde(default)]
    pub server_streaming: bool,
    pub bindings: Vec<RouteBinding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteBinding {
    pub index: usize,
    pub method: String,
    /// Canonical path template.
    pub template: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path_params: Vec<RouteParam>,
    /// `*` for the whole request, else a request field path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Response field serialized as the body; absent for the whole response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteParam {
    pub field_path: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
}

impl RouteTable {
    /// Build the table from a compilation result.
    ///
    /// `sources` holds `(file name, content)` of every input that went into
    /// the run; only checksums are kept.
    pub fn build(result: &CompileResult, sources: &[(String, String)]) -> Self {
        let services: Vec<RouteService> = result
            .files
            .iter()
            .flat_map(|f| &f.services)
            .map(route_service)
            .collect();

        Self {
            route_table_version: ROUTE_TABLE_VERSION,
            compiler_version: COMPILER_VERSION.to_string(),
            sources: sources
                .iter()
                .map(|(file, content)| SourceFile {
                    file: file.clone(),
                    sha256: compute_sha256(content),
                })
                .collect(),
            routes_count: result.routes_count(),
            services,
            warnings: result.warnings.clone(),
        }
    }

    /// Write the table as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> Result<(), CompileError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn route_service(service: &Service) -> RouteService {
    RouteService {
        name: service.instance_name(),
        fqsn: service.fqsn(),
        file: service.file.clone(),
        methods: service.exposed_methods().map(|m| route_method(m)).collect(),
    }
}

fn route_method(method: &Method) -> RouteMethod {
    RouteMethod {
        name: method.name.clone(),
        fqmn: method.fqmn(),
        request_type: method.request_type.fqmn().to_string(),
        response_type: method.response_type.fqmn().to_string(),
        client_streaming: method.client_streaming,
        server_streaming: method.server_streaming,
        bindings: method.bindings.iter().map(route_binding).collect(),
    }
}

fn route_binding(binding: &Binding) -> RouteBinding {
    RouteBinding {
        index: binding.index,
        method: binding.http_method.clone(),
        template: binding.path_tmpl.to_string(),
        path_params: binding
            .path_params
            .iter()
            .map(|p| RouteParam {
                field_path: p.field_path.to_string(),
                kind: p.target.kind(),
            })
            .collect(),
        body: binding.body.as_ref().map(selector),
        response_body: binding.response_body.as_ref().map(selector),
    }
}

fn selector(body: &Body) -> String {
    if body.is_whole_message() {
        "*".to_string()
    } else {
        body.field_path.to_string()
    }
}

/// Compute SHA-256 hash of a string.
fn compute_sha256(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
