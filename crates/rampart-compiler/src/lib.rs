//! Compiles RPC service schemas into HTTP bindings.
//!
//! For every method of every schema file, HTTP rules are gathered from
//! annotations, naming-convention extensions and override tables, then
//! validated against the message graph and turned into bindings. The result
//! can be written as a `routes.json` route table for the gateway router.

pub mod artifact;
pub mod binding;
pub mod compiler;
pub mod error;
pub mod extract;
pub mod field_path;
pub mod index;
pub mod manifest;
pub mod model;
pub mod options;
pub mod overrides;
pub mod rule;

#[cfg(test)]
mod testing;

pub use artifact::{
    RouteBinding, RouteMethod, RouteParam, RouteService, RouteTable, SourceFile, COMPILER_VERSION,
    ROUTE_TABLE_VERSION,
};
pub use binding::BindingBuilder;
pub use compiler::{detect_route_conflicts, CompileResult, CompiledFile, Compiler};
pub use error::{CompileError, CompileWarning, FieldPathError, RuleError};
pub use extract::{default_rule, extract_rules, synthesize_rule};
pub use field_path::resolve_field_path;
pub use index::MethodIndex;
pub use manifest::ProjectManifest;
pub use model::{Binding, Body, FieldPath, FieldPathComponent, Method, Parameter, Service};
pub use options::CompileOptions;
pub use overrides::{OverrideTable, ServiceConfig};
pub use rule::{AdditionalRule, HttpPattern, PrimaryRule, Rule};
