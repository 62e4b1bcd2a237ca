//! Project manifest (`rampart.yaml`) parser.
//!
//! The manifest lists the schema catalogs and service configuration files
//! of a project, plus its compile options:
//!
//! ```yaml
//! schemas:
//!   - schemas/compute.yaml
//! rules:
//!   - config/compute_service.yaml
//! options:
//!   allow_delete_body: true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::options::CompileOptions;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectManifest {
    /// Schema catalog files.
    #[serde(default)]
    pub schemas: Vec<PathBuf>,
    /// Service configuration files with override rules.
    #[serde(default)]
    pub rules: Vec<PathBuf>,
    #[serde(default)]
    pub options: CompileOptions,
}

impl ProjectManifest {
    /// Load a manifest from a YAML file. Relative paths are resolved against
    /// the manifest's directory.
    pub fn load(path: &Path) -> Result<Self, CompileError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CompileError::Manifest(format!("failed to read {}: {}", path.display(), e))
        })?;

        let manifest = Self::parse(&content, path)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(manifest.resolve_paths(base))
    }

    /// Parse a manifest from YAML content. `path` is only used in messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self, CompileError> {
        serde_yaml::from_str(content).map_err(|e| {
            CompileError::Manifest(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Make every relative path relative to `base`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        let resolve = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };
        self.schemas = self.schemas.into_iter().map(resolve).collect();
        self.rules = self.rules.into_iter().map(resolve).collect();
        self
    }
}
