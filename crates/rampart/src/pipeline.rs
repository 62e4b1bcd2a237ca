//! Input resolution and loading shared by `compile` and `validate`.

use std::path::{Path, PathBuf};

use rampart_compiler::{CompileError, CompileOptions, OverrideTable, ProjectManifest};
use rampart_schema::{parse_catalog, Catalog, SchemaRegistry};

/// Files and options of one run, after merging manifest and flags.
#[derive(Debug, Default)]
pub struct Inputs {
    pub schemas: Vec<PathBuf>,
    pub rules: Vec<PathBuf>,
    pub options: CompileOptions,
}

impl Inputs {
    /// Start from the manifest (if any) and append files given on the
    /// command line. A flag set on the command line turns the option on.
    pub fn resolve(
        manifest: Option<&Path>,
        schemas: &[PathBuf],
        rules: &[PathBuf],
        flags: &CompileOptions,
    ) -> Result<Self, CompileError> {
        let manifest = match manifest {
            Some(path) => ProjectManifest::load(path)?,
            None => ProjectManifest::default(),
        };

        let mut inputs = Inputs {
            schemas: manifest.schemas,
            rules: manifest.rules,
            options: manifest.options,
        };
        inputs.schemas.extend(schemas.iter().cloned());
        inputs.rules.extend(rules.iter().cloned());
        inputs.options.generate_unbound_methods |= flags.generate_unbound_methods;
        inputs.options.warn_on_unbound_methods |= flags.warn_on_unbound_methods;
        inputs.options.allow_delete_body |= flags.allow_delete_body;
        inputs.options.standalone |= flags.standalone;

        if inputs.schemas.is_empty() {
            return Err(CompileError::Manifest(
                "no schema files given (use --schema or a manifest)".to_string(),
            ));
        }
        Ok(inputs)
    }
}

/// Everything a compilation run reads.
pub struct Loaded {
    pub registry: SchemaRegistry,
    pub overrides: OverrideTable,
    /// `(path, content)` of every file read, for checksums.
    pub sources: Vec<(String, String)>,
}

/// An error tied to the file it came from.
#[derive(Debug)]
pub struct LoadError {
    pub file: Option<String>,
    pub error: CompileError,
}

impl LoadError {
    fn in_file(path: &Path, error: impl Into<CompileError>) -> Self {
        Self {
            file: Some(path.display().to_string()),
            error: error.into(),
        }
    }
}

/// Read every schema catalog and rule file of `inputs`.
pub fn load(inputs: &Inputs) -> Result<Loaded, LoadError> {
    let mut sources = Vec::new();
    let mut catalog = Catalog::default();

    for path in &inputs.schemas {
        let content = read(path)?;
        let parsed = parse_catalog(&content).map_err(|e| LoadError::in_file(path, e))?;
        tracing::debug!(file = %path.display(), files = parsed.files.len(), "catalog parsed");
        catalog.extend(parsed);
        sources.push((path.display().to_string(), content));
    }
    let registry = SchemaRegistry::new(catalog).map_err(|e| LoadError {
        file: None,
        error: e.into(),
    })?;

    let mut overrides = OverrideTable::new();
    for path in &inputs.rules {
        let content = read(path)?;
        let table = OverrideTable::from_yaml(&content).map_err(|e| LoadError::in_file(path, e))?;
        overrides.extend(table);
        sources.push((path.display().to_string(), content));
    }

    Ok(Loaded {
        registry,
        overrides,
        sources,
    })
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|e| {
        LoadError::in_file(
            path,
            CompileError::Manifest(format!("failed to read {}: {}", path.display(), e)),
        )
    })
}
