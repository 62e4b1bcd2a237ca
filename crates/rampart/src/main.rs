//! rampart route compiler.
//!
//! Compiles RPC schema catalogs and HTTP rules into a `routes.json` route
//! table for the gateway router.

mod pipeline;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use rampart_compiler::{CompileOptions, CompileResult, CompileWarning, Compiler, RouteTable};
use rampart_telemetry::{LogFormat, Telemetry, TelemetryConfig};

use pipeline::{load, Inputs, LoadError};

#[derive(Parser, Debug)]
#[command(name = "rampart", about = "rampart route compiler", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (overridden by RUST_LOG).
    #[arg(long, global = true, env = "RAMPART_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Log format (pretty or json).
    #[arg(
        long,
        global = true,
        env = "RAMPART_LOG_FORMAT",
        default_value = "pretty",
        value_parser = ["pretty", "json"]
    )]
    log_format: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile schema catalog(s) into a routes.json route table.
    Compile {
        #[command(flatten)]
        input: InputArgs,

        /// Output route table path.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Check schema catalog(s) and rules without writing a route table.
    Validate {
        #[command(flatten)]
        input: InputArgs,

        /// Output format (text or json).
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Schema catalog file(s) (YAML or JSON).
    #[arg(short, long, num_args = 1.., env = "RAMPART_SCHEMA", value_delimiter = ',')]
    schema: Vec<PathBuf>,

    /// Service configuration file(s) with override rules.
    #[arg(short, long, num_args = 1.., env = "RAMPART_RULES", value_delimiter = ',')]
    rules: Vec<PathBuf>,

    /// Project manifest (rampart.yaml).
    #[arg(short, long, env = "RAMPART_MANIFEST")]
    manifest: Option<PathBuf>,

    /// Expose methods without HTTP rules as POST /<service>/<method>.
    #[arg(long, env = "RAMPART_GENERATE_UNBOUND_METHODS")]
    generate_unbound_methods: bool,

    /// Log methods without HTTP rules as warnings.
    #[arg(long, env = "RAMPART_WARN_ON_UNBOUND_METHODS")]
    warn_on_unbound_methods: bool,

    /// Allow DELETE rules with a request body.
    #[arg(long, env = "RAMPART_ALLOW_DELETE_BODY")]
    allow_delete_body: bool,

    /// Report services under their package-prefixed name.
    #[arg(long, env = "RAMPART_STANDALONE")]
    standalone: bool,
}

impl InputArgs {
    fn flags(&self) -> CompileOptions {
        CompileOptions::new()
            .with_generate_unbound_methods(self.generate_unbound_methods)
            .with_warn_on_unbound_methods(self.warn_on_unbound_methods)
            .with_allow_delete_body(self.allow_delete_body)
            .with_standalone(self.standalone)
    }

    fn resolve(&self) -> Result<Inputs, LoadError> {
        Inputs::resolve(
            self.manifest.as_deref(),
            &self.schema,
            &self.rules,
            &self.flags(),
        )
        .map_err(|error| LoadError {
            file: self.manifest.as_ref().map(|p| p.display().to_string()),
            error,
        })
    }
}

/// Result of a validate run.
#[derive(serde::Serialize)]
struct ValidationResult {
    files: Vec<String>,
    valid: bool,
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ValidationSummary>,
}

#[derive(serde::Serialize)]
struct ValidationIssue {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

#[derive(serde::Serialize)]
struct ValidationSummary {
    services: usize,
    methods: usize,
    routes: usize,
}

impl From<&LoadError> for ValidationIssue {
    fn from(e: &LoadError) -> Self {
        Self {
            code: e.error.code().to_string(),
            message: e.error.to_string(),
            location: e.file.clone(),
        }
    }
}

impl From<&CompileWarning> for ValidationIssue {
    fn from(w: &CompileWarning) -> Self {
        Self {
            code: w.code.clone(),
            message: w.message.clone(),
            location: w.location.clone(),
        }
    }
}

/// Output of a successful load and compile.
struct Compiled {
    inputs: Inputs,
    result: CompileResult,
    sources: Vec<(String, String)>,
}

/// Load and compile; errors carry the file they came from when known.
fn run_pipeline(input: &InputArgs) -> Result<Compiled, LoadError> {
    let inputs = input.resolve()?;
    let loaded = load(&inputs)?;
    rampart_telemetry::log_schemas_loaded!(
        files = loaded.registry.files().len(),
        messages = loaded.registry.len()
    );
    rampart_telemetry::log_rules_loaded!(rules = loaded.overrides.len());

    let compiler = Compiler::new(&loaded.registry, &loaded.overrides, inputs.options.clone());
    let result = compiler
        .compile()
        .map_err(|error| LoadError { file: None, error })?;
    for warning in &result.warnings {
        rampart_telemetry::log_compile_warning!(
            code = %warning.code,
            location = warning.location.as_deref().unwrap_or(""),
            "{}",
            warning.message
        );
    }
    rampart_telemetry::log_compile_finished!(
        methods = result.index.len(),
        routes = result.routes_count(),
        warnings = result.warnings.len()
    );
    Ok(Compiled {
        inputs,
        result,
        sources: loaded.sources,
    })
}

/// Run the validate command.
fn run_validate(input: &InputArgs, output_format: &str) -> ExitCode {
    let report = match run_pipeline(input) {
        Ok(Compiled { inputs, result, .. }) => ValidationResult {
            files: display_paths(&inputs.schemas, &inputs.rules),
            valid: true,
            errors: Vec::new(),
            warnings: result.warnings.iter().map(ValidationIssue::from).collect(),
            summary: Some(ValidationSummary {
                services: result.files.iter().map(|f| f.services.len()).sum(),
                methods: result.index.len(),
                routes: result.routes_count(),
            }),
        },
        Err(e) => {
            rampart_telemetry::log_compile_failed!(code = e.error.code(), error = %e.error);
            ValidationResult {
                files: display_paths(&input.schema, &input.rules),
                valid: false,
                errors: vec![ValidationIssue::from(&e)],
                warnings: Vec::new(),
                summary: None,
            }
        }
    };

    if output_format == "json" {
        match serde_json::to_string_pretty(&report) {
            Ok(output) => println!("{}", output),
            Err(e) => {
                eprintln!("error: failed to serialize report: {}", e);
                return ExitCode::from(1);
            }
        }
    } else {
        print_text_report(&report);
    }

    if report.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn print_text_report(report: &ValidationResult) {
    for err in &report.errors {
        if let Some(loc) = &err.location {
            eprintln!("  {} [{}]: {}", err.code, loc, err.message);
        } else {
            eprintln!("  {}: {}", err.code, err.message);
        }
    }
    for warn in &report.warnings {
        if let Some(loc) = &warn.location {
            eprintln!("  {} [{}]: {} (warning)", warn.code, loc, warn.message);
        } else {
            eprintln!("  {}: {} (warning)", warn.code, warn.message);
        }
    }

    match &report.summary {
        Some(summary) if report.warnings.is_empty() => eprintln!(
            "✓ valid: {} service(s), {} method(s), {} route(s)",
            summary.services, summary.methods, summary.routes
        ),
        Some(summary) => eprintln!(
            "✓ valid (with {} warning(s)): {} service(s), {} method(s), {} route(s)",
            report.warnings.len(),
            summary.services,
            summary.methods,
            summary.routes
        ),
        None => eprintln!("✗ invalid: {} error(s)", report.errors.len()),
    }
}

/// Run the compile command.
fn run_compile(input: &InputArgs, output: &Path) -> ExitCode {
    let Compiled {
        inputs,
        result,
        sources,
    } = match run_pipeline(input) {
        Ok(compiled) => compiled,
        Err(e) => {
            rampart_telemetry::log_compile_failed!(code = e.error.code(), error = %e.error);
            match &e.file {
                Some(file) => eprintln!("error: compilation failed: {}: {}", file, e.error),
                None => eprintln!("error: compilation failed: {}", e.error),
            }
            return ExitCode::from(1);
        }
    };

    for warning in &result.warnings {
        let issue = ValidationIssue::from(warning);
        match &issue.location {
            Some(loc) => eprintln!("  {} [{}]: {} (warning)", issue.code, loc, issue.message),
            None => eprintln!("  {}: {} (warning)", issue.code, issue.message),
        }
    }

    let table = RouteTable::build(&result, &sources);
    if let Err(e) = table.write(output) {
        eprintln!("error: failed to write {}: {}", output.display(), e);
        return ExitCode::from(1);
    }
    rampart_telemetry::log_routes_written!(
        path = %output.display(),
        routes = table.routes_count
    );

    eprintln!(
        "compiled {} schema file(s) to {} ({} routes)",
        inputs.schemas.len(),
        output.display(),
        table.routes_count
    );
    ExitCode::SUCCESS
}

fn display_paths(schemas: &[PathBuf], rules: &[PathBuf]) -> Vec<String> {
    schemas
        .iter()
        .chain(rules)
        .map(|p| p.display().to_string())
        .collect()
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_format = LogFormat::parse(&cli.log_format).unwrap_or_default();
    let config = TelemetryConfig::new()
        .with_log_level(cli.log_level.clone())
        .with_log_format(log_format);
    match Telemetry::init(config) {
        Ok(telemetry) => {
            rampart_telemetry::log_startup!(
                service = %telemetry.config().service_name,
                version = env!("CARGO_PKG_VERSION")
            );
        }
        Err(e) => eprintln!("warning: {}", e),
    }

    match &cli.command {
        Commands::Compile { input, output } => run_compile(input, output),
        Commands::Validate { input, format } => run_validate(input, format),
    }
}
