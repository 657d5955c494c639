//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use texdok_ast::{Block, Document};
use texdok_core::{bind, language, Config, ConfigProfile, Renderer, TemplateName, Warning};
use texdok_images::ImagePipeline;
use texdok_pdf::{engine_version, CompileResult, Compiler};

/// Configuration file looked up next to each input
pub const CONFIG_FILE: &str = "texdok.toml";

/// Engines reported by `status` besides the configured one
const KNOWN_ENGINES: &[&str] = &["pdflatex", "xelatex", "lualatex"];

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

#[derive(Parser)]
#[command(name = "texdok")]
#[command(author, version, about = "Document trees to LaTeX and PDF", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Flags that override configuration file values
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Configuration file (defaults to texdok.toml next to each input)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Document template (basic, academic, book)
    #[arg(long)]
    pub template: Option<TemplateName>,

    /// Rendering profile (default, localized, academic)
    #[arg(long)]
    pub profile: Option<ConfigProfile>,

    /// LaTeX engine executable
    #[arg(long)]
    pub engine: Option<String>,

    /// Maximum engine passes per document
    #[arg(long)]
    pub max_passes: Option<u32>,
}

impl ConfigArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(template) = self.template {
            config.template = template;
        }
        if let Some(profile) = self.profile {
            config.profile = profile;
        }
        if let Some(engine) = &self.engine {
            config.engine = engine.clone();
        }
        if let Some(max_passes) = self.max_passes {
            config.max_passes = max_passes;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Render document trees (JSON) to LaTeX sources
    Render {
        /// Input JSON files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "build")]
        output: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Render and compile document trees to PDF
    Build {
        /// Input JSON files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "build")]
        output: PathBuf,

        /// Documents built concurrently
        #[arg(short, long, default_value_t = 1)]
        jobs: usize,

        #[command(flatten)]
        config: ConfigArgs,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show available engines and image conversion strategies
    Status {
        #[command(flatten)]
        config: ConfigArgs,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the listings grammar each code-fence tag resolves to
    Languages {
        /// Code-fence language tags
        #[arg(required = true)]
        tags: Vec<String>,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            inputs,
            output,
            config,
            format,
        } => {
            let outcomes = process_documents(&inputs, &output, &config, 1, false)?;
            print_outcomes(&outcomes, format)?;
            if outcomes.iter().any(|o| !o.succeeded()) {
                std::process::exit(1);
            }
        }
        Commands::Build {
            inputs,
            output,
            jobs,
            config,
            format,
        } => {
            let outcomes = process_documents(&inputs, &output, &config, jobs, true)?;
            print_outcomes(&outcomes, format)?;
            if outcomes.iter().any(|o| !o.succeeded()) {
                std::process::exit(1);
            }
        }
        Commands::Status { config, format } => {
            status_command(&config, format)?;
        }
        Commands::Languages { tags, format } => {
            languages_command(&tags, format)?;
        }
    }

    Ok(())
}

/// Install the tracing subscriber; `RUST_LOG` overrides the `info` default
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // Also bridges `log` records from the library crates
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// What happened to one input
#[derive(Debug, Clone, Serialize)]
pub struct DocumentOutcome {
    /// Input file
    pub input: PathBuf,
    /// LaTeX source written
    pub tex: Option<PathBuf>,
    /// Rendering warnings
    pub warnings: Vec<Warning>,
    /// Compile result, for `build`
    pub compile: Option<CompileResult>,
    /// Error that stopped this document
    pub error: Option<String>,
}

impl DocumentOutcome {
    fn failed(input: &Path, error: &anyhow::Error) -> Self {
        Self {
            input: input.to_path_buf(),
            tex: None,
            warnings: Vec::new(),
            compile: None,
            error: Some(format!("{:#}", error)),
        }
    }

    /// Whether the document rendered (and, when built, compiled)
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
            && self
                .compile
                .as_ref()
                .map_or(true, |c| c.status.is_success())
    }
}

/// Tree input: a bare block array or a document object
#[derive(Deserialize)]
#[serde(untagged)]
enum TreeInput {
    Blocks(Vec<Block>),
    Document(Document),
}

/// Read a document tree from a JSON file
pub fn load_tree(path: &Path) -> Result<Document> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    let input: TreeInput = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse document tree: {}", path.display()))?;
    Ok(match input {
        TreeInput::Blocks(blocks) => Document::from_blocks(blocks),
        TreeInput::Document(document) => document,
    })
}

/// Load the configuration for one input
///
/// `--config` wins over `texdok.toml` next to the input; flags override
/// both.
pub fn load_config(input: Option<&Path>, args: &ConfigArgs) -> Result<Config> {
    let path = match &args.config {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Some(path.clone())
        }
        None => input
            .and_then(|i| i.parent())
            .map(|dir| dir.join(CONFIG_FILE))
            .filter(|p| p.is_file()),
    };

    let mut config = match path {
        Some(path) => {
            tracing::debug!("Loading config: {}", path.display());
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            Config::from_toml_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?
        }
        None => Config::default(),
    };
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Render, and optionally compile, every input
///
/// Documents are isolated: a failure is recorded in that document's
/// outcome and the others carry on.
pub fn process_documents(
    inputs: &[PathBuf],
    output_dir: &Path,
    args: &ConfigArgs,
    jobs: usize,
    compile: bool,
) -> Result<Vec<DocumentOutcome>> {
    let mut job_names = HashSet::new();
    for input in inputs {
        let name = job_name(input)?;
        if !job_names.insert(name.clone()) {
            anyhow::bail!(
                "Two inputs would both write {}.tex; rename one of them",
                name
            );
        }
    }
    fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    let run = |input: &PathBuf| match process_document(input, output_dir, args, compile) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("{}: {:#}", input.display(), e);
            DocumentOutcome::failed(input, &e)
        }
    };

    let jobs = jobs.max(1);
    if jobs == 1 || inputs.len() <= 1 {
        return Ok(inputs.iter().map(run).collect());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .thread_name(|i| format!("texdok-build-{}", i))
        .build()
        .context("Failed to start build workers")?;
    Ok(pool.install(|| inputs.par_iter().map(run).collect()))
}

/// Render, and optionally compile, one input
pub fn process_document(
    input: &Path,
    output_dir: &Path,
    args: &ConfigArgs,
    compile: bool,
) -> Result<DocumentOutcome> {
    let name = job_name(input)?;
    let document = load_tree(input)?;
    let mut config = load_config(Some(input), args)?;
    if config.title.is_none() {
        config.title = document.metadata.title.clone();
    }
    if config.author.is_none() {
        config.author = document.metadata.author.clone();
    }

    let source_dir = input
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let pipeline = ImagePipeline::new(&config, output_dir);
    let report = Renderer::new(&config)
        .with_images(&pipeline)
        .with_source_dir(source_dir)
        .with_output_dir(output_dir)
        .render(&document.blocks)
        .with_context(|| format!("Failed to render: {}", input.display()))?;
    for warning in &report.warnings {
        tracing::warn!("{}: {}", input.display(), warning);
    }

    let source = bind(&report.body, &config);
    let tex = output_dir.join(format!("{}.tex", name));
    let compile_result = if compile {
        tracing::info!("Compiling {} with {}", input.display(), config.engine);
        let result = Compiler::new(config)
            .compile(&source, output_dir, &name)
            .with_context(|| format!("Failed to compile: {}", input.display()))?;
        Some(result)
    } else {
        fs::write(&tex, &source)
            .with_context(|| format!("Failed to write LaTeX file: {}", tex.display()))?;
        None
    };

    Ok(DocumentOutcome {
        input: input.to_path_buf(),
        tex: Some(tex),
        warnings: report.warnings,
        compile: compile_result,
        error: None,
    })
}

fn job_name(input: &Path) -> Result<String> {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .with_context(|| format!("Input has no file name: {}", input.display()))
}

fn print_outcomes(outcomes: &[DocumentOutcome], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(outcomes)
                .context("Failed to serialize report to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for outcome in outcomes {
                print_outcome(outcome);
            }
            let failed = outcomes.iter().filter(|o| !o.succeeded()).count();
            println!();
            println!(
                "{} document(s), {} failed",
                outcomes.len(),
                failed
            );
        }
    }
    Ok(())
}

fn print_outcome(outcome: &DocumentOutcome) {
    let input = outcome.input.display();
    if let Some(error) = &outcome.error {
        println!("✗ {}: {}", input, error);
        return;
    }
    match (&outcome.compile, &outcome.tex) {
        (Some(result), _) if result.status.is_success() => {
            let artifact = result
                .artifact
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            println!("✓ {} -> {} ({} pass(es))", input, artifact, result.passes_run);
            for warning in &result.warnings {
                println!("    {}", warning);
            }
        }
        (Some(result), _) => {
            let reason = result
                .failure
                .as_ref()
                .map(|f| f.to_string())
                .unwrap_or_else(|| "compile failed".to_string());
            println!("✗ {}: {}", input, reason);
            if let Some(diagnostics) = &result.diagnostics {
                for line in diagnostics.lines() {
                    println!("    {}", line);
                }
            }
        }
        (None, Some(tex)) => println!("✓ {} -> {}", input, tex.display()),
        (None, None) => println!("✓ {}", input),
    }
    for warning in &outcome.warnings {
        println!("  warning: {}", warning);
    }
}

/// An engine and whether it could be started
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub engine: String,
    pub version: Option<String>,
}

/// Toolchain report for `status`
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub configured_engine: String,
    pub engines: Vec<EngineStatus>,
    pub strategies: Vec<&'static str>,
    pub available_strategies: Vec<&'static str>,
}

/// Probe engines and conversion strategies
pub fn status_report(config: &Config) -> StatusReport {
    let mut names: Vec<&str> = vec![config.engine.as_str()];
    for engine in KNOWN_ENGINES {
        if !names.contains(engine) {
            names.push(engine);
        }
    }
    let engines = names
        .into_iter()
        .map(|engine| EngineStatus {
            engine: engine.to_string(),
            version: engine_version(engine),
        })
        .collect();

    let pipeline = ImagePipeline::new(config, ".");
    StatusReport {
        configured_engine: config.engine.clone(),
        engines,
        strategies: pipeline.strategy_names(),
        available_strategies: pipeline.available_strategies(),
    }
}

/// Execute the status command
pub fn status_command(args: &ConfigArgs, format: OutputFormat) -> Result<()> {
    let config = load_config(None, args)?;
    let report = status_report(&config);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .context("Failed to serialize status to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("texdok v{}", texdok_core::VERSION);
            println!();
            println!("Engines:");
            for status in &report.engines {
                let marker = if status.engine == report.configured_engine {
                    " (configured)"
                } else {
                    ""
                };
                match &status.version {
                    Some(version) => {
                        println!("  ✓ {}{}: {}", status.engine, marker, version)
                    }
                    None => println!("  ✗ {}{}: not found", status.engine, marker),
                }
            }
            println!();
            println!("Image conversion strategies:");
            for name in &report.strategies {
                let mark = if report.available_strategies.contains(name) {
                    "✓"
                } else {
                    "✗"
                };
                println!("  {} {}", mark, name);
            }
        }
    }
    Ok(())
}

/// A code-fence tag and the grammar it maps to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageMapping {
    pub tag: String,
    /// `listings` language name, `None` for plain text
    pub grammar: Option<&'static str>,
}

/// Resolve code-fence tags to grammars
pub fn language_mappings(tags: &[String]) -> Vec<LanguageMapping> {
    tags.iter()
        .map(|tag| LanguageMapping {
            tag: tag.clone(),
            grammar: language::resolve(Some(tag.as_str())).listings_name(),
        })
        .collect()
}

/// Execute the languages command
pub fn languages_command(tags: &[String], format: OutputFormat) -> Result<()> {
    let mappings = language_mappings(tags);
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&mappings)
                .context("Failed to serialize languages to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for mapping in &mappings {
                println!("{} -> {}", mapping.tag, mapping.grammar.unwrap_or("plain"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_render() {
        let args = vec!["texdok", "render", "doc.json"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Render {
                inputs,
                output,
                config,
                format,
            } => {
                assert_eq!(inputs, vec![PathBuf::from("doc.json")]);
                assert_eq!(output, PathBuf::from("build"));
                assert!(config.template.is_none());
                assert!(matches!(format, OutputFormat::Text));
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_cli_parse_build_flags() {
        let args = vec![
            "texdok",
            "build",
            "a.json",
            "b.json",
            "--jobs",
            "4",
            "--template",
            "book",
            "--profile",
            "academic",
            "--engine",
            "lualatex",
            "--max-passes",
            "5",
            "--format",
            "json",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Build {
                inputs,
                jobs,
                config,
                format,
                ..
            } => {
                assert_eq!(inputs.len(), 2);
                assert_eq!(jobs, 4);
                assert_eq!(config.template, Some(TemplateName::Book));
                assert_eq!(config.profile, Some(ConfigProfile::Academic));
                assert_eq!(config.engine.as_deref(), Some("lualatex"));
                assert_eq!(config.max_passes, Some(5));
                assert!(matches!(format, OutputFormat::Json));
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_template() {
        let args = vec!["texdok", "render", "doc.json", "--template", "memoir"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_requires_inputs() {
        assert!(Cli::try_parse_from(vec!["texdok", "build"]).is_err());
        assert!(Cli::try_parse_from(vec!["texdok", "languages"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::default();
        let args = ConfigArgs {
            engine: Some("pdflatex".to_string()),
            max_passes: Some(2),
            ..ConfigArgs::default()
        };
        args.apply(&mut config);
        assert_eq!(config.engine, "pdflatex");
        assert_eq!(config.max_passes, 2);
        assert_eq!(config.template, TemplateName::Basic);
    }

    #[test]
    fn test_language_mappings() {
        let tags: Vec<String> = ["JavaScript", "js", "unknown-lang"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mappings = language_mappings(&tags);
        assert_eq!(mappings[0].grammar, mappings[1].grammar);
        assert!(mappings[0].grammar.is_some());
        assert_eq!(mappings[2].grammar, None);
    }

    #[test]
    fn test_job_name() {
        assert_eq!(job_name(Path::new("docs/report.json")).unwrap(), "report");
        assert!(job_name(Path::new("/")).is_err());
    }
}
