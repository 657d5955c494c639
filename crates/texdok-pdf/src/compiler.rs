//! LaTeX to PDF compiler
//!
//! Drives an external engine over a `.tex` file until the log stops asking
//! for reruns or the pass budget runs out, then classifies the outcome.
//!
//! ```text
//! NotStarted ──► Running{1} ──rerun?──► Running{2} ──► … ──► Running{max}
//!                    │                      │                    │
//!                    └──────────────────────┴────────────────────┘
//!                                           ▼
//!                  Succeeded │ SucceededWithWarnings │ Failed
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use serde::Serialize;
use texdok_core::exec::run_with_timeout;
use texdok_core::Config;

use crate::error::{CompileError, CompileFailure, Result};
use crate::logfile::{analyze, tail, LogAnalysis, MAX_EXCERPT_LINES};

/// Auxiliary files removed after a successful compile
pub const AUXILIARY_EXTENSIONS: &[&str] = &[
    "aux",
    "log",
    "out",
    "toc",
    "lof",
    "lot",
    "bbl",
    "blg",
    "idx",
    "ind",
    "ilg",
    "fls",
    "fdb_latexmk",
    "synctex.gz",
];

/// Timeout for `--version` probes
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the orchestrator is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CompileState {
    /// Nothing has run yet
    NotStarted,
    /// Engine pass in progress, 1-based
    Running { pass: u32 },
    /// PDF written, clean log
    Succeeded,
    /// PDF written, allow-listed warnings in the log
    SucceededWithWarnings,
    /// No usable PDF
    Failed,
}

impl CompileState {
    /// Whether the state is final
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CompileState::Succeeded | CompileState::SucceededWithWarnings | CompileState::Failed
        )
    }
}

/// Final status of a compile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompileStatus {
    Succeeded,
    SucceededWithWarnings,
    Failed,
}

impl CompileStatus {
    /// Whether a PDF was produced
    pub fn is_success(self) -> bool {
        !matches!(self, CompileStatus::Failed)
    }
}

impl From<CompileStatus> for CompileState {
    fn from(status: CompileStatus) -> Self {
        match status {
            CompileStatus::Succeeded => CompileState::Succeeded,
            CompileStatus::SucceededWithWarnings => CompileState::SucceededWithWarnings,
            CompileStatus::Failed => CompileState::Failed,
        }
    }
}

/// Outcome of compiling one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileResult {
    /// Final status
    pub status: CompileStatus,
    /// The PDF, when one was produced
    pub artifact: Option<PathBuf>,
    /// Engine passes actually run
    pub passes_run: u32,
    /// Log excerpt (or stderr) explaining a failure
    pub diagnostics: Option<String>,
    /// Allow-listed warnings from the final pass
    pub warnings: Vec<String>,
    /// Why the compile failed
    pub failure: Option<CompileFailure>,
    /// Exit code of the last pass, informational only
    pub exit_code: Option<i32>,
}

impl CompileResult {
    fn failed(passes_run: u32, failure: CompileFailure, diagnostics: Option<String>) -> Self {
        Self {
            status: CompileStatus::Failed,
            artifact: None,
            passes_run,
            diagnostics,
            warnings: Vec::new(),
            failure: Some(failure),
            exit_code: None,
        }
    }
}

/// One engine invocation
#[derive(Debug, Clone)]
pub struct PassRequest<'a> {
    /// Engine executable
    pub engine: &'a str,
    /// Source file
    pub tex_file: &'a Path,
    /// Directory for the PDF, log and auxiliary files
    pub output_dir: &'a Path,
    /// Deadline for this pass
    pub timeout: Duration,
    /// 1-based pass number
    pub pass: u32,
}

impl PassRequest<'_> {
    /// Command-line arguments for the engine
    pub fn args(&self) -> Vec<String> {
        vec![
            "-interaction=nonstopmode".to_string(),
            "-file-line-error".to_string(),
            format!("-output-directory={}", self.output_dir.display()),
            self.tex_file.display().to_string(),
        ]
    }
}

/// What an engine pass produced
#[derive(Debug, Clone, Default)]
pub struct PassOutput {
    /// Exit code, if the engine exited on its own
    pub exit_code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
    /// The pass was killed at the deadline
    pub timed_out: bool,
}

/// Runs engine passes; swapped out in tests
pub trait EngineRunner: Send + Sync {
    /// Run one pass. `Err` means the engine could not be started.
    fn run_pass(&self, request: &PassRequest<'_>) -> io::Result<PassOutput>;

    /// First line of `<engine> --version`, if the engine can be started
    fn version(&self, engine: &str) -> Option<String>;
}

/// Runner that spawns the real engine
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl EngineRunner for ProcessRunner {
    fn run_pass(&self, request: &PassRequest<'_>) -> io::Result<PassOutput> {
        let mut command = Command::new(request.engine);
        // Graphics paths in the body are relative to the output directory
        command.args(request.args()).current_dir(request.output_dir);
        let output = run_with_timeout(&mut command, request.timeout)?;
        Ok(PassOutput {
            exit_code: output.status.and_then(|s| s.code()),
            stdout: output.stdout,
            stderr: output.stderr,
            timed_out: output.timed_out,
        })
    }

    fn version(&self, engine: &str) -> Option<String> {
        let mut command = Command::new(engine);
        command.arg("--version");
        let output = run_with_timeout(&mut command, PROBE_TIMEOUT).ok()?;
        if output.timed_out {
            return None;
        }
        output
            .stdout
            .lines()
            .find(|l| !l.trim().is_empty())
            .map(|l| l.trim().to_string())
    }
}

/// Multi-pass LaTeX compiler
pub struct Compiler<R: EngineRunner = ProcessRunner> {
    config: Config,
    runner: R,
    state: CompileState,
}

impl Compiler<ProcessRunner> {
    /// Compiler that runs the configured engine
    pub fn new(config: Config) -> Self {
        Self::with_runner(config, ProcessRunner)
    }
}

impl<R: EngineRunner> Compiler<R> {
    /// Compiler with a custom pass runner
    pub fn with_runner(config: Config, runner: R) -> Self {
        Self {
            config,
            runner,
            state: CompileState::NotStarted,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> CompileState {
        self.state
    }

    /// Version banner of the configured engine, if it can be started
    pub fn probe_engine(&self) -> Option<String> {
        self.runner.version(&self.config.engine)
    }

    /// Write `source` to `<output_dir>/<job_name>.tex` and compile it
    pub fn compile(
        &mut self,
        source: &str,
        output_dir: &Path,
        job_name: &str,
    ) -> Result<CompileResult> {
        if job_name.is_empty()
            || job_name.contains(['/', '\\'])
            || job_name.starts_with('.')
        {
            return Err(CompileError::InvalidJobName(job_name.to_string()));
        }
        fs::create_dir_all(output_dir)?;
        let tex_file = output_dir.join(format!("{}.tex", job_name));
        fs::write(&tex_file, source)?;
        self.compile_file(&tex_file, output_dir)
    }

    /// Compile an existing `.tex` file into `output_dir`
    pub fn compile_file(&mut self, tex_file: &Path, output_dir: &Path) -> Result<CompileResult> {
        self.config.validate()?;
        self.state = CompileState::NotStarted;

        let stem = tex_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| CompileError::InvalidJobName(tex_file.display().to_string()))?;
        fs::create_dir_all(output_dir)?;
        let output_dir = fs::canonicalize(output_dir)?;
        let tex_file = fs::canonicalize(tex_file)?;
        let artifact = output_dir.join(format!("{}.pdf", stem));
        let log_file = output_dir.join(format!("{}.log", stem));

        // Output left over from an earlier run must not be classified
        remove_if_exists(&artifact)?;
        remove_if_exists(&log_file)?;

        let result = self.run_passes(&tex_file, &output_dir, &artifact, &log_file)?;
        self.state = result.status.into();

        if result.status.is_success() && self.config.clean_auxiliary {
            clean_auxiliary(&output_dir, &stem);
        }
        log::debug!(
            "{}: {:?} after {} pass(es)",
            tex_file.display(),
            result.status,
            result.passes_run
        );
        Ok(result)
    }

    fn run_passes(
        &mut self,
        tex_file: &Path,
        output_dir: &Path,
        artifact: &Path,
        log_file: &Path,
    ) -> Result<CompileResult> {
        let max_passes = self.config.max_passes;
        let timeout = self.config.compile_timeout();
        let mut passes_run = 0;
        let mut last: Option<(PassOutput, LogAnalysis)> = None;

        for pass in 1..=max_passes {
            self.state = CompileState::Running { pass };
            let request = PassRequest {
                engine: &self.config.engine,
                tex_file,
                output_dir,
                timeout,
                pass,
            };
            log::debug!("{} pass {}/{}", self.config.engine, pass, max_passes);

            let output = match self.runner.run_pass(&request) {
                Ok(output) => output,
                Err(e) => {
                    log::warn!("cannot start {}: {}", self.config.engine, e);
                    let failure = CompileFailure::EngineUnavailable {
                        engine: self.config.engine.clone(),
                        reason: e.to_string(),
                    };
                    return Ok(CompileResult::failed(passes_run, failure, Some(e.to_string())));
                }
            };
            passes_run = pass;

            if output.timed_out {
                let failure = CompileFailure::Timeout {
                    pass,
                    secs: timeout.as_secs(),
                };
                let diagnostics = fallback_diagnostics(&output);
                return Ok(CompileResult::failed(passes_run, failure, diagnostics));
            }

            let log_text = read_log(log_file).unwrap_or_else(|| output.stdout.clone());
            let analysis = analyze(&log_text);
            let rerun = analysis.needs_rerun && !analysis.fatal;
            last = Some((output, analysis));

            if !rerun {
                break;
            }
            if pass == max_passes {
                log::warn!(
                    "{} still requests a rerun after {} passes",
                    tex_file.display(),
                    max_passes
                );
            }
        }

        let Some((output, analysis)) = last else {
            return Ok(CompileResult::failed(0, CompileFailure::NoArtifact, None));
        };

        let produced = artifact.is_file();
        if produced && !analysis.fatal {
            let status = if analysis.warnings.is_empty() {
                CompileStatus::Succeeded
            } else {
                CompileStatus::SucceededWithWarnings
            };
            return Ok(CompileResult {
                status,
                artifact: Some(artifact.to_path_buf()),
                passes_run,
                diagnostics: None,
                warnings: analysis.warnings,
                failure: None,
                exit_code: output.exit_code,
            });
        }

        let (failure, diagnostics) = match analysis.excerpt {
            Some(excerpt) if analysis.fatal => (
                CompileFailure::FatalError {
                    excerpt: excerpt.clone(),
                },
                Some(excerpt),
            ),
            _ => (CompileFailure::NoArtifact, fallback_diagnostics(&output)),
        };
        Ok(CompileResult {
            status: CompileStatus::Failed,
            artifact: None,
            passes_run,
            diagnostics,
            warnings: analysis.warnings,
            failure: Some(failure),
            exit_code: output.exit_code,
        })
    }
}

/// Compile a LaTeX source with the real engine
pub fn compile_document(
    source: &str,
    output_dir: &Path,
    job_name: &str,
    config: &Config,
) -> Result<CompileResult> {
    Compiler::new(config.clone()).compile(source, output_dir, job_name)
}

fn read_log(path: &Path) -> Option<String> {
    // Logs are not always valid UTF-8 (font names, input encodings)
    fs::read(path)
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

fn fallback_diagnostics(output: &PassOutput) -> Option<String> {
    let stderr = tail(&output.stderr, MAX_EXCERPT_LINES);
    if !stderr.is_empty() {
        return Some(stderr);
    }
    let stdout = tail(&output.stdout, MAX_EXCERPT_LINES);
    (!stdout.is_empty()).then_some(stdout)
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Remove `<stem>.<ext>` for every auxiliary extension
pub fn clean_auxiliary(output_dir: &Path, stem: &str) {
    for ext in AUXILIARY_EXTENSIONS {
        let path = output_dir.join(format!("{}.{}", stem, ext));
        if let Err(e) = remove_if_exists(&path) {
            log::debug!("could not remove {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_arguments() {
        let request = PassRequest {
            engine: "xelatex",
            tex_file: Path::new("/out/doc.tex"),
            output_dir: Path::new("/out"),
            timeout: Duration::from_secs(1),
            pass: 1,
        };
        assert_eq!(
            request.args(),
            vec![
                "-interaction=nonstopmode",
                "-file-line-error",
                "-output-directory=/out",
                "/out/doc.tex"
            ]
        );
    }

    #[test]
    fn test_state_conversion() {
        assert!(CompileState::from(CompileStatus::Failed).is_terminal());
        assert!(!CompileState::Running { pass: 1 }.is_terminal());
        assert!(!CompileState::NotStarted.is_terminal());
        assert!(CompileStatus::SucceededWithWarnings.is_success());
    }

    #[test]
    fn test_fallback_prefers_stderr() {
        let output = PassOutput {
            stdout: "out".to_string(),
            stderr: "err".to_string(),
            ..PassOutput::default()
        };
        assert_eq!(fallback_diagnostics(&output).as_deref(), Some("err"));
        assert_eq!(fallback_diagnostics(&PassOutput::default()), None);
    }

    #[test]
    fn test_clean_auxiliary() {
        let dir = tempfile::tempdir().unwrap();
        for ext in ["aux", "log", "toc", "pdf", "tex"] {
            fs::write(dir.path().join(format!("doc.{}", ext)), "x").unwrap();
        }
        clean_auxiliary(dir.path(), "doc");
        assert!(!dir.path().join("doc.aux").exists());
        assert!(!dir.path().join("doc.log").exists());
        assert!(dir.path().join("doc.pdf").exists());
        assert!(dir.path().join("doc.tex").exists());
    }
}
