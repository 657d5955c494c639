//! LaTeX log classification
//!
//! Engine exit codes are unreliable under `-interaction=nonstopmode`, so
//! the log text decides: fatal errors, rerun requests and recoverable
//! warnings are matched against explicit marker lists.

use once_cell::sync::Lazy;
use regex::Regex;

/// Substrings that ask for another pass
pub const RERUN_MARKERS: &[&str] = &[
    "Rerun to get",
    "Label(s) may have changed",
    "Please rerun LaTeX",
    "Rerun LaTeX",
];

/// Substrings that mark an unrecoverable failure
const FATAL_MARKERS: &[&str] = &["Emergency stop", "Fatal error occurred", "==> Fatal error"];

/// Most lines kept in a failure excerpt
pub const MAX_EXCERPT_LINES: usize = 10;

/// Lines of context kept after each fatal line
const CONTEXT_LINES: usize = 2;

/// `-file-line-error` form of a `! ` error line
static FILE_LINE_ERROR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\S+\.(?:tex|sty|cls|ltx|def|cfg|clo):\d+: ").unwrap());

static WARNING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:LaTeX Warning:|LaTeX Font Warning:|Package \S+ Warning:|Class \S+ Warning:|(?:Overfull|Underfull) \\[hv]box|pdfTeX warning|Missing character:)",
    )
    .unwrap()
});

/// What one pass's log says
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogAnalysis {
    /// A rerun marker was found
    pub needs_rerun: bool,
    /// A fatal marker was found
    pub fatal: bool,
    /// Allow-listed warning lines, deduplicated, in log order
    pub warnings: Vec<String>,
    /// Fatal lines with context, at most [`MAX_EXCERPT_LINES`] lines
    pub excerpt: Option<String>,
}

/// Whether a single log line is a fatal marker
pub fn is_fatal_line(line: &str) -> bool {
    line.starts_with("! ")
        || FILE_LINE_ERROR.is_match(line)
        || FATAL_MARKERS.iter().any(|m| line.contains(m))
}

/// Whether a single log line is an allow-listed warning
pub fn is_warning_line(line: &str) -> bool {
    WARNING_LINE.is_match(line)
}

/// Classify the text of one log
pub fn analyze(log: &str) -> LogAnalysis {
    let lines: Vec<&str> = log.lines().map(|l| l.trim_end()).collect();
    let mut analysis = LogAnalysis::default();
    let mut excerpt: Vec<&str> = Vec::new();
    let mut covered_until = 0usize;

    for (i, line) in lines.iter().enumerate() {
        if RERUN_MARKERS.iter().any(|m| line.contains(m)) {
            analysis.needs_rerun = true;
        }
        if is_warning_line(line) && !analysis.warnings.iter().any(|w| w == line) {
            analysis.warnings.push(line.to_string());
        }
        if is_fatal_line(line) {
            analysis.fatal = true;
            let start = i.max(covered_until);
            let end = (i + CONTEXT_LINES + 1).min(lines.len());
            for context in &lines[start..end] {
                if excerpt.len() < MAX_EXCERPT_LINES {
                    excerpt.push(context);
                }
            }
            covered_until = covered_until.max(end);
        }
    }

    if !excerpt.is_empty() {
        analysis.excerpt = Some(excerpt.join("\n"));
    }
    analysis
}

/// Last `max` non-empty lines of a text, for stderr fallbacks
pub fn tail(text: &str, max: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(max);
    lines[start..].join("\n")
}
