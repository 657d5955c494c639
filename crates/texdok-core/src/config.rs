//! Render and compile configuration
//!
//! A [`Config`] is resolved by the caller (CLI flags, `texdok.toml`) and
//! handed to the renderer, the image pipeline and the compiler as an
//! immutable value.
//!
//! ```toml
//! template = "book"
//! profile = "localized"
//! engine = "xelatex"
//! max_passes = 3
//! native_image_formats = ["jpg", "jpeg", "png", "pdf"]
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// Default number of engine passes
pub const DEFAULT_MAX_PASSES: u32 = 3;

/// Default cap for converted image width and height, in pixels
pub const DEFAULT_MAX_IMAGE_DIMENSION: u32 = 2048;

/// Document template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateName {
    /// Plain article
    #[default]
    Basic,
    /// Article with academic packages
    Academic,
    /// Book with chapters and a table of contents
    Book,
}

/// Rendering profile layered over the template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigProfile {
    /// No extra packages
    #[default]
    Default,
    /// CJK-capable ctex document classes
    Localized,
    /// booktabs tables and cleveref
    Academic,
}

/// Sectioning commands for article-class templates, outermost first
const ARTICLE_SECTIONS: &[&str] = &[
    "section",
    "subsection",
    "subsubsection",
    "paragraph",
    "subparagraph",
];

/// Sectioning commands for the book template, outermost first
const BOOK_SECTIONS: &[&str] = &[
    "chapter",
    "section",
    "subsection",
    "subsubsection",
    "paragraph",
    "subparagraph",
];

impl TemplateName {
    /// Native sectioning commands, indexed by heading depth minus one
    pub fn sectioning_commands(self) -> &'static [&'static str] {
        match self {
            TemplateName::Basic | TemplateName::Academic => ARTICLE_SECTIONS,
            TemplateName::Book => BOOK_SECTIONS,
        }
    }

    /// All templates
    pub fn all() -> &'static [TemplateName] {
        &[TemplateName::Basic, TemplateName::Academic, TemplateName::Book]
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TemplateName::Basic => "basic",
            TemplateName::Academic => "academic",
            TemplateName::Book => "book",
        };
        f.write_str(name)
    }
}

impl FromStr for TemplateName {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "basic" | "article" => Ok(TemplateName::Basic),
            "academic" => Ok(TemplateName::Academic),
            "book" => Ok(TemplateName::Book),
            other => Err(RenderError::InvalidConfig(format!(
                "unknown template '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ConfigProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigProfile::Default => "default",
            ConfigProfile::Localized => "localized",
            ConfigProfile::Academic => "academic",
        };
        f.write_str(name)
    }
}

impl FromStr for ConfigProfile {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(ConfigProfile::Default),
            "localized" | "chinese" => Ok(ConfigProfile::Localized),
            "academic" => Ok(ConfigProfile::Academic),
            other => Err(RenderError::InvalidConfig(format!(
                "unknown profile '{}'",
                other
            ))),
        }
    }
}

/// Immutable pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document template
    pub template: TemplateName,
    /// Rendering profile
    pub profile: ConfigProfile,
    /// LaTeX engine executable (pdflatex, xelatex, lualatex)
    pub engine: String,
    /// Upper bound on engine passes per document
    pub max_passes: u32,
    /// Image extensions included without conversion, lowercase, no dot
    pub native_image_formats: BTreeSet<String>,
    /// Document title; `\maketitle` is emitted when set
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
    /// Per-pass engine timeout in seconds
    pub compile_timeout_secs: u64,
    /// Per-attempt image conversion timeout in seconds
    pub conversion_timeout_secs: u64,
    /// Maximum width and height of converted images, in pixels
    pub max_image_dimension: u32,
    /// Worker threads for concurrent image conversion
    pub image_workers: usize,
    /// Remove auxiliary engine files after a successful compile
    pub clean_auxiliary: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template: TemplateName::default(),
            profile: ConfigProfile::default(),
            engine: "xelatex".to_string(),
            max_passes: DEFAULT_MAX_PASSES,
            native_image_formats: default_native_formats(),
            title: None,
            author: None,
            compile_timeout_secs: 300,
            conversion_timeout_secs: 30,
            max_image_dimension: DEFAULT_MAX_IMAGE_DIMENSION,
            image_workers: 4,
            clean_auxiliary: true,
        }
    }
}

fn default_native_formats() -> BTreeSet<String> {
    ["jpg", "jpeg", "png", "pdf"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Config {
    /// Parse a configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.max_passes == 0 {
            return Err(RenderError::InvalidConfig(
                "max_passes must be at least 1".to_string(),
            ));
        }
        if self.engine.trim().is_empty() {
            return Err(RenderError::InvalidConfig(
                "engine must not be empty".to_string(),
            ));
        }
        if self.image_workers == 0 {
            return Err(RenderError::InvalidConfig(
                "image_workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether an extension (with or without the dot) is passed through unchanged
    pub fn is_native_format(&self, extension: &str) -> bool {
        is_native_format(&self.native_image_formats, extension)
    }

    /// Per-pass engine timeout
    pub fn compile_timeout(&self) -> Duration {
        Duration::from_secs(self.compile_timeout_secs)
    }

    /// Per-attempt conversion timeout
    pub fn conversion_timeout(&self) -> Duration {
        Duration::from_secs(self.conversion_timeout_secs)
    }

    /// Whether the academic package set (booktabs, cleveref) is in effect
    pub fn is_academic(&self) -> bool {
        self.profile == ConfigProfile::Academic || self.template == TemplateName::Academic
    }

    /// Whether the engine reads UTF-8 natively and loads system fonts
    pub fn is_unicode_engine(&self) -> bool {
        let engine = self.engine.to_lowercase();
        engine.contains("xelatex") || engine.contains("lualatex")
    }
}

/// Case-insensitive membership test against a set of native extensions
pub fn is_native_format(formats: &BTreeSet<String>, extension: &str) -> bool {
    let ext = extension.trim_start_matches('.').to_lowercase();
    formats.iter().any(|f| f.trim_start_matches('.').eq_ignore_ascii_case(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.template, TemplateName::Basic);
        assert_eq!(config.profile, ConfigProfile::Default);
        assert_eq!(config.max_passes, 3);
        for ext in ["jpg", "jpeg", "png", "pdf"] {
            assert!(config.is_native_format(ext));
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_native_format_is_case_insensitive() {
        let config = Config::default();
        assert!(config.is_native_format("PNG"));
        assert!(config.is_native_format(".Jpeg"));
        assert!(!config.is_native_format("gif"));
        assert!(!config.is_native_format("svg"));
    }

    #[test]
    fn test_from_toml_partial() {
        let config = Config::from_toml_str(
            r#"
template = "book"
profile = "localized"
max_passes = 5
"#,
        )
        .unwrap();
        assert_eq!(config.template, TemplateName::Book);
        assert_eq!(config.profile, ConfigProfile::Localized);
        assert_eq!(config.max_passes, 5);
        assert_eq!(config.engine, "xelatex");
    }

    #[test]
    fn test_from_toml_rejects_zero_passes() {
        let result = Config::from_toml_str("max_passes = 0");
        assert!(matches!(result, Err(RenderError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_toml_rejects_unknown_template() {
        let result = Config::from_toml_str("template = \"memoir\"");
        assert!(matches!(result, Err(RenderError::ConfigParse(_))));
    }

    #[test]
    fn test_template_from_str() {
        assert_eq!("Book".parse::<TemplateName>().unwrap(), TemplateName::Book);
        assert_eq!(
            "chinese".parse::<ConfigProfile>().unwrap(),
            ConfigProfile::Localized
        );
        assert!("nope".parse::<TemplateName>().is_err());
    }

    #[test]
    fn test_sectioning_bounds() {
        assert_eq!(TemplateName::Basic.sectioning_commands().len(), 5);
        assert_eq!(TemplateName::Book.sectioning_commands()[0], "chapter");
        assert_eq!(TemplateName::Book.sectioning_commands().len(), 6);
    }

    #[test]
    fn test_unicode_engine() {
        let mut config = Config::default();
        assert!(config.is_unicode_engine());
        config.engine = "pdflatex".to_string();
        assert!(!config.is_unicode_engine());
    }
}
