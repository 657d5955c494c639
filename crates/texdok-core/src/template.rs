//! Template binding
//!
//! Wraps a rendered body in a complete LaTeX document. The preamble is
//! chosen from the template, the profile and the engine; nothing else.

use crate::config::{Config, ConfigProfile, TemplateName};
use crate::escape::escape_text;

/// Listings defaults shared by every template
const LSTSET: &str = r"\lstset{
  basicstyle=\ttfamily\small,
  keywordstyle=\color{blue},
  commentstyle=\color{green!50!black},
  stringstyle=\color{red!70!black},
  breaklines=true,
  frame=single,
  columns=fullflexible,
  showstringspaces=false
}";

/// Document class line for a configuration
pub fn document_class(config: &Config) -> String {
    let localized = config.profile == ConfigProfile::Localized;
    let (options, class) = match (config.template, localized) {
        (TemplateName::Book, true) => ("UTF8, a4paper, 12pt, openany", "ctexbook"),
        (TemplateName::Book, false) => ("a4paper, 12pt, openany", "book"),
        (_, true) => ("UTF8, a4paper, 12pt", "ctexart"),
        (_, false) => ("a4paper, 12pt", "article"),
    };
    format!("\\documentclass[{}]{{{}}}", options, class)
}

/// Packages in load order
pub fn packages(config: &Config) -> Vec<String> {
    let mut packages = Vec::new();

    // ctex classes configure fonts and input encoding themselves
    if config.profile != ConfigProfile::Localized {
        if config.is_unicode_engine() {
            packages.push("\\usepackage{fontspec}".to_string());
        } else {
            packages.push("\\usepackage[T1]{fontenc}".to_string());
            packages.push("\\usepackage[utf8]{inputenc}".to_string());
        }
    }

    packages.push("\\usepackage[margin=2.5cm]{geometry}".to_string());
    for name in ["graphicx", "float", "amsmath", "amssymb", "listings", "xcolor"] {
        packages.push(format!("\\usepackage{{{}}}", name));
    }
    if config.is_academic() {
        packages.push("\\usepackage{booktabs}".to_string());
    }
    packages.push("\\usepackage[hidelinks]{hyperref}".to_string());
    // cleveref has to follow hyperref
    if config.is_academic() {
        packages.push("\\usepackage{cleveref}".to_string());
    }
    packages
}

/// Bind a rendered body into a complete document
pub fn bind(body: &str, config: &Config) -> String {
    let mut out = String::new();
    out.push_str(&document_class(config));
    out.push_str("\n\n");
    for package in packages(config) {
        out.push_str(&package);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(LSTSET);
    out.push_str("\n\n");

    let title = config.title.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let has_title = title.is_some();
    if let Some(title) = title {
        out.push_str(&format!("\\title{{{}}}\n", escape_text(title)));
        let author = config.author.as_deref().map(str::trim).unwrap_or_default();
        out.push_str(&format!("\\author{{{}}}\n", escape_text(author)));
        out.push_str("\\date{\\today}\n\n");
    }

    out.push_str("\\begin{document}\n\n");
    if has_title {
        out.push_str("\\maketitle\n");
    }
    if config.template == TemplateName::Book {
        out.push_str("\\frontmatter\n\\tableofcontents\n\\mainmatter\n");
    }
    if has_title || config.template == TemplateName::Book {
        out.push('\n');
    }

    out.push_str(body);
    if !body.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("\n\\end{document}\n");
    out
}
