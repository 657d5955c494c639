//! Code-fence language mapping
//!
//! Maps the open-ended set of info-string tags found in source documents onto
//! the closed set of languages the `listings` package highlights. Lookup is
//! total: anything unknown becomes [`Grammar::Plain`].

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

/// A `listings` highlighting grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    C,
    Cpp,
    Java,
    Python,
    Html,
    Xml,
    Bash,
    Tex,
    Sql,
    Php,
    Ruby,
    Lisp,
    Erlang,
    Haskell,
    Ml,
    Perl,
    /// No highlighting
    Plain,
}

impl Grammar {
    /// Name accepted by `language=` in `listings`, `None` for plain text
    pub fn listings_name(self) -> Option<&'static str> {
        let name = match self {
            Grammar::C => "C",
            Grammar::Cpp => "C++",
            Grammar::Java => "Java",
            Grammar::Python => "Python",
            Grammar::Html => "HTML",
            Grammar::Xml => "XML",
            Grammar::Bash => "bash",
            Grammar::Tex => "TeX",
            Grammar::Sql => "SQL",
            Grammar::Php => "PHP",
            Grammar::Ruby => "Ruby",
            Grammar::Lisp => "Lisp",
            Grammar::Erlang => "erlang",
            Grammar::Haskell => "Haskell",
            Grammar::Ml => "ML",
            Grammar::Perl => "Perl",
            Grammar::Plain => return None,
        };
        Some(name)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.listings_name().unwrap_or("plain"))
    }
}

/// Alias table, grouped by target grammar. Keys are lowercase.
const ALIASES: &[(Grammar, &[&str])] = &[
    (
        Grammar::C,
        &["c", "h", "go", "golang", "rust", "rs", "swift", "zig", "objc", "objective-c", "d", "nim", "v"],
    ),
    (Grammar::Cpp, &["cpp", "c++", "cc", "cxx", "hpp", "hxx", "cuda", "arduino"]),
    (
        Grammar::Java,
        &[
            "java", "javascript", "js", "mjs", "cjs", "typescript", "ts", "jsx", "tsx", "kotlin",
            "kt", "dart", "scala", "groovy", "csharp", "c#", "cs",
        ],
    ),
    (Grammar::Python, &["python", "py", "python3", "py3", "ipython", "pyi"]),
    (Grammar::Html, &["html", "htm", "xhtml", "vue", "svelte", "jinja", "handlebars"]),
    (
        Grammar::Xml,
        &["xml", "svg", "plist", "yaml", "yml", "toml", "json", "jsonc", "json5", "ini", "cfg", "conf", "properties"],
    ),
    (
        Grammar::Bash,
        &[
            "bash", "sh", "shell", "zsh", "fish", "ksh", "console", "shell-session", "powershell",
            "ps1", "pwsh", "bat", "cmd", "dockerfile", "docker", "makefile", "make",
        ],
    ),
    (Grammar::Tex, &["tex", "latex", "markdown", "md", "bibtex", "context"]),
    (Grammar::Sql, &["sql", "mysql", "postgresql", "postgres", "sqlite", "plsql"]),
    (Grammar::Php, &["php"]),
    (Grammar::Ruby, &["ruby", "rb", "crystal"]),
    (Grammar::Lisp, &["lisp", "clojure", "clj", "elisp", "emacs-lisp", "scheme", "racket"]),
    (Grammar::Erlang, &["erlang", "erl", "elixir", "ex", "exs"]),
    (Grammar::Haskell, &["haskell", "hs", "purescript", "elm"]),
    (Grammar::Ml, &["ml", "ocaml", "fsharp", "f#", "fs", "sml", "reason"]),
    (Grammar::Perl, &["perl", "pl", "pm", "raku"]),
];

static ALIAS_MAP: Lazy<HashMap<&'static str, Grammar>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for (grammar, aliases) in ALIASES {
        for alias in *aliases {
            map.insert(*alias, *grammar);
        }
    }
    map
});

/// Resolve a code-fence tag to a highlighting grammar
///
/// The tag is trimmed and case-folded; only the first word of an info
/// string is considered (`rust ignore` resolves like `rust`).
pub fn resolve(tag: Option<&str>) -> Grammar {
    let Some(tag) = tag else {
        return Grammar::Plain;
    };
    let word = tag.split_whitespace().next().unwrap_or("");
    let folded = word.trim_start_matches('{').trim_end_matches('}').to_lowercase();
    ALIAS_MAP.get(folded.as_str()).copied().unwrap_or(Grammar::Plain)
}
