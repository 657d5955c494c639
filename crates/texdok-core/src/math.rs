//! Math delimiter validation
//!
//! Math is passed through to LaTeX verbatim, so an unbalanced expression
//! would make the whole document uncompilable. [`check_balance`] catches the
//! common cases before emission: unbalanced groups, stray delimiters, a `%`
//! that would comment out the closing delimiter, and paragraph breaks.

use std::fmt;

/// Why an expression was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imbalance {
    /// Nothing but whitespace
    Empty,
    /// A `}` without a matching `{`
    UnexpectedClose { offset: usize },
    /// `{` left open at the end
    Unclosed { open: usize },
    /// `\right` without `\left`, or the counts differ at the end
    LeftRight { left: usize, right: usize },
    /// `\end{name}` that does not close the innermost `\begin`
    Environment {
        expected: Option<String>,
        found: String,
    },
    /// `\begin{name}` never closed
    UnclosedEnvironment(String),
    /// An unescaped `$` inside the expression
    StrayDollar { offset: usize },
    /// An unescaped `%`, which comments out the rest of the line
    Comment { offset: usize },
    /// A blank line, which ends the paragraph mid-formula
    BlankLine { line: usize },
}

impl fmt::Display for Imbalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Imbalance::Empty => write!(f, "empty math expression"),
            Imbalance::UnexpectedClose { offset } => {
                write!(f, "unmatched '}}' at offset {}", offset)
            }
            Imbalance::Unclosed { open } => write!(f, "{} unclosed '{{'", open),
            Imbalance::LeftRight { left, right } => {
                write!(f, "\\left/\\right mismatch ({} vs {})", left, right)
            }
            Imbalance::Environment { expected, found } => match expected {
                Some(expected) => {
                    write!(f, "\\end{{{}}} closes \\begin{{{}}}", found, expected)
                }
                None => write!(f, "\\end{{{}}} without \\begin", found),
            },
            Imbalance::UnclosedEnvironment(name) => write!(f, "\\begin{{{}}} never closed", name),
            Imbalance::StrayDollar { offset } => write!(f, "stray '$' at offset {}", offset),
            Imbalance::Comment { offset } => write!(f, "unescaped '%' at offset {}", offset),
            Imbalance::BlankLine { line } => write!(f, "blank line at line {}", line),
        }
    }
}

/// Check that braces, `\left`/`\right` and environments balance
///
/// Leading and trailing whitespace is ignored; callers emit the trimmed
/// expression.
pub fn check_balance(content: &str) -> Result<(), Imbalance> {
    let content = content.trim();
    if content.is_empty() {
        return Err(Imbalance::Empty);
    }
    if let Some(index) = content.lines().position(|line| line.trim().is_empty()) {
        return Err(Imbalance::BlankLine { line: index + 1 });
    }

    let chars: Vec<(usize, char)> = content.char_indices().collect();
    let mut depth = 0usize;
    let mut left = 0usize;
    let mut right = 0usize;
    let mut environments: Vec<String> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];
        match c {
            '\\' => {
                let Some(&(_, next)) = chars.get(i + 1) else {
                    i += 1;
                    continue;
                };
                if !next.is_ascii_alphabetic() {
                    // Control symbol such as \{ \} \$ \\
                    i += 2;
                    continue;
                }
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end].1.is_ascii_alphabetic() {
                    end += 1;
                }
                let name: String = chars[start..end].iter().map(|(_, c)| *c).collect();
                i = end;
                match name.as_str() {
                    "left" => left += 1,
                    "right" => {
                        right += 1;
                        if right > left {
                            return Err(Imbalance::LeftRight { left, right });
                        }
                    }
                    "begin" | "end" => {
                        let (env, next_index) = read_group(&chars, i);
                        i = next_index;
                        let Some(env) = env else { continue };
                        if name == "begin" {
                            environments.push(env);
                        } else {
                            match environments.pop() {
                                Some(open) if open == env => {}
                                open => {
                                    return Err(Imbalance::Environment {
                                        expected: open,
                                        found: env,
                                    })
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
            '{' => {
                depth += 1;
                i += 1;
            }
            '}' => {
                if depth == 0 {
                    return Err(Imbalance::UnexpectedClose { offset });
                }
                depth -= 1;
                i += 1;
            }
            '$' => return Err(Imbalance::StrayDollar { offset }),
            '%' => return Err(Imbalance::Comment { offset }),
            _ => i += 1,
        }
    }

    if depth > 0 {
        return Err(Imbalance::Unclosed { open: depth });
    }
    if left != right {
        return Err(Imbalance::LeftRight { left, right });
    }
    if let Some(open) = environments.pop() {
        return Err(Imbalance::UnclosedEnvironment(open));
    }
    Ok(())
}

/// Read a `{name}` group after optional whitespace
///
/// Returns the group content (if a complete group is present) and the index
/// just past it.
fn read_group(chars: &[(usize, char)], mut i: usize) -> (Option<String>, usize) {
    while i < chars.len() && chars[i].1.is_whitespace() {
        i += 1;
    }
    if i >= chars.len() || chars[i].1 != '{' {
        return (None, i);
    }
    let start = i + 1;
    let mut end = start;
    while end < chars.len() && chars[end].1 != '}' && chars[end].1 != '{' {
        end += 1;
    }
    if end >= chars.len() || chars[end].1 != '}' {
        // Leave the brace to the main loop so it is counted
        return (None, i);
    }
    let name: String = chars[start..end].iter().map(|(_, c)| *c).collect();
    (Some(name.trim().to_string()), end + 1)
}

/// Display environments that must not be wrapped in `equation`
const DISPLAY_ENVIRONMENTS: &[&str] = &[
    "equation",
    "equation*",
    "align",
    "align*",
    "gather",
    "gather*",
    "multline",
    "multline*",
    "flalign",
    "flalign*",
    "eqnarray",
    "eqnarray*",
];

/// Whether display math already opens its own top-level environment
pub fn has_display_environment(content: &str) -> bool {
    let trimmed = content.trim_start();
    DISPLAY_ENVIRONMENTS
        .iter()
        .any(|env| trimmed.starts_with(&format!("\\begin{{{}}}", env)))
}
