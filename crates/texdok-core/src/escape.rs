//! LaTeX escaping
//!
//! Text from the document tree is escaped in a single pass so that an
//! inserted escape sequence is never itself re-escaped.

/// Characters with a special meaning in LaTeX body text
pub const RESERVED: [char; 10] = ['\\', '{', '}', '$', '&', '%', '#', '_', '^', '~'];

/// Escape text for use in LaTeX body text
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '$' => out.push_str("\\$"),
            '&' => out.push_str("\\&"),
            '%' => out.push_str("\\%"),
            '#' => out.push_str("\\#"),
            '_' => out.push_str("\\_"),
            '^' => out.push_str("\\textasciicircum{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a URL for the first argument of `\href`
///
/// hyperref reads the URL nearly verbatim; only `%`, `#`, braces and
/// backslashes need protecting.
pub fn escape_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '%' => out.push_str("\\%"),
            '#' => out.push_str("\\#"),
            '\\' | '{' | '}' => out.push_str(&format!("%{:02X}", c as u32)),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(escape_text("hello world"), "hello world");
        assert_eq!(escape_text("中文标题"), "中文标题");
    }

    #[test]
    fn test_every_reserved_character() {
        let escaped = escape_text("\\{}$&%#_^~");
        assert_eq!(
            escaped,
            "\\textbackslash{}\\{\\}\\$\\&\\%\\#\\_\\textasciicircum{}\\textasciitilde{}"
        );
    }

    #[test]
    fn test_backslash_escape_not_reescaped() {
        // The braces of \textbackslash{} must survive as-is
        assert_eq!(escape_text("a\\b"), "a\\textbackslash{}b");
    }

    #[test]
    fn test_escape_url() {
        assert_eq!(
            escape_url("https://example.com/a%20b#frag"),
            "https://example.com/a\\%20b\\#frag"
        );
        assert_eq!(escape_url("https://x.org/{y}"), "https://x.org/%7By%7D");
    }
}
