//! Document tree to LaTeX body renderer
//!
//! A render is a validation pass followed by a single in-order traversal.
//! Only structural problems abort; everything else degrades into a
//! [`Warning`] on the returned [`RenderReport`].

use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use texdok_ast::{Block, CodeBlock, Heading, Image, Inline, List, MathBlock, Table};

use crate::config::Config;
use crate::error::{RenderError, Result};
use crate::escape::{escape_text, escape_url};
use crate::images::{ImageOutcome, ImageResolver, PassthroughResolver};
use crate::labels::LabelRegistry;
use crate::language;
use crate::math;
use crate::report::{RenderReport, Warning};
use crate::table::{render_table, TableStyle};

/// Render a block sequence with the default image handling
///
/// Images are resolved relative to the working directory and only native
/// formats are included.
pub fn render(tree: &[Block], config: &Config) -> Result<RenderReport> {
    Renderer::new(config).render(tree)
}

/// Configurable renderer
pub struct Renderer<'a> {
    config: &'a Config,
    images: Option<&'a dyn ImageResolver>,
    source_dir: PathBuf,
    output_dir: Option<PathBuf>,
}

impl<'a> Renderer<'a> {
    /// Create a renderer for a configuration
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            images: None,
            source_dir: PathBuf::from("."),
            output_dir: None,
        }
    }

    /// Use an image resolver instead of native-format passthrough
    pub fn with_images(mut self, resolver: &'a dyn ImageResolver) -> Self {
        self.images = Some(resolver);
        self
    }

    /// Directory relative image sources are resolved against
    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = dir.into();
        self
    }

    /// Directory the `.tex` file will be written to
    ///
    /// Graphics below it are referenced by relative path.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Render a block sequence into a LaTeX body
    pub fn render(&self, tree: &[Block]) -> Result<RenderReport> {
        self.config.validate()?;
        validate_blocks(tree, &[])?;

        let passthrough;
        let resolver: &dyn ImageResolver = match self.images {
            Some(resolver) => resolver,
            None => {
                passthrough = PassthroughResolver::new(self.config.native_image_formats.clone());
                &passthrough
            }
        };

        let mut ctx = RenderContext {
            config: self.config,
            resolver,
            source_dir: &self.source_dir,
            output_dir: self.output_dir.as_deref(),
            labels: LabelRegistry::new(),
            warnings: Vec::new(),
            depth: 0,
            deepest_heading: 0,
            tables: 0,
            in_table: false,
            listing_environments: 0,
        };

        let mut local_images = Vec::new();
        ctx.collect_images(tree, &mut local_images);
        if !local_images.is_empty() {
            log::debug!(
                "prefetching {} image(s) with '{}'",
                local_images.len(),
                resolver.name()
            );
            resolver.prefetch(&local_images);
        }

        let body = ctx.render_blocks(tree);
        log::debug!(
            "rendered {} block(s), {} table(s), {} warning(s)",
            tree.len(),
            ctx.tables,
            ctx.warnings.len()
        );

        Ok(RenderReport {
            body,
            warnings: ctx.warnings,
            labels: ctx.labels.into_labels(),
            deepest_heading: ctx.deepest_heading,
        })
    }
}

/// Structural checks run before any output is produced
fn validate_blocks(blocks: &[Block], path: &[String]) -> Result<()> {
    for (i, block) in blocks.iter().enumerate() {
        let mut here = path.to_vec();
        here.push(format!("block {}", i + 1));
        let location = || format!("{} ({})", here.join(" > "), block.kind());

        match block {
            Block::Heading(heading) if heading.depth == 0 => {
                return Err(RenderError::malformed(
                    location(),
                    "heading depth must be at least 1",
                ));
            }
            Block::Table(table) => validate_table(table, location())?,
            Block::List(list) => {
                for (j, item) in list.items.iter().enumerate() {
                    let mut item_path = here.clone();
                    item_path.push(format!("item {}", j + 1));
                    validate_blocks(&item.content, &item_path)?;
                }
            }
            Block::Blockquote(quote) => validate_blocks(&quote.children, &here)?,
            _ => {}
        }
    }
    Ok(())
}

fn validate_table(table: &Table, location: String) -> Result<()> {
    let columns = table.header.len();
    if columns == 0 {
        return Err(RenderError::malformed(location, "table has no header cells"));
    }
    if !table.alignments.is_empty() && table.alignments.len() != columns {
        return Err(RenderError::malformed(
            location,
            format!(
                "{} alignment markers for {} columns",
                table.alignments.len(),
                columns
            ),
        ));
    }
    for (r, row) in table.rows.iter().enumerate() {
        if row.len() != columns {
            return Err(RenderError::malformed(
                location,
                format!("row {} has {} cells, expected {}", r + 1, row.len(), columns),
            ));
        }
    }
    Ok(())
}

/// Mutable state of one render
struct RenderContext<'r> {
    config: &'r Config,
    resolver: &'r dyn ImageResolver,
    source_dir: &'r Path,
    output_dir: Option<&'r Path>,
    labels: LabelRegistry,
    warnings: Vec<Warning>,
    depth: u32,
    deepest_heading: u32,
    tables: usize,
    in_table: bool,
    /// Private listing environments defined so far
    listing_environments: usize,
}

impl RenderContext<'_> {
    fn render_blocks(&mut self, blocks: &[Block]) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(blocks.len());
        let mut run_in = false;
        for block in blocks {
            let rendered = self.render_block(block);
            if rendered.is_empty() {
                continue;
            }
            // No blank line after a run-in title, so the next paragraph joins it
            match parts.last_mut() {
                Some(last) if run_in => last.push_str(&rendered),
                _ => parts.push(rendered),
            }
            run_in = matches!(block, Block::Heading(h) if self.is_run_in(h.depth));
        }
        parts.join("\n")
    }

    fn render_block(&mut self, block: &Block) -> String {
        match block {
            Block::Heading(heading) => self.render_heading(heading),
            Block::Paragraph(paragraph) => {
                format!("{}\n", self.render_inlines(&paragraph.content))
            }
            Block::List(list) => self.render_list(list),
            Block::Table(table) => self.render_table(table),
            Block::CodeBlock(code) => self.render_code(code),
            Block::Image(image) => self.render_image(image),
            Block::Math(math) => self.render_math_block(math),
            Block::Blockquote(quote) => {
                let inner = self.render_blocks(&quote.children);
                format!("\\begin{{quote}}\n{}\\end{{quote}}\n", inner)
            }
            Block::ThematicBreak => "\\noindent\\rule{\\textwidth}{0.4pt}\n".to_string(),
        }
    }

    fn render_heading(&mut self, heading: &Heading) -> String {
        let depth = heading.depth;
        if depth > self.depth + 1 && self.depth > 0 {
            log::debug!("heading jumps from depth {} to {}", self.depth, depth);
        }
        self.depth = depth;
        self.deepest_heading = self.deepest_heading.max(depth);

        let title = self.render_inlines(&heading.content);
        let commands = self.config.template.sectioning_commands();
        match commands.get(depth as usize - 1) {
            Some(command) => format!("\\{}{{{}}}\n", command, title),
            None => format!("\\par\\noindent\\textbf{{{}}}\\quad\n", title),
        }
    }

    /// Past the deepest native command headings become bold run-in titles
    fn is_run_in(&self, depth: u32) -> bool {
        depth as usize > self.config.template.sectioning_commands().len()
    }

    fn render_code(&mut self, code: &CodeBlock) -> String {
        let grammar = language::resolve(code.language.as_deref());
        let language = grammar
            .listings_name()
            .map(|name| format!("language={}", name));
        let content = code.content.trim_end_matches(['\n', '\r']);

        if !content.contains("\\end{lstlisting}") {
            let options = language.map(|l| format!("[{}]", l)).unwrap_or_default();
            return format!(
                "\\begin{{lstlisting}}{}\n{}\n\\end{{lstlisting}}\n",
                options, content
            );
        }

        // listings stops at the first literal `\end{<env>}`, so code that
        // quotes the terminator gets an environment whose name it never uses
        let name = loop {
            self.listing_environments += 1;
            let name = format!("texdoklisting{}", self.listing_environments);
            if !content.contains(&format!("\\end{{{}}}", name)) {
                break name;
            }
        };
        let setup = language
            .map(|l| format!("\\lstset{{{}}}", l))
            .unwrap_or_default();
        format!(
            "\\lstnewenvironment{{{name}}}{{{setup}}}{{}}\n\\begin{{{name}}}\n{content}\n\\end{{{name}}}\n",
            name = name,
            setup = setup,
            content = content
        )
    }

    fn render_list(&mut self, list: &List) -> String {
        if list.items.is_empty() {
            return String::new();
        }
        let env = if list.ordered { "enumerate" } else { "itemize" };
        let mut out = format!("\\begin{{{}}}\n", env);
        for item in &list.items {
            let content = self.render_blocks(&item.content);
            let content = content.trim_end();
            if content.is_empty() {
                out.push_str("\\item\n");
            } else {
                out.push_str(&format!("\\item {}\n", content));
            }
        }
        out.push_str(&format!("\\end{{{}}}\n", env));
        out
    }

    fn render_table(&mut self, table: &Table) -> String {
        self.tables += 1;
        self.in_table = true;
        let header: Vec<String> = table
            .header
            .iter()
            .map(|cell| self.render_inlines(cell))
            .collect();
        let rows: Vec<Vec<String>> = table
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| self.render_inlines(cell)).collect())
            .collect();
        self.in_table = false;

        let style = if self.config.is_academic() {
            TableStyle::Booktabs
        } else {
            TableStyle::Grid
        };
        render_table(&table.alignments, &header, &rows, style)
    }

    fn render_image(&mut self, image: &Image) -> String {
        let src = image.src.trim();
        let Some(source) = self.local_source(src) else {
            return String::new();
        };

        let path = match self.resolver.resolve(&source) {
            ImageOutcome::Emitted(path) => path,
            ImageOutcome::Skipped(reason) => {
                log::warn!("image '{}' skipped: {}", src, reason);
                self.warnings.push(Warning::ImageConversionFailed {
                    src: src.to_string(),
                    reason,
                });
                return String::new();
            }
        };

        let label = self.labels.register("fig", &image.alt);
        let mut out = String::from("\\begin{figure}[H]\n\\centering\n");
        out.push_str(&format!(
            "\\includegraphics[width=0.8\\textwidth,keepaspectratio]{{{}}}\n",
            self.graphics_path(&path)
        ));
        if !image.alt.trim().is_empty() {
            out.push_str(&format!("\\caption{{{}}}\n", escape_text(image.alt.trim())));
        }
        out.push_str(&format!("\\label{{{}}}\n", label));
        out.push_str("\\end{figure}\n");
        out
    }

    /// Resolve an image source to an existing local file, recording a
    /// warning when that is impossible
    fn local_source(&mut self, src: &str) -> Option<PathBuf> {
        let reason = if src.is_empty() {
            "empty image source".to_string()
        } else if is_remote(src) {
            "remote images are not fetched".to_string()
        } else {
            let path = self.source_path(src);
            if path.is_file() {
                return Some(path);
            }
            format!("file not found: {}", path.display())
        };
        log::warn!("image '{}' omitted: {}", src, reason);
        self.warnings.push(Warning::UnresolvableImage {
            src: src.to_string(),
            reason,
        });
        None
    }

    fn source_path(&self, src: &str) -> PathBuf {
        let path = Path::new(src);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.source_dir.join(path)
        }
    }

    /// Path as written into `\includegraphics`
    fn graphics_path(&self, path: &Path) -> String {
        let resolved = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if let Some(output_dir) = self.output_dir {
            let output_dir =
                fs::canonicalize(output_dir).unwrap_or_else(|_| output_dir.to_path_buf());
            if let Ok(relative) = resolved.strip_prefix(&output_dir) {
                return to_forward_slashes(relative);
            }
        }
        if resolved.is_absolute() {
            return to_forward_slashes(&resolved);
        }
        match std::env::current_dir() {
            Ok(cwd) => to_forward_slashes(&cwd.join(&resolved)),
            Err(_) => to_forward_slashes(&resolved),
        }
    }

    fn render_math_block(&mut self, block: &MathBlock) -> String {
        if block.inline {
            return format!("{}\n", self.render_math_inline(&block.content));
        }
        let content = block.content.trim();
        match math::check_balance(content) {
            Ok(()) if math::has_display_environment(content) => format!("{}\n", content),
            Ok(()) => format!("\\begin{{equation}}\n{}\n\\end{{equation}}\n", content),
            Err(imbalance) => {
                self.math_warning(&block.content, imbalance);
                format!("{}\n", escape_text(content))
            }
        }
    }

    fn render_math_inline(&mut self, content: &str) -> String {
        let trimmed = content.trim();
        match math::check_balance(trimmed) {
            Ok(()) => format!("${}$", trimmed),
            Err(imbalance) => {
                self.math_warning(content, imbalance);
                escape_text(trimmed)
            }
        }
    }

    fn math_warning(&mut self, content: &str, imbalance: math::Imbalance) {
        log::warn!("unbalanced math '{}': {}", content, imbalance);
        self.warnings.push(Warning::UnbalancedMath {
            content: content.to_string(),
            reason: imbalance.to_string(),
        });
    }

    fn render_inlines(&mut self, inlines: &[Inline]) -> String {
        let mut out = String::new();
        for inline in inlines {
            let rendered = self.render_inline(inline);
            out.push_str(&rendered);
        }
        out
    }

    fn render_inline(&mut self, inline: &Inline) -> String {
        match inline {
            Inline::Text(text) => escape_text(text),
            Inline::Emphasis(content) => format!("\\emph{{{}}}", self.render_inlines(content)),
            Inline::Strong(content) => format!("\\textbf{{{}}}", self.render_inlines(content)),
            Inline::Code(code) => format!("\\texttt{{{}}}", escape_text(code)),
            Inline::Link(link) => {
                let text = self.render_inlines(&link.content);
                if text.trim().is_empty() {
                    format!("\\url{{{}}}", escape_url(&link.url))
                } else {
                    format!("\\href{{{}}}{{{}}}", escape_url(&link.url), text)
                }
            }
            Inline::Math(content) => self.render_math_inline(content),
            Inline::SoftBreak => " ".to_string(),
            // A `\\` inside a tabular cell would end the row
            Inline::LineBreak if self.in_table => " ".to_string(),
            Inline::LineBreak => "\\\\\n".to_string(),
        }
    }

    fn collect_images(&self, blocks: &[Block], found: &mut Vec<PathBuf>) {
        for block in blocks {
            match block {
                Block::Image(image) => {
                    let src = image.src.trim();
                    if src.is_empty() || is_remote(src) {
                        continue;
                    }
                    let path = self.source_path(src);
                    if path.is_file() && !found.contains(&path) {
                        found.push(path);
                    }
                }
                Block::List(list) => {
                    for item in &list.items {
                        self.collect_images(&item.content, found);
                    }
                }
                Block::Blockquote(quote) => self.collect_images(&quote.children, found),
                _ => {}
            }
        }
    }
}

fn is_remote(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    ["http://", "https://", "ftp://", "//", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

fn to_forward_slashes(path: &Path) -> String {
    let text = path.to_string_lossy();
    if MAIN_SEPARATOR == '/' {
        text.into_owned()
    } else {
        text.replace(MAIN_SEPARATOR, "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigProfile, TemplateName};
    use texdok_ast::{Alignment, Blockquote, Link, ListItem, Paragraph};

    fn body(tree: &[Block]) -> String {
        render(tree, &Config::default()).unwrap().body
    }

    fn text(s: &str) -> Inline {
        Inline::text(s)
    }

    #[test]
    fn test_heading_commands() {
        let out = body(&[Block::heading(1, "Intro"), Block::heading(3, "Deep")]);
        assert!(out.contains("\\section{Intro}"));
        assert!(out.contains("\\subsubsection{Deep}"));
    }

    #[test]
    fn test_heading_fallback_past_native_depth() {
        let report = render(&[Block::heading(6, "Six")], &Config::default()).unwrap();
        assert!(report
            .body
            .contains("\\par\\noindent\\textbf{Six}\\quad"));
        assert_eq!(report.deepest_heading, 6);
    }

    #[test]
    fn test_fallback_heading_runs_into_paragraph() {
        let out = body(&[
            Block::heading(6, "Six"),
            Block::paragraph(vec![text("Body text")]),
            Block::paragraph(vec![text("Next")]),
        ]);
        assert!(out.contains("\\textbf{Six}\\quad\nBody text\n\nNext"));
        assert!(!out.contains("\\quad\n\n"));
    }

    #[test]
    fn test_book_uses_chapters() {
        let config = Config {
            template: TemplateName::Book,
            ..Config::default()
        };
        let out = render(&[Block::heading(1, "One"), Block::heading(6, "Six")], &config)
            .unwrap()
            .body;
        assert!(out.contains("\\chapter{One}"));
        assert!(out.contains("\\subparagraph{Six}"));
    }

    #[test]
    fn test_heading_title_escaped() {
        let out = body(&[Block::heading(2, "50% & more")]);
        assert!(out.contains("\\subsection{50\\% \\& more}"));
    }

    #[test]
    fn test_inline_formatting() {
        let out = body(&[Block::paragraph(vec![
            text("a "),
            Inline::Emphasis(vec![text("em")]),
            text(" "),
            Inline::Strong(vec![text("strong")]),
            text(" "),
            Inline::Code("x_y".to_string()),
            Inline::SoftBreak,
            Inline::Link(Link {
                url: "https://example.com/#top".to_string(),
                content: vec![text("site")],
            }),
            Inline::LineBreak,
            Inline::Link(Link {
                url: "https://example.com".to_string(),
                content: vec![],
            }),
        ])]);
        assert!(out.contains("\\emph{em}"));
        assert!(out.contains("\\textbf{strong}"));
        assert!(out.contains("\\texttt{x\\_y}"));
        assert!(out.contains("\\href{https://example.com/\\#top}{site}\\\\\n"));
        assert!(out.contains("\\url{https://example.com}"));
    }

    #[test]
    fn test_code_block_languages() {
        let out = body(&[
            Block::code(Some("Rust"), "fn main() {}\n"),
            Block::code(None, "plain"),
            Block::code(Some("unknown-lang"), "x"),
        ]);
        assert!(out.contains("\\begin{lstlisting}[language=C]\nfn main() {}\n\\end{lstlisting}"));
        assert_eq!(out.matches("\\begin{lstlisting}\n").count(), 2);
    }

    #[test]
    fn test_code_quoting_listing_terminator() {
        let out = body(&[
            Block::code(
                Some("latex"),
                "\\begin{lstlisting}\nx\n\\end{lstlisting}\nafter",
            ),
            Block::code(None, "\\end{lstlisting}\n\\end{texdoklisting2}"),
        ]);
        assert!(out.starts_with(
            "\\lstnewenvironment{texdoklisting1}{\\lstset{language=TeX}}{}\n\\begin{texdoklisting1}\n"
        ));
        assert!(out.contains("\\end{lstlisting}\nafter\n\\end{texdoklisting1}\n"));
        // The second listing skips a name its own content closes
        assert!(out.contains("\\lstnewenvironment{texdoklisting3}{}{}\n\\begin{texdoklisting3}"));
        assert!(!out.contains("\\begin{texdoklisting2}"));
        assert_eq!(out.matches("\\end{lstlisting}").count(), 2);
    }

    #[test]
    fn test_lists_and_quotes() {
        let out = body(&[
            Block::List(List {
                ordered: true,
                items: vec![
                    ListItem {
                        content: vec![Block::paragraph(vec![text("first")])],
                    },
                    ListItem {
                        content: vec![Block::List(List {
                            ordered: false,
                            items: vec![ListItem {
                                content: vec![Block::paragraph(vec![text("nested")])],
                            }],
                        })],
                    },
                ],
            }),
            Block::Blockquote(Blockquote {
                children: vec![Block::paragraph(vec![text("quoted")])],
            }),
            Block::ThematicBreak,
            Block::List(List {
                ordered: false,
                items: vec![],
            }),
        ]);
        assert!(out.contains("\\begin{enumerate}\n\\item first\n"));
        assert!(out.contains("\\item \\begin{itemize}\n\\item nested\n\\end{itemize}"));
        assert!(out.contains("\\begin{quote}\nquoted\n\\end{quote}"));
        assert!(out.contains("\\noindent\\rule{\\textwidth}{0.4pt}"));
        assert_eq!(out.matches("\\begin{itemize}").count(), 1);
    }

    #[test]
    fn test_table_rendering() {
        let table = Block::Table(Table {
            alignments: vec![Alignment::Center, Alignment::Right],
            header: vec![vec![text("A_1")], vec![text("B")]],
            rows: vec![vec![
                vec![text("x"), Inline::LineBreak, text("y")],
                vec![text("$5")],
            ]],
        });
        let out = body(std::slice::from_ref(&table));
        assert!(out.contains("\\begin{tabular}{|c|r|}"));
        assert!(out.contains("\\textbf{A\\_1} & \\textbf{B} \\\\"));
        assert!(out.contains("x y & \\$5 \\\\"));

        let academic = Config {
            profile: ConfigProfile::Academic,
            ..Config::default()
        };
        let out = render(&[table], &academic).unwrap().body;
        assert!(out.contains("\\toprule"));
        assert!(out.contains("\\begin{tabular}{cr}"));
    }

    #[test]
    fn test_math_rendering() {
        let report = render(
            &[
                Block::math("E = mc^2", false),
                Block::math("\\begin{align} a &= b \\end{align}", false),
                Block::paragraph(vec![text("so "), Inline::Math("x_1".to_string())]),
                Block::math("\\frac{1}{2", false),
            ],
            &Config::default(),
        )
        .unwrap();
        assert!(report
            .body
            .contains("\\begin{equation}\nE = mc^2\n\\end{equation}"));
        assert!(report.body.contains("\\begin{align} a &= b \\end{align}\n"));
        assert!(!report.body.contains("\\begin{equation}\n\\begin{align}"));
        assert!(report.body.contains("so $x_1$"));
        assert!(report.body.contains("\\textbackslash{}frac\\{1\\}\\{2"));
        assert_eq!(report.warnings.len(), 1);
        assert!(matches!(report.warnings[0], Warning::UnbalancedMath { .. }));
    }

    #[test]
    fn test_math_that_would_break_compilation_is_escaped() {
        let report = render(
            &[
                Block::paragraph(vec![text("rate "), Inline::Math("50%".to_string())]),
                Block::math("a = 1\n\nb = 2", false),
            ],
            &Config::default(),
        )
        .unwrap();
        assert!(report.body.contains("rate 50\\%"));
        assert!(!report.body.contains('$'));
        assert!(!report.body.contains("\\begin{equation}"));
        assert_eq!(report.warnings.len(), 2);
        assert!(report
            .warnings
            .iter()
            .all(|w| matches!(w, Warning::UnbalancedMath { .. })));
    }

    #[test]
    fn test_remote_image_is_warning() {
        let report = render(
            &[Block::image("Logo", "https://example.com/logo.png")],
            &Config::default(),
        )
        .unwrap();
        assert!(!report.body.contains("includegraphics"));
        assert!(matches!(
            &report.warnings[..],
            [Warning::UnresolvableImage { .. }]
        ));
    }

    #[test]
    fn test_malformed_heading_depth() {
        let err = render(&[Block::heading(0, "Zero")], &Config::default()).unwrap_err();
        match err {
            RenderError::MalformedTree { location, .. } => {
                assert_eq!(location, "block 1 (heading)")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_location_is_nested() {
        let tree = vec![
            Block::paragraph(vec![text("p")]),
            Block::List(List {
                ordered: false,
                items: vec![ListItem {
                    content: vec![
                        Block::paragraph(vec![text("q")]),
                        Block::Table(Table {
                            alignments: vec![],
                            header: vec![vec![text("a")], vec![text("b")]],
                            rows: vec![vec![vec![text("1")]]],
                        }),
                    ],
                }],
            }),
        ];
        let err = render(&tree, &Config::default()).unwrap_err();
        match err {
            RenderError::MalformedTree { location, message } => {
                assert_eq!(location, "block 2 > item 1 > block 2 (table)");
                assert!(message.contains("row 1 has 1 cells"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_alignment_count_mismatch() {
        let tree = vec![Block::Table(Table {
            alignments: vec![Alignment::Left],
            header: vec![vec![text("a")], vec![text("b")]],
            rows: vec![],
        })];
        assert!(matches!(
            render(&tree, &Config::default()),
            Err(RenderError::MalformedTree { .. })
        ));
        let empty_header = vec![Block::Table(Table {
            alignments: vec![],
            header: vec![],
            rows: vec![],
        })];
        assert!(render(&empty_header, &Config::default()).is_err());
    }

    #[test]
    fn test_paragraphs_separated_by_blank_line() {
        let out = body(&[
            Block::Paragraph(Paragraph {
                content: vec![text("one")],
            }),
            Block::paragraph(vec![text("two")]),
        ]);
        assert_eq!(out, "one\n\ntwo\n");
    }
}
