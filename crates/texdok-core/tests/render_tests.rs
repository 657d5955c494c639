//! Rendering Tests
//!
//! End-to-end tests of the renderer against whole document trees, with
//! images on a scratch filesystem.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::TempDir;
use texdok_ast::{Alignment, Block, Inline, Table};
use texdok_core::{
    bind, render, Config, ImageOutcome, ImageResolver, RenderError, Renderer, TemplateName,
    Warning,
};

// =============================================================================
// HEADINGS
// =============================================================================

mod heading_tests {
    use super::*;

    #[test]
    fn test_depths_one_to_ten_in_order() {
        let tree: Vec<Block> = (1..=10)
            .map(|depth| Block::heading(depth, format!("H{}", depth)))
            .collect();
        let report = render(&tree, &Config::default()).unwrap();

        let mut last = 0;
        for depth in 1..=10 {
            let title = format!("{{H{}}}", depth);
            let position = report.body.find(&title).unwrap_or_else(|| {
                panic!("heading {} missing from output", depth);
            });
            assert!(position >= last, "heading {} out of order", depth);
            last = position;
        }
        assert_eq!(report.deepest_heading, 10);
        assert!(report.body.contains("\\subparagraph{H5}"));
        assert_eq!(report.body.matches("\\par\\noindent\\textbf{").count(), 5);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_seven_levels_book() {
        let config = Config {
            template: TemplateName::Book,
            ..Config::default()
        };
        let tree: Vec<Block> = (1..=7).map(|d| Block::heading(d, "T")).collect();
        let body = render(&tree, &config).unwrap().body;
        assert!(body.contains("\\chapter{T}"));
        assert!(body.contains("\\subparagraph{T}"));
        assert_eq!(body.matches("\\par\\noindent\\textbf{T}\\quad").count(), 1);
    }

    #[test]
    fn test_depth_is_not_renumbered() {
        let tree = vec![Block::heading(3, "Start deep"), Block::heading(1, "Back up")];
        let body = render(&tree, &Config::default()).unwrap().body;
        assert!(body.starts_with("\\subsubsection{Start deep}"));
        assert!(body.contains("\\section{Back up}"));
    }
}

// =============================================================================
// TABLES
// =============================================================================

mod table_tests {
    use super::*;

    fn cell(s: &str) -> Vec<Inline> {
        vec![Inline::text(s)]
    }

    #[test]
    fn test_reserved_characters_in_cells() {
        let table = Block::Table(Table {
            alignments: vec![Alignment::Left, Alignment::Default],
            header: vec![cell("Key"), cell("Value")],
            rows: vec![
                vec![cell("a_b"), cell("100%")],
                vec![cell("#tag"), cell("x^2 ~ y")],
                vec![cell("{set}"), cell("C:\\path & $cost")],
            ],
        });
        let body = render(&[table], &Config::default()).unwrap().body;
        assert!(body.contains("a\\_b & 100\\% \\\\"));
        assert!(body.contains("\\#tag & x\\textasciicircum{}2 \\textasciitilde{} y \\\\"));
        assert!(body.contains("\\{set\\} & C:\\textbackslash{}path \\& \\$cost \\\\"));
        assert!(body.contains("{|l|l|}"));
    }

    #[test]
    fn test_every_row_has_header_width() {
        let table = Block::Table(Table {
            alignments: vec![],
            header: vec![cell("a"), cell("b"), cell("c")],
            rows: vec![vec![cell("1"), cell("2"), cell("3")]; 4],
        });
        let body = render(&[table], &Config::default()).unwrap().body;
        for line in body.lines().filter(|l| l.ends_with("\\\\")) {
            assert_eq!(line.matches(" & ").count(), 2, "bad row: {}", line);
        }
    }

    #[test]
    fn test_ragged_table_is_malformed() {
        let table = Block::Table(Table {
            alignments: vec![],
            header: vec![cell("a"), cell("b")],
            rows: vec![vec![cell("1"), cell("2"), cell("3")]],
        });
        let tree = vec![Block::heading(1, "x"), Block::heading(2, "y"), table];
        match render(&tree, &Config::default()) {
            Err(RenderError::MalformedTree { location, .. }) => {
                assert_eq!(location, "block 3 (table)");
            }
            other => panic!("expected MalformedTree, got {:?}", other),
        }
    }
}

// =============================================================================
// IMAGES
// =============================================================================

mod image_tests {
    use super::*;

    fn scratch_image(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"not really an image").unwrap();
        path
    }

    #[test]
    fn test_identical_captions_get_distinct_labels() {
        let dir = TempDir::new().unwrap();
        scratch_image(dir.path(), "a.png");
        scratch_image(dir.path(), "b.png");

        let config = Config::default();
        let report = Renderer::new(&config)
            .with_source_dir(dir.path())
            .with_output_dir(dir.path())
            .render(&[
                Block::image("Architecture", "a.png"),
                Block::image("Architecture", "b.png"),
            ])
            .unwrap();

        assert!(report.body.contains("\\label{fig:architecture}"));
        assert!(report.body.contains("\\label{fig:architecture_1}"));
        assert_eq!(report.labels.len(), 2);
        assert!(report.body.contains("\\caption{Architecture}"));
        assert!(report.body.contains("]{a.png}"));
        assert!(report.body.contains("]{b.png}"));
    }

    #[test]
    fn test_missing_image_is_a_warning() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        let report = Renderer::new(&config)
            .with_source_dir(dir.path())
            .render(&[
                Block::paragraph(vec![Inline::text("before")]),
                Block::image("Gone", "missing.png"),
                Block::paragraph(vec![Inline::text("after")]),
            ])
            .unwrap();

        assert!(!report.body.contains("\\includegraphics"));
        assert!(report.body.contains("before"));
        assert!(report.body.contains("after"));
        assert_eq!(report.warnings.len(), 1);
        match &report.warnings[0] {
            Warning::UnresolvableImage { src, reason } => {
                assert_eq!(src, "missing.png");
                assert!(reason.contains("not found"));
            }
            other => panic!("unexpected warning {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_format_without_converter() {
        let dir = TempDir::new().unwrap();
        scratch_image(dir.path(), "diagram.svg");
        let config = Config::default();
        let report = Renderer::new(&config)
            .with_source_dir(dir.path())
            .render(&[Block::image("Diagram", "diagram.svg")])
            .unwrap();
        assert!(report.body.is_empty());
        assert!(matches!(
            &report.warnings[..],
            [Warning::ImageConversionFailed { .. }]
        ));
    }

    #[test]
    fn test_path_outside_output_dir_is_absolute() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        scratch_image(source.path(), "photo.jpg");

        let config = Config::default();
        let report = Renderer::new(&config)
            .with_source_dir(source.path())
            .with_output_dir(output.path())
            .render(&[Block::image("Photo", "photo.jpg")])
            .unwrap();
        let canonical = fs::canonicalize(source.path().join("photo.jpg")).unwrap();
        let expected = format!("]{{{}}}", canonical.to_string_lossy().replace('\\', "/"));
        assert!(report.body.contains(&expected), "body: {}", report.body);
    }

    /// Resolver that records prefetch calls and emits a fixed file
    struct RecordingResolver {
        emitted: PathBuf,
        prefetched: Mutex<Vec<PathBuf>>,
    }

    impl ImageResolver for RecordingResolver {
        fn name(&self) -> &str {
            "recording"
        }

        fn resolve(&self, _source: &Path) -> ImageOutcome {
            ImageOutcome::Emitted(self.emitted.clone())
        }

        fn prefetch(&self, sources: &[PathBuf]) {
            self.prefetched.lock().unwrap().extend_from_slice(sources);
        }
    }

    #[test]
    fn test_resolver_is_prefetched_with_existing_images() {
        let dir = TempDir::new().unwrap();
        scratch_image(dir.path(), "one.svg");
        let converted_dir = dir.path().join("converted-assets");
        fs::create_dir_all(&converted_dir).unwrap();
        let emitted = scratch_image(&converted_dir, "one-0123456789abcdef.png");

        let resolver = RecordingResolver {
            emitted,
            prefetched: Mutex::new(Vec::new()),
        };
        let config = Config::default();
        let report = Renderer::new(&config)
            .with_images(&resolver)
            .with_source_dir(dir.path())
            .with_output_dir(dir.path())
            .render(&[
                Block::image("One", "one.svg"),
                Block::image("Remote", "https://example.com/x.png"),
                Block::image("Missing", "nope.svg"),
            ])
            .unwrap();

        let prefetched = resolver.prefetched.lock().unwrap();
        assert_eq!(prefetched.len(), 1);
        assert!(prefetched[0].ends_with("one.svg"));
        assert!(report
            .body
            .contains("]{converted-assets/one-0123456789abcdef.png}"));
        assert_eq!(report.warnings.len(), 2);
    }
}

// =============================================================================
// DETERMINISM
// =============================================================================

#[test]
fn test_render_is_idempotent() {
    let tree = vec![
        Block::heading(1, "Title"),
        Block::paragraph(vec![
            Inline::text("Some "),
            Inline::Strong(vec![Inline::text("bold")]),
            Inline::Math("a^2".to_string()),
        ]),
        Block::code(Some("python"), "print('hi')"),
        Block::math("\\sum_{i=1}^n i", false),
        Block::heading(8, "Very deep"),
    ];
    let config = Config::default();
    let first = render(&tree, &config).unwrap();
    let second = render(&tree, &config).unwrap();
    assert_eq!(first, second);
    assert_eq!(bind(&first.body, &config), bind(&second.body, &config));
}

#[test]
fn test_tree_from_json() {
    let json = r#"[
        {"heading": {"depth": 2, "content": [{"text": "From JSON"}]}},
        {"code_block": {"language": "JS", "content": "let x = 1;"}},
        "thematic_break"
    ]"#;
    let tree: Vec<Block> = serde_json::from_str(json).unwrap();
    let body = render(&tree, &Config::default()).unwrap().body;
    assert!(body.contains("\\subsection{From JSON}"));
    assert!(body.contains("[language=Java]"));
    assert!(body.contains("\\rule{\\textwidth}"));
}
