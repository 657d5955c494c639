//! Tabular rendering
//!
//! Turns already-rendered cell text into a `tabular` environment wrapped in a
//! non-floating `table`. Cell text must be escaped by the caller.

use texdok_ast::Alignment;

/// Rule style of the emitted table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableStyle {
    /// `\hline` rules and `|` column separators
    #[default]
    Grid,
    /// booktabs `\toprule` / `\midrule` / `\bottomrule`
    Booktabs,
}

/// Column specifier letter for an alignment
pub fn column_letter(alignment: Alignment) -> char {
    match alignment {
        Alignment::Left | Alignment::Default => 'l',
        Alignment::Center => 'c',
        Alignment::Right => 'r',
    }
}

/// Column spec string, one letter per column in source order
///
/// `columns` is the header length; missing alignments count as `Default`.
pub fn column_spec(alignments: &[Alignment], columns: usize, style: TableStyle) -> String {
    let letters = (0..columns).map(|i| {
        column_letter(alignments.get(i).copied().unwrap_or_default())
    });
    match style {
        TableStyle::Grid => {
            let mut spec = String::from("|");
            for letter in letters {
                spec.push(letter);
                spec.push('|');
            }
            spec
        }
        TableStyle::Booktabs => letters.collect(),
    }
}

/// Join rendered cells into one row terminated by `\\`
pub fn row_line(cells: &[String]) -> String {
    format!("{} \\\\", cells.join(" & "))
}

/// Render a table from escaped header and body cells
pub fn render_table(
    alignments: &[Alignment],
    header: &[String],
    rows: &[Vec<String>],
    style: TableStyle,
) -> String {
    let (top, mid, bottom) = match style {
        TableStyle::Grid => ("\\hline", "\\hline", "\\hline"),
        TableStyle::Booktabs => ("\\toprule", "\\midrule", "\\bottomrule"),
    };

    let bold_header: Vec<String> = header
        .iter()
        .map(|cell| format!("\\textbf{{{}}}", cell))
        .collect();

    let mut out = String::new();
    out.push_str("\\begin{table}[H]\n\\centering\n");
    out.push_str(&format!(
        "\\begin{{tabular}}{{{}}}\n",
        column_spec(alignments, header.len(), style)
    ));
    out.push_str(top);
    out.push('\n');
    out.push_str(&row_line(&bold_header));
    out.push('\n');
    out.push_str(mid);
    out.push('\n');
    for row in rows {
        out.push_str(&row_line(row));
        out.push('\n');
    }
    if !rows.is_empty() {
        out.push_str(bottom);
        out.push('\n');
    }
    out.push_str("\\end{tabular}\n\\end{table}\n");
    out
}
