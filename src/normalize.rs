//! De-indentation of Markdown embedded in HTML.
//!
//! Markdown written inside an indented element picks up the HTML's
//! indentation, which would otherwise turn every line into a code block.
//! Normalization removes the shared indentation before conversion:
//!
//! 1. Whitespace-only lines are collapsed (`"a\n   \nb"` becomes `"a\nb"`).
//! 2. The indentation width is taken from the leading whitespace run: the
//!    number of whitespace characters after its last newline.
//! 3. That many whitespace characters are stripped from the start of every
//!    line that has at least that many.

use regex::Regex;
use std::sync::LazyLock;

static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Normalize embedded Markdown with blank-line collapsing enabled.
///
/// # Example
///
/// ```rust
/// use data_markdown::normalize_indentation;
///
/// let md = normalize_indentation("\n    # Title\n    Body text\n");
/// assert_eq!(md, "\n# Title\nBody text\n");
/// ```
pub fn normalize_indentation(text: &str) -> String {
    normalize_with(text, true)
}

/// Normalize embedded Markdown, optionally keeping whitespace-only lines.
pub fn normalize_with(text: &str, collapse_blank_lines: bool) -> String {
    let text = if collapse_blank_lines {
        collapse_blank_lines_in(text)
    } else {
        text.to_string()
    };

    let width = indentation_width(&text);
    strip_indentation(&text, width)
}

/// Replace every newline-whitespace-newline run with a single newline.
pub fn collapse_blank_lines_in(text: &str) -> String {
    BLANK_LINES.replace_all(text, "\n").into_owned()
}

/// Width of the shared indentation, measured on the leading whitespace run.
pub fn indentation_width(text: &str) -> usize {
    let leading: String = text.chars().take_while(|c| c.is_whitespace()).collect();
    match leading.rfind('\n') {
        Some(pos) => leading[pos + 1..].chars().count(),
        None => leading.chars().count(),
    }
}

/// Strip `width` whitespace characters from the start of each line.
pub fn strip_indentation(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }

    text.split('\n')
        .map(|line| strip_line(line, width))
        .collect::<Vec<_>>()
        .join("\n")
}

// Lines with fewer than `width` leading whitespace characters are kept whole.
fn strip_line(line: &str, width: usize) -> &str {
    let mut chars = line.char_indices();
    let mut cut = 0;

    for _ in 0..width {
        match chars.next() {
            Some((i, c)) if c.is_whitespace() => cut = i + c.len_utf8(),
            _ => return line,
        }
    }

    &line[cut..]
}
