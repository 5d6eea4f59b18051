//! Rustc-style source snippets for violations.

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet, renderer::DecorStyle};

use crate::error::Error;
use crate::location::{Location, line_starts};

/// Lines of context drawn above and below the offending line.
const CONTEXT_LINES: usize = 2;

impl Error {
    /// Render this violation against the document it was found in.
    ///
    /// `source` must be the text that was parsed and `path` is only used for the snippet
    /// header. Without a usable location this is the plain [`Display`](std::fmt::Display)
    /// message.
    ///
    /// ```rust
    /// use xml_multimap::MultimapParser;
    ///
    /// let xml = "<map>\n  <bogus/>\n</map>\n";
    /// let report = MultimapParser::new().parse_with_report(xml);
    /// let rendered = report.violations[0].render(xml, "doc.xml");
    /// assert!(rendered.contains("doc.xml:2:3"));
    /// assert!(rendered.contains("unknown element <bogus> inside <map>"));
    /// ```
    pub fn render(&self, source: &str, path: &str) -> String {
        let msg = self.message();
        self.location()
            .and_then(|location| render_window(source, path, &msg, location))
            .unwrap_or_else(|| self.to_string())
    }
}

fn render_window(text: &str, path: &str, msg: &str, location: Location) -> Option<String> {
    let starts = line_starts(text);
    let row = usize::try_from(location.line()).ok()?;
    if row == 0 || row > starts.len() {
        return None;
    }

    let start = location.offset();
    if !text.is_char_boundary(start) {
        return None;
    }
    // One character wide, or a caret at end of line / end of input.
    let end = match text[start..].chars().next() {
        Some('\n' | '\r') | None => start,
        Some(c) => start + c.len_utf8(),
    };

    let first_row = row.saturating_sub(CONTEXT_LINES).max(1);
    let last_row = row.saturating_add(CONTEXT_LINES).min(starts.len());
    let window_start = starts[first_row - 1];
    let window_end = starts.get(last_row).copied().unwrap_or(text.len());
    let window = &text[window_start..window_end];

    let local_start = start.saturating_sub(window_start).min(window.len());
    let local_end = end.saturating_sub(window_start).min(window.len());

    let report = &[Level::ERROR
        .primary_title(format!(
            "line {row} column {}: {msg}",
            location.column()
        ))
        .element(
            Snippet::source(window)
                .line_start(first_row)
                .path(path)
                .fold(false)
                .annotation(
                    AnnotationKind::Primary
                        .span(local_start..local_end)
                        .label(msg),
                ),
        )];

    // Plain ASCII keeps rendered strings stable and free of escape sequences.
    let renderer = Renderer::plain().decor_style(DecorStyle::Ascii);
    Some(renderer.render(report).to_string())
}
