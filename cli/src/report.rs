use annotate_snippets::{Level, Renderer, Snippet};

use linre::SyntaxError;

/// Renders a syntax error in a pattern, pointing at the part of the pattern
/// that caused it.
///
/// ```text
/// error: missing closing )
///  --> pattern:1:2
///   |
/// 1 | a(b
///   |  ^^ missing closing )
/// ```
pub fn syntax_error_report(
    pattern: &str,
    err: &SyntaxError,
    with_colors: bool,
) -> String {
    let title = err.kind().to_string();

    // Zero-width spans are extended to the next character, if any.
    let mut span = err.span();
    if span.is_empty() {
        span.end = pattern
            .get(span.start..)
            .and_then(|rest| rest.chars().next())
            .map_or(span.start, |c| span.start + c.len_utf8());
    }

    let message = Level::Error.title(title.as_str()).snippet(
        Snippet::source(pattern)
            .origin("pattern")
            .annotation(Level::Error.span(span).label(title.as_str())),
    );

    let renderer =
        if with_colors { Renderer::styled() } else { Renderer::plain() };

    let rendered = renderer.render(message).to_string();
    rendered
}
