//! README rendering and the one-paragraph plain-text summary shown on
//! project cards.
//!
//! The summary is a line-oriented heuristic, not a markdown parser. Nested
//! or malformed markup can leak through.

use pulldown_cmark::Options;
use pulldown_cmark::Parser;
use regex::Regex;
use std::sync::LazyLock;

/// Longest summary kept verbatim, in characters.
pub const SUMMARY_LIMIT: usize = 250;
pub const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReadme {
    pub html: String,
    pub summary: String,
}

#[allow(clippy::expect_used)]
fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("summary patterns are valid")
}

// Applied in order; fenced blocks go first so their backticks don't feed the
// inline-code rule, images before links for the same reason.
static SUBSTITUTIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (re(r"(?s)```.*?```"), ""),
        (re(r"!\[[^\]]*\]\([^)]*\)"), ""),
        (re(r"\[([^\]]+)\]\([^)]*\)"), "$1"),
        (re(r"(?m)^[ \t]*#+[ \t]+"), ""),
        (re(r"\*\*([^*]+)\*\*"), "$1"),
        (re(r"\*([^*]+)\*"), "$1"),
        (re(r"`([^`]+)`"), "$1"),
        (re(r"(?m)^[ \t]*>[ \t]?"), ""),
    ]
});

static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| re(r"\n[ \t\r]*\n"));
static NEWLINE_RUN: LazyLock<Regex> = LazyLock::new(|| re(r"[ \t\r]*\n[\s]*"));

pub fn parse_readme(content: &str) -> ParsedReadme {
    ParsedReadme {
        html: render_html(content),
        summary: summarize(content),
    }
}

pub fn render_html(content: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    let parser = Parser::new_ext(content, options);
    let mut html = String::with_capacity(content.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

/// Strip markdown from `content` and return its first paragraph, cut to
/// [`SUMMARY_LIMIT`] characters at a word boundary.
pub fn summarize(content: &str) -> String {
    let mut text = content.replace("\r\n", "\n");
    for (pattern, replacement) in SUBSTITUTIONS.iter() {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }

    let paragraph = PARAGRAPH_BREAK
        .split(&text)
        .map(str::trim)
        .find(|p| !p.is_empty())
        .unwrap_or_default();
    let paragraph = NEWLINE_RUN.replace_all(paragraph, " ");
    truncate_at_word(paragraph.trim())
}

fn truncate_at_word(text: &str) -> String {
    let Some((cut_at, next)) = text.char_indices().nth(SUMMARY_LIMIT) else {
        return text.to_string();
    };
    let head = &text[..cut_at];
    let kept = if next.is_whitespace() {
        head.trim_end()
    } else {
        match head.rfind(char::is_whitespace) {
            Some(idx) => head[..idx].trim_end(),
            // a single word longer than the limit
            None => head,
        }
    };
    format!("{kept}{ELLIPSIS}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn short_paragraph_passes_through() {
        let input = "A small tool that keeps track of side projects.";
        assert_eq!(summarize(input), input);
    }

    #[test]
    fn long_paragraph_is_cut_at_a_word_boundary() {
        let words = "lorem ipsum dolor sit amet consectetur ";
        let input: String = words.repeat(20).chars().take(400).collect();
        let summary = summarize(&input);

        assert!(summary.chars().count() <= SUMMARY_LIMIT + ELLIPSIS.len());
        assert!(summary.ends_with(ELLIPSIS));
        let body = summary.trim_end_matches(ELLIPSIS);
        assert!(input.starts_with(body));
        // the character after the kept text in the input is whitespace
        let next = input[body.len()..].chars().next();
        assert!(next.is_some_and(char::is_whitespace));
    }

    #[test]
    fn exactly_the_limit_is_not_truncated() {
        let input = "a".repeat(SUMMARY_LIMIT);
        assert_eq!(summarize(&input), input);
    }

    #[test]
    fn cut_landing_on_a_word_end_keeps_that_word() {
        let input = format!("{} tail", "x".repeat(SUMMARY_LIMIT));
        assert_eq!(summarize(&input), format!("{}{ELLIPSIS}", "x".repeat(SUMMARY_LIMIT)));
    }

    #[test]
    fn markdown_is_stripped_and_first_paragraph_taken() {
        let input = "# Devdeck\n\n> A **fast** dashboard for *your* [projects](https://example.com).\nUse `devdeck scan`.\n\n## Install\n\nRun it.";
        assert_eq!(summarize(input), "Devdeck");

        let input = "![logo](logo.png)\nA **fast** dashboard for *your* [projects](https://x.dev).\nUse `devdeck scan`.\n\nSecond paragraph.";
        assert_eq!(
            summarize(input),
            "A fast dashboard for your projects. Use devdeck scan."
        );
    }

    #[test]
    fn fenced_code_is_removed() {
        let input = "```sh\ncargo install devdeck\n```\n\nInstall with cargo.";
        assert_eq!(summarize(input), "Install with cargo.");
    }

    #[test]
    fn blockquote_markers_are_removed() {
        assert_eq!(summarize("> quoted\n> lines"), "quoted lines");
    }

    #[test]
    fn multibyte_text_is_cut_on_char_boundaries() {
        let input = "é".repeat(300);
        let summary = summarize(&input);
        assert_eq!(summary.chars().count(), SUMMARY_LIMIT + ELLIPSIS.len());
    }

    #[test]
    fn html_is_rendered() {
        let parsed = parse_readme("# Title\n\nBody");
        assert!(parsed.html.contains("<h1>Title</h1>"));
        assert_eq!(parsed.summary, "Title");
    }
}
