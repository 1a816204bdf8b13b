//! Response text formatting.
//!
//! Server answers may carry stray HTML, escaped newlines, and wrapping
//! quotes. The pipeline first converts a small whitelist (`<b>`, `<i>`,
//! `<br>`) to markdown so emphasis survives, then strips everything else.
//! Each public function iterates its rewrite pass to a fixpoint, which
//! makes the result idempotent by construction: every rewrite strictly
//! shrinks the text, so the loop terminates, and a second application
//! starts at the fixpoint.

use rag_api::Answer;
use regex::Regex;
use std::sync::LazyLock;

static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<b>(.*?)</b>").expect("valid regex"));
static ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<i>(.*?)</i>").expect("valid regex"));
static BR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>?").expect("valid regex"));
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&[a-zA-Z]+;").expect("valid regex"));
static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"(.*)"$"#).expect("valid regex"));

/// One strip pass: tags, entities, escaped newlines, control characters,
/// wrapping quotes, surrounding whitespace.
fn sanitize_pass(text: &str) -> String {
    let text = TAG_RE.replace_all(text, "");
    let text = ENTITY_RE.replace_all(&text, "");
    let text = text.replace("\\n\\n", "\n\n").replace("\\n", "\n");
    let text: String = text
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();
    let text = QUOTED_RE.replace(text.trim(), "$1");
    text.trim().to_string()
}

/// One conversion pass: whitelist HTML to markdown, then strip the rest.
fn format_pass(text: &str) -> String {
    let text = BOLD_RE.replace_all(text, "**$1**");
    let text = ITALIC_RE.replace_all(&text, "*$1*");
    let text = BR_RE.replace_all(&text, "\n");
    sanitize_pass(&text)
}

fn fixpoint(text: &str, pass: fn(&str) -> String) -> String {
    let mut current = text.to_string();
    loop {
        let next = pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Strip HTML tags, entities, and non-printable characters, producing
/// safe plain text. Idempotent.
pub fn sanitize_text(text: &str) -> String {
    fixpoint(text, sanitize_pass)
}

/// Format a raw server answer for display: `<b>`/`<i>`/`<br>` become
/// markdown, everything else is stripped. Idempotent.
pub fn format_response(text: &str) -> String {
    fixpoint(text, format_pass)
}

/// Format an [`Answer`] for display. Structured payloads are rendered as
/// JSON text before formatting.
pub fn format_answer(answer: Answer) -> String {
    format_response(&answer.into_display_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bold_becomes_markdown() {
        assert_eq!(format_response("<b>Hello</b>"), "**Hello**");
    }

    #[test]
    fn test_italic_and_br() {
        assert_eq!(format_response("a<i>b</i><br>c"), "a*b*\nc");
    }

    #[test]
    fn test_unknown_tags_stripped() {
        assert_eq!(format_response("<div>x</div> <script>y</script>"), "x y");
    }

    #[test]
    fn test_entities_stripped() {
        assert_eq!(sanitize_text("a&nbsp;b&amp;c"), "abc");
    }

    #[test]
    fn test_escaped_newlines_unescaped() {
        assert_eq!(sanitize_text("line1\\nline2"), "line1\nline2");
    }

    #[test]
    fn test_wrapping_quotes_removed() {
        assert_eq!(sanitize_text("\"quoted\""), "quoted");
    }

    #[test]
    fn test_control_characters_removed() {
        assert_eq!(sanitize_text("a\u{0}b\u{7}c\nd"), "abc\nd");
    }

    #[test]
    fn test_idempotence_simple() {
        for input in ["<b>Hello</b>", "plain", "  spaced  ", "<i>x</i><br>"] {
            let once = format_response(input);
            assert_eq!(format_response(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_idempotence_adversarial() {
        // Inputs where a single pass would leave strippable residue.
        for input in ["\"\"nested\"\"", "&&amp;amp;;", "<<b>>x", "\"&quot;y&quot;\""] {
            let once = format_response(input);
            assert_eq!(format_response(&once), once, "input: {input:?}");
            let sanitized = sanitize_text(input);
            assert_eq!(sanitize_text(&sanitized), sanitized, "input: {input:?}");
        }
    }

    #[test]
    fn test_format_answer_text() {
        let answer = Answer::from_value(json!({ "text": "<b>Hi</b>" }));
        assert_eq!(format_answer(answer), "**Hi**");
    }

    #[test]
    fn test_format_answer_structured() {
        let answer = Answer::from_value(json!({ "sources": ["a.pdf"] }));
        let formatted = format_answer(answer);
        assert!(formatted.contains("sources"));
        assert!(formatted.contains("a.pdf"));
    }
}
