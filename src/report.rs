//! Text projection of the report pane payload.
//!
//! The backend's report is a trusted HTML document rendered as-is; a
//! terminal cannot embed it, so this module is the single seam where the
//! markup is projected to plain lines. The raw payload stored in the app
//! state is never modified here, and a sanitizer could be inserted at this
//! seam without touching the conversation controller.

use std::sync::LazyLock;

use regex::Regex;

// One alternative per tag so an opener is only ever closed by its own
// closing tag; script blocks may legally contain "</style>" and vice versa.
static NON_CONTENT_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script>|<style\b.*?</style>|<head\b.*?</head>").unwrap()
});

// Closing tags of block-level elements and <br> become line breaks so the
// document keeps its vertical structure once tags are gone.
static BLOCK_BREAKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(?:p|div|li|tr|table|section|article|header|footer|h[1-6])\s*>")
        .unwrap()
});

static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

static BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Projects report markup to the lines shown in the report pane.
pub fn to_lines(markup: &str) -> Vec<String> {
    let text = NON_CONTENT_BLOCKS.replace_all(markup, "");
    let text = BLOCK_BREAKS.replace_all(&text, "\n");
    let text = TAGS.replace_all(&text, "");
    let text = decode_entities(&text);

    let trimmed: String = text
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    let collapsed = BLANK_RUNS.replace_all(&trimmed, "\n\n");

    collapsed
        .trim_matches('\n')
        .lines()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_stripped() {
        let lines = to_lines("<div><h1>Apple Inc.</h1><p>Executive summary.</p></div>");
        assert_eq!(lines, vec!["Apple Inc.", "Executive summary."]);
    }

    #[test]
    fn scripts_and_styles_are_dropped() {
        let markup = "<div><style>body { color: red; }</style>\
                      <script src=\"x\">alert(1)</script><p>Safe text</p></div>";
        let lines = to_lines(markup);
        assert_eq!(lines, vec!["Safe text"]);
    }

    #[test]
    fn script_containing_a_foreign_closer_ends_at_its_own_closing_tag() {
        let markup = "<div><script>var css = \"</style>\";</script><p>kept</p></div>";
        let lines = to_lines(markup);
        assert_eq!(lines, vec!["kept"]);
    }

    #[test]
    fn style_nested_in_head_does_not_truncate_the_head_block() {
        let markup = "<head><style>body { color: red; }</style><title>x</title></head>\
                      <div>body text</div>";
        let lines = to_lines(markup);
        assert_eq!(lines, vec!["body text"]);
    }

    #[test]
    fn entities_are_decoded() {
        let lines = to_lines("<p>Risk &amp; Outlook &lt;FY2025&gt;</p>");
        assert_eq!(lines, vec!["Risk & Outlook <FY2025>"]);
    }

    #[test]
    fn br_and_block_closings_become_line_breaks() {
        let lines = to_lines("<div>alpha<br>beta</div><div>gamma</div>");
        assert_eq!(lines, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn blank_runs_collapse_to_one_separator_line() {
        let markup = "<div><p>one</p></div>\n\n\n<div><p>two</p></div>";
        let lines = to_lines(markup);
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn full_document_keeps_only_body_content() {
        let markup = "<!DOCTYPE html><html><head><title>x</title></head>\
                      <body><div>Report body</div></body></html>";
        let lines = to_lines(markup);
        assert_eq!(lines, vec!["Report body"]);
    }
}
