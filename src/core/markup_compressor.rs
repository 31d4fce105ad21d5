//! Comment and whitespace stripping for UI style sheets and markup.
//!
//! Structure is left alone so the result stays valid for human review.

use crate::domain::models::CompressedUnit;
use crate::domain::settings::CompressionSettings;
use regex::Regex;
use std::sync::LazyLock;

static RE_SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"  +").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentSyntax {
    pub open: &'static str,
    pub close: &'static str,
    /// Whether runs of interior spaces may be collapsed.
    pub collapse_spaces: bool,
}

pub const STYLE_SHEET: CommentSyntax = CommentSyntax {
    open: "/*",
    close: "*/",
    collapse_spaces: true,
};

pub const MARKUP: CommentSyntax = CommentSyntax {
    open: "<!--",
    close: "-->",
    collapse_spaces: false,
};

pub fn compress_markup(
    text: &str,
    syntax: CommentSyntax,
    settings: &CompressionSettings,
) -> CompressedUnit {
    let mut output: Vec<String> = Vec::new();
    let mut in_comment = false;
    let mut prev_was_empty = false;

    for raw in text.split('\n') {
        let mut line = raw.to_string();

        if settings.remove_comments {
            let (code, still_open) = strip_comments(raw, syntax, in_comment);
            let had_comment = in_comment || still_open || code.len() != raw.len();
            in_comment = still_open;
            if had_comment && code.trim().is_empty() {
                continue;
            }
            line = code;
        }

        if line.trim().is_empty() {
            if !prev_was_empty {
                output.push(String::new());
                prev_was_empty = true;
            }
            continue;
        }
        prev_was_empty = false;

        if syntax.collapse_spaces && settings.compress_whitespace {
            line = RE_SPACE_RUN.replace_all(&line, " ").trim().to_string();
        } else if settings.trim_whitespace {
            line.truncate(line.trim_end().len());
        }
        output.push(line);
    }

    while output.last().is_some_and(|l| l.trim().is_empty()) {
        output.pop();
    }

    CompressedUnit::from_lines(text, output)
}

/// Returns the text outside comments and whether a comment is still open at
/// the end of the line.
fn strip_comments(line: &str, syntax: CommentSyntax, mut in_comment: bool) -> (String, bool) {
    let mut code = String::with_capacity(line.len());
    let mut rest = line;
    loop {
        if in_comment {
            match rest.find(syntax.close) {
                Some(pos) => {
                    rest = &rest[pos + syntax.close.len()..];
                    in_comment = false;
                }
                None => return (code, true),
            }
        } else {
            match rest.find(syntax.open) {
                Some(pos) => {
                    code.push_str(&rest[..pos]);
                    rest = &rest[pos + syntax.open.len()..];
                    in_comment = true;
                }
                None => {
                    code.push_str(rest);
                    return (code, false);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stripping() -> CompressionSettings {
        CompressionSettings {
            enabled: true,
            remove_comments: true,
            ..CompressionSettings::default()
        }
    }

    #[test]
    fn test_style_sheet_comments_removed() {
        let text = "/* header */\n.tile {\n    color: red; /* inline */\n}\n/* multi\n   line */\n\n\n.row { }\n\n";
        let out = compress_markup(text, STYLE_SHEET, &stripping()).text();
        assert_eq!(out, ".tile {\n    color: red;\n}\n\n.row { }");
    }

    #[test]
    fn test_markup_comments_removed() {
        let text = "<ui:UXML>\n    <!-- toolbar -->\n    <ui:Button text=\"Go\" /> <!-- a\n    b -->\n</ui:UXML>";
        let out = compress_markup(text, MARKUP, &stripping()).text();
        assert_eq!(out, "<ui:UXML>\n    <ui:Button text=\"Go\" />\n</ui:UXML>");
    }

    #[test]
    fn test_comments_kept_when_disabled() {
        let settings = CompressionSettings {
            remove_comments: false,
            ..stripping()
        };
        let text = "<!-- keep -->\n<a/>\n\n\n<b/>\n";
        let out = compress_markup(text, MARKUP, &settings).text();
        assert_eq!(out, "<!-- keep -->\n<a/>\n\n<b/>");
    }

    #[test]
    fn test_space_collapse_only_for_style_sheets() {
        let settings = CompressionSettings {
            compress_whitespace: true,
            ..stripping()
        };
        let out = compress_markup("    width:   10px;", STYLE_SHEET, &settings).text();
        assert_eq!(out, "width: 10px;");

        let out = compress_markup("<a   b=\"1\"/>", MARKUP, &settings).text();
        assert_eq!(out, "<a   b=\"1\"/>");
    }

    #[test]
    fn test_size_never_grows() {
        let text = "<!-- a -->\n<x>   \n\n\n</x>\n";
        let unit = compress_markup(text, MARKUP, &stripping());
        assert!(unit.compressed_len <= unit.original_len);
    }
}
