//! Line-oriented compression for C# sources.
//!
//! A single forward pass over physical lines with one line of lookahead.
//! Every line is handled by exactly one state:
//!
//! - `Default` runs the filter chain (doc comments, attributes, comments,
//!   regions, common usings, signature detection, namespace merge, blank
//!   collapse, modifier shortening, trim, re-indent, brace collapse).
//! - `InBlockComment` drops or passes through lines until `*/`.
//! - `CollectingSignature` gathers a method header spread over several lines
//!   and emits it as one line once the closing parenthesis shows up.
//!
//! Signature detection is a keyword heuristic, not a parser: an unmatched `(`
//! next to a type keyword inside a string literal will trigger it too.

use crate::core::modifiers::shorten_modifiers;
use crate::domain::models::CompressedUnit;
use crate::domain::settings::CompressionSettings;
use regex::Regex;
use std::sync::LazyLock;

static RE_SIGNATURE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(public|private|protected|internal|static|virtual|override|abstract|void|string|int|float|bool|double|decimal|IEnumerator|Task|async)\b",
    )
    .unwrap()
});

// `SF` is the shortened `SerializeField`, so already-compressed text keeps it too.
static RE_SHORT_SERIALIZE_FIELD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bSF\b").unwrap());

const PRESERVED_ATTRIBUTES: [&str; 6] = ["SerializeField", "Header", "Tooltip", "Range", "Min", "Max"];
const PRIORITY_MARKERS: [&str; 5] = ["TODO", "FIXME", "HACK", "NOTE", "BUG"];

/// Source indentation is assumed to use 4 columns per level; tabs count as one level.
const SOURCE_INDENT_UNIT: usize = 4;

enum LineState {
    Default,
    InBlockComment,
    CollectingSignature(Vec<String>),
}

struct CodeCompressor<'a> {
    settings: &'a CompressionSettings,
    state: LineState,
    output: Vec<String>,
}

pub fn compress_code(text: &str, settings: &CompressionSettings) -> CompressedUnit {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut machine = CodeCompressor {
        settings,
        state: LineState::Default,
        output: Vec::with_capacity(lines.len()),
    };

    let mut i = 0;
    while i < lines.len() {
        i += machine.step(lines[i], lines.get(i + 1).copied());
    }

    CompressedUnit::from_lines(text, machine.finish())
}

impl CodeCompressor<'_> {
    /// Feeds one line, returning how many input lines were consumed.
    fn step(&mut self, line: &str, next: Option<&str>) -> usize {
        match std::mem::replace(&mut self.state, LineState::Default) {
            LineState::Default => self.default_line(line, next),
            LineState::InBlockComment => {
                self.block_comment_line(line);
                1
            }
            LineState::CollectingSignature(parts) => {
                self.signature_line(parts, line);
                1
            }
        }
    }

    fn finish(mut self) -> Vec<String> {
        if let LineState::CollectingSignature(parts) =
            std::mem::replace(&mut self.state, LineState::Default)
        {
            self.emit_signature(parts);
        }
        while self.output.last().is_some_and(|l| l.trim().is_empty()) {
            self.output.pop();
        }
        self.output
    }

    fn default_line(&mut self, line: &str, next: Option<&str>) -> usize {
        if !line.trim_start().starts_with("//") && line.contains("/*") {
            let (code, opens) = strip_block_comments(line);
            if opens {
                if !self.settings.remove_comments {
                    self.output.push(line.to_string());
                } else if !code.trim().is_empty() {
                    self.filter_chain(&code, None);
                }
                self.state = LineState::InBlockComment;
                return 1;
            }
            if self.settings.remove_comments {
                if code.trim().is_empty() {
                    return 1;
                }
                return self.filter_chain(&code, next);
            }
        }
        self.filter_chain(line, next)
    }

    fn block_comment_line(&mut self, line: &str) {
        match line.find("*/") {
            Some(pos) if self.settings.remove_comments => {
                let rest = &line[pos + 2..];
                if !rest.trim().is_empty() {
                    self.default_line(rest, None);
                }
            }
            Some(_) => self.output.push(line.to_string()),
            None => {
                if !self.settings.remove_comments {
                    self.output.push(line.to_string());
                }
                self.state = LineState::InBlockComment;
            }
        }
    }

    fn signature_line(&mut self, mut parts: Vec<String>, line: &str) {
        let trimmed = line.trim();
        parts.push(trimmed.to_string());
        if trimmed.contains(')') {
            self.emit_signature(parts);
        } else {
            self.state = LineState::CollectingSignature(parts);
        }
    }

    fn emit_signature(&mut self, parts: Vec<String>) {
        let indent: String = parts
            .first()
            .map(|first| first.chars().take_while(|c| c.is_whitespace()).collect())
            .unwrap_or_default();
        let joined = parts
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let mut merged = format!("{}{}", indent, joined);
        if self.settings.shorten_modifiers {
            merged = shorten_modifiers(&merged, self.settings.extreme_compression);
        }
        if self.settings.reindents() {
            merged = reindent(&merged, self.settings.indent_size);
        }
        self.output.push(merged);
    }

    fn filter_chain(&mut self, line: &str, next: Option<&str>) -> usize {
        let s = self.settings;
        let trimmed = line.trim();

        if s.remove_xml_docs && trimmed.starts_with("///") {
            return 1;
        }
        if s.remove_attributes && is_attribute_line(trimmed) {
            return 1;
        }
        if s.remove_comments && trimmed.starts_with("//") && !has_priority_marker(trimmed) {
            return 1;
        }
        if s.remove_regions && (trimmed.starts_with("#region") || trimmed.starts_with("#endregion"))
        {
            return 1;
        }
        if s.remove_using_statements && s.common_usings.iter().any(|u| u.trim() == trimmed) {
            return 1;
        }

        if s.compress_method_signatures && opens_signature(trimmed) {
            self.state = LineState::CollectingSignature(vec![line.trim_end().to_string()]);
            return 1;
        }

        if s.compress_namespaces
            && is_namespace_declaration(trimmed)
            && next.is_some_and(|n| n.trim() == "{")
        {
            self.output.push(format!("{} {{", line.trim_end()));
            return 2;
        }

        if s.remove_empty_lines && trimmed.is_empty() && self.last_is_blank() {
            return 1;
        }

        let mut out = line.to_string();
        if s.shorten_modifiers {
            out = shorten_modifiers(&out, s.extreme_compression);
        }
        if s.trim_whitespace {
            out.truncate(out.trim_end().len());
        }
        if s.reindents() {
            out = reindent(&out, s.indent_size);
        }

        if s.compress_braces && trimmed == "{" {
            if let Some(last) = self.output.last_mut() {
                let last_trimmed = last.trim();
                if !last_trimmed.is_empty()
                    && !last_trimmed.ends_with('{')
                    && !last_trimmed.starts_with("//")
                {
                    last.truncate(last.trim_end().len());
                    last.push_str(" {");
                    return 1;
                }
            }
        }

        self.output.push(out);
        1
    }

    fn last_is_blank(&self) -> bool {
        self.output.last().is_some_and(|l| l.trim().is_empty())
    }
}

/// Removes `/* ... */` spans closed on this line. The flag reports an opener
/// left unclosed, in which case the returned code is the text before it.
fn strip_block_comments(line: &str) -> (String, bool) {
    let mut code = String::with_capacity(line.len());
    let mut rest = line;
    loop {
        let Some(open) = rest.find("/*") else {
            code.push_str(rest);
            return (code, false);
        };
        code.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find("*/") {
            Some(close) => rest = &after[close + 2..],
            None => return (code, true),
        }
    }
}

fn is_attribute_line(trimmed: &str) -> bool {
    trimmed.starts_with('[')
        && trimmed.ends_with(']')
        && !PRESERVED_ATTRIBUTES.iter().any(|attr| trimmed.contains(attr))
        && !RE_SHORT_SERIALIZE_FIELD.is_match(trimmed)
}

fn has_priority_marker(trimmed: &str) -> bool {
    let upper = trimmed.to_uppercase();
    PRIORITY_MARKERS.iter().any(|marker| upper.contains(marker))
}

fn opens_signature(trimmed: &str) -> bool {
    trimmed.contains('(') && !trimmed.contains(')') && RE_SIGNATURE_KEYWORD.is_match(trimmed)
}

fn is_namespace_declaration(trimmed: &str) -> bool {
    trimmed
        .strip_prefix("namespace")
        .is_some_and(|rest| rest.starts_with(char::is_whitespace))
}

/// Rewrites leading whitespace at `unit` spaces per level. Lossy: anything
/// that is not a whole source level is dropped.
fn reindent(line: &str, unit: usize) -> String {
    let body = line.trim_start();
    if body.is_empty() {
        return line.to_string();
    }
    let leading = &line[..line.len() - body.len()];
    let width: usize = leading
        .chars()
        .map(|c| if c == '\t' { SOURCE_INDENT_UNIT } else { 1 })
        .sum();
    format!("{}{}", " ".repeat(width / SOURCE_INDENT_UNIT * unit), body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "using System;
using UnityEngine;
using Garden.Tiles;

namespace Garden.Player
{
    /// <summary>
    /// Moves the gardener around.
    /// </summary>
    [RequireComponent(typeof(Rigidbody2D))]
    public class GardenerController : MonoBehaviour
    {
        #region Fields
        [SerializeField] private float speed = 3f;
        private Rigidbody2D body;


        // cached for later
        // TODO handle knockback
        #endregion

        /* multi
           line */
        protected override Vector2 Move(Vector2 direction,
                                        float multiplier)
        {
            body.velocity = direction * speed * multiplier; /* inline */
            return body.velocity;
        }
    }
}

";

    fn compress(text: &str, settings: &CompressionSettings) -> String {
        compress_code(text, settings).text()
    }

    fn no_reindent() -> CompressionSettings {
        CompressionSettings {
            reduce_indentation: false,
            extreme_compression: false,
            ..CompressionSettings::aggressive()
        }
    }

    #[test]
    fn test_full_pipeline() {
        let out = compress(SAMPLE, &CompressionSettings::aggressive());
        let expected = "using Garden.Tiles;

namespace Garden.Player {
 pub class GardenerController : MonoBehaviour {
  [SF] float speed = 3f;
  Rigidbody2D body;

  // TODO handle knockback

  prot ovr Vector2 Move(Vector2 direction, float multiplier) {
   body.velocity = direction * speed * multiplier;
   ret body.velocity;
  }
 }
}";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_plain_comment_removed_priority_comment_kept() {
        let settings = no_reindent();
        let out = compress("int a;\n// hello\nint b;", &settings);
        assert_eq!(out, "int a;\nint b;");

        let out = compress("int a;\n// TODO fix this\nint b;", &settings);
        assert_eq!(out, "int a;\n// TODO fix this\nint b;");
    }

    #[test]
    fn test_comments_kept_when_removal_disabled() {
        let settings = CompressionSettings {
            remove_comments: false,
            ..no_reindent()
        };
        let text = "int a;\n/* start\n   public void X(\n*/\n// hello\nint b;";
        assert_eq!(compress(text, &settings), text);
    }

    #[test]
    fn test_block_comment_edges_keep_code() {
        let settings = no_reindent();
        let out = compress("int a; /* open\nstill comment\nclose */ int b;\nint c;", &settings);
        assert_eq!(out, "int a;\n int b;\nint c;");

        let out = compress("int a /* x */ = /* y */ 1;", &settings);
        assert_eq!(out, "int a  =  1;");
    }

    #[test]
    fn test_modifier_shortening_in_chain() {
        let settings = CompressionSettings {
            extreme_compression: false,
            reduce_indentation: false,
            ..CompressionSettings::default()
        };
        let out = compress("public static void Foo()", &settings);
        assert!(out.contains("pub stat void Foo()"));

        let out = compress("internal int count;", &settings);
        assert_eq!(out, "internal int count;");
    }

    #[test]
    fn test_attribute_allow_list() {
        let settings = no_reindent();
        let text = "[RequireComponent(typeof(Collider))]\n[Header(\"Movement\")]\n[Range(0, 1)]\nfloat t;";
        assert_eq!(compress(text, &settings), "[Header(\"Movement\")]\n[Range(0, 1)]\nfloat t;");

        let shortened = "[SF]\n[SFX]\nfloat t;";
        assert_eq!(compress(shortened, &settings), "[SF]\nfloat t;");
    }

    #[test]
    fn test_namespace_merge_consumes_brace_line() {
        let settings = CompressionSettings {
            compress_braces: false,
            ..no_reindent()
        };
        let out = compress("namespace Garden.Genes\n{\n    class A {}\n}", &settings);
        assert_eq!(out, "namespace Garden.Genes {\n    class A {}\n}");
    }

    #[test]
    fn test_brace_collapse() {
        let settings = no_reindent();
        let out = compress("void Tick()\n{\n    {\n    }\n}", &settings);
        assert_eq!(out, "void Tick() {\n    {\n    }\n}");
    }

    #[test]
    fn test_brace_not_appended_to_comment() {
        let settings = no_reindent();
        let out = compress("// NOTE keep\n{\n}", &settings);
        assert_eq!(out, "// NOTE keep\n{\n}");
    }

    #[test]
    fn test_brace_collapse_drops_carriage_return() {
        let settings = CompressionSettings {
            trim_whitespace: false,
            ..no_reindent()
        };
        let out = compress("void F()\r\n{\r\n}\r\n", &settings);
        assert_eq!(out, "void F() {\n}\r");
    }

    #[test]
    fn test_signature_keywords_match_whole_words() {
        assert!(opens_signature("public void Grow("));
        assert!(opens_signature("IEnumerator Fade(float t,"));
        assert!(!opens_signature("var printer = Make("));
        assert!(!opens_signature("Voidwalker.Spawn("));
    }

    #[test]
    fn test_signature_merge() {
        let settings = no_reindent();
        let text = "    public IEnumerator Grow(\n        float seconds,\n        int stages)\n    {\n    }";
        let out = compress(text, &settings);
        assert_eq!(out, "    pub IEnumerator Grow( float seconds, int stages) {\n    }");
    }

    #[test]
    fn test_unterminated_signature_is_flushed() {
        let settings = no_reindent();
        let out = compress("public void Broken(int a,\n  int b", &settings);
        assert_eq!(out, "pub void Broken(int a, int b");
    }

    #[test]
    fn test_blank_runs_collapse_to_one() {
        let settings = no_reindent();
        let out = compress("a();\n\n\n\nb();\n\n", &settings);
        assert_eq!(out, "a();\n\nb();");
    }

    #[test]
    fn test_reindent() {
        assert_eq!(reindent("        x", 1), "  x");
        assert_eq!(reindent("\t\tx", 1), "  x");
        assert_eq!(reindent("      x", 1), " x");
        assert_eq!(reindent("        x", 2), "    x");
        assert_eq!(reindent("   ", 1), "   ");
    }

    #[test]
    fn test_all_toggles_disabled_is_identity() {
        let settings = CompressionSettings::disabled_toggles();
        let unit = compress_code(SAMPLE, &settings);
        assert_eq!(unit.text(), SAMPLE.trim_end_matches('\n'));
        assert_eq!(unit.compressed_len, SAMPLE.trim_end_matches('\n').chars().count());
    }

    #[test]
    fn test_size_never_grows() {
        let configs = [
            CompressionSettings::aggressive(),
            CompressionSettings::default(),
            no_reindent(),
            CompressionSettings {
                remove_comments: false,
                ..CompressionSettings::aggressive()
            },
        ];
        for settings in &configs {
            let unit = compress_code(SAMPLE, settings);
            assert!(unit.compressed_len <= unit.original_len);
        }
    }

    #[test]
    fn test_recompression_is_stable() {
        let configs = [
            no_reindent(),
            CompressionSettings {
                indent_size: 4,
                ..CompressionSettings::aggressive()
            },
        ];
        let standalone_attribute = "class A\n{\n    [SerializeField]\n    private float speed;\n}";
        for settings in &configs {
            for text in [SAMPLE, standalone_attribute] {
                let once = compress(text, settings);
                let twice = compress(&once, settings);
                assert_eq!(once, twice);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let settings = CompressionSettings::aggressive();
        assert_eq!(compress(SAMPLE, &settings), compress(SAMPLE, &settings));
    }
}
