//! Keyword abbreviation for compressed C# output.

use regex::Regex;
use std::sync::LazyLock;

// `private` and `partial` are dropped outright.
// `internal` is never touched: `int` would collide with the type keyword.
static STANDARD: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\bprivate\s+", ""),
        (r"\bprotected\s+", "prot "),
        (r"\bpublic\s+", "pub "),
        (r"\bstatic\s+", "stat "),
        (r"\bvirtual\s+", "virt "),
        (r"\babstract\s+", "abs "),
        (r"\boverride\s+", "ovr "),
        (r"\breadonly\s+", "ro "),
        (r"\bsealed\s+", "seal "),
        (r"\bpartial\s+", ""),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

static EXTREME: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [(r"\breturn\s+", "ret "), (r"\bSerializeField\b", "SF")]
        .into_iter()
        .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
        .collect()
});

pub fn shorten_modifiers(line: &str, extreme: bool) -> String {
    let mut out = line.to_string();
    let extra: &[(Regex, &str)] = if extreme { EXTREME.as_slice() } else { &[] };
    for (re, replacement) in STANDARD.iter().chain(extra) {
        if re.is_match(&out) {
            out = re.replace_all(&out, *replacement).into_owned();
        }
    }
    out
}

/// Header legend describing the abbreviations above.
pub fn legend(extreme: bool) -> Vec<String> {
    let mut lines = vec![
        "MODIFIER LEGEND:".to_string(),
        "  pub=public | prot=protected | stat=static".to_string(),
        "  virt=virtual | abs=abstract | ovr=override".to_string(),
        "  ro=readonly | seal=sealed".to_string(),
        "  (private & partial are omitted, internal kept as-is)".to_string(),
    ];
    if extreme {
        lines.push("  ret=return | SF=SerializeField".to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_shortening() {
        assert_eq!(
            shorten_modifiers("public static void Foo()", false),
            "pub stat void Foo()"
        );
        assert_eq!(
            shorten_modifiers("    protected override void Awake()", false),
            "    prot ovr void Awake()"
        );
        assert_eq!(shorten_modifiers("private int count;", false), "int count;");
        assert_eq!(
            shorten_modifiers("public sealed partial class Tile", false),
            "pub seal class Tile"
        );
    }

    #[test]
    fn test_internal_is_never_shortened() {
        let out = shorten_modifiers("internal static int Count;", true);
        assert_eq!(out, "internal stat int Count;");
        assert!(!out.starts_with("int "));
    }

    #[test]
    fn test_word_boundaries() {
        // identifiers that merely contain a keyword are untouched
        assert_eq!(
            shorten_modifiers("var publicKey = staticData;", false),
            "var publicKey = staticData;"
        );
        assert_eq!(shorten_modifiers("returnValue = 1;", true), "returnValue = 1;");
    }

    #[test]
    fn test_extreme_mode() {
        assert_eq!(shorten_modifiers("return count;", false), "return count;");
        assert_eq!(shorten_modifiers("return count;", true), "ret count;");
        assert_eq!(
            shorten_modifiers("[SerializeField] private float speed;", true),
            "[SF] float speed;"
        );
    }

    #[test]
    fn test_shortening_is_stable() {
        let once = shorten_modifiers("public virtual readonly string Name", true);
        assert_eq!(shorten_modifiers(&once, true), once);
    }

    #[test]
    fn test_legend() {
        assert_eq!(legend(false).len(), 5);
        assert!(legend(true).last().unwrap().contains("SF=SerializeField"));
    }
}
