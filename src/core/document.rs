use crate::core::modifiers;
use crate::core::template::TemplateContext;
use crate::domain::models::{FileKind, FileRecord};
use crate::domain::settings::Profile;
use log::debug;
use std::collections::BTreeSet;

pub const BLOCK_SEPARATOR: &str =
    "////////////////////////////////////////////////////////////////////////////////";
pub const SECTION_RULE: &str =
    "================================================================================";
pub const BANNER_RULE: &str =
    "--------------------------------------------------------------------------------";
pub const FILE_MARKER: &str = "// FILE: ";
pub const BODY_TITLE: &str = "FILES";
pub const GLOBAL_SCOPE: &str = "Global Scope";

/// Lines of frame (separator, marker, separator) in front of a file's content.
pub const FRAME_LINES: usize = 3;

const SECTION_BANNER_LINES: usize = 4;

#[derive(Debug, Clone)]
pub struct TocEntry {
    pub record: FileRecord,
    /// 1-based line of the file's first content line.
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub lines: Vec<String>,
    pub body_start: usize,
    pub toc: Vec<TocEntry>,
}

impl AssembledDocument {
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }

    pub fn char_len(&self) -> usize {
        serialized_len(&self.lines)
    }
}

pub fn serialized_len(lines: &[String]) -> usize {
    if lines.is_empty() {
        return 0;
    }
    lines.iter().map(|l| l.chars().count()).sum::<usize>() + lines.len() - 1
}

pub struct DocumentAssembler<'a> {
    profile: &'a Profile,
    tree: Vec<String>,
    body: Vec<String>,
    blocks: Vec<(FileRecord, usize)>,
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(profile: &'a Profile) -> Self {
        Self {
            profile,
            tree: Vec::new(),
            body: Vec::new(),
            blocks: Vec::new(),
        }
    }

    pub fn set_directory_tree(&mut self, tree: Vec<String>) {
        self.tree = tree;
    }

    pub fn push_note(&mut self, note: impl Into<String>) {
        self.body.push(note.into());
    }

    pub fn push_file(&mut self, record: &FileRecord, content: &[String]) {
        self.blocks.push((record.clone(), self.body.len()));
        self.body.push(BLOCK_SEPARATOR.to_string());
        self.body.push(format!("{}{}", FILE_MARKER, record.relative_path));
        self.body.push(BLOCK_SEPARATOR.to_string());
        self.body.extend(content.iter().cloned());
        self.body.push(String::new());
        self.body.push(String::new());
    }

    pub fn finish(self, header: Vec<String>) -> AssembledDocument {
        let budget = header_budget(self.profile);
        let mut header = header;
        header.resize(budget, String::new());

        // The TOC has one line per entry whatever the numbers in it are, so its
        // length can be taken before the numbers are known.
        let toc_len = if self.profile.include_toc {
            let placeholder: Vec<TocEntry> = self
                .blocks
                .iter()
                .map(|(record, _)| TocEntry {
                    record: record.clone(),
                    line: 0,
                })
                .collect();
            render_toc(&placeholder, self.profile).len()
        } else {
            0
        };
        let tree_zone = tree_zone(&self.tree);

        let body_start = budget + toc_len + tree_zone.len() + SECTION_BANNER_LINES;
        let toc: Vec<TocEntry> = self
            .blocks
            .into_iter()
            .map(|(record, offset)| TocEntry {
                record,
                line: body_start + offset + FRAME_LINES + 1,
            })
            .collect();

        let mut lines = Vec::with_capacity(body_start + self.body.len());
        lines.extend(header);
        if self.profile.include_toc {
            lines.extend(render_toc(&toc, self.profile));
        }
        lines.extend(tree_zone);
        lines.push(SECTION_RULE.to_string());
        lines.push(BODY_TITLE.to_string());
        lines.push(SECTION_RULE.to_string());
        lines.push(String::new());
        debug_assert_eq!(lines.len(), body_start);
        lines.extend(self.body);

        debug!(
            "Assembled document: {} lines, body starts at line {}",
            lines.len(),
            body_start + 1
        );

        AssembledDocument {
            lines,
            body_start,
            toc,
        }
    }
}

/// Lines reserved for the header, large enough for the template and legend.
pub fn header_budget(profile: &Profile) -> usize {
    let base = profile
        .header_lines
        .unwrap_or(if profile.compression.enabled { 25 } else { 15 });
    let template_lines = profile.header_text.split('\n').count();
    base.max(template_lines + legend_lines(profile).len())
}

fn legend_lines(profile: &Profile) -> Vec<String> {
    let compression = &profile.compression;
    if !(compression.enabled && compression.shorten_modifiers) {
        return Vec::new();
    }
    let mut lines = vec![String::new()];
    lines.extend(modifiers::legend(compression.extreme_compression));
    lines
}

// May exceed the budget; the assembler truncates.
pub fn render_header(
    profile: &Profile,
    context: &TemplateContext,
    discovered_usings: &BTreeSet<String>,
) -> Vec<String> {
    let mut lines: Vec<String> = context
        .render(&profile.header_text)
        .split('\n')
        .map(str::to_string)
        .collect();
    lines.extend(legend_lines(profile));

    if profile.compression.enabled && !discovered_usings.is_empty() {
        lines.push(String::new());
        lines.push("Project-specific using statements (add these when needed):".to_string());
        lines.extend(discovered_usings.iter().cloned());
    }
    lines
}

pub fn render_toc(entries: &[TocEntry], profile: &Profile) -> Vec<String> {
    let mut toc = vec![
        "TABLE OF CONTENTS:".to_string(),
        "------------------".to_string(),
    ];
    if entries.is_empty() {
        toc.push("No matching files were found.".to_string());
        toc.push(String::new());
        return toc;
    }

    let mut current_group: Option<Option<&str>> = None;
    for entry in entries {
        let record = &entry.record;
        if record.kind == FileKind::Code {
            let namespace = record.namespace.as_deref();
            if current_group != Some(namespace) {
                current_group = Some(namespace);
                toc.push(String::new());
                toc.push(format!("[{}]", namespace.unwrap_or(GLOBAL_SCOPE)));
            }
        }

        let short_path = shorten_path(&record.relative_path, &profile.toc_strip_prefixes);
        let line = if profile.compact_toc && record.kind == FileKind::Code {
            match short_path.rsplit_once('/') {
                Some((dir, _)) => format!("  {} ({}/) L{}", record.primary_type, dir, entry.line),
                None => format!("  {} L{}", record.primary_type, entry.line),
            }
        } else {
            format!("- {} (Line: {})", short_path, entry.line)
        };
        toc.push(line);
    }

    toc.push(String::new());
    toc
}

fn shorten_path<'p>(path: &'p str, prefixes: &[String]) -> &'p str {
    prefixes
        .iter()
        .find_map(|prefix| path.strip_prefix(prefix.as_str()))
        .unwrap_or(path)
}

fn tree_zone(tree: &[String]) -> Vec<String> {
    if tree.is_empty() {
        return Vec::new();
    }
    let mut zone = vec!["DIRECTORY STRUCTURE".to_string(), BANNER_RULE.to_string()];
    zone.extend(tree.iter().cloned());
    zone.push(BANNER_RULE.to_string());
    zone.push(String::new());
    zone
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(path: &str, namespace: Option<&str>) -> FileRecord {
        let extension = format!(
            ".{}",
            path.rsplit_once('.').map(|(_, e)| e).unwrap_or_default()
        );
        let stem = path
            .rsplit('/')
            .next()
            .and_then(|f| f.split('.').next())
            .unwrap_or_default()
            .to_string();
        FileRecord {
            relative_path: path.to_string(),
            absolute_path: PathBuf::from(path),
            kind: FileKind::from_extension(&extension),
            extension,
            namespace: namespace.map(str::to_string),
            primary_type: stem,
        }
    }

    fn content(tag: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{} line {}", tag, i)).collect()
    }

    #[test]
    fn test_toc_line_numbers_point_at_content() {
        let profile = Profile::scripts();
        let files = [
            record("Assets/Scripts/A.cs", None),
            record("Assets/Scripts/Genes/B.cs", Some("Garden.Genes")),
            record("Assets/Scripts/Genes/C.cs", Some("Garden.Genes")),
            record("Assets/Scripts/Tiles/D.cs", Some("Garden.Tiles")),
        ];

        let mut assembler = DocumentAssembler::new(&profile);
        assembler.push_note("Note: something was skipped");
        for (i, file) in files.iter().enumerate() {
            assembler.push_file(file, &content(&file.primary_type, i + 1));
        }
        let doc = assembler.finish(vec!["HEADER".to_string()]);

        assert_eq!(doc.toc.len(), 4);
        for entry in &doc.toc {
            let first = format!("{} line 0", entry.record.primary_type);
            assert_eq!(doc.lines[entry.line - 1], first);
            assert_eq!(
                doc.lines[entry.line - 3],
                format!("{}{}", FILE_MARKER, entry.record.relative_path)
            );
            assert_eq!(doc.lines[entry.line - 4], BLOCK_SEPARATOR);
        }

        // the rendered TOC carries the same numbers
        let rendered = doc.render();
        assert!(rendered.contains(&format!("  A L{}", doc.toc[0].line)));
        assert!(rendered.contains(&format!("  B (Genes/) L{}", doc.toc[1].line)));
    }

    #[test]
    fn test_header_is_padded_and_truncated_to_budget() {
        let mut profile = Profile::ui();
        profile.header_lines = Some(3);
        profile.header_text = "one".to_string();

        let short = DocumentAssembler::new(&profile).finish(vec!["one".to_string()]);
        assert_eq!(&short.lines[..3], &["one", "", ""]);

        let long_header: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        let long = DocumentAssembler::new(&profile).finish(long_header);
        assert_eq!(&long.lines[..3], &["0", "1", "2"]);
        assert_eq!(long.lines[3], "TABLE OF CONTENTS:");
        assert_eq!(short.body_start, long.body_start);
    }

    #[test]
    fn test_toc_grouping() {
        let profile = Profile::scripts();
        let entries = vec![
            TocEntry {
                record: record("Assets/Scripts/A.cs", None),
                line: 10,
            },
            TocEntry {
                record: record("Assets/Scripts/Genes/B.cs", Some("Garden.Genes")),
                line: 20,
            },
            TocEntry {
                record: record("Assets/Scripts/Genes/C.cs", Some("Garden.Genes")),
                line: 30,
            },
        ];
        let toc = render_toc(&entries, &profile);
        assert_eq!(
            toc,
            vec![
                "TABLE OF CONTENTS:",
                "------------------",
                "",
                "[Global Scope]",
                "  A L10",
                "",
                "[Garden.Genes]",
                "  B (Genes/) L20",
                "  C (Genes/) L30",
                "",
            ]
        );
    }

    #[test]
    fn test_toc_plain_entries() {
        let profile = Profile::ui();
        let entries = vec![TocEntry {
            record: record("Assets/UI/Main.uxml", None),
            line: 42,
        }];
        let toc = render_toc(&entries, &profile);
        assert_eq!(toc[2], "- UI/Main.uxml (Line: 42)");
    }

    #[test]
    fn test_render_header_sections() {
        let profile = Profile::scripts();
        let context = TemplateContext::new().with("project_name", "Garden");
        let mut usings = BTreeSet::new();
        usings.insert("using Garden.Tiles;".to_string());

        let header = render_header(&profile, &context, &usings);
        assert!(header[1].contains("Project: Garden"));
        assert!(header.iter().any(|l| l == "MODIFIER LEGEND:"));
        assert_eq!(header.last().unwrap(), "using Garden.Tiles;");
        assert!(header_budget(&profile) >= 25);
    }

    #[test]
    fn test_directory_tree_zone_counts_toward_offsets() {
        let profile = Profile::ui();
        let file = record("Assets/UI/Main.uss", None);

        let mut without = DocumentAssembler::new(&profile);
        without.push_file(&file, &content("x", 1));
        let without = without.finish(Vec::new());

        let mut with = DocumentAssembler::new(&profile);
        with.set_directory_tree(vec!["Assets".to_string(), "└── UI".to_string()]);
        with.push_file(&file, &content("x", 1));
        let with = with.finish(Vec::new());

        assert_eq!(with.toc[0].line, without.toc[0].line + 6);
        assert_eq!(with.lines[with.toc[0].line - 1], "x line 0");
    }
}
