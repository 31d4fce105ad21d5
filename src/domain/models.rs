use std::path::PathBuf;

/// The compression strategy a file is routed to, keyed on its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Code,
    Style,
    Markup,
    Other,
}

impl FileKind {
    /// Accepts the extension with or without its leading dot, in any case.
    pub fn from_extension(extension: &str) -> Self {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "cs" => FileKind::Code,
            "uss" | "css" => FileKind::Style,
            "uxml" | "xml" => FileKind::Markup,
            _ => FileKind::Other,
        }
    }
}

/// One discovered source file. Created by the collector, read by everyone else.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Path relative to the project root, always with `/` separators.
    pub relative_path: String,
    pub absolute_path: PathBuf,
    /// Lowercased extension including the dot, e.g. `.cs`.
    pub extension: String,
    pub kind: FileKind,
    pub namespace: Option<String>,
    pub primary_type: String,
}

/// The result of compressing a single file.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedUnit {
    /// Length of the input in characters.
    pub original_len: usize,
    /// Length of the rendered output in characters, newlines included.
    pub compressed_len: usize,
    pub lines: Vec<String>,
}

impl CompressedUnit {
    pub fn from_lines(original: &str, lines: Vec<String>) -> Self {
        let compressed_len = if lines.is_empty() {
            0
        } else {
            lines.iter().map(|l| l.chars().count()).sum::<usize>() + lines.len() - 1
        };
        Self {
            original_len: original.chars().count(),
            compressed_len,
            lines,
        }
    }

    /// A unit that carries `text` through unchanged.
    pub fn passthrough(text: &str) -> Self {
        Self::from_lines(text, text.split('\n').map(str::to_string).collect())
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CompressionStats {
    pub original: usize,
    pub compressed: usize,
    pub saved: i64,
    pub percentage: f64,
    pub tokens_saved: i64,
}

impl CompressionStats {
    pub fn from_sizes(original: usize, compressed: usize) -> Self {
        let saved = original as i64 - compressed as i64;
        let percentage = if original > 0 {
            saved as f64 / original as f64 * 100.0
        } else {
            0.0
        };
        Self {
            original,
            compressed,
            saved,
            percentage,
            // Rough estimate: one token per four characters.
            tokens_saved: saved.div_euclid(4),
        }
    }
}

/// What a successful profile run produced.
#[derive(Debug, Clone)]
pub struct ProfileReport {
    pub profile: String,
    pub output_file: PathBuf,
    pub part_files: Vec<PathBuf>,
    pub files_processed: usize,
    pub stats: CompressionStats,
}
