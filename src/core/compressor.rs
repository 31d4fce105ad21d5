use crate::core::code_compressor::compress_code;
use crate::core::markup_compressor::{CommentSyntax, MARKUP, STYLE_SHEET, compress_markup};
use crate::domain::models::{CompressedUnit, FileKind};
use crate::domain::settings::CompressionSettings;
use log::debug;

pub trait ContentCompressor {
    fn compress(&self, text: &str, settings: &CompressionSettings) -> CompressedUnit;
}

pub struct CodeCompressor;

impl ContentCompressor for CodeCompressor {
    fn compress(&self, text: &str, settings: &CompressionSettings) -> CompressedUnit {
        compress_code(text, settings)
    }
}

pub struct CommentStripper {
    syntax: CommentSyntax,
}

impl CommentStripper {
    pub fn new(syntax: CommentSyntax) -> Self {
        Self { syntax }
    }
}

impl ContentCompressor for CommentStripper {
    fn compress(&self, text: &str, settings: &CompressionSettings) -> CompressedUnit {
        compress_markup(text, self.syntax, settings)
    }
}

pub struct Passthrough;

impl ContentCompressor for Passthrough {
    fn compress(&self, text: &str, _settings: &CompressionSettings) -> CompressedUnit {
        CompressedUnit::passthrough(text)
    }
}

pub fn create_compressor(kind: FileKind) -> Box<dyn ContentCompressor> {
    match kind {
        FileKind::Code => Box::new(CodeCompressor) as Box<dyn ContentCompressor>,
        FileKind::Style => Box::new(CommentStripper::new(STYLE_SHEET)) as Box<dyn ContentCompressor>,
        FileKind::Markup => Box::new(CommentStripper::new(MARKUP)) as Box<dyn ContentCompressor>,
        FileKind::Other => Box::new(Passthrough) as Box<dyn ContentCompressor>,
    }
}

pub fn compress_content(text: &str, kind: FileKind, settings: &CompressionSettings) -> CompressedUnit {
    if !settings.enabled {
        return CompressedUnit::passthrough(text);
    }
    let unit = create_compressor(kind).compress(text, settings);
    debug!(
        "Compressed {:?} content: {} -> {} chars",
        kind, unit.original_len, unit.compressed_len
    );
    unit
}

pub fn format_size(size: usize) -> String {
    let mut size = size as f64;
    for unit in ["", "K", "M", "G"] {
        if size.abs() < 1024.0 {
            return format!("{:.1}{}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1}T", size)
}
