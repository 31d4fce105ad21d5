pub mod code_compressor;
pub mod compressor;
pub mod document;
pub mod extractor;
pub mod markup_compressor;
pub mod modifiers;
pub mod splitter;
pub mod template;
