use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SETTINGS_FILENAME: &str = "unity_extractor_settings.json";

const SCRIPTS_HEADER: &str = "UNITY PROJECT SCRIPTS - COMPRESSED FORMAT
Project: {project_name} | Extracted on: {extraction_date}
Compression Stats: {original_size:,} -> {compressed_size:,} chars ({saved_percent:.1f}% reduction)
Estimated tokens saved: ~{tokens_saved:,}

This document contains extracted Unity C# scripts from my Unity game project.
When editing: return each changed method in full; if edits touch more than 3 methods, output the entire script.

This file is optimized for LLM token efficiency:
- Removed: excess whitespace, common using statements, XML docs, attributes
- Preserved: code structure, important comments, logic flow

When editing or creating scripts from this reference:
1. Re-add the standard using statements (System, UnityEngine, etc.)
2. Format with proper indentation and spacing
3. Add back regions and documentation as needed";

const UI_HEADER: &str = "=================================================
UNITY UI TOOLKIT FILES
=================================================
This document contains selected source files (.uxml, .uss, .cs)
extracted from the project for easy review.

Project: {project_name}
Extracted on: {extraction_date}";

/// Root of the settings file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub global: GlobalSettings,
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Settings {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert("scripts".to_string(), Profile::scripts());
        profiles.insert("ui".to_string(), Profile::ui());
        profiles.insert("custom".to_string(), Profile::custom());
        Self {
            global: GlobalSettings::default(),
            profiles,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GlobalSettings {
    pub clean_previous_files: bool,
    pub backup_previous_files: bool,
    pub backup_directory: String,
    pub include_timestamp_in_filename: bool,
    pub max_chars_per_file: usize,
    pub show_compression_stats: bool,
    pub part_end_text: String,
    pub last_part_end_text: String,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            clean_previous_files: true,
            backup_previous_files: false,
            backup_directory: "_extractor_backups".to_string(),
            include_timestamp_in_filename: false,
            max_chars_per_file: 10_000_000,
            show_compression_stats: true,
            part_end_text: "This is part {current_part} of {total_parts}, {remaining_text}."
                .to_string(),
            last_part_end_text: "This is the final part ({current_part} of {total_parts})."
                .to_string(),
        }
    }
}

/// A named, independently configured extraction job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Profile {
    pub enabled: bool,
    pub description: String,
    pub directories: Vec<String>,
    pub blacklist_directories: Vec<String>,
    pub include_extensions: Vec<String>,
    pub exclude_extensions: Vec<String>,
    pub output_filename: String,
    pub part_output_filename: Option<String>,
    pub compression: CompressionSettings,
    pub include_toc: bool,
    pub compact_toc: bool,
    pub toc_strip_prefixes: Vec<String>,
    pub include_directory_tree: bool,
    pub header_text: String,
    pub header_lines: Option<usize>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            enabled: false,
            description: String::new(),
            directories: Vec::new(),
            blacklist_directories: Vec::new(),
            include_extensions: Vec::new(),
            exclude_extensions: vec![".meta".to_string()],
            output_filename: "EXTRACTED".to_string(),
            part_output_filename: None,
            compression: CompressionSettings::default(),
            include_toc: true,
            compact_toc: false,
            toc_strip_prefixes: vec![
                "Assets/Scripts/".to_string(),
                "Assets/Editor/".to_string(),
                "Assets/".to_string(),
            ],
            include_directory_tree: false,
            header_text: "Extracted files".to_string(),
            header_lines: None,
        }
    }
}

impl Profile {
    pub fn scripts() -> Self {
        Self {
            enabled: true,
            description: "C# scripts with token-efficient compression".to_string(),
            directories: vec!["Assets/Scripts".to_string(), "Assets/Editor".to_string()],
            include_extensions: vec![".cs".to_string()],
            output_filename: "Unity_EXTRACTED_scripts".to_string(),
            compression: CompressionSettings::aggressive(),
            compact_toc: true,
            header_text: SCRIPTS_HEADER.to_string(),
            ..Self::default()
        }
    }

    pub fn ui() -> Self {
        Self {
            enabled: true,
            description: "UI Toolkit files (.uxml, .uss, .cs) - no compression".to_string(),
            directories: vec!["Assets/Scripts/A_ToolkitUI".to_string()],
            include_extensions: vec![".uxml".to_string(), ".uss".to_string(), ".cs".to_string()],
            output_filename: "Unity_EXTRACTED_ToolkitUI".to_string(),
            header_text: UI_HEADER.to_string(),
            ..Self::default()
        }
    }

    pub fn custom() -> Self {
        Self {
            description: "Custom extraction profile - configure as needed".to_string(),
            output_filename: "Unity_EXTRACTED_custom".to_string(),
            header_text: "Custom extraction output".to_string(),
            ..Self::default()
        }
    }

    /// Stem used for split part files.
    pub fn part_stem(&self) -> &str {
        self.part_output_filename
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.output_filename)
    }
}

/// Compression toggles. Defaults mirror what an unset key means in a
/// hand-written settings file, which is why most toggles default to on while
/// `enabled` itself defaults to off.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompressionSettings {
    pub enabled: bool,
    pub remove_empty_lines: bool,
    pub remove_comments: bool,
    pub remove_xml_docs: bool,
    pub remove_using_statements: bool,
    pub remove_regions: bool,
    pub remove_attributes: bool,
    pub trim_whitespace: bool,
    pub compress_braces: bool,
    pub compress_method_signatures: bool,
    pub compress_namespaces: bool,
    pub shorten_modifiers: bool,
    pub reduce_indentation: bool,
    pub extreme_compression: bool,
    pub compress_whitespace: bool,
    pub indent_size: usize,
    pub common_usings: Vec<String>,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            remove_empty_lines: true,
            remove_comments: false,
            remove_xml_docs: true,
            remove_using_statements: true,
            remove_regions: true,
            remove_attributes: true,
            trim_whitespace: true,
            compress_braces: true,
            compress_method_signatures: true,
            compress_namespaces: true,
            shorten_modifiers: true,
            reduce_indentation: true,
            extreme_compression: false,
            compress_whitespace: false,
            indent_size: 1,
            common_usings: Vec::new(),
        }
    }
}

impl CompressionSettings {
    pub fn aggressive() -> Self {
        Self {
            enabled: true,
            remove_comments: true,
            extreme_compression: true,
            common_usings: [
                "using System;",
                "using System.Collections;",
                "using System.Collections.Generic;",
                "using UnityEngine;",
                "using UnityEngine.UI;",
                "using System.Linq;",
                "using UnityEngine.Events;",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            ..Self::default()
        }
    }

    /// Every reduction turned off. Output then equals input minus trailing blanks.
    pub fn disabled_toggles() -> Self {
        Self {
            enabled: true,
            remove_empty_lines: false,
            remove_comments: false,
            remove_xml_docs: false,
            remove_using_statements: false,
            remove_regions: false,
            remove_attributes: false,
            trim_whitespace: false,
            compress_braces: false,
            compress_method_signatures: false,
            compress_namespaces: false,
            shorten_modifiers: false,
            reduce_indentation: false,
            extreme_compression: false,
            compress_whitespace: false,
            indent_size: 1,
            common_usings: Vec::new(),
        }
    }

    pub fn reindents(&self) -> bool {
        self.reduce_indentation || self.extreme_compression
    }
}
