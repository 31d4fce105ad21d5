//! Runs extraction profiles end to end: clean, collect, compress, assemble,
//! write, split.

use crate::core::compressor::{compress_content, format_size};
use crate::core::document::{DocumentAssembler, render_header};
use crate::core::splitter::{PartBanners, split_document};
use crate::core::template::{TemplateContext, group_thousands};
use crate::domain::errors::{ExtractorError, Result};
use crate::domain::models::{CompressionStats, FileKind, ProfileReport};
use crate::domain::settings::{GlobalSettings, Profile, Settings};
use crate::infra::file_system::{collect_files, generate_directory_tree, read_file_contents};
use crate::infra::logger::print_colored;
use crate::infra::output::{FileWriter, clean_previous_outputs, output_filename, part_filename};
use chrono::{DateTime, Local};
use crossterm::style::Color;
use log::{debug, error, info, warn};
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::Path;

/// Only this many leading lines are searched for `using` directives.
const USING_SCAN_LINES: usize = 50;

pub fn extract_profile(
    project_root: &Path,
    name: &str,
    profile: &Profile,
    global: &GlobalSettings,
    now: DateTime<Local>,
) -> Result<ProfileReport> {
    let mut stdout = io::stdout();
    writeln!(stdout, "\n{}", "=".repeat(60))?;
    writeln!(stdout, "EXTRACTING: {}", name.to_uppercase())?;
    writeln!(stdout, "Description: {}", profile.description)?;
    writeln!(stdout, "{}", "=".repeat(60))?;

    let timestamp = now.format("%Y%m%d_%H%M%S").to_string();
    let project_name = project_root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| project_root.display().to_string());

    if global.clean_previous_files {
        clean_previous_outputs(project_root, profile, global, &timestamp)?;
    }

    info!("Scanning directories: {}", profile.directories.join(", "));
    let outcome = collect_files(project_root, profile)?;
    if outcome.files.is_empty() {
        return Err(ExtractorError::NoFiles(name.to_string()));
    }
    print_colored(
        Color::Green,
        &format!("✓ Found {} files to extract", outcome.files.len()),
    )?;

    let compression = &profile.compression;
    let mut assembler = DocumentAssembler::new(profile);
    for directory in &outcome.missing_dirs {
        assembler.push_note(format!("// {}", ExtractorError::MissingDirectory(directory.clone())));
    }

    let mut original_total = 0;
    let mut compressed_total = 0;
    let mut usings = BTreeSet::new();

    for file in &outcome.files {
        match read_file_contents(&file.absolute_path) {
            Ok(text) => {
                if file.kind == FileKind::Code && compression.enabled {
                    discover_usings(&text, &compression.common_usings, &mut usings);
                }
                let unit = compress_content(&text, file.kind, compression);
                original_total += unit.original_len;
                compressed_total += unit.compressed_len;
                assembler.push_file(file, &unit.lines);
            }
            Err(e) => {
                warn!("{}", e);
                let cause = match &e {
                    ExtractorError::FileRead { source, .. } => source.to_string(),
                    other => other.to_string(),
                };
                assembler.push_file(file, &[format!("// ERROR: Could not read file. {}", cause)]);
            }
        }
    }

    let stats = CompressionStats::from_sizes(original_total, compressed_total);
    let context = TemplateContext::new()
        .with("project_name", project_name)
        .with("extraction_date", now.format("%Y-%m-%d %H:%M:%S").to_string())
        .with("original_size", original_total)
        .with("compressed_size", compressed_total)
        .with("saved_percent", stats.percentage)
        .with("tokens_saved", stats.tokens_saved);
    let header = render_header(profile, &context, &usings);

    if profile.include_directory_tree {
        assembler.set_directory_tree(generate_directory_tree(project_root, profile));
    }
    let document = assembler.finish(header);

    let stamp = global
        .include_timestamp_in_filename
        .then_some(timestamp.as_str());
    let writer = FileWriter::new(project_root);
    let output_file = writer.write(
        &output_filename(&profile.output_filename, stamp),
        &document.render(),
    )?;

    let mut part_files = Vec::new();
    if document.char_len() > global.max_chars_per_file {
        let banners = PartBanners {
            part_end: &global.part_end_text,
            last_part_end: &global.last_part_end_text,
        };
        let parts = split_document(&document.lines, global.max_chars_per_file, &banners);
        if parts.len() > 1 {
            for part in &parts {
                let filename = part_filename(profile.part_stem(), stamp, part.number, part.total);
                part_files.push(writer.write(&filename, &part.render())?);
            }
            print_colored(
                Color::Yellow,
                &format!("✂ Split into {} parts", parts.len()),
            )?;
        } else {
            warn!(
                "Document exceeds {} chars but holds a single unsplittable block",
                global.max_chars_per_file
            );
        }
    }

    print_colored(
        Color::Green,
        &format!("\n✓ Success! Output saved to: {}", output_file.display()),
    )?;
    if global.show_compression_stats && compression.enabled {
        print_stats(&stats)?;
    }

    Ok(ProfileReport {
        profile: name.to_string(),
        output_file,
        part_files,
        files_processed: outcome.files.len(),
        stats,
    })
}

/// Collects `using X;` directives from the top of `text` that are not in `common`.
fn discover_usings(text: &str, common: &[String], found: &mut BTreeSet<String>) {
    for line in text.lines().take(USING_SCAN_LINES) {
        let line = line.trim();
        if line.starts_with("using ") && line.ends_with(';') && !common.iter().any(|c| c == line) {
            found.insert(line.to_string());
        }
    }
}

fn print_stats(stats: &CompressionStats) -> io::Result<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "\n📊 Compression Statistics:")?;
    writeln!(
        stdout,
        "   Original:   {:>10} chars ({})",
        group_thousands(&stats.original.to_string()),
        format_size(stats.original)
    )?;
    writeln!(
        stdout,
        "   Compressed: {:>10} chars ({})",
        group_thousands(&stats.compressed.to_string()),
        format_size(stats.compressed)
    )?;
    writeln!(
        stdout,
        "   Saved:      {:>10} chars ({:.1}%)",
        group_thousands(&stats.saved.to_string()),
        stats.percentage
    )?;
    writeln!(
        stdout,
        "   Est. tokens saved: ~{}",
        group_thousands(&stats.tokens_saved.to_string())
    )?;
    Ok(())
}

/// Runs one named profile, or every enabled profile when `profile_filter` is
/// `None`. A failing profile is reported and the rest still run.
pub fn run_extraction(
    project_root: &Path,
    settings: &Settings,
    profile_filter: Option<&str>,
    now: DateTime<Local>,
) -> Result<Vec<ProfileReport>> {
    let mut stdout = io::stdout();
    writeln!(stdout, "\n{}", "=".repeat(60))?;
    writeln!(stdout, "UNITY PROJECT EXTRACTOR")?;
    writeln!(stdout, "{}", "=".repeat(60))?;
    writeln!(stdout, "Project: {}", project_root.display())?;
    writeln!(stdout, "Time: {}", now.format("%Y-%m-%d %H:%M:%S"))?;

    let selected: Vec<(&String, &Profile)> = match profile_filter {
        Some(name) => match settings.profiles.get_key_value(name) {
            Some(entry) => vec![entry],
            None => {
                let err = ExtractorError::UnknownProfile {
                    name: name.to_string(),
                    available: settings
                        .profiles
                        .keys()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", "),
                };
                warn!("{}", err);
                print_colored(Color::Red, &format!("\n✗ Error: {}", err))?;
                return Ok(Vec::new());
            }
        },
        None => settings.profiles.iter().filter(|(_, p)| p.enabled).collect(),
    };

    if selected.is_empty() {
        print_colored(
            Color::Yellow,
            "\n⚠ No enabled profiles found. Check your settings file.",
        )?;
        return Ok(Vec::new());
    }
    let names: Vec<&str> = selected.iter().map(|(n, _)| n.as_str()).collect();
    info!("Profiles to run: {}", names.join(", "));

    let mut reports = Vec::new();
    for (name, profile) in selected {
        match extract_profile(project_root, name, profile, &settings.global, now) {
            Ok(report) => reports.push(report),
            Err(ExtractorError::NoFiles(_)) => {
                warn!("No files found for profile '{}'", name);
                print_colored(
                    Color::Yellow,
                    "\n⚠ No files found matching the criteria.\n  Check your settings file to ensure paths are correct.",
                )?;
            }
            Err(e) => {
                error!("Profile '{}' failed: {}", name, e);
                print_colored(Color::Red, &format!("\n✗ Error: {}", e))?;
            }
        }
    }

    if !reports.is_empty() {
        print_summary(&reports)?;
    }
    Ok(reports)
}

fn print_summary(reports: &[ProfileReport]) -> io::Result<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "\n{}", "=".repeat(60))?;
    print_colored(Color::Green, "EXTRACTION COMPLETE")?;
    writeln!(stdout, "{}", "=".repeat(60))?;

    let total_files: usize = reports.iter().map(|r| r.files_processed).sum();
    let original: usize = reports.iter().map(|r| r.stats.original).sum();
    let compressed: usize = reports.iter().map(|r| r.stats.compressed).sum();

    writeln!(stdout, "\n📁 Total files processed: {}", total_files)?;
    writeln!(stdout, "📄 Output files created:")?;
    for report in reports {
        writeln!(stdout, "   - {}", report.output_file.display())?;
        for part in &report.part_files {
            writeln!(stdout, "     + {}", part.display())?;
        }
    }

    if original > compressed {
        let overall = CompressionStats::from_sizes(original, compressed);
        writeln!(
            stdout,
            "\n📊 Overall compression: {:.1}% reduction",
            overall.percentage
        )?;
        writeln!(
            stdout,
            "   (~{} tokens saved)",
            group_thousands(&overall.tokens_saved.to_string())
        )?;
    }
    debug!("Summary printed for {} profiles", reports.len());
    Ok(())
}

pub fn list_profiles(settings: &Settings) -> io::Result<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "\n{}", "=".repeat(60))?;
    writeln!(stdout, "AVAILABLE PROFILES")?;
    writeln!(stdout, "{}", "=".repeat(60))?;

    for (name, profile) in &settings.profiles {
        let (status, color) = if profile.enabled {
            ("✓ ENABLED", Color::Green)
        } else {
            ("✗ DISABLED", Color::DarkGrey)
        };
        print_colored(color, &format!("\n[{}] {}", name, status))?;
        writeln!(stdout, "  Description: {}", profile.description)?;
        writeln!(stdout, "  Directories: {}", list_or(&profile.directories, "None"))?;
        writeln!(stdout, "  Extensions:  {}", list_or(&profile.include_extensions, "All"))?;
        writeln!(
            stdout,
            "  Compression: {}",
            if profile.compression.enabled { "Yes" } else { "No" }
        )?;
    }
    Ok(())
}

fn list_or(values: &[String], empty: &str) -> String {
    if values.is_empty() {
        empty.to_string()
    } else {
        values.join(", ")
    }
}
