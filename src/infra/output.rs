use crate::domain::errors::{ExtractorError, Result};
use crate::domain::settings::{GlobalSettings, Profile};
use crate::infra::logger::print_colored;
use crossterm::style::Color;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// `<stem>[_<timestamp>].txt`
pub fn output_filename(stem: &str, timestamp: Option<&str>) -> String {
    match timestamp {
        Some(ts) => format!("{}_{}.txt", stem, ts),
        None => format!("{}.txt", stem),
    }
}

/// `<stem>[_<timestamp>]_<part>of<total>.txt`
pub fn part_filename(stem: &str, timestamp: Option<&str>, part: usize, total: usize) -> String {
    match timestamp {
        Some(ts) => format!("{}_{}_{}of{}.txt", stem, ts, part, total),
        None => format!("{}_{}of{}.txt", stem, part, total),
    }
}

/// Writes documents into one directory, normally the project root.
pub struct FileWriter {
    dir: PathBuf,
}

impl FileWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf> {
        let path = self.dir.join(filename);
        debug!("Writing output to file: {}", path.display());
        fs::write(&path, content).map_err(|source| ExtractorError::Write {
            path: path.clone(),
            source,
        })?;
        info!("Output written to file: {} ({} chars)", path.display(), content.chars().count());
        Ok(path)
    }
}

/// Earlier outputs of `profile` in `root`: any `.txt` whose name starts with
/// the output stem or the part stem.
pub fn previous_outputs(root: &Path, profile: &Profile) -> Result<Vec<PathBuf>> {
    let stems: Vec<&str> = [profile.output_filename.as_str(), profile.part_stem()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();

    let mut found = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.ends_with(".txt") && stems.iter().any(|stem| name.starts_with(stem)) {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

/// Removes previous outputs, copying them to `<backup_directory>/<timestamp>/`
/// first when backups are on. Per-file failures are reported and skipped.
/// Returns how many files were removed.
pub fn clean_previous_outputs(
    root: &Path,
    profile: &Profile,
    global: &GlobalSettings,
    timestamp: &str,
) -> Result<usize> {
    let files = previous_outputs(root, profile)?;
    if files.is_empty() {
        debug!("No previous outputs to clean");
        return Ok(0);
    }

    if global.backup_previous_files {
        let backup_dir = root.join(&global.backup_directory).join(timestamp);
        fs::create_dir_all(&backup_dir).map_err(|source| ExtractorError::Write {
            path: backup_dir.clone(),
            source,
        })?;
        for file in &files {
            let name = file_name(file);
            match fs::copy(file, backup_dir.join(&name)) {
                Ok(_) => print_colored(Color::Blue, &format!("  📦 Backed up: {}", name))?,
                Err(e) => warn!("Failed to back up {}: {}", name, e),
            }
        }
    }

    let mut removed = 0;
    for file in &files {
        let name = file_name(file);
        match fs::remove_file(file) {
            Ok(()) => {
                removed += 1;
                print_colored(Color::DarkGrey, &format!("  🗑 Removed: {}", name))?;
            }
            Err(e) => warn!("Failed to remove {}: {}", name, e),
        }
    }
    info!("Cleaned {} previous output files", removed);
    Ok(removed)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn profile() -> Profile {
        Profile {
            output_filename: "Out".to_string(),
            part_output_filename: Some("Chunk".to_string()),
            ..Profile::default()
        }
    }

    fn touch(root: &Path, name: &str) {
        fs::write(root.join(name), name).unwrap();
    }

    #[test]
    fn test_filenames() {
        assert_eq!(output_filename("Out", None), "Out.txt");
        assert_eq!(output_filename("Out", Some("20260101_120000")), "Out_20260101_120000.txt");
        assert_eq!(part_filename("Out", None, 2, 3), "Out_2of3.txt");
        assert_eq!(
            part_filename("Chunk", Some("20260101_120000"), 1, 2),
            "Chunk_20260101_120000_1of2.txt"
        );
    }

    #[test]
    fn test_file_writer() {
        let temp_dir = TempDir::new().unwrap();
        let writer = FileWriter::new(temp_dir.path());

        let path = writer.write("Out.txt", "Test output").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "Test output");
    }

    #[test]
    fn test_write_failure_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let writer = FileWriter::new(temp_dir.path().join("missing"));

        let err = writer.write("Out.txt", "x").unwrap_err();
        assert!(matches!(err, ExtractorError::Write { .. }));
    }

    #[test]
    fn test_clean_previous_outputs() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for name in ["Out.txt", "Out_1of2.txt", "Chunk_2of2.txt", "Other.txt", "Out.json"] {
            touch(root, name);
        }

        let removed = clean_previous_outputs(root, &profile(), &GlobalSettings::default(), "ts").unwrap();
        assert_eq!(removed, 3);
        assert!(root.join("Other.txt").exists());
        assert!(root.join("Out.json").exists());
        assert!(!root.join("Out.txt").exists());
        assert!(!root.join("_extractor_backups").exists());
    }

    #[test]
    fn test_clean_with_backup() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "Out.txt");

        let global = GlobalSettings {
            backup_previous_files: true,
            ..GlobalSettings::default()
        };
        clean_previous_outputs(root, &profile(), &global, "20260101_120000").unwrap();

        let backup = root.join("_extractor_backups/20260101_120000/Out.txt");
        assert_eq!(fs::read_to_string(backup).unwrap(), "Out.txt");
        assert!(!root.join("Out.txt").exists());
    }
}
