use crate::domain::errors::{ExtractorError, Result};
use crate::domain::models::{FileKind, FileRecord};
use crate::domain::settings::Profile;
use crossterm::{
    ExecutableCommand, cursor,
    terminal::{Clear, ClearType},
};
use log::{debug, info, warn};
use regex::Regex;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use walkdir::{DirEntry, WalkDir};

/// Bytes of a code file inspected for namespace and type names.
const METADATA_PREVIEW_BYTES: u64 = 3000;

static RE_NAMESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"namespace\s+([\w.]+)\s*[{;]").unwrap());

// Public types win over internal ones, which win over anything else.
static RE_TYPE_DECLARATIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"public\s+(?:abstract\s+)?(?:partial\s+)?(?:sealed\s+)?(?:class|interface|struct|enum)\s+(\w+)",
        r"internal\s+(?:abstract\s+)?(?:partial\s+)?(?:sealed\s+)?(?:class|interface|struct|enum)\s+(\w+)",
        r"(?:abstract\s+)?(?:partial\s+)?(?:sealed\s+)?\b(?:class|interface|struct|enum)\s+(\w+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

// Progress indicator for file scanning
struct ScanProgress {
    start_time: Instant,
    update_interval: Duration,
    last_update: Instant,
    scanned_count: usize,
    matched_count: usize,
}

impl ScanProgress {
    fn new() -> Self {
        Self {
            start_time: Instant::now(),
            update_interval: Duration::from_millis(250),
            last_update: Instant::now(),
            scanned_count: 0,
            matched_count: 0,
        }
    }

    fn update(&mut self, matched: bool) -> io::Result<()> {
        self.scanned_count += 1;
        if matched {
            self.matched_count += 1;
        }

        let now = Instant::now();
        if now.duration_since(self.last_update) >= self.update_interval {
            self.last_update = now;
            let spinner_chars = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
            let spinner_idx = ((now.duration_since(self.start_time).as_millis() / 100)
                % spinner_chars.len() as u128) as usize;

            let mut stdout = io::stdout();
            stdout.execute(cursor::SavePosition)?;
            stdout.execute(Clear(ClearType::CurrentLine))?;
            write!(
                stdout,
                "{} Scanning files: {} scanned, {} matched",
                spinner_chars[spinner_idx], self.scanned_count, self.matched_count
            )?;
            stdout.flush()?;
            stdout.execute(cursor::RestorePosition)?;
        }
        Ok(())
    }

    fn finish(&self) -> io::Result<()> {
        let elapsed = self.start_time.elapsed().as_secs_f32();
        let mut stdout = io::stdout();
        stdout.execute(Clear(ClearType::CurrentLine))?;
        writeln!(
            stdout,
            "✓ Scan complete: {} files scanned, {} files matched in {:.1}s",
            self.scanned_count, self.matched_count, elapsed
        )?;
        Ok(())
    }
}

/// Files found for a profile, plus the configured directories that did not exist.
#[derive(Debug, Default)]
pub struct CollectionOutcome {
    pub files: Vec<FileRecord>,
    pub missing_dirs: Vec<String>,
}

/// Walks every profile directory under `root` and returns the matching files
/// sorted by namespace, then relative path. Missing directories are reported,
/// not fatal.
pub fn collect_files(root: &Path, profile: &Profile) -> Result<CollectionOutcome> {
    let include = lowercase_all(&profile.include_extensions);
    let exclude = lowercase_all(&profile.exclude_extensions);
    debug!("Include extensions: {:?}", include);
    debug!("Exclude extensions: {:?}", exclude);
    debug!("Blacklisted directories: {:?}", profile.blacklist_directories);

    let mut outcome = CollectionOutcome::default();
    let mut progress = ScanProgress::new();

    for directory in &profile.directories {
        let scan_path = root.join(directory);
        if !scan_path.is_dir() {
            warn!("{}", ExtractorError::MissingDirectory(directory.clone()));
            outcome.missing_dirs.push(directory.clone());
            continue;
        }

        info!("Scanning {}", scan_path.display());
        for entry in WalkDir::new(&scan_path)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_blacklisted(e, root, &profile.blacklist_directories))
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let extension = extension_of(entry.path());
            let matched = (include.is_empty() || include.contains(&extension))
                && !exclude.contains(&extension);
            progress.update(matched)?;

            if matched {
                debug!("Found matching file: {}", entry.path().display());
                outcome.files.push(build_record(root, entry.path(), extension));
            }
        }
    }

    progress.finish()?;
    outcome.files.sort_by(|a, b| {
        let key_a = (a.namespace.as_deref().unwrap_or(""), &a.relative_path);
        let key_b = (b.namespace.as_deref().unwrap_or(""), &b.relative_path);
        key_a.cmp(&key_b)
    });
    info!("Found {} matching files", outcome.files.len());
    Ok(outcome)
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_lowercase()).collect()
}

/// Lowercased extension with its leading dot, or an empty string.
fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// A directory is skipped when its name is blacklisted or its project-relative
/// path contains a blacklisted fragment.
fn is_blacklisted(entry: &DirEntry, root: &Path, blacklist: &[String]) -> bool {
    if !entry.file_type().is_dir() || blacklist.is_empty() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    let relative = relative_path(root, entry.path());
    let skipped = blacklist
        .iter()
        .any(|b| *name == **b || relative.contains(b.as_str()));
    if skipped {
        debug!("Skipping blacklisted directory: {}", relative);
    }
    skipped
}

fn build_record(root: &Path, path: &Path, extension: String) -> FileRecord {
    let kind = FileKind::from_extension(&extension);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let (namespace, primary_type) = if kind == FileKind::Code {
        match read_preview(path) {
            Ok(preview) => extract_file_metadata(&preview, &stem),
            Err(e) => {
                debug!("Could not inspect {}: {}", path.display(), e);
                (None, stem)
            }
        }
    } else {
        (None, stem)
    };

    FileRecord {
        relative_path: relative_path(root, path),
        absolute_path: path.to_path_buf(),
        extension,
        kind,
        namespace,
        primary_type,
    }
}

fn read_preview(path: &Path) -> io::Result<String> {
    let mut buffer = Vec::new();
    fs::File::open(path)?
        .take(METADATA_PREVIEW_BYTES)
        .read_to_end(&mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Namespace and main type name found in `preview`. The type falls back to
/// `stem` when no declaration is found.
pub fn extract_file_metadata(preview: &str, stem: &str) -> (Option<String>, String) {
    let namespace = RE_NAMESPACE
        .captures(preview)
        .map(|c| c[1].to_string());
    let primary_type = RE_TYPE_DECLARATIONS
        .iter()
        .find_map(|re| re.captures(preview).map(|c| c[1].to_string()))
        .unwrap_or_else(|| stem.to_string());
    (namespace, primary_type)
}

pub fn read_file_contents(path: &Path) -> Result<String> {
    debug!("Reading file contents: {}", path.display());
    let contents = fs::read_to_string(path).map_err(|source| ExtractorError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.is_empty() {
        debug!("File is empty: {}", path.display());
    }
    Ok(contents)
}

/// Renders each existing profile directory as a `├──`/`└──` tree.
pub fn generate_directory_tree(root: &Path, profile: &Profile) -> Vec<String> {
    let exclude = lowercase_all(&profile.exclude_extensions);
    let mut tree = Vec::new();
    for directory in &profile.directories {
        let path = root.join(directory);
        if !path.is_dir() {
            continue;
        }
        tree.push(directory.clone());
        push_tree_lines(&path, profile, &exclude, "", &mut tree);
    }
    debug!("Generated directory tree with {} lines", tree.len());
    tree
}

fn push_tree_lines(
    dir: &Path,
    profile: &Profile,
    exclude: &[String],
    prefix: &str,
    tree: &mut Vec<String>,
) {
    let children: Vec<(String, PathBuf, bool)> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            let is_dir = e.file_type().is_dir();
            let lower = name.to_lowercase();
            let hidden = name.starts_with('.');
            let excluded = !is_dir && exclude.iter().any(|ext| lower.ends_with(ext.as_str()));
            let blacklisted = is_dir && profile.blacklist_directories.contains(&name);
            (!hidden && !excluded && !blacklisted).then(|| (name, e.into_path(), is_dir))
        })
        .collect();

    let count = children.len();
    for (i, (name, path, is_dir)) in children.into_iter().enumerate() {
        let last = i + 1 == count;
        let (branch, extension) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        tree.push(format!("{}{}{}", prefix, branch, name));
        if is_dir {
            push_tree_lines(&path, profile, exclude, &format!("{}{}", prefix, extension), tree);
        }
    }
}
