//! Input file discovery for projects without a `files` list.

use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use tracing::trace;
use tsz_common::path::{file_extension_is, get_normalized_absolute_path, normalize_slashes};
use tsz_program::module_resolver::SUPPORTED_EXTENSIONS;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct FileDiscoveryOptions {
    pub base_dir: PathBuf,
    /// Absolute, slash-normalized paths whose subtrees are skipped.
    pub exclude: Vec<String>,
}

impl FileDiscoveryOptions {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        FileDiscoveryOptions {
            base_dir: base_dir.into(),
            exclude: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }
}

/// Every `.ts`, `.tsx` and `.d.ts` file below `base_dir`, sorted. `node_modules`
/// folders and excluded paths are skipped, and a declaration file is dropped
/// when a `.ts` or `.tsx` file with the same base name sits next to it.
pub fn discover_ts_files(options: &FileDiscoveryOptions) -> Result<Vec<String>> {
    let base_dir = normalize_slashes(&options.base_dir.to_string_lossy());
    let excluded: Vec<String> = options
        .exclude
        .iter()
        .map(|entry| get_normalized_absolute_path(entry, &base_dir))
        .collect();

    let walker = WalkDir::new(&options.base_dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            if entry.file_type().is_dir() && name == "node_modules" {
                return false;
            }
            let path = normalize_slashes(&entry.path().to_string_lossy());
            !excluded.iter().any(|excluded| is_same_or_below(&path, excluded))
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| {
            format!("failed to read directory {}", options.base_dir.display())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = normalize_slashes(&entry.path().to_string_lossy());
        if is_valid_module_file(&path) {
            trace!(path = %path, "discovered input file");
            files.push(path);
        }
    }

    let implementations: FxHashSet<String> = files
        .iter()
        .filter(|file| !file_extension_is(file, ".d.ts"))
        .filter_map(|file| strip_supported_extension(file))
        .map(str::to_string)
        .collect();
    files.retain(|file| {
        !file_extension_is(file, ".d.ts")
            || strip_supported_extension(file).is_none_or(|stem| !implementations.contains(stem))
    });
    files.sort();
    Ok(files)
}

pub fn is_valid_module_file(path: &str) -> bool {
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|extension| file_extension_is(path, extension))
}

fn strip_supported_extension(path: &str) -> Option<&str> {
    // `.d.ts` before `.ts` so declaration files lose the whole suffix.
    [".d.ts", ".tsx", ".ts"]
        .iter()
        .find_map(|extension| path.strip_suffix(extension))
}

fn is_same_or_below(path: &str, directory: &str) -> bool {
    path == directory
        || path
            .strip_prefix(directory)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// `tsconfig.json` for `--project`, which names either the file or the
/// directory that contains it.
pub fn resolve_project_path(project: &Path) -> PathBuf {
    if project.is_dir() {
        project.join(tsz_program::config::CONFIG_FILE_NAME)
    } else {
        project.to_path_buf()
    }
}
