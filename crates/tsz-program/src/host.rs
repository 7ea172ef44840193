//! Compiler hosts.
//!
//! A host is the program's only window onto the file system. `SystemHost`
//! reads the real disk; `MemoryHost` serves files from memory and is what the
//! tests build programs against.
//!
//! Both hosts keep the source files they hand out. Asking again for a file
//! whose text has not changed returns the same `Arc<SourceFile>`, which is
//! what lets a later program reuse the structure of an earlier one.

use crate::module_resolver::{ModuleResolutionHost, ResolvedModule};
use crate::options::CompilerOptions;
use crate::source_file::{SourceFile, SourceVersion};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::{Cell, RefCell};
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};
use tsz_common::path::{
    combine_paths, ensure_trailing_directory_separator, get_directory_path,
    get_normalized_absolute_path, normalize_slashes,
};
use tsz_common::{ScriptTarget, diagnostic_messages};

pub trait CompilerHost: ModuleResolutionHost {
    /// Load and pre-process a source file. `Ok(None)` means the file does not
    /// exist; `Err` carries the reason a file that exists could not be read.
    fn get_source_file(
        &self,
        file_name: &str,
        path: &str,
        language_version: ScriptTarget,
    ) -> Result<Option<Arc<SourceFile>>, String>;

    fn directory_exists(&self, directory_name: &str) -> bool;

    fn create_directory(&self, directory_name: &str) -> io::Result<()>;

    fn get_current_directory(&self) -> String;

    fn use_case_sensitive_file_names(&self) -> bool;

    fn get_canonical_file_name(&self, file_name: &str) -> String {
        if self.use_case_sensitive_file_names() {
            file_name.to_string()
        } else {
            file_name.to_lowercase()
        }
    }

    fn get_default_lib_file_name(&self, options: &CompilerOptions) -> String;

    /// Resolve every name imported by `containing_file` at once. Returning
    /// `None` falls back to the built-in resolver.
    fn resolve_module_names(
        &self,
        _module_names: &[String],
        _containing_file: &str,
    ) -> Option<Vec<Option<ResolvedModule>>> {
        None
    }
}

/// `lib.es6.d.ts` for ES2015 and later targets, else `lib.d.ts`.
pub fn default_lib_file_name(options: &CompilerOptions) -> &'static str {
    if options.effective_target() >= ScriptTarget::ES2015 {
        "lib.es6.d.ts"
    } else {
        "lib.d.ts"
    }
}

// =============================================================================
// Source file cache
// =============================================================================

/// Source files handed out by a host, keyed by path.
#[derive(Default)]
struct SourceFileCache {
    files: RefCell<FxHashMap<String, Arc<SourceFile>>>,
}

impl SourceFileCache {
    /// The cached file for `path` if its text, name and target are unchanged,
    /// else a freshly created one (which replaces the cached entry).
    fn get_or_create(
        &self,
        file_name: &str,
        path: &str,
        text: String,
        language_version: ScriptTarget,
    ) -> Arc<SourceFile> {
        let version = SourceVersion::of(&text);
        if let Some(cached) = self.files.borrow().get(path)
            && cached.version == version
            && cached.file_name == file_name
            && cached.language_version == language_version
        {
            trace!(path, "reusing cached source file");
            return Arc::clone(cached);
        }
        let file = Arc::new(SourceFile::new(file_name, path, text, language_version));
        self.files
            .borrow_mut()
            .insert(path.to_string(), Arc::clone(&file));
        file
    }
}

// =============================================================================
// SystemHost
// =============================================================================

/// Directory of the running executable, where the default library ships.
pub fn executable_directory() -> io::Result<String> {
    let executable = std::env::current_exe()?;
    Ok(executable
        .parent()
        .map(|dir| dir.to_string_lossy().into_owned())
        .unwrap_or_default())
}

/// Host backed by the real file system.
pub struct SystemHost {
    current_directory: String,
    default_lib_location: String,
    case_sensitive: bool,
    cache: SourceFileCache,
}

impl SystemHost {
    pub fn new() -> io::Result<Self> {
        let current_directory = std::env::current_dir()?;
        Ok(Self::with_directories(
            &current_directory.to_string_lossy(),
            &executable_directory()?,
        ))
    }

    pub fn with_directories(current_directory: &str, default_lib_location: &str) -> Self {
        SystemHost {
            current_directory: normalize_slashes(current_directory),
            default_lib_location: normalize_slashes(default_lib_location),
            case_sensitive: !cfg!(any(target_os = "windows", target_os = "macos")),
            cache: SourceFileCache::default(),
        }
    }
}

/// Decode file bytes, honouring UTF-8 and UTF-16 byte order marks.
fn decode_text(mut bytes: Vec<u8>) -> Result<String, String> {
    let unsupported = || diagnostic_messages::UNSUPPORTED_FILE_ENCODING.to_string();
    let from_utf16 = |rest: &[u8], decode: fn([u8; 2]) -> u16| {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| decode([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).map_err(|_| unsupported())
    };
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return from_utf16(rest, u16::from_be_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return from_utf16(rest, u16::from_le_bytes);
    }
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        bytes.drain(..3);
    }
    String::from_utf8(bytes).map_err(|_| unsupported())
}

impl ModuleResolutionHost for SystemHost {
    fn file_exists(&self, file_name: &str) -> bool {
        Path::new(file_name).is_file()
    }

    fn read_file(&self, file_name: &str) -> io::Result<String> {
        let bytes = std::fs::read(file_name)?;
        decode_text(bytes).map_err(|message| io::Error::new(io::ErrorKind::InvalidData, message))
    }
}

impl CompilerHost for SystemHost {
    fn get_source_file(
        &self,
        file_name: &str,
        path: &str,
        language_version: ScriptTarget,
    ) -> Result<Option<Arc<SourceFile>>, String> {
        let bytes = match std::fs::read(file_name) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                debug!("Failed to read '{file_name}': {err}");
                return Err(err.to_string());
            }
        };
        let text = decode_text(bytes)?;
        Ok(Some(self.cache.get_or_create(
            file_name,
            path,
            text,
            language_version,
        )))
    }

    fn directory_exists(&self, directory_name: &str) -> bool {
        Path::new(directory_name).is_dir()
    }

    fn create_directory(&self, directory_name: &str) -> io::Result<()> {
        std::fs::create_dir_all(directory_name)
    }

    fn get_current_directory(&self) -> String {
        self.current_directory.clone()
    }

    fn use_case_sensitive_file_names(&self) -> bool {
        self.case_sensitive
    }

    fn get_default_lib_file_name(&self, options: &CompilerOptions) -> String {
        combine_paths(&self.default_lib_location, default_lib_file_name(options))
    }
}

// =============================================================================
// MemoryHost
// =============================================================================

/// Host serving files from memory.
///
/// File names are made absolute against the current directory and
/// canonicalized, so `/a/B.ts` and `/a/b.ts` name the same file on a
/// case-insensitive host.
pub struct MemoryHost {
    current_directory: String,
    case_sensitive: bool,
    default_lib_file_name: String,
    files: RefCell<FxHashMap<String, String>>,
    created_directories: RefCell<FxHashSet<String>>,
    read_errors: RefCell<FxHashMap<String, String>>,
    resolution_override: Option<FxHashMap<String, ResolvedModule>>,
    source_file_requests: Cell<usize>,
    cache: SourceFileCache,
}

impl MemoryHost {
    pub fn new(current_directory: &str) -> Self {
        MemoryHost {
            current_directory: normalize_slashes(current_directory),
            case_sensitive: true,
            default_lib_file_name: "/.lib/lib.d.ts".to_string(),
            files: RefCell::new(FxHashMap::default()),
            created_directories: RefCell::new(FxHashSet::default()),
            read_errors: RefCell::new(FxHashMap::default()),
            resolution_override: None,
            source_file_requests: Cell::new(0),
            cache: SourceFileCache::default(),
        }
    }

    #[must_use]
    pub fn with_file(self, file_name: &str, text: &str) -> Self {
        self.set_file(file_name, text);
        self
    }

    #[must_use]
    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    #[must_use]
    pub fn with_default_lib(mut self, file_name: &str) -> Self {
        self.default_lib_file_name = file_name.to_string();
        self
    }

    /// Answer `resolve_module_names` from a fixed table instead of the
    /// built-in resolver. Names missing from the table are unresolved.
    #[must_use]
    pub fn with_resolved_modules(mut self, modules: FxHashMap<String, ResolvedModule>) -> Self {
        self.resolution_override = Some(modules);
        self
    }

    pub fn set_file(&self, file_name: &str, text: &str) {
        self.files
            .borrow_mut()
            .insert(self.key(file_name), text.to_string());
    }

    pub fn remove_file(&self, file_name: &str) {
        self.files.borrow_mut().remove(&self.key(file_name));
    }

    /// Make reads of `file_name` fail with `message`.
    pub fn set_read_error(&self, file_name: &str, message: &str) {
        self.read_errors
            .borrow_mut()
            .insert(self.key(file_name), message.to_string());
    }

    /// Number of `get_source_file` calls served so far.
    pub fn source_file_requests(&self) -> usize {
        self.source_file_requests.get()
    }

    fn key(&self, file_name: &str) -> String {
        let absolute = get_normalized_absolute_path(file_name, &self.current_directory);
        self.get_canonical_file_name(&absolute)
    }
}

impl ModuleResolutionHost for MemoryHost {
    fn file_exists(&self, file_name: &str) -> bool {
        self.files.borrow().contains_key(&self.key(file_name))
    }

    fn read_file(&self, file_name: &str) -> io::Result<String> {
        let key = self.key(file_name);
        if let Some(message) = self.read_errors.borrow().get(&key) {
            return Err(io::Error::other(message.clone()));
        }
        self.files
            .borrow()
            .get(&key)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("'{file_name}' not found")))
    }
}

impl CompilerHost for MemoryHost {
    fn get_source_file(
        &self,
        file_name: &str,
        path: &str,
        language_version: ScriptTarget,
    ) -> Result<Option<Arc<SourceFile>>, String> {
        self.source_file_requests
            .set(self.source_file_requests.get() + 1);
        match self.read_file(file_name) {
            Ok(text) => Ok(Some(self.cache.get_or_create(
                file_name,
                path,
                text,
                language_version,
            ))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.to_string()),
        }
    }

    fn directory_exists(&self, directory_name: &str) -> bool {
        let key = self.key(directory_name);
        if self.created_directories.borrow().contains(&key) {
            return true;
        }
        let prefix = ensure_trailing_directory_separator(&key);
        self.files.borrow().keys().any(|file| {
            let directory = get_directory_path(file);
            directory == key || directory.starts_with(prefix.as_str())
        })
    }

    fn create_directory(&self, directory_name: &str) -> io::Result<()> {
        let key = self.key(directory_name);
        self.created_directories.borrow_mut().insert(key);
        Ok(())
    }

    fn get_current_directory(&self) -> String {
        self.current_directory.clone()
    }

    fn use_case_sensitive_file_names(&self) -> bool {
        self.case_sensitive
    }

    fn get_default_lib_file_name(&self, _options: &CompilerOptions) -> String {
        self.default_lib_file_name.clone()
    }

    fn resolve_module_names(
        &self,
        module_names: &[String],
        _containing_file: &str,
    ) -> Option<Vec<Option<ResolvedModule>>> {
        let table = self.resolution_override.as_ref()?;
        Some(
            module_names
                .iter()
                .map(|name| table.get(name).cloned())
                .collect(),
        )
    }
}
