//! Path utilities.
//!
//! Paths are handled as strings with `/` separators, the same way the
//! TypeScript compiler handles them. This keeps resolution results identical
//! across platforms (a Windows drive path such as `c:/root/a.ts` is treated
//! the same on every host) and lets virtual hosts use plain strings as keys.
//!
//! Backslashes are converted to `/` by every normalizing function.

pub const DIRECTORY_SEPARATOR: char = '/';

/// Convert every `\` into `/`.
pub fn normalize_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Length of the root portion of `path`.
///
/// - `/a/b` → 1
/// - `//server/share/a` → up to and including the separator after `share`
/// - `c:/a` → 3, `c:a` → 2
/// - `file:///a` → 8, `http://host/a` → up to and including `://`
/// - relative paths → 0
pub fn get_root_length(path: &str) -> usize {
    let bytes = path.as_bytes();
    if bytes.first() == Some(&b'/') {
        if bytes.get(1) != Some(&b'/') {
            return 1;
        }
        let Some(p1) = find_from(path, '/', 2) else {
            return 2;
        };
        let Some(p2) = find_from(path, '/', p1 + 1) else {
            return p1 + 1;
        };
        return p2 + 1;
    }
    if bytes.get(1) == Some(&b':') {
        if bytes.get(2) == Some(&b'/') {
            return 3;
        }
        return 2;
    }
    if path.starts_with("file:///") {
        return "file:///".len();
    }
    if let Some(idx) = path.find("://") {
        return idx + "://".len();
    }
    0
}

fn find_from(path: &str, ch: char, from: usize) -> Option<usize> {
    path.get(from..)?.find(ch).map(|idx| idx + from)
}

/// Whether `path` has a root (absolute, drive-relative or URL-like).
pub fn is_rooted_disk_path(path: &str) -> bool {
    get_root_length(path) != 0
}

/// Directory portion of `path`. The root of a rooted path is its own directory.
pub fn get_directory_path(path: &str) -> &str {
    let root_length = get_root_length(path);
    let end = match path.rfind(DIRECTORY_SEPARATOR) {
        Some(idx) => idx.max(root_length),
        None => root_length,
    };
    &path[..end.min(path.len())]
}

/// Last path component, or the empty string for a bare root.
pub fn get_base_file_name(path: &str) -> &str {
    let root_length = get_root_length(path);
    if root_length == path.len() {
        return "";
    }
    match path.rfind(DIRECTORY_SEPARATOR) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Join two paths. A rooted `path2` replaces `path1`.
pub fn combine_paths(path1: &str, path2: &str) -> String {
    if path1.is_empty() {
        return path2.to_string();
    }
    if path2.is_empty() {
        return path1.to_string();
    }
    if get_root_length(path2) != 0 {
        return path2.to_string();
    }
    if path1.ends_with(DIRECTORY_SEPARATOR) {
        format!("{path1}{path2}")
    } else {
        format!("{path1}{DIRECTORY_SEPARATOR}{path2}")
    }
}

/// Split the non-root part of an already slash-normalized path into
/// components, dropping `.` and folding `..` where possible.
fn get_normalized_parts(normalized_slashed_path: &str, root_length: usize) -> Vec<&str> {
    let mut normalized: Vec<&str> = Vec::new();
    for part in normalized_slashed_path[root_length..].split(DIRECTORY_SEPARATOR) {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." && normalized.last().is_some_and(|last| *last != "..") {
            normalized.pop();
        } else {
            normalized.push(part);
        }
    }
    normalized
}

/// Normalize slashes, remove `.` segments and fold `..` segments.
pub fn normalize_path(path: &str) -> String {
    let path = normalize_slashes(path);
    let root_length = get_root_length(&path);
    let parts = get_normalized_parts(&path, root_length);
    let mut result = String::with_capacity(path.len());
    result.push_str(&path[..root_length]);
    result.push_str(&parts.join("/"));
    result
}

/// Components of `path` made absolute against `current_directory`.
///
/// The first component is the root (possibly empty for relative
/// `current_directory` values); the rest are normalized directory and file
/// names.
pub fn get_normalized_path_components(path: &str, current_directory: &str) -> Vec<String> {
    let mut path = normalize_slashes(path);
    let mut root_length = get_root_length(&path);
    if root_length == 0 {
        path = combine_paths(&normalize_slashes(current_directory), &path);
        root_length = get_root_length(&path);
    }
    let mut components = Vec::new();
    components.push(path[..root_length].to_string());
    components.extend(
        get_normalized_parts(&path, root_length)
            .into_iter()
            .map(str::to_string),
    );
    components
}

/// Inverse of [`get_normalized_path_components`].
pub fn get_normalized_path_from_path_components(components: &[String]) -> String {
    match components.split_first() {
        Some((root, rest)) => format!("{root}{}", rest.join("/")),
        None => String::new(),
    }
}

/// Absolute, normalized form of `file_name` relative to `current_directory`.
pub fn get_normalized_absolute_path(file_name: &str, current_directory: &str) -> String {
    get_normalized_path_from_path_components(&get_normalized_path_components(
        file_name,
        current_directory,
    ))
}

/// Canonical key for a file name: absolute, normalized and passed through the
/// host's canonicalization (lower-casing on case-insensitive file systems).
pub fn to_path(
    file_name: &str,
    base_path: &str,
    get_canonical_file_name: impl Fn(&str) -> String,
) -> String {
    let non_canonical = if is_rooted_disk_path(file_name) {
        normalize_path(file_name)
    } else {
        get_normalized_absolute_path(file_name, base_path)
    };
    get_canonical_file_name(&non_canonical)
}

/// `true` when `path` ends with `extension` and has something before it.
pub fn file_extension_is(path: &str, extension: &str) -> bool {
    path.len() > extension.len() && path.ends_with(extension)
}

/// Whether the last path component contains a `.`.
pub fn has_extension(file_name: &str) -> bool {
    get_base_file_name(file_name).contains('.')
}

/// `.`, `..`, or names starting with `./`, `../`, `.\`, `..\`.
pub fn is_external_module_name_relative(module_name: &str) -> bool {
    let rest = module_name
        .strip_prefix("..")
        .or_else(|| module_name.strip_prefix('.'));
    match rest {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\'),
        None => false,
    }
}

/// Names of the form `./x` or `../x`.
pub fn name_starts_with_dot_slash_or_dot_dot_slash(name: &str) -> bool {
    name.starts_with("./") || name.starts_with("../")
}

pub fn ensure_trailing_directory_separator(path: &str) -> String {
    if path.ends_with(DIRECTORY_SEPARATOR) {
        path.to_string()
    } else {
        format!("{path}{DIRECTORY_SEPARATOR}")
    }
}

/// Iterate `directory` and each of its ancestors up to and including the root.
///
/// The walk stops as soon as [`get_directory_path`] no longer shortens the
/// path, so every ancestor is yielded exactly once.
pub fn ancestor_directories(directory: &str) -> AncestorDirectories {
    AncestorDirectories {
        next: Some(directory.to_string()),
    }
}

pub struct AncestorDirectories {
    next: Option<String>,
}

impl Iterator for AncestorDirectories {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let current = self.next.take()?;
        let parent = get_directory_path(&current);
        if parent != current {
            self.next = Some(parent.to_string());
        }
        Some(current)
    }
}
