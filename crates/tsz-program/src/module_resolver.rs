//! Module Resolution Implementation
//!
//! This module implements the three module resolution strategies of the
//! program front-end:
//! - NodeJs (relative names as files or directories, bare names through
//!   `node_modules` folders walking up to the root)
//! - Classic (walk up from the importing file, appending each extension)
//! - BaseUrl (path patterns from `paths`, `rootDirs` aliases, `baseUrl`)
//!
//! Resolution is stateless: each call returns the resolved file (if any) and
//! every location that was tried and rejected, in lookup order. Caching is the
//! caller's job (the program keeps one resolution map per file).

use crate::options::{CompilerOptions, ModuleResolutionKind};
use indexmap::IndexMap;
use tracing::{debug, trace};
use tsz_common::path::{
    ancestor_directories, combine_paths, ensure_trailing_directory_separator, file_extension_is, get_base_file_name,
    get_directory_path, get_normalized_absolute_path, is_rooted_disk_path,
    name_starts_with_dot_slash_or_dot_dot_slash, normalize_path, normalize_slashes,
};

/// TypeScript source extensions, in lookup order.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".d.ts"];

/// TypeScript and JavaScript extensions, in lookup order.
pub const SUPPORTED_JS_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".d.ts", ".js", ".jsx"];

/// The subset of host operations resolution needs.
pub trait ModuleResolutionHost {
    fn file_exists(&self, file_name: &str) -> bool;
    fn read_file(&self, file_name: &str) -> std::io::Result<String>;
}

/// Result of module resolution
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedModule {
    /// Resolved file name, as looked up (normalized, not canonicalized)
    pub resolved_file_name: String,
    /// Whether the module was found in a `node_modules` folder
    pub is_external_library_import: bool,
}

impl ResolvedModule {
    pub fn new(resolved_file_name: String) -> Self {
        ResolvedModule {
            resolved_file_name,
            is_external_library_import: false,
        }
    }

    pub fn external(resolved_file_name: String) -> Self {
        ResolvedModule {
            resolved_file_name,
            is_external_library_import: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedModuleWithFailedLookupLocations {
    pub resolved_module: Option<ResolvedModule>,
    /// Every candidate that was tried and did not exist, in lookup order.
    pub failed_lookup_locations: Vec<String>,
}

impl ResolvedModuleWithFailedLookupLocations {
    fn found(resolved_module: ResolvedModule, failed_lookup_locations: Vec<String>) -> Self {
        ResolvedModuleWithFailedLookupLocations {
            resolved_module: Some(resolved_module),
            failed_lookup_locations,
        }
    }

    fn not_found(failed_lookup_locations: Vec<String>) -> Self {
        ResolvedModuleWithFailedLookupLocations {
            resolved_module: None,
            failed_lookup_locations,
        }
    }

    fn from_file(resolved_file_name: Option<String>, failed_lookup_locations: Vec<String>) -> Self {
        ResolvedModuleWithFailedLookupLocations {
            resolved_module: resolved_file_name.map(ResolvedModule::new),
            failed_lookup_locations,
        }
    }
}

/// Resolve `module_name` imported from `containing_file` with the strategy the
/// options select.
pub fn resolve_module_name<H: ModuleResolutionHost + ?Sized>(
    module_name: &str,
    containing_file: &str,
    options: &CompilerOptions,
    host: &H,
) -> ResolvedModuleWithFailedLookupLocations {
    let kind = options.effective_module_resolution();
    debug!(
        module_name,
        containing_file,
        kind = kind.name(),
        "Resolving module '{module_name}' from '{containing_file}'"
    );
    if options.module_resolution.is_none() {
        trace!(
            "Module resolution kind is not specified, using '{}'",
            kind.name()
        );
    }

    let result = match kind {
        ModuleResolutionKind::NodeJs => node_module_name_resolver(module_name, containing_file, host),
        ModuleResolutionKind::Classic => {
            classic_name_resolver(module_name, containing_file, options, host)
        }
        ModuleResolutionKind::BaseUrl => {
            base_url_module_name_resolver(module_name, containing_file, options, host)
        }
    };

    match &result.resolved_module {
        Some(resolved) => debug!(
            "Module name '{module_name}' was successfully resolved to '{}'",
            resolved.resolved_file_name
        ),
        None => debug!(
            failed_lookups = result.failed_lookup_locations.len(),
            "Module name '{module_name}' was not resolved"
        ),
    }
    result
}

// =============================================================================
// Shared probing
// =============================================================================

/// Try `candidate` with each extension. A candidate that already ends with the
/// extension is tried as-is; otherwise the extension is appended.
pub fn load_module_from_file<H: ModuleResolutionHost + ?Sized>(
    extensions: &[&str],
    candidate: &str,
    failed_lookup_locations: &mut Vec<String>,
    host: &H,
) -> Option<String> {
    for extension in extensions {
        let file_name = if file_extension_is(candidate, extension) {
            candidate.to_string()
        } else {
            format!("{candidate}{extension}")
        };
        if host.file_exists(&file_name) {
            trace!("File '{file_name}' exist - use it as a module resolution result.");
            return Some(file_name);
        }
        trace!("File '{file_name}' does not exist.");
        failed_lookup_locations.push(file_name);
    }
    None
}

/// Resolve `candidate` as a package directory: the `typings` file named by
/// `package.json` if there is one, else `index` with each extension.
pub fn load_node_module_from_directory<H: ModuleResolutionHost + ?Sized>(
    extensions: &[&str],
    candidate: &str,
    failed_lookup_locations: &mut Vec<String>,
    host: &H,
) -> Option<String> {
    let package_json_path = combine_paths(candidate, "package.json");
    if host.file_exists(&package_json_path) {
        if let Some(typings) = read_typings_field(&package_json_path, host) {
            trace!("'package.json' has 'typings' field '{typings}'.");
            let typings_file = normalize_path(&combine_paths(candidate, &typings));
            if let Some(result) =
                load_module_from_file(extensions, &typings_file, failed_lookup_locations, host)
            {
                return Some(result);
            }
        }
    } else {
        // A package.json appearing later would change the result.
        trace!("File '{package_json_path}' does not exist.");
        failed_lookup_locations.push(package_json_path);
    }

    load_module_from_file(
        extensions,
        &combine_paths(candidate, "index"),
        failed_lookup_locations,
        host,
    )
}

/// The non-empty string `typings` field of a manifest. Read and parse
/// failures are treated as an absent field.
fn read_typings_field<H: ModuleResolutionHost + ?Sized>(
    package_json_path: &str,
    host: &H,
) -> Option<String> {
    let text = match host.read_file(package_json_path) {
        Ok(text) => text,
        Err(err) => {
            debug!("Failed to read '{package_json_path}': {err}");
            return None;
        }
    };
    let json: serde_json::Value = match serde_json::from_str(&text) {
        Ok(json) => json,
        Err(err) => {
            debug!("Failed to parse '{package_json_path}': {err}");
            return None;
        }
    };
    json.get("typings")
        .and_then(serde_json::Value::as_str)
        .filter(|typings| !typings.is_empty())
        .map(str::to_string)
}

// =============================================================================
// NodeJs
// =============================================================================

pub fn node_module_name_resolver<H: ModuleResolutionHost + ?Sized>(
    module_name: &str,
    containing_file: &str,
    host: &H,
) -> ResolvedModuleWithFailedLookupLocations {
    let containing_directory = get_directory_path(containing_file);

    if !is_rooted_disk_path(module_name) && !name_starts_with_dot_slash_or_dot_dot_slash(module_name)
    {
        return load_module_from_node_modules(module_name, containing_directory, host);
    }

    let mut failed_lookup_locations = Vec::new();
    let candidate = normalize_path(&combine_paths(containing_directory, module_name));
    let resolved = load_module_from_file(
        SUPPORTED_JS_EXTENSIONS,
        &candidate,
        &mut failed_lookup_locations,
        host,
    )
    .or_else(|| {
        load_node_module_from_directory(
            SUPPORTED_JS_EXTENSIONS,
            &candidate,
            &mut failed_lookup_locations,
            host,
        )
    });
    ResolvedModuleWithFailedLookupLocations::from_file(resolved, failed_lookup_locations)
}

/// Walk from `directory` to the root, probing `<dir>/node_modules/<name>` at
/// every level whose own name is not `node_modules`.
fn load_module_from_node_modules<H: ModuleResolutionHost + ?Sized>(
    module_name: &str,
    directory: &str,
    host: &H,
) -> ResolvedModuleWithFailedLookupLocations {
    let mut failed_lookup_locations = Vec::new();
    for directory in ancestor_directories(&normalize_slashes(directory)) {
        if get_base_file_name(&directory) != "node_modules" {
            let node_modules_folder = combine_paths(&directory, "node_modules");
            let candidate = normalize_path(&combine_paths(&node_modules_folder, module_name));
            trace!("Loading module '{module_name}' from 'node_modules' folder '{node_modules_folder}'.");

            let resolved = load_module_from_file(
                SUPPORTED_EXTENSIONS,
                &candidate,
                &mut failed_lookup_locations,
                host,
            )
            .or_else(|| {
                load_node_module_from_directory(
                    SUPPORTED_EXTENSIONS,
                    &candidate,
                    &mut failed_lookup_locations,
                    host,
                )
            });
            if let Some(resolved) = resolved {
                return ResolvedModuleWithFailedLookupLocations::found(
                    ResolvedModule::external(resolved),
                    failed_lookup_locations,
                );
            }
        }
    }
    ResolvedModuleWithFailedLookupLocations::not_found(failed_lookup_locations)
}

// =============================================================================
// Classic
// =============================================================================

pub fn classic_name_resolver<H: ModuleResolutionHost + ?Sized>(
    module_name: &str,
    containing_file: &str,
    options: &CompilerOptions,
    host: &H,
) -> ResolvedModuleWithFailedLookupLocations {
    // Names with '!' reference loader resources, not files.
    if module_name.contains('!') {
        return ResolvedModuleWithFailedLookupLocations::default();
    }

    let extensions = if options.allow_non_ts_extensions {
        SUPPORTED_JS_EXTENSIONS
    } else {
        SUPPORTED_EXTENSIONS
    };

    let mut failed_lookup_locations = Vec::new();
    for search_path in ancestor_directories(get_directory_path(containing_file)) {
        let search_name = normalize_path(&combine_paths(&search_path, module_name));
        for extension in extensions {
            // .tsx is only resolved when JSX support is enabled
            if *extension == ".tsx" && options.jsx.is_none() {
                continue;
            }
            let candidate = format!("{search_name}{extension}");
            if host.file_exists(&candidate) {
                trace!("File '{candidate}' exist - use it as a module resolution result.");
                return ResolvedModuleWithFailedLookupLocations::found(
                    ResolvedModule::new(candidate),
                    failed_lookup_locations,
                );
            }
            trace!("File '{candidate}' does not exist.");
            failed_lookup_locations.push(candidate);
        }
    }
    ResolvedModuleWithFailedLookupLocations::not_found(failed_lookup_locations)
}

// =============================================================================
// BaseUrl
// =============================================================================

pub fn base_url_module_name_resolver<H: ModuleResolutionHost + ?Sized>(
    module_name: &str,
    containing_file: &str,
    options: &CompilerOptions,
    host: &H,
) -> ResolvedModuleWithFailedLookupLocations {
    let Some(base_url) = options.effective_base_url() else {
        // Reported by the option validator.
        debug!("'baseUrl' is not set, cannot resolve '{module_name}'");
        return ResolvedModuleWithFailedLookupLocations::default();
    };

    if is_rooted_disk_path(module_name) {
        return ResolvedModuleWithFailedLookupLocations::found(
            ResolvedModule::new(module_name.to_string()),
            Vec::new(),
        );
    }

    if name_starts_with_dot_slash_or_dot_dot_slash(module_name) {
        base_url_resolve_relative_module_name(module_name, containing_file, base_url, options, host)
    } else {
        base_url_resolve_non_relative_module_name(module_name, base_url, options, host)
    }
}

/// Relative names: with `rootDirs`, re-root the absolute candidate under the
/// longest matching root and resolve the remainder as a bare name; without
/// `rootDirs`, try the candidate itself.
pub fn base_url_resolve_relative_module_name<H: ModuleResolutionHost + ?Sized>(
    module_name: &str,
    containing_file: &str,
    base_url: &str,
    options: &CompilerOptions,
    host: &H,
) -> ResolvedModuleWithFailedLookupLocations {
    let containing_directory = get_directory_path(containing_file);
    let candidate = normalize_path(&combine_paths(containing_directory, module_name));

    let Some(root_dirs) = &options.root_dirs else {
        let mut failed_lookup_locations = Vec::new();
        let resolved = load_module_from_file(
            SUPPORTED_EXTENSIONS,
            &candidate,
            &mut failed_lookup_locations,
            host,
        );
        return ResolvedModuleWithFailedLookupLocations::from_file(resolved, failed_lookup_locations);
    };

    let mut matched_root: Option<String> = None;
    for root in root_dirs {
        let root = ensure_trailing_directory_separator(&get_normalized_absolute_path(root, base_url));
        if candidate.starts_with(&root)
            && matched_root
                .as_ref()
                .is_none_or(|matched| matched.len() < root.len())
        {
            matched_root = Some(root);
        }
    }

    match matched_root {
        Some(root) => {
            let suffix = &candidate[root.len()..];
            trace!("Module name '{module_name}' matched root directory '{root}', resolving '{suffix}'");
            base_url_resolve_non_relative_module_name(suffix, base_url, options, host)
        }
        None => ResolvedModuleWithFailedLookupLocations::default(),
    }
}

/// Bare names: the matching `paths` pattern's substitutions in order, then
/// `<baseUrl>/<name>` when no pattern matches or no substitution resolves.
pub fn base_url_resolve_non_relative_module_name<H: ModuleResolutionHost + ?Sized>(
    module_name: &str,
    base_url: &str,
    options: &CompilerOptions,
    host: &H,
) -> ResolvedModuleWithFailedLookupLocations {
    let mut failed_lookup_locations = Vec::new();

    if let Some(paths) = &options.paths
        && let Some(pattern_match) = match_pattern(paths, module_name)
    {
        trace!(
            "'paths' option is specified, pattern '{}' matched module name '{module_name}'",
            pattern_match.pattern
        );
        for substitution in pattern_match.substitutions {
            let path = match &pattern_match.star {
                Some(star) => substitution.replacen('*', star, 1),
                None => substitution.clone(),
            };
            let candidate = normalize_path(&combine_paths(base_url, &path));
            if let Some(resolved) =
                load_module_from_file(SUPPORTED_EXTENSIONS, &candidate, &mut failed_lookup_locations, host)
            {
                return ResolvedModuleWithFailedLookupLocations::found(
                    ResolvedModule::new(resolved),
                    failed_lookup_locations,
                );
            }
        }
        trace!("No substitution of pattern '{}' resolved, trying the base url", pattern_match.pattern);
    }

    let candidate = normalize_path(&combine_paths(base_url, module_name));
    let resolved = load_module_from_file(
        SUPPORTED_EXTENSIONS,
        &candidate,
        &mut failed_lookup_locations,
        host,
    );
    ResolvedModuleWithFailedLookupLocations::from_file(resolved, failed_lookup_locations)
}

struct PatternMatch<'p> {
    pattern: &'p str,
    substitutions: &'p [String],
    /// Text captured by `*`; `None` for an exact match.
    star: Option<String>,
}

/// Find the `paths` pattern for `module_name`. An exact (star-free) match
/// wins outright; otherwise the wildcard pattern with the longest prefix wins,
/// and ties go to the pattern declared first.
fn match_pattern<'p>(
    paths: &'p IndexMap<String, Vec<String>>,
    module_name: &str,
) -> Option<PatternMatch<'p>> {
    let mut best: Option<(usize, PatternMatch<'p>)> = None;
    for (pattern, substitutions) in paths {
        match pattern.find('*') {
            Some(star_index) => {
                let prefix = &pattern[..star_index];
                let suffix = &pattern[star_index + 1..];
                if module_name.len() >= prefix.len() + suffix.len()
                    && module_name.starts_with(prefix)
                    && module_name.ends_with(suffix)
                    && best.as_ref().is_none_or(|(longest, _)| prefix.len() > *longest)
                {
                    let star = module_name[prefix.len()..module_name.len() - suffix.len()].to_string();
                    best = Some((
                        prefix.len(),
                        PatternMatch {
                            pattern,
                            substitutions,
                            star: Some(star),
                        },
                    ));
                }
            }
            None if pattern == module_name => {
                return Some(PatternMatch {
                    pattern,
                    substitutions,
                    star: None,
                });
            }
            None => {}
        }
    }
    best.map(|(_, pattern_match)| pattern_match)
}

#[cfg(test)]
#[path = "tests/module_resolver_tests.rs"]
mod tests;
