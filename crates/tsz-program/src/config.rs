//! `tsconfig.json` loading.
//!
//! The file is read as JSONC (comments and trailing commas are tolerated),
//! `extends` chains are merged child-over-base, and the raw string options
//! are turned into a typed [`CompilerOptions`].

use crate::module_resolver::ModuleResolutionHost;
use crate::options::{CompilerOptions, ModuleResolutionKind};
use anyhow::{Context, Result, anyhow, bail};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use tracing::debug;
use tsz_common::path::{
    ancestor_directories, combine_paths, get_directory_path, get_normalized_absolute_path,
    normalize_path, normalize_slashes,
};
use tsz_common::{JsxEmit, ModuleKind, ScriptTarget};

pub const CONFIG_FILE_NAME: &str = "tsconfig.json";

/// Boolean options also accept their string spelling (`"strict": "true"`).
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{}'. Expected true, false, 'true', or 'false'",
                s
            ))),
        },
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TsConfig {
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub compiler_options: Option<RawCompilerOptions>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    #[serde(default)]
    pub files: Option<Vec<String>>,
}

/// `compilerOptions` as written in the file, before validation.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawCompilerOptions {
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub module_resolution: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub paths: Option<IndexMap<String, Vec<String>>>,
    #[serde(default)]
    pub root_dirs: Option<Vec<String>>,
    #[serde(default)]
    pub jsx: Option<String>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub allow_non_ts_extensions: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub no_lib: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub no_resolve: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub force_consistent_casing_in_file_names: Option<bool>,
    #[serde(default)]
    pub root_dir: Option<String>,
    #[serde(default)]
    pub out_dir: Option<String>,
    #[serde(default)]
    pub out: Option<String>,
    #[serde(default)]
    pub out_file: Option<String>,
    #[serde(default)]
    pub source_root: Option<String>,
    #[serde(default)]
    pub map_root: Option<String>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub source_map: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub inline_source_map: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub inline_sources: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub declaration: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub no_emit: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub no_emit_on_error: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub isolated_modules: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub experimental_decorators: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub emit_decorator_metadata: Option<bool>,
}

/// A loaded project.
#[derive(Debug, Clone)]
pub struct ParsedConfig {
    pub options: CompilerOptions,
    /// Absolute names from `files`; `None` means the directory is scanned.
    pub file_names: Option<Vec<String>>,
    /// Absolute `exclude` entries.
    pub exclude: Vec<String>,
    pub config_file_path: String,
    /// Directory containing the config file.
    pub directory: String,
}

/// Walk up from `start_directory` looking for `tsconfig.json`.
pub fn find_config_file<H: ModuleResolutionHost + ?Sized>(
    start_directory: &str,
    host: &H,
) -> Option<String> {
    ancestor_directories(start_directory)
        .map(|directory| combine_paths(&directory, CONFIG_FILE_NAME))
        .find(|candidate| host.file_exists(candidate))
}

pub fn parse_tsconfig(source: &str) -> Result<TsConfig> {
    let stripped = strip_jsonc(source);
    let normalized = remove_trailing_commas(&stripped);
    let config = serde_json::from_str(&normalized).context("failed to parse tsconfig JSON")?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<ParsedConfig> {
    let config_file_path = normalize_path(&path.to_string_lossy());
    let directory = get_directory_path(&config_file_path).to_string();

    let mut visited = FxHashSet::default();
    let config = load_tsconfig_inner(path, &mut visited)?;

    let mut options = resolve_compiler_options(config.compiler_options.as_ref())
        .with_context(|| format!("invalid compilerOptions in {}", path.display()))?;
    options.inferred_base_url = Some(directory.clone());

    let file_names = config.files.map(|files| {
        files
            .iter()
            .map(|file| get_normalized_absolute_path(file, &directory))
            .collect()
    });
    let exclude = config
        .exclude
        .unwrap_or_default()
        .iter()
        .map(|entry| get_normalized_absolute_path(entry, &directory))
        .collect();

    debug!(config = %config_file_path, "loaded project configuration");
    Ok(ParsedConfig {
        options,
        file_names,
        exclude,
        config_file_path,
        directory,
    })
}

fn load_tsconfig_inner(path: &Path, visited: &mut FxHashSet<PathBuf>) -> Result<TsConfig> {
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical.clone()) {
        bail!("tsconfig extends cycle detected at {}", canonical.display());
    }

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read tsconfig: {}", path.display()))?;
    let mut config = parse_tsconfig(&source)
        .with_context(|| format!("failed to parse tsconfig: {}", path.display()))?;

    // Paths in a config are relative to the file that declares them.
    let directory = normalize_slashes(
        &path
            .parent()
            .ok_or_else(|| anyhow!("tsconfig has no parent directory"))?
            .to_string_lossy(),
    );
    absolutize_paths(&mut config, &directory);

    if let Some(extends_path) = config.extends.take() {
        let base_path = resolve_extends_path(path, &extends_path)?;
        debug!(base = %base_path.display(), "merging extended tsconfig");
        let base_config = load_tsconfig_inner(&base_path, visited)?;
        config = merge_configs(base_config, config);
    }

    visited.remove(&canonical);
    Ok(config)
}

fn absolutize_paths(config: &mut TsConfig, directory: &str) {
    let absolute = |value: &mut String| {
        if !value.trim().is_empty() {
            *value = get_normalized_absolute_path(value, directory);
        }
    };
    if let Some(files) = config.files.as_mut() {
        files.iter_mut().for_each(absolute);
    }
    if let Some(exclude) = config.exclude.as_mut() {
        exclude.iter_mut().for_each(absolute);
    }
    let Some(options) = config.compiler_options.as_mut() else {
        return;
    };
    for value in [
        options.base_url.as_mut(),
        options.root_dir.as_mut(),
        options.out_dir.as_mut(),
    ]
    .into_iter()
    .flatten()
    {
        absolute(value);
    }
    if let Some(root_dirs) = options.root_dirs.as_mut() {
        root_dirs.iter_mut().for_each(absolute);
    }
}

fn resolve_extends_path(current_path: &Path, extends: &str) -> Result<PathBuf> {
    let base_dir = current_path
        .parent()
        .ok_or_else(|| anyhow!("tsconfig has no parent directory"))?;
    let mut candidate = PathBuf::from(extends);
    if candidate.extension().is_none() {
        candidate.set_extension("json");
    }

    if candidate.is_absolute() {
        Ok(candidate)
    } else {
        Ok(base_dir.join(candidate))
    }
}

fn merge_configs(base: TsConfig, mut child: TsConfig) -> TsConfig {
    let compiler_options = match (base.compiler_options, child.compiler_options.take()) {
        (Some(base_opts), Some(child_opts)) => Some(merge_compiler_options(base_opts, child_opts)),
        (Some(base_opts), None) => Some(base_opts),
        (None, Some(child_opts)) => Some(child_opts),
        (None, None) => None,
    };

    TsConfig {
        extends: None,
        compiler_options,
        exclude: child.exclude.or(base.exclude),
        files: child.files.or(base.files),
    }
}

fn merge_compiler_options(base: RawCompilerOptions, child: RawCompilerOptions) -> RawCompilerOptions {
    RawCompilerOptions {
        module: child.module.or(base.module),
        target: child.target.or(base.target),
        module_resolution: child.module_resolution.or(base.module_resolution),
        base_url: child.base_url.or(base.base_url),
        paths: child.paths.or(base.paths),
        root_dirs: child.root_dirs.or(base.root_dirs),
        jsx: child.jsx.or(base.jsx),
        allow_non_ts_extensions: child.allow_non_ts_extensions.or(base.allow_non_ts_extensions),
        no_lib: child.no_lib.or(base.no_lib),
        no_resolve: child.no_resolve.or(base.no_resolve),
        force_consistent_casing_in_file_names: child
            .force_consistent_casing_in_file_names
            .or(base.force_consistent_casing_in_file_names),
        root_dir: child.root_dir.or(base.root_dir),
        out_dir: child.out_dir.or(base.out_dir),
        out: child.out.or(base.out),
        out_file: child.out_file.or(base.out_file),
        source_root: child.source_root.or(base.source_root),
        map_root: child.map_root.or(base.map_root),
        source_map: child.source_map.or(base.source_map),
        inline_source_map: child.inline_source_map.or(base.inline_source_map),
        inline_sources: child.inline_sources.or(base.inline_sources),
        declaration: child.declaration.or(base.declaration),
        no_emit: child.no_emit.or(base.no_emit),
        no_emit_on_error: child.no_emit_on_error.or(base.no_emit_on_error),
        isolated_modules: child.isolated_modules.or(base.isolated_modules),
        experimental_decorators: child.experimental_decorators.or(base.experimental_decorators),
        emit_decorator_metadata: child.emit_decorator_metadata.or(base.emit_decorator_metadata),
    }
}

/// Validate raw options. Empty strings count as unset.
pub fn resolve_compiler_options(options: Option<&RawCompilerOptions>) -> Result<CompilerOptions> {
    let mut resolved = CompilerOptions::default();
    let Some(options) = options else {
        return Ok(resolved);
    };
    let non_empty = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    if let Some(module) = non_empty(&options.module) {
        resolved.module = Some(parse_module_kind(&module)?);
    }
    if let Some(target) = non_empty(&options.target) {
        resolved.target = Some(parse_script_target(&target)?);
    }
    if let Some(module_resolution) = non_empty(&options.module_resolution) {
        resolved.module_resolution = Some(parse_module_resolution(&module_resolution)?);
    }
    if let Some(jsx) = non_empty(&options.jsx) {
        resolved.jsx = Some(parse_jsx_emit(&jsx)?);
    }

    resolved.base_url = non_empty(&options.base_url);
    resolved.paths = options.paths.clone();
    resolved.root_dirs = options.root_dirs.clone();
    resolved.root_dir = non_empty(&options.root_dir);
    resolved.out_dir = non_empty(&options.out_dir);
    resolved.out = non_empty(&options.out);
    resolved.out_file = non_empty(&options.out_file);
    resolved.source_root = non_empty(&options.source_root);
    resolved.map_root = non_empty(&options.map_root);

    let flag = |value: Option<bool>| value.unwrap_or(false);
    resolved.allow_non_ts_extensions = flag(options.allow_non_ts_extensions);
    resolved.no_lib = flag(options.no_lib);
    resolved.no_resolve = flag(options.no_resolve);
    resolved.force_consistent_casing_in_file_names =
        flag(options.force_consistent_casing_in_file_names);
    resolved.source_map = flag(options.source_map);
    resolved.inline_source_map = flag(options.inline_source_map);
    resolved.inline_sources = flag(options.inline_sources);
    resolved.declaration = flag(options.declaration);
    resolved.no_emit = flag(options.no_emit);
    resolved.no_emit_on_error = flag(options.no_emit_on_error);
    resolved.isolated_modules = flag(options.isolated_modules);
    resolved.experimental_decorators = flag(options.experimental_decorators);
    resolved.emit_decorator_metadata = flag(options.emit_decorator_metadata);

    Ok(resolved)
}

pub fn parse_module_kind(value: &str) -> Result<ModuleKind> {
    let module = match normalize_option(value).as_str() {
        "none" => ModuleKind::None,
        "commonjs" => ModuleKind::CommonJS,
        "amd" => ModuleKind::AMD,
        "umd" => ModuleKind::UMD,
        "system" => ModuleKind::System,
        "es6" | "es2015" => ModuleKind::ES2015,
        _ => bail!("unsupported compilerOptions.module '{}'", value),
    };
    Ok(module)
}

pub fn parse_script_target(value: &str) -> Result<ScriptTarget> {
    let target = match normalize_option(value).as_str() {
        "es3" => ScriptTarget::ES3,
        "es5" => ScriptTarget::ES5,
        "es6" | "es2015" => ScriptTarget::ES2015,
        "latest" | "esnext" => ScriptTarget::Latest,
        _ => bail!("unsupported compilerOptions.target '{}'", value),
    };
    Ok(target)
}

pub fn parse_module_resolution(value: &str) -> Result<ModuleResolutionKind> {
    let resolution = match normalize_option(value).as_str() {
        "classic" => ModuleResolutionKind::Classic,
        "node" | "nodejs" => ModuleResolutionKind::NodeJs,
        "baseurl" => ModuleResolutionKind::BaseUrl,
        _ => bail!("unsupported compilerOptions.moduleResolution '{}'", value),
    };
    Ok(resolution)
}

pub fn parse_jsx_emit(value: &str) -> Result<JsxEmit> {
    let jsx = match normalize_option(value).as_str() {
        "preserve" => JsxEmit::Preserve,
        "react" => JsxEmit::React,
        _ => bail!("unsupported compilerOptions.jsx '{}'", value),
    };
    Ok(jsx)
}

fn normalize_option(value: &str) -> String {
    let mut normalized = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == '-' || ch == '_' || ch.is_whitespace() {
            continue;
        }
        normalized.push(ch.to_ascii_lowercase());
    }
    normalized
}

fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;
    let mut in_line_comment = false;
    let mut in_block_comment = false;

    while let Some(ch) = chars.next() {
        if in_line_comment {
            if ch == '\n' {
                in_line_comment = false;
                out.push(ch);
            }
            continue;
        }

        if in_block_comment {
            if ch == '*' {
                if let Some('/') = chars.peek().copied() {
                    chars.next();
                    in_block_comment = false;
                }
            } else if ch == '\n' {
                out.push(ch);
            }
            continue;
        }

        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            '/' if chars.peek() == Some(&'/') => {
                chars.next();
                in_line_comment = true;
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                in_block_comment = true;
            }
            _ => out.push(ch),
        }
    }

    out
}

fn remove_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
            out.push(ch);
            continue;
        }

        if ch == ',' {
            let next = chars.clone().find(|next| !next.is_whitespace());
            if matches!(next, Some('}' | ']')) {
                continue;
            }
        }

        out.push(ch);
    }

    out
}
