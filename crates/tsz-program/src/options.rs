//! Typed compiler options consumed by the resolver, the program builder and
//! the option validator.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tsz_common::{JsxEmit, ModuleKind, ScriptTarget};

/// Module resolution strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleResolutionKind {
    /// Walk up from the importing file, trying `<dir>/<name><ext>`.
    Classic,
    /// Relative names as files or directories; bare names through
    /// `node_modules` folders.
    NodeJs,
    /// Relative names through `rootDirs`, bare names through `paths` and
    /// `baseUrl`.
    BaseUrl,
}

impl ModuleResolutionKind {
    pub fn name(self) -> &'static str {
        match self {
            ModuleResolutionKind::Classic => "Classic",
            ModuleResolutionKind::NodeJs => "NodeJs",
            ModuleResolutionKind::BaseUrl => "BaseUrl",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    pub module: Option<ModuleKind>,
    pub target: Option<ScriptTarget>,
    pub module_resolution: Option<ModuleResolutionKind>,
    pub base_url: Option<String>,
    /// Directory of the `tsconfig.json` the options came from; used as the
    /// base url when `baseUrl` itself is not set.
    pub inferred_base_url: Option<String>,
    /// Path patterns in declaration order.
    pub paths: Option<IndexMap<String, Vec<String>>>,
    pub root_dirs: Option<Vec<String>>,
    pub allow_non_ts_extensions: bool,
    pub jsx: Option<JsxEmit>,
    pub no_lib: bool,
    pub no_resolve: bool,
    pub force_consistent_casing_in_file_names: bool,
    pub root_dir: Option<String>,
    pub out_dir: Option<String>,
    pub out: Option<String>,
    pub out_file: Option<String>,
    pub source_root: Option<String>,
    pub map_root: Option<String>,
    pub source_map: bool,
    pub inline_source_map: bool,
    pub inline_sources: bool,
    pub declaration: bool,
    pub no_emit: bool,
    pub no_emit_on_error: bool,
    pub isolated_modules: bool,
    pub experimental_decorators: bool,
    pub emit_decorator_metadata: bool,
}

impl CompilerOptions {
    /// The resolution strategy, inferred when `moduleResolution` is not set:
    /// CommonJS modules use `NodeJs`, any of `baseUrl`, `paths` or `rootDirs`
    /// selects `BaseUrl`, and everything else falls back to `Classic`.
    pub fn effective_module_resolution(&self) -> ModuleResolutionKind {
        if let Some(kind) = self.module_resolution {
            return kind;
        }
        if self.module == Some(ModuleKind::CommonJS) {
            ModuleResolutionKind::NodeJs
        } else if self.base_url.is_some() || self.paths.is_some() || self.root_dirs.is_some() {
            ModuleResolutionKind::BaseUrl
        } else {
            ModuleResolutionKind::Classic
        }
    }

    /// Explicit `baseUrl`, else the inferred one.
    pub fn effective_base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .or(self.inferred_base_url.as_deref())
    }

    pub fn effective_target(&self) -> ScriptTarget {
        self.target.unwrap_or_default()
    }

    pub fn structure_options(&self) -> StructureOptions {
        StructureOptions {
            module: self.module,
            target: self.target,
            no_lib: self.no_lib,
            no_resolve: self.no_resolve,
            jsx: self.jsx,
            module_resolution: self.module_resolution,
            base_url: self.base_url.clone(),
            inferred_base_url: self.inferred_base_url.clone(),
            paths: self.paths.as_ref().map(|paths| {
                paths
                    .iter()
                    .map(|(pattern, substitutions)| (pattern.clone(), substitutions.clone()))
                    .collect()
            }),
            root_dirs: self.root_dirs.clone(),
            allow_non_ts_extensions: self.allow_non_ts_extensions,
        }
    }
}

/// The options that change which files a program contains, either directly
/// or through module resolution. Two programs can share structure only if
/// these are equal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructureOptions {
    pub module: Option<ModuleKind>,
    pub target: Option<ScriptTarget>,
    pub no_lib: bool,
    pub no_resolve: bool,
    pub jsx: Option<JsxEmit>,
    pub module_resolution: Option<ModuleResolutionKind>,
    pub base_url: Option<String>,
    pub inferred_base_url: Option<String>,
    /// Pattern order decides ties, so this is a list rather than a map.
    pub paths: Option<Vec<(String, Vec<String>)>>,
    pub root_dirs: Option<Vec<String>>,
    pub allow_non_ts_extensions: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_resolution_kind_wins() {
        let options = CompilerOptions {
            module: Some(ModuleKind::CommonJS),
            module_resolution: Some(ModuleResolutionKind::Classic),
            ..Default::default()
        };
        assert_eq!(
            options.effective_module_resolution(),
            ModuleResolutionKind::Classic
        );
    }

    #[test]
    fn test_resolution_kind_inference() {
        let commonjs = CompilerOptions {
            module: Some(ModuleKind::CommonJS),
            base_url: Some("/root".into()),
            ..Default::default()
        };
        assert_eq!(
            commonjs.effective_module_resolution(),
            ModuleResolutionKind::NodeJs
        );

        let mapped = CompilerOptions {
            module: Some(ModuleKind::AMD),
            root_dirs: Some(vec!["src".into()]),
            ..Default::default()
        };
        assert_eq!(
            mapped.effective_module_resolution(),
            ModuleResolutionKind::BaseUrl
        );

        assert_eq!(
            CompilerOptions::default().effective_module_resolution(),
            ModuleResolutionKind::Classic
        );
    }

    #[test]
    fn test_inferred_base_url_is_fallback() {
        let options = CompilerOptions {
            inferred_base_url: Some("/project".into()),
            ..Default::default()
        };
        assert_eq!(options.effective_base_url(), Some("/project"));

        let options = CompilerOptions {
            base_url: Some("/explicit".into()),
            inferred_base_url: Some("/project".into()),
            ..Default::default()
        };
        assert_eq!(options.effective_base_url(), Some("/explicit"));
    }

    #[test]
    fn test_structure_options_ignore_emit_settings() {
        let a = CompilerOptions {
            module: Some(ModuleKind::AMD),
            ..Default::default()
        };
        let b = CompilerOptions {
            module: Some(ModuleKind::AMD),
            source_map: true,
            out_dir: Some("/out".into()),
            ..Default::default()
        };
        assert_eq!(a.structure_options(), b.structure_options());

        let c = CompilerOptions {
            no_lib: true,
            ..a.clone()
        };
        assert_ne!(a.structure_options(), c.structure_options());
    }

    #[test]
    fn test_structure_options_include_resolution_settings() {
        let base = CompilerOptions::default();
        let changed = [
            CompilerOptions {
                module_resolution: Some(ModuleResolutionKind::Classic),
                ..Default::default()
            },
            CompilerOptions {
                base_url: Some("/x".into()),
                ..Default::default()
            },
            CompilerOptions {
                inferred_base_url: Some("/project".into()),
                ..Default::default()
            },
            CompilerOptions {
                root_dirs: Some(vec!["/a".into()]),
                ..Default::default()
            },
            CompilerOptions {
                allow_non_ts_extensions: true,
                ..Default::default()
            },
        ];
        for options in &changed {
            assert_ne!(base.structure_options(), options.structure_options());
        }
    }

    #[test]
    fn test_structure_options_compare_paths_in_order() {
        let forward: IndexMap<String, Vec<String>> = [
            ("*".to_string(), vec!["a/*".to_string()]),
            ("lib/*".to_string(), vec!["b/*".to_string()]),
        ]
        .into_iter()
        .collect();
        let reversed: IndexMap<String, Vec<String>> = forward
            .iter()
            .rev()
            .map(|(pattern, substitutions)| (pattern.clone(), substitutions.clone()))
            .collect();
        let a = CompilerOptions {
            paths: Some(forward.clone()),
            ..Default::default()
        };
        let b = CompilerOptions {
            paths: Some(reversed),
            ..Default::default()
        };
        assert_ne!(a.structure_options(), b.structure_options());
        assert_eq!(
            a.structure_options(),
            CompilerOptions {
                paths: Some(forward),
                ..Default::default()
            }
            .structure_options()
        );
    }
}
