//! Tests for module resolution.

use super::*;
use crate::host::MemoryHost;
use tsz_common::{JsxEmit, ModuleKind};

fn paths(entries: &[(&str, &[&str])]) -> IndexMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(pattern, substitutions)| {
            (
                pattern.to_string(),
                substitutions.iter().map(|s| s.to_string()).collect(),
            )
        })
        .collect()
}

fn base_url_options(entries: &[(&str, &[&str])]) -> CompilerOptions {
    CompilerOptions {
        base_url: Some("/root".into()),
        paths: Some(paths(entries)),
        ..Default::default()
    }
}

fn resolved_name(result: &ResolvedModuleWithFailedLookupLocations) -> Option<&str> {
    result
        .resolved_module
        .as_ref()
        .map(|module| module.resolved_file_name.as_str())
}

// =============================================================================
// Strategy selection
// =============================================================================

#[test]
fn test_commonjs_selects_node_resolution() {
    let host = MemoryHost::new("/").with_file("/root/node_modules/pkg.d.ts", "");
    let options = CompilerOptions {
        module: Some(ModuleKind::CommonJS),
        ..Default::default()
    };
    let result = resolve_module_name("pkg", "/root/main.ts", &options, &host);
    let module = result.resolved_module.unwrap();
    assert_eq!(module.resolved_file_name, "/root/node_modules/pkg.d.ts");
    assert!(module.is_external_library_import);
}

#[test]
fn test_default_strategy_is_classic() {
    let host = MemoryHost::new("/").with_file("/root/node_modules/pkg.d.ts", "");
    let result = resolve_module_name("pkg", "/root/main.ts", &CompilerOptions::default(), &host);
    assert!(result.resolved_module.is_none());
    assert_eq!(
        result.failed_lookup_locations,
        vec!["/root/pkg.ts", "/root/pkg.d.ts", "/pkg.ts", "/pkg.d.ts"]
    );
}

// =============================================================================
// NodeJs
// =============================================================================

#[test]
fn test_node_relative_lookup_order() {
    let host = MemoryHost::new("/");
    let result = node_module_name_resolver("./a", "/root/src/main.ts", &host);
    assert!(result.resolved_module.is_none());
    assert_eq!(
        result.failed_lookup_locations,
        vec![
            "/root/src/a.ts",
            "/root/src/a.tsx",
            "/root/src/a.d.ts",
            "/root/src/a.js",
            "/root/src/a.jsx",
            "/root/src/a/package.json",
            "/root/src/a/index.ts",
            "/root/src/a/index.tsx",
            "/root/src/a/index.d.ts",
            "/root/src/a/index.js",
            "/root/src/a/index.jsx",
        ]
    );
}

#[test]
fn test_node_relative_hit_is_not_external() {
    let host = MemoryHost::new("/").with_file("/root/lib/util.d.ts", "");
    let result = node_module_name_resolver("../lib/util", "/root/src/main.ts", &host);
    assert_eq!(
        result.resolved_module,
        Some(ResolvedModule::new("/root/lib/util.d.ts".into()))
    );
    assert_eq!(
        result.failed_lookup_locations,
        vec!["/root/lib/util.ts", "/root/lib/util.tsx"]
    );
}

#[test]
fn test_node_modules_walk_marks_external() {
    let host = MemoryHost::new("/").with_file("/root/node_modules/pkg/index.d.ts", "");
    let result = node_module_name_resolver("pkg", "/root/src/app/main.ts", &host);
    assert_eq!(
        result.resolved_module,
        Some(ResolvedModule::external(
            "/root/node_modules/pkg/index.d.ts".into()
        ))
    );
    assert_eq!(result.failed_lookup_locations.len(), 20);
    assert_eq!(
        result.failed_lookup_locations[0],
        "/root/src/app/node_modules/pkg.ts"
    );
    assert_eq!(
        result.failed_lookup_locations.last().map(String::as_str),
        Some("/root/node_modules/pkg/index.tsx")
    );
}

#[test]
fn test_node_modules_walk_terminates_at_root() {
    let host = MemoryHost::new("/");
    let result = node_module_name_resolver("missing", "/a/b/c/d/main.ts", &host);
    assert!(result.resolved_module.is_none());
    // Five directories, seven lookups each.
    assert_eq!(result.failed_lookup_locations.len(), 35);
    assert_eq!(
        result.failed_lookup_locations.last().map(String::as_str),
        Some("/node_modules/missing/index.d.ts")
    );
}

#[test]
fn test_node_modules_folders_are_not_nested() {
    let host = MemoryHost::new("/");
    let result = node_module_name_resolver("other", "/root/node_modules/dep/index.d.ts", &host);
    assert_eq!(result.failed_lookup_locations.len(), 21);
    assert!(
        result
            .failed_lookup_locations
            .iter()
            .all(|location| !location.contains("node_modules/node_modules"))
    );
}

#[test]
fn test_dot_names_are_looked_up_in_node_modules() {
    let host = MemoryHost::new("/");
    let result = node_module_name_resolver(".", "/root/main.ts", &host);
    assert_eq!(
        result.failed_lookup_locations[0],
        "/root/node_modules.ts"
    );
}

// =============================================================================
// Package manifests
// =============================================================================

#[test]
fn test_manifest_typings_pointer() {
    let host = MemoryHost::new("/")
        .with_file(
            "/root/node_modules/pkg/package.json",
            r#"{ "name": "pkg", "typings": "lib/main.d.ts" }"#,
        )
        .with_file("/root/node_modules/pkg/lib/main.d.ts", "")
        .with_file("/root/node_modules/pkg/index.d.ts", "");
    let result = node_module_name_resolver("pkg", "/root/main.ts", &host);
    assert_eq!(
        resolved_name(&result),
        Some("/root/node_modules/pkg/lib/main.d.ts")
    );
}

#[test]
fn test_manifest_pointer_falls_back_to_index() {
    let host = MemoryHost::new("/")
        .with_file(
            "/root/node_modules/pkg/package.json",
            r#"{ "typings": "missing.d.ts" }"#,
        )
        .with_file("/root/node_modules/pkg/index.d.ts", "");
    let result = node_module_name_resolver("pkg", "/root/main.ts", &host);
    assert_eq!(
        resolved_name(&result),
        Some("/root/node_modules/pkg/index.d.ts")
    );
    let failed = &result.failed_lookup_locations;
    assert!(failed.iter().any(|l| l == "/root/node_modules/pkg/missing.d.ts"));
    assert!(!failed.iter().any(|l| l.ends_with("package.json")));
}

#[test]
fn test_unparsable_manifest_is_ignored() {
    let host = MemoryHost::new("/")
        .with_file("/root/node_modules/pkg/package.json", "{ not json")
        .with_file("/root/node_modules/pkg/index.ts", "");
    let result = node_module_name_resolver("pkg", "/root/main.ts", &host);
    assert_eq!(resolved_name(&result), Some("/root/node_modules/pkg/index.ts"));

    host.set_file("/root/node_modules/pkg/package.json", r#"{ "typings": 42 }"#);
    let result = node_module_name_resolver("pkg", "/root/main.ts", &host);
    assert_eq!(resolved_name(&result), Some("/root/node_modules/pkg/index.ts"));
}

#[test]
fn test_missing_manifest_is_a_failed_lookup() {
    let host = MemoryHost::new("/").with_file("/root/node_modules/pkg/index.ts", "");
    let result = node_module_name_resolver("pkg", "/root/main.ts", &host);
    assert_eq!(
        result.failed_lookup_locations,
        vec![
            "/root/node_modules/pkg.ts",
            "/root/node_modules/pkg.tsx",
            "/root/node_modules/pkg.d.ts",
            "/root/node_modules/pkg/package.json",
        ]
    );
}

// =============================================================================
// Classic
// =============================================================================

#[test]
fn test_classic_walks_up_to_the_root() {
    let host = MemoryHost::new("/").with_file("/root/mod.ts", "");
    let result = classic_name_resolver("mod", "/root/src/main.ts", &CompilerOptions::default(), &host);
    assert_eq!(resolved_name(&result), Some("/root/mod.ts"));
    assert_eq!(
        result.failed_lookup_locations,
        vec!["/root/src/mod.ts", "/root/src/mod.d.ts"]
    );
}

#[test]
fn test_classic_tsx_requires_jsx() {
    let host = MemoryHost::new("/").with_file("/root/view.tsx", "");
    let result = classic_name_resolver("./view", "/root/main.ts", &CompilerOptions::default(), &host);
    assert!(result.resolved_module.is_none());

    let options = CompilerOptions {
        jsx: Some(JsxEmit::React),
        ..Default::default()
    };
    let result = classic_name_resolver("./view", "/root/main.ts", &options, &host);
    assert_eq!(resolved_name(&result), Some("/root/view.tsx"));
    assert_eq!(result.failed_lookup_locations, vec!["/root/view.ts"]);
}

#[test]
fn test_classic_javascript_extensions_when_allowed() {
    let host = MemoryHost::new("/").with_file("/root/legacy.js", "");
    let options = CompilerOptions {
        allow_non_ts_extensions: true,
        ..Default::default()
    };
    let result = classic_name_resolver("legacy", "/root/main.ts", &options, &host);
    assert_eq!(resolved_name(&result), Some("/root/legacy.js"));
}

#[test]
fn test_classic_loader_names_are_never_resolved() {
    let host = MemoryHost::new("/").with_file("/root/text!.ts", "");
    let result = classic_name_resolver("text!", "/root/main.ts", &CompilerOptions::default(), &host);
    assert_eq!(result, ResolvedModuleWithFailedLookupLocations::default());
}

// =============================================================================
// BaseUrl: paths
// =============================================================================

#[test]
fn test_longest_prefix_pattern_wins() {
    let host = MemoryHost::new("/")
        .with_file("/root/libs/foo.ts", "")
        .with_file("/root/generated/lib/foo.ts", "");
    let options = base_url_options(&[("*", &["generated/*"]), ("lib/*", &["libs/*"])]);
    let result = resolve_module_name("lib/foo", "/root/main.ts", &options, &host);
    assert_eq!(resolved_name(&result), Some("/root/libs/foo.ts"));
    assert!(result.failed_lookup_locations.is_empty());

    let result = resolve_module_name("other/foo", "/root/main.ts", &options, &host);
    assert!(result.resolved_module.is_none());
    assert_eq!(
        result.failed_lookup_locations[0],
        "/root/generated/other/foo.ts"
    );
}

#[test]
fn test_equal_prefixes_prefer_first_declared() {
    let host = MemoryHost::new("/");
    let options = base_url_options(&[("lib*", &["first/*"]), ("lib*x", &["second/*"])]);
    let result = resolve_module_name("libfoox", "/root/main.ts", &options, &host);
    assert_eq!(
        result.failed_lookup_locations,
        vec![
            "/root/first/foox.ts",
            "/root/first/foox.tsx",
            "/root/first/foox.d.ts",
            "/root/libfoox.ts",
            "/root/libfoox.tsx",
            "/root/libfoox.d.ts",
        ]
    );
}

#[test]
fn test_exact_pattern_short_circuits() {
    let host = MemoryHost::new("/")
        .with_file("/root/vendor/jquery/jquery.d.ts", "")
        .with_file("/root/generated/jquery.ts", "");
    let options = base_url_options(&[
        ("*", &["generated/*"]),
        ("jquery", &["vendor/jquery/jquery.d.ts"]),
    ]);
    let result = resolve_module_name("jquery", "/root/main.ts", &options, &host);
    assert_eq!(resolved_name(&result), Some("/root/vendor/jquery/jquery.d.ts"));
    assert!(result.failed_lookup_locations.is_empty());
}

#[test]
fn test_substitutions_tried_in_order() {
    let host = MemoryHost::new("/");
    let options = base_url_options(&[("*", &["a/*", "b/*"])]);
    let result = resolve_module_name("x", "/root/main.ts", &options, &host);
    assert!(result.resolved_module.is_none());
    assert_eq!(
        result.failed_lookup_locations,
        vec![
            "/root/a/x.ts",
            "/root/a/x.tsx",
            "/root/a/x.d.ts",
            "/root/b/x.ts",
            "/root/b/x.tsx",
            "/root/b/x.d.ts",
            "/root/x.ts",
            "/root/x.tsx",
            "/root/x.d.ts",
        ]
    );

    host.set_file("/root/b/x.d.ts", "");
    let result = resolve_module_name("x", "/root/main.ts", &options, &host);
    assert_eq!(resolved_name(&result), Some("/root/b/x.d.ts"));
    assert_eq!(result.failed_lookup_locations.len(), 5);
}

#[test]
fn test_failed_substitutions_fall_back_to_base_url() {
    let host = MemoryHost::new("/").with_file("/root/x.ts", "");
    let options = base_url_options(&[("*", &["generated/*"])]);
    let result = resolve_module_name("x", "/root/main.ts", &options, &host);
    assert_eq!(resolved_name(&result), Some("/root/x.ts"));
    assert!(!result.resolved_module.as_ref().is_some_and(|m| m.is_external_library_import));
    assert_eq!(
        result.failed_lookup_locations,
        vec![
            "/root/generated/x.ts",
            "/root/generated/x.tsx",
            "/root/generated/x.d.ts",
        ]
    );
}

#[test]
fn test_unmatched_name_tries_base_url() {
    let host = MemoryHost::new("/").with_file("/root/folder2/file2.ts", "");
    let options = base_url_options(&[("lib/*", &["libs/*"])]);
    let result = resolve_module_name("folder2/file2", "/root/folder1/file1.ts", &options, &host);
    assert_eq!(resolved_name(&result), Some("/root/folder2/file2.ts"));
}

#[test]
fn test_inferred_base_url_is_used() {
    let host = MemoryHost::new("/").with_file("/project/src/util.ts", "");
    let options = CompilerOptions {
        module_resolution: Some(ModuleResolutionKind::BaseUrl),
        inferred_base_url: Some("/project/src".into()),
        ..Default::default()
    };
    let result = resolve_module_name("util", "/project/src/app/main.ts", &options, &host);
    assert_eq!(resolved_name(&result), Some("/project/src/util.ts"));
}

#[test]
fn test_rooted_names_are_returned_without_lookups() {
    let host = MemoryHost::new("/");
    let options = base_url_options(&[]);
    let result = resolve_module_name("/abs/x.ts", "/root/main.ts", &options, &host);
    assert_eq!(resolved_name(&result), Some("/abs/x.ts"));
    assert!(result.failed_lookup_locations.is_empty());
}

#[test]
fn test_missing_base_url_resolves_nothing() {
    let host = MemoryHost::new("/").with_file("/root/a.ts", "");
    let options = CompilerOptions {
        module_resolution: Some(ModuleResolutionKind::BaseUrl),
        ..Default::default()
    };
    let result = resolve_module_name("./a", "/root/main.ts", &options, &host);
    assert_eq!(result, ResolvedModuleWithFailedLookupLocations::default());
}

// =============================================================================
// BaseUrl: rootDirs
// =============================================================================

fn root_dirs_options(paths_table: Option<IndexMap<String, Vec<String>>>) -> CompilerOptions {
    CompilerOptions {
        base_url: Some("/root".into()),
        root_dirs: Some(vec!["src".into(), "generated/src".into()]),
        paths: paths_table,
        ..Default::default()
    }
}

#[test]
fn test_root_dirs_convert_relative_names() {
    let host = MemoryHost::new("/").with_file("/root/src/form1.content.ts", "");
    let options = root_dirs_options(Some(paths(&[("*", &["*", "src/*"])])));
    let result = resolve_module_name(
        "./form1.content",
        "/root/generated/src/main.ts",
        &options,
        &host,
    );
    assert_eq!(resolved_name(&result), Some("/root/src/form1.content.ts"));
    // The remainder `form1.content` went through the pattern table.
    assert_eq!(
        result.failed_lookup_locations,
        vec![
            "/root/form1.content.ts",
            "/root/form1.content.tsx",
            "/root/form1.content.d.ts",
        ]
    );
}

#[test]
fn test_root_dirs_remainder_without_paths_tries_base_url() {
    let host = MemoryHost::new("/").with_file("/root/form1.content.d.ts", "");
    let result = resolve_module_name(
        "./form1.content",
        "/root/src/main.ts",
        &root_dirs_options(None),
        &host,
    );
    assert_eq!(resolved_name(&result), Some("/root/form1.content.d.ts"));
}

#[test]
fn test_root_dirs_longest_root_wins() {
    let host = MemoryHost::new("/").with_file("/root/b.ts", "");
    let options = CompilerOptions {
        base_url: Some("/root".into()),
        root_dirs: Some(vec!["/root/a".into(), "/root/a/deep".into()]),
        ..Default::default()
    };
    let result = resolve_module_name("./b", "/root/a/deep/main.ts", &options, &host);
    assert_eq!(resolved_name(&result), Some("/root/b.ts"));
}

#[test]
fn test_relative_name_outside_root_dirs_fails_without_candidates() {
    let host = MemoryHost::new("/").with_file("/root/other/a.ts", "");
    let result = resolve_module_name("./a", "/root/other/main.ts", &root_dirs_options(None), &host);
    assert_eq!(result, ResolvedModuleWithFailedLookupLocations::default());
}

#[test]
fn test_relative_name_without_root_dirs_tries_candidate() {
    let host = MemoryHost::new("/").with_file("/root/src/file3.ts", "");
    let options = base_url_options(&[("*", &["generated/*"])]);
    let result = resolve_module_name("./file3", "/root/src/file2.ts", &options, &host);
    assert_eq!(resolved_name(&result), Some("/root/src/file3.ts"));
    assert!(result.failed_lookup_locations.is_empty());
}

// =============================================================================
// Extension lookup
// =============================================================================

#[test]
fn test_candidate_with_extension_is_tried_as_is() {
    let host = MemoryHost::new("/").with_file("/root/a.d.ts", "");
    let mut failed = Vec::new();
    let resolved = load_module_from_file(SUPPORTED_EXTENSIONS, "/root/a.d.ts", &mut failed, &host);
    assert_eq!(resolved.as_deref(), Some("/root/a.d.ts"));
    assert!(failed.is_empty());
}
