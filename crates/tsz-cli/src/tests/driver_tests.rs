use super::args::CliArgs;
use super::driver::{ExitStatus, apply_cli_overrides, compile};
use clap::Parser;
use std::path::Path;
use tsz_common::diagnostic_codes;
use tsz_common::path::normalize_slashes;
use tsz_program::{CompilerOptions, ModuleResolutionKind};

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent directory");
    }
    std::fs::write(path, contents).expect("write file");
}

fn normalized(path: &Path) -> String {
    normalize_slashes(&path.to_string_lossy())
}

fn parse_args(extra: &[&str]) -> CliArgs {
    let mut argv = vec!["tsz", "--noLib"];
    argv.extend_from_slice(extra);
    CliArgs::try_parse_from(argv).expect("args should parse")
}

fn file_names(result: &super::driver::CompilationResult) -> Vec<String> {
    result
        .files
        .iter()
        .map(|file| file.file_name.clone())
        .collect()
}

// =============================================================================
// Explicit files
// =============================================================================

#[test]
fn compile_explicit_files_follows_imports() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    write_file(&root.join("main.ts"), "import { util } from \"./util\";\n");
    write_file(&root.join("util.ts"), "export const util = 1;\n");

    let result = compile(&parse_args(&["main.ts"]), root).expect("compile");

    assert_eq!(result.exit_status, ExitStatus::Success);
    assert!(result.diagnostics.is_empty());
    assert_eq!(
        file_names(&result),
        vec![normalized(&root.join("main.ts")), normalized(&root.join("util.ts"))]
    );
}

#[test]
fn compile_with_no_resolve_keeps_only_roots() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    write_file(&root.join("main.ts"), "import { util } from \"./util\";\n");
    write_file(&root.join("util.ts"), "export const util = 1;\n");

    let result = compile(&parse_args(&["--noResolve", "main.ts"]), root).expect("compile");

    assert_eq!(file_names(&result), vec![normalized(&root.join("main.ts"))]);
}

#[test]
fn missing_root_file_reports_file_not_found() {
    let temp = tempfile::tempdir().expect("temp dir");

    let result = compile(&parse_args(&["absent.ts"]), temp.path()).expect("compile");

    assert_eq!(result.exit_status, ExitStatus::DiagnosticsPresentOutputsGenerated);
    assert!(
        result
            .diagnostics
            .iter()
            .any(|diag| diag.code == diagnostic_codes::FILE_NOT_FOUND)
    );
}

#[test]
fn syntax_errors_hide_option_errors() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    write_file(&root.join("main.ts"), "const s = \"unterminated;\n");

    // isolatedModules without a module kind is an option error at ES3.
    let result =
        compile(&parse_args(&["--isolatedModules", "main.ts"]), root).expect("compile");

    assert!(!result.diagnostics.is_empty());
    assert!(
        result
            .diagnostics
            .iter()
            .all(|diag| diag.code == diagnostic_codes::UNTERMINATED_STRING_LITERAL)
    );
}

#[test]
fn option_errors_reported_when_syntax_is_clean() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    write_file(&root.join("main.ts"), "export const value = 1;\n");

    let result =
        compile(&parse_args(&["--isolatedModules", "main.ts"]), root).expect("compile");

    assert!(result.diagnostics.iter().any(|diag| {
        diag.code
            == diagnostic_codes::OPTION_ISOLATED_MODULES_CAN_ONLY_BE_USED_WITH_MODULE_OR_ES2015_TARGET
    }));
    assert_eq!(result.exit_status, ExitStatus::DiagnosticsPresentOutputsGenerated);
}

#[test]
fn project_with_explicit_files_is_an_error() {
    let temp = tempfile::tempdir().expect("temp dir");

    let error = compile(&parse_args(&["-p", ".", "main.ts"]), temp.path())
        .err()
        .expect("mixing project and files should fail");

    assert!(error.to_string().contains("project"));
}

#[test]
fn missing_project_is_an_error() {
    let temp = tempfile::tempdir().expect("temp dir");

    assert!(compile(&parse_args(&["-p", "nowhere"]), temp.path()).is_err());
}

// =============================================================================
// tsconfig.json projects
// =============================================================================

#[test]
fn project_directory_uses_files_list() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    write_file(
        &root.join("tsconfig.json"),
        r#"{
            // comments are fine
            "compilerOptions": { "module": "commonjs" },
            "files": ["src/a.ts"],
        }"#,
    );
    write_file(&root.join("src/a.ts"), "export const a = 1;\n");
    write_file(&root.join("src/b.ts"), "export const b = 1;\n");

    let result = compile(&parse_args(&["-p", "."]), root).expect("compile");

    assert_eq!(result.exit_status, ExitStatus::Success);
    assert_eq!(file_names(&result), vec![normalized(&root.join("src/a.ts"))]);
}

#[test]
fn project_without_files_discovers_sources() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    write_file(
        &root.join("tsconfig.json"),
        r#"{ "compilerOptions": { "module": "commonjs" }, "exclude": ["generated"] }"#,
    );
    write_file(&root.join("src/a.ts"), "export const a = 1;\n");
    write_file(&root.join("src/b.tsx"), "export const b = 1;\n");
    write_file(&root.join("generated/c.ts"), "export const c = 1;\n");

    let result = compile(&parse_args(&["-p", "tsconfig.json"]), root).expect("compile");

    assert_eq!(
        file_names(&result),
        vec![normalized(&root.join("src/a.ts")), normalized(&root.join("src/b.tsx"))]
    );
}

#[test]
fn project_found_from_current_directory() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    write_file(&root.join("tsconfig.json"), r#"{ "files": ["main.ts"] }"#);
    write_file(&root.join("main.ts"), "const x = 1;\n");
    std::fs::create_dir_all(root.join("nested")).expect("create nested");

    let result = compile(&parse_args(&[]), &root.join("nested")).expect("compile");

    assert_eq!(file_names(&result), vec![normalized(&root.join("main.ts"))]);
}

#[test]
fn empty_project_reports_no_inputs() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    write_file(&root.join("tsconfig.json"), "{}");

    let result = compile(&parse_args(&["-p", "."]), root).expect("compile");

    assert_eq!(result.exit_status, ExitStatus::DiagnosticsPresentOutputsSkipped);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(
        result.diagnostics[0].code,
        diagnostic_codes::NO_INPUTS_WERE_FOUND_IN_CONFIG_FILE
    );
}

#[test]
fn no_emit_on_error_skips_outputs() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    write_file(
        &root.join("tsconfig.json"),
        r#"{ "compilerOptions": { "noEmitOnError": true }, "files": ["main.ts"] }"#,
    );
    write_file(&root.join("main.ts"), "const s = 'unterminated;\n");

    let result = compile(&parse_args(&["-p", "."]), root).expect("compile");

    assert_eq!(result.exit_status, ExitStatus::DiagnosticsPresentOutputsSkipped);
}

#[test]
fn invalid_config_is_an_error() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    write_file(
        &root.join("tsconfig.json"),
        r#"{ "compilerOptions": { "moduleResolution": "bundler" } }"#,
    );

    assert!(compile(&parse_args(&["-p", "."]), root).is_err());
}

#[test]
fn no_inputs_without_project_is_an_error() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path().join("empty");
    std::fs::create_dir_all(&root).expect("create dir");

    // Only fails when no tsconfig.json sits above the temp directory.
    if root
        .ancestors()
        .all(|dir| !dir.join("tsconfig.json").exists())
    {
        assert!(compile(&parse_args(&[]), &root).is_err());
    }
}

// =============================================================================
// Command-line overrides
// =============================================================================

#[test]
fn cli_paths_are_relative_to_current_directory() {
    let args = CliArgs::try_parse_from([
        "tsz",
        "--baseUrl",
        "src",
        "--rootDirs",
        "a,../b",
        "--outDir",
        "dist",
        "--moduleResolution",
        "baseurl",
    ])
    .expect("args should parse");
    let mut options = CompilerOptions {
        base_url: Some("/from/config".to_string()),
        ..CompilerOptions::default()
    };

    apply_cli_overrides(&mut options, &args, "/work/project");

    assert_eq!(options.base_url.as_deref(), Some("/work/project/src"));
    assert_eq!(
        options.root_dirs,
        Some(vec!["/work/project/a".to_string(), "/work/b".to_string()])
    );
    assert_eq!(options.out_dir.as_deref(), Some("/work/project/dist"));
    assert_eq!(options.module_resolution, Some(ModuleResolutionKind::BaseUrl));
}

#[test]
fn absent_flags_keep_config_values() {
    let args = CliArgs::try_parse_from(["tsz"]).expect("args should parse");
    let mut options = CompilerOptions {
        no_lib: true,
        base_url: Some("/from/config".to_string()),
        ..CompilerOptions::default()
    };
    let expected = options.clone();

    apply_cli_overrides(&mut options, &args, "/work");

    assert_eq!(options, expected);
}
