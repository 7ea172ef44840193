use clap::Parser;

use super::args::{CliArgs, Jsx, Module, ModuleResolution, Target};
use tsz_common::{ModuleKind, ScriptTarget};
use tsz_program::ModuleResolutionKind;

#[test]
fn parses_defaults() {
    let args = CliArgs::try_parse_from(["tsz"]).expect("default args should parse");

    assert_eq!(args.target, None);
    assert_eq!(args.module, None);
    assert_eq!(args.module_resolution, None);
    assert!(args.project.is_none());
    assert!(args.base_url.is_none());
    assert!(args.pretty.is_none());
    assert!(!args.no_lib);
    assert!(!args.no_resolve);
    assert!(!args.list_files);
    assert!(args.files.is_empty());
}

#[test]
fn parses_common_flags() {
    let args = CliArgs::try_parse_from([
        "tsz",
        "--target",
        "es5",
        "--module",
        "commonjs",
        "--moduleResolution",
        "node",
        "--baseUrl",
        "src",
        "--noLib",
        "--noResolve",
        "--listFiles",
        "--pretty",
        "false",
        "main.ts",
        "other.ts",
    ])
    .expect("flagged args should parse");

    assert_eq!(args.target, Some(Target::Es5));
    assert_eq!(args.module, Some(Module::CommonJs));
    assert_eq!(args.module_resolution, Some(ModuleResolution::Node));
    assert_eq!(args.base_url.as_deref(), Some("src"));
    assert!(args.no_lib);
    assert!(args.no_resolve);
    assert!(args.list_files);
    assert_eq!(args.pretty, Some(false));
    assert_eq!(args.files.len(), 2);
}

#[test]
fn parses_project_short_flag() {
    let args = CliArgs::try_parse_from(["tsz", "-p", "configs"]).expect("project should parse");
    assert_eq!(
        args.project.as_deref(),
        Some(std::path::Path::new("configs"))
    );
}

#[test]
fn module_resolution_names_are_case_insensitive() {
    let args = CliArgs::try_parse_from(["tsz", "--moduleResolution", "NodeJs"])
        .expect("nodejs alias should parse");
    assert_eq!(args.module_resolution, Some(ModuleResolution::Node));

    let args = CliArgs::try_parse_from(["tsz", "--moduleResolution", "BaseUrl"])
        .expect("baseurl should parse");
    assert_eq!(args.module_resolution, Some(ModuleResolution::BaseUrl));
    assert_eq!(
        ModuleResolution::BaseUrl.to_module_resolution_kind(),
        ModuleResolutionKind::BaseUrl
    );
}

#[test]
fn rejects_unknown_module_resolution() {
    assert!(CliArgs::try_parse_from(["tsz", "--moduleResolution", "bundler"]).is_err());
}

#[test]
fn target_aliases_map_to_script_targets() {
    let args = CliArgs::try_parse_from(["tsz", "-t", "ES6"]).expect("es6 alias should parse");
    assert_eq!(args.target, Some(Target::Es2015));
    assert_eq!(Target::Es2015.to_script_target(), ScriptTarget::ES2015);

    let args = CliArgs::try_parse_from(["tsz", "--target", "esnext"]).expect("esnext alias");
    assert_eq!(args.target.map(Target::to_script_target), Some(ScriptTarget::Latest));
}

#[test]
fn module_values_map_to_module_kinds() {
    let args = CliArgs::try_parse_from(["tsz", "-m", "amd"]).expect("amd should parse");
    assert_eq!(args.module.map(Module::to_module_kind), Some(ModuleKind::AMD));
    assert_eq!(Module::Es2015.to_module_kind(), ModuleKind::ES2015);
}

#[test]
fn root_dirs_are_comma_separated() {
    let args = CliArgs::try_parse_from(["tsz", "--rootDirs", "src,generated"])
        .expect("rootDirs should parse");
    assert_eq!(
        args.root_dirs,
        Some(vec!["src".to_string(), "generated".to_string()])
    );
}

#[test]
fn jsx_flag_parses() {
    let args = CliArgs::try_parse_from(["tsz", "--jsx", "react"]).expect("jsx should parse");
    assert_eq!(args.jsx, Some(Jsx::React));
}
