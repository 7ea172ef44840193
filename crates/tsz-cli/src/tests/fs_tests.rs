use super::fs::{FileDiscoveryOptions, discover_ts_files, is_valid_module_file, resolve_project_path};
use std::path::Path;
use tsz_common::path::normalize_slashes;

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent directory");
    }
    std::fs::write(path, contents).expect("write file");
}

fn normalized(path: &Path) -> String {
    normalize_slashes(&path.to_string_lossy())
}

#[test]
fn discovers_typescript_files_sorted() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    write_file(&root.join("src/b.ts"), "");
    write_file(&root.join("src/a.tsx"), "");
    write_file(&root.join("types/globals.d.ts"), "");
    write_file(&root.join("src/readme.md"), "");
    write_file(&root.join("src/script.js"), "");

    let files = discover_ts_files(&FileDiscoveryOptions::new(root)).expect("discovery");

    assert_eq!(
        files,
        vec![
            normalized(&root.join("src/a.tsx")),
            normalized(&root.join("src/b.ts")),
            normalized(&root.join("types/globals.d.ts")),
        ]
    );
}

#[test]
fn skips_node_modules() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    write_file(&root.join("main.ts"), "");
    write_file(&root.join("node_modules/lib/index.d.ts"), "");
    write_file(&root.join("nested/node_modules/dep.ts"), "");

    let files = discover_ts_files(&FileDiscoveryOptions::new(root)).expect("discovery");

    assert_eq!(files, vec![normalized(&root.join("main.ts"))]);
}

#[test]
fn skips_excluded_subtrees() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    write_file(&root.join("src/main.ts"), "");
    write_file(&root.join("build/out.d.ts"), "");
    write_file(&root.join("builder/tool.ts"), "");

    let options = FileDiscoveryOptions::new(root)
        .with_exclude(vec![normalized(&root.join("build"))]);
    let files = discover_ts_files(&options).expect("discovery");

    assert_eq!(
        files,
        vec![
            normalized(&root.join("builder/tool.ts")),
            normalized(&root.join("src/main.ts")),
        ]
    );
}

#[test]
fn declaration_next_to_implementation_is_dropped() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    write_file(&root.join("util.ts"), "");
    write_file(&root.join("util.d.ts"), "");
    write_file(&root.join("view.tsx"), "");
    write_file(&root.join("view.d.ts"), "");
    write_file(&root.join("ambient.d.ts"), "");

    let files = discover_ts_files(&FileDiscoveryOptions::new(root)).expect("discovery");

    assert_eq!(
        files,
        vec![
            normalized(&root.join("ambient.d.ts")),
            normalized(&root.join("util.ts")),
            normalized(&root.join("view.tsx")),
        ]
    );
}

#[test]
fn missing_base_directory_is_an_error() {
    let temp = tempfile::tempdir().expect("temp dir");
    let missing = temp.path().join("missing");

    assert!(discover_ts_files(&FileDiscoveryOptions::new(missing)).is_err());
}

#[test]
fn valid_module_files() {
    assert!(is_valid_module_file("/a/b.ts"));
    assert!(is_valid_module_file("/a/b.tsx"));
    assert!(is_valid_module_file("/a/b.d.ts"));
    assert!(!is_valid_module_file("/a/b.js"));
    assert!(!is_valid_module_file("/a/b.json"));
}

#[test]
fn project_directory_maps_to_tsconfig() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();

    assert_eq!(resolve_project_path(root), root.join("tsconfig.json"));

    let explicit = root.join("tsconfig.build.json");
    assert_eq!(resolve_project_path(&explicit), explicit);
}
