use anyhow::{Context, Result, bail};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info_span};

use tsz_common::path::{get_normalized_absolute_path, normalize_slashes};
use tsz_common::{Diagnostic, messages};
use tsz_program::{
    CompilerOptions, ParsedConfig, Program, SourceFile, SystemHost, executable_directory,
    find_config_file, load_config,
};

use crate::args::CliArgs;
use crate::fs::{FileDiscoveryOptions, discover_ts_files, resolve_project_path};

/// tsc's exit status codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success = 0,
    DiagnosticsPresentOutputsSkipped = 1,
    DiagnosticsPresentOutputsGenerated = 2,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        self as i32
    }
}

pub struct CompilationResult {
    pub diagnostics: Vec<Diagnostic>,
    /// Every file in the program, default library included, in discovery order.
    pub files: Vec<Arc<SourceFile>>,
    pub exit_status: ExitStatus,
}

pub fn compile(args: &CliArgs, cwd: &Path) -> Result<CompilationResult> {
    let current_directory = normalize_slashes(&cwd.to_string_lossy());
    let lib_location = executable_directory().context("failed to locate the tsz executable")?;
    let host = SystemHost::with_directories(&current_directory, &lib_location);
    let _span = info_span!("compile", cwd = %current_directory).entered();

    let config = load_project_config(args, cwd, &host)?;
    let mut options = config
        .as_ref()
        .map(|config| config.options.clone())
        .unwrap_or_default();
    apply_cli_overrides(&mut options, args, &current_directory);

    let root_names = match root_file_names(args, config.as_ref(), &current_directory)? {
        RootFiles::Names(names) => names,
        RootFiles::NoInputs(config_file_path) => {
            let diagnostic = Diagnostic::global_from_message(
                &messages::NO_INPUTS_WERE_FOUND_IN_CONFIG_FILE,
                &[&config_file_path],
            );
            return Ok(CompilationResult {
                diagnostics: vec![diagnostic],
                files: Vec::new(),
                exit_status: ExitStatus::DiagnosticsPresentOutputsSkipped,
            });
        }
    };
    debug!(roots = root_names.len(), "creating program");

    let program = Program::new(root_names, options, &host, None);
    let diagnostics = collect_diagnostics(&program)?;
    let exit_status = exit_status_for(&diagnostics, program.get_compiler_options());

    Ok(CompilationResult {
        diagnostics,
        files: program.get_source_files().to_vec(),
        exit_status,
    })
}

/// `--project`, else a `tsconfig.json` found walking up from the current
/// directory. Explicit file names on the command line skip the search.
fn load_project_config(
    args: &CliArgs,
    cwd: &Path,
    host: &SystemHost,
) -> Result<Option<ParsedConfig>> {
    if let Some(project) = args.project.as_deref() {
        if !args.files.is_empty() {
            bail!("option 'project' cannot be mixed with source files on a command line");
        }
        let path = resolve_project_path(&cwd.join(project));
        if !path.is_file() {
            bail!("cannot find a tsconfig.json file at {}", path.display());
        }
        return load_config(&path).map(Some);
    }
    if !args.files.is_empty() {
        return Ok(None);
    }
    let current_directory = normalize_slashes(&cwd.to_string_lossy());
    match find_config_file(&current_directory, host) {
        Some(path) => {
            debug!(config = %path, "using tsconfig.json");
            load_config(Path::new(&path)).map(Some)
        }
        None => Ok(None),
    }
}

enum RootFiles {
    Names(Vec<String>),
    /// The config at this path selected no files.
    NoInputs(String),
}

fn root_file_names(
    args: &CliArgs,
    config: Option<&ParsedConfig>,
    current_directory: &str,
) -> Result<RootFiles> {
    if !args.files.is_empty() {
        let names = args
            .files
            .iter()
            .map(|file| get_normalized_absolute_path(&file.to_string_lossy(), current_directory))
            .collect();
        return Ok(RootFiles::Names(names));
    }
    let Some(config) = config else {
        bail!("no input files; pass file names or a project with --project");
    };

    let names = match &config.file_names {
        Some(names) => names.clone(),
        None => {
            let discovery = FileDiscoveryOptions::new(&config.directory)
                .with_exclude(config.exclude.clone());
            discover_ts_files(&discovery).with_context(|| {
                format!("failed to collect input files for {}", config.config_file_path)
            })?
        }
    };
    if names.is_empty() {
        return Ok(RootFiles::NoInputs(config.config_file_path.clone()));
    }
    Ok(RootFiles::Names(names))
}

/// Command-line flags win over `tsconfig.json`. Paths given on the command
/// line are relative to the current directory.
pub fn apply_cli_overrides(options: &mut CompilerOptions, args: &CliArgs, current_directory: &str) {
    let absolute = |path: &str| get_normalized_absolute_path(path, current_directory);

    if let Some(target) = args.target {
        options.target = Some(target.to_script_target());
    }
    if let Some(module) = args.module {
        options.module = Some(module.to_module_kind());
    }
    if let Some(jsx) = args.jsx {
        options.jsx = Some(jsx.to_jsx_emit());
    }
    if let Some(module_resolution) = args.module_resolution {
        options.module_resolution = Some(module_resolution.to_module_resolution_kind());
    }
    if let Some(base_url) = args.base_url.as_deref() {
        options.base_url = Some(absolute(base_url));
    }
    if let Some(root_dirs) = args.root_dirs.as_ref() {
        options.root_dirs = Some(root_dirs.iter().map(|dir| absolute(dir)).collect());
    }
    if let Some(root_dir) = args.root_dir.as_deref() {
        options.root_dir = Some(absolute(root_dir));
    }
    if let Some(out_dir) = args.out_dir.as_deref() {
        options.out_dir = Some(absolute(out_dir));
    }
    if let Some(out_file) = args.out_file.as_deref() {
        options.out_file = Some(absolute(out_file));
    }
    if args.no_lib {
        options.no_lib = true;
    }
    if args.no_resolve {
        options.no_resolve = true;
    }
    if args.force_consistent_casing_in_file_names {
        options.force_consistent_casing_in_file_names = true;
    }
    if args.isolated_modules {
        options.isolated_modules = true;
    }
}

/// Syntax errors first. Option and global errors only when the syntax is
/// clean, and semantic errors only when both are clean.
fn collect_diagnostics(program: &Program) -> Result<Vec<Diagnostic>> {
    let mut diagnostics = program.get_syntactic_diagnostics(None);
    if diagnostics.is_empty() {
        diagnostics = program.get_options_diagnostics();
        diagnostics.extend(program.get_global_diagnostics());
        if diagnostics.is_empty() {
            diagnostics = program
                .get_semantic_diagnostics(None, None)
                .context("semantic diagnostics")?;
        }
    }
    Ok(diagnostics)
}

/// With nothing to emit yet, outputs count as generated unless emit would
/// have been skipped by `noEmit` or `noEmitOnError`.
fn exit_status_for(diagnostics: &[Diagnostic], options: &CompilerOptions) -> ExitStatus {
    if diagnostics.is_empty() {
        ExitStatus::Success
    } else if options.no_emit || options.no_emit_on_error {
        ExitStatus::DiagnosticsPresentOutputsSkipped
    } else {
        ExitStatus::DiagnosticsPresentOutputsGenerated
    }
}
