//! Programs: the deduplicated set of source files that are compiled together.
//!
//! A program is built from root file names by [`ProgramBuilder`], which
//! follows reference directives and resolved imports until every reachable
//! file is known. When an earlier program is supplied and nothing that shapes
//! the file set has changed, its structure is reused instead (see
//! `reuse.rs`). Either way the options are validated afterwards and the
//! result is immutable, apart from the lazily created type checker.
//!
//! [`ProgramBuilder`]: builder::ProgramBuilder

mod builder;
mod checker;
mod reuse;
mod verify;

pub use checker::{CancellationToken, CheckerFactory, OperationCanceled, TypeChecker};
pub use verify::{ProgramVerification, compute_common_source_directory, verify_compiler_options};

use crate::host::CompilerHost;
use crate::module_resolver::{ResolvedModule, resolve_module_name};
use crate::options::CompilerOptions;
use crate::source_file::SourceFile;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, debug_span};
use tsz_common::diagnostics::sort_and_deduplicate_diagnostics;
use tsz_common::path::{
    combine_paths, get_directory_path, is_rooted_disk_path, normalize_path, to_path,
};
use tsz_common::{Diagnostic, DiagnosticCollection};

/// Module name → resolution for one file. Unresolved names map to `None`.
pub type ResolvedModules = FxHashMap<String, Option<ResolvedModule>>;

/// Time spent building a program.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProgramTimings {
    /// Building or reusing the structure, option validation included.
    pub program: Duration,
    /// Inside `CompilerHost::get_source_file`.
    pub source_files: Duration,
    /// Resolving module names, host overrides included.
    pub module_resolution: Duration,
    pub resolved_module_names: usize,
}

/// The file set and bookkeeping produced by either a fresh build or a reuse.
pub(crate) struct FileGraph {
    pub files: Vec<Arc<SourceFile>>,
    pub files_by_name: FxHashMap<String, Option<Arc<SourceFile>>>,
    pub resolved_modules: FxHashMap<String, Arc<ResolvedModules>>,
    pub file_processing_diagnostics: DiagnosticCollection,
    pub structure_is_reused: bool,
    pub modified_files: Vec<String>,
}

pub struct Program {
    root_names: Vec<String>,
    options: CompilerOptions,
    current_directory: String,
    case_sensitive: bool,
    files: Vec<Arc<SourceFile>>,
    /// Canonical path → file, or `None` for a path that was looked up and
    /// not found.
    files_by_name: FxHashMap<String, Option<Arc<SourceFile>>>,
    /// Per-file resolution caches, keyed by canonical path. Written once per
    /// file at discovery and carried over by structure reuse.
    resolved_modules: FxHashMap<String, Arc<ResolvedModules>>,
    file_processing_diagnostics: DiagnosticCollection,
    program_diagnostics: DiagnosticCollection,
    common_source_directory: String,
    structure_is_reused: bool,
    modified_files: Vec<String>,
    timings: ProgramTimings,
    checker_factory: Option<Box<dyn CheckerFactory>>,
    checker: RefCell<Option<Box<dyn TypeChecker>>>,
}

impl Program {
    /// Build a program for `root_names`, reusing the structure of
    /// `old_program` when possible. The old program is consumed either way.
    pub fn new(
        root_names: Vec<String>,
        options: CompilerOptions,
        host: &dyn CompilerHost,
        old_program: Option<Program>,
    ) -> Program {
        let start = Instant::now();
        let _span = debug_span!("create_program", roots = root_names.len()).entered();
        let mut timings = ProgramTimings::default();

        let reused =
            Program::try_reuse_structure(old_program, &root_names, &options, host, &mut timings);
        let graph = match reused {
            Some(graph) => graph,
            None => builder::ProgramBuilder::new(&options, host, &mut timings).build(&root_names),
        };

        let ProgramVerification {
            diagnostics: program_diagnostics,
            common_source_directory,
        } = verify_compiler_options(&options, &graph.files, host);

        timings.program = start.elapsed();
        debug!(
            files = graph.files.len(),
            reused = graph.structure_is_reused,
            modified = graph.modified_files.len(),
            elapsed_ms = timings.program.as_millis() as u64,
            "program created"
        );

        Program {
            root_names,
            options,
            current_directory: host.get_current_directory(),
            case_sensitive: host.use_case_sensitive_file_names(),
            files: graph.files,
            files_by_name: graph.files_by_name,
            resolved_modules: graph.resolved_modules,
            file_processing_diagnostics: graph.file_processing_diagnostics,
            program_diagnostics,
            common_source_directory,
            structure_is_reused: graph.structure_is_reused,
            modified_files: graph.modified_files,
            timings,
            checker_factory: None,
            checker: RefCell::new(None),
        }
    }

    /// Attach the factory used to create the type checker on first use.
    #[must_use]
    pub fn with_checker_factory(mut self, factory: Box<dyn CheckerFactory>) -> Self {
        self.checker_factory = Some(factory);
        self.checker = RefCell::new(None);
        self
    }

    pub fn get_root_file_names(&self) -> &[String] {
        &self.root_names
    }

    /// Every file in the program; the default library, when included, first.
    pub fn get_source_files(&self) -> &[Arc<SourceFile>] {
        &self.files
    }

    pub fn get_source_file(&self, file_name: &str) -> Option<&Arc<SourceFile>> {
        let path = to_path(file_name, &self.current_directory, |name| {
            self.get_canonical_file_name(name)
        });
        self.files_by_name.get(&path)?.as_ref()
    }

    pub fn get_compiler_options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn get_current_directory(&self) -> &str {
        &self.current_directory
    }

    /// Common directory of the non-declaration inputs, ending with `/`.
    /// Only computed when `outDir`, `sourceRoot` or `mapRoot` is set.
    pub fn get_common_source_directory(&self) -> &str {
        &self.common_source_directory
    }

    /// The module resolutions recorded for the file at canonical `path`.
    /// Files without imports have none.
    pub fn resolved_modules(&self, path: &str) -> Option<&Arc<ResolvedModules>> {
        self.resolved_modules.get(path)
    }

    pub fn get_resolved_module(
        &self,
        source_file: &SourceFile,
        module_name: &str,
    ) -> Option<&ResolvedModule> {
        self.resolved_modules
            .get(&source_file.path)?
            .get(module_name)?
            .as_ref()
    }

    /// Whether this program took over the structure of the program it was
    /// created from.
    pub fn structure_is_reused(&self) -> bool {
        self.structure_is_reused
    }

    /// Paths of the files whose text changed when the structure was reused.
    pub fn modified_files(&self) -> &[String] {
        &self.modified_files
    }

    pub fn timings(&self) -> &ProgramTimings {
        &self.timings
    }

    pub fn get_file_processing_diagnostics(&self) -> &DiagnosticCollection {
        &self.file_processing_diagnostics
    }

    /// Global file processing and option diagnostics.
    pub fn get_options_diagnostics(&self) -> Vec<Diagnostic> {
        let mut all = self.file_processing_diagnostics.get_global_diagnostics();
        all.extend(self.program_diagnostics.get_global_diagnostics());
        sort_and_deduplicate_diagnostics(all)
    }

    /// Parse diagnostics of one file, or of every file.
    pub fn get_syntactic_diagnostics(&self, source_file: Option<&SourceFile>) -> Vec<Diagnostic> {
        match source_file {
            Some(file) => file.parse_diagnostics.clone(),
            None => sort_and_deduplicate_diagnostics(
                self.files
                    .iter()
                    .flat_map(|file| file.parse_diagnostics.iter().cloned())
                    .collect(),
            ),
        }
    }

    /// Global diagnostics of the type checker.
    pub fn get_global_diagnostics(&self) -> Vec<Diagnostic> {
        let mut checker = self.checker.borrow_mut();
        match self.checker_for(&mut checker) {
            Some(checker) => sort_and_deduplicate_diagnostics(checker.get_global_diagnostics()),
            None => Vec::new(),
        }
    }

    /// Checker, file processing and program diagnostics of one file, or of
    /// every file. Cancellation is polled between files; a cancelled run
    /// discards the checker.
    pub fn get_semantic_diagnostics(
        &self,
        source_file: Option<&SourceFile>,
        cancellation_token: Option<&dyn CancellationToken>,
    ) -> Result<Vec<Diagnostic>, OperationCanceled> {
        if let Some(file) = source_file {
            return self.get_semantic_diagnostics_for_file(file, cancellation_token);
        }
        let mut all = Vec::new();
        for file in &self.files {
            if let Some(token) = cancellation_token {
                token.throw_if_cancellation_requested()?;
            }
            all.extend(self.get_semantic_diagnostics_for_file(file, cancellation_token)?);
        }
        Ok(sort_and_deduplicate_diagnostics(all))
    }

    /// Everything that has to be clean before emitting.
    pub fn get_pre_emit_diagnostics(
        &self,
        source_file: Option<&SourceFile>,
        cancellation_token: Option<&dyn CancellationToken>,
    ) -> Result<Vec<Diagnostic>, OperationCanceled> {
        let mut all = self.get_options_diagnostics();
        all.extend(self.get_syntactic_diagnostics(source_file));
        all.extend(self.get_global_diagnostics());
        all.extend(self.get_semantic_diagnostics(source_file, cancellation_token)?);
        Ok(sort_and_deduplicate_diagnostics(all))
    }

    fn get_semantic_diagnostics_for_file(
        &self,
        source_file: &SourceFile,
        cancellation_token: Option<&dyn CancellationToken>,
    ) -> Result<Vec<Diagnostic>, OperationCanceled> {
        let mut diagnostics = {
            let mut checker = self.checker.borrow_mut();
            match self.checker_for(&mut checker) {
                Some(active) => match active.get_diagnostics(source_file, cancellation_token) {
                    Ok(diagnostics) => diagnostics,
                    Err(canceled) => {
                        debug!(file = %source_file.file_name, "type checking canceled, dropping checker");
                        *checker = None;
                        return Err(canceled);
                    }
                },
                None => Vec::new(),
            }
        };
        diagnostics.extend(
            self.file_processing_diagnostics
                .get_diagnostics(&source_file.file_name),
        );
        diagnostics.extend(self.program_diagnostics.get_diagnostics(&source_file.file_name));
        Ok(diagnostics)
    }

    /// The checker in `slot`, created through the factory on first use.
    fn checker_for<'c>(
        &self,
        slot: &'c mut Option<Box<dyn TypeChecker>>,
    ) -> Option<&'c mut Box<dyn TypeChecker>> {
        if slot.is_none() {
            let factory = self.checker_factory.as_ref()?;
            *slot = Some(factory.create_type_checker(self));
        }
        slot.as_mut()
    }

    fn get_canonical_file_name(&self, file_name: &str) -> String {
        if self.case_sensitive {
            file_name.to_string()
        } else {
            file_name.to_lowercase()
        }
    }
}

/// Resolve a `/// <reference path>` target against the referencing file.
pub fn resolve_tripleslash_reference(module_name: &str, containing_file: &str) -> String {
    let base_path = get_directory_path(containing_file);
    let referenced_file_name = if is_rooted_disk_path(module_name) {
        module_name.to_string()
    } else {
        combine_paths(base_path, module_name)
    };
    normalize_path(&referenced_file_name)
}

/// Resolve every name imported by one file: through the host override when
/// it provides one, else through [`resolve_module_name`]. The result always
/// has one entry per name; names a host override did not answer are
/// unresolved.
pub(crate) fn resolve_module_names(
    module_names: &[String],
    containing_file: &str,
    options: &CompilerOptions,
    host: &dyn CompilerHost,
    timings: &mut ProgramTimings,
) -> Vec<Option<ResolvedModule>> {
    let start = Instant::now();
    let mut resolutions = host
        .resolve_module_names(module_names, containing_file)
        .unwrap_or_else(|| {
            module_names
                .iter()
                .map(|name| resolve_module_name(name, containing_file, options, host).resolved_module)
                .collect()
        });
    if resolutions.len() != module_names.len() {
        debug!(
            containing_file,
            expected = module_names.len(),
            actual = resolutions.len(),
            "host returned the wrong number of module resolutions"
        );
        resolutions.resize(module_names.len(), None);
    }
    timings.module_resolution += start.elapsed();
    timings.resolved_module_names += module_names.len();
    resolutions
}

#[cfg(test)]
#[path = "../tests/program_tests.rs"]
mod tests;
