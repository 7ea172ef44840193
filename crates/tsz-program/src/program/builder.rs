//! Fresh program construction.
//!
//! Files are discovered depth first. Every accepted file becomes a
//! [`PendingFile`] on an explicit stack holding the edges still to follow
//! (reference directives first, then resolved imports); a file is appended
//! to the program once all of its edges are done, so dependencies come before
//! their dependents. Paths enter `files_by_name` before their edges are
//! followed, which is what makes import cycles terminate.

use super::{
    FileGraph, ProgramTimings, ResolvedModules, resolve_module_names, resolve_tripleslash_reference,
};
use crate::host::CompilerHost;
use crate::module_resolver::{ResolvedModule, SUPPORTED_EXTENSIONS};
use crate::options::CompilerOptions;
use crate::source_file::{SourceFile, StringLiteral};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};
use tsz_common::path::{
    file_extension_is, get_normalized_absolute_path, has_extension, normalize_path, to_path,
};
use tsz_common::{Diagnostic, DiagnosticCollection, DiagnosticMessage, Span, messages};

/// Where a file name came from: a reference directive or an import in
/// `file`, covering `span`. Diagnostics about the name are reported there.
#[derive(Clone, Copy)]
struct ReferenceSite<'r> {
    file: &'r SourceFile,
    span: Span,
}

enum Edge {
    Reference { file_name: String, span: Span },
    Import {
        resolved: ResolvedModule,
        specifier: StringLiteral,
    },
}

struct PendingFile {
    file: Arc<SourceFile>,
    is_default_lib: bool,
    edges: std::vec::IntoIter<Edge>,
}

pub(crate) struct ProgramBuilder<'a> {
    options: &'a CompilerOptions,
    host: &'a dyn CompilerHost,
    timings: &'a mut ProgramTimings,
    current_directory: String,
    files: Vec<Arc<SourceFile>>,
    files_by_name: FxHashMap<String, Option<Arc<SourceFile>>>,
    /// Lower-cased path → first file seen with it. Only kept on
    /// case-sensitive hosts, where two paths can differ only in casing.
    files_by_name_ignore_case: Option<FxHashMap<String, Arc<SourceFile>>>,
    resolved_modules: FxHashMap<String, Arc<ResolvedModules>>,
    diagnostics: DiagnosticCollection,
    skip_default_lib: bool,
    pending: Vec<PendingFile>,
}

impl<'a> ProgramBuilder<'a> {
    pub(crate) fn new(
        options: &'a CompilerOptions,
        host: &'a dyn CompilerHost,
        timings: &'a mut ProgramTimings,
    ) -> Self {
        ProgramBuilder {
            options,
            host,
            timings,
            current_directory: host.get_current_directory(),
            files: Vec::new(),
            files_by_name: FxHashMap::default(),
            files_by_name_ignore_case: host
                .use_case_sensitive_file_names()
                .then(FxHashMap::default),
            resolved_modules: FxHashMap::default(),
            diagnostics: DiagnosticCollection::new(),
            skip_default_lib: options.no_lib,
            pending: Vec::new(),
        }
    }

    pub(crate) fn build(mut self, root_names: &[String]) -> FileGraph {
        for root_name in root_names {
            self.process_root_file(root_name, false);
        }
        // The default library is left out under `noLib` and when any file
        // seen so far carries `/// <reference no-default-lib="true"/>`.
        if self.skip_default_lib {
            debug!("skipping default library");
        } else {
            let default_lib = self.host.get_default_lib_file_name(self.options);
            self.process_root_file(&default_lib, true);
        }

        FileGraph {
            files: self.files,
            files_by_name: self.files_by_name,
            resolved_modules: self.resolved_modules,
            file_processing_diagnostics: self.diagnostics,
            structure_is_reused: false,
            modified_files: Vec::new(),
        }
    }

    fn process_root_file(&mut self, file_name: &str, is_default_lib: bool) {
        self.process_source_file(&normalize_path(file_name), is_default_lib, None);
        self.process_pending_files();
    }

    /// Follow edges until the stack is empty. A newly discovered file is
    /// pushed on top of the file that referenced it and finished first.
    fn process_pending_files(&mut self) {
        while let Some(pending) = self.pending.last_mut() {
            match pending.edges.next() {
                Some(edge) => {
                    let referencing = Arc::clone(&pending.file);
                    self.process_edge(&referencing, edge);
                }
                None => {
                    if let Some(done) = self.pending.pop() {
                        self.add_file(done);
                    }
                }
            }
        }
    }

    fn process_edge(&mut self, referencing: &SourceFile, edge: Edge) {
        match edge {
            Edge::Reference { file_name, span } => {
                let referenced = resolve_tripleslash_reference(&file_name, &referencing.file_name);
                let site = ReferenceSite {
                    file: referencing,
                    span,
                };
                self.process_source_file(&referenced, false, Some(site));
            }
            Edge::Import {
                resolved,
                specifier,
            } => {
                let site = ReferenceSite {
                    file: referencing,
                    span: specifier.span,
                };
                let path = self.to_path(&resolved.resolved_file_name);
                let imported =
                    self.find_source_file(&resolved.resolved_file_name, &path, false, Some(site));
                if let Some(imported) = imported
                    && resolved.is_external_library_import
                {
                    if !imported.is_external_module() {
                        self.report(
                            Some(site),
                            &messages::EXPORTED_EXTERNAL_PACKAGE_TYPINGS_FILE_IS_NOT_A_MODULE,
                            &[&imported.file_name],
                        );
                    } else if let Some(first) = imported.referenced_files.first() {
                        let site = ReferenceSite {
                            file: imported.as_ref(),
                            span: first.span,
                        };
                        self.report(
                            Some(site),
                            &messages::EXPORTED_EXTERNAL_PACKAGE_TYPINGS_FILE_CANNOT_CONTAIN_TRIPLESLASH_REFERENCES,
                            &[],
                        );
                    }
                }
            }
        }
    }

    /// Validate and look up a root or referenced file name. Names without an
    /// extension are tried with each supported extension.
    fn process_source_file(
        &mut self,
        file_name: &str,
        is_default_lib: bool,
        site: Option<ReferenceSite<'_>>,
    ) {
        if has_extension(file_name) {
            let canonical = self.host.get_canonical_file_name(file_name);
            if !self.options.allow_non_ts_extensions
                && !SUPPORTED_EXTENSIONS
                    .iter()
                    .any(|extension| file_extension_is(&canonical, extension))
            {
                let extensions = format!("'{}'", SUPPORTED_EXTENSIONS.join("', '"));
                self.report(
                    site,
                    &messages::FILE_HAS_UNSUPPORTED_EXTENSION,
                    &[file_name, &extensions],
                );
                return;
            }

            let path = self.to_path(file_name);
            if self
                .find_source_file(file_name, &path, is_default_lib, site)
                .is_none()
            {
                self.report(site, &messages::FILE_NOT_FOUND, &[file_name]);
            } else if let Some(site) = site
                && canonical == self.host.get_canonical_file_name(&site.file.file_name)
            {
                self.report(
                    Some(site),
                    &messages::A_FILE_CANNOT_HAVE_A_REFERENCE_TO_ITSELF,
                    &[file_name],
                );
            }
            return;
        }

        if self.options.allow_non_ts_extensions {
            let path = self.to_path(file_name);
            if self
                .find_source_file(file_name, &path, is_default_lib, site)
                .is_none()
            {
                self.report(site, &messages::FILE_NOT_FOUND, &[file_name]);
            }
            return;
        }

        let found = SUPPORTED_EXTENSIONS.iter().any(|extension| {
            let candidate = format!("{file_name}{extension}");
            let path = self.to_path(&candidate);
            self.find_source_file(&candidate, &path, is_default_lib, site)
                .is_some()
        });
        if !found {
            let reported = format!("{file_name}.ts");
            self.report(site, &messages::FILE_NOT_FOUND, &[&reported]);
        }
    }

    /// The file at `path`, loading it through the host the first time the
    /// path is seen. Absence is remembered as well.
    fn find_source_file(
        &mut self,
        file_name: &str,
        path: &str,
        is_default_lib: bool,
        site: Option<ReferenceSite<'_>>,
    ) -> Option<Arc<SourceFile>> {
        if let Some(known) = self.files_by_name.get(path) {
            let known = known.clone();
            if let Some(file) = &known
                && self.options.force_consistent_casing_in_file_names
                && get_normalized_absolute_path(&file.file_name, &self.current_directory)
                    != get_normalized_absolute_path(file_name, &self.current_directory)
            {
                self.report(
                    site,
                    &messages::FILE_NAME_DIFFERS_FROM_ALREADY_INCLUDED_FILE_NAME_ONLY_IN_CASING,
                    &[file_name, &file.file_name],
                );
            }
            return known;
        }

        let start = Instant::now();
        let loaded = self
            .host
            .get_source_file(file_name, path, self.options.effective_target());
        self.timings.source_files += start.elapsed();

        // An unreadable file stays in the program with empty text.
        let file = match loaded {
            Ok(file) => file,
            Err(message) => {
                debug!(file_name, %message, "host failed to read file");
                self.report(site, &messages::CANNOT_READ_FILE, &[file_name, &message]);
                Some(Arc::new(SourceFile::new(
                    file_name,
                    path,
                    String::new(),
                    self.options.effective_target(),
                )))
            }
        };
        self.files_by_name.insert(path.to_string(), file.clone());
        let file = file?;
        trace!(file_name, path, "discovered source file");

        let differs_only_in_casing = match &mut self.files_by_name_ignore_case {
            Some(ignore_case) => match ignore_case.entry(path.to_lowercase()) {
                Entry::Occupied(existing) => Some(existing.get().file_name.clone()),
                Entry::Vacant(slot) => {
                    slot.insert(Arc::clone(&file));
                    None
                }
            },
            None => None,
        };
        if let Some(existing_name) = differs_only_in_casing {
            self.report(
                site,
                &messages::FILE_NAME_DIFFERS_FROM_ALREADY_INCLUDED_FILE_NAME_ONLY_IN_CASING,
                &[file_name, &existing_name],
            );
        }

        self.skip_default_lib |= file.has_no_default_lib;
        let edges = self.collect_edges(&file);
        self.pending.push(PendingFile {
            file: Arc::clone(&file),
            is_default_lib,
            edges: edges.into_iter(),
        });
        Some(file)
    }

    /// The edges of a newly accepted file. Imports are resolved and recorded
    /// even under `noResolve`; only following them is suppressed.
    fn collect_edges(&mut self, file: &SourceFile) -> Vec<Edge> {
        let no_resolve = self.options.no_resolve;
        let mut edges = Vec::new();
        if !no_resolve {
            edges.extend(file.referenced_files.iter().map(|reference| Edge::Reference {
                file_name: reference.file_name.clone(),
                span: reference.span,
            }));
        }

        let imports = file.imports();
        if imports.is_empty() {
            return edges;
        }

        let module_names: Vec<String> = imports.iter().map(|import| import.text.clone()).collect();
        let containing_file = get_normalized_absolute_path(&file.file_name, &self.current_directory);
        let resolutions = resolve_module_names(
            &module_names,
            &containing_file,
            self.options,
            self.host,
            self.timings,
        );

        let mut resolved_modules = ResolvedModules::default();
        for (import, resolution) in imports.iter().zip(resolutions) {
            resolved_modules.insert(import.text.clone(), resolution.clone());
            if !no_resolve && let Some(resolved) = resolution {
                edges.push(Edge::Import {
                    resolved,
                    specifier: import.clone(),
                });
            }
        }
        self.resolved_modules
            .insert(file.path.clone(), Arc::new(resolved_modules));
        edges
    }

    fn add_file(&mut self, pending: PendingFile) {
        trace!(file_name = %pending.file.file_name, "file added to program");
        if pending.is_default_lib {
            self.files.insert(0, pending.file);
        } else {
            self.files.push(pending.file);
        }
    }

    fn to_path(&self, file_name: &str) -> String {
        to_path(file_name, &self.current_directory, |name| {
            self.host.get_canonical_file_name(name)
        })
    }

    fn report(
        &mut self,
        site: Option<ReferenceSite<'_>>,
        message: &DiagnosticMessage,
        args: &[&str],
    ) {
        let diagnostic = match site {
            Some(site) => Diagnostic::from_message(
                &site.file.file_name,
                site.span.start,
                site.span.len(),
                message,
                args,
            ),
            None => Diagnostic::global_from_message(message, args),
        };
        self.diagnostics.add(diagnostic);
    }
}
