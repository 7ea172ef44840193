//! Structure reuse between successive programs.
//!
//! When the options that shape the file set and the root names are
//! unchanged, a program can take over the file list of its predecessor as
//! long as no file changed in a way that could add or remove files: its
//! `no-default-lib` flag, reference directives, import names and their
//! resolutions must all be the same.

use super::{FileGraph, Program, ProgramTimings, resolve_module_names};
use crate::host::CompilerHost;
use crate::module_resolver::ResolvedModule;
use crate::options::CompilerOptions;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;
use tsz_common::path::get_normalized_absolute_path;

impl Program {
    /// Take over the structure of `old_program`, or `None` when a fresh build
    /// is needed. The old program is consumed in both cases.
    pub(crate) fn try_reuse_structure(
        old_program: Option<Program>,
        root_names: &[String],
        options: &CompilerOptions,
        host: &dyn CompilerHost,
        timings: &mut ProgramTimings,
    ) -> Option<FileGraph> {
        let old_program = old_program?;

        if old_program.options.structure_options() != options.structure_options() {
            debug!("options affecting program structure changed, not reusing");
            return None;
        }
        if old_program.root_names != root_names {
            debug!("root file names changed, not reusing");
            return None;
        }

        let current_directory = host.get_current_directory();
        let mut files = Vec::with_capacity(old_program.files.len());
        let mut modified_files = Vec::new();

        for old_file in &old_program.files {
            let new_file = match host.get_source_file(
                &old_file.file_name,
                &old_file.path,
                options.effective_target(),
            ) {
                Ok(Some(file)) => file,
                Ok(None) | Err(_) => {
                    debug!(file_name = %old_file.file_name, "file is gone, not reusing");
                    return None;
                }
            };

            if new_file.version == old_file.version {
                files.push(Arc::clone(old_file));
                continue;
            }

            if new_file.has_no_default_lib != old_file.has_no_default_lib {
                debug!(file_name = %old_file.file_name, "no-default-lib changed, not reusing");
                return None;
            }

            let same_references = new_file.referenced_files.len() == old_file.referenced_files.len()
                && new_file
                    .referenced_files
                    .iter()
                    .zip(&old_file.referenced_files)
                    .all(|(new, old)| new.file_name == old.file_name);
            if !same_references {
                debug!(file_name = %old_file.file_name, "reference directives changed, not reusing");
                return None;
            }

            let same_imports = new_file.imports().len() == old_file.imports().len()
                && new_file
                    .imports()
                    .iter()
                    .zip(old_file.imports())
                    .all(|(new, old)| new.text == old.text);
            if !same_imports {
                debug!(file_name = %old_file.file_name, "imports changed, not reusing");
                return None;
            }

            let module_names: Vec<String> = new_file
                .imports()
                .iter()
                .map(|import| import.text.clone())
                .collect();
            if !module_names.is_empty() {
                let containing_file = get_normalized_absolute_path(&new_file.file_name, &current_directory);
                let resolutions =
                    resolve_module_names(&module_names, &containing_file, options, host, timings);
                let old_resolutions = old_program.resolved_modules.get(&old_file.path);
                for (index, module_name) in module_names.iter().enumerate() {
                    let new_resolution = resolutions.get(index).cloned().flatten();
                    let old_resolution = old_resolutions
                        .and_then(|resolutions| resolutions.get(module_name))
                        .cloned()
                        .flatten();
                    if resolution_changed(old_resolution.as_ref(), new_resolution.as_ref()) {
                        debug!(
                            file_name = %old_file.file_name,
                            module_name,
                            "module resolution changed, not reusing"
                        );
                        return None;
                    }
                }
            }

            debug!(file_name = %new_file.file_name, "file modified, structure unchanged");
            modified_files.push(new_file.path.clone());
            files.push(new_file);
        }

        let files_by_name: FxHashMap<String, _> = files
            .iter()
            .map(|file| (file.path.clone(), Some(Arc::clone(file))))
            .collect();

        // The resolution caches of modified files carry over unchanged, so
        // the old map can be adopted as a whole.
        let Program {
            resolved_modules,
            file_processing_diagnostics,
            ..
        } = old_program;

        Some(FileGraph {
            files,
            files_by_name,
            resolved_modules,
            file_processing_diagnostics,
            structure_is_reused: true,
            modified_files,
        })
    }
}

fn resolution_changed(old: Option<&ResolvedModule>, new: Option<&ResolvedModule>) -> bool {
    match (old, new) {
        (Some(old), Some(new)) => {
            old.resolved_file_name != new.resolved_file_name
                || old.is_external_library_import != new.is_external_library_import
        }
        (None, None) => false,
        _ => true,
    }
}
