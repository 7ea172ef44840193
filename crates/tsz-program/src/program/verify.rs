//! Option validation and the common source directory.
//!
//! Runs once per built or reused program. Every problem becomes a diagnostic;
//! nothing here aborts the build.

use crate::host::CompilerHost;
use crate::options::{CompilerOptions, ModuleResolutionKind};
use crate::source_file::SourceFile;
use std::sync::Arc;
use tsz_common::path::{
    get_normalized_absolute_path, get_normalized_path_components,
    get_normalized_path_from_path_components, get_root_length,
};
use tsz_common::{
    Diagnostic, DiagnosticCollection, DiagnosticMessage, ModuleKind, ScriptTarget, Span, messages,
};

#[derive(Debug, Default)]
pub struct ProgramVerification {
    pub diagnostics: DiagnosticCollection,
    /// Empty unless `outDir`, `sourceRoot` or `mapRoot` is set; otherwise
    /// ends with `/` (or is empty when no common directory exists).
    pub common_source_directory: String,
}

pub fn verify_compiler_options(
    options: &CompilerOptions,
    files: &[Arc<SourceFile>],
    host: &dyn CompilerHost,
) -> ProgramVerification {
    let mut diagnostics = DiagnosticCollection::new();
    let mut report = |message: &DiagnosticMessage, args: &[&str]| {
        diagnostics.add(Diagnostic::global_from_message(message, args));
    };
    let cannot_be_specified_with = messages::OPTION_CANNOT_BE_SPECIFIED_WITH_OPTION;
    let cannot_be_specified_without = messages::OPTION_CANNOT_BE_SPECIFIED_WITHOUT_SPECIFYING_OPTION;

    if options.isolated_modules {
        if options.declaration {
            report(&cannot_be_specified_with, &["declaration", "isolatedModules"]);
        }
        if options.no_emit_on_error {
            report(&cannot_be_specified_with, &["noEmitOnError", "isolatedModules"]);
        }
        if options.out.is_some() {
            report(&cannot_be_specified_with, &["out", "isolatedModules"]);
        }
        if options.out_file.is_some() {
            report(&cannot_be_specified_with, &["outFile", "isolatedModules"]);
        }
    }

    if options.inline_source_map {
        if options.source_map {
            report(&cannot_be_specified_with, &["sourceMap", "inlineSourceMap"]);
        }
        if options.map_root.is_some() {
            report(&cannot_be_specified_with, &["mapRoot", "inlineSourceMap"]);
        }
    }

    match options.module_resolution {
        None => {
            // CommonJS selects NodeJs while baseUrl selects BaseUrl.
            if options.module == Some(ModuleKind::CommonJS) && options.base_url.is_some() {
                report(&messages::MODULE_RESOLUTION_KIND_CANNOT_BE_DETERMINED_AUTOMATICALLY, &[]);
            }
        }
        Some(ModuleResolutionKind::BaseUrl) => {}
        Some(_) => {
            let only_with_base_url = messages::OPTION_CAN_ONLY_BE_USED_WHEN_MODULE_RESOLUTION_IS_BASE_URL;
            if options.base_url.is_some() {
                report(&only_with_base_url, &["baseUrl"]);
            }
            if options.paths.is_some() {
                report(&only_with_base_url, &["paths"]);
            }
            if options.root_dirs.is_some() {
                report(&only_with_base_url, &["rootDirs"]);
            }
        }
    }
    if options.effective_module_resolution() == ModuleResolutionKind::BaseUrl
        && options.effective_base_url().is_none()
    {
        report(
            &messages::MODULE_RESOLUTION_KIND_BASE_URL_CANNOT_BE_USED_WITHOUT_BASE_URL,
            &[],
        );
    }

    if let Some(paths) = &options.paths {
        for (pattern, substitutions) in paths {
            if pattern.matches('*').count() > 1 {
                report(&messages::PATTERN_CAN_HAVE_AT_MOST_ONE_ASTERISK_CHARACTER, &[pattern]);
            }
            for substitution in substitutions {
                if substitution.matches('*').count() > 1 {
                    report(
                        &messages::SUBSTITUTION_CAN_HAVE_AT_MOST_ONE_ASTERISK_CHARACTER,
                        &[substitution, pattern],
                    );
                }
            }
        }
    }

    if options.inline_sources {
        if !options.source_map && !options.inline_source_map {
            report(
                &messages::OPTION_INLINE_SOURCES_REQUIRES_INLINE_SOURCE_MAP_OR_SOURCE_MAP,
                &[],
            );
        }
        if options.source_root.is_some() {
            report(&cannot_be_specified_with, &["sourceRoot", "inlineSources"]);
        }
    }

    if options.out.is_some() && options.out_file.is_some() {
        report(&cannot_be_specified_with, &["out", "outFile"]);
    }

    if !options.source_map {
        if options.map_root.is_some() {
            report(&cannot_be_specified_without, &["mapRoot", "sourceMap"]);
        }
        if options.source_root.is_some() && !options.inline_source_map {
            report(&cannot_be_specified_without, &["sourceRoot", "sourceMap"]);
        }
    }

    let language_version = options.effective_target();
    let module_specified = !matches!(options.module, None | Some(ModuleKind::None));
    let mut file_diagnostics = Vec::new();

    if options.isolated_modules {
        if !module_specified && language_version < ScriptTarget::ES2015 {
            report(
                &messages::OPTION_ISOLATED_MODULES_CAN_ONLY_BE_USED_WITH_MODULE_OR_ES2015_TARGET,
                &[],
            );
        }
        if let Some(script) = files
            .iter()
            .find(|file| !file.is_external_module() && !file.is_declaration_file)
        {
            let span = first_token_span(&script.text);
            file_diagnostics.push(Diagnostic::from_message(
                &script.file_name,
                span.start,
                span.len(),
                &messages::CANNOT_COMPILE_NAMESPACES_WHEN_THE_ISOLATED_MODULES_FLAG_IS_PROVIDED,
                &[],
            ));
        }
    } else if language_version < ScriptTarget::ES2015 && !module_specified {
        if let Some((module, indicator)) = files
            .iter()
            .find_map(|file| file.external_module_indicator.map(|span| (file, span)))
        {
            file_diagnostics.push(Diagnostic::from_message(
                &module.file_name,
                indicator.start,
                indicator.len(),
                &messages::CANNOT_COMPILE_MODULES_UNLESS_THE_MODULE_FLAG_IS_PROVIDED,
                &[],
            ));
        }
    }

    if options.module == Some(ModuleKind::ES2015) && language_version < ScriptTarget::ES2015 {
        report(
            &messages::CANNOT_COMPILE_MODULES_INTO_ES2015_WHEN_TARGETING_ES5_OR_LOWER,
            &[],
        );
    }

    let out_file = options.out_file.is_some() || options.out.is_some();
    if out_file
        && module_specified
        && !matches!(options.module, Some(ModuleKind::AMD | ModuleKind::System))
    {
        let option = if options.out.is_some() { "out" } else { "outFile" };
        report(&messages::ONLY_AMD_AND_SYSTEM_MODULES_ARE_SUPPORTED_ALONGSIDE, &[option]);
    }

    let mut common_source_directory = String::new();
    if options.out_dir.is_some() || options.source_root.is_some() || options.map_root.is_some() {
        let current_directory = host.get_current_directory();
        let get_canonical_file_name = |name: &str| host.get_canonical_file_name(name);

        let valid_root_dir = options.root_dir.as_deref().filter(|root_dir| {
            let outside = files_outside_directory(files, root_dir, &current_directory, get_canonical_file_name);
            for file in &outside {
                report(&messages::FILE_IS_NOT_UNDER_ROOT_DIR, &[&file.file_name, root_dir]);
            }
            outside.is_empty()
        });

        common_source_directory = match valid_root_dir {
            Some(root_dir) => get_normalized_absolute_path(root_dir, &current_directory),
            None => {
                let computed =
                    compute_common_source_directory(files, &current_directory, get_canonical_file_name);
                if options.out_dir.is_some()
                    && computed.is_empty()
                    && files.iter().any(|file| get_root_length(&file.file_name) > 1)
                {
                    report(
                        &messages::CANNOT_FIND_THE_COMMON_SUBDIRECTORY_PATH_FOR_THE_INPUT_FILES,
                        &[],
                    );
                }
                computed
            }
        };

        if !common_source_directory.is_empty() && !common_source_directory.ends_with('/') {
            common_source_directory.push('/');
        }
    }

    if options.no_emit {
        if options.out.is_some() {
            report(&cannot_be_specified_with, &["noEmit", "out"]);
        }
        if options.out_file.is_some() {
            report(&cannot_be_specified_with, &["noEmit", "outFile"]);
        }
        if options.out_dir.is_some() {
            report(&cannot_be_specified_with, &["noEmit", "outDir"]);
        }
        if options.declaration {
            report(&cannot_be_specified_with, &["noEmit", "declaration"]);
        }
    }

    if options.emit_decorator_metadata && !options.experimental_decorators {
        report(
            &cannot_be_specified_without,
            &["emitDecoratorMetadata", "experimentalDecorators"],
        );
    }

    diagnostics.extend(file_diagnostics);
    ProgramVerification {
        diagnostics,
        common_source_directory,
    }
}

/// The longest directory containing every non-declaration file, compared
/// component by component after canonicalization. Returns `""` when the files
/// share no root, and `current_directory` when there are only declaration
/// files.
pub fn compute_common_source_directory(
    files: &[Arc<SourceFile>],
    current_directory: &str,
    get_canonical_file_name: impl Fn(&str) -> String,
) -> String {
    let mut common: Option<Vec<String>> = None;
    for file in files.iter().filter(|file| !file.is_declaration_file) {
        let mut components = get_normalized_path_components(&file.file_name, current_directory);
        // The file name itself is not part of the directory.
        components.pop();

        let Some(common) = common.as_mut() else {
            common = Some(components);
            continue;
        };
        let shared = common.len().min(components.len());
        for i in 0..shared {
            if get_canonical_file_name(&common[i]) != get_canonical_file_name(&components[i]) {
                if i == 0 {
                    return String::new();
                }
                common.truncate(i);
                break;
            }
        }
        common.truncate(components.len());
    }

    match common {
        Some(components) => get_normalized_path_from_path_components(&components),
        None => current_directory.to_string(),
    }
}

fn files_outside_directory<'f>(
    files: &'f [Arc<SourceFile>],
    directory: &str,
    current_directory: &str,
    get_canonical_file_name: impl Fn(&str) -> String,
) -> Vec<&'f SourceFile> {
    let absolute_directory =
        get_canonical_file_name(&get_normalized_absolute_path(directory, current_directory));
    files
        .iter()
        .filter(|file| !file.is_declaration_file)
        .filter(|file| {
            let absolute_file =
                get_canonical_file_name(&get_normalized_absolute_path(&file.file_name, current_directory));
            !absolute_file.starts_with(&absolute_directory)
        })
        .map(|file| file.as_ref())
        .collect()
}

/// Span of the first token of `text`, skipping whitespace and comments.
fn first_token_span(text: &str) -> Span {
    let bytes = text.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b' ' | b'\t' | b'\r' | b'\n' => pos += 1,
            b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                pos = memchr::memchr(b'\n', &bytes[pos..]).map_or(bytes.len(), |end| pos + end);
            }
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                pos = memchr::memmem::find(&bytes[pos + 2..], b"*/")
                    .map_or(bytes.len(), |end| pos + 2 + end + 2);
            }
            _ => break,
        }
    }
    if pos >= bytes.len() {
        return Span::new(0, 0);
    }
    let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_' || b == b'$';
    let end = if is_word(bytes[pos]) {
        bytes[pos..]
            .iter()
            .position(|&b| !is_word(b))
            .map_or(bytes.len(), |len| pos + len)
    } else {
        pos + text[pos..].chars().next().map_or(1, char::len_utf8)
    };
    Span::new(pos as u32, end as u32)
}

#[cfg(test)]
#[path = "../tests/verify_tests.rs"]
mod tests;
