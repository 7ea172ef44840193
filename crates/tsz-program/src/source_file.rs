//! Source files as seen by the program builder.
//!
//! A `SourceFile` is created once per distinct text by a host and shared as an
//! `Arc<SourceFile>` between successive programs. It is never mutated after
//! construction; the import list is computed lazily and memoized.

use crate::scanner::{self, Node, NodeKind};
use once_cell::sync::OnceCell;
use rustc_hash::FxHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use tsz_common::path::{file_extension_is, is_external_module_name_relative};
use tsz_common::{Diagnostic, ScriptTarget, Span};

pub use crate::scanner::{FileReference, StringLiteral};

/// Content identity of a source file.
///
/// Two files with the same version have the same text, so a program built
/// from one is valid for the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceVersion {
    hash: u64,
    len: usize,
}

impl SourceVersion {
    pub fn of(text: &str) -> Self {
        let mut hasher = FxHasher::default();
        text.hash(&mut hasher);
        SourceVersion {
            hash: hasher.finish(),
            len: text.len(),
        }
    }
}

impl fmt::Display for SourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}-{}", self.hash, self.len)
    }
}

pub struct SourceFile {
    pub file_name: String,
    /// Canonical path used as the program's deduplication key.
    pub path: String,
    pub text: String,
    pub version: SourceVersion,
    pub language_version: ScriptTarget,
    pub has_no_default_lib: bool,
    pub referenced_files: Vec<FileReference>,
    pub statements: Vec<Node>,
    pub external_module_indicator: Option<Span>,
    pub is_declaration_file: bool,
    pub parse_diagnostics: Vec<Diagnostic>,
    imports: OnceCell<Vec<StringLiteral>>,
    line_starts: OnceCell<Vec<u32>>,
}

impl SourceFile {
    pub fn new(file_name: &str, path: &str, text: String, language_version: ScriptTarget) -> Self {
        let pre_processed = scanner::pre_process_file(file_name, &text);
        SourceFile {
            file_name: file_name.to_string(),
            path: path.to_string(),
            version: SourceVersion::of(&text),
            text,
            language_version,
            has_no_default_lib: pre_processed.has_no_default_lib,
            referenced_files: pre_processed.referenced_files,
            statements: pre_processed.statements,
            external_module_indicator: pre_processed.external_module_indicator,
            is_declaration_file: file_extension_is(file_name, ".d.ts"),
            parse_diagnostics: pre_processed.diagnostics,
            imports: OnceCell::new(),
            line_starts: OnceCell::new(),
        }
    }

    pub fn is_external_module(&self) -> bool {
        self.external_module_indicator.is_some()
    }

    pub fn is_javascript_file(&self) -> bool {
        file_extension_is(&self.file_name, ".js") || file_extension_is(&self.file_name, ".jsx")
    }

    /// Module names this file depends on, in source order.
    pub fn imports(&self) -> &[StringLiteral] {
        self.imports
            .get_or_init(|| collect_external_module_references(self))
    }

    /// Zero-based line and character of a byte offset.
    pub fn line_and_character_of_position(&self, position: u32) -> (usize, usize) {
        let line_starts = self.line_starts.get_or_init(|| compute_line_starts(&self.text));
        let line = match line_starts.binary_search(&position) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        };
        let line_start = line_starts.get(line).copied().unwrap_or(0) as usize;
        let end = (position as usize).min(self.text.len());
        let character = self
            .text
            .get(line_start..end)
            .map_or(0, |prefix| prefix.chars().count());
        (line, character)
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("file_name", &self.file_name)
            .field("path", &self.path)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

fn compute_line_starts(text: &str) -> Vec<u32> {
    let bytes = text.as_bytes();
    let mut starts = vec![0u32];
    let mut pos = 0usize;
    while let Some(offset) = memchr::memchr2(b'\n', b'\r', &bytes[pos..]) {
        let at = pos + offset;
        pos = if bytes[at] == b'\r' && bytes.get(at + 1) == Some(&b'\n') {
            at + 2
        } else {
            at + 1
        };
        starts.push(pos as u32);
    }
    starts
}

/// Collect module names from import, import-equals and export declarations,
/// from the bodies of ambient string-named module declarations (non-relative
/// names only) and, for JavaScript files, from `require` calls.
fn collect_external_module_references(file: &SourceFile) -> Vec<StringLiteral> {
    let mut collector = ImportCollector {
        is_javascript_file: file.is_javascript_file(),
        is_declaration_file: file.is_declaration_file,
        imports: Vec::new(),
    };
    for node in &file.statements {
        collector.collect(node, true, false);
    }
    collector.imports
}

struct ImportCollector {
    is_javascript_file: bool,
    is_declaration_file: bool,
    imports: Vec<StringLiteral>,
}

impl ImportCollector {
    fn collect(&mut self, node: &Node, allow_relative_module_names: bool, only_require_calls: bool) {
        if !only_require_calls {
            match node.kind {
                NodeKind::ImportDeclaration
                | NodeKind::ImportEqualsDeclaration
                | NodeKind::ExportDeclaration => {
                    if let Some(specifier) = &node.module_specifier
                        && !specifier.text.is_empty()
                        && (allow_relative_module_names
                            || !is_external_module_name_relative(&specifier.text))
                    {
                        self.imports.push(specifier.clone());
                    }
                }
                NodeKind::ModuleDeclaration { ambient } => {
                    // Ambient external module bodies may only reference
                    // top-level module names.
                    if node.module_specifier.is_some() && (ambient || self.is_declaration_file) {
                        for child in &node.children {
                            self.collect(child, false, only_require_calls);
                        }
                    }
                }
                NodeKind::RequireCall => {}
            }
        }

        if self.is_javascript_file {
            if node.kind == NodeKind::RequireCall {
                if let Some(specifier) = &node.module_specifier
                    && !specifier.text.is_empty()
                {
                    self.imports.push(specifier.clone());
                }
            } else {
                for child in &node.children {
                    self.collect(child, allow_relative_module_names, true);
                }
            }
        }
    }
}
