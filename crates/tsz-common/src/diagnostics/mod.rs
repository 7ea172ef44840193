//! Diagnostic types, message lookup and diagnostic collections.
//!
//! Message data lives in `data.rs`; texts follow TypeScript's
//! `diagnosticMessages.json` so that tsc baselines can be compared directly.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::cmp::Ordering;

// Diagnostic message table, diagnostic_messages, and diagnostic_codes
mod data;
pub use data::{DIAGNOSTIC_MESSAGES, diagnostic_codes, diagnostic_messages, messages};

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

impl DiagnosticCategory {
    pub fn name(self) -> &'static str {
        match self {
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Suggestion => "suggestion",
            DiagnosticCategory::Message => "message",
        }
    }
}

/// Related information for a diagnostic (e.g., "see also" locations).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticRelatedInformation {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

/// A diagnostic with optional related information.
///
/// Global diagnostics (options problems, missing root files) have an empty
/// `file`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
    /// Related information spans (e.g., the reference that caused a lookup)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub const fn error(file: String, start: u32, length: u32, message: String, code: u32) -> Self {
        Self {
            file,
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Error,
            code,
            related_information: Vec::new(),
        }
    }

    /// Create a diagnostic that is not bound to any file.
    #[must_use]
    pub const fn global(message: String, code: u32) -> Self {
        Self::error(String::new(), 0, 0, message, code)
    }

    /// Create a file diagnostic from a message definition, filling `{N}`
    /// placeholders with `args`.
    #[must_use]
    pub fn from_message(
        file: &str,
        start: u32,
        length: u32,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            file: file.to_string(),
            start,
            length,
            message_text: format_message(message.message, args),
            category: message.category,
            code: message.code,
            related_information: Vec::new(),
        }
    }

    /// Create a global diagnostic from a message definition.
    #[must_use]
    pub fn global_from_message(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self::from_message("", 0, 0, message, args)
    }

    /// Create a diagnostic whose text is the flattened form of `chain`.
    #[must_use]
    pub fn from_chain(file: &str, start: u32, length: u32, chain: &DiagnosticMessageChain) -> Self {
        Self {
            file: file.to_string(),
            start,
            length,
            message_text: flatten_diagnostic_message_text(chain, "\n"),
            category: chain.category,
            code: chain.code,
            related_information: Vec::new(),
        }
    }

    /// Add related information to this diagnostic.
    #[must_use]
    pub fn with_related(mut self, file: String, start: u32, length: u32, message: String) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            file,
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Message,
            code: 0,
        });
        self
    }

    pub fn is_global(&self) -> bool {
        self.file.is_empty()
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// A diagnostic message definition with code, category, and message template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

/// Look up a diagnostic message definition by code.
///
/// Returns the `DiagnosticMessage` with template string containing `{0}`, `{1}`, etc. placeholders.
/// Use `format_message()` to fill in the placeholders.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

// =============================================================================
// Message chains
// =============================================================================

/// A message with nested detail messages, printed as an indented tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMessageChain {
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
    pub next: Option<Box<DiagnosticMessageChain>>,
}

impl DiagnosticMessageChain {
    pub fn new(message_text: String, code: u32) -> Self {
        Self {
            message_text,
            category: DiagnosticCategory::Error,
            code,
            next: None,
        }
    }

    /// Wrap this chain under a new head message.
    #[must_use]
    pub fn chain(self, message_text: String, code: u32) -> Self {
        Self {
            message_text,
            category: DiagnosticCategory::Error,
            code,
            next: Some(Box::new(self)),
        }
    }
}

/// Render a message chain, indenting each nested message by two more spaces.
pub fn flatten_diagnostic_message_text(chain: &DiagnosticMessageChain, new_line: &str) -> String {
    let mut result = String::new();
    let mut diagnostic_chain = Some(chain);
    let mut indent = 0usize;
    while let Some(link) = diagnostic_chain {
        if indent > 0 {
            result.push_str(new_line);
            for _ in 0..indent {
                result.push_str("  ");
            }
        }
        result.push_str(&link.message_text);
        indent += 1;
        diagnostic_chain = link.next.as_deref();
    }
    result
}

// =============================================================================
// Ordering
// =============================================================================

/// Ordering used for reporting: file, start, length, code, message text.
pub fn compare_diagnostics(d1: &Diagnostic, d2: &Diagnostic) -> Ordering {
    d1.file
        .cmp(&d2.file)
        .then(d1.start.cmp(&d2.start))
        .then(d1.length.cmp(&d2.length))
        .then(d1.code.cmp(&d2.code))
        .then_with(|| d1.message_text.cmp(&d2.message_text))
}

/// Sort diagnostics into reporting order and drop exact duplicates.
pub fn sort_and_deduplicate_diagnostics(mut diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    diagnostics.sort_by(compare_diagnostics);
    diagnostics.dedup_by(|a, b| compare_diagnostics(a, b) == Ordering::Equal);
    diagnostics
}

// =============================================================================
// Collections
// =============================================================================

/// Diagnostics grouped by file, plus the global (file-less) ones.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollection {
    global_diagnostics: Vec<Diagnostic>,
    file_diagnostics: FxHashMap<String, Vec<Diagnostic>>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_global() {
            self.global_diagnostics.push(diagnostic);
        } else {
            self.file_diagnostics
                .entry(diagnostic.file.clone())
                .or_default()
                .push(diagnostic);
        }
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.add(diagnostic);
        }
    }

    /// Sorted, deduplicated diagnostics of one file.
    pub fn get_diagnostics(&self, file_name: &str) -> Vec<Diagnostic> {
        self.file_diagnostics
            .get(file_name)
            .map(|diagnostics| sort_and_deduplicate_diagnostics(diagnostics.clone()))
            .unwrap_or_default()
    }

    /// Sorted, deduplicated diagnostics that are not bound to a file.
    pub fn get_global_diagnostics(&self) -> Vec<Diagnostic> {
        sort_and_deduplicate_diagnostics(self.global_diagnostics.clone())
    }

    /// Every diagnostic in the collection, sorted and deduplicated.
    pub fn get_all(&self) -> Vec<Diagnostic> {
        let all = self
            .global_diagnostics
            .iter()
            .chain(self.file_diagnostics.values().flatten())
            .cloned()
            .collect();
        sort_and_deduplicate_diagnostics(all)
    }

    pub fn len(&self) -> usize {
        self.global_diagnostics.len() + self.file_diagnostics.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message_fills_placeholders() {
        let text = format_message(diagnostic_messages::CANNOT_READ_FILE, &["/a.ts", "denied"]);
        assert_eq!(text, "Cannot read file '/a.ts': denied");
    }

    #[test]
    fn test_message_table_lookup() {
        let message = get_diagnostic_message(diagnostic_codes::FILE_NOT_FOUND).unwrap();
        assert_eq!(message.message, "File '{0}' not found.");
        assert_eq!(message.category, DiagnosticCategory::Error);
        assert!(get_diagnostic_message(1).is_none());
    }

    #[test]
    fn test_collection_splits_global_and_file_diagnostics() {
        let not_found = messages::FILE_NOT_FOUND;
        let mut collection = DiagnosticCollection::new();
        collection.add(Diagnostic::global_from_message(&not_found, &["/x.ts"]));
        collection.add(Diagnostic::from_message(
            "/a.ts",
            4,
            8,
            &not_found,
            &["/b.ts"],
        ));
        collection.add(Diagnostic::from_message(
            "/a.ts",
            4,
            8,
            &not_found,
            &["/b.ts"],
        ));

        assert_eq!(collection.len(), 3);
        assert_eq!(collection.get_global_diagnostics().len(), 1);
        assert_eq!(collection.get_diagnostics("/a.ts").len(), 1);
        assert!(collection.get_diagnostics("/b.ts").is_empty());
        assert_eq!(collection.get_all().len(), 2);
    }

    #[test]
    fn test_sort_orders_by_file_then_position() {
        let diagnostics = vec![
            Diagnostic::error("/b.ts".into(), 0, 1, "x".into(), 1),
            Diagnostic::error("/a.ts".into(), 9, 1, "x".into(), 1),
            Diagnostic::error("/a.ts".into(), 2, 1, "x".into(), 1),
        ];
        let sorted = sort_and_deduplicate_diagnostics(diagnostics);
        let keys: Vec<(&str, u32)> = sorted.iter().map(|d| (d.file.as_str(), d.start)).collect();
        assert_eq!(keys, vec![("/a.ts", 2), ("/a.ts", 9), ("/b.ts", 0)]);
    }

    #[test]
    fn test_flatten_message_chain_indents_details() {
        let chain = DiagnosticMessageChain::new("inner".into(), 2)
            .chain("middle".into(), 1)
            .chain("outer".into(), 0);
        assert_eq!(
            flatten_diagnostic_message_text(&chain, "\n"),
            "outer\n  middle\n    inner"
        );
    }
}
