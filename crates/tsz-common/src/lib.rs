//! Common types and utilities for the tsz program front-end.
//!
//! This crate provides foundational types used across all tsz crates:
//! - Common enums (`ModuleKind`, `ScriptTarget`, `JsxEmit`)
//! - Source spans (`Span`)
//! - Path utilities that operate on `/`-separated path strings
//! - Diagnostics, message templates and diagnostic collections

// Common types - Shared constants to break circular dependencies
pub mod common;
pub use common::{JsxEmit, ModuleKind, ScriptTarget};

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Path normalization and directory walking helpers
pub mod path;

pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticCollection, DiagnosticMessage,
    DiagnosticMessageChain, DiagnosticRelatedInformation, diagnostic_codes, diagnostic_messages,
    flatten_diagnostic_message_text, format_message, messages,
};
