use super::reporter::{Reporter, diagnostic_from_error};
use anyhow::anyhow;
use std::sync::Arc;
use tsz_common::{Diagnostic, DiagnosticCategory, ScriptTarget};
use tsz_program::SourceFile;

fn source(file_name: &str, text: &str) -> Arc<SourceFile> {
    Arc::new(SourceFile::new(
        file_name,
        file_name,
        text.to_string(),
        ScriptTarget::ES5,
    ))
}

// =============================================================================
// Plain output
// =============================================================================

#[test]
fn plain_output_uses_tsc_location_format() {
    let text = "let a = 1;\nimport x = require(\"missing\");\n";
    let start = text.find("\"missing\"").expect("literal") as u32;
    let reporter = Reporter::new(false).with_sources(&[source("/src/main.ts", text)]);
    let diagnostic = Diagnostic::error(
        "/src/main.ts".to_string(),
        start,
        9,
        "Cannot find module 'missing'.".to_string(),
        2307,
    );

    assert_eq!(
        reporter.format_diagnostic(&diagnostic),
        "/src/main.ts(2,20): error TS2307: Cannot find module 'missing'."
    );
}

#[test]
fn global_diagnostic_has_no_location() {
    let reporter = Reporter::new(false);
    let diagnostic = Diagnostic::global(
        "Cannot find the common subdirectory path for the input files.".to_string(),
        5009,
    );

    assert_eq!(
        reporter.format_diagnostic(&diagnostic),
        "error TS5009: Cannot find the common subdirectory path for the input files."
    );
}

#[test]
fn file_without_source_text_keeps_file_name() {
    let reporter = Reporter::new(false);
    let diagnostic = Diagnostic::error(
        "/src/other.ts".to_string(),
        4,
        1,
        "Something.".to_string(),
        1000,
    );

    assert_eq!(
        reporter.format_diagnostic(&diagnostic),
        "/src/other.ts: error TS1000: Something."
    );
}

#[test]
fn render_ends_each_diagnostic_with_newline() {
    let reporter = Reporter::new(false);
    let output = reporter.render(&[
        Diagnostic::global("First.".to_string(), 1),
        Diagnostic::global("Second.".to_string(), 2),
    ]);

    assert_eq!(output, "error TS1: First.\nerror TS2: Second.\n");
}

#[test]
fn zero_code_is_omitted() {
    let reporter = Reporter::new(false);
    let mut diagnostic = Diagnostic::global("No code.".to_string(), 0);
    diagnostic.category = DiagnosticCategory::Message;

    assert_eq!(reporter.format_diagnostic(&diagnostic), "message: No code.");
}

// =============================================================================
// Pretty output
// =============================================================================

#[test]
fn pretty_output_underlines_the_span() {
    colored::control::set_override(false);
    let text = "let a = 1;\nimport x = require(\"missing\");\n";
    let start = text.find("\"missing\"").expect("literal") as u32;
    let reporter = Reporter::new(true).with_sources(&[source("/src/main.ts", text)]);
    let diagnostic = Diagnostic::error(
        "/src/main.ts".to_string(),
        start,
        9,
        "Cannot find module 'missing'.".to_string(),
        2307,
    );

    let output = reporter.format_diagnostic(&diagnostic);

    assert!(output.starts_with("/src/main.ts:2:20 - error TS2307: Cannot find module 'missing'."));
    assert!(output.contains("    2   import x = require(\"missing\");"));
    assert!(output.contains(&format!("{}~~~~~~~~~", " ".repeat(8 + 19))));
}

#[test]
fn pretty_output_skips_snippet_for_empty_span() {
    colored::control::set_override(false);
    let reporter = Reporter::new(true).with_sources(&[source("/a.ts", "const x = 1;\n")]);
    let diagnostic = Diagnostic::error("/a.ts".to_string(), 0, 0, "Empty.".to_string(), 1);

    assert_eq!(reporter.format_diagnostic(&diagnostic), "/a.ts:1:1 - error TS1: Empty.");
}

// =============================================================================
// Infrastructure errors
// =============================================================================

#[test]
fn error_chain_becomes_message_chain() {
    let error = anyhow!("unexpected end of input").context("failed to parse /p/tsconfig.json");

    let diagnostic = diagnostic_from_error(&error);

    assert!(diagnostic.is_global());
    assert_eq!(diagnostic.category, DiagnosticCategory::Error);
    assert_eq!(
        diagnostic.message_text,
        "failed to parse /p/tsconfig.json\n  unexpected end of input"
    );
}

#[test]
fn single_error_is_a_single_line() {
    let diagnostic = diagnostic_from_error(&anyhow!("no input files"));
    assert_eq!(diagnostic.message_text, "no input files");
}
