use colored::Colorize;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use tsz_common::{Diagnostic, DiagnosticCategory, DiagnosticMessageChain};
use tsz_program::SourceFile;

/// Renders diagnostics the way tsc prints them: `file(line,col): error TSn: text`,
/// or with `--pretty`, colored `file:line:col - error TSn: text` followed by
/// the offending source line.
pub struct Reporter {
    pretty: bool,
    sources: FxHashMap<String, Arc<SourceFile>>,
}

impl Reporter {
    pub fn new(pretty: bool) -> Self {
        Reporter {
            pretty,
            sources: FxHashMap::default(),
        }
    }

    /// Make the text of `files` available for locations and snippets.
    #[must_use]
    pub fn with_sources(mut self, files: &[Arc<SourceFile>]) -> Self {
        for file in files {
            self.sources
                .insert(file.file_name.clone(), Arc::clone(file));
        }
        self
    }

    pub fn render(&self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for diagnostic in diagnostics {
            out.push_str(&self.format_diagnostic(diagnostic));
            out.push('\n');
        }
        out
    }

    pub fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let category = self.format_category(diagnostic.category);
        let code = self.format_code(diagnostic.code);

        let mut output = String::new();
        if let Some(location) = self.format_location(&diagnostic.file, diagnostic.start) {
            output.push_str(&location);
            output.push_str(if self.pretty { " - " } else { ": " });
        } else if !diagnostic.file.is_empty() {
            output.push_str(&diagnostic.file);
            output.push_str(": ");
        }

        output.push_str(&category);
        if !code.is_empty() {
            output.push(' ');
            output.push_str(&code);
        }
        output.push_str(": ");
        output.push_str(&diagnostic.message_text);

        if self.pretty
            && let Some(snippet) =
                self.format_snippet(&diagnostic.file, diagnostic.start, diagnostic.length)
        {
            output.push_str(&snippet);
        }
        output
    }

    /// The source line of `start` with the span underlined.
    /// Example:
    ///     2   import x = require("missing");
    ///                            ~~~~~~~~~
    fn format_snippet(&self, file: &str, start: u32, length: u32) -> Option<String> {
        if length == 0 {
            return None;
        }
        let source = self.sources.get(file)?;
        let (line, character) = source.line_and_character_of_position(start);
        let line_text = source.text.lines().nth(line)?;

        let width = line_text.chars().count().saturating_sub(character).max(1);
        let underline_len = (length as usize).min(width);
        let underline = "~".repeat(underline_len).red();

        Some(format!(
            "\n  {:>3}   {}\n        {}{}",
            line + 1,
            line_text,
            " ".repeat(character),
            underline
        ))
    }

    fn format_location(&self, file: &str, offset: u32) -> Option<String> {
        let source = self.sources.get(file)?;
        let (line, character) = source.line_and_character_of_position(offset);
        let location = if self.pretty {
            format!("{}:{}:{}", file, line + 1, character + 1)
        } else {
            format!("{}({},{})", file, line + 1, character + 1)
        };
        Some(if self.pretty {
            location.cyan().to_string()
        } else {
            location
        })
    }

    fn format_category(&self, category: DiagnosticCategory) -> String {
        let label = category.name();
        if !self.pretty {
            return label.to_string();
        }

        match category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
            DiagnosticCategory::Suggestion => label.blue().bold().to_string(),
            DiagnosticCategory::Message => label.cyan().bold().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        if code == 0 {
            return String::new();
        }

        let label = format!("TS{}", code);
        if self.pretty {
            label.bright_blue().to_string()
        } else {
            label
        }
    }
}

/// A global diagnostic for an infrastructure failure. Each `context` layer
/// of the error becomes one level of the message chain.
pub fn diagnostic_from_error(error: &anyhow::Error) -> Diagnostic {
    let mut causes: Vec<String> = error.chain().map(|cause| cause.to_string()).collect();
    let innermost = causes.pop().unwrap_or_default();
    let chain = causes
        .into_iter()
        .rev()
        .fold(DiagnosticMessageChain::new(innermost, 0), |chain, outer| {
            chain.chain(outer, 0)
        });
    Diagnostic::from_chain("", 0, 0, &chain)
}
