//! Pre-processing scanner.
//!
//! Extracts the syntax the program builder depends on without building a full
//! syntax tree:
//! - leading `/// <reference path="..."/>` and `no-default-lib` directives
//! - import, import-equals and export declarations with module specifiers
//! - string-named module declarations and their bodies
//! - `require("x")` calls anywhere in the text
//!
//! Everything else is tokenized only far enough to skip strings, comments,
//! template literals and regular expressions correctly.

use memchr::memchr2;
use tsz_common::{Diagnostic, Span, messages};

/// A string literal as it appears in the source. The span includes the quotes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringLiteral {
    pub text: String,
    pub span: Span,
}

/// A `/// <reference path="..."/>` directive. The span covers the whole comment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileReference {
    pub file_name: String,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    ImportDeclaration,
    ImportEqualsDeclaration,
    ExportDeclaration,
    /// `module "name" { ... }`; `ambient` is set for `declare` and for
    /// declarations nested in an ambient body.
    ModuleDeclaration { ambient: bool },
    RequireCall,
}

/// A statement (or call) relevant to module dependency collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    /// Module specifier, module declaration name, or `require` argument.
    pub module_specifier: Option<StringLiteral>,
    /// Statements of a module declaration body, in source order.
    pub children: Vec<Node>,
}

/// Result of pre-processing one source text.
#[derive(Clone, Debug, Default)]
pub struct PreProcessedFile {
    pub referenced_files: Vec<FileReference>,
    pub has_no_default_lib: bool,
    pub statements: Vec<Node>,
    /// First top-level import or export that makes the file a module.
    pub external_module_indicator: Option<Span>,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn pre_process_file(file_name: &str, text: &str) -> PreProcessedFile {
    let mut scanner = Scanner::new(file_name, text);
    let tokens = scanner.tokenize();
    let mut parser = Parser {
        tokens,
        pos: 0,
        external_module_indicator: None,
    };
    let statements = parser.parse_statements(true, false);

    PreProcessedFile {
        referenced_files: scanner.referenced_files,
        has_no_default_lib: scanner.has_no_default_lib,
        statements,
        external_module_indicator: parser.external_module_indicator,
        diagnostics: scanner.diagnostics,
    }
}

// =============================================================================
// Tokens
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
enum TokenKind {
    Identifier(String),
    String(String),
    Template,
    Number,
    Regex,
    Punctuation(u8),
    EndOfFile,
}

#[derive(Clone, Debug)]
struct Token {
    kind: TokenKind,
    span: Span,
}

impl Token {
    fn is_identifier(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::Identifier(text) if text == name)
    }

    fn is_punctuation(&self, ch: u8) -> bool {
        self.kind == TokenKind::Punctuation(ch)
    }

    fn string_literal(&self) -> Option<StringLiteral> {
        match &self.kind {
            TokenKind::String(text) => Some(StringLiteral {
                text: text.clone(),
                span: self.span,
            }),
            _ => None,
        }
    }
}

/// Keywords that cannot appear in an import or export clause; seeing one
/// means the clause was malformed and a new statement started.
const CLAUSE_TERMINATING_KEYWORDS: &[&str] = &[
    "import",
    "export",
    "const",
    "let",
    "var",
    "function",
    "class",
    "declare",
    "interface",
    "enum",
    "namespace",
    "module",
    "if",
    "for",
    "while",
    "return",
];

/// Keywords after which a `/` starts a regular expression.
const REGEX_PRECEDING_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "instanceof",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "case",
    "do",
    "else",
    "yield",
    "await",
];

// =============================================================================
// Scanner
// =============================================================================

struct Scanner<'a> {
    file_name: &'a str,
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    /// One entry per open `{`; `true` marks a template substitution `${`.
    brace_stack: Vec<bool>,
    regex_allowed: bool,
    in_leading_trivia: bool,
    referenced_files: Vec<FileReference>,
    has_no_default_lib: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Scanner<'a> {
    fn new(file_name: &'a str, text: &'a str) -> Self {
        Scanner {
            file_name,
            text,
            bytes: text.as_bytes(),
            pos: 0,
            brace_stack: Vec::new(),
            regex_allowed: true,
            in_leading_trivia: true,
            referenced_files: Vec::new(),
            has_no_default_lib: false,
            diagnostics: Vec::new(),
        }
    }

    fn tokenize(&mut self) -> Vec<Token> {
        if self.text.starts_with("#!") {
            self.pos = self.line_end(0);
        }
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::EndOfFile;
            self.regex_allowed = match &token.kind {
                TokenKind::Identifier(name) => REGEX_PRECEDING_KEYWORDS.contains(&name.as_str()),
                TokenKind::Punctuation(ch) => !matches!(ch, b')' | b']' | b'}'),
                _ => false,
            };
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn line_end(&self, from: usize) -> usize {
        memchr2(b'\n', b'\r', &self.bytes[from..]).map_or(self.bytes.len(), |idx| from + idx)
    }

    fn error(&mut self, start: usize, end: usize, message: &tsz_common::DiagnosticMessage) {
        self.diagnostics.push(Diagnostic::from_message(
            self.file_name,
            start as u32,
            end.saturating_sub(start) as u32,
            message,
            &[],
        ));
    }

    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek(0) {
            match ch {
                b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c => self.pos += 1,
                b'/' if self.peek(1) == Some(b'/') => {
                    let start = self.pos;
                    let end = self.line_end(start);
                    if self.in_leading_trivia && self.text[start..end].starts_with("///") {
                        self.process_reference_comment(start, end);
                    }
                    self.pos = end;
                }
                b'/' if self.peek(1) == Some(b'*') => {
                    let start = self.pos;
                    match self.text[start + 2..].find("*/") {
                        Some(idx) => self.pos = start + 2 + idx + 2,
                        None => {
                            self.pos = self.bytes.len();
                            let end = self.pos;
                            self.error(end, end, &messages::ASTERISK_SLASH_EXPECTED);
                        }
                    }
                }
                _ if ch >= 0x80 => match self.text[self.pos..].chars().next() {
                    Some(c) if c.is_whitespace() => self.pos += c.len_utf8(),
                    _ => return,
                },
                _ => return,
            }
        }
    }

    fn process_reference_comment(&mut self, start: usize, end: usize) {
        let comment = &self.text[start..end];
        match parse_reference_directive(comment) {
            ReferenceDirective::Path(file_name) => self.referenced_files.push(FileReference {
                file_name,
                span: Span::new(start as u32, end as u32),
            }),
            ReferenceDirective::NoDefaultLib(value) => {
                if value {
                    self.has_no_default_lib = true;
                }
            }
            ReferenceDirective::Invalid => {
                self.error(start, end, &messages::INVALID_REFERENCE_DIRECTIVE_SYNTAX);
            }
            ReferenceDirective::NotReference => {}
        }
    }

    fn next_token(&mut self) -> Token {
        self.skip_trivia();
        let start = self.pos;
        let Some(ch) = self.peek(0) else {
            return self.token(TokenKind::EndOfFile, start);
        };
        self.in_leading_trivia = false;

        match ch {
            b'"' | b'\'' => {
                let text = self.scan_string(ch);
                self.token(TokenKind::String(text), start)
            }
            b'`' => {
                self.pos += 1;
                self.scan_template(start);
                self.token(TokenKind::Template, start)
            }
            b'{' => {
                self.pos += 1;
                self.brace_stack.push(false);
                self.token(TokenKind::Punctuation(ch), start)
            }
            b'}' => {
                self.pos += 1;
                if self.brace_stack.pop() == Some(true) {
                    self.scan_template(start);
                    self.token(TokenKind::Template, start)
                } else {
                    self.token(TokenKind::Punctuation(ch), start)
                }
            }
            b'/' if self.regex_allowed => {
                self.scan_regex();
                self.token(TokenKind::Regex, start)
            }
            b'0'..=b'9' => {
                self.scan_number();
                self.token(TokenKind::Number, start)
            }
            b'.' if self.peek(1).is_some_and(|next| next.is_ascii_digit()) => {
                self.scan_number();
                self.token(TokenKind::Number, start)
            }
            _ if is_identifier_start(ch) => {
                self.scan_identifier_part();
                let name = self.text[start..self.pos].to_string();
                self.token(TokenKind::Identifier(name), start)
            }
            _ => {
                self.pos += 1;
                self.token(TokenKind::Punctuation(ch), start)
            }
        }
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            span: Span::new(start as u32, self.pos as u32),
        }
    }

    fn scan_identifier_part(&mut self) {
        while let Some(ch) = self.peek(0) {
            if ch.is_ascii_alphanumeric() || ch == b'_' || ch == b'$' {
                self.pos += 1;
            } else if ch >= 0x80 {
                match self.text[self.pos..].chars().next() {
                    Some(c) if !c.is_whitespace() => self.pos += c.len_utf8(),
                    _ => return,
                }
            } else {
                return;
            }
        }
    }

    fn scan_number(&mut self) {
        while let Some(ch) = self.peek(0) {
            if ch.is_ascii_alphanumeric() || ch == b'_' || ch == b'.' {
                self.pos += 1;
            } else {
                return;
            }
        }
    }

    fn scan_regex(&mut self) {
        self.pos += 1;
        let mut in_class = false;
        while let Some(ch) = self.peek(0) {
            match ch {
                b'\n' | b'\r' => return,
                b'\\' => self.pos += 2,
                b'[' => {
                    in_class = true;
                    self.pos += 1;
                }
                b']' => {
                    in_class = false;
                    self.pos += 1;
                }
                b'/' if !in_class => {
                    self.pos += 1;
                    self.scan_identifier_part();
                    return;
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.bytes.len());
    }

    /// Scan a template literal part starting after '`' or '}' up to and
    /// including the closing '`' or the next `${`.
    fn scan_template(&mut self, start: usize) {
        while let Some(ch) = self.peek(0) {
            match ch {
                b'`' => {
                    self.pos += 1;
                    return;
                }
                b'$' if self.peek(1) == Some(b'{') => {
                    self.pos += 2;
                    self.brace_stack.push(true);
                    return;
                }
                b'\\' => self.pos = (self.pos + 2).min(self.bytes.len()),
                _ => self.pos += 1,
            }
        }
        let end = self.pos;
        self.error(start, end, &messages::UNTERMINATED_TEMPLATE_LITERAL);
    }

    fn scan_string(&mut self, quote: u8) -> String {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            let Some(ch) = self.peek(0) else {
                let end = self.pos;
                self.error(start, end, &messages::UNTERMINATED_STRING_LITERAL);
                return value;
            };
            if ch == quote {
                self.pos += 1;
                return value;
            }
            match ch {
                b'\\' => {
                    self.pos += 1;
                    self.scan_escape(&mut value);
                }
                b'\n' | b'\r' => {
                    let end = self.pos;
                    self.error(start, end, &messages::UNTERMINATED_STRING_LITERAL);
                    return value;
                }
                _ => {
                    let Some(c) = self.text[self.pos..].chars().next() else {
                        return value;
                    };
                    value.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    fn scan_escape(&mut self, value: &mut String) {
        let Some(c) = self.text[self.pos..].chars().next() else {
            return;
        };
        self.pos += c.len_utf8();
        match c {
            '0' => value.push('\0'),
            'b' => value.push('\u{8}'),
            't' => value.push('\t'),
            'n' => value.push('\n'),
            'v' => value.push('\u{b}'),
            'f' => value.push('\u{c}'),
            'r' => value.push('\r'),
            'x' => self.push_hex_escape(value, 2),
            'u' => {
                if self.peek(0) == Some(b'{') {
                    let close = self.text[self.pos..].find('}');
                    if let Some(close) = close {
                        let digits = &self.text[self.pos + 1..self.pos + close];
                        if let Some(c) = u32::from_str_radix(digits, 16).ok().and_then(char::from_u32) {
                            value.push(c);
                            self.pos += close + 1;
                            return;
                        }
                    }
                    value.push('u');
                } else {
                    self.push_hex_escape(value, 4);
                }
            }
            '\r' => {
                if self.peek(0) == Some(b'\n') {
                    self.pos += 1;
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => value.push(other),
        }
    }

    fn push_hex_escape(&mut self, value: &mut String, digits: usize) {
        let decoded = self
            .text
            .get(self.pos..self.pos + digits)
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);
        match decoded {
            Some(c) => {
                value.push(c);
                self.pos += digits;
            }
            None => value.push(if digits == 2 { 'x' } else { 'u' }),
        }
    }
}

fn is_identifier_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_' || ch == b'$' || ch >= 0x80
}

// =============================================================================
// Reference directives
// =============================================================================

#[derive(Debug, PartialEq, Eq)]
enum ReferenceDirective {
    Path(String),
    NoDefaultLib(bool),
    Invalid,
    NotReference,
}

fn strip_prefix_ignore_ascii_case<'s>(text: &'s str, prefix: &str) -> Option<&'s str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

/// Read `= "value"` (either quote) and return the value and the text after
/// the closing quote. The value must be non-empty.
fn parse_quoted_attribute_value(rest: &str) -> Option<(&str, &str)> {
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let body = &rest[1..];
    let first_len = body.chars().next()?.len_utf8();
    let close = body[first_len..].find(quote)? + first_len;
    Some((&body[..close], &body[close + 1..]))
}

/// Classify a `///` comment.
fn parse_reference_directive(comment: &str) -> ReferenceDirective {
    let Some(rest) = comment.strip_prefix("///") else {
        return ReferenceDirective::NotReference;
    };
    let Some(rest) = strip_prefix_ignore_ascii_case(rest.trim_start(), "<reference") else {
        return ReferenceDirective::NotReference;
    };
    if !rest.starts_with(|c: char| c.is_whitespace()) {
        return ReferenceDirective::NotReference;
    }
    let rest = rest.trim_start();

    if let Some(attribute) = strip_prefix_ignore_ascii_case(rest, "no-default-lib") {
        if let Some((value, tail)) = parse_quoted_attribute_value(attribute)
            && tail.trim_start().starts_with("/>")
        {
            return ReferenceDirective::NoDefaultLib(value.trim().eq_ignore_ascii_case("true"));
        }
    }

    if let Some(attribute) = strip_prefix_ignore_ascii_case(rest, "path") {
        if let Some((value, tail)) = parse_quoted_attribute_value(attribute)
            && tail.contains("/>")
        {
            return ReferenceDirective::Path(value.to_string());
        }
    }

    ReferenceDirective::Invalid
}

// =============================================================================
// Statement parser
// =============================================================================

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    external_module_indicator: Option<Span>,
}

impl Parser {
    fn current(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn nth(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + offset).min(last)]
    }

    fn previous_is_dot(&self) -> bool {
        self.pos > 0 && self.tokens[self.pos - 1].is_punctuation(b'.')
    }

    fn at_end(&self) -> bool {
        self.current().kind == TokenKind::EndOfFile
    }

    fn advance(&mut self) {
        if !self.at_end() {
            self.pos += 1;
        }
    }

    fn mark_external_module(&mut self, span: Span, top_level: bool) {
        if top_level && self.external_module_indicator.is_none() {
            self.external_module_indicator = Some(span);
        }
    }

    /// Parse statements until the end of input, or until the `}` closing a
    /// module body when `top_level` is false.
    fn parse_statements(&mut self, top_level: bool, in_ambient_context: bool) -> Vec<Node> {
        let mut statements = Vec::new();
        while !self.at_end() {
            let token = self.current().clone();
            match &token.kind {
                TokenKind::Punctuation(b'}') => {
                    self.advance();
                    if !top_level {
                        break;
                    }
                }
                TokenKind::Punctuation(b'{') => self.skip_block(&mut statements),
                TokenKind::Identifier(name) if !self.previous_is_dot() => match name.as_str() {
                    "import" => {
                        if let Some(node) = self.parse_import(token.span.start, top_level) {
                            statements.push(node);
                        }
                    }
                    "export" => {
                        if let Some(node) = self.parse_export(top_level) {
                            statements.push(node);
                        }
                    }
                    "declare"
                        if self.nth(1).is_identifier("module")
                            && self.nth(2).string_literal().is_some() =>
                    {
                        self.advance();
                        statements.push(self.parse_module_declaration(token.span.start, true));
                    }
                    "module" if self.nth(1).string_literal().is_some() => {
                        statements.push(
                            self.parse_module_declaration(token.span.start, in_ambient_context),
                        );
                    }
                    "require" => {
                        if let Some(node) = self.parse_require_call() {
                            statements.push(node);
                        } else {
                            self.advance();
                        }
                    }
                    _ => self.advance(),
                },
                _ => self.advance(),
            }
        }
        statements
    }

    /// Skip a `{ ... }` block, keeping only `require` calls found inside.
    fn skip_block(&mut self, out: &mut Vec<Node>) {
        self.advance();
        let mut depth = 1usize;
        while !self.at_end() {
            let token = self.current();
            if token.is_punctuation(b'{') {
                depth += 1;
            } else if token.is_punctuation(b'}') {
                depth -= 1;
                if depth == 0 {
                    self.advance();
                    return;
                }
            } else if token.is_identifier("require") && !self.previous_is_dot() {
                if let Some(node) = self.parse_require_call() {
                    out.push(node);
                    continue;
                }
            }
            self.advance();
        }
    }

    /// `require ( "x" )`, positioned at `require`.
    fn parse_require_call(&mut self) -> Option<Node> {
        let start = self.current().span.start;
        if !self.nth(1).is_punctuation(b'(') || !self.nth(3).is_punctuation(b')') {
            return None;
        }
        let specifier = self.nth(2).string_literal()?;
        let end = self.nth(3).span.end;
        self.pos += 4;
        Some(Node {
            kind: NodeKind::RequireCall,
            span: Span::new(start, end),
            module_specifier: Some(specifier),
            children: Vec::new(),
        })
    }

    /// `[declare] module "name" [{ body }]`, positioned at `module`.
    fn parse_module_declaration(&mut self, start: u32, ambient: bool) -> Node {
        self.advance();
        let name = self.current().string_literal();
        let mut end = self.current().span.end;
        self.advance();
        let mut children = Vec::new();
        if self.current().is_punctuation(b'{') {
            self.advance();
            children = self.parse_statements(false, ambient);
            end = self.tokens[self.pos.saturating_sub(1)].span.end;
        }
        Node {
            kind: NodeKind::ModuleDeclaration { ambient },
            span: Span::new(start, end),
            module_specifier: name,
            children,
        }
    }

    /// Positioned at `import`.
    fn parse_import(&mut self, start: u32, top_level: bool) -> Option<Node> {
        let next = self.nth(1).clone();
        if next.is_punctuation(b'(') || next.is_punctuation(b'.') {
            self.advance();
            return None;
        }

        if let Some(specifier) = next.string_literal() {
            self.pos += 2;
            let span = Span::new(start, specifier.span.end);
            self.mark_external_module(span, top_level);
            return Some(Node {
                kind: NodeKind::ImportDeclaration,
                span,
                module_specifier: Some(specifier),
                children: Vec::new(),
            });
        }

        if matches!(next.kind, TokenKind::Identifier(_)) && self.nth(2).is_punctuation(b'=') {
            self.pos += 3;
            if self.current().is_identifier("require") {
                if let Some(call) = self.parse_require_call() {
                    let span = Span::new(start, call.span.end);
                    self.mark_external_module(span, top_level);
                    return Some(Node {
                        kind: NodeKind::ImportEqualsDeclaration,
                        span,
                        module_specifier: call.module_specifier,
                        children: Vec::new(),
                    });
                }
            }
            return None;
        }

        self.advance();
        let clause_start = self.pos;
        let specifier = self.parse_from_clause();
        let span = match &specifier {
            Some(specifier) => Span::new(start, specifier.span.end),
            None => {
                self.pos = clause_start;
                Span::new(start, next.span.start)
            }
        };
        self.mark_external_module(span, top_level);
        specifier.map(|specifier| Node {
            kind: NodeKind::ImportDeclaration,
            span,
            module_specifier: Some(specifier),
            children: Vec::new(),
        })
    }

    /// Skip an import or export clause (`a, { b as c }`, `* as d`) and read
    /// the `from "x"` that follows it.
    fn parse_from_clause(&mut self) -> Option<StringLiteral> {
        let mut in_braces = false;
        loop {
            let kind = self.current().kind.clone();
            match kind {
                TokenKind::Identifier(name) if name == "from" && !in_braces => {
                    let specifier = self.nth(1).string_literal()?;
                    self.pos += 2;
                    return Some(specifier);
                }
                TokenKind::Identifier(name)
                    if !in_braces && CLAUSE_TERMINATING_KEYWORDS.contains(&name.as_str()) =>
                {
                    return None;
                }
                TokenKind::Identifier(_) | TokenKind::Punctuation(b',' | b'*') => self.advance(),
                TokenKind::Punctuation(b'{') if !in_braces => {
                    in_braces = true;
                    self.advance();
                }
                TokenKind::Punctuation(b'}') if in_braces => {
                    in_braces = false;
                    self.advance();
                    if !self.current().is_identifier("from") {
                        return None;
                    }
                }
                _ => return None,
            }
        }
    }

    /// Positioned at `export`.
    fn parse_export(&mut self, top_level: bool) -> Option<Node> {
        let export = self.current().clone();
        let next = self.nth(1).clone();
        self.mark_external_module(export.span, top_level);

        if next.is_identifier("import") {
            self.advance();
            return self.parse_import(export.span.start, top_level);
        }

        if next.is_punctuation(b'*') || next.is_punctuation(b'{') {
            self.advance();
            let clause_start = self.pos;
            match self.parse_from_clause() {
                Some(specifier) => {
                    return Some(Node {
                        kind: NodeKind::ExportDeclaration,
                        span: Span::new(export.span.start, specifier.span.end),
                        module_specifier: Some(specifier),
                        children: Vec::new(),
                    });
                }
                None => {
                    // Local export list: let the statement loop consume it so
                    // braces stay balanced.
                    self.pos = clause_start;
                    if next.is_punctuation(b'{') {
                        let mut ignored = Vec::new();
                        self.skip_block(&mut ignored);
                    }
                    return None;
                }
            }
        }

        self.advance();
        None
    }
}

#[cfg(test)]
#[path = "tests/scanner_tests.rs"]
mod tests;
