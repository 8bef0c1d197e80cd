// uDashBoard: featherweight dashboard application.
//
// Copyright (C) 2019  Brandon Lewis
//
// This program is free software: you can redistribute it and/or
// modify it under the terms of the GNU Lesser General Public License
// as published by the Free Software Foundation, either version 3 of
// the License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public
// License along with this program.  If not, see
// <https://www.gnu.org/licenses/>.

//! Raw text -> ordered token stream, with source-exact provenance.
//!
//! Grounded on `original_source/src/tokenizer.cpp`: tab-expanded column
//! math, comment elision, the keyword classification table, and the
//! include-literal backtrack-to-operator rule for `<` followed by
//! whitespace.

use std::path::Path;
use std::rc::Rc;

use crate::diagnostics::{DiagnosticBag, DiagnosticCategory};
use crate::span::{Position, Span};
use crate::token::{Token, TokenKind};

/// Multi-character operators, longest-match-first so `->` isn't lexed as
/// `-` followed by `>`.
const MULTI_CHAR_OPERATORS: &[(&str, TokenKind)] = &[
    ("->", TokenKind::Arrow),
    ("::", TokenKind::ColonColon),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::BangEq),
    ("<=", TokenKind::LtEq),
    (">=", TokenKind::GtEq),
    ("&&", TokenKind::AmpAmp),
    ("||", TokenKind::PipePipe),
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("*=", TokenKind::StarEq),
    ("/=", TokenKind::SlashEq),
    ("%=", TokenKind::PercentEq),
    ("&=", TokenKind::AmpEq),
    ("|=", TokenKind::PipeEq),
    ("^=", TokenKind::CaretEq),
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
];

fn single_char_operator(ch: char) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match ch {
        '{' => OpenCurly,
        '}' => CloseCurly,
        '(' => OpenParen,
        ')' => CloseParen,
        '[' => OpenBracket,
        ']' => CloseBracket,
        '.' => Dot,
        ';' => Semicolon,
        ':' => Colon,
        ',' => Comma,
        '<' => Lt,
        '>' => Gt,
        '+' => Plus,
        '-' => Minus,
        '*' => Star,
        '/' => Slash,
        '%' => Percent,
        '!' => Bang,
        '&' => Amp,
        '|' => Pipe,
        '^' => Caret,
        '~' => Tilde,
        '?' => Question,
        '=' => Eq,
        _ => return None,
    })
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_identifier_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Normalize `\r\n` and `\r` line endings to `\n`, per `spec.md` §6.
pub fn normalize_line_endings(source: &str) -> String {
    source.replace("\r\n", "\n").replace('\r', "\n")
}

pub struct Tokenizer<'a> {
    chars: Vec<char>,
    #[allow(dead_code)]
    source: &'a str,
    index: usize,
    byte_index: u32,
    line: u32,
    column: u32,
    origin: Rc<std::path::PathBuf>,
    diagnostics: &'a mut DiagnosticBag,
}

impl<'a> Tokenizer<'a> {
    pub fn new(origin: &Path, source: &'a str, diagnostics: &'a mut DiagnosticBag) -> Tokenizer<'a> {
        Tokenizer {
            chars: source.chars().collect(),
            source,
            index: 0,
            byte_index: 0,
            line: 1,
            column: 0,
            origin: Rc::new(origin.to_path_buf()),
            diagnostics,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    fn position(&self) -> Position {
        Position { line: self.line, column: self.column, offset: self.byte_index }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.index += 1;
        self.byte_index += ch.len_utf8() as u32;
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else if ch == '\t' {
            self.column += 4;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn line_text_at(&self, offset: usize) -> String {
        let mut start = offset;
        while start > 0 && self.chars[start - 1] != '\n' {
            start -= 1;
        }
        let mut end = offset;
        while end < self.chars.len() && self.chars[end] != '\n' {
            end += 1;
        }
        self.chars[start..end].iter().collect()
    }

    fn make_span(&self, start: Position) -> Span {
        Span::new(self.origin.clone(), start, self.position())
    }

    /// Tokenize the entire source, always ending with an `Eof` token.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            let start = self.position();
            let line_text = self.line_text_at(self.index);
            match self.peek() {
                None => {
                    tokens.push(Token {
                        kind: TokenKind::Eof,
                        lexeme: String::new(),
                        span: self.make_span(start),
                        line_text,
                    });
                    break;
                }
                Some(ch) => {
                    let (kind, lexeme) = self.scan_one(ch);
                    tokens.push(Token { kind, lexeme, span: self.make_span(start), line_text });
                }
            }
        }
        tokens
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.advance();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    let start = self.position();
                    self.advance();
                    self.advance();
                    while !(self.peek().is_none()
                        || (self.peek() == Some('*') && self.peek_at(1) == Some('/')))
                    {
                        self.advance();
                    }
                    if self.peek().is_none() {
                        self.diagnostics.report(
                            DiagnosticCategory::UnterminatedStringOrComment,
                            self.make_span(start),
                            "unterminated block comment",
                        );
                        break;
                    }
                    self.advance();
                    self.advance();
                }
                _ => break,
            }
        }
    }

    fn scan_one(&mut self, ch: char) -> (TokenKind, String) {
        if self.matches_literal("#include") {
            for _ in 0.."#include".chars().count() {
                self.advance();
            }
            return (TokenKind::Include, "#include".to_string());
        }
        if ch == '"' {
            return self.scan_string();
        }
        if is_identifier_start(ch) {
            return self.scan_identifier();
        }
        if ch.is_ascii_digit() || self.is_signed_or_dotted_number_start(ch) {
            return self.scan_number();
        }
        if ch == '<' && self.peek_at(1) != Some('=') {
            if let Some(lexeme) = self.try_scan_header_literal() {
                return (TokenKind::HeaderLiteral, lexeme);
            }
        }
        for (text, kind) in MULTI_CHAR_OPERATORS {
            if self.matches_literal(text) {
                for _ in 0..text.chars().count() {
                    self.advance();
                }
                return (*kind, (*text).to_string());
            }
        }
        if let Some(kind) = single_char_operator(ch) {
            self.advance();
            return (kind, ch.to_string());
        }
        // Unrecognized character: a single-character "unknown" token, not
        // a hard tokenizer failure (spec.md §4.1 Failure).
        let start = self.position();
        self.advance();
        self.diagnostics.report(
            DiagnosticCategory::UnrecognizedCharacter,
            self.make_span(start),
            format!("unrecognized character `{}`", ch),
        );
        (TokenKind::Unknown, ch.to_string())
    }

    fn matches_literal(&self, text: &str) -> bool {
        let text_chars: Vec<char> = text.chars().collect();
        if self.index + text_chars.len() > self.chars.len() {
            return false;
        }
        self.chars[self.index..self.index + text_chars.len()] == text_chars[..]
    }

    /// A leading `+`/`-` belongs to a numeric literal only when the
    /// preceding character is not identifier-continuing, a digit, `)` or
    /// `]` (spec.md §4.1): i.e. it's unambiguously a sign, not a binary
    /// operator. A leading `.` starts a literal only when followed by a
    /// digit.
    fn is_signed_or_dotted_number_start(&self, ch: char) -> bool {
        if ch == '.' {
            return matches!(self.peek_at(1), Some(c) if c.is_ascii_digit());
        }
        if ch != '+' && ch != '-' {
            return false;
        }
        if !matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
            return false;
        }
        match self.prev_significant_char() {
            None => true,
            Some(prev) => {
                !(is_identifier_continue(prev) || prev.is_ascii_digit() || prev == ')' || prev == ']')
            }
        }
    }

    fn prev_significant_char(&self) -> Option<char> {
        if self.index == 0 {
            None
        } else {
            Some(self.chars[self.index - 1])
        }
    }

    fn scan_identifier(&mut self) -> (TokenKind, String) {
        let start = self.index;
        while matches!(self.peek(), Some(c) if is_identifier_continue(c)) {
            self.advance();
        }
        let text: String = self.chars[start..self.index].iter().collect();
        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Identifier);
        (kind, text)
    }

    fn scan_number(&mut self) -> (TokenKind, String) {
        let start = self.index;
        let mut is_float = false;

        if matches!(self.peek(), Some('+') | Some('-')) {
            self.advance();
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') {
            is_float = true;
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            is_float = true;
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some('f') | Some('F')) {
            is_float = true;
            self.advance();
        } else if matches!(self.peek(), Some('u') | Some('U')) {
            // A signed unsigned-suffixed literal ("-1u") is still one
            // token; the parser flags the sign/suffix conflict as a
            // diagnostic rather than leaving a stray `u` behind for the
            // grammar to choke on.
            self.advance();
        }

        let text: String = self.chars[start..self.index].iter().collect();
        let kind = if is_float { TokenKind::FloatLiteral } else { TokenKind::IntegerLiteral };
        (kind, text)
    }

    fn scan_string(&mut self) -> (TokenKind, String) {
        let start = self.index;
        let start_pos = self.position();
        self.advance(); // opening quote
        loop {
            match self.peek() {
                None => {
                    self.diagnostics.report(
                        DiagnosticCategory::UnterminatedStringOrComment,
                        self.make_span(start_pos),
                        "unterminated string literal",
                    );
                    break;
                }
                Some('"') if self.prev_significant_char() != Some('\\') => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        let text: String = self.chars[start..self.index].iter().collect();
        (TokenKind::StringLiteral, text)
    }

    /// `<path>` with no internal whitespace. On failure (whitespace found
    /// before `>`), the caller backtracks and re-lexes `<` as an operator;
    /// we signal that by returning `None` without consuming anything.
    fn try_scan_header_literal(&mut self) -> Option<String> {
        let start = self.index;
        let start_line = self.line;
        let start_col = self.column;
        self.advance(); // '<'
        loop {
            match self.peek() {
                None => {
                    self.reset_to(start, start_line, start_col);
                    return None;
                }
                Some(c) if c.is_whitespace() => {
                    self.reset_to(start, start_line, start_col);
                    return None;
                }
                Some('>') => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        Some(self.chars[start..self.index].iter().collect())
    }

    fn reset_to(&mut self, index: usize, line: u32, column: u32) {
        self.index = index;
        self.line = line;
        self.column = column;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let path = PathBuf::from("test.lum");
        let mut diagnostics = DiagnosticBag::new();
        Tokenizer::new(&path, src, &mut diagnostics).tokenize().into_iter().map(|t| t.kind).collect()
    }

    fn lexemes(src: &str) -> Vec<String> {
        let path = PathBuf::from("test.lum");
        let mut diagnostics = DiagnosticBag::new();
        Tokenizer::new(&path, src, &mut diagnostics).tokenize().into_iter().map(|t| t.lexeme).collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("Input VertexPass foo"),
            vec![TokenKind::Input, TokenKind::VertexPass, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(lexemes("42"), vec!["42", ""]);
        assert_eq!(kinds("42"), vec![TokenKind::IntegerLiteral, TokenKind::Eof]);
        assert_eq!(kinds("42u"), vec![TokenKind::IntegerLiteral, TokenKind::Eof]);
        assert_eq!(kinds("3.14"), vec![TokenKind::FloatLiteral, TokenKind::Eof]);
        assert_eq!(kinds("3.14f"), vec![TokenKind::FloatLiteral, TokenKind::Eof]);
    }

    #[test]
    fn test_signed_number_disambiguation() {
        // '-' after an identifier is a binary operator, not a sign.
        assert_eq!(
            kinds("a-1"),
            vec![TokenKind::Identifier, TokenKind::Minus, TokenKind::IntegerLiteral, TokenKind::Eof]
        );
        // '-' at the start of an expression is a sign.
        assert_eq!(kinds("-1"), vec![TokenKind::IntegerLiteral, TokenKind::Eof]);
    }

    #[test]
    fn test_comments_elided() {
        assert_eq!(kinds("a // comment\nb"), vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]);
        assert_eq!(kinds("a /* c\nc */ b"), vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn test_multi_char_operators() {
        assert_eq!(kinds("a -> b :: c"), vec![
            TokenKind::Identifier, TokenKind::Arrow, TokenKind::Identifier,
            TokenKind::ColonColon, TokenKind::Identifier, TokenKind::Eof
        ]);
        assert_eq!(kinds("a == b != c <= d >= e"), vec![
            TokenKind::Identifier, TokenKind::EqEq, TokenKind::Identifier, TokenKind::BangEq,
            TokenKind::Identifier, TokenKind::LtEq, TokenKind::Identifier, TokenKind::GtEq,
            TokenKind::Identifier, TokenKind::Eof
        ]);
    }

    #[test]
    fn test_header_literal_and_backtrack() {
        assert_eq!(kinds("#include <foo.lum>"), vec![TokenKind::Include, TokenKind::HeaderLiteral, TokenKind::Eof]);
        // whitespace inside <...> forces re-lex of '<' as an operator.
        assert_eq!(kinds("a < b"), vec![TokenKind::Identifier, TokenKind::Lt, TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn test_unknown_character_is_not_fatal() {
        assert_eq!(kinds("a $ b"), vec![
            TokenKind::Identifier, TokenKind::Unknown, TokenKind::Identifier, TokenKind::Eof
        ]);
    }

    #[test]
    fn test_unknown_character_is_reported() {
        let path = PathBuf::from("test.lum");
        let mut diagnostics = DiagnosticBag::new();
        Tokenizer::new(&path, "a $ b", &mut diagnostics).tokenize();
        assert_eq!(diagnostics.of_category(DiagnosticCategory::UnrecognizedCharacter), 1);
    }

    #[test]
    fn test_unterminated_string_is_reported() {
        let path = PathBuf::from("test.lum");
        let mut diagnostics = DiagnosticBag::new();
        Tokenizer::new(&path, "\"unterminated", &mut diagnostics).tokenize();
        assert_eq!(diagnostics.of_category(DiagnosticCategory::UnterminatedStringOrComment), 1);
    }

    #[test]
    fn test_unterminated_block_comment_is_reported() {
        let path = PathBuf::from("test.lum");
        let mut diagnostics = DiagnosticBag::new();
        Tokenizer::new(&path, "a /* never closed", &mut diagnostics).tokenize();
        assert_eq!(diagnostics.of_category(DiagnosticCategory::UnterminatedStringOrComment), 1);
    }

    #[test]
    fn test_span_fidelity() {
        let path = PathBuf::from("test.lum");
        let src = "foo bar";
        let mut diagnostics = DiagnosticBag::new();
        let tokens = Tokenizer::new(&path, src, &mut diagnostics).tokenize();
        for tok in &tokens {
            if tok.kind == TokenKind::Eof {
                continue;
            }
            let slice = &src[tok.span.start.offset as usize..tok.span.end.offset as usize];
            assert_eq!(slice, tok.lexeme);
        }
    }

    #[test]
    fn test_tab_expands_to_four_columns() {
        let path = PathBuf::from("test.lum");
        let mut diagnostics = DiagnosticBag::new();
        let tokens = Tokenizer::new(&path, "\tfoo", &mut diagnostics).tokenize();
        assert_eq!(tokens[0].span.start.column, 4);
    }
}
