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

//! Diagnostic records and the per-compilation diagnostic bag.
//!
//! Diagnostics are data, not `std::error::Error` — every analyzer/parser
//! step that can fail records one here and continues (spec.md §7).

use std::fmt;

use crate::span::Span;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticCategory {
    // Lexical
    UnrecognizedCharacter,
    UnterminatedStringOrComment,
    // Syntactic
    ExpectedGotUnexpected,
    UnexpectedEndOfInput,
    // Include
    IncludeFileNotFound,
    IncludeCycle,
    StageFunctionInIncludedFile,
    // Semantic - declaration
    DuplicateType,
    DuplicateField,
    DuplicateVariable,
    DuplicateFunctionSignature,
    // Semantic - reference
    UnknownIdentifier,
    UnknownType,
    UnknownMember,
    // Semantic - typing
    NoViableOverload,
    AmbiguousOverload,
    ArrayShapeMismatch,
    NonIntegerIndex,
    IndexOnNonArray,
    ReturnTypeMismatch,
    NonBoolLogicalOperand,
    UnsignedLiteralWithNegativeSign,
    StringLiteralInExpression,
    // Pipeline
    InvalidStagePair,
    StageFunctionForNonProgrammableStage,
    MissingStageFunction,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use DiagnosticCategory::*;
        let text = match self {
            UnrecognizedCharacter => "unrecognized character",
            UnterminatedStringOrComment => "unterminated string or comment",
            ExpectedGotUnexpected => "unexpected token",
            UnexpectedEndOfInput => "unexpected end of input",
            IncludeFileNotFound => "include file not found",
            IncludeCycle => "include cycle",
            StageFunctionInIncludedFile => "stage function in included file",
            DuplicateType => "duplicate type",
            DuplicateField => "duplicate field",
            DuplicateVariable => "duplicate variable",
            DuplicateFunctionSignature => "duplicate function signature",
            UnknownIdentifier => "unknown identifier",
            UnknownType => "unknown type",
            UnknownMember => "unknown member",
            NoViableOverload => "no viable overload",
            AmbiguousOverload => "ambiguous overload",
            ArrayShapeMismatch => "array shape mismatch",
            NonIntegerIndex => "non-integer index",
            IndexOnNonArray => "index on non-array",
            ReturnTypeMismatch => "return type mismatch",
            NonBoolLogicalOperand => "non-bool logical operand",
            UnsignedLiteralWithNegativeSign => "unsigned literal with negative sign",
            StringLiteralInExpression => "string literal in expression",
            InvalidStagePair => "invalid stage pair",
            StageFunctionForNonProgrammableStage => "stage function for non-programmable stage",
            MissingStageFunction => "missing stage function",
        };
        write!(f, "{}", text)
    }
}

#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn new(category: DiagnosticCategory, span: Span, message: impl Into<String>) -> Diagnostic {
        Diagnostic { category, span, message: message.into() }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.span, self.message)
    }
}

/// Collects every diagnostic recorded during one compilation. A fresh
/// `Compilation` owns its own bag, so two compilations running in the
/// same process (e.g. two tests in the same `cargo test` binary) never
/// share or race on the diagnostic counter (spec.md §5).
#[derive(Default, Debug)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> DiagnosticBag {
        DiagnosticBag::default()
    }

    pub fn report(&mut self, category: DiagnosticCategory, span: Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(category, span, message));
    }

    pub fn count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_success(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn reset(&mut self) {
        self.diagnostics.clear();
    }

    pub fn of_category(&self, category: DiagnosticCategory) -> usize {
        self.diagnostics.iter().filter(|d| d.category == category).count()
    }
}

/// Render a diagnostic the way `luminac` prints to stderr: location,
/// message, the offending source line(s), and a caret range underneath.
pub fn render(diagnostic: &Diagnostic, line_text: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", diagnostic));
    out.push_str(line_text);
    out.push('\n');
    let start_col = diagnostic.span.start.column as usize;
    let width = if diagnostic.span.start.line == diagnostic.span.end.line {
        (diagnostic.span.end.column as usize).saturating_sub(start_col).max(1)
    } else {
        1
    };
    out.push_str(&" ".repeat(start_col));
    out.push_str(&"^".repeat(width));
    out
}
