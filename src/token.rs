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

use crate::span::Span;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // literals & identifiers
    Identifier,
    IntegerLiteral,
    FloatLiteral,
    StringLiteral,
    HeaderLiteral, // <path> form used by #include
    BoolLiteral,

    // pipeline / block keywords
    Input,
    VertexPass,
    FragmentPass,
    Output,
    Struct,
    AttributeBlock,
    ConstantBlock,
    TextureKeyword,
    Namespace,
    This,

    // control flow keywords
    If,
    Else,
    While,
    Do,
    For,
    Break,
    Continue,
    Return,
    Discard,

    // qualifiers
    Const,
    Operator,

    // preprocessor
    Include,

    // punctuation
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    Dot,
    Comma,
    Semicolon,
    Colon,
    ColonColon,
    Arrow,
    Amp, // '&' used both as bitwise-and and by-reference marker

    // operators (arithmetic / logical / relational)
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    AmpAmp,
    PipePipe,
    Pipe,
    Caret,
    Bang,
    Tilde,
    Question,
    EqEq,
    BangEq,
    Lt,
    Gt,
    LtEq,
    GtEq,

    // assignment
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,

    // increment/decrement
    PlusPlus,
    MinusMinus,

    Unknown,
    Eof,
}

impl TokenKind {
    /// Classify an already-scanned identifier lexeme as a keyword, or
    /// `None` if it's a plain identifier.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        use TokenKind::*;
        Some(match text {
            "Input" => Input,
            "VertexPass" => VertexPass,
            "FragmentPass" => FragmentPass,
            "Output" => Output,
            "struct" => Struct,
            "AttributeBlock" => AttributeBlock,
            "ConstantBlock" => ConstantBlock,
            "Texture" => TextureKeyword,
            "namespace" => Namespace,
            "this" => This,
            "if" => If,
            "else" => Else,
            "while" => While,
            "do" => Do,
            "for" => For,
            "break" => Break,
            "continue" => Continue,
            "return" => Return,
            "discard" => Discard,
            "const" => Const,
            "operator" => Operator,
            "true" | "false" => BoolLiteral,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
    /// The full source line the token begins on, captured for diagnostic
    /// rendering (caret underlines).
    pub line_text: String,
}

impl Token {
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// True for the `+ - ! ~ ++ --` prefix-unary set.
    pub fn can_start_unary(&self) -> bool {
        use TokenKind::*;
        matches!(self.kind, Plus | Minus | Bang | Tilde | PlusPlus | MinusMinus)
    }
}
