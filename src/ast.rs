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

//! The concrete syntax tree. Nodes own their children exclusively;
//! cross-references (types, callees, field names) go through qualified
//! `Name` values resolved later by the analyzer, never through pointers
//! into another node (spec.md §3, §9).

use std::rc::Rc;

use crate::span::Span;
use crate::token::Token;

// Abstract over memory management the way the teacher's ast.rs does.
pub type Node<T> = Rc<T>;

/// A non-empty, `::`-joined, ordered sequence of identifiers.
#[derive(Clone, Debug)]
pub struct Name {
    pub parts: Vec<Token>,
    pub span: Span,
}

impl Name {
    pub fn simple(token: Token) -> Name {
        Name { span: token.span.clone(), parts: vec![token] }
    }

    /// Dotted/`::`-joined textual form, e.g. `geom::Vertex`.
    pub fn text(&self) -> String {
        self.parts.iter().map(|t| t.lexeme.as_str()).collect::<Vec<_>>().join("::")
    }

    pub fn last(&self) -> &Token {
        self.parts.last().expect("Name is never empty")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Stage {
    Input,
    VertexPass,
    FragmentPass,
    Output,
}

impl Stage {
    pub fn is_programmable(self) -> bool {
        matches!(self, Stage::VertexPass | Stage::FragmentPass)
    }
}

/// One `[N]` suffix in a declarator; the size may be any constant
/// expression (an integer literal in practice, but the grammar allows an
/// expression and the analyzer verifies it deduces to an integer type).
#[derive(Clone, Debug)]
pub struct ArrayDim {
    pub size: Expr,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Declarator {
    pub type_name: Name,
    pub by_ref: bool,
    pub array_dims: Vec<ArrayDim>,
}

#[derive(Clone, Debug)]
pub struct Param {
    pub declarator: Declarator,
    pub name: Token,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct VariableDecl {
    pub is_const: bool,
    pub declarator: Declarator,
    pub name: Token,
    pub initializer: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum StmtKind {
    Block(Block),
    If { cond: Expr, then_branch: Box<Stmt>, else_branch: Option<Box<Stmt>> },
    While { cond: Expr, body: Box<Stmt> },
    DoWhile { body: Box<Stmt>, cond: Expr },
    For { init: Option<Box<Stmt>>, cond: Option<Expr>, increment: Option<Expr>, body: Box<Stmt> },
    Return(Option<Expr>),
    Break,
    Continue,
    Discard,
    VariableDecl(VariableDecl),
    Expr(Expr),
    /// Emitted in place of a statement the parser could not make sense
    /// of, after error recovery skipped to the next boundary.
    Error,
}

#[derive(Clone, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Modulo,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Equal,
    Diff,
    Lower,
    Greater,
    LEqual,
    GEqual,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    PlusEqual,
    MinusEqual,
    MultEqual,
    DivEqual,
    ModuloEqual,
    AndEqual,
    OrEqual,
    XorEqual,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
    PreIncrement,
    PreDecrement,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    Integer,
    UnsignedInteger,
    Float,
    Bool,
    String,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Literal { kind: LiteralKind, token: Token },
    This(Token),
    Identifier(Name),
    Member { object: Box<Expr>, member: Token },
    Index { object: Box<Expr>, index: Box<Expr> },
    Call { callee: Box<Expr>, args: Vec<Expr> },
    Unary { op: UnaryOp, op_token: Token, operand: Box<Expr> },
    Postfix { op: PostfixOp, op_token: Token, operand: Box<Expr> },
    Binary { op: BinOp, op_token: Token, left: Box<Expr>, right: Box<Expr> },
    Conditional { cond: Box<Expr>, then_expr: Box<Expr>, else_expr: Box<Expr> },
    Assignment { op: AssignOp, op_token: Token, target: Box<Expr>, value: Box<Expr> },
    ArrayLiteral(Vec<Expr>),
    Paren(Box<Expr>),
    /// Emitted after a recoverable parse error inside an expression
    /// position.
    Error,
}

#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AggregateKind {
    Struct,
    AttributeBlock,
    ConstantBlock,
}

#[derive(Clone, Debug)]
pub struct FunctionDecl {
    /// `None` for constructors, whose name equals the aggregate name.
    pub return_type: Option<Declarator>,
    pub name: Token,
    pub params: Vec<Param>,
    pub is_const: bool,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct OperatorDecl {
    pub op_token: Token,
    /// `[` paired with `]` for the index operator, which spans two
    /// tokens (`operator [ ]`).
    pub closing_token: Option<Token>,
    pub return_type: Declarator,
    pub params: Vec<Param>,
    pub is_const: bool,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum AggregateMember {
    Field(VariableDecl),
    Constructor(FunctionDecl),
    Method(FunctionDecl),
    Operator(OperatorDecl),
}

#[derive(Clone, Debug)]
pub struct AggregateDecl {
    pub kind: AggregateKind,
    pub name: Token,
    pub members: Vec<AggregateMember>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct PipelineDecl {
    pub from: Stage,
    pub from_token: Token,
    pub to: Stage,
    pub to_token: Token,
    pub declarator: Declarator,
    pub name: Token,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct StageFunctionDecl {
    pub stage: Stage,
    pub stage_token: Token,
    pub params: Vec<Param>,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct NamespaceDecl {
    pub name: Token,
    pub instructions: Vec<Instruction>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum InstructionKind {
    Pipeline(PipelineDecl),
    StageFunction(StageFunctionDecl),
    Namespace(NamespaceDecl),
    Aggregate(AggregateDecl),
    Function(FunctionDecl),
    Variable(VariableDecl),
    /// Emitted after error recovery skipped a malformed top-level
    /// construct.
    Error,
}

#[derive(Clone, Debug)]
pub struct Instruction {
    pub kind: InstructionKind,
    pub span: Span,
}

/// A full compilation unit: every top-level instruction, after include
/// expansion, in source order.
#[derive(Clone, Debug)]
pub struct CompilationUnit {
    pub instructions: Vec<Instruction>,
}
