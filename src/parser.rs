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

//! Recursive-descent parser with error recovery, grounded on the
//! control flow of `original_source`'s hand-written parser rather than
//! a grammar generator: every parse function either returns a node or
//! reports a diagnostic and skips to the next recognizable boundary, so
//! one malformed instruction never aborts the whole compilation unit
//! (spec.md §4.3, §7).

use crate::ast::*;
use crate::diagnostics::{DiagnosticBag, DiagnosticCategory};
use crate::span::Span;
use crate::token::{Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Parser {
        Parser { tokens, pos: 0 }
    }

    pub fn parse(tokens: Vec<Token>, diagnostics: &mut DiagnosticBag) -> CompilationUnit {
        let mut parser = Parser::new(tokens);
        let mut instructions = Vec::new();
        while !parser.at_eof() {
            instructions.push(parser.parse_instruction(diagnostics));
        }
        CompilationUnit { instructions }
    }

    // --- token stream primitives -----------------------------------

    fn at_eof(&self) -> bool {
        self.peek().is_eof()
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn matches(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind, diagnostics: &mut DiagnosticBag) -> Token {
        if self.check(kind) {
            self.advance()
        } else {
            let tok = self.peek().clone();
            diagnostics.report(
                DiagnosticCategory::ExpectedGotUnexpected,
                tok.span.clone(),
                format!("expected {:?}, found {:?} `{}`", kind, tok.kind, tok.lexeme),
            );
            tok
        }
    }

    fn here(&self) -> Span {
        self.peek().span.clone()
    }

    /// Skip tokens until one of `boundaries` is next (or EOF), for
    /// recovery after a reported diagnostic. The boundary token is not
    /// consumed, except a `;`, which is consumed since it terminates
    /// the construct it closes.
    fn recover_to(&mut self, boundaries: &[TokenKind]) {
        while !self.at_eof() && !boundaries.contains(&self.peek_kind()) {
            self.advance();
        }
        if self.check(TokenKind::Semicolon) {
            self.advance();
        }
    }

    // --- top level ----------------------------------------------------

    fn parse_instruction(&mut self, diagnostics: &mut DiagnosticBag) -> Instruction {
        let start = self.here();
        let kind = match self.peek_kind() {
            TokenKind::Input | TokenKind::VertexPass | TokenKind::FragmentPass | TokenKind::Output => {
                if self.stage_starts_pipeline() {
                    InstructionKind::Pipeline(self.parse_pipeline(diagnostics))
                } else {
                    InstructionKind::StageFunction(self.parse_stage_function(diagnostics))
                }
            }
            TokenKind::Namespace => InstructionKind::Namespace(self.parse_namespace(diagnostics)),
            TokenKind::Struct | TokenKind::AttributeBlock | TokenKind::ConstantBlock => {
                InstructionKind::Aggregate(self.parse_aggregate(diagnostics))
            }
            TokenKind::Const => InstructionKind::Variable(self.parse_variable_decl(diagnostics)),
            TokenKind::Include => {
                // Include directives are expanded by the compilation driver
                // before parsing reaches here (`crate::include`); seeing one
                // at this layer means it was left in the token stream
                // unresolved, which we treat as a recoverable no-op.
                self.advance();
                self.matches(TokenKind::HeaderLiteral);
                InstructionKind::Error
            }
            TokenKind::Identifier | TokenKind::TextureKeyword => self.parse_leading_identifier_instruction(diagnostics),
            _ => {
                let tok = self.advance();
                diagnostics.report(
                    DiagnosticCategory::ExpectedGotUnexpected,
                    tok.span.clone(),
                    format!("unexpected token `{}` at top level", tok.lexeme),
                );
                self.recover_to(&[
                    TokenKind::Input,
                    TokenKind::VertexPass,
                    TokenKind::FragmentPass,
                    TokenKind::Output,
                    TokenKind::Namespace,
                    TokenKind::Struct,
                    TokenKind::AttributeBlock,
                    TokenKind::ConstantBlock,
                ]);
                InstructionKind::Error
            }
        };
        Instruction { span: start.merge(&self.prev_span()), kind }
    }

    fn prev_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span.clone()
    }

    /// `Input -> VertexPass : T name;` is a pipeline flow declaration;
    /// `VertexPass (params) { ... }` is a stage function. Both begin
    /// with a stage keyword, so peek past it to disambiguate.
    fn stage_starts_pipeline(&self) -> bool {
        self.peek_at(1).kind == TokenKind::Arrow
    }

    fn parse_stage(&mut self, diagnostics: &mut DiagnosticBag) -> (Stage, Token) {
        let tok = self.advance();
        let stage = match tok.kind {
            TokenKind::Input => Stage::Input,
            TokenKind::VertexPass => Stage::VertexPass,
            TokenKind::FragmentPass => Stage::FragmentPass,
            TokenKind::Output => Stage::Output,
            _ => {
                diagnostics.report(
                    DiagnosticCategory::ExpectedGotUnexpected,
                    tok.span.clone(),
                    format!("expected a pipeline stage, found `{}`", tok.lexeme),
                );
                Stage::Input
            }
        };
        (stage, tok)
    }

    fn parse_pipeline(&mut self, diagnostics: &mut DiagnosticBag) -> PipelineDecl {
        let start = self.here();
        let (from, from_token) = self.parse_stage(diagnostics);
        self.expect(TokenKind::Arrow, diagnostics);
        let (to, to_token) = self.parse_stage(diagnostics);
        self.expect(TokenKind::Colon, diagnostics);
        let declarator = self.parse_declarator(diagnostics);
        let name = self.expect(TokenKind::Identifier, diagnostics);
        self.expect(TokenKind::Semicolon, diagnostics);
        PipelineDecl { from, from_token, to, to_token, declarator, name, span: start.merge(&self.prev_span()) }
    }

    fn parse_stage_function(&mut self, diagnostics: &mut DiagnosticBag) -> StageFunctionDecl {
        let start = self.here();
        let (stage, stage_token) = self.parse_stage(diagnostics);
        self.expect(TokenKind::OpenParen, diagnostics);
        let params = self.parse_param_list(diagnostics);
        self.expect(TokenKind::CloseParen, diagnostics);
        let body = self.parse_block(diagnostics);
        StageFunctionDecl { stage, stage_token, params, body, span: start.merge(&self.prev_span()) }
    }

    fn parse_namespace(&mut self, diagnostics: &mut DiagnosticBag) -> NamespaceDecl {
        let start = self.here();
        self.advance(); // 'namespace'
        let name = self.expect(TokenKind::Identifier, diagnostics);
        self.expect(TokenKind::OpenCurly, diagnostics);
        let mut instructions = Vec::new();
        while !self.check(TokenKind::CloseCurly) && !self.at_eof() {
            instructions.push(self.parse_instruction(diagnostics));
        }
        self.expect(TokenKind::CloseCurly, diagnostics);
        NamespaceDecl { name, instructions, span: start.merge(&self.prev_span()) }
    }

    fn parse_aggregate(&mut self, diagnostics: &mut DiagnosticBag) -> AggregateDecl {
        let start = self.here();
        let kind_tok = self.advance();
        let kind = match kind_tok.kind {
            TokenKind::Struct => AggregateKind::Struct,
            TokenKind::AttributeBlock => AggregateKind::AttributeBlock,
            TokenKind::ConstantBlock => AggregateKind::ConstantBlock,
            _ => AggregateKind::Struct,
        };
        let name = self.expect(TokenKind::Identifier, diagnostics);
        self.expect(TokenKind::OpenCurly, diagnostics);
        let mut members = Vec::new();
        while !self.check(TokenKind::CloseCurly) && !self.at_eof() {
            members.push(self.parse_aggregate_member(&name.lexeme, diagnostics));
        }
        self.expect(TokenKind::CloseCurly, diagnostics);
        self.matches(TokenKind::Semicolon);
        AggregateDecl { kind, name, members, span: start.merge(&self.prev_span()) }
    }

    fn parse_aggregate_member(&mut self, owner: &str, diagnostics: &mut DiagnosticBag) -> AggregateMember {
        if self.check(TokenKind::Operator) {
            return AggregateMember::Operator(self.parse_operator_decl(diagnostics));
        }
        // A constructor repeats the aggregate name immediately followed
        // by '(' (no declared return type); everything else begins with
        // a declarator.
        if self.check(TokenKind::Identifier)
            && self.peek().lexeme == owner
            && self.peek_at(1).kind == TokenKind::OpenParen
        {
            return AggregateMember::Constructor(self.parse_function_tail(None, diagnostics));
        }
        let is_const = self.matches(TokenKind::Const).is_some();
        let declarator = self.parse_declarator(diagnostics);
        let name = self.expect(TokenKind::Identifier, diagnostics);
        if self.check(TokenKind::OpenParen) {
            let mut decl = self.parse_function_tail(Some(declarator), diagnostics);
            decl.name = name;
            AggregateMember::Method(decl)
        } else {
            let field = self.parse_variable_decl_tail(is_const, declarator, name, diagnostics);
            AggregateMember::Field(field)
        }
    }

    fn parse_operator_decl(&mut self, diagnostics: &mut DiagnosticBag) -> OperatorDecl {
        let start = self.here();
        self.advance(); // 'operator'
        let op_token = self.advance();
        let closing_token = if op_token.kind == TokenKind::OpenBracket {
            Some(self.expect(TokenKind::CloseBracket, diagnostics))
        } else {
            None
        };
        self.expect(TokenKind::OpenParen, diagnostics);
        let return_type = self.parse_declarator(diagnostics);
        self.expect(TokenKind::CloseParen, diagnostics);
        self.expect(TokenKind::OpenParen, diagnostics);
        let params = self.parse_param_list(diagnostics);
        self.expect(TokenKind::CloseParen, diagnostics);
        let is_const = self.matches(TokenKind::Const).is_some();
        let body = self.parse_block(diagnostics);
        OperatorDecl {
            op_token,
            closing_token,
            return_type,
            params,
            is_const,
            body,
            span: start.merge(&self.prev_span()),
        }
    }

    /// A free function or method: `[declarator] name(params) [const] { body }`.
    /// For constructors `declarator` is `None` and `name` is filled by the caller.
    fn parse_function_tail(&mut self, declarator: Option<Declarator>, diagnostics: &mut DiagnosticBag) -> FunctionDecl {
        let start = self.here();
        let name = self.expect(TokenKind::Identifier, diagnostics);
        self.expect(TokenKind::OpenParen, diagnostics);
        let params = self.parse_param_list(diagnostics);
        self.expect(TokenKind::CloseParen, diagnostics);
        let is_const = self.matches(TokenKind::Const).is_some();
        let body = self.parse_block(diagnostics);
        FunctionDecl {
            return_type: declarator,
            name,
            params,
            is_const,
            body,
            span: start.merge(&self.prev_span()),
        }
    }

    fn parse_leading_identifier_instruction(&mut self, diagnostics: &mut DiagnosticBag) -> InstructionKind {
        let declarator = self.parse_declarator(diagnostics);
        let name = self.expect(TokenKind::Identifier, diagnostics);
        if self.check(TokenKind::OpenParen) {
            let mut decl = self.parse_function_tail(Some(declarator), diagnostics);
            decl.name = name;
            InstructionKind::Function(decl)
        } else {
            InstructionKind::Variable(self.parse_variable_decl_tail(false, declarator, name, diagnostics))
        }
    }

    fn parse_param_list(&mut self, diagnostics: &mut DiagnosticBag) -> Vec<Param> {
        let mut params = Vec::new();
        if self.check(TokenKind::CloseParen) {
            return params;
        }
        loop {
            let start = self.here();
            let declarator = self.parse_declarator(diagnostics);
            let name = self.expect(TokenKind::Identifier, diagnostics);
            params.push(Param { declarator, name, span: start.merge(&self.prev_span()) });
            if self.matches(TokenKind::Comma).is_none() {
                break;
            }
        }
        params
    }

    fn parse_declarator(&mut self, diagnostics: &mut DiagnosticBag) -> Declarator {
        let by_ref = self.matches(TokenKind::Amp).is_some();
        let type_name = self.parse_name(diagnostics);
        let mut array_dims = Vec::new();
        while self.check(TokenKind::OpenBracket) {
            let start = self.here();
            self.advance();
            let size = self.parse_expr(diagnostics);
            self.expect(TokenKind::CloseBracket, diagnostics);
            array_dims.push(ArrayDim { size, span: start.merge(&self.prev_span()) });
        }
        Declarator { type_name, by_ref, array_dims }
    }

    /// A type name is ordinarily a plain (possibly `::`-qualified)
    /// identifier, but `Texture` lexes as its own keyword (`TokenKind::
    /// TextureKeyword`) rather than `Identifier` so it can't be used as a
    /// value identifier elsewhere — accept it here as the leading part.
    fn parse_name(&mut self, diagnostics: &mut DiagnosticBag) -> Name {
        let first = if self.check(TokenKind::TextureKeyword) { self.advance() } else { self.expect(TokenKind::Identifier, diagnostics) };
        let mut parts = vec![first];
        while self.check(TokenKind::ColonColon) {
            self.advance();
            parts.push(self.expect(TokenKind::Identifier, diagnostics));
        }
        let span = parts[0].span.merge(&parts.last().unwrap().span);
        Name { parts, span }
    }

    fn parse_variable_decl(&mut self, diagnostics: &mut DiagnosticBag) -> VariableDecl {
        let is_const = self.matches(TokenKind::Const).is_some();
        let declarator = self.parse_declarator(diagnostics);
        let name = self.expect(TokenKind::Identifier, diagnostics);
        self.parse_variable_decl_tail(is_const, declarator, name, diagnostics)
    }

    fn parse_variable_decl_tail(
        &mut self,
        is_const: bool,
        declarator: Declarator,
        name: Token,
        diagnostics: &mut DiagnosticBag,
    ) -> VariableDecl {
        let start = name.span.clone();
        let initializer = if self.matches(TokenKind::Eq).is_some() { Some(self.parse_expr(diagnostics)) } else { None };
        self.expect(TokenKind::Semicolon, diagnostics);
        VariableDecl { is_const, declarator, name, initializer, span: start.merge(&self.prev_span()) }
    }

    // --- statements -----------------------------------------------------

    fn parse_block(&mut self, diagnostics: &mut DiagnosticBag) -> Block {
        let start = self.here();
        self.expect(TokenKind::OpenCurly, diagnostics);
        let mut statements = Vec::new();
        while !self.check(TokenKind::CloseCurly) && !self.at_eof() {
            statements.push(self.parse_statement(diagnostics));
        }
        self.expect(TokenKind::CloseCurly, diagnostics);
        Block { statements, span: start.merge(&self.prev_span()) }
    }

    fn parse_statement(&mut self, diagnostics: &mut DiagnosticBag) -> Stmt {
        let start = self.here();
        let kind = match self.peek_kind() {
            TokenKind::OpenCurly => StmtKind::Block(self.parse_block(diagnostics)),
            TokenKind::If => self.parse_if(diagnostics),
            TokenKind::While => self.parse_while(diagnostics),
            TokenKind::Do => self.parse_do_while(diagnostics),
            TokenKind::For => self.parse_for(diagnostics),
            TokenKind::Return => {
                self.advance();
                let value = if self.check(TokenKind::Semicolon) { None } else { Some(self.parse_expr(diagnostics)) };
                self.expect(TokenKind::Semicolon, diagnostics);
                StmtKind::Return(value)
            }
            TokenKind::Break => {
                self.advance();
                self.expect(TokenKind::Semicolon, diagnostics);
                StmtKind::Break
            }
            TokenKind::Continue => {
                self.advance();
                self.expect(TokenKind::Semicolon, diagnostics);
                StmtKind::Continue
            }
            TokenKind::Discard => {
                self.advance();
                self.expect(TokenKind::Semicolon, diagnostics);
                StmtKind::Discard
            }
            TokenKind::Const => StmtKind::VariableDecl(self.parse_variable_decl(diagnostics)),
            TokenKind::Identifier if self.looks_like_declaration() => {
                StmtKind::VariableDecl(self.parse_variable_decl(diagnostics))
            }
            _ => {
                let expr = self.parse_expr(diagnostics);
                self.expect(TokenKind::Semicolon, diagnostics);
                StmtKind::Expr(expr)
            }
        };
        Stmt { kind, span: start.merge(&self.prev_span()) }
    }

    /// Distinguish `T name ...;` from an expression statement starting
    /// with an identifier: a declaration's identifier is followed by
    /// another identifier (the variable name), `::`, `&`, or `[`.
    fn looks_like_declaration(&self) -> bool {
        let mut offset = 1;
        if self.peek_at(offset).kind == TokenKind::ColonColon {
            offset += 2;
            while self.peek_at(offset).kind == TokenKind::ColonColon {
                offset += 2;
            }
        }
        matches!(self.peek_at(offset).kind, TokenKind::Identifier | TokenKind::OpenBracket)
    }

    fn parse_if(&mut self, diagnostics: &mut DiagnosticBag) -> StmtKind {
        self.advance();
        self.expect(TokenKind::OpenParen, diagnostics);
        let cond = self.parse_expr(diagnostics);
        self.expect(TokenKind::CloseParen, diagnostics);
        let then_branch = Box::new(self.parse_statement(diagnostics));
        let else_branch =
            if self.matches(TokenKind::Else).is_some() { Some(Box::new(self.parse_statement(diagnostics))) } else { None };
        StmtKind::If { cond, then_branch, else_branch }
    }

    fn parse_while(&mut self, diagnostics: &mut DiagnosticBag) -> StmtKind {
        self.advance();
        self.expect(TokenKind::OpenParen, diagnostics);
        let cond = self.parse_expr(diagnostics);
        self.expect(TokenKind::CloseParen, diagnostics);
        let body = Box::new(self.parse_statement(diagnostics));
        StmtKind::While { cond, body }
    }

    fn parse_do_while(&mut self, diagnostics: &mut DiagnosticBag) -> StmtKind {
        self.advance();
        let body = Box::new(self.parse_statement(diagnostics));
        self.expect(TokenKind::While, diagnostics);
        self.expect(TokenKind::OpenParen, diagnostics);
        let cond = self.parse_expr(diagnostics);
        self.expect(TokenKind::CloseParen, diagnostics);
        self.expect(TokenKind::Semicolon, diagnostics);
        StmtKind::DoWhile { body, cond }
    }

    fn parse_for(&mut self, diagnostics: &mut DiagnosticBag) -> StmtKind {
        self.advance();
        self.expect(TokenKind::OpenParen, diagnostics);
        let init = if self.check(TokenKind::Semicolon) {
            self.advance();
            None
        } else {
            Some(Box::new(self.parse_statement(diagnostics)))
        };
        let cond = if self.check(TokenKind::Semicolon) { None } else { Some(self.parse_expr(diagnostics)) };
        self.expect(TokenKind::Semicolon, diagnostics);
        let increment = if self.check(TokenKind::CloseParen) { None } else { Some(self.parse_expr(diagnostics)) };
        self.expect(TokenKind::CloseParen, diagnostics);
        let body = Box::new(self.parse_statement(diagnostics));
        StmtKind::For { init, cond, increment, body }
    }

    // --- expressions: precedence-climbing ------------------------------

    fn parse_expr(&mut self, diagnostics: &mut DiagnosticBag) -> Expr {
        self.parse_assignment(diagnostics)
    }

    fn parse_assignment(&mut self, diagnostics: &mut DiagnosticBag) -> Expr {
        let target = self.parse_conditional(diagnostics);
        if let Some(op) = self.peek_assign_op() {
            let op_token = self.advance();
            let value = self.parse_assignment(diagnostics);
            let span = target.span.merge(&value.span);
            return Expr {
                kind: ExprKind::Assignment { op, op_token, target: Box::new(target), value: Box::new(value) },
                span,
            };
        }
        target
    }

    fn peek_assign_op(&self) -> Option<AssignOp> {
        use AssignOp::*;
        Some(match self.peek_kind() {
            TokenKind::Eq => Assign,
            TokenKind::PlusEq => PlusEqual,
            TokenKind::MinusEq => MinusEqual,
            TokenKind::StarEq => MultEqual,
            TokenKind::SlashEq => DivEqual,
            TokenKind::PercentEq => ModuloEqual,
            TokenKind::AmpEq => AndEqual,
            TokenKind::PipeEq => OrEqual,
            TokenKind::CaretEq => XorEqual,
            _ => return None,
        })
    }

    fn parse_conditional(&mut self, diagnostics: &mut DiagnosticBag) -> Expr {
        let cond = self.parse_logical_or(diagnostics);
        if self.matches(TokenKind::Question).is_some() {
            let then_expr = self.parse_expr(diagnostics);
            self.expect(TokenKind::Colon, diagnostics);
            let else_expr = self.parse_conditional(diagnostics);
            let span = cond.span.merge(&else_expr.span);
            return Expr {
                kind: ExprKind::Conditional {
                    cond: Box::new(cond),
                    then_expr: Box::new(then_expr),
                    else_expr: Box::new(else_expr),
                },
                span,
            };
        }
        cond
    }

    fn parse_binary_level(
        &mut self,
        diagnostics: &mut DiagnosticBag,
        ops: &[(TokenKind, BinOp)],
        next: fn(&mut Self, &mut DiagnosticBag) -> Expr,
    ) -> Expr {
        let mut left = next(self, diagnostics);
        loop {
            let matched = ops.iter().find(|(kind, _)| self.check(*kind));
            match matched {
                Some((_, op)) => {
                    let op_token = self.advance();
                    let right = next(self, diagnostics);
                    let span = left.span.merge(&right.span);
                    left = Expr {
                        kind: ExprKind::Binary { op: *op, op_token, left: Box::new(left), right: Box::new(right) },
                        span,
                    };
                }
                None => break,
            }
        }
        left
    }

    fn parse_logical_or(&mut self, diagnostics: &mut DiagnosticBag) -> Expr {
        self.parse_binary_level(diagnostics, &[(TokenKind::PipePipe, BinOp::Or)], Self::parse_logical_and)
    }

    fn parse_logical_and(&mut self, diagnostics: &mut DiagnosticBag) -> Expr {
        self.parse_binary_level(diagnostics, &[(TokenKind::AmpAmp, BinOp::And)], Self::parse_bit_or)
    }

    fn parse_bit_or(&mut self, diagnostics: &mut DiagnosticBag) -> Expr {
        self.parse_binary_level(diagnostics, &[(TokenKind::Pipe, BinOp::BitOr)], Self::parse_bit_xor)
    }

    fn parse_bit_xor(&mut self, diagnostics: &mut DiagnosticBag) -> Expr {
        self.parse_binary_level(diagnostics, &[(TokenKind::Caret, BinOp::BitXor)], Self::parse_bit_and)
    }

    fn parse_bit_and(&mut self, diagnostics: &mut DiagnosticBag) -> Expr {
        self.parse_binary_level(diagnostics, &[(TokenKind::Amp, BinOp::BitAnd)], Self::parse_equality)
    }

    fn parse_equality(&mut self, diagnostics: &mut DiagnosticBag) -> Expr {
        self.parse_binary_level(
            diagnostics,
            &[(TokenKind::EqEq, BinOp::Equal), (TokenKind::BangEq, BinOp::Diff)],
            Self::parse_relational,
        )
    }

    fn parse_relational(&mut self, diagnostics: &mut DiagnosticBag) -> Expr {
        self.parse_binary_level(
            diagnostics,
            &[
                (TokenKind::Lt, BinOp::Lower),
                (TokenKind::Gt, BinOp::Greater),
                (TokenKind::LtEq, BinOp::LEqual),
                (TokenKind::GtEq, BinOp::GEqual),
            ],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self, diagnostics: &mut DiagnosticBag) -> Expr {
        self.parse_binary_level(
            diagnostics,
            &[(TokenKind::Plus, BinOp::Add), (TokenKind::Minus, BinOp::Sub)],
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self, diagnostics: &mut DiagnosticBag) -> Expr {
        self.parse_binary_level(
            diagnostics,
            &[
                (TokenKind::Star, BinOp::Mul),
                (TokenKind::Slash, BinOp::Div),
                (TokenKind::Percent, BinOp::Modulo),
            ],
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self, diagnostics: &mut DiagnosticBag) -> Expr {
        let op = match self.peek_kind() {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::PlusPlus => Some(UnaryOp::PreIncrement),
            TokenKind::MinusMinus => Some(UnaryOp::PreDecrement),
            _ => None,
        };
        if let Some(op) = op {
            let op_token = self.advance();
            let operand = self.parse_unary(diagnostics);
            let span = op_token.span.merge(&operand.span);
            return Expr { kind: ExprKind::Unary { op, op_token, operand: Box::new(operand) }, span };
        }
        self.parse_postfix(diagnostics)
    }

    fn parse_postfix(&mut self, diagnostics: &mut DiagnosticBag) -> Expr {
        let mut expr = self.parse_primary(diagnostics);
        loop {
            expr = match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let member = self.expect(TokenKind::Identifier, diagnostics);
                    let span = expr.span.merge(&member.span);
                    Expr { kind: ExprKind::Member { object: Box::new(expr), member }, span }
                }
                TokenKind::OpenBracket => {
                    self.advance();
                    let index = self.parse_expr(diagnostics);
                    self.expect(TokenKind::CloseBracket, diagnostics);
                    let span = expr.span.merge(&self.prev_span());
                    Expr { kind: ExprKind::Index { object: Box::new(expr), index: Box::new(index) }, span }
                }
                TokenKind::OpenParen => {
                    self.advance();
                    let args = self.parse_arg_list(diagnostics);
                    self.expect(TokenKind::CloseParen, diagnostics);
                    let span = expr.span.merge(&self.prev_span());
                    Expr { kind: ExprKind::Call { callee: Box::new(expr), args }, span }
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op_token = self.advance();
                    let op = if op_token.kind == TokenKind::PlusPlus { PostfixOp::Increment } else { PostfixOp::Decrement };
                    let span = expr.span.merge(&op_token.span);
                    Expr { kind: ExprKind::Postfix { op, op_token, operand: Box::new(expr) }, span }
                }
                _ => break,
            };
        }
        expr
    }

    fn parse_arg_list(&mut self, diagnostics: &mut DiagnosticBag) -> Vec<Expr> {
        let mut args = Vec::new();
        if self.check(TokenKind::CloseParen) {
            return args;
        }
        loop {
            args.push(self.parse_expr(diagnostics));
            if self.matches(TokenKind::Comma).is_none() {
                break;
            }
        }
        args
    }

    fn parse_primary(&mut self, diagnostics: &mut DiagnosticBag) -> Expr {
        let start = self.here();
        match self.peek_kind() {
            TokenKind::IntegerLiteral => {
                let token = self.advance();
                let unsigned = token.lexeme.ends_with('u') || token.lexeme.ends_with('U');
                if unsigned && token.lexeme.starts_with('-') {
                    diagnostics.report(
                        DiagnosticCategory::UnsignedLiteralWithNegativeSign,
                        token.span.clone(),
                        format!("unsigned literal `{}` cannot carry a negative sign", token.lexeme),
                    );
                }
                let kind = if unsigned { LiteralKind::UnsignedInteger } else { LiteralKind::Integer };
                Expr { kind: ExprKind::Literal { kind, token }, span: start }
            }
            TokenKind::FloatLiteral => {
                let token = self.advance();
                Expr { kind: ExprKind::Literal { kind: LiteralKind::Float, token }, span: start }
            }
            TokenKind::StringLiteral => {
                let token = self.advance();
                Expr { kind: ExprKind::Literal { kind: LiteralKind::String, token }, span: start }
            }
            TokenKind::BoolLiteral => {
                let token = self.advance();
                Expr { kind: ExprKind::Literal { kind: LiteralKind::Bool, token }, span: start }
            }
            TokenKind::This => {
                let token = self.advance();
                Expr { kind: ExprKind::This(token), span: start }
            }
            TokenKind::Identifier => {
                let name = self.parse_name(diagnostics);
                let span = name.span.clone();
                Expr { kind: ExprKind::Identifier(name), span }
            }
            TokenKind::OpenParen => {
                self.advance();
                let inner = self.parse_expr(diagnostics);
                self.expect(TokenKind::CloseParen, diagnostics);
                let span = start.merge(&self.prev_span());
                Expr { kind: ExprKind::Paren(Box::new(inner)), span }
            }
            TokenKind::OpenCurly => {
                self.advance();
                let mut items = Vec::new();
                if !self.check(TokenKind::CloseCurly) {
                    loop {
                        items.push(self.parse_expr(diagnostics));
                        if self.matches(TokenKind::Comma).is_none() {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::CloseCurly, diagnostics);
                let span = start.merge(&self.prev_span());
                Expr { kind: ExprKind::ArrayLiteral(items), span }
            }
            _ => {
                let tok = self.advance();
                diagnostics.report(
                    DiagnosticCategory::ExpectedGotUnexpected,
                    tok.span.clone(),
                    format!("expected an expression, found `{}`", tok.lexeme),
                );
                Expr { kind: ExprKind::Error, span: tok.span }
            }
        }
    }
}

/// Convenience wrapper used by the compilation driver: tokenize then parse.
pub fn parse_source(origin: &std::path::Path, source: &str, diagnostics: &mut DiagnosticBag) -> CompilationUnit {
    let normalized = crate::tokenizer::normalize_line_endings(source);
    let tokens = crate::tokenizer::Tokenizer::new(origin, &normalized, diagnostics).tokenize();
    Parser::parse(tokens, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse_ok(src: &str) -> CompilationUnit {
        let mut diagnostics = DiagnosticBag::new();
        let unit = parse_source(&PathBuf::from("t.lum"), src, &mut diagnostics);
        assert!(diagnostics.is_success(), "unexpected diagnostics: {:?}", diagnostics.into_vec());
        unit
    }

    #[test]
    fn parses_a_struct_with_fields_and_a_method() {
        let unit = parse_ok(
            r#"
            struct Vertex {
                Vector3 position;
                Vector3 normal;

                float length() const {
                    return 0.0;
                }
            }
            "#,
        );
        assert_eq!(unit.instructions.len(), 1);
        match &unit.instructions[0].kind {
            InstructionKind::Aggregate(agg) => {
                assert_eq!(agg.kind, AggregateKind::Struct);
                assert_eq!(agg.members.len(), 3);
            }
            other => panic!("expected aggregate, got {:?}", other),
        }
    }

    #[test]
    fn parses_a_pipeline_flow_declaration() {
        let unit = parse_ok("Input -> VertexPass : Vector3 position;");
        match &unit.instructions[0].kind {
            InstructionKind::Pipeline(p) => {
                assert_eq!(p.from, Stage::Input);
                assert_eq!(p.to, Stage::VertexPass);
            }
            other => panic!("expected pipeline decl, got {:?}", other),
        }
    }

    #[test]
    fn parses_a_stage_function_body() {
        let unit = parse_ok(
            r#"
            VertexPass(Vector3 position) {
                Vector4 clip = position.xyzz;
                return;
            }
            "#,
        );
        match &unit.instructions[0].kind {
            InstructionKind::StageFunction(f) => {
                assert_eq!(f.stage, Stage::VertexPass);
                assert_eq!(f.body.statements.len(), 2);
            }
            other => panic!("expected stage function, got {:?}", other),
        }
    }

    #[test]
    fn recovers_from_a_malformed_top_level_instruction() {
        let mut diagnostics = DiagnosticBag::new();
        let unit = parse_source(
            &PathBuf::from("t.lum"),
            "@@@ struct Good { int x; }",
            &mut diagnostics,
        );
        assert!(diagnostics.count() >= 1);
        assert!(unit.instructions.iter().any(|i| matches!(i.kind, InstructionKind::Aggregate(_))));
    }

    #[test]
    fn negative_unsigned_literal_is_a_diagnostic_not_a_parse_failure() {
        let mut diagnostics = DiagnosticBag::new();
        let unit = parse_source(&PathBuf::from("t.lum"), "uint x = -1u;", &mut diagnostics);

        assert_eq!(diagnostics.of_category(DiagnosticCategory::UnsignedLiteralWithNegativeSign), 1);
        match &unit.instructions[0].kind {
            InstructionKind::Variable(v) => match &v.initializer.as_ref().unwrap().kind {
                ExprKind::Literal { kind: LiteralKind::UnsignedInteger, .. } => {}
                other => panic!("expected an unsigned integer literal, got {:?}", other),
            },
            other => panic!("expected variable decl, got {:?}", other),
        }
    }

    #[test]
    fn parses_operator_precedence() {
        let unit = parse_ok("int x = 1 + 2 * 3;");
        match &unit.instructions[0].kind {
            InstructionKind::Variable(v) => match &v.initializer.as_ref().unwrap().kind {
                ExprKind::Binary { op: BinOp::Add, right, .. } => {
                    assert!(matches!(right.kind, ExprKind::Binary { op: BinOp::Mul, .. }));
                }
                other => panic!("expected top-level add, got {:?}", other),
            },
            other => panic!("expected variable decl, got {:?}", other),
        }
    }
}
