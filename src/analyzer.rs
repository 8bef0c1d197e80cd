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

//! The semantic analyzer: name resolution, type deduction, overload
//! resolution, and lowering from the CST to `crate::ir`.
//!
//! Runs in the phases spec.md §4.4 lays out: a declaration pass that
//! populates the symbol table (so forward references across the
//! compilation unit resolve), then a lowering pass over every body that
//! deduces expression types, resolves overloads, and emits IR. Every
//! failure is a diagnostic, not a `Result` bailout — lowering always
//! produces *something*, even if it's a best-effort stand-in.

use std::collections::HashMap;

use crate::ast::{self, Stage};
use crate::diagnostics::{DiagnosticBag, DiagnosticCategory};
use crate::ir;
use crate::mangle;
use crate::overload::{self, Resolution};
use crate::span::Span;
use crate::symbol::{FunctionSignature, ScalarKind, TypeKind};
use crate::token::Token;

/// Qualified name, namespace parts joined by `::`, matching the source
/// spelling (`geom::Vertex`).
type QName = String;

struct AggregateInfo {
    kind: ast::AggregateKind,
    fields: Vec<(String, TypeKind)>,
}

/// A declared top-level global: an explicit `Variable` instruction, or
/// the implicit instance installed for an attribute/constant block
/// (spec.md §3 Invariant 2).
struct GlobalDecl {
    name: QName,
    ty: TypeKind,
    is_const: bool,
    initializer: Option<ast::Expr>,
}

pub struct Analyzer<'d> {
    diagnostics: &'d mut DiagnosticBag,
    types: HashMap<QName, TypeKind>,
    aggregates: HashMap<QName, AggregateInfo>,
    methods: HashMap<(QName, String), Vec<FunctionSignature>>,
    free_functions: HashMap<QName, Vec<FunctionSignature>>,
    pipeline_flows: Vec<ir::IrPipelineFlow>,
    globals: HashMap<QName, TypeKind>,
    global_order: Vec<GlobalDecl>,
}

pub fn analyze(unit: &ast::CompilationUnit, diagnostics: &mut DiagnosticBag) -> ir::Module {
    let mut analyzer = Analyzer::new(diagnostics);
    analyzer.declare_pass(&unit.instructions, "");
    analyzer.lower_pass(&unit.instructions, "")
}

impl<'d> Analyzer<'d> {
    fn new(diagnostics: &'d mut DiagnosticBag) -> Analyzer<'d> {
        Analyzer {
            diagnostics,
            types: builtin_types(),
            aggregates: HashMap::new(),
            methods: HashMap::new(),
            free_functions: HashMap::new(),
            pipeline_flows: Vec::new(),
            globals: HashMap::new(),
            global_order: Vec::new(),
        }
    }

    fn qualify(prefix: &str, name: &str) -> QName {
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}::{}", prefix, name)
        }
    }

    // --- declaration pass --------------------------------------------

    fn declare_pass(&mut self, instructions: &[ast::Instruction], prefix: &str) {
        // First sub-pass: register every aggregate's existence so field
        // and parameter types can forward-reference siblings declared
        // later in the same (or an enclosing) scope.
        for instr in instructions {
            if let ast::InstructionKind::Aggregate(agg) = &instr.kind {
                let qname = Self::qualify(prefix, &agg.name.lexeme);
                if self.types.contains_key(&qname) {
                    self.diagnostics.report(
                        DiagnosticCategory::DuplicateType,
                        agg.name.span.clone(),
                        format!("type `{}` is already declared", qname),
                    );
                    continue;
                }
                self.types.insert(qname.clone(), TypeKind::Aggregate(qname));
            }
        }
        for instr in instructions {
            match &instr.kind {
                ast::InstructionKind::Aggregate(agg) => self.declare_aggregate(agg, prefix),
                ast::InstructionKind::Namespace(ns) => {
                    let qname = Self::qualify(prefix, &ns.name.lexeme);
                    self.declare_pass(&ns.instructions, &qname);
                }
                ast::InstructionKind::Function(f) => self.declare_free_function(f, prefix),
                ast::InstructionKind::Pipeline(p) => self.declare_pipeline(p, prefix),
                ast::InstructionKind::Variable(v) => self.declare_global(v, prefix),
                _ => {}
            }
        }
    }

    fn declare_global(&mut self, decl: &ast::VariableDecl, prefix: &str) {
        let qname = Self::qualify(prefix, &decl.name.lexeme);
        if self.globals.contains_key(&qname) {
            self.diagnostics.report(
                DiagnosticCategory::DuplicateVariable,
                decl.name.span.clone(),
                format!("variable `{}` is already declared", qname),
            );
            return;
        }
        let ty = self.resolve_declarator(&decl.declarator);
        self.globals.insert(qname.clone(), ty.clone());
        self.global_order.push(GlobalDecl {
            name: qname,
            ty,
            is_const: decl.is_const,
            initializer: decl.initializer.clone(),
        });
    }

    fn declare_aggregate(&mut self, agg: &ast::AggregateDecl, prefix: &str) {
        let qname = Self::qualify(prefix, &agg.name.lexeme);
        let mut fields = Vec::new();
        let mut seen_fields: HashMap<String, Span> = HashMap::new();
        for member in &agg.members {
            match member {
                ast::AggregateMember::Field(field) => {
                    if let Some(prev) = seen_fields.get(&field.name.lexeme) {
                        self.diagnostics.report(
                            DiagnosticCategory::DuplicateField,
                            field.name.span.clone(),
                            format!("field `{}` is already declared at {}", field.name.lexeme, prev),
                        );
                        continue;
                    }
                    let ty = self.resolve_declarator(&field.declarator);
                    seen_fields.insert(field.name.lexeme.clone(), field.name.span.clone());
                    fields.push((field.name.lexeme.clone(), ty));
                }
                ast::AggregateMember::Method(method) => {
                    let sig = self.build_signature(&qname, method.name.lexeme.as_str(), &method.params, method.return_type.as_ref());
                    self.methods.entry((qname.clone(), method.name.lexeme.clone())).or_default().push(sig);
                }
                ast::AggregateMember::Constructor(ctor) => {
                    let sig = self.build_signature(&qname, &qname, &ctor.params, None);
                    self.methods.entry((qname.clone(), qname.clone())).or_default().push(sig);
                }
                ast::AggregateMember::Operator(op) => {
                    let name = operator_declared_name(op);
                    let sig = self.build_signature(&qname, &name, &op.params, Some(&op.return_type));
                    self.methods.entry((qname.clone(), name)).or_default().push(sig);
                }
            }
        }
        self.aggregates.insert(qname.clone(), AggregateInfo { kind: agg.kind, fields });

        // An attribute/constant block additionally installs a global
        // variable named after the block itself (spec.md §3 Invariant 2).
        if !matches!(agg.kind, ast::AggregateKind::Struct) {
            if self.globals.contains_key(&qname) {
                self.diagnostics.report(
                    DiagnosticCategory::DuplicateVariable,
                    agg.name.span.clone(),
                    format!("variable `{}` is already declared", qname),
                );
            } else {
                let ty = TypeKind::Aggregate(qname.clone());
                self.globals.insert(qname.clone(), ty.clone());
                self.global_order.push(GlobalDecl {
                    name: qname,
                    ty,
                    is_const: matches!(agg.kind, ast::AggregateKind::ConstantBlock),
                    initializer: None,
                });
            }
        }
    }

    fn declare_free_function(&mut self, f: &ast::FunctionDecl, prefix: &str) {
        let qname = Self::qualify(prefix, &f.name.lexeme);
        let sig = self.build_signature("", &qname, &f.params, f.return_type.as_ref());
        self.free_functions.entry(qname).or_default().push(sig);
    }

    fn declare_pipeline(&mut self, p: &ast::PipelineDecl, _prefix: &str) {
        let ty = self.resolve_declarator(&p.declarator);
        if !valid_stage_pair(p.from, p.to) {
            self.diagnostics.report(
                DiagnosticCategory::InvalidStagePair,
                p.span.clone(),
                format!("{:?} cannot flow into {:?}", p.from, p.to),
            );
        }
        self.pipeline_flows.push(ir::IrPipelineFlow {
            from: p.from,
            to: p.to,
            name: p.name.lexeme.clone(),
            ty: to_ir_type(&ty),
        });
    }

    fn build_signature(
        &mut self,
        aggregate: &str,
        declared_name: &str,
        params: &[ast::Param],
        return_type: Option<&ast::Declarator>,
    ) -> FunctionSignature {
        let param_types: Vec<TypeKind> = params.iter().map(|p| self.resolve_declarator(&p.declarator)).collect();
        let ret = return_type.map(|d| self.resolve_declarator(d)).unwrap_or(TypeKind::Void);
        let mangled = if aggregate.is_empty() {
            declared_name.to_string()
        } else {
            mangle::method_name(aggregate, declared_name)
        };
        FunctionSignature { mangled_name: mangled, params: param_types, return_type: ret }
    }

    fn resolve_declarator(&mut self, declarator: &ast::Declarator) -> TypeKind {
        let base = self.resolve_type_name(&declarator.type_name);
        let mut ty = base;
        for dim in declarator.array_dims.iter().rev() {
            let size = self.eval_array_dim_size(dim);
            ty = TypeKind::Array(std::rc::Rc::new(ty), size);
        }
        ty
    }

    /// Array dimensions are constant expressions (spec.md §3); in
    /// practice always an integer literal, since the shape has to be
    /// known at declaration time for `ArrayShapeMismatch` to mean
    /// anything.
    fn eval_array_dim_size(&mut self, dim: &ast::ArrayDim) -> u64 {
        match &dim.size.kind {
            ast::ExprKind::Literal { kind: ast::LiteralKind::Integer, token } => token.lexeme.parse::<u64>().unwrap_or(0),
            ast::ExprKind::Literal { kind: ast::LiteralKind::UnsignedInteger, token } => {
                token.lexeme.trim_end_matches(['u', 'U']).parse::<u64>().unwrap_or(0)
            }
            _ => {
                self.diagnostics.report(
                    DiagnosticCategory::ExpectedGotUnexpected,
                    dim.span.clone(),
                    "array dimension must be an integer literal",
                );
                0
            }
        }
    }

    fn resolve_type_name(&mut self, name: &ast::Name) -> TypeKind {
        let text = name.text();
        match self.types.get(&text) {
            Some(ty) => ty.clone(),
            None => {
                self.diagnostics.report(
                    DiagnosticCategory::UnknownType,
                    name.span.clone(),
                    format!("unknown type `{}`", text),
                );
                TypeKind::Void
            }
        }
    }

    // --- lowering pass --------------------------------------------------

    fn lower_pass(&mut self, instructions: &[ast::Instruction], prefix: &str) -> ir::Module {
        let mut module = ir::Module::new();
        for instr in instructions {
            match &instr.kind {
                ast::InstructionKind::Aggregate(agg) => {
                    module.aggregates.push(self.lower_aggregate(agg, prefix));
                    for member in &agg.members {
                        if let Some(f) = self.lower_aggregate_method(agg, member, prefix) {
                            module.functions.push(f);
                        }
                    }
                }
                ast::InstructionKind::Namespace(ns) => {
                    let qname = Self::qualify(prefix, &ns.name.lexeme);
                    let nested = self.lower_pass(&ns.instructions, &qname);
                    module.aggregates.extend(nested.aggregates);
                    module.functions.extend(nested.functions);
                    module.pipeline_flows.extend(nested.pipeline_flows);
                    module.stage_entry_points.extend(nested.stage_entry_points);
                }
                ast::InstructionKind::Function(f) => {
                    module.functions.push(self.lower_function("", &f.name.lexeme, f));
                }
                ast::InstructionKind::StageFunction(sf) => {
                    module.stage_entry_points.push(self.lower_stage_function(sf));
                }
                ast::InstructionKind::Pipeline(_) | ast::InstructionKind::Variable(_) | ast::InstructionKind::Error => {}
            }
        }
        if prefix.is_empty() {
            module.pipeline_flows = self.pipeline_flows.clone();
            module.globals = self.lower_globals();
        }
        module
    }

    fn lower_globals(&mut self) -> Vec<ir::IrGlobal> {
        let declared = std::mem::take(&mut self.global_order);
        declared
            .into_iter()
            .map(|g| {
                let locals = HashMap::new();
                let value = g.initializer.as_ref().map(|e| {
                    let (ir_expr, init_ty) = self.lower_expr_typed(e, &locals);
                    self.convert_if_needed(ir_expr, &init_ty, &g.ty, e.span.clone())
                });
                ir::IrGlobal { name: g.name, ty: to_ir_type(&g.ty), is_const: g.is_const, value }
            })
            .collect()
    }

    fn lower_aggregate(&mut self, agg: &ast::AggregateDecl, prefix: &str) -> ir::IrAggregate {
        let qname = Self::qualify(prefix, &agg.name.lexeme);
        let fields = self
            .aggregates
            .get(&qname)
            .map(|info| info.fields.iter().map(|(n, t)| ir::IrField { name: n.clone(), ty: to_ir_type(t) }).collect())
            .unwrap_or_default();
        ir::IrAggregate { name: qname, kind: to_ir_aggregate_kind(agg.kind), fields }
    }

    fn lower_aggregate_method(
        &mut self,
        agg: &ast::AggregateDecl,
        member: &ast::AggregateMember,
        prefix: &str,
    ) -> Option<ir::IrFunction> {
        let qname = Self::qualify(prefix, &agg.name.lexeme);
        match member {
            ast::AggregateMember::Method(f) => {
                let mangled = mangle::method_name(&qname, &f.name.lexeme);
                Some(self.lower_function_body(&qname, &mangled, &f.params, f.return_type.as_ref(), &f.body))
            }
            ast::AggregateMember::Constructor(f) => {
                let mangled = mangle::method_name(&qname, &qname);
                Some(self.lower_function_body(&qname, &mangled, &f.params, None, &f.body))
            }
            ast::AggregateMember::Operator(op) => {
                let name = operator_declared_name(op);
                let mangled = mangle::method_name(&qname, &name);
                Some(self.lower_function_body(&qname, &mangled, &op.params, Some(&op.return_type), &op.body))
            }
            ast::AggregateMember::Field(_) => None,
        }
    }

    fn lower_function(&mut self, aggregate: &str, name: &str, f: &ast::FunctionDecl) -> ir::IrFunction {
        self.lower_function_body(aggregate, name, &f.params, f.return_type.as_ref(), &f.body)
    }

    fn lower_function_body(
        &mut self,
        aggregate: &str,
        mangled_name: &str,
        params: &[ast::Param],
        return_type: Option<&ast::Declarator>,
        body: &ast::Block,
    ) -> ir::IrFunction {
        let mut locals: HashMap<String, TypeKind> = HashMap::new();
        let ir_params = params
            .iter()
            .map(|p| {
                let ty = self.resolve_declarator(&p.declarator);
                locals.insert(p.name.lexeme.clone(), ty.clone());
                ir::IrParam { name: p.name.lexeme.clone(), ty: to_ir_type(&ty), by_ref: p.declarator.by_ref }
            })
            .collect();
        let ret = return_type.map(|d| self.resolve_declarator(d)).unwrap_or(TypeKind::Void);
        if !aggregate.is_empty() {
            locals.insert("this".to_string(), TypeKind::Aggregate(aggregate.to_string()));
        }
        let ir_body = self.lower_block(body, &mut locals, &ret);
        ir::IrFunction { name: mangled_name.to_string(), params: ir_params, return_type: to_ir_type(&ret), body: ir_body }
    }

    fn lower_stage_function(&mut self, sf: &ast::StageFunctionDecl) -> ir::IrStageEntryPoint {
        if !sf.stage.is_programmable() {
            self.diagnostics.report(
                DiagnosticCategory::StageFunctionForNonProgrammableStage,
                sf.span.clone(),
                format!("{:?} is not a programmable stage", sf.stage),
            );
        }
        let mut locals: HashMap<String, TypeKind> = HashMap::new();
        let ir_params = sf
            .params
            .iter()
            .map(|p| {
                let ty = self.resolve_declarator(&p.declarator);
                locals.insert(p.name.lexeme.clone(), ty.clone());
                ir::IrParam { name: p.name.lexeme.clone(), ty: to_ir_type(&ty), by_ref: p.declarator.by_ref }
            })
            .collect();
        let body = self.lower_block(&sf.body, &mut locals, &TypeKind::Void);
        let function_usage = collect_callees(&body);
        let type_usage = ir_params.iter().map(|p| p.ty.clone()).filter_map(ir_type_name).collect();
        ir::IrStageEntryPoint { stage: sf.stage, params: ir_params, body, function_usage, type_usage }
    }

    fn lower_block(&mut self, block: &ast::Block, locals: &mut HashMap<String, TypeKind>, ret: &TypeKind) -> Vec<ir::IrStmt> {
        block.statements.iter().map(|s| self.lower_stmt(s, locals, ret)).collect()
    }

    fn lower_stmt(&mut self, stmt: &ast::Stmt, locals: &mut HashMap<String, TypeKind>, ret: &TypeKind) -> ir::IrStmt {
        match &stmt.kind {
            ast::StmtKind::Block(b) => ir::IrStmt::Block(self.lower_block(b, &mut locals.clone(), ret)),
            ast::StmtKind::If { cond, then_branch, else_branch } => {
                let cond_ty = self.lower_expr_typed(cond, locals);
                self.require_bool(&cond_ty.1, stmt.span.clone());
                ir::IrStmt::If {
                    cond: cond_ty.0,
                    then_branch: Box::new(self.lower_stmt(then_branch, locals, ret)),
                    else_branch: else_branch.as_ref().map(|b| Box::new(self.lower_stmt(b, locals, ret))),
                }
            }
            ast::StmtKind::While { cond, body } => {
                let (cond_ir, cond_ty) = self.lower_expr_typed(cond, locals);
                self.require_bool(&cond_ty, stmt.span.clone());
                ir::IrStmt::While { cond: cond_ir, body: Box::new(self.lower_stmt(body, locals, ret)) }
            }
            ast::StmtKind::DoWhile { body, cond } => {
                let lowered_body = Box::new(self.lower_stmt(body, locals, ret));
                let (cond_ir, cond_ty) = self.lower_expr_typed(cond, locals);
                self.require_bool(&cond_ty, stmt.span.clone());
                ir::IrStmt::DoWhile { body: lowered_body, cond: cond_ir }
            }
            ast::StmtKind::For { init, cond, increment, body } => {
                let mut scope = locals.clone();
                let init_ir = init.as_ref().map(|s| Box::new(self.lower_stmt(s, &mut scope, ret)));
                let cond_ir = cond.as_ref().map(|c| self.lower_expr_typed(c, &mut scope).0);
                let increment_ir = increment.as_ref().map(|c| self.lower_expr_typed(c, &mut scope).0);
                let body_ir = Box::new(self.lower_stmt(body, &mut scope, ret));
                ir::IrStmt::For { init: init_ir, cond: cond_ir, increment: increment_ir, body: body_ir }
            }
            ast::StmtKind::Return(expr) => {
                let is_void = *ret == TypeKind::Void;
                match expr {
                    Some(e) => {
                        let (ir_expr, expr_ty) = self.lower_expr_typed(e, locals);
                        if is_void {
                            self.diagnostics.report(
                                DiagnosticCategory::ReturnTypeMismatch,
                                e.span.clone(),
                                format!("void function cannot return a value of type {}", expr_ty.display_name()),
                            );
                            ir::IrStmt::Return(Some(ir_expr))
                        } else {
                            let is_array_mismatch = matches!((&expr_ty, ret), (TypeKind::Array(_, _), TypeKind::Array(_, _)));
                            if !is_array_mismatch && expr_ty != *ret && overload::conversion_cost(&expr_ty, ret).is_none() {
                                self.diagnostics.report(
                                    DiagnosticCategory::ReturnTypeMismatch,
                                    e.span.clone(),
                                    format!("expected return type {}, found {}", ret.display_name(), expr_ty.display_name()),
                                );
                            }
                            let converted = self.convert_if_needed(ir_expr, &expr_ty, ret, e.span.clone());
                            ir::IrStmt::Return(Some(converted))
                        }
                    }
                    None => {
                        if !is_void {
                            self.diagnostics.report(
                                DiagnosticCategory::ReturnTypeMismatch,
                                stmt.span.clone(),
                                format!("expected a return value of type {}", ret.display_name()),
                            );
                        }
                        ir::IrStmt::Return(None)
                    }
                }
            }
            ast::StmtKind::Break => ir::IrStmt::Break,
            ast::StmtKind::Continue => ir::IrStmt::Continue,
            ast::StmtKind::Discard => ir::IrStmt::Discard,
            ast::StmtKind::VariableDecl(decl) => {
                let ty = self.resolve_declarator(&decl.declarator);
                let value = decl.initializer.as_ref().map(|e| {
                    let (ir_expr, init_ty) = self.lower_expr_typed(e, locals);
                    self.convert_if_needed(ir_expr, &init_ty, &ty, e.span.clone())
                });
                locals.insert(decl.name.lexeme.clone(), ty.clone());
                ir::IrStmt::Let { name: decl.name.lexeme.clone(), ty: to_ir_type(&ty), is_const: decl.is_const, value }
            }
            ast::StmtKind::Expr(e) => ir::IrStmt::Expr(self.lower_expr_typed(e, locals).0),
            ast::StmtKind::Error => ir::IrStmt::Expr(ir::IrExpr::Literal(ir::IrLiteral::Bool(false))),
        }
    }

    fn require_bool(&mut self, ty: &TypeKind, span: Span) {
        if *ty != TypeKind::Scalar(ScalarKind::Bool) {
            self.diagnostics.report(
                DiagnosticCategory::NonBoolLogicalOperand,
                span,
                format!("expected bool, found {}", ty.display_name()),
            );
        }
    }

    /// Wrap `expr` in an explicit `Convert` if `from` and `to` differ
    /// along a valid implicit-conversion edge (spec.md §4.4.4); otherwise
    /// return it unchanged. Array-to-array pairs never convert — a shape
    /// difference there is reported as `ArrayShapeMismatch` directly,
    /// since `conversion_cost` has no edge for arrays to carry it.
    fn convert_if_needed(&mut self, expr: ir::IrExpr, from: &TypeKind, to: &TypeKind, span: Span) -> ir::IrExpr {
        if from == to {
            return expr;
        }
        if let (TypeKind::Array(_, _), TypeKind::Array(_, _)) = (from, to) {
            self.diagnostics.report(
                DiagnosticCategory::ArrayShapeMismatch,
                span,
                format!("expected {}, found {}", to.display_name(), from.display_name()),
            );
            return expr;
        }
        match overload::conversion_cost(from, to) {
            Some(_) => ir::IrExpr::Convert { value: Box::new(expr), to: to_ir_type(to) },
            None => expr,
        }
    }

    /// Look up a user-defined operator overload on `aggregate` named
    /// `op_name` and, if exactly one candidate is viable for `args`,
    /// lower to a resolved call — the same dispatch `lower_call`'s
    /// member-call branch already does for ordinary methods. `receiver`
    /// is the aggregate-typed operand itself (the implicit `this`);
    /// `args` are the operator's declared params only (zero for unary/
    /// postfix, one for binary/assignment), matching how
    /// `declare_aggregate` builds each operator's `FunctionSignature`
    /// without a `this` entry. Returns `None` (no overload registered)
    /// so the caller can fall back to the built-in behavior for that
    /// operator.
    fn try_operator_overload(
        &mut self,
        aggregate: &str,
        op_name: &str,
        receiver: ir::IrExpr,
        args: Vec<(ir::IrExpr, TypeKind)>,
        span: Span,
    ) -> Option<(ir::IrExpr, TypeKind)> {
        let candidates = self.methods.get(&(aggregate.to_string(), op_name.to_string()))?.clone();
        if candidates.is_empty() {
            return None;
        }
        let arg_types: Vec<TypeKind> = args.iter().map(|(_, t)| t.clone()).collect();
        match overload::resolve(&candidates, &arg_types) {
            Resolution::Unique(sig) => {
                let mangled = sig.mangled_name.clone();
                let ret = sig.return_type.clone();
                let params = sig.params.clone();
                let mut ir_args = vec![receiver];
                for (i, (ir_expr, ty)) in args.into_iter().enumerate() {
                    match params.get(i) {
                        Some(param_ty) => ir_args.push(self.convert_if_needed(ir_expr, &ty, param_ty, span.clone())),
                        None => ir_args.push(ir_expr),
                    }
                }
                Some((ir::IrExpr::Call { callee: mangled, args: ir_args }, ret))
            }
            Resolution::Ambiguous(_) => {
                self.diagnostics.report(
                    DiagnosticCategory::AmbiguousOverload,
                    span,
                    format!("ambiguous operator overload `{}` on {}", op_name, aggregate),
                );
                Some((ir::IrExpr::Literal(ir::IrLiteral::Bool(false)), TypeKind::Void))
            }
            Resolution::NoViable => {
                self.diagnostics.report(
                    DiagnosticCategory::NoViableOverload,
                    span,
                    format!("no viable operator overload `{}` on {}", op_name, aggregate),
                );
                Some((ir::IrExpr::Literal(ir::IrLiteral::Bool(false)), TypeKind::Void))
            }
        }
    }

    /// Lower an expression and return both its IR form and its deduced
    /// type, the two always produced together (spec.md §4.4.3/§4.4.5).
    fn lower_expr_typed(&mut self, expr: &ast::Expr, locals: &HashMap<String, TypeKind>) -> (ir::IrExpr, TypeKind) {
        match &expr.kind {
            ast::ExprKind::Literal { kind, token } => lower_literal(*kind, token, self.diagnostics),
            ast::ExprKind::This(_) => {
                let ty = locals.get("this").cloned().unwrap_or(TypeKind::Void);
                (ir::IrExpr::This, ty)
            }
            ast::ExprKind::Identifier(name) => self.lower_identifier(name, locals),
            ast::ExprKind::Member { object, member } => self.lower_member(object, member, locals),
            ast::ExprKind::Index { object, index } => self.lower_index(object, index, expr.span.clone(), locals),
            ast::ExprKind::Call { callee, args } => self.lower_call(callee, args, expr.span.clone(), locals),
            ast::ExprKind::Unary { op, operand, .. } => self.lower_unary(*op, operand, locals),
            ast::ExprKind::Postfix { op, operand, .. } => {
                let (ir_operand, ty) = self.lower_expr_typed(operand, locals);
                if let TypeKind::Aggregate(agg) = &ty {
                    let op_name = mangle::postfix_operator_declared_name(*op);
                    if let Some(result) =
                        self.try_operator_overload(&agg.clone(), &op_name, ir_operand.clone(), Vec::new(), expr.span.clone())
                    {
                        return result;
                    }
                }
                let name = format!("{:?}", op);
                (ir::IrExpr::Postfix { op: name, operand: Box::new(ir_operand) }, ty)
            }
            ast::ExprKind::Binary { op, left, right, .. } => self.lower_binary(*op, left, right, expr.span.clone(), locals),
            ast::ExprKind::Conditional { cond, then_expr, else_expr } => {
                let (cond_ir, cond_ty) = self.lower_expr_typed(cond, locals);
                self.require_bool(&cond_ty, expr.span.clone());
                let (then_ir, then_ty) = self.lower_expr_typed(then_expr, locals);
                let (else_ir, _else_ty) = self.lower_expr_typed(else_expr, locals);
                (
                    ir::IrExpr::Conditional {
                        cond: Box::new(cond_ir),
                        then_value: Box::new(then_ir),
                        else_value: Box::new(else_ir),
                    },
                    then_ty,
                )
            }
            ast::ExprKind::Assignment { op, target, value, .. } => {
                let (target_ir, target_ty) = self.lower_expr_typed(target, locals);
                let (value_ir, value_ty) = self.lower_expr_typed(value, locals);
                if let TypeKind::Aggregate(agg) = &target_ty {
                    let op_name = mangle::assign_operator_declared_name(*op);
                    if let Some(result) = self.try_operator_overload(
                        &agg.clone(),
                        &op_name,
                        target_ir.clone(),
                        vec![(value_ir.clone(), value_ty.clone())],
                        expr.span.clone(),
                    ) {
                        return result;
                    }
                }
                let value_ir = self.convert_if_needed(value_ir, &value_ty, &target_ty, value.span.clone());
                (
                    ir::IrExpr::Assign { op: format!("{:?}", op), target: Box::new(target_ir), value: Box::new(value_ir) },
                    target_ty,
                )
            }
            ast::ExprKind::ArrayLiteral(items) => {
                let mut lowered = Vec::new();
                let mut elem_ty = TypeKind::Void;
                for item in items {
                    let (ir_item, ty) = self.lower_expr_typed(item, locals);
                    elem_ty = ty;
                    lowered.push(ir_item);
                }
                let size = lowered.len() as u64;
                (ir::IrExpr::ArrayLiteral(lowered), TypeKind::Array(std::rc::Rc::new(elem_ty), size))
            }
            ast::ExprKind::Paren(inner) => self.lower_expr_typed(inner, locals),
            ast::ExprKind::Error => (ir::IrExpr::Literal(ir::IrLiteral::Bool(false)), TypeKind::Void),
        }
    }

    /// Resolve a bare identifier: local/parameter scope first, then (inside
    /// a lifted method) `this`'s own fields, matching
    /// `_deduceVariableExpressionType`'s lookup order.
    fn lower_identifier(&mut self, name: &ast::Name, locals: &HashMap<String, TypeKind>) -> (ir::IrExpr, TypeKind) {
        let text = name.text();
        if let Some(ty) = locals.get(&text) {
            return (ir::IrExpr::Local(text), ty.clone());
        }
        if let Some(TypeKind::Aggregate(agg)) = locals.get("this") {
            if let Some(info) = self.aggregates.get(agg) {
                if let Some((_, field_ty)) = info.fields.iter().find(|(n, _)| n == &text) {
                    let field_ty = field_ty.clone();
                    return (ir::IrExpr::Member { object: Box::new(ir::IrExpr::This), field: text }, field_ty);
                }
            }
        }
        if let Some(ty) = self.globals.get(&text) {
            return (ir::IrExpr::Global(text), ty.clone());
        }
        self.diagnostics.report(
            DiagnosticCategory::UnknownIdentifier,
            name.span.clone(),
            format!("unknown identifier `{}`", text),
        );
        (ir::IrExpr::Global(text), TypeKind::Void)
    }

    fn lower_member(&mut self, object: &ast::Expr, member: &ast::Token, locals: &HashMap<String, TypeKind>) -> (ir::IrExpr, TypeKind) {
        let (object_ir, object_ty) = self.lower_expr_typed(object, locals);
        if let Some(alphabet) = object_ty.swizzle_alphabet() {
            if member.lexeme.chars().all(|c| alphabet.contains(c)) && !member.lexeme.is_empty() {
                let component_ty = if member.lexeme.chars().count() == 1 {
                    object_ty.component_type().unwrap_or(TypeKind::Void)
                } else {
                    match &object_ty {
                        TypeKind::Color => TypeKind::Vector(ScalarKind::Float, member.lexeme.chars().count() as u8),
                        TypeKind::Vector(base, _) => TypeKind::Vector(*base, member.lexeme.chars().count() as u8),
                        _ => TypeKind::Void,
                    }
                };
                return (
                    ir::IrExpr::Swizzle { object: Box::new(object_ir), components: member.lexeme.clone() },
                    component_ty,
                );
            }
        }
        if let TypeKind::Aggregate(name) = &object_ty {
            if let Some(info) = self.aggregates.get(name) {
                if let Some((_, field_ty)) = info.fields.iter().find(|(n, _)| n == &member.lexeme) {
                    let field_ty = field_ty.clone();
                    return (ir::IrExpr::Member { object: Box::new(object_ir), field: member.lexeme.clone() }, field_ty);
                }
            }
        }
        self.diagnostics.report(
            DiagnosticCategory::UnknownMember,
            member.span.clone(),
            format!("type `{}` has no member `{}`", object_ty.display_name(), member.lexeme),
        );
        (ir::IrExpr::Member { object: Box::new(object_ir), field: member.lexeme.clone() }, TypeKind::Void)
    }

    fn lower_index(
        &mut self,
        object: &ast::Expr,
        index: &ast::Expr,
        span: Span,
        locals: &HashMap<String, TypeKind>,
    ) -> (ir::IrExpr, TypeKind) {
        let (object_ir, object_ty) = self.lower_expr_typed(object, locals);
        let (index_ir, index_ty) = self.lower_expr_typed(index, locals);
        if !index_ty.is_integral() {
            self.diagnostics.report(DiagnosticCategory::NonIntegerIndex, index.span.clone(), "index must be int or uint");
        }
        let result_ty = match &object_ty {
            TypeKind::Array(elem, _) => (**elem).clone(),
            other if other.is_vector_like() => other.component_type().unwrap_or(TypeKind::Void),
            _ => {
                self.diagnostics.report(
                    DiagnosticCategory::IndexOnNonArray,
                    span,
                    format!("cannot index into {}", object_ty.display_name()),
                );
                TypeKind::Void
            }
        };
        (ir::IrExpr::Index { object: Box::new(object_ir), index: Box::new(index_ir) }, result_ty)
    }

    fn lower_call(
        &mut self,
        callee: &ast::Expr,
        args: &[ast::Expr],
        span: Span,
        locals: &HashMap<String, TypeKind>,
    ) -> (ir::IrExpr, TypeKind) {
        let lowered_args: Vec<(ir::IrExpr, TypeKind)> = args.iter().map(|a| self.lower_expr_typed(a, locals)).collect();
        let arg_types: Vec<TypeKind> = lowered_args.iter().map(|(_, t)| t.clone()).collect();

        let (candidates, owner_receiver): (Vec<FunctionSignature>, Option<ir::IrExpr>) = match &callee.kind {
            ast::ExprKind::Identifier(name) => {
                let text = name.text();
                let mut candidates = self.free_functions.get(&text).cloned().unwrap_or_default();
                candidates.extend(self.methods.get(&(text.clone(), text.clone())).cloned().unwrap_or_default());
                (candidates, None)
            }
            ast::ExprKind::Member { object, member } => {
                let (object_ir, object_ty) = self.lower_expr_typed(object, locals);
                if let TypeKind::Aggregate(agg) = &object_ty {
                    let sigs = self.methods.get(&(agg.clone(), member.lexeme.clone())).cloned().unwrap_or_default();
                    (sigs, Some(object_ir))
                } else {
                    (Vec::new(), Some(object_ir))
                }
            }
            _ => (Vec::new(), None),
        };

        let resolved = overload::resolve(&candidates, &arg_types);
        let (mangled, ret_ty, param_types) = match resolved {
            Resolution::Unique(sig) => (sig.mangled_name.clone(), sig.return_type.clone(), Some(sig.params.clone())),
            Resolution::Ambiguous(_) => {
                self.diagnostics.report(DiagnosticCategory::AmbiguousOverload, span.clone(), "ambiguous overload");
                (callee_fallback_name(callee), TypeKind::Void, None)
            }
            Resolution::NoViable => {
                self.diagnostics.report(DiagnosticCategory::NoViableOverload, span.clone(), "no viable overload");
                (callee_fallback_name(callee), TypeKind::Void, None)
            }
        };

        let mut ir_args: Vec<ir::IrExpr> = Vec::new();
        if let Some(receiver) = owner_receiver {
            ir_args.push(receiver);
        }
        for (i, (arg_ir, arg_ty)) in lowered_args.into_iter().enumerate() {
            let arg_span = args.get(i).map(|a| a.span.clone()).unwrap_or_else(|| span.clone());
            match param_types.as_ref().and_then(|params| params.get(i)) {
                Some(param_ty) => ir_args.push(self.convert_if_needed(arg_ir, &arg_ty, param_ty, arg_span)),
                None => ir_args.push(arg_ir),
            }
        }
        (ir::IrExpr::Call { callee: mangled, args: ir_args }, ret_ty)
    }

    fn lower_unary(&mut self, op: ast::UnaryOp, operand: &ast::Expr, locals: &HashMap<String, TypeKind>) -> (ir::IrExpr, TypeKind) {
        let (operand_ir, ty) = self.lower_expr_typed(operand, locals);
        if let TypeKind::Aggregate(agg) = &ty {
            let op_name = mangle::unary_operator_declared_name(op);
            if let Some(result) =
                self.try_operator_overload(&agg.clone(), &op_name, operand_ir.clone(), Vec::new(), operand.span.clone())
            {
                return result;
            }
        }
        if matches!(op, ast::UnaryOp::Not) {
            self.require_bool(&ty, operand.span.clone());
        }
        (ir::IrExpr::Unary { op: format!("{:?}", op), operand: Box::new(operand_ir) }, ty)
    }

    fn lower_binary(
        &mut self,
        op: ast::BinOp,
        left: &ast::Expr,
        right: &ast::Expr,
        span: Span,
        locals: &HashMap<String, TypeKind>,
    ) -> (ir::IrExpr, TypeKind) {
        let (left_ir, left_ty) = self.lower_expr_typed(left, locals);
        let (right_ir, right_ty) = self.lower_expr_typed(right, locals);
        let receiver = match (&left_ty, &right_ty) {
            (TypeKind::Aggregate(agg), _) => Some((agg.clone(), left_ir.clone(), right_ir.clone(), right_ty.clone())),
            (_, TypeKind::Aggregate(agg)) => Some((agg.clone(), right_ir.clone(), left_ir.clone(), left_ty.clone())),
            _ => None,
        };
        if let Some((agg, receiver_ir, other_ir, other_ty)) = receiver {
            let op_name = mangle::binary_operator_declared_name(op);
            if let Some(result) = self.try_operator_overload(&agg, &op_name, receiver_ir, vec![(other_ir, other_ty)], span.clone()) {
                return result;
            }
        }
        if matches!(op, ast::BinOp::And | ast::BinOp::Or) {
            self.require_bool(&left_ty, left.span.clone());
            self.require_bool(&right_ty, right.span.clone());
        }
        let result_ty = match op {
            ast::BinOp::Equal | ast::BinOp::Diff | ast::BinOp::Lower | ast::BinOp::Greater | ast::BinOp::LEqual | ast::BinOp::GEqual => {
                TypeKind::Scalar(ScalarKind::Bool)
            }
            _ if overload::conversion_cost(&right_ty, &left_ty).is_some() => left_ty.clone(),
            _ => right_ty.clone(),
        };
        if !matches!(op, ast::BinOp::Equal | ast::BinOp::Diff | ast::BinOp::Lower | ast::BinOp::Greater | ast::BinOp::LEqual | ast::BinOp::GEqual)
            && overload::conversion_cost(&right_ty, &left_ty).is_none()
            && overload::conversion_cost(&left_ty, &right_ty).is_none()
            && left_ty != right_ty
        {
            self.diagnostics.report(
                DiagnosticCategory::NoViableOverload,
                span,
                format!("no operator {:?} for {} and {}", op, left_ty.display_name(), right_ty.display_name()),
            );
        }
        (ir::IrExpr::Binary { op: format!("{:?}", op), left: Box::new(left_ir), right: Box::new(right_ir) }, result_ty)
    }
}

fn callee_fallback_name(callee: &ast::Expr) -> String {
    match &callee.kind {
        ast::ExprKind::Identifier(name) => name.text(),
        ast::ExprKind::Member { member, .. } => member.lexeme.clone(),
        _ => "<unknown>".to_string(),
    }
}

/// The declared (unmangled) method-table name an `operator` declaration
/// registers under, matching `mangle.rs`'s vocabulary exactly since both
/// sides of dispatch (declaration here, usage there) have to agree.
/// `Plus`/`Minus` are ambiguous by token alone — a declaration with zero
/// params is the unary form (`operator+() const`), one param the binary
/// form (`operator+(Vector3 rhs) const`) — so arity disambiguates them.
fn operator_declared_name(op: &ast::OperatorDecl) -> String {
    use crate::token::TokenKind::*;
    let is_unary = op.params.is_empty();
    match op.op_token.kind {
        Plus if is_unary => "OperatorUnaryPlus".to_string(),
        Plus => "OperatorPlus".to_string(),
        Minus if is_unary => "OperatorUnaryMinus".to_string(),
        Minus => "OperatorMinus".to_string(),
        Star => "OperatorMult".to_string(),
        Slash => "OperatorDiv".to_string(),
        Percent => "OperatorModulo".to_string(),
        OpenBracket => "OperatorIndex".to_string(),
        Eq => "OperatorAssign".to_string(),
        EqEq => "OperatorEqual".to_string(),
        BangEq => "OperatorDiff".to_string(),
        Lt => "OperatorLower".to_string(),
        Gt => "OperatorGreater".to_string(),
        LtEq => "OperatorLEqual".to_string(),
        GtEq => "OperatorGEqual".to_string(),
        AmpAmp => "OperatorAnd".to_string(),
        PipePipe => "OperatorOr".to_string(),
        Amp => "OperatorBitAnd".to_string(),
        Pipe => "OperatorBitOr".to_string(),
        Caret => "OperatorBitXor".to_string(),
        Bang => "OperatorNot".to_string(),
        Tilde => "OperatorBitNot".to_string(),
        PlusPlus => "OperatorIncrement".to_string(),
        MinusMinus => "OperatorDecrement".to_string(),
        PlusEq => "OperatorPlusEqual".to_string(),
        MinusEq => "OperatorMinusEqual".to_string(),
        StarEq => "OperatorMultEqual".to_string(),
        SlashEq => "OperatorDivEqual".to_string(),
        PercentEq => "OperatorModuloEqual".to_string(),
        AmpEq => "OperatorAndEqual".to_string(),
        PipeEq => "OperatorOrEqual".to_string(),
        CaretEq => "OperatorXorEqual".to_string(),
        other => format!("Operator{:?}", other),
    }
}

fn valid_stage_pair(from: Stage, to: Stage) -> bool {
    matches!(
        (from, to),
        (Stage::Input, Stage::VertexPass)
            | (Stage::VertexPass, Stage::FragmentPass)
            | (Stage::FragmentPass, Stage::Output)
    )
}

fn lower_literal(kind: ast::LiteralKind, token: &Token, diagnostics: &mut DiagnosticBag) -> (ir::IrExpr, TypeKind) {
    match kind {
        ast::LiteralKind::Integer => {
            let value = token.lexeme.parse::<i64>().unwrap_or(0);
            (ir::IrExpr::Literal(ir::IrLiteral::Int(value)), TypeKind::Scalar(ScalarKind::Int))
        }
        ast::LiteralKind::UnsignedInteger => {
            let trimmed = token.lexeme.trim_end_matches(['u', 'U']);
            let value = trimmed.parse::<u64>().unwrap_or(0);
            (ir::IrExpr::Literal(ir::IrLiteral::UInt(value)), TypeKind::Scalar(ScalarKind::UInt))
        }
        ast::LiteralKind::Float => {
            let trimmed = token.lexeme.trim_end_matches(['f', 'F']);
            let value = trimmed.parse::<f64>().unwrap_or(0.0);
            (ir::IrExpr::Literal(ir::IrLiteral::Float(value)), TypeKind::Scalar(ScalarKind::Float))
        }
        ast::LiteralKind::Bool => {
            let value = token.lexeme == "true";
            (ir::IrExpr::Literal(ir::IrLiteral::Bool(value)), TypeKind::Scalar(ScalarKind::Bool))
        }
        ast::LiteralKind::String => {
            diagnostics.report(
                DiagnosticCategory::StringLiteralInExpression,
                token.span.clone(),
                "string literals cannot appear in expressions",
            );
            (ir::IrExpr::Literal(ir::IrLiteral::String(token.lexeme.clone())), TypeKind::Void)
        }
    }
}


fn to_ir_type(ty: &TypeKind) -> ir::IrType {
    match ty {
        TypeKind::Void => ir::IrType::Void,
        TypeKind::Scalar(ScalarKind::Bool) => ir::IrType::Bool,
        TypeKind::Scalar(ScalarKind::Int) => ir::IrType::Int,
        TypeKind::Scalar(ScalarKind::UInt) => ir::IrType::UInt,
        TypeKind::Scalar(ScalarKind::Float) => ir::IrType::Float,
        TypeKind::Vector(base, arity) => {
            ir::IrType::Vector { base: Box::new(to_ir_type(&TypeKind::Scalar(*base))), arity: *arity }
        }
        TypeKind::Color => ir::IrType::Color,
        TypeKind::Texture => ir::IrType::Texture,
        TypeKind::Matrix(dim) => ir::IrType::Matrix { dim: *dim },
        TypeKind::Aggregate(name) => ir::IrType::Aggregate(name.clone()),
        TypeKind::Array(elem, size) => ir::IrType::Array { element: Box::new(to_ir_type(elem)), size: *size },
    }
}

fn to_ir_aggregate_kind(kind: ast::AggregateKind) -> ir::IrAggregateKind {
    match kind {
        ast::AggregateKind::Struct => ir::IrAggregateKind::Struct,
        ast::AggregateKind::AttributeBlock => ir::IrAggregateKind::AttributeBlock,
        ast::AggregateKind::ConstantBlock => ir::IrAggregateKind::ConstantBlock,
    }
}

fn ir_type_name(ty: ir::IrType) -> Option<String> {
    match ty {
        ir::IrType::Aggregate(name) => Some(name),
        _ => None,
    }
}

fn collect_callees(stmts: &[ir::IrStmt]) -> Vec<String> {
    let mut callees = Vec::new();
    for s in stmts {
        collect_callees_stmt(s, &mut callees);
    }
    callees.sort();
    callees.dedup();
    callees
}

fn collect_callees_stmt(stmt: &ir::IrStmt, out: &mut Vec<String>) {
    match stmt {
        ir::IrStmt::Let { value, .. } => {
            if let Some(v) = value {
                collect_callees_expr(v, out);
            }
        }
        ir::IrStmt::Expr(e) => collect_callees_expr(e, out),
        ir::IrStmt::Block(stmts) => stmts.iter().for_each(|s| collect_callees_stmt(s, out)),
        ir::IrStmt::If { cond, then_branch, else_branch } => {
            collect_callees_expr(cond, out);
            collect_callees_stmt(then_branch, out);
            if let Some(e) = else_branch {
                collect_callees_stmt(e, out);
            }
        }
        ir::IrStmt::While { cond, body } | ir::IrStmt::DoWhile { body, cond } => {
            collect_callees_expr(cond, out);
            collect_callees_stmt(body, out);
        }
        ir::IrStmt::For { init, cond, increment, body } => {
            if let Some(i) = init {
                collect_callees_stmt(i, out);
            }
            if let Some(c) = cond {
                collect_callees_expr(c, out);
            }
            if let Some(inc) = increment {
                collect_callees_expr(inc, out);
            }
            collect_callees_stmt(body, out);
        }
        ir::IrStmt::Return(Some(e)) => collect_callees_expr(e, out),
        ir::IrStmt::Return(None) | ir::IrStmt::Break | ir::IrStmt::Continue | ir::IrStmt::Discard => {}
    }
}

fn collect_callees_expr(expr: &ir::IrExpr, out: &mut Vec<String>) {
    match expr {
        ir::IrExpr::Call { callee, args } => {
            out.push(callee.clone());
            args.iter().for_each(|a| collect_callees_expr(a, out));
        }
        ir::IrExpr::Member { object, .. } | ir::IrExpr::Swizzle { object, .. } => collect_callees_expr(object, out),
        ir::IrExpr::Index { object, index } => {
            collect_callees_expr(object, out);
            collect_callees_expr(index, out);
        }
        ir::IrExpr::Convert { value, .. } => collect_callees_expr(value, out),
        ir::IrExpr::Unary { operand, .. } | ir::IrExpr::Postfix { operand, .. } => collect_callees_expr(operand, out),
        ir::IrExpr::Binary { left, right, .. } => {
            collect_callees_expr(left, out);
            collect_callees_expr(right, out);
        }
        ir::IrExpr::Conditional { cond, then_value, else_value } => {
            collect_callees_expr(cond, out);
            collect_callees_expr(then_value, out);
            collect_callees_expr(else_value, out);
        }
        ir::IrExpr::Assign { target, value, .. } => {
            collect_callees_expr(target, out);
            collect_callees_expr(value, out);
        }
        ir::IrExpr::ArrayLiteral(items) => items.iter().for_each(|i| collect_callees_expr(i, out)),
        ir::IrExpr::Literal(_) | ir::IrExpr::This | ir::IrExpr::Local(_) | ir::IrExpr::Global(_) => {}
    }
}

fn builtin_types() -> HashMap<QName, TypeKind> {
    use ScalarKind::*;
    let mut map = HashMap::new();
    map.insert("void".to_string(), TypeKind::Void);
    map.insert("bool".to_string(), TypeKind::Scalar(Bool));
    map.insert("int".to_string(), TypeKind::Scalar(Int));
    map.insert("uint".to_string(), TypeKind::Scalar(UInt));
    map.insert("float".to_string(), TypeKind::Scalar(Float));
    map.insert("Color".to_string(), TypeKind::Color);
    map.insert("Texture".to_string(), TypeKind::Texture);
    map.insert("Matrix2x2".to_string(), TypeKind::Matrix(2));
    map.insert("Matrix3x3".to_string(), TypeKind::Matrix(3));
    map.insert("Matrix4x4".to_string(), TypeKind::Matrix(4));
    for arity in 2..=4u8 {
        map.insert(format!("Vector{}", arity), TypeKind::Vector(Float, arity));
        map.insert(format!("Vector{}Int", arity), TypeKind::Vector(Int, arity));
        map.insert(format!("Vector{}UInt", arity), TypeKind::Vector(UInt, arity));
    }
    map
}
