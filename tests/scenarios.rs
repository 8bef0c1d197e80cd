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

//! End-to-end scenarios: source text in, diagnostics/IR out, covering
//! the literal input/output pairs a complete front end is expected to
//! handle.

use std::fs;
use std::path::PathBuf;

use lumina::analyzer;
use lumina::ast::{InstructionKind, Stage};
use lumina::diagnostics::{DiagnosticBag, DiagnosticCategory};
use lumina::include::{self, IncludeResolver};
use lumina::ir::{IrExpr, IrStmt, IrType};
use lumina::parser;

fn compile(src: &str) -> (lumina::ast::CompilationUnit, lumina::ir::Module, DiagnosticBag) {
    let mut diagnostics = DiagnosticBag::new();
    let origin = PathBuf::from("scenario.lum");
    let unit = parser::parse_source(&origin, src, &mut diagnostics);
    let module = analyzer::analyze(&unit, &mut diagnostics);
    (unit, module, diagnostics)
}

#[test]
fn minimal_pipeline_produces_no_diagnostics() {
    let src = r#"
        Input -> VertexPass : Vector2 uv;
        VertexPass() {}
        FragmentPass() { discard; }
    "#;
    let (_, module, diagnostics) = compile(src);

    assert!(diagnostics.is_success(), "unexpected diagnostics: {:?}", diagnostics.into_vec());
    assert_eq!(module.pipeline_flows.len(), 1);
    assert_eq!(module.pipeline_flows[0].from, Stage::Input);
    assert_eq!(module.pipeline_flows[0].to, Stage::VertexPass);
    assert_eq!(module.pipeline_flows[0].name, "uv");

    assert_eq!(module.stage_entry_points.len(), 2);
    let vertex = module.stage_entry_points.iter().find(|s| s.stage == Stage::VertexPass).unwrap();
    assert!(vertex.body.is_empty());
    let fragment = module.stage_entry_points.iter().find(|s| s.stage == Stage::FragmentPass).unwrap();
    assert_eq!(fragment.body.len(), 1);
    assert!(matches!(fragment.body[0], IrStmt::Discard));
}

#[test]
fn implicit_conversion_inserts_an_explicit_convert_node() {
    let src = r#"
        VertexPass() {
            float f = 3;
        }
    "#;
    let (_, module, diagnostics) = compile(src);

    assert!(diagnostics.is_success(), "unexpected diagnostics: {:?}", diagnostics.into_vec());
    let body = &module.stage_entry_points[0].body;
    match &body[0] {
        IrStmt::Let { name, ty, value: Some(value), .. } => {
            assert_eq!(name, "f");
            assert_eq!(*ty, IrType::Float);
            match value {
                IrExpr::Convert { to, .. } => assert_eq!(*to, IrType::Float),
                other => panic!("expected a conversion node, got {:?}", other),
            }
        }
        other => panic!("expected a let statement, got {:?}", other),
    }
}

#[test]
fn ambiguous_overload_is_reported_once() {
    let src = r#"
        void foo(int a, float b) {}
        void foo(float a, int b) {}
        VertexPass() {
            foo(1, 1);
        }
    "#;
    let (_, _, diagnostics) = compile(src);

    assert_eq!(diagnostics.of_category(DiagnosticCategory::AmbiguousOverload), 1);
}

#[test]
fn swizzle_of_a_vector3_yields_a_vector2() {
    let src = r#"
        VertexPass() {
            Vector3 v;
            Vector2 w = v.xy;
        }
    "#;
    let (_, module, diagnostics) = compile(src);

    assert!(diagnostics.is_success(), "unexpected diagnostics: {:?}", diagnostics.into_vec());
    let body = &module.stage_entry_points[0].body;
    match &body[1] {
        IrStmt::Let { ty, value: Some(IrExpr::Swizzle { components, .. }), .. } => {
            assert_eq!(components, "xy");
            assert_eq!(*ty, IrType::Vector { base: Box::new(IrType::Float), arity: 2 });
        }
        other => panic!("expected a swizzled let statement, got {:?}", other),
    }
}

#[test]
fn bare_identifier_inside_a_method_falls_back_to_this_fields() {
    let src = r#"
        struct Vertex {
            float weight;

            float scaled() const {
                return weight * 2;
            }
        }
    "#;
    let (_, module, diagnostics) = compile(src);

    assert!(diagnostics.is_success(), "unexpected diagnostics: {:?}", diagnostics.into_vec());
    let scaled = module.functions.iter().find(|f| f.name.contains("scaled")).unwrap();
    match &scaled.body[0] {
        IrStmt::Return(Some(IrExpr::Binary { left, .. })) => {
            assert!(matches!(**left, IrExpr::Member { ref field, .. } if field == "weight"));
        }
        other => panic!("expected a return of a binary expression, got {:?}", other),
    }
}

#[test]
fn include_cycle_is_reported_once_and_tokens_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let a_path = dir.path().join("a.lum");
    let b_path = dir.path().join("b.lum");
    fs::write(&a_path, "#include <b.lum>\nstruct FromA { int x; }").unwrap();
    fs::write(&b_path, "#include <a.lum>\nstruct FromB { int y; }").unwrap();

    let source = fs::read_to_string(&a_path).unwrap();
    let resolver = IncludeResolver::new(Vec::new());
    let mut diagnostics = DiagnosticBag::new();
    let (expanded, _ranges) = include::expand_includes(&a_path, &source, &resolver, &mut diagnostics);

    assert_eq!(diagnostics.of_category(DiagnosticCategory::IncludeCycle), 1);
    assert!(expanded.contains("struct FromA"));
    assert!(expanded.contains("struct FromB"));
    // The cyclic re-inclusion of a.lum from inside b.lum is left as an
    // unexpanded directive, not spliced a second time.
    assert_eq!(expanded.matches("struct FromA").count(), 1);
}

#[test]
fn invalid_pipeline_edge_is_reported() {
    let src = "Input -> FragmentPass : float x;";
    let (_, _, diagnostics) = compile(src);

    assert_eq!(diagnostics.of_category(DiagnosticCategory::InvalidStagePair), 1);
}

#[test]
fn reanalyzing_the_same_unit_yields_a_structurally_equal_module() {
    let src = r#"
        struct Vertex {
            Vector3 position;
        }
        Input -> VertexPass : Vector3 position;
        VertexPass(Vector3 position) {
            Vector4 clip = position.xyzz;
        }
    "#;
    let mut diagnostics_a = DiagnosticBag::new();
    let mut diagnostics_b = DiagnosticBag::new();
    let unit = parser::parse_source(&PathBuf::from("t.lum"), src, &mut diagnostics_a);

    let module_a = analyzer::analyze(&unit, &mut diagnostics_a);
    let module_b = analyzer::analyze(&unit, &mut diagnostics_b);

    assert_eq!(module_a, module_b);
    assert_eq!(diagnostics_a.count(), diagnostics_b.count());
}

#[test]
fn attribute_block_installs_an_implicit_global() {
    let src = r#"
        AttributeBlock Lighting {
            Vector3 direction;
        }
    "#;
    let (_, module, diagnostics) = compile(src);

    assert!(diagnostics.is_success(), "unexpected diagnostics: {:?}", diagnostics.into_vec());
    assert_eq!(module.globals.len(), 1);
    assert_eq!(module.globals[0].name, "Lighting");
    assert!(!module.globals[0].is_const);
}

#[test]
fn top_level_variable_becomes_a_module_global() {
    let src = "int frameCount = 0;";
    let (_, module, diagnostics) = compile(src);

    assert!(diagnostics.is_success(), "unexpected diagnostics: {:?}", diagnostics.into_vec());
    assert_eq!(module.globals.len(), 1);
    assert_eq!(module.globals[0].name, "frameCount");
    assert!(module.globals[0].value.is_some());
}

#[test]
fn operator_overload_is_dispatched_for_aggregate_operands() {
    let src = r#"
        struct Point3 {
            float x;

            Point3 operator+(Point3 other) const {
                return this;
            }
        }
        VertexPass() {
            Point3 a;
            Point3 b;
            Point3 c = a + b;
        }
    "#;
    let (_, module, diagnostics) = compile(src);

    assert!(diagnostics.is_success(), "unexpected diagnostics: {:?}", diagnostics.into_vec());
    let body = &module.stage_entry_points[0].body;
    match &body[2] {
        IrStmt::Let { value: Some(IrExpr::Call { callee, args }), .. } => {
            assert!(callee.contains("OperatorPlus"));
            assert_eq!(args.len(), 2);
        }
        other => panic!("expected a resolved operator-overload call, got {:?}", other),
    }
}

#[test]
fn constructor_call_resolves_through_the_method_table() {
    let src = r#"
        struct Vertex {
            float x;
            float y;

            Vertex(float px, float py) {
                x = px;
                y = py;
            }
        }
        VertexPass() {
            Vertex v = Vertex(1, 2);
        }
    "#;
    let (_, module, diagnostics) = compile(src);

    assert!(diagnostics.is_success(), "unexpected diagnostics: {:?}", diagnostics.into_vec());
    let body = &module.stage_entry_points[0].body;
    match &body[0] {
        IrStmt::Let { value: Some(IrExpr::Call { callee, .. }), .. } => {
            assert!(callee.contains("Vertex"));
        }
        other => panic!("expected a resolved constructor call, got {:?}", other),
    }
}

#[test]
fn returning_a_value_from_a_void_function_is_reported() {
    let src = r#"
        VertexPass() {
            return 1;
        }
    "#;
    let (_, _, diagnostics) = compile(src);

    assert_eq!(diagnostics.of_category(DiagnosticCategory::ReturnTypeMismatch), 1);
}

#[test]
fn missing_return_value_in_a_non_void_function_is_reported() {
    let src = r#"
        float foo() {
            return;
        }
    "#;
    let (_, _, diagnostics) = compile(src);

    assert_eq!(diagnostics.of_category(DiagnosticCategory::ReturnTypeMismatch), 1);
}

#[test]
fn declared_array_dimension_is_captured_in_the_type() {
    let src = r#"
        VertexPass() {
            float values[3];
        }
    "#;
    let (_, module, diagnostics) = compile(src);

    assert!(diagnostics.is_success(), "unexpected diagnostics: {:?}", diagnostics.into_vec());
    let body = &module.stage_entry_points[0].body;
    match &body[0] {
        IrStmt::Let { ty: IrType::Array { size, .. }, .. } => assert_eq!(*size, 3),
        other => panic!("expected an array-typed let statement, got {:?}", other),
    }
}

#[test]
fn mismatched_array_shapes_report_array_shape_mismatch() {
    let src = r#"
        VertexPass() {
            float other[4];
            float target[3] = other;
        }
    "#;
    let (_, _, diagnostics) = compile(src);

    assert_eq!(diagnostics.of_category(DiagnosticCategory::ArrayShapeMismatch), 1);
}

#[test]
fn malformed_top_level_construct_still_produces_a_usable_unit() {
    let src = "@@@ struct Good { int x; }";
    let mut diagnostics = DiagnosticBag::new();
    let unit = parser::parse_source(&PathBuf::from("t.lum"), src, &mut diagnostics);

    assert!(diagnostics.count() >= 1);
    assert!(unit.instructions.iter().any(|i| matches!(i.kind, InstructionKind::Aggregate(_))));
}
