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

//! Name mangling for methods and lifted operator overloads.
//!
//! A method `foo` on aggregate `Bar` mangles to `Bar_foo`. An overloaded
//! operator lifts to a free function named `Bar_Operator<Name>`, using
//! the table below. Mangling never depends on parameter types — overload
//! sets share one mangled name and are disambiguated at call sites by
//! `crate::overload`.

use crate::ast::{AssignOp, BinOp, PostfixOp, UnaryOp};

pub fn method_name(aggregate: &str, method: &str) -> String {
    format!("{}_{}", aggregate, method)
}

pub fn binary_operator_name(aggregate: &str, op: BinOp) -> String {
    format!("{}_Operator{}", aggregate, binop_word(op))
}

pub fn assign_operator_name(aggregate: &str, op: AssignOp) -> String {
    format!("{}_Operator{}", aggregate, assignop_word(op))
}

pub fn unary_operator_name(aggregate: &str, op: UnaryOp) -> String {
    format!("{}_Operator{}", aggregate, unaryop_word(op))
}

pub fn postfix_operator_name(aggregate: &str, op: PostfixOp) -> String {
    format!("{}_Operator{}", aggregate, postfixop_word(op))
}

pub fn index_operator_name(aggregate: &str) -> String {
    format!("{}_OperatorIndex", aggregate)
}

pub fn assignment_operator_name(aggregate: &str) -> String {
    format!("{}_OperatorAssign", aggregate)
}

/// The declared (unmangled) method-table name a binary operator
/// overload is registered under — what `analyzer.rs` uses as the
/// second half of a `self.methods` key, not the fully mangled name.
pub fn binary_operator_declared_name(op: BinOp) -> String {
    format!("Operator{}", binop_word(op))
}

pub fn assign_operator_declared_name(op: AssignOp) -> String {
    format!("Operator{}", assignop_word(op))
}

pub fn unary_operator_declared_name(op: UnaryOp) -> String {
    format!("Operator{}", unaryop_word(op))
}

pub fn postfix_operator_declared_name(op: PostfixOp) -> String {
    format!("Operator{}", postfixop_word(op))
}

fn binop_word(op: BinOp) -> &'static str {
    use BinOp::*;
    match op {
        Add => "Plus",
        Sub => "Minus",
        Mul => "Mult",
        Div => "Div",
        Modulo => "Modulo",
        And => "And",
        Or => "Or",
        BitAnd => "BitAnd",
        BitOr => "BitOr",
        BitXor => "BitXor",
        Equal => "Equal",
        Diff => "Diff",
        Lower => "Lower",
        Greater => "Greater",
        LEqual => "LEqual",
        GEqual => "GEqual",
    }
}

fn assignop_word(op: AssignOp) -> &'static str {
    use AssignOp::*;
    match op {
        Assign => "Assign",
        PlusEqual => "PlusEqual",
        MinusEqual => "MinusEqual",
        MultEqual => "MultEqual",
        DivEqual => "DivEqual",
        ModuloEqual => "ModuloEqual",
        AndEqual => "AndEqual",
        OrEqual => "OrEqual",
        XorEqual => "XorEqual",
    }
}

fn unaryop_word(op: UnaryOp) -> &'static str {
    use UnaryOp::*;
    match op {
        Plus => "UnaryPlus",
        Minus => "UnaryMinus",
        Not => "Not",
        BitNot => "BitNot",
        PreIncrement => "Increment",
        PreDecrement => "Decrement",
    }
}

/// A source program declares a single `operator ++`/`operator --`
/// covering both the prefix and postfix call sites — there's no
/// separate postfix grammar — so this shares `unaryop_word`'s
/// `Increment`/`Decrement` rather than minting a `Post`-prefixed pair.
fn postfixop_word(op: PostfixOp) -> &'static str {
    match op {
        PostfixOp::Increment => "Increment",
        PostfixOp::Decrement => "Decrement",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_are_prefixed_by_aggregate() {
        assert_eq!(method_name("Vertex", "normalize"), "Vertex_normalize");
    }

    #[test]
    fn operator_names_are_distinct_across_the_table() {
        let names: Vec<String> = vec![
            binary_operator_name("Vector3", BinOp::Add),
            binary_operator_name("Vector3", BinOp::Sub),
            binary_operator_name("Vector3", BinOp::Mul),
            unary_operator_name("Vector3", UnaryOp::Minus),
            unary_operator_name("Vector3", UnaryOp::Not),
            index_operator_name("Vector3"),
            assignment_operator_name("Vector3"),
        ];
        let mut deduped = names.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(names.len(), deduped.len());
    }

    #[test]
    fn compound_assignment_words_use_the_equal_vocabulary() {
        assert_eq!(assign_operator_declared_name(AssignOp::PlusEqual), "OperatorPlusEqual");
        assert_eq!(assign_operator_declared_name(AssignOp::MinusEqual), "OperatorMinusEqual");
        assert_eq!(assign_operator_declared_name(AssignOp::XorEqual), "OperatorXorEqual");
    }

    #[test]
    fn prefix_and_postfix_increment_share_one_declared_name() {
        assert_eq!(
            unary_operator_declared_name(UnaryOp::PreIncrement),
            postfix_operator_declared_name(PostfixOp::Increment)
        );
    }
}
