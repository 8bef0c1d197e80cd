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

//! Implicit-conversion costs and overload resolution.
//!
//! Conversions form a sparse, direct-edge lattice (spec.md §4.4.4): a
//! value converts only along an explicit edge, never transitively
//! through an unrelated type. `bool` converts to nothing and nothing
//! converts to it. `Color` and `Vector4` convert to each other. A
//! `Matrix` converts to the `Vector` of matching total component count.
//! Array dimensions never convert; arity and element type must match
//! exactly. Every edge costs the same: overload ranking only cares
//! whether a parameter is an exact match or not, never how "far" the
//! conversion travels.

use crate::symbol::{FunctionSignature, ScalarKind, TypeKind};

/// Cost of one direct edge. Lower is preferred; ties at the lowest
/// total sum make a call ambiguous. Every non-exact edge costs the
/// same `CONVERT`, per spec.md §4.4.4 — there is no narrowing/widening
/// distinction in the ranking.
const EXACT: u32 = 0;
const CONVERT: u32 = 1;

/// Cost of converting a value of type `from` to a parameter of type
/// `to`, or `None` if no edge exists.
pub fn conversion_cost(from: &TypeKind, to: &TypeKind) -> Option<u32> {
    if from == to {
        return Some(EXACT);
    }
    match (from, to) {
        (TypeKind::Scalar(ScalarKind::Bool), _) | (_, TypeKind::Scalar(ScalarKind::Bool)) => None,
        (TypeKind::Scalar(a), TypeKind::Scalar(b)) => scalar_cost(*a, *b),
        (TypeKind::Vector(a, n1), TypeKind::Vector(b, n2)) if n1 == n2 => {
            if a == b {
                Some(EXACT)
            } else {
                scalar_cost(*a, *b).map(|_| CONVERT)
            }
        }
        (TypeKind::Color, TypeKind::Vector(ScalarKind::Float, 4)) => Some(CONVERT),
        (TypeKind::Vector(ScalarKind::Float, 4), TypeKind::Color) => Some(CONVERT),
        (TypeKind::Matrix(n), TypeKind::Vector(ScalarKind::Float, m)) if (*n as u32) * (*n as u32) == *m as u32 => {
            Some(CONVERT)
        }
        _ => None,
    }
}

fn scalar_cost(from: ScalarKind, to: ScalarKind) -> Option<u32> {
    use ScalarKind::*;
    match (from, to) {
        (a, b) if a == b => Some(EXACT),
        (Int, Float) | (UInt, Float) | (Int, UInt) | (Float, Int) | (Float, UInt) | (UInt, Int) => Some(CONVERT),
        _ => None,
    }
}

#[derive(Debug)]
pub enum Resolution<'a> {
    Unique(&'a FunctionSignature),
    Ambiguous(Vec<&'a FunctionSignature>),
    NoViable,
}

/// Resolve a call's argument types against an overload set. Candidates
/// with the wrong arity never participate. Among arity-matching
/// candidates, pick the minimum summed per-parameter conversion cost;
/// a tie at that minimum is ambiguous, and an empty candidate set (or
/// one where every candidate has an infinite-cost parameter) is
/// no-viable.
pub fn resolve<'a>(candidates: &'a [FunctionSignature], args: &[TypeKind]) -> Resolution<'a> {
    let mut scored: Vec<(u32, &FunctionSignature)> = Vec::new();
    for sig in candidates {
        if sig.params.len() != args.len() {
            continue;
        }
        let mut total = 0u32;
        let mut viable = true;
        for (param, arg) in sig.params.iter().zip(args.iter()) {
            match conversion_cost(arg, param) {
                Some(cost) => total += cost,
                None => {
                    viable = false;
                    break;
                }
            }
        }
        if viable {
            scored.push((total, sig));
        }
    }

    if scored.is_empty() {
        return Resolution::NoViable;
    }

    let min = scored.iter().map(|(cost, _)| *cost).min().unwrap();
    let winners: Vec<&FunctionSignature> =
        scored.iter().filter(|(cost, _)| *cost == min).map(|(_, sig)| *sig).collect();

    if winners.len() == 1 {
        Resolution::Unique(winners[0])
    } else {
        Resolution::Ambiguous(winners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(name: &str, params: Vec<TypeKind>, ret: TypeKind) -> FunctionSignature {
        FunctionSignature { mangled_name: name.to_string(), params, return_type: ret }
    }

    #[test]
    fn bool_never_converts() {
        assert_eq!(conversion_cost(&TypeKind::Scalar(ScalarKind::Bool), &TypeKind::Scalar(ScalarKind::Int)), None);
        assert_eq!(conversion_cost(&TypeKind::Scalar(ScalarKind::Int), &TypeKind::Scalar(ScalarKind::Bool)), None);
    }

    #[test]
    fn color_and_vector4_interconvert() {
        assert!(conversion_cost(&TypeKind::Color, &TypeKind::Vector(ScalarKind::Float, 4)).is_some());
        assert!(conversion_cost(&TypeKind::Vector(ScalarKind::Float, 4), &TypeKind::Color).is_some());
        assert_eq!(conversion_cost(&TypeKind::Color, &TypeKind::Vector(ScalarKind::Float, 3)), None);
    }

    #[test]
    fn exact_match_wins_over_widening() {
        let candidates = vec![
            sig("f_float", vec![TypeKind::Scalar(ScalarKind::Float)], TypeKind::Void),
            sig("f_int", vec![TypeKind::Scalar(ScalarKind::Int)], TypeKind::Void),
        ];
        match resolve(&candidates, &[TypeKind::Scalar(ScalarKind::Int)]) {
            Resolution::Unique(sig) => assert_eq!(sig.mangled_name, "f_int"),
            other => panic!("expected unique resolution, got {:?}", other),
        }
    }

    #[test]
    fn equal_cost_candidates_are_ambiguous() {
        let candidates = vec![
            sig("f_int_uint", vec![TypeKind::Scalar(ScalarKind::Int), TypeKind::Scalar(ScalarKind::UInt)], TypeKind::Void),
            sig("f_uint_int", vec![TypeKind::Scalar(ScalarKind::UInt), TypeKind::Scalar(ScalarKind::Int)], TypeKind::Void),
        ];
        let args = [TypeKind::Scalar(ScalarKind::Float), TypeKind::Scalar(ScalarKind::Float)];
        match resolve(&candidates, &args) {
            Resolution::Ambiguous(winners) => assert_eq!(winners.len(), 2),
            other => panic!("expected ambiguous resolution, got {:?}", other),
        }
    }

    #[test]
    fn uniform_cost_makes_uint_arg_ambiguous_between_int_and_float() {
        let candidates = vec![
            sig("f_int", vec![TypeKind::Scalar(ScalarKind::Int)], TypeKind::Void),
            sig("f_float", vec![TypeKind::Scalar(ScalarKind::Float)], TypeKind::Void),
        ];
        match resolve(&candidates, &[TypeKind::Scalar(ScalarKind::UInt)]) {
            Resolution::Ambiguous(winners) => assert_eq!(winners.len(), 2),
            other => panic!("expected ambiguous resolution, got {:?}", other),
        }
    }

    #[test]
    fn wrong_arity_is_excluded_not_penalized() {
        let candidates = vec![sig("f_one", vec![TypeKind::Scalar(ScalarKind::Int)], TypeKind::Void)];
        let args = [TypeKind::Scalar(ScalarKind::Int), TypeKind::Scalar(ScalarKind::Int)];
        assert!(matches!(resolve(&candidates, &args), Resolution::NoViable));
    }
}
