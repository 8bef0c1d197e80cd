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

//! The namespace tree and type system. Every `namespace` block, every
//! struct/attribute/constant-block, and the implicit global namespace
//! are `Namespace` nodes; each holds its own symbol map and an ordered
//! list of child namespaces, mirroring the scoping of spec.md §3.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::Stage;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    UInt,
    Float,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::UInt => "uint",
            ScalarKind::Float => "float",
        };
        write!(f, "{}", text)
    }
}

/// The set of swizzle letters a vector/Color type accepts, in component
/// order, used both for member-access validation and for building the
/// synthetic swizzle result type.
pub const POSITION_SWIZZLE: &str = "xyzw";
pub const COLOR_SWIZZLE: &str = "rgba";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Void,
    Scalar(ScalarKind),
    /// A `float`/`int`/`uint` vector of arity 2-4 (`Vector2`, `Vector3Int`, ...).
    Vector(ScalarKind, u8),
    Color,
    Texture,
    /// `Matrix2x2`, `Matrix3x3`, `Matrix4x4`.
    Matrix(u8),
    /// A user-declared struct, attribute block, or constant block,
    /// named by its fully-qualified namespace path.
    Aggregate(String),
    Array(Rc<TypeKind>, u64),
}

impl TypeKind {
    pub fn display_name(&self) -> String {
        match self {
            TypeKind::Void => "void".to_string(),
            TypeKind::Scalar(s) => s.to_string(),
            TypeKind::Vector(ScalarKind::Float, n) => format!("Vector{}", n),
            TypeKind::Vector(ScalarKind::Int, n) => format!("Vector{}Int", n),
            TypeKind::Vector(ScalarKind::UInt, n) => format!("Vector{}UInt", n),
            TypeKind::Vector(ScalarKind::Bool, n) => format!("Vector{}Bool", n),
            TypeKind::Color => "Color".to_string(),
            TypeKind::Texture => "Texture".to_string(),
            TypeKind::Matrix(n) => format!("Matrix{}x{}", n, n),
            TypeKind::Aggregate(name) => name.clone(),
            TypeKind::Array(elem, size) => format!("{}[{}]", elem.display_name(), size),
        }
    }

    pub fn is_vector_like(&self) -> bool {
        matches!(self, TypeKind::Vector(_, _) | TypeKind::Color)
    }

    pub fn arity(&self) -> Option<u8> {
        match self {
            TypeKind::Vector(_, n) => Some(*n),
            TypeKind::Color => Some(4),
            _ => None,
        }
    }

    /// The type a swizzle/component access on this type yields, given
    /// how many letters were used (1 letter -> scalar component type).
    pub fn component_type(&self) -> Option<TypeKind> {
        match self {
            TypeKind::Vector(k, _) => Some(TypeKind::Scalar(*k)),
            TypeKind::Color => Some(TypeKind::Scalar(ScalarKind::Float)),
            _ => None,
        }
    }

    /// The swizzle alphabet accepted for member access on this type, if any.
    pub fn swizzle_alphabet(&self) -> Option<&'static str> {
        match self {
            TypeKind::Vector(_, _) => Some(POSITION_SWIZZLE),
            TypeKind::Color => Some(COLOR_SWIZZLE),
            _ => None,
        }
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, TypeKind::Scalar(ScalarKind::Int) | TypeKind::Scalar(ScalarKind::UInt))
    }
}

#[derive(Clone, Debug)]
pub struct FunctionSignature {
    pub mangled_name: String,
    pub params: Vec<TypeKind>,
    pub return_type: TypeKind,
}

#[derive(Clone, Debug)]
pub enum SymbolKind {
    Type(TypeKind),
    Variable { ty: TypeKind, is_const: bool },
    /// An overload set; every entry shares the declared (unmangled) name.
    Function(Vec<FunctionSignature>),
    PipelineFlow { from: Stage, to: Stage, ty: TypeKind },
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
}

#[derive(Debug)]
pub struct Namespace {
    pub name: String,
    pub symbols: HashMap<String, Symbol>,
    pub children: HashMap<String, Namespace>,
}

impl Namespace {
    fn new(name: &str) -> Namespace {
        Namespace { name: name.to_string(), symbols: HashMap::new(), children: HashMap::new() }
    }

    pub fn define(&mut self, symbol: Symbol) -> bool {
        if self.symbols.contains_key(&symbol.name) {
            return false;
        }
        self.symbols.insert(symbol.name.clone(), symbol);
        true
    }

    /// Add an overload to an existing function symbol, or create one.
    pub fn add_overload(&mut self, name: &str, sig: FunctionSignature) {
        match self.symbols.get_mut(name) {
            Some(Symbol { kind: SymbolKind::Function(sigs), .. }) => sigs.push(sig),
            _ => {
                self.symbols.insert(
                    name.to_string(),
                    Symbol { name: name.to_string(), kind: SymbolKind::Function(vec![sig]) },
                );
            }
        }
    }

    pub fn child_or_create(&mut self, name: &str) -> &mut Namespace {
        self.children.entry(name.to_string()).or_insert_with(|| Namespace::new(name))
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }
}

/// Owns the global namespace tree for one compilation and pre-populates
/// the built-in scalar, vector, matrix, `Color` and `Texture` types.
pub struct SymbolTable {
    pub global: Namespace,
}

impl SymbolTable {
    pub fn with_builtins() -> SymbolTable {
        let mut global = Namespace::new("");
        for (name, kind) in builtin_types() {
            global.define(Symbol { name: name.to_string(), kind: SymbolKind::Type(kind) });
        }
        SymbolTable { global }
    }

    /// Resolve a `::`-joined qualified path from the global namespace.
    pub fn resolve_namespace<'a>(&'a self, path: &[String]) -> Option<&'a Namespace> {
        let mut ns = &self.global;
        for part in path {
            ns = ns.children.get(part)?;
        }
        Some(ns)
    }

    pub fn resolve_namespace_mut<'a>(&'a mut self, path: &[String]) -> &'a mut Namespace {
        let mut ns = &mut self.global;
        for part in path {
            ns = ns.child_or_create(part);
        }
        ns
    }
}

fn builtin_types() -> Vec<(&'static str, TypeKind)> {
    use ScalarKind::*;
    let mut types = vec![
        ("void", TypeKind::Void),
        ("bool", TypeKind::Scalar(Bool)),
        ("int", TypeKind::Scalar(Int)),
        ("uint", TypeKind::Scalar(UInt)),
        ("float", TypeKind::Scalar(Float)),
        ("Color", TypeKind::Color),
        ("Texture", TypeKind::Texture),
        ("Matrix2x2", TypeKind::Matrix(2)),
        ("Matrix3x3", TypeKind::Matrix(3)),
        ("Matrix4x4", TypeKind::Matrix(4)),
    ];
    for arity in 2..=4u8 {
        types.push((leak(format!("Vector{}", arity)), TypeKind::Vector(Float, arity)));
        types.push((leak(format!("Vector{}Int", arity)), TypeKind::Vector(Int, arity)));
        types.push((leak(format!("Vector{}UInt", arity)), TypeKind::Vector(UInt, arity)));
    }
    types
}

/// Built-in type names are a fixed, small set computed once at startup;
/// leaking them to `'static` avoids threading lifetimes through every
/// `TypeKind` consumer for a handful of short strings.
fn leak(s: String) -> &'static str {
    Box::leak(s.into_boxed_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_cover_every_vector_family() {
        let table = SymbolTable::with_builtins();
        for name in ["Vector2", "Vector3", "Vector4", "Vector2Int", "Vector3UInt", "Color", "Texture"] {
            assert!(table.global.get(name).is_some(), "missing builtin {}", name);
        }
    }

    #[test]
    fn swizzle_alphabet_matches_type_family() {
        assert_eq!(TypeKind::Vector(ScalarKind::Float, 3).swizzle_alphabet(), Some(POSITION_SWIZZLE));
        assert_eq!(TypeKind::Color.swizzle_alphabet(), Some(COLOR_SWIZZLE));
        assert_eq!(TypeKind::Scalar(ScalarKind::Int).swizzle_alphabet(), None);
    }
}
