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

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::rc::Rc;

pub type Node<T> = Rc<T>;

/// Lexical scoping for the symbol table: a chain of scopes, each a name
/// -> value map, with lookup walking outward to the root namespace.
/// Used both for the parser-adjacent namespace tree (`crate::symbol`)
/// and anywhere else a scope chain is useful.
pub struct Env<T> {
    scope: RefCell<HashMap<String, Node<T>>>,
    parent: Option<Node<Env<T>>>,
}

impl<T> Env<T>
where
    T: Clone + Debug,
{
    fn new(parent: Option<Node<Env<T>>>) -> Env<T> {
        Env { scope: RefCell::new(HashMap::new()), parent }
    }

    pub fn root() -> Env<T> {
        Self::new(None)
    }

    pub fn chain(parent: &Node<Env<T>>) -> Env<T> {
        Self::new(Some(parent.clone()))
    }

    /// Look up an identifier from anywhere in the scope chain, innermost
    /// scope first.
    pub fn get(&self, key: &str) -> Option<Node<T>> {
        if let Some(value) = self.scope.borrow().get(key) {
            Some(value.clone())
        } else if let Some(env) = &self.parent {
            env.get(key)
        } else {
            None
        }
    }

    /// True if `key` is already bound in THIS scope (not an ancestor) —
    /// used to detect redeclaration within a single block/namespace.
    pub fn defined_locally(&self, key: &str) -> bool {
        self.scope.borrow().contains_key(key)
    }

    pub fn define(&self, key: &str, value: Node<T>) {
        self.scope.borrow_mut().insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_outward_to_the_root() {
        let root: Node<Env<i32>> = Rc::new(Env::root());
        root.define("x", Rc::new(1));
        let inner: Node<Env<i32>> = Rc::new(Env::chain(&root));
        inner.define("y", Rc::new(2));

        assert_eq!(*inner.get("x").unwrap(), 1);
        assert_eq!(*inner.get("y").unwrap(), 2);
        assert_eq!(root.get("y"), None);
    }

    #[test]
    fn inner_scope_shadows_without_mutating_the_parent() {
        let root: Node<Env<i32>> = Rc::new(Env::root());
        root.define("x", Rc::new(1));
        let inner: Node<Env<i32>> = Rc::new(Env::chain(&root));
        inner.define("x", Rc::new(2));

        assert_eq!(*inner.get("x").unwrap(), 2);
        assert_eq!(*root.get("x").unwrap(), 1);
    }

    #[test]
    fn defined_locally_ignores_ancestor_scopes() {
        let root: Node<Env<i32>> = Rc::new(Env::root());
        root.define("x", Rc::new(1));
        let inner: Node<Env<i32>> = Rc::new(Env::chain(&root));

        assert!(!inner.defined_locally("x"));
        assert!(root.defined_locally("x"));
    }
}
