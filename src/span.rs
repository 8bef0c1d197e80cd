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

use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

/// A single point in a source file: 1-based line, 0-based column (tabs
/// expanded to 4 columns), and a byte offset into the normalized source.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: u32,
}

impl Position {
    pub fn start() -> Position {
        Position { line: 1, column: 0, offset: 0 }
    }
}

/// A source range, carried by every token and every CST/IR node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Span {
    pub origin: Rc<PathBuf>,
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(origin: Rc<PathBuf>, start: Position, end: Position) -> Span {
        Span { origin, start, end }
    }

    /// A zero-width span, used for synthesized nodes that have no direct
    /// source counterpart (e.g. an inserted conversion cast).
    pub fn synthetic(origin: Rc<PathBuf>) -> Span {
        Span { origin, start: Position::start(), end: Position::start() }
    }

    /// Merge two spans from the same file into one spanning both.
    pub fn merge(&self, other: &Span) -> Span {
        let (start, end) = if self.start.offset <= other.start.offset {
            (self.start.clone(), other.end.clone())
        } else {
            (other.start.clone(), self.end.clone())
        };
        Span { origin: self.origin.clone(), start, end }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.origin.display(),
            self.start.line,
            self.start.column
        )
    }
}
