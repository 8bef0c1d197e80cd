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

//! Errors that stop the compilation driver cold — missing input files,
//! unwritable output, a `ron` encoding failure. Distinct from
//! `crate::diagnostics`, which models errors *within* a successfully
//! read, successfully written compilation.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LuminaError {
    #[error("cannot read `{path}`: {source}")]
    ReadInput { path: PathBuf, #[source] source: std::io::Error },

    #[error("cannot write `{path}`: {source}")]
    WriteOutput { path: PathBuf, #[source] source: std::io::Error },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to encode compiled module: {0}")]
    Encode(#[from] ron::Error),

    #[error("compilation failed with {0} diagnostic(s)")]
    CompilationFailed(usize),
}
