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

//! Writes a `crate::ir::Module` out as RON, the way `v1.rs` reads
//! dashboard configs back in, except in the opposite direction and
//! pinned to one `PrettyConfig` so two runs over the same input always
//! produce byte-identical output (spec.md §6).

use std::io::Write;

use ron::ser::PrettyConfig;

use crate::error::LuminaError;
use crate::ir::Module;

/// The one `PrettyConfig` every artifact is written with. Indentation,
/// key ordering and struct-name emission are all pinned here so the
/// determinism invariant doesn't quietly depend on `ron`'s defaults.
fn pretty_config() -> PrettyConfig {
    PrettyConfig::new()
        .depth_limit(64)
        .indentor("  ".to_string())
        .struct_names(true)
}

pub fn to_ron_string(module: &Module) -> Result<String, LuminaError> {
    ron::ser::to_string_pretty(module, pretty_config()).map_err(LuminaError::from)
}

pub fn write_to(module: &Module, writer: &mut impl Write) -> Result<(), LuminaError> {
    let text = to_ron_string(module)?;
    writer.write_all(text.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{IrAggregate, IrAggregateKind, IrField, IrType};

    fn sample_module() -> Module {
        let mut module = Module::new();
        module.aggregates.push(IrAggregate {
            name: "Vertex".to_string(),
            kind: IrAggregateKind::Struct,
            fields: vec![IrField { name: "position".to_string(), ty: IrType::Vector { base: Box::new(IrType::Float), arity: 3 } }],
        });
        module
    }

    #[test]
    fn serialization_is_deterministic_across_runs() {
        let module = sample_module();
        let first = to_ron_string(&module).unwrap();
        let second = to_ron_string(&module).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn output_names_every_struct() {
        let text = to_ron_string(&sample_module()).unwrap();
        assert!(text.contains("Vertex"));
        assert!(text.contains("IrAggregate"));
    }
}
