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

//! `luminac`'s command line and compilation driver: read the input
//! file, expand `#include`s, tokenize, parse, lower, and write the
//! serialized module, printing every diagnostic to stderr along the
//! way.

use std::fs;
use std::path::PathBuf;

use clap::Parser as ClapParser;

use crate::analyzer;
use crate::diagnostics::{self, DiagnosticBag, DiagnosticCategory};
use crate::error::LuminaError;
use crate::include::{self, IncludeResolver};
use crate::parser;
use crate::serialize;

#[derive(ClapParser, Debug)]
#[command(name = "luminac", about = "Compiles a Lumina shader source file into a serialized module")]
pub struct Cli {
    /// Lumina source file to compile.
    pub input: PathBuf,

    /// Where to write the serialized module.
    #[arg(short, long, default_value = "a.out")]
    pub output: PathBuf,

    /// Print every diagnostic, not just the final count.
    #[arg(short, long)]
    pub verbose: bool,

    /// Additional directory to search for `#include`s, may repeat.
    #[arg(short = 'i', long = "includePath")]
    pub include_path: Vec<PathBuf>,
}

/// Runs the full pipeline for one invocation. Returns `Ok(())` iff
/// compilation produced zero diagnostics and the artifact was written;
/// any diagnostic at all is a compile failure (spec.md §5), surfaced
/// as `LuminaError::CompilationFailed`.
pub fn run(cli: &Cli) -> Result<(), LuminaError> {
    tracing::info!(input = %cli.input.display(), "starting compilation");
    if cli.verbose {
        eprintln!("input:  {}", cli.input.display());
        eprintln!("output: {}", cli.output.display());
        for dir in &cli.include_path {
            eprintln!("include path: {}", dir.display());
        }
    }

    let source = fs::read_to_string(&cli.input).map_err(|source| LuminaError::ReadInput {
        path: cli.input.clone(),
        source,
    })?;

    let mut diagnostics = DiagnosticBag::new();
    let resolver = IncludeResolver::new(cli.include_path.clone());
    let (expanded, included_ranges) =
        include::expand_includes(&cli.input, &source, &resolver, &mut diagnostics);

    let unit = parser::parse_source(&cli.input, &expanded, &mut diagnostics);
    flag_stage_functions_in_includes(&unit, &included_ranges, &mut diagnostics);

    let module = analyzer::analyze(&unit, &mut diagnostics);

    report(&diagnostics, &expanded, cli.verbose);

    if !diagnostics.is_success() {
        return Err(LuminaError::CompilationFailed(diagnostics.count()));
    }

    let text = serialize::to_ron_string(&module)?;
    fs::write(&cli.output, text).map_err(|source| LuminaError::WriteOutput { path: cli.output.clone(), source })?;
    tracing::info!(output = %cli.output.display(), "wrote compiled module");
    Ok(())
}

fn flag_stage_functions_in_includes(
    unit: &crate::ast::CompilationUnit,
    included_ranges: &[(u32, u32)],
    diagnostics: &mut DiagnosticBag,
) {
    for instr in &unit.instructions {
        if let crate::ast::InstructionKind::StageFunction(sf) = &instr.kind {
            let offset = sf.span.start.offset;
            if included_ranges.iter().any(|(start, end)| offset >= *start && offset < *end) {
                diagnostics.report(
                    DiagnosticCategory::StageFunctionInIncludedFile,
                    sf.span.clone(),
                    "stage functions may only be declared in the top-level compilation unit",
                );
            }
        }
    }
}

fn report(bag: &DiagnosticBag, source: &str, verbose: bool) {
    if bag.is_success() {
        if verbose {
            tracing::info!("no diagnostics");
        }
        return;
    }
    for diagnostic in bag.iter() {
        let line_text = source.lines().nth(diagnostic.span.start.line.saturating_sub(1) as usize).unwrap_or("");
        eprintln!("{}", diagnostics::render(diagnostic, line_text));
    }
    tracing::warn!(count = bag.count(), "compilation produced diagnostics");
}
