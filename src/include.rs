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

//! `#include <path>` resolution.
//!
//! Search order (spec.md §4.2): every directory named by the `PATH`
//! environment variable, each suffixed with `/includes`; then the
//! caller's `-i`/`--includePath` directories, in the order given; then
//! the including file's own parent directory; then the current working
//! directory. The first candidate that exists wins.
//!
//! Cycle detection is per include *chain*, not global: the same header
//! may legally be included twice from unrelated branches of the
//! compilation, but not from itself transitively.

use std::env;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::diagnostics::{DiagnosticBag, DiagnosticCategory};
use crate::span::Span;

pub struct IncludeResolver {
    search_dirs: Vec<PathBuf>,
}

impl IncludeResolver {
    /// `extra_dirs` are the caller-supplied `-i` paths, in command-line order.
    pub fn new(extra_dirs: Vec<PathBuf>) -> IncludeResolver {
        let mut search_dirs = path_include_dirs();
        search_dirs.extend(extra_dirs);
        IncludeResolver { search_dirs }
    }

    /// Resolve `header` as referenced from a file whose parent directory
    /// is `including_dir`. Returns the first existing match.
    pub fn resolve(&self, header: &str, including_dir: &Path) -> Option<PathBuf> {
        for dir in &self.search_dirs {
            let candidate = dir.join(header);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        let beside_includer = including_dir.join(header);
        if beside_includer.is_file() {
            return Some(beside_includer);
        }
        let cwd = env::current_dir().ok()?;
        let in_cwd = cwd.join(header);
        if in_cwd.is_file() {
            return Some(in_cwd);
        }
        None
    }
}

/// Every `PATH` entry, suffixed with `/includes`, in `PATH` order.
fn path_include_dirs() -> Vec<PathBuf> {
    match env::var_os("PATH") {
        Some(path) => env::split_paths(&path).map(|dir| dir.join("includes")).collect(),
        None => Vec::new(),
    }
}

/// Tracks the chain of files currently being included, so that a cycle
/// is only flagged when a file tries to include itself transitively,
/// not when two sibling includes both happen to reference the same
/// leaf header.
#[derive(Default)]
pub struct IncludeChain {
    stack: Vec<PathBuf>,
}

impl IncludeChain {
    pub fn new() -> IncludeChain {
        IncludeChain::default()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.stack.iter().any(|p| p == path)
    }

    pub fn push(&mut self, path: PathBuf) {
        self.stack.push(path);
    }

    pub fn pop(&mut self) {
        self.stack.pop();
    }
}

/// Expand every `#include <path>` directive in `source` before
/// tokenizing, recursively, following `resolver`'s search order and
/// `origin`'s own directory for relative headers. Returns the expanded
/// text plus the byte ranges (into that text) that came from an
/// included file, so the driver can flag a stage function declared
/// inside one (spec.md §4.2: stage functions may only appear in the
/// top-level compilation unit, never in a header).
///
/// An unresolvable or cyclic include is left untouched in the output
/// (the parser treats a leftover `#include` as a harmless no-op) after
/// recording the corresponding diagnostic; one bad include never stops
/// the rest of the file from compiling.
pub fn expand_includes(
    origin: &Path,
    source: &str,
    resolver: &IncludeResolver,
    diagnostics: &mut DiagnosticBag,
) -> (String, Vec<(u32, u32)>) {
    let mut chain = IncludeChain::new();
    chain.push(origin.to_path_buf());
    expand_inner(origin, source, resolver, &mut chain, diagnostics)
}

fn expand_inner(
    origin: &Path,
    source: &str,
    resolver: &IncludeResolver,
    chain: &mut IncludeChain,
    diagnostics: &mut DiagnosticBag,
) -> (String, Vec<(u32, u32)>) {
    let mut out = String::new();
    let mut ranges = Vec::new();
    let mut i = 0;
    while i < source.len() {
        if let Some(directive) = parse_include_directive(&source[i..]) {
            let directive_end = i + directive.byte_len;
            let including_dir = origin.parent().unwrap_or_else(|| Path::new("."));
            match resolver.resolve(&directive.header, including_dir) {
                Some(resolved) if chain.contains(&resolved) => {
                    diagnostics.report(
                        DiagnosticCategory::IncludeCycle,
                        Span::synthetic(Rc::new(origin.to_path_buf())),
                        format!("include cycle at `{}`", directive.header),
                    );
                    out.push_str(&source[i..directive_end]);
                }
                Some(resolved) => match std::fs::read_to_string(&resolved) {
                    Ok(contents) => {
                        chain.push(resolved.clone());
                        let (nested_text, nested_ranges) =
                            expand_inner(&resolved, &contents, resolver, chain, diagnostics);
                        chain.pop();
                        let start = out.len() as u32;
                        out.push_str(&nested_text);
                        let end = out.len() as u32;
                        ranges.push((start, end));
                        for (s, e) in nested_ranges {
                            ranges.push((start + s, start + e));
                        }
                    }
                    Err(_) => {
                        diagnostics.report(
                            DiagnosticCategory::IncludeFileNotFound,
                            Span::synthetic(Rc::new(origin.to_path_buf())),
                            format!("cannot read `{}`", directive.header),
                        );
                        out.push_str(&source[i..directive_end]);
                    }
                },
                None => {
                    diagnostics.report(
                        DiagnosticCategory::IncludeFileNotFound,
                        Span::synthetic(Rc::new(origin.to_path_buf())),
                        format!("include file not found: `{}`", directive.header),
                    );
                    out.push_str(&source[i..directive_end]);
                }
            }
            i = directive_end;
            continue;
        }
        let ch = source[i..].chars().next().expect("i < source.len()");
        out.push(ch);
        i += ch.len_utf8();
    }
    (out, ranges)
}

struct IncludeDirective {
    header: String,
    byte_len: usize,
}

/// Recognize `#include <header>` at the start of `text`, matching the
/// tokenizer's own header-literal rule: no whitespace or newline inside
/// the angle brackets.
fn parse_include_directive(text: &str) -> Option<IncludeDirective> {
    let rest = text.strip_prefix("#include")?;
    let trimmed = rest.trim_start_matches([' ', '\t']);
    let skipped = rest.len() - trimmed.len();
    let inner = trimmed.strip_prefix('<')?;
    let close = inner.find('>')?;
    let header = &inner[..close];
    if header.contains(|c: char| c.is_whitespace()) {
        return None;
    }
    Some(IncludeDirective { header: header.to_string(), byte_len: "#include".len() + skipped + 1 + close + 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn resolves_from_includer_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let header_path = dir.path().join("common.lum");
        fs::write(&header_path, "// header").unwrap();

        let resolver = IncludeResolver::new(Vec::new());
        let resolved = resolver.resolve("common.lum", dir.path());
        assert_eq!(resolved, Some(header_path));
    }

    #[test]
    fn extra_dirs_are_searched_before_the_includer_directory() {
        let extra = tempfile::tempdir().unwrap();
        let includer_dir = tempfile::tempdir().unwrap();
        let extra_header = extra.path().join("shared.lum");
        let local_header = includer_dir.path().join("shared.lum");
        fs::write(&extra_header, "// extra").unwrap();
        fs::write(&local_header, "// local").unwrap();

        let resolver = IncludeResolver::new(vec![extra.path().to_path_buf()]);
        let resolved = resolver.resolve("shared.lum", includer_dir.path());
        assert_eq!(resolved, Some(extra_header));
    }

    #[test]
    fn missing_header_resolves_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = IncludeResolver::new(Vec::new());
        assert_eq!(resolver.resolve("nope.lum", dir.path()), None);
    }

    #[test]
    fn expand_includes_splices_in_header_contents() {
        let dir = tempfile::tempdir().unwrap();
        let header_path = dir.path().join("common.lum");
        fs::write(&header_path, "struct Included { int x; }").unwrap();
        let main_path = dir.path().join("main.lum");
        let source = "#include <common.lum>\nstruct Main { int y; }";

        let resolver = IncludeResolver::new(Vec::new());
        let mut diagnostics = crate::diagnostics::DiagnosticBag::new();
        let (expanded, ranges) = expand_includes(&main_path, source, &resolver, &mut diagnostics);

        assert!(diagnostics.is_success());
        assert!(expanded.contains("struct Included"));
        assert!(expanded.contains("struct Main"));
        assert_eq!(ranges.len(), 1);
        let (start, end) = ranges[0];
        assert_eq!(&expanded[start as usize..end as usize], "struct Included { int x; }");
    }

    #[test]
    fn expand_includes_reports_missing_header_and_leaves_directive_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let main_path = dir.path().join("main.lum");
        let source = "#include <missing.lum>\nstruct Main { int y; }";

        let resolver = IncludeResolver::new(Vec::new());
        let mut diagnostics = crate::diagnostics::DiagnosticBag::new();
        let (expanded, ranges) = expand_includes(&main_path, source, &resolver, &mut diagnostics);

        assert_eq!(diagnostics.of_category(DiagnosticCategory::IncludeFileNotFound), 1);
        assert!(expanded.contains("#include <missing.lum>"));
        assert!(ranges.is_empty());
    }

    #[test]
    fn chain_detects_reentry_but_not_unrelated_reuse() {
        let mut chain = IncludeChain::new();
        let a = PathBuf::from("/tmp/a.lum");
        let b = PathBuf::from("/tmp/b.lum");
        chain.push(a.clone());
        assert!(chain.contains(&a));
        assert!(!chain.contains(&b));
        chain.push(b.clone());
        chain.pop();
        assert!(!chain.contains(&b));
        assert!(chain.contains(&a));
    }
}
