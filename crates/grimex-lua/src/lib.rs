//! Recovers resource paths named by Grimrock mod scripts.
//!
//! Scripts are parsed as Lua 5.1 and walked once. Table fields, method calls
//! and free function calls whose names appear in [`rules`] contribute the
//! string constants they are given, rewritten to the extension the packed
//! asset actually has. Values that can't be resolved statically become
//! [`Diagnostic`]s instead.

pub mod diagnostic;
mod literal;
pub mod rules;
mod visitor;

use full_moon::visitors::Visitor;
use indexmap::IndexSet;
use tracing::debug;

pub use diagnostic::{Diagnostic, Position};

use diagnostic::Origin;
use visitor::ResourceVisitor;

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScriptScan {
    /// Recovered paths in discovery order.
    pub resources: IndexSet<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Scans a script given as raw bytes. Invalid UTF-8 is replaced, not rejected.
pub fn scan_bytes(bytes: &[u8]) -> ScriptScan {
    scan_script(&String::from_utf8_lossy(bytes))
}

pub fn scan_script(source: &str) -> ScriptScan {
    let mut scan = ScriptScan::default();
    scan_into(source, Origin::root(), &mut scan);
    scan
}

pub(crate) fn scan_into(source: &str, origin: Origin, scan: &mut ScriptScan) {
    let source = source.strip_prefix(BYTE_ORDER_MARK).unwrap_or(source);
    match full_moon::parse(source) {
        Ok(ast) => {
            ResourceVisitor::new(origin, scan).visit_ast(&ast);
        }
        Err(errors) => {
            debug!("Script failed to parse ({} errors)", errors.len());
            scan.diagnostics.extend(errors.iter().map(|error| {
                let (start, _) = error.range();
                Diagnostic {
                    position: Some(origin.locate(Position::new(start.line(), start.character()))),
                    ..Diagnostic::new(format!("parse failed: {error}"))
                }
            }));
        }
    }
}
