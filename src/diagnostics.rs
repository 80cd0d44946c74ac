use super::cabac_contexts::SyntaxElement;
use colored::*;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Diagnostic {
    /// A unary bypass prefix hit `CABAC_MAX_BIN`; the capped value was used.
    MaxBinReached { element: SyntaxElement, bins: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MaxBinReached { element, bins } => {
                write!(f, "CABAC_MAX_BIN : {} ({})", bins, element.name())
            }
        }
    }
}

pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

#[derive(Default)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        eprintln!("{}: {}", "error".red(), diagnostic);
    }
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}
