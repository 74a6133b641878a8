//! The out-of-band channel for messages that have nowhere else to go:
//! internal repository errors that aren't part of the `ConfigMessage` log
//! (e.g. "no appenders found" the first time it's seen, shutdown
//! confirmation), reported through a pluggable sink rather than a hard-coded
//! `eprintln!` so an embedder can route them to its own logging.

use std::fmt;

/// Severity of a [`DiagnosticSink::emit`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Debug,
    Warn,
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticSeverity::Debug => "DEBUG",
            DiagnosticSeverity::Warn => "WARN",
            DiagnosticSeverity::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// Receives internal diagnostics from a [`crate::Hierarchy`].
///
/// This replaces a hard-coded global error handler: each `Hierarchy` holds
/// one sink, so embedding multiple independent hierarchies in one process
/// doesn't force them to share a single error stream.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, severity: DiagnosticSeverity, message: &str);
}

/// The default sink: writes to stderr, prefixed with the crate name.
#[derive(Debug, Default)]
pub struct StderrDiagnosticSink;

impl DiagnosticSink for StderrDiagnosticSink {
    fn emit(&self, severity: DiagnosticSeverity, message: &str) {
        eprintln!("loghier: {severity}: {message}");
    }
}

/// A sink that discards everything. Useful in tests that would otherwise
/// spam stderr with expected diagnostics.
#[derive(Debug, Default)]
pub struct NullDiagnosticSink;

impl DiagnosticSink for NullDiagnosticSink {
    fn emit(&self, _severity: DiagnosticSeverity, _message: &str) {}
}
