//! The error taxonomy.
//!
//! `CoreError` is returned to callers — it only ever signals a programmer
//! error (bad argument, exhausted retry budget). Everything that can go
//! wrong while interpreting a configuration source is a [`ConfigMessage`],
//! which is absorbed into [`crate::Hierarchy::configuration_messages`]
//! rather than returned, so one bad `<appender>` element doesn't abort an
//! otherwise-good configure.

use thiserror::Error;

/// An error a caller can act on. These never originate from configuration
/// content — only from misuse of the API itself.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("hierarchy registry contention exhausted its retry budget")]
    HierarchyContention,
}

/// A non-fatal diagnostic produced while interpreting configuration.
///
/// These accumulate in `Hierarchy::configuration_messages` and are never
/// propagated as a `Result::Err` from `configure()` — a single malformed
/// `<appender>` or dangling `<appender-ref>` should not prevent the rest of
/// the document from taking effect.
#[derive(Debug, Error)]
pub enum ConfigMessage {
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("error configuring element `{element}`: {detail}")]
    ConfigElementError { element: String, detail: String },

    #[error("appender `{appender}` could not be built: {detail}")]
    AppenderError { appender: String, detail: String },

    #[error("no appenders could be found for logger `{logger}`")]
    NoAppendersWarning { logger: String },

    #[error("`{old}` is deprecated; use `{new}` instead")]
    DeprecatedAlias { old: String, new: String },
}
