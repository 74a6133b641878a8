//! The seam that decides what concrete `Logger` gets created for a given
//! name. Most callers never need anything but [`DefaultLoggerFactory`]; the
//! trait exists so an embedder can hand out a `Logger` subtype decorated
//! with extra bookkeeping without forking the registry algorithm.

use std::sync::Weak;

use crate::hierarchy::HierarchyInner;
use crate::level::Level;
use crate::node::Logger;

/// Creates the `Logger` instances a [`crate::Hierarchy`] stores in its
/// registry.
pub trait LoggerFactory: Send + Sync {
    /// Creates the root logger, which always has an explicit level.
    fn create_root(&self, repository: &Weak<HierarchyInner>, level: Level) -> Logger;

    /// Creates a regular (non-root) logger for `name`, with no explicit
    /// level (it inherits until configured otherwise).
    fn create_logger(&self, repository: &Weak<HierarchyInner>, name: String) -> Logger;
}

/// The factory every [`crate::Hierarchy`] uses unless told otherwise.
#[derive(Debug, Default)]
pub struct DefaultLoggerFactory;

impl LoggerFactory for DefaultLoggerFactory {
    fn create_root(&self, repository: &Weak<HierarchyInner>, level: Level) -> Logger {
        Logger::new_root(repository, level)
    }

    fn create_logger(&self, repository: &Weak<HierarchyInner>, name: String) -> Logger {
        Logger::new_regular(name, repository)
    }
}
