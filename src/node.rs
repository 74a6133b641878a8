//! C2: the logger node itself. `Logger` is the cheaply-cloneable handle
//! callers and the registry both hold; `ProvisionNode` is the registry-only
//! placeholder used for a descendant that registers before its nearest
//! ancestor does.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::appender_set::{Append, AppenderSet};
use crate::hierarchy::HierarchyInner;
use crate::level::Level;

struct LoggerInner {
    name: String,
    is_root: bool,
    level: RwLock<Option<Level>>,
    additive: AtomicBool,
    appenders: AppenderSet,
    parent: RwLock<Option<Logger>>,
    repository: Weak<HierarchyInner>,
}

/// A handle to one node in the logger tree.
///
/// Cloning a `Logger` is cheap (it's a reference-counted pointer to shared
/// state); every clone refers to the same node. Two loggers obtained by
/// name from the same [`crate::Hierarchy`] are therefore always the same
/// node, which is what makes `additivity` and per-node appenders behave
/// consistently no matter how many times a caller asks for "a.b.c".
#[derive(Clone)]
pub struct Logger(Arc<LoggerInner>);

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.0.name)
            .field("is_root", &self.0.is_root)
            .finish()
    }
}

impl PartialEq for Logger {
    fn eq(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Logger {}

impl Logger {
    pub(crate) fn new_root(repository: &Weak<HierarchyInner>, level: Level) -> Logger {
        Logger(Arc::new(LoggerInner {
            name: "root".to_owned(),
            is_root: true,
            level: RwLock::new(Some(level)),
            additive: AtomicBool::new(true),
            appenders: AppenderSet::new(),
            parent: RwLock::new(None),
            repository: repository.clone(),
        }))
    }

    pub(crate) fn new_regular(name: String, repository: &Weak<HierarchyInner>) -> Logger {
        Logger(Arc::new(LoggerInner {
            name,
            is_root: false,
            level: RwLock::new(None),
            additive: AtomicBool::new(true),
            appenders: AppenderSet::new(),
            parent: RwLock::new(None),
            repository: repository.clone(),
        }))
    }

    pub(crate) fn repository_weak(&self) -> &Weak<HierarchyInner> {
        &self.0.repository
    }

    pub(crate) fn set_parent(&self, parent: Logger) {
        *self.0.parent.write() = Some(parent);
    }

    pub fn is_root(&self) -> bool {
        self.0.is_root
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn parent(&self) -> Option<Logger> {
        self.0.parent.read().clone()
    }

    /// The level explicitly assigned to this node, if any. `None` means
    /// "inherit from the nearest ancestor with an explicit level" — see
    /// [`Logger::effective_level`].
    pub fn level(&self) -> Option<Level> {
        self.0.level.read().clone()
    }

    /// Sets this node's explicit level. The root logger cannot be set back
    /// to "inherited" (there is nothing above it to inherit from), so a
    /// `None` passed to the root is silently ignored.
    pub fn set_level(&self, level: Option<Level>) {
        if self.0.is_root && level.is_none() {
            return;
        }
        *self.0.level.write() = level;
    }

    pub fn additivity(&self) -> bool {
        self.0.additive.load(Ordering::SeqCst)
    }

    pub fn set_additivity(&self, additive: bool) {
        self.0.additive.store(additive, Ordering::SeqCst);
    }

    pub fn add_appender(&self, appender: Arc<dyn Append>) {
        self.0.appenders.add(appender);
    }

    pub fn remove_appender_by_name(&self, name: &str) -> Option<Arc<dyn Append>> {
        self.0.appenders.remove_by_name(name)
    }

    /// Removes `appender` by `Arc` identity (as opposed to by name, which
    /// can match more than one attached instance — see
    /// [`AppenderSet::add`]'s note on duplicate names).
    pub fn remove_appender(&self, appender: &Arc<dyn Append>) -> bool {
        self.0.appenders.remove(appender)
    }

    pub fn remove_all_appenders(&self) {
        self.0.appenders.clear();
    }

    pub fn appenders(&self) -> Vec<Arc<dyn Append>> {
        self.0.appenders.snapshot()
    }

    pub fn has_appenders(&self) -> bool {
        !self.0.appenders.is_empty()
    }

    /// §4.2 `close_nested_appenders`: closes only this node's attached
    /// appenders that are themselves [`crate::appender_set::AttachableContainer`]s,
    /// without removing anything. Used by [`crate::Hierarchy::shutdown`]'s
    /// first phase so a forwarder flushes into its children before those
    /// children (or the forwarder itself) are closed for good.
    pub(crate) fn close_nested_appenders(&self) {
        self.0.appenders.close_attachable();
    }

    pub(crate) fn close_own_appenders(&self) {
        self.0.appenders.close_all();
    }
}

/// A registry-internal placeholder standing in for a node that hasn't been
/// materialized yet, holding the already-materialized descendants waiting
/// to be re-parented onto it once it is.
#[derive(Default)]
pub(crate) struct ProvisionNode {
    pub(crate) children: Vec<Logger>,
}

impl ProvisionNode {
    pub(crate) fn new() -> ProvisionNode {
        ProvisionNode::default()
    }
}
