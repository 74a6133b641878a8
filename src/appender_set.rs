//! C3: the ordered, de-duplicated collection of appenders attached to a
//! single logger node.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::event::LoggingEvent;

/// The capability an appender implements to receive events from the
/// dispatch engine.
///
/// Concrete appenders (writing to a file, a socket, a console, ...) are
/// explicitly out of scope for this crate — they are external collaborators
/// that implement this trait. `as_attachable` is the capability-query hook a
/// forwarding appender (one that itself fans out to nested appenders) uses
/// to opt in to recursive `<appender-ref>` wiring during configuration;
/// appenders that don't forward simply use the default `None`. `as_activatable`
/// is the equivalent hook for a plugin whose options must be fully applied
/// before the appender does anything useful (e.g. opening a file handle) —
/// see [`ActivatableOptions`].
pub trait Append: fmt::Debug + Send + Sync {
    /// A name used only for diagnostics (removal by name, log messages).
    fn name(&self) -> &str;

    fn append(&self, event: &LoggingEvent) -> anyhow::Result<()>;

    /// Release any held resources. Called once, when the owning hierarchy
    /// is shut down or reconfigured. Default is a no-op.
    fn close(&self) {}

    /// Returns `Some` if this appender also forwards to nested appenders
    /// (e.g. a fan-out or async-wrapping appender), so the configurator can
    /// wire nested `<appender-ref>` elements into it.
    fn as_attachable(&self) -> Option<&dyn AttachableContainer> {
        None
    }

    /// Returns `Some` if this appender needs a one-time `activate()` call
    /// after its options are set but before it's handed to the hierarchy
    /// (e.g. an appender that only opens its output once every option has
    /// been applied). Most appenders have nothing to defer and use the
    /// default `None`.
    fn as_activatable(&self) -> Option<&dyn ActivatableOptions> {
        None
    }
}

/// An appender (or, more generally, any plugin built from XML options) whose
/// construction is split into "set options" and "activate" — mirrors
/// log4net's `IOptionHandler.ActivateOptions()`, invoked by the configurator
/// exactly once per built instance, after every `<param>`/attribute has been
/// applied and before the object is attached to any logger.
pub trait ActivatableOptions {
    fn activate(&self) -> anyhow::Result<()>;
}

/// An appender that itself holds a nested set of appenders.
pub trait AttachableContainer: Append {
    fn add_appender(&self, appender: Arc<dyn Append>);
    fn remove_appender(&self, name: &str);
    fn appenders(&self) -> Vec<Arc<dyn Append>>;
}

/// A set of appenders attached to one logger node.
///
/// Insertion order is preserved (dispatch walks appenders in the order they
/// were attached) and re-adding the same appender instance (by `Arc`
/// identity, not by name) is a no-op.
#[derive(Debug, Default)]
pub struct AppenderSet {
    appenders: RwLock<Vec<Arc<dyn Append>>>,
}

impl AppenderSet {
    pub fn new() -> AppenderSet {
        AppenderSet::default()
    }

    /// Adds `appender`, unless an appender with the same `Arc` identity is
    /// already present.
    pub fn add(&self, appender: Arc<dyn Append>) {
        let mut appenders = self.appenders.write();
        if appenders.iter().any(|a| Arc::ptr_eq(a, &appender)) {
            return;
        }
        appenders.push(appender);
    }

    /// Removes and returns the first appender whose `name()` matches, if
    /// any.
    pub fn remove_by_name(&self, name: &str) -> Option<Arc<dyn Append>> {
        let mut appenders = self.appenders.write();
        let index = appenders.iter().position(|a| a.name() == name)?;
        Some(appenders.remove(index))
    }

    /// Removes the given appender by `Arc` identity, returning whether one
    /// was found.
    pub fn remove(&self, appender: &Arc<dyn Append>) -> bool {
        let mut appenders = self.appenders.write();
        match appenders.iter().position(|a| Arc::ptr_eq(a, appender)) {
            Some(index) => {
                appenders.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes every appender without closing them.
    pub fn clear(&self) {
        self.appenders.write().clear();
    }

    /// §4.2 `close_nested_appenders`: calls `close()` on every currently
    /// attached appender that is itself an [`AttachableContainer`] (a
    /// forwarder), without removing anything. Called before [`close_all`]
    /// during shutdown so a forwarder gets a chance to flush into its own
    /// children before anything downstream of it is closed.
    pub fn close_attachable(&self) {
        for appender in self.appenders.read().iter() {
            if appender.as_attachable().is_some() {
                appender.close();
            }
        }
    }

    /// Calls `close()` on every appender, then removes them all.
    pub fn close_all(&self) {
        let appenders = std::mem::take(&mut *self.appenders.write());
        for appender in appenders {
            appender.close();
        }
    }

    /// A snapshot of the currently attached appenders, in attachment order.
    pub fn snapshot(&self) -> Vec<Arc<dyn Append>> {
        self.appenders.read().clone()
    }

    pub fn len(&self) -> usize {
        self.appenders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.appenders.read().is_empty()
    }
}
