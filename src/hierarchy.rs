//! C4: the `Hierarchy` — the named registry of logger nodes, the threshold
//! gate, and the home for the bits of global state a repository needs
//! (configured flag, properties map, renderer bindings, configuration
//! diagnostics).

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use parking_lot::RwLock;

use crate::diagnostic::{DiagnosticSeverity, DiagnosticSink, StderrDiagnosticSink};
use crate::error::{ConfigMessage, CoreError};
use crate::factory::{DefaultLoggerFactory, LoggerFactory};
use crate::level::{Level, LevelMap};
use crate::node::{Logger, ProvisionNode};

pub(crate) enum RegistrySlot {
    Materialized(Logger),
    Provision(ProvisionNode),
}

type ChangedHook = Box<dyn Fn(&Hierarchy) + Send + Sync>;
type CreatedHook = Box<dyn Fn(&Logger) + Send + Sync>;

/// The shared state behind a [`Hierarchy`] handle. Kept as a separate type
/// (rather than folded directly into `Hierarchy`) so that `Logger` can hold
/// a `Weak<HierarchyInner>` back-reference without creating a reference
/// cycle through `Hierarchy` itself.
pub struct HierarchyInner {
    root: RwLock<Option<Logger>>,
    registry: Mutex<HashMap<String, RegistrySlot>>,
    level_map: RwLock<LevelMap>,
    threshold: AtomicI64,
    configured: AtomicBool,
    emitted_no_appender_warning: AtomicBool,
    properties: RwLock<HashMap<String, String>>,
    renderers: RwLock<HashMap<String, String>>,
    configuration_messages: Mutex<Vec<ConfigMessage>>,
    diagnostic_sink: Arc<dyn DiagnosticSink>,
    factory: Box<dyn LoggerFactory>,
    on_logger_created: RwLock<Vec<CreatedHook>>,
    on_configuration_changed: RwLock<Vec<ChangedHook>>,
}

/// C4: the logger registry (called `Hierarchy` after log4net's
/// `log4net.Repository.Hierarchy.Hierarchy`, the concrete
/// `ILoggerRepository` this crate implements).
///
/// Cloning a `Hierarchy` is cheap; all clones refer to the same registry.
#[derive(Clone)]
pub struct Hierarchy(pub(crate) Arc<HierarchyInner>);

impl fmt::Debug for Hierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hierarchy")
            .field("configured", &self.configured())
            .field("threshold", &self.threshold().name())
            .finish()
    }
}

impl Default for Hierarchy {
    fn default() -> Hierarchy {
        Hierarchy::new()
    }
}

impl Hierarchy {
    pub fn new() -> Hierarchy {
        Hierarchy::with_parts(
            Arc::new(StderrDiagnosticSink),
            Box::new(DefaultLoggerFactory),
        )
    }

    pub fn with_diagnostic_sink(sink: Arc<dyn DiagnosticSink>) -> Hierarchy {
        Hierarchy::with_parts(sink, Box::new(DefaultLoggerFactory))
    }

    pub fn with_factory(factory: Box<dyn LoggerFactory>) -> Hierarchy {
        Hierarchy::with_parts(Arc::new(StderrDiagnosticSink), factory)
    }

    fn with_parts(diagnostic_sink: Arc<dyn DiagnosticSink>, factory: Box<dyn LoggerFactory>) -> Hierarchy {
        let level_map = LevelMap::new();
        let debug_level = level_map.lookup("DEBUG").expect("standard level DEBUG always present");
        let all_level = level_map.lookup("ALL").expect("standard level ALL always present");

        let inner = Arc::new(HierarchyInner {
            root: RwLock::new(None),
            registry: Mutex::new(HashMap::new()),
            level_map: RwLock::new(level_map),
            threshold: AtomicI64::new(all_level.value()),
            configured: AtomicBool::new(false),
            emitted_no_appender_warning: AtomicBool::new(false),
            properties: RwLock::new(HashMap::new()),
            renderers: RwLock::new(HashMap::new()),
            configuration_messages: Mutex::new(Vec::new()),
            diagnostic_sink,
            factory,
            on_logger_created: RwLock::new(Vec::new()),
            on_configuration_changed: RwLock::new(Vec::new()),
        });

        let weak = Arc::downgrade(&inner);
        let root = inner.factory.create_root(&weak, debug_level);
        *inner.root.write() = Some(root);

        Hierarchy(inner)
    }

    /// The root logger. Always present, always has an explicit level.
    pub fn root(&self) -> Logger {
        self.0
            .root
            .read()
            .clone()
            .expect("root logger is set for the lifetime of the Hierarchy")
    }

    /// C4 `get_logger`: returns the node for `name`, materializing it (and
    /// any missing ancestors implied by its dotted segments) if this is the
    /// first time it's been asked for.
    ///
    /// An empty name or one with a leading/trailing/doubled `.` is rejected
    /// as a programmer error — `CoreError::InvalidArgument` — since logger
    /// names are meant to mirror a static module path, not arbitrary user
    /// input.
    pub fn get_logger(&self, name: &str) -> Result<Logger, CoreError> {
        if name.is_empty() {
            return Ok(self.root());
        }
        validate_logger_name(name)?;

        let mut registry = self.0.registry.lock().unwrap();

        if let Some(slot) = registry.get(name) {
            if let RegistrySlot::Materialized(logger) = slot {
                return Ok(logger.clone());
            }
        }

        let weak = Arc::downgrade(&self.0);
        let logger = self.0.factory.create_logger(&weak, name.to_owned());

        // Pull in any descendants that provisioned ahead of us.
        if let Some(RegistrySlot::Provision(provision)) =
            registry.insert(name.to_owned(), RegistrySlot::Materialized(logger.clone()))
        {
            update_children(&provision, &logger);
        }

        update_parents(&mut registry, &self, name, &logger);

        drop(registry);

        for hook in self.0.on_logger_created.read().iter() {
            hook(&logger);
        }

        Ok(logger)
    }

    /// Returns `true` if `level` is disabled hierarchy-wide, either because
    /// no configuration has run yet or because `level` is below the
    /// configured threshold.
    pub fn is_disabled(&self, level: &Level) -> bool {
        if !self.configured() {
            return true;
        }
        level.value() < self.0.threshold.load(Ordering::SeqCst)
    }

    pub fn threshold(&self) -> Level {
        let value = self.0.threshold.load(Ordering::SeqCst);
        find_or_synthesize(&self.0.level_map.read(), value)
    }

    pub fn set_threshold(&self, level: Level) {
        self.0.threshold.store(level.value(), Ordering::SeqCst);
    }

    pub fn configured(&self) -> bool {
        self.0.configured.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_configured(&self) {
        self.0.configured.store(true, Ordering::SeqCst);
    }

    pub fn level_map(&self) -> LevelMap {
        self.0.level_map.read().clone()
    }

    pub fn level_map_mut_add(&self, name: impl Into<String>, value: i64, display_name: Option<String>) -> Level {
        self.0.level_map.write().add(name, value, display_name)
    }

    pub fn set_property(&self, name: impl Into<String>, value: impl Into<String>) {
        self.0.properties.write().insert(name.into(), value.into());
    }

    pub fn property(&self, name: &str) -> Option<String> {
        self.0.properties.read().get(name).cloned()
    }

    pub fn properties(&self) -> HashMap<String, String> {
        self.0.properties.read().clone()
    }

    /// Binds a rendering class name to the type name it renders. Actually
    /// instantiating and invoking an `ObjectRenderer` is left to an
    /// embedder; the repository only remembers the wiring.
    pub fn bind_renderer(&self, rendered_type: impl Into<String>, rendering_class: impl Into<String>) {
        self.0.renderers.write().insert(rendered_type.into(), rendering_class.into());
    }

    pub fn renderers(&self) -> HashMap<String, String> {
        self.0.renderers.read().clone()
    }

    pub(crate) fn push_config_message(&self, message: ConfigMessage) {
        self.0.configuration_messages.lock().unwrap().push(message);
    }

    pub fn configuration_messages(&self) -> Vec<String> {
        self.0
            .configuration_messages
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.to_string())
            .collect()
    }

    pub(crate) fn clear_configuration_messages(&self) {
        self.0.configuration_messages.lock().unwrap().clear();
    }

    pub(crate) fn diagnostic(&self) -> &Arc<dyn DiagnosticSink> {
        &self.0.diagnostic_sink
    }

    /// Emits the "no appenders could be found" warning the first time (and
    /// only the first time) it is observed for this hierarchy.
    pub(crate) fn try_emit_no_appenders_warning(&self, logger_name: &str) {
        if self
            .0
            .emitted_no_appender_warning
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.push_config_message(ConfigMessage::NoAppendersWarning {
                logger: logger_name.to_owned(),
            });
            self.0.diagnostic_sink.emit(
                DiagnosticSeverity::Warn,
                &format!("no appenders could be found for logger \"{logger_name}\""),
            );
        }
    }

    pub fn on_logger_created(&self, hook: impl Fn(&Logger) + Send + Sync + 'static) {
        self.0.on_logger_created.write().push(Box::new(hook));
    }

    pub fn on_configuration_changed(&self, hook: impl Fn(&Hierarchy) + Send + Sync + 'static) {
        self.0.on_configuration_changed.write().push(Box::new(hook));
    }

    pub(crate) fn fire_configuration_changed(&self) {
        for hook in self.0.on_configuration_changed.read().iter() {
            hook(self);
        }
    }

    /// Closes every appender on every materialized node (root included) and
    /// removes them, but leaves levels, additivity and the registry intact.
    /// Idempotent: calling it twice closes an empty appender set the second
    /// time.
    ///
    /// Two-phase per §4.2/§4.4: nested-attachable (forwarding) appenders are
    /// closed first, everywhere, so a forwarder gets to flush into its own
    /// children before anything is closed for good; only then is every
    /// appender (forwarders included, a harmless second `close()`, plus
    /// every remaining sink) closed and removed. The registry mutex is held
    /// only long enough to snapshot the materialized nodes — `close()` is
    /// external code and must not run while the lock is held.
    pub fn shutdown(&self) {
        let materialized = self.materialized_nodes();

        self.root().close_nested_appenders();
        for logger in &materialized {
            logger.close_nested_appenders();
        }

        self.root().close_own_appenders();
        for logger in &materialized {
            logger.close_own_appenders();
        }

        self.0.diagnostic_sink.emit(DiagnosticSeverity::Debug, "hierarchy shut down");
    }

    fn materialized_nodes(&self) -> Vec<Logger> {
        self.0
            .registry
            .lock()
            .unwrap()
            .values()
            .filter_map(|slot| match slot {
                RegistrySlot::Materialized(logger) => Some(logger.clone()),
                RegistrySlot::Provision(_) => None,
            })
            .collect()
    }

    /// C4 `reset_configuration`: restores the hierarchy to its just-
    /// constructed state — root back to `DEBUG`, threshold back to `ALL`,
    /// every other node's level cleared back to "inherited" and its
    /// additivity back to `true`, all appenders closed and removed. The
    /// `configured` flag is intentionally left untouched by this step
    /// (see module docs on `is_disabled`); callers that want "configured"
    /// to go back to `false` call it explicitly through the configurator.
    pub fn reset_configuration(&self) {
        self.shutdown();

        let debug_level = self
            .0
            .level_map
            .read()
            .lookup("DEBUG")
            .expect("standard level DEBUG always present");
        self.root().set_level(Some(debug_level));

        let all_level = self
            .0
            .level_map
            .read()
            .lookup("ALL")
            .expect("standard level ALL always present");
        self.set_threshold(all_level);

        let registry = self.0.registry.lock().unwrap();
        for slot in registry.values() {
            if let RegistrySlot::Materialized(logger) = slot {
                logger.set_level(None);
                logger.set_additivity(true);
            }
        }
        drop(registry);

        self.0.emitted_no_appender_warning.store(false, Ordering::SeqCst);
        self.0.properties.write().clear();
        self.0.renderers.write().clear();
    }
}

fn find_or_synthesize(map: &LevelMap, value: i64) -> Level {
    map.all_levels()
        .into_iter()
        .find(|l| l.value() == value)
        .unwrap_or_else(|| Level::new(format!("<{value}>"), value, None))
}

fn validate_logger_name(name: &str) -> Result<(), CoreError> {
    if name.starts_with('.') || name.ends_with('.') || name.contains("..") {
        return Err(CoreError::InvalidArgument(format!(
            "`{name}` is not a valid logger name: empty segments are not allowed"
        )));
    }
    Ok(())
}

/// Yields `name`'s ancestor names, nearest first, down to (but excluding)
/// the empty string — e.g. `"a.b.c"` yields `["a.b", "a"]`.
fn ancestor_names(name: &str) -> impl Iterator<Item = &str> {
    let mut rest = name;
    std::iter::from_fn(move || {
        let dot = rest.rfind('.')?;
        rest = &rest[..dot];
        Some(rest)
    })
}

/// C4 `update_parents`: walks `name`'s ancestor chain nearest to farthest.
/// At a Materialized slot, `logger` gets that node as its parent and the
/// walk stops. At every empty or Provision slot short of that, `logger` is
/// recorded as a pending child (creating the Provision if the slot was
/// empty) so that whichever ancestor materializes next can find it and
/// re-parent it via [`update_children`]. If no Materialized ancestor is
/// found before the chain runs out, `logger`'s parent is root.
fn update_parents(registry: &mut HashMap<String, RegistrySlot>, hierarchy: &Hierarchy, name: &str, logger: &Logger) {
    let mut nearest_ancestor: Option<Logger> = None;

    for ancestor_name in ancestor_names(name) {
        match registry.entry(ancestor_name.to_owned()) {
            Entry::Occupied(mut slot) => match slot.get_mut() {
                RegistrySlot::Materialized(ancestor) => {
                    nearest_ancestor = Some(ancestor.clone());
                    break;
                }
                RegistrySlot::Provision(provision) => {
                    provision.children.push(logger.clone());
                }
            },
            Entry::Vacant(slot) => {
                let mut provision = ProvisionNode::new();
                provision.children.push(logger.clone());
                slot.insert(RegistrySlot::Provision(provision));
            }
        }
    }

    let parent = nearest_ancestor.unwrap_or_else(|| hierarchy.root());
    logger.set_parent(parent);
}

/// C4 `update_children`: re-parents every child recorded on a provision
/// node onto the logger that just replaced it, but only the children that
/// don't already have a *closer* materialized ancestor than `logger`.
fn update_children(provision: &ProvisionNode, logger: &Logger) {
    for child in &provision.children {
        match child.parent() {
            Some(current_parent) if is_closer_ancestor(logger.name(), current_parent.name(), child.name()) => {}
            _ => child.set_parent(logger.clone()),
        }
    }
}

fn is_closer_ancestor(candidate: &str, current: &str, of_name: &str) -> bool {
    // `current` is a closer ancestor of `of_name` than `candidate` iff it is
    // itself a proper descendant of `candidate` (i.e. prefixed by
    // `candidate` plus a `.` separator), meaning it sits between `candidate`
    // and `of_name` in the tree. The separator check avoids a false match
    // like `candidate = "a"` against `current = "ab"`.
    let _ = of_name;
    let prefix = format!("{candidate}.");
    current.starts_with(&prefix)
}
