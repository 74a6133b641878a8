//! The reflection-free stand-in for a `serde`-based config tree: a
//! `kind` string keyed registry of appender constructors, each consuming a
//! flat list of name/value options collected while walking the XML.
//!
//! Concrete appenders aren't part of this crate's public surface (they're
//! external collaborators, per the crate's scope), so `PluginRegistry`
//! starts out empty — an embedder registers its own appenders'
//! constructors under whatever `kind` string it wants its XML to spell.

use std::collections::HashMap;
use std::sync::Arc;

use crate::appender_set::Append;

/// A single `<param>` value, or a nested block of them (for appenders that
/// take structured options, e.g. a nested `<layout>`).
#[derive(Clone, Debug)]
pub enum PluginValue {
    Text(String),
    Nested(Vec<(String, PluginValue)>),
}

impl PluginValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PluginValue::Text(s) => Some(s),
            PluginValue::Nested(_) => None,
        }
    }
}

/// The flattened option list a plugin's `build` receives: the `<param
/// name=".." value="..">` children (and any other nested, non-reserved
/// elements) of its `<appender>` block, in document order.
pub type PluginOptions = [(String, PluginValue)];

/// Builds one kind of appender from its XML options.
///
/// Grounded on the same shape as a `Deserializers`-registered deserializer:
/// a name-keyed constructor that turns loosely-typed configuration into a
/// boxed trait object, except there is no static `Config` struct per
/// plugin to deserialize into — options arrive as a flat list because
/// that's what an XML element's children naturally are.
pub trait AppenderPlugin: Send + Sync {
    fn build(&self, name: &str, options: &PluginOptions) -> anyhow::Result<Arc<dyn Append>>;
}

impl<F> AppenderPlugin for F
where
    F: Fn(&str, &PluginOptions) -> anyhow::Result<Arc<dyn Append>> + Send + Sync,
{
    fn build(&self, name: &str, options: &PluginOptions) -> anyhow::Result<Arc<dyn Append>> {
        self(name, options)
    }
}

/// A name → constructor map the [`super::xml::XmlConfigurator`] consults
/// when it encounters an `<appender type="...">` it hasn't built yet.
#[derive(Default)]
pub struct PluginRegistry {
    appenders: HashMap<String, Arc<dyn AppenderPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> PluginRegistry {
        PluginRegistry::default()
    }

    pub fn register(&mut self, kind: impl Into<String>, plugin: Arc<dyn AppenderPlugin>) {
        self.appenders.insert(kind.into(), plugin);
    }

    pub fn register_fn(
        &mut self,
        kind: impl Into<String>,
        build: impl Fn(&str, &PluginOptions) -> anyhow::Result<Arc<dyn Append>> + Send + Sync + 'static,
    ) {
        self.register(kind, Arc::new(build));
    }

    pub fn build_appender(&self, kind: &str, name: &str, options: &PluginOptions) -> anyhow::Result<Arc<dyn Append>> {
        let plugin = self
            .appenders
            .get(kind)
            .ok_or_else(|| anyhow::anyhow!("no appender plugin registered for kind `{kind}`"))?;
        plugin.build(name, options)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.appenders.contains_key(kind)
    }
}
