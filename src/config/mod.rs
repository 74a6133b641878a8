//! Configuration surface: the reflection-free plugin registry ([`plugin`])
//! and the XML configurator built on top of it ([`xml`]).

pub mod plugin;
pub mod xml;

pub use self::plugin::{AppenderPlugin, PluginOptions, PluginRegistry, PluginValue};
pub use self::xml::XmlConfigurator;
