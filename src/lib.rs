//! `loghier` — the core of a hierarchical, XML-configurable logger registry.
//!
//! This crate is deliberately narrow: it owns the named logger tree, the
//! level vocabulary, additivity-governed dispatch, and a reflection-free XML
//! configurator. Concrete appenders, layouts/encoders, filter chains, and a
//! process-global façade are external collaborators that plug in through the
//! capability traits in [`appender_set`] and [`config::plugin`] — none of
//! that surface ships here.
//!
//! ```
//! use std::sync::Arc;
//! use loghier::{Hierarchy, config::plugin::PluginRegistry};
//!
//! let hierarchy = Hierarchy::new();
//! let mut plugins = PluginRegistry::new();
//! // An embedder registers its own appender constructors under whatever
//! // `type="..."` string its configuration uses.
//! plugins.register_fn("null", |name, _options| {
//!     #[derive(Debug)]
//!     struct NullAppender(String);
//!     impl loghier::appender_set::Append for NullAppender {
//!         fn name(&self) -> &str { &self.0 }
//!         fn append(&self, _event: &loghier::event::LoggingEvent) -> anyhow::Result<()> {
//!             Ok(())
//!         }
//!     }
//!     Ok(Arc::new(NullAppender(name.to_owned())))
//! });
//!
//! let xml = r#"
//!     <log4net>
//!       <appender name="A1" type="null" />
//!       <root>
//!         <level value="INFO" />
//!         <appender-ref ref="A1" />
//!       </root>
//!     </log4net>
//! "#;
//! loghier::config::xml::XmlConfigurator::new(&plugins).configure(&hierarchy, xml).unwrap();
//! assert!(hierarchy.configured());
//! ```

pub mod appender_set;
pub mod config;
pub mod diagnostic;
mod dispatch;
pub mod error;
pub mod event;
pub mod factory;
mod hierarchy;
pub mod level;
pub mod node;

pub use crate::error::CoreError;
pub use crate::event::{LoggingEvent, Message, MessageObject};
pub use crate::factory::{DefaultLoggerFactory, LoggerFactory};
pub use crate::hierarchy::Hierarchy;
pub use crate::level::{Level, LevelMap};
pub use crate::node::Logger;
