//! C5: the dispatch engine — effective level resolution, the enabled-for
//! check, and the additivity-governed appender walk. Folded into an
//! `impl Logger` block (rather than a free-standing type) since every
//! operation here is answered in terms of a single logger node and the
//! hierarchy it belongs to.

use crate::error::CoreError;
use crate::event::{LoggingEvent, MessageObject};
use crate::hierarchy::Hierarchy;
use crate::level::Level;
use crate::node::Logger;

impl Logger {
    fn repository(&self) -> Option<Hierarchy> {
        self.repository_weak().upgrade().map(Hierarchy)
    }

    /// C5 `effective_level`: this node's own level if set, otherwise the
    /// nearest ancestor's. The root always has an explicit level, so this
    /// always terminates.
    pub fn effective_level(&self) -> Level {
        let mut current = self.clone();
        loop {
            if let Some(level) = current.level() {
                return level;
            }
            current = current
                .parent()
                .expect("a non-root logger with no explicit level always has a parent");
        }
    }

    /// C5 `is_enabled_for`: `level` passes both the hierarchy-wide threshold
    /// gate and this node's own effective level.
    pub fn is_enabled_for(&self, level: &Level) -> bool {
        match self.repository() {
            Some(repository) => !repository.is_disabled(level) && *level >= self.effective_level(),
            // The owning hierarchy has been dropped; there is nowhere to
            // dispatch to, so treat every level as disabled.
            None => false,
        }
    }

    /// Convenience entry point: builds a [`LoggingEvent`] and dispatches it,
    /// but only if `level` passes [`Logger::is_enabled_for`] — avoiding the
    /// event construction entirely when nothing would observe it.
    #[track_caller]
    pub fn log(&self, level: Level, message: MessageObject) {
        if !self.is_enabled_for(&level) {
            return;
        }
        let event = LoggingEvent::builder(self.name().to_owned(), level, message).build();
        self.call_appenders(&event);
    }

    /// The §7 "null event" entry point used by higher-level convenience
    /// wrappers: dispatches a pre-built event, or rejects `None` as a
    /// programmer error.
    pub fn dispatch_event(&self, event: Option<LoggingEvent>) -> Result<(), CoreError> {
        let event = event.ok_or_else(|| CoreError::InvalidArgument("logging event must not be null".to_owned()))?;
        if self.is_enabled_for(event.level()) {
            self.call_appenders(&event);
        }
        Ok(())
    }

    /// C5 `call_appenders`: walks from this node up through its ancestors,
    /// invoking every attached appender's `append`, stopping as soon as a
    /// node with `additivity == false` has had its own appenders invoked.
    /// If the walk reaches the root without ever finding an appender, the
    /// hierarchy's one-shot "no appenders found" diagnostic fires.
    pub(crate) fn call_appenders(&self, event: &LoggingEvent) {
        let mut found_appender = false;
        let mut current = Some(self.clone());

        while let Some(node) = current {
            for appender in node.appenders() {
                found_appender = true;
                if let Err(err) = appender.append(event) {
                    if let Some(repository) = self.repository() {
                        repository.push_config_message(crate::error::ConfigMessage::AppenderError {
                            appender: appender.name().to_owned(),
                            detail: err.to_string(),
                        });
                    }
                }
            }

            if !node.additivity() {
                break;
            }
            current = node.parent();
        }

        if !found_appender {
            if let Some(repository) = self.repository() {
                repository.try_emit_no_appenders_warning(self.name());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appender_set::Append;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug)]
    struct CountingAppender {
        name: &'static str,
        count: Mutex<usize>,
    }

    impl CountingAppender {
        fn new(name: &'static str) -> Arc<CountingAppender> {
            Arc::new(CountingAppender {
                name,
                count: Mutex::new(0),
            })
        }

        fn count(&self) -> usize {
            *self.count.lock()
        }
    }

    impl Append for CountingAppender {
        fn name(&self) -> &str {
            self.name
        }
        fn append(&self, _event: &LoggingEvent) -> anyhow::Result<()> {
            *self.count.lock() += 1;
            Ok(())
        }
    }

    #[test]
    fn additivity_chain_reaches_every_ancestor() {
        let h = Hierarchy::new();
        h.mark_configured();

        let root_appender = CountingAppender::new("root");
        h.root().add_appender(root_appender.clone());

        let mid_appender = CountingAppender::new("mid");
        let mid = h.get_logger("a.b").unwrap();
        mid.add_appender(mid_appender.clone());

        let leaf = h.get_logger("a.b.c").unwrap();
        leaf.log(h.level_map().lookup("INFO").unwrap(), Arc::new("hi"));

        assert_eq!(mid_appender.count(), 1);
        assert_eq!(root_appender.count(), 1);
    }

    #[test]
    fn additivity_off_blocks_ancestors() {
        let h = Hierarchy::new();
        h.mark_configured();

        let root_appender = CountingAppender::new("root");
        h.root().add_appender(root_appender.clone());

        let mid_appender = CountingAppender::new("mid");
        let mid = h.get_logger("a.b").unwrap();
        mid.add_appender(mid_appender.clone());
        mid.set_additivity(false);

        let leaf = h.get_logger("a.b.c").unwrap();
        leaf.log(h.level_map().lookup("INFO").unwrap(), Arc::new("hi"));

        assert_eq!(mid_appender.count(), 1);
        assert_eq!(root_appender.count(), 0);
    }

    #[test]
    fn threshold_gates_dispatch() {
        let h = Hierarchy::new();
        h.mark_configured();
        h.set_threshold(h.level_map().lookup("ERROR").unwrap());

        let appender = CountingAppender::new("root");
        h.root().add_appender(appender.clone());

        let logger = h.get_logger("a").unwrap();
        logger.log(h.level_map().lookup("WARN").unwrap(), Arc::new("below threshold"));
        assert_eq!(appender.count(), 0);

        logger.log(h.level_map().lookup("ERROR").unwrap(), Arc::new("at threshold"));
        assert_eq!(appender.count(), 1);
    }

    #[test]
    fn unconfigured_hierarchy_disables_everything() {
        let h = Hierarchy::new();
        let appender = CountingAppender::new("root");
        h.root().add_appender(appender.clone());

        let logger = h.get_logger("a").unwrap();
        logger.log(h.level_map().lookup("FATAL").unwrap(), Arc::new("nobody hears this"));
        assert_eq!(appender.count(), 0);
    }

    #[test]
    fn inherited_level_resolves_through_ancestors() {
        let h = Hierarchy::new();
        h.mark_configured();
        let mid = h.get_logger("a.b").unwrap();
        mid.set_level(Some(h.level_map().lookup("WARN").unwrap()));
        let leaf = h.get_logger("a.b.c").unwrap();
        assert_eq!(leaf.effective_level(), h.level_map().lookup("WARN").unwrap());
    }
}
