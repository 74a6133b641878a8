//! The numbered end-to-end scenarios from the hierarchy's testable
//! properties: additivity chains, additivity cutoffs, the threshold gate,
//! descendant-first registration, inherited-level resolution, and reset
//! semantics.

mod support;

use std::sync::Arc;

use loghier::Hierarchy;
use support::{CountingAppender, FailingAppender};

fn level(h: &Hierarchy, name: &str) -> loghier::Level {
    h.level_map().lookup(name).unwrap_or_else(|| panic!("missing standard level {name}"))
}

#[test]
fn scenario_1_additivity_chain() {
    let h = Hierarchy::new();
    h.mark_configured();

    let ca = Arc::new(CountingAppender::new("CA"));
    h.get_logger("a").unwrap().add_appender(ca.clone());

    h.get_logger("a.b.c").unwrap().log(level(&h, "DEBUG"), Arc::new("one"));
    assert_eq!(ca.count(), 1);

    h.get_logger("a.b").unwrap().log(level(&h, "INFO"), Arc::new("two"));
    assert_eq!(ca.count(), 2);
}

#[test]
fn scenario_2_additivity_off_blocks_above_but_not_below() {
    let h = Hierarchy::new();
    h.mark_configured();

    let root_ca = Arc::new(CountingAppender::new("root"));
    h.root().add_appender(root_ca.clone());
    let a_ca = Arc::new(CountingAppender::new("a"));
    h.get_logger("a").unwrap().add_appender(a_ca.clone());
    let abc_ca = Arc::new(CountingAppender::new("abc"));
    h.get_logger("a.b.c").unwrap().add_appender(abc_ca.clone());

    h.get_logger("a.b").unwrap().set_additivity(false);

    h.get_logger("a").unwrap().log(level(&h, "DEBUG"), Arc::new("1"));
    assert_eq!((root_ca.count(), a_ca.count(), abc_ca.count()), (1, 1, 0));

    h.get_logger("a.b").unwrap().log(level(&h, "DEBUG"), Arc::new("2"));
    assert_eq!((root_ca.count(), a_ca.count(), abc_ca.count()), (1, 1, 0));

    h.get_logger("a.b.c").unwrap().log(level(&h, "DEBUG"), Arc::new("3"));
    assert_eq!((root_ca.count(), a_ca.count(), abc_ca.count()), (1, 1, 1));
}

#[test]
fn scenario_3_threshold_gate() {
    let h = Hierarchy::new();
    let ca = Arc::new(CountingAppender::new("root"));
    h.root().add_appender(ca.clone());

    h.set_threshold(level(&h, "INFO"));
    h.mark_configured();

    h.root().log(level(&h, "DEBUG"), Arc::new("below"));
    assert_eq!(ca.count(), 0);

    h.root().log(level(&h, "INFO"), Arc::new("at"));
    assert_eq!(ca.count(), 1);

    h.root().log(level(&h, "FATAL"), Arc::new("above"));
    assert_eq!(ca.count(), 2);

    h.set_threshold(level(&h, "OFF"));
    h.root().log(level(&h, "FATAL"), Arc::new("now suppressed"));
    assert_eq!(ca.count(), 2);
}

#[test]
fn scenario_4_descendant_first_creation() {
    let h = Hierarchy::new();
    let abc = h.get_logger("a.b.c").unwrap();
    let ab = h.get_logger("a.b").unwrap();
    let a = h.get_logger("a").unwrap();

    assert_eq!(abc.parent().unwrap(), ab);
    assert_eq!(ab.parent().unwrap(), a);
    assert_eq!(a.parent().unwrap(), h.root());
}

#[test]
fn scenario_5_inherited_level() {
    let h = Hierarchy::new();
    h.root().set_level(Some(level(&h, "WARN")));
    let abc = h.get_logger("a.b.c").unwrap();
    assert_eq!(abc.effective_level(), level(&h, "WARN"));

    h.get_logger("a").unwrap().set_level(Some(level(&h, "ERROR")));
    assert_eq!(abc.effective_level(), level(&h, "ERROR"));
}

#[test]
fn scenario_6_reset_restores_defaults() {
    let h = Hierarchy::new();
    h.mark_configured();
    h.set_threshold(level(&h, "ERROR"));
    let a = h.get_logger("a").unwrap();
    a.set_level(Some(level(&h, "WARN")));
    a.set_additivity(false);
    a.add_appender(Arc::new(CountingAppender::new("x")));

    h.reset_configuration();

    assert!(a.level().is_none());
    assert!(a.additivity());
    assert!(a.appenders().is_empty());
    assert_eq!(h.root().level().unwrap(), level(&h, "DEBUG"));
    assert_eq!(h.threshold(), level(&h, "ALL"));
}

#[test]
fn registration_order_does_not_affect_final_tree_shape() {
    let h1 = Hierarchy::new();
    h1.get_logger("a").unwrap();
    h1.get_logger("a.b.c").unwrap();

    let h2 = Hierarchy::new();
    h2.get_logger("a.b.c").unwrap();
    h2.get_logger("a").unwrap();

    for h in [&h1, &h2] {
        let a = h.get_logger("a").unwrap();
        let abc = h.get_logger("a.b.c").unwrap();
        assert_eq!(a.parent().unwrap(), h.root());
        assert_eq!(abc.parent().unwrap(), a);
    }
}

#[test]
fn shutdown_is_idempotent() {
    let h = Hierarchy::new();
    h.root().add_appender(Arc::new(CountingAppender::new("x")));
    h.shutdown();
    assert!(h.root().appenders().is_empty());
    h.shutdown();
    assert!(h.root().appenders().is_empty());
}

#[test]
fn failing_appender_does_not_block_its_siblings() {
    let h = Hierarchy::new();
    h.mark_configured();

    h.root().add_appender(Arc::new(FailingAppender::new("boom")));
    let ok = Arc::new(CountingAppender::new("ok"));
    h.root().add_appender(ok.clone());

    h.root().log(level(&h, "INFO"), Arc::new("message"));

    assert_eq!(ok.count(), 1);
    assert!(h
        .configuration_messages()
        .iter()
        .any(|m| m.contains("boom")));
}

#[test]
fn no_appenders_warning_fires_once() {
    let h = Hierarchy::new();
    h.mark_configured();

    h.get_logger("a").unwrap().log(level(&h, "INFO"), Arc::new("1"));
    h.get_logger("b").unwrap().log(level(&h, "INFO"), Arc::new("2"));

    let warnings = h
        .configuration_messages()
        .into_iter()
        .filter(|m| m.contains("no appenders"))
        .count();
    assert_eq!(warnings, 1);
}
