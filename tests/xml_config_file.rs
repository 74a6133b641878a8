//! Configuring a [`Hierarchy`] from an XML document read off disk, the way
//! an embedder's own config-loading wrapper would call into
//! `XmlConfigurator` after reading a real config file (file-watching itself
//! is out of scope for this crate; reading one file once is not).

mod support;

use std::fs;
use std::io::Write;
use std::sync::Arc;

use loghier::appender_set::Append;
use loghier::config::plugin::PluginRegistry;
use loghier::config::xml::XmlConfigurator;
use loghier::Hierarchy;
use support::RecordingAppender;

fn plugins() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register_fn("recording", |name, _options| Ok(Arc::new(RecordingAppender::new(name))));
    registry
}

#[test]
fn configure_from_file_on_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
        <log4net threshold="INFO">
          <appender name="A1" type="recording" />
          <logger name="billing.invoices" additivity="false">
            <level value="WARN" />
            <appender-ref ref="A1" />
          </logger>
          <root>
            <level value="DEBUG" />
            <appender-ref ref="A1" />
          </root>
        </log4net>
        "#
    )
    .unwrap();

    let xml = fs::read_to_string(file.path()).unwrap();

    let hierarchy = Hierarchy::new();
    let plugins = plugins();
    XmlConfigurator::new(&plugins).configure(&hierarchy, &xml).unwrap();

    assert!(hierarchy.configured());
    assert_eq!(hierarchy.threshold(), hierarchy.level_map().lookup("INFO").unwrap());

    let invoices = hierarchy.get_logger("billing.invoices").unwrap();
    assert!(!invoices.additivity());
    assert_eq!(invoices.effective_level(), hierarchy.level_map().lookup("WARN").unwrap());
    assert_eq!(invoices.appenders().len(), 1);
}

#[test]
fn reapplying_same_config_in_merge_mode_is_idempotent() {
    let xml = r#"
        <log4net>
          <appender name="A1" type="recording" />
          <root>
            <level value="INFO" />
            <appender-ref ref="A1" />
          </root>
        </log4net>
    "#;

    let hierarchy = Hierarchy::new();
    let plugins = plugins();
    let configurator = XmlConfigurator::new(&plugins);

    configurator.configure(&hierarchy, xml).unwrap();
    let first_identity = hierarchy.root().appenders()[0].name().to_owned();

    configurator.configure(&hierarchy, xml).unwrap();
    let appenders = hierarchy.root().appenders();
    assert_eq!(appenders.len(), 1);
    assert_eq!(appenders[0].name(), first_identity);
}
