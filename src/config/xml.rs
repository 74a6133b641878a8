//! C6: the XML configurator. Walks a `<log4net>` document with
//! `roxmltree` and wires up a [`Hierarchy`] from it — loggers, levels,
//! additivity, appenders (built through a [`PluginRegistry`]), renderer
//! bindings and repository-wide properties.
//!
//! Every element-level problem (a missing `name`, a dangling
//! `appender-ref`, a plugin that fails to build) is recorded as a
//! [`ConfigMessage`] and the walk continues; only a document that isn't
//! well-formed XML, or doesn't have a `<log4net>` root, aborts the whole
//! configure.

use std::collections::HashMap;

use roxmltree::Node;

use crate::config::plugin::{PluginRegistry, PluginValue};
use crate::error::ConfigMessage;
use crate::hierarchy::Hierarchy;

/// Configures a [`Hierarchy`] from a `<log4net>` XML document.
pub struct XmlConfigurator<'a> {
    plugins: &'a PluginRegistry,
}

impl<'a> XmlConfigurator<'a> {
    pub fn new(plugins: &'a PluginRegistry) -> XmlConfigurator<'a> {
        XmlConfigurator { plugins }
    }

    /// Parses `xml` and applies it to `hierarchy`.
    ///
    /// Returns `Err` only for a malformed document or a missing
    /// `<log4net>` root — both of which leave nothing sensible to iterate.
    /// Everything else that goes wrong while interpreting individual
    /// elements is pushed onto `hierarchy.configuration_messages()` instead.
    pub fn configure(&self, hierarchy: &Hierarchy, xml: &str) -> Result<(), ConfigMessage> {
        let doc = roxmltree::Document::parse(xml).map_err(|e| ConfigMessage::ConfigError(e.to_string()))?;
        let root_el = doc.root_element();
        if root_el.tag_name().name() != "log4net" {
            return Err(ConfigMessage::ConfigError(
                "document is missing its <log4net> root element".to_owned(),
            ));
        }

        let overwrite = root_el
            .attribute("update")
            .map(|v| v.eq_ignore_ascii_case("overwrite"))
            .unwrap_or(false);
        if overwrite {
            hierarchy.reset_configuration();
            hierarchy.clear_configuration_messages();
        }

        let mut seen_category_alias = false;
        let mut seen_config_debug_alias = false;

        if root_el.attribute("configDebug").is_some() && root_el.attribute("debug").is_none() {
            seen_config_debug_alias = true;
        }

        let appender_elements = collect_appender_elements(root_el);
        let mut built_appenders = HashMap::new();

        for child in element_children(root_el) {
            match child.tag_name().name() {
                "appender" => {}
                "logger" => self.configure_named_logger(hierarchy, child, &appender_elements, &mut built_appenders, false),
                "category" => {
                    seen_category_alias = true;
                    self.configure_named_logger(hierarchy, child, &appender_elements, &mut built_appenders, false);
                }
                "root" => self.configure_named_logger(hierarchy, child, &appender_elements, &mut built_appenders, true),
                "renderer" => self.configure_renderer(hierarchy, child),
                "param" => self.configure_param(hierarchy, child),
                "threshold" => {}
                _other => self.configure_param(hierarchy, child),
            }
        }

        if let Some(threshold_name) = root_el.attribute("threshold") {
            match hierarchy.level_map().lookup(threshold_name) {
                Some(level) => hierarchy.set_threshold(level),
                None => hierarchy.push_config_message(ConfigMessage::ConfigElementError {
                    element: "log4net".to_owned(),
                    detail: format!("unknown threshold level `{threshold_name}`"),
                }),
            }
        }

        if seen_category_alias {
            hierarchy.push_config_message(ConfigMessage::DeprecatedAlias {
                old: "category".to_owned(),
                new: "logger".to_owned(),
            });
        }
        if seen_config_debug_alias {
            hierarchy.push_config_message(ConfigMessage::DeprecatedAlias {
                old: "configDebug".to_owned(),
                new: "debug".to_owned(),
            });
        }

        hierarchy.mark_configured();
        hierarchy.fire_configuration_changed();
        Ok(())
    }

    fn configure_named_logger<'d>(
        &self,
        hierarchy: &Hierarchy,
        elem: Node<'d, 'd>,
        appender_elements: &HashMap<String, Node<'d, 'd>>,
        built_appenders: &mut HashMap<String, std::sync::Arc<dyn crate::appender_set::Append>>,
        is_root: bool,
    ) {
        let logger = if is_root {
            hierarchy.root()
        } else {
            let name = match elem.attribute("name") {
                Some(n) => n,
                None => {
                    hierarchy.push_config_message(ConfigMessage::ConfigElementError {
                        element: elem.tag_name().name().to_owned(),
                        detail: "missing required `name` attribute".to_owned(),
                    });
                    return;
                }
            };
            match hierarchy.get_logger(name) {
                Ok(logger) => logger,
                Err(e) => {
                    hierarchy.push_config_message(ConfigMessage::ConfigElementError {
                        element: "logger".to_owned(),
                        detail: e.to_string(),
                    });
                    return;
                }
            }
        };

        if !is_root {
            if let Some(additivity) = elem.attribute("additivity") {
                match parse_bool(additivity) {
                    Some(value) => logger.set_additivity(value),
                    None => hierarchy.push_config_message(ConfigMessage::ConfigElementError {
                        element: "logger".to_owned(),
                        detail: format!("invalid additivity value `{additivity}`"),
                    }),
                }
            }
        }

        // A <logger>/<root> block fully replaces the node's appender set.
        logger.remove_all_appenders();

        for child in element_children(elem) {
            match child.tag_name().name() {
                "level" | "priority" => self.apply_level(hierarchy, &logger, child, is_root),
                "appender-ref" => {
                    self.apply_appender_ref(hierarchy, &logger, child, appender_elements, built_appenders)
                }
                _ => {}
            }
        }
    }

    fn apply_level(&self, hierarchy: &Hierarchy, logger: &crate::node::Logger, elem: Node, is_root: bool) {
        let value = match elem.attribute("value") {
            Some(v) => v,
            None => {
                hierarchy.push_config_message(ConfigMessage::ConfigElementError {
                    element: elem.tag_name().name().to_owned(),
                    detail: "missing required `value` attribute".to_owned(),
                });
                return;
            }
        };

        if value.eq_ignore_ascii_case("inherited") || value.eq_ignore_ascii_case("null") {
            if is_root {
                hierarchy.push_config_message(ConfigMessage::ConfigElementError {
                    element: "root".to_owned(),
                    detail: "the root logger's level cannot be `inherited`".to_owned(),
                });
            } else {
                logger.set_level(None);
            }
            return;
        }

        match hierarchy.level_map().lookup(value) {
            Some(level) => logger.set_level(Some(level)),
            None => hierarchy.push_config_message(ConfigMessage::ConfigElementError {
                element: elem.tag_name().name().to_owned(),
                detail: format!("unknown level `{value}`"),
            }),
        }
    }

    fn apply_appender_ref<'d>(
        &self,
        hierarchy: &Hierarchy,
        logger: &crate::node::Logger,
        elem: Node<'d, 'd>,
        appender_elements: &HashMap<String, Node<'d, 'd>>,
        built_appenders: &mut HashMap<String, std::sync::Arc<dyn crate::appender_set::Append>>,
    ) {
        let ref_name = match elem.attribute("ref") {
            Some(r) => r,
            None => {
                hierarchy.push_config_message(ConfigMessage::ConfigElementError {
                    element: "appender-ref".to_owned(),
                    detail: "missing required `ref` attribute".to_owned(),
                });
                return;
            }
        };

        match self.resolve_appender(hierarchy, ref_name, appender_elements, built_appenders) {
            Some(appender) => logger.add_appender(appender),
            None => hierarchy.push_config_message(ConfigMessage::ConfigElementError {
                element: "appender-ref".to_owned(),
                detail: format!("no <appender name=\"{ref_name}\"> found"),
            }),
        }
    }

    fn resolve_appender<'d>(
        &self,
        hierarchy: &Hierarchy,
        name: &str,
        appender_elements: &HashMap<String, Node<'d, 'd>>,
        built_appenders: &mut HashMap<String, std::sync::Arc<dyn crate::appender_set::Append>>,
    ) -> Option<std::sync::Arc<dyn crate::appender_set::Append>> {
        if let Some(appender) = built_appenders.get(name) {
            return Some(appender.clone());
        }

        let elem = *appender_elements.get(name)?;
        let kind = match elem.attribute("type") {
            Some(k) => k,
            None => {
                hierarchy.push_config_message(ConfigMessage::ConfigElementError {
                    element: "appender".to_owned(),
                    detail: format!("appender `{name}` is missing its required `type` attribute"),
                });
                return None;
            }
        };

        let options = collect_options(elem);
        let appender = match self.plugins.build_appender(kind, name, &options) {
            Ok(appender) => appender,
            Err(err) => {
                hierarchy.push_config_message(ConfigMessage::AppenderError {
                    appender: name.to_owned(),
                    detail: err.to_string(),
                });
                return None;
            }
        };

        // Nested `<appender-ref>`s are part of this appender's configuration
        // (log4net parses them before calling `ActivateOptions`), so they're
        // wired in before `activate()` runs below — a forwarder that
        // validates or initializes against its child set must not see an
        // empty one.
        if let Some(attachable) = appender.as_attachable() {
            for nested_ref in element_children(elem).filter(|n| n.tag_name().name() == "appender-ref") {
                match nested_ref.attribute("ref") {
                    Some(nested_name) => {
                        match self.resolve_appender(hierarchy, nested_name, appender_elements, built_appenders) {
                            Some(nested) => attachable.add_appender(nested),
                            None => hierarchy.push_config_message(ConfigMessage::ConfigElementError {
                                element: "appender-ref".to_owned(),
                                detail: format!("no <appender name=\"{nested_name}\"> found"),
                            }),
                        }
                    }
                    None => hierarchy.push_config_message(ConfigMessage::ConfigElementError {
                        element: "appender-ref".to_owned(),
                        detail: "missing required `ref` attribute".to_owned(),
                    }),
                }
            }
        }

        if let Some(activatable) = appender.as_activatable() {
            if let Err(err) = activatable.activate() {
                hierarchy.push_config_message(ConfigMessage::AppenderError {
                    appender: name.to_owned(),
                    detail: format!("activate() failed: {err}"),
                });
            }
        }

        built_appenders.insert(name.to_owned(), appender.clone());
        Some(appender)
    }

    fn configure_renderer(&self, hierarchy: &Hierarchy, elem: Node) {
        match (elem.attribute("renderedClass"), elem.attribute("renderingClass")) {
            (Some(rendered), Some(rendering)) => hierarchy.bind_renderer(rendered, rendering),
            _ => hierarchy.push_config_message(ConfigMessage::ConfigElementError {
                element: "renderer".to_owned(),
                detail: "requires both `renderedClass` and `renderingClass`".to_owned(),
            }),
        }
    }

    fn configure_param(&self, hierarchy: &Hierarchy, elem: Node) {
        match (elem.attribute("name"), elem.attribute("value")) {
            (Some(name), Some(value)) => hierarchy.set_property(name, expand_env_vars(value)),
            _ => {}
        }
    }
}

fn element_children(node: Node) -> impl Iterator<Item = Node> {
    node.children().filter(|n| n.is_element())
}

fn collect_appender_elements(root: Node) -> HashMap<String, Node> {
    element_children(root)
        .filter(|n| n.tag_name().name() == "appender")
        .filter_map(|n| n.attribute("name").map(|name| (name.to_owned(), n)))
        .collect()
}

fn collect_options(elem: Node) -> Vec<(String, PluginValue)> {
    element_children(elem)
        .filter(|n| n.tag_name().name() != "appender-ref")
        .filter_map(|n| node_to_option(n))
        .collect()
}

fn node_to_option(node: Node) -> Option<(String, PluginValue)> {
    if node.tag_name().name() == "param" {
        let name = node.attribute("name")?;
        let value = node.attribute("value").unwrap_or_default();
        return Some((name.to_owned(), PluginValue::Text(expand_env_vars(value))));
    }

    let name = node.tag_name().name().to_owned();
    let nested: Vec<(String, PluginValue)> = element_children(node).filter_map(node_to_option).collect();
    if nested.is_empty() {
        if let Some(value) = node.attribute("value") {
            return Some((name, PluginValue::Text(expand_env_vars(value))));
        }
        return None;
    }
    Some((name, PluginValue::Nested(nested)))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Expands `${VAR}` references in `input` against the process environment.
///
/// Lookup is case-insensitive on Windows (matching the platform's own
/// environment variable semantics) and case-sensitive everywhere else. A
/// reference to an unset variable is left verbatim, rather than replaced
/// with an empty string, so a typo'd `${VAR}` is easy to spot in the
/// resulting path or option value.
pub fn expand_env_vars(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            output.push_str(rest);
            return output;
        };
        let end = start + end;

        output.push_str(&rest[..start]);
        let var_name = &rest[start + 2..end];
        match lookup_env(var_name) {
            Some(value) => output.push_str(&value),
            None => {
                output.push_str("${");
                output.push_str(var_name);
                output.push('}');
            }
        }
        rest = &rest[end + 1..];
    }

    output.push_str(rest);
    output
}

#[cfg(windows)]
fn lookup_env(name: &str) -> Option<String> {
    std::env::vars().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v)
}

#[cfg(not(windows))]
fn lookup_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
