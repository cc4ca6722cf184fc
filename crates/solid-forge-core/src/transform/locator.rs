//! Plugin-list location
//!
//! Finds the default-exported configuration object (unwrapping at most one
//! builder call such as `defineConfig(...)`) and within it the `plugins`
//! property. The outcome is a tagged site, not a nullable field: a missing
//! list is a normal, mergeable state, only an unrecognized export shape is
//! fatal.

use tree_sitter::Node;

use crate::error::{Result, SolidForgeError};
use crate::transform::parser::ConfigDocument;

/// Property holding the plugin list inside the config object
pub const PLUGINS_PROP: &str = "plugins";

/// Where the merge happens
pub enum PluginListSite<'t> {
    /// The `plugins` array exists
    Found { array: Node<'t> },
    /// No `plugins` property; an empty list is synthesized into the object
    Missing { object: Node<'t> },
}

pub fn locate_plugin_list<'t>(doc: &'t ConfigDocument) -> Result<PluginListSite<'t>> {
    let object = config_object(doc)?;

    let mut cursor = object.walk();
    let members: Vec<Node<'t>> = object.named_children(&mut cursor).collect();
    for member in members {
        if member.kind() != "pair" {
            continue;
        }
        let Some(key) = member.child_by_field_name("key") else {
            continue;
        };
        if property_name(doc, key) != PLUGINS_PROP {
            continue;
        }
        let value = member
            .child_by_field_name("value")
            .ok_or_else(|| structure("plugins property has no value"))?;
        if value.kind() != "array" {
            return Err(structure(&format!(
                "plugins property is a {}, expected an array",
                value.kind()
            )));
        }
        return Ok(PluginListSite::Found { array: value });
    }

    Ok(PluginListSite::Missing { object })
}

/// The default-exported object literal, unwrapped one call layer at most
fn config_object<'t>(doc: &'t ConfigDocument) -> Result<Node<'t>> {
    let root = doc.root();
    let mut cursor = root.walk();
    let defaults: Vec<Node<'t>> = root
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "export_statement" && has_default_keyword(*n))
        .collect();

    let export = match defaults.as_slice() {
        [] => return Err(structure("no default export found")),
        [one] => *one,
        _ => return Err(structure("more than one default export")),
    };

    let Some(value) = export.child_by_field_name("value") else {
        return Err(structure("default export is not an expression"));
    };

    match value.kind() {
        "object" => Ok(value),
        "call_expression" => {
            let args = value
                .child_by_field_name("arguments")
                .ok_or_else(|| structure("builder call has no arguments"))?;
            let mut cursor = args.walk();
            let first = args.named_children(&mut cursor).find(|n| n.kind() != "comment");
            match first {
                Some(node) if node.kind() == "object" => Ok(node),
                _ => Err(structure("builder call does not wrap an object literal")),
            }
        }
        other => Err(structure(&format!(
            "default export is a {}, expected an object literal",
            other
        ))),
    }
}

fn has_default_keyword(node: Node<'_>) -> bool {
    let mut cursor = node.walk();
    let result = node.children(&mut cursor).any(|c| c.kind() == "default");
    result
}

/// Property key text, unquoted when the key is a string literal
pub(crate) fn property_name<'a>(doc: &'a ConfigDocument, key: Node<'_>) -> &'a str {
    if key.kind() == "string" {
        doc.string_value(key)
    } else {
        doc.text(key)
    }
}

fn structure(message: &str) -> SolidForgeError {
    SolidForgeError::Structure {
        message: message.to_string(),
    }
}
