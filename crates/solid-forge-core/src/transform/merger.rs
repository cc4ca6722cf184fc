//! Plugin merge
//!
//! Reconciles the requested integrations against the entries already present
//! in the plugin list. New entries are appended, duplicates are skipped (or
//! have their arguments rebuilt under `force`), and nested-child integrations
//! collapse into the options of the first accepting host constructed in the
//! same batch. Everything is expressed as byte-range edits; sibling entries
//! are never disturbed.

use std::collections::HashSet;

use tree_sitter::Node;

use crate::error::Result;
use crate::registry::IntegrationDecl;
use crate::transform::emitter::Edit;
use crate::transform::imports::ImportManager;
use crate::transform::locator::{property_name, PluginListSite, PLUGINS_PROP};
use crate::transform::parser::ConfigDocument;

#[derive(Debug, Default)]
pub(crate) struct MergeOutcome {
    pub edits: Vec<Edit>,
    pub inserted: usize,
    pub skipped_duplicates: usize,
    pub overwritten: usize,
}

/// A concrete occurrence in the plugin list: a top-level array element, or an
/// entry of a nested sub-list one level down (`container` is then the
/// enclosing top-level call).
struct ExistingEntry<'t> {
    node: Node<'t>,
    callee: String,
    container: Option<Node<'t>>,
}

/// What the merge decided for one requested integration
enum Action<'t> {
    Append {
        decl: IntegrationDecl,
        children: Vec<IntegrationDecl>,
    },
    Overwrite {
        decl: IntegrationDecl,
        entry_node: Node<'t>,
        container_id: Option<usize>,
        children: Vec<IntegrationDecl>,
    },
    /// Consumed by a host being constructed in this batch
    ThreadedInsert { decl: IntegrationDecl },
    /// Re-threaded into a host whose arguments are being rebuilt
    ThreadedOverwrite { decl: IntegrationDecl },
    Skip,
}

pub(crate) fn merge_plugins(
    doc: &ConfigDocument,
    site: &PluginListSite<'_>,
    decls: &[IntegrationDecl],
    force: bool,
    imports: &mut ImportManager,
) -> Result<MergeOutcome> {
    let entries = match site {
        PluginListSite::Found { array } => collect_entries(doc, *array),
        PluginListSite::Missing { .. } => Vec::new(),
    };

    let found: Vec<Option<&ExistingEntry<'_>>> = decls
        .iter()
        .map(|d| entries.iter().find(|e| entry_matches(e, d, imports)))
        .collect();

    // First host that will be constructed (or rebuilt under force) this batch;
    // it absorbs the batch's nested children.
    let host = (0..decls.len()).find(|&i| {
        decls[i].accepts_nested && !decls[i].nested_child && (found[i].is_none() || force)
    });
    let host_entry_id = host.and_then(|i| found[i].map(|e| e.node.id()));

    let mut actions: Vec<Action<'_>> = Vec::with_capacity(decls.len());
    let mut host_children: Vec<IntegrationDecl> = Vec::new();

    for (i, decl) in decls.iter().enumerate() {
        let action = match (found[i], decl.nested_child, host) {
            // Fresh nested child with an accepting host in the batch
            (None, true, Some(h)) if h != i => {
                host_children.push(decl.clone());
                Action::ThreadedInsert { decl: decl.clone() }
            }
            // Fresh entry, appended as its own array element
            (None, _, _) => Action::Append {
                decl: decl.clone(),
                children: Vec::new(),
            },
            // Already nested inside the host whose arguments are being
            // rebuilt: re-thread instead of editing inside the replaced span
            (Some(entry), _, Some(_))
                if force
                    && entry.container.is_some()
                    && entry.container.map(|n| n.id()) == host_entry_id =>
            {
                host_children.push(decl.clone());
                Action::ThreadedOverwrite { decl: decl.clone() }
            }
            (Some(entry), _, _) if force => Action::Overwrite {
                decl: decl.clone(),
                entry_node: entry.node,
                container_id: entry.container.map(|n| n.id()),
                children: Vec::new(),
            },
            (Some(_), _, _) => Action::Skip,
        };
        actions.push(action);
    }

    // Hand the collected children to the host's construction
    if let Some(h) = host {
        if let Some(action) = actions.get_mut(h) {
            match action {
                Action::Append { children, .. } | Action::Overwrite { children, .. } => {
                    *children = host_children;
                }
                _ => {}
            }
        }
    }

    // An in-place rebuild nested inside another rebuilt entry would collide
    // with the enclosing replacement; the outer rebuild erases that region,
    // so the entry is re-appended as a fresh top-level element instead.
    let rebuilt_ids: HashSet<usize> = actions
        .iter()
        .filter_map(|a| match a {
            Action::Overwrite {
                entry_node,
                container_id: None,
                ..
            } => Some(entry_node.id()),
            _ => None,
        })
        .collect();
    let reappend: Vec<usize> = actions
        .iter()
        .enumerate()
        .filter_map(|(i, a)| match a {
            Action::Overwrite {
                container_id: Some(c),
                ..
            } if rebuilt_ids.contains(c) => Some(i),
            _ => None,
        })
        .collect();
    for i in reappend {
        if let Action::Overwrite { decl, .. } = &actions[i] {
            let decl = decl.clone();
            actions[i] = Action::Append {
                decl,
                children: Vec::new(),
            };
        }
    }

    let mut outcome = MergeOutcome::default();
    let mut appended: Vec<String> = Vec::new();

    for action in &actions {
        match action {
            Action::Append { decl, children } => {
                appended.push(invocation_text(decl, children));
                imports.add(&decl.import_source, &decl.identifier);
                for child in children {
                    imports.add(&child.import_source, &child.identifier);
                }
                outcome.inserted += 1;
            }
            Action::Overwrite {
                decl,
                entry_node,
                children,
                container_id: _,
            } => {
                outcome.edits.push(overwrite_edit(*entry_node, decl, children));
                imports.add(&decl.import_source, &decl.identifier);
                for child in children {
                    imports.add(&child.import_source, &child.identifier);
                }
                outcome.overwritten += 1;
            }
            Action::ThreadedInsert { decl } => {
                imports.add(&decl.import_source, &decl.identifier);
                outcome.inserted += 1;
            }
            Action::ThreadedOverwrite { decl } => {
                imports.add(&decl.import_source, &decl.identifier);
                outcome.overwritten += 1;
            }
            Action::Skip => outcome.skipped_duplicates += 1,
        }
    }

    if !appended.is_empty() {
        outcome.edits.push(append_edit(doc, site, &appended));
    }

    Ok(outcome)
}

/// Edit appending the constructed calls to the plugin list, synthesizing the
/// `plugins` property when the config object has none
fn append_edit(doc: &ConfigDocument, site: &PluginListSite<'_>, appended: &[String]) -> Edit {
    let list = appended.join(", ");
    match site {
        PluginListSite::Found { array } => {
            let mut cursor = array.walk();
            let last = array
                .named_children(&mut cursor)
                .filter(|n| n.kind() != "comment")
                .last();
            match last {
                Some(element) => Edit::insert(element.end_byte(), format!(", {}", list)),
                None => Edit::insert(array.end_byte() - 1, list),
            }
        }
        PluginListSite::Missing { object } => {
            let mut cursor = object.walk();
            let first = object
                .named_children(&mut cursor)
                .find(|n| n.kind() != "comment");
            match first {
                Some(member) => Edit::insert(
                    member.start_byte(),
                    format!("{}: [{}], ", PLUGINS_PROP, list),
                ),
                None => Edit::replace(
                    object.start_byte(),
                    object.end_byte(),
                    format!("{{ {}: [{}] }}", PLUGINS_PROP, list),
                ),
            }
        }
    }
}

/// Edit replacing a matched entry's arguments in place; a bare identifier
/// entry becomes a full invocation
fn overwrite_edit(entry_node: Node<'_>, decl: &IntegrationDecl, children: &[IntegrationDecl]) -> Edit {
    if entry_node.kind() == "call_expression" {
        if let Some(args) = entry_node.child_by_field_name("arguments") {
            return Edit::replace(
                args.start_byte(),
                args.end_byte(),
                format!("({})", invocation_arguments(decl, children)),
            );
        }
    }
    Edit::replace(
        entry_node.start_byte(),
        entry_node.end_byte(),
        invocation_text(decl, children),
    )
}

fn invocation_text(decl: &IntegrationDecl, children: &[IntegrationDecl]) -> String {
    format!("{}({})", decl.identifier, invocation_arguments(decl, children))
}

/// Invocation arguments from the declaration template; batch nested children
/// are threaded in as a `plugins` sub-list of the options object
fn invocation_arguments(decl: &IntegrationDecl, children: &[IntegrationDecl]) -> String {
    if children.is_empty() {
        return decl.default_arguments.clone();
    }
    let list = children
        .iter()
        .map(|c| format!("{}({})", c.identifier, c.default_arguments))
        .collect::<Vec<_>>()
        .join(", ");
    let nested = format!("{}: [{}]", PLUGINS_PROP, list);

    let template = decl.default_arguments.trim();
    if template.starts_with('{') && template.ends_with('}') {
        let inner = template[1..template.len() - 1].trim();
        if inner.is_empty() {
            format!("{{ {} }}", nested)
        } else {
            format!("{{ {}, {} }}", nested, inner)
        }
    } else {
        format!("{{ {} }}", nested)
    }
}

/// Entries of the plugin array, plus the entries of nested sub-lists one
/// level down so that already-collapsed children are still recognized
fn collect_entries<'t>(doc: &ConfigDocument, array: Node<'t>) -> Vec<ExistingEntry<'t>> {
    let mut entries = Vec::new();
    let mut cursor = array.walk();
    let elements: Vec<Node<'t>> = array
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect();
    for element in elements {
        push_entry(doc, element, None, &mut entries);
    }
    entries
}

fn push_entry<'t>(
    doc: &ConfigDocument,
    node: Node<'t>,
    container: Option<Node<'t>>,
    entries: &mut Vec<ExistingEntry<'t>>,
) {
    match node.kind() {
        "identifier" => entries.push(ExistingEntry {
            node,
            callee: doc.text(node).to_string(),
            container,
        }),
        "call_expression" => {
            if let Some(function) = node.child_by_field_name("function") {
                entries.push(ExistingEntry {
                    node,
                    callee: doc.text(function).to_string(),
                    container,
                });
            }
            if container.is_none() {
                for nested in nested_sub_list(doc, node) {
                    push_entry(doc, nested, Some(node), entries);
                }
            }
        }
        _ => {}
    }
}

/// Elements of a `plugins: [...]` sub-list inside a call's options object
fn nested_sub_list<'t>(doc: &ConfigDocument, call: Node<'t>) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    let Some(args) = call.child_by_field_name("arguments") else {
        return out;
    };
    let mut cursor = args.walk();
    let objects: Vec<Node<'t>> = args
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "object")
        .collect();
    for object in objects {
        let mut members = object.walk();
        let pairs: Vec<Node<'t>> = object
            .named_children(&mut members)
            .filter(|n| n.kind() == "pair")
            .collect();
        for pair in pairs {
            let Some(key) = pair.child_by_field_name("key") else {
                continue;
            };
            if property_name(doc, key) != PLUGINS_PROP {
                continue;
            }
            let Some(value) = pair.child_by_field_name("value") else {
                continue;
            };
            if value.kind() != "array" {
                continue;
            }
            let mut elements = value.walk();
            out.extend(
                value
                    .named_children(&mut elements)
                    .filter(|n| n.kind() != "comment"),
            );
        }
    }
    out
}

/// Callee identifier match (case-insensitive) or resolved import source match
fn entry_matches(entry: &ExistingEntry<'_>, decl: &IntegrationDecl, imports: &ImportManager) -> bool {
    entry.callee.eq_ignore_ascii_case(&decl.identifier)
        || imports
            .source_for_local(&entry.callee)
            .is_some_and(|source| source.eq_ignore_ascii_case(&decl.import_source))
}
