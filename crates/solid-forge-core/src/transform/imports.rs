//! Import tracking
//!
//! Collects the document's import statements and deduplicates additions by
//! module source: the first-seen local name for a source wins, even when a
//! later `add` asks for a different one. New statements are inserted right
//! after the last existing import, or at the top of the file when there are
//! none.

use tree_sitter::Node;

use crate::transform::emitter::Edit;
use crate::transform::parser::ConfigDocument;

/// One import statement, keyed by module source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub source: String,
    pub local_name: String,
}

pub struct ImportManager {
    existing: Vec<ImportRecord>,
    pending: Vec<ImportRecord>,
    insert_at: Option<usize>,
}

impl ImportManager {
    /// Scan a document's top-level import statements
    pub fn scan(doc: &ConfigDocument) -> Self {
        let root = doc.root();
        let mut cursor = root.walk();
        let mut existing = Vec::new();
        let mut insert_at = None;

        for node in root.named_children(&mut cursor) {
            if node.kind() != "import_statement" {
                continue;
            }
            let source = node
                .child_by_field_name("source")
                .map(|s| doc.string_value(s).to_string())
                .unwrap_or_default();
            if source.is_empty() {
                continue;
            }
            existing.push(ImportRecord {
                source,
                local_name: clause_local_name(doc, node),
            });
            insert_at = Some(node.end_byte());
        }

        Self {
            existing,
            pending: Vec::new(),
            insert_at,
        }
    }

    /// Request an import. Idempotent per source: a second call for the same
    /// source is a no-op even with a different local name. Returns whether a
    /// new statement was queued.
    pub fn add(&mut self, source: &str, local_name: &str) -> bool {
        if self.record_for_source(source).is_some() {
            return false;
        }
        self.pending.push(ImportRecord {
            source: source.to_string(),
            local_name: local_name.to_string(),
        });
        true
    }

    /// Module source a local name was imported from, if any
    pub fn source_for_local(&self, local_name: &str) -> Option<&str> {
        self.existing
            .iter()
            .chain(self.pending.iter())
            .find(|r| r.local_name == local_name)
            .map(|r| r.source.as_str())
    }

    fn record_for_source(&self, source: &str) -> Option<&ImportRecord> {
        self.existing
            .iter()
            .chain(self.pending.iter())
            .find(|r| r.source == source)
    }

    /// Edit inserting all queued statements, if any were queued
    pub fn pending_edit(&self) -> Option<Edit> {
        if self.pending.is_empty() {
            return None;
        }
        let lines: Vec<String> = self
            .pending
            .iter()
            .map(|r| format!("import {} from \"{}\";", r.local_name, r.source))
            .collect();

        Some(match self.insert_at {
            Some(at) => Edit::insert(at, format!("\n{}", lines.join("\n"))),
            None => Edit::insert(0, format!("{}\n", lines.join("\n"))),
        })
    }
}

/// Local binding introduced by an import clause: the default import name, a
/// namespace alias, or the first named specifier
fn clause_local_name(doc: &ConfigDocument, import: Node<'_>) -> String {
    let mut cursor = import.walk();
    let clauses: Vec<Node<'_>> = import
        .children(&mut cursor)
        .filter(|c| c.kind() == "import_clause")
        .collect();

    for clause in clauses {
        let mut inner = clause.walk();
        let parts: Vec<Node<'_>> = clause.named_children(&mut inner).collect();
        for part in parts {
            match part.kind() {
                "identifier" => return doc.text(part).to_string(),
                "namespace_import" => {
                    let mut ns = part.walk();
                    let alias = part.named_children(&mut ns).find(|n| n.kind() == "identifier");
                    if let Some(alias) = alias {
                        return doc.text(alias).to_string();
                    }
                }
                "named_imports" => {
                    let mut specs = part.walk();
                    for spec in part.named_children(&mut specs) {
                        if spec.kind() != "import_specifier" {
                            continue;
                        }
                        let local = spec
                            .child_by_field_name("alias")
                            .or_else(|| spec.child_by_field_name("name"));
                        if let Some(local) = local {
                            return doc.text(local).to_string();
                        }
                    }
                }
                _ => {}
            }
        }
    }
    String::new()
}
