//! Config source parsing
//!
//! Wraps tree-sitter with the TypeScript grammar. The concrete syntax tree
//! keeps byte ranges over the original text, so untouched statements can be
//! reproduced exactly at emit time.

use tree_sitter::{Node, Parser, Tree};

use crate::error::{Result, SolidForgeError};

/// Parsed configuration file: the original text plus its syntax tree.
/// Created fresh per transform invocation and discarded after emission.
#[derive(Debug)]
pub struct ConfigDocument {
    source: String,
    tree: Tree,
}

impl ConfigDocument {
    /// Parse TypeScript source into a document. Malformed input fails with
    /// the location of the first syntax error.
    pub fn parse(source: &str) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .map_err(|e| SolidForgeError::Parse {
                line: 0,
                column: 0,
                message: format!("failed to load TypeScript grammar: {}", e),
            })?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| SolidForgeError::Parse {
                line: 0,
                column: 0,
                message: "parser produced no tree".to_string(),
            })?;

        if tree.root_node().has_error() {
            let node = first_error(tree.root_node());
            let pos = node.start_position();
            let what = if node.is_missing() {
                format!("missing {}", node.kind())
            } else {
                "syntax error".to_string()
            };
            return Err(SolidForgeError::Parse {
                line: pos.row + 1,
                column: pos.column + 1,
                message: what,
            });
        }

        Ok(Self {
            source: source.to_string(),
            tree,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Original text of a node
    pub fn text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Unquoted value of a string literal node
    pub fn string_value(&self, node: Node<'_>) -> &str {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "string_fragment" {
                return self.text(child);
            }
        }
        ""
    }
}

/// Depth-first search for the node tree-sitter flagged as broken
fn first_error(node: Node<'_>) -> Node<'_> {
    if node.is_error() || node.is_missing() {
        return node;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    for child in children {
        if child.has_error() {
            return first_error(child);
        }
    }
    node
}
