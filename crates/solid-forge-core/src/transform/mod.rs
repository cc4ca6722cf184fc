//! Config transformation engine
//!
//! One-way pipeline over a configuration source: parse, locate the plugin
//! list, merge the requested integrations, emit. The engine performs no I/O;
//! reading the config file and persisting the result are the caller's
//! responsibility. Any fatal error aborts the whole invocation, so the caller
//! either gets the fully merged document or nothing.

use std::collections::HashMap;
use std::fmt;

use crate::error::Result;
use crate::registry::{IntegrationDecl, IntegrationRegistry};

pub mod emitter;
pub mod imports;
pub mod locator;
mod merger;
pub mod parser;

pub use emitter::Edit;
pub use imports::{ImportManager, ImportRecord};
pub use locator::{locate_plugin_list, PluginListSite, PLUGINS_PROP};
pub use parser::ConfigDocument;

/// What the caller wants merged. Integration names are expected to be
/// validated against the registry beforehand; an unknown name that reaches
/// the engine anyway is skipped with a warning, never a fatal error.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    pub integrations: Vec<String>,
    pub force: bool,
}

/// Outcome of one engine invocation
#[derive(Debug)]
pub struct TransformResult {
    /// Full replacement source text for the config file
    pub source: String,
    pub inserted: usize,
    pub skipped_duplicates: usize,
    pub overwritten: usize,
    pub warnings: Vec<TransformWarning>,
}

/// Non-fatal conditions accumulated during a transform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformWarning {
    UnsupportedIntegration { name: String },
}

impl fmt::Display for TransformWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedIntegration { name } => {
                write!(f, "can't automatically configure {}: not supported", name)
            }
        }
    }
}

/// The engine. Holds the registry by reference; one instance can serve many
/// invocations but never two concurrently against the same document.
pub struct TransformEngine<'r> {
    registry: &'r IntegrationRegistry,
}

impl<'r> TransformEngine<'r> {
    pub fn new(registry: &'r IntegrationRegistry) -> Self {
        Self { registry }
    }

    /// Run the full pipeline against one config source
    pub fn transform(&self, source: &str, request: &TransformRequest) -> Result<TransformResult> {
        let doc = ConfigDocument::parse(source)?;

        let mut warnings = Vec::new();
        let decls = self.resolve(&request.integrations, &mut warnings);

        let site = locate_plugin_list(&doc)?;
        let mut imports = ImportManager::scan(&doc);
        let merge = merger::merge_plugins(&doc, &site, &decls, request.force, &mut imports)?;

        let mut edits = merge.edits;
        if let Some(edit) = imports.pending_edit() {
            edits.push(edit);
        }
        let source = emitter::emit(doc.source(), edits)?;

        Ok(TransformResult {
            source,
            inserted: merge.inserted,
            skipped_duplicates: merge.skipped_duplicates,
            overwritten: merge.overwritten,
            warnings,
        })
    }

    /// Resolve request names against the registry. Duplicates within one
    /// request collapse to a single entry at the first occurrence's position;
    /// the later occurrence's declaration wins.
    fn resolve(&self, names: &[String], warnings: &mut Vec<TransformWarning>) -> Vec<IntegrationDecl> {
        let mut order: Vec<String> = Vec::new();
        let mut by_key: HashMap<String, IntegrationDecl> = HashMap::new();

        for name in names {
            match self.registry.lookup(name) {
                Some(decl) => {
                    let key = decl.name.to_ascii_lowercase();
                    if !by_key.contains_key(&key) {
                        order.push(key.clone());
                    }
                    by_key.insert(key, decl.clone());
                }
                None => warnings.push(TransformWarning::UnsupportedIntegration {
                    name: name.clone(),
                }),
            }
        }

        order.iter().filter_map(|key| by_key.remove(key)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolidForgeError;

    fn decl(
        name: &str,
        identifier: &str,
        source: &str,
        accepts_nested: bool,
        nested_child: bool,
        args: &str,
    ) -> IntegrationDecl {
        IntegrationDecl {
            name: name.to_string(),
            identifier: identifier.to_string(),
            import_source: source.to_string(),
            accepts_nested,
            nested_child,
            default_arguments: args.to_string(),
            post_install: None,
        }
    }

    fn registry() -> IntegrationRegistry {
        IntegrationRegistry::new(vec![
            decl("unocss", "UnoCss", "unocss/vite", true, false, ""),
            decl("vitepwa", "VitePWA", "vite-plugin-pwa", false, false, ""),
            decl(
                "icons",
                "Icons",
                "unplugin-icons/vite",
                false,
                true,
                "{ compiler: \"solid\" }",
            ),
        ])
    }

    fn run(source: &str, names: &[&str], force: bool) -> TransformResult {
        let registry = registry();
        let engine = TransformEngine::new(&registry);
        let request = TransformRequest {
            integrations: names.iter().map(|s| s.to_string()).collect(),
            force,
        };
        engine.transform(source, &request).unwrap()
    }

    #[test]
    fn test_scenario_a_insert_then_idempotent() {
        let input = "export default {\n  plugins: [],\n};\n";

        let first = run(input, &["unocss"], false);
        assert_eq!(
            first.source,
            "import UnoCss from \"unocss/vite\";\nexport default {\n  plugins: [UnoCss()],\n};\n"
        );
        assert_eq!(first.inserted, 1);
        assert_eq!(first.skipped_duplicates, 0);

        let second = run(&first.source, &["unocss"], false);
        assert_eq!(second.source, first.source);
        assert_eq!(second.inserted, 0);
        assert_eq!(second.skipped_duplicates, 1);
    }

    #[test]
    fn test_scenario_b_duplicate_is_skipped() {
        let input = "import UnoCss from \"unocss/vite\";\nexport default {\n  plugins: [UnoCss({ presets: [] })],\n};\n";

        let result = run(input, &["unocss"], false);
        assert_eq!(result.source, input);
        assert_eq!(result.skipped_duplicates, 1);
        assert_eq!(result.inserted, 0);
    }

    #[test]
    fn test_scenario_c_force_overwrites_arguments_in_place() {
        let input = "import UnoCss from \"unocss/vite\";\nexport default {\n  plugins: [UnoCss({ presets: [] })],\n};\n";

        let result = run(input, &["unocss"], true);
        assert_eq!(
            result.source,
            "import UnoCss from \"unocss/vite\";\nexport default {\n  plugins: [UnoCss()],\n};\n"
        );
        assert_eq!(result.overwritten, 1);
        assert_eq!(result.inserted, 0);
    }

    #[test]
    fn test_force_keeps_sibling_entries_and_position() {
        let input = "export default {\n  plugins: [solid(), UnoCss({ x: 1 }), other()],\n};\n";

        let result = run(input, &["unocss"], true);
        assert!(result
            .source
            .contains("plugins: [solid(), UnoCss(), other()]"));
        assert_eq!(result.overwritten, 1);
    }

    #[test]
    fn test_untouched_statements_are_byte_identical() {
        let input = "import solid from \"vite-plugin-solid\";\nconst base = \"/app\";   // weird   spacing\nexport default {\n  base,\n  plugins: [solid()],\n  server: { port: 3000 },\n};\n";

        let result = run(input, &["unocss"], false);
        assert!(result
            .source
            .contains("const base = \"/app\";   // weird   spacing"));
        assert!(result.source.contains("server: { port: 3000 }"));
        assert!(result.source.contains("plugins: [solid(), UnoCss()]"));
    }

    #[test]
    fn test_missing_list_is_synthesized() {
        let result = run("export default { };\n", &["unocss"], false);
        assert_eq!(
            result.source,
            "import UnoCss from \"unocss/vite\";\nexport default { plugins: [UnoCss()] };\n"
        );
        assert_eq!(result.inserted, 1);
    }

    #[test]
    fn test_missing_list_leaves_other_properties_alone() {
        let input = "export default defineConfig({ base: \"/app\" });\n";

        let result = run(input, &["unocss"], false);
        assert!(result
            .source
            .contains("defineConfig({ plugins: [UnoCss()], base: \"/app\" })"));
    }

    #[test]
    fn test_duplicate_names_in_one_batch_collapse() {
        let result = run("export default { plugins: [] };\n", &["unocss", "unocss"], false);
        assert_eq!(result.inserted, 1);
        assert_eq!(result.skipped_duplicates, 0);
        assert_eq!(
            result.source.matches("import UnoCss from \"unocss/vite\";").count(),
            1
        );
    }

    #[test]
    fn test_later_request_entry_keeps_first_position() {
        let result = run(
            "export default { plugins: [] };\n",
            &["unocss", "vitepwa", "unocss"],
            false,
        );
        assert_eq!(result.inserted, 2);
        assert!(result.source.contains("plugins: [UnoCss(), VitePWA()]"));
    }

    #[test]
    fn test_match_by_resolved_import_source() {
        let input = "import Uno from \"unocss/vite\";\nexport default { plugins: [Uno()] };\n";

        let result = run(input, &["unocss"], false);
        assert_eq!(result.source, input);
        assert_eq!(result.skipped_duplicates, 1);
    }

    #[test]
    fn test_nested_child_collapses_into_host() {
        let result = run("export default { plugins: [] };\n", &["unocss", "icons"], false);

        assert!(result.source.contains(
            "plugins: [UnoCss({ plugins: [Icons({ compiler: \"solid\" })] })]"
        ));
        assert!(result.source.contains("import UnoCss from \"unocss/vite\";"));
        assert!(result.source.contains("import Icons from \"unplugin-icons/vite\";"));
        assert_eq!(result.inserted, 2);

        let again = run(&result.source, &["unocss", "icons"], false);
        assert_eq!(again.source, result.source);
        assert_eq!(again.skipped_duplicates, 2);
        assert_eq!(again.inserted, 0);
    }

    #[test]
    fn test_nested_child_without_host_appends_plainly() {
        let result = run("export default { plugins: [] };\n", &["icons"], false);
        assert!(result
            .source
            .contains("plugins: [Icons({ compiler: \"solid\" })]"));
        assert_eq!(result.inserted, 1);
    }

    #[test]
    fn test_force_rebuilds_collapsed_host() {
        let input = "import UnoCss from \"unocss/vite\";\nimport Icons from \"unplugin-icons/vite\";\nexport default { plugins: [UnoCss({ plugins: [Icons()] })] };\n";

        let result = run(input, &["unocss", "icons"], true);
        assert_eq!(result.overwritten, 2);
        assert!(result.source.contains(
            "plugins: [UnoCss({ plugins: [Icons({ compiler: \"solid\" })] })]"
        ));
        assert_eq!(result.source.matches("UnoCss(").count(), 1);
    }

    #[test]
    fn test_force_rethreads_any_entry_nested_in_rebuilt_host() {
        let input = "import UnoCss from \"unocss/vite\";\nimport VitePWA from \"vite-plugin-pwa\";\nexport default { plugins: [UnoCss({ plugins: [VitePWA({ mode: \"dev\" })] })] };\n";

        let result = run(input, &["unocss", "vitepwa"], true);
        assert_eq!(result.overwritten, 2);
        assert!(result
            .source
            .contains("plugins: [UnoCss({ plugins: [VitePWA()] })]"));
    }

    #[test]
    fn test_force_reappends_entry_nested_in_non_host_rebuild() {
        let input = "import VitePWA from \"vite-plugin-pwa\";\nimport Icons from \"unplugin-icons/vite\";\nexport default { plugins: [VitePWA({ plugins: [Icons()] })] };\n";

        let result = run(input, &["vitepwa", "icons"], true);
        assert_eq!(result.overwritten, 1);
        assert_eq!(result.inserted, 1);
        assert!(result
            .source
            .contains("plugins: [VitePWA(), Icons({ compiler: \"solid\" })]"));
    }

    #[test]
    fn test_unsupported_integration_warns_and_continues() {
        let result = run("export default { plugins: [] };\n", &["tailwind", "unocss"], false);

        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0]
            .to_string()
            .contains("can't automatically configure tailwind"));
        assert_eq!(result.inserted, 1);
        assert!(result.source.contains("UnoCss()"));
    }

    #[test]
    fn test_parse_error_aborts() {
        let registry = registry();
        let engine = TransformEngine::new(&registry);
        let request = TransformRequest {
            integrations: vec!["unocss".to_string()],
            force: false,
        };
        let err = engine.transform("export default {]", &request).unwrap_err();
        assert!(matches!(err, SolidForgeError::Parse { .. }));
    }

    #[test]
    fn test_structure_error_aborts() {
        let registry = registry();
        let engine = TransformEngine::new(&registry);
        let request = TransformRequest {
            integrations: vec!["unocss".to_string()],
            force: false,
        };
        let err = engine
            .transform("module.exports = { plugins: [] };\n", &request)
            .unwrap_err();
        assert!(matches!(err, SolidForgeError::Structure { .. }));
    }

    #[test]
    fn test_no_integrations_is_identity() {
        let input = "export default { plugins: [] };\n";
        let result = run(input, &[], false);
        assert_eq!(result.source, input);
        assert_eq!(result.inserted, 0);
    }
}
