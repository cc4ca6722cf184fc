//! Integration registry
//!
//! Static table of the Vite plugin integrations solid-forge knows how to
//! configure. Built once at startup and shared by reference; tests construct
//! their own registries instead of touching global state.

use once_cell::sync::Lazy;

/// Post-install action attached to an integration, run by the CLI after the
/// config file has been written. Failures are reported, never rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostInstall {
    /// Write a starter file into the project root unless it already exists
    WriteFileIfAbsent { path: String, contents: String },
}

/// Declaration of a supported integration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationDecl {
    /// Registry key the user types (e.g. "unocss"), unique case-insensitively
    pub name: String,
    /// Callee identifier used in the plugins array (e.g. "UnoCss")
    pub identifier: String,
    /// Module the identifier is imported from (e.g. "unocss/vite")
    pub import_source: String,
    /// Whether this plugin's options accept a nested plugin sub-list
    pub accepts_nested: bool,
    /// Whether this plugin is passed inside an accepting host's options
    /// rather than as its own array entry
    pub nested_child: bool,
    /// Default invocation arguments (the text between the call parentheses)
    pub default_arguments: String,
    /// Optional action to run after a successful config write
    pub post_install: Option<PostInstall>,
}

impl IntegrationDecl {
    /// The npm package that provides this integration, derived from the
    /// import source ("unocss/vite" -> "unocss", "@vitejs/plugin-legacy"
    /// stays whole)
    pub fn npm_package(&self) -> String {
        let mut parts = self.import_source.split('/');
        match parts.next() {
            Some(scope) if scope.starts_with('@') => match parts.next() {
                Some(pkg) => format!("{}/{}", scope, pkg),
                None => scope.to_string(),
            },
            Some(pkg) => pkg.to_string(),
            None => self.import_source.clone(),
        }
    }
}

/// Immutable integration table with case-insensitive lookup
#[derive(Debug, Clone)]
pub struct IntegrationRegistry {
    decls: Vec<IntegrationDecl>,
}

impl IntegrationRegistry {
    pub fn new(decls: Vec<IntegrationDecl>) -> Self {
        Self { decls }
    }

    /// The built-in registry, constructed once per process
    pub fn builtin() -> &'static IntegrationRegistry {
        static BUILTIN: Lazy<IntegrationRegistry> = Lazy::new(builtin_decls);
        &BUILTIN
    }

    /// Look up a declaration by user-facing name, case-insensitively
    pub fn lookup(&self, name: &str) -> Option<&IntegrationDecl> {
        self.decls
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// All declarations, in registry order
    pub fn decls(&self) -> &[IntegrationDecl] {
        &self.decls
    }
}

const UNO_CONFIG_STARTER: &str = r#"import { defineConfig } from "unocss";

export default defineConfig({});
"#;

fn builtin_decls() -> IntegrationRegistry {
    IntegrationRegistry::new(vec![
        IntegrationDecl {
            name: "unocss".to_string(),
            identifier: "UnoCss".to_string(),
            import_source: "unocss/vite".to_string(),
            accepts_nested: true,
            nested_child: false,
            default_arguments: String::new(),
            post_install: Some(PostInstall::WriteFileIfAbsent {
                path: "uno.config.ts".to_string(),
                contents: UNO_CONFIG_STARTER.to_string(),
            }),
        },
        IntegrationDecl {
            name: "vitepwa".to_string(),
            identifier: "VitePWA".to_string(),
            import_source: "vite-plugin-pwa".to_string(),
            accepts_nested: false,
            nested_child: false,
            default_arguments: String::new(),
            post_install: None,
        },
        IntegrationDecl {
            name: "devtools".to_string(),
            identifier: "devtools".to_string(),
            import_source: "solid-devtools/vite".to_string(),
            accepts_nested: false,
            nested_child: false,
            default_arguments: "{ autoname: true }".to_string(),
            post_install: None,
        },
        IntegrationDecl {
            name: "legacy".to_string(),
            identifier: "legacy".to_string(),
            import_source: "@vitejs/plugin-legacy".to_string(),
            accepts_nested: false,
            nested_child: false,
            default_arguments: "{ targets: [\"defaults\"] }".to_string(),
            post_install: None,
        },
        IntegrationDecl {
            name: "icons".to_string(),
            identifier: "Icons".to_string(),
            import_source: "unplugin-icons/vite".to_string(),
            accepts_nested: false,
            nested_child: true,
            default_arguments: "{ compiler: \"solid\" }".to_string(),
            post_install: None,
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(name: &str) -> IntegrationDecl {
        IntegrationDecl {
            name: name.to_string(),
            identifier: name.to_string(),
            import_source: format!("{}/vite", name),
            accepts_nested: false,
            nested_child: false,
            default_arguments: String::new(),
            post_install: None,
        }
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let registry = IntegrationRegistry::new(vec![decl("UnoCss")]);

        assert!(registry.lookup("unocss").is_some());
        assert!(registry.lookup("UNOCSS").is_some());
        assert!(registry.lookup("UnoCss").is_some());
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = IntegrationRegistry::new(vec![decl("unocss")]);
        assert!(registry.lookup("tailwind").is_none());
    }

    #[test]
    fn test_builtin_contains_unocss() {
        let registry = IntegrationRegistry::builtin();
        let uno = registry.lookup("unocss").unwrap();

        assert_eq!(uno.identifier, "UnoCss");
        assert_eq!(uno.import_source, "unocss/vite");
        assert!(uno.accepts_nested);
    }

    #[test]
    fn test_npm_package_subpath() {
        let mut d = decl("unocss");
        d.import_source = "unocss/vite".to_string();
        assert_eq!(d.npm_package(), "unocss");
    }

    #[test]
    fn test_npm_package_scoped() {
        let mut d = decl("legacy");
        d.import_source = "@vitejs/plugin-legacy".to_string();
        assert_eq!(d.npm_package(), "@vitejs/plugin-legacy");
    }

    #[test]
    fn test_npm_package_plain() {
        let mut d = decl("vitepwa");
        d.import_source = "vite-plugin-pwa".to_string();
        assert_eq!(d.npm_package(), "vite-plugin-pwa");
    }
}
