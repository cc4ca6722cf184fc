pub mod config;
pub mod error;
pub mod installer;
pub mod registry;
pub mod scaffold;
pub mod transform;

pub use config::Config;
pub use error::{Result, SolidForgeError};
pub use installer::{install_packages, installed_dependencies, PackageManager};
pub use registry::{IntegrationDecl, IntegrationRegistry, PostInstall};
pub use scaffold::{create_project, open_in_browser, stackblitz_url, Template};
pub use transform::{
    ConfigDocument, TransformEngine, TransformRequest, TransformResult, TransformWarning,
};
