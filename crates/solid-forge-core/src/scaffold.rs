//! Project scaffolding
//!
//! Backs the `new` command: clones a starter template through the package
//! runner and degit, or opens the template on StackBlitz.

use std::process::{Command, Stdio};

use crate::error::{Result, SolidForgeError};
use crate::installer::PackageManager;

/// Starter template variations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Bare,
    Ts,
    Js,
}

impl Template {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bare => "bare",
            Self::Ts => "ts",
            Self::Js => "js",
        }
    }
}

/// StackBlitz playground URL for a template
pub fn stackblitz_url(template: Template) -> String {
    format!("https://solid.new/{}", template.as_str())
}

/// Arguments for the degit invocation, without the runner itself
pub fn degit_args(template_repo: &str, template: Template, name: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "degit".to_string(),
        format!("{}/{}", template_repo, template.as_str()),
    ];
    if let Some(name) = name {
        args.push(name.to_string());
    }
    args
}

/// Clone a starter template into `name` (or the template's folder name)
pub fn create_project(
    template: Template,
    name: Option<&str>,
    manager: PackageManager,
    template_repo: &str,
) -> Result<()> {
    let output = Command::new(manager.runner())
        .args(degit_args(template_repo, template, name))
        .stdin(Stdio::null())
        .output()
        .map_err(|e| SolidForgeError::Scaffold {
            message: format!("failed to spawn {}: {}", manager.runner(), e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SolidForgeError::Scaffold {
            message: stderr.trim().to_string(),
        });
    }

    Ok(())
}

/// Open a URL in the default browser
pub fn open_in_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    let mut command = {
        let mut c = Command::new("open");
        c.arg(url);
        c
    };

    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", url]);
        c
    };

    #[cfg(all(unix, not(target_os = "macos")))]
    let mut command = {
        let mut c = Command::new("xdg-open");
        c.arg(url);
        c
    };

    let status = command
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| SolidForgeError::Scaffold {
            message: format!("failed to open browser: {}", e),
        })?;

    if !status.success() {
        return Err(SolidForgeError::Scaffold {
            message: format!("browser exited with {}", status),
        });
    }

    Ok(())
}
