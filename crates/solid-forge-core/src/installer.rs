//! Package manager detection and install invocation
//!
//! Detects the project's package manager from its lockfile and shells out to
//! install the npm packages behind the selected integrations. This runs after
//! the config file has already been written; install failures never roll the
//! edit back.

use std::fmt;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Result, SolidForgeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
    Pnpm,
}

impl PackageManager {
    /// Detect from lockfiles in the project directory; npm when none is found
    pub fn detect(dir: &Path) -> Self {
        if dir.join("pnpm-lock.yaml").exists() {
            Self::Pnpm
        } else if dir.join("yarn.lock").exists() {
            Self::Yarn
        } else {
            Self::Npm
        }
    }

    /// The package manager executable
    pub fn command(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
        }
    }

    /// The package runner used for one-off executions (degit etc.)
    pub fn runner(&self) -> &'static str {
        match self {
            Self::Npm => "npx",
            Self::Yarn => "npx",
            Self::Pnpm => "pnpx",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command())
    }
}

/// Install packages into the project via `<manager> i <packages>`
pub fn install_packages(dir: &Path, manager: PackageManager, packages: &[String]) -> Result<()> {
    if packages.is_empty() {
        return Ok(());
    }

    let output = Command::new(manager.command())
        .arg("i")
        .args(packages)
        .current_dir(dir)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| SolidForgeError::InstallFailed {
            manager: manager.command().to_string(),
            message: format!("failed to spawn {}: {}", manager.command(), e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SolidForgeError::InstallFailed {
            manager: manager.command().to_string(),
            message: stderr.trim().to_string(),
        });
    }

    Ok(())
}

/// Package names already present in the project's package.json
/// (dependencies and devDependencies). Missing file means none.
pub fn installed_dependencies(dir: &Path) -> Result<Vec<String>> {
    let path = dir.join("package.json");
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&path)?;
    let json: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| SolidForgeError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

    let mut deps = Vec::new();
    for section in ["dependencies", "devDependencies"] {
        if let Some(map) = json.get(section).and_then(|v| v.as_object()) {
            deps.extend(map.keys().cloned());
        }
    }
    Ok(deps)
}
