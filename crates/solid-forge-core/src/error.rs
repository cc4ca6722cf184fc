use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolidForgeError {
    #[error("Parse error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Unsupported config structure: {message}")]
    Structure { message: String },

    #[error("Emit failure: {message}")]
    Emit { message: String },

    #[error("Config file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to parse {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Unknown config key: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("Invalid value for {key}: '{value}'")]
    InvalidConfigValue { key: String, value: String },

    #[error("Package install via {manager} failed: {message}")]
    InstallFailed { manager: String, message: String },

    #[error("Scaffold failed: {message}")]
    Scaffold { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Home directory not found")]
    HomeNotFound,
}

pub type Result<T> = std::result::Result<T, SolidForgeError>;

impl SolidForgeError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Parse { .. } => 2,
            Self::Structure { .. } => 3,
            Self::ConfigNotFound { .. } => 4,
            Self::InstallFailed { .. } => 5,
            Self::Scaffold { .. } => 6,
            Self::Emit { .. } => 7,
            _ => 1,
        }
    }
}
