// crates/psmanifest-config/src/config.rs
// ============================================================================
// Module: Project Configuration
// Description: Configuration loading for PowerShell manifest generation.
// Purpose: Provide size-limited TOML parsing with lenient content fields.
// Dependencies: serde, toml, thiserror
// ============================================================================

//! ## Overview
//! Project configuration is loaded from a TOML file with size and path limits.
//! Every content field is optional: missing strings default to empty and
//! render as empty values in the generated manifest. The only hard
//! requirement is a resolvable manifest path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "psmanifest.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "PSMANIFEST_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// File extension appended to `module_name` when `psd1` is not configured.
const MANIFEST_EXTENSION: &str = "psd1";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Project configuration describing a module-publishing target.
///
/// # Invariants
/// - `profiles` preserves input order; duplicate names are permitted.
/// - String fields default to empty rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Module name, used to derive the manifest path when `psd1` is absent.
    #[serde(default)]
    pub module_name: String,
    /// Manifest (`.psd1`) path. Relative paths resolve against the config file.
    #[serde(default)]
    pub psd1: Option<PathBuf>,
    /// Module entry-point script referenced by `RootModule`.
    #[serde(default)]
    pub psm1: String,
    /// Module version string, emitted verbatim.
    #[serde(default)]
    pub module_version: String,
    /// Binary assembly path referenced by `RequiredAssemblies`.
    #[serde(default)]
    pub dll: String,
    /// Format-definition file referenced by `FormatsToProcess`.
    #[serde(default)]
    pub format_ps1xml: String,
    /// Official first-party build flag.
    #[serde(default)]
    pub azure: bool,
    /// Service name used in official descriptions and tags.
    #[serde(default)]
    pub service_name: String,
    /// Ordered profile names.
    #[serde(default)]
    pub profiles: Vec<String>,
    /// Authoring metadata used for non-official builds.
    #[serde(default)]
    pub metadata: ProjectMetadata,
    /// Directory of the config file this project was loaded from.
    #[serde(skip)]
    pub source_dir: Option<PathBuf>,
}

/// Authoring metadata for non-official builds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Author string.
    #[serde(default)]
    pub authors: String,
    /// Company name.
    #[serde(default)]
    pub company_name: String,
    /// Copyright notice.
    #[serde(default)]
    pub copyright: String,
    /// Module description.
    #[serde(default)]
    pub description: String,
}

impl ProjectConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit `path`, then [`CONFIG_ENV_VAR`], then
    /// [`DEFAULT_CONFIG_NAME`] in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", resolved.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.source_dir = resolved.parent().map(Path::to_path_buf);
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from TOML text without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the TOML is malformed.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Validates that a manifest path can be resolved within path limits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when no manifest path is available.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let path = self.manifest_path()?;
        validate_path(&path)
    }

    /// Returns the effective manifest path.
    ///
    /// Uses `psd1` when set, otherwise `<module_name>.psd1`. Relative paths
    /// are joined onto `source_dir` when the config was loaded from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when neither `psd1` nor `module_name`
    /// is configured.
    pub fn manifest_path(&self) -> Result<PathBuf, ConfigError> {
        let relative = match &self.psd1 {
            Some(path) if !path.as_os_str().is_empty() => path.clone(),
            _ => {
                let name = self.module_name.trim();
                if name.is_empty() {
                    return Err(ConfigError::Invalid(
                        "psd1 must be set when module_name is empty".to_string(),
                    ));
                }
                PathBuf::from(format!("{name}.{MANIFEST_EXTENSION}"))
            }
        };
        match &self.source_dir {
            Some(dir) if relative.is_relative() => Ok(dir.join(relative)),
            _ => Ok(relative),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates a path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("path component too long".to_string()));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use super::*;

    #[test]
    fn resolve_path_prefers_explicit_path() {
        let resolved = resolve_path(Some(Path::new("custom.toml"))).unwrap();
        assert_eq!(resolved, PathBuf::from("custom.toml"));
    }

    #[test]
    fn validate_path_rejects_long_component() {
        let component = "a".repeat(MAX_PATH_COMPONENT_LENGTH + 1);
        let result = validate_path(Path::new(&component));
        assert!(result.unwrap_err().to_string().contains("component too long"));
    }

    #[test]
    fn validate_path_rejects_long_total() {
        let segment = "a".repeat(100);
        let path = std::iter::repeat_n(segment.as_str(), 50).collect::<Vec<_>>().join("/");
        assert!(validate_path(Path::new(&path)).is_err());
    }

    #[test]
    fn validate_path_accepts_normal_path() {
        assert!(validate_path(Path::new("./generated/Az.Storage.psd1")).is_ok());
    }
}
