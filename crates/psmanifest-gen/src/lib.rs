// crates/psmanifest-gen/src/lib.rs
// ============================================================================
// Module: Manifest Generator Library
// Description: Region-merging generator for PowerShell module manifests.
// Purpose: Render `.psd1` manifests from project configuration.
// Dependencies: psmanifest-config, serde, serde_json, thiserror, uuid
// ============================================================================

//! ## Overview
//! This crate writes the generated parts of a PowerShell module manifest
//! (`.psd1`) from a [`ProjectConfig`]. Generated text lives in named regions
//! delimited by `# region <name>` / `# endregion` markers; everything else in
//! the file belongs to the user and is carried through unchanged.
//!
//! ### Design Notes
//! - One synchronous pass: read, merge three regions, write once.
//! - The `persistent data` region (module GUID) is created once and then
//!   preserved so the module identity is stable across rebuilds.
//! - Missing configuration values render as empty strings, never errors.
//!
//! ## Index
//! - Public API: [`ManifestGenerator`], [`generate_psd1`], [`ManifestError`]
//! - Document model: [`region::RegionFile`]
//! - Seams: [`state::ProjectState`], [`guid::GuidSource`],
//!   [`events::GenerationEventSink`]
//!
//! [`ProjectConfig`]: psmanifest_config::ProjectConfig

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod events;
pub mod generator;
pub mod guid;
pub mod region;
pub mod state;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use generator::GenerationReport;
pub use generator::ManifestGenerator;
pub use generator::REGION_DEFINITION;
pub use generator::REGION_PERSISTENT_DATA;
pub use generator::REGION_PRIVATE_DATA;
pub use generator::Rendered;
pub use generator::generate_psd1;
use psmanifest_config::ConfigError;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the manifest generator.
///
/// # Invariants
/// - Variant meanings are stable for automation and tests.
///
/// # Examples
/// ```
/// use psmanifest_gen::ManifestError;
///
/// let err = ManifestError::Io("disk full".to_string());
/// assert_eq!(err.to_string(), "io error: disk full");
/// ```
#[derive(Debug, Error)]
pub enum ManifestError {
    /// IO error while reading or writing files.
    #[error("io error: {0}")]
    Io(String),
    /// Project configuration error.
    #[error("config error: {0}")]
    Config(String),
    /// On-disk manifest differs from the generated output.
    #[error("drift: {0}")]
    Drift(String),
}

impl From<ConfigError> for ManifestError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
