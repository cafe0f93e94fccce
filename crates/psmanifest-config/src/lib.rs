// crates/psmanifest-config/src/lib.rs
// ============================================================================
// Module: psmanifest Config Library
// Description: Project configuration model for module manifest generation.
// Purpose: Single source of truth for psmanifest.toml semantics.
// Dependencies: serde, toml, thiserror
// ============================================================================

//! ## Overview
//! `psmanifest-config` defines the project configuration consumed by the
//! PowerShell module manifest generator. Loading is size and path limited;
//! content fields are never validated because absent values render as empty
//! strings in the generated manifest.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
