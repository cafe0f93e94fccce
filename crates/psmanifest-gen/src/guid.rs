// crates/psmanifest-gen/src/guid.rs
// ============================================================================
// Module: Module Identifiers
// Description: Sources for the manifest's persistent GUID.
// Purpose: Allow random identifiers in production and fixed ones in tests.
// Dependencies: uuid
// ============================================================================

//! ## Overview
//! A module manifest carries a GUID that must stay stable across
//! regenerations. The generator asks a [`GuidSource`] for one only when the
//! manifest has none yet.

use uuid::Uuid;

/// Source of canonical (hyphenated, lowercase) GUID strings.
pub trait GuidSource: Send + Sync {
    /// Returns a new identifier.
    fn next_guid(&self) -> String;
}

/// Random version 4 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGuidSource;

impl GuidSource for RandomGuidSource {
    fn next_guid(&self) -> String {
        Uuid::new_v4().hyphenated().to_string()
    }
}

/// Always returns the same identifier.
#[derive(Debug, Clone)]
pub struct FixedGuidSource {
    /// Identifier returned by every call.
    guid: String,
}

impl FixedGuidSource {
    /// Creates a source that returns `guid`.
    #[must_use]
    pub fn new(guid: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
        }
    }
}

impl GuidSource for FixedGuidSource {
    fn next_guid(&self) -> String {
        self.guid.clone()
    }
}
