// crates/psmanifest-gen/src/events.rs
// ============================================================================
// Module: Generation Events
// Description: Structured JSON-line events for manifest generation.
// Purpose: Report what a generation pass wrote without a logging framework.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Each generation pass emits one [`GenerationEvent`]. Sinks serialize
//! events as JSON lines to stderr or an append-only file, or drop them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::state::ContentKind;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Manifest generation event payload.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Manifest path written.
    pub manifest_path: String,
    /// Content kind attached to the write.
    pub content_kind: ContentKind,
    /// Whether official-build branding was used.
    pub official_build: bool,
    /// Regions written during the pass, in write order.
    pub regions_written: Vec<&'static str>,
    /// Whether a new GUID was generated.
    pub guid_created: bool,
    /// Size of the serialized manifest.
    pub bytes_written: usize,
}

/// Inputs for building a [`GenerationEvent`].
#[derive(Debug, Clone)]
pub struct GenerationEventParams {
    /// Manifest path written.
    pub manifest_path: String,
    /// Content kind attached to the write.
    pub content_kind: ContentKind,
    /// Whether official-build branding was used.
    pub official_build: bool,
    /// Regions written during the pass.
    pub regions_written: Vec<&'static str>,
    /// Whether a new GUID was generated.
    pub guid_created: bool,
    /// Size of the serialized manifest.
    pub bytes_written: usize,
}

impl GenerationEvent {
    /// Builds a `psd1_generated` event stamped with the current time.
    #[must_use]
    pub fn new(params: GenerationEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "psd1_generated",
            timestamp_ms,
            manifest_path: params.manifest_path,
            content_kind: params.content_kind,
            official_build: params.official_build,
            regions_written: params.regions_written,
            guid_created: params.guid_created,
            bytes_written: params.bytes_written,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Destination for generation events.
pub trait GenerationEventSink: Send + Sync {
    /// Record a generation event.
    fn record(&self, event: &GenerationEvent);
}

/// Event sink that logs JSON lines to stderr.
pub struct StderrEventSink;

impl GenerationEventSink for StderrEventSink {
    fn record(&self, event: &GenerationEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Event sink that appends JSON lines to a file.
pub struct FileEventSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileEventSink {
    /// Opens the event log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl GenerationEventSink for FileEventSink {
    fn record(&self, event: &GenerationEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
        }
    }
}

/// No-op event sink.
pub struct NoopEventSink;

impl GenerationEventSink for NoopEventSink {
    fn record(&self, _event: &GenerationEvent) {}
}
