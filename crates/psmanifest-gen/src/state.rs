// crates/psmanifest-gen/src/state.rs
// ============================================================================
// Module: Project State
// Description: Storage seam for reading and writing generated files.
// Purpose: Isolate filesystem access behind a trait with atomic writes.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Generators read and write through [`ProjectState`]. The filesystem
//! implementation bounds reads and replaces files through a temporary
//! sibling so a crash never leaves a half-written manifest. The in-memory
//! implementation backs tests and dry runs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use serde::Serialize;
use serde::Serializer;

use crate::ManifestError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum manifest size accepted when reading existing files.
pub const MAX_MANIFEST_BYTES: u64 = 1024 * 1024;

/// Attempts made to allocate a unique temporary output path.
const TEMP_ATTEMPTS: usize = 16;

/// Counter distinguishing temporary output files within a process.
static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

// ============================================================================
// SECTION: Types
// ============================================================================

/// Content classification attached to written files for downstream
/// formatting and encoding steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// PowerShell source (`.psd1`, `.psm1`, `.ps1`).
    PowerShellSource,
    /// Plain text.
    Text,
}

impl ContentKind {
    /// Returns a stable label for the content kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PowerShellSource => "source-file-powershell",
            Self::Text => "text",
        }
    }
}

impl Serialize for ContentKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Read/write access to project files.
pub trait ProjectState: Send + Sync {
    /// Reads a file, returning `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Io`] when the file exists but cannot be read.
    fn read_file(&self, path: &Path) -> Result<Option<String>, ManifestError>;

    /// Writes the full contents of a file.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Io`] when the file cannot be written.
    fn write_file(&self, path: &Path, contents: &str, kind: ContentKind)
    -> Result<(), ManifestError>;
}

// ============================================================================
// SECTION: Filesystem State
// ============================================================================

/// Filesystem-backed project state.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProjectState;

impl ProjectState for FsProjectState {
    fn read_file(&self, path: &Path) -> Result<Option<String>, ManifestError> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_error(path, &err)),
        };
        let mut bytes = Vec::new();
        let mut limited = file.take(MAX_MANIFEST_BYTES + 1);
        limited.read_to_end(&mut bytes).map_err(|err| io_error(path, &err))?;
        let size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        if size > MAX_MANIFEST_BYTES {
            return Err(ManifestError::Io(format!(
                "{}: manifest exceeds {MAX_MANIFEST_BYTES} bytes",
                path.display()
            )));
        }
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| ManifestError::Io(format!("{}: manifest must be utf-8", path.display())))
    }

    /// Parent directories are created when missing. Contents are written to
    /// a temporary sibling and then moved into place.
    fn write_file(
        &self,
        path: &Path,
        contents: &str,
        _kind: ContentKind,
    ) -> Result<(), ManifestError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| io_error(parent, &err))?;
        }
        let (temp_path, mut file) = create_temp_output(path)?;
        if let Err(err) = file.write_all(contents.as_bytes()) {
            let _ = fs::remove_file(&temp_path);
            return Err(io_error(path, &err));
        }
        if let Err(err) = file.sync_all() {
            let _ = fs::remove_file(&temp_path);
            return Err(io_error(path, &err));
        }
        persist_temp_output(&temp_path, path)
    }
}

/// Creates a unique temporary output file alongside the destination.
fn create_temp_output(path: &Path) -> Result<(PathBuf, fs::File), ManifestError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().and_then(|name| name.to_str()).ok_or_else(|| {
        ManifestError::Io(format!("{}: output path has no file name", path.display()))
    })?;
    for _ in 0 .. TEMP_ATTEMPTS {
        let attempt = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp_name = format!(".{file_name}.tmp.{}.{}", std::process::id(), attempt);
        let temp_path = parent.join(temp_name);
        match OpenOptions::new().write(true).create_new(true).open(&temp_path) {
            Ok(file) => return Ok((temp_path, file)),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
            Err(err) => return Err(io_error(&temp_path, &err)),
        }
    }
    Err(ManifestError::Io(format!("{}: failed to allocate temporary output", path.display())))
}

/// Moves the temporary output into place.
///
/// On platforms without atomic replace, this falls back to remove-and-rename.
fn persist_temp_output(temp_path: &Path, path: &Path) -> Result<(), ManifestError> {
    match fs::rename(temp_path, path) {
        Ok(()) => Ok(()),
        Err(err) => {
            if path.exists() {
                let replaced = fs::remove_file(path).and_then(|()| fs::rename(temp_path, path));
                if let Err(err) = replaced {
                    let _ = fs::remove_file(temp_path);
                    return Err(io_error(path, &err));
                }
                return Ok(());
            }
            let _ = fs::remove_file(temp_path);
            Err(io_error(path, &err))
        }
    }
}

/// Formats an I/O failure with its path.
fn io_error(path: &Path, err: &std::io::Error) -> ManifestError {
    ManifestError::Io(format!("{}: {err}", path.display()))
}

// ============================================================================
// SECTION: In-Memory State
// ============================================================================

/// In-memory project state.
///
/// # Invariants
/// - Each path maps to the most recent write and its content kind.
#[derive(Debug, Default)]
pub struct MemoryProjectState {
    /// Files keyed by path.
    files: Mutex<BTreeMap<PathBuf, (String, ContentKind)>>,
}

impl MemoryProjectState {
    /// Creates an empty in-memory state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a file as plain text.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), (contents.into(), ContentKind::Text));
    }

    /// Returns the contents of a file.
    #[must_use]
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .map(|(contents, _)| contents.clone())
    }

    /// Returns the content kind recorded for the last write of a file.
    #[must_use]
    pub fn kind(&self, path: &Path) -> Option<ContentKind> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner).get(path).map(|(_, kind)| *kind)
    }
}

impl ProjectState for MemoryProjectState {
    fn read_file(&self, path: &Path) -> Result<Option<String>, ManifestError> {
        Ok(self.contents(path))
    }

    fn write_file(
        &self,
        path: &Path,
        contents: &str,
        kind: ContentKind,
    ) -> Result<(), ManifestError> {
        self.files
            .lock()
            .map_err(|_| ManifestError::Io(format!("{}: state lock poisoned", path.display())))?
            .insert(path.to_path_buf(), (contents.to_string(), kind));
        Ok(())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
