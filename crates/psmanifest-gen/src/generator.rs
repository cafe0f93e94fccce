// crates/psmanifest-gen/src/generator.rs
// ============================================================================
// Module: Manifest Generator
// Description: Renders the three generated regions of a module manifest.
// Purpose: Merge project configuration into an existing `.psd1` file.
// Dependencies: psmanifest-config
// ============================================================================

//! ## Overview
//! [`ManifestGenerator`] reads the current manifest (absent means empty),
//! rewrites the `definition` and `private data` regions from the project
//! configuration, adds a `persistent data` region holding a GUID only when
//! none exists, and writes the merged document back as PowerShell source.
//!
//! ### Design Notes
//! - Values are emitted verbatim inside single quotes; no escaping is applied.
//! - Missing configuration strings render as `''`.
//! - Official builds replace authoring metadata with fixed first-party text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use psmanifest_config::ProjectConfig;

use crate::ManifestError;
use crate::events::GenerationEvent;
use crate::events::GenerationEventParams;
use crate::events::GenerationEventSink;
use crate::events::NoopEventSink;
use crate::guid::GuidSource;
use crate::guid::RandomGuidSource;
use crate::region::Line;
use crate::region::RegionFile;
use crate::region::RegionPlacement;
use crate::state::ContentKind;
use crate::state::ProjectState;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Region holding module identity and requirements.
pub const REGION_DEFINITION: &str = "definition";
/// Region holding the stable module GUID.
pub const REGION_PERSISTENT_DATA: &str = "persistent data";
/// Region holding gallery packaging data.
pub const REGION_PRIVATE_DATA: &str = "private data";

/// First-party author and company name.
const OFFICIAL_AUTHOR: &str = "Microsoft Corporation";
/// First-party copyright notice.
const OFFICIAL_COPYRIGHT: &str = "Microsoft Corporation. All rights reserved.";
/// First-party license URI.
const OFFICIAL_LICENSE_URI: &str = "https://aka.ms/azps-license";
/// First-party project URI.
const OFFICIAL_PROJECT_URI: &str = "https://github.com/Azure/azure-powershell";
/// Minimum PowerShell host version.
const POWERSHELL_VERSION: &str = "5.1";
/// Minimum .NET Framework version.
const DOTNET_FRAMEWORK_VERSION: &str = "4.7.2";
/// Empty PowerShell string literal.
const EMPTY_LITERAL: &str = "''";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Merged manifest text produced by [`ManifestGenerator::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Full serialized manifest.
    pub text: String,
    /// Regions written, in write order.
    pub regions_written: Vec<&'static str>,
    /// Whether a new GUID was generated.
    pub guid_created: bool,
}

/// Outcome of a generation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Manifest path written.
    pub manifest_path: PathBuf,
    /// Regions written, in write order.
    pub regions_written: Vec<&'static str>,
    /// Whether a new GUID was generated.
    pub guid_created: bool,
    /// Size of the serialized manifest.
    pub bytes_written: usize,
}

/// Module manifest generator bound to storage, identifier and event seams.
///
/// # Invariants
/// - Text outside the three generated regions is never modified.
/// - An existing `persistent data` region is never rewritten.
pub struct ManifestGenerator<'a> {
    /// File access for the manifest.
    state: &'a dyn ProjectState,
    /// GUID source used when the manifest has no identifier yet.
    guids: &'a dyn GuidSource,
    /// Destination for generation events.
    events: &'a dyn GenerationEventSink,
}

impl<'a> ManifestGenerator<'a> {
    /// Creates a generator over the given seams.
    #[must_use]
    pub fn new(
        state: &'a dyn ProjectState,
        guids: &'a dyn GuidSource,
        events: &'a dyn GenerationEventSink,
    ) -> Self {
        Self {
            state,
            guids,
            events,
        }
    }

    /// Merges generated regions into `existing` without touching storage.
    #[must_use]
    pub fn render(&self, project: &ProjectConfig, existing: Option<&str>) -> Rendered {
        let mut psd1 = RegionFile::psd(existing.unwrap_or_default());
        let mut regions_written = Vec::with_capacity(3);

        psd1.set_region(REGION_DEFINITION, &definition_lines(project), RegionPlacement::End);
        regions_written.push(REGION_DEFINITION);

        let guid_created = !psd1.has(REGION_PERSISTENT_DATA);
        if guid_created {
            let guid = self.guids.next_guid();
            psd1.set_region(
                REGION_PERSISTENT_DATA,
                &persistent_data_lines(&guid),
                RegionPlacement::End,
            );
            regions_written.push(REGION_PERSISTENT_DATA);
        }

        psd1.set_region(REGION_PRIVATE_DATA, &private_data_lines(project), RegionPlacement::End);
        regions_written.push(REGION_PRIVATE_DATA);

        Rendered {
            text: psd1.text(),
            regions_written,
            guid_created,
        }
    }

    /// Regenerates the manifest on storage.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Config`] when no manifest path is configured
    /// and [`ManifestError::Io`] when reading or writing fails.
    pub fn generate(&self, project: &ProjectConfig) -> Result<GenerationReport, ManifestError> {
        let manifest_path = project.manifest_path()?;
        let existing = self.state.read_file(&manifest_path)?;
        let rendered = self.render(project, existing.as_deref());
        self.state.write_file(&manifest_path, &rendered.text, ContentKind::PowerShellSource)?;
        let report = GenerationReport {
            manifest_path,
            regions_written: rendered.regions_written,
            guid_created: rendered.guid_created,
            bytes_written: rendered.text.len(),
        };
        self.events.record(&GenerationEvent::new(GenerationEventParams {
            manifest_path: report.manifest_path.display().to_string(),
            content_kind: ContentKind::PowerShellSource,
            official_build: project.azure,
            regions_written: report.regions_written.clone(),
            guid_created: report.guid_created,
            bytes_written: report.bytes_written,
        }));
        Ok(report)
    }

    /// Verifies the manifest on storage matches what generation would write.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Drift`] when the manifest is missing, lacks a
    /// GUID, or differs from the regenerated text.
    pub fn check(&self, project: &ProjectConfig) -> Result<(), ManifestError> {
        let manifest_path = project.manifest_path()?;
        let Some(existing) = self.state.read_file(&manifest_path)? else {
            return Err(ManifestError::Drift(format!(
                "{} does not exist. Run psmanifest-gen generate.",
                manifest_path.display()
            )));
        };
        let rendered = self.render(project, Some(&existing));
        if rendered.guid_created || rendered.text != existing {
            return Err(ManifestError::Drift(format!(
                "manifest drift detected for {}. Run psmanifest-gen generate.",
                manifest_path.display()
            )));
        }
        Ok(())
    }
}

/// Regenerates the manifest with random GUIDs and no event reporting.
///
/// # Errors
///
/// Returns [`ManifestError`] when the manifest path is missing or storage
/// access fails.
pub fn generate_psd1(
    project: &ProjectConfig,
    state: &dyn ProjectState,
) -> Result<(), ManifestError> {
    ManifestGenerator::new(state, &RandomGuidSource, &NoopEventSink).generate(project)?;
    Ok(())
}

// ============================================================================
// SECTION: Region Bodies
// ============================================================================

/// Builds the `definition` region body.
fn definition_lines(project: &ProjectConfig) -> Vec<Line> {
    let official = project.azure;
    let metadata = &project.metadata;
    let author = if official { OFFICIAL_AUTHOR } else { metadata.authors.as_str() };
    let company_name = if official { OFFICIAL_AUTHOR } else { metadata.company_name.as_str() };
    let copyright = if official { OFFICIAL_COPYRIGHT } else { metadata.copyright.as_str() };
    let description = if official {
        format!("Microsoft Azure PowerShell: {} cmdlets", project.service_name)
    } else {
        metadata.description.clone()
    };
    vec![
        assignment(1, "RootModule", &project.psm1),
        assignment(1, "ModuleVersion", &project.module_version),
        Line::indented("CompatiblePSEditions = 'Core', 'Desktop'"),
        assignment(1, "Author", author),
        assignment(1, "CompanyName", company_name),
        assignment(1, "Copyright", copyright),
        assignment(1, "Description", &description),
        assignment(1, "PowerShellVersion", POWERSHELL_VERSION),
        assignment(1, "DotNetFrameworkVersion", DOTNET_FRAMEWORK_VERSION),
        assignment(1, "RequiredAssemblies", &project.dll),
        assignment(1, "FormatsToProcess", &project.format_ps1xml),
    ]
}

/// Builds the `persistent data` region body.
fn persistent_data_lines(guid: &str) -> Vec<Line> {
    vec![assignment(1, "GUID", guid)]
}

/// Builds the `private data` region body.
fn private_data_lines(project: &ProjectConfig) -> Vec<Line> {
    let official = project.azure;
    let tags = if official {
        quoted_list(["Azure", "ResourceManager", "ARM", project.service_name.as_str()])
    } else {
        EMPTY_LITERAL.to_string()
    };
    let license_uri = if official { OFFICIAL_LICENSE_URI } else { "" };
    let project_uri = if official { OFFICIAL_PROJECT_URI } else { "" };

    let mut lines = vec![
        Line::new(1, "PrivateData = @{"),
        Line::new(2, "PSData = @{"),
        Line::new(3, format!("Tags = {tags}")),
        assignment(3, "LicenseUri", license_uri),
        assignment(3, "ProjectUri", project_uri),
        Line::new(3, format!("ReleaseNotes = {EMPTY_LITERAL}")),
    ];
    if official && !project.profiles.is_empty() {
        let profiles = quoted_list(project.profiles.iter().map(String::as_str));
        lines.push(Line::new(3, format!("Profiles = {profiles}")));
    }
    lines.push(Line::new(2, "}"));
    lines.push(Line::new(1, "}"));
    lines
}

// ============================================================================
// SECTION: Formatting Helpers
// ============================================================================

/// Formats `Key = 'value'` at the given level.
fn assignment(level: usize, key: &str, value: &str) -> Line {
    Line::new(level, format!("{key} = '{value}'"))
}

/// Formats values as a comma-separated list of single-quoted strings.
fn quoted_list<'v>(values: impl IntoIterator<Item = &'v str>) -> String {
    values.into_iter().map(|value| format!("'{value}'")).collect::<Vec<_>>().join(", ")
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

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines.iter().map(|line| line.text.as_str()).collect()
    }

    #[test]
    fn definition_lines_follow_fixed_order() {
        let project = ProjectConfig {
            psm1: "./Az.Test.psm1".to_string(),
            module_version: "1.2.3".to_string(),
            dll: "./bin/Az.Test.private.dll".to_string(),
            format_ps1xml: "./Az.Test.format.ps1xml".to_string(),
            ..ProjectConfig::default()
        };
        let lines = definition_lines(&project);
        let keys: Vec<&str> = lines
            .iter()
            .filter_map(|line| line.text.split(" = ").next())
            .collect();
        assert_eq!(keys, vec![
            "RootModule",
            "ModuleVersion",
            "CompatiblePSEditions",
            "Author",
            "CompanyName",
            "Copyright",
            "Description",
            "PowerShellVersion",
            "DotNetFrameworkVersion",
            "RequiredAssemblies",
            "FormatsToProcess",
        ]);
        assert!(lines.iter().all(|line| line.level == 1));
        assert_eq!(lines[9].text, "RequiredAssemblies = './bin/Az.Test.private.dll'");
    }

    #[test]
    fn private_data_nesting_levels() {
        let project = ProjectConfig {
            azure: true,
            service_name: "Storage".to_string(),
            profiles: vec!["latest".to_string()],
            ..ProjectConfig::default()
        };
        let lines = private_data_lines(&project);
        let levels: Vec<usize> = lines.iter().map(|line| line.level).collect();
        assert_eq!(levels, vec![1, 2, 3, 3, 3, 3, 3, 2, 1]);
        assert_eq!(texts(&lines)[2], "Tags = 'Azure', 'ResourceManager', 'ARM', 'Storage'");
        assert_eq!(texts(&lines)[6], "Profiles = 'latest'");
    }

    #[test]
    fn unofficial_private_data_uses_empty_literals() {
        let project = ProjectConfig {
            service_name: "Storage".to_string(),
            profiles: vec!["latest".to_string()],
            ..ProjectConfig::default()
        };
        assert_eq!(texts(&private_data_lines(&project)), vec![
            "PrivateData = @{",
            "PSData = @{",
            "Tags = ''",
            "LicenseUri = ''",
            "ProjectUri = ''",
            "ReleaseNotes = ''",
            "}",
            "}",
        ]);
    }

    #[test]
    fn quoted_list_joins_with_comma_space() {
        assert_eq!(quoted_list(["a", "b"]), "'a', 'b'");
        assert_eq!(quoted_list([]), "");
    }
}
