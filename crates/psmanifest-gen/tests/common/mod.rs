// crates/psmanifest-gen/tests/common/mod.rs
// =============================================================================
// Module: Manifest Generator Test Helpers
// Description: Shared fixtures for manifest generation tests.
// Purpose: Reduce duplication across integration tests for psmanifest-gen.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::path::PathBuf;

use psmanifest_config::ProjectConfig;
use psmanifest_config::ProjectMetadata;
use psmanifest_gen::region::RegionFile;

/// Manifest path used by in-memory fixtures.
pub const MANIFEST_PATH: &str = "Az.Storage.psd1";

/// Fixed GUID used where tests need reproducible output.
pub const FIXED_GUID: &str = "3b8a6f0e-5c1d-4f7a-9e2b-0d4c6a8e1f35";

/// Returns a non-official project with populated metadata.
pub fn community_project() -> ProjectConfig {
    ProjectConfig {
        module_name: "Az.Storage".to_string(),
        psd1: Some(PathBuf::from(MANIFEST_PATH)),
        psm1: "./Az.Storage.psm1".to_string(),
        module_version: "0.1.0".to_string(),
        dll: "./bin/Az.Storage.private.dll".to_string(),
        format_ps1xml: "./Az.Storage.format.ps1xml".to_string(),
        azure: false,
        service_name: "Storage".to_string(),
        profiles: vec!["2019-03-01-hybrid".to_string(), "latest".to_string()],
        metadata: ProjectMetadata {
            authors: "Contoso".to_string(),
            company_name: "Contoso Ltd".to_string(),
            copyright: "(c) Contoso".to_string(),
            description: "Contoso storage cmdlets".to_string(),
        },
        source_dir: None,
    }
}

/// Returns an official project with the same inputs as [`community_project`].
pub fn official_project() -> ProjectConfig {
    ProjectConfig {
        azure: true,
        ..community_project()
    }
}

/// Returns the value text of `Key = value` inside a region body.
pub fn region_value(text: &str, region: &str, key: &str) -> Option<String> {
    let file = RegionFile::parse(text);
    let body = file.region_body(region)?;
    let prefix = format!("{key} = ");
    body.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix(prefix.as_str()))
        .map(str::to_string)
}

/// Returns the text with every region body emptied, leaving unmanaged text
/// and markers.
pub fn without_region_bodies(text: &str) -> String {
    let mut file = RegionFile::parse(text);
    let names: Vec<String> = file.region_names().into_iter().map(str::to_string).collect();
    for name in names {
        file.set_region(&name, &[], psmanifest_gen::region::RegionPlacement::End);
    }
    file.text()
}
