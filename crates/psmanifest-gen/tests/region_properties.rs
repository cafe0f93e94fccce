//! Property tests for region documents and branding selection.
// crates/psmanifest-gen/tests/region_properties.rs
// =============================================================================
// Module: Region and Branding Property Tests
// Description: Randomized checks for lossless parsing and field selection.
// Purpose: Hold the preservation and official-build rules for any input.
// =============================================================================

use proptest::prelude::*;
use psmanifest_config::ProjectConfig;
use psmanifest_config::ProjectMetadata;
use psmanifest_gen::ManifestGenerator;
use psmanifest_gen::REGION_DEFINITION;
use psmanifest_gen::REGION_PRIVATE_DATA;
use psmanifest_gen::events::NoopEventSink;
use psmanifest_gen::guid::FixedGuidSource;
use psmanifest_gen::region::Line;
use psmanifest_gen::region::RegionFile;
use psmanifest_gen::region::RegionPlacement;
use psmanifest_gen::state::MemoryProjectState;

mod common;

fn text_line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ -~]{0,20}",
        Just("# region definition".to_string()),
        Just("  #region private data".to_string()),
        Just("# endregion".to_string()),
        Just("@{".to_string()),
        Just("}".to_string()),
        Just(String::new()),
    ]
}

fn document() -> impl Strategy<Value = String> {
    (prop::collection::vec(text_line(), 0 .. 16), prop::bool::ANY, prop::bool::ANY).prop_map(
        |(lines, crlf, trailing)| {
            let newline = if crlf { "\r\n" } else { "\n" };
            let mut text = lines.join(newline);
            if trailing && !text.is_empty() {
                text.push_str(newline);
            }
            text
        },
    )
}

fn field() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 .,()-]{0,24}"
}

fn project(azure: bool, metadata: ProjectMetadata, service_name: String) -> ProjectConfig {
    ProjectConfig {
        azure,
        metadata,
        service_name,
        ..common::community_project()
    }
}

fn metadata() -> impl Strategy<Value = ProjectMetadata> {
    (field(), field(), field(), field()).prop_map(
        |(authors, company_name, copyright, description)| ProjectMetadata {
            authors,
            company_name,
            copyright,
            description,
        },
    )
}

fn render(project: &ProjectConfig, existing: Option<&str>) -> String {
    let state = MemoryProjectState::new();
    let guids = FixedGuidSource::new(common::FIXED_GUID);
    ManifestGenerator::new(&state, &guids, &NoopEventSink).render(project, existing).text
}

proptest! {
    #[test]
    fn parse_then_text_is_lossless(text in document()) {
        prop_assert_eq!(RegionFile::parse(&text).text(), text);
    }

    #[test]
    fn replacing_existing_region_keeps_other_text(
        before in "[a-z =']{0,12}",
        after in "[a-z =']{0,12}",
        body in prop::collection::vec("[a-z]{1,8}", 0 .. 4),
    ) {
        let original = format!("{before}\n# region target\nold\n# endregion\n{after}\n");
        let mut file = RegionFile::parse(&original);
        let lines: Vec<Line> = body.iter().map(|text| Line::new(0, text.as_str())).collect();
        file.set_region("target", &lines, RegionPlacement::End);
        let mut expected_body = String::new();
        for text in &body {
            expected_body.push_str(text);
            expected_body.push('\n');
        }
        prop_assert_eq!(
            file.text(),
            format!("{before}\n# region target\n{expected_body}# endregion\n{after}\n")
        );
    }

    #[test]
    fn official_build_ignores_metadata(meta in metadata(), service in "[A-Za-z]{1,12}") {
        let text = render(&project(true, meta, service.clone()), None);
        let value = |key: &str| common::region_value(&text, REGION_DEFINITION, key);
        prop_assert_eq!(value("Author"), Some("'Microsoft Corporation'".to_string()));
        prop_assert_eq!(value("CompanyName"), Some("'Microsoft Corporation'".to_string()));
        prop_assert_eq!(
            value("Copyright"),
            Some("'Microsoft Corporation. All rights reserved.'".to_string())
        );
        prop_assert_eq!(
            value("Description"),
            Some(format!("'Microsoft Azure PowerShell: {service} cmdlets'"))
        );
    }

    #[test]
    fn community_build_uses_metadata_verbatim(meta in metadata(), service in "[A-Za-z]{1,12}") {
        let text = render(&project(false, meta.clone(), service), None);
        let value = |key: &str| common::region_value(&text, REGION_DEFINITION, key);
        prop_assert_eq!(value("Author"), Some(format!("'{}'", meta.authors)));
        prop_assert_eq!(value("CompanyName"), Some(format!("'{}'", meta.company_name)));
        prop_assert_eq!(value("Copyright"), Some(format!("'{}'", meta.copyright)));
        prop_assert_eq!(value("Description"), Some(format!("'{}'", meta.description)));
        let tags = common::region_value(&text, REGION_PRIVATE_DATA, "Tags");
        prop_assert_eq!(tags, Some("''".to_string()));
    }

    #[test]
    fn profiles_keep_input_order(
        azure in prop::bool::ANY,
        profiles in prop::collection::vec("[a-z0-9-]{1,16}", 0 .. 5),
    ) {
        let project = ProjectConfig {
            azure,
            profiles: profiles.clone(),
            ..common::community_project()
        };
        let text = render(&project, None);
        let line = common::region_value(&text, REGION_PRIVATE_DATA, "Profiles");
        if azure && !profiles.is_empty() {
            let expected = profiles
                .iter()
                .map(|profile| format!("'{profile}'"))
                .collect::<Vec<_>>()
                .join(", ");
            prop_assert_eq!(line, Some(expected));
        } else {
            prop_assert_eq!(line, None);
        }
    }

    #[test]
    fn generation_preserves_unmanaged_text(
        header in "[ -~&&[^#]]{0,20}",
        middle in "[ -~&&[^#}]]{0,20}",
        footer in "[ -~&&[^#]]{0,20}",
    ) {
        let existing = format!(
            "{header}\n@{{\n  # region definition\n  # endregion\n{middle}\n  \
             # region persistent data\n  GUID = 'x'\n  # endregion\n  \
             # region private data\n  # endregion\n}}\n{footer}\n"
        );
        let text = render(&common::official_project(), Some(&existing));
        prop_assert_eq!(
            common::without_region_bodies(&text),
            common::without_region_bodies(&existing)
        );
    }
}
