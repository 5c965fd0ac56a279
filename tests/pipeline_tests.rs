//! Pipeline and CLI integration tests.
//!
//! These tests exercise translate → filter → diff end to end against the
//! fixture source tree, plus the error paths of each stage.

use scrub_tools::config::{
    BehaviorConfig, DiffConfig, DiffSettings, FileListConfig, FilterConfig, FilteringConfig,
    OutputConfig, TranslateConfig,
};
use scrub_tools::filter::{build_file_list, FileListRules};
use scrub_tools::parsers::{parse_file, SourceFormat};
use scrub_tools::pipeline::{
    diff_directories, filter_directory, perform_translation, PipelineError, SARIF_RESULTS_DIR,
};
use scrub_tools::reports::{OutputFormat, SarifVersion};
use scrub_tools::Priority;
use std::path::{Path, PathBuf};

// ============================================================================
// Test Fixtures
// ============================================================================

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> PathBuf {
    Path::new(FIXTURES_DIR).join(name)
}

fn filter_config(output_dir: &Path) -> FilterConfig {
    FilterConfig {
        raw_dir: fixture_path("raw"),
        output_dir: output_dir.to_path_buf(),
        source_root: fixture_path("tree"),
        filtering: FilteringConfig {
            rules_file: Some(fixture_path("SCRUBFilters")),
            query_exclusions_file: Some(fixture_path("SCRUBExcludeQueries")),
            ..FilteringConfig::default()
        },
        output: OutputConfig::default(),
        behavior: BehaviorConfig {
            quiet: true,
            ..BehaviorConfig::default()
        },
    }
}

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(path, content).expect("write");
}

// ============================================================================
// Translation
// ============================================================================

mod translate_stage {
    use super::*;

    #[test]
    fn sarif_fixture_to_scrub() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("coverity_raw.scrub");
        let summary = perform_translation(&TranslateConfig {
            input: fixture_path("raw/coverity_raw.sarif"),
            input_format: SourceFormat::Sarif,
            output: Some(output.clone()),
            output_format: OutputFormat::Scrub,
            source_root: fixture_path("tree"),
            tool_name: None,
            sonarqube_url: None,
            require_output: true,
        })
        .expect("translation should succeed");
        assert_eq!(summary.records, 3);
        assert_eq!(summary.tool.as_deref(), Some("coverity"));

        let parsed = parse_file(&output, SourceFormat::Scrub, &fixture_path("tree"))
            .expect("output should parse");
        assert!(parsed.issues.is_empty());
        let first = &parsed.records[0];
        assert_eq!(first.id, "coverity001");
        assert_eq!(first.priority, Priority::High);
        assert_eq!(first.query.as_deref(), Some("NULL_RETURNS"));
        assert_eq!(first.file, fixture_path("tree/src/bar.c"));
        assert_eq!(first.line, 10);
        assert_eq!(first.code_flow.len(), 1);
        assert_eq!(first.code_flow[0].line, 5);
        assert_eq!(parsed.records[1].priority, Priority::Med);
    }

    #[test]
    fn scrub_fixture_to_sarif_v200_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("gcc.sarif");
        perform_translation(&TranslateConfig {
            input: fixture_path("raw/gcc_compiler_raw.scrub"),
            input_format: SourceFormat::Scrub,
            output: Some(output.clone()),
            output_format: OutputFormat::Sarif(SarifVersion::V2_0_0),
            source_root: fixture_path("tree"),
            tool_name: None,
            sonarqube_url: None,
            require_output: false,
        })
        .expect("translation should succeed");

        let text = std::fs::read_to_string(&output).expect("read");
        let doc: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(doc["version"], "2.0.0");
        assert_eq!(doc["runs"][0]["tool"]["name"], "gcc");
        assert!(doc["runs"][0]["resources"]["rules"]["-Wunused-variable"].is_object());

        // SRCROOT in the document resolves the relative uris again.
        let back = parse_file(&output, SourceFormat::Sarif, Path::new("/elsewhere"))
            .expect("SARIF output should parse");
        assert_eq!(back.records.len(), 3);
        assert_eq!(back.records[0].file, fixture_path("tree/src/foo.c"));
        assert_eq!(back.records[0].line, 5);
        assert_eq!(back.records[0].description, vec!["Unused variable 'x'."]);
    }

    #[test]
    fn unsupported_sarif_version_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("old.sarif");
        write(&input, r#"{"version": "1.0.0", "runs": []}"#);
        let err = perform_translation(&TranslateConfig {
            input,
            input_format: SourceFormat::Sarif,
            output: None,
            output_format: OutputFormat::Scrub,
            source_root: dir.path().to_path_buf(),
            tool_name: None,
            sonarqube_url: None,
            require_output: false,
        })
        .expect_err("1.0.0 is not supported");
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::ParseFailed { .. })
        ));
    }
}

// ============================================================================
// File list and filtering
// ============================================================================

mod filter_stage {
    use super::*;

    #[test]
    fn rules_exclude_generated_sources() {
        let rules = FileListRules::load(&fixture_path("SCRUBFilters")).expect("rules");
        let selection = build_file_list(&fixture_path("tree"), &rules, None);
        assert_eq!(selection.included, vec!["src/bar.c", "src/foo.c"]);
        assert_eq!(selection.excluded, vec!["src/generated/gen.c"]);
    }

    #[test]
    fn file_list_handler_writes_both_lists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = FileListConfig {
            source_root: fixture_path("tree"),
            rules_file: Some(fixture_path("SCRUBFilters")),
            initial_list: None,
            output: dir.path().join("scope.txt"),
            exclusion_output: Some(dir.path().join("excluded.txt")),
        };
        scrub_tools::cli::run_file_list(config, true).expect("file list");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("scope.txt")).expect("read"),
            "src/bar.c\nsrc/foo.c\n"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("excluded.txt")).expect("read"),
            "src/generated/gen.c\n"
        );
    }

    #[test]
    fn filter_fixture_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let summary = filter_directory(&filter_config(dir.path())).expect("filter");
        assert!(summary.failed.is_empty(), "{:?}", summary.failed);

        let names: Vec<_> = summary.jobs.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["compiler", "coverity"]);

        let compiler = &summary.jobs[0].stats;
        assert_eq!((compiler.input, compiler.kept), (3, 1));
        assert_eq!(compiler.excluded_file, 1);
        assert_eq!(compiler.excluded_query, 1);

        let coverity = &summary.jobs[1].stats;
        assert_eq!((coverity.input, coverity.kept), (3, 1));
        assert_eq!(coverity.suppressed, 1);
        assert_eq!(coverity.external, 1);

        assert_eq!(
            std::fs::read_to_string(dir.path().join("compiler.scrub")).expect("read"),
            "gcc001 <Low> :src/foo.c:5: -Wunused-variable\n    Unused variable 'x'.\n\n"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("coverity.scrub")).expect("read"),
            "coverity002 <Med> :src/foo.c:7: UNREACHABLE\n    This code cannot be reached.\n\n"
        );

        let sarif = dir.path().join(SARIF_RESULTS_DIR).join("coverity.sarif");
        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(sarif).expect("read")).expect("json");
        let uri = &doc["runs"][0]["results"][0]["locations"][0]["physicalLocation"]
            ["artifactLocation"];
        assert_eq!(uri["uri"], "src/foo.c");
        assert_eq!(uri["uriBaseId"], "SRCROOT");
    }

    #[test]
    fn filtering_is_idempotent_on_disk() {
        let first = tempfile::tempdir().expect("tempdir");
        filter_directory(&filter_config(first.path())).expect("filter");

        // Feed the filtered output back in as raw input.
        let second = tempfile::tempdir().expect("tempdir");
        let mut config = filter_config(second.path());
        let raw = tempfile::tempdir().expect("tempdir");
        for name in ["compiler.scrub", "coverity.scrub"] {
            std::fs::copy(first.path().join(name), raw.path().join(name)).expect("copy");
        }
        config.raw_dir = raw.path().to_path_buf();
        filter_directory(&config).expect("filter");

        for name in ["compiler.scrub", "coverity.scrub"] {
            assert_eq!(
                std::fs::read_to_string(first.path().join(name)).expect("read"),
                std::fs::read_to_string(second.path().join(name)).expect("read"),
                "{name} changed on a second pass"
            );
        }
    }

    #[test]
    fn dropping_an_exclusion_brings_the_warning_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = filter_config(dir.path());
        config.filtering.query_exclusions_file = None;
        config.output.write_sarif = false;
        filter_directory(&config).expect("filter");

        let compiler = std::fs::read_to_string(dir.path().join("compiler.scrub")).expect("read");
        assert!(compiler.contains("gcc002 <Low> :src/bar.c:10: -Wunused-value"));
        assert!(!dir.path().join(SARIF_RESULTS_DIR).exists());
    }
}

// ============================================================================
// Diff
// ============================================================================

mod diff_stage {
    use super::*;

    const BASE_SOURCE: &str = "int f(int *p)\n{\n    return *p;\n}\n";

    fn setup(shift: usize) -> (tempfile::TempDir, DiffConfig) {
        let dir = tempfile::tempdir().expect("tempdir");
        let base = dir.path().join("base");
        let comp = dir.path().join("comp");

        let mut padding = String::new();
        for _ in 0..40 {
            padding.push_str("// filler\n");
        }
        write(&base.join("src/bar.c"), &format!("{padding}{BASE_SOURCE}"));
        let mut shifted = padding.clone();
        for _ in 0..shift {
            shifted.push_str("// inserted\n");
        }
        write(&comp.join("src/bar.c"), &format!("{shifted}{BASE_SOURCE}"));

        write(
            &base.join("results/coverity.scrub"),
            "coverity001 <High> :src/bar.c:43: NULL_DEREF\n    p may be null.\n\n",
        );
        write(
            &comp.join("results/coverity.scrub"),
            &format!(
                "coverity001 <High> :src/bar.c:{}: NULL_DEREF\n    p may be null.\n\n",
                43 + shift
            ),
        );

        let config = DiffConfig {
            baseline_dir: base.join("results"),
            comparison_dir: comp.join("results"),
            baseline_root: base,
            comparison_root: comp.clone(),
            output_dir: comp.join("diff"),
            settings: DiffSettings {
                fail_on_new: true,
                ..DiffSettings::default()
            },
            behavior: BehaviorConfig {
                quiet: true,
                ..BehaviorConfig::default()
            },
        };
        (dir, config)
    }

    #[test]
    fn moved_warning_is_a_probable_match() {
        let (_dir, config) = setup(3);
        let summaries = diff_directories(&config).expect("diff");
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].new_warnings, 0);
        assert_eq!(summaries[0].probable_matches, 1);
        assert_eq!(
            std::fs::read_to_string(config.output_dir.join("coverity_diff.scrub")).expect("read"),
            ""
        );
        assert_eq!(scrub_tools::cli::run_diff(config).expect("diff"), 0);
    }

    #[test]
    fn unchanged_warning_is_an_exact_match() {
        let (_dir, config) = setup(0);
        let summaries = diff_directories(&config).expect("diff");
        assert_eq!(summaries[0].exact_matches, 1);
    }

    #[test]
    fn without_probable_matching_the_moved_warning_is_new() {
        let (_dir, mut config) = setup(3);
        config.settings.probable_matching = false;
        let summaries = diff_directories(&config).expect("diff");
        assert_eq!(summaries[0].new_warnings, 1);
        assert_eq!(scrub_tools::cli::run_diff(config).expect("diff"), 1);
    }
}
