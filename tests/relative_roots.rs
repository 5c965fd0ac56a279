//! Stages driven with roots relative to the current directory.
//!
//! Everything runs in one test because the working directory is process-wide.

use scrub_tools::config::{BehaviorConfig, DiffConfig, DiffSettings, TranslateConfig};
use scrub_tools::parsers::{parse_file, parse_scrub_text, SourceFormat};
use scrub_tools::pipeline::{diff_directories, perform_translation};
use scrub_tools::reports::{OutputFormat, SarifVersion};
use std::fs;
use std::path::{Path, PathBuf};

const SOURCE: &str = "int a;\nint b;\nint unused;\nint c;\nint shadow;\n";

const BASELINE: &str = "gcc001 <Low> :a.c:3: -Wunused-variable\n    unused variable\n\n";

const COMPARISON: &str = "\
gcc001 <Low> :a.c:3: -Wunused-variable
    unused variable

gcc002 <Low> :a.c:5: -Wshadow
    declaration shadows a local

";

fn write(path: impl AsRef<Path>, content: &str) {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, content).expect("write");
}

#[test]
fn relative_roots_resolve_against_current_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let previous = std::env::current_dir().expect("cwd");
    std::env::set_current_dir(dir.path()).expect("chdir");
    let cwd = std::env::current_dir().expect("cwd");

    write("base/src/a.c", SOURCE);
    write("comp/src/a.c", SOURCE);
    write("base/results/gcc.scrub", BASELINE);
    write("comp/results/gcc.scrub", COMPARISON);

    // Diff: only the shadow warning is new and it is written relative to the root.
    let summaries = diff_directories(&DiffConfig {
        baseline_dir: PathBuf::from("base/results"),
        comparison_dir: PathBuf::from("comp/results"),
        baseline_root: PathBuf::from("base/src"),
        comparison_root: PathBuf::from("comp/src"),
        output_dir: PathBuf::from("diff"),
        settings: DiffSettings::default(),
        behavior: BehaviorConfig {
            quiet: true,
            ..BehaviorConfig::default()
        },
    })
    .expect("diff should succeed");
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].exact_matches, 1);
    assert_eq!(summaries[0].new_warnings, 1);
    let diff = fs::read_to_string("diff/gcc_diff.scrub").expect("diff output");
    assert!(diff.contains(" :a.c:5: -Wshadow\n"), "{diff}");
    assert!(!diff.contains("src/"), "{diff}");

    // Translate: the SARIF base id is an absolute file uri.
    perform_translation(&TranslateConfig {
        input: PathBuf::from("comp/results/gcc.scrub"),
        input_format: SourceFormat::Scrub,
        output: Some(PathBuf::from("out/gcc.sarif")),
        output_format: OutputFormat::Sarif(SarifVersion::V2_1_0),
        source_root: PathBuf::from("comp/src"),
        tool_name: None,
        sonarqube_url: None,
        require_output: true,
    })
    .expect("translation should succeed");
    let text = fs::read_to_string("out/gcc.sarif").expect("sarif output");
    let doc: serde_json::Value = serde_json::from_str(&text).expect("json");
    let run = &doc["runs"][0];
    let srcroot = run["originalUriBaseIds"]["SRCROOT"]["uri"]
        .as_str()
        .expect("SRCROOT uri");
    assert_eq!(srcroot, format!("file://{}/", cwd.join("comp/src").display()));
    assert_eq!(
        run["results"][0]["locations"][0]["physicalLocation"]["artifactLocation"]["uri"],
        "a.c"
    );

    let back = parse_file(Path::new("out/gcc.sarif"), SourceFormat::Sarif, Path::new("elsewhere"))
        .expect("SARIF output should parse");
    assert_eq!(back.records[0].file, cwd.join("comp/src/a.c"));

    let parsed = parse_scrub_text(COMPARISON, Path::new("comp/src"));
    assert!(parsed.records[0].file.is_absolute());
    assert_eq!(parsed.records[1].file, cwd.join("comp/src/a.c"));

    std::env::set_current_dir(previous).expect("restore cwd");
}
