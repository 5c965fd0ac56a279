//! scrub-tools: static-analysis warning normalization, filtering and
//! reconciliation.
//!
//! Translates analyzer output into SCRUB text or SARIF, filters it against
//! exclusion lists and inline suppressions, and diffs result sets.

#![allow(clippy::needless_pass_by_value)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use scrub_tools::{
    cli,
    config::{
        AppConfig, BehaviorConfig, DiffConfig, DiffSettings, FileListConfig, FilterConfig,
        FilteringConfig, MergeConfig, OutputConfig, TranslateConfig, CONFIG_FILE_NAMES,
    },
    parsers::SourceFormat,
    pipeline::exit_codes,
    reports::{OutputFormat, SarifVersion},
    utils::paths,
};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with format support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nInput Formats:",
        "\n  scrub, sarif (2.0.0, 2.1.0), gcc, javac, pylint, gbuild, coverity, klocwork, sonarqube",
        "\n\nOutput Formats:",
        "\n  scrub, sarifv2.0.0, sarifv2.1.0"
    )
}

#[derive(Parser)]
#[command(name = "scrub-tools")]
#[command(version, long_version = build_long_version())]
#[command(about = "Normalize, filter and diff static-analysis warnings", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success (no new warnings, or --fail-on-new not set)
    1  New warnings detected by diff --fail-on-new
    3  Error occurred

EXAMPLES:
    # Convert a Coverity SARIF file to SCRUB text
    scrub-tools translate raw/coverity.sarif -o raw/coverity_raw.scrub --source-root src

    # Build the analysis file list from regex rules
    scrub-tools file-list --source-root src --rules SCRUBFilters -o scope.txt --excluded-output excluded.txt

    # Filter raw results into per-tool outputs
    scrub-tools filter raw/ -o results/ --source-root src --exclusion-list excluded.txt

    # Fail CI when a change introduces warnings
    scrub-tools diff baseline/results results/ --baseline-root baseline/src --comparison-root src --fail-on-new")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "SCRUB_TOOLS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

// ============================================================================
// Command argument structs
// ============================================================================

/// Arguments for the `translate` subcommand
#[derive(Parser)]
struct TranslateArgs {
    /// Results file to translate
    input: PathBuf,

    /// Input format (inferred from a .scrub or .sarif extension)
    #[arg(short, long, value_enum)]
    from: Option<SourceFormat>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "scrub")]
    to: OutputFormat,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Top-level directory of the analyzed source code
    #[arg(long)]
    source_root: Option<PathBuf>,

    /// Tool name to use instead of the one in the input
    #[arg(long)]
    tool_name: Option<String>,

    /// SonarQube server URL, used to link each SonarQube finding
    #[arg(long, env = "SONARQUBE_URL")]
    sonarqube_url: Option<String>,

    /// Fail when the input contains no warnings
    #[arg(long)]
    require_output: bool,
}

/// Arguments for the `filter` subcommand
#[derive(Parser)]
struct FilterArgs {
    /// Directory of raw .scrub / .sarif results
    raw_dir: PathBuf,

    /// Directory for filtered results
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Top-level directory of the analyzed source code
    #[arg(long)]
    source_root: Option<PathBuf>,

    /// Regex include/exclude rules used to derive excluded files
    #[arg(long)]
    rules: Option<PathBuf>,

    /// List of root-relative files to exclude (takes precedence over --rules)
    #[arg(long)]
    exclusion_list: Option<PathBuf>,

    /// `tool: query` exclusion file
    #[arg(long)]
    query_exclusions: Option<PathBuf>,

    /// Ignore inline scrub_ignore_warning / @suppress directives
    #[arg(long)]
    no_micro_filter: bool,

    /// Keep warnings in files outside the source root
    #[arg(long)]
    external_warnings: bool,

    /// Do not write SARIF copies of the filtered results
    #[arg(long)]
    no_sarif: bool,

    /// SARIF version for the copies
    #[arg(long)]
    sarif_version: Option<SarifVersion>,

    /// Worker threads (default: one per core)
    #[arg(short = 'j', long)]
    workers: Option<usize>,
}

/// Arguments for the `file-list` subcommand
#[derive(Parser)]
struct FileListArgs {
    /// Top-level directory of the analyzed source code
    #[arg(long)]
    source_root: Option<PathBuf>,

    /// Regex include/exclude rules
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Start from this list instead of walking the source root
    #[arg(long)]
    initial_list: Option<PathBuf>,

    /// Where to write the in-scope list
    #[arg(short, long)]
    output: PathBuf,

    /// Where to write the excluded files
    #[arg(long)]
    excluded_output: Option<PathBuf>,
}

/// Arguments for the `diff` subcommand
#[derive(Parser)]
struct DiffArgs {
    /// Filtered baseline results directory
    baseline_dir: PathBuf,

    /// Filtered comparison results directory
    comparison_dir: PathBuf,

    /// Source root the baseline was analyzed in
    #[arg(long)]
    baseline_root: PathBuf,

    /// Source root the comparison was analyzed in
    #[arg(long)]
    comparison_root: Option<PathBuf>,

    /// Where to write <tool>_diff.scrub files (default: the comparison directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Exit with code 1 if any new warning is found
    #[arg(long)]
    fail_on_new: bool,

    /// Only count exact matches
    #[arg(long)]
    no_probable: bool,

    /// Worker threads (default: one per core)
    #[arg(short = 'j', long)]
    workers: Option<usize>,
}

/// Arguments for the `merge-sarif` subcommand
#[derive(Parser)]
struct MergeArgs {
    /// First SARIF file
    first: PathBuf,

    /// Second SARIF file
    second: PathBuf,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// SARIF version of the merged document
    #[arg(long)]
    sarif_version: Option<SarifVersion>,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate one results file to SCRUB or SARIF
    Translate(TranslateArgs),

    /// Filter a directory of raw results into per-tool outputs
    Filter(FilterArgs),

    /// Build the in-scope and excluded file lists from regex rules
    FileList(FileListArgs),

    /// Report warnings that are new relative to a baseline
    Diff(DiffArgs),

    /// Merge the first run of two SARIF files
    MergeSarif(MergeArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for the config file format
    ConfigSchema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .scrub-tools.yaml in the current directory
    Init,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match run(cli) {
        Ok(code) => {
            if code != exit_codes::SUCCESS {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_codes::ERROR);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let quiet = cli.quiet;
    let (file_config, _) = scrub_tools::config::load_or_default(cli.config.as_deref());

    match cli.command {
        Commands::Translate(args) => {
            let input_format = match args.from {
                Some(format) => format,
                None => SourceFormat::from_path(&args.input).with_context(|| {
                    format!(
                        "Cannot infer the format of {}; pass --from",
                        args.input.display()
                    )
                })?,
            };
            let config = TranslateConfig {
                input_format,
                output_format: args.to,
                source_root: source_root(args.source_root, &file_config)?,
                input: args.input,
                output: args.output,
                tool_name: args.tool_name,
                sonarqube_url: args.sonarqube_url,
                require_output: args.require_output,
            };
            cli::run_translate(config, quiet)?;
            Ok(exit_codes::SUCCESS)
        }

        Commands::Filter(args) => {
            let overrides = AppConfig {
                source_root: args.source_root,
                filtering: FilteringConfig {
                    micro_filter: !args.no_micro_filter,
                    external_warnings: args.external_warnings,
                    rules_file: args.rules,
                    query_exclusions_file: args.query_exclusions,
                    exclusion_list_file: args.exclusion_list,
                },
                output: OutputConfig {
                    sarif_version: args.sarif_version.unwrap_or_default(),
                    write_sarif: !args.no_sarif,
                },
                behavior: BehaviorConfig {
                    quiet,
                    workers: args.workers,
                },
                ..AppConfig::default()
            };
            let mut app = file_config;
            app.merge(&overrides);
            if let Some(version) = args.sarif_version {
                app.output.sarif_version = version;
            }

            let config = FilterConfig {
                raw_dir: args.raw_dir,
                output_dir: args.output_dir,
                source_root: source_root(app.source_root.clone(), &app)?,
                filtering: app.filtering,
                output: app.output,
                behavior: app.behavior,
            };
            cli::run_filter(config)?;
            Ok(exit_codes::SUCCESS)
        }

        Commands::FileList(args) => {
            let config = FileListConfig {
                source_root: source_root(args.source_root, &file_config)?,
                rules_file: args.rules.or(file_config.filtering.rules_file),
                initial_list: args.initial_list,
                output: args.output,
                exclusion_output: args.excluded_output,
            };
            cli::run_file_list(config, quiet)?;
            Ok(exit_codes::SUCCESS)
        }

        Commands::Diff(args) => {
            let overrides = AppConfig {
                diff: DiffSettings {
                    fail_on_new: args.fail_on_new,
                    probable_matching: !args.no_probable,
                },
                behavior: BehaviorConfig {
                    quiet,
                    workers: args.workers,
                },
                ..AppConfig::default()
            };
            let mut app = file_config;
            app.merge(&overrides);

            let config = DiffConfig {
                output_dir: args
                    .output_dir
                    .unwrap_or_else(|| args.comparison_dir.clone()),
                comparison_root: source_root(args.comparison_root, &app)?,
                baseline_dir: args.baseline_dir,
                comparison_dir: args.comparison_dir,
                baseline_root: paths::absolute(&args.baseline_root),
                settings: app.diff,
                behavior: app.behavior,
            };
            cli::run_diff(config)
        }

        Commands::MergeSarif(args) => {
            let config = MergeConfig {
                first: args.first,
                second: args.second,
                output: args.output,
                version: args
                    .sarif_version
                    .unwrap_or(file_config.output.sarif_version),
            };
            cli::run_merge(config, quiet)?;
            Ok(exit_codes::SUCCESS)
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "scrub-tools", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }

        Commands::ConfigSchema { output } => {
            let schema = scrub_tools::config::generate_json_schema()
                .context("failed to generate config schema")?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { action } => {
            run_config_action(action, cli.config.as_deref())?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn run_config_action(action: ConfigAction, explicit: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let (config, loaded_from) = scrub_tools::config::load_or_default(explicit);
            if let Some(path) = &loaded_from {
                eprintln!("# Loaded from: {}", path.display());
            } else {
                eprintln!("# No config file found; showing defaults");
            }
            let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
            print!("{yaml}");
            Ok(())
        }
        ConfigAction::Path => {
            let search_paths: [Option<String>; 3] = [
                std::env::current_dir()
                    .ok()
                    .map(|p| p.display().to_string()),
                dirs::config_dir().map(|p| p.join("scrub-tools").display().to_string()),
                dirs::home_dir().map(|p| p.display().to_string()),
            ];
            eprintln!("Config file search paths (in order, plus the git root):");
            for path in search_paths.into_iter().flatten() {
                eprintln!("  {path}");
            }
            eprintln!();
            eprintln!("Recognized file names:");
            for name in CONFIG_FILE_NAMES {
                eprintln!("  {name}");
            }
            eprintln!();
            match scrub_tools::config::discover_config_file(explicit) {
                Some(path) => eprintln!("Active config file: {}", path.display()),
                None => eprintln!("No config file found."),
            }
            Ok(())
        }
        ConfigAction::Init => {
            let target = std::env::current_dir()
                .context("cannot determine current directory")?
                .join(".scrub-tools.yaml");
            if target.exists() {
                anyhow::bail!(
                    "{} already exists. Remove it first to re-initialize.",
                    target.display()
                );
            }
            let content = scrub_tools::config::generate_full_example_config();
            std::fs::write(&target, content)
                .with_context(|| format!("failed to write {}", target.display()))?;
            eprintln!("Created {}", target.display());
            Ok(())
        }
    }
}

/// Source root from the flag, then the config file, then the current directory.
///
/// The result is always absolute.
fn source_root(flag: Option<PathBuf>, config: &AppConfig) -> Result<PathBuf> {
    match flag.or_else(|| config.source_root.clone()) {
        Some(root) => Ok(paths::absolute(&root)),
        None => std::env::current_dir().context("cannot determine current directory"),
    }
}
