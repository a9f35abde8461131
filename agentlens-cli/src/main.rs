//! agentlens CLI: rank an agent performance spreadsheet and write the
//! dashboard summary.

mod commands;

use agentlens_core::config::AnalyzerConfig;
use agentlens_core::{DashboardSummary, MissingColumnPolicy};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// agentlens: top-N rankings over AI agent performance data
#[derive(Parser, Debug)]
#[command(name = "agentlens", version, about, long_about = None)]
struct Cli {
    /// Spreadsheet to analyze (xlsx, xls, ods, csv, tsv, json, jsonl)
    input: Option<PathBuf>,

    /// Where to write the dashboard JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip writing the dashboard JSON
    #[arg(long)]
    no_json: bool,

    /// Worksheet name (defaults to the first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// Zero-based header row (auto-detected if omitted)
    #[arg(long)]
    header_row: Option<usize>,

    /// Number of groups per ranking
    #[arg(short = 'n', long)]
    top: Option<usize>,

    /// Skip rankings whose columns are missing instead of failing
    #[arg(long)]
    lenient: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Workspace directory
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// List the config files consulted, lowest priority first
    Path,
}

impl Cli {
    fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Fold command-line flags into a loaded configuration.
    fn apply_overrides(&self, config: &mut AnalyzerConfig) {
        if let Some(input) = &self.input {
            config.input.path = Some(input.clone());
        }
        if let Some(sheet) = &self.sheet {
            config.input.sheet = Some(sheet.clone());
        }
        if let Some(row) = self.header_row {
            config.input.header_row = Some(row);
        }
        if let Some(top) = self.top {
            config.ranking.top_n = top;
        }
        if self.lenient {
            config.ranking.missing_columns = MissingColumnPolicy::Lenient;
        }
        if let Some(output) = &self.output {
            config.output.json_path = output.clone();
        }
        if self.no_json {
            config.output.write_json = false;
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Human-readable layer for stderr
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(cli.log_filter()));

    // JSON file layer for structured logging
    let log_dir = directories::ProjectDirs::from("dev", "agentlens", "agentlens")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "agentlens.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| cli.workspace.clone());

    if let Some(command) = &cli.command {
        return commands::handle_command(command, &workspace, cli.config.as_deref());
    }

    let mut config = agentlens_core::load_config(Some(&workspace), cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    cli.apply_overrides(&mut config);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    run(&config)
}

/// Load, rank, print, and optionally write the dashboard summary.
fn run(config: &AnalyzerConfig) -> anyhow::Result<()> {
    let Some(path) = config.input.path.as_deref() else {
        anyhow::bail!("No input file given: pass INPUT or set input.path in the config");
    };

    let dataset = agentlens_core::load_dataset(path, config)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let report = agentlens_core::analyze(&dataset, &config.ranking);

    print!(
        "{}",
        agentlens_core::render_terminal(&report, &config.output)
    );

    if config.output.write_json {
        let summary = DashboardSummary::from_report(&report, config.output.percent_precision);
        agentlens_core::write_summary(&config.output.json_path, &summary).with_context(|| {
            format!(
                "Failed to write dashboard summary to {}",
                config.output.json_path.display()
            )
        })?;
        println!(
            "\nDashboard summary written to {}",
            config.output.json_path.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["agentlens", "agents.xlsx"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("agents.xlsx")));
        assert_eq!(cli.workspace, PathBuf::from("."));
        assert_eq!(cli.log_filter(), "warn");
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_verbosity_levels() {
        let quiet = Cli::try_parse_from(["agentlens", "-q"]).unwrap();
        assert_eq!(quiet.log_filter(), "error");
        let v = Cli::try_parse_from(["agentlens", "-v"]).unwrap();
        assert_eq!(v.log_filter(), "info");
        let vv = Cli::try_parse_from(["agentlens", "-vv"]).unwrap();
        assert_eq!(vv.log_filter(), "debug");
        let vvv = Cli::try_parse_from(["agentlens", "-vvv"]).unwrap();
        assert_eq!(vvv.log_filter(), "trace");
    }

    #[test]
    fn test_apply_overrides() {
        let cli = Cli::try_parse_from([
            "agentlens",
            "data.csv",
            "--sheet",
            "Agents",
            "--header-row",
            "1",
            "-n",
            "5",
            "--lenient",
            "-o",
            "out/summary.json",
        ])
        .unwrap();
        let mut config = AnalyzerConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.input.path, Some(PathBuf::from("data.csv")));
        assert_eq!(config.input.sheet.as_deref(), Some("Agents"));
        assert_eq!(config.input.header_row, Some(1));
        assert_eq!(config.ranking.top_n, 5);
        assert_eq!(config.ranking.missing_columns, MissingColumnPolicy::Lenient);
        assert_eq!(config.output.json_path, PathBuf::from("out/summary.json"));
        assert!(config.output.write_json);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let cli = Cli::try_parse_from(["agentlens"]).unwrap();
        let mut config = AnalyzerConfig::default();
        config.ranking.top_n = 7;
        cli.apply_overrides(&mut config);
        assert_eq!(config.ranking.top_n, 7);
        assert_eq!(config.input.path, None);
    }

    #[test]
    fn test_flags_keep_config_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("agentlens.toml");
        std::fs::write(
            &file,
            "[columns]\nbias_detection_score = \"bias_detection\"\n\n[ranking]\ntop_n = 4\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from(["agentlens", "data.csv", "--no-json"]).unwrap();
        let mut config = agentlens_core::load_config(None, Some(&file)).unwrap();
        cli.apply_overrides(&mut config);
        config.validate().unwrap();

        assert!(!config.output.write_json);
        assert_eq!(config.ranking.top_n, 4);
        assert_eq!(config.columns.bias_detection_score, "bias_detection");
    }

    #[test]
    fn test_no_json_flag() {
        let cli = Cli::try_parse_from(["agentlens", "data.csv", "--no-json"]).unwrap();
        let mut config = AnalyzerConfig::default();
        cli.apply_overrides(&mut config);
        assert!(!config.output.write_json);
    }

    #[test]
    fn test_config_subcommand() {
        let cli = Cli::try_parse_from(["agentlens", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Show
            })
        ));
    }

    #[test]
    fn test_run_requires_input() {
        let err = run(&AnalyzerConfig::default()).unwrap_err();
        assert!(err.to_string().contains("No input file given"));
    }

    #[test]
    fn test_run_writes_summary() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("agents.csv");
        std::fs::write(
            &input,
            "agent_type,model_architecture,task_category,multimodal_capability,bias_detection_score\n\
             Planner,Transformer,Research,True,0.5\n\
             Coder,Dense,Coding,False,0.25\n",
        )
        .unwrap();

        let mut config = AnalyzerConfig::default();
        config.input.path = Some(input);
        config.output.json_path = dir.path().join("analysis_results.json");
        run(&config).unwrap();

        let content = std::fs::read_to_string(&config.output.json_path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["total_records"], 2);
        assert_eq!(value["agent_type_multimodal"]["labels"][0], "Planner");
    }
}
