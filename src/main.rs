use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use orgaplex::export::{export_metrics, export_relationships, ExportFormat};
use orgaplex::pipeline::{discover, run_metrics, run_relationships};
use orgaplex::report::TracingReporter;
use orgaplex::{AnalysisConfig, CountMode};

/// Aggregate per-specimen organelle statistics into summary matrices.
#[derive(Debug, Parser)]
#[command(name = "orgaplex", version, about)]
struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the discovered entities and categories
    Discover(InputArgs),
    /// Mean and count of nearest-surface distances per relationship
    Relationships(RunArgs),
    /// Volume and sphericity summaries per category
    Metrics(RunArgs),
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Experiment directory
    #[arg(short, long)]
    input: PathBuf,

    /// JSON configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Header lines to skip in every measurement file
    #[arg(long)]
    header_lines: Option<usize>,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output directory
    #[arg(short, long, default_value = "orgaplex_output")]
    output: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
    format: FormatArg,

    /// Statistic written to the relationship count matrix
    #[arg(long, value_enum)]
    count_mode: Option<CountModeArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Parquet,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => Self::Csv,
            FormatArg::Parquet => Self::Parquet,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CountModeArg {
    All,
    NonPositive,
}

impl From<CountModeArg> for CountMode {
    fn from(arg: CountModeArg) -> Self {
        match arg {
            CountModeArg::All => Self::All,
            CountModeArg::NonPositive => Self::NonPositive,
        }
    }
}

fn main() {
    if let Err(error) = run() {
        eprintln!("orgaplex error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let reporter = TracingReporter;
    match cli.command {
        Command::Discover(args) => {
            let config = load_config(&args, None)?;
            let discovery = discover(&args.input, &config, &reporter)
                .with_context(|| format!("discovery failed under {}", args.input.display()))?;
            println!("{discovery}");
        }
        Command::Relationships(args) => {
            let config = load_config(&args.input, args.count_mode)?;
            let report = run_relationships(&args.input.input, &config, &reporter)
                .with_context(|| format!("relationship analysis failed under {}", args.input.input.display()))?;
            println!("{}", report.summary());
            let written = export_relationships(&report, &args.output, args.format.into())
                .with_context(|| format!("failed to export to {}", args.output.display()))?;
            print_written(&written);
        }
        Command::Metrics(args) => {
            let config = load_config(&args.input, args.count_mode)?;
            let report = run_metrics(&args.input.input, &config, &reporter)
                .with_context(|| format!("metric analysis failed under {}", args.input.input.display()))?;
            println!("{}", report.summary());
            let written = export_metrics(&report, &args.output, args.format.into())
                .with_context(|| format!("failed to export to {}", args.output.display()))?;
            print_written(&written);
        }
    }
    Ok(())
}

fn load_config(args: &InputArgs, count_mode: Option<CountModeArg>) -> anyhow::Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            AnalysisConfig::from_json(&json).with_context(|| format!("invalid config {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };
    if let Some(lines) = args.header_lines {
        config.header_lines = lines;
    }
    if let Some(mode) = count_mode {
        config.count_mode = mode.into();
    }
    config.validate()?;
    Ok(config)
}

fn print_written(paths: &[PathBuf]) {
    println!("\nWrote {} file(s):", paths.len());
    for path in paths {
        println!("  {}", path.display());
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("ORGAPLEX_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
