use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use survey_stats::config::{ComparisonConfig, DatasetConfig, PipelineConfig, QuestionnaireConfig};
use survey_stats::csv_parser::CsvParser;
use survey_stats::pipeline;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "survey-stats")]
#[command(version)]
#[command(about = "Descriptive statistics, correlation, normality and rank-sum tests for survey CSV data", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Field delimiter of the input files. Overrides the configuration file.
    #[arg(long, global = true)]
    delimiter: Option<char>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every stage described by a configuration file
    Run {
        /// Pipeline configuration (TOML). Built-in defaults when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write statistics and correlation matrix for one dataset
    Describe {
        /// Path to CSV file
        file: PathBuf,

        /// Prefix of the result file names
        #[arg(short, long)]
        prefix: String,

        /// Directory the results are written to
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Identifier column to drop before analysis
        #[arg(short, long, default_value = "Nome")]
        identifier: String,

        /// Also run the Shapiro-Wilk test on every column
        #[arg(short, long)]
        normality: bool,
    },

    /// Categorize questionnaire respondents
    Categorize {
        /// Path to questionnaire CSV file
        file: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "output/categoria_usuario.csv")]
        output: PathBuf,

        /// Read the categorization rule from this configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Mann-Whitney U test of two datasets, column by column
    Compare {
        /// First dataset
        first: PathBuf,

        /// Second dataset
        second: PathBuf,

        /// Columns to compare, comma-separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        columns: Vec<String>,

        /// Output file
        #[arg(short, long, default_value = "output/mann_whitney.csv")]
        output: PathBuf,

        /// Identifier column to drop before analysis
        #[arg(short, long, default_value = "Nome")]
        identifier: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run { config } => {
            let mut config = match &config {
                Some(path) => PipelineConfig::load(path)
                    .with_context(|| format!("failed to load config {}", path.display()))?,
                None => PipelineConfig::default(),
            };
            if let Some(delimiter) = cli.delimiter {
                config.delimiter = delimiter;
            }
            let summary = pipeline::run(&config).context("pipeline failed")?;
            for path in &summary.written {
                println!("{}", path.display());
            }
        }

        Commands::Describe {
            file,
            prefix,
            output_dir,
            identifier,
            normality,
        } => {
            let dataset = DatasetConfig {
                path: file,
                prefix,
                normality,
            };
            let parser = input_parser(None, cli.delimiter)?;
            let written = pipeline::process_dataset(&dataset, &parser, &identifier, &output_dir)
                .with_context(|| format!("failed to describe {}", dataset.path.display()))?;
            for path in &written {
                println!("{}", path.display());
            }
        }

        Commands::Categorize {
            file,
            output,
            config,
        } => {
            let config = config
                .as_deref()
                .map(|path| {
                    PipelineConfig::load(path)
                        .with_context(|| format!("failed to load config {}", path.display()))
                })
                .transpose()?;
            let parser = input_parser(config.as_ref(), cli.delimiter)?;
            let rule = config
                .and_then(|c| c.questionnaire)
                .map(|q| q.rule)
                .unwrap_or_default();
            let (dir, name) = split_output(&output)?;
            let questionnaire = QuestionnaireConfig {
                path: file,
                output: name,
                rule,
            };
            let path = pipeline::categorize_users(&questionnaire, &parser, &dir)
                .with_context(|| {
                    format!("failed to categorize {}", questionnaire.path.display())
                })?;
            println!("{}", path.display());
        }

        Commands::Compare {
            first,
            second,
            columns,
            output,
            identifier,
        } => {
            let (dir, name) = split_output(&output)?;
            let comparison = ComparisonConfig {
                first,
                second,
                columns,
                output: name,
            };
            let parser = input_parser(None, cli.delimiter)?;
            let path = pipeline::compare_datasets(&comparison, &parser, &identifier, &dir)
                .context("comparison failed")?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    info!(version = env!("CARGO_PKG_VERSION"), "survey-stats starting");
}

/// The reader for input files: the configuration's settings, or the
/// defaults, with the command-line delimiter on top.
fn input_parser(
    config: Option<&PipelineConfig>,
    delimiter: Option<char>,
) -> anyhow::Result<CsvParser> {
    let parser = match config {
        Some(config) => config.csv_parser()?,
        None => CsvParser::new(),
    };
    Ok(match delimiter {
        Some(delimiter) => parser.delimiter_char(delimiter)?,
        None => parser,
    })
}

/// Splits an output file path into its directory and file name.
fn split_output(output: &Path) -> anyhow::Result<(PathBuf, PathBuf)> {
    let Some(name) = output.file_name() else {
        bail!("output path {} has no file name", output.display());
    };
    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok((dir.to_path_buf(), PathBuf::from(name)))
}
