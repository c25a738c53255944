//! CLI entry point for the earnings scorecard.
//!
//! Runs the pipeline against a spreadsheet URL or local file and prints the
//! quarter summary, the company table, the sector list, or a CSV export.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use earnings_scorecard::analyzers::pipeline::run;
use earnings_scorecard::config::Settings;
use earnings_scorecard::output::{
    company_lines, print_pretty, summary_lines, to_json, write_companies_csv,
};
use earnings_scorecard::view::{CompanyQuery, SortDirection, SortKey, sector_names};
use earnings_scorecard::{DashboardResult, Verdict};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "earnings_scorecard")]
#[command(about = "Beat/miss scorecard for quarterly EPS results", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args)]
struct SourceArgs {
    /// Spreadsheet URL or local path [env: EARNINGS_DATA_URL]
    #[arg(short, long, value_name = "FILE_OR_URL")]
    source: Option<String>,

    /// In-line band as a fraction, e.g. 0.02; unusable values mean 0.02
    /// [env: EARNINGS_INLINE_TOLERANCE]
    #[arg(short, long)]
    tolerance: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the quarter summary and sector breakdown
    Analyze {
        #[command(flatten)]
        source: SourceArgs,

        /// Emit the full result as JSON instead of the text summary
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Pretty-print the JSON
        #[arg(long, default_value_t = false, requires = "json")]
        pretty: bool,
    },
    /// List companies with optional filters and sorting
    Companies {
        #[command(flatten)]
        source: SourceArgs,

        /// Only this sector (exact name)
        #[arg(long)]
        sector: Option<String>,

        /// Only this verdict: beat, miss or in-line
        #[arg(long)]
        verdict: Option<Verdict>,

        /// Case-insensitive match on ticker or company name
        #[arg(long)]
        search: Option<String>,

        /// Column to sort by
        #[arg(long, default_value = "surprise-pct")]
        sort: SortKey,

        /// Sort ascending instead of descending
        #[arg(long, default_value_t = false)]
        asc: bool,
    },
    /// List the sectors present in the reporting quarter
    Sectors {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Write the company table to a CSV file
    Export {
        #[command(flatten)]
        source: SourceArgs,

        /// CSV file to write
        #[arg(short, long)]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/earnings_scorecard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("earnings_scorecard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    if let Err(e) = dispatch(cli.command).await {
        error!(error = %e, "Command failed");
        return Err(e);
    }

    Ok(())
}

async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Analyze {
            source,
            json,
            pretty,
        } => {
            let result = load(source).await?;
            print_pretty(&result);

            if json {
                println!("{}", to_json(&result, pretty)?);
            } else {
                for line in summary_lines(&result) {
                    println!("{line}");
                }
            }
        }
        Commands::Companies {
            source,
            sector,
            verdict,
            search,
            sort,
            asc,
        } => {
            let result = load(source).await?;
            let query = CompanyQuery {
                sector,
                verdict,
                search,
                sort,
                direction: if asc {
                    SortDirection::Asc
                } else {
                    SortDirection::Desc
                },
            };

            let companies = query.apply(&result.companies);
            info!(
                shown = companies.len(),
                total = result.companies.len(),
                "Company table"
            );
            for line in company_lines(&companies) {
                println!("{line}");
            }
        }
        Commands::Sectors { source } => {
            let result = load(source).await?;
            for name in sector_names(&result.companies) {
                println!("{name}");
            }
        }
        Commands::Export { source, output } => {
            let result = load(source).await?;
            let companies: Vec<_> = result.companies.iter().collect();
            write_companies_csv(&output, &companies)?;
        }
    }

    Ok(())
}

/// Resolves settings (environment, then CLI overrides) and runs the pipeline.
#[tracing::instrument(skip_all)]
async fn load(args: SourceArgs) -> Result<DashboardResult> {
    let config = Settings::from_env()
        .with_overrides(args.source, args.tolerance.as_deref())
        .pipeline_config()?;

    Ok(run(&config).await?)
}
