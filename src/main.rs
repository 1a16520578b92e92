use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use rider_tester::utils::config::{
    ProbeConfig, SchemaConfig, DEFAULT_BACKEND_URL, DEFAULT_ROW_CAP, DEFAULT_TIMEOUT_SECS,
};
use rider_tester::{report, runner, schema, utils};

#[derive(Parser)]
#[command(name = "rider-tester")]
#[command(version)]
#[command(about = "Backend checks for the POS rider system", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Exercise the backend's GPS endpoints and report pass/fail per check
    Probe {
        /// Backend root URL
        #[arg(long, default_value = DEFAULT_BACKEND_URL)]
        base_url: String,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,

        /// Output directory for reports
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Write results.json and junit.xml to the output directory
        #[arg(long, default_value = "false")]
        report: bool,
    },

    /// Check that the expected tables exist in the hosted database
    VerifySchema {
        /// Database service URL
        #[arg(long, env = "SUPABASE_URL")]
        url: Option<String>,

        /// Database access key
        #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
        key: Option<String>,

        /// Maximum rows read from each catalogue table
        #[arg(long, default_value_t = DEFAULT_ROW_CAP)]
        row_cap: usize,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,
    },

    /// Re-render a saved results.json
    Report {
        /// Path to results.json
        results: PathBuf,

        /// Output format (json, junit)
        #[arg(short, long, default_value = "junit")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    utils::logging::init(cli.verbose);

    match cli.command {
        Commands::Probe {
            base_url,
            timeout_secs,
            output,
            report,
        } => {
            let config = match ProbeConfig::new(&base_url, timeout_secs) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("{} Error: {}", "✗".red().bold(), e);
                    return Ok(ExitCode::from(1));
                }
            };

            let results = runner::run_probe(config, &output, report).await?;
            if results.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(1))
            }
        }

        Commands::VerifySchema {
            url,
            key,
            row_cap,
            timeout_secs,
        } => {
            let config = match SchemaConfig::new(url, key) {
                Ok(config) => config
                    .with_row_cap(row_cap)
                    .with_timeout(Duration::from_secs(timeout_secs)),
                Err(e) => {
                    eprintln!("{} Error: {}", "✗".red().bold(), e);
                    return Ok(ExitCode::from(1));
                }
            };

            let verifier = schema::SchemaVerifier::new(config)?;
            let status = verifier.verify().await;
            schema::print_status(&status);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Report {
            results,
            format,
            output,
        } => {
            println!(
                "{} Generating {} report from: {}",
                "📊".to_string().blue(),
                format.cyan(),
                results.display()
            );
            report::generate_report(&results, &format, output.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
