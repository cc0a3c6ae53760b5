//! Replay Fixtures CLI - record fixture directories and check them against
//! their expected pages and outputs.

use clap::{Parser, Subcommand};
use replay_fixtures::{
    check_fixtures, enable_test_mode, Config, FixtureContext, LoadOptions, RecordMap, Recorder,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "replay-fixtures", version, about = "Record and check scraper fixtures")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare saved pages and outputs of every fixture directory against
    /// the expected ones
    Check {
        /// Directory holding one sub-directory per fixture
        root: Option<PathBuf>,
    },
    /// Record fixture directories listed in an input map
    Record {
        /// JSON array of {"gid", "dir", ...} entries
        input_map: PathBuf,
        /// Fixture directory to replay as the data source
        #[arg(long)]
        from: PathBuf,
        /// Directory the input map entries are relative to
        #[arg(long)]
        root_dir: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "replay_fixtures=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    if config.test_mode {
        enable_test_mode();
    }

    let cli = Cli::parse();
    match cli.command {
        Command::Check { root } => {
            let root = root.unwrap_or_else(|| config.fixtures_root.clone());
            let summary = check_fixtures(&root)?;
            if !summary.passed() {
                tracing::error!(
                    "{} of {} fixture(s) did not match",
                    summary.failed.len(),
                    summary.checked.len()
                );
                return Ok(ExitCode::FAILURE);
            }
            tracing::info!("All {} fixture(s) matched", summary.checked.len());
        }
        Command::Record {
            input_map,
            from,
            root_dir,
        } => {
            let text = std::fs::read_to_string(&input_map)?;
            let input_map: Vec<RecordMap> = serde_json::from_str(&text)?;

            let mut source = FixtureContext::new();
            source.load_input(LoadOptions::from_dir(from))?;

            let mut recorder = Recorder::new(source)
                .with_root_dir(root_dir.unwrap_or_else(|| config.fixtures_root.clone()))
                .with_input_map(input_map);
            recorder.job_id = config.job_id;
            recorder.scraper_name = config.scraper_name.clone();

            let recorded = recorder.record_all()?;
            tracing::info!("Recorded {} fixture(s)", recorded);
        }
    }
    Ok(ExitCode::SUCCESS)
}
