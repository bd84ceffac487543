// src/main.rs
mod utils;
mod fetch;
mod extractors;
mod storage;

use clap::Parser;
use utils::AppError;
use extractors::{StatsExtractor, DEBUG_MARKER_PATTERNS};
use storage::{StorageManager, DEFAULT_OUTPUT_PATH};

/// Downloads the drone violations page and writes its statistics as JSON.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Page to scrape
    #[arg(long, default_value = fetch::DEFAULT_URL)]
    url: String,

    /// JSON file to write (replaced on every run)
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    output: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = fetch::DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Debug mode - save the raw page and an annotated copy next to the output
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting run with args: {:?}", args);

    run(args).await?;
    Ok(())
}

/// Fetch, extract and save. Returns the path written.
async fn run(args: Args) -> Result<std::path::PathBuf, AppError> {
    if args.timeout_secs == 0 {
        return Err(AppError::Config("--timeout-secs must be greater than zero".to_string()));
    }

    // 3. Fetch - any failure here ends the run before anything touches the disk
    let html = fetch::fetch_page(&args.url, args.timeout_secs).await?;
    tracing::info!("Successfully downloaded page ({} bytes)", html.len());

    let storage = StorageManager::new(&args.output)?;
    tracing::debug!("Output will be written to {}", storage.output_path().display());

    if args.debug {
        storage.save_raw_page(&html)?;
        let annotated = storage.sibling_path("annotated.html");
        if let Err(e) = utils::html_debug::create_debug_html(&html, &annotated, DEBUG_MARKER_PATTERNS) {
            tracing::warn!("Failed to create debug HTML: {}", e);
        }
    }

    // 4. Extract
    let record = StatsExtractor::new().extract(&html);
    for gap in record.gaps() {
        tracing::warn!("No data found for {}; field left empty", gap);
    }

    // 5. Save
    let path = storage.save_record(&record)?;
    println!("Wrote {} → {}", record.summary(), path.display());

    Ok(path)
}
