//! Headless harvest binary: one end-to-end run per invocation.
//!
//! Fetches the most recently favorited posts, downloads the papers they link
//! to that have not been downloaded before, and records the successes.

mod config;
mod logging;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use harvest_core::LinkExtractor;
use harvest_engine::{
    build_client, HarvestRunner, HttpTitleResolver, PdfDownloader, ProcessedStore, TwitterFeed,
};
use harvest_logging::{harvest_error, harvest_info};

use crate::config::Config;

const DEFAULT_CONFIG_PATH: &str = "harvest.toml";

fn main() -> ExitCode {
    logging::initialize();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Per-link failures are handled inside the run; reaching this
            // point means the run itself could not complete.
            harvest_error!("Harvest failed: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let config_path = env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = Config::load(&config_path)?;

    let client = build_client(&config.http).context("could not build the http client")?;
    let feed = TwitterFeed::new(client.clone(), config.credentials);
    let resolver = HttpTitleResolver::new(client.clone());
    let downloader = PdfDownloader::new(client, config.artifact_dir.clone());
    let store = ProcessedStore::new(&config.cache_dir, &config.cache_file);

    let mut runner = HarvestRunner::new(
        Box::new(feed),
        Box::new(resolver),
        Box::new(downloader),
        store,
        LinkExtractor::new(),
        config.max_items,
    );

    let runtime = tokio::runtime::Runtime::new().context("could not start the async runtime")?;
    let summary = runtime.block_on(runner.run())?;
    harvest_info!("{}", summary);
    Ok(())
}
