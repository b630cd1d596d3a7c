mod app;
mod commands;
mod config;
mod effects;
mod logging;
mod render;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use feed_logging::feed_info;
use photofeed_core::Msg;

use crate::app::RunMode;
use crate::config::AppConfig;
use crate::logging::LogDestination;

#[derive(Parser, Debug)]
#[command(
    name = "photofeed",
    version,
    about = "Browse the image posts of a WordPress.com site as an endless feed"
)]
struct Cli {
    /// RON config file. Defaults to ./photofeed.ron when it exists.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Page location or hash fragment, e.g. "#?site=example.wordpress.com".
    #[arg(long, conflicts_with = "site")]
    hash: Option<String>,
    /// Site to show; skips hash parsing.
    #[arg(long)]
    site: Option<String>,
    /// Load this many pages, print the feed and exit.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pages: Option<u64>,
    /// Posts requested per page.
    #[arg(long)]
    per_page: Option<u32>,
    /// Where log output goes.
    #[arg(long, value_enum)]
    log: Option<LogDestination>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(per_page) = cli.per_page {
        config.per_page = per_page;
    }
    if let Some(destination) = cli.log {
        config.log_destination = destination;
    }
    config.validate().context("validating configuration")?;

    logging::initialize(config.log_destination, &config.log_file, config.log_level()?);
    feed_info!("photofeed starting with api base {}", config.api_base);

    let initial = match (cli.site, cli.hash) {
        (Some(site), _) => Msg::SiteSelected(site),
        (None, Some(hash)) => Msg::UrlChanged(hash),
        (None, None) => Msg::UrlChanged(String::new()),
    };
    let mode = match cli.pages {
        Some(pages) => RunMode::Batch {
            pages: usize::try_from(pages).unwrap_or(usize::MAX),
        },
        None => RunMode::Interactive,
    };

    app::run(&config, initial, mode)
}
