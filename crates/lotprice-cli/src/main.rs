mod page;
mod render;
mod watch;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use lotprice_core::SiteProfile;
use lotprice_scraper::{PageReport, PriceCache, PriceEngine};
use tracing_subscriber::EnvFilter;

use crate::page::{PageLoader, PageSource};

#[derive(Debug, Parser)]
#[command(name = "lotprice")]
#[command(about = "Work out what winning an auction lot will actually cost")]
struct Cli {
    /// Site profile YAML (defaults to `LOTPRICE_PROFILE_PATH`, then the built-in profile)
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Where to read the lot page from. Exactly one is required.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct PageArgs {
    /// Saved HTML file of the lot page
    #[arg(long)]
    file: Option<PathBuf>,
    /// URL of the lot page
    #[arg(long)]
    url: Option<String>,
}

impl PageArgs {
    fn into_source(self) -> anyhow::Result<PageSource> {
        match (self.file, self.url) {
            (Some(path), None) => Ok(PageSource::File(path)),
            (None, Some(url)) => Ok(PageSource::Url(url)),
            _ => anyhow::bail!("exactly one of --file or --url is required"),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the final price with its fee breakdown
    Quote {
        #[command(flatten)]
        page: PageArgs,
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show what each locator matches on a page
    Analyze {
        #[command(flatten)]
        page: PageArgs,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Recompute the price periodically, printing it whenever it changes
    Watch {
        #[command(flatten)]
        page: PageArgs,
        /// Seconds between recomputations (defaults to `LOTPRICE_WATCH_INTERVAL_SECS`)
        #[arg(long)]
        interval_secs: Option<u64>,
        /// Print each snapshot as a JSON line
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = lotprice_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let profile = load_site_profile(cli.profile.as_deref().or(config.profile_path.as_deref()))?;
    let engine = PriceEngine::from_profile(&profile)?;

    match cli.command {
        Commands::Quote { page, json } => {
            let loader = PageLoader::new(page.into_source()?, &config)?;
            let html = loader.load().await?;
            let snapshot = engine.quote(&html);
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print!("{}", render::snapshot_text(&snapshot, &profile.fees));
            }
        }
        Commands::Analyze { page, json } => {
            let loader = PageLoader::new(page.into_source()?, &config)?;
            let html = loader.load().await?;
            let report = PageReport::build(&engine, &html);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render::report_text(&report));
            }
        }
        Commands::Watch {
            page,
            interval_secs,
            json,
        } => {
            let loader = PageLoader::new(page.into_source()?, &config)?;
            let interval_secs = interval_secs.unwrap_or(config.watch_interval_secs);
            if interval_secs == 0 {
                anyhow::bail!("--interval-secs must be greater than zero");
            }
            let options = watch::WatchOptions {
                settle_delay: Duration::from_millis(config.settle_delay_ms),
                interval: Duration::from_secs(interval_secs),
                json,
            };
            watch::run_watch(&loader, PriceCache::new(engine), &profile.fees, &options).await?;
        }
    }

    Ok(())
}

fn load_site_profile(path: Option<&Path>) -> anyhow::Result<SiteProfile> {
    let profile = match path {
        Some(path) => lotprice_core::load_profile(path)?,
        None => lotprice_core::builtin_profile()?,
    };
    tracing::debug!(profile = %profile.name, "loaded site profile");
    Ok(profile)
}
