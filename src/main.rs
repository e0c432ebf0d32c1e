use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use clout::banner::{BannerInfo, print_banner};
use clout::config::Config;
use clout::server::{self, AppState};

#[derive(Parser)]
#[command(name = "clout", version, about = "Engagement and income estimates for X accounts.")]
struct Cli {
    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory with the front-end files (overrides CLOUT_PUBLIC_DIR)
    #[arg(long)]
    public_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is normal.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "ignoring unreadable .env"),
    }

    let mut config = Config::from_env_with_port(cli.port)?;
    if let Some(dir) = cli.public_dir {
        config.public_dir = dir;
    }

    if !config.has_credential() {
        warn!("TWITTER_BEARER_TOKEN is not set; only demo mode will work");
    }

    print_banner(&BannerInfo {
        port: config.port,
        api_base: &config.api_base,
        has_credential: config.has_credential(),
        public_dir: &config.public_dir,
    });

    let state = AppState::from_config(&config)?;
    server::serve(&config, state).await
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "clout=info,tower_http=info",
        1 => "clout=debug,tower_http=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2)
        .init();
}
