//! Wayfarer - a multi-profile browser shell.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use browser::commands::{run_profiles_command, ProfilesCommand};
use browser::{prompt, ShellConfig};
use profiles::ProfileStore;
use ui::ProfileChoice;

/// Wayfarer - a browser shell with isolated profiles
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL or search terms to open
    url: Option<String>,

    /// Profile to use; created if missing
    #[arg(long, conflicts_with_all = ["guest", "choose_profile"])]
    profile: Option<String>,

    /// Start a guest session whose data is removed on exit
    #[arg(long, conflicts_with = "choose_profile")]
    guest: bool,

    /// Pick the profile interactively
    #[arg(long)]
    choose_profile: bool,

    /// Run without a window
    #[arg(long)]
    headless: bool,

    /// Data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Home page
    #[arg(long)]
    home: Option<String>,

    /// Window width
    #[arg(long)]
    width: Option<u32>,

    /// Window height
    #[arg(long)]
    height: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage profiles
    #[command(subcommand)]
    Profiles(ProfilesCommand),
}

impl Args {
    /// Build the configuration: file first, then flags.
    fn config(&self) -> Result<ShellConfig> {
        let mut config = match &self.config {
            Some(path) => ShellConfig::from_file(path)?,
            None => ShellConfig::default(),
        };

        if let Some(dir) = &self.data_dir {
            config = config.with_data_dir(dir);
        }
        if let Some(home) = &self.home {
            config = config.with_home_page(home);
        }
        let width = self.width.unwrap_or(config.width);
        let height = self.height.unwrap_or(config.height);
        Ok(config.with_window_size(width, height))
    }

    /// Resolve which profile to open.
    fn choice(&self, store: &ProfileStore) -> Result<ProfileChoice> {
        if self.guest {
            return Ok(ProfileChoice::Guest);
        }
        if let Some(name) = &self.profile {
            let profile = store.open_or_create(name)?;
            return Ok(ProfileChoice::Existing(profile.name().to_string()));
        }

        store.ensure_default()?;
        if self.choose_profile {
            let stdin = io::stdin();
            return prompt::choose_profile(store, stdin.lock(), io::stdout());
        }
        Ok(ProfileChoice::Existing(profiles::DEFAULT_PROFILE.to_string()))
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("installing log subscriber")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let config = args.config()?;
    let data_root = config.data_root()?;
    let store = ProfileStore::open(&data_root)
        .with_context(|| format!("opening profile store in {}", data_root.display()))?;

    if let Some(Command::Profiles(command)) = &args.command {
        return run_profiles_command(&store, command, &mut io::stdout());
    }

    info!("Wayfarer v{}", browser::VERSION);
    let choice = args.choice(&store)?;

    if args.headless {
        let summary = browser::run_headless(&config, &store, &choice, args.url.as_deref()).await?;
        println!("{}\t{}", summary.url, summary.title);
        return Ok(());
    }

    run_windowed(&config, &store, &choice, args.url.as_deref()).await
}

#[cfg(feature = "webview")]
async fn run_windowed(
    config: &ShellConfig,
    store: &ProfileStore,
    choice: &ProfileChoice,
    url: Option<&str>,
) -> Result<()> {
    if matches!(choice, ProfileChoice::Guest) {
        browser::sweep_stale_guest_storage(config).await;
    }

    // The event loop has to own the main thread.
    let cleanup = tokio::task::block_in_place(|| {
        browser::webview::run_webview(config, store, choice, url)
    })?;

    if let Some(handle) = cleanup {
        let report = handle.await.context("guest cleanup task")?;
        info!(attempts = report.attempts, outcome = ?report.outcome, "guest cleanup finished");
    }
    Ok(())
}

#[cfg(not(feature = "webview"))]
async fn run_windowed(
    _config: &ShellConfig,
    _store: &ProfileStore,
    _choice: &ProfileChoice,
    _url: Option<&str>,
) -> Result<()> {
    anyhow::bail!("this build has no window support; rebuild with `--features webview` or pass --headless")
}
