//! gamedeck command-line entry point.

mod config;

use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gamedeck_launcher::{ClientRelaunch, Dispatcher, Notification, NotificationStyle, SystemShell};
use gamedeck_library::{Aggregator, ScanContext, ScanReport, Settings};
use gamedeck_model::{Game, SortOrder};
use gamedeck_stores::playnite::{PLAYNITE_OPEN_URI, PLAYNITE_PROCESSES};
use gamedeck_xbox::{AuthFlow, Entitlements, JsonFileCache, LiveApi, ResultCache};
use tracing_subscriber::EnvFilter;

/// Pause between stopping Playnite and reopening it.
const PLAYNITE_SETTLE: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "gamedeck", version, about = "Find, launch and uninstall installed PC games")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan every enabled platform and list installed games.
    List {
        /// Print games as JSON.
        #[arg(long)]
        json: bool,
        /// Override the configured sort order.
        #[arg(long, value_parser = parse_sort_order)]
        sort: Option<SortOrder>,
    },
    /// Launch the game with the given id.
    Launch { id: String },
    /// Start the uninstaller of the game with the given id.
    Uninstall { id: String },
    /// Authorize Xbox access and cache owned titles.
    XboxLogin {
        /// Azure application id; defaults to `xboxClientId` from settings.
        #[arg(long)]
        client_id: Option<String>,
    },
    /// Forget cached Xbox entitlements.
    XboxLogout,
    /// Restart Playnite so its library export is regenerated.
    RestartPlaynite,
}

fn parse_sort_order(raw: &str) -> Result<SortOrder, String> {
    match raw {
        "alphabetical" => Ok(SortOrder::Alphabetical),
        "lastPlayed" | "last-played" => Ok(SortOrder::LastPlayed),
        "platform" => Ok(SortOrder::Platform),
        "discovered" => Ok(SortOrder::Discovered),
        other => Err(format!(
            "unknown sort order '{other}' (alphabetical, lastPlayed, platform, discovered)"
        )),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let path = config::settings_path()?;
    let settings = config::load_from(&path)?;
    tracing::debug!(path = %path.display(), "settings loaded");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(cli.command, settings))
}

async fn run(command: Command, mut settings: Settings) -> anyhow::Result<()> {
    let cache: Arc<dyn ResultCache> = Arc::new(JsonFileCache::open_default()?);
    let ctx = ScanContext::new(gamedeck_registry::system(), cache.clone());
    let dispatcher = Dispatcher::new(Arc::new(SystemShell::default()));

    match command {
        Command::List { json, sort } => {
            if let Some(order) = sort {
                settings.sort_order = order;
            }
            let report = scan(&settings, &ctx).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&report.games)?);
            } else {
                for game in &report.games {
                    println!("{:<40} {:<24} {}", game.id, game.platform, game.title);
                }
            }
        }
        Command::Launch { id } => {
            let game = find(&settings, &ctx, &id).await?;
            report(&dispatcher.launch(&game).await);
        }
        Command::Uninstall { id } => {
            let game = find(&settings, &ctx, &id).await?;
            report(&dispatcher.uninstall(&game).await);
        }
        Command::XboxLogin { client_id } => {
            let client_id = client_id
                .or_else(|| settings.xbox_client_id.clone())
                .context("no Xbox client id: pass --client-id or set xboxClientId")?;
            xbox_login(client_id, cache).await?;
        }
        Command::XboxLogout => {
            Entitlements::clear(cache.as_ref())?;
            println!("Xbox entitlements cleared");
        }
        Command::RestartPlaynite => {
            let client = ClientRelaunch {
                name: "Playnite".into(),
                processes: PLAYNITE_PROCESSES.iter().map(|p| p.to_string()).collect(),
                reopen_uri: PLAYNITE_OPEN_URI.into(),
                settle: PLAYNITE_SETTLE,
            };
            report(&dispatcher.relaunch_client(&client).await);
        }
    }
    Ok(())
}

async fn scan(settings: &Settings, ctx: &ScanContext) -> ScanReport {
    let mut aggregator = Aggregator::from_settings(settings, ctx);
    let report = aggregator.scan().await;
    for failure in report.failures() {
        if let Err(message) = &failure.result {
            eprintln!("warning: {message}");
        }
    }
    report
}

async fn find(settings: &Settings, ctx: &ScanContext, id: &str) -> anyhow::Result<Game> {
    scan(settings, ctx)
        .await
        .games
        .into_iter()
        .find(|g| g.id == id)
        .with_context(|| format!("no installed game with id '{id}'"))
}

async fn xbox_login(client_id: String, cache: Arc<dyn ResultCache>) -> anyhow::Result<()> {
    let api = Arc::new(LiveApi::new()?);
    let mut flow = AuthFlow::start(client_id, api, cache);

    println!("Open this URL, sign in, then paste the final redirect URL (or its code):");
    println!("{}", flow.authorize_url());

    let pasted = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line).map(|_| line)
    })
    .await??;

    let count = flow.complete(pasted.trim()).await?;
    println!("Cached {count} owned Xbox titles");
    Ok(())
}

fn report(notification: &Notification) {
    let tag = match notification.style {
        NotificationStyle::Success => "ok",
        NotificationStyle::Failure => "error",
        NotificationStyle::Unsupported => "unsupported",
    };
    println!("[{tag}] {}: {}", notification.title, notification.message);
}
