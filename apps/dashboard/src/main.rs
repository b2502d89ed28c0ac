//! Mokart - trajectory viewer for recorded kart sessions
//!
//! Signs in against the session service, lists recorded sessions and renders
//! a session's trajectory to SVG or PNG.

use std::sync::Arc;

use mokart_dashboard::cli::{Cli, Commands, ConfigAction};
use mokart_dashboard::commands::{self, AppContext};
use mokart_dashboard::config::Config;
use mokart_dashboard::store::{FileStore, SessionStore};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = match &cli.config {
        Some(path) if path.exists() => Config::load(path)?,
        Some(path) => {
            if !matches!(cli.command, Commands::Config { action: ConfigAction::Init { .. } }) {
                warn!(path = %path.display(), "config file not found, using defaults");
            }
            Config::default()
        }
        None => Config::load_default()?,
    };
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
        config.validate()?;
    }

    let storage = config.storage_dir();
    debug!(config = %config_path.display(), storage = %storage.display(), api = %config.api.base_url, "starting");
    let store: Arc<dyn SessionStore> = Arc::new(FileStore::new(storage));
    let ctx = AppContext { config, config_path, store };

    match cli.command {
        Commands::Sessions => commands::list_sessions(&ctx).await?,
        Commands::Render { session, out, size } => {
            commands::render_session(&ctx, &session, &out, size).await?;
        }
        Commands::Export { session, out } => commands::export_session(&ctx, &session, &out).await?,
        Commands::RenderFile { input, stats, out, size } => {
            commands::render_file(&ctx, &input, stats.as_deref(), &out, size)?;
        }
        Commands::Login { email, password } => commands::login(&ctx, email, password).await?,
        Commands::Register { email, password, vehicle_model } => {
            commands::register(&ctx, email, password, vehicle_model).await?;
        }
        Commands::Demo => commands::demo(&ctx).await?,
        Commands::Logout => commands::logout(&ctx)?,
        Commands::Whoami => commands::whoami(&ctx)?,
        Commands::Config { action } => commands::config(&ctx, action)?,
    }

    Ok(())
}
