use anyhow::{Context, Result};
use clap::Parser;
use secrecy::SecretString;
use std::path::PathBuf;
use tokio::sync::mpsc;

use gram::app::{App, AppEvent};
use gram::client::ApiClient;
use gram::config::Config;
use gram::theme::ThemeVariant;
use gram::ui;

/// Get the config directory path (~/.config/gram/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("gram"))
}

#[derive(Parser, Debug)]
#[command(name = "gram", about = "Terminal client for a photo-sharing feed")]
struct Args {
    /// Path to an alternate config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend base URL (overrides the config file)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // Set up config directory
    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        println!("Created config directory: {}", config_dir.display());
    }

    // The config file can hold a session token, so the directory is
    // user-only on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(&config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
                    tracing::warn!(
                        path = %config_dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_dir.display(),
                    error = %e,
                    "Failed to read config directory metadata"
                );
            }
        }
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    // Backend URL: flag wins over config file.
    let base_url = match args.base_url.or_else(|| config.base_url.clone()) {
        Some(url) => url,
        None => {
            eprintln!("Error: No backend configured.");
            eprintln!();
            eprintln!("Set base_url in {}:", config_path.display());
            eprintln!("  base_url = \"https://feed.example.com\"");
            eprintln!();
            eprintln!("Or pass it on the command line:");
            eprintln!("  gram --base-url https://feed.example.com");
            std::process::exit(1);
        }
    };

    // GRAM_SESSION_TOKEN overrides the config file.
    let session_token = std::env::var("GRAM_SESSION_TOKEN")
        .ok()
        .filter(|token| !token.is_empty())
        .or_else(|| config.session_token.clone())
        .map(SecretString::from);
    if session_token.is_none() {
        tracing::warn!("No session token configured, requests will be unauthenticated");
    }

    let theme = match ThemeVariant::from_str_name(&config.theme) {
        Some(variant) => variant,
        None => {
            tracing::warn!(theme = %config.theme, "Unknown theme in config, using dark");
            ThemeVariant::Dark
        }
    };

    let client = ApiClient::new(&base_url, session_token)
        .with_context(|| format!("Cannot use backend URL '{}'", base_url))?;

    // Create app state
    let mut app = App::new(client, theme, config.page_size);

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    // Run the TUI
    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
