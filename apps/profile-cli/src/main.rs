use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use runtime::{AppConfig, CliArgs};
use sdk_errors::TracingErrorReporter;
use url::Url;
use user_profile::client::UserProfileApi;
use user_profile::config::UserProfileConfig;
use user_profile::model::{AccessToken, PictureMode, PictureSize, Profile};
use user_profile::{UserProfile, MODULE_NAME};

/// Profile CLI - fetch and inspect identity profiles from the graph API
#[derive(Parser)]
#[command(name = "profile-cli")]
#[command(about = "Profile CLI - fetch and inspect identity profiles from the graph API")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the profile for an access token and print it as JSON
    Fetch {
        /// User access token
        #[arg(long)]
        token: String,

        /// Granted permission (repeatable), e.g. email, user_friends
        #[arg(long = "permission")]
        permissions: Vec<String>,

        /// User id the token belongs to
        #[arg(long, default_value = "")]
        user_id: String,
    },
    /// Print the profile picture URL for a user
    Picture {
        #[arg(long)]
        user_id: String,

        /// square, normal, album, small or large
        #[arg(long, default_value = "normal")]
        mode: String,

        #[arg(long, default_value_t = 100, allow_negative_numbers = true)]
        width: i32,

        #[arg(long, default_value_t = 100, allow_negative_numbers = true)]
        height: i32,

        /// User access token; the configured client token is used otherwise
        #[arg(long)]
        token: Option<String>,
    },
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.home_dir));
    tracing::info!("profile-cli starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Check) {
        Commands::Fetch {
            token,
            permissions,
            user_id,
        } => fetch_profile(&config, AccessToken::new(token, user_id, permissions)).await,
        Commands::Picture {
            user_id,
            mode,
            width,
            height,
            token,
        } => print_picture_url(
            &config,
            &user_id,
            PictureMode::from_name(&mode),
            PictureSize::new(width, height),
            token,
        ),
        Commands::Check => check_config(&config),
    }
}

fn init_module(config: &AppConfig) -> Result<UserProfile> {
    let cfg: UserProfileConfig = config.module_config_or_default(MODULE_NAME)?;
    let module = UserProfile::new();
    module.init(&cfg, Arc::new(TracingErrorReporter))?;
    Ok(module)
}

async fn fetch_profile(config: &AppConfig, token: AccessToken) -> Result<()> {
    let module = init_module(config)?;
    let client = module.client()?;

    match client
        .load_profile(Some(token))
        .await
        .context("profile load failed")?
    {
        Some(profile) => {
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        None => {
            tracing::warn!("graph response did not contain a profile");
            println!("null");
        }
    }
    Ok(())
}

fn print_picture_url(
    config: &AppConfig,
    user_id: &str,
    mode: PictureMode,
    size: PictureSize,
    token: Option<String>,
) -> Result<()> {
    let module = init_module(config)?;
    if let Some(token) = token {
        module
            .access_tokens()
            .set(Some(AccessToken::new(token, user_id, Vec::<String>::new())));
    }

    let profile = Profile::new(user_id, chrono::Utc::now())
        .ok_or_else(|| anyhow!("--user-id must not be empty"))?;
    let url = module.client()?.picture_url(&profile, mode, size);
    println!("{}", url);
    Ok(())
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    let cfg: UserProfileConfig = config
        .module_config_or_default(MODULE_NAME)
        .context("invalid user_profile configuration")?;
    Url::parse(&cfg.graph_base_url)
        .map_err(|e| anyhow!("invalid graph_base_url '{}': {}", cfg.graph_base_url, e))?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
