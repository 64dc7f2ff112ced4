//! Command-line front end for sessionkit.
//!
//! Run with: cargo run -p sessionkit-cli -- login --email a@x.com --password secret1
//!
//! Plays the presentation layer: it validates form values, calls the
//! clients, prints their messages and decides what to do next.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sessionkit_client::{
    ApiClient, ApiConfig, AuthClient, AuthMode, AuthRequest, LoginFields, ProfileClient,
    RegisterFields, api::config::{DEFAULT_BASE_URL, ENV_API_URL, ENV_TIMEOUT_SECS},
    validate,
};
use sessionkit_store::{SessionStore, storage::FileStorage};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "sessionkit", about = "Register, log in and edit your profile")]
struct Cli {
    /// Base URL of the authentication API.
    #[arg(long, env = ENV_API_URL, default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// Request timeout in seconds.
    #[arg(long, env = ENV_TIMEOUT_SECS, default_value_t = 10)]
    timeout_secs: u64,

    /// Session file; defaults to the platform data directory.
    #[arg(long, env = "SESSIONKIT_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "SESSIONKIT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log in and store the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SESSIONKIT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the stored profile.
    Whoami,
    /// Change the display name.
    UpdateProfile {
        /// New display name.
        name: String,
    },
    /// Log out and forget the stored session.
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = ApiConfig::new(&cli.api_url)?.with_timeout(Duration::from_secs(cli.timeout_secs));
    let api = ApiClient::new(config)?;
    let storage = match cli.session_file {
        Some(path) => FileStorage::new(path),
        None => FileStorage::at_default_location()?,
    };
    tracing::debug!(path = %storage.path().display(), "Using session file");

    let store = Arc::new(SessionStore::new(storage));
    let auth = AuthClient::new(api.clone(), Arc::clone(&store));
    let profile = ProfileClient::new(api, Arc::clone(&store));

    match cli.command {
        Command::Register {
            name,
            email,
            password,
        } => {
            submit(&auth, RegisterFields::new(name, email, password).into()).await?;
        }
        Command::Login { email, password } => {
            submit(&auth, LoginFields::new(email, password).into()).await?;
        }
        Command::Whoami => match profile.current_profile().await {
            Some(p) => println!("{} <{}>", p.name, p.email),
            None => println!("Not logged in."),
        },
        Command::UpdateProfile { name } => {
            validate::validate_name(&name)?;
            match profile.update_profile(&name).await {
                Ok(p) => println!("Profile updated successfully: {} <{}>", p.name, p.email),
                Err(e) if e.requires_login() => {
                    anyhow::bail!("{e}\nRun `sessionkit login` to sign in again.")
                }
                Err(e) => return Err(e).context("Profile update failed"),
            }
        }
        Command::Logout => {
            auth.logout().await.context("Logged out locally, but the server call failed")?;
            println!("Logged out successfully");
        }
    }

    Ok(())
}

async fn submit(auth: &AuthClient<FileStorage>, request: AuthRequest) -> Result<()> {
    request.validate()?;
    let mode = request.mode();

    let authenticated = auth.authenticate_verbose(request).await?;
    println!("{}", authenticated.message);

    if mode == AuthMode::Register {
        println!(
            "Log in with `sessionkit login --email {}`.",
            authenticated.session.profile.email
        );
    }
    Ok(())
}
