// Paperlib - Academic paper library client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use paperlib_core::api::firebase::{FirebaseAuth, FirebaseSession};
use paperlib_core::api::types::Library;
use paperlib_core::api::{routes, ApiContext, RequestConfig, SessionUser};
use paperlib_core::config::{ClientConfig, FirebaseConfig};
use paperlib_core::notify::TracingNotifier;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "paperlib-cli")]
#[command(about = "Paperlib CLI - account and library helper", long_about = None)]
struct Cli {
    /// Path to firebase-config.json (falls back to FIREBASE_API_KEY)
    #[arg(long, global = true)]
    firebase_config: Option<PathBuf>,

    /// Paper service base URL (falls back to PAPERLIB_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Credentials {
    /// Email address
    #[arg(short, long, env = "EMAIL")]
    email: String,
    /// Password
    #[arg(short, long, env = "PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and send the verification email
    CreateUser {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Sign in and print an ID token for manual API calls
    Login {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// List the signed-in user's libraries
    Libraries {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Show a public library (no sign-in needed)
    PublicLibrary {
        /// Library id
        id: String,
    },
}

fn firebase_session(path: Option<&PathBuf>) -> anyhow::Result<Arc<FirebaseSession>> {
    let config = match path {
        Some(path) => FirebaseConfig::from_file(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => FirebaseConfig::from_env().context("no --firebase-config given")?,
    };
    Ok(Arc::new(FirebaseSession::new(FirebaseAuth::new(&config)?)))
}

fn client_config(api_url: Option<String>) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = api_url {
        config.base_url = url;
    }
    config.validate()?;
    Ok(config)
}

fn print_library(library: &Library) {
    let visibility = if library.private { "private" } else { "public" };
    println!(
        "{}  {} ({} papers, {})",
        library.id, library.title, library.num_papers, visibility
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::CreateUser { credentials } => {
            let session = firebase_session(cli.firebase_config.as_ref())?;
            let user = session
                .sign_up(&credentials.email, &credentials.password)
                .await
                .context("creating account")?;
            println!("Created user {}", user.uid());

            // the account exists either way; a failed email is only reported
            match user.send_email_verification().await {
                Ok(()) => println!("Email verification sent!"),
                Err(e) => eprintln!("Could not send verification email: {}", e.user_message()),
            }
        }
        Commands::Login { credentials } => {
            let session = firebase_session(cli.firebase_config.as_ref())?;
            let user = session
                .sign_in(&credentials.email, &credentials.password)
                .await
                .context("signing in")?;
            println!("Logged in as: {}", user.email().unwrap_or(credentials.email.as_str()));
            println!("\nToken:\n\n{}", user.id_token().await?);
        }
        Commands::Libraries { credentials } => {
            let session = firebase_session(cli.firebase_config.as_ref())?;
            session
                .sign_in(&credentials.email, &credentials.password)
                .await
                .context("signing in")?;

            let context = ApiContext::new(client_config(cli.api_url)?, session, Arc::new(TracingNotifier))?;
            let libraries: Option<Vec<Library>> = context
                .bind(routes::libraries::get::user_libraries)
                .get(RequestConfig::new())
                .await;

            let Some(libraries) = libraries else {
                bail!("could not load libraries");
            };
            if libraries.is_empty() {
                println!("No libraries");
            }
            libraries.iter().for_each(print_library);
        }
        Commands::PublicLibrary { id } => {
            // public routes never consult the session; the provider only fills the slot
            let identity = Arc::new(paperlib_core::api::StaticTokenIdentity::signed_out());
            let context = ApiContext::new(client_config(cli.api_url)?, identity, Arc::new(TracingNotifier))?;
            let library: Option<Library> = context
                .bind_public(routes::libraries::get::public_library)
                .get(RequestConfig::new().param(id))
                .await;

            match library {
                Some(library) => print_library(&library),
                None => bail!("could not load library"),
            }
        }
    }

    Ok(())
}
