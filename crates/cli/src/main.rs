//! # subhook-cli: A CLI for `subhook`
//!
//! This is the main entry point for the `subhook` admin command-line interface.

mod api_client;

use anyhow::Result;
use api_client::{store_token, ApiClient};
use clap::{Parser, Subcommand};
use core_access::{issue_token, ADMIN_ROLE};
use std::fs::File;
use subhook::{Subscription, SubscriptionState};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_SERVER: &str = "http://localhost:3001/api/v1/subscribe";

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Base URL of the subscription endpoints
    #[arg(long, global = true, env = "SUBHOOK_SERVER", default_value = DEFAULT_SERVER)]
    server: String,

    /// Admin token to use instead of the one saved by `login`
    #[arg(long, global = true, env = "SUBHOOK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Save an admin token in the OS keychain
    Login(LoginArgs),
    /// List every stored subscription
    List,
    /// Trigger a refresh pass over all subscriptions
    Refresh,
    /// Trigger a search pass over subscriptions in one state
    Search(SearchArgs),
    /// Mint an admin token from the server's JWT secret
    MintToken(MintTokenArgs),
}

#[derive(Parser, Debug)]
struct LoginArgs {
    /// The admin bearer token
    #[arg(value_name = "TOKEN")]
    bearer: String,
}

#[derive(Parser, Debug)]
struct SearchArgs {
    /// N (new), R (running) or P (pending); the server default when omitted
    #[arg(long)]
    state: Option<SubscriptionState>,
}

#[derive(Parser, Debug)]
struct MintTokenArgs {
    /// The server's `jwt_secret`
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    secret: String,
    /// Who the token is issued to
    #[arg(long)]
    subject: String,
    /// How long the token stays valid
    #[arg(long, default_value_t = 24)]
    hours: i64,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging to a file
    let log_file = File::create("subhook-cli.log")?;
    let subscriber = fmt::Subscriber::builder()
        .with_writer(log_file)
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match &cli.command {
        Commands::Login(args) => {
            store_token(&args.bearer)?;
            info!("Admin token stored securely.");
            println!("✅ Login successful!");
        }
        Commands::MintToken(args) => {
            let token = issue_token(
                &args.secret,
                &args.subject,
                ADMIN_ROLE,
                chrono::Duration::hours(args.hours),
            )?;
            info!(subject = %args.subject, hours = args.hours, "Minted admin token.");
            println!("{token}");
        }
        Commands::List => {
            let client = api_client(&cli)?;
            let subscriptions = client.list_subscriptions().await?;
            print_subscriptions(&subscriptions);
        }
        Commands::Refresh => {
            let client = api_client(&cli)?;
            let response = client.refresh().await?;
            report("Refresh", response.success, response.message.as_deref());
        }
        Commands::Search(args) => {
            let client = api_client(&cli)?;
            let response = client.search(args.state).await?;
            report("Search", response.success, response.message.as_deref());
        }
    }

    Ok(())
}

fn api_client(cli: &Cli) -> Result<ApiClient> {
    match &cli.token {
        Some(token) => Ok(ApiClient::new(&cli.server, token.clone())),
        None => ApiClient::from_keyring(&cli.server),
    }
}

// --- Output ---

fn print_subscriptions(subscriptions: &[Subscription]) {
    if subscriptions.is_empty() {
        println!("No subscriptions found.");
        return;
    }

    for sub in subscriptions {
        let season = sub
            .season
            .map(|s| format!("S{s:02}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>6}  {}  {:<5}  {:<4}  {:<8}  {}",
            sub.id,
            sub.state,
            sub.media_kind.as_str(),
            season,
            sub.tmdb_id,
            sub.name
        );
    }
    println!("{} subscription(s).", subscriptions.len());
}

fn report(operation: &str, success: bool, message: Option<&str>) {
    match (success, message) {
        (true, _) => println!("✅ {operation} triggered."),
        (false, Some(message)) => println!("{operation} was not triggered: {message}"),
        (false, None) => println!("{operation} was not triggered."),
    }
}
