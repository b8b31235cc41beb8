use clap::Parser;
use tiktok_connect::{AppConfig, AppState, AuthError};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "tiktok-connect",
    about = "Sign in with TikTok: OAuth login flow and session projection endpoints."
)]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<(), AuthError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Configuration is validated per request, not here: a missing variable
    // fails the requests that need it, never the whole process.
    let state = AppState::new(AppConfig::from_env())?;

    let listener = TcpListener::bind(&cli.bind).await?;
    tracing::info!(addr = %cli.bind, "listening");
    tiktok_connect::serve(listener, state).await
}
