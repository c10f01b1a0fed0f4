use anyhow::{Context, Result};
use polar_accesslink::{
    server::{self, AppState},
    Config, PolarClient,
};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "polar_accesslink=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().context("Failed to load AccessLink configuration")?;
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "4000".to_string())
        .parse()
        .context("Invalid PORT")?;
    info!("Starting Polar AccessLink OAuth helper");
    info!("AccessLink host: {}", config.host());

    let polar = PolarClient::new(config)?;
    let app = server::router(AppState::new(polar));

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    info!("Listening on {}", addr);

    println!("\nPolar AccessLink OAuth Helper");
    println!("=============================");
    println!("Server running at: http://localhost:{}", port);
    println!("\nLink an account:");
    println!("  Visit: http://localhost:{}/auth/login", port);
    println!("  Health: http://localhost:{}/health\n", port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
