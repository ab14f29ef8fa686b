//! Shipment Analytics Dashboard server
//!
//! Serves the dashboard page and its JSON API. Every request re-runs the
//! load → filter → aggregate → chart pipeline over the cached CSV.
//!
//! Usage:
//!   ./target/release/shipment_dashboard [--port PORT] [--data PATH]
//!
//! Environment variables:
//!   SHIPMENT_DATA_PATH - Path to the flattened shipments CSV
//!   PORT               - Port to listen on
//!   RUST_LOG           - Log filter (default: info)

use anyhow::Result;
use clap::Parser;
use shipment_dashboard::api::{create_router, DashboardService};
use shipment_dashboard::DEFAULT_DATA_PATH;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "shipment_dashboard")]
#[command(about = "Interactive shipment analytics dashboard")]
struct Args {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "8501")]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Flattened shipments CSV
    #[arg(long, env = "SHIPMENT_DATA_PATH", default_value = DEFAULT_DATA_PATH)]
    data: PathBuf,
}

fn print_banner(addr: &SocketAddr, data: &Path) {
    println!("============================================================");
    println!("           SHIPMENT ANALYTICS DASHBOARD");
    println!("============================================================");
    println!();
    println!("  Dashboard: http://{}/", addr);
    println!("  Data:      {}", data.display());
    println!();
    println!("API Endpoints:");
    println!("  GET /api/v1/health              Health check");
    println!("  GET /api/v1/states              Available drop states");
    println!("  GET /api/v1/dashboard           Dashboard model (JSON)");
    println!("  GET /api/v1/charts/:id.svg      Single chart (SVG)");
    println!();
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let args = Args::parse();
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    print_banner(&addr, &args.data);

    if !args.data.exists() {
        warn!(
            "{} not found yet; the dashboard will show an error until the flatten step has run",
            args.data.display()
        );
    }

    let service = Arc::new(DashboardService::new(args.data));
    let app = create_router(service);

    info!("Starting dashboard server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
