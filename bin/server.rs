// FinFit Dashboard - Web Server
// REST API over the loaded client dataset

use anyhow::{Context, Result};
use finfit::server::{router, AppState};
use finfit::{load_csv, Settings};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    println!("🌐 FinFit Dashboard - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let settings = Settings::from_env()?;

    let records = load_csv(&settings.data_path).with_context(|| {
        format!(
            "Failed to load dataset {:?} (set FINFIT_DATA to point at the client CSV)",
            settings.data_path
        )
    })?;
    println!("✓ Dataset loaded: {} clients from {:?}", records.len(), settings.data_path);

    let app = router(AppState::new(records));

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind_addr))?;

    tracing::info!(addr = %settings.bind_addr, "server listening");
    println!("\n🚀 Server running on http://{}", settings.bind_addr);
    println!("   API: http://{}/api/clients", settings.bind_addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}
