use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nell_client::{AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (malformed numbers abort startup)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("nell_client={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Nell client v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::initialize(config)?;

    match state.api.health_check().await {
        Ok(health) => info!("Backend healthy: {} {}", health.status, health.version),
        Err(e) => warn!("Backend health check failed: {e}"),
    }

    if let Some(projects) = state.sync.load_projects().await {
        info!("Loaded {} projects", projects.len());
    }

    let restored = state.projects.with_state(|s| s.current_project.clone());
    if let Some(project) = restored {
        info!("Restored current project {} ({})", project.name, project.id);
        state.sync.load_workspace(&project.id).await;
    }

    let snapshot = state.projects.snapshot();
    info!(
        "Ready: {} projects, {} tables, {} buckets ({} active), {} prompts, {} outputs, {} unread notifications",
        snapshot.projects.len(),
        snapshot.tables.len(),
        snapshot.buckets.len(),
        snapshot.active_buckets().count(),
        snapshot.prompts.len(),
        snapshot.outputs.len(),
        state.notifications.unread_count()
    );

    Ok(())
}
