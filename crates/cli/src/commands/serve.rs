use super::Project;
use anyhow::{Context, Result};
use metagate_edge::{EdgeState, router};
use std::path::PathBuf;
use tracing::info;

/// Run the edge handler on a local listener
pub async fn run(path: PathBuf, host: String, port: u16, fixtures: Option<PathBuf>) -> Result<()> {
    println!("🌐 Starting edge server...");
    println!("   Project: {}", path.display());

    let project = Project::load(&path)?;
    let store = project.open_store(fixtures.as_deref())?;

    println!("   ✓ Site: {} ({})", project.config.site.name, project.config.site.domain);
    if let Some(timeout) = project.config.edge.request_timeout {
        println!("   ✓ Request timeout: {}s", timeout.as_secs());
    }

    let state = EdgeState::new(store, project.config.site.clone())
        .with_request_timeout(project.config.edge.request_timeout);
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(addr = %addr, "edge server listening");
    println!("\n🚀 Edge ready at: http://{}", addr);
    println!("   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
