use super::Project;
use anyhow::{Context, Result};
use metagate_generator::SitemapBuilder;
use metagate_store::ContentStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Write sitemap.xml for every known route
pub async fn run(path: PathBuf, fixtures: Option<PathBuf>) -> Result<()> {
    println!("🗺  Generating sitemap...");
    println!("   Project: {}", path.display());

    let project = Project::load(&path)?;
    let store = project.open_store(fixtures.as_deref())?;

    write_sitemap(&project, store).await
}

pub(super) async fn write_sitemap(project: &Project, store: Arc<dyn ContentStore>) -> Result<()> {
    let output = project.sitemap();
    let today = chrono::Local::now().date_naive();

    let count = SitemapBuilder::new(store, project.config.site.domain.clone())
        .write(&output, today)
        .await
        .context("Sitemap generation failed")?;

    println!("\n✅ Sitemap written: {}", output.display());
    println!("   URLs: {}", count);

    Ok(())
}
