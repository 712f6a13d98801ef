use super::Project;
use super::prerender::{prerender, print_report};
use super::sitemap::write_sitemap;
use anyhow::Result;
use std::path::PathBuf;

/// Write the sitemap, then pre-render every page.
///
/// Both steps share one store client; each makes its own bulk fetch.
pub async fn run(path: PathBuf, fixtures: Option<PathBuf>) -> Result<()> {
    println!("🔨 Building metadata outputs...");
    println!("   Project: {}", path.display());
    println!();

    let project = Project::load(&path)?;
    let store = project.open_store(fixtures.as_deref())?;

    write_sitemap(&project, store.clone()).await?;
    println!();

    let report = prerender(&project, store).await?;
    print_report(&report);

    Ok(())
}
