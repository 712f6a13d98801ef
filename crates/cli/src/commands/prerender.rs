use super::Project;
use anyhow::{Context, Result};
use metagate_generator::{Materializer, PrerenderReport};
use metagate_store::ContentStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Pre-render every route into the build output directory
pub async fn run(path: PathBuf, fixtures: Option<PathBuf>) -> Result<()> {
    println!("🔨 Pre-rendering pages...");
    println!("   Project: {}", path.display());

    let project = Project::load(&path)?;
    let store = project.open_store(fixtures.as_deref())?;

    let report = prerender(&project, store).await?;
    print_report(&report);

    Ok(())
}

pub(super) async fn prerender(
    project: &Project,
    store: Arc<dyn ContentStore>,
) -> Result<PrerenderReport> {
    println!("   Template: {}", project.template().display());
    println!("   Output: {}", project.dist().display());

    Materializer::new(
        store,
        project.config.site.clone(),
        project.dist(),
        project.template(),
    )
    .write_all()
    .await
    .context("Pre-rendering failed")
}

pub(super) fn print_report(report: &PrerenderReport) {
    println!("\n✅ Wrote {} pages", report.written.len());
    if !report.skipped.is_empty() {
        println!("   ⚠ Skipped {} posts:", report.skipped.len());
        for failure in &report.skipped {
            println!("     - {} ({}): {}", failure.title, failure.id, failure.reason);
        }
    }
}
