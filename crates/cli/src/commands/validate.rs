use super::{CONFIG_FILE, Project};
use std::path::PathBuf;

pub async fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating project at: {}", path.display());

    let project = Project::load(&path)?;
    let config = &project.config;

    println!("✓ {} valid", CONFIG_FILE);
    println!("  Site: {} ({})", config.site.name, config.site.domain);
    println!(
        "  Store: project {} / dataset {} (API v{}, {})",
        config.store.project_id,
        config.store.dataset,
        config.store.api_version,
        if config.store.token.is_some() {
            "authenticated"
        } else if config.store.use_cdn {
            "CDN"
        } else {
            "public"
        }
    );
    println!("  Template: {}", project.template().display());
    println!("  Output: {}", project.dist().display());
    println!("  Sitemap: {}", project.sitemap().display());

    if !project.template().exists() {
        println!("\n⚠ Template not found yet; build the site assets before pre-rendering");
    }

    Ok(())
}
