use crate::{GenerateError, Result, run_blocking};
use chrono::{DateTime, NaiveDate};
use metagate_core::meta::escape_html;
use metagate_core::{ChangeFreq, ContentEntity, Route, SitemapEntry};
use metagate_store::ContentStore;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Builds `sitemap.xml` from the post list
pub struct SitemapBuilder {
    store: Arc<dyn ContentStore>,
    domain: String,
}

impl SitemapBuilder {
    pub fn new(store: Arc<dyn ContentStore>, domain: impl Into<String>) -> Self {
        Self {
            store,
            domain: domain.into(),
        }
    }

    /// Home, about, then one entry per post in store order.
    ///
    /// Posts whose slug cannot be derived are left out; the materializer
    /// skips the same posts, so every listed URL has a page.
    pub async fn entries(&self, today: NaiveDate) -> Result<Vec<SitemapEntry>> {
        let posts = self.store.fetch_posts().await?;

        let mut entries = vec![
            SitemapEntry {
                loc: Route::home().absolute_url(&self.domain),
                lastmod: today,
                changefreq: ChangeFreq::Daily,
                priority: "1.0",
            },
            SitemapEntry {
                loc: Route::about().absolute_url(&self.domain),
                lastmod: today,
                changefreq: ChangeFreq::Monthly,
                priority: "0.8",
            },
        ];

        let mut seen = HashSet::new();
        for post in &posts {
            let slug = match post.output_slug() {
                Ok(slug) => slug,
                Err(e) => {
                    warn!(id = %post.id, reason = %e, "leaving post out of sitemap");
                    continue;
                }
            };
            if !seen.insert(slug.clone()) {
                warn!(id = %post.id, slug = %slug, "duplicate slug, leaving post out of sitemap");
                continue;
            }

            entries.push(SitemapEntry {
                loc: Route::post(&slug).absolute_url(&self.domain),
                lastmod: last_modified(post, today),
                changefreq: ChangeFreq::Monthly,
                priority: "0.7",
            });
        }

        Ok(entries)
    }

    /// Write the sitemap to `path`, replacing any previous one only once the
    /// new document is complete. Returns the number of URLs written.
    pub async fn write(&self, path: &Path, today: NaiveDate) -> Result<usize> {
        let entries = self.entries(today).await?;
        let xml = render_xml(&entries);

        let target = path.to_path_buf();
        run_blocking(move || write_atomically(&target, &xml)).await?;

        info!(urls = entries.len(), path = %path.display(), "sitemap written");
        Ok(entries.len())
    }
}

/// Write `contents` to a hidden sibling of `path`, then rename it into place.
/// The staging file is removed if the rename fails.
fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sitemap.xml".to_string());
    let staging = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&staging, contents).map_err(io_err(&staging))?;
    if let Err(e) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(io_err(path)(e));
    }

    Ok(())
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> GenerateError {
    let path = path.to_path_buf();
    move |source| GenerateError::Io { path, source }
}

/// Post date for `<lastmod>`: last update, else publication, else `today`.
/// Unparseable dates fall through to the next candidate.
fn last_modified(post: &ContentEntity, today: NaiveDate) -> NaiveDate {
    [post.updated_at.as_deref(), post.published_at.as_deref()]
        .into_iter()
        .flatten()
        .find_map(parse_date)
        .unwrap_or(today)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
}

pub fn render_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!("<urlset xmlns=\"{}\">\n", SITEMAP_NAMESPACE));

    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_html(&entry.loc)));
        xml.push_str(&format!(
            "    <lastmod>{}</lastmod>\n",
            entry.lastmod.format("%Y-%m-%d")
        ));
        xml.push_str(&format!(
            "    <changefreq>{}</changefreq>\n",
            entry.changefreq.as_str()
        ));
        xml.push_str(&format!("    <priority>{}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}
