// Build-time outputs: pre-rendered pages and the sitemap

pub mod prerender;
pub mod sitemap;

use metagate_store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

pub use prerender::{EntityFailure, Materializer, PrerenderReport};
pub use sitemap::SitemapBuilder;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("base template not found at {} (build the site assets first)", .0.display())]
    TemplateMissing(PathBuf),
    #[error("base template {} is unusable: {reason}", path.display())]
    TemplateInvalid { path: PathBuf, reason: String },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("file output task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, GenerateError>;

/// Run filesystem work on tokio's blocking pool
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}
