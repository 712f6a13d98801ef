// Content store access and route resolution.
//
// The core never talks to a concrete store; everything goes through the
// `ContentStore` trait so the edge handler, the materializer and the sitemap
// builder can share one injected client.

mod document;
pub mod fixtures;
pub mod resolver;
pub mod sanity;

use async_trait::async_trait;
use metagate_core::ContentEntity;
use std::path::PathBuf;
use thiserror::Error;

pub use fixtures::StaticStore;
pub use resolver::{Resolution, Resolver};
pub use sanity::ContentStoreClient;

/// The content store could not be reached or answered with something
/// unusable. Never retried here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("content store request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("content store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("content store response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid content store configuration: {0}")]
    Config(String),
    #[error("could not read content fixtures from {}: {source}", path.display())]
    Fixtures {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// The two query shapes the pipeline needs from a content store
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// At most one post whose store slug equals `slug`
    async fn fetch_post(&self, slug: &str) -> Result<Option<ContentEntity>>;

    /// Every post with a slug, newest first
    async fn fetch_posts(&self) -> Result<Vec<ContentEntity>>;
}
