use crate::document::RawDocument;
use crate::{ContentStore, Result, StoreError};
use async_trait::async_trait;
use metagate_core::ContentEntity;
use std::fs;
use std::path::Path;

/// In-memory content store.
///
/// Loaded from a JSON array in the same shape the post queries return, so a
/// saved query result works as an offline content source.
#[derive(Debug, Clone, Default)]
pub struct StaticStore {
    posts: Vec<ContentEntity>,
}

impl StaticStore {
    pub fn new(mut posts: Vec<ContentEntity>) -> Self {
        // Newest first; undated posts last
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Self { posts }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let docs: Vec<RawDocument> = serde_json::from_str(content)?;
        Ok(Self::new(docs.into_iter().map(ContentEntity::from).collect()))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| StoreError::Fixtures {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

#[async_trait]
impl ContentStore for StaticStore {
    async fn fetch_post(&self, slug: &str) -> Result<Option<ContentEntity>> {
        Ok(self
            .posts
            .iter()
            .find(|p| p.slug.as_deref() == Some(slug))
            .cloned())
    }

    async fn fetch_posts(&self) -> Result<Vec<ContentEntity>> {
        Ok(self.posts.clone())
    }
}
