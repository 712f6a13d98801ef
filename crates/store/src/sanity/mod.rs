// Sanity HTTP query API client

use crate::document::RawDocument;
use crate::{ContentStore, Result, StoreError};
use async_trait::async_trait;
use metagate_core::ContentEntity;
use metagate_core::config::StoreConfig;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Single post by slug
pub const POST_BY_SLUG_QUERY: &str = r#"*[_type == "post" && slug.current == $slug][0] {
  _id,
  title,
  slug,
  excerpt,
  category,
  readTime,
  publishedAt,
  _updatedAt,
  "image": image.asset->url,
  subheader
}"#;

/// All posts with a slug, newest first
pub const POSTS_QUERY: &str = r#"*[_type == "post" && defined(slug.current)] | order(publishedAt desc) {
  _id,
  title,
  slug,
  excerpt,
  category,
  readTime,
  publishedAt,
  _updatedAt,
  "image": image.asset->url,
  subheader
}"#;

/// Query API response wrapper
#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

/// Content store client, configured once and shared read-only
pub struct ContentStoreClient {
    client: reqwest::Client,
    endpoint: String,
}

/// Query endpoint for a store configuration.
///
/// Authenticated requests skip the CDN, which only serves public data.
pub fn query_endpoint(config: &StoreConfig) -> String {
    let api_host = if config.use_cdn && config.token.is_none() {
        "apicdn"
    } else {
        "api"
    };

    format!(
        "https://{}.{}.sanity.io/v{}/data/query/{}",
        config.project_id, api_host, config.api_version, config.dataset
    )
}

impl ContentStoreClient {
    /// Create a client for the configured project and dataset
    pub fn new(config: &StoreConfig) -> Result<Self> {
        Self::with_endpoint(config, query_endpoint(config))
    }

    /// Create a client that sends queries to `endpoint` instead of the
    /// Sanity API, e.g. a caching proxy in front of it.
    pub fn with_endpoint(config: &StoreConfig, endpoint: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| StoreError::Config(format!("invalid store token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one GROQ query. One request, no retry.
    async fn query<T: DeserializeOwned>(&self, query: &str, params: &[(&str, &str)]) -> Result<T> {
        let mut pairs: Vec<(&str, &str)> = vec![("query", query)];
        pairs.extend_from_slice(params);

        let response = self.client.get(&self.endpoint).query(&pairs).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: QueryResponse<T> = serde_json::from_str(&body)?;
        Ok(parsed.result)
    }
}

#[async_trait]
impl ContentStore for ContentStoreClient {
    async fn fetch_post(&self, slug: &str) -> Result<Option<ContentEntity>> {
        // GROQ parameters are JSON values
        let slug_param = serde_json::to_string(slug)?;
        let doc: Option<RawDocument> = self
            .query(POST_BY_SLUG_QUERY, &[("$slug", slug_param.as_str())])
            .await?;

        debug!(slug, found = doc.is_some(), "fetched post by slug");
        Ok(doc.map(ContentEntity::from))
    }

    async fn fetch_posts(&self) -> Result<Vec<ContentEntity>> {
        let docs: Vec<RawDocument> = self.query(POSTS_QUERY, &[]).await?;

        debug!(count = docs.len(), "fetched all posts");
        Ok(docs.into_iter().map(ContentEntity::from).collect())
    }
}
