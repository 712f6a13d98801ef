use metagate_core::ContentEntity;
use serde::Deserialize;

/// A post as projected by the GROQ queries (and as stored in fixture files)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDocument {
    #[serde(rename = "_id")]
    id: String,
    title: Option<String>,
    slug: Option<RawSlug>,
    excerpt: Option<String>,
    subheader: Option<String>,
    category: Option<String>,
    read_time: Option<ReadTime>,
    published_at: Option<String>,
    #[serde(rename = "_updatedAt")]
    updated_at: Option<String>,
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSlug {
    current: Option<String>,
}

/// Editors enter read time either as text ("5 min read") or a bare number
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReadTime {
    Text(String),
    Minutes(f64),
}

impl From<RawDocument> for ContentEntity {
    fn from(raw: RawDocument) -> Self {
        ContentEntity {
            id: raw.id,
            title: raw.title.unwrap_or_default(),
            excerpt: raw.excerpt,
            subheader: raw.subheader,
            category: raw.category,
            read_time: raw.read_time.map(|rt| match rt {
                ReadTime::Text(text) => text,
                ReadTime::Minutes(minutes) => minutes.to_string(),
            }),
            published_at: raw.published_at,
            updated_at: raw.updated_at,
            image: raw.image,
            slug: raw.slug.and_then(|s| s.current),
        }
    }
}
