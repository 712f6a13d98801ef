use crate::slug::{SlugError, output_slug};
use percent_encoding::percent_decode_str;
use std::sync::LazyLock;

/// What an inbound path points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteKind {
    Home,
    About,
    Post(String),
    NotFound,
    Unknown,
}

/// A parsed request target. The literal path is kept for URL construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    kind: RouteKind,
    path: String,
}

impl Route {
    /// Parse an inbound request path.
    ///
    /// One trailing slash is ignored for matching, and a post slug is
    /// percent-decoded so it compares equal to the store's slug. `path()`
    /// still returns the path exactly as received.
    ///
    /// ```text
    /// "/"                  → Home
    /// "/about/"            → About
    /// "/posts/hello-world" → Post("hello-world")
    /// "/posts/caf%C3%A9"   → Post("café")
    /// "/posts/a/b"         → Unknown
    /// "/404.html"          → NotFound
    /// ```
    pub fn parse(path: &str) -> Self {
        let trimmed = if path.len() > 1 {
            path.strip_suffix('/').unwrap_or(path)
        } else {
            path
        };

        let kind = match trimmed {
            "" | "/" | "/index.html" => RouteKind::Home,
            "/about" => RouteKind::About,
            "/404" | "/404.html" => RouteKind::NotFound,
            other => match other.strip_prefix("/posts/") {
                Some(slug) if !slug.is_empty() && !slug.contains('/') => {
                    match percent_decode_str(slug).decode_utf8() {
                        Ok(decoded) => RouteKind::Post(decoded.into_owned()),
                        Err(_) => RouteKind::Unknown,
                    }
                }
                _ => RouteKind::Unknown,
            },
        };

        let path = if path.is_empty() { "/" } else { path };

        Self {
            kind,
            path: path.to_string(),
        }
    }

    pub fn home() -> Self {
        Self {
            kind: RouteKind::Home,
            path: "/".to_string(),
        }
    }

    pub fn about() -> Self {
        Self {
            kind: RouteKind::About,
            path: "/about".to_string(),
        }
    }

    pub fn post(slug: &str) -> Self {
        Self {
            kind: RouteKind::Post(slug.to_string()),
            path: format!("/posts/{}", slug),
        }
    }

    pub fn not_found() -> Self {
        Self {
            kind: RouteKind::NotFound,
            path: "/404".to_string(),
        }
    }

    pub fn kind(&self) -> &RouteKind {
        &self.kind
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Canonical absolute URL for this route on `host`. Always `https`.
    pub fn absolute_url(&self, host: &str) -> String {
        format!("https://{}{}", host, self.path)
    }
}

/// A post, or one of the two built-in pages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentEntity {
    pub id: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub subheader: Option<String>,
    pub category: Option<String>,
    pub read_time: Option<String>,
    /// Passed through verbatim to `article:published_time`
    pub published_at: Option<String>,
    pub updated_at: Option<String>,
    pub image: Option<String>,
    pub slug: Option<String>,
}

impl ContentEntity {
    /// Slug used for the entity's output path and URL.
    ///
    /// Prefers the store-provided slug; falls back to slugifying the title.
    pub fn output_slug(&self) -> Result<String, SlugError> {
        output_slug(self.slug.as_deref(), &self.title)
    }
}

static ABOUT_ENTITY: LazyLock<ContentEntity> = LazyLock::new(|| ContentEntity {
    id: "about".to_string(),
    title: "About Super Productive".to_string(),
    excerpt: Some(
        "Prompting without a strategy is like building a house without a blueprint. \
         It might feel like progress, but it's just motion without direction—fast, but aimless. \
         Super Productive is a weekly newsletter designed to help knowledge workers navigate \
         the full spectrum of modern productivity."
            .to_string(),
    ),
    image: Some(
        "https://images.unsplash.com/photo-1499750310107-5fef28a66643?w=1200&h=630&fit=crop"
            .to_string(),
    ),
    ..Default::default()
});

static NOT_FOUND_ENTITY: LazyLock<ContentEntity> = LazyLock::new(|| ContentEntity {
    id: "404".to_string(),
    title: "Uh-oh. Looks like that page doesn't exist.".to_string(),
    excerpt: Some(
        "It either wandered off or never existed in the first place. \
         You can head back to the homepage to explore our bite-sized tech tips and \
         productivity insights, or just start clicking buttons to discover new content."
            .to_string(),
    ),
    image: Some(
        "https://images.unsplash.com/photo-1594736797933-d0d92e2d0b3d?w=1200&h=630&fit=crop"
            .to_string(),
    ),
    ..Default::default()
});

/// The fixed about page
pub fn about_entity() -> &'static ContentEntity {
    &ABOUT_ENTITY
}

/// The fixed not-found page
pub fn not_found_entity() -> &'static ContentEntity {
    &NOT_FOUND_ENTITY
}

/// `<changefreq>` values used by the sitemap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Daily,
    Monthly,
}

impl ChangeFreq {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFreq::Daily => "daily",
            ChangeFreq::Monthly => "monthly",
        }
    }
}

/// One `<url>` block of a sitemap
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: chrono::NaiveDate,
    pub changefreq: ChangeFreq,
    /// Decimal string in `0.0..=1.0`
    pub priority: &'static str,
}
