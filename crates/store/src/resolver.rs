use crate::{ContentStore, Result};
use metagate_core::{ContentEntity, Route, RouteKind, about_entity, not_found_entity};
use std::sync::Arc;
use tracing::debug;

/// What a route resolved to.
///
/// `NotFound` is a valid outcome, not an error; store failures come back as
/// `Err` from [`Resolver::resolve`] instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// No single entity; use site-wide defaults
    SiteDefault,
    About,
    NotFound,
    Post(ContentEntity),
}

impl Resolution {
    pub fn entity(&self) -> Option<&ContentEntity> {
        match self {
            Resolution::SiteDefault => None,
            Resolution::About => Some(about_entity()),
            Resolution::NotFound => Some(not_found_entity()),
            Resolution::Post(post) => Some(post),
        }
    }
}

/// Maps routes to content, consulting the store only for post lookups
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn ContentStore>,
}

impl Resolver {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Resolve a route. First match wins:
    ///
    /// 1. About → the about page
    /// 2. `Post("404")` → the not-found page, even if a post has that slug
    /// 3. `Post(slug)` → one store lookup; a miss is the not-found page
    /// 4. Home → site defaults
    /// 5. NotFound / Unknown → the not-found page
    pub async fn resolve(&self, route: &Route) -> Result<Resolution> {
        let resolution = match route.kind() {
            RouteKind::About => Resolution::About,
            RouteKind::Post(slug) if slug == "404" => Resolution::NotFound,
            RouteKind::Post(slug) => match self.store.fetch_post(slug).await? {
                Some(post) => Resolution::Post(post),
                None => {
                    debug!(slug = %slug, "post not found in content store");
                    Resolution::NotFound
                }
            },
            RouteKind::Home => Resolution::SiteDefault,
            RouteKind::NotFound | RouteKind::Unknown => Resolution::NotFound,
        };

        Ok(resolution)
    }
}
