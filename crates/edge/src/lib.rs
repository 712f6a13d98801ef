// Request-time handler that sits in front of the SPA.
//
// Browsers are redirected straight back into the SPA. Crawlers get a small
// standalone document carrying the page's Open Graph and Twitter Card tags.
// If the content store fails, crawlers get a degraded document built from
// site defaults alone.

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use metagate_core::config::Site;
use metagate_core::render::{crawler_document, degraded_document};
use metagate_core::{Route, is_crawler, synthesize};
use metagate_store::{ContentStore, Resolution, Resolver};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
const CRAWLER_CACHE_CONTROL: &str = "public, max-age=3600";

/// Shared, read-only state for every request
#[derive(Clone)]
pub struct EdgeState {
    resolver: Resolver,
    site: Arc<Site>,
    request_timeout: Option<Duration>,
}

impl EdgeState {
    pub fn new(store: Arc<dyn ContentStore>, site: Site) -> Self {
        Self {
            resolver: Resolver::new(store),
            site: Arc::new(site),
            request_timeout: None,
        }
    }

    /// Bound the content lookup; expiry takes the degraded path
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Every path goes through the same handler
pub fn router(state: EdgeState) -> Router {
    Router::new()
        .fallback(handle)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn handle(
    State(state): State<EdgeState>,
    method: Method,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    if method == Method::OPTIONS {
        return preflight();
    }

    let host = request_host(&headers, &uri, &state.site.domain);
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let crawler = is_crawler(user_agent);

    info!(
        path = %uri.path(),
        host = %host,
        is_crawler = crawler,
        user_agent = %user_agent.chars().take(100).collect::<String>(),
        "edge request"
    );

    if !crawler {
        return redirect(&host, &uri);
    }

    let route = Route::parse(uri.path());
    let url = route.absolute_url(&host);

    match lookup(&state, &route).await {
        Ok(resolution) => {
            let record = synthesize(&state.site, resolution.entity(), &url);
            html(StatusCode::OK, CRAWLER_CACHE_CONTROL, crawler_document(&record))
        }
        Err(reason) => {
            error!(path = %uri.path(), error = %reason, "content lookup failed, serving degraded page");
            // Site defaults only; no second store call
            let record = synthesize(&state.site, None, &url);
            html(
                StatusCode::INTERNAL_SERVER_ERROR,
                "no-store",
                degraded_document(&record),
            )
        }
    }
}

async fn lookup(state: &EdgeState, route: &Route) -> Result<Resolution, String> {
    let resolve = state.resolver.resolve(route);
    let result = match state.request_timeout {
        Some(limit) => tokio::time::timeout(limit, resolve)
            .await
            .map_err(|_| format!("timed out after {:?}", limit))?,
        None => resolve.await,
    };
    result.map_err(|e| e.to_string())
}

/// `Host` header, else the URI authority, else the configured domain
fn request_host(headers: &HeaderMap, uri: &Uri, fallback: &str) -> String {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or(fallback)
        .to_string()
}

fn preflight() -> Response {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, OPTIONS"),
        ],
    )
        .into_response()
}

fn redirect(host: &str, uri: &Uri) -> Response {
    let location = match uri.query() {
        Some(query) => format!("https://{}{}?{}", host, uri.path(), query),
        None => format!("https://{}{}", host, uri.path()),
    };

    (
        StatusCode::FOUND,
        [
            (header::LOCATION, location),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
    )
        .into_response()
}

fn html(status: StatusCode, cache_control: &'static str, body: String) -> Response {
    (
        status,
        [
            (header::CONTENT_TYPE, HTML_CONTENT_TYPE),
            (header::CACHE_CONTROL, cache_control),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        ],
        body,
    )
        .into_response()
}
