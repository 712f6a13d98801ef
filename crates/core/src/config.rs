use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SITE_NAME: &str = "Super Productive";

pub const DEFAULT_DESCRIPTION: &str = "Bite-sized tech tips to level up your productivity. \
     Weekly insights on AI prompts, productivity tools, and smart workflows for knowledge workers.";

pub const DEFAULT_FALLBACK_DESCRIPTION: &str = "From Super Productive: weekly insights on AI prompts, \
     productivity tools, and smart workflows for knowledge workers.";

pub const DEFAULT_OG_IMAGE: &str = "https://images.pexels.com/photos/3184433/pexels-photo-3184433.jpeg?auto=compress&cs=tinysrgb&w=1200&h=630&dpr=1";

/// Complete configuration, loaded once at process start
#[derive(Debug, Clone)]
pub struct Config {
    pub site: Site,
    pub store: StoreConfig,
    pub build: BuildConfig,
    pub edge: EdgeConfig,
}

/// Site identity and metadata defaults
#[derive(Debug, Clone)]
pub struct Site {
    pub name: String,
    /// Bare host, e.g. `blog.example.com`
    pub domain: String,
    pub description: String,
    /// Appended to descriptions shorter than the minimum length
    pub fallback_description: String,
    pub default_image: String,
    pub facebook_app_id: Option<String>,
}

/// Remote content store connection
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    pub timeout: Duration,
    pub token: Option<String>,
}

/// Build-time paths, relative to the project directory
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub dist: PathBuf,
    pub template: PathBuf,
    pub sitemap: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct EdgeConfig {
    pub request_timeout: Option<Duration>,
}

/// Raw TOML configuration structure
/// This matches the metagate.toml file structure exactly
#[derive(Debug, Deserialize)]
struct RawConfig {
    site: RawSite,
    store: RawStore,
    #[serde(default)]
    build: RawBuild,
    #[serde(default)]
    edge: RawEdge,
}

#[derive(Debug, Deserialize)]
struct RawSite {
    #[serde(default = "default_site_name")]
    name: String,
    domain: String,
    #[serde(default = "default_description")]
    description: String,
    #[serde(default = "default_fallback_description")]
    fallback_description: String,
    #[serde(default = "default_image")]
    default_image: String,
    facebook_app_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawStore {
    project_id: String,
    #[serde(default = "default_dataset")]
    dataset: String,
    #[serde(default = "default_api_version")]
    api_version: String,
    #[serde(default = "default_true")]
    use_cdn: bool,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawBuild {
    #[serde(default = "default_dist")]
    dist: String,
    #[serde(default = "default_template")]
    template: String,
    #[serde(default = "default_sitemap")]
    sitemap: String,
}

impl Default for RawBuild {
    fn default() -> Self {
        Self {
            dist: default_dist(),
            template: default_template(),
            sitemap: default_sitemap(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawEdge {
    request_timeout_secs: Option<u64>,
}

fn default_site_name() -> String {
    DEFAULT_SITE_NAME.to_string()
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}

fn default_fallback_description() -> String {
    DEFAULT_FALLBACK_DESCRIPTION.to_string()
}

fn default_image() -> String {
    DEFAULT_OG_IMAGE.to_string()
}

fn default_dataset() -> String {
    "production".to_string()
}

fn default_api_version() -> String {
    "2023-12-01".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_dist() -> String {
    "dist".to_string()
}

fn default_template() -> String {
    "dist/index.html".to_string()
}

fn default_sitemap() -> String {
    "public/sitemap.xml".to_string()
}

/// Parse metagate.toml from a file path
pub fn parse_site_toml<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    parse_site_toml_str(&content)
}

/// Parse metagate.toml from a string (useful for testing)
pub fn parse_site_toml_str(content: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.store.timeout_secs == 0 {
        return Err(Error::ConfigParse(
            "store.timeout_secs must be greater than 0".to_string(),
        ));
    }

    let request_timeout = match raw.edge.request_timeout_secs {
        Some(0) => {
            return Err(Error::ConfigParse(
                "edge.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Some(secs) => Some(Duration::from_secs(secs)),
        None => None,
    };

    let config = Config {
        site: Site {
            name: raw.site.name,
            domain: raw.site.domain,
            description: raw.site.description,
            fallback_description: raw.site.fallback_description,
            default_image: raw.site.default_image,
            facebook_app_id: raw.site.facebook_app_id.filter(|id| !id.trim().is_empty()),
        },
        store: StoreConfig {
            project_id: raw.store.project_id,
            dataset: raw.store.dataset,
            api_version: raw.store.api_version,
            use_cdn: raw.store.use_cdn,
            timeout: Duration::from_secs(raw.store.timeout_secs),
            token: raw.store.token.filter(|t| !t.trim().is_empty()),
        },
        build: BuildConfig {
            dist: validate_path(&raw.build.dist, "build.dist")?,
            template: validate_path(&raw.build.template, "build.template")?,
            sitemap: validate_path(&raw.build.sitemap, "build.sitemap")?,
        },
        edge: EdgeConfig { request_timeout },
    };

    config.validate()?;
    Ok(config)
}

impl Config {
    /// Apply overrides from the process environment.
    ///
    /// Called once, right after parsing; the result is then shared read-only.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup, then re-validate.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("SANITY_PROJECT_ID") {
            self.store.project_id = v;
        }
        if let Some(v) = get("SANITY_DATASET") {
            self.store.dataset = v;
        }
        if let Some(v) = get("SANITY_API_VERSION") {
            self.store.api_version = v;
        }
        if let Some(v) = get("SANITY_API_TOKEN") {
            self.store.token = Some(v);
        }
        if let Some(v) = get("FACEBOOK_APP_ID") {
            self.site.facebook_app_id = Some(v);
        }
        if let Some(v) = get("METAGATE_DOMAIN") {
            self.site.domain = v;
        }

        self.validate()
    }

    fn validate(&self) -> Result<()> {
        validate_domain(&self.site.domain)?;

        if self.site.name.trim().is_empty() {
            return Err(Error::ConfigParse("site.name must not be empty".to_string()));
        }

        if !(self.site.default_image.starts_with("https://")
            || self.site.default_image.starts_with("http://"))
        {
            return Err(Error::ConfigParse(format!(
                "site.default_image must be an absolute http(s) URL: '{}'",
                self.site.default_image
            )));
        }

        if self.store.project_id.trim().is_empty() {
            return Err(Error::ConfigParse(
                "store.project_id must not be empty".to_string(),
            ));
        }

        if self.store.dataset.trim().is_empty() {
            return Err(Error::ConfigParse("store.dataset must not be empty".to_string()));
        }

        chrono::NaiveDate::parse_from_str(&self.store.api_version, "%Y-%m-%d").map_err(|e| {
            Error::ConfigParse(format!(
                "Invalid store.api_version '{}': {}",
                self.store.api_version, e
            ))
        })?;

        Ok(())
    }
}

/// The domain is interpolated into `https://{domain}{path}`, so it must be a
/// bare host (optionally with a port).
fn validate_domain(domain: &str) -> Result<()> {
    if domain.trim().is_empty() {
        return Err(Error::ConfigParse("site.domain must not be empty".to_string()));
    }

    if domain.contains("://") || domain.contains('/') || domain.chars().any(char::is_whitespace)
    {
        return Err(Error::ConfigParse(format!(
            "site.domain must be a bare host without scheme or path: '{}'",
            domain
        )));
    }

    Ok(())
}

/// Validate and convert a path string to PathBuf.
///
/// Rejects empty paths and parent directory references (`..`), so output
/// paths cannot escape the project directory through traversal.
fn validate_path(path_str: &str, field_name: &str) -> Result<PathBuf> {
    if path_str.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty path in '{}' field",
            field_name
        )));
    }

    let path = Path::new(path_str);
    if path.components().any(|c| c == Component::ParentDir) {
        return Err(Error::ConfigParse(format!(
            "Parent directory references (..) not allowed in '{}': '{}'",
            field_name, path_str
        )));
    }

    Ok(path.to_path_buf())
}
