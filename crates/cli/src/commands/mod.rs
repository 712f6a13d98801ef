pub mod build;
pub mod prerender;
pub mod serve;
pub mod sitemap;
pub mod validate;

use anyhow::{Context, Result};
use metagate_core::config::{Config, parse_site_toml};
use metagate_store::{ContentStore, ContentStoreClient, StaticStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const CONFIG_FILE: &str = "metagate.toml";

/// A project directory and its loaded configuration
pub struct Project {
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    /// Load `metagate.toml` from `path` and apply environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Project directory does not exist: {}", path.display());
        }

        let config_path = path.join(CONFIG_FILE);
        if !config_path.exists() {
            anyhow::bail!("{} not found in {}", CONFIG_FILE, path.display());
        }

        let mut config = parse_site_toml(&config_path)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;
        config
            .apply_env()
            .context("Invalid configuration after environment overrides")?;

        Ok(Self {
            root: path.to_path_buf(),
            config,
        })
    }

    pub fn dist(&self) -> PathBuf {
        self.root.join(&self.config.build.dist)
    }

    pub fn template(&self) -> PathBuf {
        self.root.join(&self.config.build.template)
    }

    pub fn sitemap(&self) -> PathBuf {
        self.root.join(&self.config.build.sitemap)
    }

    /// The content source for this run: a fixture file when given, else the
    /// configured remote store. Built once and shared by everything that
    /// needs posts.
    pub fn open_store(&self, fixtures: Option<&Path>) -> Result<Arc<dyn ContentStore>> {
        match fixtures {
            Some(file) => {
                let store = StaticStore::from_json_file(file)?;
                println!("   ✓ Loaded {} posts from {}", store.len(), file.display());
                Ok(Arc::new(store))
            }
            None => {
                let client = ContentStoreClient::new(&self.config.store)
                    .context("Failed to create content store client")?;
                println!("   ✓ Content store: {}", client.endpoint());
                Ok(Arc::new(client))
            }
        }
    }
}
