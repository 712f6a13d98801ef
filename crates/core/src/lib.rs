pub mod config;
pub mod crawler;
pub mod error;
pub mod meta;
pub mod render;
pub mod slug;
pub mod types;

pub use config::{parse_site_toml, parse_site_toml_str};
pub use crawler::is_crawler;
pub use error::{Error, Result};
pub use meta::{MetadataRecord, synthesize};
pub use slug::slugify;
pub use types::*;
