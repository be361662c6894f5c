//! folio-rs: a personal portfolio and blog engine
//!
//! This crate serves a markdown-driven personal site: profile pages
//! rendered from configuration, a blog and a projects showcase built
//! from front-matter-annotated content files, a read-only JSON content
//! API, and a sitemap.

pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::Path;

use content::ContentStore;

/// The main site application
#[derive(Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Content root (one subdirectory per content kind)
    pub content_dir: std::path::PathBuf,
    /// Static assets directory
    pub static_dir: std::path::PathBuf,
}

impl Folio {
    /// Create an instance from a site directory.
    ///
    /// Reads `folio.yml` when present; a missing config file means all
    /// defaults, which is a valid freshly-scaffolded site.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("folio.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);
        let static_dir = base_dir.join(&config.static_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
            static_dir,
        })
    }

    /// Content store rooted at this site's content directory
    pub fn store(&self) -> ContentStore {
        ContentStore::new(&self.content_dir)
    }
}
