//! Site configuration (folio.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,

    // Directories
    pub content_dir: String,
    pub static_dir: String,

    // Server
    pub port: u16,
    pub host: String,

    // Home page hero
    #[serde(default)]
    pub profile: ProfileConfig,

    // About page paragraphs
    #[serde(default)]
    pub about: Vec<String>,

    // Experience page entries, most recent first as authored
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,

    // Recommendations page entries
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

/// Hero section of the home page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub name: String,
    pub tagline: String,
    pub location: String,
    /// Rotating role labels under the name
    pub roles: Vec<String>,
    pub links: Vec<SocialLink>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLink {
    pub label: String,
    pub url: String,
}

/// One role on the experience page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub company: String,
    pub role: String,
    pub period: String,
    pub summary: String,
    pub highlights: Vec<String>,
}

/// One testimonial on the recommendations page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Recommendation {
    pub author: String,
    pub role: String,
    pub text: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            description: String::new(),
            author: "Anonymous".to_string(),
            language: "en".to_string(),

            url: "http://localhost:4000".to_string(),

            content_dir: "content".to_string(),
            static_dir: "static".to_string(),

            port: 4000,
            host: "localhost".to_string(),

            profile: ProfileConfig::default(),
            about: Vec::new(),
            experience: Vec::new(),
            recommendations: Vec::new(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SiteConfig::default();
        assert_eq!(config.content_dir, "content");
        assert_eq!(config.static_dir, "static");
        assert_eq!(config.port, 4000);
        assert!(config.experience.is_empty());
    }

    #[test]
    fn test_partial_yaml_falls_back_to_defaults() {
        let yaml = r#"
title: My Corner of the Web
author: Jane Doe
url: https://example.com
experience:
  - company: Acme
    role: Senior Engineer
    period: 2021 - present
    summary: Shipping things.
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Corner of the Web");
        assert_eq!(config.author, "Jane Doe");
        assert_eq!(config.content_dir, "content");
        assert_eq!(config.experience.len(), 1);
        assert_eq!(config.experience[0].company, "Acme");
        assert!(config.experience[0].highlights.is_empty());
    }
}
