//! Built-in site templates using the Tera template engine
//!
//! All templates are embedded in the binary, so serving a site requires
//! no theme checkout on disk.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{ContentItem, ContentKind};
use crate::helpers;

/// Template renderer with the embedded folio theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all folio templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Register all templates
        tera.add_raw_templates(vec![
            ("layout.html", include_str!("folio/layout.html")),
            ("home.html", include_str!("folio/home.html")),
            ("about.html", include_str!("folio/about.html")),
            ("experience.html", include_str!("folio/experience.html")),
            (
                "recommendations.html",
                include_str!("folio/recommendations.html"),
            ),
            ("listing.html", include_str!("folio/listing.html")),
            ("post.html", include_str!("folio/post.html")),
            ("not_found.html", include_str!("folio/not_found.html")),
            (
                "partials/head.html",
                include_str!("folio/partials/head.html"),
            ),
            ("partials/nav.html", include_str!("folio/partials/nav.html")),
            (
                "partials/footer.html",
                include_str!("folio/partials/footer.html"),
            ),
            (
                "partials/cards.html",
                include_str!("folio/partials/cards.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a registered template with the given context
    pub fn render(&self, template: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template, context)?)
    }
}

/// Site-wide template data
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,
    pub language: String,
}

impl SiteData {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            url: config.url.clone(),
            language: config.language.clone(),
        }
    }
}

/// Card data for index pages and latest-content sections
#[derive(Debug, Clone, Serialize)]
pub struct ItemCard {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub display_date: String,
    pub reading_time: String,
    pub tags: Vec<String>,
    pub cover: Option<String>,
    pub url: String,
}

impl ItemCard {
    pub fn new(kind: ContentKind, item: &ContentItem) -> Self {
        Self {
            url: helpers::url_for(kind.as_str(), &item.slug),
            display_date: if item.date.is_empty() {
                String::new()
            } else {
                helpers::display_date(&item.date)
            },
            slug: item.slug.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            date: item.date.clone(),
            reading_time: item.reading_time.clone(),
            tags: item.tags.clone(),
            cover: item.cover.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_all_templates_register() {
        TemplateRenderer::new().unwrap();
    }

    #[test]
    fn test_not_found_renders() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &SiteData::new(&SiteConfig::default()));
        let html = renderer.render("not_found.html", &context).unwrap();
        assert!(html.contains("404"));
    }

    #[test]
    fn test_listing_renders_empty_state() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &SiteData::new(&SiteConfig::default()));
        context.insert("page_title", "Blog");
        context.insert("heading", "Blog");
        context.insert("items", &Vec::<ItemCard>::new());
        let html = renderer.render("listing.html", &context).unwrap();
        assert!(html.contains("No posts yet"));
    }

    #[test]
    fn test_item_card_mapping() {
        let item = ContentItem {
            slug: "first-post".to_string(),
            title: "First Post".to_string(),
            description: "Hello".to_string(),
            date: "2024-01-05".to_string(),
            updated: None,
            author: None,
            tags: vec!["rust".to_string()],
            cover: None,
            draft: false,
            reading_time: "1 min read".to_string(),
            filepath: PathBuf::from("content/blog/first-post.md"),
        };

        let card = ItemCard::new(ContentKind::Blog, &item);
        assert_eq!(card.url, "/blog/first-post");
        assert_eq!(card.display_date, "January 5, 2024");
        assert_eq!(card.tags, vec!["rust"]);
    }
}
