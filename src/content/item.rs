//! Content item model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The category a piece of content belongs to.
///
/// Each kind maps to one subdirectory of the content root and forms an
/// independent collection; slugs are only unique within a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Blog,
    Projects,
}

impl ContentKind {
    /// Every kind, in the order they appear on the site
    pub const ALL: [ContentKind; 2] = [ContentKind::Blog, ContentKind::Projects];

    /// Directory name under the content root, also the URL path prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Blog => "blog",
            ContentKind::Projects => "projects",
        }
    }

    /// Parse a kind from its directory/URL name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "blog" => Some(ContentKind::Blog),
            "projects" => Some(ContentKind::Projects),
            _ => None,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One authored entry: a blog post or a project write-up.
///
/// Items are transient projections of the files on disk; they are built
/// fresh on every query and have no mutation path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// URL-safe identifier derived from the filename (extension stripped).
    /// The filename is authoritative; front-matter cannot override it.
    pub slug: String,

    /// Title from front-matter, falling back to the slug
    pub title: String,

    /// Short summary shown on index pages and in API responses
    pub description: String,

    /// Publication date as authored. Kept as a string and compared
    /// lexically when sorting; non-ISO dates order as written.
    pub date: String,

    /// Last-updated date, preferred over `date` for last-modified reporting
    pub updated: Option<String>,

    /// Author name
    pub author: Option<String>,

    /// Tags in authored order
    pub tags: Vec<String>,

    /// Cover image URL or site-relative path
    pub cover: Option<String>,

    /// Draft items are excluded from every listing and lookup
    pub draft: bool,

    /// Estimated reading time ("3 min read")
    pub reading_time: String,

    /// Resolved path of the source file. Internal; never serialized to
    /// the API boundary.
    pub filepath: PathBuf,
}

impl ContentItem {
    /// The value reported as last-modified: `updated` when present and
    /// non-empty, else `date`, else nothing.
    pub fn last_modified(&self) -> Option<&str> {
        match self.updated.as_deref() {
            Some(updated) if !updated.is_empty() => Some(updated),
            _ if !self.date.is_empty() => Some(&self.date),
            _ => None,
        }
    }
}
