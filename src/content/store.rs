//! Content store - discovers, parses and orders content per kind

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use super::{ContentItem, ContentKind, FrontMatter, FrontMatterError};
use crate::content::reading_time;

/// Failure to turn one source file into a content item
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("front-matter in {path:?}: {source}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },
}

/// Read-through store over a content root directory.
///
/// The files on disk are the authoritative state; every query re-reads
/// and re-parses them, so there is nothing to invalidate and concurrent
/// queries never interact. The content volume of a personal site keeps
/// this affordable.
pub struct ContentStore {
    content_root: PathBuf,
}

impl ContentStore {
    /// Create a store rooted at a content directory (one subdirectory
    /// per content kind)
    pub fn new<P: Into<PathBuf>>(content_root: P) -> Self {
        Self {
            content_root: content_root.into(),
        }
    }

    /// All non-draft items of a kind, newest first.
    ///
    /// Dates are compared as plain strings, so the descending order is
    /// lexical; items with equal date strings have no guaranteed relative
    /// order. A missing kind directory is an empty collection, not an
    /// error. A file that cannot be read or parsed is skipped with a
    /// warning so one bad file never blanks the whole listing.
    pub fn list(&self, kind: ContentKind) -> Result<Vec<ContentItem>> {
        let dir = self.content_root.join(kind.as_str());
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut items = Vec::new();

        for entry in WalkDir::new(&dir)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_content_file(path) {
                continue;
            }
            match parse_item(path) {
                Ok(item) => {
                    if !item.draft {
                        items.push(item);
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                }
            }
        }

        items.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(items)
    }

    /// The non-draft item whose filename-derived slug matches exactly,
    /// or `None`. A draft is never returned, even on an exact match.
    pub fn get_by_slug(&self, kind: ContentKind, slug: &str) -> Result<Option<ContentItem>> {
        Ok(self
            .list(kind)?
            .into_iter()
            .find(|item| item.slug == slug))
    }
}

/// Parse a single content file into an item.
///
/// Front-matter defaults are applied here and only here; reading time is
/// computed from the body.
pub fn parse_item(path: &Path) -> Result<ContentItem, ParseError> {
    let source = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (fm, body) = FrontMatter::parse(&source).map_err(|source| ParseError::FrontMatter {
        path: path.to_path_buf(),
        source,
    })?;

    let slug = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    Ok(ContentItem {
        title: fm.title.unwrap_or_else(|| slug.clone()),
        description: fm.description.unwrap_or_default(),
        date: fm.date.unwrap_or_default(),
        updated: fm.updated,
        author: fm.author,
        tags: fm.tags,
        cover: fm.cover,
        draft: fm.draft,
        reading_time: reading_time::estimate(body),
        filepath: path.to_path_buf(),
        slug,
    })
}

/// Markdown and MDX sources only. The extension match is case-sensitive:
/// `.MD` is not content.
fn is_content_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("md" | "mdx")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(root: &TempDir, rel: &str, content: &str) {
        let path = root.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn store(root: &TempDir) -> ContentStore {
        ContentStore::new(root.path())
    }

    #[test]
    fn test_missing_directory_lists_empty() {
        let root = TempDir::new().unwrap();
        let items = store(&root).list(ContentKind::Projects).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_drafts_are_dropped() {
        let root = TempDir::new().unwrap();
        write_file(&root, "blog/a.md", "---\ndate: 2024-01-01\n---\nA\n");
        write_file(
            &root,
            "blog/b.md",
            "---\ndate: 2024-06-01\ndraft: true\n---\nB\n",
        );

        let items = store(&root).list(ContentKind::Blog).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].slug, "a");
    }

    #[test]
    fn test_sorted_by_date_descending() {
        let root = TempDir::new().unwrap();
        write_file(&root, "blog/x.md", "---\ndate: 2024-03-01\n---\n");
        write_file(&root, "blog/y.md", "---\ndate: 2024-05-01\n---\n");
        write_file(&root, "blog/z.md", "---\ndate: 2023-12-31\n---\n");

        let items = store(&root).list(ContentKind::Blog).unwrap();
        let slugs: Vec<&str> = items.iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs, vec!["y", "x", "z"]);
    }

    #[test]
    fn test_empty_date_sorts_last() {
        let root = TempDir::new().unwrap();
        write_file(&root, "blog/dated.md", "---\ndate: 2024-01-01\n---\n");
        write_file(&root, "blog/undated.md", "---\ntitle: No Date\n---\n");

        let items = store(&root).list(ContentKind::Blog).unwrap();
        assert_eq!(items[0].slug, "dated");
        assert_eq!(items[1].slug, "undated");
        assert_eq!(items[1].date, "");
    }

    #[test]
    fn test_non_content_entries_ignored() {
        let root = TempDir::new().unwrap();
        write_file(&root, "blog/post.md", "---\ndate: 2024-01-01\n---\n");
        write_file(&root, "blog/notes.txt", "not content");
        write_file(&root, "blog/UPPER.MD", "---\ndate: 2024-01-01\n---\n");
        write_file(&root, "blog/nested/inner.md", "---\ndate: 2024-01-01\n---\n");

        let items = store(&root).list(ContentKind::Blog).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].slug, "post");
    }

    #[test]
    fn test_mdx_files_are_content() {
        let root = TempDir::new().unwrap();
        write_file(&root, "blog/widget.mdx", "---\ntitle: Widget\n---\n<Callout>Hi</Callout>\n");

        let items = store(&root).list(ContentKind::Blog).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].slug, "widget");
    }

    #[test]
    fn test_malformed_file_is_skipped_not_fatal() {
        let root = TempDir::new().unwrap();
        write_file(&root, "blog/good.md", "---\ndate: 2024-01-01\n---\nok\n");
        write_file(&root, "blog/bad.md", "---\ntitle: [unclosed\n---\n");
        write_file(&root, "blog/unterminated.md", "---\ntitle: nope\n");

        let items = store(&root).list(ContentKind::Blog).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].slug, "good");
    }

    #[test]
    fn test_defaults_applied() {
        let root = TempDir::new().unwrap();
        write_file(&root, "blog/hello.mdx", "---\ndescription: hi\n---\nbody\n");

        let items = store(&root).list(ContentKind::Blog).unwrap();
        let item = &items[0];
        // Title falls back to the filename-derived slug
        assert_eq!(item.title, "hello");
        assert_eq!(item.tags, Vec::<String>::new());
        assert!(!item.draft);
        assert_eq!(item.date, "");
        assert_eq!(item.updated, None);
        assert_eq!(item.author, None);
        assert_eq!(item.cover, None);
    }

    #[test]
    fn test_get_by_slug() {
        let root = TempDir::new().unwrap();
        write_file(&root, "blog/first.md", "---\ndate: 2024-01-01\n---\n");
        write_file(
            &root,
            "blog/hidden.md",
            "---\ndate: 2024-01-02\ndraft: true\n---\n",
        );

        let store = store(&root);
        let found = store.get_by_slug(ContentKind::Blog, "first").unwrap();
        assert_eq!(found.unwrap().slug, "first");

        // Unknown slug is an explicit absence, not an error
        assert!(store
            .get_by_slug(ContentKind::Blog, "nonexistent")
            .unwrap()
            .is_none());

        // A draft is never returned even on an exact slug match
        assert!(store
            .get_by_slug(ContentKind::Blog, "hidden")
            .unwrap()
            .is_none());

        // Kinds are isolated collections
        assert!(store
            .get_by_slug(ContentKind::Projects, "first")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_repeated_calls_are_idempotent() {
        let root = TempDir::new().unwrap();
        write_file(
            &root,
            "blog/a.md",
            "---\ntitle: A\ndate: 2024-01-01\ntags: [x, y]\n---\nsome words here\n",
        );
        write_file(&root, "blog/b.md", "---\ntitle: B\ndate: 2024-02-01\n---\n");

        let store = store(&root);
        let first = store.list(ContentKind::Blog).unwrap();
        let second = store.list(ContentKind::Blog).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_item_computes_reading_time() {
        let root = TempDir::new().unwrap();
        let body = vec!["word"; 400].join(" ");
        write_file(
            &root,
            "blog/long.md",
            &format!("---\ntitle: Long\n---\n{}\n", body),
        );

        let item = parse_item(&root.path().join("blog/long.md")).unwrap();
        assert_eq!(item.reading_time, "2 min read");
    }

    #[test]
    fn test_parse_item_missing_file_is_io_error() {
        let err = parse_item(Path::new("/nonexistent/nope.md")).unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }
}
