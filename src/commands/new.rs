//! Scaffold a new content file

use anyhow::Result;
use std::fs;

use crate::content::ContentKind;
use crate::Folio;

/// Create a new draft entry under the kind's content directory.
///
/// The filename (and therefore the slug) is the slugified title; the
/// entry starts as a draft so it stays out of listings until published.
pub fn run(folio: &Folio, kind: ContentKind, title: &str) -> Result<()> {
    let target_dir = folio.content_dir.join(kind.as_str());
    fs::create_dir_all(&target_dir)?;

    let slug = slug::slugify(title);
    let file_path = target_dir.join(format!("{}.md", slug));

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let now = chrono::Local::now();
    let content = format!(
        r#"---
title: {}
description: ""
date: {}
draft: true
---
"#,
        title,
        now.format("%Y-%m-%d")
    );

    fs::write(&file_path, content)?;

    println!("Created: {:?}", file_path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    fn site(root: &TempDir) -> Folio {
        Folio {
            config: SiteConfig::default(),
            base_dir: root.path().to_path_buf(),
            content_dir: root.path().join("content"),
            static_dir: root.path().join("static"),
        }
    }

    #[test]
    fn test_scaffolds_a_draft() {
        let root = TempDir::new().unwrap();
        let folio = site(&root);

        run(&folio, ContentKind::Blog, "Hello, World!").unwrap();

        let path = root.path().join("content/blog/hello-world.md");
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("title: Hello, World!"));
        assert!(content.contains("draft: true"));

        // The draft stays out of listings
        let items = folio.store().list(ContentKind::Blog).unwrap();
        assert!(items.is_empty());

        // Refuses to clobber an existing entry
        assert!(run(&folio, ContentKind::Blog, "Hello, World!").is_err());
    }
}
