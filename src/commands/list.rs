//! List site content

use anyhow::Result;
use std::collections::HashMap;

use crate::content::ContentKind;
use crate::Folio;

/// List site content by target
pub fn run(folio: &Folio, target: &str) -> Result<()> {
    let store = folio.store();

    if let Some(kind) = ContentKind::from_name(target) {
        let items = store.list(kind)?;
        println!("{} ({}):", kind, items.len());
        for item in items {
            let date = if item.date.is_empty() {
                "undated"
            } else {
                item.date.as_str()
            };
            println!(
                "  {} - {} [{}] ({})",
                date, item.title, item.slug, item.reading_time
            );
        }
        return Ok(());
    }

    match target {
        "tag" | "tags" => {
            let mut tags: HashMap<String, usize> = HashMap::new();
            for kind in ContentKind::ALL {
                for item in store.list(kind)? {
                    for tag in item.tags {
                        *tags.entry(tag).or_insert(0) += 1;
                    }
                }
            }
            println!("Tags ({}):", tags.len());
            let mut tags: Vec<_> = tags.into_iter().collect();
            tags.sort_by(|a, b| b.1.cmp(&a.1));
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown target: {}. Available: blog, projects, tags",
                target
            );
        }
    }

    Ok(())
}
