//! Front-matter parsing

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Why a front-matter block could not be parsed
#[derive(Debug, Error)]
pub enum FrontMatterError {
    /// An opening `---` delimiter with no closing delimiter
    #[error("unterminated front-matter block")]
    Unterminated,

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Custom deserializer for the draft flag that accepts whatever loose value
/// an author wrote: booleans, strings (any non-empty string counts) and
/// numbers (non-zero counts).
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct Truthy;

    impl<'de> Visitor<'de> for Truthy {
        type Value = bool;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a boolean-like value")
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(!value.is_empty())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value != 0)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value != 0)
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value != 0.0)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(false)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(false)
        }
    }

    deserializer.deserialize_any(Truthy)
}

/// Front-matter fields of a content file.
///
/// This is the only place defaults are applied; the raw YAML map never
/// travels past the parse boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub updated: Option<String>,
    pub author: Option<String>,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub tags: Vec<String>,
    pub cover: Option<String>,
    #[serde(deserialize_with = "truthy", default)]
    pub draft: bool,

    /// Additional custom fields, in authored order
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Split a content file into front-matter and body.
    ///
    /// A file that does not open with `---` has no front-matter: every
    /// field takes its default and the whole input is the body. An opening
    /// delimiter without a closing one, or a block that is not valid YAML,
    /// is an error.
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let Some(rest) = content.strip_prefix("---") else {
            return Ok((FrontMatter::default(), content));
        };

        let Some(end) = rest.find("\n---") else {
            return Err(FrontMatterError::Unterminated);
        };

        let block = &rest[..end];
        let body = rest[end + 4..].trim_start_matches(['\n', '\r']);

        if block.trim().is_empty() {
            return Ok((FrontMatter::default(), body));
        }

        let fm = serde_yaml::from_str(block)?;
        Ok((fm, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
description: A first post
date: 2024-01-15
tags:
  - rust
  - web
---

This is the content.
"#;

        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, Some("Hello World".to_string()));
        assert_eq!(fm.description, Some("A first post".to_string()));
        assert_eq!(fm.date, Some("2024-01-15".to_string()));
        assert_eq!(fm.tags, vec!["rust", "web"]);
        assert!(!fm.draft);
        assert!(body.contains("This is the content."));
    }

    #[test]
    fn test_no_frontmatter_is_all_defaults() {
        let content = "Just a body, no preamble.\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, None);
        assert_eq!(fm.tags, Vec::<String>::new());
        assert!(!fm.draft);
        assert_eq!(body, content);
    }

    #[test]
    fn test_unterminated_frontmatter_is_an_error() {
        let content = "---\ntitle: Oops\nno closing delimiter here\n";
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(matches!(err, FrontMatterError::Unterminated));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let content = "---\ntitle: [unclosed\n---\nbody\n";
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(matches!(err, FrontMatterError::Yaml(_)));
    }

    #[test]
    fn test_empty_frontmatter_block() {
        let content = "---\n---\nThe body.\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, None);
        assert_eq!(body, "The body.\n");
    }

    #[test]
    fn test_single_string_tags() {
        let content = "---\ntitle: One Tag\ntags: notes\n---\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, vec!["notes"]);
    }

    #[test]
    fn test_draft_coercion() {
        for (value, expected) in [
            ("true", true),
            ("false", false),
            ("\"true\"", true),
            ("1", true),
            ("0", false),
            ("yes", true),
        ] {
            let content = format!("---\ndraft: {}\n---\n", value);
            let (fm, _) = FrontMatter::parse(&content).unwrap();
            assert_eq!(fm.draft, expected, "draft: {}", value);
        }
    }

    #[test]
    fn test_extra_fields_preserved_in_order() {
        let content = "---\ntitle: X\nseries: deep-dives\nfeatured: true\n---\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        let keys: Vec<&String> = fm.extra.keys().collect();
        assert_eq!(keys, vec!["series", "featured"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = "---\r\ntitle: Windows\r\n---\r\nThe body.\r\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, Some("Windows".to_string()));
        assert_eq!(body, "The body.\r\n");
    }
}
