//! Helper functions shared by templates, the sitemap and the CLI

mod date;
mod url;

pub use date::*;
pub use url::*;
