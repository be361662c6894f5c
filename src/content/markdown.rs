//! Markdown rendering with syntax highlighting

use anyhow::Result;
use lazy_static::lazy_static;
use pulldown_cmark::{
    html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd,
};
use regex::Regex;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

lazy_static! {
    /// YouTube watch/share/embed URLs, capturing the 11-character video id
    static ref YOUTUBE_URL: Regex = Regex::new(
        r"(?:youtube\.com/(?:watch\?(?:[^\s]*&)?v=|embed/)|youtu\.be/)([A-Za-z0-9_-]{11})"
    )
    .unwrap();
}

/// Markdown renderer with syntax highlighting.
///
/// MDX bodies render through the same path: markdown constructs are
/// rendered, component tags pass through as raw HTML.
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: "base16-ocean.dark".to_string(),
        }
    }

    /// Render markdown to HTML.
    ///
    /// Headings get slugified `id` attributes so in-page anchors and a
    /// table of contents can link to them. Images pointing at YouTube
    /// render as embedded players instead of `<img>` tags.
    pub fn render(&self, markdown: &str) -> Result<String> {
        // Front-matter is split off before rendering, so YAML metadata
        // blocks stay disabled here
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut heading: Option<(HeadingLevel, Vec<Event>)> = None;
        let mut in_code = false;
        let mut code_lang: Option<String> = None;
        let mut code_buf = String::new();
        let mut skip_image = false;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code = true;
                    code_buf.clear();
                    code_lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                        _ => None,
                    };
                }
                Event::End(TagEnd::CodeBlock) => {
                    let highlighted = self.highlight_code(&code_buf, code_lang.as_deref());
                    push(&mut events, &mut heading, Event::Html(CowStr::from(highlighted)));
                    in_code = false;
                    code_lang = None;
                }
                Event::Text(text) if in_code => {
                    code_buf.push_str(&text);
                }
                Event::Start(Tag::Heading { level, .. }) => {
                    heading = Some((level, Vec::new()));
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, inner)) = heading.take() {
                        let tag = heading_tag(level);
                        let text: String = inner
                            .iter()
                            .filter_map(|e| match e {
                                Event::Text(t) | Event::Code(t) => Some(t.as_ref()),
                                _ => None,
                            })
                            .collect();
                        events.push(Event::Html(
                            format!("<{} id=\"{}\">", tag, slug::slugify(text)).into(),
                        ));
                        events.extend(inner);
                        events.push(Event::Html(format!("</{}>", tag).into()));
                    }
                }
                Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    if let Some(video) = youtube_video_id(&dest_url) {
                        let embed = format!(
                            r#"<div class="video-embed"><iframe src="https://www.youtube.com/embed/{}" title="{}" allowfullscreen></iframe></div>"#,
                            video,
                            html_escape(&title),
                        );
                        push(&mut events, &mut heading, Event::Html(embed.into()));
                        // Swallow the alt text; the iframe replaces the image
                        skip_image = true;
                    } else {
                        push(
                            &mut events,
                            &mut heading,
                            Event::Start(Tag::Image {
                                link_type,
                                dest_url,
                                title,
                                id,
                            }),
                        );
                    }
                }
                Event::End(TagEnd::Image) if skip_image => {
                    skip_image = false;
                }
                _ if skip_image => {}
                other => push(&mut events, &mut heading, other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .unwrap_or_else(|| {
                self.theme_set
                    .themes
                    .values()
                    .next()
                    .expect("No themes available")
            });

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) => format!(
                r#"<div class="code-block" data-lang="{}">{}</div>"#,
                lang, highlighted
            ),
            Err(_) => {
                // Fallback to plain code block
                let escaped = html_escape(code);
                format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    lang, escaped
                )
            }
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Push into the current heading buffer when one is open, else the stream
fn push<'a>(
    events: &mut Vec<Event<'a>>,
    heading: &mut Option<(HeadingLevel, Vec<Event<'a>>)>,
    event: Event<'a>,
) {
    match heading {
        Some((_, inner)) => inner.push(event),
        None => events.push(event),
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

/// Extract the video id from a YouTube URL, if it is one
fn youtube_video_id(url: &str) -> Option<String> {
    YOUTUBE_URL
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
