//! Site server with live reload
//!
//! Pages are rendered per request from the content store; there is no
//! generation step and no cache, so a change on disk is visible on the
//! next request.

use anyhow::Result;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path as UrlPath, State, WebSocketUpgrade,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use serde::Serialize;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::content::{ContentItem, ContentKind, FrontMatter, MarkdownRenderer};
use crate::helpers;
use crate::templates::{ItemCard, SiteData, TemplateRenderer};
use crate::Folio;

/// How many items per kind the latest-content API returns
const LATEST_COUNT: usize = 3;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state
struct ServerState {
    folio: Folio,
    templates: TemplateRenderer,
    markdown: MarkdownRenderer,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

/// Start the site server
pub async fn start(folio: &Folio, host: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        folio: folio.clone(),
        templates: TemplateRenderer::new()?,
        markdown: MarkdownRenderer::new(),
        reload_tx: reload_tx.clone(),
        live_reload: watch,
    });

    let app = Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/experience", get(experience))
        .route("/recommendations", get(recommendations))
        .route("/blog", get(blog_index))
        .route("/blog/:slug", get(blog_post))
        .route("/projects", get(projects_index))
        .route("/projects/:slug", get(project_post))
        .route("/api/content/latest", get(latest_content))
        .route("/sitemap.xml", get(sitemap))
        .route("/assets/style.css", get(stylesheet))
        .route("/__livereload", get(livereload_handler))
        .fallback_service(ServeDir::new(&folio.static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if host == "localhost" { "127.0.0.1" } else { host };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", host, port);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for content changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let watched = vec![folio.content_dir.clone(), folio.static_dir.clone()];
        tokio::spawn(async move {
            if let Err(e) = watch_and_reload(watched, reload_tx).await {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch the content and static directories and notify connected clients.
///
/// Content is re-read per request, so a change only needs a browser
/// reload; nothing is rebuilt here.
async fn watch_and_reload(paths: Vec<PathBuf>, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Debounce editor save bursts
    let mut debouncer = new_debouncer(Duration::from_millis(300), tx)?;

    for path in &paths {
        if path.exists() {
            debouncer.watcher().watch(path, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", path);
        }
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events.iter().any(|e| {
                    let path_str = e.path.to_string_lossy();
                    !path_str.contains(".git") && !path_str.ends_with('~')
                });
                if relevant {
                    tracing::info!("Content changed, reloading clients");
                    let _ = reload_tx.send(());
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

// Page handlers. Every handler reads through the store fresh; absence of
// content renders an empty state and a slug miss renders the 404 page.

async fn home(State(state): State<Arc<ServerState>>) -> Response {
    let store = state.folio.store();
    let (blog, projects) = match (store.list(ContentKind::Blog), store.list(ContentKind::Projects))
    {
        (Ok(blog), Ok(projects)) => (blog, projects),
        (Err(e), _) | (_, Err(e)) => return internal_error(e),
    };

    let latest = |kind: ContentKind, items: &[ContentItem]| -> Vec<ItemCard> {
        items
            .iter()
            .take(LATEST_COUNT)
            .map(|item| ItemCard::new(kind, item))
            .collect()
    };

    let mut context = base_context(&state);
    context.insert("profile", &state.folio.config.profile);
    context.insert("latest_blog", &latest(ContentKind::Blog, &blog));
    context.insert("latest_projects", &latest(ContentKind::Projects, &projects));
    render_page(&state, "home.html", &context)
}

async fn about(State(state): State<Arc<ServerState>>) -> Response {
    let mut context = base_context(&state);
    context.insert("page_title", "About");
    context.insert("paragraphs", &state.folio.config.about);
    render_page(&state, "about.html", &context)
}

async fn experience(State(state): State<Arc<ServerState>>) -> Response {
    let mut context = base_context(&state);
    context.insert("page_title", "Experience");
    context.insert("entries", &state.folio.config.experience);
    render_page(&state, "experience.html", &context)
}

async fn recommendations(State(state): State<Arc<ServerState>>) -> Response {
    let mut context = base_context(&state);
    context.insert("page_title", "Recommendations");
    context.insert("entries", &state.folio.config.recommendations);
    render_page(&state, "recommendations.html", &context)
}

async fn blog_index(State(state): State<Arc<ServerState>>) -> Response {
    listing_page(&state, ContentKind::Blog, "Blog")
}

async fn projects_index(State(state): State<Arc<ServerState>>) -> Response {
    listing_page(&state, ContentKind::Projects, "Projects")
}

async fn blog_post(
    State(state): State<Arc<ServerState>>,
    UrlPath(slug): UrlPath<String>,
) -> Response {
    item_page(&state, ContentKind::Blog, &slug)
}

async fn project_post(
    State(state): State<Arc<ServerState>>,
    UrlPath(slug): UrlPath<String>,
) -> Response {
    item_page(&state, ContentKind::Projects, &slug)
}

fn listing_page(state: &ServerState, kind: ContentKind, heading: &str) -> Response {
    let items = match state.folio.store().list(kind) {
        Ok(items) => items,
        Err(e) => return internal_error(e),
    };
    let cards: Vec<ItemCard> = items.iter().map(|item| ItemCard::new(kind, item)).collect();

    let mut context = base_context(state);
    context.insert("page_title", heading);
    context.insert("heading", heading);
    context.insert("items", &cards);
    render_page(state, "listing.html", &context)
}

fn item_page(state: &ServerState, kind: ContentKind, slug: &str) -> Response {
    let item = match state.folio.store().get_by_slug(kind, slug) {
        Ok(Some(item)) => item,
        Ok(None) => return not_found_page(state),
        Err(e) => return internal_error(e),
    };

    // The store keeps only metadata; re-read the source for the body
    let rendered = fs::read_to_string(&item.filepath)
        .map_err(anyhow::Error::from)
        .and_then(|source| {
            let (_, body) = FrontMatter::parse(&source)?;
            state.markdown.render(body)
        });
    let content = match rendered {
        Ok(html) => html,
        Err(e) => return internal_error(e),
    };

    let mut context = base_context(state);
    context.insert("page_title", &item.title);
    context.insert("page_description", &item.description);
    context.insert("item", &ItemCard::new(kind, &item));
    context.insert("author", &item.author);
    context.insert("content", &content);
    render_page(state, "post.html", &context)
}

/// Public projection of an item for the content API. Source paths and
/// draft flags never cross this boundary.
#[derive(Debug, Serialize)]
struct LatestItem {
    slug: String,
    title: String,
    description: String,
    date: String,
    #[serde(rename = "readingTime")]
    reading_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cover: Option<String>,
}

impl From<ContentItem> for LatestItem {
    fn from(item: ContentItem) -> Self {
        Self {
            slug: item.slug,
            title: item.title,
            description: item.description,
            date: item.date,
            reading_time: item.reading_time,
            cover: item.cover,
        }
    }
}

#[derive(Debug, Serialize)]
struct LatestResponse {
    blog: Vec<LatestItem>,
    projects: Vec<LatestItem>,
}

async fn latest_content(State(state): State<Arc<ServerState>>) -> Response {
    match build_latest(&state.folio) {
        Ok(latest) => Json(latest).into_response(),
        Err(e) => internal_error(e),
    }
}

fn build_latest(folio: &Folio) -> Result<LatestResponse> {
    let store = folio.store();
    let latest = |kind: ContentKind| -> Result<Vec<LatestItem>> {
        Ok(store
            .list(kind)?
            .into_iter()
            .take(LATEST_COUNT)
            .map(LatestItem::from)
            .collect())
    };

    Ok(LatestResponse {
        blog: latest(ContentKind::Blog)?,
        projects: latest(ContentKind::Projects)?,
    })
}

async fn sitemap(State(state): State<Arc<ServerState>>) -> Response {
    match build_sitemap(&state.folio) {
        Ok(xml) => ([(header::CONTENT_TYPE, "application/xml")], xml).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Routes rendered from config rather than content files
const STATIC_ROUTES: &[&str] = &[
    "",
    "about",
    "experience",
    "recommendations",
    "blog",
    "projects",
];

fn build_sitemap(folio: &Folio) -> Result<String> {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    xml.push('\n');

    let now = chrono::Utc::now().to_rfc3339();
    for route in STATIC_ROUTES {
        let loc = helpers::full_url_for(&folio.config, route);
        push_url(&mut xml, &loc, Some(&now));
    }

    let store = folio.store();
    for kind in ContentKind::ALL {
        for item in store.list(kind)? {
            let loc = helpers::full_url_for(&folio.config, &helpers::url_for(kind.as_str(), &item.slug));
            push_url(&mut xml, &loc, item.last_modified());
        }
    }

    xml.push_str("</urlset>\n");
    Ok(xml)
}

fn push_url(xml: &mut String, loc: &str, lastmod: Option<&str>) {
    xml.push_str("  <url>\n");
    xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(loc)));
    if let Some(lastmod) = lastmod {
        xml.push_str(&format!("    <lastmod>{}</lastmod>\n", escape_xml(lastmod)));
    }
    xml.push_str("  </url>\n");
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

async fn stylesheet() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        include_str!("../templates/folio/style.css"),
    )
}

fn base_context(state: &ServerState) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("site", &SiteData::new(&state.folio.config));
    context
}

fn render_page(state: &ServerState, template: &str, context: &tera::Context) -> Response {
    match state.templates.render(template, context) {
        Ok(html) => Html(inject_live_reload(state, html)).into_response(),
        Err(e) => internal_error(e),
    }
}

fn not_found_page(state: &ServerState) -> Response {
    let context = base_context(state);
    match state.templates.render("not_found.html", &context) {
        Ok(html) => (
            StatusCode::NOT_FOUND,
            Html(inject_live_reload(state, html)),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

fn internal_error(err: anyhow::Error) -> Response {
    tracing::error!("Request failed: {:#}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
}

/// Inject the live reload script into rendered HTML when watching
fn inject_live_reload(state: &ServerState, html: String) -> String {
    if !state.live_reload {
        return html;
    }
    if html.contains("</body>") {
        html.replace("</body>", LIVE_RELOAD_SCRIPT)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::fs;
    use tempfile::TempDir;

    fn site(root: &TempDir) -> Folio {
        let config = SiteConfig {
            url: "https://example.com".to_string(),
            ..Default::default()
        };
        Folio {
            content_dir: root.path().join("content"),
            static_dir: root.path().join("static"),
            base_dir: root.path().to_path_buf(),
            config,
        }
    }

    fn write_post(root: &TempDir, rel: &str, content: &str) {
        let path = root.path().join("content").join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_latest_is_capped_and_projected() {
        let root = TempDir::new().unwrap();
        for n in 1..=5 {
            write_post(
                &root,
                &format!("blog/post-{}.md", n),
                &format!("---\ntitle: Post {}\ndate: 2024-0{}-01\n---\nbody\n", n, n),
            );
        }
        write_post(&root, "projects/only.md", "---\ndate: 2024-01-01\n---\n");

        let latest = build_latest(&site(&root)).unwrap();
        assert_eq!(latest.blog.len(), 3);
        assert_eq!(latest.projects.len(), 1);
        // Newest first
        assert_eq!(latest.blog[0].slug, "post-5");

        let json = serde_json::to_value(&latest).unwrap();
        let first = &json["blog"][0];
        assert_eq!(first["readingTime"], "1 min read");
        // Internal fields never serialize to the API boundary
        assert!(first.get("filepath").is_none());
        assert!(first.get("draft").is_none());
        // Absent cover is omitted rather than null
        assert!(first.get("cover").is_none());
    }

    #[test]
    fn test_sitemap_lists_items_with_lastmod() {
        let root = TempDir::new().unwrap();
        write_post(
            &root,
            "blog/hello.md",
            "---\ndate: 2024-01-01\nupdated: 2024-02-02\n---\n",
        );
        write_post(&root, "projects/tool.md", "---\ndate: 2024-03-03\n---\n");
        write_post(
            &root,
            "blog/secret.md",
            "---\ndate: 2024-05-05\ndraft: true\n---\n",
        );

        let xml = build_sitemap(&site(&root)).unwrap();
        assert!(xml.contains("<loc>https://example.com/blog/hello</loc>"));
        assert!(xml.contains("<lastmod>2024-02-02</lastmod>"));
        assert!(xml.contains("<loc>https://example.com/projects/tool</loc>"));
        assert!(xml.contains("<lastmod>2024-03-03</lastmod>"));
        // Drafts never reach the sitemap
        assert!(!xml.contains("secret"));
        // Static routes are present
        assert!(xml.contains("<loc>https://example.com/about</loc>"));
    }
}
