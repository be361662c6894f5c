//! CLI entry point for folio-rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_rs::content::ContentKind;

#[derive(Parser)]
#[command(name = "folio-rs")]
#[command(version)]
#[command(about = "A personal portfolio and blog engine driven by markdown content", long_about = None)]
struct Cli {
    /// Set the site directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the site server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Disable content watching and live reload
        #[arg(long)]
        r#static: bool,
    },

    /// List site content
    List {
        /// What to list (blog, projects, tags)
        #[arg(default_value = "blog")]
        target: String,
    },

    /// Create a new draft entry
    New {
        /// Content kind (blog, projects)
        kind: String,

        /// Title of the new entry
        title: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio_rs=debug,info"
    } else {
        "folio_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine site directory
    let base_dir = cli.cwd.unwrap_or_else(|| std::env::current_dir().unwrap());

    match cli.command {
        Commands::Serve {
            port,
            host,
            open,
            r#static,
        } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            let port = port.unwrap_or(folio.config.port);
            let host = host.unwrap_or_else(|| folio.config.host.clone());

            tracing::info!("Starting server at http://{}:{}", host, port);
            folio_rs::server::start(&folio, &host, port, !r#static, open).await?;
        }

        Commands::List { target } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            folio_rs::commands::list::run(&folio, &target)?;
        }

        Commands::New { kind, title } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            let Some(kind) = ContentKind::from_name(&kind) else {
                anyhow::bail!("Unknown kind: {}. Available: blog, projects", kind);
            };
            tracing::info!("Creating new {} entry: {}", kind, title);
            folio_rs::commands::new::run(&folio, kind, &title)?;
        }

        Commands::Version => {
            println!("folio-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
