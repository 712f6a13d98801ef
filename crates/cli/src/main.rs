mod commands;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "metagate")]
#[command(version, about = "Crawler-aware metadata for single-page sites", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Write one pre-rendered page per route into the build output
    Prerender {
        /// Path to project directory containing metagate.toml
        path: PathBuf,

        /// Read posts from a JSON file instead of the content store
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },

    /// Write sitemap.xml
    Sitemap {
        /// Path to project directory containing metagate.toml
        path: PathBuf,

        /// Read posts from a JSON file instead of the content store
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },

    /// Write the sitemap, then pre-render every page
    Build {
        /// Path to project directory containing metagate.toml
        path: PathBuf,

        /// Read posts from a JSON file instead of the content store
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },

    /// Serve the edge handler locally
    Serve {
        /// Path to project directory containing metagate.toml
        path: PathBuf,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to serve on
        #[arg(short, long, default_value = "8787")]
        port: u16,

        /// Read posts from a JSON file instead of the content store
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },

    /// Validate site configuration
    Validate {
        /// Path to project directory containing metagate.toml
        path: PathBuf,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Command::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "metagate", &mut io::stdout());
        return Ok(());
    }

    init_tracing(cli.log_json);

    match cli.command {
        Command::Prerender { path, fixtures } => commands::prerender::run(path, fixtures).await,
        Command::Sitemap { path, fixtures } => commands::sitemap::run(path, fixtures).await,
        Command::Build { path, fixtures } => commands::build::run(path, fixtures).await,
        Command::Serve {
            path,
            host,
            port,
            fixtures,
        } => commands::serve::run(path, host, port, fixtures).await,
        Command::Validate { path } => commands::validate::run(path).await,
        Command::Completions { .. } => Ok(()),
    }
}
