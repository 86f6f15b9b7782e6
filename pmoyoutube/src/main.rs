use anyhow::{Context, Result};
use clap::Parser;
use pmoyoutube::{PlaylistLoader, YouTubeConfig};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Fetch a YouTube playlist and write it as a JSON collection
#[derive(Parser)]
#[command(name = "pmoyoutube")]
#[command(version)]
#[command(long_about = "\
Fetch a YouTube playlist and write it as a JSON collection

Credentials come from the environment (YOUTUBE_API_KEY, YOUTUBE_PLAYLIST_ID)
or from config.yaml in the configuration directory. Videos are written most
recent first; deleted and private entries are left out.")]
struct Cli {
    /// Configuration directory (default: $PMOYOUTUBE_CONFIG, ./.pmoyoutube, ~/.pmoyoutube)
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = YouTubeConfig::load(cli.config_dir.as_deref())
        .context("Failed to load YouTube configuration")?;
    let loader = PlaylistLoader::new(config.client()?);

    let (videos, report) = loader
        .load_with_report()
        .await
        .with_context(|| format!("Failed to load playlist {}", config.playlist_id))?;

    info!(
        "📺 {} videos from {} entries ({} pages, {} deleted, {} private, {} skipped)",
        videos.len(),
        report.items,
        report.pages,
        report.deleted,
        report.private,
        report.skipped.len()
    );

    let json = if cli.pretty {
        serde_json::to_string_pretty(&videos)?
    } else {
        serde_json::to_string(&videos)?
    };

    match cli.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("✅ Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }

    Ok(())
}
