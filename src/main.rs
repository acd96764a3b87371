//! CDN rewriter command line.
//!
//! # Commands
//!
//! ```text
//! check              validate the config and print the compiled lookup table
//! resolve <uri>...   print the CDN domain chosen for each URI
//! rewrite [file]     rewrite asset URLs in an HTML file (or stdin)
//! encode <uri>       build a signed far-future path for a stream wrapper URI
//! decode <path>      decode (and verify) a far-future path
//! watch              keep the settings live while the config file changes
//! ```

use std::error::Error;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;

use cdn_rewriter::config::loader::load_config;
use cdn_rewriter::config::watcher::ConfigWatcher;
use cdn_rewriter::farfuture::{self, TokenSigner};
use cdn_rewriter::file_url::uri_scheme;
use cdn_rewriter::observability::{logging, metrics};
use cdn_rewriter::{CdnSettings, HtmlRewriter};

#[derive(Parser)]
#[command(name = "cdn-rewriter")]
#[command(about = "Serve site assets from CDN domains", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "cdn.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and print the compiled lookup table
    Check,
    /// Print the CDN domain for each URI
    Resolve {
        #[arg(required = true)]
        uris: Vec<String>,
    },
    /// Rewrite asset URLs in an HTML document
    Rewrite {
        /// HTML file; stdin when omitted
        input: Option<PathBuf>,
    },
    /// Build a signed far-future path
    Encode {
        /// Stream wrapper URI, e.g. public://styles/a.png
        uri: String,
        /// Modification time, seconds since the epoch
        #[arg(long)]
        mtime: u64,
    },
    /// Decode a far-future path
    Decode { path: String },
    /// Watch the configuration file and apply changes
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    logging::init(&config.observability.log_level);
    metrics::describe();

    tracing::debug!(path = ?cli.config, "Configuration loaded");
    let site = config.site.identity();
    let secret = config.farfuture.secret.clone();
    let settings = Arc::new(CdnSettings::new(config)?);

    match cli.command {
        Commands::Check => {
            let snapshot = settings.snapshot();
            let report = json!({
                "status": snapshot.config.status,
                "farfuture": snapshot.config.farfuture.status,
                "domains": snapshot.table.domains(),
                "lookup_table": &snapshot.table,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Resolve { uris } => {
            for uri in uris {
                let domain = settings.resolve(&uri);
                println!("{}\t{}", uri, domain.as_deref().unwrap_or("-"));
            }
        }
        Commands::Rewrite { input } => {
            let html = match input {
                Some(path) => fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let rewriter = HtmlRewriter::default();
            print!("{}", rewriter.rewrite_with(&html, &site, &settings));
        }
        Commands::Encode { uri, mtime } => {
            let (scheme, relative_path) = match (uri_scheme(&uri), uri.split_once("://")) {
                (Some(scheme), Some((_, relative_path))) => (scheme, relative_path),
                _ => return Err(format!("not a stream wrapper URI: {}", uri).into()),
            };
            let signer = TokenSigner::new(&secret)?;
            let token = signer.sign(mtime, scheme, relative_path);
            println!("{}", farfuture::encode(&token, mtime, scheme, relative_path));
        }
        Commands::Decode { path } => {
            let Some((decoded, shape)) = farfuture::decode(&path) else {
                return Err(format!("not a far-future path: {}", path).into());
            };
            let valid = TokenSigner::new(&secret)
                .ok()
                .map(|signer| signer.verify(&decoded));
            let report = json!({
                "shape": shape.as_str(),
                "security_token": decoded.security_token,
                "mtime": decoded.mtime,
                "scheme": decoded.scheme,
                "relative_path": decoded.relative_path,
                "valid": valid,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Watch => watch(cli.config, settings).await?,
    }

    Ok(())
}

async fn watch(path: PathBuf, settings: Arc<CdnSettings>) -> Result<(), Box<dyn Error>> {
    let (watcher, mut updates) = ConfigWatcher::new(&path);
    // Dropping the handle stops the watcher.
    let _handle = watcher.run()?;

    tracing::info!(version = settings.version(), domains = ?settings.domains(), "Watching CDN settings");

    loop {
        tokio::select! {
            Some(config) = updates.recv() => {
                if let Ok(version) = settings.apply(config) {
                    tracing::info!(version, domains = ?settings.domains(), "CDN settings reloaded");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}
