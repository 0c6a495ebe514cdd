use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod config;
mod documents;
mod semantic;
#[cfg(test)]
mod tests;
mod web;

use app::{reports::EmbeddingProbe, AppLocal};
use config::Config;
use documents::DocumentCreate;
use semantic::HashEmbedder;

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "docqa=debug,tower_http=debug"
    } else {
        "docqa=info,tower_http=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    init_logging(args.verbose);

    let config_path = args
        .config
        .clone()
        .or_else(|| std::env::var_os(config::CONFIG_ENV).map(PathBuf::from));
    let mut config = Config::load(config_path.as_deref())?;

    match args.command {
        cli::Command::Serve { port, host } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }

            let app = AppLocal::new(config);
            web::start_daemon(app)
        }

        cli::Command::Embed { text, dimensions } => {
            let dimensions = dimensions.unwrap_or(config.retrieval.dimensions);
            if dimensions == 0 {
                bail!("dimensions must be greater than 0");
            }

            let embedder = HashEmbedder::new(dimensions);
            let output = serde_json::json!({
                "probe": EmbeddingProbe::new(&text, &embedder),
                "embedding": embedder.embed(&text),
            });

            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }

        cli::Command::Ask { docs, question } => {
            let mut app = AppLocal::new(config);

            for path in docs {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let title = path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string());

                let document = app
                    .add_document(DocumentCreate { title, content })
                    .with_context(|| format!("failed to add {}", path.display()))?;
                log::info!("loaded {} as document {}", path.display(), document.id);
            }

            let result = app.answer_question(&question)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}
