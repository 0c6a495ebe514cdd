use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to a YAML config file (defaults to $DOCQA_CONFIG)
    #[clap(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[clap(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the HTTP daemon
    Serve {
        /// Listening port (overrides config and PORT)
        #[clap(short, long)]
        port: Option<u16>,

        /// Listening host (overrides config)
        #[clap(long)]
        host: Option<String>,
    },

    /// Print the hash embedding of a text
    Embed {
        /// Text to embed
        text: String,

        /// Embedding length (overrides config)
        #[clap(short, long)]
        dimensions: Option<usize>,
    },

    /// Load documents from files and answer a single question
    Ask {
        /// Document file, may be repeated
        #[clap(short, long = "doc", required = true)]
        docs: Vec<PathBuf>,

        /// The question
        question: String,
    },
}
