//! CLI command implementations

pub mod download;
pub mod error;
pub mod pages;

pub use download::DownloadArgs;
pub use error::CliError;
pub use pages::PagesArgs;

use clap::{Parser, Subcommand};

/// Bulk image downloader for tag-indexed imageboard APIs
#[derive(Debug, Parser)]
#[command(name = "tagdl", version, about)]
pub struct Cli {
    /// Upstream API base URL
    #[arg(
        long,
        global = true,
        env = "TAGDL_BASE_URL",
        default_value = "https://rule34.xxx"
    )]
    pub base_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report the total post and page count for a tag
    Pages(PagesArgs),
    /// Download every image for a tag
    Download(DownloadArgs),
}
