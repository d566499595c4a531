//! `vlab` command line.
//!
//! - `annotate`: run a function on a `gs://` image and save its results
//! - `fetch`: download a results document
//! - `render`: draw saved results over a local copy of the image

pub mod annotate;
pub mod fetch;
pub mod render;
pub mod source;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Vision lab command line
#[derive(Parser, Debug)]
#[command(name = "vlab")]
#[command(version)]
#[command(about = "Annotate images with the Vision API and draw the results", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run object localization or face detection and save the results
    Annotate(annotate::AnnotateArgs),

    /// Download a results document from a bucket
    Fetch(fetch::FetchArgs),

    /// Draw saved results over an image
    Render(render::RenderArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Annotate(args) => annotate::run(args).await,
        Commands::Fetch(args) => fetch::run(args).await,
        Commands::Render(args) => render::run(args).await,
    }
}
