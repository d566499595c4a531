//! `vlab fetch`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::AsyncWriteExt;
use tracing::info;
use vlab_storage::ObjectStore;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Bucket holding the object
    #[arg(long)]
    pub bucket: String,

    /// Object key, e.g. `photo.jpg.faces.json`
    #[arg(long)]
    pub key: String,

    /// Write here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub async fn run(args: FetchArgs) -> Result<()> {
    let store = vlab_storage::from_env()
        .await
        .context("Failed to create object store")?;
    let bytes = fetch(store.as_ref(), &args.bucket, &args.key, args.out.as_deref()).await?;

    if args.out.is_none() {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(&bytes).await?;
        stdout.flush().await?;
    }
    Ok(())
}

/// Download `bucket/key`, saving it to `out` when given.
pub async fn fetch(store: &dyn ObjectStore, bucket: &str, key: &str, out: Option<&Path>) -> Result<Vec<u8>> {
    let bytes = store
        .get_bytes(bucket, key)
        .await
        .with_context(|| format!("Failed to fetch {}/{}", bucket, key))?;

    if let Some(out) = out {
        tokio::fs::write(out, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", out.display()))?;
        info!("Wrote {} bytes to {}", bytes.len(), out.display());
    }

    Ok(bytes)
}
