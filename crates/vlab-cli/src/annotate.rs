//! `vlab annotate objects|faces`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tracing::info;
use vlab_api::functions::{self, FunctionOutcome};
use vlab_api::AppConfig;
use vlab_models::StorageEvent;
use vlab_storage::ObjectStore;
use vlab_vision::VisionClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Function {
    /// Object localization, saved as `<name>.objects.json`
    Objects,
    /// Face detection, saved as `<name>.faces.json`
    Faces,
}

#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// Which function to run
    #[arg(value_enum)]
    pub function: Function,

    /// Bucket holding the image
    #[arg(long)]
    pub bucket: String,

    /// Object name of the image
    #[arg(long)]
    pub name: String,

    /// JSON file with RESULT_BUCKET
    #[arg(long, env = "VLAB_CONFIG", default_value = "config.json")]
    pub config: PathBuf,
}

pub async fn run(args: AnnotateArgs) -> Result<()> {
    let app_config = AppConfig::load_with_override(&args.config, std::env::var("RESULT_BUCKET").ok())
        .context("Failed to load configuration")?;
    let event = StorageEvent::new(args.bucket, args.name).validated()?;

    let vision = VisionClient::from_env()
        .await
        .context("Failed to create vision client")?;
    let store = vlab_storage::from_env()
        .await
        .context("Failed to create object store")?;

    let outcome = annotate(args.function, &vision, store.as_ref(), &app_config, &event).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

/// Run one function against `event` and report where the results went.
pub async fn annotate(
    function: Function,
    vision: &VisionClient,
    store: &dyn ObjectStore,
    app_config: &AppConfig,
    event: &StorageEvent,
) -> Result<FunctionOutcome> {
    let bucket = app_config.result_bucket.as_str();
    let outcome = match function {
        Function::Objects => functions::localize_objects(vision, store, bucket, event).await?,
        Function::Faces => functions::detect_faces(vision, store, bucket, event).await?,
    };

    info!(
        "Saved {} detections to gs://{}/{}",
        outcome.count, outcome.result_bucket, outcome.result_file
    );
    Ok(outcome)
}
