//! `vlab render objects|faces`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use image::{DynamicImage, RgbaImage};
use tracing::info;
use vlab_models::{DetectionRecord, DetectionResults, FaceDetection, ObjectDetection};
use vlab_render::{load_font, open_image, save_image, LabelStyle, Palette, Renderer, DEFAULT_SCORE_THRESHOLD};

use crate::source::ResultsSource;

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(subcommand)]
    pub kind: RenderKind,
}

#[derive(Subcommand, Debug)]
pub enum RenderKind {
    /// Draw object boxes labelled `<name>-<score>`
    Objects(RenderObjectsArgs),
    /// Draw face boxes labelled with likely emotions
    Faces(CommonRenderArgs),
}

#[derive(Args, Debug)]
pub struct RenderObjectsArgs {
    #[command(flatten)]
    pub common: CommonRenderArgs,

    /// Skip objects scoring below this
    #[arg(long, default_value_t = DEFAULT_SCORE_THRESHOLD)]
    pub threshold: f64,
}

#[derive(Args, Debug, Clone)]
pub struct CommonRenderArgs {
    /// Local copy of the annotated image
    #[arg(long)]
    pub image: PathBuf,

    /// Results document: a local path or `gs://bucket/key`
    #[arg(long)]
    pub results: String,

    /// TrueType/OpenType font for labels; boxes only when absent
    #[arg(long, env = "VLAB_FONT")]
    pub font: Option<PathBuf>,

    /// Where to write the annotated image (format from extension)
    #[arg(long)]
    pub out: PathBuf,

    /// Seed for box colors, for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,
}

pub async fn run(args: RenderArgs) -> Result<()> {
    match args.kind {
        RenderKind::Objects(objects) => {
            let results: DetectionResults<ObjectDetection> = load(&objects.common).await?;
            let mut renderer = renderer_for(&objects.common)?;
            draw(&objects.common, |image| {
                renderer.render_objects(image, &results, objects.threshold)
            })
        }
        RenderKind::Faces(common) => {
            let results: DetectionResults<FaceDetection> = load(&common).await?;
            let mut renderer = renderer_for(&common)?;
            draw(&common, |image| renderer.render_faces(image, &results))
        }
    }
}

async fn load<T: DetectionRecord>(args: &CommonRenderArgs) -> Result<DetectionResults<T>> {
    let source = ResultsSource::parse(&args.results)?;
    let results = if source.is_remote() {
        let store = vlab_storage::from_env()
            .await
            .context("Failed to create object store")?;
        source.load(Some(store.as_ref())).await?
    } else {
        source.load(None).await?
    };

    info!("Loaded {} {} from {}", results.len(), T::KIND, source);
    Ok(results)
}

fn renderer_for(args: &CommonRenderArgs) -> Result<Renderer> {
    let font = args.font.as_ref().map(load_font).transpose()?;
    let palette = args.seed.map(Palette::seeded).unwrap_or_default();
    Ok(Renderer::new(font, LabelStyle::default(), palette))
}

fn draw(args: &CommonRenderArgs, render: impl FnOnce(&DynamicImage) -> RgbaImage) -> Result<()> {
    let image = open_image(&args.image).with_context(|| format!("Failed to open {}", args.image.display()))?;
    let annotated = render(&image);
    save_image(annotated, &args.out).with_context(|| format!("Failed to save {}", args.out.display()))?;
    Ok(())
}
