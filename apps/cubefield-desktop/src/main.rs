mod app;
mod config;
mod headless;
mod scene;

use anyhow::{Context as _, Result};
use clap::Parser;
use config::SceneConfig;
use cubefield_common::Viewport;
use cubefield_kernel::StopHandle;
use cubefield_render_wgpu::RendererSettings;
use scene::Scene;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const HEADLESS_FRAMES: u64 = 300;

#[derive(Parser)]
#[command(name = "cubefield", about = "A lattice of spinning cubes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config (YAML); defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for palette draws, overriding the config
    #[arg(long)]
    seed: Option<u64>,

    /// Run without a window on a fixed clock
    #[arg(long)]
    headless: bool,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 720)]
    height: u32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("cubefield starting");

    let mut config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let viewport = Viewport::new(cli.width, cli.height);
    let (mut scene, mut registry) =
        Scene::build(&config, viewport, StopHandle::default()).context("invalid scene config")?;

    if cli.headless {
        let report = headless::run(&mut scene, &mut registry, cli.frames.unwrap_or(HEADLESS_FRAMES));
        tracing::info!(
            frames = report.frames,
            hover_changes = report.hover_changes,
            failures = report.animation_failures,
            "headless run finished"
        );
        return Ok(());
    }

    let settings = RendererSettings {
        background: config.background,
        ssao: config.ssao_params(),
        kernel_seed: scene.seed(),
    };
    app::run(scene, registry, settings, viewport, cli.frames)
}
