//! Diya Player - shows the lamp scene in a window
//!
//! Usage:
//!   diya-player [--config <scene.toml>] [--fireworks-on-click] [--auto-fireworks]

use anyhow::{Context, Result};
use clap::Parser;
use diya_player::PlayerApp;
use diya_scene::SceneConfig;
use std::path::PathBuf;
use winit::event_loop::{ControlFlow, EventLoop};

#[derive(Parser)]
#[command(name = "diya-player")]
#[command(about = "Diya lamp scene with firework bursts")]
struct Args {
    /// Scene configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Spawn a burst where the window is clicked
    #[arg(long)]
    fireworks_on_click: bool,

    /// Spawn bursts on a timer
    #[arg(long)]
    auto_fireworks: bool,

    /// Number of ambient sparkles
    #[arg(long)]
    sparkles: Option<usize>,

    /// Fixed random seed
    #[arg(long)]
    seed: Option<u32>,

    /// Container id the window is registered under
    #[arg(long, default_value = "diya")]
    container: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    config.fireworks_on_click |= args.fireworks_on_click;
    config.auto_fireworks |= args.auto_fireworks;
    if let Some(count) = args.sparkles {
        config.sparkles_count = count;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate().context("Invalid configuration")?;

    log::info!("Controls: click = burst (with --fireworks-on-click), Space/F = burst, Esc = quit");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = PlayerApp::new(config, args.container);
    event_loop.run_app(&mut app)?;

    Ok(())
}
