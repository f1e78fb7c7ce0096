use anyhow::Result;
use clap::Parser;

mod asset_loader;
mod camera;
mod color;
mod config;
mod demo;
mod engine;
mod globe;
mod input;
mod math;
mod model;
mod obj;
mod rendering;
mod room;
mod scene_graph;
mod window;

fn main() -> Result<()> {
    pretty_env_logger::init();

    let cli = config::Cli::parse();
    window::run(cli)?;

    Ok(())
}
