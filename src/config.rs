use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{
    color::{default_color_fn, ColorFn},
    globe::point_cloud::DataFormat,
    rendering::config::RenderConfig,
};

#[derive(Parser, Debug)]
#[command(name = "dataglobe")]
#[command(about = "Data globe and room editor demos")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Render as fast as possible instead of syncing to the display
    #[arg(long, global = true)]
    pub no_vsync: bool,

    /// Skip cube map backgrounds
    #[arg(long, global = true)]
    pub no_background: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Rotating earth with data points
    Globe {
        /// Dataset as a JSON array of [name, [lat, lng, value, ...]] series
        #[arg(long)]
        data: Option<PathBuf>,

        /// Directory containing world.jpg
        #[arg(long, default_value = "assets/img")]
        img_dir: PathBuf,

        /// Directory with the px/nx/py/ny/pz/nz background faces
        #[arg(long, default_value = "assets/bg/space2")]
        background_dir: PathBuf,

        /// magnitude or legend
        #[arg(long, default_value = "magnitude")]
        format: DataFormat,

        /// Keep turning instead of following the drag target
        #[arg(long)]
        spin: bool,

        /// Fly to a preset location on start
        #[arg(long)]
        preset: Option<u32>,
    },

    /// Furniture placement scene
    Room {
        /// Directory holding models/, img/ and bg/
        #[arg(long, default_value = "assets")]
        asset_dir: PathBuf,
    },
}

pub struct GlobeOptions {
    pub color_fn: ColorFn,
    pub img_dir: PathBuf,
    pub background_dir: PathBuf,
    pub data: Option<PathBuf>,
    pub format: DataFormat,
    pub spin: bool,
    pub preset: Option<u32>,
}

impl Default for GlobeOptions {
    fn default() -> Self {
        Self {
            color_fn: default_color_fn(),
            img_dir: PathBuf::from("assets/img"),
            background_dir: PathBuf::from("assets/bg/space2"),
            data: None,
            format: DataFormat::default(),
            spin: false,
            preset: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoomOptions {
    pub asset_dir: PathBuf,
}

impl Default for RoomOptions {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("assets"),
        }
    }
}

pub enum DemoOptions {
    Globe(GlobeOptions),
    Room(RoomOptions),
}

impl Cli {
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            vsync: !self.no_vsync,
            draw_background: !self.no_background,
        }
    }

    pub fn demo_options(&self) -> DemoOptions {
        match self.command.clone() {
            Command::Globe {
                data,
                img_dir,
                background_dir,
                format,
                spin,
                preset,
            } => DemoOptions::Globe(GlobeOptions {
                img_dir,
                background_dir,
                data,
                format,
                spin,
                preset,
                ..Default::default()
            }),
            Command::Room { asset_dir } => DemoOptions::Room(RoomOptions { asset_dir }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("dataglobe").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn globe_defaults() {
        let cli = parse(&["globe"]);

        let DemoOptions::Globe(options) = cli.demo_options() else {
            panic!("expected globe options");
        };
        assert_eq!(options.img_dir, PathBuf::from("assets/img"));
        assert_eq!(options.format, DataFormat::Magnitude);
        assert!(!options.spin);
        assert_eq!(options.preset, None);
        assert!(cli.render_config().vsync);
    }

    #[test]
    fn globe_flags() {
        let cli = parse(&[
            "globe",
            "--data",
            "population.json",
            "--format",
            "legend",
            "--spin",
            "--preset",
            "1",
            "--no-vsync",
        ]);

        let DemoOptions::Globe(options) = cli.demo_options() else {
            panic!("expected globe options");
        };
        assert_eq!(options.data, Some(PathBuf::from("population.json")));
        assert_eq!(options.format, DataFormat::Legend);
        assert!(options.spin);
        assert_eq!(options.preset, Some(1));
        assert!(!cli.render_config().vsync);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let result = Cli::try_parse_from(["dataglobe", "globe", "--format", "heatmap"]);
        assert!(result.is_err());
    }

    #[test]
    fn room_asset_dir() {
        let cli = parse(&["room", "--asset-dir", "/tmp/room", "--no-background"]);

        assert!(matches!(
            cli.demo_options(),
            DemoOptions::Room(RoomOptions { asset_dir }) if asset_dir == PathBuf::from("/tmp/room")
        ));
        assert!(!cli.render_config().draw_background);
    }
}
