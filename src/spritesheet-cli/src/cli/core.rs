//! Core CLI definitions

use clap::{Parser, Subcommand};
use image::Rgba;
use spritesheet::SpriteSize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "spritesheet")]
#[command(about = "Sprite atlas export, packing and extraction", long_about = None)]
pub struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode the binary atlas into spritesheet.json
    #[command(visible_alias = "e")]
    Export {
        /// Binary atlas (uses configured path, then spritesheetf.bin)
        #[arg(short, long, env = "SPRITE_SHEET_BIN")]
        input: Option<PathBuf>,

        /// JSON array of sheet names to keep (missing file keeps every sheet)
        #[arg(short, long, env = "SPRITE_MAP_REQUIREMENTS")]
        requirements: Option<PathBuf>,

        /// Output JSON (default: spritesheet.json in the output directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only keep sprites of this exact size, e.g. 8x8
        #[arg(long, value_parser = parse_sprite_size)]
        sprite_size: Option<SpriteSize>,
    },

    /// Pack a directory of PNGs into sheets and a JSON index
    #[command(visible_alias = "p")]
    Pack {
        /// Directory containing <id>.png images
        #[arg(short, long, default_value = "img")]
        input: PathBuf,

        /// Directory to write sheets and JSON (uses configured output dir)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Base name for output files
        #[arg(long, default_value = "spritesheet")]
        basename: String,

        /// Max width/height of a sheet; 4096 for older GPUs
        #[arg(long, default_value_t = 8192)]
        max_size: u32,

        /// Pixels between sprites
        #[arg(long, default_value_t = 1)]
        padding: u32,

        /// Background as #RRGGBB or #RRGGBBAA
        #[arg(long, default_value = "#00000000", value_parser = parse_background)]
        background: Rgba<u8>,

        /// Fail if the sprites do not fit on one sheet
        #[arg(long)]
        single_sheet: bool,

        /// Also scan subdirectories of the input
        #[arg(short = 'R', long)]
        recursive: bool,
    },

    /// Crop every frame of an exported atlas out of a sheet image
    #[command(visible_alias = "x")]
    Extract {
        /// Exported spritesheet.json
        #[arg(env = "SPRITE_SHEET_JSON")]
        json: PathBuf,

        /// Sheet image the positions refer to
        sheet_image: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "output_sprites")]
        output: PathBuf,

        /// Only extract the sheet with this name
        #[arg(long)]
        sheet: Option<String>,
    },

    /// Summarize an exported atlas per atlas id
    Stats {
        /// Exported spritesheet.json
        #[arg(
            value_name = "JSON",
            env = "SPRITE_SHEET_JSON",
            default_value = spritesheet::DEFAULT_EXPORT_FILE
        )]
        input: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set the default binary atlas
        #[arg(long)]
        sprite_sheet_bin: Option<PathBuf>,

        /// Set the default requirements file
        #[arg(long)]
        requirements: Option<PathBuf>,

        /// Set the default output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

fn parse_background(s: &str) -> Result<Rgba<u8>, String> {
    spritesheet::parse_background(s).map_err(|e| e.to_string())
}

fn parse_sprite_size(s: &str) -> Result<SpriteSize, String> {
    SpriteSize::parse(s).ok_or_else(|| format!("expected WxH (e.g. 8x8), got '{s}'"))
}
