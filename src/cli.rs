use clap::Parser;
use std::path::{Path, PathBuf};

use crate::config::{BoardKind, DetectorConfig};

#[derive(Parser, Debug)]
#[command(name = "chessboard-grid")]
#[command(version, about = "Locate a chessboard in an image and split it into 64 squares")]
pub struct Cli {
    /// Input image paths
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output directory [default: next to each input]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Photo of a physical board: rectify perspective before gridding
    #[arg(long)]
    pub physical: bool,

    /// Width the cropped board is resized to
    #[arg(short, long, default_value = "400", value_parser = parse_width)]
    pub width: u32,

    /// Also save each of the 64 squares as its own image
    #[arg(long)]
    pub dump_squares: bool,

    /// Show detection details
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            kind: if self.physical {
                BoardKind::Physical
            } else {
                BoardKind::Digital
            },
            working_width: self.width,
            ..DetectorConfig::default()
        }
    }

    /// Create the output directory, if one was given, before anything is saved
    pub fn ensure_output_dir(&self) -> std::io::Result<()> {
        match &self.output_dir {
            Some(dir) => std::fs::create_dir_all(dir),
            None => Ok(()),
        }
    }

    /// Path for an output derived from `input`, e.g. `<stem>_board.png`
    pub fn output_path(&self, input: &Path, suffix: &str) -> PathBuf {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        let parent = self
            .output_dir
            .as_deref()
            .unwrap_or_else(|| input.parent().unwrap_or(Path::new(".")));
        parent.join(format!("{}_{}.png", stem, suffix))
    }
}

fn parse_width(s: &str) -> Result<u32, String> {
    let width: u32 = s
        .parse()
        .map_err(|_| format!("Invalid width: {}", s))?;

    if width < 8 {
        return Err("Width must be at least 8 pixels".to_string());
    }

    Ok(width)
}
