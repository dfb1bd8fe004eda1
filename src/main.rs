use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use image::ImageReader;
use log::LevelFilter;

use chessboard_grid::{detect_board, Board, Cli, DetectorConfig};

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn process(cli: &Cli, config: &DetectorConfig, input: &Path) -> Result<Board> {
    let img = ImageReader::open(input)
        .with_context(|| format!("Failed to open input file: {:?}", input))?
        .decode()
        .with_context(|| format!("Failed to decode image: {:?}", input))?;

    if cli.verbose {
        eprintln!("Loaded image: {:?} ({}x{})", input, img.width(), img.height());
    }

    let board = detect_board(&img, config)
        .with_context(|| format!("Failed to detect board in {:?}", input))?;

    let output_path = cli.output_path(input, "board");
    board
        .image
        .save(&output_path)
        .with_context(|| format!("Failed to save output: {:?}", output_path))?;
    eprintln!("Saved board image: {:?}", output_path);

    if cli.dump_squares {
        for square in board.squares.iter() {
            let tile = square_tile(&board, square.index)?;
            let tile_path = cli.output_path(input, &format!("sq{:02}", square.index));
            tile.save(&tile_path)
                .with_context(|| format!("Failed to save square: {:?}", tile_path))?;
        }
        eprintln!("Saved {} square images", board.squares.len());
    }

    if cli.verbose {
        let c = &board.corners;
        eprintln!(
            "Corners: tl=({}, {}) tr=({}, {}) br=({}, {}) bl=({}, {})",
            c.top_left.x,
            c.top_left.y,
            c.top_right.x,
            c.top_right.y,
            c.bottom_right.x,
            c.bottom_right.y,
            c.bottom_left.x,
            c.bottom_left.y
        );
        for square in board.squares.iter() {
            eprintln!(
                "  {:2} {}  tl=({:4}, {:4}) br=({:4}, {:4})",
                square.index,
                square.name(),
                square.top_left.x,
                square.top_left.y,
                square.bottom_right.x,
                square.bottom_right.y
            );
        }
        eprintln!();
    }

    if !board.degenerate_rows.is_empty() {
        eprintln!(
            "Warning: lattice rows {:?} were too narrow, grid is approximate",
            board.degenerate_rows
        );
    }

    Ok(board)
}

fn square_tile(board: &Board, index: usize) -> Result<image::RgbImage> {
    board
        .square_image(index)
        .with_context(|| format!("Square {} missing from board", index))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    cli.ensure_output_dir()
        .with_context(|| format!("Failed to create output directory: {:?}", cli.output_dir))?;

    let config = cli.detector_config();
    if cli.verbose {
        eprintln!("Detector config: {:?}", config);
        eprintln!();
    }

    let mut failed = 0;
    for input in &cli.inputs {
        // A bad image is skipped, the rest of the batch still runs
        if let Err(err) = process(&cli, &config, input) {
            eprintln!("Skipping {:?}: {:#}", input, err);
            failed += 1;
        }
    }

    if failed == cli.inputs.len() {
        bail!("All {} input(s) failed", failed);
    }

    eprintln!(
        "Processed {} image(s), {} failed",
        cli.inputs.len(),
        failed
    );

    Ok(())
}
