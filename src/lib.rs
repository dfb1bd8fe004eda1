pub mod board;
pub mod cli;
pub mod config;
pub mod corners;
pub mod detection;
pub mod error;
pub mod fen;
pub mod geometry;
pub mod grid;
pub mod transform;

pub use board::{assign_pieces, detect_board, Board, PieceDetection};
pub use cli::Cli;
pub use config::{BoardKind, DetectorConfig};
pub use corners::classify_corners;
pub use detection::{extract_board_outline, BoardOutline};
pub use error::{BoardError, CornerClassificationError, DetectionError, GridError};
pub use fen::{placement_to_fen, Fen, Piece, PieceKind, Side};
pub use geometry::{CornerSet, Point, Quadrant};
pub use grid::{index_squares, interpolate_lattice, LatticeGrid, Square, SquareMap};
pub use transform::{crop_square, crop_to_bounds, rectify_board, resize_to_width};
