use std::collections::BTreeMap;

use image::{DynamicImage, RgbImage};
use log::{debug, warn};

use crate::config::{BoardKind, DetectorConfig};
use crate::corners::classify_corners;
use crate::detection::extract_board_outline;
use crate::error::BoardError;
use crate::fen::Piece;
use crate::geometry::CornerSet;
use crate::grid::{index_squares, interpolate_lattice, Square, SquareMap};
use crate::transform::{crop_square, rectify_board, resize_to_width};

/// A located board split into 64 squares
#[derive(Debug, Clone)]
pub struct Board {
    /// Cropped (and for physical boards, rectified) board image
    pub image: RgbImage,
    /// Detected board corners, in the coordinates of the cropped working image
    pub corners: CornerSet,
    /// Squares 1..=64, coordinates relative to `image`
    pub squares: SquareMap,
    /// Lattice rows whose column step had to be clamped
    pub degenerate_rows: Vec<usize>,
}

impl Board {
    pub fn square(&self, index: usize) -> Option<&Square> {
        self.squares.get(index)
    }

    /// Index of the square containing a point of `image`
    pub fn locate(&self, x: f64, y: f64) -> Option<usize> {
        self.squares.locate(x, y)
    }

    pub fn square_image(&self, index: usize) -> Option<RgbImage> {
        self.squares
            .get(index)
            .map(|square| crop_square(&self.image, square))
    }
}

/// One piece reported by an external classifier, in board image coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceDetection {
    pub center: (f64, f64),
    pub piece: Piece,
}

/// Map each detection to the square containing its center.
///
/// Detections outside every square are dropped. When two detections share a
/// square the later one wins.
pub fn assign_pieces(squares: &SquareMap, detections: &[PieceDetection]) -> BTreeMap<usize, Piece> {
    let mut placement = BTreeMap::new();

    for detection in detections {
        let (x, y) = detection.center;
        match squares.locate(x, y) {
            Some(index) => {
                if placement.insert(index, detection.piece).is_some() {
                    debug!("Square {} reported twice, keeping the later detection", index);
                }
            }
            None => warn!(
                "Detection {:?} at ({:.1}, {:.1}) is outside the board",
                detection.piece, x, y
            ),
        }
    }

    placement
}

/// Locate the board in an image and split it into indexed squares.
///
/// The board is cropped to its outline and resized to the configured working
/// width before its corners are classified. Physical boards are rectified to
/// an axis-aligned rectangle before the lattice is interpolated.
pub fn detect_board(img: &DynamicImage, config: &DetectorConfig) -> Result<Board, BoardError> {
    let rgb = img.to_rgb8();
    let outline = extract_board_outline(&rgb, config)?;

    let (crop_width, crop_height) = outline.crop.dimensions();
    let working = resize_to_width(&outline.crop, config.working_width);
    let (width, height) = working.dimensions();

    let scale_x = width as f64 / crop_width as f64;
    let scale_y = height as f64 / crop_height as f64;
    let candidates = outline.corners_in_crop().map(|p| p.scaled(scale_x, scale_y));
    debug!(
        "Working image {}x{} (crop {}x{}), corner candidates {:?}",
        width, height, crop_width, crop_height, candidates
    );

    let corners = classify_corners(&candidates, width, height, config)?;

    let (image, grid_corners) = match config.kind {
        BoardKind::Digital => (working, corners),
        BoardKind::Physical => {
            let rectified = rectify_board(&working, &corners);
            let (w, h) = rectified.dimensions();
            (rectified, CornerSet::rectangle(w, h))
        }
    };

    let lattice = interpolate_lattice(&image, &grid_corners, config.snap_margin);
    let squares = index_squares(&lattice)?;

    Ok(Board {
        image,
        corners,
        squares,
        degenerate_rows: lattice.degenerate_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DetectionError;
    use crate::fen::{PieceKind, Side};
    use crate::geometry::Point;
    use image::Rgb;

    /// Framed checkerboard on a dark table
    fn synthetic_board(size: u32, margin: u32, frame: u32) -> DynamicImage {
        let mut img = RgbImage::from_pixel(size, size, Rgb([25, 25, 25]));
        let inner = size - 2 * (margin + frame);
        let cell = inner / 8;

        for y in margin..size - margin {
            for x in margin..size - margin {
                img.put_pixel(x, y, Rgb([235, 230, 220]));
            }
        }
        for y in 0..inner {
            for x in 0..inner {
                if ((x / cell) + (y / cell)) % 2 == 1 {
                    let px = margin + frame + x;
                    let py = margin + frame + y;
                    img.put_pixel(px, py, Rgb([90, 60, 40]));
                }
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    fn assert_near_equal_areas(squares: &SquareMap) {
        let areas: Vec<f64> = squares.iter().map(Square::area).collect();
        let mean = areas.iter().sum::<f64>() / areas.len() as f64;
        for (i, area) in areas.iter().enumerate() {
            assert!(
                (area - mean).abs() / mean <= 0.05,
                "square {} area {} deviates from mean {}",
                i + 1,
                area,
                mean
            );
        }
    }

    #[test]
    fn test_digital_board() {
        let img = synthetic_board(500, 80, 10);
        let board = detect_board(&img, &DetectorConfig::default()).unwrap();

        assert_eq!(board.image.width(), 400);
        assert_eq!(board.squares.len(), 64);
        assert!(board.degenerate_rows.is_empty());
        assert_near_equal_areas(&board.squares);

        let first = board.square(1).unwrap();
        let last = board.square(64).unwrap();
        assert!(first.top_left.x < last.top_left.x);
        assert!(first.top_left.y < last.top_left.y);
    }

    #[test]
    fn test_physical_board() {
        let img = synthetic_board(500, 80, 10);
        let board = detect_board(&img, &DetectorConfig::physical()).unwrap();

        assert_eq!(board.squares.len(), 64);
        assert_near_equal_areas(&board.squares);
        let (w, h) = board.image.dimensions();
        assert_eq!(board.square(64).unwrap().bottom_right, Point::new(w as i32, h as i32));
    }

    /// Light board seen at an angle: narrow far edge, wide near edge
    fn synthetic_trapezoid() -> DynamicImage {
        let mut img = RgbImage::from_pixel(500, 500, Rgb([25, 25, 25]));
        for y in 100..400u32 {
            let t = (y - 100) as f64 / 300.0;
            let left = (180.0 - 80.0 * t).round() as u32;
            let right = (320.0 + 80.0 * t).round() as u32;
            for x in left..right {
                img.put_pixel(x, y, Rgb([235, 230, 220]));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_digital_trapezoid_board() {
        let img = synthetic_trapezoid();
        let board = detect_board(&img, &DetectorConfig::default()).unwrap();
        assert_eq!(board.squares.len(), 64);

        let widths: Vec<f64> = (0..8)
            .map(|row| board.square(row * 8 + 1).unwrap().width())
            .collect();
        for pair in widths.windows(2) {
            assert!(pair[1] > pair[0], "widths not increasing: {:?}", widths);
        }
        assert!(board.square(1).unwrap().top_left.x > board.square(57).unwrap().top_left.x);
    }

    #[test]
    fn test_physical_trapezoid_board() {
        let img = synthetic_trapezoid();
        let board = detect_board(&img, &DetectorConfig::physical()).unwrap();
        assert_eq!(board.squares.len(), 64);
        assert_near_equal_areas(&board.squares);
    }

    #[test]
    fn test_blank_image_fails() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 200, Rgb([90, 90, 90])));
        let err = detect_board(&img, &DetectorConfig::default()).unwrap_err();
        assert!(matches!(err, BoardError::Detection(DetectionError::NoContour)));
    }

    #[test]
    fn test_square_image() {
        let img = synthetic_board(500, 80, 10);
        let board = detect_board(&img, &DetectorConfig::default()).unwrap();
        let tile = board.square_image(10).unwrap();
        let square = board.square(10).unwrap();
        assert_eq!(tile.width() as f64, square.width().round());
        assert!(board.square_image(65).is_none());
    }

    #[test]
    fn test_assign_pieces() {
        let img = synthetic_board(500, 80, 10);
        let board = detect_board(&img, &DetectorConfig::default()).unwrap();
        let center = |index: usize| {
            let s = board.square(index).unwrap();
            (
                (s.top_left.x + s.bottom_right.x) as f64 / 2.0,
                (s.top_left.y + s.bottom_right.y) as f64 / 2.0,
            )
        };

        let detections = [
            PieceDetection {
                center: center(5),
                piece: Piece::new(Side::Black, PieceKind::King),
            },
            PieceDetection {
                center: center(61),
                piece: Piece::new(Side::White, PieceKind::King),
            },
            PieceDetection {
                center: (-50.0, -50.0),
                piece: Piece::new(Side::White, PieceKind::Queen),
            },
        ];

        let placement = assign_pieces(&board.squares, &detections);
        assert_eq!(placement.len(), 2);
        assert_eq!(placement[&5].kind, PieceKind::King);
        assert_eq!(placement[&61].side, Side::White);
    }
}
