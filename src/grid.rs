use image::RgbImage;
use log::{debug, warn};

use crate::error::GridError;
use crate::geometry::{lerp, polygon_area, CornerSet, Point};

/// Lines per side of the board grid (8 squares need 9 lines)
pub const LATTICE_SIZE: usize = 9;
/// Squares per side of the board
pub const BOARD_SIZE: usize = LATTICE_SIZE - 1;
pub const SQUARE_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// 9x9 interpolated grid-line intersections, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeGrid {
    points: Vec<Point>,
    /// Rows whose column step collapsed below one pixel and was clamped
    pub degenerate_rows: Vec<usize>,
}

impl LatticeGrid {
    pub fn from_points(points: Vec<Point>) -> Result<Self, GridError> {
        if points.len() != LATTICE_SIZE * LATTICE_SIZE {
            return Err(GridError::LatticeSize {
                found: points.len(),
            });
        }
        Ok(Self {
            points,
            degenerate_rows: Vec::new(),
        })
    }

    pub fn at(&self, row: usize, col: usize) -> Option<Point> {
        if row >= LATTICE_SIZE || col >= LATTICE_SIZE {
            return None;
        }
        self.points.get(row * LATTICE_SIZE + col).copied()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Pull side corners onto the image edge when they sit within the margin
fn snap_to_edges(corners: &CornerSet, width: u32, snap_margin: f64) -> CornerSet {
    let margin = width as f64 * snap_margin;
    let right_edge = width as i32;

    let snap_left = |p: Point| {
        if (p.x as f64) <= margin {
            Point::new(0, p.y)
        } else {
            p
        }
    };
    let snap_right = |p: Point| {
        if ((right_edge - p.x) as f64) <= margin {
            Point::new(right_edge, p.y)
        } else {
            p
        }
    };

    CornerSet::new(
        snap_left(corners.top_left),
        snap_right(corners.top_right),
        snap_right(corners.bottom_right),
        snap_left(corners.bottom_left),
    )
}

/// Interpolate the board-line intersections from the two side edges.
///
/// The left (top-left to bottom-left) and right (top-right to bottom-right)
/// edges are each sampled at nine evenly spaced points. Nine rows span the
/// image height; each row gets nine columns spaced evenly between the left
/// and right edge at that row.
pub fn interpolate_lattice(board: &RgbImage, corners: &CornerSet, snap_margin: f64) -> LatticeGrid {
    let (width, height) = board.dimensions();
    let edges = snap_to_edges(corners, width, snap_margin);
    let steps = BOARD_SIZE as f64;

    let mut points = Vec::with_capacity(LATTICE_SIZE * LATTICE_SIZE);
    let mut degenerate_rows = Vec::new();

    for row in 0..LATTICE_SIZE {
        let t = row as f64 / steps;
        let y = (t * height as f64).round() as i32;
        let (left_x, _) = lerp(edges.top_left, edges.bottom_left, t);
        let (right_x, _) = lerp(edges.top_right, edges.bottom_right, t);

        let mut step_x = (right_x - left_x) / steps;
        if step_x < 1.0 {
            warn!(
                "Degenerate lattice row {}: span {:.1}px between x={:.1} and x={:.1}, clamping step to 1",
                row,
                right_x - left_x,
                left_x,
                right_x
            );
            degenerate_rows.push(row);
            step_x = 1.0;
        }

        for col in 0..LATTICE_SIZE {
            let x = (left_x + col as f64 * step_x).round() as i32;
            points.push(Point::new(x, y));
        }
    }

    debug!(
        "Interpolated {} lattice points over {}x{} ({} degenerate rows)",
        points.len(),
        width,
        height,
        degenerate_rows.len()
    );

    LatticeGrid {
        points,
        degenerate_rows,
    }
}

/// One board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Square {
    /// 1 = a8 (top-left) .. 64 = h1 (bottom-right)
    pub index: usize,
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_left: Point,
    pub bottom_right: Point,
}

impl Square {
    pub fn new(
        index: usize,
        top_left: Point,
        top_right: Point,
        bottom_left: Point,
        bottom_right: Point,
    ) -> Self {
        Self {
            index,
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        }
    }

    /// Corners in clockwise order from the top-left
    pub fn corners(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    pub fn width(&self) -> f64 {
        self.top_left.distance(&self.top_right)
    }

    pub fn height(&self) -> f64 {
        self.top_left.distance(&self.bottom_left)
    }

    pub fn area(&self) -> f64 {
        polygon_area(&self.corners())
    }

    /// Algebraic name, e.g. "a8" for index 1 and "h1" for index 64
    pub fn name(&self) -> String {
        square_name(self.index)
    }

    /// Inclusive containment test for the (convex) square quadrilateral
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let corners = self.corners();
        let mut has_positive = false;
        let mut has_negative = false;

        for (a, b) in corners.iter().zip(corners.iter().cycle().skip(1)) {
            let cross = (b.x - a.x) as f64 * (y - a.y as f64) - (b.y - a.y) as f64 * (x - a.x as f64);
            if cross > 0.0 {
                has_positive = true;
            } else if cross < 0.0 {
                has_negative = true;
            }
        }

        !(has_positive && has_negative)
    }
}

/// Algebraic name of a 1-based square index
pub fn square_name(index: usize) -> String {
    let zero = index.saturating_sub(1);
    let file = (b'a' + (zero % BOARD_SIZE) as u8) as char;
    let rank = BOARD_SIZE - zero / BOARD_SIZE;
    format!("{}{}", file, rank)
}

/// The 64 board squares, addressed by index 1..=64
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquareMap {
    squares: Vec<Square>,
}

impl SquareMap {
    pub fn get(&self, index: usize) -> Option<&Square> {
        index.checked_sub(1).and_then(|i| self.squares.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Square> {
        self.squares.iter()
    }

    pub fn len(&self) -> usize {
        self.squares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }

    /// Index of the first square whose quadrilateral contains the point
    pub fn locate(&self, x: f64, y: f64) -> Option<usize> {
        self.squares
            .iter()
            .find(|square| square.contains(x, y))
            .map(|square| square.index)
    }
}

/// Carve the lattice into 64 squares, indexed row-major from the top-left.
///
/// Square (row, col) is bounded by lattice points (row, col), (row, col + 1),
/// (row + 1, col) and (row + 1, col + 1).
pub fn index_squares(lattice: &LatticeGrid) -> Result<SquareMap, GridError> {
    if lattice.len() != LATTICE_SIZE * LATTICE_SIZE {
        return Err(GridError::LatticeSize {
            found: lattice.len(),
        });
    }

    let mut squares = Vec::with_capacity(SQUARE_COUNT);
    for row in 0..BOARD_SIZE {
        for col in 0..BOARD_SIZE {
            let corner = |r: usize, c: usize| {
                lattice.at(r, c).ok_or(GridError::LatticeSize {
                    found: lattice.len(),
                })
            };
            squares.push(Square::new(
                squares.len() + 1,
                corner(row, col)?,
                corner(row, col + 1)?,
                corner(row + 1, col)?,
                corner(row + 1, col + 1)?,
            ));
        }
    }

    if squares.len() != SQUARE_COUNT {
        return Err(GridError::SquareCount {
            found: squares.len(),
        });
    }

    Ok(SquareMap { squares })
}
