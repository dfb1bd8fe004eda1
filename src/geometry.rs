use std::fmt;

use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

/// Integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Scale both coordinates, rounding to the nearest pixel
    pub fn scaled(&self, sx: f64, sy: f64) -> Point {
        Point::new(
            (self.x as f64 * sx).round() as i32,
            (self.y as f64 * sy).round() as i32,
        )
    }
}

impl From<imageproc::point::Point<i32>> for Point {
    fn from(p: imageproc::point::Point<i32>) -> Self {
        Point::new(p.x, p.y)
    }
}

/// Role of a board corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Quadrant {
    /// Clockwise from top-left, the order a [`CornerSet`] stores its points in
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomRight,
        Quadrant::BottomLeft,
    ];

    pub fn from_halves(left: bool, top: bool) -> Self {
        match (left, top) {
            (true, true) => Quadrant::TopLeft,
            (false, true) => Quadrant::TopRight,
            (false, false) => Quadrant::BottomRight,
            (true, false) => Quadrant::BottomLeft,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Quadrant::TopLeft => "top-left",
            Quadrant::TopRight => "top-right",
            Quadrant::BottomRight => "bottom-right",
            Quadrant::BottomLeft => "bottom-left",
        };
        f.write_str(name)
    }
}

/// The four board corners, each with its quadrant role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CornerSet {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl CornerSet {
    pub fn new(top_left: Point, top_right: Point, bottom_right: Point, bottom_left: Point) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// Corners of an axis-aligned `width` x `height` rectangle at the origin
    pub fn rectangle(width: u32, height: u32) -> Self {
        let (w, h) = (width as i32, height as i32);
        Self::new(
            Point::new(0, 0),
            Point::new(w, 0),
            Point::new(w, h),
            Point::new(0, h),
        )
    }

    pub(crate) fn from_slots(slots: [Point; 4]) -> Self {
        Self::new(slots[0], slots[1], slots[2], slots[3])
    }

    pub fn get(&self, quadrant: Quadrant) -> Point {
        self.to_array()[quadrant.slot()]
    }

    /// Points in clockwise order starting at the top-left corner
    pub fn to_array(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Longer of the top and bottom edges
    pub fn max_width(&self) -> f64 {
        self.top_left
            .distance(&self.top_right)
            .max(self.bottom_left.distance(&self.bottom_right))
    }

    /// Longer of the left and right edges
    pub fn max_height(&self) -> f64 {
        self.top_left
            .distance(&self.bottom_left)
            .max(self.top_right.distance(&self.bottom_right))
    }
}

/// Solve for the projective transform mapping each `src[i]` onto `dst[i]`.
///
/// Uses the 8-unknown linear system with h33 fixed to 1. Returns `None` when
/// the correspondences are degenerate (three or more collinear points).
pub fn perspective_matrix(src: &[Point; 4], dst: &[Point; 4]) -> Option<Matrix3<f64>> {
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for k in 0..4 {
        let (x, y) = (src[k].x as f64, src[k].y as f64);
        let (u, v) = (dst[k].x as f64, dst[k].y as f64);

        // h11 x + h12 y + h13 - u h31 x - u h32 y = u
        let r0 = 2 * k;
        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        b[r0] = u;

        // h21 x + h22 y + h23 - v h31 x - v h32 y = v
        let r1 = 2 * k + 1;
        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        b[r1] = v;
    }

    let h = a.lu().solve(&b)?;
    if h.iter().any(|c| !c.is_finite()) {
        return None;
    }

    Some(Matrix3::new(
        h[0], h[1], h[2], //
        h[3], h[4], h[5], //
        h[6], h[7], 1.0,
    ))
}

/// Transform a point using a projective matrix
pub fn transform_point(matrix: &Matrix3<f64>, x: f64, y: f64) -> (f64, f64) {
    let p = Vector3::new(x, y, 1.0);
    let result = matrix * p;
    (result.x / result.z, result.y / result.z)
}

/// Shoelace area of a closed polygon
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();
    (twice as f64 / 2.0).abs()
}

/// Linear interpolation between two points at parameter `t` in [0, 1]
pub fn lerp(a: Point, b: Point, t: f64) -> (f64, f64) {
    (
        a.x as f64 + (b.x - a.x) as f64 * t,
        a.y as f64 + (b.y - a.y) as f64 * t,
    )
}
