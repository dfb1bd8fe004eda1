use image::imageops::grayscale;
use image::{GrayImage, RgbImage};
use imageproc::contours::{find_contours, Contour};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::{approximate_polygon_dp, arc_length, convex_hull};
use imageproc::morphology::dilate;
use log::debug;

use crate::config::DetectorConfig;
use crate::error::DetectionError;
use crate::geometry::{polygon_area, Point};
use crate::transform::crop_to_bounds;

/// Result of the contour extraction stage
#[derive(Debug, Clone)]
pub struct BoardOutline {
    /// Bounding rectangle of the board contour (x, y, width, height)
    pub bounds: (u32, u32, u32, u32),
    /// Source image cropped to `bounds`
    pub crop: RgbImage,
    /// First four convex hull vertices, unordered, in source coordinates
    pub corners: [Point; 4],
    /// Area enclosed by the board contour
    pub area: f64,
}

impl BoardOutline {
    /// Corner candidates relative to the top-left of `crop`
    pub fn corners_in_crop(&self) -> [Point; 4] {
        let (x, y) = (self.bounds.0 as i32, self.bounds.1 as i32);
        self.corners.map(|p| p.offset(-x, -y))
    }
}

/// Blur, Otsu-binarize, edge-detect and dilate into a closed boundary map
fn boundary_map(gray: &GrayImage, config: &DetectorConfig) -> GrayImage {
    let blurred = if config.blur_sigma > 0.0 {
        gaussian_blur_f32(gray, config.blur_sigma)
    } else {
        gray.clone()
    };

    let level = otsu_level(&blurred);
    let binary = threshold(&blurred, level, ThresholdType::Binary);
    debug!("Otsu threshold level: {}", level);

    let edges = canny(&binary, config.canny_low, config.canny_high);
    if config.dilation_radius == 0 {
        return edges;
    }
    dilate(&edges, Norm::LInf, config.dilation_radius)
}

/// Bounding box of a contour as (x, y, width, height)
fn contour_bounds(points: &[Point]) -> (u32, u32, u32, u32) {
    let min_x = points.iter().map(|p| p.x).min().unwrap_or(0).max(0);
    let max_x = points.iter().map(|p| p.x).max().unwrap_or(0).max(0);
    let min_y = points.iter().map(|p| p.y).min().unwrap_or(0).max(0);
    let max_y = points.iter().map(|p| p.y).max().unwrap_or(0).max(0);

    (
        min_x as u32,
        min_y as u32,
        (max_x - min_x + 1) as u32,
        (max_y - min_y + 1) as u32,
    )
}

/// Pick the outer contour enclosing the largest area
fn largest_outer_contour(contours: &[Contour<i32>]) -> Option<(&Contour<i32>, f64)> {
    contours
        .iter()
        .filter(|c| c.parent.is_none())
        .map(|c| {
            let points: Vec<Point> = c.points.iter().copied().map(Point::from).collect();
            (c, polygon_area(&points))
        })
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
}

/// Locate the board's outer boundary.
///
/// The largest outer contour of the dilated edge map is taken to be the board.
/// Its polygon approximation (tolerance proportional to perimeter) is reduced
/// to a convex hull whose first four vertices are the corner candidates.
pub fn extract_board_outline(
    img: &RgbImage,
    config: &DetectorConfig,
) -> Result<BoardOutline, DetectionError> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(DetectionError::EmptyImage { width, height });
    }

    let gray = grayscale(img);
    let boundary = boundary_map(&gray, config);

    let contours = find_contours::<i32>(&boundary);
    debug!("Found {} contours", contours.len());

    let (contour, area) = largest_outer_contour(&contours).ok_or(DetectionError::NoContour)?;
    if contour.points.is_empty() {
        return Err(DetectionError::NoContour);
    }

    let points: Vec<Point> = contour.points.iter().copied().map(Point::from).collect();
    let bounds = contour_bounds(&points);
    debug!(
        "Largest contour: {} points, area {:.0}, bounds {:?}",
        points.len(),
        area,
        bounds
    );

    let epsilon = config.polygon_epsilon * arc_length(&contour.points, true);
    if points.len() < 4 || epsilon <= 0.0 {
        return Err(DetectionError::TooFewVertices {
            found: points.len(),
        });
    }
    let approx = approximate_polygon_dp(&contour.points, epsilon, true);
    let hull = convex_hull(approx.as_slice());
    debug!(
        "Polygon approximation: {} vertices, hull {} vertices (epsilon {:.1})",
        approx.len(),
        hull.len(),
        epsilon
    );

    if hull.len() < 4 {
        return Err(DetectionError::TooFewVertices { found: hull.len() });
    }

    let corners = [
        Point::from(hull[0]),
        Point::from(hull[1]),
        Point::from(hull[2]),
        Point::from(hull[3]),
    ];

    Ok(BoardOutline {
        bounds,
        crop: crop_to_bounds(img, bounds),
        corners,
        area,
    })
}
