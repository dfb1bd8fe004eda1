/// How the board was captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardKind {
    /// Screenshot of an on-screen board: already axis-aligned, no warp
    #[default]
    Digital,
    /// Photo of a physical board: perspective-rectified before gridding
    Physical,
}

/// Tunable constants for one detection run.
///
/// Anything that was a pixel count in a fixed capture setup is expressed as a
/// fraction of the current image size so the pipeline is resolution independent.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub kind: BoardKind,
    /// Gaussian sigma applied before thresholding
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Chebyshev radius of the dilation that closes gaps in the edge map
    pub dilation_radius: u8,
    /// Polygon simplification tolerance as a fraction of contour perimeter
    pub polygon_epsilon: f64,
    /// Width the cropped board is resized to before gridding
    pub working_width: u32,
    /// A corner is "left" if x < width * horizontal_split
    pub horizontal_split: f64,
    /// A corner is "top" if y < height * vertical_split
    pub vertical_split: f64,
    /// Half-width of the band around each split line, as a fraction of the
    /// image dimension, in which a corner is considered unclassifiable
    pub split_dead_band: f64,
    /// Fraction of width within which side corners snap to the image edge
    pub snap_margin: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            kind: BoardKind::Digital,
            blur_sigma: 1.1,
            canny_low: 100.0,
            canny_high: 200.0,
            dilation_radius: 1,
            polygon_epsilon: 0.03,
            working_width: 400,
            horizontal_split: 0.5,
            vertical_split: 0.5,
            split_dead_band: 0.0,
            snap_margin: 0.1,
        }
    }
}

impl DetectorConfig {
    pub fn physical() -> Self {
        Self {
            kind: BoardKind::Physical,
            ..Self::default()
        }
    }
}
