use image::{Rgb, RgbImage};
use log::{debug, warn};

use crate::geometry::{perspective_matrix, transform_point, CornerSet};
use crate::grid::Square;

/// Unpack pixels into floating point channels for interpolation
fn to_channels(img: &RgbImage) -> Vec<[f64; 3]> {
    img.pixels()
        .map(|p| [p[0] as f64, p[1] as f64, p[2] as f64])
        .collect()
}

fn to_pixel(channels: [f64; 3]) -> Rgb<u8> {
    Rgb(channels.map(|c| c.round().clamp(0.0, 255.0) as u8))
}

/// Cubic interpolation kernel (Catmull-Rom)
fn cubic_weight(t: f64) -> [f64; 4] {
    let t2 = t * t;
    let t3 = t2 * t;

    [
        -0.5 * t3 + t2 - 0.5 * t,
        1.5 * t3 - 2.5 * t2 + 1.0,
        -1.5 * t3 + 2.0 * t2 + 0.5 * t,
        0.5 * t3 - 0.5 * t2,
    ]
}

/// Bicubic interpolation at a given position
fn bicubic_interpolate(channels: &[[f64; 3]], width: u32, height: u32, x: f64, y: f64) -> [f64; 3] {
    let x_floor = x.floor() as i32;
    let y_floor = y.floor() as i32;

    let wx = cubic_weight(x - x.floor());
    let wy = cubic_weight(y - y.floor());

    let mut result = [0.0; 3];

    for (j, weight_y) in wy.iter().enumerate() {
        for (i, weight_x) in wx.iter().enumerate() {
            let px = (x_floor + i as i32 - 1).clamp(0, width as i32 - 1) as u32;
            let py = (y_floor + j as i32 - 1).clamp(0, height as i32 - 1) as u32;
            let sample = channels[(py * width + px) as usize];

            let weight = weight_x * weight_y;
            for c in 0..3 {
                result[c] += sample[c] * weight;
            }
        }
    }

    result
}

/// Warp the board quadrilateral into an axis-aligned rectangle.
///
/// The rectangle takes the longer of each pair of opposing edges so the
/// foreshortened side is stretched rather than the near side shrunk. Output
/// pixels are filled by inverse mapping through the homography.
pub fn rectify_board(img: &RgbImage, corners: &CornerSet) -> RgbImage {
    let (src_width, src_height) = img.dimensions();
    let out_width = (corners.max_width().round() as u32).max(1);
    let out_height = (corners.max_height().round() as u32).max(1);

    let target = CornerSet::rectangle(out_width, out_height);

    // Output -> source, so every output pixel gets exactly one sample
    let inverse_matrix = match perspective_matrix(&target.to_array(), &corners.to_array()) {
        Some(m) => m,
        None => {
            warn!("Could not solve perspective transform for {:?}, returning original image", corners);
            return img.clone();
        }
    };

    debug!(
        "Rectify: {}x{} -> {}x{}",
        src_width, src_height, out_width, out_height
    );

    let channels = to_channels(img);
    let mut output = RgbImage::new(out_width, out_height);

    for (out_x, out_y, pixel) in output.enumerate_pixels_mut() {
        let (src_x, src_y) = transform_point(&inverse_matrix, out_x as f64, out_y as f64);

        if src_x >= -1.0
            && src_x <= src_width as f64
            && src_y >= -1.0
            && src_y <= src_height as f64
        {
            *pixel = to_pixel(bicubic_interpolate(
                &channels, src_width, src_height, src_x, src_y,
            ));
        }
    }

    output
}

/// Copy the region (x, y, width, height) out of an image, clamped to its extent
pub fn crop_to_bounds(img: &RgbImage, bounds: (u32, u32, u32, u32)) -> RgbImage {
    let (img_width, img_height) = img.dimensions();
    let (min_x, min_y, width, height) = bounds;

    let min_x = min_x.min(img_width);
    let min_y = min_y.min(img_height);
    let width = width.min(img_width - min_x);
    let height = height.min(img_height - min_y);

    let mut cropped = RgbImage::new(width, height);
    for (x, y, pixel) in cropped.enumerate_pixels_mut() {
        *pixel = *img.get_pixel(min_x + x, min_y + y);
    }

    cropped
}

/// Resize image so its width equals `target_width`, keeping the aspect ratio.
/// Uses bicubic interpolation.
pub fn resize_to_width(img: &RgbImage, target_width: u32) -> RgbImage {
    let (width, height) = img.dimensions();

    if width == 0 || height == 0 || width == target_width {
        return img.clone();
    }

    let scale = target_width as f64 / width as f64;
    let new_width = target_width.max(1);
    let new_height = ((height as f64 * scale).round() as u32).max(1);

    let channels = to_channels(img);
    let mut output = RgbImage::new(new_width, new_height);

    for (out_x, out_y, pixel) in output.enumerate_pixels_mut() {
        let src_x = (out_x as f64 + 0.5) / scale - 0.5;
        let src_y = (out_y as f64 + 0.5) / scale - 0.5;
        *pixel = to_pixel(bicubic_interpolate(&channels, width, height, src_x, src_y));
    }

    output
}

/// Cut out the axis-aligned region spanned by one square
pub fn crop_square(board: &RgbImage, square: &Square) -> RgbImage {
    let points = square.corners();
    let min_x = points.iter().map(|p| p.x).min().unwrap_or(0).max(0) as u32;
    let min_y = points.iter().map(|p| p.y).min().unwrap_or(0).max(0) as u32;
    let max_x = points.iter().map(|p| p.x).max().unwrap_or(0).max(0) as u32;
    let max_y = points.iter().map(|p| p.y).max().unwrap_or(0).max(0) as u32;

    crop_to_bounds(
        board,
        (min_x, min_y, max_x.saturating_sub(min_x), max_y.saturating_sub(min_y)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 3 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    #[test]
    fn test_rectify_identity() {
        let img = gradient(64, 48);
        let corners = CornerSet::rectangle(64, 48);
        let result = rectify_board(&img, &corners);

        assert_eq!(result.dimensions(), (64, 48));
        for (x, y, pixel) in result.enumerate_pixels() {
            assert_eq!(pixel, img.get_pixel(x, y), "pixel ({}, {})", x, y);
        }
    }

    #[test]
    fn test_rectify_size_uses_longer_edges() {
        let img = gradient(200, 200);
        let corners = CornerSet::new(
            Point::new(50, 20),
            Point::new(150, 20),
            Point::new(190, 180),
            Point::new(10, 180),
        );
        let result = rectify_board(&img, &corners);
        let side = (40.0f64 * 40.0 + 160.0 * 160.0).sqrt().round() as u32;
        assert_eq!(result.dimensions(), (180, side));
    }

    #[test]
    fn test_rectify_trapezoid_fills_output() {
        // Light trapezoid on a black background should rectify to all-light
        let mut img = RgbImage::from_pixel(200, 200, Rgb([0, 0, 0]));
        let corners = CornerSet::new(
            Point::new(60, 20),
            Point::new(140, 20),
            Point::new(180, 180),
            Point::new(20, 180),
        );
        for y in 20..=180u32 {
            let t = (y - 20) as f64 / 160.0;
            let left = 60.0 - 40.0 * t;
            let right = 140.0 + 40.0 * t;
            for x in (left.floor() as u32).saturating_sub(3)..=(right.ceil() as u32 + 3).min(199) {
                img.put_pixel(x, y, Rgb([220, 220, 220]));
            }
        }
        let result = rectify_board(&img, &corners);
        let (w, h) = result.dimensions();
        let center = result.get_pixel(w / 2, h / 2);
        assert!(center[0] > 200);
        let near_corner = result.get_pixel(2, 2);
        assert!(near_corner[0] > 150, "corner sample {:?}", near_corner);
    }

    #[test]
    fn test_crop_to_bounds_clamps() {
        let img = gradient(10, 10);
        let cropped = crop_to_bounds(&img, (6, 7, 10, 10));
        assert_eq!(cropped.dimensions(), (4, 3));
        assert_eq!(cropped.get_pixel(0, 0), img.get_pixel(6, 7));
    }

    #[test]
    fn test_resize_to_width_keeps_aspect() {
        let img = RgbImage::from_pixel(200, 100, Rgb([10, 200, 30]));
        let resized = resize_to_width(&img, 400);
        assert_eq!(resized.dimensions(), (400, 200));
        assert_eq!(*resized.get_pixel(123, 77), Rgb([10, 200, 30]));
    }

    #[test]
    fn test_crop_square() {
        let img = gradient(400, 400);
        let square = Square::new(
            10,
            Point::new(50, 50),
            Point::new(100, 50),
            Point::new(50, 100),
            Point::new(100, 100),
        );
        let tile = crop_square(&img, &square);
        assert_eq!(tile.dimensions(), (50, 50));
        assert_eq!(tile.get_pixel(0, 0), img.get_pixel(50, 50));
    }
}
