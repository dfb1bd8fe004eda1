use log::debug;

use crate::config::DetectorConfig;
use crate::error::CornerClassificationError;
use crate::geometry::{CornerSet, Point, Quadrant};

/// Place a point in a quadrant by comparing it against the split lines.
///
/// Returns `None` for points inside the dead band around either split.
fn quadrant_of(point: &Point, width: u32, height: u32, config: &DetectorConfig) -> Option<Quadrant> {
    let split_x = width as f64 * config.horizontal_split;
    let split_y = height as f64 * config.vertical_split;
    let band_x = width as f64 * config.split_dead_band;
    let band_y = height as f64 * config.split_dead_band;

    let (x, y) = (point.x as f64, point.y as f64);

    let left = if x < split_x - band_x {
        true
    } else if x >= split_x + band_x {
        false
    } else {
        return None;
    };

    let top = if y < split_y - band_y {
        true
    } else if y >= split_y + band_y {
        false
    } else {
        return None;
    };

    Some(Quadrant::from_halves(left, top))
}

/// Assign each corner candidate its quadrant role.
///
/// Every quadrant must receive exactly one candidate. The result does not
/// depend on the order of `candidates`.
pub fn classify_corners(
    candidates: &[Point; 4],
    width: u32,
    height: u32,
    config: &DetectorConfig,
) -> Result<CornerSet, CornerClassificationError> {
    let mut slots: [Option<Point>; 4] = [None; 4];
    let mut counts = [0usize; 4];

    for candidate in candidates {
        let quadrant = quadrant_of(candidate, width, height, config)
            .ok_or(CornerClassificationError::Unassigned(*candidate))?;
        let slot = quadrant as usize;
        counts[slot] += 1;
        slots[slot] = Some(*candidate);
    }

    for quadrant in Quadrant::ALL {
        match counts[quadrant as usize] {
            0 => return Err(CornerClassificationError::Missing(quadrant)),
            1 => {}
            n => return Err(CornerClassificationError::Ambiguous(quadrant, n)),
        }
    }

    let mut ordered = [Point::default(); 4];
    for ((dst, slot), quadrant) in ordered.iter_mut().zip(slots).zip(Quadrant::ALL) {
        *dst = slot.ok_or(CornerClassificationError::Missing(quadrant))?;
    }

    let corners = CornerSet::from_slots(ordered);
    debug!("Classified corners in {}x{}: {:?}", width, height, corners);
    Ok(corners)
}
