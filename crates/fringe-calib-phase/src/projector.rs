//! Camera pixel to projector pixel mapping from two unwrapped phase maps.

use fringe_calib_core::{ImagePoint, ImagePointSet, ImageSize};
use nalgebra::Point2;

use crate::{FringeOrientation, UnwrapError, UnwrappedPhaseMap};

/// Pair of unwrapped maps, one per orientation, over the same camera image.
///
/// The horizontal map yields the projector column, the vertical map the row.
#[derive(Clone, Debug)]
pub struct ProjectorMap {
    horizontal: UnwrappedPhaseMap,
    vertical: UnwrappedPhaseMap,
}

impl ProjectorMap {
    pub fn new(
        horizontal: UnwrappedPhaseMap,
        vertical: UnwrappedPhaseMap,
    ) -> Result<Self, UnwrapError> {
        if horizontal.orientation != FringeOrientation::Horizontal {
            return Err(UnwrapError::WrongOrientation {
                expected: FringeOrientation::Horizontal,
                got: horizontal.orientation,
            });
        }
        if vertical.orientation != FringeOrientation::Vertical {
            return Err(UnwrapError::WrongOrientation {
                expected: FringeOrientation::Vertical,
                got: vertical.orientation,
            });
        }
        if horizontal.size() != vertical.size() {
            return Err(UnwrapError::SizeMismatch {
                short: horizontal.size(),
                long: vertical.size(),
            });
        }
        Ok(Self {
            horizontal,
            vertical,
        })
    }

    /// Camera image size both maps cover.
    pub fn camera_size(&self) -> ImageSize {
        self.horizontal.size()
    }

    pub fn horizontal(&self) -> &UnwrappedPhaseMap {
        &self.horizontal
    }

    pub fn vertical(&self) -> &UnwrappedPhaseMap {
        &self.vertical
    }

    /// Projector pixel seen at a sub-pixel camera position, or `None` when
    /// either map has no valid phase around it.
    pub fn map_point(&self, camera: ImagePoint) -> Option<ImagePoint> {
        let u = self.horizontal.sample_coordinate(camera.x, camera.y)?;
        let v = self.vertical.sample_coordinate(camera.x, camera.y)?;
        Some(Point2::new(u, v))
    }

    /// Map every point; a single invalid sample discards the whole set.
    pub fn map_points(&self, camera: &[ImagePoint]) -> Option<ImagePointSet> {
        camera.iter().map(|&p| self.map_point(p)).collect()
    }
}
