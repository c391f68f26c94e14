//! Asymmetric circle-grid board model.

use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

/// Board-local 3D marker position (`z = 0`).
pub type ObjectPoint = Point3<f32>;

/// 2D correspondence in camera or projector pixels.
pub type ImagePoint = Point2<f32>;

/// Ordered marker positions for one pose, in the same order as the object points.
pub type ImagePointSet = Vec<ImagePoint>;

/// Board geometry validation errors.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum BoardError {
    #[error("marker rows and cols must be >= 1 (got {rows}x{cols})")]
    InvalidSize { rows: u32, cols: u32 },
    #[error("marker spacing must be finite and > 0 (got {0})")]
    InvalidSpacing(f32),
}

/// Physical layout of an asymmetric circle grid.
///
/// Row `r` is shifted by one spacing unit when `r` is odd, so marker `(r, c)`
/// sits at `((2c + r % 2) * spacing, r * spacing, 0)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBoardGeometry")]
pub struct BoardGeometry {
    marker_rows: u32,
    marker_cols: u32,
    marker_spacing: f32,
}

#[derive(Deserialize)]
struct RawBoardGeometry {
    marker_rows: u32,
    marker_cols: u32,
    marker_spacing: f32,
}

impl TryFrom<RawBoardGeometry> for BoardGeometry {
    type Error = BoardError;

    fn try_from(raw: RawBoardGeometry) -> Result<Self, Self::Error> {
        Self::new(raw.marker_rows, raw.marker_cols, raw.marker_spacing)
    }
}

/// The 4 x 11 grid with 0.5 unit spacing used by the reference rig.
impl Default for BoardGeometry {
    fn default() -> Self {
        Self {
            marker_rows: 4,
            marker_cols: 11,
            marker_spacing: 0.5,
        }
    }
}

impl BoardGeometry {
    /// Validate and create a board geometry.
    pub fn new(
        marker_rows: u32,
        marker_cols: u32,
        marker_spacing: f32,
    ) -> Result<Self, BoardError> {
        if marker_rows == 0 || marker_cols == 0 {
            return Err(BoardError::InvalidSize {
                rows: marker_rows,
                cols: marker_cols,
            });
        }
        if !marker_spacing.is_finite() || marker_spacing <= 0.0 {
            return Err(BoardError::InvalidSpacing(marker_spacing));
        }
        Ok(Self {
            marker_rows,
            marker_cols,
            marker_spacing,
        })
    }

    #[inline]
    pub fn marker_rows(&self) -> u32 {
        self.marker_rows
    }

    #[inline]
    pub fn marker_cols(&self) -> u32 {
        self.marker_cols
    }

    #[inline]
    pub fn marker_spacing(&self) -> f32 {
        self.marker_spacing
    }

    /// Number of markers a complete detection must contain.
    #[inline]
    pub fn marker_count(&self) -> usize {
        self.marker_rows as usize * self.marker_cols as usize
    }

    /// Object points in row-major scan order.
    ///
    /// The order matches the order in which a circle-grid detector reports
    /// marker centers; correspondences are only valid if both agree.
    pub fn object_points(&self) -> Vec<ObjectPoint> {
        let s = self.marker_spacing;
        let mut out = Vec::with_capacity(self.marker_count());
        for row in 0..self.marker_rows {
            for col in 0..self.marker_cols {
                out.push(Point3::new(
                    (2 * col + row % 2) as f32 * s,
                    row as f32 * s,
                    0.0,
                ));
            }
        }
        out
    }
}
