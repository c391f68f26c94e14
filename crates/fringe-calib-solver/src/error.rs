/// Failures of the geometric estimation.
///
/// All of them are fatal for a calibration run.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("need at least {needed} views, got {got}")]
    TooFewViews { needed: usize, got: usize },
    #[error("view {view}: need at least 4 correspondences, got {got}")]
    TooFewPoints { view: usize, got: usize },
    #[error("view {view}: {object} object points but {image} image points")]
    LengthMismatch {
        view: usize,
        object: usize,
        image: usize,
    },
    #[error("{views} object point sets for {images} image point sets")]
    ViewCountMismatch { views: usize, images: usize },
    #[error("object points must lie on the z = 0 plane")]
    NonPlanarTarget,
    #[error("degenerate configuration: {0}")]
    Degenerate(&'static str),
}
