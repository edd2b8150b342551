use nalgebra::Point2;
use pointboard_core::{homography_from_4pt, BoardQuad, DegenerateReason, Homography};
use pointboard_detect::DetectedPoint;
use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationSet;
use crate::error::MapError;

/// Transform used to undo the camera's view of the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingModel {
    /// Inverse of the bilinear patch spanned by the four corners.
    #[default]
    Bilinear,
    /// Inverse of the homography taking the unit square onto the corners.
    /// Exact for a flat board seen through a pinhole camera.
    Projective,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperParams {
    pub model: MappingModel,
    /// Slack around `[0, 1]` before a point counts as outside the board.
    pub tolerance: f64,
}

impl Default for MapperParams {
    fn default() -> Self {
        Self {
            model: MappingModel::Bilinear,
            tolerance: 0.05,
        }
    }
}

/// Position in the board's own normalized frame: `u` along the top/bottom
/// edges, `v` along the left/right edges.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardLocation {
    pub u: f64,
    pub v: f64,
}

/// Mapping result for one detected point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "location", rename_all = "snake_case")]
pub enum Located {
    OnBoard(BoardLocation),
    /// Outside the tolerance-expanded unit square. Carries the unclamped
    /// solution, or `None` when the point has no preimage on the board plane.
    OutsideBoard(Option<BoardLocation>),
}

impl Located {
    pub fn on_board(&self) -> Option<&BoardLocation> {
        match self {
            Located::OnBoard(loc) => Some(loc),
            Located::OutsideBoard(_) => None,
        }
    }

    #[inline]
    pub fn is_on_board(&self) -> bool {
        matches!(self, Located::OnBoard(_))
    }
}

/// Maps normalized image points into board coordinates for one calibration.
#[derive(Clone, Debug)]
pub struct CoordinateMapper {
    quad: BoardQuad,
    params: MapperParams,
    board_from_img: Option<Homography>,
}

impl CoordinateMapper {
    pub fn new(quad: BoardQuad, params: MapperParams) -> Result<Self, MapError> {
        let board_from_img = match params.model {
            MappingModel::Bilinear => None,
            MappingModel::Projective => {
                let unit = [
                    Point2::new(0.0, 0.0),
                    Point2::new(1.0, 0.0),
                    Point2::new(0.0, 1.0),
                    Point2::new(1.0, 1.0),
                ];
                let h = homography_from_4pt(&unit, &quad.corners())
                    .and_then(|h| h.inverse())
                    .ok_or(MapError::Degenerate(DegenerateReason::Collinear))?;
                Some(h)
            }
        };
        Ok(Self {
            quad,
            params,
            board_from_img,
        })
    }

    /// Validate a calibration set and build a mapper for it.
    pub fn from_calibration(set: &CalibrationSet, params: MapperParams) -> Result<Self, MapError> {
        let corners = set
            .corners()
            .ok_or(MapError::Incomplete { captured: set.len() })?;
        Self::new(BoardQuad::from_corners(corners)?, params)
    }

    #[inline]
    pub fn quad(&self) -> &BoardQuad {
        &self.quad
    }

    #[inline]
    pub fn params(&self) -> &MapperParams {
        &self.params
    }

    pub fn locate(&self, point: &DetectedPoint) -> Located {
        self.locate_normalized(point.norm_x, point.norm_y)
    }

    /// Map a normalized image position `(x, y)`.
    pub fn locate_normalized(&self, x: f64, y: f64) -> Located {
        let p = Point2::new(x, y);
        let uv = match &self.board_from_img {
            Some(h) => h.apply(p),
            None => self.quad.inverse_bilinear(p),
        };
        let Some(uv) = uv.filter(|uv| uv.x.is_finite() && uv.y.is_finite()) else {
            return Located::OutsideBoard(None);
        };

        let loc = BoardLocation { u: uv.x, v: uv.y };
        let t = self.params.tolerance;
        let inside = |c: f64| (-t..=1.0 + t).contains(&c);
        if inside(loc.u) && inside(loc.v) {
            Located::OnBoard(loc)
        } else {
            Located::OutsideBoard(Some(loc))
        }
    }
}

/// Map one point through a calibration with default [`MapperParams`].
///
/// Incomplete or degenerate calibrations are reported as errors, never as a
/// coordinate.
pub fn locate(calibration: &CalibrationSet, point: &DetectedPoint) -> Result<Located, MapError> {
    let mapper = CoordinateMapper::from_calibration(calibration, MapperParams::default())?;
    Ok(mapper.locate(point))
}
