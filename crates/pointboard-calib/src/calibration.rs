use std::fmt;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::CalibrationError;

/// Board corners in capture order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Capture order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Corner> {
        Self::ALL.get(i).copied()
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Corner::TopLeft => "top-left",
            Corner::TopRight => "top-right",
            Corner::BottomLeft => "bottom-left",
            Corner::BottomRight => "bottom-right",
        })
    }
}

/// One captured corner, in normalized frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    pub x: f64,
    pub y: f64,
}

impl CalibrationPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn to_point(self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

/// Up to four captured corners, always in [`Corner::ALL`] order.
///
/// Serialized as a plain JSON array of points; deserializing more than four
/// points fails.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CalibrationPoint>", into = "Vec<CalibrationPoint>")]
pub struct CalibrationSet {
    points: Vec<CalibrationPoint>,
}

impl CalibrationSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.points.len() == 4
    }

    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    pub fn get(&self, corner: Corner) -> Option<CalibrationPoint> {
        self.points.get(corner.index()).copied()
    }

    /// The corner the next capture fills, `None` once complete.
    pub fn next_corner(&self) -> Option<Corner> {
        Corner::from_index(self.points.len())
    }

    /// Corners as `[TL, TR, BL, BR]` when complete.
    pub fn corners(&self) -> Option<[Point2<f64>; 4]> {
        match self.points.as_slice() {
            [tl, tr, bl, br] => Some([tl.to_point(), tr.to_point(), bl.to_point(), br.to_point()]),
            _ => None,
        }
    }

    pub(crate) fn as_points(&self) -> Vec<Point2<f64>> {
        self.points.iter().map(|p| p.to_point()).collect()
    }

    pub(crate) fn push(&mut self, point: CalibrationPoint) {
        debug_assert!(self.points.len() < 4);
        self.points.push(point);
    }

    pub(crate) fn clear(&mut self) {
        self.points.clear();
    }
}

impl TryFrom<Vec<CalibrationPoint>> for CalibrationSet {
    type Error = CalibrationError;

    fn try_from(points: Vec<CalibrationPoint>) -> Result<Self, Self::Error> {
        if points.len() > 4 {
            return Err(CalibrationError::TooManyCorners { got: points.len() });
        }
        Ok(Self { points })
    }
}

impl From<CalibrationSet> for Vec<CalibrationPoint> {
    fn from(set: CalibrationSet) -> Self {
        set.points
    }
}
