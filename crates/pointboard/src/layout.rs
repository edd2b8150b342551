//! Board layouts: from a normalized board location to the symbol under it.

use pointboard_calib::BoardLocation;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("grid layout needs at least one row and one column (got {rows}x{cols})")]
    EmptyGrid { rows: usize, cols: usize },
    #[error("grid layout has {expected} cells but {got} labels")]
    LabelCount { expected: usize, got: usize },
}

/// One addressable region of the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Resolves board locations to cells.
pub trait BoardLayout {
    /// `None` when the location lies outside `[0, 1]^2`.
    fn cell_at(&self, location: &BoardLocation) -> Option<Cell>;
}

/// Uniform `rows x cols` grid with optional row-major labels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridLayoutRepr", into = "GridLayoutRepr")]
pub struct GridLayout {
    rows: usize,
    cols: usize,
    labels: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct GridLayoutRepr {
    rows: usize,
    cols: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    labels: Vec<String>,
}

impl GridLayout {
    pub fn new(rows: usize, cols: usize) -> Result<Self, LayoutError> {
        if rows == 0 || cols == 0 {
            return Err(LayoutError::EmptyGrid { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            labels: Vec::new(),
        })
    }

    /// Attach one label per cell, row-major.
    pub fn with_labels(mut self, labels: Vec<String>) -> Result<Self, LayoutError> {
        let expected = self.rows * self.cols;
        if labels.len() != expected {
            return Err(LayoutError::LabelCount {
                expected,
                got: labels.len(),
            });
        }
        self.labels = labels;
        Ok(self)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(Cell {
            row,
            col,
            label: self.labels.get(row * self.cols + col).cloned(),
        })
    }

    /// Like [`BoardLayout::cell_at`], but clamps locations in the tolerance
    /// band around the board onto the edge cells.
    pub fn nearest_cell(&self, location: &BoardLocation) -> Option<Cell> {
        if !(location.u.is_finite() && location.v.is_finite()) {
            return None;
        }
        self.cell_at(&BoardLocation {
            u: location.u.clamp(0.0, 1.0),
            v: location.v.clamp(0.0, 1.0),
        })
    }
}

fn bucket(t: f64, n: usize) -> usize {
    ((t * n as f64) as usize).min(n - 1)
}

impl BoardLayout for GridLayout {
    fn cell_at(&self, location: &BoardLocation) -> Option<Cell> {
        let unit = 0.0..=1.0;
        if !unit.contains(&location.u) || !unit.contains(&location.v) {
            return None;
        }
        self.cell(bucket(location.v, self.rows), bucket(location.u, self.cols))
    }
}

impl TryFrom<GridLayoutRepr> for GridLayout {
    type Error = LayoutError;

    fn try_from(raw: GridLayoutRepr) -> Result<Self, Self::Error> {
        let grid = GridLayout::new(raw.rows, raw.cols)?;
        if raw.labels.is_empty() {
            Ok(grid)
        } else {
            grid.with_labels(raw.labels)
        }
    }
}

impl From<GridLayout> for GridLayoutRepr {
    fn from(grid: GridLayout) -> Self {
        Self {
            rows: grid.rows,
            cols: grid.cols,
            labels: grid.labels,
        }
    }
}
