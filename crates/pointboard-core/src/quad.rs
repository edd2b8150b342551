//! Board quadrilateral geometry.
//!
//! Corners are kept in capture order (top-left, top-right, bottom-left,
//! bottom-right); the perimeter walk used by the convexity test is
//! TL -> TR -> BR -> BL. The bilinear parametrisation is
//!
//! `P(u, v) = (1-u)(1-v) TL + u(1-v) TR + (1-u)v BL + uv BR`
//!
//! so `u` runs along the top/bottom edges and `v` along the left/right edges.

use nalgebra::{Matrix2, Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Minimal edge length between calibration corners, in normalized units.
pub const MIN_EDGE: f64 = 1e-3;

/// Minimal `|sin|` of the turn angle at every quad vertex (~2.9 degrees).
pub const MIN_TURN_SINE: f64 = 0.05;

const NEWTON_ITERS: usize = 4;

/// Why a set of calibration corners cannot describe a board.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DegenerateReason {
    #[error("two calibration corners coincide")]
    CoincidentCorners,
    #[error("three calibration corners are collinear")]
    Collinear,
    #[error("calibration corners do not form a convex quadrilateral")]
    NotConvex,
}

#[inline]
fn cross(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// `|sin|` of the angle between two non-zero vectors.
#[inline]
fn turn_sine(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    cross(a, b) / (a.norm() * b.norm())
}

/// Check a partially captured corner list (capture order, 0..=4 points).
///
/// The second corner must be apart from the first, the third must not be
/// collinear with the first two, and four corners must pass the full
/// [`BoardQuad::new`] test.
pub fn check_partial_corners(points: &[Point2<f64>]) -> Result<(), DegenerateReason> {
    match points {
        [] | [_] => Ok(()),
        [tl, tr] => {
            if (tr - tl).norm() < MIN_EDGE {
                return Err(DegenerateReason::CoincidentCorners);
            }
            Ok(())
        }
        [tl, tr, bl] => {
            check_partial_corners(&[*tl, *tr])?;
            let top = tr - tl;
            let left = bl - tl;
            if left.norm() < MIN_EDGE || (bl - tr).norm() < MIN_EDGE {
                return Err(DegenerateReason::CoincidentCorners);
            }
            if turn_sine(top, left).abs() < MIN_TURN_SINE {
                return Err(DegenerateReason::Collinear);
            }
            Ok(())
        }
        [tl, tr, bl, br] => BoardQuad::new(*tl, *tr, *bl, *br).map(|_| ()),
        _ => Err(DegenerateReason::NotConvex),
    }
}

/// A validated, strictly convex board quadrilateral.
///
/// Deserialization goes through [`BoardQuad::new`], so a stored quad is
/// re-checked on load.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuadCorners", into = "QuadCorners")]
pub struct BoardQuad {
    tl: Point2<f64>,
    tr: Point2<f64>,
    bl: Point2<f64>,
    br: Point2<f64>,
}

#[derive(Serialize, Deserialize)]
struct QuadCorners {
    tl: Point2<f64>,
    tr: Point2<f64>,
    bl: Point2<f64>,
    br: Point2<f64>,
}

impl TryFrom<QuadCorners> for BoardQuad {
    type Error = DegenerateReason;

    fn try_from(c: QuadCorners) -> Result<Self, Self::Error> {
        BoardQuad::new(c.tl, c.tr, c.bl, c.br)
    }
}

impl From<BoardQuad> for QuadCorners {
    fn from(q: BoardQuad) -> Self {
        Self {
            tl: q.tl,
            tr: q.tr,
            bl: q.bl,
            br: q.br,
        }
    }
}

impl BoardQuad {
    pub fn new(
        tl: Point2<f64>,
        tr: Point2<f64>,
        bl: Point2<f64>,
        br: Point2<f64>,
    ) -> Result<Self, DegenerateReason> {
        let ring = [tl, tr, br, bl];
        let edges: [Vector2<f64>; 4] = std::array::from_fn(|i| ring[(i + 1) % 4] - ring[i]);
        if edges.iter().any(|e| e.norm() < MIN_EDGE) {
            return Err(DegenerateReason::CoincidentCorners);
        }

        let mut sign = 0.0_f64;
        for i in 0..4 {
            let s = turn_sine(edges[i], edges[(i + 1) % 4]);
            if s.abs() < MIN_TURN_SINE {
                return Err(DegenerateReason::Collinear);
            }
            if sign == 0.0 {
                sign = s.signum();
            } else if s.signum() != sign {
                return Err(DegenerateReason::NotConvex);
            }
        }

        Ok(Self { tl, tr, bl, br })
    }

    /// Build from corners in capture order `[TL, TR, BL, BR]`.
    pub fn from_corners(corners: [Point2<f64>; 4]) -> Result<Self, DegenerateReason> {
        let [tl, tr, bl, br] = corners;
        Self::new(tl, tr, bl, br)
    }

    /// Corners in capture order `[TL, TR, BL, BR]`.
    pub fn corners(&self) -> [Point2<f64>; 4] {
        [self.tl, self.tr, self.bl, self.br]
    }

    #[inline]
    fn basis(&self) -> (Vector2<f64>, Vector2<f64>, Vector2<f64>) {
        let e = self.tr - self.tl;
        let f = self.bl - self.tl;
        let g = (self.tl - self.tr) + (self.br - self.bl);
        (e, f, g)
    }

    /// Forward bilinear map `(u, v) -> P`.
    #[inline]
    pub fn point_at(&self, u: f64, v: f64) -> Point2<f64> {
        let (e, f, g) = self.basis();
        self.tl + e * u + f * v + g * (u * v)
    }

    /// Inverse bilinear map `P -> (u, v)`.
    ///
    /// Solves the quadratic in `v` directly, keeps the root closest to the
    /// unit square and polishes it with Newton steps on the exact residual.
    /// Returns `None` when `p` has no real preimage.
    pub fn inverse_bilinear(&self, p: Point2<f64>) -> Option<Point2<f64>> {
        let (e, f, g) = self.basis();
        let h = p - self.tl;

        // h - v f = u (e + v g)  =>  k2 v^2 + k1 v + k0 = 0
        let k2 = cross(g, f);
        let k1 = cross(e, f) + cross(h, g);
        let k0 = cross(h, e);

        let mut disc = k1 * k1 - 4.0 * k0 * k2;
        if disc < 0.0 {
            let scale = k1 * k1 + (4.0 * k0 * k2).abs();
            if disc < -1e-12 * scale {
                return None;
            }
            disc = 0.0;
        }
        let q = -0.5 * (k1 + disc.sqrt().copysign(k1));

        let mut best: Option<(f64, Point2<f64>)> = None;
        for v in [
            (k2 != 0.0).then(|| q / k2),
            (q != 0.0).then(|| k0 / q),
        ]
        .into_iter()
        .flatten()
        {
            let Some(u) = solve_u(h, e, f, g, v) else {
                continue;
            };
            let uv = Point2::new(u, v);
            let score = distance_outside_unit(uv);
            if best.is_none_or(|(s, _)| score < s) {
                best = Some((score, uv));
            }
        }

        let (_, uv) = best?;
        Some(self.polish(uv, p))
    }

    fn polish(&self, mut uv: Point2<f64>, p: Point2<f64>) -> Point2<f64> {
        let (e, f, g) = self.basis();
        for _ in 0..NEWTON_ITERS {
            let r = self.point_at(uv.x, uv.y) - p;
            if r.norm() < 1e-15 {
                break;
            }
            let jac = Matrix2::from_columns(&[e + g * uv.y, f + g * uv.x]);
            let Some(step) = jac.lu().solve(&r) else {
                break;
            };
            if !step.iter().all(|s| s.is_finite()) {
                break;
            }
            uv -= step;
        }
        uv
    }
}

fn solve_u(h: Vector2<f64>, e: Vector2<f64>, f: Vector2<f64>, g: Vector2<f64>, v: f64) -> Option<f64> {
    if !v.is_finite() {
        return None;
    }
    let num = h - f * v;
    let den = e + g * v;
    let axis = if den.x.abs() >= den.y.abs() { 0 } else { 1 };
    if den[axis].abs() < 1e-15 {
        return None;
    }
    Some(num[axis] / den[axis])
}

fn distance_outside_unit(uv: Point2<f64>) -> f64 {
    let dx = (-uv.x).max(uv.x - 1.0).max(0.0);
    let dy = (-uv.y).max(uv.y - 1.0).max(0.0);
    dx + dy
}
