//! Fitting digitized freehand strokes with cubic Bezier curves.
//!
//! Least-squares fitting with Newton-Raphson reparameterization and recursive subdivision,
//! after Philip J. Schneider, "An Algorithm for Automatically Fitting Digitized Curves",
//! Graphics Gems, 1990.
//!
//! The tolerance is a bound on the *squared* distance between each sample and the curve,
//! measured at that sample's parameter value. A segment fitted over more than two samples
//! always stays below it; two-sample segments are placed heuristically and are exact only at
//! their endpoints.

use crate::geometry::Point;
use crate::spatial_index::Bounds;
use figurekit_core::constants::{DEFAULT_FIT_ERROR, DEFAULT_MIN_POINT_DISTANCE};
use figurekit_core::{GeometryError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Reparameterization rounds tried before a segment is split.
const MAX_ITERATIONS: usize = 4;

/// Replacement determinant factor for a singular least-squares system.
const SINGULAR_EPSILON: f64 = 1.0e-11;

/// Smallest control-arm length the least-squares solution may produce.
const MIN_ALPHA: f64 = 1.0e-6;

/// One cubic Bezier segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicSegment {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
}

impl CubicSegment {
    pub fn new(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Point on the curve at parameter `t`.
    pub fn eval(&self, t: f64) -> Point {
        self.p0 * b0(t) + self.p1 * b1(t) + self.p2 * b2(t) + self.p3 * b3(t)
    }

    /// Bounds of the control polygon, which enclose the curve.
    pub fn control_bounds(&self) -> Bounds {
        let xs = [self.p0.x, self.p1.x, self.p2.x, self.p3.x];
        let ys = [self.p0.y, self.p1.y, self.p2.y, self.p3.y];
        Bounds::new(
            xs.iter().copied().fold(f64::INFINITY, f64::min),
            ys.iter().copied().fold(f64::INFINITY, f64::min),
            xs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            ys.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        )
    }

    fn is_finite(&self) -> bool {
        self.p0.is_finite() && self.p1.is_finite() && self.p2.is_finite() && self.p3.is_finite()
    }
}

/// A fitted segment together with the samples it approximates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedSegment {
    pub curve: CubicSegment,
    /// Index of the first sample covered, into the cleaned sample sequence.
    pub first: usize,
    /// Index of the last sample covered, into the cleaned sample sequence.
    pub last: usize,
    /// Largest squared sample-to-curve distance over the covered samples.
    pub max_error: f64,
}

impl FittedSegment {
    /// True for the two-sample placement, which is not checked against the tolerance.
    pub fn is_heuristic(&self) -> bool {
        self.last - self.first == 1
    }
}

/// A chain of cubic segments sharing endpoints, optionally closed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BezierPath {
    segments: Vec<CubicSegment>,
    closed: bool,
}

impl BezierPath {
    pub fn new(segments: Vec<CubicSegment>, closed: bool) -> Self {
        Self { segments, closed }
    }

    pub fn segments(&self) -> &[CubicSegment] {
        &self.segments
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn start(&self) -> Option<Point> {
        self.segments.first().map(|s| s.p0)
    }

    pub fn end(&self) -> Option<Point> {
        self.segments.last().map(|s| s.p3)
    }

    /// Bounds of all control points.
    pub fn control_bounds(&self) -> Option<Bounds> {
        self.segments
            .iter()
            .map(CubicSegment::control_bounds)
            .reduce(|a, b| a.union(&b))
    }

    /// Converts to a `lyon` path. Coordinates are narrowed to `f32`.
    pub fn to_lyon_path(&self) -> lyon::path::Path {
        let mut builder = lyon::path::Path::builder();
        if let Some(first) = self.segments.first() {
            builder.begin(first.p0.to_lyon());
            for seg in &self.segments {
                builder.cubic_bezier_to(seg.p1.to_lyon(), seg.p2.to_lyon(), seg.p3.to_lyon());
            }
            builder.end(self.closed);
        }
        builder.build()
    }
}

/// Fits freehand strokes with a fixed tolerance.
///
/// The fitter holds only configuration; every call is independent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveFitter {
    error: f64,
    min_point_distance: f64,
}

impl Default for CurveFitter {
    fn default() -> Self {
        Self {
            error: DEFAULT_FIT_ERROR,
            min_point_distance: DEFAULT_MIN_POINT_DISTANCE,
        }
    }
}

impl CurveFitter {
    /// Creates a fitter with the given squared-distance tolerance.
    pub fn new(error: f64) -> Result<Self> {
        if !(error.is_finite() && error > 0.0) {
            return Err(GeometryError::InvalidTolerance { tolerance: error }.into());
        }
        Ok(Self {
            error,
            ..Self::default()
        })
    }

    /// Drops samples closer than `distance` to the previously kept one before fitting.
    pub fn with_min_point_distance(mut self, distance: f64) -> Self {
        self.min_point_distance = distance.max(0.0);
        self
    }

    pub fn error(&self) -> f64 {
        self.error
    }

    pub fn min_point_distance(&self) -> f64 {
        self.min_point_distance
    }

    /// Fits `points` and reports each segment with the sample span it covers.
    ///
    /// # Errors
    ///
    /// Fails with [`GeometryError::TooFewPoints`] for fewer than two points and
    /// [`GeometryError::NonFinitePoint`] for NaN or infinite coordinates.
    pub fn fit(&self, points: &[Point]) -> Result<Vec<FittedSegment>> {
        if points.len() < 2 {
            return Err(GeometryError::TooFewPoints {
                count: points.len(),
            }
            .into());
        }
        if let Some((index, p)) = points.iter().enumerate().find(|(_, p)| !p.is_finite()) {
            return Err(GeometryError::NonFinitePoint {
                index,
                x: p.x,
                y: p.y,
            }
            .into());
        }

        let samples = remove_close_points(points, self.min_point_distance);
        let last = samples.len() - 1;
        let t_hat1 = left_tangent(&samples, 0);
        let t_hat2 = right_tangent(&samples, last);

        let mut out = Vec::new();
        self.fit_cubic(&samples, 0, last, t_hat1, t_hat2, &mut out);
        debug!(
            input = points.len(),
            samples = samples.len(),
            segments = out.len(),
            "fitted freehand stroke"
        );
        Ok(out)
    }

    /// Fits `points` and returns the segments in order.
    pub fn fit_curve(&self, points: &[Point]) -> Result<Vec<CubicSegment>> {
        Ok(self.fit(points)?.into_iter().map(|s| s.curve).collect())
    }

    /// Fits `points` into a [`BezierPath`] carrying the `closed` flag.
    pub fn fit_bezier_path(&self, points: &[Point], closed: bool) -> Result<BezierPath> {
        Ok(BezierPath::new(self.fit_curve(points)?, closed))
    }

    /// Fits `points` into a `lyon` path, closed if `closed` is set.
    pub fn fit_lyon_path(&self, points: &[Point], closed: bool) -> Result<lyon::path::Path> {
        Ok(self.fit_bezier_path(points, closed)?.to_lyon_path())
    }

    fn fit_cubic(
        &self,
        d: &[Point],
        first: usize,
        last: usize,
        t_hat1: Point,
        t_hat2: Point,
        out: &mut Vec<FittedSegment>,
    ) {
        if last - first + 1 == 2 {
            out.push(FittedSegment {
                curve: heuristic_segment(d[first], d[last], t_hat1, t_hat2),
                first,
                last,
                max_error: 0.0,
            });
            return;
        }

        let mut u = chord_length_parameterize(d, first, last);
        let mut curve = generate_bezier(d, first, last, &u, t_hat1, t_hat2);
        let (mut max_error, mut split) = compute_max_error(d, first, last, &curve, &u);
        if max_error < self.error {
            out.push(FittedSegment {
                curve,
                first,
                last,
                max_error,
            });
            return;
        }

        let iteration_error = self.error * self.error;
        if max_error < iteration_error {
            for _ in 0..MAX_ITERATIONS {
                u = reparameterize(d, first, &u, &curve);
                curve = generate_bezier(d, first, last, &u, t_hat1, t_hat2);
                (max_error, split) = compute_max_error(d, first, last, &curve, &u);
                if max_error < self.error {
                    out.push(FittedSegment {
                        curve,
                        first,
                        last,
                        max_error,
                    });
                    return;
                }
            }
        }

        trace!(first, last, split, max_error, "splitting fit");
        let t_hat_center = center_tangent(d, split);
        self.fit_cubic(d, first, split, t_hat1, t_hat_center, out);
        self.fit_cubic(d, split, last, -t_hat_center, t_hat2, out);
    }
}

/// Fits `points` with tolerance `error` using default settings otherwise.
pub fn fit_curve(points: &[Point], error: f64) -> Result<Vec<CubicSegment>> {
    CurveFitter::new(error)?.fit_curve(points)
}

/// Fits `points` with tolerance `error` into a [`BezierPath`] carrying the `closed` flag.
pub fn fit_bezier_path(points: &[Point], error: f64, closed: bool) -> Result<BezierPath> {
    CurveFitter::new(error)?.fit_bezier_path(points, closed)
}

/// Collapses runs of samples no farther than `min_distance` from the last kept sample.
///
/// The first and last samples always survive unchanged. With `min_distance == 0` only exact
/// repeats are dropped.
pub fn remove_close_points(points: &[Point], min_distance: f64) -> Vec<Point> {
    let Some((&first, rest)) = points.split_first() else {
        return Vec::new();
    };
    let min_sq = min_distance * min_distance;
    let mut kept = vec![first];
    for p in rest {
        if let Some(prev) = kept.last() {
            if prev.distance_squared_to(p) > min_sq {
                kept.push(*p);
            }
        }
    }

    if let Some(&last) = points.last() {
        if kept.last() != Some(&last) {
            if kept.len() > 1 {
                kept.pop();
            }
            kept.push(last);
        } else if kept.len() == 1 && points.len() > 1 {
            kept.push(last);
        }
    }
    kept
}

fn b0(t: f64) -> f64 {
    let mt = 1.0 - t;
    mt * mt * mt
}

fn b1(t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * t * mt * mt
}

fn b2(t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * t * t * mt
}

fn b3(t: f64) -> f64 {
    t * t * t
}

fn left_tangent(d: &[Point], end: usize) -> Point {
    (d[end + 1] - d[end]).normalized()
}

fn right_tangent(d: &[Point], end: usize) -> Point {
    (d[end - 1] - d[end]).normalized()
}

fn center_tangent(d: &[Point], center: usize) -> Point {
    let v1 = d[center - 1] - d[center];
    let v2 = d[center] - d[center + 1];
    ((v1 + v2) * 0.5).normalized()
}

/// Control points a third of the chord out along each tangent.
fn heuristic_segment(first: Point, last: Point, t_hat1: Point, t_hat2: Point) -> CubicSegment {
    let dist = last.distance_to(&first) / 3.0;
    CubicSegment::new(first, first + t_hat1 * dist, last + t_hat2 * dist, last)
}

fn chord_length_parameterize(d: &[Point], first: usize, last: usize) -> Vec<f64> {
    let mut u = Vec::with_capacity(last - first + 1);
    u.push(0.0);
    for i in first + 1..=last {
        let prev = u[i - first - 1];
        u.push(prev + d[i].distance_to(&d[i - 1]));
    }
    let total = u[last - first];
    if total > 0.0 {
        for v in &mut u {
            *v /= total;
        }
    }
    u
}

/// Least-squares placement of the two inner control points along the end tangents.
fn generate_bezier(
    d: &[Point],
    first: usize,
    last: usize,
    u: &[f64],
    t_hat1: Point,
    t_hat2: Point,
) -> CubicSegment {
    let first_pt = d[first];
    let last_pt = d[last];
    let mut c = [[0.0_f64; 2]; 2];
    let mut x = [0.0_f64; 2];

    for (i, &t) in u.iter().enumerate() {
        let a0 = t_hat1 * b1(t);
        let a1 = t_hat2 * b2(t);
        c[0][0] += a0.dot(a0);
        c[0][1] += a0.dot(a1);
        c[1][1] += a1.dot(a1);

        let tmp = d[first + i]
            - (first_pt * b0(t) + first_pt * b1(t) + last_pt * b2(t) + last_pt * b3(t));
        x[0] += a0.dot(tmp);
        x[1] += a1.dot(tmp);
    }
    c[1][0] = c[0][1];

    let mut det_c0_c1 = c[0][0] * c[1][1] - c[1][0] * c[0][1];
    let det_c0_x = c[0][0] * x[1] - c[1][0] * x[0];
    let det_x_c1 = x[0] * c[1][1] - x[1] * c[0][1];
    if det_c0_c1 == 0.0 {
        det_c0_c1 = (c[0][0] * c[1][1]) * SINGULAR_EPSILON;
    }
    let alpha_l = det_x_c1 / det_c0_c1;
    let alpha_r = det_c0_x / det_c0_c1;

    let usable = |alpha: f64| alpha.is_finite() && alpha >= MIN_ALPHA;
    if !(usable(alpha_l) && usable(alpha_r)) {
        return heuristic_segment(first_pt, last_pt, t_hat1, t_hat2);
    }

    let curve = CubicSegment::new(
        first_pt,
        first_pt + t_hat1 * alpha_l,
        last_pt + t_hat2 * alpha_r,
        last_pt,
    );
    if curve.is_finite() {
        curve
    } else {
        heuristic_segment(first_pt, last_pt, t_hat1, t_hat2)
    }
}

/// Largest squared distance over the interior samples, and where it occurs.
///
/// The split candidate starts at the middle sample and only moves for a strictly larger
/// error.
fn compute_max_error(
    d: &[Point],
    first: usize,
    last: usize,
    curve: &CubicSegment,
    u: &[f64],
) -> (f64, usize) {
    let mut split = first + (last - first + 1) / 2;
    let mut max_dist = 0.0;
    for i in first + 1..last {
        let p = curve.eval(u[i - first]);
        let dist = p.distance_squared_to(&d[i]);
        if dist > max_dist {
            max_dist = dist;
            split = i;
        }
    }
    (max_dist, split)
}

fn reparameterize(d: &[Point], first: usize, u: &[f64], curve: &CubicSegment) -> Vec<f64> {
    u.iter()
        .enumerate()
        .map(|(i, &t)| newton_raphson_root_find(curve, d[first + i], t))
        .collect()
}

/// One Newton-Raphson step towards the parameter of the curve point nearest to `p`.
fn newton_raphson_root_find(q: &CubicSegment, p: Point, u: f64) -> f64 {
    let q1 = [
        (q.p1 - q.p0) * 3.0,
        (q.p2 - q.p1) * 3.0,
        (q.p3 - q.p2) * 3.0,
    ];
    let q2 = [(q1[1] - q1[0]) * 2.0, (q1[2] - q1[1]) * 2.0];

    let mt = 1.0 - u;
    let q_u = q.eval(u);
    let q1_u = q1[0] * (mt * mt) + q1[1] * (2.0 * u * mt) + q1[2] * (u * u);
    let q2_u = q2[0] * mt + q2[1] * u;

    let diff = q_u - p;
    let numerator = diff.dot(q1_u);
    let denominator = q1_u.dot(q1_u) + diff.dot(q2_u);
    if denominator == 0.0 {
        return u;
    }

    let improved = u - numerator / denominator;
    if improved.is_finite() {
        improved
    } else {
        u
    }
}
