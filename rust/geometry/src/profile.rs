// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D profiles and the pen used to draw them
//!
//! A [`Drawing`] records line and bulge-arc segments; closing it discretises
//! the arcs into a [`Profile2D`], a counter-clockwise loop that remembers
//! which drawn segment every polyline edge came from. Extrusions and lofts
//! use that mapping to give each drawn segment its own face.

use std::f64::consts::PI;

use crate::error::{Error, Result};
use nalgebra::{Point2, Vector2};

const CLOSE_TOLERANCE: f64 = 1e-9;

/// How finely curves are approximated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tessellation {
    /// Chords per full turn of an arc or circle
    pub segments_per_turn: u32,
    /// Chords across the quarter-round of one fillet
    pub fillet_segments: u32,
}

impl Default for Tessellation {
    fn default() -> Self {
        Self {
            segments_per_turn: 32,
            fillet_segments: 8,
        }
    }
}

impl Tessellation {
    /// Number of chords for an arc of `sweep` radians
    #[inline]
    pub fn arc_segments(&self, sweep: f64) -> usize {
        let per_turn = self.segments_per_turn.max(8) as f64;
        ((per_turn * sweep.abs() / (2.0 * PI)) - 1e-9).ceil().max(1.0) as usize
    }
}

/// Closed 2D loop, counter-clockwise, without a repeated closing point
#[derive(Debug, Clone, PartialEq)]
pub struct Profile2D {
    pub points: Vec<Point2<f64>>,
    /// `edge_segments[i]` is the drawn segment of edge `points[i] -> points[i + 1]`
    pub edge_segments: Vec<u32>,
    pub segment_count: u32,
}

impl Profile2D {
    /// Signed shoelace area, positive for counter-clockwise loops
    pub fn signed_area(points: &[Point2<f64>]) -> f64 {
        let n = points.len();
        let mut twice = 0.0;
        for i in 0..n {
            let a = &points[i];
            let b = &points[(i + 1) % n];
            twice += a.x * b.y - b.x * a.y;
        }
        twice * 0.5
    }

    #[inline]
    pub fn area(&self) -> f64 {
        Self::signed_area(&self.points)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Build a profile from an arbitrary loop, fixing its winding
    fn from_loop(mut points: Vec<Point2<f64>>, mut edge_segments: Vec<u32>, segment_count: u32) -> Result<Self> {
        if points.len() < 3 {
            return Err(Error::InvalidProfile(format!(
                "profile needs at least 3 points, got {}",
                points.len()
            )));
        }
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(Error::InvalidProfile("non-finite coordinate".to_string()));
        }

        let area = Self::signed_area(&points);
        if area.abs() < 1e-12 {
            return Err(Error::InvalidProfile("profile encloses no area".to_string()));
        }

        if area < 0.0 {
            let n = points.len();
            points.reverse();
            // Reversed edge j runs over original edge n - 2 - j (mod n)
            edge_segments = (0..n).map(|j| edge_segments[(2 * n - 2 - j) % n]).collect();
        }

        Ok(Self {
            points,
            edge_segments,
            segment_count,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Segment {
    Line { to: Point2<f64> },
    Arc { to: Point2<f64>, bulge: f64 },
}

/// Pen-style profile builder
///
/// ```
/// use lightholder_geometry::draw;
///
/// let square = draw(0.0, 0.0).h_line(2.0).v_line(2.0).h_line(-2.0).close().unwrap();
/// assert_eq!(square.len(), 4);
/// assert!((square.area() - 4.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Drawing {
    start: Point2<f64>,
    cursor: Point2<f64>,
    segments: Vec<Segment>,
}

/// Start a drawing at `(x, y)`
pub fn draw(x: f64, y: f64) -> Drawing {
    let start = Point2::new(x, y);
    Drawing {
        start,
        cursor: start,
        segments: Vec::new(),
    }
}

impl Drawing {
    pub fn line_to(mut self, x: f64, y: f64) -> Self {
        let to = Point2::new(x, y);
        self.segments.push(Segment::Line { to });
        self.cursor = to;
        self
    }

    /// Horizontal line by `dx`
    pub fn h_line(self, dx: f64) -> Self {
        let (x, y) = (self.cursor.x + dx, self.cursor.y);
        self.line_to(x, y)
    }

    /// Vertical line by `dy`
    pub fn v_line(self, dy: f64) -> Self {
        let (x, y) = (self.cursor.x, self.cursor.y + dy);
        self.line_to(x, y)
    }

    /// Arc to `(x, y)` whose sagitta is `|bulge|` half-chords.
    ///
    /// A bulge of 1 is a half circle. Negative bulges swell to the left of
    /// the direction of travel, positive ones to the right.
    pub fn bulge_arc_to(mut self, x: f64, y: f64, bulge: f64) -> Self {
        let to = Point2::new(x, y);
        self.segments.push(Segment::Arc { to, bulge });
        self.cursor = to;
        self
    }

    /// Bulge arc with a horizontal chord of `dx`
    pub fn h_bulge_arc(self, dx: f64, bulge: f64) -> Self {
        let (x, y) = (self.cursor.x + dx, self.cursor.y);
        self.bulge_arc_to(x, y, bulge)
    }

    /// Bulge arc with a vertical chord of `dy`
    pub fn v_bulge_arc(self, dy: f64, bulge: f64) -> Self {
        let (x, y) = (self.cursor.x, self.cursor.y + dy);
        self.bulge_arc_to(x, y, bulge)
    }

    /// Close back to the start point with default tessellation
    pub fn close(self) -> Result<Profile2D> {
        self.close_with(&Tessellation::default())
    }

    /// Close back to the start point, discretising arcs with `tessellation`
    pub fn close_with(mut self, tessellation: &Tessellation) -> Result<Profile2D> {
        if (self.cursor - self.start).norm() > CLOSE_TOLERANCE {
            self.segments.push(Segment::Line { to: self.start });
        }

        let mut points = vec![self.start];
        let mut edge_segments = Vec::new();
        let mut from = self.start;

        for (index, segment) in self.segments.iter().enumerate() {
            let id = index as u32;
            match *segment {
                Segment::Line { to } => {
                    if (to - from).norm() <= CLOSE_TOLERANCE {
                        return Err(Error::InvalidProfile(format!(
                            "segment {index} has zero length"
                        )));
                    }
                    points.push(to);
                    edge_segments.push(id);
                    from = to;
                }
                Segment::Arc { to, bulge } => {
                    for p in discretize_arc(from, to, bulge, tessellation)? {
                        points.push(p);
                        edge_segments.push(id);
                    }
                    from = to;
                }
            }
        }

        // The last point is the start again
        points.pop();

        Profile2D::from_loop(points, edge_segments, self.segments.len() as u32)
    }
}

/// Points after `from` up to and including `to` along a bulge arc
fn discretize_arc(
    from: Point2<f64>,
    to: Point2<f64>,
    bulge: f64,
    tessellation: &Tessellation,
) -> Result<Vec<Point2<f64>>> {
    let chord = to - from;
    let chord_len = chord.norm();
    if chord_len <= CLOSE_TOLERANCE {
        return Err(Error::InvalidProfile("arc has zero-length chord".to_string()));
    }
    if !bulge.is_finite() || bulge.abs() < 1e-9 {
        return Err(Error::InvalidProfile(format!("invalid arc bulge {bulge}")));
    }

    let half = chord_len * 0.5;
    let sagitta = bulge.abs() * half;
    let radius = (half * half + sagitta * sagitta) / (2.0 * sagitta);

    let left = Vector2::new(-chord.y, chord.x) / chord_len;
    let side = if bulge < 0.0 { left } else { -left };
    let mid = from + chord * 0.5;
    let center = mid + side * (sagitta - radius);

    let sweep = 4.0 * bulge.abs().atan();
    // Left-swelling arcs turn clockwise around their center
    let direction = if bulge < 0.0 { -1.0 } else { 1.0 };
    let n = tessellation.arc_segments(sweep);

    let start = from - center;
    let mut points = Vec::with_capacity(n);
    for i in 1..n {
        let angle = direction * sweep * (i as f64) / (n as f64);
        let (sin, cos) = angle.sin_cos();
        let rotated = Vector2::new(start.x * cos - start.y * sin, start.x * sin + start.y * cos);
        points.push(center + rotated);
    }
    points.push(to);
    Ok(points)
}

/// Full circle of `radius` around the local origin, one drawn segment
pub fn draw_circle(radius: f64, tessellation: &Tessellation) -> Result<Profile2D> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(Error::InvalidProfile(format!(
            "circle radius must be positive, got {radius}"
        )));
    }

    let segments = tessellation.segments_per_turn.max(8) as usize;
    let points = (0..segments)
        .map(|i| {
            let angle = 2.0 * PI * (i as f64) / (segments as f64);
            Point2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect();

    Profile2D::from_loop(points, vec![0; segments], 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangle_drawing() {
        let profile = draw(0.0, 0.0).h_line(10.0).v_line(5.0).h_line(-10.0).close().unwrap();
        assert_eq!(profile.len(), 4);
        assert_eq!(profile.segment_count, 4);
        assert_relative_eq!(profile.area(), 50.0);
        assert_eq!(profile.edge_segments, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_clockwise_drawing_is_reversed() {
        let profile = draw(0.0, 0.0).v_line(5.0).h_line(10.0).v_line(-5.0).close().unwrap();
        assert!(profile.area() > 0.0);
        // Every edge still maps to the segment it was drawn with
        for (i, seg) in profile.edge_segments.iter().enumerate() {
            let a = profile.points[i];
            let b = profile.points[(i + 1) % profile.len()];
            let expected = match (a.x == b.x, a.x.min(b.x), a.y.max(b.y)) {
                (true, x, _) if x == 0.0 => 0,
                (false, _, y) if y == 5.0 => 1,
                (true, _, _) => 2,
                _ => 3,
            };
            assert_eq!(*seg, expected);
        }
    }

    #[test]
    fn test_half_circle_bulge_hits_apex() {
        let tess = Tessellation::default();
        let profile = draw(-1.0, 0.0).h_bulge_arc(2.0, -1.0).close_with(&tess).unwrap();
        // 16 chords for half a turn plus the closing line
        assert_eq!(profile.len(), 17);
        let top = profile.points.iter().map(|p| p.y).fold(f64::MIN, f64::max);
        assert_relative_eq!(top, 1.0, epsilon = 1e-12);
        assert_relative_eq!(profile.area(), PI / 2.0, epsilon = 0.02);
        for p in &profile.points {
            assert_relative_eq!(p.coords.norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_positive_bulge_swells_right() {
        let profile = draw(-1.0, 0.0).h_bulge_arc(2.0, 1.0).close().unwrap();
        let bottom = profile.points.iter().map(|p| p.y).fold(f64::MAX, f64::min);
        assert_relative_eq!(bottom, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_drawings_rejected() {
        assert!(draw(0.0, 0.0).h_line(1.0).close().is_err());
        assert!(draw(0.0, 0.0).h_line(0.0).v_line(1.0).h_line(-1.0).close().is_err());
        assert!(draw(0.0, 0.0).h_bulge_arc(2.0, f64::NAN).close().is_err());
    }

    #[test]
    fn test_circle() {
        let circle = draw_circle(2.0, &Tessellation::default()).unwrap();
        assert_eq!(circle.len(), 32);
        assert!(circle.edge_segments.iter().all(|&s| s == 0));
        assert!(draw_circle(0.0, &Tessellation::default()).is_err());
    }
}
