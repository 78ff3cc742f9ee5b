// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placed sketches, wires and the U cross-section

use crate::error::{Error, Result};
use crate::plane::{Plane, PlaneName};
use crate::profile::{draw, Profile2D, Tessellation};
use crate::{Point3, Vector3};

/// A closed profile placed on a plane; the input of extrusions
#[derive(Debug, Clone, PartialEq)]
pub struct Sketch {
    profile: Profile2D,
    plane: Plane,
}

impl Sketch {
    pub fn new(profile: Profile2D, plane: Plane) -> Self {
        Self { profile, plane }
    }

    #[inline]
    pub fn profile(&self) -> &Profile2D {
        &self.profile
    }

    #[inline]
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Outward normal of the sketch face
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.plane.normal
    }

    /// The profile loop in world coordinates
    pub fn world_points(&self) -> Vec<Point3<f64>> {
        self.profile
            .points
            .iter()
            .map(|p| self.plane.to_world(p))
            .collect()
    }

    /// The boundary of the sketch as a wire
    pub fn wire(&self) -> Wire {
        Wire {
            points: self.world_points(),
            edge_segments: self.profile.edge_segments.clone(),
            segment_count: self.profile.segment_count,
        }
    }
}

/// Closed 3D polyline; the input of lofts
#[derive(Debug, Clone, PartialEq)]
pub struct Wire {
    pub points: Vec<Point3<f64>>,
    pub edge_segments: Vec<u32>,
    pub segment_count: u32,
}

impl Wire {
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// U cross-section of half-width `width` on the horizontal plane at `z`.
///
/// Straight legs of `width / 2` rise from the baseline at `x = ±width`,
/// joined by a half circle of radius `width` swelling away from the wall
/// (+y). The baseline lies on `y = 0`, the wall.
pub fn build_u_sketch(width: f64, z: f64) -> Result<Sketch> {
    build_u_sketch_with(width, z, &Tessellation::default())
}

pub fn build_u_sketch_with(width: f64, z: f64, tessellation: &Tessellation) -> Result<Sketch> {
    if !width.is_finite() || width <= 0.0 {
        return Err(Error::InvalidProfile(format!(
            "U sketch width must be positive, got {width}"
        )));
    }
    if !z.is_finite() {
        return Err(Error::InvalidProfile(format!("U sketch height must be finite, got {z}")));
    }

    let leg = width / 2.0;
    let profile = draw(-width, 0.0)
        .v_line(leg)
        .h_bulge_arc(2.0 * width, -1.0)
        .v_line(-leg)
        .close_with(tessellation)?;

    Ok(Sketch::new(profile, Plane::offset(PlaneName::XY, z)))
}
