// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The parametric build: profile stack → sketches → solids → fillets
//!
//! Every stage returns a new value; solids reused by later stages are
//! cloned, never modified in place.

use lightholder_core::dimensions::{
    hole_radius, HOOK_HEIGHT, TIP_RADIUS, U_CURVE_HEIGHT, WALL_MOUNT_THICKNESS,
};
use lightholder_core::{build_profile_stack, ModelParams, ProfileStack};
use lightholder_geometry::{
    build_u_sketch_with, cut, draw, draw_circle, extrude, fillet, fuse, intersect, loft,
    split_shells, Axis, EdgeFinder, PlaneName, Plane, Point3, Shape, Sketch, Solid,
    TagAllocator, Vector3, Wire,
};
use tracing::debug;

use crate::error::Result;
use crate::kernel::Kernel;

/// Radius of the rim fillets on the wall plate (mm)
pub const PLATE_FILLET_RADIUS: f64 = 5.0;

/// Radius of the fillets along the flat back (mm)
pub const BACK_FILLET_RADIUS: f64 = 4.0;

/// Named intermediates of one build
#[derive(Debug, Clone)]
pub struct ModelParts {
    pub stack: ProfileStack,
    pub wall_mount: Solid,
    pub rod: Solid,
    pub keep_volume: Solid,
    pub hole: Solid,
    pub u_profile: Solid,
    pub full_keep_volume: Solid,
    /// Unfilleted result
    pub rounded: Solid,
    /// Continues numbering faces for the fillet passes
    pub tags: TagAllocator,
}

/// Build every intermediate solid up to, not including, the fillets
pub fn build_parts(params: &ModelParams, kernel: &Kernel) -> Result<ModelParts> {
    let stack = build_profile_stack(params)?;
    let tessellation = kernel.tessellation();
    let mut tags = TagAllocator::new();

    let base = stack.wall_mount();
    let plate_sketch = build_u_sketch_with(base.radius, base.z, tessellation)?;
    let wall_mount = extrude(&plate_sketch, WALL_MOUNT_THICKNESS, &mut tags)?;

    let wires = stack
        .loft_stations()
        .iter()
        .map(|station| {
            build_u_sketch_with(station.radius, station.z, tessellation)
                .and_then(|sketch| Shape::from(sketch).into_wire())
        })
        .collect::<lightholder_geometry::Result<Vec<Wire>>>()?;
    let rod = loft(&wires, &mut tags)?;

    let top = stack.transition_end();
    let tip_sketch = build_u_sketch_with(TIP_RADIUS, top, tessellation)?;
    let keep_volume = extrude(&tip_sketch, HOOK_HEIGHT + U_CURVE_HEIGHT, &mut tags)?;

    let thickness = params.neck_thickness;
    let hole_sketch = Sketch::new(
        draw_circle(hole_radius(thickness), tessellation)?,
        Plane::named(PlaneName::YZ).with_origin(Point3::new(thickness / 2.0, TIP_RADIUS / 2.0, 0.0)),
    );
    let hole = extrude(&hole_sketch, -thickness, &mut tags)?;

    let arch = draw(0.0, top)
        .v_line(U_CURVE_HEIGHT)
        .h_bulge_arc(TIP_RADIUS, -1.0)
        .v_line(-U_CURVE_HEIGHT)
        .close_with(tessellation)?;
    let arch_sketch = Sketch::new(arch, Plane::named(PlaneName::YZ));
    let hook = extrude(&arch_sketch, thickness, &mut tags)?.translate(Vector3::new(-thickness / 2.0, 0.0, 0.0));
    let u_profile = cut(&hook, &hole.translate(Vector3::new(0.0, 0.0, top + U_CURVE_HEIGHT)))?;

    let body = fuse(&wall_mount, &rod)?;
    let full_keep_volume = fuse(&body, &keep_volume)?;
    let rounded = intersect(&fuse(&body, &u_profile)?, &full_keep_volume)?;

    debug!(
        neck_length = params.neck_length,
        faces = tags.issued(),
        polygons = rounded.polygon_count(),
        "model parts built"
    );

    Ok(ModelParts {
        stack,
        wall_mount,
        rod,
        keep_volume,
        hole,
        u_profile,
        full_keep_volume,
        rounded,
        tags,
    })
}

/// Edges of the plate rim, along the depth axis on the plate's top face
pub fn plate_rim_edges(stack: &ProfileStack, params: &ModelParams) -> EdgeFinder {
    EdgeFinder::new()
        .in_plane(PlaneName::XY, stack.wall_mount_top())
        .within_distance(2.0 * params.base_width, [0.0, 0.0, 0.0])
        .in_direction(Axis::Y)
}

/// Edges of the flat back from the floor up to the transition top
pub fn back_edges(stack: &ProfileStack, params: &ModelParams) -> EdgeFinder {
    let width = params.base_width;
    EdgeFinder::new()
        .in_plane(PlaneName::XZ, 0.0)
        .in_box([-width, 0.0, 0.0], [width, 1.0, stack.transition_top()])
}

/// Both fillet passes, in order; the second sees the first one's result
pub fn apply_fillets(
    solid: &Solid,
    stack: &ProfileStack,
    params: &ModelParams,
    tags: &mut TagAllocator,
    kernel: &Kernel,
) -> Result<Solid> {
    let tessellation = kernel.tessellation();
    let rimmed = fillet(solid, PLATE_FILLET_RADIUS, &plate_rim_edges(stack, params), tags, tessellation)?;
    let rounded = fillet(&rimmed, BACK_FILLET_RADIUS, &back_edges(stack, params), tags, tessellation)?;
    Ok(rounded)
}

/// Build the finished solid for `params`.
///
/// Parameters are validated before any kernel call. The result is a
/// single closed solid; leftover boolean debris is dropped.
pub fn build_solid(params: &ModelParams, kernel: &Kernel) -> Result<Solid> {
    let mut parts = build_parts(params, kernel)?;
    let filleted = apply_fillets(&parts.rounded, &parts.stack, params, &mut parts.tags, kernel)?;
    let solid = Shape::from_shells(split_shells(&filleted)).into_solid()?;
    Ok(solid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lightholder_core::dimensions::hook_arch_height;
    use lightholder_geometry::Topology;

    async fn kernel() -> Kernel {
        Kernel::init().await.unwrap()
    }

    #[tokio::test]
    async fn test_parts_extents() {
        let params = ModelParams::default();
        let parts = build_parts(&params, &kernel().await).unwrap();

        let (min, max) = parts.wall_mount.bounds();
        assert_relative_eq!(min.z, 0.0);
        assert_relative_eq!(max.z, 8.0);
        assert_relative_eq!(max.x, 45.0);

        let (_, rod_max) = parts.rod.bounds();
        assert_relative_eq!(rod_max.z, 196.0);

        let (hook_min, hook_max) = parts.u_profile.bounds();
        let top = parts.stack.transition_end() + hook_arch_height();
        assert_relative_eq!(top, 213.0);
        assert_relative_eq!(hook_max.z, top, epsilon = 1e-9);
        assert_relative_eq!(hook_min.x, -3.25, epsilon = 1e-9);
        assert_relative_eq!(hook_max.y, 14.0, epsilon = 1e-9);

        let (_, keep_max) = parts.full_keep_volume.bounds();
        assert_relative_eq!(keep_max.z, 196.0 + 26.0);
    }

    #[tokio::test]
    async fn test_hole_goes_through_hook() {
        let params = ModelParams::default();
        let parts = build_parts(&params, &kernel().await).unwrap();

        let (min, max) = parts.hole.bounds();
        assert_relative_eq!(min.x, -3.25, epsilon = 1e-9);
        assert_relative_eq!(max.x, 3.25, epsilon = 1e-9);
        assert_relative_eq!((min.y + max.y) / 2.0, 7.0, epsilon = 1e-9);

        // Removing the hole reduces the hook by roughly a cylinder
        let arch_area = 14.0 * 10.0 + std::f64::consts::PI * 49.0 / 2.0;
        let solid_hook = arch_area * 6.5;
        let cylinder = std::f64::consts::PI * 2.6 * 2.6 * 6.5;
        assert_relative_eq!(parts.u_profile.volume(), solid_hook - cylinder, epsilon = 5.0);
    }

    #[tokio::test]
    async fn test_rounded_is_union_of_parts() {
        let params = ModelParams::default();
        let parts = build_parts(&params, &kernel().await).unwrap();
        let (min, max) = parts.rounded.bounds();
        assert_relative_eq!(min.z, 0.0);
        assert_relative_eq!(max.z, parts.stack.transition_end() + hook_arch_height(), epsilon = 1e-9);
        assert_relative_eq!(min.y, 0.0);
        assert!(parts.rounded.volume() > parts.wall_mount.volume() + parts.rod.volume());
    }

    #[tokio::test]
    async fn test_fillet_selectors_match() {
        for params in [ModelParams::default(), ModelParams::new(50.0, 6.5, 100.0)] {
            let parts = build_parts(&params, &kernel().await).unwrap();
            let topology = Topology::build(&parts.rounded);
            assert!(!plate_rim_edges(&parts.stack, &params).find(&topology).is_empty());
            assert!(!back_edges(&parts.stack, &params).find(&topology).is_empty());
        }
    }

    #[tokio::test]
    async fn test_build_solid_defaults() {
        let params = ModelParams::default();
        let solid = build_solid(&params, &kernel().await).unwrap();
        assert!(solid.volume() > 0.0);

        let (min, max) = solid.bounds();
        assert_relative_eq!(min.z, 0.0, epsilon = 1e-6);
        assert_relative_eq!(max.z, 213.0, epsilon = 1e-6);
        assert_relative_eq!(max.x, 45.0, epsilon = 1e-6);
    }

    #[tokio::test]
    async fn test_invalid_params_fail_fast() {
        let err = build_solid(&ModelParams::new(170.0, 25.0, 45.0), &kernel().await).unwrap_err();
        assert_eq!(err.code(), "INVALID_PARAMETER");
    }
}
