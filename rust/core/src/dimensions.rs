// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed structural dimensions of the holder (millimetres).
//!
//! These are not user-tunable. Everything that scales with the user's
//! input lives in [`crate::ModelParams`].

/// Thickness of the U-shaped wall plate.
pub const WALL_MOUNT_THICKNESS: f64 = 8.0;

/// Half-width of the neck cross-section.
pub const ROD_RADIUS: f64 = 12.0;

/// Half-width of the cross-section at the tip, also the span of the hook arch.
pub const TIP_RADIUS: f64 = 14.0;

/// Height over which the neck widens from [`ROD_RADIUS`] to [`TIP_RADIUS`].
pub const TRANSITION_HEIGHT: f64 = 10.0;

/// Height of the straight section above the widening.
pub const TRANSITION_THICKNESS: f64 = 8.0;

/// Height of the hook above the neck.
pub const HOOK_HEIGHT: f64 = 16.0;

/// Height of the straight legs of the hook arch.
pub const U_CURVE_HEIGHT: f64 = 10.0;

/// Nominal radius of the mounting hole punched through the hook.
pub const HOLE_RADIUS: f64 = 2.6;

/// Largest hole radius allowed relative to the hook thickness.
///
/// Keeps at least a fifth of the thickness as wall on each side of the hole.
pub const HOLE_RADIUS_THICKNESS_RATIO: f64 = 0.4;

/// Hole radius for a hook of the given thickness.
///
/// Thin hooks get a smaller hole so the radius always stays below half the
/// thickness: `min(HOLE_RADIUS, 0.4 * thickness)`.
#[inline]
pub fn hole_radius(hook_thickness: f64) -> f64 {
    HOLE_RADIUS.min(HOLE_RADIUS_THICKNESS_RATIO * hook_thickness)
}

/// Height of the top of the hook arch above its base.
#[inline]
pub fn hook_arch_height() -> f64 {
    U_CURVE_HEIGHT + TIP_RADIUS / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hole_radius_nominal_for_default_thickness() {
        assert_eq!(hole_radius(6.5), HOLE_RADIUS);
    }

    #[test]
    fn test_hole_radius_clamped_for_thin_hooks() {
        let r = hole_radius(2.0);
        assert!((r - 0.8).abs() < 1e-12);
        assert!(r < 1.0);
    }

    #[test]
    fn test_arch_fits_inside_keep_volume() {
        assert!(hook_arch_height() < HOOK_HEIGHT + U_CURVE_HEIGHT);
    }
}
