// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Profile sequencing
//!
//! Turns [`ModelParams`] into the ordered stack of cross-section stations
//! used to place the wall plate, loft the neck and seat the hook.

use crate::dimensions::{
    ROD_RADIUS, TIP_RADIUS, TRANSITION_HEIGHT, TRANSITION_THICKNESS, WALL_MOUNT_THICKNESS,
};
use crate::error::{Error, Result};
use crate::params::ModelParams;

/// What a station marks along the up-axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum StationRole {
    WallMountBase,
    RodBottom,
    RodTop,
    TransitionTop,
    TransitionEnd,
}

/// One cross-section: height on the up-axis and U-sketch half-width
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileStation {
    pub z: f64,
    pub radius: f64,
    pub role: StationRole,
}

/// Stations ordered by strictly increasing `z`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileStack {
    stations: [ProfileStation; 5],
}

impl ProfileStack {
    #[inline]
    pub fn stations(&self) -> &[ProfileStation] {
        &self.stations
    }

    /// Station 0, the bottom of the wall plate
    #[inline]
    pub fn wall_mount(&self) -> &ProfileStation {
        &self.stations[0]
    }

    /// Stations 1 to 4 in loft order
    #[inline]
    pub fn loft_stations(&self) -> &[ProfileStation] {
        &self.stations[1..]
    }

    /// Height of the top face of the wall plate
    #[inline]
    pub fn wall_mount_top(&self) -> f64 {
        self.stations[1].z
    }

    #[inline]
    pub fn transition_top(&self) -> f64 {
        self.stations[3].z
    }

    #[inline]
    pub fn transition_end(&self) -> f64 {
        self.stations[4].z
    }
}

/// Build the profile stack for `params`.
///
/// ```text
/// z0 = 0                        radius = baseWidth
/// z1 = WALL_MOUNT_THICKNESS     radius = ROD_RADIUS
/// z2 = z1 + neckLength          radius = ROD_RADIUS
/// z3 = z2 + TRANSITION_HEIGHT   radius = TIP_RADIUS
/// z4 = z3 + TRANSITION_THICKNESS radius = TIP_RADIUS
/// ```
pub fn build_profile_stack(params: &ModelParams) -> Result<ProfileStack> {
    params.validate()?;

    let z0 = 0.0;
    let z1 = WALL_MOUNT_THICKNESS;
    let z2 = z1 + params.neck_length;
    let z3 = z2 + TRANSITION_HEIGHT;
    let z4 = z3 + TRANSITION_THICKNESS;

    let stations = [
        ProfileStation {
            z: z0,
            radius: params.base_width,
            role: StationRole::WallMountBase,
        },
        ProfileStation {
            z: z1,
            radius: ROD_RADIUS,
            role: StationRole::RodBottom,
        },
        ProfileStation {
            z: z2,
            radius: ROD_RADIUS,
            role: StationRole::RodTop,
        },
        ProfileStation {
            z: z3,
            radius: TIP_RADIUS,
            role: StationRole::TransitionTop,
        },
        ProfileStation {
            z: z4,
            radius: TIP_RADIUS,
            role: StationRole::TransitionEnd,
        },
    ];

    if let Some(pair) = stations.windows(2).find(|pair| pair[1].z <= pair[0].z) {
        return Err(Error::invalid(
            "neckLength",
            params.neck_length,
            format!(
                "profile stations out of order at z = {} -> {}",
                pair[0].z, pair[1].z
            ),
        ));
    }

    Ok(ProfileStack { stations })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_stack_positions() {
        let stack = build_profile_stack(&ModelParams::default()).unwrap();
        let z: Vec<f64> = stack.stations().iter().map(|s| s.z).collect();
        assert_eq!(z, vec![0.0, 8.0, 178.0, 188.0, 196.0]);
        assert_relative_eq!(stack.transition_top(), 188.0);
        assert_relative_eq!(stack.transition_end(), 196.0);
        assert_eq!(stack.wall_mount().radius, 45.0);
    }

    #[test]
    fn test_stack_strictly_increasing_over_range() {
        for neck in [50.0, 51.5, 120.0, 299.0, 300.0] {
            let stack = build_profile_stack(&ModelParams::new(neck, 6.5, 45.0)).unwrap();
            assert!(stack.stations().windows(2).all(|w| w[0].z < w[1].z));
        }
    }

    #[test]
    fn test_loft_stations_order_and_radii() {
        let stack = build_profile_stack(&ModelParams::new(90.0, 3.0, 30.0)).unwrap();
        let roles: Vec<StationRole> = stack.loft_stations().iter().map(|s| s.role).collect();
        assert_eq!(
            roles,
            vec![
                StationRole::RodBottom,
                StationRole::RodTop,
                StationRole::TransitionTop,
                StationRole::TransitionEnd
            ]
        );
        let radii: Vec<f64> = stack.loft_stations().iter().map(|s| s.radius).collect();
        assert_eq!(radii, vec![12.0, 12.0, 14.0, 14.0]);
    }

    #[test]
    fn test_invalid_params_fail_fast() {
        assert!(build_profile_stack(&ModelParams::new(170.0, 25.0, 45.0)).is_err());
        assert!(build_profile_stack(&ModelParams::new(10.0, 6.5, 45.0)).is_err());
    }
}
