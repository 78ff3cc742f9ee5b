// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! User-facing model parameters and their validation.

use crate::dimensions::{hole_radius, ROD_RADIUS, TIP_RADIUS};
use crate::error::{Error, Result};

/// Accepted range and default of one parameter (millimetres, inclusive)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl ParamRange {
    #[inline]
    pub const fn new(min: f64, max: f64, default: f64) -> Self {
        Self { min, max, default }
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn check(&self, name: &'static str, value: f64) -> Result<f64> {
        if !value.is_finite() {
            return Err(Error::invalid(name, value, "must be a finite number"));
        }
        if value <= 0.0 {
            return Err(Error::invalid(name, value, "must be strictly positive"));
        }
        if !self.contains(value) {
            return Err(Error::invalid(
                name,
                value,
                format!("must be within {}..={} mm", self.min, self.max),
            ));
        }
        Ok(value)
    }
}

pub const NECK_LENGTH: ParamRange = ParamRange::new(50.0, 300.0, 170.0);
pub const NECK_THICKNESS: ParamRange = ParamRange::new(2.0, 20.0, 6.5);
pub const BASE_WIDTH: ParamRange = ParamRange::new(20.0, 100.0, 45.0);

/// Published ranges of all parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ParamRanges {
    pub neck_length: ParamRange,
    pub neck_thickness: ParamRange,
    pub base_width: ParamRange,
}

/// The sole external input of the model
///
/// `neck_thickness` is also the thickness of the hook; `base_width` is the
/// half-width of the wall plate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ModelParams {
    pub neck_length: f64,
    pub neck_thickness: f64,
    pub base_width: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            neck_length: NECK_LENGTH.default,
            neck_thickness: NECK_THICKNESS.default,
            base_width: BASE_WIDTH.default,
        }
    }
}

impl ModelParams {
    pub fn new(neck_length: f64, neck_thickness: f64, base_width: f64) -> Self {
        Self {
            neck_length,
            neck_thickness,
            base_width,
        }
    }

    pub const fn ranges() -> ParamRanges {
        ParamRanges {
            neck_length: NECK_LENGTH,
            neck_thickness: NECK_THICKNESS,
            base_width: BASE_WIDTH,
        }
    }

    /// Check every field against its range, then the combination.
    ///
    /// This is the cheap fast-fail gate run before any kernel call.
    pub fn validate(&self) -> Result<()> {
        NECK_LENGTH.check("neckLength", self.neck_length)?;
        NECK_THICKNESS.check("neckThickness", self.neck_thickness)?;
        BASE_WIDTH.check("baseWidth", self.base_width)?;

        // The hook stands on the tip cross-section, which is 2 * TIP_RADIUS wide.
        if self.neck_thickness >= 2.0 * TIP_RADIUS {
            return Err(Error::invalid(
                "neckThickness",
                self.neck_thickness,
                "hook would be wider than the tip it stands on",
            ));
        }
        // The plate has to stick out past the neck.
        if self.base_width <= ROD_RADIUS {
            return Err(Error::invalid(
                "baseWidth",
                self.base_width,
                "wall plate must be wider than the neck",
            ));
        }
        if hole_radius(self.neck_thickness) * 2.0 >= self.neck_thickness {
            return Err(Error::invalid(
                "neckThickness",
                self.neck_thickness,
                "mounting hole does not fit inside the hook",
            ));
        }
        Ok(())
    }

    /// Copy of `self` with the fields present in `partial` replaced
    pub fn merged(&self, partial: &PartialParams) -> Self {
        Self {
            neck_length: partial.neck_length.unwrap_or(self.neck_length),
            neck_thickness: partial.neck_thickness.unwrap_or(self.neck_thickness),
            base_width: partial.base_width.unwrap_or(self.base_width),
        }
    }
}

/// A parameter override where every field is optional
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct PartialParams {
    pub neck_length: Option<f64>,
    pub neck_thickness: Option<f64>,
    pub base_width: Option<f64>,
}

impl PartialParams {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.neck_length.is_none() && self.neck_thickness.is_none() && self.base_width.is_none()
    }
}

impl From<ModelParams> for PartialParams {
    fn from(params: ModelParams) -> Self {
        Self {
            neck_length: Some(params.neck_length),
            neck_thickness: Some(params.neck_thickness),
            base_width: Some(params.base_width),
        }
    }
}
