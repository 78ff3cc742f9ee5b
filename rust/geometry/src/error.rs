// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::shape::ShapeKind;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or exporting geometry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid extrusion parameters: {0}")]
    InvalidExtrusion(String),

    #[error("Invalid loft: {0}")]
    InvalidLoft(String),

    #[error("Expected a {expected} shape, got {actual}")]
    ShapeKind {
        expected: ShapeKind,
        actual: ShapeKind,
    },

    #[error("Boolean {0} produced an empty solid")]
    EmptyResult(&'static str),

    #[error("No edges matched the fillet selector")]
    NoEdgesSelected,

    #[error("Fillet of radius {radius} failed: {reason}")]
    FilletFailed { radius: f64, reason: String },

    #[error("Invalid STL data: {0}")]
    InvalidStl(String),
}

impl Error {
    #[inline]
    pub(crate) fn fillet(radius: f64, reason: impl Into<String>) -> Self {
        Error::FilletFailed {
            radius,
            reason: reason.into(),
        }
    }
}
