// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for model builds
pub type Result<T> = std::result::Result<T, BuildError>;

/// Why a build produced no model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    /// Rejected before any geometry was built
    #[error(transparent)]
    Parameter(#[from] lightholder_core::Error),

    /// The kernel rejected an operation
    #[error("Geometry error: {0}")]
    Geometry(#[from] lightholder_geometry::Error),

    #[error("Kernel bootstrap failed: {0}")]
    Kernel(String),
}

impl BuildError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            BuildError::Parameter(_) => "INVALID_PARAMETER",
            BuildError::Geometry(_) => "GEOMETRY_ERROR",
            BuildError::Kernel(_) => "KERNEL_ERROR",
        }
    }
}
