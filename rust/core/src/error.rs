// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for parameter handling
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised before any geometry is built
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: String,
    },
}

impl Error {
    /// Shorthand for an [`Error::InvalidParameter`]
    pub fn invalid(name: &'static str, value: f64, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            value,
            reason: reason.into(),
        }
    }

    /// Name of the offending parameter
    pub fn parameter(&self) -> &'static str {
        match self {
            Error::InvalidParameter { name, .. } => name,
        }
    }
}
