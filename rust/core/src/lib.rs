// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Light Holder Core
//!
//! Parameters and profile sequencing for the plant light holder model.
//!
//! ## Overview
//!
//! - **Parameters**: [`ModelParams`] with published ranges and a fast-fail
//!   [`ModelParams::validate`] gate
//! - **Dimensions**: fixed structural constants in [`dimensions`]
//! - **Profile Sequencer**: [`build_profile_stack`] computes the ordered
//!   cross-section stations of the wall plate, neck and tip
//!
//! ## Quick Start
//!
//! ```rust
//! use lightholder_core::{build_profile_stack, ModelParams};
//!
//! let stack = build_profile_stack(&ModelParams::default()).unwrap();
//! assert_eq!(stack.transition_end(), 196.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: camelCase (de)serialization of parameters and stations

pub mod dimensions;
pub mod error;
pub mod params;
pub mod profile_stack;

pub use error::{Error, Result};
pub use params::{ModelParams, ParamRange, ParamRanges, PartialParams};
pub use profile_stack::{build_profile_stack, ProfileStack, ProfileStation, StationRole};
