// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry values with an explicit kind
//!
//! Operations take the concrete type they need. A [`Shape`] is what
//! flows between pipeline steps whose kind is only known at run time;
//! the `into_*` accessors turn a wrong kind into [`Error::ShapeKind`]
//! instead of passing it on.

use std::fmt;

use crate::error::{Error, Result};
use crate::sketch::{Sketch, Wire};
use crate::solid::Solid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Sketch,
    Wire,
    Solid,
    Compound,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::Sketch => "Sketch",
            ShapeKind::Wire => "Wire",
            ShapeKind::Solid => "Solid",
            ShapeKind::Compound => "Compound",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub enum Shape {
    Sketch(Sketch),
    Wire(Wire),
    Solid(Solid),
    /// Several disjoint solids
    Compound(Vec<Solid>),
}

impl Shape {
    #[inline]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Sketch(_) => ShapeKind::Sketch,
            Shape::Wire(_) => ShapeKind::Wire,
            Shape::Solid(_) => ShapeKind::Solid,
            Shape::Compound(_) => ShapeKind::Compound,
        }
    }

    #[inline]
    fn mismatch(&self, expected: ShapeKind) -> Error {
        Error::ShapeKind {
            expected,
            actual: self.kind(),
        }
    }

    /// Wrap the shells of a solid, as a compound when there is more than one
    pub fn from_shells(mut shells: Vec<Solid>) -> Self {
        if shells.len() == 1 {
            if let Some(solid) = shells.pop() {
                return Shape::Solid(solid);
            }
        }
        Shape::Compound(shells)
    }

    pub fn into_sketch(self) -> Result<Sketch> {
        match self {
            Shape::Sketch(sketch) => Ok(sketch),
            other => Err(other.mismatch(ShapeKind::Sketch)),
        }
    }

    pub fn as_sketch(&self) -> Result<&Sketch> {
        match self {
            Shape::Sketch(sketch) => Ok(sketch),
            other => Err(other.mismatch(ShapeKind::Sketch)),
        }
    }

    /// A wire, or the boundary wire of a sketch
    pub fn into_wire(self) -> Result<Wire> {
        match self {
            Shape::Wire(wire) => Ok(wire),
            Shape::Sketch(sketch) => Ok(sketch.wire()),
            other => Err(other.mismatch(ShapeKind::Wire)),
        }
    }

    /// A solid, or a compound holding exactly one solid
    pub fn into_solid(self) -> Result<Solid> {
        match self {
            Shape::Solid(solid) => Ok(solid),
            Shape::Compound(mut solids) if solids.len() == 1 => solids
                .pop()
                .ok_or(Error::EmptyResult("compound")),
            other => Err(other.mismatch(ShapeKind::Solid)),
        }
    }
}

impl From<Sketch> for Shape {
    fn from(sketch: Sketch) -> Self {
        Shape::Sketch(sketch)
    }
}

impl From<Wire> for Shape {
    fn from(wire: Wire) -> Self {
        Shape::Wire(wire)
    }
}

impl From<Solid> for Shape {
    fn from(solid: Solid) -> Self {
        Shape::Solid(solid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::build_u_sketch;

    #[test]
    fn test_wire_is_not_a_sketch() {
        let wire = Shape::from(build_u_sketch(12.0, 0.0).unwrap().wire());
        let err = wire.into_sketch().unwrap_err();
        assert_eq!(
            err,
            Error::ShapeKind {
                expected: ShapeKind::Sketch,
                actual: ShapeKind::Wire
            }
        );
        assert_eq!(err.to_string(), "Expected a Sketch shape, got Wire");
    }

    #[test]
    fn test_sketch_converts_to_wire() {
        let shape = Shape::from(build_u_sketch(12.0, 0.0).unwrap());
        assert_eq!(shape.kind(), ShapeKind::Sketch);
        assert!(shape.as_sketch().is_ok());
        assert_eq!(shape.into_wire().unwrap().len(), 19);
    }

    #[test]
    fn test_empty_compound_is_not_a_solid() {
        let shape = Shape::from_shells(Vec::new());
        assert_eq!(shape.kind(), ShapeKind::Compound);
        assert!(shape.into_solid().is_err());
    }
}
