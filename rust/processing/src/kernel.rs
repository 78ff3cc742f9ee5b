// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ready handle for the geometry kernel

use lightholder_geometry::{
    draw, extrude, fuse, Plane, PlaneName, Sketch, TagAllocator, Tessellation,
};
use tracing::debug;

use crate::error::{BuildError, Result};

/// Proof that the kernel has been set up; every build takes one
#[derive(Debug, Clone)]
pub struct Kernel {
    tessellation: Tessellation,
}

impl Kernel {
    /// Bootstrap with the default arc resolution
    pub async fn init() -> Result<Kernel> {
        Self::with_tessellation(Tessellation::default()).await
    }

    /// Bootstrap with a custom arc resolution.
    ///
    /// Runs a tiny boolean once so a broken kernel fails here rather than
    /// in the middle of a model build.
    pub async fn with_tessellation(tessellation: Tessellation) -> Result<Kernel> {
        if tessellation.segments_per_turn < 8 || tessellation.fillet_segments < 2 {
            return Err(BuildError::Kernel(format!(
                "arc resolution too coarse: {} per turn, {} per fillet",
                tessellation.segments_per_turn, tessellation.fillet_segments
            )));
        }
        self_check().map_err(|e| BuildError::Kernel(e.to_string()))?;
        debug!(
            segments_per_turn = tessellation.segments_per_turn,
            fillet_segments = tessellation.fillet_segments,
            "kernel ready"
        );
        Ok(Kernel { tessellation })
    }

    #[inline]
    pub fn tessellation(&self) -> &Tessellation {
        &self.tessellation
    }
}

/// Two overlapping unit cubes must fuse to a 1.5 mm³ solid
fn self_check() -> lightholder_geometry::Result<()> {
    let square = draw(0.0, 0.0).h_line(1.0).v_line(1.0).h_line(-1.0).close()?;
    let mut tags = TagAllocator::new();
    let a = extrude(&Sketch::new(square.clone(), Plane::named(PlaneName::XY)), 1.0, &mut tags)?;
    let b = extrude(&Sketch::new(square, Plane::offset(PlaneName::XY, 0.5)), 1.0, &mut tags)?;
    let volume = fuse(&a, &b)?.volume();
    if (volume - 1.5).abs() > 1e-6 {
        return Err(lightholder_geometry::Error::EmptyResult("fuse"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init() {
        let kernel = Kernel::init().await.unwrap();
        assert_eq!(kernel.tessellation(), &Tessellation::default());
    }

    #[tokio::test]
    async fn test_coarse_tessellation_rejected() {
        let coarse = Tessellation {
            segments_per_turn: 4,
            fillet_segments: 8,
        };
        let err = Kernel::with_tessellation(coarse).await.unwrap_err();
        assert_eq!(err.code(), "KERNEL_ERROR");
    }
}
