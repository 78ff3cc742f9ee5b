// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tagged boolean operations
//!
//! Booleans run on csgrs BSP trees. Every polygon carries the [`FaceTag`] of
//! the construction face it came from, and the operations here are chosen
//! so that tags survive: a cut is the intersection with the inverted tool
//! rather than csgrs' difference, which re-tags the tool's faces.

use csgrs::traits::CSG;

use crate::error::Result;
use crate::solid::Solid;

/// Identifies the construction face a polygon belongs to
///
/// Tag 0 is never handed out; it reads as "untagged".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceTag(pub u32);

/// Hands out fresh face tags, in order
///
/// One allocator per model build keeps tags, and therefore edge ids,
/// identical between builds of the same parameters.
#[derive(Debug, Clone)]
pub struct TagAllocator {
    next: u32,
}

impl Default for TagAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl TagAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn next_tag(&mut self) -> FaceTag {
        let tag = FaceTag(self.next);
        self.next += 1;
        tag
    }

    /// Number of tags handed out so far
    #[inline]
    pub fn issued(&self) -> u32 {
        self.next - 1
    }
}

/// Union of two solids
pub fn fuse(a: &Solid, b: &Solid) -> Result<Solid> {
    let result = a.csg().union(b.csg());
    Solid::from_polygons(result.polygons, "fuse")
}

/// `a` with `b` removed
pub fn cut(a: &Solid, b: &Solid) -> Result<Solid> {
    let result = a.csg().intersection(&b.csg().inverse());
    Solid::from_polygons(result.polygons, "cut")
}

/// Common part of two solids
pub fn intersect(a: &Solid, b: &Solid) -> Result<Solid> {
    let result = a.csg().intersection(b.csg());
    Solid::from_polygons(result.polygons, "intersect")
}

/// Union of many solids, folded left to right
pub fn fuse_all(solids: &[Solid]) -> Result<Option<Solid>> {
    let mut iter = solids.iter();
    let Some(first) = iter.next() else {
        return Ok(None);
    };
    let mut acc = first.clone();
    for solid in iter {
        acc = fuse(&acc, solid)?;
    }
    Ok(Some(acc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::solid::tests::tagged_box;
    use crate::Point3;
    use approx::assert_relative_eq;

    fn unit_box(x: f64, tag: u32) -> Solid {
        tagged_box(Point3::new(x, 0.0, 0.0), Point3::new(x + 2.0, 2.0, 2.0), tag)
    }

    #[test]
    fn test_fuse_overlapping_boxes() {
        let a = unit_box(0.0, 1);
        let b = unit_box(1.0, 11);
        let fused = fuse(&a, &b).unwrap();
        assert_relative_eq!(fused.volume(), 12.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cut_keeps_tool_tags() {
        let a = unit_box(0.0, 1);
        let b = unit_box(1.0, 11);
        let result = cut(&a, &b).unwrap();
        assert_relative_eq!(result.volume(), 4.0, epsilon = 1e-6);
        // The new wall at x = 1 is the tool's x-min face
        assert!(result.face_tags().contains(&FaceTag(15)));
        assert!(!result.face_tags().contains(&FaceTag(16)));
    }

    #[test]
    fn test_intersect() {
        let a = unit_box(0.0, 1);
        let b = unit_box(1.0, 11);
        let common = intersect(&a, &b).unwrap();
        assert_relative_eq!(common.volume(), 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_disjoint_intersection_is_empty() {
        let a = unit_box(0.0, 1);
        let b = unit_box(5.0, 11);
        assert_eq!(intersect(&a, &b).unwrap_err(), Error::EmptyResult("intersect"));
    }

    #[test]
    fn test_tag_allocator_is_sequential() {
        let mut tags = TagAllocator::new();
        assert_eq!(tags.next_tag(), FaceTag(1));
        assert_eq!(tags.next_tag(), FaceTag(2));
        assert_eq!(tags.issued(), 2);
    }

    #[test]
    fn test_fuse_all() {
        let boxes = vec![unit_box(0.0, 1), unit_box(4.0, 11), unit_box(8.0, 21)];
        let all = fuse_all(&boxes).unwrap().unwrap();
        assert_relative_eq!(all.volume(), 24.0, epsilon = 1e-6);
        assert!(fuse_all(&[]).unwrap().is_none());
    }
}
