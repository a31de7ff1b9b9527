//! # Selection Module
//!
//! An actor marks a region by setting two corners. The region is the
//! axis-aligned box spanning both corners, inclusive on every axis.
//!
//! Min and max per axis are derived from the corners whenever they are
//! needed and never stored, so setting a corner can never leave stale bounds
//! behind.

pub mod store;

use cgmath::Point3;
pub use store::SelectionStore;

use super::voxels::grid::{Position, WorldId};

/// One corner of a selection: a position in a specific world.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Corner {
    pub world: WorldId,
    pub position: Position,
}

/// Two optional corners.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_edit::{Selection, WorldId};
///
/// let mut selection = Selection::default();
/// assert_eq!(selection.volume(), None);
///
/// selection.set_corner_a(WorldId(0), Point3::new(0, 0, 0));
/// selection.set_corner_b(WorldId(0), Point3::new(2, 1, 0));
/// assert_eq!(selection.volume(), Some(6));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    corner_a: Option<Corner>,
    corner_b: Option<Corner>,
}

impl Selection {
    /// Creates a selection with both corners already set.
    pub fn from_corners(world: WorldId, a: Position, b: Position) -> Self {
        Selection {
            corner_a: Some(Corner { world, position: a }),
            corner_b: Some(Corner { world, position: b }),
        }
    }

    /// Sets the first corner, replacing any previous value.
    pub fn set_corner_a(&mut self, world: WorldId, position: Position) {
        self.corner_a = Some(Corner { world, position });
    }

    /// Sets the second corner, replacing any previous value.
    pub fn set_corner_b(&mut self, world: WorldId, position: Position) {
        self.corner_b = Some(Corner { world, position });
    }

    pub fn corner_a(&self) -> Option<Corner> {
        self.corner_a
    }

    pub fn corner_b(&self) -> Option<Corner> {
        self.corner_b
    }

    /// Both corners are set and lie in the same world.
    pub fn is_complete(&self) -> bool {
        self.complete_corners().is_some()
    }

    fn complete_corners(&self) -> Option<(Corner, Corner)> {
        match (self.corner_a, self.corner_b) {
            (Some(a), Some(b)) if a.world == b.world => Some((a, b)),
            _ => None,
        }
    }

    /// The world of a complete selection.
    pub fn world(&self) -> Option<WorldId> {
        self.complete_corners().map(|(a, _)| a.world)
    }

    /// The box spanned by the corners, or `None` while incomplete.
    pub fn bounds(&self) -> Option<Bounds> {
        self.complete_corners()
            .map(|(a, b)| Bounds::spanning(a.position, b.position))
    }

    /// Number of positions in the box, or `None` while incomplete.
    pub fn volume(&self) -> Option<u64> {
        self.bounds().map(|bounds| bounds.volume())
    }

    /// Forgets both corners.
    pub fn clear(&mut self) {
        self.corner_a = None;
        self.corner_b = None;
    }
}

/// An inclusive axis-aligned box of block positions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub min: Position,
    pub max: Position,
}

impl Bounds {
    /// The smallest box containing both positions.
    pub fn spanning(a: Position, b: Position) -> Self {
        Bounds {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    fn extent(min: i32, max: i32) -> u64 {
        (i64::from(max) - i64::from(min) + 1) as u64
    }

    /// Product of the inclusive extents, saturating at `u64::MAX`.
    pub fn volume(&self) -> u64 {
        Self::extent(self.min.x, self.max.x)
            .saturating_mul(Self::extent(self.min.y, self.max.y))
            .saturating_mul(Self::extent(self.min.z, self.max.z))
    }

    pub fn contains(&self, pos: Position) -> bool {
        (self.min.x..=self.max.x).contains(&pos.x)
            && (self.min.y..=self.max.y).contains(&pos.y)
            && (self.min.z..=self.max.z).contains(&pos.z)
    }

    /// Every position in the box: x outermost, then y, then z innermost.
    pub fn iter(&self) -> BoundsIter {
        BoundsIter {
            bounds: *self,
            next: Some(self.min),
        }
    }
}

impl IntoIterator for Bounds {
    type Item = Position;
    type IntoIter = BoundsIter;

    fn into_iter(self) -> BoundsIter {
        self.iter()
    }
}

/// Iterator over a [`Bounds`], see [`Bounds::iter`].
pub struct BoundsIter {
    bounds: Bounds,
    next: Option<Position>,
}

impl Iterator for BoundsIter {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        let current = self.next?;
        let Bounds { min, max } = self.bounds;

        self.next = if current.z < max.z {
            Some(Point3::new(current.x, current.y, current.z + 1))
        } else if current.y < max.y {
            Some(Point3::new(current.x, current.y + 1, min.z))
        } else if current.x < max.x {
            Some(Point3::new(current.x + 1, min.y, min.z))
        } else {
            None
        };

        Some(current)
    }
}
