//! Region selection: expands a targeted block into the set of blocks a
//! PowerTool affects.
//!
//! The approach face picks one axis as the depth axis; the other two are
//! radius axes spanning `origin ± radius`. The depth range lies on one side of
//! the origin:
//! - Up, East, North: `[origin - depth, origin]`
//! - Down, West, South: `[origin, origin + depth]`
//!
//! Coordinates are produced with x outermost, then y, then z, so the same
//! inputs always give the same sequence.

use std::ops::RangeInclusive;

use tracing::{debug, warn};

use crate::world::{BlockPos, Face};

/// Largest radius a single action may request
pub const MAX_RADIUS: u32 = 16;
/// Largest depth a single action may request
pub const MAX_DEPTH: u32 = 16;

/// Computes affected block coordinates
#[derive(Debug, Clone, Copy)]
pub struct RegionSelector {
    max_radius: u32,
    max_depth: u32,
}

impl RegionSelector {
    pub fn new(max_radius: u32, max_depth: u32) -> Self {
        Self {
            max_radius,
            max_depth,
        }
    }

    /// Blocks affected by breaking `origin` from `face`
    pub fn select(&self, face: Face, origin: BlockPos, radius: u32, depth: u32) -> Vec<BlockPos> {
        let radius = self.clamp_radius(radius);
        let depth = self.clamp_depth(depth);

        // Bounds stop at the edge of the coordinate space
        let r = i32::try_from(radius).unwrap_or(i32::MAX);
        let d = i32::try_from(depth).unwrap_or(i32::MAX);
        let around = |c: i32| c.saturating_sub(r)..=c.saturating_add(r);
        let behind = |c: i32| c.saturating_sub(d)..=c;
        let ahead = |c: i32| c..=c.saturating_add(d);

        let (xs, ys, zs) = match face {
            Face::Up => (around(origin.x), behind(origin.y), around(origin.z)),
            Face::Down => (around(origin.x), ahead(origin.y), around(origin.z)),
            Face::East => (behind(origin.x), around(origin.y), around(origin.z)),
            Face::West => (ahead(origin.x), around(origin.y), around(origin.z)),
            Face::North => (around(origin.x), around(origin.y), behind(origin.z)),
            Face::South => (around(origin.x), around(origin.y), ahead(origin.z)),
            _ => {
                debug!("No region for face {}", face.name());
                return Vec::new();
            }
        };

        cuboid(xs, ys, zs)
    }

    /// Single horizontal layer at `origin.y`, used for tilling. Only the Up
    /// face yields a region.
    pub fn select_farm(&self, face: Face, origin: BlockPos, radius: u32) -> Vec<BlockPos> {
        if face != Face::Up {
            return Vec::new();
        }
        let r = i32::try_from(self.clamp_radius(radius)).unwrap_or(i32::MAX);
        cuboid(
            origin.x.saturating_sub(r)..=origin.x.saturating_add(r),
            origin.y..=origin.y,
            origin.z.saturating_sub(r)..=origin.z.saturating_add(r),
        )
    }

    fn clamp_radius(&self, radius: u32) -> u32 {
        if radius > self.max_radius {
            warn!("Radius {} exceeds maximum {}, clamping", radius, self.max_radius);
            self.max_radius
        } else {
            radius
        }
    }

    fn clamp_depth(&self, depth: u32) -> u32 {
        if depth > self.max_depth {
            warn!("Depth {} exceeds maximum {}, clamping", depth, self.max_depth);
            self.max_depth
        } else {
            depth
        }
    }
}

impl Default for RegionSelector {
    fn default() -> Self {
        Self::new(MAX_RADIUS, MAX_DEPTH)
    }
}

fn cuboid(
    xs: RangeInclusive<i32>,
    ys: RangeInclusive<i32>,
    zs: RangeInclusive<i32>,
) -> Vec<BlockPos> {
    let len = |r: &RangeInclusive<i32>| {
        usize::try_from(i64::from(*r.end()) - i64::from(*r.start()) + 1).unwrap_or(0)
    };
    let mut out = Vec::with_capacity(len(&xs) * len(&ys) * len(&zs));
    for x in xs {
        for y in ys.clone() {
            for z in zs.clone() {
                out.push(BlockPos::new(x, y, z));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    const FACES: [Face; 6] = [
        Face::Up,
        Face::Down,
        Face::North,
        Face::South,
        Face::East,
        Face::West,
    ];

    #[test]
    fn test_up_face_single_layer() {
        let selector = RegionSelector::default();
        let region = selector.select(Face::Up, BlockPos::new(0, 64, 0), 1, 0);

        let mut expected = Vec::new();
        for x in -1..=1 {
            for z in -1..=1 {
                expected.push(BlockPos::new(x, 64, z));
            }
        }
        assert_eq!(region, expected);
    }

    #[test]
    fn test_depth_side_per_face() {
        let selector = RegionSelector::default();
        let origin = BlockPos::new(10, 20, 30);

        let up = selector.select(Face::Up, origin, 0, 2);
        assert_eq!(up.iter().map(|p| p.y).collect::<Vec<_>>(), vec![18, 19, 20]);

        let down = selector.select(Face::Down, origin, 0, 2);
        assert_eq!(down.iter().map(|p| p.y).collect::<Vec<_>>(), vec![20, 21, 22]);

        let east = selector.select(Face::East, origin, 0, 1);
        assert_eq!(east.iter().map(|p| p.x).collect::<Vec<_>>(), vec![9, 10]);

        let west = selector.select(Face::West, origin, 0, 1);
        assert_eq!(west.iter().map(|p| p.x).collect::<Vec<_>>(), vec![10, 11]);

        let north = selector.select(Face::North, origin, 0, 1);
        assert_eq!(north.iter().map(|p| p.z).collect::<Vec<_>>(), vec![29, 30]);

        let south = selector.select(Face::South, origin, 0, 1);
        assert_eq!(south.iter().map(|p| p.z).collect::<Vec<_>>(), vec![30, 31]);
    }

    #[test]
    fn test_unsupported_face_is_empty() {
        let selector = RegionSelector::default();
        let origin = BlockPos::new(0, 0, 0);
        assert!(selector.select(Face::NorthEast, origin, 1, 1).is_empty());
        assert!(selector.select(Face::Unknown, origin, 1, 1).is_empty());
    }

    #[test]
    fn test_farm_layer() {
        let selector = RegionSelector::default();
        let origin = BlockPos::new(5, 70, -5);
        let layer = selector.select_farm(Face::Up, origin, 2);
        assert_eq!(layer.len(), 25);
        assert!(layer.iter().all(|p| p.y == 70));
        assert!(selector.select_farm(Face::Down, origin, 2).is_empty());
        assert!(selector.select_farm(Face::North, origin, 2).is_empty());
    }

    #[test]
    fn test_oversized_request_is_clamped() {
        let selector = RegionSelector::new(2, 1);
        let region = selector.select(Face::Up, BlockPos::new(0, 0, 0), 100, 100);
        assert_eq!(region.len(), 5 * 5 * 2);
    }

    #[test]
    fn test_extreme_coordinates_do_not_overflow() {
        let selector = RegionSelector::default();

        let high = selector.select(Face::Up, BlockPos::new(i32::MAX, 0, 0), 1, 0);
        assert_eq!(high.len(), 2 * 3);
        assert!(high.iter().all(|p| p.x >= i32::MAX - 1));

        let low = selector.select(Face::West, BlockPos::new(0, i32::MIN, i32::MIN), 2, 3);
        assert_eq!(low.len(), 4 * 3 * 3);
        assert!(low.iter().all(|p| p.y <= i32::MIN + 2 && p.z <= i32::MIN + 2));

        let deep = selector.select(Face::Down, BlockPos::new(0, i32::MAX - 1, 0), 0, 4);
        assert_eq!(deep.iter().map(|p| p.y).collect::<Vec<_>>(), vec![i32::MAX - 1, i32::MAX]);

        for region in [&high, &low, &deep] {
            let unique: HashSet<_> = region.iter().collect();
            assert_eq!(unique.len(), region.len());
        }

        let layer = selector.select_farm(Face::Up, BlockPos::new(i32::MIN, 64, i32::MAX), 1);
        assert_eq!(layer.len(), 2 * 2);
    }

    proptest! {
        #[test]
        fn region_size_and_bounds(
            face_idx in 0usize..6,
            x in -1000i32..1000,
            y in -64i32..320,
            z in -1000i32..1000,
            radius in 0u32..=4,
            depth in 0u32..=4,
        ) {
            let face = FACES[face_idx];
            let origin = BlockPos::new(x, y, z);
            let region = RegionSelector::default().select(face, origin, radius, depth);

            let side = (2 * radius + 1) as usize;
            prop_assert_eq!(region.len(), side * side * (depth as usize + 1));

            let unique: HashSet<_> = region.iter().collect();
            prop_assert_eq!(unique.len(), region.len());

            let (r, d) = (radius as i32, depth as i32);
            for p in &region {
                let (dx, dy, dz) = (p.x - x, p.y - y, p.z - z);
                let (depth_offset, a, b) = match face {
                    Face::Up | Face::Down => (dy, dx, dz),
                    Face::East | Face::West => (dx, dy, dz),
                    _ => (dz, dx, dy),
                };
                prop_assert!(a.abs() <= r && b.abs() <= r);
                match face {
                    Face::Up | Face::East | Face::North => prop_assert!((-d..=0).contains(&depth_offset)),
                    _ => prop_assert!((0..=d).contains(&depth_offset)),
                }
            }
        }

        #[test]
        fn region_is_deterministic(radius in 0u32..=3, depth in 0u32..=3, face_idx in 0usize..6) {
            let selector = RegionSelector::default();
            let origin = BlockPos::new(3, 4, 5);
            prop_assert_eq!(
                selector.select(FACES[face_idx], origin, radius, depth),
                selector.select(FACES[face_idx], origin, radius, depth)
            );
        }
    }
}
