//! Keep-area overlay (C9): a static list of rectangles that, when a tile
//! falls inside one, splices a baseline map's collision bits into a freshly
//! built map instead of whatever the builder computed.

use crate::collision::{ADDR_E, ADDR_N};
use crate::error::Result;
use crate::tile_data::{TileDataReader, TileDataWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepRectangle {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
    pub plane: i32,
}

impl KeepRectangle {
    pub fn contains(&self, x: i32, y: i32, plane: i32) -> bool {
        plane == self.plane && x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Copies `baseline`'s N and E bits at `(x, y, plane)` into `writer` if the
/// tile lies in any rectangle of `areas`. Returns whether it applied.
pub fn override_tile_collision_if_applicable<B, W>(
    areas: &[KeepRectangle],
    baseline: &B,
    writer: &mut W,
    x: i32,
    y: i32,
    plane: i32,
) -> Result<bool>
where
    B: TileDataReader,
    W: TileDataWriter,
{
    if !areas.iter().any(|rect| rect.contains(x, y, plane)) {
        return Ok(false);
    }

    for addr in [ADDR_N, ADDR_E] {
        if baseline.is_bit_set(x, y, plane, addr)? {
            writer.set_bit(x, y, plane, addr)?;
        } else {
            writer.clear_bit(x, y, plane, addr)?;
        }
    }

    Ok(true)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coord::CoordIndexer;
    use crate::sparse::SparseBitset;
    use crate::tile_data::BitPlaneMap;

    fn rect() -> KeepRectangle {
        KeepRectangle { min_x: 595, min_y: 95, max_x: 605, max_y: 105, plane: 0 }
    }

    #[test]
    fn outside_any_rectangle_does_nothing() {
        let indexer = CoordIndexer::contiguous_2_addresses();
        let baseline = BitPlaneMap::new(indexer, SparseBitset::new());
        let mut writer = BitPlaneMap::new(indexer, SparseBitset::new());

        let applied = override_tile_collision_if_applicable(&[rect()], &baseline, &mut writer, 700, 700, 0).unwrap();
        assert!(!applied);
    }

    #[test]
    fn inside_rectangle_copies_baseline_bits() {
        let indexer = CoordIndexer::contiguous_2_addresses();
        let mut baseline = BitPlaneMap::new(indexer, SparseBitset::new());
        baseline.set_bit(600, 100, 0, ADDR_N).unwrap();

        let mut writer = BitPlaneMap::new(indexer, SparseBitset::new());
        writer.set_bit(600, 100, 0, ADDR_E).unwrap();

        let applied = override_tile_collision_if_applicable(&[rect()], &baseline, &mut writer, 600, 100, 0).unwrap();
        assert!(applied);
        assert!(writer.is_bit_set(600, 100, 0, ADDR_N).unwrap());
        assert!(!writer.is_bit_set(600, 100, 0, ADDR_E).unwrap());
    }
}
