//! Boat-fit processor (C7): a geometric predicate over a collision map and a
//! tile-type map, asking whether a square boat of a given edge length can be
//! centered at a tile. Output is a fresh collision map under
//! [`Semantics::Walkable`], parallelized by X column the way the reference
//! crate's `compression` module parallel-encodes by scanline
//! (`(range).into_par_iter().map(...)`).

use crate::collision::{CollisionMap, Semantics};
use crate::error::{Error, Result};
use crate::progress::{CancellationToken, Progress};
use crate::tile_data::{SharedWriter, SynchronizedWriter, TileDataReader, TileDataWriter};
use crate::tile_type::TileTypeMap;
use rayon::prelude::*;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Inclusive world bounds used only for the boat-fit area check; independent
/// of whatever validation mode the underlying indexers use.
#[derive(Debug, Clone, Copy)]
pub struct WorldBounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl WorldBounds {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Checks whether every tile of the `n × n` area anchored at
/// `(min_x, min_y)` is in bounds, is water, and has the pathability the
/// fit predicate requires of its position in the square (§4.7).
fn area_passes<R, T>(
    collision: &CollisionMap<R>,
    tile_types: &TileTypeMap<T>,
    bounds: &WorldBounds,
    min_x: i32,
    min_y: i32,
    n: u32,
    plane: i32,
) -> Result<bool>
where
    R: TileDataReader,
    T: TileDataReader,
{
    let max_x = min_x + n as i32 - 1;
    let max_y = min_y + n as i32 - 1;

    for x in min_x..=max_x {
        for y in min_y..=max_y {
            if !bounds.contains(x, y) {
                return Ok(false);
            }

            if !tile_types.is_water(x, y, plane)? {
                return Ok(false);
            }

            // At most two inward cardinals apply (a corner); a plain `Vec` would
            // allocate for what is almost always 0-2 elements.
            let mut required: SmallVec<[bool; 2]> = SmallVec::new();
            if y == max_y {
                required.push(collision.pathable_south(x, y, plane)?);
            }
            if y == min_y {
                required.push(collision.pathable_north(x, y, plane)?);
            }
            if x == min_x {
                required.push(collision.pathable_east(x, y, plane)?);
            }
            if x == max_x {
                required.push(collision.pathable_west(x, y, plane)?);
            }

            let ok = if required.is_empty() {
                collision.pathable_north(x, y, plane)?
                    && collision.pathable_east(x, y, plane)?
                    && collision.pathable_south(x, y, plane)?
                    && collision.pathable_west(x, y, plane)?
            } else {
                required.into_iter().all(|pathable| pathable)
            };

            if !ok {
                return Ok(false);
            }
        }
    }

    Ok(true)
}

/// Whether a boat of edge length `n` can be centered at `(cx, cy, plane)`.
pub fn boat_fits<R, T>(
    collision: &CollisionMap<R>,
    tile_types: &TileTypeMap<T>,
    bounds: &WorldBounds,
    cx: i32,
    cy: i32,
    plane: i32,
    n: u32,
) -> Result<bool>
where
    R: TileDataReader,
    T: TileDataReader,
{
    if n == 0 {
        return Err(Error::invalid_value("boat edge length must be >= 1"));
    }

    let half = (n / 2) as i32;

    if n % 2 == 1 {
        return area_passes(collision, tile_types, bounds, cx - half, cy - half, n, plane);
    }

    for dx in 0..2 {
        for dy in 0..2 {
            if area_passes(collision, tile_types, bounds, cx - half + dx, cy - half + dy, n, plane)? {
                return Ok(true);
            }
        }
    }

    Ok(false)
}

/// Computes the boat-fit derived collision map for `plane` over
/// `bounds`, writing into `output` (already wrapped in a
/// [`SynchronizedWriter`] so disjoint X-strips can write concurrently).
/// Fires `progress` once per completed X column and checks `cancel` at each
/// column boundary.
pub fn compute<R, T, W>(
    collision: &CollisionMap<R>,
    tile_types: &TileTypeMap<T>,
    bounds: &WorldBounds,
    plane: i32,
    boat_size: u32,
    output: &SynchronizedWriter<W>,
    progress: &Progress,
    cancel: &CancellationToken,
) -> Result<()>
where
    R: TileDataReader + Sync,
    T: TileDataReader + Sync,
    W: TileDataWriter + Send,
{
    let total_columns = (bounds.max_x - bounds.min_x + 1).max(1) as f64;
    let completed = AtomicUsize::new(0);

    (bounds.min_x..=bounds.max_x).into_par_iter().try_for_each(|x| -> Result<()> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut column_writer = CollisionMap::new(SharedWriter::new(output), Semantics::Walkable);

        for y in bounds.min_y..=bounds.max_y {
            if boat_fits(collision, tile_types, bounds, x, y + 1, plane, boat_size)? {
                column_writer.set_pathable_north(x, y, plane, true)?;
            }
            if boat_fits(collision, tile_types, bounds, x + 1, y, plane, boat_size)? {
                column_writer.set_pathable_east(x, y, plane, true)?;
            }
        }

        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
        progress(done as f64 / total_columns);

        Ok(())
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coord::CoordIndexer;
    use crate::sparse::SparseBitset;
    use crate::tile_data::BitPlaneMap;
    use crate::tile_type::TileTypeMap as TTMap;
    use crate::tile_data::WordMap;
    use crate::sparse::SparseWordArray;

    fn bounds() -> WorldBounds {
        WorldBounds { min_x: 590, max_x: 610, min_y: 90, max_y: 110 }
    }

    fn all_water_all_open(bounds: &WorldBounds) -> (CollisionMap<BitPlaneMap<SparseBitset>>, TTMap<WordMap<SparseWordArray>>) {
        let mut collision = CollisionMap::new(
            BitPlaneMap::new(CoordIndexer::contiguous_2_addresses(), SparseBitset::new()),
            Semantics::Walkable,
        );
        let mut tile_types = TTMap::new(WordMap::new(CoordIndexer::contiguous_1_address(), SparseWordArray::new(8).unwrap()));

        for x in (bounds.min_x - 2)..=(bounds.max_x + 2) {
            for y in (bounds.min_y - 2)..=(bounds.max_y + 2) {
                collision.set_pathable_north(x, y, 0, true).unwrap();
                collision.set_pathable_east(x, y, 0, true).unwrap();
                tile_types.set_tile_type(x, y, 0, 1).unwrap();
            }
        }

        (collision, tile_types)
    }

    #[test]
    fn odd_boat_fits_open_water() {
        let bounds = bounds();
        let (collision, tile_types) = all_water_all_open(&bounds);
        assert!(boat_fits(&collision, &tile_types, &bounds, 600, 100, 0, 3).unwrap());
    }

    #[test]
    fn boat_fails_when_any_tile_is_land() {
        let bounds = bounds();
        let (collision, mut tile_types) = all_water_all_open(&bounds);
        tile_types.set_tile_type(600, 100, 0, 0).unwrap();
        assert!(!boat_fits(&collision, &tile_types, &bounds, 600, 100, 0, 3).unwrap());
    }

    #[test]
    fn boat_fails_out_of_bounds() {
        let bounds = bounds();
        let (collision, tile_types) = all_water_all_open(&bounds);
        assert!(!boat_fits(&collision, &tile_types, &bounds, bounds.min_x, bounds.min_y, 0, 5).unwrap());
    }

    #[test]
    fn even_boat_fit_checks_all_four_placements() {
        let bounds = bounds();
        let (collision, tile_types) = all_water_all_open(&bounds);
        assert!(boat_fits(&collision, &tile_types, &bounds, 600, 100, 0, 2).unwrap());
    }

    #[test]
    fn compute_sets_pathable_flags_over_a_small_region() {
        let bounds = WorldBounds { min_x: 598, max_x: 602, min_y: 98, max_y: 102 };
        let (collision, tile_types) = all_water_all_open(&bounds);

        let output = SynchronizedWriter::new(BitPlaneMap::new(
            CoordIndexer::contiguous_2_addresses(),
            SparseBitset::new(),
        ));

        compute(&collision, &tile_types, &bounds, 0, 1, &output, &crate::progress::no_progress, &CancellationToken::new()).unwrap();

        let result_map = CollisionMap::new(output.into_inner(), Semantics::Walkable);
        assert!(result_map.pathable_north(600, 99, 0).unwrap());
    }

    #[test]
    fn compute_returns_cancelled_error_when_token_is_preset() {
        let bounds = bounds();
        let (collision, tile_types) = all_water_all_open(&bounds);
        let output = SynchronizedWriter::new(BitPlaneMap::new(
            CoordIndexer::contiguous_2_addresses(),
            SparseBitset::new(),
        ));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = compute(&collision, &tile_types, &bounds, 0, 1, &output, &crate::progress::no_progress, &cancel);
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}
