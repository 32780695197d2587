//! Water-body flood-fill filter (C8): suppresses small connected water
//! bodies (4-neighbor connectivity) below a size threshold, plane by plane.

use crate::boat_fit::WorldBounds;
use crate::error::{Error, Result};
use crate::progress::{CancellationToken, Progress};
use crate::sparse::{BitContainer, SparseBitset};
use crate::tile_data::{TileDataReader, TileDataWriter};
use crate::tile_type::TileTypeMap;
use std::collections::VecDeque;

/// Default body-size threshold (§4.8): bodies smaller than this many tiles
/// are suppressed.
pub const DEFAULT_THRESHOLD: usize = 5000;

fn pack(bounds: &WorldBounds, x: i32, y: i32) -> u32 {
    let x_range = (bounds.max_x - bounds.min_x + 1) as u32;
    ((y - bounds.min_y) as u32) * x_range + (x - bounds.min_x) as u32
}

fn neighbors4(x: i32, y: i32) -> [(i32, i32); 4] {
    [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)]
}

/// Enumerates the connected water body containing `(start_x, start_y)` via
/// BFS, marking every tile it touches (water or not) as visited so the outer
/// scan never revisits it.
fn collect_body<T: TileDataReader>(
    tile_types: &TileTypeMap<T>,
    bounds: &WorldBounds,
    visited: &mut SparseBitset,
    start_x: i32,
    start_y: i32,
    plane: i32,
) -> Result<Vec<(i32, i32)>> {
    let mut body = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back((start_x, start_y));
    visited.set(pack(bounds, start_x, start_y), true);

    while let Some((x, y)) = queue.pop_front() {
        body.push((x, y));

        for (nx, ny) in neighbors4(x, y) {
            if !bounds.contains(nx, ny) {
                continue;
            }

            let idx = pack(bounds, nx, ny);
            if visited.get(idx) {
                continue;
            }
            visited.set(idx, true);

            if tile_types.is_water(nx, ny, plane)? {
                queue.push_back((nx, ny));
            }
        }
    }

    Ok(body)
}

/// Filters water bodies smaller than `threshold` out of `tile_types` over
/// `bounds`, for planes `0..plane_count`, writing the surviving tile types
/// into `output`. Fires `progress` once per completed plane and checks
/// `cancel` at plane boundaries.
///
/// Each surviving tile is written exactly once, in the second pass; a body
/// below the threshold is written zero times (its output tile type stays the
/// default 0), so no tile is ever written more than once per plane.
pub fn filter_small_water_bodies<T, W>(
    tile_types: &TileTypeMap<T>,
    output: &mut TileTypeMap<W>,
    bounds: &WorldBounds,
    plane_count: i32,
    threshold: usize,
    progress: &Progress,
    cancel: &CancellationToken,
) -> Result<()>
where
    T: TileDataReader,
    W: TileDataWriter,
{
    for plane in 0..plane_count {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut visited = SparseBitset::new();
        let mut filter_out = SparseBitset::new();

        for x in bounds.min_x..=bounds.max_x {
            for y in bounds.min_y..=bounds.max_y {
                let idx = pack(bounds, x, y);
                if visited.get(idx) {
                    continue;
                }

                if !tile_types.is_water(x, y, plane)? {
                    visited.set(idx, true);
                    continue;
                }

                let body = collect_body(tile_types, bounds, &mut visited, x, y, plane)?;

                if body.len() < threshold {
                    for (bx, by) in &body {
                        filter_out.set(pack(bounds, *bx, *by), true);
                    }
                }
            }
        }

        for x in bounds.min_x..=bounds.max_x {
            for y in bounds.min_y..=bounds.max_y {
                if filter_out.get(pack(bounds, x, y)) {
                    continue;
                }

                let tile_type = tile_types.get_tile_type(x, y, plane)?;
                if tile_type > 0 {
                    output.set_tile_type(x, y, plane, tile_type)?;
                }
            }
        }

        progress((plane + 1) as f64 / plane_count.max(1) as f64);
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coord::CoordIndexer;
    use crate::sparse::SparseWordArray;
    use crate::tile_data::WordMap;

    fn bounds() -> WorldBounds {
        WorldBounds { min_x: 590, max_x: 610, min_y: 90, max_y: 110 }
    }

    fn empty_tile_type_map() -> TileTypeMap<WordMap<SparseWordArray>> {
        TileTypeMap::new(WordMap::new(CoordIndexer::contiguous_1_address(), SparseWordArray::new(8).unwrap()))
    }

    #[test]
    fn small_body_is_suppressed() {
        let bounds = bounds();
        let mut source = empty_tile_type_map();
        // a 2-tile body, well under any sane threshold
        source.set_tile_type(600, 100, 0, 3).unwrap();
        source.set_tile_type(601, 100, 0, 3).unwrap();

        let mut output = empty_tile_type_map();
        filter_small_water_bodies(&source, &mut output, &bounds, 1, 5000, &crate::progress::no_progress, &CancellationToken::new()).unwrap();

        assert_eq!(output.get_tile_type(600, 100, 0).unwrap(), 0);
        assert_eq!(output.get_tile_type(601, 100, 0).unwrap(), 0);
    }

    #[test]
    fn body_at_or_above_threshold_survives() {
        let bounds = bounds();
        let mut source = empty_tile_type_map();
        for x in 600..605 {
            source.set_tile_type(x, 100, 0, 2).unwrap();
        }

        let mut output = empty_tile_type_map();
        filter_small_water_bodies(&source, &mut output, &bounds, 1, 5, &crate::progress::no_progress, &CancellationToken::new()).unwrap();

        for x in 600..605 {
            assert_eq!(output.get_tile_type(x, 100, 0).unwrap(), 2);
        }
    }

    #[test]
    fn two_disjoint_bodies_are_filtered_independently() {
        let bounds = bounds();
        let mut source = empty_tile_type_map();
        // large surviving body
        for x in 600..606 {
            source.set_tile_type(x, 100, 0, 1).unwrap();
        }
        // small suppressed body, far enough away to not touch the first
        source.set_tile_type(591, 91, 0, 1).unwrap();

        let mut output = empty_tile_type_map();
        filter_small_water_bodies(&source, &mut output, &bounds, 1, 6, &crate::progress::no_progress, &CancellationToken::new()).unwrap();

        assert_eq!(output.get_tile_type(600, 100, 0).unwrap(), 1);
        assert_eq!(output.get_tile_type(591, 91, 0).unwrap(), 0);
    }

    #[test]
    fn cancellation_is_observed_at_plane_boundary() {
        let bounds = bounds();
        let source = empty_tile_type_map();
        let mut output = empty_tile_type_map();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = filter_small_water_bodies(&source, &mut output, &bounds, 4, 5000, &crate::progress::no_progress, &cancel);
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}
