//! Tile-type map (C5): one 8-bit tile category per tile. `0` means no
//! special terrain; `1..=12` are specific water variants and make the tile
//! eligible for boat fitting (§ [`crate::boat_fit`]).

use crate::error::Result;
use crate::tile_data::{TileDataReader, TileDataWriter};

/// Highest tile-type value with a known meaning; anything above this is
/// still stored and read back faithfully, but has no water-variant meaning.
pub const MAX_KNOWN_WATER_VARIANT: u8 = 12;

#[derive(Debug, Clone)]
pub struct TileTypeMap<M> {
    inner: M,
}

impl<M> TileTypeMap<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<M: TileDataReader> TileTypeMap<M> {
    pub fn get_tile_type(&self, x: i32, y: i32, plane: i32) -> Result<u8> {
        self.inner.get_all_bits(x, y, plane, 8)
    }

    /// `true` for any positive tile type, i.e. any known or unknown water
    /// variant.
    pub fn is_water(&self, x: i32, y: i32, plane: i32) -> Result<bool> {
        Ok(self.get_tile_type(x, y, plane)? > 0)
    }
}

impl<M: TileDataWriter> TileTypeMap<M> {
    pub fn set_tile_type(&mut self, x: i32, y: i32, plane: i32, tile_type: u8) -> Result<()> {
        self.inner.set_all_bits(x, y, plane, tile_type, 8)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coord::CoordIndexer;
    use crate::sparse::SparseWordArray;
    use crate::tile_data::WordMap;

    fn empty_map() -> TileTypeMap<WordMap<SparseWordArray>> {
        let indexer = CoordIndexer::contiguous_1_address();
        TileTypeMap::new(WordMap::new(indexer, SparseWordArray::new(8).unwrap()))
    }

    #[test]
    fn empty_tile_is_type_none() {
        let map = empty_map();
        assert_eq!(map.get_tile_type(600, 100, 0).unwrap(), 0);
        assert!(!map.is_water(600, 100, 0).unwrap());
    }

    #[test]
    fn set_then_get_roundtrips() {
        let mut map = empty_map();
        map.set_tile_type(600, 100, 0, 7).unwrap();
        assert_eq!(map.get_tile_type(600, 100, 0).unwrap(), 7);
        assert!(map.is_water(600, 100, 0).unwrap());
    }
}
