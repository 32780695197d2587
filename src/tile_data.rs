//! Tile-data map (C3): a uniform read/write API over any sparse container,
//! mapping `(x, y, plane)` plus an address to an N-bit datum.

use crate::coord::CoordIndexer;
use crate::error::Result;
use crate::sparse::{BitContainer, WordContainer};
use std::sync::Mutex;

/// Read side of the tile-data contract. `get_all_bits` has a default
/// implementation costing `O(number_of_addresses)`; backends that can answer
/// in one read (the word array) override it.
pub trait TileDataReader {
    fn is_bit_set(&self, x: i32, y: i32, plane: i32, addr: u32) -> Result<bool>;

    fn get_all_bits(&self, x: i32, y: i32, plane: i32, address_count: u32) -> Result<u8> {
        let mut byte = 0u8;
        for addr in 0..address_count.min(8) {
            if self.is_bit_set(x, y, plane, addr)? {
                byte |= 1 << addr;
            }
        }
        Ok(byte)
    }
}

/// Write side of the tile-data contract.
pub trait TileDataWriter {
    fn set_bit(&mut self, x: i32, y: i32, plane: i32, addr: u32) -> Result<()>;
    fn clear_bit(&mut self, x: i32, y: i32, plane: i32, addr: u32) -> Result<()>;

    fn set_all_bits(&mut self, x: i32, y: i32, plane: i32, value: u8, address_count: u32) -> Result<()> {
        for addr in 0..address_count.min(8) {
            if value & (1 << addr) != 0 {
                self.set_bit(x, y, plane, addr)?;
            } else {
                self.clear_bit(x, y, plane, addr)?;
            }
        }
        Ok(())
    }
}

/// Backs each address at its own index in a bit container: used by the
/// collision map (2 addresses) and by a tile-type map that stores its 8 bit
/// planes as 8 separate addresses.
#[derive(Debug, Clone)]
pub struct BitPlaneMap<C> {
    pub(crate) indexer: CoordIndexer,
    pub(crate) container: C,
}

impl<C> BitPlaneMap<C> {
    pub fn new(indexer: CoordIndexer, container: C) -> Self {
        Self { indexer, container }
    }

    pub fn indexer(&self) -> &CoordIndexer {
        &self.indexer
    }

    pub fn into_container(self) -> C {
        self.container
    }

    pub fn container(&self) -> &C {
        &self.container
    }
}

impl<C: BitContainer> TileDataReader for BitPlaneMap<C> {
    fn is_bit_set(&self, x: i32, y: i32, plane: i32, addr: u32) -> Result<bool> {
        let idx = self.indexer.pack(x, y, plane, addr)?;
        Ok(self.container.get(idx))
    }
}

impl<C: BitContainer> TileDataWriter for BitPlaneMap<C> {
    fn set_bit(&mut self, x: i32, y: i32, plane: i32, addr: u32) -> Result<()> {
        let idx = self.indexer.pack(x, y, plane, addr)?;
        self.container.set(idx, true);
        Ok(())
    }

    fn clear_bit(&mut self, x: i32, y: i32, plane: i32, addr: u32) -> Result<()> {
        let idx = self.indexer.pack(x, y, plane, addr)?;
        self.container.set(idx, false);
        Ok(())
    }
}

/// Backs every address of one tile in a single word: the indexer always uses
/// `addresses_per_coord = 1` here, and `addr` is interpreted as a bit offset
/// inside the stored value rather than a separate index.
#[derive(Debug, Clone)]
pub struct WordMap<C> {
    pub(crate) indexer: CoordIndexer,
    pub(crate) container: C,
}

impl<C> WordMap<C> {
    pub fn new(indexer: CoordIndexer, container: C) -> Self {
        Self { indexer, container }
    }

    pub fn indexer(&self) -> &CoordIndexer {
        &self.indexer
    }

    pub fn into_container(self) -> C {
        self.container
    }

    pub fn container(&self) -> &C {
        &self.container
    }
}

impl<C: WordContainer> TileDataReader for WordMap<C> {
    fn is_bit_set(&self, x: i32, y: i32, plane: i32, addr: u32) -> Result<bool> {
        let value = self.get_all_bits(x, y, plane, 8)?;
        Ok(value & (1 << addr) != 0)
    }

    /// Single word read regardless of how many addresses are requested.
    fn get_all_bits(&self, x: i32, y: i32, plane: i32, _address_count: u32) -> Result<u8> {
        let idx = self.indexer.pack(x, y, plane, 0)?;
        Ok(self.container.get(idx) as u8)
    }
}

impl<C: WordContainer> TileDataWriter for WordMap<C> {
    fn set_bit(&mut self, x: i32, y: i32, plane: i32, addr: u32) -> Result<()> {
        let current = TileDataReader::get_all_bits(self, x, y, plane, 8)?;
        self.set_all_bits(x, y, plane, current | (1 << addr), 8)
    }

    fn clear_bit(&mut self, x: i32, y: i32, plane: i32, addr: u32) -> Result<()> {
        let current = TileDataReader::get_all_bits(self, x, y, plane, 8)?;
        self.set_all_bits(x, y, plane, current & !(1 << addr), 8)
    }

    fn set_all_bits(&mut self, x: i32, y: i32, plane: i32, value: u8, _address_count: u32) -> Result<()> {
        let idx = self.indexer.pack(x, y, plane, 0)?;
        self.container.set(idx, value as u64);
        Ok(())
    }
}

/// Wraps any [`TileDataWriter`] behind a mutex so multiple builder threads
/// can write to one container instance, satisfying the backend-wide-mutex
/// half of the thread-safety contract in §4.3 (the alternative, per-word
/// atomic CAS, is reserved for the word-array backend's internal leaves).
pub struct SynchronizedWriter<W> {
    inner: Mutex<W>,
}

impl<W> SynchronizedWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { inner: Mutex::new(writer) }
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner().expect("writer mutex was not poisoned")
    }
}

impl<W: TileDataWriter> SynchronizedWriter<W> {
    pub fn set_bit(&self, x: i32, y: i32, plane: i32, addr: u32) -> Result<()> {
        self.inner.lock().expect("writer mutex was not poisoned").set_bit(x, y, plane, addr)
    }

    pub fn clear_bit(&self, x: i32, y: i32, plane: i32, addr: u32) -> Result<()> {
        self.inner.lock().expect("writer mutex was not poisoned").clear_bit(x, y, plane, addr)
    }
}

/// A cheap, `Copy`-able handle onto a [`SynchronizedWriter`], so
/// `CollisionMap<SharedWriter<W>>` and `TileTypeMap<SharedWriter<W>>` can be
/// built fresh per worker thread while every handle still serializes through
/// the same mutex.
pub struct SharedWriter<'a, W> {
    writer: &'a SynchronizedWriter<W>,
}

impl<'a, W> SharedWriter<'a, W> {
    pub fn new(writer: &'a SynchronizedWriter<W>) -> Self {
        Self { writer }
    }
}

impl<'a, W> Clone for SharedWriter<'a, W> {
    fn clone(&self) -> Self {
        Self { writer: self.writer }
    }
}

impl<'a, W> Copy for SharedWriter<'a, W> {}

impl<'a, W: TileDataWriter> TileDataWriter for SharedWriter<'a, W> {
    fn set_bit(&mut self, x: i32, y: i32, plane: i32, addr: u32) -> Result<()> {
        self.writer.set_bit(x, y, plane, addr)
    }

    fn clear_bit(&mut self, x: i32, y: i32, plane: i32, addr: u32) -> Result<()> {
        self.writer.clear_bit(x, y, plane, addr)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coord::CoordIndexer;
    use crate::sparse::{SparseBitset, SparseWordArray};

    #[test]
    fn bit_plane_map_empty_reads_zero() {
        let map = BitPlaneMap::new(CoordIndexer::collision_flag_interleaved(), SparseBitset::new());
        assert_eq!(map.get_all_bits(100, 100, 0, 2).unwrap(), 0);
    }

    #[test]
    fn bit_plane_map_set_bit_then_get_all_bits() {
        let mut map = BitPlaneMap::new(CoordIndexer::contiguous_2_addresses(), SparseBitset::new());
        map.set_bit(600, 100, 0, 0).unwrap();
        assert_eq!(map.get_all_bits(600, 100, 0, 2).unwrap(), 0b01);
        assert!(!map.is_bit_set(600, 100, 0, 1).unwrap());
    }

    #[test]
    fn word_map_single_read_returns_whole_byte() {
        let indexer = CoordIndexer::contiguous_1_address();
        let mut map = WordMap::new(indexer, SparseWordArray::new(8).unwrap());
        map.set_all_bits(480, 0, 0, 0b1010_0101, 8).unwrap();

        assert_eq!(map.get_all_bits(480, 0, 0, 8).unwrap(), 0b1010_0101);
        assert!(map.is_bit_set(480, 0, 0, 0).unwrap());
        assert!(!map.is_bit_set(480, 0, 0, 1).unwrap());
    }

    #[test]
    fn word_map_set_bit_preserves_other_bits() {
        let indexer = CoordIndexer::contiguous_1_address();
        let mut map = WordMap::new(indexer, SparseWordArray::new(8).unwrap());
        map.set_bit(600, 100, 0, 3).unwrap();
        map.set_bit(600, 100, 0, 5).unwrap();
        map.clear_bit(600, 100, 0, 3).unwrap();

        assert_eq!(map.get_all_bits(600, 100, 0, 8).unwrap(), 0b0010_0000);
    }
}
