//! Persistence codec (C6): versioned binary formats for each sparse
//! container, auto-detected from the filename, with an optional gzip outer
//! stream also detected from the filename.

use crate::coord::CoordIndexer;
use crate::error::Result;
use crate::sparse::{wordset, BitContainer, Persist, RoaringContainer, SparseBitset, SparseWordArray, WordContainer};
use crate::tile_data::{BitPlaneMap, TileDataReader, TileDataWriter, WordMap};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Which on-disk container format a file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Roaring,
    Bitset,
    Wordset,
}

/// Detects the format from filename substrings. Unknown names default to
/// roaring, matching the documented fallback in §6.
pub fn detect_format(path: &Path) -> Format {
    let name = path.to_string_lossy().to_lowercase();

    if name.contains("wordset") {
        Format::Wordset
    } else if name.contains("sparse") {
        Format::Bitset
    } else {
        Format::Roaring
    }
}

pub fn is_gzip(path: &Path) -> bool {
    path.extension().map(|ext| ext == "gz").unwrap_or(false)
}

fn open_reader(path: &Path) -> Result<Box<dyn Read>> {
    let file = BufReader::new(File::open(path)?);

    if is_gzip(path) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(file))
    }
}

/// A container of any of the three backends, so the collision/tile-type
/// facades don't need to pick a concrete Rust type until the file is opened.
#[derive(Debug, Clone)]
pub enum AnyContainer {
    Roaring(RoaringContainer),
    Bitset(SparseBitset),
    Wordset(SparseWordArray),
}

impl AnyContainer {
    pub fn format(&self) -> Format {
        match self {
            AnyContainer::Roaring(_) => Format::Roaring,
            AnyContainer::Bitset(_) => Format::Bitset,
            AnyContainer::Wordset(_) => Format::Wordset,
        }
    }

    pub fn empty(format: Format, bits_per_value: u32) -> Result<Self> {
        Ok(match format {
            Format::Roaring => AnyContainer::Roaring(RoaringContainer::new()),
            Format::Bitset => AnyContainer::Bitset(SparseBitset::new()),
            Format::Wordset => AnyContainer::Wordset(SparseWordArray::new(bits_per_value)?),
        })
    }

    fn deserialize(format: Format, read: &mut impl Read, bits_per_value: u32) -> Result<Self> {
        Ok(match format {
            Format::Roaring => AnyContainer::Roaring(RoaringContainer::deserialize(read)?),
            Format::Bitset => AnyContainer::Bitset(SparseBitset::deserialize(read)?),
            Format::Wordset => {
                AnyContainer::Wordset(wordset::deserialize_expecting(read, bits_per_value)?)
            }
        })
    }

    fn serialize(&self, write: &mut impl Write) -> Result<()> {
        match self {
            AnyContainer::Roaring(container) => {
                let mut optimized = container.clone();
                optimized.run_optimize();
                optimized.serialize(write)
            }
            AnyContainer::Bitset(container) => container.serialize(write),
            AnyContainer::Wordset(container) => container.serialize(write),
        }
    }
}

impl BitContainer for AnyContainer {
    fn get(&self, index: u32) -> bool {
        match self {
            AnyContainer::Roaring(container) => container.get(index),
            AnyContainer::Bitset(container) => container.get(index),
            AnyContainer::Wordset(container) => BitContainer::get(container, index),
        }
    }

    fn set(&mut self, index: u32, value: bool) {
        match self {
            AnyContainer::Roaring(container) => container.set(index, value),
            AnyContainer::Bitset(container) => container.set(index, value),
            AnyContainer::Wordset(container) => BitContainer::set(container, index, value),
        }
    }
}

impl WordContainer for AnyContainer {
    fn bits_per_value(&self) -> u32 {
        match self {
            AnyContainer::Wordset(container) => container.bits_per_value(),
            _ => 1,
        }
    }

    fn get(&self, index: u32) -> u64 {
        match self {
            AnyContainer::Wordset(container) => WordContainer::get(container, index),
            other => BitContainer::get(other, index) as u64,
        }
    }

    fn set(&mut self, index: u32, value: u64) {
        match self {
            AnyContainer::Wordset(container) => WordContainer::set(container, index, value),
            other => BitContainer::set(other, index, value != 0),
        }
    }
}

/// Saves a single container, choosing gzip based on the filename's `.gz`
/// suffix. The caller picks the indexer and format when it first builds the
/// map; this function only deals with bytes.
pub fn save_container(container: &AnyContainer, path: &Path) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);

    if is_gzip(path) {
        let mut encoder = GzEncoder::new(file, Compression::default());
        container.serialize(&mut encoder)?;
        let mut inner = encoder.finish()?;
        inner.flush()?;
    } else {
        let mut file = file;
        container.serialize(&mut file)?;
        file.flush()?;
    }

    Ok(())
}

pub fn load_container(path: &Path, bits_per_value: u32) -> Result<AnyContainer> {
    let format = detect_format(path);
    let mut reader = open_reader(path)?;
    AnyContainer::deserialize(format, &mut reader, bits_per_value)
}

/// Backend dispatch for the tile-type facade: a word-array format packs the
/// whole byte into one value, while the bit-oriented formats spread it
/// across 8 addresses (one address per bit of the byte).
#[derive(Debug, Clone)]
pub enum TileTypeBackend {
    BitPlanes(BitPlaneMap<AnyContainer>),
    Word(WordMap<AnyContainer>),
}

impl TileDataReader for TileTypeBackend {
    fn is_bit_set(&self, x: i32, y: i32, plane: i32, addr: u32) -> Result<bool> {
        match self {
            TileTypeBackend::BitPlanes(map) => map.is_bit_set(x, y, plane, addr),
            TileTypeBackend::Word(map) => map.is_bit_set(x, y, plane, addr),
        }
    }

    fn get_all_bits(&self, x: i32, y: i32, plane: i32, address_count: u32) -> Result<u8> {
        match self {
            TileTypeBackend::BitPlanes(map) => map.get_all_bits(x, y, plane, address_count),
            TileTypeBackend::Word(map) => map.get_all_bits(x, y, plane, address_count),
        }
    }
}

impl TileDataWriter for TileTypeBackend {
    fn set_bit(&mut self, x: i32, y: i32, plane: i32, addr: u32) -> Result<()> {
        match self {
            TileTypeBackend::BitPlanes(map) => map.set_bit(x, y, plane, addr),
            TileTypeBackend::Word(map) => map.set_bit(x, y, plane, addr),
        }
    }

    fn clear_bit(&mut self, x: i32, y: i32, plane: i32, addr: u32) -> Result<()> {
        match self {
            TileTypeBackend::BitPlanes(map) => map.clear_bit(x, y, plane, addr),
            TileTypeBackend::Word(map) => map.clear_bit(x, y, plane, addr),
        }
    }

    fn set_all_bits(&mut self, x: i32, y: i32, plane: i32, value: u8, address_count: u32) -> Result<()> {
        match self {
            TileTypeBackend::BitPlanes(map) => map.set_all_bits(x, y, plane, value, address_count),
            TileTypeBackend::Word(map) => map.set_all_bits(x, y, plane, value, address_count),
        }
    }
}

/// Opens a fresh, empty tile-type backend for `format`.
pub fn new_tile_type_backend(format: Format) -> Result<TileTypeBackend> {
    Ok(match format {
        Format::Wordset => TileTypeBackend::Word(WordMap::new(
            CoordIndexer::contiguous_1_address(),
            AnyContainer::empty(format, 8)?,
        )),
        Format::Roaring | Format::Bitset => TileTypeBackend::BitPlanes(BitPlaneMap::new(
            CoordIndexer::contiguous_8_addresses(),
            AnyContainer::empty(format, 1)?,
        )),
    })
}

/// Loads a tile-type backend, auto-detecting format and gzip from `path`.
pub fn load_tile_type_backend(path: &Path) -> Result<TileTypeBackend> {
    let format = detect_format(path);

    Ok(match format {
        Format::Wordset => {
            TileTypeBackend::Word(WordMap::new(CoordIndexer::contiguous_1_address(), load_container(path, 8)?))
        }
        Format::Roaring | Format::Bitset => TileTypeBackend::BitPlanes(BitPlaneMap::new(
            CoordIndexer::contiguous_8_addresses(),
            load_container(path, 1)?,
        )),
    })
}

pub fn save_tile_type_backend(backend: &TileTypeBackend, path: &Path) -> Result<()> {
    match backend {
        TileTypeBackend::BitPlanes(map) => save_container(map.container(), path),
        TileTypeBackend::Word(map) => save_container(map.container(), path),
    }
}

/// Opens a fresh, empty collision backend for `format`. Collision always
/// uses 2 bit addresses (N, E); the word-array format simply stores them as
/// 1-bit values.
pub fn new_collision_backend(format: Format) -> Result<BitPlaneMap<AnyContainer>> {
    Ok(BitPlaneMap::new(
        CoordIndexer::collision_flag_interleaved(),
        AnyContainer::empty(format, 1)?,
    ))
}

pub fn load_collision_backend(path: &Path) -> Result<BitPlaneMap<AnyContainer>> {
    Ok(BitPlaneMap::new(
        CoordIndexer::collision_flag_interleaved(),
        load_container(path, 1)?,
    ))
}

pub fn save_collision_backend(backend: &BitPlaneMap<AnyContainer>, path: &Path) -> Result<()> {
    save_container(backend.container(), path)
}
