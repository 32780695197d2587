//! Roaring-style compressed bitmap (C2.1), backed by the `roaring` crate so
//! files written by this store stay readable by any other implementation of
//! the open Roaring format.

use super::{BitContainer, Persist};
use crate::error::{Error, Result};
use roaring::RoaringBitmap;
use std::io::{Read, Write};

#[derive(Debug, Clone, Default)]
pub struct RoaringContainer {
    bitmap: RoaringBitmap,
}

impl RoaringContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, index: u32) {
        self.bitmap.insert(index);
    }

    pub fn contains(&self, index: u32) -> bool {
        self.bitmap.contains(index)
    }

    pub fn len(&self) -> u64 {
        self.bitmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bitmap.is_empty()
    }

    /// Collapses dense containers into run-length form. Called automatically
    /// by [`Persist::serialize`] before writing, matching the "run-optimize
    /// before save" rule in the on-disk format.
    pub fn run_optimize(&mut self) {
        self.bitmap.run_optimize();
    }
}

impl BitContainer for RoaringContainer {
    fn get(&self, index: u32) -> bool {
        self.contains(index)
    }

    fn set(&mut self, index: u32, value: bool) {
        if value {
            self.bitmap.insert(index);
        } else {
            self.bitmap.remove(index);
        }
    }
}

impl Persist for RoaringContainer {
    fn serialize(&self, write: &mut impl Write) -> Result<()> {
        let mut optimized = self.bitmap.clone();
        optimized.run_optimize();
        optimized
            .serialize_into(write)
            .map_err(|err| Error::Io(err))
    }

    fn deserialize(read: &mut impl Read) -> Result<Self> {
        let bitmap = RoaringBitmap::deserialize_from(read)
            .map_err(|err| Error::corrupt(format!("invalid roaring bitmap stream: {}", err)))?;
        Ok(RoaringContainer { bitmap })
    }
}
