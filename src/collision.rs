//! Collision map (C4): two directional bits per tile (`N`, `E`), with the
//! other two cardinals and the four diagonals derived from them.

use crate::error::Result;
use crate::tile_data::{TileDataReader, TileDataWriter};

pub(crate) const ADDR_N: u32 = 0;
pub(crate) const ADDR_E: u32 = 1;

/// Bit NONE sentinel for [`CollisionMap::all`]: no cardinal is pathable.
pub const NONE: u8 = 0;

pub const BIT_NW: u8 = 1 << 0;
pub const BIT_N: u8 = 1 << 1;
pub const BIT_NE: u8 = 1 << 2;
pub const BIT_W: u8 = 1 << 3;
pub const BIT_E: u8 = 1 << 4;
pub const BIT_SW: u8 = 1 << 5;
pub const BIT_S: u8 = 1 << 6;
pub const BIT_SE: u8 = 1 << 7;

/// Which convention a stored bit follows. Two external data sources disagree
/// about this, so it is recorded explicitly per [`CollisionMap`] instance
/// rather than left to caller convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Semantics {
    /// A set bit means the tile is pathable in that direction.
    Walkable,
    /// A set bit means the tile is blocked in that direction. The default
    /// internal build convention.
    Blocking,
}

#[derive(Debug, Clone)]
pub struct CollisionMap<M> {
    inner: M,
    semantics: Semantics,
}

impl<M> CollisionMap<M> {
    pub fn new(inner: M, semantics: Semantics) -> Self {
        Self { inner, semantics }
    }

    pub fn semantics(&self) -> Semantics {
        self.semantics
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<M: TileDataReader> CollisionMap<M> {
    fn stored_north(&self, x: i32, y: i32, plane: i32) -> Result<bool> {
        self.inner.is_bit_set(x, y, plane, ADDR_N)
    }

    fn stored_east(&self, x: i32, y: i32, plane: i32) -> Result<bool> {
        self.inner.is_bit_set(x, y, plane, ADDR_E)
    }

    fn pathable_from_stored(&self, stored: bool) -> bool {
        match self.semantics {
            Semantics::Walkable => stored,
            Semantics::Blocking => !stored,
        }
    }

    pub fn pathable_north(&self, x: i32, y: i32, plane: i32) -> Result<bool> {
        Ok(self.pathable_from_stored(self.stored_north(x, y, plane)?))
    }

    pub fn pathable_east(&self, x: i32, y: i32, plane: i32) -> Result<bool> {
        Ok(self.pathable_from_stored(self.stored_east(x, y, plane)?))
    }

    pub fn pathable_south(&self, x: i32, y: i32, plane: i32) -> Result<bool> {
        self.pathable_north(x, y - 1, plane)
    }

    pub fn pathable_west(&self, x: i32, y: i32, plane: i32) -> Result<bool> {
        self.pathable_east(x - 1, y, plane)
    }

    pub fn is_blocked(&self, x: i32, y: i32, plane: i32) -> Result<bool> {
        Ok(!self.pathable_north(x, y, plane)?
            && !self.pathable_east(x, y, plane)?
            && !self.pathable_south(x, y, plane)?
            && !self.pathable_west(x, y, plane)?)
    }

    /// Packs the 8-way walkability flags `{NW, N, NE, W, E, SW, S, SE}`. If
    /// all four cardinals are false, returns [`NONE`].
    pub fn all(&self, x: i32, y: i32, plane: i32) -> Result<u8> {
        let n = self.pathable_north(x, y, plane)?;
        let e = self.pathable_east(x, y, plane)?;
        let s = self.pathable_south(x, y, plane)?;
        let w = self.pathable_west(x, y, plane)?;

        if !n && !e && !s && !w {
            return Ok(NONE);
        }

        let mut flags = 0u8;
        if n { flags |= BIT_N; }
        if e { flags |= BIT_E; }
        if s { flags |= BIT_S; }
        if w { flags |= BIT_W; }

        if n && e && self.pathable_east(x, y + 1, plane)? && self.pathable_north(x + 1, y, plane)? {
            flags |= BIT_NE;
        }
        if n && w && self.pathable_west(x, y + 1, plane)? && self.pathable_north(x - 1, y, plane)? {
            flags |= BIT_NW;
        }
        if s && e && self.pathable_east(x, y - 1, plane)? && self.pathable_south(x + 1, y, plane)? {
            flags |= BIT_SE;
        }
        if s && w && self.pathable_west(x, y - 1, plane)? && self.pathable_south(x - 1, y, plane)? {
            flags |= BIT_SW;
        }

        Ok(flags)
    }
}

impl<M: TileDataWriter> CollisionMap<M> {
    fn stored_value(&self, pathable_or_blocked: bool) -> bool {
        match self.semantics {
            Semantics::Walkable => pathable_or_blocked,
            Semantics::Blocking => !pathable_or_blocked,
        }
    }

    fn set_stored(&mut self, x: i32, y: i32, plane: i32, addr: u32, value: bool) -> Result<()> {
        if value {
            self.inner.set_bit(x, y, plane, addr)
        } else {
            self.inner.clear_bit(x, y, plane, addr)
        }
    }

    /// Sets whether this tile blocks movement north. Named for the
    /// `Semantics::Blocking` convention; for `Semantics::Walkable` maps, use
    /// [`Self::set_pathable_north`] instead, which reads the same way the
    /// file's convention is documented to the caller.
    pub fn north_blocking(&mut self, x: i32, y: i32, plane: i32, blocked: bool) -> Result<()> {
        let stored = self.stored_value(!blocked);
        self.set_stored(x, y, plane, ADDR_N, stored)
    }

    pub fn east_blocking(&mut self, x: i32, y: i32, plane: i32, blocked: bool) -> Result<()> {
        let stored = self.stored_value(!blocked);
        self.set_stored(x, y, plane, ADDR_E, stored)
    }

    pub fn south_blocking(&mut self, x: i32, y: i32, plane: i32, blocked: bool) -> Result<()> {
        self.north_blocking(x, y - 1, plane, blocked)
    }

    pub fn west_blocking(&mut self, x: i32, y: i32, plane: i32, blocked: bool) -> Result<()> {
        self.east_blocking(x - 1, y, plane, blocked)
    }

    /// Sets all four cardinal directions of `(x, y, plane)` at once. Because
    /// `S` and `W` are derived from neighboring tiles, this touches up to
    /// three distinct stored tiles: this tile's `N`/`E`, the tile south of it
    /// (whose `N` is this tile's `S`), and the tile west of it (whose `E` is
    /// this tile's `W`).
    pub fn full_blocking(&mut self, x: i32, y: i32, plane: i32, blocked: bool) -> Result<()> {
        self.north_blocking(x, y, plane, blocked)?;
        self.east_blocking(x, y, plane, blocked)?;
        self.south_blocking(x, y, plane, blocked)?;
        self.west_blocking(x, y, plane, blocked)
    }

    pub fn set_pathable_north(&mut self, x: i32, y: i32, plane: i32, pathable: bool) -> Result<()> {
        self.north_blocking(x, y, plane, !pathable)
    }

    pub fn set_pathable_east(&mut self, x: i32, y: i32, plane: i32, pathable: bool) -> Result<()> {
        self.east_blocking(x, y, plane, !pathable)
    }

    pub fn set_pathable_south(&mut self, x: i32, y: i32, plane: i32, pathable: bool) -> Result<()> {
        self.south_blocking(x, y, plane, !pathable)
    }

    pub fn set_pathable_west(&mut self, x: i32, y: i32, plane: i32, pathable: bool) -> Result<()> {
        self.west_blocking(x, y, plane, !pathable)
    }
}
