#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused_extern_crates,
    unused,

    missing_copy_implementations,
    missing_debug_implementations,
)]

#![deny(
    unused_variables,
    unused_assignments,
    dead_code,
    unused_must_use,
    trivial_numeric_casts,
    redundant_semicolon
)]

#![forbid(unsafe_code)]

//! A read-optimized spatial store for a fixed-size 3D tile grid: collision
//! bits per direction, per-tile terrain category, and the derived operations
//! built on top of them (boat-fit pathability, water-body filtering).

pub mod boat_fit;
pub mod collision;
pub mod coord;
pub mod error;
pub mod io;
pub mod keep_area;
pub mod persist;
pub mod progress;
pub mod sparse;
pub mod tile_data;
pub mod tile_type;
pub mod water_fill;

/// Re-exports of the types most callers need for loading, querying, and
/// rebuilding a map without naming the backend module layout directly.
pub mod prelude {
    pub use crate::boat_fit::{self, WorldBounds};
    pub use crate::collision::{CollisionMap, Semantics};
    pub use crate::coord::{CoordIndexer, IndexScheme, IndexerBuilder};
    pub use crate::error::{Error, PassiveResult, Result};
    pub use crate::keep_area::{self, KeepRectangle};
    pub use crate::persist::{self, AnyContainer, Format};
    pub use crate::progress::{CancellationToken, Progress};
    pub use crate::tile_data::{BitPlaneMap, SharedWriter, SynchronizedWriter, TileDataReader, TileDataWriter, WordMap};
    pub use crate::tile_type::{TileTypeMap, MAX_KNOWN_WATER_VARIANT};
    pub use crate::water_fill::{self, DEFAULT_THRESHOLD};
}
