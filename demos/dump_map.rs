//! Demonstrates the library's save/load surface: opens or creates a
//! collision map and a tile-type map under a directory, touches a handful of
//! tiles, and saves them back out in the requested on-disk format.
//!
//! Not a real cache dumper -- there is no external cache source wired in
//! here, only the library's own persistence entry points.

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tilestore::persist::{self, Format};

struct Args {
    dir: PathBuf,
    fresh: bool,
    format: Format,
}

fn parse_args() -> Result<Args, String> {
    let mut dir = None;
    let mut fresh = false;
    let mut format = Format::Roaring;

    let mut args = env::args().skip(1);
    while let Some(flag) = args.next() {
        match flag.as_str() {
            "-dir" => {
                let value = args.next().ok_or("-dir requires a path")?;
                dir = Some(PathBuf::from(value));
            }
            "-fresh" => {
                let value = args.next().ok_or("-fresh requires y|n")?;
                fresh = match value.as_str() {
                    "y" => true,
                    "n" => false,
                    other => return Err(format!("-fresh expects y|n, got {}", other)),
                };
            }
            "-format" => {
                let value = args.next().ok_or("-format requires roaring|sparse|wordset")?;
                format = match value.as_str() {
                    "roaring" => Format::Roaring,
                    "sparse" => Format::Bitset,
                    "wordset" => Format::Wordset,
                    other => return Err(format!("unknown format '{}'", other)),
                };
            }
            other => return Err(format!("unrecognized flag '{}'", other)),
        }
    }

    Ok(Args {
        dir: dir.ok_or("missing required -dir <path>")?,
        fresh,
        format,
    })
}

fn suffix(format: Format) -> &'static str {
    match format {
        Format::Roaring => "roaring",
        Format::Bitset => "sparse",
        Format::Wordset => "wordset",
    }
}

fn collision_path(dir: &Path, format: Format) -> PathBuf {
    dir.join(format!("collision.{}.bin", suffix(format)))
}

fn tile_type_path(dir: &Path, format: Format) -> PathBuf {
    dir.join(format!("tiletype.{}.bin", suffix(format)))
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    std::fs::create_dir_all(&args.dir).map_err(|err| err.to_string())?;

    let collision_path = collision_path(&args.dir, args.format);
    let tile_type_path = tile_type_path(&args.dir, args.format);

    let mut collision = if args.fresh || !collision_path.exists() {
        persist::new_collision_backend(args.format).map_err(|err| err.to_string())?
    } else {
        persist::load_collision_backend(&collision_path).map_err(|err| err.to_string())?
    };

    let tile_type_backend = if args.fresh || !tile_type_path.exists() {
        persist::new_tile_type_backend(args.format).map_err(|err| err.to_string())?
    } else {
        persist::load_tile_type_backend(&tile_type_path).map_err(|err| err.to_string())?
    };
    let mut tile_types = tilestore::tile_type::TileTypeMap::new(tile_type_backend);

    use tilestore::tile_data::TileDataWriter;
    tile_types.set_tile_type(600, 100, 0, 1).map_err(|err| err.to_string())?;
    collision.set_bit(600, 100, 0, 0).map_err(|err| err.to_string())?;

    persist::save_collision_backend(&collision, &collision_path).map_err(|err| err.to_string())?;
    persist::save_tile_type_backend(tile_types.inner(), &tile_type_path).map_err(|err| err.to_string())?;

    println!(
        "wrote {} and {}",
        collision_path.display(),
        tile_type_path.display()
    );

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("dump_map: {}", message);
            ExitCode::FAILURE
        }
    }
}
