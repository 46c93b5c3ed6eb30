//! Gruve - mineshaft side room generator for voxel worlds

mod block;
mod chain;
mod dungeon;
mod geometry;
mod loot;
mod map;
mod persist;
mod piece;
mod side_room;
mod world;

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::block::{Block, Theme};
use crate::geometry::{BlockCoord, Direction};
use crate::world::WorldExcerpt;

fn main() {
    // Read arguments
    // **************
    let matches = matches();
    simple_logger::SimpleLogger::new()
        .with_level(if matches.is_present("verbose") {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init()
        .unwrap();

    let seed = matches.value_of("seed").map(parse_u64_or_exit).unwrap_or(0);
    let x = matches.value_of("x").map(parse_i64_or_exit).unwrap_or(0);
    let y = matches.value_of("y").map(parse_i64_or_exit).unwrap_or(40);
    let z = matches.value_of("z").map(parse_i64_or_exit).unwrap_or(0);
    let count = matches
        .value_of("count")
        .map(parse_i64_or_exit)
        .unwrap_or(4) as usize;
    let facing = matches
        .value_of("facing")
        .unwrap_or("north")
        .parse::<Direction>()
        .unwrap_or_else(|error| {
            eprintln!("{}", error);
            std::process::exit(1);
        });
    let theme = matches
        .value_of("theme")
        .unwrap_or("classic")
        .parse::<Theme>()
        .unwrap_or_else(|error| {
            eprintln!("{}", error);
            std::process::exit(1);
        });

    // Piece placement
    // ***************
    let mut rng = StdRng::seed_from_u64(seed);
    let shaft = match matches.value_of("load") {
        Some(path) => persist::load_chain(path).unwrap_or_else(|error| {
            eprintln!("Could not load {}: {}", path, error);
            std::process::exit(1);
        }),
        None => chain::build_chain(&mut rng, theme, BlockCoord(x, y, z), facing, count),
    };
    info!("placed {} pieces facing {}", shaft.pieces.len(), facing);

    #[cfg(feature = "debug_images")]
    map::save_debug_map(&shaft, "placed");

    // Generation into solid ground
    // ****************************
    let mut excerpt = WorldExcerpt::new();
    if let Some(bounds) = shaft.bounds() {
        excerpt.fill_volume(&bounds.expanded(3), Block::Stone);
    }
    shaft.generate_all(&mut excerpt, &mut rng);

    // Export
    // ******
    if let Some(path) = matches.value_of("map") {
        if let Err(error) = map::save_map(path, &shaft) {
            eprintln!("Could not write map {}: {}", path, error);
            std::process::exit(1);
        }
    }
    if let Some(path) = matches.value_of("save") {
        if let Err(error) = persist::save_chain(path, &shaft) {
            eprintln!("Could not save {}: {}", path, error);
            std::process::exit(1);
        }
    }
}

fn parse_i64_or_exit(string: &str) -> i64 {
    string.parse::<i64>().unwrap_or_else(|_| {
        eprintln!("Not an integer: {}", string);
        std::process::exit(1);
    })
}

fn parse_u64_or_exit(string: &str) -> u64 {
    string.parse::<u64>().unwrap_or_else(|_| {
        eprintln!("Not an unsigned integer: {}", string);
        std::process::exit(1);
    })
}

fn matches() -> clap::ArgMatches<'static> {
    clap::App::new("gruve - mineshaft side room generator.")
        .set_term_width(80)
        .version(clap::crate_version!())
        .arg(
            clap::Arg::with_name("seed")
                .short("-s")
                .long("seed")
                .value_name("number")
                .help("World seed. Defaults to 0.")
                .takes_value(true),
        )
        .arg(
            clap::Arg::with_name("x")
                .short("-x")
                .long("x-coordinate")
                .value_name("block x")
                .help("Chain anchor x coordinate.")
                .takes_value(true)
                .number_of_values(1)
                .allow_hyphen_values(true),
        )
        .arg(
            clap::Arg::with_name("y")
                .short("-y")
                .long("y-coordinate")
                .value_name("block y")
                .help("Chain anchor y coordinate. Defaults to 40.")
                .takes_value(true)
                .number_of_values(1)
                .allow_hyphen_values(true),
        )
        .arg(
            clap::Arg::with_name("z")
                .short("-z")
                .long("z-coordinate")
                .value_name("block z")
                .help("Chain anchor z coordinate.")
                .takes_value(true)
                .number_of_values(1)
                .allow_hyphen_values(true),
        )
        .arg(
            clap::Arg::with_name("facing")
                .short("-f")
                .long("facing")
                .value_name("direction")
                .help("Chain facing: north, south, east or west.")
                .takes_value(true),
        )
        .arg(
            clap::Arg::with_name("count")
                .short("-n")
                .long("count")
                .value_name("rooms")
                .help("Number of side room slots to walk. Defaults to 4.")
                .takes_value(true),
        )
        .arg(
            clap::Arg::with_name("theme")
                .short("-t")
                .long("theme")
                .value_name("theme")
                .help("Brick theme: classic, mossy or desert.")
                .takes_value(true),
        )
        .arg(
            clap::Arg::with_name("map")
                .short("-m")
                .long("map")
                .value_name("FILE")
                .help("Write a top-down footprint map image to FILE.")
                .takes_value(true),
        )
        .arg(
            clap::Arg::with_name("save")
                .short("-o")
                .long("save")
                .value_name("FILE")
                .help("Write piece records as JSON to FILE.")
                .takes_value(true),
        )
        .arg(
            clap::Arg::with_name("load")
                .short("-i")
                .long("load")
                .value_name("FILE")
                .help("Load piece records from FILE instead of placing anew.")
                .takes_value(true),
        )
        .arg(
            clap::Arg::with_name("verbose")
                .short("-v")
                .long("verbose")
                .help("Log piece-level placement and gating decisions."),
        )
        .get_matches()
}
