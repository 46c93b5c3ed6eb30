use std::error::Error;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::block::Theme;
use crate::chain::Mineshaft;
use crate::geometry::{BlockBox, Direction};

/// Bumped whenever the record layout changes incompatibly.
pub const SAVE_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PieceKind {
    SideRoom,
    SideRoomDungeon,
}

/// Everything needed to regenerate a piece without rerunning placement:
/// the resolved box, the facing, and the structural choices already made.
/// Cosmetic rolls (brick variants, decorations) are not persisted; they
/// replay from the generation seed.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct PieceRecord {
    pub kind: PieceKind,
    pub facing: Direction,
    pub bounding_box: BlockBox,
    pub chain_index: usize,
    pub chain_length: usize,
    pub has_downstairs: bool,
}

#[derive(Debug, Deserialize, Serialize)]
struct SaveData {
    version: u32,
    theme: Theme,
    records: Vec<PieceRecord>,
}

pub fn save_chain<P: AsRef<Path>>(path: P, shaft: &Mineshaft) -> Result<(), Box<dyn Error>> {
    let data = SaveData {
        version: SAVE_VERSION,
        theme: shaft.theme,
        records: shaft.records(),
    };
    let file = File::create(&path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &data)?;
    info!(
        "saved {} piece records to {}",
        data.records.len(),
        path.as_ref().display()
    );
    Ok(())
}

pub fn load_chain<P: AsRef<Path>>(path: P) -> Result<Mineshaft, Box<dyn Error>> {
    let file = File::open(&path)?;
    let data: SaveData = serde_json::from_reader(BufReader::new(file))?;
    if data.version != SAVE_VERSION {
        return Err(format!(
            "unsupported save version {} (expected {})",
            data.version, SAVE_VERSION
        )
        .into());
    }
    info!(
        "loaded {} piece records from {}",
        data.records.len(),
        path.as_ref().display()
    );
    Ok(Mineshaft::from_records(data.theme, &data.records))
}
