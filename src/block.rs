use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::Direction;

/// Block states this generator reads and writes.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Block {
    Air,
    Stone,
    Dirt,
    Gravel,
    Cobblestone,
    MossyCobblestone,
    StoneBricks,
    MossyStoneBricks,
    CrackedStoneBricks,
    Sandstone,
    SmoothSandstone,
    CutSandstone,
    IronBars,
    Furnace { facing: Direction },
    CraftingTable,
    Barrel,
    Ladder { facing: Direction },
    Trapdoor { facing: Direction },
    Spawner,
    Cobweb,
    BrownMushroom,
    RedMushroom,
    Vine,
    Water,
    Lava,
}

impl Block {
    pub fn is_air(&self) -> bool {
        *self == Block::Air
    }

    pub fn is_liquid(&self) -> bool {
        matches!(self, Block::Water | Block::Lava)
    }

    /// Full opaque cubes, for adjacency checks when hanging decorations.
    pub fn is_solid(&self) -> bool {
        matches!(
            self,
            Block::Stone
                | Block::Dirt
                | Block::Gravel
                | Block::Cobblestone
                | Block::MossyCobblestone
                | Block::StoneBricks
                | Block::MossyStoneBricks
                | Block::CrackedStoneBricks
                | Block::Sandstone
                | Block::SmoothSandstone
                | Block::CutSandstone
                | Block::Furnace { .. }
                | Block::CraftingTable
                | Block::Barrel
                | Block::Spawner
        )
    }
}

/// Visual flavour of a mineshaft, selecting brick palette and decorations.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Theme {
    Classic,
    Mossy,
    Desert,
}

impl Theme {
    pub fn brick_selector(&self) -> BrickSelector {
        match self {
            Theme::Classic => BrickSelector {
                choices: &[
                    (Block::StoneBricks, 0.5),
                    (Block::CrackedStoneBricks, 0.2),
                    (Block::MossyStoneBricks, 0.1),
                    (Block::Cobblestone, 0.2),
                ],
            },
            Theme::Mossy => BrickSelector {
                choices: &[
                    (Block::MossyStoneBricks, 0.4),
                    (Block::MossyCobblestone, 0.3),
                    (Block::StoneBricks, 0.2),
                    (Block::CrackedStoneBricks, 0.1),
                ],
            },
            Theme::Desert => BrickSelector {
                choices: &[
                    (Block::Sandstone, 0.5),
                    (Block::SmoothSandstone, 0.3),
                    (Block::CutSandstone, 0.2),
                ],
            },
        }
    }

    /// Per-cell chance of cosmetic growth (cobwebs, mushrooms) inside the piece.
    pub fn decoration_chance(&self) -> f32 {
        match self {
            Theme::Classic => 0.01,
            Theme::Mossy => 0.03,
            Theme::Desert => 0.005,
        }
    }

    /// Per-cell chance of vines on carved walls.
    pub fn vine_chance(&self) -> f32 {
        match self {
            Theme::Classic => 0.02,
            Theme::Mossy => 0.1,
            Theme::Desert => 0.0,
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string.to_ascii_lowercase().as_str() {
            "classic" => Ok(Theme::Classic),
            "mossy" => Ok(Theme::Mossy),
            "desert" => Ok(Theme::Desert),
            other => Err(format!("not a theme: {}", other)),
        }
    }
}

/// Weighted random choice among a fixed brick-like palette.
///
/// One fresh roll per placed block, so walls come out speckled rather than
/// uniform.
#[derive(Clone, Copy, Debug)]
pub struct BrickSelector {
    choices: &'static [(Block, f32)],
}

impl BrickSelector {
    pub fn get<R: Rng + ?Sized>(&self, rng: &mut R) -> Block {
        let total: f32 = self.choices.iter().map(|(_, weight)| weight).sum();
        let mut roll = rng.gen::<f32>() * total;
        for (block, weight) in self.choices {
            if roll < *weight {
                return *block;
            }
            roll -= weight;
        }
        // Rounding at the upper end lands on the last palette entry.
        self.choices[self.choices.len() - 1].0
    }

    pub fn palette(&self) -> impl Iterator<Item = Block> + '_ {
        self.choices.iter().map(|(block, _)| *block)
    }
}
