use std::collections::HashMap;

use rand::RngCore;

use crate::block::Block;
use crate::geometry::{BlockBox, BlockColumnCoord, BlockCoord};
use crate::loot::{self, ItemStack, LootTable};

/// Biomes, as far as this generator cares about them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Biome {
    Plains,
    Forest,
    Desert,
    Ocean,
    DeepOcean,
}

impl Biome {
    /// Mineshaft pieces never materialize under open sea.
    pub fn is_ocean(&self) -> bool {
        matches!(self, Biome::Ocean | Biome::DeepOcean)
    }
}

/// Extra state attached to certain blocks (furnace slots, container loot).
#[derive(Clone, Debug, PartialEq)]
pub enum BlockEntity {
    Furnace { fuel: ItemStack },
    Container { items: Vec<ItemStack> },
}

/// World access as seen from the generator: cell reads and writes plus the
/// environment queries that gate generation. All coordinates are absolute;
/// pieces route their local coordinates through `geometry::local_to_world`
/// before calling in here.
pub trait World {
    fn block_at(&self, at: BlockCoord) -> Option<&Block>;

    fn set_block_at(&mut self, at: BlockCoord, block: Block);

    fn biome_at(&self, column: BlockColumnCoord) -> Biome;

    fn set_furnace_fuel(&mut self, at: BlockCoord, fuel: ItemStack);

    fn populate_container(&mut self, at: BlockCoord, table: LootTable, rng: &mut dyn RngCore);

    /// True if any cell within `bounds` holds a liquid.
    fn has_liquid_within(&self, bounds: &BlockBox) -> bool {
        bounds
            .positions()
            .any(|at| self.block_at(at).map_or(false, Block::is_liquid))
    }
}

/// In-memory world volume. Unset cells read as `None`, which generation code
/// treats the same as air.
#[derive(Clone, Debug, Default)]
pub struct WorldExcerpt {
    blocks: HashMap<BlockCoord, Block>,
    biomes: HashMap<BlockColumnCoord, Biome>,
    block_entities: HashMap<BlockCoord, BlockEntity>,
}

impl WorldExcerpt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills every position in `bounds` with `block`.
    pub fn fill_volume(&mut self, bounds: &BlockBox, block: Block) {
        for at in bounds.positions() {
            self.blocks.insert(at, block);
        }
    }

    pub fn set_biome(&mut self, column: BlockColumnCoord, biome: Biome) {
        self.biomes.insert(column, biome);
    }

    pub fn block_entity_at(&self, at: BlockCoord) -> Option<&BlockEntity> {
        self.block_entities.get(&at)
    }

    pub fn blocks(&self) -> impl Iterator<Item = (&BlockCoord, &Block)> {
        self.blocks.iter()
    }

    /// All cell contents in deterministic order, for comparing generation runs.
    pub fn sorted_blocks(&self) -> Vec<(BlockCoord, Block)> {
        let mut cells: Vec<(BlockCoord, Block)> =
            self.blocks.iter().map(|(at, block)| (*at, *block)).collect();
        cells.sort();
        cells
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl World for WorldExcerpt {
    fn block_at(&self, at: BlockCoord) -> Option<&Block> {
        self.blocks.get(&at)
    }

    fn set_block_at(&mut self, at: BlockCoord, block: Block) {
        // Overwriting a furnace or container discards its block entity.
        self.block_entities.remove(&at);
        self.blocks.insert(at, block);
    }

    fn biome_at(&self, column: BlockColumnCoord) -> Biome {
        *self.biomes.get(&column).unwrap_or(&Biome::Plains)
    }

    fn set_furnace_fuel(&mut self, at: BlockCoord, fuel: ItemStack) {
        if let Some(Block::Furnace { .. }) = self.block_at(at) {
            self.block_entities.insert(at, BlockEntity::Furnace { fuel });
        } else {
            log::warn!("tried to fuel a furnace at {:?}, but found none", at);
        }
    }

    fn populate_container(&mut self, at: BlockCoord, table: LootTable, rng: &mut dyn RngCore) {
        let items = loot::roll(table, rng);
        self.block_entities
            .insert(at, BlockEntity::Container { items });
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::geometry::Direction;
    use crate::loot::Item;

    use super::*;

    #[test]
    fn unset_cells_read_as_none() {
        let excerpt = WorldExcerpt::new();
        assert_eq!(excerpt.block_at(BlockCoord(0, 0, 0)), None);
    }

    #[test]
    fn set_and_read_back() {
        let mut excerpt = WorldExcerpt::new();
        excerpt.set_block_at(BlockCoord(1, 2, 3), Block::StoneBricks);
        assert_eq!(
            excerpt.block_at(BlockCoord(1, 2, 3)),
            Some(&Block::StoneBricks)
        );
    }

    #[test]
    fn liquid_detection_covers_the_whole_box() {
        let mut excerpt = WorldExcerpt::new();
        let bounds = BlockBox::from_corners(BlockCoord(0, 0, 0), BlockCoord(9, 4, 4));
        excerpt.fill_volume(&bounds, Block::Stone);
        assert!(!excerpt.has_liquid_within(&bounds));

        excerpt.set_block_at(BlockCoord(5, 2, 2), Block::Water);
        assert!(excerpt.has_liquid_within(&bounds));
    }

    #[test]
    fn biome_defaults_to_plains() {
        let mut excerpt = WorldExcerpt::new();
        assert_eq!(excerpt.biome_at(BlockColumnCoord(3, 3)), Biome::Plains);

        excerpt.set_biome(BlockColumnCoord(3, 3), Biome::Ocean);
        assert!(excerpt.biome_at(BlockColumnCoord(3, 3)).is_ocean());
    }

    #[test]
    fn furnace_fuel_requires_a_furnace() {
        let mut excerpt = WorldExcerpt::new();
        let at = BlockCoord(0, 1, 0);
        excerpt.set_furnace_fuel(at, ItemStack::new(Item::Coal, 5));
        assert_eq!(excerpt.block_entity_at(at), None);

        excerpt.set_block_at(
            at,
            Block::Furnace {
                facing: Direction::North,
            },
        );
        excerpt.set_furnace_fuel(at, ItemStack::new(Item::Coal, 5));
        assert_eq!(
            excerpt.block_entity_at(at),
            Some(&BlockEntity::Furnace {
                fuel: ItemStack::new(Item::Coal, 5)
            })
        );
    }

    #[test]
    fn overwriting_a_container_drops_its_loot() {
        let mut excerpt = WorldExcerpt::new();
        let at = BlockCoord(2, 1, 2);
        let mut rng = StdRng::seed_from_u64(1);
        excerpt.set_block_at(at, Block::Barrel);
        excerpt.populate_container(at, LootTable::AbandonedMineshaft, &mut rng);
        assert!(excerpt.block_entity_at(at).is_some());

        excerpt.set_block_at(at, Block::Air);
        assert_eq!(excerpt.block_entity_at(at), None);
    }
}
