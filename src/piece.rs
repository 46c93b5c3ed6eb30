use rand::{Rng, RngCore};

use crate::block::{Block, BrickSelector, Theme};
use crate::geometry::{local_to_world, BlockBox, BlockColumnCoord, BlockCoord, Direction};
use crate::loot::LootTable;
use crate::persist::PieceRecord;
use crate::world::World;

/// One discrete generated unit within the mineshaft.
///
/// Placement resolution and chain attachment are inherent to each concrete
/// piece kind; this trait covers what the walker needs once a piece has its
/// box: materializing it and describing it for persistence and map export.
pub trait MineshaftPiece {
    fn bounding_box(&self) -> &BlockBox;

    fn facing(&self) -> Direction;

    /// Carves and decorates the piece. Returns `false` if the environment
    /// gate rejected generation; in that case no cell was written.
    fn generate(&self, world: &mut dyn World, rng: &mut dyn RngCore) -> bool;

    fn to_record(&self) -> PieceRecord;
}

/// First already-placed box intersecting `candidate`, if any. Pieces use this
/// for placement resolution; the first hit is enough to reject, no scoring.
pub fn overlapping_box<'a>(placed: &'a [BlockBox], candidate: &BlockBox) -> Option<&'a BlockBox> {
    placed.iter().find(|other| other.intersects(candidate))
}

/// Bounding box plus facing: everything needed to route local coordinates
/// into the world. Shared by all piece kinds.
#[derive(Clone, Copy, Debug)]
pub struct PieceFrame {
    pub bounding_box: BlockBox,
    pub facing: Direction,
}

impl PieceFrame {
    pub fn local_to_world(&self, local: BlockCoord) -> BlockCoord {
        local_to_world(&self.bounding_box, self.facing, local)
    }

    fn column_at(&self, local_x: i64, local_z: i64) -> BlockColumnCoord {
        self.local_to_world(BlockCoord(local_x, 0, local_z)).into()
    }
}

/// Writes a block at piece-local coordinates. Writes landing outside the
/// piece's own box are dropped; no piece may spill into a neighbour.
pub fn add_block(world: &mut dyn World, frame: &PieceFrame, block: Block, local: BlockCoord) {
    let at = frame.local_to_world(local);
    if frame.bounding_box.contains(at) {
        world.set_block_at(at, block);
    }
}

/// Reads the block at piece-local coordinates.
pub fn block_at(world: &dyn World, frame: &PieceFrame, local: BlockCoord) -> Option<Block> {
    world.block_at(frame.local_to_world(local)).copied()
}

/// Fills a local cuboid with one fixed block.
pub fn fill(
    world: &mut dyn World,
    frame: &PieceFrame,
    from: BlockCoord,
    to: BlockCoord,
    block: Block,
) {
    for y in from.1..=to.1 {
        for z in from.2..=to.2 {
            for x in from.0..=to.0 {
                add_block(world, frame, block, BlockCoord(x, y, z));
            }
        }
    }
}

/// Fills a local cuboid with the selector, one fresh roll per cell.
pub fn fill_with_selector<R: Rng + ?Sized>(
    world: &mut dyn World,
    frame: &PieceFrame,
    rng: &mut R,
    from: BlockCoord,
    to: BlockCoord,
    selector: &BrickSelector,
) {
    for y in from.1..=to.1 {
        for z in from.2..=to.2 {
            for x in from.0..=to.0 {
                add_block(world, frame, selector.get(rng), BlockCoord(x, y, z));
            }
        }
    }
}

/// Replaces every non-air cell in the local cuboid with the selector.
/// Normalizes pre-existing terrain inside the footprint without carving air.
pub fn replace_non_air<R: Rng + ?Sized>(
    world: &mut dyn World,
    frame: &PieceFrame,
    rng: &mut R,
    from: BlockCoord,
    to: BlockCoord,
    selector: &BrickSelector,
) {
    for y in from.1..=to.1 {
        for z in from.2..=to.2 {
            for x in from.0..=to.0 {
                let local = BlockCoord(x, y, z);
                match block_at(world, frame, local) {
                    Some(block) if !block.is_air() => {
                        add_block(world, frame, selector.get(rng), local);
                    }
                    _ => (),
                }
            }
        }
    }
}

/// Places `block` with the given probability. Always consumes exactly one
/// random draw, so downstream rolls stay aligned whether or not it hits.
pub fn chance_add_block<R: Rng + ?Sized>(
    world: &mut dyn World,
    frame: &PieceFrame,
    rng: &mut R,
    chance: f32,
    block: Block,
    local: BlockCoord,
) {
    if rng.gen::<f32>() < chance {
        add_block(world, frame, block, local);
    }
}

/// True if the footprint column at the given local coordinates lies in an
/// ocean biome.
pub fn is_in_ocean(world: &dyn World, frame: &PieceFrame, local_x: i64, local_z: i64) -> bool {
    world.biome_at(frame.column_at(local_x, local_z)).is_ocean()
}

/// One brick support pillar spanning the local y range at (x, z).
pub fn generate_leg<R: Rng + ?Sized>(
    world: &mut dyn World,
    frame: &PieceFrame,
    rng: &mut R,
    local_x: i64,
    local_z: i64,
    from_y: i64,
    to_y: i64,
    selector: &BrickSelector,
) {
    for y in from_y..=to_y {
        add_block(world, frame, selector.get(rng), BlockCoord(local_x, y, local_z));
    }
}

/// Barrel with loot from the given table.
pub fn add_barrel(
    world: &mut dyn World,
    frame: &PieceFrame,
    rng: &mut dyn RngCore,
    local: BlockCoord,
    table: LootTable,
) {
    let at = frame.local_to_world(local);
    if frame.bounding_box.contains(at) {
        world.set_block_at(at, Block::Barrel);
        world.populate_container(at, table, rng);
    }
}

/// Scatters theme-dependent growth over the local cuboid: mushrooms on solid
/// floor cells, cobwebs below solid ceilings. One chance roll per candidate
/// cell, scanned in fixed order.
pub fn add_biome_decorations<R: Rng + ?Sized>(
    world: &mut dyn World,
    frame: &PieceFrame,
    rng: &mut R,
    theme: Theme,
    from: BlockCoord,
    to: BlockCoord,
) {
    let chance = theme.decoration_chance();
    for y in from.1..=to.1 {
        for z in from.2..=to.2 {
            for x in from.0..=to.0 {
                let local = BlockCoord(x, y, z);
                let open = block_at(world, frame, local).map_or(true, |block| block.is_air());
                if !open {
                    continue;
                }

                let below = block_at(world, frame, BlockCoord(x, y - 1, z));
                let above = block_at(world, frame, BlockCoord(x, y + 1, z));
                let on_floor = below.map_or(false, |block| block.is_solid());
                let under_ceiling = above.map_or(false, |block| block.is_solid());
                if !on_floor && !under_ceiling {
                    continue;
                }

                if rng.gen::<f32>() < chance {
                    let block = if on_floor && theme != Theme::Desert {
                        if rng.gen::<f32>() < 0.5 {
                            Block::BrownMushroom
                        } else {
                            Block::RedMushroom
                        }
                    } else {
                        Block::Cobweb
                    };
                    add_block(world, frame, block, local);
                }
            }
        }
    }
}

/// Hangs vines on air cells that back onto something solid.
pub fn add_vines<R: Rng + ?Sized>(
    world: &mut dyn World,
    frame: &PieceFrame,
    rng: &mut R,
    theme: Theme,
    from: BlockCoord,
    to: BlockCoord,
) {
    let chance = theme.vine_chance();
    if chance <= 0.0 {
        return;
    }

    for y in from.1..=to.1 {
        for z in from.2..=to.2 {
            for x in from.0..=to.0 {
                let local = BlockCoord(x, y, z);
                let open = block_at(world, frame, local).map_or(true, |block| block.is_air());
                if !open {
                    continue;
                }

                let sideways = [
                    BlockCoord(x - 1, y, z),
                    BlockCoord(x + 1, y, z),
                    BlockCoord(x, y, z - 1),
                    BlockCoord(x, y, z + 1),
                ];
                let backed = sideways
                    .iter()
                    .any(|side| block_at(world, frame, *side).map_or(false, |b| b.is_solid()));
                if backed && rng.gen::<f32>() < chance {
                    add_block(world, frame, Block::Vine, local);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::world::WorldExcerpt;

    use super::*;

    fn frame(facing: Direction) -> PieceFrame {
        PieceFrame {
            bounding_box: BlockBox::from_anchor_with_rotation(0, 64, 0, 10, 5, 5, facing),
            facing,
        }
    }

    #[test]
    fn overlapping_box_returns_first_hit() {
        let placed = vec![
            BlockBox::from_corners(BlockCoord(20, 0, 0), BlockCoord(29, 4, 4)),
            BlockBox::from_corners(BlockCoord(0, 0, 0), BlockCoord(9, 4, 4)),
        ];
        let candidate = BlockBox::from_corners(BlockCoord(5, 0, 0), BlockCoord(24, 4, 4));
        assert_eq!(overlapping_box(&placed, &candidate), Some(&placed[0]));

        let clear = BlockBox::from_corners(BlockCoord(40, 0, 0), BlockCoord(49, 4, 4));
        assert_eq!(overlapping_box(&placed, &clear), None);
    }

    #[test]
    fn writes_outside_own_box_are_dropped() {
        let frame = frame(Direction::South);
        let mut excerpt = WorldExcerpt::new();
        add_block(
            &mut excerpt,
            &frame,
            Block::StoneBricks,
            BlockCoord(11, 0, 0),
        );
        assert!(excerpt.is_empty());
    }

    #[test]
    fn fill_covers_the_requested_cuboid() {
        let frame = frame(Direction::North);
        let mut excerpt = WorldExcerpt::new();
        fill(
            &mut excerpt,
            &frame,
            BlockCoord(0, 0, 0),
            BlockCoord(9, 1, 4),
            Block::Stone,
        );
        assert_eq!(excerpt.sorted_blocks().len(), 10 * 2 * 5);
    }

    #[test]
    fn replace_non_air_leaves_air_alone() {
        let frame = frame(Direction::North);
        let mut excerpt = WorldExcerpt::new();
        let mut rng = StdRng::seed_from_u64(0);
        let selector = Theme::Classic.brick_selector();

        add_block(&mut excerpt, &frame, Block::Dirt, BlockCoord(3, 2, 2));
        add_block(&mut excerpt, &frame, Block::Air, BlockCoord(4, 2, 2));
        replace_non_air(
            &mut excerpt,
            &frame,
            &mut rng,
            BlockCoord(0, 2, 0),
            BlockCoord(9, 3, 4),
            &selector,
        );

        let palette: Vec<Block> = selector.palette().collect();
        let replaced = block_at(&excerpt, &frame, BlockCoord(3, 2, 2)).unwrap();
        assert!(palette.contains(&replaced));
        assert_eq!(
            block_at(&excerpt, &frame, BlockCoord(4, 2, 2)),
            Some(Block::Air)
        );
    }

    #[test]
    fn chance_add_block_consumes_one_roll_either_way() {
        let frame = frame(Direction::North);
        let mut a = StdRng::seed_from_u64(5);
        let mut b = StdRng::seed_from_u64(5);

        let mut hit = WorldExcerpt::new();
        let mut miss = WorldExcerpt::new();
        chance_add_block(
            &mut hit,
            &frame,
            &mut a,
            1.0,
            Block::CraftingTable,
            BlockCoord(3, 1, 1),
        );
        chance_add_block(
            &mut miss,
            &frame,
            &mut b,
            0.0,
            Block::CraftingTable,
            BlockCoord(3, 1, 1),
        );

        // Both streams advanced identically.
        assert_eq!(a.gen::<u64>(), b.gen::<u64>());
        assert!(!hit.is_empty());
        assert!(miss.is_empty());
    }

    #[test]
    fn vines_only_grow_against_solid_blocks() {
        let frame = frame(Direction::North);
        let mut excerpt = WorldExcerpt::new();
        let mut rng = StdRng::seed_from_u64(9);

        // No solid blocks anywhere: no vines, regardless of theme.
        add_vines(
            &mut excerpt,
            &frame,
            &mut rng,
            Theme::Mossy,
            BlockCoord(1, 0, 1),
            BlockCoord(8, 4, 3),
        );
        assert!(excerpt.is_empty());
    }
}
