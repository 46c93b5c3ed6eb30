use log::debug;
use rand::RngCore;

use crate::block::{Block, Theme};
use crate::geometry::{BlockBox, BlockCoord, Direction};
use crate::persist::{PieceKind, PieceRecord};
use crate::piece::{self, MineshaftPiece, PieceFrame};
use crate::world::World;

pub const SECONDARY_AXIS_LEN: i64 = 5;
pub const Y_AXIS_LEN: i64 = 4;
pub const MAIN_AXIS_LEN: i64 = 5;

const LOCAL_X_END: i64 = SECONDARY_AXIS_LEN - 1;
const LOCAL_Y_END: i64 = Y_AXIS_LEN - 1;
const LOCAL_Z_END: i64 = MAIN_AXIS_LEN - 1;

/// Dungeon cellar spawned below a side room. Reached through the room's
/// floor hatch by a ladder shaft rising along the cellar wall.
///
/// The anchor offsets in `SideRoom::try_attach` put the cellar's ladder
/// column directly underneath the parent's hatch at parent-local (6, 0, 1).
#[derive(Clone, Debug)]
pub struct SideRoomDungeon {
    pub facing: Direction,
    pub bounding_box: BlockBox,
    pub chain_length: usize,
    pub theme: Theme,
}

impl SideRoomDungeon {
    pub fn new(
        chain_length: usize,
        bounding_box: BlockBox,
        facing: Direction,
        theme: Theme,
    ) -> Self {
        SideRoomDungeon {
            facing,
            bounding_box,
            chain_length,
            theme,
        }
    }

    pub fn from_record(record: &PieceRecord, theme: Theme) -> Self {
        SideRoomDungeon {
            facing: record.facing,
            bounding_box: record.bounding_box,
            chain_length: record.chain_length,
            theme,
        }
    }

    /// Candidate box for a cellar at the given anchor, or `None` on overlap
    /// with an already placed piece. The vertical drop of 4 in the anchor
    /// leaves the cellar flush below its parent without intersecting it.
    pub fn determine_box_position(
        placed: &[BlockBox],
        x: i64,
        y: i64,
        z: i64,
        facing: Direction,
    ) -> Option<BlockBox> {
        let candidate = BlockBox::from_anchor_with_rotation(
            x,
            y,
            z,
            SECONDARY_AXIS_LEN,
            Y_AXIS_LEN,
            MAIN_AXIS_LEN,
            facing,
        );
        match piece::overlapping_box(placed, &candidate) {
            Some(_) => None,
            None => Some(candidate),
        }
    }

    fn frame(&self) -> PieceFrame {
        PieceFrame {
            bounding_box: self.bounding_box,
            facing: self.facing,
        }
    }
}

impl MineshaftPiece for SideRoomDungeon {
    fn bounding_box(&self) -> &BlockBox {
        &self.bounding_box
    }

    fn facing(&self) -> Direction {
        self.facing
    }

    fn generate(&self, world: &mut dyn World, rng: &mut dyn RngCore) -> bool {
        let frame = self.frame();

        if world.has_liquid_within(&self.bounding_box) {
            debug!("dungeon cellar skipped: liquid in volume");
            return false;
        }

        let selector = self.theme.brick_selector();

        // Brick shell around a small cleared cell.
        piece::fill_with_selector(
            world,
            &frame,
            rng,
            BlockCoord(0, 0, 0),
            BlockCoord(LOCAL_X_END, 0, LOCAL_Z_END),
            &selector,
        );
        piece::replace_non_air(
            world,
            &frame,
            rng,
            BlockCoord(0, 1, 0),
            BlockCoord(LOCAL_X_END, LOCAL_Y_END, LOCAL_Z_END),
            &selector,
        );
        piece::fill(
            world,
            &frame,
            BlockCoord(1, 1, 1),
            BlockCoord(LOCAL_X_END - 1, LOCAL_Y_END - 1, LOCAL_Z_END - 1),
            Block::Air,
        );

        // Ladder shaft through the wall and ceiling, up to the parent hatch.
        for y in 1..=LOCAL_Y_END {
            piece::add_block(
                world,
                &frame,
                Block::Ladder {
                    facing: self.facing,
                },
                BlockCoord(0, y, 1),
            );
        }

        piece::add_block(world, &frame, Block::Spawner, BlockCoord(2, 1, 2));

        piece::add_biome_decorations(
            world,
            &frame,
            rng,
            self.theme,
            BlockCoord(1, 1, 1),
            BlockCoord(LOCAL_X_END - 1, LOCAL_Y_END - 1, LOCAL_Z_END - 1),
        );

        true
    }

    fn to_record(&self) -> PieceRecord {
        PieceRecord {
            kind: PieceKind::SideRoomDungeon,
            facing: self.facing,
            bounding_box: self.bounding_box,
            chain_index: self.chain_length,
            chain_length: self.chain_length,
            has_downstairs: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::side_room::SideRoom;
    use crate::world::WorldExcerpt;

    use super::*;

    #[test]
    fn cellar_box_sits_flush_below_a_north_room() {
        let room_box = SideRoom::determine_box_position(&[], 0, 64, 0, Direction::North).unwrap();
        let placed = vec![room_box];

        // Anchor per the attachment offset table for north.
        let cellar = SideRoomDungeon::determine_box_position(
            &placed,
            room_box.min.0 + 6,
            room_box.min.1 - 4,
            room_box.max.2,
            Direction::North,
        )
        .unwrap();

        assert_eq!(cellar.max.1, room_box.min.1 - 1);
        assert!(!cellar.intersects(&room_box));
    }

    #[test]
    fn cellar_rejects_anchor_inside_existing_piece() {
        let room_box = SideRoom::determine_box_position(&[], 0, 64, 0, Direction::North).unwrap();
        let placed = vec![room_box];

        assert!(SideRoomDungeon::determine_box_position(
            &placed,
            room_box.min.0,
            room_box.min.1,
            room_box.max.2,
            Direction::North,
        )
        .is_none());
    }

    #[test]
    fn cellar_carves_shell_ladder_and_spawner() {
        let bounds =
            SideRoomDungeon::determine_box_position(&[], 6, 60, 0, Direction::North).unwrap();
        let cellar = SideRoomDungeon::new(1, bounds, Direction::North, Theme::Classic);

        let mut excerpt = WorldExcerpt::new();
        excerpt.fill_volume(&bounds, Block::Stone);
        let mut rng = StdRng::seed_from_u64(8);
        assert!(cellar.generate(&mut excerpt, &mut rng));

        let frame = cellar.frame();
        assert_eq!(
            piece::block_at(&excerpt, &frame, BlockCoord(2, 1, 2)),
            Some(Block::Spawner)
        );
        for y in 1..=LOCAL_Y_END {
            assert_eq!(
                piece::block_at(&excerpt, &frame, BlockCoord(0, y, 1)),
                Some(Block::Ladder {
                    facing: Direction::North
                })
            );
        }
        // Interior cleared around the spawner: no wall brick remains.
        let palette: Vec<Block> = Theme::Classic.brick_selector().palette().collect();
        for z in 1..=3 {
            let block = piece::block_at(&excerpt, &frame, BlockCoord(1, 2, z)).unwrap();
            assert!(!palette.contains(&block), "interior not carved at z {}", z);
        }
    }

    #[test]
    fn liquid_gates_cellar_generation() {
        let bounds =
            SideRoomDungeon::determine_box_position(&[], 6, 60, 0, Direction::North).unwrap();
        let cellar = SideRoomDungeon::new(1, bounds, Direction::North, Theme::Classic);

        let mut excerpt = WorldExcerpt::new();
        excerpt.fill_volume(&bounds, Block::Stone);
        excerpt.set_block_at(BlockCoord(7, 61, -1), Block::Lava);

        let before = excerpt.sorted_blocks();
        let mut rng = StdRng::seed_from_u64(8);
        assert!(!cellar.generate(&mut excerpt, &mut rng));
        assert_eq!(excerpt.sorted_blocks(), before);
    }
}
