use log::debug;
use rand::{Rng, RngCore};

use crate::block::{Block, BrickSelector, Theme};
use crate::chain;
use crate::dungeon::SideRoomDungeon;
use crate::geometry::{BlockBox, BlockCoord, Direction};
use crate::loot::{Item, ItemStack, LootTable};
use crate::persist::{PieceKind, PieceRecord};
use crate::piece::{self, MineshaftPiece, PieceFrame};
use crate::world::World;

// Local extent before orientation: secondary axis × vertical × main axis.
pub const SECONDARY_AXIS_LEN: i64 = 10;
pub const Y_AXIS_LEN: i64 = 5;
pub const MAIN_AXIS_LEN: i64 = 5;

const LOCAL_X_END: i64 = SECONDARY_AXIS_LEN - 1;
const LOCAL_Y_END: i64 = Y_AXIS_LEN - 1;
const LOCAL_Z_END: i64 = MAIN_AXIS_LEN - 1;

/// Chance of a side room spawning a dungeon cellar below itself.
const DUNGEON_CHANCE: f32 = 0.25;

/// Which ceiling cells stayed solid after carving. Indexed `[x][z]` over the
/// full local footprint; the support rule only ever reads `x ∈ [2, 7]`,
/// `z ∈ [2, 3]`, the border cells are carried but unused.
type CeilingOccupancy = [[bool; MAIN_AXIS_LEN as usize]; SECONDARY_AXIS_LEN as usize];

/// A storage room branching off the main mineshaft: brick shell, furnaces and
/// crafting gear, and sometimes a hatch down to a dungeon cellar.
#[derive(Clone, Debug)]
pub struct SideRoom {
    pub facing: Direction,
    pub bounding_box: BlockBox,
    pub chain_index: usize,
    pub chain_length: usize,
    /// Set once, when a dungeon cellar successfully attaches below.
    pub has_downstairs: bool,
    pub theme: Theme,
}

impl SideRoom {
    pub fn new(
        chain_index: usize,
        chain_length: usize,
        bounding_box: BlockBox,
        facing: Direction,
        theme: Theme,
    ) -> Self {
        SideRoom {
            facing,
            bounding_box,
            chain_index,
            chain_length,
            has_downstairs: false,
            theme,
        }
    }

    /// Rehydrates a previously generated room. No re-randomization: the
    /// persisted `has_downstairs` decides legs vs. hatch on regeneration.
    pub fn from_record(record: &PieceRecord, theme: Theme) -> Self {
        SideRoom {
            facing: record.facing,
            bounding_box: record.bounding_box,
            chain_index: record.chain_index,
            chain_length: record.chain_length,
            has_downstairs: record.has_downstairs,
            theme,
        }
    }

    /// Candidate box for a side room at the given anchor and facing, or
    /// `None` if it would overlap an already placed piece. Pure query: the
    /// caller registers the box itself once it accepts the placement.
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

    /// Rolls for a dungeon cellar below this room and, on success, asks the
    /// factory to instantiate it at a facing-dependent offset: lateral
    /// displacement 6 along the secondary axis, vertical drop 4.
    ///
    /// Returns the cellar piece if placement succeeded. The caller registers
    /// its box and records `has_downstairs = true` on this room.
    pub fn try_attach(
        &self,
        placed: &[BlockBox],
        rng: &mut dyn RngCore,
    ) -> Option<SideRoomDungeon> {
        if rng.gen::<f32>() >= DUNGEON_CHANCE {
            return None;
        }

        let bounds = &self.bounding_box;
        let (x, y, z) = match self.facing {
            Direction::North => (bounds.min.0 + 6, bounds.min.1 - 4, bounds.max.2),
            Direction::South => (bounds.min.0 + 6, bounds.min.1 - 4, bounds.min.2),
            Direction::West => (bounds.max.0, bounds.min.1 - 4, bounds.min.2 + 6),
            Direction::East => (bounds.min.0, bounds.min.1 - 4, bounds.min.2 + 6),
        };

        chain::spawn_dungeon_piece(
            placed,
            rng,
            x,
            y,
            z,
            self.facing,
            self.chain_length,
            0,
            self.theme,
        )
    }

    fn frame(&self) -> PieceFrame {
        PieceFrame {
            bounding_box: self.bounding_box,
            facing: self.facing,
        }
    }

    /// Fill with brick, then clean out with air. Tracks which ceiling cells
    /// stayed solid, for the support placement later on.
    fn carve(
        &self,
        world: &mut dyn World,
        rng: &mut dyn RngCore,
        frame: &PieceFrame,
        selector: &BrickSelector,
    ) -> CeilingOccupancy {
        // Floor.
        piece::fill_with_selector(
            world,
            frame,
            rng,
            BlockCoord(0, 0, 0),
            BlockCoord(LOCAL_X_END, 1, LOCAL_Z_END),
            selector,
        );
        // Normalize whatever terrain pokes into the wall layers.
        piece::replace_non_air(
            world,
            frame,
            rng,
            BlockCoord(0, 2, 0),
            BlockCoord(LOCAL_X_END, LOCAL_Y_END - 1, LOCAL_Z_END),
            selector,
        );
        // Walkable interior.
        piece::fill(
            world,
            frame,
            BlockCoord(1, 1, 0),
            BlockCoord(LOCAL_X_END - 1, LOCAL_Y_END - 1, LOCAL_Z_END),
            Block::Air,
        );

        let mut ceiling = [[false; MAIN_AXIS_LEN as usize]; SECONDARY_AXIS_LEN as usize];
        for x in 0..=LOCAL_X_END {
            for z in 0..=LOCAL_Z_END {
                let local = BlockCoord(x, LOCAL_Y_END, z);
                match piece::block_at(world, frame, local) {
                    Some(block) if !block.is_air() => {
                        piece::add_block(world, frame, selector.get(rng), local);
                        ceiling[x as usize][z as usize] = true;
                    }
                    _ => (),
                }
            }
        }

        ceiling
    }

    fn generate_legs(
        &self,
        world: &mut dyn World,
        rng: &mut dyn RngCore,
        frame: &PieceFrame,
        selector: &BrickSelector,
    ) {
        for (x, z) in &[
            (1, 1),
            (1, LOCAL_Z_END - 1),
            (LOCAL_X_END - 1, 1),
            (LOCAL_X_END - 1, LOCAL_Z_END - 1),
        ] {
            piece::generate_leg(world, frame, rng, *x, *z, 1, LOCAL_Y_END - 1, selector);
        }
    }

    /// Iron bar columns under solid ceiling. Greedy left-to-right: a chosen
    /// column invalidates itself and the next x, so no two supports end up
    /// adjacent along the secondary axis.
    fn generate_bar_supports(
        &self,
        world: &mut dyn World,
        rng: &mut dyn RngCore,
        frame: &PieceFrame,
        ceiling: &CeilingOccupancy,
    ) {
        let mut invalid_xs: Vec<i64> = Vec::new();
        for z in 2..=3 {
            let mut x = 2;
            while x <= 7 {
                if !invalid_xs.contains(&x)
                    && ceiling[x as usize][z as usize]
                    && rng.gen_range(0..5) == 0
                {
                    piece::fill(
                        world,
                        frame,
                        BlockCoord(x, 1, z),
                        BlockCoord(x, LOCAL_Y_END - 1, z),
                        Block::IronBars,
                    );
                    invalid_xs.push(x);
                    invalid_xs.push(x + 1);
                    x += 1;
                }
                x += 1;
            }
        }
    }

    fn decorate(
        &self,
        world: &mut dyn World,
        rng: &mut dyn RngCore,
        frame: &PieceFrame,
        ceiling: &CeilingOccupancy,
        selector: &BrickSelector,
    ) {
        if !self.has_downstairs {
            self.generate_legs(world, rng, frame, selector);
        }

        // Furnaces, each with its own coin flip and a random amount of coal
        // left in the fuel slot.
        for x in &[2, 1] {
            if rng.gen_range(0..2) == 0 {
                let local = BlockCoord(*x, 1, 1);
                piece::add_block(
                    world,
                    frame,
                    Block::Furnace {
                        facing: self.facing,
                    },
                    local,
                );
                world.set_furnace_fuel(
                    frame.local_to_world(local),
                    ItemStack::new(Item::Coal, rng.gen_range(0..33)),
                );
            }
        }

        piece::chance_add_block(
            world,
            frame,
            rng,
            0.5,
            Block::CraftingTable,
            BlockCoord(3, 1, 1),
        );

        if rng.gen_range(0..4) == 0 {
            piece::add_barrel(
                world,
                frame,
                rng,
                BlockCoord(LOCAL_X_END - 1, 1, 1),
                LootTable::AbandonedMineshaft,
            );
        }

        // Way down to the dungeon cellar, if one attached.
        if self.has_downstairs {
            piece::add_block(
                world,
                frame,
                Block::Ladder {
                    facing: self.facing,
                },
                BlockCoord(6, 0, 1),
            );
            piece::add_block(
                world,
                frame,
                Block::Trapdoor {
                    facing: self.facing,
                },
                BlockCoord(6, 1, 1),
            );
        }

        self.generate_bar_supports(world, rng, frame, ceiling);
        piece::add_biome_decorations(
            world,
            frame,
            rng,
            self.theme,
            BlockCoord(0, 0, 0),
            BlockCoord(LOCAL_X_END, LOCAL_Y_END - 1, LOCAL_Z_END),
        );
        piece::add_vines(
            world,
            frame,
            rng,
            self.theme,
            BlockCoord(1, 0, 1),
            BlockCoord(LOCAL_X_END - 1, LOCAL_Y_END, LOCAL_Z_END - 1),
        );
    }
}

impl MineshaftPiece for SideRoom {
    fn bounding_box(&self) -> &BlockBox {
        &self.bounding_box
    }

    fn facing(&self) -> Direction {
        self.facing
    }

    fn generate(&self, world: &mut dyn World, rng: &mut dyn RngCore) -> bool {
        let frame = self.frame();

        // Don't spawn if liquid in this box or if in ocean biome.
        if world.has_liquid_within(&self.bounding_box) {
            debug!("side room {} skipped: liquid in volume", self.chain_index);
            return false;
        }
        if piece::is_in_ocean(world, &frame, 0, 0)
            || piece::is_in_ocean(world, &frame, LOCAL_X_END, LOCAL_Z_END)
        {
            debug!("side room {} skipped: ocean biome", self.chain_index);
            return false;
        }

        let selector = self.theme.brick_selector();
        let ceiling = self.carve(world, rng, &frame, &selector);
        self.decorate(world, rng, &frame, &ceiling, &selector);

        true
    }

    fn to_record(&self) -> PieceRecord {
        PieceRecord {
            kind: PieceKind::SideRoom,
            facing: self.facing,
            bounding_box: self.bounding_box,
            chain_index: self.chain_index,
            chain_length: self.chain_length,
            has_downstairs: self.has_downstairs,
        }
    }
}
