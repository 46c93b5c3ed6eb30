use log::{debug, info};
use rand::RngCore;

use crate::block::Theme;
use crate::dungeon::SideRoomDungeon;
use crate::geometry::{BlockBox, BlockCoord, Direction};
use crate::persist::{PieceKind, PieceRecord};
use crate::piece::MineshaftPiece;
use crate::side_room::{self, SideRoom};
use crate::world::World;

/// Attachment stops once a piece tries to spawn children below this depth.
/// Side rooms attach cellars at depth 0; cellars attach nothing.
const MAX_ATTACH_DEPTH: usize = 0;

/// A placed piece, ready for generation.
pub enum Piece {
    SideRoom(SideRoom),
    Dungeon(SideRoomDungeon),
}

impl Piece {
    pub fn as_piece(&self) -> &dyn MineshaftPiece {
        match self {
            Piece::SideRoom(room) => room,
            Piece::Dungeon(cellar) => cellar,
        }
    }

    pub fn kind(&self) -> PieceKind {
        match self {
            Piece::SideRoom(_) => PieceKind::SideRoom,
            Piece::Dungeon(_) => PieceKind::SideRoomDungeon,
        }
    }
}

/// All pieces of one mineshaft, in generation order, plus the append-only
/// list of boxes used for placement resolution.
pub struct Mineshaft {
    pub theme: Theme,
    pub pieces: Vec<Piece>,
    placed: Vec<BlockBox>,
}

impl Mineshaft {
    pub fn new(theme: Theme) -> Self {
        Mineshaft {
            theme,
            pieces: Vec::new(),
            placed: Vec::new(),
        }
    }

    /// Smallest box covering every placed piece, if any were placed.
    pub fn bounds(&self) -> Option<BlockBox> {
        let mut boxes = self.placed.iter();
        let first = *boxes.next()?;
        Some(boxes.fold(first, |acc, next| acc.union(next)))
    }

    pub fn placed_boxes(&self) -> &[BlockBox] {
        &self.placed
    }

    /// Materializes every piece into the world, in placement order.
    /// Returns how many passed their environment gates.
    pub fn generate_all(&self, world: &mut dyn World, rng: &mut dyn RngCore) -> usize {
        let mut generated = 0;
        for piece in &self.pieces {
            if piece.as_piece().generate(world, rng) {
                generated += 1;
            }
        }
        info!("materialized {} of {} pieces", generated, self.pieces.len());
        generated
    }

    pub fn records(&self) -> Vec<PieceRecord> {
        self.pieces
            .iter()
            .map(|piece| piece.as_piece().to_record())
            .collect()
    }

    /// Rebuilds a mineshaft from persisted records. Box resolution is not
    /// rerun; the records carry the already accepted boxes.
    pub fn from_records(theme: Theme, records: &[PieceRecord]) -> Self {
        let mut shaft = Mineshaft::new(theme);
        for record in records {
            let piece = match record.kind {
                PieceKind::SideRoom => Piece::SideRoom(SideRoom::from_record(record, theme)),
                PieceKind::SideRoomDungeon => {
                    Piece::Dungeon(SideRoomDungeon::from_record(record, theme))
                }
            };
            shaft.placed.push(record.bounding_box);
            shaft.pieces.push(piece);
        }
        shaft
    }
}

/// Walks a row of side rooms from the anchor, stepping one room width along
/// the secondary axis per slot, and lets each placed room roll for a dungeon
/// cellar. Rejected placements are skipped, not retried.
pub fn build_chain(
    rng: &mut dyn RngCore,
    theme: Theme,
    anchor: BlockCoord,
    facing: Direction,
    count: usize,
) -> Mineshaft {
    let mut shaft = Mineshaft::new(theme);

    for index in 0..count {
        let step = index as i64 * side_room::SECONDARY_AXIS_LEN;
        let (x, y, z) = match facing {
            Direction::North | Direction::South => (anchor.0 + step, anchor.1, anchor.2),
            Direction::East | Direction::West => (anchor.0, anchor.1, anchor.2 + step),
        };

        let bounds = match SideRoom::determine_box_position(&shaft.placed, x, y, z, facing) {
            Some(bounds) => bounds,
            None => {
                debug!("chain slot {} rejected: box overlap", index);
                continue;
            }
        };
        shaft.placed.push(bounds);

        let mut room = SideRoom::new(index, count, bounds, facing, theme);
        let cellar = room.try_attach(&shaft.placed, rng);
        if let Some(cellar) = &cellar {
            room.has_downstairs = true;
            shaft.placed.push(cellar.bounding_box);
        }

        shaft.pieces.push(Piece::SideRoom(room));
        if let Some(cellar) = cellar {
            shaft.pieces.push(Piece::Dungeon(cellar));
        }
    }

    shaft
}

/// Factory for dungeon cellars, called by side rooms during attachment.
/// Resolves the box against every placed piece; on overlap, or past the
/// attachment depth limit, no piece is spawned.
pub fn spawn_dungeon_piece(
    placed: &[BlockBox],
    _rng: &mut dyn RngCore,
    x: i64,
    y: i64,
    z: i64,
    facing: Direction,
    chain_length: usize,
    depth: usize,
    theme: Theme,
) -> Option<SideRoomDungeon> {
    if depth > MAX_ATTACH_DEPTH {
        debug!("dungeon attachment rejected: depth {}", depth);
        return None;
    }

    let bounds = SideRoomDungeon::determine_box_position(placed, x, y, z, facing)?;
    Some(SideRoomDungeon::new(chain_length, bounds, facing, theme))
}

#[cfg(test)]
mod tests {
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::block::Block;
    use crate::world::WorldExcerpt;

    use super::*;

    #[test]
    fn chain_rooms_never_overlap() {
        let mut rng = StdRng::seed_from_u64(17);
        let shaft = build_chain(
            &mut rng,
            Theme::Classic,
            BlockCoord(0, 64, 0),
            Direction::South,
            6,
        );

        let placed = shaft.placed_boxes();
        assert!(!placed.is_empty());
        for (i, a) in placed.iter().enumerate() {
            for b in placed.iter().skip(i + 1) {
                assert!(!a.intersects(b), "boxes {} and {:?} overlap", i, b);
            }
        }
    }

    #[test]
    fn downstairs_flag_matches_dungeon_presence() {
        // Always-zero stream: every attachment roll hits.
        let mut rng = StepRng::new(0, 0);
        let shaft = build_chain(
            &mut rng,
            Theme::Classic,
            BlockCoord(0, 64, 0),
            Direction::East,
            4,
        );

        let dungeons = shaft
            .pieces
            .iter()
            .filter(|piece| piece.kind() == PieceKind::SideRoomDungeon)
            .count();
        let flagged = shaft
            .pieces
            .iter()
            .filter(|piece| match piece {
                Piece::SideRoom(room) => room.has_downstairs,
                Piece::Dungeon(_) => false,
            })
            .count();
        assert_eq!(dungeons, flagged);
        assert!(dungeons > 0);
    }

    #[test]
    fn factory_rejects_overlapping_cellar() {
        let blocker = BlockBox::from_corners(BlockCoord(0, 56, -10), BlockCoord(20, 63, 10));
        let mut rng = StdRng::seed_from_u64(0);
        assert!(spawn_dungeon_piece(
            &[blocker],
            &mut rng,
            6,
            60,
            0,
            Direction::North,
            1,
            0,
            Theme::Classic,
        )
        .is_none());
    }

    #[test]
    fn factory_rejects_past_depth_limit() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(spawn_dungeon_piece(
            &[],
            &mut rng,
            6,
            60,
            0,
            Direction::North,
            1,
            1,
            Theme::Classic,
        )
        .is_none());
    }

    #[test]
    fn records_round_trip_preserves_order_and_boxes() {
        let mut rng = StdRng::seed_from_u64(99);
        let shaft = build_chain(
            &mut rng,
            Theme::Mossy,
            BlockCoord(0, 64, 0),
            Direction::North,
            5,
        );

        let records = shaft.records();
        let rebuilt = Mineshaft::from_records(Theme::Mossy, &records);
        assert_eq!(rebuilt.pieces.len(), shaft.pieces.len());
        for (a, b) in shaft.pieces.iter().zip(rebuilt.pieces.iter()) {
            assert_eq!(a.kind(), b.kind());
            assert_eq!(a.as_piece().bounding_box(), b.as_piece().bounding_box());
            assert_eq!(a.as_piece().facing(), b.as_piece().facing());
        }
        assert_eq!(rebuilt.bounds(), shaft.bounds());
    }

    #[test]
    fn rebuilt_chain_regenerates_the_same_blocks() {
        let mut build_rng = StdRng::seed_from_u64(4);
        let shaft = build_chain(
            &mut build_rng,
            Theme::Classic,
            BlockCoord(0, 64, 0),
            Direction::West,
            3,
        );
        let rebuilt = Mineshaft::from_records(Theme::Classic, &shaft.records());

        let bounds = shaft.bounds().unwrap().expanded(1);
        let mut first = WorldExcerpt::new();
        let mut second = WorldExcerpt::new();
        first.fill_volume(&bounds, Block::Stone);
        second.fill_volume(&bounds, Block::Stone);

        let mut rng_a = StdRng::seed_from_u64(31);
        let mut rng_b = StdRng::seed_from_u64(31);
        assert_eq!(
            shaft.generate_all(&mut first, &mut rng_a),
            rebuilt.generate_all(&mut second, &mut rng_b)
        );
        assert_eq!(first.sorted_blocks(), second.sorted_blocks());
    }
}
