use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single block position in absolute world coordinates.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
pub struct BlockCoord(pub i64, pub i64, pub i64);

/// A column position (x, z), without the vertical component.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct BlockColumnCoord(pub i64, pub i64);

impl From<(i64, i64, i64)> for BlockCoord {
    fn from((x, y, z): (i64, i64, i64)) -> Self {
        BlockCoord(x, y, z)
    }
}

impl From<BlockCoord> for BlockColumnCoord {
    fn from(coord: BlockCoord) -> Self {
        BlockColumnCoord(coord.0, coord.2)
    }
}

impl Add for BlockCoord {
    type Output = BlockCoord;

    fn add(self, other: BlockCoord) -> BlockCoord {
        BlockCoord(self.0 + other.0, self.1 + other.1, self.2 + other.2)
    }
}

impl Sub for BlockCoord {
    type Output = BlockCoord;

    fn sub(self, other: BlockCoord) -> BlockCoord {
        BlockCoord(self.0 - other.0, self.1 - other.1, self.2 - other.2)
    }
}

/// Horizontal facing of a structure piece.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string.to_ascii_lowercase().as_str() {
            "north" | "n" => Ok(Direction::North),
            "south" | "s" => Ok(Direction::South),
            "east" | "e" => Ok(Direction::East),
            "west" | "w" => Ok(Direction::West),
            other => Err(format!("not a cardinal direction: {}", other)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        };
        write!(formatter, "{}", name)
    }
}

/// Axis-aligned bounding volume, inclusive on all sides.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct BlockBox {
    pub min: BlockCoord,
    pub max: BlockCoord,
}

impl BlockBox {
    /// Box from two opposite corners, in any order.
    pub fn from_corners(a: BlockCoord, b: BlockCoord) -> Self {
        BlockBox {
            min: BlockCoord(a.0.min(b.0), a.1.min(b.1), a.2.min(b.2)),
            max: BlockCoord(a.0.max(b.0), a.1.max(b.1), a.2.max(b.2)),
        }
    }

    /// Box of the given local dimensions (secondary axis × vertical × main axis),
    /// anchored at `(x, y, z)` and rotated for `facing`.
    ///
    /// The secondary axis runs perpendicular to facing, the main axis along it.
    pub fn from_anchor_with_rotation(
        x: i64,
        y: i64,
        z: i64,
        secondary_axis_len: i64,
        y_axis_len: i64,
        main_axis_len: i64,
        facing: Direction,
    ) -> Self {
        let (s, h, m) = (secondary_axis_len - 1, y_axis_len - 1, main_axis_len - 1);
        match facing {
            Direction::North => {
                Self::from_corners(BlockCoord(x, y, z - m), BlockCoord(x + s, y + h, z))
            }
            Direction::South => {
                Self::from_corners(BlockCoord(x, y, z), BlockCoord(x + s, y + h, z + m))
            }
            Direction::West => {
                Self::from_corners(BlockCoord(x - m, y, z), BlockCoord(x, y + h, z + s))
            }
            Direction::East => {
                Self::from_corners(BlockCoord(x, y, z), BlockCoord(x + m, y + h, z + s))
            }
        }
    }

    pub fn x_len(&self) -> i64 {
        self.max.0 - self.min.0 + 1
    }

    pub fn y_len(&self) -> i64 {
        self.max.1 - self.min.1 + 1
    }

    pub fn z_len(&self) -> i64 {
        self.max.2 - self.min.2 + 1
    }

    pub fn volume(&self) -> i64 {
        self.x_len() * self.y_len() * self.z_len()
    }

    pub fn contains(&self, at: BlockCoord) -> bool {
        at.0 >= self.min.0
            && at.0 <= self.max.0
            && at.1 >= self.min.1
            && at.1 <= self.max.1
            && at.2 >= self.min.2
            && at.2 <= self.max.2
    }

    pub fn intersects(&self, other: &BlockBox) -> bool {
        self.min.0 <= other.max.0
            && self.max.0 >= other.min.0
            && self.min.1 <= other.max.1
            && self.max.1 >= other.min.1
            && self.min.2 <= other.max.2
            && self.max.2 >= other.min.2
    }

    /// Smallest box covering both `self` and `other`.
    pub fn union(&self, other: &BlockBox) -> BlockBox {
        BlockBox {
            min: BlockCoord(
                self.min.0.min(other.min.0),
                self.min.1.min(other.min.1),
                self.min.2.min(other.min.2),
            ),
            max: BlockCoord(
                self.max.0.max(other.max.0),
                self.max.1.max(other.max.1),
                self.max.2.max(other.max.2),
            ),
        }
    }

    /// Box grown by `margin` blocks in every direction.
    pub fn expanded(&self, margin: i64) -> BlockBox {
        BlockBox {
            min: self.min - BlockCoord(margin, margin, margin),
            max: self.max + BlockCoord(margin, margin, margin),
        }
    }

    /// Iterate over every position inside the box, x innermost.
    pub fn positions(&self) -> impl Iterator<Item = BlockCoord> {
        let (min, max) = (self.min, self.max);
        (min.1..=max.1).flat_map(move |y| {
            (min.2..=max.2).flat_map(move |z| (min.0..=max.0).map(move |x| BlockCoord(x, y, z)))
        })
    }
}

/// Maps orientation-relative local coordinates within a piece's bounding box to
/// absolute world coordinates. Follows the usual structure piece convention:
/// local x runs along the secondary axis, local z along the facing axis.
pub fn local_to_world(bounds: &BlockBox, facing: Direction, local: BlockCoord) -> BlockCoord {
    let BlockCoord(x, y, z) = local;
    let world_y = bounds.min.1 + y;
    match facing {
        Direction::North => BlockCoord(bounds.min.0 + x, world_y, bounds.max.2 - z),
        Direction::South => BlockCoord(bounds.min.0 + x, world_y, bounds.min.2 + z),
        Direction::West => BlockCoord(bounds.max.0 - z, world_y, bounds.min.2 + x),
        Direction::East => BlockCoord(bounds.min.0 + z, world_y, bounds.min.2 + x),
    }
}
