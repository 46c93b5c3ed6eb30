use std::error::Error;
use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use log::info;

use crate::chain::{Mineshaft, Piece};

const BACKGROUND: Rgb<u8> = Rgb([58, 58, 58]);
const SIDE_ROOM_FILL: Rgb<u8> = Rgb([186, 140, 93]);
const DUNGEON_FILL: Rgb<u8> = Rgb([128, 48, 48]);
const OUTLINE: Rgb<u8> = Rgb([20, 20, 20]);

const MARGIN: i64 = 4;

/// Top-down footprint map of all placed pieces, one pixel per block column.
/// Dungeon cellars draw over their parent rooms so the overlap is visible.
/// `None` if the mineshaft holds no pieces.
pub fn render_map(shaft: &Mineshaft) -> Option<RgbImage> {
    let bounds = shaft.bounds()?.expanded(MARGIN);
    let width = bounds.x_len() as u32;
    let height = bounds.z_len() as u32;
    let mut map = RgbImage::from_pixel(width, height, BACKGROUND);

    for piece in &shaft.pieces {
        let piece_box = piece.as_piece().bounding_box();
        let rect = Rect::at(
            (piece_box.min.0 - bounds.min.0) as i32,
            (piece_box.min.2 - bounds.min.2) as i32,
        )
        .of_size(piece_box.x_len() as u32, piece_box.z_len() as u32);

        let fill = match piece {
            Piece::SideRoom(_) => SIDE_ROOM_FILL,
            Piece::Dungeon(_) => DUNGEON_FILL,
        };
        draw_filled_rect_mut(&mut map, rect, fill);
        draw_hollow_rect_mut(&mut map, rect, OUTLINE);
    }

    Some(map)
}

pub fn save_map<P: AsRef<Path>>(path: P, shaft: &Mineshaft) -> Result<(), Box<dyn Error>> {
    match render_map(shaft) {
        Some(map) => {
            map.save(&path)?;
            info!("footprint map written to {}", path.as_ref().display());
        }
        None => info!("no pieces placed, skipping map export"),
    }
    Ok(())
}

/// Dumps an intermediate footprint map, for following placement while
/// debugging. Enabled through the `debug_images` feature.
#[cfg(feature = "debug_images")]
pub fn save_debug_map(shaft: &Mineshaft, stage: &str) {
    if let Some(map) = render_map(shaft) {
        let file_name = format!("debug_map_{}.png", stage);
        if let Err(error) = map.save(&file_name) {
            log::warn!("could not write {}: {}", file_name, error);
        }
    }
}
