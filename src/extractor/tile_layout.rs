//! Tile block layout

use crate::tiff::errors::{TiffError, TiffResult};

use super::layout_strategy::BlockLayout;

/// Fixed-size tiles, padded at the right and bottom edges
#[derive(Debug, Clone)]
pub struct TileLayout {
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
}

impl TileLayout {
    pub fn new(width: u32, height: u32, tile_width: u32, tile_height: u32) -> TiffResult<Self> {
        if tile_width == 0 || tile_height == 0 {
            return Err(TiffError::GenericError(format!(
                "Invalid tile size {}x{}", tile_width, tile_height
            )));
        }
        Ok(TileLayout { width, height, tile_width, tile_height })
    }
}

impl BlockLayout for TileLayout {
    fn block_size(&self) -> (u32, u32) {
        (self.tile_width, self.tile_height)
    }

    fn blocks_across(&self) -> u32 {
        self.width.div_ceil(self.tile_width)
    }

    fn blocks_down(&self) -> u32 {
        self.height.div_ceil(self.tile_height)
    }

    fn stored_rows(&self, _block_row: u32) -> u32 {
        self.tile_height
    }

    fn is_tiled(&self) -> bool {
        true
    }
}
