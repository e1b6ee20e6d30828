//! Block layout strategies
//!
//! TIFF pixel data is stored either in strips (full-width bands of rows) or in
//! tiles (fixed-size rectangles). A `BlockLayout` answers which block holds a
//! pixel and how large each block is, so the block reader does not care which
//! organisation a file uses.

use log::debug;

use crate::tiff::constants::tags;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;

use super::strip_layout::StripLayout;
use super::tile_layout::TileLayout;

/// Strategy describing how an image is cut into blocks
pub trait BlockLayout: Send + Sync {
    /// Nominal (width, height) of one block in pixels
    fn block_size(&self) -> (u32, u32);

    /// Number of block columns
    fn blocks_across(&self) -> u32;

    /// Number of block rows
    fn blocks_down(&self) -> u32;

    /// Rows actually stored in the block at `block_row`
    ///
    /// Tiles are always padded to full size; the last strip may be shorter.
    fn stored_rows(&self, block_row: u32) -> u32;

    /// Whether this is a tiled layout
    fn is_tiled(&self) -> bool;

    /// Blocks in one sample plane
    fn blocks_per_plane(&self) -> usize {
        self.blocks_across() as usize * self.blocks_down() as usize
    }

    /// Index into the offset/byte-count arrays for a block of the first plane
    fn block_index(&self, block_col: u32, block_row: u32) -> usize {
        block_row as usize * self.blocks_across() as usize + block_col as usize
    }

    /// (block_col, block_row) of the block containing a pixel
    fn block_of(&self, col: u32, row: u32) -> (u32, u32) {
        let (bw, bh) = self.block_size();
        (col / bw, row / bh)
    }
}

/// Factory choosing the layout for an IFD
pub struct LayoutFactory;

impl LayoutFactory {
    /// Create the layout described by an IFD
    ///
    /// # Arguments
    /// * `ifd` - The image's IFD
    /// * `block_count` - Number of entries in the offsets array
    ///
    /// # Returns
    /// A strip or tile layout, or an error when the offsets array is too short
    pub fn create_layout(ifd: &IFD, block_count: usize) -> TiffResult<Box<dyn BlockLayout>> {
        let (width, height) = ifd.get_dimensions().ok_or(TiffError::MissingDimensions)?;
        let (width, height) = (width as u32, height as u32);
        if width == 0 || height == 0 {
            return Err(TiffError::MissingDimensions);
        }

        let layout: Box<dyn BlockLayout> = if ifd.is_tiled() {
            let tile_width = ifd.get_tag_value_or(tags::TILE_WIDTH, 256) as u32;
            let tile_height = ifd.get_tag_value_or(tags::TILE_LENGTH, 256) as u32;
            Box::new(TileLayout::new(width, height, tile_width, tile_height)?)
        } else {
            let rows_per_strip = ifd.get_tag_value_or(tags::ROWS_PER_STRIP, height as u64)
                .min(height as u64) as u32;
            Box::new(StripLayout::new(width, height, rows_per_strip)?)
        };

        // Only the first plane is read, so that is all the offsets array must cover.
        if block_count < layout.blocks_per_plane() {
            return Err(TiffError::GenericError(format!(
                "Expected {} blocks, found {} offsets", layout.blocks_per_plane(), block_count
            )));
        }

        debug!("{} layout: {}x{} blocks of {:?}",
               if layout.is_tiled() { "Tile" } else { "Strip" },
               layout.blocks_across(), layout.blocks_down(), layout.block_size());
        Ok(layout)
    }
}
