//! Strip block layout

use crate::tiff::errors::{TiffError, TiffResult};

use super::layout_strategy::BlockLayout;

/// Full-width strips of `rows_per_strip` rows
#[derive(Debug, Clone)]
pub struct StripLayout {
    width: u32,
    height: u32,
    rows_per_strip: u32,
}

impl StripLayout {
    pub fn new(width: u32, height: u32, rows_per_strip: u32) -> TiffResult<Self> {
        if rows_per_strip == 0 {
            return Err(TiffError::GenericError("RowsPerStrip must be positive".to_string()));
        }
        Ok(StripLayout { width, height, rows_per_strip })
    }
}

impl BlockLayout for StripLayout {
    fn block_size(&self) -> (u32, u32) {
        (self.width, self.rows_per_strip)
    }

    fn blocks_across(&self) -> u32 {
        1
    }

    fn blocks_down(&self) -> u32 {
        self.height.div_ceil(self.rows_per_strip)
    }

    fn stored_rows(&self, block_row: u32) -> u32 {
        let start = block_row * self.rows_per_strip;
        self.rows_per_strip.min(self.height.saturating_sub(start))
    }

    fn is_tiled(&self) -> bool {
        false
    }
}
