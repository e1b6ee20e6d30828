//! Image structure tags and block encoding
//!
//! Describes a single-band image (size, sample format, compression, block
//! layout) and cuts its pixels into encoded strips or tiles.

use log::debug;
use ndarray::Array2;
use std::collections::BTreeMap;

use crate::compression::CompressionHandler;
use crate::extractor::{apply_predictor, SampleType};
use crate::tiff::constants::{photometric, planar_config, predictor, tags};
use crate::tiff::errors::TiffResult;

use super::writer::TagValue;

/// How pixel data is cut into blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockShape {
    /// Full-width strips of the given number of rows
    Strips { rows_per_strip: u32 },
    /// Tiles of the given size (multiples of 16)
    Tiles { width: u32, height: u32 },
}

impl BlockShape {
    /// Block size for an image, clamping strips to the image height
    pub fn block_size(&self, width: u32, height: u32) -> (u32, u32) {
        match *self {
            BlockShape::Strips { rows_per_strip } => (width, rows_per_strip.clamp(1, height.max(1))),
            BlockShape::Tiles { width: tw, height: th } => (tw, th),
        }
    }

    /// The (offsets, byte counts) tags for this layout
    pub fn offset_tags(&self) -> (u16, u16) {
        match self {
            BlockShape::Strips { .. } => (tags::STRIP_OFFSETS, tags::STRIP_BYTE_COUNTS),
            BlockShape::Tiles { .. } => (tags::TILE_OFFSETS, tags::TILE_BYTE_COUNTS),
        }
    }
}

/// Builds the baseline tags of an image
pub struct BasicTagsBuilder;

impl BasicTagsBuilder {
    /// Add the tags describing a single-band image
    pub fn add_image_structure(
        tag_map: &mut BTreeMap<u16, TagValue>,
        width: u32,
        height: u32,
        sample_type: SampleType,
        compression_code: u64,
        predictor_code: u16,
        shape: BlockShape,
    ) {
        let (format, bits) = sample_type.tag_values();
        tag_map.insert(tags::IMAGE_WIDTH, TagValue::Long(vec![width]));
        tag_map.insert(tags::IMAGE_LENGTH, TagValue::Long(vec![height]));
        tag_map.insert(tags::BITS_PER_SAMPLE, TagValue::Short(vec![bits]));
        tag_map.insert(tags::COMPRESSION, TagValue::Short(vec![compression_code as u16]));
        tag_map.insert(tags::PHOTOMETRIC_INTERPRETATION, TagValue::Short(vec![photometric::BLACK_IS_ZERO]));
        tag_map.insert(tags::SAMPLES_PER_PIXEL, TagValue::Short(vec![1]));
        tag_map.insert(tags::PLANAR_CONFIGURATION, TagValue::Short(vec![planar_config::CHUNKY]));
        tag_map.insert(tags::SAMPLE_FORMAT, TagValue::Short(vec![format]));
        if predictor_code != predictor::NONE {
            tag_map.insert(tags::PREDICTOR, TagValue::Short(vec![predictor_code]));
        }

        let (block_width, block_height) = shape.block_size(width, height);
        match shape {
            BlockShape::Strips { .. } => {
                tag_map.insert(tags::ROWS_PER_STRIP, TagValue::Long(vec![block_height]));
            }
            BlockShape::Tiles { .. } => {
                tag_map.insert(tags::TILE_WIDTH, TagValue::Long(vec![block_width]));
                tag_map.insert(tags::TILE_LENGTH, TagValue::Long(vec![block_height]));
            }
        }
    }

    /// Encode pixels into compressed blocks
    ///
    /// # Arguments
    /// * `data` - Pixel values, rows × columns
    /// * `sample_type` - Stored sample type
    /// * `shape` - Strip or tile layout
    /// * `predictor_code` - Predictor applied before compression
    /// * `handler` - Compression codec
    /// * `fill` - Value for tile padding beyond the image edge
    ///
    /// # Returns
    /// Encoded blocks in row-major block order
    pub fn encode_blocks(
        data: &Array2<f64>,
        sample_type: SampleType,
        shape: BlockShape,
        predictor_code: u16,
        handler: &dyn CompressionHandler,
        fill: f64,
    ) -> TiffResult<Vec<Vec<u8>>> {
        let (height, width) = (data.nrows() as u32, data.ncols() as u32);
        let (block_width, block_height) = shape.block_size(width, height);
        let blocks_across = width.div_ceil(block_width);
        let blocks_down = height.div_ceil(block_height);
        let padded = matches!(shape, BlockShape::Tiles { .. });

        let mut blocks = Vec::with_capacity((blocks_across * blocks_down) as usize);
        for block_row in 0..blocks_down {
            for block_col in 0..blocks_across {
                let y0 = block_row * block_height;
                let rows = if padded { block_height } else { block_height.min(height - y0) };

                let mut raw = Vec::with_capacity((block_width * rows) as usize * sample_type.bytes());
                for y in y0..y0 + rows {
                    for x in block_col * block_width..(block_col + 1) * block_width {
                        let value = data.get((y as usize, x as usize)).copied().unwrap_or(fill);
                        sample_type.write_le(value, &mut raw);
                    }
                }

                apply_predictor(&mut raw, predictor_code, sample_type, block_width as usize, 1)?;
                blocks.push(handler.compress(&raw)?);
            }
        }

        debug!("Encoded {} {} block(s) of {}x{} with {}",
               blocks.len(), if padded { "tile" } else { "strip" }, block_width, block_height, handler.name());
        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::UncompressedHandler;

    #[test]
    fn test_strip_blocks() {
        let data = Array2::from_shape_fn((5, 3), |(r, c)| (r * 3 + c) as f64);
        let shape = BlockShape::Strips { rows_per_strip: 2 };
        let blocks = BasicTagsBuilder::encode_blocks(&data, SampleType::U8, shape, 1, &UncompressedHandler, 0.0).unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(blocks[2], vec![12, 13, 14]);
    }

    #[test]
    fn test_tiles_are_padded() {
        let data = Array2::from_elem((3, 3), 1.0);
        let shape = BlockShape::Tiles { width: 16, height: 16 };
        let blocks = BasicTagsBuilder::encode_blocks(&data, SampleType::U8, shape, 1, &UncompressedHandler, 9.0).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].len(), 256);
        assert_eq!(blocks[0][3], 9);
        assert_eq!(blocks[0][16], 1);
    }

    #[test]
    fn test_structure_tags() {
        let mut map = BTreeMap::new();
        BasicTagsBuilder::add_image_structure(&mut map, 10, 4, SampleType::F32, 8, 3,
                                              BlockShape::Strips { rows_per_strip: 100 });
        assert_eq!(map.get(&tags::ROWS_PER_STRIP), Some(&TagValue::Long(vec![4])));
        assert_eq!(map.get(&tags::SAMPLE_FORMAT), Some(&TagValue::Short(vec![3])));
        assert_eq!(map.get(&tags::PREDICTOR), Some(&TagValue::Short(vec![3])));
        assert!(!map.contains_key(&tags::TILE_WIDTH));
    }
}
