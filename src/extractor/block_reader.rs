//! Block-level pixel access
//!
//! A `BlockReader` owns the open file of one image and decodes its strips or
//! tiles on demand. Decoded blocks hold the first sample of every pixel as
//! `f64` and are kept in a small LRU cache, so neighbouring point samples and
//! window reads touch the file only once per block.

use log::{debug, trace, warn};
use lru::LruCache;
use ndarray::Array2;
use std::io::SeekFrom;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use crate::compression::CompressionFactory;
use crate::io::byte_order::ByteOrder;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{planar_config, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::validation;
use crate::tiff::TiffReader;

use super::layout_strategy::{BlockLayout, LayoutFactory};
use super::predictor::undo_predictor;
use super::region::Region;
use super::sample_type::SampleType;

/// Number of decoded blocks kept per image
const BLOCK_CACHE_SIZE: usize = 64;

/// Decodes band 1 of a strip or tile organised image
pub struct BlockReader {
    /// File handle, shared by all decodes
    source: Mutex<Box<dyn SeekableReader>>,
    /// Strip or tile geometry
    layout: Box<dyn BlockLayout>,
    offsets: Vec<u64>,
    byte_counts: Vec<u64>,
    /// Compression tag value, resolved to a codec when a block is decoded
    compression: u64,
    predictor: u16,
    sample_type: SampleType,
    /// Samples interleaved per pixel (1 for planar images)
    interleaved_samples: usize,
    byte_order: ByteOrder,
    /// Value for sparse blocks and pixels outside the image
    fill: f64,
    width: u32,
    height: u32,
    /// Length of the file, bounding every block read
    file_size: u64,
    cache: Mutex<LruCache<usize, Arc<Vec<f64>>>>,
}

impl BlockReader {
    /// Prepare block access for an image
    ///
    /// # Arguments
    /// * `tiff_reader` - Reader that parsed the file, used for tag values
    /// * `source` - Open file positioned anywhere
    /// * `ifd` - The image's IFD
    /// * `fill` - Value used for sparse blocks and out-of-image pixels
    ///
    /// # Returns
    /// A reader ready to decode blocks, or an error if the image layout or
    /// sample format is not supported
    pub fn open(tiff_reader: &TiffReader, mut source: Box<dyn SeekableReader>, ifd: &IFD, fill: f64) -> TiffResult<Self> {
        let (offset_tag, count_tag) = if ifd.is_tiled() {
            (tags::TILE_OFFSETS, tags::TILE_BYTE_COUNTS)
        } else {
            (tags::STRIP_OFFSETS, tags::STRIP_BYTE_COUNTS)
        };

        let offsets = tiff_reader.read_tag_values(source.as_mut(), ifd, offset_tag)?;
        let byte_counts = tiff_reader.read_tag_values(source.as_mut(), ifd, count_tag)?;
        if byte_counts.len() < offsets.len() {
            return Err(TiffError::GenericError(format!(
                "{} offsets but only {} byte counts", offsets.len(), byte_counts.len()
            )));
        }

        let layout = LayoutFactory::create_layout(ifd, offsets.len())?;
        let sample_type = SampleType::from_tags(ifd.get_sample_format(), ifd.get_bits_per_sample())?;
        let (width, height) = ifd.get_dimensions().ok_or(TiffError::MissingDimensions)?;

        let interleaved_samples = if ifd.get_planar_configuration() == planar_config::PLANAR {
            1
        } else {
            ifd.get_samples_per_pixel().max(1) as usize
        };

        let file_size = validation::get_file_size(source.as_mut())?;

        debug!("Block reader: {}x{} {}, compression {}, predictor {}, {} blocks",
               width, height, sample_type.name(), ifd.get_compression(), ifd.get_predictor(), offsets.len());

        Ok(BlockReader {
            source: Mutex::new(source),
            layout,
            offsets,
            byte_counts,
            compression: ifd.get_compression(),
            predictor: ifd.get_predictor(),
            sample_type,
            interleaved_samples,
            byte_order: tiff_reader.byte_order()?,
            fill,
            width: width as u32,
            height: height as u32,
            file_size,
            cache: Mutex::new(LruCache::new(NonZeroUsize::new(BLOCK_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN))),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    pub fn layout(&self) -> &dyn BlockLayout {
        self.layout.as_ref()
    }

    pub fn fill(&self) -> f64 {
        self.fill
    }

    /// Get a decoded block, from the cache when possible
    ///
    /// # Arguments
    /// * `index` - Block index within the first sample plane
    ///
    /// # Returns
    /// Band 1 values of the block, row-major, `block width × stored rows`
    pub fn block(&self, index: usize) -> TiffResult<Arc<Vec<f64>>> {
        {
            let mut cache = self.cache.lock()
                .map_err(|_| TiffError::GenericError("Block cache lock poisoned".to_string()))?;
            if let Some(block) = cache.get(&index) {
                trace!("Block {} served from cache", index);
                return Ok(Arc::clone(block));
            }
        }

        let block = Arc::new(self.decode_block(index)?);

        let mut cache = self.cache.lock()
            .map_err(|_| TiffError::GenericError("Block cache lock poisoned".to_string()))?;
        cache.put(index, Arc::clone(&block));
        Ok(block)
    }

    /// Read and decode one block from the file
    fn decode_block(&self, index: usize) -> TiffResult<Vec<f64>> {
        let (block_width, _) = self.layout.block_size();
        let block_row = (index / self.layout.blocks_across() as usize) as u32;
        let pixel_count = block_width as usize * self.layout.stored_rows(block_row) as usize;

        let offset = *self.offsets.get(index).ok_or_else(|| TiffError::CorruptBlock {
            index,
            reason: "block index out of range".to_string(),
        })?;
        let byte_count = self.byte_counts[index];

        if byte_count == 0 {
            trace!("Block {} is sparse, filling with {}", index, self.fill);
            return Ok(vec![self.fill; pixel_count]);
        }

        if offset.checked_add(byte_count).map_or(true, |end| end > self.file_size) {
            return Err(TiffError::CorruptBlock {
                index,
                reason: format!("{} bytes at offset {} run past the end of the file ({} bytes)",
                                byte_count, offset, self.file_size),
            });
        }

        let mut raw = vec![0u8; byte_count as usize];
        {
            let mut source = self.source.lock()
                .map_err(|_| TiffError::GenericError("File lock poisoned".to_string()))?;
            source.seek(SeekFrom::Start(offset))?;
            source.read_exact(&mut raw).map_err(|e| TiffError::CorruptBlock {
                index,
                reason: format!("reading {} bytes at offset {}: {}", byte_count, offset, e),
            })?;
        }

        let handler = CompressionFactory::create_handler(self.compression)?;
        let mut data = handler.decompress(&raw).map_err(|e| TiffError::CorruptBlock {
            index,
            reason: e.to_string(),
        })?;

        let bytes_per_pixel = self.interleaved_samples * self.sample_type.bytes();
        let expected = pixel_count * bytes_per_pixel;
        let available = data.len().min(expected);
        if data.len() < expected {
            warn!("Block {} decompressed to {} bytes, expected {}; padding with fill value",
                  index, data.len(), expected);
            data.resize(expected, 0);
        }

        let order = undo_predictor(&mut data, self.predictor, self.sample_type, self.byte_order,
                                   block_width as usize, self.interleaved_samples)?;

        let values = (0..pixel_count)
            .map(|p| {
                let start = p * bytes_per_pixel;
                if start + self.sample_type.bytes() > available {
                    self.fill
                } else {
                    self.sample_type.read(&data[start..], order)
                }
            })
            .collect();

        trace!("Decoded block {} ({} bytes -> {} pixels)", index, byte_count, pixel_count);
        Ok(values)
    }

    /// Value of one pixel, or the fill value outside the image
    pub fn pixel(&self, row: u32, col: u32) -> TiffResult<f64> {
        if row >= self.height || col >= self.width {
            return Ok(self.fill);
        }

        let (block_col, block_row) = self.layout.block_of(col, row);
        let block = self.block(self.layout.block_index(block_col, block_row))?;
        let (block_width, block_height) = self.layout.block_size();
        let local = (row - block_row * block_height) as usize * block_width as usize
            + (col - block_col * block_width) as usize;

        Ok(block.get(local).copied().unwrap_or(self.fill))
    }

    /// Read a pixel region into a row-major array
    ///
    /// # Arguments
    /// * `region` - Region to read, must lie inside the image
    ///
    /// # Returns
    /// A `height × width` array of band 1 values
    pub fn read_region(&self, region: &Region) -> TiffResult<Array2<f64>> {
        if !region.fits_within(self.width, self.height) {
            return Err(TiffError::GenericError(format!(
                "Region {:?} exceeds image bounds {}x{}", region, self.width, self.height
            )));
        }

        let mut out = Array2::from_elem((region.height as usize, region.width as usize), self.fill);
        if region.is_empty() {
            return Ok(out);
        }

        let (block_width, block_height) = self.layout.block_size();
        let first_col = region.x / block_width;
        let last_col = (region.end_x() - 1) / block_width;
        let first_row = region.y / block_height;
        let last_row = (region.end_y() - 1) / block_height;

        for block_row in first_row..=last_row {
            for block_col in first_col..=last_col {
                let block = self.block(self.layout.block_index(block_col, block_row))?;

                let block_x = block_col * block_width;
                let block_y = block_row * block_height;
                let x0 = region.x.max(block_x);
                let x1 = region.end_x().min(block_x + block_width);
                let y0 = region.y.max(block_y);
                let y1 = region.end_y().min(block_y + block_height);

                for y in y0..y1 {
                    for x in x0..x1 {
                        let local = (y - block_y) as usize * block_width as usize + (x - block_x) as usize;
                        if let Some(value) = block.get(local) {
                            out[[(y - region.y) as usize, (x - region.x) as usize]] = *value;
                        }
                    }
                }
            }
        }

        debug!("Read region {}x{} at ({}, {}) from {} block(s)",
               region.width, region.height, region.x, region.y,
               (last_row - first_row + 1) * (last_col - first_col + 1));
        Ok(out)
    }
}
