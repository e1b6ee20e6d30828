//! Image File Directory (IFD) structures and methods
//!
//! An IFD is the list of tag entries describing one image in a TIFF file.
//! Rasters read here only ever use the first IFD; later IFDs (overviews,
//! masks) are parsed so the chain can be walked and reported.

use std::collections::HashMap;
use std::fmt;
use log::{debug, trace};

use crate::tiff::constants::{tags, planar_config, sample_format};
use crate::utils::tag_utils;

/// Represents an Image File Directory (IFD) in a TIFF file
#[derive(Debug, Clone)]
pub struct IFD {
    /// Entries in this IFD, in file order
    pub entries: Vec<IFDEntry>,
    /// IFD number (0-based)
    pub number: usize,
    /// Offset to this IFD in the file
    pub offset: u64,
    /// Tag lookup table
    tag_map: HashMap<u16, IFDEntry>,
}

/// Represents an entry in an Image File Directory (IFD)
///
/// Entries whose payload fits in the value field (4 bytes for classic TIFF,
/// 8 for BigTIFF) keep the raw payload in `inline_bytes`; `value_offset` then
/// holds the first decoded value rather than the raw field.
#[derive(Debug, Clone)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// First value for inline entries, otherwise the offset to the values
    pub value_offset: u64,
    /// Raw bytes of the value field, zero padded
    pub inline_bytes: [u8; 8],
}

impl IFDEntry {
    /// Creates a new IFD entry
    pub fn new(tag: u16, field_type: u16, count: u64, value_offset: u64) -> Self {
        Self::with_inline_bytes(tag, field_type, count, value_offset, [0u8; 8])
    }

    /// Creates an entry that also carries the raw bytes of its value field
    pub fn with_inline_bytes(tag: u16, field_type: u16, count: u64, value_offset: u64, inline_bytes: [u8; 8]) -> Self {
        trace!("IFD entry: tag={} ({}), type={} ({}), count={}, value/offset={}",
               tag, tag_utils::get_tag_name(tag), field_type,
               tag_utils::get_field_type_name(field_type), count, value_offset);

        Self {
            tag,
            field_type,
            count,
            value_offset,
            inline_bytes,
        }
    }

    /// Size in bytes of one value of this entry's field type
    pub fn get_field_type_size(&self) -> usize {
        tag_utils::field_type_size(self.field_type)
    }

    /// Total payload size in bytes
    pub fn payload_size(&self) -> usize {
        self.get_field_type_size() * self.count as usize
    }

    /// Determines if the value is stored inline in the entry rather than at an offset
    pub fn is_value_inline(&self, is_big_tiff: bool) -> bool {
        let inline_size = if is_big_tiff { 8 } else { 4 };
        self.payload_size() <= inline_size
    }

    /// Returns a human-readable description of this entry
    pub fn description(&self) -> String {
        let tag_name = tag_utils::get_tag_name(self.tag);
        let field_type_name = tag_utils::get_field_type_name(self.field_type);

        let value_display = match self.tag {
            tags::COMPRESSION => format!("{} ({})",
                                         self.value_offset,
                                         tag_utils::get_compression_name(self.value_offset)),
            tags::PHOTOMETRIC_INTERPRETATION => format!("{} ({})",
                                                        self.value_offset,
                                                        tag_utils::get_photometric_name(self.value_offset)),
            _ => self.value_offset.to_string()
        };

        format!("Tag: {} ({}), Type: {} ({}), Count: {}, Value/Offset: {}",
                self.tag, tag_name, self.field_type, field_type_name, self.count, value_display)
    }
}

impl IFD {
    /// Creates a new, empty IFD
    pub fn new(number: usize, offset: u64) -> Self {
        debug!("Creating IFD #{} at offset {}", number, offset);

        Self {
            entries: Vec::new(),
            number,
            offset,
            tag_map: HashMap::new(),
        }
    }

    /// Adds an entry to this IFD
    pub fn add_entry(&mut self, entry: IFDEntry) {
        trace!("Adding entry to IFD #{}: {}", self.number, entry.description());

        self.tag_map.insert(entry.tag, entry.clone());
        self.entries.push(entry);
    }

    /// Gets the value/offset field of a tag
    pub fn get_tag_value(&self, tag: u16) -> Option<u64> {
        self.tag_map.get(&tag).map(|entry| entry.value_offset)
    }

    /// Gets a single-valued tag or a default when absent
    pub fn get_tag_value_or(&self, tag: u16, default: u64) -> u64 {
        self.get_tag_value(tag).unwrap_or(default)
    }

    /// Checks if this IFD has a specific tag
    pub fn has_tag(&self, tag: u16) -> bool {
        self.tag_map.contains_key(&tag)
    }

    /// Gets an IFD entry by tag
    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.tag_map.get(&tag)
    }

    /// Gets the width and height of the image described by this IFD
    pub fn get_dimensions(&self) -> Option<(u64, u64)> {
        let width = self.get_tag_value(tags::IMAGE_WIDTH)?;
        let height = self.get_tag_value(tags::IMAGE_LENGTH)?;
        Some((width, height))
    }

    /// Number of samples per pixel (1 when not specified)
    pub fn get_samples_per_pixel(&self) -> u64 {
        self.get_tag_value_or(tags::SAMPLES_PER_PIXEL, 1)
    }

    /// Bits per sample of the first sample (1 when not specified)
    pub fn get_bits_per_sample(&self) -> u16 {
        self.get_tag_value_or(tags::BITS_PER_SAMPLE, 1) as u16
    }

    /// Sample format of the first sample (unsigned when not specified)
    pub fn get_sample_format(&self) -> u16 {
        self.get_tag_value_or(tags::SAMPLE_FORMAT, sample_format::UNSIGNED as u64) as u16
    }

    /// Compression code (1 = none when not specified)
    pub fn get_compression(&self) -> u64 {
        self.get_tag_value_or(tags::COMPRESSION, 1)
    }

    /// Predictor code (1 = none when not specified)
    pub fn get_predictor(&self) -> u16 {
        self.get_tag_value_or(tags::PREDICTOR, 1) as u16
    }

    /// Planar configuration (chunky when not specified)
    pub fn get_planar_configuration(&self) -> u16 {
        self.get_tag_value_or(tags::PLANAR_CONFIGURATION, planar_config::CHUNKY as u64) as u16
    }

    /// Whether the image data is organised in tiles rather than strips
    pub fn is_tiled(&self) -> bool {
        self.has_tag(tags::TILE_WIDTH) && self.has_tag(tags::TILE_OFFSETS)
    }
}

impl fmt::Display for IFD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IFD #{} (offset: {})", self.number, self.offset)?;
        writeln!(f, "  Number of entries: {}", self.entries.len())?;

        if let Some((width, height)) = self.get_dimensions() {
            writeln!(f, "  Dimensions: {}x{}", width, height)?;
        }

        writeln!(f, "  Samples per pixel: {}", self.get_samples_per_pixel())?;
        writeln!(f, "  Tags:")?;
        for entry in &self.entries {
            writeln!(f, "    {}", entry.description())?;
        }

        Ok(())
    }
}
