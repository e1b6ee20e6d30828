//! TIFF writing
//!
//! Lays out a single-image little-endian TIFF or BigTIFF: header, IFD, tag
//! payloads too large to be stored inline, then the image blocks. All offsets
//! are known before the first byte is written, so output is sequential.

use log::{debug, info};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::tiff::constants::{field_types, header};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::utils::write_utils;

/// Value of one tag to be written
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Short(Vec<u16>),
    Long(Vec<u32>),
    Long8(Vec<u64>),
    Double(Vec<f64>),
    Ascii(String),
}

impl TagValue {
    /// TIFF field type of this value
    pub fn field_type(&self) -> u16 {
        match self {
            TagValue::Short(_) => field_types::SHORT,
            TagValue::Long(_) => field_types::LONG,
            TagValue::Long8(_) => field_types::LONG8,
            TagValue::Double(_) => field_types::DOUBLE,
            TagValue::Ascii(_) => field_types::ASCII,
        }
    }

    /// Number of values (ASCII counts the NUL terminator)
    pub fn count(&self) -> u64 {
        match self {
            TagValue::Short(v) => v.len() as u64,
            TagValue::Long(v) => v.len() as u64,
            TagValue::Long8(v) => v.len() as u64,
            TagValue::Double(v) => v.len() as u64,
            TagValue::Ascii(s) => s.len() as u64 + 1,
        }
    }

    /// Little-endian payload bytes
    pub fn encode(&self) -> Vec<u8> {
        match self {
            TagValue::Short(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
            TagValue::Long(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
            TagValue::Long8(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
            TagValue::Double(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
            TagValue::Ascii(s) => {
                let mut bytes = s.as_bytes().to_vec();
                bytes.push(0);
                bytes
            }
        }
    }

    /// An offsets/byte-counts array in the width the file format needs
    pub fn offsets(values: &[u64], is_big_tiff: bool) -> Self {
        if is_big_tiff {
            TagValue::Long8(values.to_vec())
        } else {
            TagValue::Long(values.iter().map(|&v| v as u32).collect())
        }
    }
}

/// Writes TIFF files from prepared tags and blocks
pub struct WriterBuilder;

impl WriterBuilder {
    /// Serialize a TIFF into any writer
    ///
    /// # Arguments
    /// * `writer` - Destination
    /// * `is_big_tiff` - Write BigTIFF (version 43) instead of classic TIFF
    /// * `tags` - Tags of the image, without the offsets and byte counts tags
    /// * `offsets_tag` - StripOffsets or TileOffsets
    /// * `counts_tag` - StripByteCounts or TileByteCounts
    /// * `blocks` - Encoded strips or tiles in file order
    pub fn write_to(
        writer: &mut impl Write,
        is_big_tiff: bool,
        tags: &BTreeMap<u16, TagValue>,
        offsets_tag: u16,
        counts_tag: u16,
        blocks: &[Vec<u8>],
    ) -> TiffResult<()> {
        if !is_big_tiff {
            let total: u64 = blocks.iter().map(|b| b.len() as u64).sum();
            if total > u32::MAX as u64 / 2 {
                return Err(TiffError::GenericError(
                    "Image data too large for classic TIFF, use BigTIFF".to_string()));
            }
        }

        let mut tags = tags.clone();
        let byte_counts: Vec<u64> = blocks.iter().map(|b| b.len() as u64).collect();
        tags.insert(counts_tag, TagValue::offsets(&byte_counts, is_big_tiff));
        tags.insert(offsets_tag, TagValue::offsets(&vec![0; blocks.len()], is_big_tiff));

        let header_size: u64 = if is_big_tiff { 16 } else { 8 };
        let inline_limit = if is_big_tiff { 8 } else { 4 };
        let ifd_size = Self::calculate_ifd_size(tags.len(), is_big_tiff);

        // External payload sizes do not depend on the offset values, so the
        // block offsets can be computed before filling them in.
        let data_start = write_utils::align_to_word(header_size + ifd_size);
        let mut offset = data_start;
        for value in tags.values() {
            let len = value.encode().len();
            if len > inline_limit {
                offset = write_utils::align_to_word(offset + len as u64);
            }
        }

        let mut block_offsets = Vec::with_capacity(blocks.len());
        for block in blocks {
            block_offsets.push(offset);
            offset = write_utils::align_to_word(offset + block.len() as u64);
        }
        tags.insert(offsets_tag, TagValue::offsets(&block_offsets, is_big_tiff));

        Self::write_header(writer, is_big_tiff, header_size)?;

        let mut external = Vec::new();
        let mut external_offset = data_start;
        let mut entries = Vec::with_capacity(tags.len());
        for (&tag, value) in &tags {
            let payload = value.encode();
            let mut field = vec![0u8; inline_limit];
            if payload.len() > inline_limit {
                Self::put_offset(&mut field, external_offset, is_big_tiff);
                external_offset = write_utils::align_to_word(external_offset + payload.len() as u64);
                external.push(payload);
            } else {
                field[..payload.len()].copy_from_slice(&payload);
            }
            entries.push((tag, value.field_type(), value.count(), field));
        }

        match is_big_tiff {
            true => writer.write_all(&(entries.len() as u64).to_le_bytes())?,
            false => writer.write_all(&(entries.len() as u16).to_le_bytes())?,
        }
        for (tag, field_type, count, field) in &entries {
            writer.write_all(&tag.to_le_bytes())?;
            writer.write_all(&field_type.to_le_bytes())?;
            match is_big_tiff {
                true => writer.write_all(&count.to_le_bytes())?,
                false => writer.write_all(&(*count as u32).to_le_bytes())?,
            }
            writer.write_all(field)?;
        }
        // Single image: no next IFD
        writer.write_all(&vec![0u8; if is_big_tiff { 8 } else { 4 }])?;
        write_utils::write_padding(writer, (header_size + ifd_size) as usize)?;

        for payload in &external {
            writer.write_all(payload)?;
            write_utils::write_padding(writer, payload.len())?;
        }
        for block in blocks {
            writer.write_all(block)?;
            write_utils::write_padding(writer, block.len())?;
        }

        debug!("Wrote {} tags, {} external payloads, {} blocks", entries.len(), external.len(), blocks.len());
        Ok(())
    }

    /// Write a TIFF file to disk
    pub fn write(
        output_path: &Path,
        is_big_tiff: bool,
        tags: &BTreeMap<u16, TagValue>,
        offsets_tag: u16,
        counts_tag: u16,
        blocks: &[Vec<u8>],
    ) -> TiffResult<()> {
        info!("Writing TIFF to {}", output_path.display());

        let file = File::create(output_path)?;
        let mut writer = BufWriter::with_capacity(1024 * 1024, file);
        Self::write_to(&mut writer, is_big_tiff, tags, offsets_tag, counts_tag, blocks)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the header with the first IFD right behind it
    fn write_header(writer: &mut impl Write, is_big_tiff: bool, header_size: u64) -> TiffResult<()> {
        writer.write_all(&header::LITTLE_ENDIAN_MARKER)?;

        if is_big_tiff {
            writer.write_all(&header::BIG_TIFF_VERSION.to_le_bytes())?;
            writer.write_all(&header::BIGTIFF_OFFSET_SIZE.to_le_bytes())?;
            writer.write_all(&[0u8, 0])?;
            writer.write_all(&header_size.to_le_bytes())?;
        } else {
            writer.write_all(&header::TIFF_VERSION.to_le_bytes())?;
            writer.write_all(&(header_size as u32).to_le_bytes())?;
        }

        Ok(())
    }

    fn calculate_ifd_size(entry_count: usize, is_big_tiff: bool) -> u64 {
        let entries = entry_count as u64;
        match is_big_tiff {
            true => 8 + 20 * entries + 8,
            false => 2 + 12 * entries + 4,
        }
    }

    fn put_offset(field: &mut [u8], offset: u64, is_big_tiff: bool) {
        match is_big_tiff {
            true => field.copy_from_slice(&offset.to_le_bytes()),
            false => field.copy_from_slice(&(offset as u32).to_le_bytes()),
        }
    }
}
