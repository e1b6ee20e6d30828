//! TIFF file reader implementation
//!
//! Parses the header and the IFD chain of TIFF and BigTIFF files. Byte order
//! is detected once and reads go through the matching `ByteOrderHandler`.

use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufReader, SeekFrom};
use std::path::Path;

use crate::io::seekable::SeekableReader;
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::tiff::constants::field_types;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::types::TIFF;
use crate::tiff::validation;
use crate::utils::format_utils;
use crate::utils::ifd_utils;
use crate::utils::tag_utils;

/// Upper bound on the length of an IFD chain
const MAX_IFDS: usize = 100;

/// Reader for TIFF and BigTIFF files
pub struct TiffReader {
    /// Current byte order handler
    pub(crate) byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Whether currently reading BigTIFF format
    pub(crate) is_big_tiff: bool,
    /// Size of the stream being read, used to reject out-of-range offsets
    file_size: u64,
}

impl Default for TiffReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TiffReader {
    /// Creates a new TIFF reader
    pub fn new() -> Self {
        TiffReader {
            byte_order_handler: None,
            is_big_tiff: false,
            file_size: u64::MAX,
        }
    }

    fn handler(&self) -> TiffResult<&dyn ByteOrderHandler> {
        self.byte_order_handler.as_deref()
            .ok_or_else(|| TiffError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Byte order of the file read last
    pub fn byte_order(&self) -> TiffResult<ByteOrder> {
        Ok(self.handler()?.byte_order())
    }

    /// Loads a TIFF file from the given path
    ///
    /// # Arguments
    /// * `path` - Path to the TIFF file to load
    ///
    /// # Returns
    /// A TIFF structure containing the file's IFDs
    pub fn load(&mut self, path: &Path) -> TiffResult<TIFF> {
        info!("Loading TIFF file: {}", path.display());

        let file = File::open(path)?;
        let mut reader = BufReader::with_capacity(64 * 1024, file);

        self.read(&mut reader)
    }

    /// Reads a TIFF file from the given reader
    ///
    /// Detects the byte order, checks for TIFF or BigTIFF and reads the IFD chain.
    ///
    /// # Arguments
    /// * `reader` - Any struct implementing the SeekableReader trait
    ///
    /// # Returns
    /// A TIFF structure containing the file's IFDs
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> TiffResult<TIFF> {
        reader.seek(SeekFrom::Start(0))?;

        let handler = format_utils::detect_byte_order(reader)?;
        let (is_big_tiff, _) = format_utils::detect_tiff_format(reader, handler.as_ref())?;
        self.is_big_tiff = is_big_tiff;

        let first_ifd_offset = ifd_utils::read_first_ifd_offset(reader, is_big_tiff, handler.as_ref())?;
        self.byte_order_handler = Some(handler);
        debug!("First IFD offset: {}", first_ifd_offset);

        self.file_size = validation::get_file_size(reader)?;
        validation::validate_ifd_offset(first_ifd_offset, self.file_size)?;

        let mut tiff = TIFF::new(self.is_big_tiff, self.byte_order()?);
        tiff.ifds = self.read_ifd_chain(reader, first_ifd_offset)?;

        if tiff.ifds.is_empty() {
            return Err(TiffError::InvalidHeader);
        }

        debug!("Read {} IFDs", tiff.ifds.len());
        Ok(tiff)
    }

    /// Reads a chain of IFDs starting from the given offset
    ///
    /// A broken link after the first IFD ends the chain with a warning
    /// instead of failing the whole file.
    fn read_ifd_chain(&self, reader: &mut dyn SeekableReader, first_ifd_offset: u64) -> TiffResult<Vec<IFD>> {
        let mut ifds = Vec::new();
        let mut ifd_offset = first_ifd_offset;
        let handler = self.handler()?;

        while ifd_offset != 0 && ifds.len() < MAX_IFDS {
            if ifd_offset >= self.file_size {
                warn!("IFD offset {} exceeds file size {}, stopping IFD chain", ifd_offset, self.file_size);
                break;
            }

            let ifd = match self.read_ifd(reader, ifd_offset, ifds.len()) {
                Ok(ifd) => ifd,
                Err(e) if !ifds.is_empty() => {
                    warn!("Error reading IFD {}: {}", ifds.len(), e);
                    break;
                }
                Err(e) => return Err(e),
            };

            let next_offset_position = ifd_offset + ifd_utils::calculate_ifd_size(&ifd, self.is_big_tiff)
                - if self.is_big_tiff { 8 } else { 4 };
            reader.seek(SeekFrom::Start(next_offset_position))?;

            let next_ifd_offset = match ifd_utils::read_next_ifd_offset(reader, self.is_big_tiff, handler) {
                Ok(offset) => offset,
                Err(e) => {
                    warn!("Error reading next IFD offset: {}", e);
                    0
                }
            };

            ifds.push(ifd);

            if next_ifd_offset != 0 && (next_ifd_offset >= self.file_size || next_ifd_offset < 8) {
                warn!("Invalid next IFD offset: {}, stopping IFD chain", next_ifd_offset);
                break;
            }
            ifd_offset = next_ifd_offset;
        }

        Ok(ifds)
    }

    /// Reads an IFD from the reader
    ///
    /// # Arguments
    /// * `reader` - The seekable reader to use
    /// * `offset` - Offset in the file where the IFD starts
    /// * `number` - The index of this IFD in the file
    ///
    /// # Returns
    /// The parsed IFD structure
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> TiffResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;

        let entry_count = self.read_ifd_entry_count(reader)?;
        debug!("IFD #{} entry count: {}", number, entry_count);

        let mut ifd = IFD::new(number, offset);
        for _ in 0..entry_count {
            ifd.add_entry(self.read_ifd_entry(reader)?);
        }

        Ok(ifd)
    }

    fn read_ifd_entry_count(&self, reader: &mut dyn SeekableReader) -> TiffResult<u64> {
        let handler = self.handler()?;
        if self.is_big_tiff {
            Ok(handler.read_u64(reader)?)
        } else {
            Ok(handler.read_u16(reader)? as u64)
        }
    }

    /// Reads a single IFD entry, keeping the raw value field
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> TiffResult<IFDEntry> {
        let handler = self.handler()?;
        let byte_order = handler.byte_order();

        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let field_len = if self.is_big_tiff { 8 } else { 4 };
        let mut inline_bytes = [0u8; 8];
        reader.read_exact(&mut inline_bytes[..field_len])?;

        let mut entry = IFDEntry::with_inline_bytes(tag, field_type, count, 0, inline_bytes);
        entry.value_offset = if entry.is_value_inline(self.is_big_tiff) && count > 0 {
            Self::first_inline_value(&entry, byte_order)
        } else {
            byte_order.read_uint(&inline_bytes, field_len)
        };

        Ok(entry)
    }

    /// First value of an inline payload, as an unsigned integer
    fn first_inline_value(entry: &IFDEntry, byte_order: ByteOrder) -> u64 {
        match entry.field_type {
            field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED | field_types::ASCII => {
                entry.inline_bytes[0] as u64
            }
            field_types::SHORT | field_types::SSHORT => byte_order.read_uint(&entry.inline_bytes, 2),
            field_types::LONG | field_types::SLONG | field_types::FLOAT => byte_order.read_uint(&entry.inline_bytes, 4),
            _ => byte_order.read_uint(&entry.inline_bytes, 8),
        }
    }

    /// Reads the raw payload bytes of an entry
    ///
    /// Inline payloads come from the entry itself, others are read from the file.
    pub fn read_entry_bytes(&self, reader: &mut dyn SeekableReader, entry: &IFDEntry) -> TiffResult<Vec<u8>> {
        let size = entry.payload_size();

        if entry.is_value_inline(self.is_big_tiff) {
            return Ok(entry.inline_bytes[..size].to_vec());
        }

        if entry.value_offset.saturating_add(size as u64) > self.file_size {
            return Err(TiffError::GenericError(format!(
                "Tag {} ({}) points past the end of the file",
                entry.tag, tag_utils::get_tag_name(entry.tag)
            )));
        }

        reader.seek(SeekFrom::Start(entry.value_offset))?;
        let mut buffer = vec![0u8; size];
        reader.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Reads a tag's values as a vector of u64
    ///
    /// # Arguments
    /// * `reader` - The seekable reader to use
    /// * `ifd` - The IFD containing the tag
    /// * `tag` - The tag number to read
    ///
    /// # Returns
    /// A vector of u64 values
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<u64>> {
        let entry = ifd.get_entry(tag).ok_or(TiffError::TagNotFound(tag))?;
        let bytes = self.read_entry_bytes(reader, entry)?;
        tag_utils::decode_integers(&bytes, entry, self.byte_order()?)
    }

    /// Reads a tag's values as floating point numbers
    pub fn read_tag_f64s(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<f64>> {
        let entry = ifd.get_entry(tag).ok_or(TiffError::TagNotFound(tag))?;
        let bytes = self.read_entry_bytes(reader, entry)?;
        tag_utils::decode_floats(&bytes, entry, self.byte_order()?)
    }

    /// Reads an ASCII tag, with trailing NULs removed
    pub fn read_tag_ascii(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<String> {
        let entry = ifd.get_entry(tag).ok_or(TiffError::TagNotFound(tag))?;
        let bytes = self.read_entry_bytes(reader, entry)?;
        tag_utils::decode_ascii(&bytes)
    }

    /// Returns whether the current file is a BigTIFF
    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }
}
