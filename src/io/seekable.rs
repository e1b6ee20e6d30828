//! Seekable reader abstraction
//!
//! Raster files are read through `SeekableReader` so that the same parsing code
//! works on files, buffered files and in-memory cursors.

use std::io::{Read, Seek};

/// Anything that can be read from and repositioned
pub trait SeekableReader: Read + Seek + Send + Sync {}

impl<T: Read + Seek + Send + Sync> SeekableReader for T {}
