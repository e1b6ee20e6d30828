//! I/O primitives shared by the TIFF layer
//!
//! Byte order strategies and the seekable reader abstraction.

pub mod seekable;
pub mod byte_order;
