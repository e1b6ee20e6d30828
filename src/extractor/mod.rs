//! Pixel extraction from strip and tile organised images
//!
//! This module turns the block structure of a TIFF image into pixel values.
//! The layout strategy describes the block grid, the block reader decodes
//! blocks and serves pixels and regions.

mod region;
mod layout_strategy;
mod strip_layout;
mod tile_layout;
mod sample_type;
mod predictor;
mod block_reader;

// Public exports
pub use region::Region;
pub use layout_strategy::{BlockLayout, LayoutFactory};
pub use strip_layout::StripLayout;
pub use tile_layout::TileLayout;
pub use sample_type::SampleType;
pub use predictor::{apply_predictor, undo_predictor};
pub use block_reader::BlockReader;
