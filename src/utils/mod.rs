//! Utility modules for common functionality
//!
//! Logging, progress bars, path normalization and quicklook colormaps for
//! the application, plus low-level helpers of the TIFF layer.

pub mod logger;
pub(crate) mod progress;
pub(crate) mod paths;
pub(crate) mod colormap_utils;
pub(crate) mod write_utils;
pub(crate) mod ifd_utils;
pub(crate) mod format_utils;
pub(crate) mod json_utils;
pub(crate) mod tag_utils;
