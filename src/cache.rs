//! Process-wide cache of open rasters
//!
//! Keys are normalized paths, so relative, absolute and `~` spellings of the
//! same file share one handle. Each key gets its own `OnceCell`: concurrent
//! first lookups of one path open the file once, while other paths are not
//! blocked. Entries are never evicted.

use log::{debug, info};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::{LookupError, LookupResult};
use crate::raster::{GeoTiffRaster, RasterHandle, ReprojectedRaster};
use crate::tiff::errors::TiffError;
use crate::utils::paths;

type Slot = Arc<OnceCell<Arc<dyn RasterHandle>>>;

/// Maps normalized raster paths to open, EPSG:4326 raster handles
#[derive(Default)]
pub struct DatasetCache {
    slots: Mutex<HashMap<PathBuf, Slot>>,
    opens: AtomicUsize,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The handle for `path`, opening and reprojecting it on first use
    ///
    /// A missing file is `ResourceNotFound`, a raster without CRS is
    /// `MissingCrs`. Failed opens are not cached.
    pub fn acquire(&self, path: &Path) -> LookupResult<Arc<dyn RasterHandle>> {
        let key = paths::normalize(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LookupError::ResourceNotFound(path.to_path_buf()),
            _ => LookupError::Io(e),
        })?;

        let slot = {
            let mut slots = self.slots.lock()
                .map_err(|_| LookupError::Config("dataset cache lock poisoned".to_string()))?;
            slots.entry(key.clone()).or_default().clone()
        };

        if let Some(handle) = slot.get() {
            debug!("Dataset cache hit for {}", key.display());
            return Ok(handle.clone());
        }

        slot.get_or_try_init(|| self.open(&key)).cloned()
    }

    fn open(&self, path: &Path) -> LookupResult<Arc<dyn RasterHandle>> {
        debug!("Dataset cache miss for {}", path.display());
        self.opens.fetch_add(1, Ordering::SeqCst);

        let raster = GeoTiffRaster::open(path).map_err(|e| match e {
            TiffError::IoError(ref io) if io.kind() == io::ErrorKind::NotFound => {
                LookupError::ResourceNotFound(path.to_path_buf())
            }
            other => LookupError::Raster(other),
        })?;

        match raster.metadata().crs {
            None => Err(LookupError::MissingCrs(path.to_path_buf())),
            Some(4326) => Ok(Arc::new(raster)),
            Some(epsg) => {
                info!("{} is in EPSG:{}, reprojecting to EPSG:4326", path.display(), epsg);
                Ok(Arc::new(ReprojectedRaster::new(Box::new(raster))?))
            }
        }
    }

    /// Number of cached handles
    pub fn len(&self) -> usize {
        self.slots.lock()
            .map(|slots| slots.values().filter(|slot| slot.get().is_some()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many times a raster file has been opened
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}
