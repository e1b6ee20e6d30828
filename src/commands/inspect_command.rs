//! Raster inspection: profile, global statistics and a quicklook

use clap::ArgMatches;
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::commands::command_traits::Command;
use crate::config::Settings;
use crate::errors::{LookupError, LookupResult};
use crate::raster::{block_rows, compute_stats_with, GeoTiffRaster, NodataPolicy, RasterHandle, RasterStats};
use crate::utils::colormap_utils::{ColorMap, QuicklookGrid};
use crate::utils::logger::Logger;
use crate::utils::progress::ProgressTracker;

/// Where the soil temperature rasters are published
pub const DOWNLOAD_HINT: &str = "Download it from https://zenodo.org/record/4558732 and place it next to this script, or pass the path as an argument.";

/// Print the profile and statistics of a raster
///
/// The raster is opened as is: no CRS is needed and nothing is reprojected.
pub struct InspectCommand<'a> {
    tif: PathBuf,
    plot_output: Option<PathBuf>,
    plot_max_width: u32,
    policy: NodataPolicy,
    logger: &'a Logger,
}

impl<'a> InspectCommand<'a> {
    pub fn new(args: &ArgMatches, settings: &Settings, logger: &'a Logger) -> LookupResult<Self> {
        let tif = args.get_one::<PathBuf>("tif")
            .cloned()
            .unwrap_or_else(|| settings.raster.default_path.clone());

        let plot_output = if args.get_flag("no-plot") {
            None
        } else {
            Some(args.get_one::<PathBuf>("plot-output")
                .cloned()
                .unwrap_or_else(|| settings.inspect.plot_output.clone()))
        };

        Ok(InspectCommand {
            tif,
            plot_output,
            plot_max_width: settings.inspect.plot_max_width,
            policy: NodataPolicy::new(settings.lookup.nodata_rtol, settings.lookup.nodata_atol),
            logger,
        })
    }

    /// The statistics block, one `{key:<10} {value:6.2}` line per statistic
    pub fn format_stats(stats: &RasterStats) -> String {
        let mut out = String::from("=== Global stats ===\n");
        for (key, value) in [("min (°C)", stats.min), ("mean (°C)", stats.mean), ("max (°C)", stats.max)] {
            out.push_str(&format!("{:<10} {:6.2}\n", key, value));
        }
        out
    }

    fn plot(&self, grid: &QuicklookGrid, stats: &RasterStats, output: &Path) -> LookupResult<()> {
        if stats.valid_count == 0 {
            warn!("No valid pixels, skipping the quicklook");
            return Ok(());
        }
        grid.save(&ColorMap::rdylbu_r(), stats.min, stats.max, output)?;
        println!("Quicklook saved to {}", output.display());
        Ok(())
    }
}

impl Command for InspectCommand<'_> {
    fn execute(&self) -> LookupResult<()> {
        if !self.tif.exists() {
            return Err(LookupError::ResourceNotFound(self.tif.clone()));
        }

        let raster = GeoTiffRaster::open(&self.tif)?;
        let meta = raster.metadata();
        println!("=== Metadata ===");
        print!("{}", meta);
        println!();

        let progress = ProgressTracker::new(block_rows(&raster), "Computing statistics");
        let mut grid = self.plot_output.as_ref()
            .map(|_| QuicklookGrid::new(meta.width, meta.height, self.plot_max_width));
        let stats = compute_stats_with(&raster, &self.policy, Some(&progress), &mut |row, chunk| {
            if let Some(grid) = grid.as_mut() {
                grid.absorb(row, chunk);
            }
        })?;
        progress.finish_and_clear();

        print!("{}", Self::format_stats(&stats));
        info!("{} valid pixels", stats.valid_count);

        if let (Some(grid), Some(output)) = (&grid, &self.plot_output) {
            self.plot(grid, &stats, output)?;
        }

        self.logger.log(&format!("inspect {} -> min {} mean {} max {}",
                                 self.tif.display(), stats.min, stats.mean, stats.max))?;
        Ok(())
    }

    fn failure_hint(&self, error: &LookupError) -> Option<String> {
        matches!(error, LookupError::ResourceNotFound(_)).then(|| DOWNLOAD_HINT.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_stats() {
        let stats = RasterStats { min: -12.346, mean: 8.0, max: 31.5, valid_count: 3 };
        assert_eq!(
            InspectCommand::format_stats(&stats),
            "=== Global stats ===\nmin (°C)   -12.35\nmean (°C)    8.00\nmax (°C)    31.50\n"
        );
        let text = InspectCommand::format_stats(&RasterStats::empty());
        assert!(text.contains("min (°C)      NaN\n"), "{}", text);
    }
}
