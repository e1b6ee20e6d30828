//! Bounding-box lookup

use clap::ArgMatches;
use log::info;
use ndarray::Array2;
use serde_json::{json, Value};
use std::io;
use std::path::PathBuf;

use crate::api::{pixel_window, RegionValues, SoilTemp};
use crate::commands::command_traits::Command;
use crate::config::Settings;
use crate::coordinate::BoundingBox;
use crate::errors::{LookupError, LookupResult};
use crate::extractor::{Region, SampleType};
use crate::tiff::TiffBuilder;
use crate::utils::json_utils::to_python_json;
use crate::utils::logger::Logger;

/// Read the pixels under a (south, west, north, east) box
pub struct RegionCommand<'a> {
    bbox: BoundingBox,
    tif: Option<PathBuf>,
    masked: bool,
    output: Option<PathBuf>,
    engine: SoilTemp,
    logger: &'a Logger,
}

impl<'a> RegionCommand<'a> {
    pub fn new(args: &ArgMatches, settings: &Settings, logger: &'a Logger) -> LookupResult<Self> {
        let bbox_text = args.get_one::<String>("bbox")
            .ok_or_else(|| LookupError::Config("Missing bounding box".to_string()))?;
        let bbox = BoundingBox::parse_swne(bbox_text).map_err(LookupError::Config)?;

        Ok(RegionCommand {
            bbox,
            tif: args.get_one::<PathBuf>("tif").cloned(),
            masked: args.get_flag("masked"),
            output: args.get_one::<PathBuf>("output").cloned(),
            engine: SoilTemp::from_settings(settings),
            logger,
        })
    }

    /// Rows of an array as JSON, NaN as null
    fn rows_json(values: &Array2<f64>) -> Value {
        values.rows().into_iter()
            .map(|row| row.iter().map(|&v| if v.is_nan() { Value::Null } else { json!(v) }).collect::<Value>())
            .collect()
    }

    /// The JSON document printed for a result
    pub fn render(bbox: &BoundingBox, result: Option<&RegionValues>) -> Value {
        let swne = bbox.to_swne();
        let Some(values) = result else {
            return json!({ "bbox": swne, "values": null });
        };

        let (rows, cols) = values.dim();
        let mut doc = json!({
            "bbox": swne,
            "rows": rows,
            "cols": cols,
            "values": Self::rows_json(&values.to_filled()),
        });
        if let RegionValues::Masked(masked) = values {
            let mask: Vec<Vec<bool>> = masked.mask.rows().into_iter().map(|r| r.to_vec()).collect();
            doc["mask"] = json!(mask);
        }
        doc
    }

    /// Write the window as a Float32 GeoTIFF aligned with the source grid
    fn export(&self, region: &Region, values: &RegionValues) -> LookupResult<()> {
        let Some(output) = &self.output else {
            return Ok(());
        };
        let dataset = self.engine.dataset(self.tif.as_deref())?;
        let meta = dataset.metadata();
        let nodata = meta.fill_value();

        let data = values.to_filled().mapv(|v| if v.is_nan() { nodata } else { v });
        TiffBuilder::new(SampleType::F32)
            .transform(meta.transform.translated_pixels(region.x as f64, region.y as f64))
            .epsg(4326)
            .nodata(nodata)
            .software(concat!("soiltemp ", env!("CARGO_PKG_VERSION")))
            .write(&data, output)?;

        info!("Region written to {}", output.display());
        Ok(())
    }
}

impl Command for RegionCommand<'_> {
    fn execute(&self) -> LookupResult<()> {
        let result = self.engine.lookup_region(&self.bbox, self.tif.as_deref(), self.masked)?;
        println!("{}", to_python_json(&Self::render(&self.bbox, result.as_ref())).map_err(io::Error::from)?);

        if let Some(values) = &result {
            let dataset = self.engine.dataset(self.tif.as_deref())?;
            if let Some(region) = pixel_window(dataset.as_ref(), &self.bbox) {
                self.export(&region, values)?;
            }
        }

        let dims = result.as_ref().map(|v| v.dim());
        self.logger.log(&format!("region {:?} -> {:?}", self.bbox.to_swne(), dims))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{MaskedArray, NodataPolicy};
    use ndarray::array;

    #[test]
    fn test_render_none() {
        let bbox = BoundingBox::from_swne(20.0, 20.0, 30.0, 30.0);
        let text = to_python_json(&RegionCommand::render(&bbox, None)).unwrap();
        assert_eq!(text, r#"{"bbox": [20.0, 20.0, 30.0, 30.0], "values": null}"#);
    }

    #[test]
    fn test_render_filled_and_masked() {
        let bbox = BoundingBox::from_swne(0.0, 0.0, 1.0, 2.0);
        let masked = MaskedArray::from_nodata(array![[1.5, -9999.0]], Some(-9999.0), &NodataPolicy::default());

        let filled = RegionValues::Filled(masked.filled(f64::NAN));
        let doc = RegionCommand::render(&bbox, Some(&filled));
        assert_eq!(doc["rows"], 1);
        assert_eq!(doc["cols"], 2);
        assert_eq!(doc["values"], json!([[1.5, null]]));
        assert!(doc.get("mask").is_none());

        let doc = RegionCommand::render(&bbox, Some(&RegionValues::Masked(masked)));
        assert_eq!(doc["values"], json!([[1.5, null]]));
        assert_eq!(doc["mask"], json!([[false, true]]));
    }
}
