//! Point lookup by address

use clap::ArgMatches;
use log::info;
use serde_json::json;
use std::io;
use std::path::PathBuf;

use crate::api::SoilTemp;
use crate::commands::command_traits::Command;
use crate::config::Settings;
use crate::errors::{LookupError, LookupResult};
use crate::utils::json_utils::to_python_json;
use crate::utils::logger::Logger;

/// Geocode an address and print its soil temperature as JSON
pub struct LookupCommand<'a> {
    address: String,
    tif: Option<PathBuf>,
    engine: SoilTemp,
    logger: &'a Logger,
}

impl<'a> LookupCommand<'a> {
    pub fn new(args: &ArgMatches, settings: &Settings, logger: &'a Logger) -> LookupResult<Self> {
        let address = args.get_one::<String>("address")
            .ok_or_else(|| LookupError::Config("Missing address".to_string()))?
            .clone();
        let tif = args.get_one::<PathBuf>("tif").cloned();

        Ok(LookupCommand {
            address,
            tif,
            engine: SoilTemp::from_settings(settings),
            logger,
        })
    }

    /// The JSON line printed for a result
    pub fn render(address: &str, value: Option<f64>) -> LookupResult<String> {
        let doc = json!({ "address": address, "soil_temp_c": value });
        Ok(to_python_json(&doc).map_err(io::Error::from)?)
    }
}

impl Command for LookupCommand<'_> {
    fn execute(&self) -> LookupResult<()> {
        let value = self.engine.lookup(self.address.as_str(), self.tif.as_deref())?;
        println!("{}", Self::render(&self.address, value)?);

        info!("Lookup of {:?} finished", self.address);
        self.logger.log(&format!("lookup {:?} -> {:?}", self.address, value))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        assert_eq!(LookupCommand::render("Berlin", Some(9.25)).unwrap(), r#"{"address": "Berlin", "soil_temp_c": 9.25}"#);
        assert_eq!(LookupCommand::render("Paris, France", Some(10.0)).unwrap(),
                   r#"{"address": "Paris, France", "soil_temp_c": 10.0}"#);
        assert_eq!(LookupCommand::render("Sea", None).unwrap(), r#"{"address": "Sea", "soil_temp_c": null}"#);
    }

    #[test]
    fn test_render_escapes_non_ascii() {
        assert_eq!(LookupCommand::render("Zürich", None).unwrap(), r#"{"address": "Z\u00fcrich", "soil_temp_c": null}"#);
    }
}
