//! CLI command implementations
//!
//! Each subcommand is a `Command` object created by
//! `SoilTempCommandFactory` from the parsed arguments.

pub mod command_traits;
pub mod inspect_command;
pub mod lookup_command;
pub mod region_command;

pub use command_traits::{Command, CommandFactory};
pub use inspect_command::InspectCommand;
pub use lookup_command::LookupCommand;
pub use region_command::RegionCommand;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command as ClapCommand};
use std::path::PathBuf;

use crate::config::Settings;
use crate::errors::{LookupError, LookupResult};
use crate::utils::logger::Logger;

/// The `soiltemp` argument parser
pub fn build_cli() -> ClapCommand {
    let tif = Arg::new("tif")
        .long("tif")
        .help("GeoTIFF to read instead of the configured default")
        .value_name("PATH")
        .value_parser(value_parser!(PathBuf));

    ClapCommand::new("soiltemp")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Soil temperature lookup from GeoTIFF rasters")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .help("Configuration file (default: ./soiltemp.toml when present)")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging on stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            ClapCommand::new("lookup")
                .about("Soil temperature at an address, printed as JSON")
                .arg(Arg::new("address").help("Free-form address").required(true).index(1))
                .arg(tif.clone()),
        )
        .subcommand(
            ClapCommand::new("inspect")
                .about("Print raster metadata and global statistics")
                .arg(
                    Arg::new("tif")
                        .help("GeoTIFF to inspect")
                        .value_name("TIF")
                        .value_parser(value_parser!(PathBuf))
                        .index(1),
                )
                .arg(
                    Arg::new("no-plot")
                        .long("no-plot")
                        .help("Skip the quicklook PNG")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("plot-output")
                        .long("plot-output")
                        .help("Quicklook PNG path")
                        .value_name("PNG")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            ClapCommand::new("region")
                .about("Soil temperatures inside a bounding box, printed as JSON")
                .arg(
                    Arg::new("bbox")
                        .long("bbox")
                        .help("Bounding box as south,west,north,east in degrees")
                        .value_name("S,W,N,E")
                        .allow_hyphen_values(true)
                        .required(true),
                )
                .arg(tif)
                .arg(
                    Arg::new("masked")
                        .long("masked")
                        .help("Include the nodata mask")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .help("Also write the window as a GeoTIFF")
                        .value_name("TIF")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
}

/// Whether `-v` was given before or after the subcommand
pub fn verbose(args: &ArgMatches) -> bool {
    args.get_flag("verbose") || args.subcommand().map_or(false, |(_, sub)| sub.get_flag("verbose"))
}

/// The `--config` path, wherever it was given
pub fn config_path(args: &ArgMatches) -> Option<PathBuf> {
    args.get_one::<PathBuf>("config")
        .or_else(|| args.subcommand().and_then(|(_, sub)| sub.get_one::<PathBuf>("config")))
        .cloned()
}

/// Factory for creating command instances based on CLI arguments
pub struct SoilTempCommandFactory;

impl SoilTempCommandFactory {
    pub fn new() -> Self {
        SoilTempCommandFactory
    }
}

impl Default for SoilTempCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CommandFactory<'a> for SoilTempCommandFactory {
    fn create_command(&self, args: &ArgMatches, settings: &'a Settings, logger: &'a Logger)
        -> LookupResult<Box<dyn Command + 'a>> {
        match args.subcommand() {
            Some(("lookup", sub)) => Ok(Box::new(LookupCommand::new(sub, settings, logger)?)),
            Some(("inspect", sub)) => Ok(Box::new(InspectCommand::new(sub, settings, logger)?)),
            Some(("region", sub)) => Ok(Box::new(RegionCommand::new(sub, settings, logger)?)),
            Some((other, _)) => Err(LookupError::Config(format!("Unknown command: {}", other))),
            None => Err(LookupError::Config("No command given".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_parse_region() {
        let matches = build_cli()
            .try_get_matches_from(["soiltemp", "region", "--bbox", "-5,-5,2,3", "--masked", "-v"])
            .unwrap();
        assert!(verbose(&matches));
        assert_eq!(config_path(&matches), None);

        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "region");
        assert_eq!(sub.get_one::<String>("bbox").unwrap(), "-5,-5,2,3");
        assert!(sub.get_flag("masked"));
    }

    #[test]
    fn test_global_config_before_subcommand() {
        let matches = build_cli()
            .try_get_matches_from(["soiltemp", "--config", "alt.toml", "lookup", "Berlin"])
            .unwrap();
        assert_eq!(config_path(&matches), Some(PathBuf::from("alt.toml")));
        assert!(!verbose(&matches));
    }

    #[test]
    fn test_factory_builds_commands() {
        let settings = Settings::default();
        let logger = Logger::disabled();
        let factory = SoilTempCommandFactory::new();

        let matches = build_cli().try_get_matches_from(["soiltemp", "inspect", "soil.tif", "--no-plot"]).unwrap();
        assert!(factory.create_command(&matches, &settings, &logger).is_ok());

        let matches = build_cli().try_get_matches_from(["soiltemp", "region", "--bbox", "1,2,3"]).unwrap();
        assert!(matches!(factory.create_command(&matches, &settings, &logger), Err(LookupError::Config(_))));
    }
}
