use std::process;
use log::error;

use soiltemp::commands::{build_cli, config_path, verbose, CommandFactory, SoilTempCommandFactory};
use soiltemp::config::Settings;
use soiltemp::utils::logger::Logger;

fn main() {
    let matches = build_cli().get_matches();
    let settings = match Settings::load(config_path(&matches).as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ {}", e);
            process::exit(1);
        }
    };

    Logger::init_global_logger(settings.logging.level.as_deref(), verbose(&matches));

    let logger = match Logger::from_settings(&settings.logging) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("❌ Error opening operations log: {}", e);
            process::exit(1);
        }
    };

    let factory = SoilTempCommandFactory::new();
    let command = match factory.create_command(&matches, &settings, &logger) {
        Ok(command) => command,
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("❌ {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = command.execute() {
        error!("Command execution error: {}", e);
        eprintln!("❌ {}", e);
        if let Some(hint) = command.failure_hint(&e) {
            eprintln!("{}", hint);
        }
        process::exit(1);
    }
}
