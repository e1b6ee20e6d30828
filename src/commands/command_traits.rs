//! Command pattern interfaces

use crate::config::Settings;
use crate::errors::{LookupError, LookupResult};
use crate::utils::logger::Logger;

/// Represents an executable command in the application
///
/// Command objects encapsulate the logic for a specific CLI operation,
/// allowing for separation of concerns and better testability.
pub trait Command {
    /// Execute the command, printing its result on stdout
    fn execute(&self) -> LookupResult<()>;

    /// Extra guidance printed after an error message, if any
    fn failure_hint(&self, _error: &LookupError) -> Option<String> {
        None
    }
}

/// Factory for creating commands from CLI arguments
pub trait CommandFactory<'a> {
    /// Create the Command for the parsed subcommand
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `settings` - Loaded configuration
    /// * `logger` - Operations log
    fn create_command(&self, args: &clap::ArgMatches, settings: &'a Settings, logger: &'a Logger)
        -> LookupResult<Box<dyn Command + 'a>>;
}
