use anyhow::Result;
use clap::{App, ArgMatches};

/// A subcommand of the app.
///
/// Commands describe their CLI arguments with clap and execute themselves on the matched arguments.
/// Each command must have a unique name.
pub(crate) trait Command<'a> {
    /// Returns the name of the command, used to select it on the command line.
    fn name(&self) -> &str;

    /// Returns the clap subcommand describing the CLI arguments of this command.
    fn clap_subcommand(&self) -> App<'a, 'a>;

    /// Executes the command.
    ///
    /// An error makes the app exit with a failure status code.
    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()>;
}
