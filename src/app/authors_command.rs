use super::{cli_manager, command::Command};
use anyhow::Result;
use clap::{App, AppSettings, ArgMatches, SubCommand};

const CMD_NAME: &str = "authors";

/// Prints the app name and version, then one author per line.
pub(crate) struct AuthorsCommand<'a> {
    header: String,
    authors: &'a str,
}

impl<'a> AuthorsCommand<'a> {
    pub(crate) fn new(app_name: &str, app_version: &str, authors: &'a str) -> Self {
        AuthorsCommand {
            header: format!("{} {}", app_name, app_version),
            authors,
        }
    }
}

impl<'a> Command<'a> for AuthorsCommand<'a> {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Displays the version and the authors of hexprop")
            .setting(AppSettings::DisableVersion)
            .arg(cli_manager::logging_level_cli_arg())
    }

    fn execute(&self, _arg_matches: &ArgMatches<'_>) -> Result<()> {
        println!("{}", self.header);
        self.authors
            .split(':')
            .filter(|a| !a.is_empty())
            .for_each(|a| println!("{}", a));
        Ok(())
    }
}
