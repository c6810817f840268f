use super::{cli_manager, command::Command};
use anyhow::{Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use hexprop::{
    evaluators::{EAtomEvaluator, GroundingContext},
    plugins,
    symbols::parse_term,
};
use std::sync::Arc;

const CMD_NAME: &str = "call";

const ARG_EATOM: &str = "EATOM";
const ARG_INPUTS: &str = "INPUTS";

/// Evaluates an external atom the way the grounder does, before any search.
pub(crate) struct CallCommand;

impl CallCommand {
    pub(crate) fn new() -> Self {
        CallCommand
    }
}

impl<'a> Command<'a> for CallCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Calls an external atom at grounding time and prints its outputs")
            .setting(AppSettings::DisableVersion)
            .arg(
                Arg::with_name(ARG_EATOM)
                    .short("e")
                    .empty_values(false)
                    .multiple(false)
                    .help("the name of the external atom")
                    .required(true),
            )
            .arg(
                Arg::with_name(ARG_INPUTS)
                    .short("a")
                    .empty_values(false)
                    .multiple(true)
                    .number_of_values(1)
                    .allow_hyphen_values(true)
                    .help("an input term (may be repeated)"),
            )
            .arg(cli_manager::logging_level_cli_arg())
    }

    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
        let eatom = arg_matches.value_of(ARG_EATOM).unwrap_or_default();
        let inputs = arg_matches
            .values_of(ARG_INPUTS)
            .map(|values| {
                values
                    .map(|v| parse_term(v).with_context(|| format!("while reading input {}", v)))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();
        let grounding = GroundingContext::new(
            Arc::new(EAtomEvaluator::default()),
            Arc::new(plugins::builtin_registry()?),
        );
        println!("{}", grounding.call(eatom, &inputs)?);
        Ok(())
    }
}
