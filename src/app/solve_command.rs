use super::{cli_manager, command::Command, common};
use anyhow::{Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use hexprop::{
    engine::SatEngine,
    evaluators::{AtomEvaluator, CachedEAtomEvaluator, EAtomEvaluator},
    io::ModelWriter,
    plugins,
    propagator::PropagatorFactory,
};
use log::info;
use std::sync::Arc;

const CMD_NAME: &str = "solve";

const ARG_NUMBER: &str = "NUMBER";
const ARG_NOFACTS: &str = "NOFACTS";
const ARG_AUXFACTS: &str = "AUXFACTS";
const ARG_NO_PARTIAL: &str = "NO_PARTIAL";
const ARG_NO_CACHE: &str = "NO_CACHE";

/// The options of the solve command.
struct SolveConfig {
    max_models: usize,
    hide_facts: bool,
    show_auxiliary: bool,
    partial_evaluation: bool,
    cache: bool,
}

impl SolveConfig {
    fn from_matches(arg_matches: &ArgMatches<'_>) -> Result<Self> {
        let number = arg_matches.value_of(ARG_NUMBER).unwrap_or("1");
        let max_models = number
            .parse::<usize>()
            .with_context(|| format!("invalid number of models: {}", number))?;
        Ok(SolveConfig {
            max_models,
            hide_facts: arg_matches.is_present(ARG_NOFACTS),
            show_auxiliary: arg_matches.is_present(ARG_AUXFACTS),
            partial_evaluation: !arg_matches.is_present(ARG_NO_PARTIAL),
            cache: !arg_matches.is_present(ARG_NO_CACHE),
        })
    }
}

pub(crate) struct SolveCommand;

impl SolveCommand {
    pub(crate) fn new() -> Self {
        SolveCommand
    }
}

impl<'a> Command<'a> for SolveCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Enumerates the answer sets of a ground program")
            .setting(AppSettings::DisableVersion)
            .arg(common::input_args())
            .arg(
                Arg::with_name(ARG_NUMBER)
                    .short("n")
                    .long("number")
                    .empty_values(false)
                    .multiple(false)
                    .default_value("1")
                    .help("the number of models to compute (0 for all)"),
            )
            .arg(
                Arg::with_name(ARG_NOFACTS)
                    .long("nofacts")
                    .takes_value(false)
                    .help("do not print the facts of the program"),
            )
            .arg(
                Arg::with_name(ARG_AUXFACTS)
                    .long("auxfacts")
                    .takes_value(false)
                    .help("print the auxiliary atoms"),
            )
            .arg(
                Arg::with_name(ARG_NO_PARTIAL)
                    .long("no-partial")
                    .takes_value(false)
                    .help("only verify external atoms on total assignments"),
            )
            .arg(
                Arg::with_name(ARG_NO_CACHE)
                    .long("no-cache")
                    .takes_value(false)
                    .help("do not cache the results of external atom evaluations"),
            )
            .arg(cli_manager::logging_level_cli_arg())
    }

    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
        let config = SolveConfig::from_matches(arg_matches)?;
        let file = arg_matches.value_of(common::ARG_INPUT).unwrap_or_default();
        let theory = common::read_theory(file)?;
        let evaluator: Arc<dyn AtomEvaluator> = if config.cache {
            Arc::new(CachedEAtomEvaluator::default())
        } else {
            info!("external atom evaluations will not be cached");
            Arc::new(EAtomEvaluator::default())
        };
        let factory = PropagatorFactory::new(
            evaluator,
            Arc::new(plugins::builtin_registry()?),
            theory.signatures().clone(),
            config.partial_evaluation,
        );
        let mut propagator = factory.create("CSF");
        let mut writer = ModelWriter::default();
        if config.hide_facts {
            writer.hide(theory.facts());
        }
        writer.show_auxiliary(config.show_auxiliary);
        let mut out = std::io::stdout();
        let n_models = SatEngine::new(&theory).solve(&mut propagator, config.max_models, |m| {
            info!("found model {}", m.number());
            writer.write_model(&mut out, m)
        })?;
        if n_models == 0 {
            info!("the program has no answer set");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> Result<SolveConfig> {
        let command = SolveCommand::new();
        let app = App::new("app").subcommand(command.clap_subcommand());
        let matches = app.get_matches_from_safe(
            ["app", "solve", "-f", "program.txt"]
                .iter()
                .chain(args.iter())
                .copied(),
        )?;
        SolveConfig::from_matches(matches.subcommand_matches(CMD_NAME).unwrap())
    }

    #[test]
    fn test_default_config() {
        let config = config(&[]).unwrap();
        assert_eq!(1, config.max_models);
        assert!(!config.hide_facts);
        assert!(!config.show_auxiliary);
        assert!(config.partial_evaluation);
        assert!(config.cache);
    }

    #[test]
    fn test_config() {
        let config = config(&[
            "-n",
            "0",
            "--nofacts",
            "--auxfacts",
            "--no-partial",
            "--no-cache",
        ])
        .unwrap();
        assert_eq!(0, config.max_models);
        assert!(config.hide_facts);
        assert!(config.show_auxiliary);
        assert!(!config.partial_evaluation);
        assert!(!config.cache);
    }

    #[test]
    fn test_invalid_number() {
        assert!(config(&["-n", "-1"]).is_err());
        assert!(config(&["-n", "x"]).is_err());
    }
}
