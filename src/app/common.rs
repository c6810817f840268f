use super::{
    app_helper::AppHelper, command::Command, AuthorsCommand, CallCommand, CheckCommand,
    SolveCommand,
};
use anyhow::{Context, Result};
use clap::Arg;
use hexprop::{engine::GroundTheory, io::TheoryReader};
use log::{info, warn};
use std::{
    fs::{self, File},
    io::BufReader,
    path::PathBuf,
};

pub(crate) fn create_app_helper() -> AppHelper<'static> {
    let app_name = option_env!("CARGO_PKG_NAME").unwrap_or("unknown app name");
    let app_version = option_env!("CARGO_PKG_VERSION").unwrap_or("unknown version");
    let authors = option_env!("CARGO_PKG_AUTHORS").unwrap_or("unknown authors");
    let mut app = AppHelper::new(
        app_name,
        app_version,
        authors,
        "hexprop, lazy verification of external atoms for SAT-based answer set search.",
    );
    let commands: Vec<Box<dyn Command>> = vec![
        Box::new(AuthorsCommand::new(app_name, app_version, authors)),
        Box::new(CallCommand::new()),
        Box::new(CheckCommand::new()),
        Box::new(SolveCommand::new()),
    ];
    for c in commands {
        app.add_command(c);
    }
    app
}

pub(crate) const ARG_INPUT: &str = "INPUT";

pub(crate) fn input_args() -> Arg<'static, 'static> {
    Arg::with_name(ARG_INPUT)
        .short("f")
        .empty_values(false)
        .multiple(false)
        .help("the input file that contains the ground program")
        .required(true)
}

pub(crate) fn read_theory(file_path: &str) -> Result<GroundTheory> {
    let canonicalized = canonicalize_file_path(file_path)?;
    info!("reading input file {:?}", canonicalized);
    let mut reader = TheoryReader::default();
    reader.add_warning_handler(Box::new(|line, msg| {
        warn!("at line with index {}: {}", line, msg)
    }));
    let mut file_reader = BufReader::new(
        File::open(&canonicalized)
            .with_context(|| format!(r#"while opening file "{}""#, file_path))?,
    );
    let theory = reader
        .read(&mut file_reader)
        .with_context(|| format!(r#"while reading file "{}""#, file_path))?;
    info!(
        "the ground program has {} variable(s), {} atom(s), {} clause(s) and {} external atom(s)",
        theory.n_vars(),
        theory.atoms().len(),
        theory.clauses().len(),
        theory.signatures().len(),
    );
    Ok(theory)
}

/// Canonicalize a path given by the user.
pub(crate) fn canonicalize_file_path(file_path: &str) -> Result<PathBuf> {
    fs::canonicalize(PathBuf::from(file_path))
        .with_context(|| format!(r#"while opening file "{}""#, file_path))
}
