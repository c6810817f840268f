mod app_helper;

mod authors_command;
pub(crate) use authors_command::AuthorsCommand;

mod call_command;
pub(crate) use call_command::CallCommand;

mod check_command;
pub(crate) use check_command::CheckCommand;

mod cli_manager;

mod command;

pub(crate) mod common;

mod solve_command;
pub(crate) use solve_command::SolveCommand;

mod writable_string;
