mod cli;
pub(crate) mod util;

pub(crate) use cli::as_cli;
