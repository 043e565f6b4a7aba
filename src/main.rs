mod config;
mod db;
mod models;
mod run;
mod sort;

use anyhow::Result;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let mut args: Vec<String> = std::env::args().collect();
    let verbose = take_verbose_flag(&mut args);
    init_logger(if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    });

    let db_path = config::get_db_path()?;
    let mut db = db::Database::open(&db_path, config::DEFAULT_CATEGORIES)?;
    run::as_cli(&args, &mut db)
}

/// Strips `-v`/`--verbose` from before the subcommand only, so values such
/// as `--title -v` reach the command untouched.
fn take_verbose_flag(args: &mut Vec<String>) -> bool {
    let mut verbose = false;
    while args.get(1).is_some_and(|a| a == "-v" || a == "--verbose") {
        args.remove(1);
        verbose = true;
    }
    verbose
}

/// Initializes the tracing subscriber. `RUST_LOG` wins over `level` when set.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::take_verbose_flag;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_take_verbose_flag_before_command() {
        let mut a = args(&["cashbook", "-v", "--verbose", "list"]);
        assert!(take_verbose_flag(&mut a));
        assert_eq!(a, args(&["cashbook", "list"]));
    }

    #[test]
    fn test_take_verbose_flag_leaves_command_args() {
        let mut a = args(&["cashbook", "add", "5", "Food", "--title", "-v"]);
        assert!(!take_verbose_flag(&mut a));
        assert_eq!(a, args(&["cashbook", "add", "5", "Food", "--title", "-v"]));
    }
}
