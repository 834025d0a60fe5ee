use std::str::FromStr;

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};
use pnet::{CLIArguments, Command, eval_main};

fn main() -> Result<()> {
    let args = CLIArguments::parse();

    // RUST_LOG decides unless a level was given on the command line
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = &args.log_level {
        let log_level = LevelFilter::from_str(level).unwrap_or_else(|_| {
            eprintln!("Invalid log level: {}. Using 'warn' instead.", level);
            LevelFilter::Warn
        });
        logger.filter_level(log_level);
    } else if let Some(log_level) = args.verbosity() {
        logger.filter_level(log_level);
    }
    logger.init();
    debug!("{:?}", args);

    match args.command {
        Command::Eval(args) => eval_main(args),
    }
}
