mod args;
mod feedback;

use clap::Parser;
use log::{error, info, warn, LevelFilter};

use crate::args::{Args, Command};

fn main() {
    let args = Args::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    info!("args: {:?}", args);

    let res = match &args.command {
        Command::Classify(c) => feedback::run_classification(c, args.config.as_deref()),
        Command::Demographics(d) => feedback::run_demographics(d, args.config.as_deref()),
    };

    if let Err(e) = res {
        if e.is_empty_result() {
            warn!("{}", e);
            return;
        }
        error!("{}", e);
        std::process::exit(1);
    }
}
