mod cli;
mod commands;
mod logging;

use clap::Parser;

fn main() {
    let args = cli::Cli::parse();
    logging::initialize(if args.log_file {
        logging::LogDestination::Both
    } else {
        logging::LogDestination::Terminal
    });

    if let Err(err) = commands::run(args) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
