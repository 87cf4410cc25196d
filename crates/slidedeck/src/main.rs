mod app;
mod cli;
mod commands;
mod config;
mod logging;
mod outline;

use clap::Parser;
use colored::Colorize;

use cli::Cli;
use logging::{LogConfig, init_logging};

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_logging(&LogConfig::from_flags(cli.verbose, cli.quiet, cli.no_color));

    if let Err(e) = cli.run() {
        eprintln!("{} {e:#}", "Error:".red().bold());
        std::process::exit(1);
    }
}
