//! Themecheck CLI entry point.

use clap::Parser;
use themecheck::cli::{self, Cli, Commands, EXIT_ERROR};

fn main() {
    let cli = Cli::parse();
    cli::init_logging(cli.verbose, cli.debug);

    let result = match &cli.command {
        Commands::Audit(args) => cli::run_audit(args),
        Commands::Init(args) => cli::run_init(args),
        Commands::Checks(args) => cli::run_checks(args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
