// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, set up logging, hand off to `cli::run`.
// - Returns `anyhow::Result` so any failure is printed and exits with status 1.

use clap::Parser;
use xlua_cli::cli::{self, Cli};
use xlua_cli::logger;

fn main() -> anyhow::Result<()> {
    // clap prints usage and exits with status 2 on missing or conflicting flags.
    let cli = Cli::parse();

    logger::init_cli_logger(cli.verbose);

    cli::run(cli)
}
