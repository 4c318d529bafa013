mod cli;
mod commands;
mod cosmetic;
mod exit_code;

use clap::Parser;

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    std::process::exit(commands::compile::run(cli));
}
