use clap::Parser;
use std::process;
use witsms_processor::cli::{run, Cli};

fn main() {
    let cli = Cli::parse();

    if let Err(error) = run(cli) {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}
