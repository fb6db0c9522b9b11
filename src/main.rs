use clap::Parser;

mod app;
mod backend;
mod cli;
mod config;
mod error;
mod keymap;
mod library;
mod logging;
mod player;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = cli::Cli::parse();
    runtime::run(cli)?;
    Ok(())
}
