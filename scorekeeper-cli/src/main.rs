mod config;
mod history;
mod play;
mod tournaments;
mod utils;

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use config::{Config, ConfigError};
use scorekeeper_core::{options, Sport};
use scorekeeper_store::{FileStore, Store};
use thiserror::Error;

#[derive(Debug, Parser)]
#[clap(version, about)]
pub struct Args {
    /// Path to the config file.
    #[clap(short, long, default_value = "scorekeeper.toml")]
    config: PathBuf,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Keep the score of a single match.
    Play(play::Play),
    /// Show the options accepted by a sport.
    Options { sport: Sport },
    History {
        #[clap(subcommand)]
        command: history::Command,
    },
    Tournament {
        #[clap(subcommand)]
        command: tournaments::Command,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Store(#[from] scorekeeper_store::Error),
    #[error(transparent)]
    Tournament(#[from] scorekeeper_core::Error),
    #[error("invalid match option: {0}")]
    Options(#[from] options::Error),
    #[error("no tournament with id {0}")]
    UnknownTournament(String),
    #[error("no match with id {0}")]
    UnknownMatch(String),
}

fn main() {
    let args = Args::parse();

    if let Err(err) = run(args) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Error> {
    let config = Config::load(&args.config)?;

    pretty_env_logger::formatted_builder()
        .filter_level(config.loglevel)
        .init();

    log::debug!("Using config: {:?}", config);

    let store = Store::new(FileStore::new(&config.data_dir));

    match args.command {
        Command::Play(play) => play.run(&store),
        Command::Options { sport } => {
            play::print_options(sport);
            Ok(())
        }
        Command::History { command } => command.run(&store),
        Command::Tournament { command } => command.run(&store),
    }
}
