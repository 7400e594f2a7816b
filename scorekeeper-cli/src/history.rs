use clap::Subcommand;
use scorekeeper_core::MatchResult;
use scorekeeper_store::{KeyValueStore, Store};

use crate::play::print_result;
use crate::utils::{print_table, Prompt};
use crate::Error;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List all played matches.
    List,
    /// Show a single match including all its periods.
    Show { id: String },
    /// Delete all played matches.
    Clear {
        /// Do not ask for confirmation.
        #[clap(short, long)]
        yes: bool,
    },
}

impl Command {
    pub fn run<S>(&self, store: &Store<S>) -> Result<(), Error>
    where
        S: KeyValueStore,
    {
        match self {
            Self::List => {
                let history = store.history().list()?;
                if history.is_empty() {
                    println!("No matches played yet");
                    return Ok(());
                }

                let rows: Vec<_> = history.iter().map(row).collect();
                print_table(["ID", "Date", "Sport", "Match", "Score", "Winner"], &rows);
            }
            Self::Show { id } => {
                let history = store.history().list()?;
                let result = history
                    .iter()
                    .find(|result| &result.id == id)
                    .ok_or_else(|| Error::UnknownMatch(id.clone()))?;

                print_result(result);
                println!("{} events", result.events.len());
            }
            Self::Clear { yes } => {
                let len = store.history().list()?.len();

                let msg = format!("Delete {} matches? (y/n)", len);
                if *yes || Prompt::new(&msg).confirm()? {
                    store.history().clear()?;
                    println!("Deleted {} matches", len);
                }
            }
        }

        Ok(())
    }
}

fn row(result: &MatchResult) -> [String; 6] {
    let [a, b] = result.final_score;
    let [name_a, name_b] = &result.side_names;

    [
        result.id.clone(),
        result.date.format("%Y-%m-%d %H:%M").to_string(),
        result.sport.to_string(),
        format!("{} vs {}", name_a, name_b),
        format!("{} - {}", a, b),
        result.winner_name().unwrap_or("draw").to_owned(),
    ]
}
