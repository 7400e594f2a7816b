use clap::Subcommand;
use scorekeeper_core::{BracketMatch, ScoringEngine, Sport, Tournament, TournamentId};
use scorekeeper_store::{KeyValueStore, Store};

use crate::play::{print_result, rules, run_match};
use crate::utils::{print_table, Prompt};
use crate::Error;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new tournament. Missing values are read from stdin.
    Create {
        #[clap(short, long)]
        name: Option<String>,
        #[clap(short, long)]
        sport: Option<Sport>,
        /// The teams in seeding order.
        teams: Vec<String>,
    },
    /// List all tournaments, the most recent first.
    List,
    /// Show the bracket of a tournament.
    Show { id: String },
    /// Record the score of a bracket match.
    Record {
        id: String,
        match_id: String,
        score_a: u32,
        score_b: u32,
    },
    /// Play the next bracket match, or the given one, with the scoreboard.
    Play {
        id: String,
        match_id: Option<String>,
        /// Match options as key=value.
        #[clap(short = 'o', long = "option")]
        options: Vec<String>,
    },
    /// Clear the result of a bracket match and of every match depending on it.
    Reset { id: String, match_id: String },
    /// Delete a tournament.
    Delete { id: String },
}

impl Command {
    pub fn run<S>(&self, store: &Store<S>) -> Result<(), Error>
    where
        S: KeyValueStore,
    {
        match self {
            Self::Create { name, sport, teams } => {
                let name = match name {
                    Some(name) => name.clone(),
                    None => Prompt::new("Name").read_valid()?,
                };
                let sport = match sport {
                    Some(sport) => *sport,
                    None => Prompt::new("Sport").read_valid()?,
                };
                let teams = if teams.is_empty() {
                    read_teams()?
                } else {
                    teams.clone()
                };

                let tournament = store
                    .tournaments()
                    .upsert(Tournament::new(&name, sport, teams)?)?;

                if let Some(id) = &tournament.id {
                    println!("Created tournament {}", id);
                }
                print_bracket(&tournament);
            }
            Self::List => {
                let rows: Vec<_> = store
                    .tournaments()
                    .list_by_start_date()?
                    .into_iter()
                    .map(|tournament| {
                        [
                            tournament.id.map(|id| id.0).unwrap_or_default(),
                            tournament.name,
                            tournament.sport.to_string(),
                            tournament.teams.len().to_string(),
                            tournament.status.to_string(),
                            tournament.start_date.format("%Y-%m-%d").to_string(),
                        ]
                    })
                    .collect();

                print_table(["ID", "Name", "Sport", "Teams", "Status", "Start"], &rows);
            }
            Self::Show { id } => {
                let tournament = get(store, id)?;
                print_bracket(&tournament);
            }
            Self::Record {
                id,
                match_id,
                score_a,
                score_b,
            } => {
                let mut tournament = get(store, id)?;
                tournament.record_result(match_id, [*score_a, *score_b])?;

                let tournament = store.tournaments().upsert(tournament)?;
                print_bracket(&tournament);
            }
            Self::Play {
                id,
                match_id,
                options,
            } => {
                let mut tournament = get(store, id)?;

                let bracket_match = match match_id {
                    Some(match_id) => tournament.bracket.find(match_id),
                    None => tournament.next_match(),
                }
                .ok_or_else(|| {
                    Error::UnknownMatch(match_id.clone().unwrap_or_else(|| String::from("next")))
                })?;

                if !bracket_match.is_ready() {
                    let id = bracket_match.id.clone();
                    return Err(scorekeeper_core::Error::MatchNotReady(id).into());
                }

                let match_id = bracket_match.id.clone();
                let side_names = bracket_match
                    .entrants
                    .clone()
                    .map(|spot| spot.label().to_owned());

                let engine = ScoringEngine::new(rules(tournament.sport, options)?, side_names);
                let result = match run_match(engine)? {
                    Some(result) => result,
                    None => return Ok(()),
                };

                let result = result.with_id(history_id(&tournament, &match_id));
                print_result(&result);

                // The bracket rejects a draw, which is then not kept in the history either.
                tournament.record_result(&match_id, result.final_score)?;
                store.history().push(&result)?;

                let tournament = store.tournaments().upsert(tournament)?;
                print_bracket(&tournament);
            }
            Self::Reset { id, match_id } => {
                let mut tournament = get(store, id)?;
                tournament.reset_match(match_id)?;

                let tournament = store.tournaments().upsert(tournament)?;
                print_bracket(&tournament);
            }
            Self::Delete { id } => {
                if !store.tournaments().remove(&TournamentId(id.clone()))? {
                    return Err(Error::UnknownTournament(id.clone()));
                }

                println!("Deleted tournament {}", id);
            }
        }

        Ok(())
    }
}

fn get<S>(store: &Store<S>, id: &str) -> Result<Tournament, Error>
where
    S: KeyValueStore,
{
    store
        .tournaments()
        .get(&TournamentId(id.to_owned()))?
        .ok_or_else(|| Error::UnknownTournament(id.to_owned()))
}

/// Returns the history id of a bracket match: `<tournament id>_<match id>`.
fn history_id(tournament: &Tournament, match_id: &str) -> String {
    match &tournament.id {
        Some(id) => format!("{}_{}", id, match_id),
        None => match_id.to_owned(),
    }
}

fn read_teams() -> Result<Vec<String>, Error> {
    println!("Enter one team per line, finish with an empty line.");

    let mut teams = Vec::new();
    loop {
        let prompt = format!("Team {}", teams.len() + 1);
        match Prompt::new(&prompt).read_line()? {
            Some(team) if !team.trim().is_empty() => teams.push(team),
            _ => return Ok(teams),
        }
    }
}

fn print_bracket(tournament: &Tournament) {
    println!("{} | {} | {}", tournament.name, tournament.sport, tournament.status);

    for round in tournament.bracket.rounds() {
        println!("{}", round.name);

        for bracket_match in &round.matches {
            println!("  {}", describe(bracket_match));
        }
    }

    if let Some(champion) = tournament.champion() {
        println!("Champion: {}", champion);
    } else if let Some(next) = tournament.next_match() {
        println!("Next match: {}", next.id);
    }
}

fn describe(bracket_match: &BracketMatch<String>) -> String {
    let [a, b] = &bracket_match.entrants;
    let mut line = format!("{}: {} vs {}", bracket_match.id, a.label(), b.label());

    if let Some([score_a, score_b]) = bracket_match.score {
        line.push_str(&format!(" ({} - {})", score_a, score_b));
    }

    if bracket_match.is_bye() {
        line.push_str(" [bye]");
    } else if let Some(winner) = bracket_match.winner_entrant() {
        line.push_str(&format!(" -> {}", winner));
    }

    line
}

#[cfg(test)]
mod tests {
    use scorekeeper_core::{Sport, Tournament, TournamentId};
    use scorekeeper_store::{MemoryStore, Store};

    use super::{describe, history_id, Command};
    use crate::Error;

    #[test]
    fn test_tournament_commands() {
        let store = Store::new(MemoryStore::new());

        Command::Create {
            name: Some(String::from("Cup")),
            sport: Some(Sport::TableTennis),
            teams: vec![String::from("A"), String::from("B"), String::from("C")],
        }
        .run(&store)
        .unwrap();

        let tournament = store.tournaments().list().unwrap().remove(0);
        let id = tournament.id.clone().unwrap().0;

        Command::Record {
            id: id.clone(),
            match_id: String::from("match-0"),
            score_a: 3,
            score_b: 1,
        }
        .run(&store)
        .unwrap();

        let tournament = store.tournaments().list().unwrap().remove(0);
        assert_eq!(tournament.next_match().unwrap().id, "match-2");

        Command::Reset {
            id: id.clone(),
            match_id: String::from("match-0"),
        }
        .run(&store)
        .unwrap();
        assert!(store.tournaments().list().unwrap()[0]
            .bracket
            .find("match-0")
            .unwrap()
            .winner
            .is_none());

        assert!(matches!(
            Command::Show {
                id: String::from("tournament_0_missing")
            }
            .run(&store),
            Err(Error::UnknownTournament(_))
        ));

        Command::Delete { id }.run(&store).unwrap();
        assert!(store.tournaments().list().unwrap().is_empty());
    }

    #[test]
    fn test_history_id() {
        let mut tournament = Tournament::new("Cup", Sport::Boxing, ["A", "B"]).unwrap();
        assert_eq!(history_id(&tournament, "match-0"), "match-0");

        tournament.id = Some(TournamentId::new(1714586400000, "k3j9x0a"));
        assert_eq!(
            history_id(&tournament, "match-0"),
            "tournament_1714586400000_k3j9x0a_match-0"
        );
    }

    #[test]
    fn test_describe() {
        let mut tournament = Tournament::new("Cup", Sport::Badminton, ["A", "B", "C"]).unwrap();

        let bye = tournament.bracket.find("match-1").unwrap();
        assert_eq!(describe(bye), "match-1: C vs BYE [bye]");

        tournament.record_result("match-0", [2, 1]).unwrap();
        let played = tournament.bracket.find("match-0").unwrap();
        assert_eq!(describe(played), "match-0: A vs B (2 - 1) -> A");
    }
}
