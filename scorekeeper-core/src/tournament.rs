use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};

use crate::bracket::{Bracket, BracketMatch};
use crate::sport::Sport;
use crate::{Error, Result, Side};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The maximum number of teams in a [`Tournament`].
pub const MAX_TEAMS: usize = 32;

/// The id of a stored [`Tournament`] in the form `tournament_<millis>_<suffix>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TournamentId(pub String);

impl TournamentId {
    pub fn new(millis: i64, suffix: &str) -> Self {
        Self(format!("tournament_{}_{}", millis, suffix))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TournamentId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TournamentId {
    #[inline]
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TournamentStatus {
    /// No match was played yet.
    Upcoming,
    Ongoing,
    /// The final was decided.
    Completed,
}

impl Display for TournamentStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Upcoming => "upcoming",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
        })
    }
}

/// A single elimination tournament of a [`Sport`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tournament {
    /// Assigned once the tournament is stored.
    pub id: Option<TournamentId>,
    pub name: String,
    pub sport: Sport,
    pub teams: Vec<String>,
    pub status: TournamentStatus,
    pub start_date: DateTime<Utc>,
    pub bracket: Bracket<String>,
}

impl Tournament {
    /// Creates a new `Tournament` starting now. The name and all team names are trimmed.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the name or a team name is empty, or if there are less than 2 or
    /// more than [`MAX_TEAMS`] teams.
    pub fn new<I, S>(name: &str, sport: Sport, teams: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }

        let teams = teams
            .into_iter()
            .enumerate()
            .map(|(index, team)| match team.as_ref().trim() {
                "" => Err(Error::EmptyTeamName { index }),
                team => Ok(team.to_owned()),
            })
            .collect::<Result<Vec<_>>>()?;

        if teams.len() > MAX_TEAMS {
            return Err(Error::TooManyTeams {
                max: MAX_TEAMS,
                found: teams.len(),
            });
        }

        let bracket = Bracket::generate(teams.iter().cloned())?;

        log::debug!(
            "Created tournament {:?} ({}) with {} teams",
            name,
            sport,
            teams.len()
        );

        Ok(Self {
            id: None,
            name: name.to_owned(),
            sport,
            teams,
            status: TournamentStatus::Upcoming,
            start_date: Utc::now(),
            bracket,
        })
    }

    /// Records the score of a played match.
    ///
    /// # Errors
    ///
    /// See [`Bracket::record_result`].
    pub fn record_result(&mut self, match_id: &str, score: [u32; 2]) -> Result<()> {
        self.bracket.record_result(match_id, score)?;
        self.update_status();
        Ok(())
    }

    /// Decides a match without a score.
    ///
    /// # Errors
    ///
    /// See [`Bracket::advance_winner`].
    pub fn advance_winner(&mut self, match_id: &str, winner: Side) -> Result<()> {
        self.bracket.advance_winner(match_id, winner)?;
        self.update_status();
        Ok(())
    }

    /// # Errors
    ///
    /// See [`Bracket::reset_match`].
    pub fn reset_match(&mut self, match_id: &str) -> Result<()> {
        self.bracket.reset_match(match_id)?;
        self.update_status();
        Ok(())
    }

    /// Returns the next match to be played.
    #[inline]
    pub fn next_match(&self) -> Option<&BracketMatch<String>> {
        self.bracket.next_ready()
    }

    #[inline]
    pub fn champion(&self) -> Option<&str> {
        self.bracket.champion().map(String::as_str)
    }

    fn update_status(&mut self) {
        let status = if self.bracket.is_complete() {
            TournamentStatus::Completed
        } else if self
            .bracket
            .matches()
            .any(|r#match| r#match.is_complete() && !r#match.is_bye())
        {
            TournamentStatus::Ongoing
        } else {
            TournamentStatus::Upcoming
        };

        if status != self.status {
            log::debug!("Tournament {:?} is now {}", self.name, status);
            self.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Tournament, TournamentId, TournamentStatus, MAX_TEAMS};
    use crate::{Error, Side, Sport};

    #[test]
    fn test_tournament_new() {
        let tournament =
            Tournament::new("  Summer Cup ", Sport::Volleyball, [" Eagles", "Hawks", "Owls"])
                .unwrap();

        assert_eq!(tournament.name, "Summer Cup");
        assert_eq!(tournament.teams, ["Eagles", "Hawks", "Owls"]);
        assert_eq!(tournament.status, TournamentStatus::Upcoming);
        assert_eq!(tournament.id, None);
        assert_eq!(tournament.bracket.rounds().len(), 2);
        assert_eq!(
            tournament.next_match().map(|m| m.id.as_str()),
            Some("match-0")
        );
    }

    #[test]
    fn test_tournament_validation() {
        assert_eq!(
            Tournament::new(" ", Sport::Boxing, ["A", "B"]),
            Err(Error::EmptyName)
        );
        assert_eq!(
            Tournament::new("Cup", Sport::Boxing, ["A"]),
            Err(Error::NotEnoughTeams { found: 1 })
        );
        assert_eq!(
            Tournament::new("Cup", Sport::Boxing, ["A", "  ", "C"]),
            Err(Error::EmptyTeamName { index: 1 })
        );

        let teams: Vec<_> = (0..=MAX_TEAMS).map(|i| format!("Team {}", i)).collect();
        assert_eq!(
            Tournament::new("Cup", Sport::Boxing, &teams),
            Err(Error::TooManyTeams {
                max: MAX_TEAMS,
                found: MAX_TEAMS + 1
            })
        );
        assert!(Tournament::new("Cup", Sport::Boxing, &teams[..MAX_TEAMS]).is_ok());
    }

    #[test]
    fn test_tournament_status() {
        let mut tournament =
            Tournament::new("Cup", Sport::Badminton, ["A", "B", "C", "D", "E"]).unwrap();

        // The bye of "E" does not start the tournament.
        assert_eq!(tournament.status, TournamentStatus::Upcoming);

        tournament.record_result("match-0", [2, 1]).unwrap();
        assert_eq!(tournament.status, TournamentStatus::Ongoing);

        tournament.reset_match("match-0").unwrap();
        assert_eq!(tournament.status, TournamentStatus::Upcoming);

        tournament.record_result("match-0", [2, 0]).unwrap();
        tournament.record_result("match-1", [0, 2]).unwrap();
        tournament.advance_winner("match-3", Side::B).unwrap();
        assert_eq!(tournament.status, TournamentStatus::Ongoing);

        let final_match = tournament.next_match().unwrap();
        assert_eq!(final_match.id, "match-5");
        assert_eq!(final_match.entrants[1].label(), "E");

        tournament.record_result("match-5", [1, 2]).unwrap();
        assert_eq!(tournament.status, TournamentStatus::Completed);
        assert_eq!(tournament.champion(), Some("E"));
    }

    #[test]
    fn test_tournament_id() {
        let id = TournamentId::new(1714586400000, "k3j9x0a");
        assert_eq!(id.as_str(), "tournament_1714586400000_k3j9x0a");
        assert_eq!(id.to_string(), id.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_tournament_status_serde() {
        use serde_test::{assert_tokens, Token};

        assert_tokens(
            &TournamentStatus::Ongoing,
            &[Token::UnitVariant {
                name: "TournamentStatus",
                variant: "ongoing",
            }],
        );
    }
}
