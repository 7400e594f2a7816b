//! # Single elimination bracket
//!
//! A [`Bracket`] is derived from an ordered list of entrants without any seeding: the first round
//! pairs entrants by consecutive index and an odd last entrant receives a bye. Every following
//! round has `ceil(n / 2)` matches where `n` is the number of matches in the previous round.
//!
//! The winner of match `i` moves into spot `i % 2` of match `i / 2` of the next round. The last
//! match of a round with an odd number of matches has no partner, its successor is a bye.
use crate::{EntrantSpot, Error, Result, Side};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bracket<T> {
    rounds: Vec<Round<T>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Round<T> {
    pub name: String,
    pub matches: Vec<BracketMatch<T>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BracketMatch<T> {
    pub id: String,
    pub entrants: [EntrantSpot<T>; 2],
    /// The recorded score. `None` for byes and matches decided without a score.
    pub score: Option<[u32; 2]>,
    pub winner: Option<Side>,
}

impl<T> BracketMatch<T> {
    fn new(id: usize, entrants: [EntrantSpot<T>; 2]) -> Self {
        Self {
            id: format!("match-{}", id),
            entrants,
            score: None,
            winner: None,
        }
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.winner.is_some()
    }

    /// Returns `true` if one side of the match will never be occupied.
    pub fn is_bye(&self) -> bool {
        self.entrants.iter().any(EntrantSpot::is_empty)
    }

    /// Returns `true` if both entrants are known and the match was not played yet.
    pub fn is_ready(&self) -> bool {
        !self.is_complete() && self.entrants.iter().all(EntrantSpot::is_entrant)
    }

    /// Returns the winning entrant.
    pub fn winner_entrant(&self) -> Option<&T> {
        self.winner.and_then(|side| self.entrants[side.index()].entrant())
    }

    /// Completes the match if it is a bye with a known entrant. Returns `true` if the match
    /// was completed.
    fn complete_bye(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }

        let winner = match &self.entrants {
            [EntrantSpot::Entrant(_), EntrantSpot::Empty] => Side::A,
            [EntrantSpot::Empty, EntrantSpot::Entrant(_)] => Side::B,
            _ => return false,
        };

        self.winner = Some(winner);
        true
    }

    fn clear(&mut self) {
        self.score = None;
        self.winner = None;
    }
}

impl<T> Bracket<T>
where
    T: Clone,
{
    /// Generates a new bracket from `entrants`, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotEnoughTeams`] if `entrants` has less than two entrants.
    pub fn generate<I>(entrants: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let entrants: Vec<T> = entrants.into_iter().collect();

        if entrants.len() < 2 {
            return Err(Error::NotEnoughTeams {
                found: entrants.len(),
            });
        }

        log::debug!("Creating new bracket with {} entrants", entrants.len());

        let mut entrants = entrants.into_iter();
        let mut first_round = Vec::new();

        while let Some(first) = entrants.next() {
            let second = match entrants.next() {
                Some(second) => EntrantSpot::Entrant(second),
                None => EntrantSpot::Empty,
            };

            first_round.push(BracketMatch::new(
                first_round.len(),
                [EntrantSpot::Entrant(first), second],
            ));
        }

        let mut next_id = first_round.len();
        let mut rounds = vec![first_round];

        while let Some(previous) = rounds.last().map(Vec::len).filter(|len| *len > 1) {
            let matches = (0..previous.div_ceil(2))
                .map(|index| {
                    let second = if 2 * index + 1 < previous {
                        EntrantSpot::TBD
                    } else {
                        EntrantSpot::Empty
                    };

                    let r#match = BracketMatch::new(next_id, [EntrantSpot::TBD, second]);
                    next_id += 1;
                    r#match
                })
                .collect();

            rounds.push(matches);
        }

        let num_rounds = rounds.len();
        let rounds = rounds
            .into_iter()
            .enumerate()
            .map(|(index, matches)| Round {
                name: round_name(index, num_rounds),
                matches,
            })
            .collect();

        let mut bracket = Self { rounds };

        for index in 0..bracket.rounds[0].matches.len() {
            if bracket.rounds[0].matches[index].complete_bye() {
                bracket.propagate(0, index);
            }
        }

        log::debug!(
            "Created new bracket with {} rounds and {} matches",
            bracket.rounds.len(),
            next_id
        );

        Ok(bracket)
    }

    /// Moves the winner of `match_id` into the next round.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the match does not exist, is already complete or one of its
    /// entrants is not decided yet.
    pub fn advance_winner(&mut self, match_id: &str, winner: Side) -> Result<()> {
        self.decide(match_id, winner, None)
    }

    /// Records the final score of `match_id` and moves its winner into the next round.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Draw`] for a drawn score, and the errors of [`advance_winner`] otherwise.
    ///
    /// [`advance_winner`]: Self::advance_winner
    pub fn record_result(&mut self, match_id: &str, score: [u32; 2]) -> Result<()> {
        let winner = match score[0].cmp(&score[1]) {
            std::cmp::Ordering::Greater => Side::A,
            std::cmp::Ordering::Less => Side::B,
            std::cmp::Ordering::Equal => return Err(Error::Draw(match_id.to_owned())),
        };

        self.decide(match_id, winner, Some(score))
    }

    /// Clears the result of `match_id`. Every spot the match decided further up the bracket
    /// becomes [`TBD`] again, and the matches depending on it are cleared too.
    ///
    /// Resetting a bye has no effect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMatch`] if the match does not exist.
    ///
    /// [`TBD`]: EntrantSpot::TBD
    pub fn reset_match(&mut self, match_id: &str) -> Result<()> {
        let (mut round, mut index) = self.position(match_id)?;

        if self.rounds[round].matches[index].is_bye() {
            return Ok(());
        }

        log::debug!("Resetting match {}", match_id);

        self.rounds[round].matches[index].clear();

        while let Some(next) = self.rounds.get_mut(round + 1) {
            let r#match = &mut next.matches[index / 2];
            r#match.entrants[index % 2] = EntrantSpot::TBD;
            r#match.clear();

            round += 1;
            index /= 2;
        }

        Ok(())
    }

    /// Returns the winner of the final.
    pub fn champion(&self) -> Option<&T> {
        self.final_match().and_then(BracketMatch::winner_entrant)
    }

    /// Returns `true` if the final has been decided.
    pub fn is_complete(&self) -> bool {
        self.final_match().map_or(false, BracketMatch::is_complete)
    }

    /// Returns the match with the given `match_id`.
    pub fn find(&self, match_id: &str) -> Option<&BracketMatch<T>> {
        self.matches().find(|r#match| r#match.id == match_id)
    }

    /// Returns the first match that can be played, in round order.
    pub fn next_ready(&self) -> Option<&BracketMatch<T>> {
        self.matches().find(|r#match| r#match.is_ready())
    }

    #[inline]
    pub fn rounds(&self) -> &[Round<T>] {
        &self.rounds
    }

    /// Returns an iterator over all matches, in round order.
    pub fn matches(&self) -> impl Iterator<Item = &BracketMatch<T>> {
        self.rounds.iter().flat_map(|round| round.matches.iter())
    }

    fn final_match(&self) -> Option<&BracketMatch<T>> {
        self.rounds.last().and_then(|round| round.matches.first())
    }

    fn position(&self, match_id: &str) -> Result<(usize, usize)> {
        self.rounds
            .iter()
            .enumerate()
            .find_map(|(round, r)| {
                r.matches
                    .iter()
                    .position(|r#match| r#match.id == match_id)
                    .map(|index| (round, index))
            })
            .ok_or_else(|| Error::UnknownMatch(match_id.to_owned()))
    }

    fn decide(&mut self, match_id: &str, winner: Side, score: Option<[u32; 2]>) -> Result<()> {
        let (round, index) = self.position(match_id)?;
        let r#match = &mut self.rounds[round].matches[index];

        if r#match.is_complete() {
            return Err(Error::MatchComplete(match_id.to_owned()));
        }

        if !r#match.is_ready() {
            return Err(Error::MatchNotReady(match_id.to_owned()));
        }

        r#match.winner = Some(winner);
        r#match.score = score;

        log::debug!("Match {} won by side {:?}", match_id, winner);

        self.propagate(round, index);
        Ok(())
    }

    /// Moves the winner of the match at `index` of `round` up the bracket, completing every bye
    /// it creates on the way.
    fn propagate(&mut self, mut round: usize, mut index: usize) {
        loop {
            let spot = match self.rounds[round].matches[index].winner_entrant() {
                Some(entrant) => EntrantSpot::Entrant(entrant.clone()),
                None => return,
            };

            let next = match self.rounds.get_mut(round + 1) {
                Some(next) => &mut next.matches[index / 2],
                None => return,
            };

            log::debug!("Moving winner into spot {} of {}", index % 2, next.id);
            next.entrants[index % 2] = spot;

            if !next.complete_bye() {
                return;
            }

            round += 1;
            index /= 2;
        }
    }
}

/// Returns the name of round `index` in a bracket of `num_rounds` rounds.
fn round_name(index: usize, num_rounds: usize) -> String {
    match index {
        _ if index + 1 == num_rounds => String::from("Final"),
        0 => String::from("First Round"),
        _ if index + 2 == num_rounds => String::from("Semi Finals"),
        _ => format!("Round {}", index + 1),
    }
}
