use chrono::{DateTime, Utc};

use crate::engine::ScoringEngine;
use crate::event::EventLog;
use crate::sport::Sport;
use crate::{Pair, Side};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single played period.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PeriodResult {
    pub period: u32,
    /// The score of this period only.
    pub score: [u32; 2],
    /// `None` if the period was drawn, or if a rally period was not finished.
    pub winner: Option<Side>,
}

/// The auxiliary counters of a match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchStats {
    pub timeouts_used: Pair<u32>,
    pub fouls: Pair<u32>,
    pub faults: Pair<u32>,
    pub yellow_cards: Pair<u32>,
    pub red_cards: Pair<u32>,
    pub knockdowns: Pair<u32>,
    pub warnings: Pair<u32>,
    pub deductions: Pair<u32>,
}

/// The immutable record of a confirmed match.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchResult {
    pub id: String,
    pub sport: Sport,
    pub date: DateTime<Utc>,
    pub side_names: [String; 2],
    /// Periods won for rally sports, the cumulative score for clock sports.
    pub final_score: [u32; 2],
    pub period_history: Vec<PeriodResult>,
    pub events: EventLog,
    pub stats: MatchStats,
}

impl MatchResult {
    /// Replaces the generated id, e.g. with the id of a tournament match.
    pub fn with_id<T>(mut self, id: T) -> Self
    where
        T: ToString,
    {
        self.id = id.to_string();
        self
    }

    /// Returns the winning side, or `None` for a draw.
    pub fn winner(&self) -> Option<Side> {
        let [a, b] = self.final_score;

        match a.cmp(&b) {
            std::cmp::Ordering::Greater => Some(Side::A),
            std::cmp::Ordering::Less => Some(Side::B),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Returns the name of the winning side.
    pub fn winner_name(&self) -> Option<&str> {
        self.winner().map(|side| self.side_names[side.index()].as_str())
    }
}

/// Builds the [`MatchResult`] of `engine`. The id is the milliseconds timestamp of `date`.
pub fn assemble(
    engine: &ScoringEngine,
    side_names: [String; 2],
    date: DateTime<Utc>,
) -> MatchResult {
    let period_history = engine.period_history();

    MatchResult {
        id: date.timestamp_millis().to_string(),
        sport: engine.sport(),
        date,
        side_names,
        final_score: derive_final_score(engine.sport(), &period_history),
        period_history,
        events: engine.events().clone(),
        stats: engine.stats().clone(),
    }
}

/// Derives the final score of a match from its periods. Rally sports count the periods won,
/// clock sports add up the scores of all periods.
pub fn derive_final_score(sport: Sport, history: &[PeriodResult]) -> [u32; 2] {
    let mut score = Pair::<u32>::default();

    for row in history {
        if sport.is_rally() {
            if let Some(winner) = row.winner {
                score[winner] += 1;
            }
        } else {
            for side in Side::BOTH {
                score[side] += row.score[side.index()];
            }
        }
    }

    score.into_inner()
}
