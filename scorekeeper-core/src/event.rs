//! The event log of a match.
//!
//! Every accepted operation of the [`ScoringEngine`] appends one [`ScoreEvent`]. The log is
//! archival: the scores of the engine are kept separately and never derived from it. Entries are
//! never edited or removed, an undo is recorded as a compensating [`EventKind::UndoPoint`].
//!
//! [`ScoringEngine`]: crate::ScoringEngine
use std::ops::Deref;

use chrono::{DateTime, Utc};

use crate::Side;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScoreEvent {
    pub kind: EventKind,
    /// The side the event applies to, or `None` for events concerning both sides.
    pub side: Option<Side>,
    pub period: u32,
    /// The score right after the event.
    pub score: [u32; 2],
    pub timestamp: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum EventKind {
    Point { amount: u32 },
    UndoPoint,
    Timeout,
    Foul,
    Fault { fault: FaultKind },
    Card { color: CardColor },
    Warning,
    PointDeduction,
    Knockdown,
    Possession,
    SwitchSides,
    RoundScore,
    PeriodEnd { winner: Option<Side> },
    MatchEnd { winner: Option<Side> },
}

impl EventKind {
    /// Returns the name of the event as shown in a match log.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Point { .. } => "point",
            Self::UndoPoint => "undo point",
            Self::Timeout => "timeout",
            Self::Foul => "foul",
            Self::Fault { fault } => match fault {
                FaultKind::Net => "net fault",
                FaultKind::Foot => "foot fault",
                FaultKind::Service => "service fault",
            },
            Self::Card { color } => match color {
                CardColor::Yellow => "yellow card",
                CardColor::Red => "red card",
            },
            Self::Warning => "warning",
            Self::PointDeduction => "point deduction",
            Self::Knockdown => "knockdown",
            Self::Possession => "possession",
            Self::SwitchSides => "switch sides",
            Self::RoundScore => "round score",
            Self::PeriodEnd { .. } => "period end",
            Self::MatchEnd { .. } => "match end",
        }
    }
}

/// A sepak takraw fault.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FaultKind {
    Net,
    Foot,
    Service,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CardColor {
    Yellow,
    Red,
}

/// An append-only list of [`ScoreEvent`]s in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EventLog {
    events: Vec<ScoreEvent>,
}

impl EventLog {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, event: ScoreEvent) {
        self.events.push(event);
    }

    /// Returns the number of events of `side` for which `f` returns `true`.
    pub fn count<F>(&self, side: Side, mut f: F) -> usize
    where
        F: FnMut(&EventKind) -> bool,
    {
        self.events
            .iter()
            .filter(|event| event.side == Some(side) && f(&event.kind))
            .count()
    }

    #[inline]
    pub fn into_inner(self) -> Vec<ScoreEvent> {
        self.events
    }
}

impl Deref for EventLog {
    type Target = [ScoreEvent];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.events
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a ScoreEvent;
    type IntoIter = std::slice::Iter<'a, ScoreEvent>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl From<Vec<ScoreEvent>> for EventLog {
    #[inline]
    fn from(events: Vec<ScoreEvent>) -> Self {
        Self { events }
    }
}
