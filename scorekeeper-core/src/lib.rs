//! # scorekeeper-core
//!
//! This crate contains the scoring logic for seven sports and a single elimination bracket
//! generator. It performs no I/O; persisting a [`MatchResult`] or a [`Tournament`] is left to the
//! caller.
//!
//! Important types:
//! - [`ScoringEngine`]: A single state machine driving a match of any [`Sport`]. The per-sport
//! differences live in a [`Rules`] policy.
//! - [`Rules`]: The rules policy of a sport. Built from the sport defaults or from
//! [`MatchOptionValues`].
//! - [`EventLog`]: The append-only log of everything that happened in a match.
//! - [`MatchResult`]: The immutable record produced once a match is confirmed.
//! - [`Bracket`]: A single elimination bracket derived from an ordered list of teams.
//! - [`EntrantSpot`]: A *spot* within a bracket match, which can contain an entrant, be
//! permanently empty (a bye) or contain a to-be-done spot.
//!
//! ## Feature Flags
//!
//! `serde`: Adds `Serialize` and `Deserialize` impls to almost all types.
//!
pub mod bracket;
pub mod clock;
pub mod engine;
pub mod event;
pub mod options;
pub mod result;
pub mod rules;
pub mod sport;
pub mod tournament;

pub use bracket::{Bracket, BracketMatch, Round};
pub use clock::Clock;
pub use engine::{MatchState, Outcome, Rejected, ScoringEngine, Transition};
pub use event::{CardColor, EventKind, EventLog, FaultKind, ScoreEvent};
pub use options::{MatchOptionValues, MatchOptions, OptionValue};
pub use result::{MatchResult, MatchStats, PeriodResult};
pub use rules::Rules;
pub use sport::Sport;
pub use tournament::{Tournament, TournamentId, TournamentStatus};

use thiserror::Error;

use std::ops::{Index, IndexMut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the two sides of a match.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    /// Returns the index of the side within a pair, `0` for [`A`] and `1` for [`B`].
    ///
    /// [`A`]: Self::A
    /// [`B`]: Self::B
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }

    /// Returns the other side.
    ///
    /// # Examples
    ///
    /// ```
    /// # use scorekeeper_core::Side;
    /// assert_eq!(Side::A.opponent(), Side::B);
    /// ```
    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// Creates a `Side` from a pair index. Returns `None` if `index` is not `0` or `1`.
    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::A),
            1 => Some(Self::B),
            _ => None,
        }
    }
}

/// A value for each [`Side`] of a match.
///
/// This is a wrapper around a `[T; 2]` and has the same layout as a `[T; 2]`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Pair<T> {
    values: [T; 2],
}

impl<T> Pair<T> {
    #[inline]
    pub fn new(a: T, b: T) -> Self {
        Self { values: [a, b] }
    }

    /// Returns the underlying array.
    #[inline]
    pub fn into_inner(self) -> [T; 2] {
        self.values
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    /// Maps `Pair<T>` to `Pair<U>` by applying `f` on both values.
    pub fn map<U, F>(self, f: F) -> Pair<U>
    where
        F: FnMut(T) -> U,
    {
        Pair {
            values: self.values.map(f),
        }
    }
}

impl<T> Pair<T>
where
    T: Copy,
{
    #[inline]
    pub fn to_array(&self) -> [T; 2] {
        self.values
    }
}

impl<T> Index<Side> for Pair<T> {
    type Output = T;

    #[inline]
    fn index(&self, side: Side) -> &Self::Output {
        &self.values[side.index()]
    }
}

impl<T> IndexMut<Side> for Pair<T> {
    #[inline]
    fn index_mut(&mut self, side: Side) -> &mut Self::Output {
        &mut self.values[side.index()]
    }
}

impl<T> From<[T; 2]> for Pair<T> {
    #[inline]
    fn from(values: [T; 2]) -> Self {
        Self { values }
    }
}

impl<T> PartialEq<[T; 2]> for Pair<T>
where
    T: PartialEq,
{
    #[inline]
    fn eq(&self, other: &[T; 2]) -> bool {
        self.values == *other
    }
}

/// A spot for an Entrant in the bracket.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EntrantSpot<T> {
    Entrant(T),
    /// No entrant will ever occupy this spot. The match is a bye.
    Empty,
    /// The entrant is decided by a match that has not been played yet.
    TBD,
}

impl<T> EntrantSpot<T> {
    /// Returns `true` if the `EntrantSpot` is [`Entrant`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use scorekeeper_core::EntrantSpot;
    /// let spot = EntrantSpot::Entrant(());
    /// assert!(spot.is_entrant());
    /// ```
    /// [`Entrant`]: Self::Entrant
    pub fn is_entrant(&self) -> bool {
        matches!(self, Self::Entrant(_))
    }

    /// Returns `true` if the `EntrantSpot` is [`Empty`].
    ///
    /// [`Empty`]: Self::Empty
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns `true` if the `EntrantSpot` is [`TBD`].
    ///
    /// [`TBD`]: Self::TBD
    pub fn is_tbd(&self) -> bool {
        matches!(self, Self::TBD)
    }

    /// Converts an `&EntrantSpot<T>` into an `EntrantSpot<&T>`.
    pub fn as_ref(&self) -> EntrantSpot<&T> {
        match *self {
            Self::Entrant(ref entrant) => EntrantSpot::Entrant(entrant),
            Self::Empty => EntrantSpot::Empty,
            Self::TBD => EntrantSpot::TBD,
        }
    }

    /// Returns the entrant, or `None` if the spot is [`Empty`] or [`TBD`].
    ///
    /// [`Empty`]: Self::Empty
    /// [`TBD`]: Self::TBD
    pub fn entrant(&self) -> Option<&T> {
        match self {
            Self::Entrant(entrant) => Some(entrant),
            _ => None,
        }
    }

    /// Maps `EntrantSpot<T>` to `EntrantSpot<U>` by applying `f` on it.
    pub fn map<U, F>(self, f: F) -> EntrantSpot<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Entrant(entrant) => EntrantSpot::Entrant(f(entrant)),
            Self::Empty => EntrantSpot::Empty,
            Self::TBD => EntrantSpot::TBD,
        }
    }
}

impl<T> EntrantSpot<T>
where
    T: AsRef<str>,
{
    /// Returns the label shown for this spot: the entrant name, `"BYE"` or `"TBD"`.
    pub fn label(&self) -> &str {
        match self {
            Self::Entrant(entrant) => entrant.as_ref(),
            Self::Empty => "BYE",
            Self::TBD => "TBD",
        }
    }
}

/// An `Result<T>` using [`enum@Error`] as an error type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("at least 2 teams are required, found {found}")]
    NotEnoughTeams { found: usize },
    #[error("too many teams: at most {max} are allowed, found {found}")]
    TooManyTeams { max: usize, found: usize },
    #[error("the tournament name must not be empty")]
    EmptyName,
    #[error("the name of team {index} must not be empty")]
    EmptyTeamName { index: usize },
    #[error("unknown match: {0}")]
    UnknownMatch(String),
    #[error("match {0} is not ready: both sides must be decided")]
    MatchNotReady(String),
    #[error("match {0} is already complete")]
    MatchComplete(String),
    #[error("match {0} cannot end in a draw")]
    Draw(String),
}
