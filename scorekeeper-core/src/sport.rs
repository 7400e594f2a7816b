use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The sports supported by the [`ScoringEngine`].
///
/// [`ScoringEngine`]: crate::ScoringEngine
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Sport {
    Basketball,
    Volleyball,
    Football,
    Badminton,
    Boxing,
    TableTennis,
    SepakTakraw,
}

impl Sport {
    pub const ALL: [Sport; 7] = [
        Sport::Basketball,
        Sport::Volleyball,
        Sport::Football,
        Sport::Badminton,
        Sport::Boxing,
        Sport::TableTennis,
        Sport::SepakTakraw,
    ];

    /// Returns the storage key of the sport, e.g. `table-tennis`.
    pub fn key(self) -> &'static str {
        match self {
            Self::Basketball => "basketball",
            Self::Volleyball => "volleyball",
            Self::Football => "football",
            Self::Badminton => "badminton",
            Self::Boxing => "boxing",
            Self::TableTennis => "table-tennis",
            Self::SepakTakraw => "sepak-takraw",
        }
    }

    /// Returns `true` if periods of this sport are won by reaching a point target (with a
    /// margin) rather than ending on the clock.
    pub fn is_rally(self) -> bool {
        matches!(
            self,
            Self::Volleyball | Self::Badminton | Self::TableTennis | Self::SepakTakraw
        )
    }

    /// Returns the name of a single period, e.g. `Set` or `Quarter`.
    pub fn period_name(self) -> &'static str {
        match self {
            Self::Basketball => "Quarter",
            Self::Football => "Half",
            Self::Boxing => "Round",
            Self::Badminton | Self::TableTennis => "Game",
            Self::Volleyball | Self::SepakTakraw => "Set",
        }
    }
}

impl Display for Sport {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Basketball => "Basketball",
            Self::Volleyball => "Volleyball",
            Self::Football => "Football",
            Self::Badminton => "Badminton",
            Self::Boxing => "Boxing",
            Self::TableTennis => "Table Tennis",
            Self::SepakTakraw => "Sepak Takraw",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown sport: {0}")]
pub struct UnknownSport(pub String);

impl FromStr for Sport {
    type Err = UnknownSport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace([' ', '_'], "-");

        Self::ALL
            .into_iter()
            .find(|sport| sport.key() == key)
            .ok_or_else(|| UnknownSport(s.to_owned()))
    }
}
