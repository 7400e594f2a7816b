//! The rules policy of a [`Sport`].
//!
//! A single [`ScoringEngine`] drives every sport. Everything that differs between two sports is
//! expressed as data in [`Rules`].
//!
//! [`ScoringEngine`]: crate::ScoringEngine
use crate::options::{Error, MatchOptionValues, MatchOptions};
use crate::sport::Sport;
use crate::Side;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The minimum lead required to win a period of a rally sport.
pub const RALLY_WIN_MARGIN: u32 = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rules {
    pub sport: Sport,
    /// The score a side must reach to win a period. `None` for sports whose periods end on the
    /// clock.
    pub period_target: Option<u32>,
    /// The lead required in addition to `period_target`.
    pub win_margin: u32,
    /// The match format in periods. For clock sports this is equal to `periods`.
    pub best_of: u32,
    /// The maximum number of periods in a match.
    pub periods: u32,
    pub serve: ServeRule,
    pub side_switch: SideSwitchRule,
    pub clock: Option<ClockRules>,
    /// Timeouts available to each side.
    pub timeouts: u32,
    /// Whether `timeouts` are granted again at the start of every period.
    pub timeouts_reset_per_period: bool,
    /// Whether the score starts at zero (or `round_score_default`) every period. Sports that do
    /// not reset keep a cumulative score.
    pub scores_reset_per_period: bool,
    /// Team fouls go back to zero once they reach this count.
    pub foul_rollover: Option<u32>,
    /// Every n-th warning of a side applies a point deduction.
    pub warnings_per_deduction: Option<u32>,
    /// The score each side starts a period with, e.g. the 10 of the 10-point must system.
    pub round_score_default: Option<u32>,
    pub extras: Extras,
}

/// Who serves after a rally.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ServeRule {
    /// The sport has no serve.
    None,
    /// The side winning a rally serves next.
    RallyWinner,
    /// The serve changes after every `serves` points, and after every point once both sides
    /// are one point short of the target.
    Alternating { serves: u32 },
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SideSwitchRule {
    /// Sides are switched after every period.
    pub between_periods: bool,
    /// Sides are switched in the deciding period once either side reaches this score.
    pub deciding_period_at: Option<u32>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClockRules {
    /// The length of a period in seconds.
    pub period_length: u32,
    /// The length of the break between two periods in seconds. The next period starts
    /// automatically once a break clock expires. `None` if breaks are not timed.
    pub break_length: Option<u32>,
}

/// The auxiliary operations accepted by a sport.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Extras {
    pub timeouts: bool,
    pub fouls: bool,
    pub faults: bool,
    pub cards: bool,
    pub possession: bool,
    pub knockdowns: bool,
    pub warnings: bool,
    pub round_scores: bool,
}

impl Rules {
    /// Returns the options accepted by `sport`, including their defaults.
    pub fn options(sport: Sport) -> MatchOptions {
        let builder = MatchOptions::builder();

        match sport {
            Sport::Basketball => builder
                .option("quarters", "Number of quarters", 4_u64)
                .option("quarter_length", "Quarter length (seconds)", 600_u64)
                .option("timeouts", "Timeouts per game", 5_u64),
            Sport::Football => builder
                .option("half_length", "Half length (seconds)", 2700_u64)
                .option("timeouts_per_half", "Timeouts per half", 3_u64),
            Sport::Boxing => builder
                .option("rounds", "Number of rounds", 12_u64)
                .option("round_length", "Round length (seconds)", 180_u64)
                .option("break_length", "Break length (seconds)", 60_u64),
            Sport::Volleyball => builder
                .option("sets_to_win", "Sets to win", 3_u64)
                .option("points_per_set", "Points per set", 25_u64)
                .option("timeouts_per_set", "Timeouts per set", 2_u64),
            Sport::Badminton => builder
                .option("points_to_win", "Points to win a game", 21_u64)
                .option("best_of", "Best of (games)", 3_u64)
                .option("timeouts_per_game", "Timeouts per game", 1_u64),
            Sport::TableTennis => builder
                .option("points_to_win", "Points to win a game", 11_u64)
                .option("best_of", "Best of (games)", 5_u64)
                .option("timeouts_per_game", "Timeouts per game", 1_u64)
                .option(
                    "switch_sides_at",
                    "Switch sides in the deciding game at",
                    11_u64,
                ),
            Sport::SepakTakraw => builder
                .option("points_per_set", "Points per set", 21_u64)
                .option("best_of", "Best of (sets)", 3_u64)
                .option("timeouts_per_set", "Timeouts per set", 2_u64),
        }
        .build()
    }

    /// Returns the rules of `sport` with all options at their defaults.
    pub fn for_sport(sport: Sport) -> Self {
        let values = MatchOptionValues::from(Self::options(sport));

        match Self::from_values(sport, &values) {
            Ok(rules) => rules,
            // The defaults are always valid.
            Err(_) => unreachable!(),
        }
    }

    /// Returns the rules of `sport` configured with `values`. Unset options take their default.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if `values` contains a key not accepted by `sport`, a value of the
    /// wrong type, or zero for a count that must be positive.
    pub fn with_options(sport: Sport, values: MatchOptionValues) -> Result<Self, Error> {
        let values = values.merge(Self::options(sport))?;
        Self::from_values(sport, &values)
    }

    fn from_values(sport: Sport, values: &MatchOptionValues) -> Result<Self, Error> {
        let rules = match sport {
            Sport::Basketball => {
                let quarters = values.get_positive("quarters")?;

                Self {
                    best_of: quarters,
                    periods: quarters,
                    clock: Some(ClockRules {
                        period_length: values.get_positive("quarter_length")?,
                        break_length: None,
                    }),
                    timeouts: values.get_u32("timeouts")?,
                    foul_rollover: Some(7),
                    extras: Extras {
                        timeouts: true,
                        fouls: true,
                        ..Default::default()
                    },
                    ..Self::clock_sport(sport)
                }
            }
            Sport::Football => Self {
                best_of: 2,
                periods: 2,
                clock: Some(ClockRules {
                    period_length: values.get_positive("half_length")?,
                    break_length: None,
                }),
                timeouts: values.get_u32("timeouts_per_half")?,
                timeouts_reset_per_period: true,
                extras: Extras {
                    timeouts: true,
                    cards: true,
                    possession: true,
                    ..Default::default()
                },
                ..Self::clock_sport(sport)
            },
            Sport::Boxing => {
                let rounds = values.get_positive("rounds")?;

                Self {
                    best_of: rounds,
                    periods: rounds,
                    clock: Some(ClockRules {
                        period_length: values.get_positive("round_length")?,
                        break_length: Some(values.get_positive("break_length")?),
                    }),
                    scores_reset_per_period: true,
                    warnings_per_deduction: Some(3),
                    round_score_default: Some(10),
                    extras: Extras {
                        knockdowns: true,
                        warnings: true,
                        round_scores: true,
                        ..Default::default()
                    },
                    ..Self::clock_sport(sport)
                }
            }
            Sport::Volleyball => {
                let sets_to_win = values.get_positive("sets_to_win")?;

                Self {
                    timeouts: values.get_u32("timeouts_per_set")?,
                    serve: ServeRule::RallyWinner,
                    ..Self::rally_sport(
                        sport,
                        values.get_positive("points_per_set")?,
                        sets_to_win.saturating_mul(2) - 1,
                    )
                }
            }
            Sport::Badminton => {
                let target = values.get_positive("points_to_win")?;

                Self {
                    timeouts: values.get_u32("timeouts_per_game")?,
                    serve: ServeRule::RallyWinner,
                    side_switch: SideSwitchRule {
                        between_periods: false,
                        deciding_period_at: Some(target.div_ceil(2)),
                    },
                    ..Self::rally_sport(sport, target, values.get_positive("best_of")?)
                }
            }
            Sport::TableTennis => Self {
                timeouts: values.get_u32("timeouts_per_game")?,
                serve: ServeRule::Alternating { serves: 2 },
                side_switch: SideSwitchRule {
                    between_periods: true,
                    deciding_period_at: Some(values.get_positive("switch_sides_at")?),
                },
                ..Self::rally_sport(
                    sport,
                    values.get_positive("points_to_win")?,
                    values.get_positive("best_of")?,
                )
            },
            Sport::SepakTakraw => Self {
                timeouts: values.get_u32("timeouts_per_set")?,
                serve: ServeRule::RallyWinner,
                extras: Extras {
                    timeouts: true,
                    faults: true,
                    ..Default::default()
                },
                ..Self::rally_sport(
                    sport,
                    values.get_positive("points_per_set")?,
                    values.get_positive("best_of")?,
                )
            },
        };

        Ok(rules)
    }

    fn rally_sport(sport: Sport, target: u32, best_of: u32) -> Self {
        Self {
            sport,
            period_target: Some(target),
            win_margin: RALLY_WIN_MARGIN,
            best_of,
            periods: best_of,
            serve: ServeRule::None,
            side_switch: SideSwitchRule::default(),
            clock: None,
            timeouts: 0,
            timeouts_reset_per_period: true,
            scores_reset_per_period: true,
            foul_rollover: None,
            warnings_per_deduction: None,
            round_score_default: None,
            extras: Extras {
                timeouts: true,
                ..Default::default()
            },
        }
    }

    fn clock_sport(sport: Sport) -> Self {
        Self {
            sport,
            period_target: None,
            win_margin: 0,
            best_of: 1,
            periods: 1,
            serve: ServeRule::None,
            side_switch: SideSwitchRule::default(),
            clock: None,
            timeouts: 0,
            timeouts_reset_per_period: false,
            scores_reset_per_period: false,
            foul_rollover: None,
            warnings_per_deduction: None,
            round_score_default: None,
            extras: Extras::default(),
        }
    }

    /// Returns the number of periods required to win the match, `ceil(best_of / 2)`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use scorekeeper_core::{Rules, Sport};
    /// assert_eq!(Rules::for_sport(Sport::Volleyball).majority(), 3);
    /// assert_eq!(Rules::for_sport(Sport::Badminton).majority(), 2);
    /// ```
    #[inline]
    pub fn majority(&self) -> u32 {
        self.best_of.div_ceil(2)
    }

    /// Returns `true` if periods end on the clock rather than on a point target.
    #[inline]
    pub fn is_clock_based(&self) -> bool {
        self.period_target.is_none()
    }

    /// Returns the score both sides start a period with.
    #[inline]
    pub fn starting_score(&self) -> u32 {
        self.round_score_default.unwrap_or(0)
    }

    /// Returns the winner of a period with the current `score`, or `None` if the period is not
    /// decided yet. Clock sports never decide a period on the score.
    pub fn period_winner(&self, score: [u32; 2]) -> Option<Side> {
        let target = self.period_target?;

        let [a, b] = score;
        let has_reached_target = a >= target || b >= target;
        let win_by_margin = a.abs_diff(b) >= self.win_margin;

        if has_reached_target && win_by_margin {
            Some(if a > b { Side::A } else { Side::B })
        } else {
            None
        }
    }

    /// Returns the side serving first in `period`: side A in odd periods, side B in even ones.
    #[inline]
    pub fn first_server(&self, period: u32) -> Option<Side> {
        match self.serve {
            ServeRule::None => None,
            _ if period % 2 == 1 => Some(Side::A),
            _ => Some(Side::B),
        }
    }

    /// Returns the server after `points` have been played in a period with
    /// [`ServeRule::Alternating`] rules, together with the number of serves left for that server.
    ///
    /// Returns `None` for all other serve rules.
    pub fn alternating_server(&self, period: u32, points: u32) -> Option<(Side, u32)> {
        let serves = match self.serve {
            ServeRule::Alternating { serves } => serves.max(1),
            _ => return None,
        };

        let first = self.first_server(period)?;
        // Past this many points both sides are at deuce and the serve changes every point.
        let deuce = self
            .period_target
            .unwrap_or(0)
            .saturating_sub(1)
            .saturating_mul(2);

        let (switches, left) = if points < deuce {
            (points / serves, serves - points % serves)
        } else {
            (deuce / serves + (points - deuce), 1)
        };

        let server = if switches % 2 == 0 {
            first
        } else {
            first.opponent()
        };

        Some((server, left))
    }

    /// Returns `true` if `period` is the last period that can be played given `period_wins`.
    pub fn is_deciding_period(&self, period_wins: [u32; 2]) -> bool {
        let needed = self.majority().saturating_sub(1);
        !self.is_clock_based() && period_wins == [needed, needed]
    }
}
