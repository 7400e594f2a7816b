//! The scoring state machine.
//!
//! A [`ScoringEngine`] is created for one match with the [`Rules`] of a sport and the names of
//! both sides. Every operation returns an [`Outcome`]: either the [`Transition`] the operation
//! caused, or the reason it was [`Rejected`]. A rejected operation never changes the engine and
//! never appends to the [`EventLog`].
//!
//! ```text
//! InPeriod ──(period won, rally)──────────────> InPeriod (next period)
//! InPeriod ──(end_period / clock, clock sport)─> PeriodBreak ──(resume)──> InPeriod
//! InPeriod | PeriodBreak ──(majority / last period / request_end)──> AwaitingConfirmation
//! AwaitingConfirmation ──(confirm)──> Completed
//! ```
use chrono::Utc;
use thiserror::Error;

use crate::clock::Clock;
use crate::event::{CardColor, EventKind, EventLog, FaultKind, ScoreEvent};
use crate::result::{self, MatchResult, MatchStats, PeriodResult};
use crate::rules::{Rules, ServeRule};
use crate::sport::Sport;
use crate::{Pair, Side};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The result of an operation on a [`ScoringEngine`].
pub type Outcome = Result<Transition, Rejected>;

/// The state change caused by an accepted operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The operation was recorded without changing the period.
    Recorded,
    /// `winner` won `period` and the next period started.
    PeriodWon { period: u32, winner: Side },
    /// `period` ended and the match is in the break before the next period.
    PeriodEnded { period: u32 },
    PeriodStarted { period: u32 },
    /// The match is over and awaits confirmation. `winner` is `None` for a draw.
    MatchDecided { winner: Option<Side> },
    Completed,
}

/// The reason an operation was not applied.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("the score is already at zero")]
    ScoreAtZero,
    #[error("no timeouts left")]
    NoTimeoutsLeft,
    #[error("{sport} does not support {operation}")]
    Unsupported {
        operation: &'static str,
        sport: Sport,
    },
    #[error("the match is over")]
    MatchOver,
    #[error("the match is in a break")]
    InBreak,
    #[error("the match is not in a break")]
    NotInBreak,
    #[error("the match is not awaiting confirmation")]
    NotAwaitingConfirmation,
    #[error("the end of the match was not requested")]
    NotRequested,
    #[error("invalid score")]
    InvalidScore,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MatchState {
    InPeriod,
    /// Between two periods of a clock sport.
    PeriodBreak,
    AwaitingConfirmation,
    Completed,
}

/// The scoring state machine for a single match of any [`Sport`].
#[derive(Clone, Debug)]
pub struct ScoringEngine {
    rules: Rules,
    side_names: Pair<String>,
    state: MatchState,
    period: u32,
    scores: Pair<u32>,
    /// The scores at the start of the current period. Always the starting score for sports
    /// resetting the score every period.
    period_start: Pair<u32>,
    period_wins: Pair<u32>,
    history: Vec<PeriodResult>,
    period_recorded: bool,
    timeouts: Pair<u32>,
    team_fouls: Pair<u32>,
    faults: Pair<u32>,
    stats: MatchStats,
    server: Option<Side>,
    /// The server before each point of the current period, restored by `undo_point`.
    previous_servers: Vec<Option<Side>>,
    possession: Option<Side>,
    pending_switch: bool,
    deciding_switch_done: bool,
    clock: Option<Clock>,
    events: EventLog,
    winner: Option<Side>,
    /// The state before a manual end request, restored by `cancel_end`.
    end_requested_in: Option<MatchState>,
}

impl ScoringEngine {
    /// Creates a new engine in the first period.
    pub fn new(rules: Rules, side_names: [String; 2]) -> Self {
        let start = rules.starting_score();

        Self {
            state: MatchState::InPeriod,
            period: 1,
            scores: Pair::new(start, start),
            period_start: Pair::new(start, start),
            period_wins: Pair::default(),
            history: Vec::new(),
            period_recorded: false,
            timeouts: Pair::new(rules.timeouts, rules.timeouts),
            team_fouls: Pair::default(),
            faults: Pair::default(),
            stats: MatchStats::default(),
            server: rules.first_server(1),
            previous_servers: Vec::new(),
            possession: rules.extras.possession.then_some(Side::A),
            pending_switch: false,
            deciding_switch_done: false,
            clock: rules.clock.map(|clock| Clock::new(clock.period_length)),
            events: EventLog::new(),
            winner: None,
            end_requested_in: None,
            side_names: Pair::from(side_names),
            rules,
        }
    }

    /// Creates a new engine using the default [`Rules`] of `sport`.
    pub fn for_sport(sport: Sport, side_names: [String; 2]) -> Self {
        Self::new(Rules::for_sport(sport), side_names)
    }

    #[inline]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    #[inline]
    pub fn sport(&self) -> Sport {
        self.rules.sport
    }

    #[inline]
    pub fn side_name(&self, side: Side) -> &str {
        &self.side_names[side]
    }

    #[inline]
    pub fn state(&self) -> MatchState {
        self.state
    }

    /// Returns the current period, starting at `1`.
    #[inline]
    pub fn period(&self) -> u32 {
        self.period
    }

    /// Returns the current score. This is the score of the current period for sports resetting
    /// the score every period, and the cumulative score otherwise.
    #[inline]
    pub fn scores(&self) -> [u32; 2] {
        self.scores.to_array()
    }

    #[inline]
    pub fn period_wins(&self) -> [u32; 2] {
        self.period_wins.to_array()
    }

    /// Returns the periods recorded so far.
    #[inline]
    pub fn history(&self) -> &[PeriodResult] {
        &self.history
    }

    #[inline]
    pub fn timeouts(&self) -> [u32; 2] {
        self.timeouts.to_array()
    }

    /// Returns the team fouls, which roll over once they reach the limit of the sport.
    #[inline]
    pub fn team_fouls(&self) -> [u32; 2] {
        self.team_fouls.to_array()
    }

    /// Returns the faults in the current set.
    #[inline]
    pub fn faults(&self) -> [u32; 2] {
        self.faults.to_array()
    }

    #[inline]
    pub fn stats(&self) -> &MatchStats {
        &self.stats
    }

    #[inline]
    pub fn server(&self) -> Option<Side> {
        self.server
    }

    /// Returns the serves left for the current server if the serve alternates after a fixed
    /// number of points.
    pub fn serves_left(&self) -> Option<u32> {
        self.rules
            .alternating_server(self.period, self.points_played())
            .map(|(_, left)| left)
    }

    #[inline]
    pub fn possession(&self) -> Option<Side> {
        self.possession
    }

    /// Returns `true` if the sides should switch ends. Cleared by [`switch_sides`].
    ///
    /// [`switch_sides`]: Self::switch_sides
    #[inline]
    pub fn pending_switch(&self) -> bool {
        self.pending_switch
    }

    #[inline]
    pub fn clock(&self) -> Option<&Clock> {
        self.clock.as_ref()
    }

    /// Returns the clock of the match to start or stop it.
    #[inline]
    pub fn clock_mut(&mut self) -> Option<&mut Clock> {
        self.clock.as_mut()
    }

    #[inline]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Returns the winner once the match is decided. `None` while the match is live or if it
    /// ended in a draw.
    #[inline]
    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    /// Returns the recorded periods followed by the current period if it was played but not
    /// recorded yet.
    pub fn period_history(&self) -> Vec<PeriodResult> {
        let mut history = self.history.clone();

        if !self.period_recorded {
            let row = self.period_row();
            let start = self.rules.starting_score();

            if row.score != [start, start] {
                history.push(row);
            }
        }

        history
    }

    /// Returns the final score of the match as it stands: periods won for rally sports and the
    /// cumulative score for clock sports.
    pub fn final_score(&self) -> [u32; 2] {
        result::derive_final_score(self.sport(), &self.period_history())
    }

    /// Adds `amount` points to `side`.
    pub fn add_point(&mut self, side: Side, amount: u32) -> Outcome {
        self.ensure_in_period()?;

        let score = self.scores[side]
            .checked_add(amount)
            .filter(|score| amount > 0 && *score <= self.max_score())
            .ok_or(Rejected::InvalidScore)?;

        self.scores[side] = score;
        self.log(EventKind::Point { amount }, Some(side));

        self.update_server(Some(side));
        self.check_side_switch();

        Ok(self.check_period_win())
    }

    /// Removes a single point from `side`. The score of the current period never goes below
    /// zero. With rally winner serving, the serve goes back to the side serving before the last
    /// point.
    pub fn undo_point(&mut self, side: Side) -> Outcome {
        self.ensure_in_period()?;

        if self.scores[side] <= self.period_floor(side) {
            return Err(Rejected::ScoreAtZero);
        }

        self.scores[side] -= 1;
        self.log(EventKind::UndoPoint, Some(side));
        self.update_server(None);

        Ok(Transition::Recorded)
    }

    pub fn add_timeout(&mut self, side: Side) -> Outcome {
        self.ensure_supported(self.rules.extras.timeouts, "timeouts")?;
        self.ensure_live()?;

        if self.timeouts[side] == 0 {
            return Err(Rejected::NoTimeoutsLeft);
        }

        self.timeouts[side] -= 1;
        self.stats.timeouts_used[side] += 1;
        self.log(EventKind::Timeout, Some(side));

        Ok(Transition::Recorded)
    }

    /// Adds a team foul. Team fouls go back to zero once they reach the limit of the sport.
    pub fn add_foul(&mut self, side: Side) -> Outcome {
        self.ensure_supported(self.rules.extras.fouls, "fouls")?;
        self.ensure_in_period()?;

        self.team_fouls[side] += 1;
        self.stats.fouls[side] += 1;

        if let Some(limit) = self.rules.foul_rollover {
            if self.team_fouls[side] >= limit {
                log::debug!("Team fouls of {:?} rolled over at {}", side, limit);
                self.team_fouls[side] = 0;
            }
        }

        self.log(EventKind::Foul, Some(side));
        Ok(Transition::Recorded)
    }

    pub fn add_fault(&mut self, side: Side, fault: FaultKind) -> Outcome {
        self.ensure_supported(self.rules.extras.faults, "faults")?;
        self.ensure_in_period()?;

        self.faults[side] += 1;
        self.stats.faults[side] += 1;
        self.log(EventKind::Fault { fault }, Some(side));

        Ok(Transition::Recorded)
    }

    pub fn add_card(&mut self, side: Side, color: CardColor) -> Outcome {
        self.ensure_supported(self.rules.extras.cards, "cards")?;
        self.ensure_in_period()?;

        match color {
            CardColor::Yellow => self.stats.yellow_cards[side] += 1,
            CardColor::Red => self.stats.red_cards[side] += 1,
        }

        self.log(EventKind::Card { color }, Some(side));
        Ok(Transition::Recorded)
    }

    /// Adds a warning. Every n-th warning of a side deducts a point from its current round
    /// score.
    pub fn add_warning(&mut self, side: Side) -> Outcome {
        self.ensure_supported(self.rules.extras.warnings, "warnings")?;
        self.ensure_in_period()?;

        self.stats.warnings[side] += 1;
        self.log(EventKind::Warning, Some(side));

        if let Some(n) = self.rules.warnings_per_deduction {
            if self.stats.warnings[side] % n == 0 {
                self.stats.deductions[side] += 1;
                self.scores[side] = self.scores[side].saturating_sub(1);
                self.log(EventKind::PointDeduction, Some(side));
            }
        }

        Ok(Transition::Recorded)
    }

    pub fn add_knockdown(&mut self, side: Side) -> Outcome {
        self.ensure_supported(self.rules.extras.knockdowns, "knockdowns")?;
        self.ensure_in_period()?;

        self.stats.knockdowns[side] += 1;
        self.log(EventKind::Knockdown, Some(side));

        Ok(Transition::Recorded)
    }

    /// Gives the possession to the other side.
    pub fn toggle_possession(&mut self) -> Outcome {
        self.ensure_supported(self.rules.extras.possession, "possession")?;
        self.ensure_in_period()?;

        let side = self.possession.map_or(Side::A, Side::opponent);
        self.possession = Some(side);
        self.log(EventKind::Possession, Some(side));

        Ok(Transition::Recorded)
    }

    /// Sets the judge's score of `side` for the current round.
    pub fn set_round_score(&mut self, side: Side, score: u32) -> Outcome {
        self.ensure_supported(self.rules.extras.round_scores, "round scores")?;
        self.ensure_in_period()?;

        if score > self.max_score() {
            return Err(Rejected::InvalidScore);
        }

        self.scores[side] = score;
        self.log(EventKind::RoundScore, Some(side));

        Ok(Transition::Recorded)
    }

    /// Switches the ends of both sides, clearing a pending switch.
    pub fn switch_sides(&mut self) -> Outcome {
        self.ensure_live()?;

        self.pending_switch = false;
        self.log(EventKind::SwitchSides, None);

        Ok(Transition::Recorded)
    }

    /// Ends the current period of a clock sport. Ending the last period decides the match.
    pub fn end_period(&mut self) -> Outcome {
        self.ensure_supported(self.rules.is_clock_based(), "ending a period")?;
        self.ensure_in_period()?;

        let running = self.clock.map_or(false, |clock| clock.is_running());
        Ok(self.close_period(running))
    }

    /// Starts the next period after a break.
    pub fn resume(&mut self) -> Outcome {
        match self.state {
            MatchState::PeriodBreak => Ok(self.start_next_period()),
            MatchState::InPeriod => Err(Rejected::NotInBreak),
            _ => Err(Rejected::MatchOver),
        }
    }

    /// Advances the clock by `seconds`. The clock running out ends the current period, or
    /// starts the next one if a timed break ran out.
    pub fn tick(&mut self, seconds: u32) -> Outcome {
        if self.clock.is_none() {
            return Err(self.unsupported("the clock"));
        }
        self.ensure_live()?;

        let expired = self.clock.as_mut().map_or(false, |clock| clock.tick(seconds));
        if !expired {
            return Ok(Transition::Recorded);
        }

        let timed_break = self
            .rules
            .clock
            .map_or(false, |clock| clock.break_length.is_some());

        match self.state {
            MatchState::InPeriod => Ok(self.close_period(true)),
            MatchState::PeriodBreak if timed_break => Ok(self.start_next_period()),
            _ => Ok(Transition::Recorded),
        }
    }

    /// Ends the match early. The current leader is the winner.
    pub fn request_end(&mut self) -> Outcome {
        self.ensure_live()?;

        self.end_requested_in = Some(self.state);

        let winner = if self.rules.is_clock_based() {
            leader(self.final_score())
        } else {
            leader(self.period_wins.to_array())
        };

        Ok(self.decide(winner))
    }

    /// Takes back a previous [`request_end`]. A match decided on the scores cannot be
    /// reopened.
    ///
    /// [`request_end`]: Self::request_end
    pub fn cancel_end(&mut self) -> Outcome {
        if self.state != MatchState::AwaitingConfirmation {
            return Err(Rejected::NotAwaitingConfirmation);
        }

        let state = self.end_requested_in.take().ok_or(Rejected::NotRequested)?;

        self.state = state;
        self.winner = None;

        Ok(Transition::Recorded)
    }

    /// Completes a decided match.
    pub fn complete(&mut self) -> Outcome {
        match self.state {
            MatchState::AwaitingConfirmation => (),
            MatchState::Completed => return Err(Rejected::MatchOver),
            _ => return Err(Rejected::NotAwaitingConfirmation),
        }

        self.state = MatchState::Completed;
        self.end_requested_in = None;
        self.log(
            EventKind::MatchEnd {
                winner: self.winner,
            },
            self.winner,
        );

        log::debug!("Completed {} match, winner {:?}", self.sport(), self.winner);

        Ok(Transition::Completed)
    }

    /// Completes a decided match and assembles its [`MatchResult`].
    pub fn confirm(&mut self) -> Result<MatchResult, Rejected> {
        self.complete()?;

        let side_names = self.side_names.clone().into_inner();
        Ok(result::assemble(self, side_names, Utc::now()))
    }

    fn check_period_win(&mut self) -> Transition {
        let winner = match self.rules.period_winner(self.scores.to_array()) {
            Some(winner) => winner,
            None => return Transition::Recorded,
        };

        let period = self.period;

        self.period_wins[winner] += 1;
        self.record_period();

        if self.period_wins[winner] >= self.rules.majority() || period >= self.rules.periods {
            return self.decide(Some(winner));
        }

        self.start_period(period + 1);

        if self.rules.side_switch.between_periods {
            self.pending_switch = true;
        }

        Transition::PeriodWon { period, winner }
    }

    fn check_side_switch(&mut self) {
        let at = match self.rules.side_switch.deciding_period_at {
            Some(at) => at,
            None => return,
        };

        if !self.deciding_switch_done
            && self.rules.is_deciding_period(self.period_wins.to_array())
            && self.scores.iter().any(|score| *score >= at)
        {
            self.deciding_switch_done = true;
            self.pending_switch = true;
        }
    }

    fn close_period(&mut self, clock_running: bool) -> Transition {
        let period = self.period;
        self.record_period();

        if period >= self.rules.periods {
            return self.decide(leader(self.final_score()));
        }

        self.state = MatchState::PeriodBreak;

        let break_length = self.rules.clock.and_then(|clock| clock.break_length);
        if let (Some(clock), Some(length)) = (self.clock.as_mut(), break_length) {
            clock.set(length);
            if clock_running {
                clock.start();
            }
        }

        log::debug!("{} {} ended", self.sport().period_name(), period);

        Transition::PeriodEnded { period }
    }

    fn start_next_period(&mut self) -> Transition {
        let period = self.period + 1;
        self.start_period(period);
        Transition::PeriodStarted { period }
    }

    fn start_period(&mut self, period: u32) {
        self.period = period;
        self.state = MatchState::InPeriod;
        self.period_recorded = false;
        self.deciding_switch_done = false;
        self.faults = Pair::default();

        if self.rules.scores_reset_per_period {
            let start = self.rules.starting_score();
            self.scores = Pair::new(start, start);
        }
        self.period_start = self.scores;

        if self.rules.timeouts_reset_per_period {
            self.timeouts = Pair::new(self.rules.timeouts, self.rules.timeouts);
        }

        self.server = self.rules.first_server(period);
        self.previous_servers.clear();

        if let (Some(clock), Some(rules)) = (self.clock.as_mut(), self.rules.clock) {
            clock.set(rules.period_length);
        }

        log::debug!("{} {} started", self.sport().period_name(), period);
    }

    fn record_period(&mut self) {
        let row = self.period_row();
        let winner = row.winner;

        self.history.push(row);
        self.period_recorded = true;
        self.log(EventKind::PeriodEnd { winner }, winner);
    }

    fn decide(&mut self, winner: Option<Side>) -> Transition {
        self.state = MatchState::AwaitingConfirmation;
        self.winner = winner;

        if let Some(clock) = self.clock.as_mut() {
            clock.stop();
        }

        log::debug!("{} match decided, winner {:?}", self.sport(), winner);

        Transition::MatchDecided { winner }
    }

    fn period_row(&self) -> PeriodResult {
        let score =
            Side::BOTH.map(|side| self.scores[side].saturating_sub(self.period_floor(side)));

        let winner = if self.rules.is_clock_based() {
            leader(score)
        } else {
            self.rules.period_winner(score)
        };

        PeriodResult {
            period: self.period,
            score,
            winner,
        }
    }

    /// Returns the score of `side` that belongs to earlier periods.
    fn period_floor(&self, side: Side) -> u32 {
        if self.rules.scores_reset_per_period {
            0
        } else {
            self.period_start[side]
        }
    }

    fn max_score(&self) -> u32 {
        self.rules.round_score_default.unwrap_or(u32::MAX)
    }

    fn points_played(&self) -> u32 {
        self.scores.iter().fold(0, |sum, score| sum.saturating_add(*score))
    }

    fn update_server(&mut self, scored: Option<Side>) {
        match self.rules.serve {
            ServeRule::None => (),
            ServeRule::RallyWinner => match scored {
                Some(side) => {
                    self.previous_servers.push(self.server);
                    self.server = Some(side);
                }
                None => {
                    if let Some(server) = self.previous_servers.pop() {
                        self.server = server;
                    }
                }
            },
            ServeRule::Alternating { .. } => {
                self.server = self
                    .rules
                    .alternating_server(self.period, self.points_played())
                    .map(|(side, _)| side);
            }
        }
    }

    fn ensure_live(&self) -> Result<(), Rejected> {
        match self.state {
            MatchState::InPeriod | MatchState::PeriodBreak => Ok(()),
            _ => Err(Rejected::MatchOver),
        }
    }

    fn ensure_in_period(&self) -> Result<(), Rejected> {
        match self.state {
            MatchState::InPeriod => Ok(()),
            MatchState::PeriodBreak => Err(Rejected::InBreak),
            _ => Err(Rejected::MatchOver),
        }
    }

    fn ensure_supported(&self, supported: bool, operation: &'static str) -> Result<(), Rejected> {
        if supported {
            Ok(())
        } else {
            Err(self.unsupported(operation))
        }
    }

    fn unsupported(&self, operation: &'static str) -> Rejected {
        Rejected::Unsupported {
            operation,
            sport: self.sport(),
        }
    }

    fn log(&mut self, kind: EventKind, side: Option<Side>) {
        self.events.push(ScoreEvent {
            kind,
            side,
            period: self.period,
            score: self.scores.to_array(),
            timestamp: Utc::now(),
        });
    }
}

/// Returns the side with the higher score, or `None` on a tie.
fn leader(score: [u32; 2]) -> Option<Side> {
    let [a, b] = score;

    match a.cmp(&b) {
        std::cmp::Ordering::Greater => Some(Side::A),
        std::cmp::Ordering::Less => Some(Side::B),
        std::cmp::Ordering::Equal => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{MatchState, Rejected, ScoringEngine, Transition};
    use crate::event::{CardColor, EventKind, FaultKind};
    use crate::options::MatchOptionValues;
    use crate::result::derive_final_score;
    use crate::rules::Rules;
    use crate::{Side, Sport};

    fn engine(sport: Sport) -> ScoringEngine {
        ScoringEngine::for_sport(sport, [String::from("Home"), String::from("Away")])
    }

    /// Plays points alternately until `winner` wins the period `target` to `target - 2`.
    fn win_period(engine: &mut ScoringEngine, winner: Side, target: u32) -> Transition {
        for _ in 0..target - 2 {
            engine.add_point(Side::A, 1).unwrap();
            engine.add_point(Side::B, 1).unwrap();
        }

        engine.add_point(winner, 1).unwrap();
        engine.add_point(winner, 1).unwrap()
    }

    #[test]
    fn test_volleyball_match() {
        let mut engine = engine(Sport::Volleyball);

        let transition = win_period(&mut engine, Side::A, 25);
        assert_eq!(
            transition,
            Transition::PeriodWon {
                period: 1,
                winner: Side::A
            }
        );
        assert_eq!(engine.scores(), [0, 0]);
        assert_eq!(engine.period(), 2);
        assert_eq!(engine.period_wins(), [1, 0]);
        assert_eq!(engine.history()[0].score, [25, 23]);

        win_period(&mut engine, Side::B, 25);
        win_period(&mut engine, Side::A, 25);
        assert_eq!(engine.state(), MatchState::InPeriod);

        let transition = win_period(&mut engine, Side::A, 25);
        assert_eq!(
            transition,
            Transition::MatchDecided {
                winner: Some(Side::A)
            }
        );
        assert_eq!(engine.state(), MatchState::AwaitingConfirmation);
        assert_eq!(engine.period_wins(), [3, 1]);

        // Nothing is accepted until the match is confirmed.
        assert_eq!(engine.add_point(Side::B, 1), Err(Rejected::MatchOver));

        let result = engine.confirm().unwrap();
        assert_eq!(engine.state(), MatchState::Completed);
        assert_eq!(result.sport, Sport::Volleyball);
        assert_eq!(result.final_score, [3, 1]);
        assert_eq!(result.winner(), Some(Side::A));
        assert_eq!(result.side_names, [String::from("Home"), String::from("Away")]);
        assert_eq!(result.period_history.len(), 4);
        assert_eq!(
            result.events.last().map(|event| event.kind),
            Some(EventKind::MatchEnd {
                winner: Some(Side::A)
            })
        );

        assert_eq!(engine.confirm().unwrap_err(), Rejected::MatchOver);
    }

    #[test]
    fn test_badminton_win_by_two() {
        let mut engine = engine(Sport::Badminton);

        for _ in 0..19 {
            engine.add_point(Side::A, 1).unwrap();
            engine.add_point(Side::B, 1).unwrap();
        }
        engine.add_point(Side::A, 1).unwrap();
        engine.add_point(Side::B, 1).unwrap();

        // 21-20
        assert_eq!(engine.add_point(Side::A, 1), Ok(Transition::Recorded));
        assert_eq!(engine.period_wins(), [0, 0]);

        // 22-20
        assert_eq!(
            engine.add_point(Side::A, 1),
            Ok(Transition::PeriodWon {
                period: 1,
                winner: Side::A
            })
        );
        assert_eq!(engine.history()[0].score, [22, 20]);

        let mut engine = self::engine(Sport::Badminton);
        for _ in 0..19 {
            engine.add_point(Side::A, 1).unwrap();
            engine.add_point(Side::B, 1).unwrap();
        }
        engine.add_point(Side::A, 1).unwrap();

        // 21-19
        assert_eq!(
            engine.add_point(Side::A, 1),
            Ok(Transition::PeriodWon {
                period: 1,
                winner: Side::A
            })
        );
    }

    #[test]
    fn test_period_wins_never_decrease() {
        let mut engine = engine(Sport::SepakTakraw);
        let mut previous = [0, 0];

        for i in 0..200_u32 {
            let side = if i % 3 == 0 { Side::B } else { Side::A };
            if engine.add_point(side, 1).is_err() {
                break;
            }

            let wins = engine.period_wins();
            assert!(wins[0] >= previous[0] && wins[1] >= previous[1]);
            previous = wins;
        }

        assert_eq!(engine.state(), MatchState::AwaitingConfirmation);
        assert_eq!(engine.period_wins(), [2, 0]);
    }

    #[test]
    fn test_undo_point() {
        let mut engine = engine(Sport::Badminton);

        assert_eq!(engine.undo_point(Side::A), Err(Rejected::ScoreAtZero));
        assert!(engine.events().is_empty());

        engine.add_point(Side::A, 1).unwrap();
        engine.add_point(Side::A, 1).unwrap();
        engine.undo_point(Side::A).unwrap();
        engine.undo_point(Side::A).unwrap();
        assert_eq!(engine.undo_point(Side::A), Err(Rejected::ScoreAtZero));
        assert_eq!(engine.scores(), [0, 0]);

        // Undo is a compensating event, the log only grows.
        assert_eq!(engine.events().len(), 4);
        assert_eq!(engine.events()[3].kind, EventKind::UndoPoint);
    }

    #[test]
    fn test_scores_never_negative() {
        let mut engine = engine(Sport::TableTennis);

        for i in 0..500_u32 {
            if engine.state() != MatchState::InPeriod {
                break;
            }

            let side = if i % 5 < 2 { Side::A } else { Side::B };

            if i % 7 == 0 || i % 7 == 3 {
                let before = engine.scores()[side.index()];
                let result = engine.undo_point(side);

                if before == 0 {
                    assert_eq!(result, Err(Rejected::ScoreAtZero));
                    assert_eq!(engine.scores()[side.index()], 0);
                } else {
                    assert_eq!(result, Ok(Transition::Recorded));
                    assert_eq!(engine.scores()[side.index()], before - 1);
                }
            } else {
                engine.add_point(side, 1).unwrap();
            }
        }

        assert_eq!(engine.state(), MatchState::AwaitingConfirmation);
        assert!(engine.history().iter().all(|row| row.winner.is_some()));
    }

    #[test]
    fn test_basketball_scores_are_cumulative() {
        let mut engine = engine(Sport::Basketball);

        for _ in 0..3 {
            engine.add_point(Side::A, 3).unwrap();
        }
        assert_eq!(engine.scores(), [9, 0]);

        engine.clock_mut().unwrap().start();
        assert_eq!(engine.tick(600), Ok(Transition::PeriodEnded { period: 1 }));
        assert_eq!(engine.state(), MatchState::PeriodBreak);
        assert_eq!(engine.add_point(Side::A, 2), Err(Rejected::InBreak));
        // Untimed breaks do not end on the clock.
        assert_eq!(engine.tick(600), Ok(Transition::Recorded));

        assert_eq!(engine.resume(), Ok(Transition::PeriodStarted { period: 2 }));
        assert_eq!(engine.scores(), [9, 0]);
        assert_eq!(engine.clock().unwrap().remaining(), 600);

        engine.add_point(Side::B, 2).unwrap();
        engine.add_point(Side::A, 1).unwrap();
        assert_eq!(engine.scores(), [10, 2]);

        // Points of earlier quarters cannot be undone.
        engine.undo_point(Side::A).unwrap();
        assert_eq!(engine.undo_point(Side::A), Err(Rejected::ScoreAtZero));
        assert_eq!(engine.scores(), [9, 2]);
        engine.add_point(Side::A, 1).unwrap();

        engine.end_period().unwrap();
        engine.resume().unwrap();
        engine.end_period().unwrap();
        engine.resume().unwrap();
        assert_eq!(
            engine.end_period(),
            Ok(Transition::MatchDecided {
                winner: Some(Side::A)
            })
        );

        let scores: Vec<_> = engine.history().iter().map(|row| row.score).collect();
        assert_eq!(scores, [[9, 0], [1, 2], [0, 0], [0, 0]]);
        assert_eq!(engine.final_score(), [10, 2]);

        let result = engine.confirm().unwrap();
        assert_eq!(result.final_score, engine.scores());
        assert_eq!(
            derive_final_score(Sport::Basketball, &result.period_history),
            result.final_score
        );
    }

    #[test]
    fn test_basketball_fouls_and_timeouts() {
        let mut engine = engine(Sport::Basketball);

        for _ in 0..6 {
            engine.add_foul(Side::B).unwrap();
        }
        assert_eq!(engine.team_fouls(), [0, 6]);
        engine.add_foul(Side::B).unwrap();
        assert_eq!(engine.team_fouls(), [0, 0]);
        assert_eq!(engine.stats().fouls, [0, 7]);

        for _ in 0..5 {
            engine.add_timeout(Side::A).unwrap();
        }
        assert_eq!(engine.add_timeout(Side::A), Err(Rejected::NoTimeoutsLeft));

        // Timeouts are granted per game.
        engine.end_period().unwrap();
        engine.resume().unwrap();
        assert_eq!(engine.timeouts(), [0, 5]);

        assert!(matches!(
            engine.add_card(Side::A, CardColor::Red),
            Err(Rejected::Unsupported {
                sport: Sport::Basketball,
                ..
            })
        ));
    }

    #[test]
    fn test_football() {
        let mut engine = engine(Sport::Football);

        assert_eq!(engine.possession(), Some(Side::A));
        engine.toggle_possession().unwrap();
        assert_eq!(engine.possession(), Some(Side::B));

        engine.add_card(Side::A, CardColor::Yellow).unwrap();
        engine.add_card(Side::A, CardColor::Yellow).unwrap();
        engine.add_card(Side::B, CardColor::Red).unwrap();
        assert_eq!(engine.stats().yellow_cards, [2, 0]);
        assert_eq!(engine.stats().red_cards, [0, 1]);

        for _ in 0..3 {
            engine.add_timeout(Side::B).unwrap();
        }
        assert_eq!(engine.add_timeout(Side::B), Err(Rejected::NoTimeoutsLeft));

        engine.add_point(Side::A, 1).unwrap();
        engine.end_period().unwrap();
        engine.resume().unwrap();
        // Timeouts are granted per half.
        assert_eq!(engine.timeouts(), [3, 3]);

        assert_eq!(
            engine.end_period(),
            Ok(Transition::MatchDecided {
                winner: Some(Side::A)
            })
        );
        assert_eq!(
            engine.add_foul(Side::A),
            Err(Rejected::Unsupported {
                operation: "fouls",
                sport: Sport::Football,
            })
        );
    }

    #[test]
    fn test_football_draw() {
        let mut engine = engine(Sport::Football);

        engine.end_period().unwrap();
        engine.resume().unwrap();
        assert_eq!(
            engine.end_period(),
            Ok(Transition::MatchDecided { winner: None })
        );

        let result = engine.confirm().unwrap();
        assert_eq!(result.final_score, [0, 0]);
        assert_eq!(result.winner(), None);
    }

    #[test]
    fn test_boxing() {
        let mut engine = engine(Sport::Boxing);
        assert_eq!(engine.scores(), [10, 10]);

        // 10 is the maximum of a round.
        assert_eq!(engine.add_point(Side::A, 1), Err(Rejected::InvalidScore));
        assert_eq!(engine.set_round_score(Side::A, 11), Err(Rejected::InvalidScore));

        engine.set_round_score(Side::B, 9).unwrap();
        engine.add_knockdown(Side::B).unwrap();

        engine.add_warning(Side::A).unwrap();
        engine.add_warning(Side::A).unwrap();
        assert_eq!(engine.stats().deductions, [0, 0]);
        engine.add_warning(Side::A).unwrap();
        assert_eq!(engine.stats().deductions, [1, 0]);
        assert_eq!(engine.scores(), [9, 9]);
        assert_eq!(
            engine.events().last().map(|event| event.kind),
            Some(EventKind::PointDeduction)
        );

        engine.add_point(Side::A, 1).unwrap();
        assert_eq!(engine.scores(), [10, 9]);

        engine.clock_mut().unwrap().start();
        assert_eq!(engine.tick(180), Ok(Transition::PeriodEnded { period: 1 }));

        // The break clock keeps running and starts the next round.
        let clock = engine.clock().unwrap();
        assert_eq!(clock.remaining(), 60);
        assert!(clock.is_running());
        assert_eq!(engine.tick(30), Ok(Transition::Recorded));
        assert_eq!(engine.tick(30), Ok(Transition::PeriodStarted { period: 2 }));

        assert_eq!(engine.scores(), [10, 10]);
        assert_eq!(engine.clock().unwrap().remaining(), 180);
        assert_eq!(engine.history()[0].score, [10, 9]);
        assert_eq!(engine.history()[0].winner, Some(Side::A));

        assert!(matches!(
            engine.add_timeout(Side::A),
            Err(Rejected::Unsupported { .. })
        ));
    }

    #[test]
    fn test_boxing_final_round() {
        let values: MatchOptionValues = [("rounds", 2_u64)].into_iter().collect();
        let rules = Rules::with_options(Sport::Boxing, values).unwrap();
        let mut engine = ScoringEngine::new(rules, [String::from("Red"), String::from("Blue")]);

        engine.set_round_score(Side::A, 9).unwrap();
        engine.end_period().unwrap();
        assert_eq!(engine.resume(), Ok(Transition::PeriodStarted { period: 2 }));
        engine.set_round_score(Side::A, 8).unwrap();

        assert_eq!(
            engine.end_period(),
            Ok(Transition::MatchDecided {
                winner: Some(Side::B)
            })
        );

        let result = engine.confirm().unwrap();
        assert_eq!(result.final_score, [17, 20]);
        assert_eq!(result.stats.knockdowns, [0, 0]);
    }

    #[test]
    fn test_table_tennis_serve_and_sides() {
        let mut engine = engine(Sport::TableTennis);

        assert_eq!(engine.server(), Some(Side::A));
        assert_eq!(engine.serves_left(), Some(2));

        engine.add_point(Side::B, 1).unwrap();
        assert_eq!(engine.server(), Some(Side::A));
        assert_eq!(engine.serves_left(), Some(1));

        engine.add_point(Side::B, 1).unwrap();
        assert_eq!(engine.server(), Some(Side::B));

        engine.undo_point(Side::B).unwrap();
        assert_eq!(engine.server(), Some(Side::A));
        engine.add_point(Side::B, 1).unwrap();

        for _ in 0..9 {
            engine.add_point(Side::B, 1).unwrap();
        }
        assert_eq!(engine.period_wins(), [0, 1]);

        // Game two starts with the other server and a side switch.
        assert_eq!(engine.server(), Some(Side::B));
        assert!(engine.pending_switch());
        engine.switch_sides().unwrap();
        assert!(!engine.pending_switch());
        assert_eq!(
            engine.events().last().map(|event| event.kind),
            Some(EventKind::SwitchSides)
        );
    }

    #[test]
    fn test_badminton_deciding_game_switch() {
        let mut engine = engine(Sport::Badminton);

        win_period(&mut engine, Side::A, 21);
        assert!(!engine.pending_switch());
        win_period(&mut engine, Side::B, 21);
        assert!(!engine.pending_switch());

        for _ in 0..10 {
            engine.add_point(Side::A, 1).unwrap();
        }
        assert!(!engine.pending_switch());
        engine.add_point(Side::A, 1).unwrap();
        assert!(engine.pending_switch());
        engine.switch_sides().unwrap();

        // Raised once per game.
        engine.add_point(Side::B, 1).unwrap();
        assert!(!engine.pending_switch());
    }

    #[test]
    fn test_rally_winner_serves() {
        let mut engine = engine(Sport::Volleyball);

        assert_eq!(engine.server(), Some(Side::A));
        engine.add_point(Side::B, 1).unwrap();
        assert_eq!(engine.server(), Some(Side::B));
        engine.add_point(Side::A, 1).unwrap();
        assert_eq!(engine.server(), Some(Side::A));
    }

    #[test]
    fn test_undo_restores_server() {
        let mut engine = engine(Sport::Volleyball);

        engine.add_point(Side::B, 1).unwrap();
        engine.add_point(Side::A, 1).unwrap();
        assert_eq!(engine.server(), Some(Side::A));

        engine.undo_point(Side::A).unwrap();
        assert_eq!(engine.server(), Some(Side::B));
        engine.undo_point(Side::B).unwrap();
        assert_eq!(engine.server(), Some(Side::A));

        // A rejected undo does not touch the serve.
        assert_eq!(engine.undo_point(Side::B), Err(Rejected::ScoreAtZero));
        assert_eq!(engine.server(), Some(Side::A));
    }

    #[test]
    fn test_table_tennis_large_target() {
        let values = MatchOptionValues::from_iter([("points_to_win", 3_000_000_000_u64)]);
        let rules = Rules::with_options(Sport::TableTennis, values).unwrap();
        let mut engine = ScoringEngine::new(rules, [String::from("A"), String::from("B")]);

        assert_eq!(engine.add_point(Side::A, 1), Ok(Transition::Recorded));
        assert_eq!(engine.server(), Some(Side::A));
        assert_eq!(engine.add_point(Side::B, 1), Ok(Transition::Recorded));
        assert_eq!(engine.server(), Some(Side::B));
    }

    #[test]
    fn test_sepak_takraw_faults() {
        let mut engine = engine(Sport::SepakTakraw);

        engine.add_fault(Side::A, FaultKind::Net).unwrap();
        engine.add_fault(Side::A, FaultKind::Service).unwrap();
        assert_eq!(engine.faults(), [2, 0]);
        // Faults do not score.
        assert_eq!(engine.scores(), [0, 0]);

        win_period(&mut engine, Side::B, 21);
        assert_eq!(engine.faults(), [0, 0]);
        assert_eq!(engine.stats().faults, [2, 0]);
    }

    #[test]
    fn test_timeouts_reset_per_set() {
        let mut engine = engine(Sport::Volleyball);

        engine.add_timeout(Side::A).unwrap();
        engine.add_timeout(Side::A).unwrap();
        assert_eq!(engine.add_timeout(Side::A), Err(Rejected::NoTimeoutsLeft));

        win_period(&mut engine, Side::A, 25);
        assert_eq!(engine.timeouts(), [2, 2]);
        assert_eq!(engine.stats().timeouts_used, [2, 0]);
    }

    #[test]
    fn test_request_end() {
        let mut engine = engine(Sport::Badminton);

        win_period(&mut engine, Side::B, 21);
        engine.add_point(Side::A, 1).unwrap();

        assert_eq!(engine.cancel_end(), Err(Rejected::NotAwaitingConfirmation));
        assert_eq!(
            engine.request_end(),
            Ok(Transition::MatchDecided {
                winner: Some(Side::B)
            })
        );
        assert_eq!(engine.request_end(), Err(Rejected::MatchOver));

        assert_eq!(engine.cancel_end(), Ok(Transition::Recorded));
        assert_eq!(engine.state(), MatchState::InPeriod);
        assert_eq!(engine.winner(), None);

        engine.request_end().unwrap();
        let result = engine.confirm().unwrap();
        assert_eq!(result.final_score, [0, 1]);
        // The unfinished game is kept without a winner.
        assert_eq!(result.period_history.len(), 2);
        assert_eq!(result.period_history[1].score, [1, 0]);
        assert_eq!(result.period_history[1].winner, None);
    }

    #[test]
    fn test_decided_match_cannot_be_reopened() {
        let mut engine = engine(Sport::Badminton);

        win_period(&mut engine, Side::A, 21);
        win_period(&mut engine, Side::A, 21);

        assert_eq!(engine.state(), MatchState::AwaitingConfirmation);
        assert_eq!(engine.cancel_end(), Err(Rejected::NotRequested));
        assert_eq!(engine.resume(), Err(Rejected::MatchOver));
    }

    #[test]
    fn test_rejections_do_not_log() {
        let mut engine = engine(Sport::Volleyball);

        let rejected = [
            engine.undo_point(Side::A),
            engine.add_point(Side::A, 0),
            engine.end_period(),
            engine.resume(),
            engine.tick(1),
            engine.add_foul(Side::A),
            engine.toggle_possession(),
            engine.cancel_end(),
        ];

        assert!(rejected.iter().all(Result::is_err));
        assert!(engine.events().is_empty());
        assert_eq!(engine.scores(), [0, 0]);
        assert_eq!(engine.state(), MatchState::InPeriod);
    }
}
