use std::str::FromStr;

use clap::Args;
use scorekeeper_core::options::{self, MatchOptionValues};
use scorekeeper_core::{
    CardColor, FaultKind, MatchResult, MatchState, Outcome, Rejected, Rules, ScoringEngine, Side,
    Sport, Transition,
};
use scorekeeper_store::{KeyValueStore, Store};

use crate::utils::{parse_side, print_table, Prompt};
use crate::Error;

const HELP: &str = "\
Commands:
  a [n] | b [n]         add n points (default 1)
  undo <side>           remove a point
  timeout <side>        call a timeout
  foul <side>           add a team foul
  fault <side> <kind>   add a net, foot or service fault
  card <side> <color>   show a yellow or red card
  warn <side>           warn a boxer
  kd <side>             count a knockdown
  round <side> <n>      set the judge's score of the current round
  poss                  toggle ball possession
  switch                switch sides
  start | stop          start or stop the clock
  tick <seconds>        let the clock run
  end                   end the current period
  resume                start the next period
  finish                end the match now
  cancel                take back 'finish'
  confirm               save the result
  quit                  leave without saving";

#[derive(Debug, Args)]
pub struct Play {
    sport: Sport,
    #[clap(long, default_value = "Team A")]
    name_a: String,
    #[clap(long, default_value = "Team B")]
    name_b: String,
    /// Match options as key=value, see the options command.
    #[clap(short = 'o', long = "option")]
    options: Vec<String>,
}

impl Play {
    pub fn run<S>(&self, store: &Store<S>) -> Result<(), Error>
    where
        S: KeyValueStore,
    {
        let rules = rules(self.sport, &self.options)?;
        let engine = ScoringEngine::new(rules, [self.name_a.clone(), self.name_b.clone()]);

        if let Some(result) = run_match(engine)? {
            store.history().push(&result)?;
            print_result(&result);
        }

        Ok(())
    }
}

/// Builds the [`Rules`] of `sport` from a list of `key=value` assignments.
pub fn rules(sport: Sport, assignments: &[String]) -> Result<Rules, options::Error> {
    let options = Rules::options(sport);

    let values = assignments
        .iter()
        .map(|assignment| options.parse_assignment(assignment))
        .collect::<Result<MatchOptionValues, _>>()?;

    Rules::with_options(sport, values)
}

/// Prints the options accepted by `sport`.
pub fn print_options(sport: Sport) {
    let rows: Vec<_> = Rules::options(sport)
        .iter()
        .map(|(key, option)| [key.clone(), option.name.clone(), option.value.to_string()])
        .collect();

    print_table(["Key", "Description", "Default"], &rows);
}

/// Drives `engine` from stdin until the match is confirmed or abandoned. Returns `None` if the
/// match was abandoned.
pub fn run_match(mut engine: ScoringEngine) -> Result<Option<MatchResult>, Error> {
    println!("{}", HELP);

    loop {
        print_status(&engine);

        let action = match Prompt::new(">").read_line()? {
            Some(line) if line.trim().is_empty() => continue,
            Some(line) => match line.parse::<Action>() {
                Ok(action) => action,
                Err(err) => {
                    println!("{}", err);
                    continue;
                }
            },
            None => return Ok(None),
        };

        match action {
            Action::Help => println!("{}", HELP),
            Action::Quit => {
                if engine.state() == MatchState::Completed
                    || Prompt::new("Leave without saving? (y/n)").confirm()?
                {
                    return Ok(None);
                }
            }
            Action::Confirm => match engine.confirm() {
                Ok(result) => return Ok(Some(result)),
                Err(err) => println!("Cannot confirm: {}", err),
            },
            action => {
                let outcome = action.apply(&mut engine);
                report(&engine, outcome);
            }
        }
    }
}

fn report(engine: &ScoringEngine, outcome: Outcome) {
    let period_name = engine.sport().period_name();

    match outcome {
        Ok(Transition::Recorded) | Ok(Transition::Completed) => (),
        Ok(Transition::PeriodWon { period, winner }) => println!(
            "{} {} won by {}",
            period_name,
            period,
            engine.side_name(winner)
        ),
        Ok(Transition::PeriodEnded { period }) => println!("{} {} ended", period_name, period),
        Ok(Transition::PeriodStarted { period }) => {
            println!("{} {} started", period_name, period)
        }
        Ok(Transition::MatchDecided { winner }) => {
            match winner {
                Some(side) => println!("Match over, {} wins", engine.side_name(side)),
                None => println!("Match over, draw"),
            }
            println!("Type 'confirm' to save the result.");
        }
        Err(err) => println!("Rejected: {}", err),
    }

    if engine.pending_switch() {
        println!("Switch sides!");
    }
}

fn print_status(engine: &ScoringEngine) {
    let rules = engine.rules();
    let [a, b] = engine.scores();

    let mut status = format!(
        "{} {} | {} {} - {} {}",
        engine.sport().period_name(),
        engine.period(),
        engine.side_name(Side::A),
        a,
        b,
        engine.side_name(Side::B),
    );

    if !rules.is_clock_based() {
        let [a, b] = engine.period_wins();
        status.push_str(&format!(" | {}s {} - {}", engine.sport().period_name(), a, b));
    }

    if let Some(clock) = engine.clock() {
        let state = if clock.is_running() { "" } else { " (stopped)" };
        status.push_str(&format!(" | {}{}", clock, state));
    }

    if let Some(server) = engine.server() {
        status.push_str(&format!(" | serving {}", engine.side_name(server)));
    }

    if let Some(side) = engine.possession() {
        status.push_str(&format!(" | possession {}", engine.side_name(side)));
    }

    if rules.extras.timeouts {
        let [a, b] = engine.timeouts();
        status.push_str(&format!(" | timeouts {}/{}", a, b));
    }

    if rules.extras.fouls {
        let [a, b] = engine.team_fouls();
        status.push_str(&format!(" | fouls {}/{}", a, b));
    }

    if rules.extras.faults {
        let [a, b] = engine.faults();
        status.push_str(&format!(" | faults {}/{}", a, b));
    }

    match engine.state() {
        MatchState::InPeriod => (),
        MatchState::PeriodBreak => status.push_str(" | break"),
        MatchState::AwaitingConfirmation => status.push_str(" | awaiting confirmation"),
        MatchState::Completed => status.push_str(" | completed"),
    }

    println!("{}", status);
}

pub fn print_result(result: &MatchResult) {
    let [a, b] = result.final_score;
    let [name_a, name_b] = &result.side_names;

    println!("{} | {} {} - {} {}", result.sport, name_a, a, b, name_b);
    for row in &result.period_history {
        println!(
            "  {} {}: {} - {}",
            result.sport.period_name(),
            row.period,
            row.score[0],
            row.score[1]
        );
    }

    match result.winner_name() {
        Some(name) => println!("Winner: {}", name),
        None => println!("Draw"),
    }
}

/// A single command of the interactive match driver.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Action {
    Point(Side, u32),
    Undo(Side),
    Timeout(Side),
    Foul(Side),
    Fault(Side, FaultKind),
    Card(Side, CardColor),
    Warning(Side),
    Knockdown(Side),
    RoundScore(Side, u32),
    Possession,
    Switch,
    Start,
    Stop,
    Tick(u32),
    EndPeriod,
    Resume,
    Finish,
    Cancel,
    Confirm,
    Help,
    Quit,
}

impl Action {
    fn apply(self, engine: &mut ScoringEngine) -> Outcome {
        match self {
            Self::Point(side, amount) => engine.add_point(side, amount),
            Self::Undo(side) => engine.undo_point(side),
            Self::Timeout(side) => engine.add_timeout(side),
            Self::Foul(side) => engine.add_foul(side),
            Self::Fault(side, fault) => engine.add_fault(side, fault),
            Self::Card(side, color) => engine.add_card(side, color),
            Self::Warning(side) => engine.add_warning(side),
            Self::Knockdown(side) => engine.add_knockdown(side),
            Self::RoundScore(side, score) => engine.set_round_score(side, score),
            Self::Possession => engine.toggle_possession(),
            Self::Switch => engine.switch_sides(),
            Self::Start | Self::Stop => {
                let sport = engine.sport();
                let clock = engine.clock_mut().ok_or(Rejected::Unsupported {
                    operation: "the clock",
                    sport,
                })?;

                if self == Self::Start {
                    clock.start();
                } else {
                    clock.stop();
                }

                Ok(Transition::Recorded)
            }
            Self::Tick(seconds) => engine.tick(seconds),
            Self::EndPeriod => engine.end_period(),
            Self::Resume => engine.resume(),
            Self::Finish => engine.request_end(),
            Self::Cancel => engine.cancel_end(),
            Self::Confirm | Self::Help | Self::Quit => Ok(Transition::Recorded),
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut args = s.split_whitespace();
        let command = args.next().unwrap_or_default().to_ascii_lowercase();

        let mut side = || {
            args.next()
                .ok_or_else(|| format!("{} requires a side", command))
                .and_then(parse_side)
        };

        let action = match command.as_str() {
            "a" | "b" => {
                let side = parse_side(&command)?;
                let amount = match args.next() {
                    Some(amount) => parse_number(amount)?,
                    None => 1,
                };

                return Ok(Self::Point(side, amount));
            }
            "undo" => Self::Undo(side()?),
            "timeout" => Self::Timeout(side()?),
            "foul" => Self::Foul(side()?),
            "warn" => Self::Warning(side()?),
            "kd" => Self::Knockdown(side()?),
            "fault" => {
                let side = side()?;
                let fault = match args.next().map(str::to_ascii_lowercase).as_deref() {
                    Some("net") => FaultKind::Net,
                    Some("foot") => FaultKind::Foot,
                    Some("service") => FaultKind::Service,
                    _ => return Err(String::from("expected a net, foot or service fault")),
                };

                return Ok(Self::Fault(side, fault));
            }
            "card" => {
                let side = side()?;
                let color = match args.next().map(str::to_ascii_lowercase).as_deref() {
                    Some("yellow") => CardColor::Yellow,
                    Some("red") => CardColor::Red,
                    _ => return Err(String::from("expected a yellow or red card")),
                };

                return Ok(Self::Card(side, color));
            }
            "round" => {
                let side = side()?;
                let score = args
                    .next()
                    .ok_or_else(|| String::from("round requires a score"))
                    .and_then(parse_number)?;

                return Ok(Self::RoundScore(side, score));
            }
            "tick" => {
                let seconds = args
                    .next()
                    .ok_or_else(|| String::from("tick requires a number of seconds"))
                    .and_then(parse_number)?;

                return Ok(Self::Tick(seconds));
            }
            "poss" => Self::Possession,
            "switch" => Self::Switch,
            "start" => Self::Start,
            "stop" => Self::Stop,
            "end" => Self::EndPeriod,
            "resume" => Self::Resume,
            "finish" => Self::Finish,
            "cancel" => Self::Cancel,
            "confirm" => Self::Confirm,
            "help" | "?" => Self::Help,
            "quit" | "q" => Self::Quit,
            _ => return Err(format!("unknown command {:?}, type 'help'", command)),
        };

        Ok(action)
    }
}

fn parse_number(s: &str) -> Result<u32, String> {
    s.parse().map_err(|_| format!("invalid number {:?}", s))
}

#[cfg(test)]
mod tests {
    use scorekeeper_core::options::Error;
    use scorekeeper_core::{CardColor, FaultKind, Side, Sport};

    use super::{report, rules, Action};

    #[test]
    fn test_action_from_str() {
        assert_eq!("a".parse(), Ok(Action::Point(Side::A, 1)));
        assert_eq!("b 3".parse(), Ok(Action::Point(Side::B, 3)));
        assert_eq!("undo 2".parse(), Ok(Action::Undo(Side::B)));
        assert_eq!("fault a NET".parse(), Ok(Action::Fault(Side::A, FaultKind::Net)));
        assert_eq!("card b red".parse(), Ok(Action::Card(Side::B, CardColor::Red)));
        assert_eq!("round a 9".parse(), Ok(Action::RoundScore(Side::A, 9)));
        assert_eq!("tick 30".parse(), Ok(Action::Tick(30)));
        assert_eq!("Confirm".parse(), Ok(Action::Confirm));

        assert!("foul".parse::<Action>().is_err());
        assert!("card a green".parse::<Action>().is_err());
        assert!("a x".parse::<Action>().is_err());
        assert!("dance".parse::<Action>().is_err());
    }

    #[test]
    fn test_rules_from_assignments() {
        let rules = rules(
            Sport::Volleyball,
            &[String::from("points_per_set=15"), String::from("sets_to_win=2")],
        )
        .unwrap();
        assert_eq!(rules.period_target, Some(15));
        assert_eq!(rules.best_of, 3);

        assert!(matches!(
            super::rules(Sport::Volleyball, &[String::from("quarters=4")]),
            Err(Error::UnknownKey(_))
        ));
        assert!(matches!(
            super::rules(Sport::Boxing, &[String::from("rounds=twelve")]),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_action_apply() {
        let mut engine = scorekeeper_core::ScoringEngine::for_sport(
            Sport::Basketball,
            [String::from("Bulls"), String::from("Lakers")],
        );

        Action::Point(Side::A, 3).apply(&mut engine).unwrap();
        Action::Start.apply(&mut engine).unwrap();
        assert!(engine.clock().unwrap().is_running());
        Action::Stop.apply(&mut engine).unwrap();
        assert!(!engine.clock().unwrap().is_running());

        assert_eq!(engine.scores(), [3, 0]);

        let mut engine = scorekeeper_core::ScoringEngine::for_sport(
            Sport::Volleyball,
            [String::from("A"), String::from("B")],
        );
        assert!(Action::Start.apply(&mut engine).is_err());
    }

    #[test]
    fn test_action_report() {
        let mut engine = scorekeeper_core::ScoringEngine::for_sport(
            Sport::Badminton,
            [String::from("A"), String::from("B")],
        );

        for _ in 0..20 {
            let outcome = Action::Point(Side::A, 1).apply(&mut engine);
            report(&engine, outcome);
        }

        let outcome = Action::Point(Side::A, 1).apply(&mut engine);
        assert_eq!(
            outcome,
            Ok(scorekeeper_core::Transition::PeriodWon {
                period: 1,
                winner: Side::A
            })
        );
        report(&engine, outcome);
        assert_eq!(engine.period(), 2);
    }
}
