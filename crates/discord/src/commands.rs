use inhouse_core::config::CommandConfig;
use inhouse_core::domain::player::{SolutionCount, TeamRequest, UserId, REQUIRED_PLAYERS};
use inhouse_core::errors::OptionsError;
use rand::Rng;

use crate::interactions::{CommandData, CommandOption, InteractionResponse};

pub const DEFAULT_ROLL_LOWER: i64 = 1;
pub const DEFAULT_ROLL_UPPER: i64 = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlashCommand {
    Roll { lower: Option<i64>, upper: Option<i64> },
    MakeTeams { request: Result<TeamRequest, OptionsError> },
    Form,
    League,
    Old,
    Unknown { name: String },
}

pub fn parse_command(data: &CommandData) -> SlashCommand {
    match data.name.as_str() {
        "roll" => SlashCommand::Roll {
            lower: named_integer(&data.options, "lower"),
            upper: named_integer(&data.options, "upper"),
        },
        "maketeams" => {
            SlashCommand::MakeTeams { request: team_request_from_options(&data.options) }
        }
        "form" => SlashCommand::Form,
        "league" => SlashCommand::League,
        "old" => SlashCommand::Old,
        other => SlashCommand::Unknown { name: other.to_owned() },
    }
}

/// Builds a team request from the positional `/maketeams` options: ten user
/// options, then an optional solution count. Anything past the eleventh
/// option is ignored.
pub fn team_request_from_options(options: &[CommandOption]) -> Result<TeamRequest, OptionsError> {
    if options.len() < REQUIRED_PLAYERS {
        return Err(OptionsError::NotEnoughPlayers {
            expected: REQUIRED_PLAYERS,
            found: options.len(),
        });
    }

    let user_ids = options[..REQUIRED_PLAYERS]
        .iter()
        .map(|option| UserId(option.snowflake().unwrap_or_default()))
        .collect();

    let solution_count = match options.get(REQUIRED_PLAYERS) {
        None => None,
        Some(option) => {
            let count = option.integer().and_then(SolutionCount::new);
            if count.is_none() {
                return Err(OptionsError::InvalidSolutionCount {
                    value: option.value.as_ref().map(ToString::to_string).unwrap_or_default(),
                });
            }
            count
        }
    };

    TeamRequest::new(user_ids, solution_count)
}

fn named_integer(options: &[CommandOption], name: &str) -> Option<i64> {
    options.iter().find(|option| option.name == name).and_then(CommandOption::integer)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RollOutcome {
    pub lower: i64,
    pub upper: i64,
    pub value: i64,
}

impl RollOutcome {
    pub fn content(&self) -> String {
        format!("Roll ({}-{}): {}", self.lower, self.upper, self.value)
    }
}

/// Inclusive roll; reversed bounds are swapped.
pub fn roll_between<R: Rng + ?Sized>(lower: i64, upper: i64, rng: &mut R) -> RollOutcome {
    let (lower, upper) = if lower > upper { (upper, lower) } else { (lower, upper) };
    RollOutcome { lower, upper, value: rng.gen_range(lower..=upper) }
}

/// What the HTTP layer should do with a routed command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandReply {
    Immediate(InteractionResponse),
    MakeTeams(Result<TeamRequest, OptionsError>),
    Unknown { name: String },
}

#[derive(Clone, Debug)]
pub struct CommandRouter {
    replies: CommandConfig,
}

impl CommandRouter {
    pub fn new(replies: CommandConfig) -> Self {
        Self { replies }
    }

    pub fn route(&self, data: &CommandData) -> CommandReply {
        match parse_command(data) {
            SlashCommand::Roll { lower, upper } => {
                let outcome = roll_between(
                    lower.unwrap_or(DEFAULT_ROLL_LOWER),
                    upper.unwrap_or(DEFAULT_ROLL_UPPER),
                    &mut rand::thread_rng(),
                );
                CommandReply::Immediate(InteractionResponse::message(outcome.content()))
            }
            SlashCommand::MakeTeams { request } => CommandReply::MakeTeams(request),
            SlashCommand::Form => {
                CommandReply::Immediate(InteractionResponse::ephemeral(&self.replies.form_url))
            }
            SlashCommand::League => {
                CommandReply::Immediate(InteractionResponse::ephemeral(&self.replies.league_url))
            }
            SlashCommand::Old => {
                CommandReply::Immediate(InteractionResponse::ephemeral(&self.replies.old_reply))
            }
            SlashCommand::Unknown { name } => CommandReply::Unknown { name },
        }
    }
}

#[cfg(test)]
mod tests {
    use inhouse_core::config::AppConfig;
    use inhouse_core::errors::OptionsError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::{json, Value};

    use super::{
        parse_command, roll_between, team_request_from_options, CommandReply, CommandRouter,
        SlashCommand,
    };
    use crate::interactions::{CommandData, CommandOption, EPHEMERAL_FLAG};

    fn option(name: &str, value: Value) -> CommandOption {
        CommandOption { name: name.to_owned(), kind: 6, value: Some(value) }
    }

    fn players(count: usize) -> Vec<CommandOption> {
        (1..=count).map(|n| option(&format!("player{n}"), json!(format!("{n}00")))).collect()
    }

    fn command(name: &str, options: Vec<CommandOption>) -> CommandData {
        CommandData { name: name.to_owned(), options }
    }

    #[test]
    fn fewer_than_ten_players_is_rejected() {
        let error = team_request_from_options(&players(9)).expect_err("must fail");
        assert_eq!(error, OptionsError::NotEnoughPlayers { expected: 10, found: 9 });
        assert_eq!(error.user_message(), "You must specify exactly 10 players");
    }

    #[test]
    fn eleventh_option_becomes_the_solution_count() {
        let mut options = players(10);
        options.push(CommandOption { name: "num".to_owned(), kind: 4, value: Some(json!(4)) });

        let request = team_request_from_options(&options).expect("valid");
        assert_eq!(request.solution_count().map(|count| count.get()), Some(4));
        assert_eq!(request.user_ids()[0].as_str(), "100");
        assert_eq!(request.user_ids()[9].as_str(), "1000");

        let without = team_request_from_options(&players(10)).expect("valid");
        assert_eq!(without.solution_count(), None);
    }

    #[test]
    fn non_positive_solution_count_is_rejected() {
        let mut options = players(10);
        options.push(CommandOption { name: "num".to_owned(), kind: 4, value: Some(json!(0)) });

        let error = team_request_from_options(&options).expect_err("must fail");
        assert_eq!(error, OptionsError::InvalidSolutionCount { value: "0".to_owned() });
    }

    #[test]
    fn non_string_player_value_is_reported_by_position() {
        let mut options = players(10);
        options[3] = option("player4", json!(true));

        let error = team_request_from_options(&options).expect_err("must fail");
        assert_eq!(error, OptionsError::InvalidPlayer { position: 4 });
    }

    #[test]
    fn roll_options_are_looked_up_by_name() {
        let parsed = parse_command(&command(
            "roll",
            vec![option("upper", json!(20)), option("lower", json!(5))],
        ));
        assert_eq!(parsed, SlashCommand::Roll { lower: Some(5), upper: Some(20) });
        assert_eq!(
            parse_command(&command("roll", Vec::new())),
            SlashCommand::Roll { lower: None, upper: None }
        );
    }

    #[test]
    fn roll_is_inclusive_and_swaps_reversed_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let outcome = roll_between(6, 1, &mut rng);
            assert_eq!((outcome.lower, outcome.upper), (1, 6));
            assert!((1..=6).contains(&outcome.value));
        }
        let fixed = roll_between(3, 3, &mut rng);
        assert_eq!(fixed.content(), "Roll (3-3): 3");
    }

    #[test]
    fn router_answers_static_commands_ephemerally_and_flags_unknown() {
        let config = AppConfig::default();
        let router = CommandRouter::new(config.commands.clone());

        for (name, expected) in [
            ("form", config.commands.form_url.as_str()),
            ("league", config.commands.league_url.as_str()),
            ("old", "soumar old"),
        ] {
            let reply = router.route(&command(name, Vec::new()));
            let response = match reply {
                CommandReply::Immediate(response) => response,
                other => panic!("expected immediate reply for {name}, got {other:?}"),
            };
            let data = response.data.expect("message data");
            assert_eq!(response.kind, 4);
            assert_eq!(data.content, expected);
            assert_eq!(data.flags, Some(EPHEMERAL_FLAG));
        }

        assert_eq!(
            router.route(&command("dance", Vec::new())),
            CommandReply::Unknown { name: "dance".to_owned() }
        );
    }

    #[test]
    fn router_roll_reply_is_public_and_in_default_range() {
        let router = CommandRouter::new(AppConfig::default().commands);
        let response = match router.route(&command("roll", Vec::new())) {
            CommandReply::Immediate(response) => response,
            other => panic!("expected immediate reply, got {other:?}"),
        };
        let data = response.data.expect("message data");
        assert!(data.content.starts_with("Roll (1-100): "));
        assert_eq!(data.flags, None);
    }

    #[test]
    fn router_hands_maketeams_to_the_pipeline() {
        let router = CommandRouter::new(AppConfig::default().commands);
        let reply = router.route(&command("maketeams", players(10)));
        assert!(matches!(reply, CommandReply::MakeTeams(Ok(_))));
    }
}
