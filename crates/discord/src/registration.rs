use inhouse_core::domain::player::REQUIRED_PLAYERS;
use reqwest::Method;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::client::DiscordClient;

const CHAT_INPUT: u8 = 1;
const OPTION_INTEGER: u8 = 4;
const OPTION_USER: u8 = 6;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommandSchema {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub options: Vec<OptionSchema>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OptionSchema {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub required: bool,
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("command registration request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("command registration returned status {status}: {body}")]
    Status { status: u16, body: String },
}

fn command(name: &str, description: &str, options: Vec<OptionSchema>) -> CommandSchema {
    CommandSchema {
        name: name.to_owned(),
        description: description.to_owned(),
        kind: CHAT_INPUT,
        options,
    }
}

fn option(name: &str, description: &str, kind: u8, required: bool) -> OptionSchema {
    OptionSchema { name: name.to_owned(), description: description.to_owned(), kind, required }
}

pub fn command_schemas() -> Vec<CommandSchema> {
    let mut team_options = (1..=REQUIRED_PLAYERS)
        .map(|n| option(&format!("player{n}"), &format!("Player {n}"), OPTION_USER, true))
        .collect::<Vec<_>>();
    team_options.push(option("num", "Top n Solutions", OPTION_INTEGER, false));

    vec![
        command(
            "roll",
            "Roll a random number",
            vec![
                option("lower", "Lower Bound", OPTION_INTEGER, false),
                option("upper", "Upper Bound", OPTION_INTEGER, false),
            ],
        ),
        command(
            "maketeams",
            "Sorts 10 users into near-optimal inhouse teams. All users must have filled out /form.",
            team_options,
        ),
        command("form", "Requests the URL for the inhouse questionnaire.", Vec::new()),
        command("league", "Requests the URL for the inhouse dotabuff page.", Vec::new()),
        command("old", "old", Vec::new()),
    ]
}

/// Bulk-overwrites the application's global commands.
pub async fn register_commands(
    client: &DiscordClient,
    application_id: &str,
    commands: &[CommandSchema],
) -> Result<(), RegistrationError> {
    let response = client
        .authorized(Method::PUT, &format!("applications/{application_id}/commands"))
        .json(commands)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RegistrationError::Status { status: status.as_u16(), body });
    }

    info!(
        event_name = "discord.commands_registered",
        application_id,
        count = commands.len(),
        "registered global commands"
    );
    Ok(())
}
