use inhouse_core::config::{AppConfig, LoadOptions};
use inhouse_discord::registration::{command_schemas, register_commands};
use inhouse_discord::DiscordClient;

use super::{CommandResult, EXIT_CONFIG, EXIT_REGISTRATION};

pub fn run(dry_run: bool) -> CommandResult {
    let schemas = command_schemas();
    if dry_run {
        return match serde_json::to_string_pretty(&schemas) {
            Ok(output) => CommandResult { exit_code: 0, output },
            Err(error) => CommandResult::failure(
                "register",
                "serialization",
                error.to_string(),
                EXIT_REGISTRATION,
            ),
        };
    }

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "register",
                "config_validation",
                error.to_string(),
                EXIT_CONFIG,
            )
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "register",
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                EXIT_REGISTRATION,
            )
        }
    };

    let result = runtime.block_on(async {
        let client = DiscordClient::new(&config.discord).map_err(|error| error.to_string())?;
        register_commands(&client, &config.discord.application_id, &schemas)
            .await
            .map_err(|error| error.to_string())
    });

    match result {
        Ok(()) => CommandResult::success(
            "register",
            format!(
                "registered {} commands for application {}",
                schemas.len(),
                config.discord.application_id
            ),
        ),
        Err(error) => CommandResult::failure("register", "discord_api", error, EXIT_REGISTRATION),
    }
}
