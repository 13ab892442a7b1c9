use std::sync::Arc;
use std::time::Duration;

use inhouse_core::config::{AppConfig, ConfigError};
use inhouse_core::pipeline::{StageTimeouts, TeamFormationPipeline};
use inhouse_discord::commands::CommandRouter;
use inhouse_discord::signature::{SignatureError, SignatureVerifier};
use inhouse_discord::DiscordClient;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;

use crate::engines::{ProcessMatchmaker, ProcessValidator};
use crate::health::HealthState;
use crate::interactions::InteractionState;

pub struct Application {
    pub config: AppConfig,
    pub interactions: InteractionState,
    pub health: HealthState,
    /// Resolves to `None` once every background `/maketeams` run has finished
    /// and the interaction state has been dropped.
    pub inflight: mpsc::Receiver<()>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("discord.public_key is unusable: {0}")]
    PublicKey(#[from] SignatureError),
    #[error("http client could not be built: {0}")]
    HttpClient(#[source] reqwest::Error),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let verifier = SignatureVerifier::from_hex(&config.discord.public_key)?;
    let discord =
        Arc::new(DiscordClient::new(&config.discord).map_err(BootstrapError::HttpClient)?);

    let timeouts = StageTimeouts::new(
        Duration::from_secs(config.discord.request_timeout_secs),
        Duration::from_secs(config.engines.timeout_secs),
    );
    let pipeline = TeamFormationPipeline::new(
        discord.clone(),
        Arc::new(ProcessValidator::from_config(&config.engines)),
        Arc::new(ProcessMatchmaker::from_config(&config.engines)),
        discord,
        timeouts,
    );

    let (inflight_tx, inflight) = mpsc::channel(1);
    let interactions = InteractionState::new(
        verifier,
        CommandRouter::new(config.commands.clone()),
        pipeline,
        inflight_tx,
    );
    let health = HealthState::from_engines(&config.engines);

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        validator = %config.engines.validator_program,
        matchmaker = %config.engines.matchmaker_program,
        "interaction pipeline wired"
    );

    Ok(Application { config, interactions, health, inflight })
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::SigningKey;
    use inhouse_core::config::{AppConfig, ConfigOverrides, LoadOptions};

    use crate::bootstrap::{bootstrap_with_config, Application, BootstrapError};

    fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
        bootstrap_with_config(AppConfig::load(options)?)
    }

    fn overrides(public_key: String) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                discord_application_id: Some("123456789012345678".to_string()),
                discord_public_key: Some(public_key),
                discord_bot_token: Some("bot-token".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[test]
    fn bootstrap_fails_fast_without_bot_token() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                discord_application_id: Some("123456789012345678".to_string()),
                discord_public_key: Some("ab".repeat(32)),
                discord_bot_token: Some("  ".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        let message = result.err().expect("error").to_string();
        assert!(message.contains("discord.bot_token"), "unexpected error: {message}");
    }

    #[test]
    fn bootstrap_wires_pipeline_with_valid_key() {
        let key = SigningKey::from_bytes(&[3u8; 32]);
        let app = bootstrap(overrides(hex::encode(key.verifying_key().to_bytes())))
            .expect("bootstrap succeeds");

        assert_eq!(app.config.discord.application_id, "123456789012345678");
        assert_eq!(app.config.engines.rejection_marker, "ValueError");
    }
}
