use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use inhouse_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

pub fn run() -> String {
    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => render(&config),
        Err(error) => format!("config validation failed: {error}"),
    }
}

struct Row {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

fn row(key: &'static str, value: String, env_keys: &'static [&'static str]) -> Row {
    Row { key, value, env_keys }
}

fn rows(config: &AppConfig) -> Vec<Row> {
    let discord = &config.discord;
    let engines = &config.engines;
    vec![
        row(
            "discord.application_id",
            discord.application_id.clone(),
            &["INHOUSE_DISCORD_APPLICATION_ID"],
        ),
        row("discord.public_key", discord.public_key.clone(), &["INHOUSE_DISCORD_PUBLIC_KEY"]),
        row(
            "discord.bot_token",
            redact_token(discord.bot_token.expose_secret()),
            &["INHOUSE_DISCORD_BOT_TOKEN"],
        ),
        row(
            "discord.api_base_url",
            discord.api_base_url.clone(),
            &["INHOUSE_DISCORD_API_BASE_URL"],
        ),
        row(
            "discord.request_timeout_secs",
            discord.request_timeout_secs.to_string(),
            &["INHOUSE_DISCORD_REQUEST_TIMEOUT_SECS"],
        ),
        row(
            "server.bind_address",
            config.server.bind_address.clone(),
            &["INHOUSE_SERVER_BIND_ADDRESS"],
        ),
        row("server.port", config.server.port.to_string(), &["INHOUSE_SERVER_PORT", "PORT"]),
        row(
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["INHOUSE_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        row(
            "engines.validator_program",
            engines.validator_program.clone(),
            &["INHOUSE_VALIDATOR_PROGRAM"],
        ),
        row(
            "engines.validator_args",
            engines.validator_args.join(" "),
            &["INHOUSE_VALIDATOR_ARGS"],
        ),
        row(
            "engines.rejection_marker",
            engines.rejection_marker.clone(),
            &["INHOUSE_VALIDATOR_REJECTION_MARKER"],
        ),
        row(
            "engines.matchmaker_program",
            engines.matchmaker_program.clone(),
            &["INHOUSE_MATCHMAKER_PROGRAM"],
        ),
        row(
            "engines.matchmaker_args",
            engines.matchmaker_args.join(" "),
            &["INHOUSE_MATCHMAKER_ARGS"],
        ),
        row(
            "engines.timeout_secs",
            engines.timeout_secs.to_string(),
            &["INHOUSE_ENGINE_TIMEOUT_SECS"],
        ),
        row("commands.form_url", config.commands.form_url.clone(), &["INHOUSE_COMMANDS_FORM_URL"]),
        row(
            "commands.league_url",
            config.commands.league_url.clone(),
            &["INHOUSE_COMMANDS_LEAGUE_URL"],
        ),
        row(
            "commands.old_reply",
            config.commands.old_reply.clone(),
            &["INHOUSE_COMMANDS_OLD_REPLY"],
        ),
        row(
            "logging.level",
            config.logging.level.clone(),
            &["INHOUSE_LOGGING_LEVEL", "INHOUSE_LOG_LEVEL"],
        ),
        row(
            "logging.format",
            format!("{:?}", config.logging.format).to_ascii_lowercase(),
            &["INHOUSE_LOGGING_FORMAT", "INHOUSE_LOG_FORMAT"],
        ),
    ]
}

pub fn render(config: &AppConfig) -> String {
    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for Row { key, value, env_keys } in rows(config) {
        let source =
            field_source(key, env_keys, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(format!("- {key} = {value} (source: {source})"));
    }
    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("inhouse.toml"), PathBuf::from("config/inhouse.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

/// Keeps the first four characters so operators can tell tokens apart.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    match trimmed.char_indices().nth(4) {
        Some((end, _)) => format!("{}***", &trimmed[..end]),
        None => "<redacted>".to_string(),
    }
}
