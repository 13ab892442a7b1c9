use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub discord: DiscordConfig,
    pub server: ServerConfig,
    pub engines: EngineConfig,
    pub commands: CommandConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DiscordConfig {
    pub application_id: String,
    pub public_key: String,
    pub bot_token: SecretString,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

/// External programs driven by `/maketeams`.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub validator_program: String,
    pub validator_args: Vec<String>,
    pub rejection_marker: String,
    pub matchmaker_program: String,
    pub matchmaker_args: Vec<String>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct CommandConfig {
    pub form_url: String,
    pub league_url: String,
    pub old_reply: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub port: Option<u16>,
    pub discord_application_id: Option<String>,
    pub discord_public_key: Option<String>,
    pub discord_bot_token: Option<String>,
    pub discord_api_base_url: Option<String>,
    pub validator_program: Option<String>,
    pub matchmaker_program: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            discord: DiscordConfig {
                application_id: String::new(),
                public_key: String::new(),
                bot_token: String::new().into(),
                api_base_url: "https://discord.com/api/v10".to_string(),
                request_timeout_secs: 10,
            },
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 3000,
                graceful_shutdown_secs: 15,
            },
            engines: EngineConfig {
                validator_program: "python".to_string(),
                validator_args: vec!["../survey_collection/data.py".to_string()],
                rejection_marker: "ValueError".to_string(),
                matchmaker_program: "../matchmaker/target/release/matchmaker".to_string(),
                matchmaker_args: Vec::new(),
                timeout_secs: 120,
            },
            commands: CommandConfig {
                form_url: "https://forms.gle/Ugy2zRhVFZ6jSgs89".to_string(),
                league_url:
                    "https://www.dotabuff.com/esports/leagues/18174-the-fellas-inhouse-league"
                        .to_string(),
                old_reply: "soumar old".to_string(),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("inhouse.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(discord) = patch.discord {
            if let Some(application_id) = discord.application_id {
                self.discord.application_id = application_id;
            }
            if let Some(public_key) = discord.public_key {
                self.discord.public_key = public_key;
            }
            if let Some(bot_token_value) = discord.bot_token {
                self.discord.bot_token = secret_value(bot_token_value);
            }
            if let Some(api_base_url) = discord.api_base_url {
                self.discord.api_base_url = api_base_url;
            }
            if let Some(request_timeout_secs) = discord.request_timeout_secs {
                self.discord.request_timeout_secs = request_timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(engines) = patch.engines {
            if let Some(validator_program) = engines.validator_program {
                self.engines.validator_program = validator_program;
            }
            if let Some(validator_args) = engines.validator_args {
                self.engines.validator_args = validator_args;
            }
            if let Some(rejection_marker) = engines.rejection_marker {
                self.engines.rejection_marker = rejection_marker;
            }
            if let Some(matchmaker_program) = engines.matchmaker_program {
                self.engines.matchmaker_program = matchmaker_program;
            }
            if let Some(matchmaker_args) = engines.matchmaker_args {
                self.engines.matchmaker_args = matchmaker_args;
            }
            if let Some(timeout_secs) = engines.timeout_secs {
                self.engines.timeout_secs = timeout_secs;
            }
        }

        if let Some(commands) = patch.commands {
            if let Some(form_url) = commands.form_url {
                self.commands.form_url = form_url;
            }
            if let Some(league_url) = commands.league_url {
                self.commands.league_url = league_url;
            }
            if let Some(old_reply) = commands.old_reply {
                self.commands.old_reply = old_reply;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("INHOUSE_DISCORD_APPLICATION_ID") {
            self.discord.application_id = value;
        }
        if let Some(value) = read_env("INHOUSE_DISCORD_PUBLIC_KEY") {
            self.discord.public_key = value;
        }
        if let Some(value) = read_env("INHOUSE_DISCORD_BOT_TOKEN") {
            self.discord.bot_token = secret_value(value);
        }
        if let Some(value) = read_env("INHOUSE_DISCORD_API_BASE_URL") {
            self.discord.api_base_url = value;
        }
        if let Some(value) = read_env("INHOUSE_DISCORD_REQUEST_TIMEOUT_SECS") {
            self.discord.request_timeout_secs =
                parse_u64("INHOUSE_DISCORD_REQUEST_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("INHOUSE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("INHOUSE_SERVER_PORT").or_else(|| read_env("PORT")) {
            self.server.port = parse_u16("INHOUSE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("INHOUSE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("INHOUSE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("INHOUSE_VALIDATOR_PROGRAM") {
            self.engines.validator_program = value;
        }
        if let Some(value) = read_env("INHOUSE_VALIDATOR_ARGS") {
            self.engines.validator_args = split_args(&value);
        }
        if let Some(value) = read_env("INHOUSE_VALIDATOR_REJECTION_MARKER") {
            self.engines.rejection_marker = value;
        }
        if let Some(value) = read_env("INHOUSE_MATCHMAKER_PROGRAM") {
            self.engines.matchmaker_program = value;
        }
        if let Some(value) = read_env("INHOUSE_MATCHMAKER_ARGS") {
            self.engines.matchmaker_args = split_args(&value);
        }
        if let Some(value) = read_env("INHOUSE_ENGINE_TIMEOUT_SECS") {
            self.engines.timeout_secs = parse_u64("INHOUSE_ENGINE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("INHOUSE_COMMANDS_FORM_URL") {
            self.commands.form_url = value;
        }
        if let Some(value) = read_env("INHOUSE_COMMANDS_LEAGUE_URL") {
            self.commands.league_url = value;
        }
        if let Some(value) = read_env("INHOUSE_COMMANDS_OLD_REPLY") {
            self.commands.old_reply = value;
        }

        let log_level =
            read_env("INHOUSE_LOGGING_LEVEL").or_else(|| read_env("INHOUSE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("INHOUSE_LOGGING_FORMAT").or_else(|| read_env("INHOUSE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(application_id) = overrides.discord_application_id {
            self.discord.application_id = application_id;
        }
        if let Some(public_key) = overrides.discord_public_key {
            self.discord.public_key = public_key;
        }
        if let Some(bot_token) = overrides.discord_bot_token {
            self.discord.bot_token = secret_value(bot_token);
        }
        if let Some(api_base_url) = overrides.discord_api_base_url {
            self.discord.api_base_url = api_base_url;
        }
        if let Some(validator_program) = overrides.validator_program {
            self.engines.validator_program = validator_program;
        }
        if let Some(matchmaker_program) = overrides.matchmaker_program {
            self.engines.matchmaker_program = matchmaker_program;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_discord(&self.discord)?;
        validate_server(&self.server)?;
        validate_engines(&self.engines)?;
        validate_commands(&self.commands)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("inhouse.toml"), PathBuf::from("config/inhouse.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_discord(discord: &DiscordConfig) -> Result<(), ConfigError> {
    let application_id = discord.application_id.trim();
    if application_id.is_empty() {
        return Err(ConfigError::Validation(
            "discord.application_id is required. Get it from https://discord.com/developers/applications > Your App > General Information".to_string(),
        ));
    }
    if !application_id.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(ConfigError::Validation(
            "discord.application_id must be a numeric snowflake".to_string(),
        ));
    }

    let public_key = discord.public_key.trim();
    if public_key.len() != 64 || !public_key.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(ConfigError::Validation(
            "discord.public_key must be the 64-character hex key shown under General Information"
                .to_string(),
        ));
    }

    if discord.bot_token.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "discord.bot_token is required. Get it from https://discord.com/developers/applications > Your App > Bot".to_string(),
        ));
    }

    if !discord.api_base_url.starts_with("http://") && !discord.api_base_url.starts_with("https://")
    {
        return Err(ConfigError::Validation(
            "discord.api_base_url must start with http:// or https://".to_string(),
        ));
    }

    if discord.request_timeout_secs == 0 || discord.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "discord.request_timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_engines(engines: &EngineConfig) -> Result<(), ConfigError> {
    if engines.validator_program.trim().is_empty() {
        return Err(ConfigError::Validation(
            "engines.validator_program must not be empty".to_string(),
        ));
    }
    if engines.matchmaker_program.trim().is_empty() {
        return Err(ConfigError::Validation(
            "engines.matchmaker_program must not be empty".to_string(),
        ));
    }
    if engines.rejection_marker.trim().is_empty() {
        return Err(ConfigError::Validation(
            "engines.rejection_marker must not be empty".to_string(),
        ));
    }
    if engines.timeout_secs == 0 || engines.timeout_secs > 900 {
        return Err(ConfigError::Validation(
            "engines.timeout_secs must be in range 1..=900".to_string(),
        ));
    }

    Ok(())
}

fn validate_commands(commands: &CommandConfig) -> Result<(), ConfigError> {
    let urls =
        [("commands.form_url", &commands.form_url), ("commands.league_url", &commands.league_url)];
    for (key, url) in urls {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "{key} must start with http:// or https://"
            )));
        }
    }

    if commands.old_reply.trim().is_empty() {
        return Err(ConfigError::Validation("commands.old_reply must not be empty".to_string()));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn split_args(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_owned).collect()
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    discord: Option<DiscordPatch>,
    server: Option<ServerPatch>,
    engines: Option<EnginePatch>,
    commands: Option<CommandPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DiscordPatch {
    application_id: Option<String>,
    public_key: Option<String>,
    bot_token: Option<String>,
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct EnginePatch {
    validator_program: Option<String>,
    validator_args: Option<Vec<String>>,
    rejection_marker: Option<String>,
    matchmaker_program: Option<String>,
    matchmaker_args: Option<Vec<String>>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct CommandPatch {
    form_url: Option<String>,
    league_url: Option<String>,
    old_reply: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
