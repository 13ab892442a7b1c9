use std::env;
use std::sync::{Mutex, OnceLock};

use ed25519_dalek::SigningKey;
use inhouse_cli::commands::{config, doctor, register};
use serde_json::Value;

const APPLICATION_ID: &str = "123456789012345678";
const BOT_TOKEN: &str = "MTIzNDU2.bot-token-secret";

fn public_key() -> String {
    hex::encode(SigningKey::from_bytes(&[5u8; 32]).verifying_key().to_bytes())
}

#[test]
fn register_dry_run_prints_all_command_schemas_without_config() {
    with_env(&[], || {
        let result = register::run(true);
        assert_eq!(result.exit_code, 0, "expected dry run to succeed");

        let payload = parse_payload(&result.output);
        let names = payload
            .as_array()
            .map(|commands| commands.iter().map(|c| c["name"].clone()).collect::<Vec<_>>())
            .unwrap_or_default();
        assert_eq!(names, ["roll", "maketeams", "form", "league", "old"]);
        assert_eq!(payload[1]["options"].as_array().map(Vec::len), Some(11));
    });
}

#[test]
fn register_returns_config_failure_without_credentials() {
    with_env(&[], || {
        let result = register::run(false);
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "register");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn register_reports_unreachable_discord_api() {
    let key = public_key();
    with_env(
        &[
            ("INHOUSE_DISCORD_APPLICATION_ID", APPLICATION_ID),
            ("INHOUSE_DISCORD_PUBLIC_KEY", &key),
            ("INHOUSE_DISCORD_BOT_TOKEN", BOT_TOKEN),
            ("INHOUSE_DISCORD_API_BASE_URL", "http://127.0.0.1:9"),
            ("INHOUSE_DISCORD_REQUEST_TIMEOUT_SECS", "2"),
        ],
        || {
            let result = register::run(false);
            assert_eq!(result.exit_code, 4, "expected registration failure code");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["status"], "error");
            assert_eq!(payload["error_class"], "discord_api");
        },
    );
}

#[test]
fn doctor_passes_when_key_and_programs_resolve() {
    let key = public_key();
    with_env(
        &[
            ("INHOUSE_DISCORD_APPLICATION_ID", APPLICATION_ID),
            ("INHOUSE_DISCORD_PUBLIC_KEY", &key),
            ("INHOUSE_DISCORD_BOT_TOKEN", BOT_TOKEN),
            ("INHOUSE_VALIDATOR_PROGRAM", "sh"),
            ("INHOUSE_MATCHMAKER_PROGRAM", "sh"),
        ],
        || {
            let result = doctor::run(true);
            assert_eq!(result.exit_code, 0, "expected doctor pass: {}", result.output);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["overall_status"], "pass");
            assert_eq!(payload["checks"].as_array().map(Vec::len), Some(4));
        },
    );
}

#[test]
fn doctor_skips_dependent_checks_when_config_is_invalid() {
    with_env(&[], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 3, "expected doctor failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][0]["name"], "config_validation");
        assert_eq!(payload["checks"][0]["status"], "fail");
        assert_eq!(payload["checks"][3]["name"], "matchmaker_program");
        assert_eq!(payload["checks"][3]["status"], "skipped");
    });
}

#[test]
fn doctor_flags_missing_matchmaker_in_human_output() {
    let key = public_key();
    with_env(
        &[
            ("INHOUSE_DISCORD_APPLICATION_ID", APPLICATION_ID),
            ("INHOUSE_DISCORD_PUBLIC_KEY", &key),
            ("INHOUSE_DISCORD_BOT_TOKEN", BOT_TOKEN),
            ("INHOUSE_VALIDATOR_PROGRAM", "sh"),
            ("INHOUSE_MATCHMAKER_PROGRAM", "/nonexistent/matchmaker"),
        ],
        || {
            let result = doctor::run(false);
            assert_eq!(result.exit_code, 3);
            assert!(result.output.starts_with("doctor: one or more readiness checks failed"));
            assert!(result.output.contains("- [ok] validator_program"));
            assert!(result.output.contains("- [fail] matchmaker_program"));
        },
    );
}

#[test]
fn config_redacts_bot_token_and_attributes_env_sources() {
    let key = public_key();
    with_env(
        &[
            ("INHOUSE_DISCORD_APPLICATION_ID", APPLICATION_ID),
            ("INHOUSE_DISCORD_PUBLIC_KEY", &key),
            ("INHOUSE_DISCORD_BOT_TOKEN", BOT_TOKEN),
            ("PORT", "8080"),
        ],
        || {
            let output = config::run();

            assert!(!output.contains(BOT_TOKEN), "token leaked: {output}");
            let token_row =
                "- discord.bot_token = MTIz*** (source: env (INHOUSE_DISCORD_BOT_TOKEN))";
            assert!(output.contains(token_row));
            assert!(output.contains("- server.port = 8080 (source: env (PORT))"));
            assert!(output.contains("- engines.rejection_marker = ValueError (source: default)"));
        },
    );
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "INHOUSE_DISCORD_APPLICATION_ID",
        "INHOUSE_DISCORD_PUBLIC_KEY",
        "INHOUSE_DISCORD_BOT_TOKEN",
        "INHOUSE_DISCORD_API_BASE_URL",
        "INHOUSE_DISCORD_REQUEST_TIMEOUT_SECS",
        "INHOUSE_SERVER_BIND_ADDRESS",
        "INHOUSE_SERVER_PORT",
        "PORT",
        "INHOUSE_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "INHOUSE_VALIDATOR_PROGRAM",
        "INHOUSE_VALIDATOR_ARGS",
        "INHOUSE_VALIDATOR_REJECTION_MARKER",
        "INHOUSE_MATCHMAKER_PROGRAM",
        "INHOUSE_MATCHMAKER_ARGS",
        "INHOUSE_ENGINE_TIMEOUT_SECS",
        "INHOUSE_COMMANDS_FORM_URL",
        "INHOUSE_COMMANDS_LEAGUE_URL",
        "INHOUSE_COMMANDS_OLD_REPLY",
        "INHOUSE_LOGGING_LEVEL",
        "INHOUSE_LOGGING_FORMAT",
        "INHOUSE_LOG_LEVEL",
        "INHOUSE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
