use inhouse_core::config::{AppConfig, ConfigError, LoadOptions};
use inhouse_discord::signature::SignatureVerifier;
use serde::Serialize;

use super::{CommandResult, EXIT_DOCTOR};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

const DEPENDENT_CHECKS: [&str; 3] =
    ["discord_public_key", "validator_program", "matchmaker_program"];

pub fn run(json_output: bool) -> CommandResult {
    report_for(AppConfig::load(LoadOptions::default()), json_output)
}

pub fn report_for(
    config: Result<AppConfig, ConfigError>,
    json_output: bool,
) -> CommandResult {
    let report = build_report(config);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { EXIT_DOCTOR };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(config: Result<AppConfig, ConfigError>) -> DoctorReport {
    let mut checks = Vec::new();

    match config {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_public_key(&config.discord.public_key));
            checks.push(check_program("validator_program", &config.engines.validator_program));
            checks.push(check_program("matchmaker_program", &config.engines.matchmaker_program));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.extend(DEPENDENT_CHECKS.into_iter().map(|name| DoctorCheck {
                name,
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            }));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_public_key(public_key: &str) -> DoctorCheck {
    match SignatureVerifier::from_hex(public_key) {
        Ok(_) => DoctorCheck {
            name: "discord_public_key",
            status: CheckStatus::Pass,
            details: "public key decodes as an Ed25519 point".to_string(),
        },
        Err(error) => DoctorCheck {
            name: "discord_public_key",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_program(name: &'static str, program: &str) -> DoctorCheck {
    match which::which(program) {
        Ok(path) => DoctorCheck {
            name,
            status: CheckStatus::Pass,
            details: format!("`{program}` resolves to {}", path.display()),
        },
        Err(error) => DoctorCheck {
            name,
            status: CheckStatus::Fail,
            details: format!("`{program}` not found: {error}"),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = vec![report.summary.clone()];

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
