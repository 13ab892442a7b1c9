pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "inhouse",
    about = "Inhouse bot operator CLI",
    long_about = "Check runtime readiness, inspect effective configuration, and register slash commands.",
    after_help = "Examples:\n  inhouse doctor --json\n  inhouse config\n  inhouse register --dry-run"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, the Discord public key, and engine program resolution")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Overwrite the application's global slash commands")]
    Register {
        #[arg(long, help = "Print the command payload without calling Discord")]
        dry_run: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Register { dry_run } => commands::register::run(dry_run),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
