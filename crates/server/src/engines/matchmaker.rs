use std::process::Stdio;

use async_trait::async_trait;
use inhouse_core::config::EngineConfig;
use inhouse_core::domain::player::{SolutionCount, UserId};
use inhouse_core::errors::MatchmakingError;
use inhouse_core::pipeline::Matchmaker;
use tokio::process::Command;

pub const USERS_ENV: &str = "USERS";
pub const NUM_SOLUTIONS_ENV: &str = "NUM_SOLUTIONS";

#[derive(Clone, Debug)]
pub struct ProcessMatchmaker {
    program: String,
    args: Vec<String>,
}

impl ProcessMatchmaker {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.matchmaker_program, config.matchmaker_args.clone())
    }
}

#[async_trait]
impl Matchmaker for ProcessMatchmaker {
    async fn form_teams(
        &self,
        user_ids: &[UserId],
        solution_count: Option<SolutionCount>,
    ) -> Result<String, MatchmakingError> {
        let users = user_ids.iter().map(UserId::as_str).collect::<Vec<_>>().join(",");

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .env(USERS_ENV, users)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // An inherited value must not stand in for an absent count.
        match solution_count {
            Some(count) => command.env(NUM_SOLUTIONS_ENV, count.to_string()),
            None => command.env_remove(NUM_SOLUTIONS_ENV),
        };

        let output =
            command.output().await.map_err(|error| MatchmakingError::Spawn(error.to_string()))?;

        if !output.status.success() {
            return Err(MatchmakingError::Exit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }
}
