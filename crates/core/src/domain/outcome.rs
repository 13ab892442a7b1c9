use crate::domain::player::ResolvedPlayer;

pub const GENERIC_VALIDATION_REASON: &str = "At least one invalid username";
pub const VALIDATION_TIMEOUT_REASON: &str = "Timed out validating players.";
pub const MATCHMAKER_FAILURE_REASON: &str = "Error running matchmaker.";

/// Terminal result of one team-formation run, delivered once as a follow-up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PipelineOutcome {
    Success { teams_text: String },
    Failure { reason: String, user_facing: bool },
}

impl PipelineOutcome {
    pub fn success(players: &[ResolvedPlayer], matchmaker_output: &str) -> Self {
        let names =
            players.iter().map(|player| player.display_name.as_str()).collect::<Vec<_>>();
        Self::Success {
            teams_text: format!(
                "Teams formed with players: {}\n\n{}",
                names.join(", "),
                matchmaker_output.trim()
            ),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { teams_text } => teams_text,
            Self::Failure { reason, .. } => reason,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
