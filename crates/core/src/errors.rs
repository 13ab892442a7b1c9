use thiserror::Error;

use crate::domain::outcome::{
    PipelineOutcome, GENERIC_VALIDATION_REASON, MATCHMAKER_FAILURE_REASON,
    VALIDATION_TIMEOUT_REASON,
};
use crate::domain::player::REQUIRED_PLAYERS;

/// Rejection of a `/maketeams` invocation before anything is deferred.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("expected {expected} player options, found {found}")]
    NotEnoughPlayers { expected: usize, found: usize },
    #[error("player option {position} does not carry a user id")]
    InvalidPlayer { position: usize },
    #[error("solution count must be a positive integer, got `{value}`")]
    InvalidSolutionCount { value: String },
}

impl OptionsError {
    pub fn user_message(&self) -> String {
        match self {
            Self::NotEnoughPlayers { .. } | Self::InvalidPlayer { .. } => {
                format!("You must specify exactly {REQUIRED_PLAYERS} players")
            }
            Self::InvalidSolutionCount { .. } => {
                "The number of solutions must be a positive integer".to_owned()
            }
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("user lookup transport failed: {0}")]
    Transport(String),
    #[error("user lookup returned status {status}")]
    Status { status: u16 },
    #[error("user lookup response could not be decoded: {0}")]
    Decode(String),
    #[error("user lookup timed out")]
    Timeout,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("validator rejected players: {reason}")]
    Rejected { reason: String },
    #[error("validator exited unsuccessfully (code {code:?})")]
    Failed { code: Option<i32>, stderr: String },
    #[error("validator could not be started: {0}")]
    Spawn(String),
    #[error("validator timed out")]
    Timeout,
}

impl ValidationError {
    pub fn into_outcome(self) -> PipelineOutcome {
        match self {
            Self::Rejected { reason } => PipelineOutcome::Failure { reason, user_facing: true },
            Self::Failed { .. } | Self::Spawn(_) => PipelineOutcome::Failure {
                reason: GENERIC_VALIDATION_REASON.to_owned(),
                user_facing: false,
            },
            Self::Timeout => PipelineOutcome::Failure {
                reason: VALIDATION_TIMEOUT_REASON.to_owned(),
                user_facing: false,
            },
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MatchmakingError {
    #[error("matchmaker could not be started: {0}")]
    Spawn(String),
    #[error("matchmaker exited unsuccessfully (code {code:?})")]
    Exit { code: Option<i32>, stderr: String },
    #[error("matchmaker timed out")]
    Timeout,
}

impl MatchmakingError {
    pub fn into_outcome(self) -> PipelineOutcome {
        PipelineOutcome::Failure {
            reason: MATCHMAKER_FAILURE_REASON.to_owned(),
            user_facing: false,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("follow-up transport failed: {0}")]
    Transport(String),
    #[error("follow-up returned status {status}")]
    Status { status: u16 },
    #[error("follow-up timed out")]
    Timeout,
}

/// Rejection returned to Discord synchronously. `detail` is for logs only;
/// the caller sees [`InterfaceError::user_message`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {detail}")]
    BadRequest { message: String, detail: String, correlation_id: String },
    #[error("unauthorized: {detail}")]
    Unauthorized { detail: String, correlation_id: String },
}

impl InterfaceError {
    pub fn bad_request(
        message: impl Into<String>,
        detail: impl Into<String>,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self::BadRequest {
            message: message.into(),
            detail: detail.into(),
            correlation_id: correlation_id.into(),
        }
    }

    pub fn unauthorized(detail: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self::Unauthorized { detail: detail.into(), correlation_id: correlation_id.into() }
    }

    pub fn user_message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. } => message,
            Self::Unauthorized { .. } => "invalid request signature",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::Unauthorized { correlation_id, .. } => correlation_id,
        }
    }
}

impl OptionsError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        InterfaceError::bad_request(self.user_message(), self.to_string(), correlation_id)
    }
}
