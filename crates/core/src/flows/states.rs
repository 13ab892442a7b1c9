use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamFlowState {
    Received,
    OptionsValidated,
    OptionsInvalid,
    Deferred,
    NamesResolved,
    Validated,
    ValidationFailed,
    TeamsComputed,
    MatchmakingFailed,
    Notified,
}

impl TeamFlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::OptionsInvalid | Self::Notified)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamFlowEvent {
    OptionsAccepted,
    OptionsRejected,
    AcknowledgementDeferred,
    NamesResolved,
    ValidationPassed,
    ValidationRejected,
    TeamsFormed,
    MatchmakingErrored,
    FollowupAttempted,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: TeamFlowState,
    pub to: TeamFlowState,
    pub event: TeamFlowEvent,
}
