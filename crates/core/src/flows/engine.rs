use thiserror::Error;
use tracing::{debug, warn};

use crate::flows::states::{TeamFlowEvent, TeamFlowState, TransitionOutcome};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("invalid transition from {state:?} on {event:?}")]
    InvalidTransition { state: TeamFlowState, event: TeamFlowEvent },
}

/// Transition table for one `/maketeams` invocation.
#[derive(Clone, Debug, Default)]
pub struct TeamFormationFlow;

impl TeamFormationFlow {
    pub fn initial_state(&self) -> TeamFlowState {
        TeamFlowState::Received
    }

    pub fn transition(
        &self,
        current: TeamFlowState,
        event: TeamFlowEvent,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        use TeamFlowEvent::{
            AcknowledgementDeferred, FollowupAttempted, MatchmakingErrored, NamesResolved,
            OptionsAccepted, OptionsRejected, TeamsFormed, ValidationPassed, ValidationRejected,
        };
        use TeamFlowState as S;

        let to = match (current, event) {
            (S::Received, OptionsAccepted) => S::OptionsValidated,
            (S::Received, OptionsRejected) => S::OptionsInvalid,
            (S::OptionsValidated, AcknowledgementDeferred) => S::Deferred,
            (S::Deferred, NamesResolved) => S::NamesResolved,
            (S::NamesResolved, ValidationPassed) => S::Validated,
            (S::NamesResolved, ValidationRejected) => S::ValidationFailed,
            (S::Validated, TeamsFormed) => S::TeamsComputed,
            (S::Validated, MatchmakingErrored) => S::MatchmakingFailed,
            (S::TeamsComputed, FollowupAttempted)
            | (S::ValidationFailed, FollowupAttempted)
            | (S::MatchmakingFailed, FollowupAttempted) => S::Notified,
            _ => {
                return Err(FlowTransitionError::InvalidTransition { state: current, event });
            }
        };

        Ok(TransitionOutcome { from: current, to, event })
    }
}

/// Current state plus the transitions taken so far for one invocation.
#[derive(Clone, Debug)]
pub struct FlowTracker {
    flow: TeamFormationFlow,
    correlation_id: String,
    state: TeamFlowState,
    history: Vec<TransitionOutcome>,
}

impl FlowTracker {
    pub fn new(correlation_id: impl Into<String>) -> Self {
        let flow = TeamFormationFlow;
        let state = flow.initial_state();
        Self { flow, correlation_id: correlation_id.into(), state, history: Vec::new() }
    }

    pub fn state(&self) -> TeamFlowState {
        self.state
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn history(&self) -> &[TransitionOutcome] {
        &self.history
    }

    /// States visited so far, starting with the initial one.
    pub fn visited(&self) -> Vec<TeamFlowState> {
        let mut states = vec![self.flow.initial_state()];
        states.extend(self.history.iter().map(|outcome| outcome.to));
        states
    }

    /// Applies `event`; an illegal event is logged and leaves the state untouched.
    pub fn advance(&mut self, event: TeamFlowEvent) {
        match self.flow.transition(self.state, event) {
            Ok(outcome) => {
                debug!(
                    event_name = "flow.transition_applied",
                    correlation_id = %self.correlation_id,
                    from = ?outcome.from,
                    to = ?outcome.to,
                    event = ?outcome.event,
                    "team formation flow advanced"
                );
                self.state = outcome.to;
                self.history.push(outcome);
            }
            Err(error) => {
                warn!(
                    event_name = "flow.transition_rejected",
                    correlation_id = %self.correlation_id,
                    error = %error,
                    "team formation flow rejected event"
                );
            }
        }
    }
}
