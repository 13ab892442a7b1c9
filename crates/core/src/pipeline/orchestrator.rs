use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::outcome::PipelineOutcome;
use crate::domain::player::{ResolvedPlayer, TeamRequest};
use crate::errors::{MatchmakingError, NotifyError, OptionsError, ValidationError};
use crate::flows::{FlowTracker, TeamFlowEvent, TeamFlowState};
use crate::pipeline::{
    FollowupNotifier, FollowupTarget, Matchmaker, StageTimeouts, TeamValidator, UserDirectory,
    UsernameResolver,
};

#[derive(Clone)]
pub struct TeamFormationPipeline {
    resolver: UsernameResolver,
    validator: Arc<dyn TeamValidator>,
    matchmaker: Arc<dyn Matchmaker>,
    notifier: Arc<dyn FollowupNotifier>,
    timeouts: StageTimeouts,
}

/// A `/maketeams` run whose acknowledgment has been deferred; nothing has
/// touched the network or spawned a process yet.
pub struct DeferredRun {
    pipeline: TeamFormationPipeline,
    flow: FlowTracker,
    target: FollowupTarget,
    request: TeamRequest,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineReport {
    pub outcome: PipelineOutcome,
    pub players: Vec<ResolvedPlayer>,
    pub delivered: bool,
    pub states: Vec<TeamFlowState>,
}

impl TeamFormationPipeline {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        validator: Arc<dyn TeamValidator>,
        matchmaker: Arc<dyn Matchmaker>,
        notifier: Arc<dyn FollowupNotifier>,
        timeouts: StageTimeouts,
    ) -> Self {
        Self {
            resolver: UsernameResolver::new(directory, timeouts.lookup),
            validator,
            matchmaker,
            notifier,
            timeouts,
        }
    }

    /// Checks the invocation's options and, if they hold, moves the run to
    /// `Deferred`. The caller must send the deferred acknowledgment before
    /// driving [`DeferredRun::run`].
    pub fn admit(
        &self,
        correlation_id: impl Into<String>,
        target: FollowupTarget,
        request: Result<TeamRequest, OptionsError>,
    ) -> Result<DeferredRun, OptionsError> {
        let mut flow = FlowTracker::new(correlation_id);

        let request = match request {
            Ok(request) => request,
            Err(error) => {
                flow.advance(TeamFlowEvent::OptionsRejected);
                info!(
                    event_name = "pipeline.options_invalid",
                    correlation_id = %flow.correlation_id(),
                    error = %error,
                    "maketeams rejected before deferral"
                );
                return Err(error);
            }
        };

        flow.advance(TeamFlowEvent::OptionsAccepted);
        flow.advance(TeamFlowEvent::AcknowledgementDeferred);
        info!(
            event_name = "pipeline.deferred",
            correlation_id = %flow.correlation_id(),
            solution_count = ?request.solution_count().map(|count| count.get()),
            "maketeams acknowledged; continuing asynchronously"
        );

        Ok(DeferredRun { pipeline: self.clone(), flow, target, request })
    }
}

impl DeferredRun {
    pub fn state(&self) -> TeamFlowState {
        self.flow.state()
    }

    pub fn correlation_id(&self) -> &str {
        self.flow.correlation_id()
    }

    /// Runs the remaining stages and delivers exactly one follow-up.
    pub async fn run(mut self) -> PipelineReport {
        let (outcome, players) = self.execute().await;
        let delivered = self.notify(&outcome).await;
        self.flow.advance(TeamFlowEvent::FollowupAttempted);

        info!(
            event_name = "pipeline.completed",
            correlation_id = %self.flow.correlation_id(),
            success = outcome.is_success(),
            delivered,
            "maketeams run finished"
        );

        PipelineReport { outcome, players, delivered, states: self.flow.visited() }
    }

    async fn execute(&mut self) -> (PipelineOutcome, Vec<ResolvedPlayer>) {
        let correlation_id = self.flow.correlation_id().to_owned();
        let pipeline = &self.pipeline;

        let players = pipeline.resolver.resolve(self.request.players(), &correlation_id).await;
        self.flow.advance(TeamFlowEvent::NamesResolved);

        let display_names =
            players.iter().map(|player| player.display_name.clone()).collect::<Vec<_>>();
        let validation = tokio::time::timeout(
            pipeline.timeouts.validation,
            pipeline.validator.validate(&display_names),
        )
        .await
        .unwrap_or(Err(ValidationError::Timeout));

        if let Err(error) = validation {
            let stderr = match &error {
                ValidationError::Failed { stderr, .. } => stderr.as_str(),
                _ => "",
            };
            warn!(
                event_name = "pipeline.validation_failed",
                correlation_id = %correlation_id,
                error = %error,
                stderr,
                "player validation failed"
            );
            self.flow.advance(TeamFlowEvent::ValidationRejected);
            return (error.into_outcome(), players);
        }
        self.flow.advance(TeamFlowEvent::ValidationPassed);

        let user_ids = self.request.user_ids();
        let teams = tokio::time::timeout(
            pipeline.timeouts.matchmaking,
            pipeline.matchmaker.form_teams(&user_ids, self.request.solution_count()),
        )
        .await
        .unwrap_or(Err(MatchmakingError::Timeout));

        match teams {
            Ok(output) => {
                self.flow.advance(TeamFlowEvent::TeamsFormed);
                (PipelineOutcome::success(&players, &output), players)
            }
            Err(error) => {
                let stderr = match &error {
                    MatchmakingError::Exit { stderr, .. } => stderr.as_str(),
                    _ => "",
                };
                warn!(
                    event_name = "pipeline.matchmaking_failed",
                    correlation_id = %correlation_id,
                    error = %error,
                    stderr,
                    "matchmaker failed"
                );
                self.flow.advance(TeamFlowEvent::MatchmakingErrored);
                (error.into_outcome(), players)
            }
        }
    }

    async fn notify(&self, outcome: &PipelineOutcome) -> bool {
        let pipeline = &self.pipeline;
        let result = tokio::time::timeout(
            pipeline.timeouts.notification,
            pipeline.notifier.deliver(&self.target, outcome.message()),
        )
        .await
        .unwrap_or(Err(NotifyError::Timeout));

        match result {
            Ok(()) => true,
            Err(error) => {
                warn!(
                    event_name = "pipeline.followup_failed",
                    correlation_id = %self.flow.correlation_id(),
                    error = %error,
                    "follow-up delivery failed; not retrying"
                );
                false
            }
        }
    }
}
