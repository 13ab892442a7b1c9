//! `/maketeams` orchestration.
//!
//! A run is split in two so the caller can acknowledge the interaction before
//! any network or process work starts:
//!
//! ```text
//! admit() ──► DeferredRun ──(caller sends deferred ack)──► run()
//!              │                                           │
//!              └ OptionsInvalid on bad input               ├ resolve names (concurrent)
//!                                                          ├ validate names
//!                                                          ├ form teams
//!                                                          └ deliver one follow-up
//! ```

mod orchestrator;
mod resolver;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::player::{SolutionCount, UserId};
use crate::errors::{LookupError, MatchmakingError, NotifyError, ValidationError};

pub use orchestrator::{DeferredRun, PipelineReport, TeamFormationPipeline};
pub use resolver::UsernameResolver;

/// Looks up one user's display name.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn display_name(&self, user_id: &UserId) -> Result<String, LookupError>;
}

#[async_trait]
pub trait TeamValidator: Send + Sync {
    async fn validate(&self, display_names: &[String]) -> Result<(), ValidationError>;
}

#[async_trait]
pub trait Matchmaker: Send + Sync {
    async fn form_teams(
        &self,
        user_ids: &[UserId],
        solution_count: Option<SolutionCount>,
    ) -> Result<String, MatchmakingError>;
}

#[async_trait]
pub trait FollowupNotifier: Send + Sync {
    async fn deliver(&self, target: &FollowupTarget, content: &str) -> Result<(), NotifyError>;
}

/// Addresses the deferred message that a follow-up replaces.
#[derive(Clone, PartialEq, Eq)]
pub struct FollowupTarget {
    pub application_id: String,
    pub token: String,
}

impl fmt::Debug for FollowupTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FollowupTarget")
            .field("application_id", &self.application_id)
            .field("token", &"[redacted]")
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageTimeouts {
    pub lookup: Duration,
    pub validation: Duration,
    pub matchmaking: Duration,
    pub notification: Duration,
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self {
            lookup: Duration::from_secs(10),
            validation: Duration::from_secs(120),
            matchmaking: Duration::from_secs(120),
            notification: Duration::from_secs(10),
        }
    }
}

impl StageTimeouts {
    pub fn new(request_timeout: Duration, engine_timeout: Duration) -> Self {
        Self {
            lookup: request_timeout,
            validation: engine_timeout,
            matchmaking: engine_timeout,
            notification: request_timeout,
        }
    }
}
