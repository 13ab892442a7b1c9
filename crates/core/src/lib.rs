pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod pipeline;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::outcome::PipelineOutcome;
pub use domain::player::{
    PlayerSlot, ResolvedPlayer, SolutionCount, TeamRequest, UserId, REQUIRED_PLAYERS,
};
pub use errors::{
    InterfaceError, LookupError, MatchmakingError, NotifyError, OptionsError, ValidationError,
};
pub use flows::{FlowTracker, TeamFlowEvent, TeamFlowState};
pub use pipeline::{
    DeferredRun, FollowupNotifier, FollowupTarget, Matchmaker, PipelineReport, StageTimeouts,
    TeamFormationPipeline, TeamValidator, UserDirectory,
};
