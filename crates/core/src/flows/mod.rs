pub mod engine;
pub mod states;

pub use engine::{FlowTracker, FlowTransitionError, TeamFormationFlow};
pub use states::{TeamFlowEvent, TeamFlowState, TransitionOutcome};
