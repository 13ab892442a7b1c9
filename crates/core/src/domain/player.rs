use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::errors::OptionsError;

pub const REQUIRED_PLAYERS: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerSlot {
    pub user_id: UserId,
}

/// How many candidate solutions the matchmaker should report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SolutionCount(NonZeroU32);

impl SolutionCount {
    pub fn new(value: i64) -> Option<Self> {
        u32::try_from(value).ok().and_then(NonZeroU32::new).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for SolutionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPlayer {
    pub user_id: UserId,
    pub display_name: String,
}

impl ResolvedPlayer {
    pub fn resolved(user_id: UserId, display_name: impl Into<String>) -> Self {
        Self { user_id, display_name: display_name.into() }
    }

    pub fn placeholder(user_id: UserId) -> Self {
        let display_name = format!("UnknownUser({user_id})");
        Self { user_id, display_name }
    }
}

/// The validated input of one `/maketeams` invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeamRequest {
    players: Vec<PlayerSlot>,
    solution_count: Option<SolutionCount>,
}

impl TeamRequest {
    pub fn new(
        user_ids: Vec<UserId>,
        solution_count: Option<SolutionCount>,
    ) -> Result<Self, OptionsError> {
        if user_ids.len() != REQUIRED_PLAYERS {
            return Err(OptionsError::NotEnoughPlayers {
                expected: REQUIRED_PLAYERS,
                found: user_ids.len(),
            });
        }

        if let Some(position) = user_ids.iter().position(|id| id.0.trim().is_empty()) {
            return Err(OptionsError::InvalidPlayer { position: position + 1 });
        }

        let players = user_ids.into_iter().map(|user_id| PlayerSlot { user_id }).collect();
        Ok(Self { players, solution_count })
    }

    pub fn players(&self) -> &[PlayerSlot] {
        &self.players
    }

    pub fn solution_count(&self) -> Option<SolutionCount> {
        self.solution_count
    }

    pub fn user_ids(&self) -> Vec<UserId> {
        self.players.iter().map(|slot| slot.user_id.clone()).collect()
    }
}
