pub mod outcome;
pub mod player;
