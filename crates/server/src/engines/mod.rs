//! External programs behind `/maketeams`: one fresh child process per call,
//! killed if the caller stops waiting.

pub mod matchmaker;
pub mod validator;

pub use matchmaker::ProcessMatchmaker;
pub use validator::ProcessValidator;
