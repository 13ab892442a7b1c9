//! Discord interface for the inhouse bot.
//!
//! - **Interactions** (`interactions`) - inbound payloads and response bodies
//! - **Commands** (`commands`) - slash-command parsing and static replies
//! - **Signatures** (`signature`) - Ed25519 request verification
//! - **REST client** (`client`) - user lookups and follow-up edits
//! - **Registration** (`registration`) - global command schemas
//!
//! # Architecture
//!
//! ```text
//! POST /interactions → SignatureVerifier → CommandRouter ─┬─ immediate reply
//!                                                         └─ TeamFormationPipeline
//!                                                               ↓
//!                                           DiscordClient (users, follow-up)
//! ```

pub mod client;
pub mod commands;
pub mod interactions;
pub mod registration;
pub mod signature;

pub use client::DiscordClient;
pub use commands::{CommandReply, CommandRouter, SlashCommand};
pub use interactions::{Interaction, InteractionResponse, InteractionType};
pub use signature::{SignatureError, SignatureVerifier};
