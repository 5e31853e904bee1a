//! Discord admin bot for managing license tokens.
//!
//! Administrators run `/init` to post a panel with Create, Update, Verify and Delete
//! buttons. Each button opens a modal; submissions are applied through
//! `LicenseTokenService` and answered with ephemeral embeds. Every interaction re-checks
//! the Administrator permission of the invoking member.
//!
//! The bot runs in its own tokio task next to the HTTP server and shares the database
//! connection with it.
//!
//! # Gateway Intents
//!
//! Only `GUILDS` is needed: interactions are delivered regardless of intents, and guild
//! events are used to register the slash command.

pub mod action;
pub mod embed;
pub mod form;
pub mod handler;
pub mod start;
