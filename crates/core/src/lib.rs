//! Pure domain logic for the citizen application bot.
//!
//! Everything in this crate is transport- and storage-agnostic: field
//! validation, the intake conversation state machine, channel-message
//! projection, anti-abuse policy, and the Azerbaijani message catalog.
//! The `db`, `telegram`, and `bot` crates depend on this one; it depends
//! on nothing but `chrono`, `serde`, and `thiserror`.

pub mod application;
pub mod error;
pub mod guard;
pub mod intake;
pub mod projection;
pub mod texts;
pub mod timefmt;
pub mod types;
pub mod validate;
