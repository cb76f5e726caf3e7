//! The service binary's crate: configuration, update dispatch, intake and
//! executor handlers, admin commands, executor-channel routing, sessions,
//! and background jobs. Domain logic lives in `muraciet-core`; this crate
//! wires it to Telegram and the database.

pub mod background;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod export;
pub mod handlers;
pub mod routing;
pub mod session;
pub mod state;
