//! Starwing Server -- authoritative multiplayer server library.
//!
//! Ties the engine to the wire: the CLI surface, the four-slot session
//! table, the UDP receive/simulation/snapshot/timeout tasks, and snapshot
//! serialisation. The `starwing-server` binary is a thin wrapper over
//! [`GameServer`].

#![deny(unsafe_code)]

pub mod config;
pub mod server;
pub mod session;
pub mod snapshot;

pub use server::{GameServer, ServerError};
