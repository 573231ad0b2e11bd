//! Packsync - reconcile a Bluesky list with its starter pack and curate
//! new members interactively.
//!
//! This library exposes the core modules so integration tests can drive
//! them; the `packsync` binary is a thin wrapper around [`run::run`].

pub mod api;
pub mod cli;
pub mod config;
pub mod curate;
pub mod error;
pub mod ignore;
pub mod membership;
pub mod reconcile;
pub mod report;
pub mod run;
