#![forbid(unsafe_code)]
#![warn(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]

//! `tlever`: tier, category and tag maintenance for a Transmission daemon.
//!
//! Layout:
//! - `cli.rs`: argument parsing, startup and command dispatch
//! - `commands/`: command handlers grouped by label family
//! - `client.rs`: error type, exit codes and daemon connection helpers
//! - `output.rs`: summary and status renderers
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod output;

pub use cli::run;
