#![forbid(unsafe_code)]
#![warn(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

//! Shared test helpers used across the workspace suites.
//! Layout: fixtures.rs (config and torrent builders), memory.rs (in-memory daemon).

pub mod fixtures;
pub mod memory;

pub use memory::{DaemonCall, FailureMode, MemoryDaemon};
