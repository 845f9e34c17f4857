#![forbid(unsafe_code)]
#![warn(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

//! Daemon-agnostic torrent value types and the session trait the reconciler
//! depends on.
//!
//! Layout: `model/` (immutable snapshots and change payloads), `service/`
//! (`DaemonSession` trait), `error.rs` (transport-facing error taxonomy).

pub mod error;
pub mod model;
pub mod service;

pub use error::{DaemonError, DaemonResult};
pub use model::{
    IdleMode, RatioMode, SessionInfo, ThrottleProfile, TorrentChange, TorrentSnapshot,
    TorrentState,
};
pub use service::DaemonSession;
