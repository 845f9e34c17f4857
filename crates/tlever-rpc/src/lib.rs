#![forbid(unsafe_code)]
#![warn(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

//! JSON-RPC transport for the Transmission daemon.
//!
//! Layout:
//! - `client.rs`: HTTP client, session-id handshake and `DaemonSession` impl
//! - `wire.rs`: request field lists and response decoding into core types

pub mod client;
mod wire;

pub use client::{SESSION_ID_HEADER, TransmissionClient, parse_endpoint};
