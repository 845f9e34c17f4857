#![forbid(unsafe_code)]
#![warn(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

//! Label-encoded state reconciliation.
//!
//! The daemon's label strings are the only persistent state: tiers,
//! categories and tags are parsed from them on every pass and written back
//! through [`LabelStore`]. Nothing is cached between invocations; re-running
//! a pass is the recovery mechanism.
//!
//! Layout:
//! - `label.rs`: typed label variants and the prefix codec
//! - `store.rs`: read-modify-write label operations against the daemon
//! - `throttle.rs`: atomic throttle profile writes
//! - `tier.rs`: ratio ladder classification and tier passes
//! - `category.rs`: label-to-storage-directory enforcement
//! - `tag.rs`, `clog.rs`: prefixed tags and above-ladder throttling
//! - `status.rs`: read-only projection for display
//! - `batch.rs`: per-torrent fault isolation for multi-torrent passes

pub mod batch;
pub mod category;
pub mod clog;
pub mod error;
pub mod label;
pub mod status;
pub mod store;
pub mod tag;
pub mod throttle;
pub mod tier;

pub use batch::{BatchReport, TorrentFailure};
pub use category::{
    CategoryChange, CategoryOutcome, create_category, enforce_categories, relative_download_dir,
    remove_category, validate_category_name,
};
pub use clog::{ClogOutcome, select_band, set_clog, unset_clog};
pub use error::{ReconcileError, ReconcileResult};
pub use label::{Label, LabelCodec, TierLabel};
pub use status::{StatusSnapshot, fetch_status, format_eta, format_rate, project_status};
pub use store::LabelStore;
pub use tag::{add_tag, remove_tag};
pub use throttle::apply_throttle;
pub use tier::{
    ActivateOutcome, EnforceReport, TierLadder, TierOutcome, TierPlan, UnsetOutcome,
    activate_tiers, enforce_tiers, plan_tier, reconcile_tier, set_tiers, unset_tiers,
};
