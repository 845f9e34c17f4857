//! Category labels mapped onto storage directories under the daemon root.
//!
//! # Design
//! - The label is authoritative; the storage location is made to follow it.
//! - Paths are compared as `/`-separated strings with trailing separators
//!   ignored, since they name directories on the daemon host.

use tlever_config::LeverConfig;
use tlever_torrent_core::{DaemonSession, TorrentSnapshot};
use tracing::{debug, info, warn};

use crate::batch::{BatchReport, run_batch};
use crate::error::{ReconcileError, ReconcileResult, daemon_err};
use crate::label::{Label, LabelCodec};
use crate::store::{LABEL_SEPARATOR, LabelStore};

const PATH_SEPARATOR: char = '/';

/// What [`enforce_categories`] did to a torrent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryOutcome {
    /// No category label.
    Uncategorized,
    /// Already stored where its label says.
    InPlace {
        /// Category payload.
        category: String,
    },
    /// Data moved to match the label.
    Moved {
        /// Category payload.
        category: String,
        /// Previous absolute location.
        from: String,
        /// New absolute location.
        to: String,
    },
    /// More than one category label; nothing moved.
    Conflict {
        /// Every category payload found.
        categories: Vec<String>,
    },
    /// The payload does not name a directory under the root; nothing moved.
    Invalid {
        /// Category payload.
        category: String,
        /// Why the payload was rejected.
        reason: &'static str,
    },
}

/// Writes performed by [`create_category`] or [`remove_category`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryChange {
    /// Category payload.
    pub category: String,
    /// Category labels removed.
    pub removed: Vec<String>,
    /// Whether the category label was newly added.
    pub added: bool,
    /// Absolute location the data was moved to.
    pub location: String,
}

/// Path of `location` relative to `root`.
///
/// Returns an empty string when both name the same directory and
/// `location` unchanged when it lies outside `root`.
#[must_use]
pub fn relative_download_dir(root: &str, location: &str) -> String {
    let root = trim_dir(root);
    let location_trimmed = trim_dir(location);
    if location_trimmed == root {
        return String::new();
    }
    location_trimmed
        .strip_prefix(root)
        .and_then(|rest| rest.strip_prefix(PATH_SEPARATOR))
        .map_or_else(|| location.to_string(), str::to_string)
}

/// Reject names that cannot be used as a relative directory under the root.
///
/// # Errors
///
/// Returns `ReconcileError::InvalidCategory` describing the first problem.
pub fn validate_category_name(name: &str) -> ReconcileResult<()> {
    let reject = |reason: &'static str| {
        Err(ReconcileError::InvalidCategory {
            name: name.to_string(),
            reason,
        })
    };
    if name.trim().is_empty() {
        return reject("category name must not be empty");
    }
    if name.starts_with(PATH_SEPARATOR) {
        return reject("category name must be a relative path");
    }
    if name.contains(LABEL_SEPARATOR) {
        return reject("category name must not contain ','");
    }
    for segment in name.split(PATH_SEPARATOR) {
        match segment {
            "" => return reject("category name must not contain empty segments"),
            "." | ".." => return reject("category name must not contain '.' or '..' segments"),
            _ => {}
        }
    }
    Ok(())
}

/// Move every singly-categorised torrent whose location drifted from its
/// label back under `root/<category>`.
///
/// # Errors
///
/// Returns an error when the session or torrent list cannot be read, or a
/// fatal daemon error aborts the pass.
pub async fn enforce_categories(
    session: &dyn DaemonSession,
    config: &LeverConfig,
) -> ReconcileResult<BatchReport<CategoryOutcome>> {
    let codec = LabelCodec::from(&config.general.prefix);
    let root = download_root(session).await?;
    let torrents = session
        .get_torrents()
        .await
        .map_err(daemon_err("categories.list"))?;

    let root = root.as_str();
    run_batch("category enforce", torrents, |torrent| async move {
        enforce_one(session, &codec, root, &torrent).await
    })
    .await
}

async fn enforce_one(
    session: &dyn DaemonSession,
    codec: &LabelCodec,
    root: &str,
    torrent: &TorrentSnapshot,
) -> ReconcileResult<CategoryOutcome> {
    let hash = torrent.hash.as_str();
    let mut categories: Vec<String> = codec
        .parse_all(&torrent.labels)
        .into_iter()
        .filter_map(|label| match label {
            Label::Category(path) => Some(path),
            _ => None,
        })
        .collect();

    if categories.len() > 1 {
        warn!(hash, categories = ?categories, "conflicting category labels, not moving");
        return Ok(CategoryOutcome::Conflict { categories });
    }
    let Some(category) = categories.pop() else {
        return Ok(CategoryOutcome::Uncategorized);
    };
    if let Err(ReconcileError::InvalidCategory { reason, .. }) = validate_category_name(&category)
    {
        warn!(hash, category = %category, reason, "invalid category label, not moving");
        return Ok(CategoryOutcome::Invalid { category, reason });
    }

    let relative = relative_download_dir(root, &torrent.download_dir);
    if trim_dir(&relative) == trim_dir(&category) {
        debug!(hash, category = %category, "category in place");
        return Ok(CategoryOutcome::InPlace { category });
    }

    let target = join_root(root, &category);
    session
        .move_torrent_data(&[torrent.hash.clone()], &target)
        .await
        .map_err(daemon_err("categories.move"))?;
    info!(hash, from = %torrent.download_dir, to = %target, "moved torrent to its category");
    Ok(CategoryOutcome::Moved {
        category,
        from: torrent.download_dir.clone(),
        to: target,
    })
}

/// Label `hash` with category `name`, replacing any other category label,
/// and move its data to `root/name`.
///
/// # Errors
///
/// Returns an error for invalid names or failed daemon calls. Label writes
/// made before a failed move stay; `category enforce` completes the move.
pub async fn create_category(
    session: &dyn DaemonSession,
    config: &LeverConfig,
    hash: &str,
    name: &str,
) -> ReconcileResult<CategoryChange> {
    validate_category_name(name)?;
    let codec = LabelCodec::from(&config.general.prefix);
    let store = LabelStore::new(session, codec);
    let root = download_root(session).await?;
    let wanted = codec.encode(&Label::Category(name.to_string()));

    let mut removed = Vec::new();
    for raw in store.labels(hash).await? {
        if raw != wanted
            && matches!(codec.parse(&raw), Label::Category(_))
            && store.remove_label(hash, &raw).await?
        {
            removed.push(raw);
        }
    }
    let added = store.add_label(hash, &wanted).await?;

    let location = join_root(&root, name);
    session
        .move_torrent_data(&[hash.to_string()], &location)
        .await
        .map_err(daemon_err("categories.move"))?;
    info!(hash, category = name, location = %location, "category created");
    Ok(CategoryChange {
        category: name.to_string(),
        removed,
        added,
        location,
    })
}

/// Move `hash` back to the download root, then drop its `name` category
/// label. A failed move leaves the label in place.
///
/// # Errors
///
/// Returns an error when a daemon call fails.
pub async fn remove_category(
    session: &dyn DaemonSession,
    config: &LeverConfig,
    hash: &str,
    name: &str,
) -> ReconcileResult<CategoryChange> {
    let codec = LabelCodec::from(&config.general.prefix);
    let store = LabelStore::new(session, codec);
    let root = download_root(session).await?;
    let label = codec.encode(&Label::Category(name.to_string()));

    session
        .move_torrent_data(&[hash.to_string()], &root)
        .await
        .map_err(daemon_err("categories.move"))?;
    let removed = if store.remove_label(hash, &label).await? {
        vec![label]
    } else {
        Vec::new()
    };
    info!(hash, category = name, "category removed");
    Ok(CategoryChange {
        category: name.to_string(),
        removed,
        added: false,
        location: root,
    })
}

async fn download_root(session: &dyn DaemonSession) -> ReconcileResult<String> {
    session
        .get_session()
        .await
        .map(|info| info.download_dir)
        .map_err(daemon_err("categories.session"))
}

fn trim_dir(path: &str) -> &str {
    path.trim_end_matches(PATH_SEPARATOR)
}

fn join_root(root: &str, relative: &str) -> String {
    format!(
        "{}{PATH_SEPARATOR}{}",
        trim_dir(root),
        relative.trim_matches(PATH_SEPARATOR)
    )
}
