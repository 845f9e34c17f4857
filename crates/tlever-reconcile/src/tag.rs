//! Prefixed tag labels. Tags are independent, so any number may coexist.

use crate::error::{ReconcileError, ReconcileResult};
use crate::label::Label;
use crate::store::LabelStore;

/// Add the tag label for `name`. Returns `true` when written.
///
/// # Errors
///
/// Returns an error for empty names or failed daemon calls.
pub async fn add_tag(store: &LabelStore<'_>, hash: &str, name: &str) -> ReconcileResult<bool> {
    let label = encode(store, name)?;
    store.add_label(hash, &label).await
}

/// Remove the tag label for `name`. Returns `true` when written.
///
/// # Errors
///
/// Returns an error for empty names or failed daemon calls.
pub async fn remove_tag(store: &LabelStore<'_>, hash: &str, name: &str) -> ReconcileResult<bool> {
    let label = encode(store, name)?;
    store.remove_label(hash, &label).await
}

fn encode(store: &LabelStore<'_>, name: &str) -> ReconcileResult<String> {
    if name.trim().is_empty() {
        return Err(ReconcileError::InvalidLabel {
            label: name.to_string(),
            reason: "tag name must not be empty",
        });
    }
    Ok(store.codec().encode(&Label::Tag(name.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::LabelCodec;
    use tlever_test_support::{MemoryDaemon, fixtures};

    #[tokio::test]
    async fn tags_round_trip_through_the_prefix() -> anyhow::Result<()> {
        let daemon = MemoryDaemon::new(fixtures::session())
            .with_torrents([fixtures::labelled("h", 1.0, &["%tier-0"])]);
        let store = LabelStore::new(&daemon, LabelCodec::new('%', '@', '+'));

        assert!(add_tag(&store, "h", "keep").await?);
        assert!(add_tag(&store, "h", "private").await?);
        assert!(!add_tag(&store, "h", "keep").await?);
        assert_eq!(daemon.labels("h"), vec!["%tier-0", "+keep", "+private"]);

        assert!(remove_tag(&store, "h", "keep").await?);
        assert!(!remove_tag(&store, "h", "keep").await?);
        assert_eq!(daemon.labels("h"), vec!["%tier-0", "+private"]);
        assert!(add_tag(&store, "h", " ").await.is_err());
        Ok(())
    }
}
