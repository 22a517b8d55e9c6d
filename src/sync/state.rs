use serde::{Deserialize, Serialize};

use crate::model::{ListKey, RemoteDocument};

/// Whether outbound replication is allowed this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    #[default]
    Unsynced,
    Synced,
}

/// Result of the startup fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// No remote configured, network error, bad status or malformed body
    Failed,
    Fetched(RemoteDocument),
}

/// What to do when the remote answers with no itinerary and no wishlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeedPolicy {
    /// Never push automatically; empty remote lists leave local untouched.
    #[default]
    ReplaceIfNonEmpty,
    /// Push the full local dataset when the remote looks uninitialized.
    SeedEmptyRemote,
}

/// Summary of a reconcile run, reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum ReconcileReport {
    /// Remote state unknown; replication stays off for the session.
    LocalOnly,
    /// Remote lists replaced these local lists (possibly none).
    Applied { replaced: Vec<ListKey> },
    /// The empty remote was seeded with the local dataset.
    Seeded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(SyncState::default(), SyncState::Unsynced);
        assert_eq!(SeedPolicy::default(), SeedPolicy::ReplaceIfNonEmpty);
    }

    #[test]
    fn test_report_json_shape() {
        let report = ReconcileReport::Applied {
            replaced: vec![ListKey::Itinerary, ListKey::Wishlist],
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["outcome"], "applied");
        assert_eq!(value["replaced"], serde_json::json!(["itinerary", "wishlist"]));

        let value = serde_json::to_value(ReconcileReport::LocalOnly).unwrap();
        assert_eq!(value["outcome"], "local-only");
    }

    #[test]
    fn test_seed_policy_names() {
        let policy: SeedPolicy = serde_json::from_str(r#""seed-empty-remote""#).unwrap();
        assert_eq!(policy, SeedPolicy::SeedEmptyRemote);
        assert_eq!(
            serde_json::to_string(&SeedPolicy::ReplaceIfNonEmpty).unwrap(),
            r#""replace-if-non-empty""#
        );
    }
}
