//! Checkpoint configuration schema
//!
//! One document per checkpoint in the hunt sequence, keyed by ordinal.
//! Each gate instance loads exactly one of these at startup and treats
//! it as immutable for the life of the process.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for checkpoint configurations
pub const CHECKPOINT_COLLECTION: &str = "checkpoints";

/// Placeholder shown when a checkpoint has no follow-up link configured
pub const LINK_PLACEHOLDER: &str = "#";

/// Checkpoint configuration stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct CheckpointConfigDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Checkpoint ordinal, zero-based position in the hunt sequence
    pub id: u32,

    /// Display name shown on the gate pages
    pub name: String,

    /// Message shown to visitors who pass this checkpoint
    pub message: String,

    /// Link to the next clue, shown after a successful passing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Minimum time in milliseconds that must elapse after the previous
    /// checkpoint before this one may be recorded. Absent means no minimum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_interval_ms: Option<i64>,
}

impl CheckpointConfigDoc {
    /// Link target for the result page, falling back to the placeholder
    pub fn link_or_placeholder(&self) -> &str {
        self.link.as_deref().unwrap_or(LINK_PLACEHOLDER)
    }
}

impl IntoIndexes for CheckpointConfigDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Unique index on the checkpoint ordinal
            (
                doc! { "id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("ordinal_unique".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for CheckpointConfigDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_placeholder() {
        let mut config = CheckpointConfigDoc {
            id: 2,
            name: "Bell Tower".to_string(),
            message: "Ring twice.".to_string(),
            ..Default::default()
        };
        assert_eq!(config.link_or_placeholder(), LINK_PLACEHOLDER);

        config.link = Some("https://hunt.example.com/clue/3".to_string());
        assert_eq!(config.link_or_placeholder(), "https://hunt.example.com/clue/3");
    }
}
