//! Knowledge database records and the compiled-in seed document.
//!
//! The seed is written to disk once, on first run, and is owned by the research agent from
//! then on. This module only reads and validates; it never rewrites an existing database.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Compiled-in default knowledge database.
const SEED_KNOWLEDGE_DB: &str = include_str!("../seed/knowledge_db.seed.json");

/// The default knowledge database document, verbatim.
pub fn default_knowledge_db() -> &'static str {
    SEED_KNOWLEDGE_DB
}

/// One workflow entry in the knowledge database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub content: String,
    /// Filled in lazily by the agent; always serialized, `null` until then.
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("failed to read knowledge database {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("knowledge database is not a valid record array: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate record id {0}")]
    DuplicateId(u64),

    #[error("record {id} lists tag {tag:?} more than once")]
    DuplicateTag { id: u64, tag: String },
}

/// Parse and validate a knowledge database document.
///
/// Ids must be unique across the file and tags unique within a record.
pub fn parse_knowledge_db(content: &str) -> Result<Vec<KnowledgeRecord>, KnowledgeError> {
    let records: Vec<KnowledgeRecord> = serde_json::from_str(content)?;

    let mut ids = HashSet::new();
    for record in &records {
        if !ids.insert(record.id) {
            return Err(KnowledgeError::DuplicateId(record.id));
        }
        let mut tags = HashSet::new();
        for tag in &record.tags {
            if !tags.insert(tag.as_str()) {
                return Err(KnowledgeError::DuplicateTag {
                    id: record.id,
                    tag: tag.clone(),
                });
            }
        }
    }

    Ok(records)
}

/// Read and validate the knowledge database at `path`.
pub fn load_knowledge_db(path: &Path) -> Result<Vec<KnowledgeRecord>, KnowledgeError> {
    let content = std::fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_knowledge_db(&content)
}
