//! Document structures shared across the screening pipeline

use serde::{Deserialize, Serialize};

/// A text document entering the ranking pipeline, either the reference job
/// description or one candidate resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier, unique within a run. For documents loaded from
    /// disk this is the file name.
    pub id: String,
    /// Raw text as extracted, before normalization.
    pub raw_text: String,
    pub role: DocumentRole,
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentRole {
    Reference,
    Candidate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub source_path: Option<String>,
    pub word_count: usize,
    pub character_count: usize,
}

impl Document {
    pub fn new(id: String, raw_text: String, role: DocumentRole) -> Self {
        let word_count = raw_text.split_whitespace().count();
        let character_count = raw_text.chars().count();

        Self {
            id,
            raw_text,
            role,
            metadata: DocumentMetadata {
                source_path: None,
                word_count,
                character_count,
            },
        }
    }

    pub fn with_source_path(mut self, path: impl Into<String>) -> Self {
        self.metadata.source_path = Some(path.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.raw_text.trim().is_empty()
    }
}

/// Drop candidates whose id was already seen, keeping the first occurrence.
///
/// Returns the retained documents in their original order together with the
/// ids of the dropped duplicates, in encounter order.
pub fn dedup_by_id(documents: Vec<Document>) -> (Vec<Document>, Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    let mut kept = Vec::with_capacity(documents.len());
    let mut duplicates = Vec::new();

    for doc in documents {
        if seen.insert(doc.id.clone()) {
            kept.push(doc);
        } else {
            duplicates.push(doc.id);
        }
    }

    (kept, duplicates)
}

impl std::fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentRole::Reference => write!(f, "reference"),
            DocumentRole::Candidate => write!(f, "candidate"),
        }
    }
}
