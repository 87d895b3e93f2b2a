//! Lexicon-based entity annotation for typed overlap scoring

use crate::error::{Result, ScreenerError};
use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strsim::jaro_winkler;

const DEFAULT_FUZZY_THRESHOLD: f32 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Skill,
    Title,
    Organization,
}

/// Entities found in one document, grouped by kind.
///
/// Surfaces are stored lowercased in ordered sets, so iteration order and
/// the derived overlap scores are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitySet {
    entities: BTreeMap<EntityKind, BTreeSet<String>>,
}

impl EntitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: EntityKind, surface: impl Into<String>) {
        self.entities
            .entry(kind)
            .or_default()
            .insert(surface.into().to_lowercase());
    }

    pub fn contains(&self, kind: EntityKind, surface: &str) -> bool {
        self.entities
            .get(&kind)
            .map(|set| set.contains(surface))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entities.values().map(|set| set.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &str> {
        self.entities
            .get(&kind)
            .into_iter()
            .flat_map(|set| set.iter().map(|s| s.as_str()))
    }

    /// Count surfaces present in both sets under the same kind. A skill and
    /// a title with the same surface never match each other.
    pub fn intersection_count(&self, other: &Self) -> usize {
        self.entities
            .iter()
            .map(|(kind, surfaces)| match other.entities.get(kind) {
                Some(other_surfaces) => surfaces.intersection(other_surfaces).count(),
                None => 0,
            })
            .sum()
    }

    /// Fraction of the reference entities also present in the candidate,
    /// in [0, 1]. A reference with no entities yields 0.
    pub fn coverage(reference: &Self, candidate: &Self) -> f32 {
        let total = reference.len();
        if total == 0 {
            return 0.0;
        }
        reference.intersection_count(candidate) as f32 / total as f32
    }

    /// Kind-qualified surfaces shared by both sets, sorted.
    pub fn matched_surfaces(reference: &Self, candidate: &Self) -> Vec<String> {
        let mut matched = Vec::new();
        for (kind, surfaces) in &reference.entities {
            if let Some(other_surfaces) = candidate.entities.get(kind) {
                for surface in surfaces.intersection(other_surfaces) {
                    matched.push(format!("{}:{}", kind, surface));
                }
            }
        }
        matched.sort();
        matched
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Skill => write!(f, "skill"),
            EntityKind::Title => write!(f, "title"),
            EntityKind::Organization => write!(f, "organization"),
        }
    }
}

/// Extracts typed entities from normalized document text.
pub trait EntityAnnotator: Send + Sync {
    fn annotate(&self, text: &str) -> Result<EntitySet>;
}

struct LexiconEntry {
    canonical: String,
    kind: EntityKind,
}

/// Dictionary-driven annotator with an exact Aho-Corasick pass and an
/// optional fuzzy token pass.
///
/// Exact matches are case-insensitive, prefer the longest surface at each
/// position, and must be bounded by non-alphanumeric characters. The fuzzy
/// pass maps near-miss tokens (for example `pythn`) onto canonical surfaces
/// by Jaro-Winkler similarity; tokens that already appear in the lexicon
/// never enter the fuzzy pass.
pub struct LexiconAnnotator {
    matcher: AhoCorasick,
    entries: Vec<LexiconEntry>,
    fuzzy_threshold: Option<f32>,
}

impl LexiconAnnotator {
    /// Annotator with the built-in skill and title lexicons.
    pub fn new() -> Result<Self> {
        Self::with_custom_entries(Vec::new())
    }

    /// Annotator with the built-in lexicons plus caller-supplied entries.
    /// There is no built-in organization lexicon; organizations only match
    /// when supplied here.
    pub fn with_custom_entries(custom: Vec<(EntityKind, String)>) -> Result<Self> {
        let mut entries: Vec<LexiconEntry> = Self::default_skill_lexicon()
            .into_iter()
            .map(|s| LexiconEntry {
                canonical: s.to_string(),
                kind: EntityKind::Skill,
            })
            .chain(Self::default_title_lexicon().into_iter().map(|s| LexiconEntry {
                canonical: s.to_string(),
                kind: EntityKind::Title,
            }))
            .collect();

        for (kind, surface) in custom {
            let canonical = surface.trim().to_lowercase();
            if canonical.is_empty() {
                continue;
            }
            if entries
                .iter()
                .any(|e| e.kind == kind && e.canonical == canonical)
            {
                continue;
            }
            entries.push(LexiconEntry { canonical, kind });
        }

        let patterns: Vec<&str> = entries.iter().map(|e| e.canonical.as_str()).collect();
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(aho_corasick::MatchKind::LeftmostLongest)
            .build(&patterns)
            .map_err(|e| {
                ScreenerError::EntityExtraction(format!("Failed to build entity matcher: {}", e))
            })?;

        Ok(Self {
            matcher,
            entries,
            fuzzy_threshold: Some(DEFAULT_FUZZY_THRESHOLD),
        })
    }

    /// Set the fuzzy pass threshold (clamped to 0.0..=1.0), or disable the
    /// pass entirely with `None`.
    pub fn set_fuzzy_threshold(&mut self, threshold: Option<f32>) {
        self.fuzzy_threshold = threshold.map(|t| t.clamp(0.0, 1.0));
    }

    pub fn lexicon_size(&self) -> usize {
        self.entries.len()
    }

    fn find_exact(&self, text: &str, found: &mut EntitySet) {
        let bytes = text.as_bytes();
        for mat in self.matcher.find_iter(text) {
            let bounded_left = mat.start() == 0 || !bytes[mat.start() - 1].is_ascii_alphanumeric();
            let bounded_right = mat.end() == bytes.len() || !bytes[mat.end()].is_ascii_alphanumeric();
            if !bounded_left || !bounded_right {
                continue;
            }

            let entry = &self.entries[mat.pattern().as_usize()];
            found.insert(entry.kind, entry.canonical.clone());
        }
    }

    fn find_fuzzy(&self, text: &str, threshold: f32, found: &mut EntitySet) {
        for word in text.split_whitespace() {
            let token = Self::clean_token(word);
            if token.len() < 3 {
                continue;
            }
            // A token that is itself a lexicon surface is an exact hit, not
            // a near-miss; `javascript` must not fuzzy-claim `java`.
            if self.entries.iter().any(|e| e.canonical == token) {
                continue;
            }

            for entry in &self.entries {
                // Single tokens only compare against single-word surfaces.
                if entry.canonical.contains(' ') {
                    continue;
                }
                if found.contains(entry.kind, &entry.canonical) {
                    continue;
                }

                let similarity = jaro_winkler(&token, &entry.canonical) as f32;
                if similarity >= threshold {
                    found.insert(entry.kind, entry.canonical.clone());
                }
            }
        }
    }

    fn clean_token(word: &str) -> String {
        word.chars()
            .filter(|c| c.is_alphanumeric() || *c == '+' || *c == '#')
            .collect::<String>()
            .to_lowercase()
    }

    fn default_skill_lexicon() -> Vec<&'static str> {
        vec![
            "python", "java", "javascript", "typescript", "rust", "c++", "c#",
            "golang", "ruby", "scala", "kotlin", "swift", "sql", "nosql",
            "postgresql", "mysql", "mongodb", "redis", "elasticsearch",
            "aws", "azure", "gcp", "docker", "kubernetes", "terraform",
            "linux", "git", "react", "angular", "vue", "node.js", "django",
            "flask", "spring", "graphql", "rest api", "microservices",
            "machine learning", "deep learning", "data analysis",
            "data engineering", "tensorflow", "pytorch", "pandas", "numpy",
            "spark", "kafka", "airflow", "excel", "tableau",
            "project management", "agile", "scrum", "communication",
            "leadership",
        ]
    }

    fn default_title_lexicon() -> Vec<&'static str> {
        vec![
            "software engineer", "senior software engineer", "staff engineer",
            "backend engineer", "frontend engineer", "full stack developer",
            "data scientist", "data analyst", "data engineer",
            "machine learning engineer", "devops engineer",
            "site reliability engineer", "engineering manager",
            "product manager", "solutions architect", "qa engineer",
        ]
    }
}

impl EntityAnnotator for LexiconAnnotator {
    fn annotate(&self, text: &str) -> Result<EntitySet> {
        let mut found = EntitySet::new();
        self.find_exact(text, &mut found);
        if let Some(threshold) = self.fuzzy_threshold {
            self.find_fuzzy(text, threshold, &mut found);
        }
        Ok(found)
    }
}
