//! Candidate scoring and deterministic ranking

use crate::config::{RankingConfig, TieBreak};
use crate::error::{Result, ScreenerError};
use crate::processing::entities::EntitySet;
use serde::{Deserialize, Serialize};

/// Similarity reported when either vector has zero magnitude, for example
/// an empty document. Sits at the bottom of the cosine range so degenerate
/// candidates sink below every real match.
pub const DEGENERATE_SIMILARITY: f32 = -1.0;

/// Reference document reduced to the features scoring needs.
pub struct ReferenceProfile {
    pub embedding: Vec<f32>,
    pub entities: EntitySet,
}

/// One candidate reduced to the features scoring needs.
pub struct CandidateProfile {
    pub id: String,
    pub embedding: Vec<f32>,
    pub entities: EntitySet,
}

/// A ranked candidate. Ranks are 1-based and dense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub rank: usize,
    pub candidate_id: String,
    /// Weighted composite of the component scores below.
    pub score: f32,
    pub semantic_score: f32,
    pub entity_overlap: f32,
    /// Kind-qualified reference entities found in this candidate, sorted.
    /// Empty when entity scoring is disabled.
    pub matched_entities: Vec<String>,
}

/// A candidate excluded from the ranking, with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCandidate {
    pub candidate_id: String,
    pub reason: String,
}

/// Cosine similarity over the full [-1, 1] range.
///
/// Mismatched dimensions are an error; a zero-magnitude vector on either
/// side yields [`DEGENERATE_SIMILARITY`] instead. The result is never
/// clamped.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(ScreenerError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(DEGENERATE_SIMILARITY);
    }

    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Score and order candidates against the reference.
///
/// Every candidate is scored before any truncation, so a `top_k` limit
/// returns exactly the first k entries of the full ranking. Ordering is by
/// composite score descending with ties broken by candidate id ascending,
/// making the output independent of input order and of how concurrently
/// the embeddings were produced.
pub fn rank_candidates(
    reference: &ReferenceProfile,
    candidates: Vec<CandidateProfile>,
    config: &RankingConfig,
) -> Result<Vec<ScoredResult>> {
    config.validate()?;

    let mut results = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let semantic_score = cosine_similarity(&reference.embedding, &candidate.embedding)?;

        let (entity_overlap, matched_entities) = if config.use_entities {
            (
                EntitySet::coverage(&reference.entities, &candidate.entities),
                EntitySet::matched_surfaces(&reference.entities, &candidate.entities),
            )
        } else {
            (0.0, Vec::new())
        };

        let score =
            config.weight_semantic * semantic_score + config.weight_entity * entity_overlap;

        results.push(ScoredResult {
            rank: 0,
            candidate_id: candidate.id,
            score,
            semantic_score,
            entity_overlap,
            matched_entities,
        });
    }

    results.sort_by(|a, b| {
        b.score.total_cmp(&a.score).then_with(|| match config.tie_break {
            TieBreak::IdAscending => a.candidate_id.cmp(&b.candidate_id),
        })
    });

    for (index, result) in results.iter_mut().enumerate() {
        result.rank = index + 1;
    }

    if let Some(k) = config.top_k {
        results.truncate(k);
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::entities::EntityKind;

    fn candidate(id: &str, embedding: Vec<f32>) -> CandidateProfile {
        CandidateProfile {
            id: id.to_string(),
            embedding,
            entities: EntitySet::new(),
        }
    }

    fn reference(embedding: Vec<f32>) -> ReferenceProfile {
        ReferenceProfile {
            embedding,
            entities: EntitySet::new(),
        }
    }

    #[test]
    fn test_cosine_identical_vectors() {
        let similarity = cosine_similarity(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        assert!((similarity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal_vectors() {
        let similarity = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(similarity.abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite_vectors() {
        let similarity = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap();
        assert!((similarity + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector_is_degenerate() {
        let similarity = cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]).unwrap();
        assert_eq!(similarity, DEGENERATE_SIMILARITY);
    }

    #[test]
    fn test_cosine_dimension_mismatch_is_error() {
        let result = cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]);
        assert!(matches!(
            result,
            Err(ScreenerError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_ranking_orders_by_score_descending() {
        let reference = reference(vec![1.0, 0.0]);
        let candidates = vec![
            candidate("far.txt", vec![0.0, 1.0]),
            candidate("close.txt", vec![1.0, 0.1]),
            candidate("middle.txt", vec![1.0, 1.0]),
        ];

        let results =
            rank_candidates(&reference, candidates, &RankingConfig::default()).unwrap();

        let ids: Vec<&str> = results.iter().map(|r| r.candidate_id.as_str()).collect();
        assert_eq!(ids, vec!["close.txt", "middle.txt", "far.txt"]);
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[2].rank, 3);
    }

    #[test]
    fn test_ties_break_by_id_ascending() {
        let reference = reference(vec![1.0, 0.0]);
        let candidates = vec![
            candidate("zeta.txt", vec![2.0, 0.0]),
            candidate("alpha.txt", vec![3.0, 0.0]),
            candidate("mid.txt", vec![5.0, 0.0]),
        ];

        let results =
            rank_candidates(&reference, candidates, &RankingConfig::default()).unwrap();

        // All three have cosine 1.0 against the reference.
        let ids: Vec<&str> = results.iter().map(|r| r.candidate_id.as_str()).collect();
        assert_eq!(ids, vec!["alpha.txt", "mid.txt", "zeta.txt"]);
    }

    #[test]
    fn test_ranking_is_independent_of_input_order() {
        let reference = reference(vec![1.0, 0.5, 0.0]);
        let forward = vec![
            candidate("a.txt", vec![1.0, 0.4, 0.1]),
            candidate("b.txt", vec![0.2, 1.0, 0.3]),
            candidate("c.txt", vec![0.9, 0.5, 0.0]),
        ];
        let reversed: Vec<CandidateProfile> = forward
            .iter()
            .rev()
            .map(|c| candidate(&c.id, c.embedding.clone()))
            .collect();

        let config = RankingConfig::default();
        let a = rank_candidates(&reference, forward, &config).unwrap();
        let b = rank_candidates(&reference, reversed, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_top_k_is_a_prefix_of_the_full_ranking() {
        let reference = reference(vec![1.0, 0.0]);
        let make_candidates = || {
            vec![
                candidate("a.txt", vec![1.0, 0.0]),
                candidate("b.txt", vec![0.8, 0.2]),
                candidate("c.txt", vec![0.5, 0.5]),
                candidate("d.txt", vec![0.1, 0.9]),
            ]
        };

        let full_config = RankingConfig::default();
        let full = rank_candidates(&reference, make_candidates(), &full_config).unwrap();

        let limited_config = RankingConfig {
            top_k: Some(2),
            ..RankingConfig::default()
        };
        let limited = rank_candidates(&reference, make_candidates(), &limited_config).unwrap();

        assert_eq!(limited.len(), 2);
        assert_eq!(limited[..], full[..2]);
    }

    #[test]
    fn test_top_k_larger_than_input_returns_everything() {
        let reference = reference(vec![1.0]);
        let candidates = vec![candidate("only.txt", vec![1.0])];
        let config = RankingConfig {
            top_k: Some(10),
            ..RankingConfig::default()
        };

        let results = rank_candidates(&reference, candidates, &config).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_top_k_zero_returns_empty() {
        let reference = reference(vec![1.0]);
        let candidates = vec![candidate("only.txt", vec![1.0])];
        let config = RankingConfig {
            top_k: Some(0),
            ..RankingConfig::default()
        };

        let results = rank_candidates(&reference, candidates, &config).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_degenerate_candidates_sink_to_the_bottom() {
        let reference = reference(vec![1.0, 0.0]);
        let candidates = vec![
            candidate("empty.txt", vec![0.0, 0.0]),
            candidate("opposite.txt", vec![-1.0, 0.0]),
            candidate("match.txt", vec![1.0, 0.0]),
        ];

        let results =
            rank_candidates(&reference, candidates, &RankingConfig::default()).unwrap();

        assert_eq!(results[0].candidate_id, "match.txt");
        // The degenerate candidate ties the true opposite at -1.0 and the
        // id tie-break decides between them.
        assert_eq!(results[1].candidate_id, "empty.txt");
        assert_eq!(results[1].semantic_score, DEGENERATE_SIMILARITY);
        assert_eq!(results[2].candidate_id, "opposite.txt");
    }

    #[test]
    fn test_entity_weighting_changes_order() {
        let mut reference_entities = EntitySet::new();
        reference_entities.insert(EntityKind::Skill, "python");
        reference_entities.insert(EntityKind::Skill, "sql");
        let reference = ReferenceProfile {
            embedding: vec![1.0, 0.0],
            entities: reference_entities,
        };

        let mut full_overlap = EntitySet::new();
        full_overlap.insert(EntityKind::Skill, "python");
        full_overlap.insert(EntityKind::Skill, "sql");

        let candidates = vec![
            CandidateProfile {
                id: "semantic_winner.txt".to_string(),
                embedding: vec![1.0, 0.0],
                entities: EntitySet::new(),
            },
            CandidateProfile {
                id: "entity_winner.txt".to_string(),
                embedding: vec![1.0, 0.4],
                entities: full_overlap,
            },
        ];

        let config = RankingConfig {
            use_entities: true,
            weight_semantic: 0.5,
            weight_entity: 0.5,
            ..RankingConfig::default()
        };
        let results = rank_candidates(&reference, candidates, &config).unwrap();

        // 0.5*0.928 + 0.5*1.0 beats 0.5*1.0 + 0.5*0.0.
        assert_eq!(results[0].candidate_id, "entity_winner.txt");
        assert_eq!(
            results[0].matched_entities,
            vec!["skill:python", "skill:sql"]
        );
        assert_eq!(results[1].entity_overlap, 0.0);
    }

    #[test]
    fn test_entity_scores_are_zero_when_disabled() {
        let mut reference_entities = EntitySet::new();
        reference_entities.insert(EntityKind::Skill, "python");
        let reference = ReferenceProfile {
            embedding: vec![1.0],
            entities: reference_entities,
        };

        let mut candidate_entities = EntitySet::new();
        candidate_entities.insert(EntityKind::Skill, "python");
        let candidates = vec![CandidateProfile {
            id: "a.txt".to_string(),
            embedding: vec![1.0],
            entities: candidate_entities,
        }];

        let results =
            rank_candidates(&reference, candidates, &RankingConfig::default()).unwrap();
        assert_eq!(results[0].entity_overlap, 0.0);
        assert!(results[0].matched_entities.is_empty());
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_entity_weight_matches_disabled_entities() {
        let mut reference_entities = EntitySet::new();
        reference_entities.insert(EntityKind::Skill, "python");
        reference_entities.insert(EntityKind::Skill, "aws");
        let reference = ReferenceProfile {
            embedding: vec![1.0, 0.2],
            entities: reference_entities,
        };

        let make_candidates = || {
            let mut overlap = EntitySet::new();
            overlap.insert(EntityKind::Skill, "python");
            vec![
                CandidateProfile {
                    id: "a.txt".to_string(),
                    embedding: vec![0.9, 0.3],
                    entities: overlap,
                },
                CandidateProfile {
                    id: "b.txt".to_string(),
                    embedding: vec![1.0, 0.1],
                    entities: EntitySet::new(),
                },
            ]
        };

        let weightless = RankingConfig {
            use_entities: true,
            weight_semantic: 1.0,
            weight_entity: 0.0,
            ..RankingConfig::default()
        };
        let disabled = RankingConfig {
            use_entities: false,
            weight_semantic: 1.0,
            weight_entity: 0.0,
            ..RankingConfig::default()
        };

        let with_entities = rank_candidates(&reference, make_candidates(), &weightless).unwrap();
        let without = rank_candidates(&reference, make_candidates(), &disabled).unwrap();

        // Component fields differ (the overlap is still reported), but the
        // composite scores and the ordering must be identical.
        let entity_view: Vec<(&str, f32)> = with_entities
            .iter()
            .map(|r| (r.candidate_id.as_str(), r.score))
            .collect();
        let disabled_view: Vec<(&str, f32)> = without
            .iter()
            .map(|r| (r.candidate_id.as_str(), r.score))
            .collect();
        assert_eq!(entity_view, disabled_view);
        assert!(with_entities[0].entity_overlap > 0.0 || with_entities[1].entity_overlap > 0.0);
    }

    #[test]
    fn test_invalid_weights_are_rejected() {
        let reference = reference(vec![1.0]);
        let config = RankingConfig {
            weight_semantic: -1.0,
            ..RankingConfig::default()
        };

        let result = rank_candidates(&reference, Vec::new(), &config);
        assert!(matches!(result, Err(ScreenerError::Configuration(_))));
    }

    #[test]
    fn test_dimension_mismatch_fails_the_whole_run() {
        let reference = reference(vec![1.0, 0.0]);
        let candidates = vec![
            candidate("fine.txt", vec![1.0, 0.0]),
            candidate("broken.txt", vec![1.0, 0.0, 0.0]),
        ];

        let result = rank_candidates(&reference, candidates, &RankingConfig::default());
        assert!(matches!(
            result,
            Err(ScreenerError::DimensionMismatch { .. })
        ));
    }
}
