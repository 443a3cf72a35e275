//! Integration tests for the hybrid retrieval engine
//!
//! Tests:
//! - Taste-only candidate generation, structure as rerank nudge only
//! - Non-stacking boost
//! - Cold-start (context-only / unresolved / redirected seeds)
//! - Deterministic labels and merge under concurrency
//! - Partial results on timeout

mod helpers;

use atlas_common::ArtistId;
use atlas_engine::cold_start::SeedState;
use atlas_engine::labels::LabelKind;
use atlas_engine::retrieval::BucketStrength;
use atlas_engine::structure::{EdgeType, StructureGraph};
use atlas_engine::taste::TasteGraph;
use atlas_engine::{QueryError, RetrievalOptions};
use helpers::*;
use std::time::Duration;
use tokio::task::JoinSet;

const EPS: f32 = 1e-6;

fn ids(result: &atlas_engine::RecommendationResult) -> Vec<ArtistId> {
    result.candidates.iter().map(|c| c.artist_id).collect()
}

// ============================================================================
// Ranking
// ============================================================================

#[tokio::test]
async fn test_stronger_taste_match_ranks_above_label_boost() {
    // Given: Labelmate 0.30 + shared label with Meshuggah, TasteMatch 0.40 taste only
    let engine = engine_for(metal_parts());

    // When
    let result = engine.retrieve(&[MESHUGGAH, TESSERACT], 10, true).await.unwrap();

    // Then: 0.40 beats 0.30 + 0.06, seeds never come back as candidates
    assert_eq!(ids(&result), vec![TASTE_MATCH, LABELMATE]);
    assert!(!result.partial);

    let taste_match = &result.candidates[0];
    assert!((taste_match.base_score - 0.40).abs() < EPS);
    assert_eq!(taste_match.final_score, taste_match.base_score);
    assert!(taste_match.reasons.is_empty());
    assert_eq!(taste_match.seed_support_count, 2);
    assert_eq!(taste_match.supporting_seed_ids, vec![MESHUGGAH, TESSERACT]);

    let labelmate = &result.candidates[1];
    assert!(labelmate.reasons.contains(EdgeType::Labels));
    assert!((labelmate.structure_boost - 0.06).abs() < EPS);
    assert!((labelmate.final_score - 0.36).abs() < EPS);
}

#[tokio::test]
async fn test_multiple_reasons_boost_by_max_only() {
    let mut parts = metal_parts();
    parts.structure = StructureGraph::from_edges(vec![
        relation(MESHUGGAH, LABELMATE, EdgeType::Members),
        relation(MESHUGGAH, LABELMATE, EdgeType::Labels),
        relation(TESSERACT, LABELMATE, EdgeType::Country),
    ]);
    let engine = engine_for(parts);

    let result = engine.retrieve(&[MESHUGGAH, TESSERACT], 10, true).await.unwrap();
    let labelmate = result
        .candidates
        .iter()
        .find(|c| c.artist_id == LABELMATE)
        .unwrap();

    assert_eq!(labelmate.reasons.len(), 3);
    assert_eq!(labelmate.structure_boost, 0.15);
    assert!((labelmate.final_score - labelmate.base_score - 0.15).abs() < EPS);
}

#[tokio::test]
async fn test_structure_cannot_overtake_taste_lead_above_max_boost() {
    // Given: Labelmate at 0.30 with members (max boost), a taste-only 0.46 match
    let mut parts = metal_parts();
    let strong = ArtistId(5);
    parts.taste = TasteGraph::from_edges(vec![
        taste_edge(MESHUGGAH, LABELMATE, 0.30),
        taste_edge(MESHUGGAH, strong, 0.46),
    ]);
    parts.structure = StructureGraph::from_edges(vec![relation(MESHUGGAH, LABELMATE, EdgeType::Members)]);
    let engine = engine_for(parts);

    let result = engine.retrieve(&[MESHUGGAH], 10, true).await.unwrap();

    assert_eq!(ids(&result), vec![strong, LABELMATE]);
}

#[tokio::test]
async fn test_rerank_disabled_keeps_reasons_without_boost() {
    let engine = engine_for(metal_parts());

    let result = engine.retrieve(&[MESHUGGAH, TESSERACT], 10, false).await.unwrap();
    let labelmate = result
        .candidates
        .iter()
        .find(|c| c.artist_id == LABELMATE)
        .unwrap();

    assert!(!result.reranked);
    assert!(labelmate.reasons.contains(EdgeType::Labels));
    assert_eq!(labelmate.structure_boost, 0.0);
    assert_eq!(labelmate.final_score, labelmate.base_score);
}

#[tokio::test]
async fn test_structure_never_generates_candidates() {
    // Given: a structure-only neighbor of Meshuggah with no taste edge
    let mut parts = metal_parts();
    let bandmate = ArtistId(42);
    parts.structure = StructureGraph::from_edges(vec![relation(MESHUGGAH, bandmate, EdgeType::Members)]);
    let engine = engine_for(parts);

    let result = engine.retrieve(&[MESHUGGAH], 10, true).await.unwrap();

    assert!(!ids(&result).contains(&bandmate));
}

#[tokio::test]
async fn test_limit_truncates_after_sorting() {
    let engine = engine_for(metal_parts());
    let result = engine.retrieve(&[MESHUGGAH, TESSERACT], 1, true).await.unwrap();
    assert_eq!(ids(&result), vec![TASTE_MATCH]);
}

// ============================================================================
// Labels, geo, tag cloud
// ============================================================================

#[tokio::test]
async fn test_identity_labels_are_stable_and_decaying() {
    let engine = engine_for(metal_parts());

    let first = engine.retrieve(&[MESHUGGAH], 10, true).await.unwrap();
    let second = engine.retrieve(&[MESHUGGAH], 10, true).await.unwrap();

    let labels = &first.seeds[0].identity_labels;
    assert_eq!(labels, &second.seeds[0].identity_labels);

    // swedish is a geo adjective and never an identity label
    let tags: Vec<&str> = labels.iter().map(|l| l.tag.as_str()).collect();
    assert_eq!(tags, vec!["djent", "math metal", "progressive metal"]);

    let decays: Vec<f32> = labels.iter().map(|l| l.decay.unwrap()).collect();
    assert_eq!(decays[0], 1.0);
    assert!(decays.windows(2).all(|w| w[0] >= w[1]));
    assert!(labels.iter().all(|l| l.kind == LabelKind::Identity));
}

#[tokio::test]
async fn test_exploration_labels_need_two_covering_artists() {
    let engine = engine_for(metal_parts());

    let result = engine.retrieve(&[MESHUGGAH, TESSERACT], 10, true).await.unwrap();

    // djent and death metal each cover one candidate only
    let tags: Vec<&str> = result.exploration_labels.iter().map(|l| l.tag.as_str()).collect();
    assert_eq!(tags, vec!["progressive metal"]);
    assert_eq!(result.exploration_labels[0].kind, LabelKind::Exploration);
}

#[tokio::test]
async fn test_geo_attached_to_seeds_and_candidates() {
    let engine = engine_for(metal_parts());

    let result = engine.retrieve(&[MESHUGGAH, TESSERACT], 10, true).await.unwrap();

    let seed_geo = result.seeds[0].geo.as_ref().unwrap();
    assert_eq!(seed_geo.city.as_deref(), Some("Umeå"));
    assert_eq!(seed_geo.country.as_deref(), Some("Sweden"));

    let taste_match = &result.candidates[0];
    assert_eq!(
        taste_match.geo.as_ref().and_then(|g| g.country.as_deref()),
        Some("United Kingdom")
    );
    // no area data: no geo, nothing invented
    assert!(result.candidates[1].geo.is_none());
}

#[tokio::test]
async fn test_tag_cloud_sums_seed_counts() {
    let engine = engine_for(metal_parts());
    let result = engine.retrieve(&[MESHUGGAH, TESSERACT], 10, true).await.unwrap();

    assert_eq!(result.tag_cloud[0].name, "djent");
    assert_eq!(result.tag_cloud[0].raw_count, 75);
    assert_eq!(result.tag_cloud[0].score, 1.0);
}

#[tokio::test]
async fn test_final_candidates_grouped_into_taste_buckets() {
    let engine = engine_for(metal_parts());

    let result = engine.retrieve(&[MESHUGGAH, TESSERACT], 10, true).await.unwrap();
    let buckets = &result.buckets;

    // swedish and british are geo tags: weight 150, djent .5 + prog .4 reaches .85
    let labels: Vec<&str> = buckets.buckets.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["djent", "progressive metal"]);
    assert_eq!(buckets.buckets[0].candidates, vec![TASTE_MATCH]);
    assert_eq!(buckets.buckets[1].candidates, vec![LABELMATE]);
    assert_eq!(buckets.buckets[0].strength, Some(BucketStrength::Weak));

    assert!(buckets.validation.ok);
    assert!(!buckets.validation.has_other);
    assert_eq!(buckets.validation.total_weight, 150);
    assert_eq!(buckets.validation.cum_share_final, 0.9);
    assert_eq!(buckets.validation.min_share_included, Some(0.4));
}

// ============================================================================
// Cold start
// ============================================================================

#[tokio::test]
async fn test_context_only_seed_contributes_labels_not_candidates() {
    let engine = engine_for(metal_parts());

    let result = engine.retrieve(&[CONTEXT_ONLY], 10, true).await.unwrap();

    assert!(result.candidates.is_empty());
    assert_eq!(result.seed_summary.context_only, 1);

    let seed = &result.seeds[0];
    assert_eq!(seed.state, SeedState::ContextOnly);
    assert!(!seed.identity_labels.is_empty());
    assert_eq!(seed.geo.as_ref().and_then(|g| g.country.as_deref()), Some("Iceland"));
}

#[tokio::test]
async fn test_unresolved_seed_is_reported_not_fatal() {
    let engine = engine_for(metal_parts());

    let result = engine.retrieve(&[MESHUGGAH, UNKNOWN], 10, true).await.unwrap();

    assert_eq!(result.seed_summary.taste_enabled, 1);
    assert_eq!(result.seed_summary.unresolved, 1);
    let unknown = result.seeds.iter().find(|s| s.requested == UNKNOWN).unwrap();
    assert_eq!(unknown.state, SeedState::Unresolved);
    assert!(unknown.identity_labels.is_empty());
    assert!(!result.candidates.is_empty());
}

#[tokio::test]
async fn test_redirected_seed_uses_canonical_taste_edges() {
    let engine = engine_for(metal_parts());

    let result = engine.retrieve(&[OLD_MESHUGGAH_ID], 10, true).await.unwrap();

    assert_eq!(result.seeds[0].canonical, Some(MESHUGGAH));
    assert_eq!(result.seeds[0].state, SeedState::TasteEnabled);
    // Tesseract is not a seed here, so it is Meshuggah's best candidate
    assert_eq!(ids(&result)[0], TESSERACT);
    assert!(!ids(&result).contains(&MESHUGGAH));
}

#[tokio::test]
async fn test_duplicate_seeds_counted_once() {
    let engine = engine_for(metal_parts());
    let result = engine
        .retrieve(&[MESHUGGAH, MESHUGGAH, OLD_MESHUGGAH_ID], 10, true)
        .await
        .unwrap();

    assert_eq!(result.seeds.len(), 2);
    assert_eq!(result.seed_summary.taste_enabled, 1);
    assert!(result.candidates.iter().all(|c| c.seed_support_count == 1));
}

#[tokio::test]
async fn test_seed_and_its_redirect_summarize_as_one_artist() {
    let engine = engine_for(metal_parts());

    let result = engine
        .retrieve(&[MESHUGGAH, OLD_MESHUGGAH_ID, UNKNOWN], 10, true)
        .await
        .unwrap();

    // both requests stay visible per seed, the summary counts artists
    assert_eq!(result.seeds.len(), 3);
    assert_eq!(result.seeds[1].canonical, Some(MESHUGGAH));
    assert_eq!(result.seed_summary.taste_enabled, 1);
    assert_eq!(result.seed_summary.context_only, 0);
    assert_eq!(result.seed_summary.unresolved, 1);
}

// ============================================================================
// Request validation, timeout, concurrency
// ============================================================================

#[tokio::test]
async fn test_rejects_empty_seeds_and_zero_limit() {
    let engine = engine_for(metal_parts());
    assert_eq!(engine.retrieve(&[], 10, true).await.unwrap_err(), QueryError::NoSeeds);
    assert_eq!(
        engine.retrieve(&[MESHUGGAH], 0, true).await.unwrap_err(),
        QueryError::ZeroLimit
    );
}

#[tokio::test]
async fn test_exhausted_budget_returns_flagged_partial_result() {
    let engine = engine_for(metal_parts());

    let options = RetrievalOptions::new(10, true).with_timeout(Duration::ZERO);
    let result = engine
        .retrieve_with(&[MESHUGGAH, TESSERACT], options)
        .await
        .unwrap();

    assert!(result.partial);
    assert!(result.candidates.is_empty());
    // seed context does not depend on the per-seed lookups
    assert_eq!(result.seed_summary.taste_enabled, 2);
    assert!(!result.seeds[0].identity_labels.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_queries_agree() {
    let engine = engine_for(metal_parts());
    let baseline = engine.retrieve(&[TESSERACT, MESHUGGAH], 10, true).await.unwrap();

    let mut join_set = JoinSet::new();
    for _ in 0..16 {
        let engine = engine.clone();
        join_set.spawn(async move {
            engine
                .retrieve(&[TESSERACT, MESHUGGAH], 10, true)
                .await
                .unwrap()
        });
    }

    while let Some(joined) = join_set.join_next().await {
        let result = joined.unwrap();
        assert_eq!(result.candidates, baseline.candidates);
        assert_eq!(result.exploration_labels.len(), baseline.exploration_labels.len());
    }
}
