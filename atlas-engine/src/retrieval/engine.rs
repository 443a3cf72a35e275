//! Hybrid Retrieval Engine
//!
//! # Query flow
//! 1. Resolve and partition seeds (cold-start path for non-sources)
//! 2. Per taste-enabled seed, in parallel: taste neighbors + structure neighbors
//! 3. Deterministic merge: dedup, max similarity, support set, reason union
//! 4. Rerank (optional) and sort
//! 5. Exploration labels over the head of the ranked pool
//! 6. Truncate to `limit` (optional primary-tag diversity cap)
//! 7. Geo on the final list; identity labels and geo per resolved seed
//! 8. Seed tag cloud and taste buckets over the final list
//!
//! The structure graph is only read in step 2 for reasons; candidates come
//! from taste edges alone.

use atlas_common::ArtistId;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::buckets::bucket_candidates;
use super::merge::{merge_contributions, SeedContribution};
use super::rerank::{assemble_final, Reranker};
use super::result::{RecommendationResult, SeedReport, SeedSummary};
use crate::cold_start::ColdStartResolver;
use crate::error::QueryError;
use crate::snapshot::{EngineSnapshot, SnapshotStore};
use crate::tag_cloud::build_tag_cloud;

/// Per-call knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalOptions {
    pub limit: usize,
    pub rerank: bool,
    /// Overrides `[query].timeout_ms` when set
    pub timeout: Option<Duration>,
}

impl RetrievalOptions {
    pub fn new(limit: usize, rerank: bool) -> Self {
        Self {
            limit,
            rerank,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Query entry point over the live snapshot
#[derive(Debug, Clone)]
pub struct HybridRetrievalEngine {
    store: Arc<SnapshotStore>,
}

impl HybridRetrievalEngine {
    pub fn new(store: Arc<SnapshotStore>) -> Self {
        Self { store }
    }

    pub async fn retrieve(
        &self,
        seeds: &[ArtistId],
        limit: usize,
        rerank: bool,
    ) -> Result<RecommendationResult, QueryError> {
        self.retrieve_with(seeds, RetrievalOptions::new(limit, rerank))
            .await
    }

    pub async fn retrieve_with(
        &self,
        seeds: &[ArtistId],
        options: RetrievalOptions,
    ) -> Result<RecommendationResult, QueryError> {
        if seeds.is_empty() {
            return Err(QueryError::NoSeeds);
        }
        if options.limit == 0 {
            return Err(QueryError::ZeroLimit);
        }

        let snapshot = self.store.current().await;
        let query_id = Uuid::new_v4();
        let config = snapshot.config();
        let timeout = options
            .timeout
            .unwrap_or_else(|| Duration::from_millis(config.query.timeout_ms));
        debug!(
            query_id = %query_id,
            snapshot = %snapshot.version(),
            seeds = seeds.len(),
            limit = options.limit,
            rerank = options.rerank,
            "Retrieval started"
        );

        // 1. Seeds
        let partition =
            ColdStartResolver::new(snapshot.identity(), snapshot.taste()).partition(seeds);

        // 2. Per-seed fan-out
        let (contributions, partial) =
            fan_out(&snapshot, &partition.taste_enabled, timeout, query_id).await;

        // 3-4. Merge, rerank, sort
        let exclude: HashSet<ArtistId> = partition
            .resolved()
            .chain(seeds.iter().copied())
            .collect();
        let merged = merge_contributions(contributions, &exclude);
        let ranked = Reranker::new(&config.structure.weights, options.rerank).rank(merged);

        // 5. Exploration labels over the ranked head
        let labeler = snapshot.labeler();
        let head: Vec<ArtistId> = ranked
            .iter()
            .take(labeler.exploration_set_size())
            .map(|c| c.artist_id)
            .collect();
        let exploration_labels =
            labeler.exploration(query_id, &head, snapshot.profiles(), snapshot.references());

        // 6-7. Final list with geo
        let mut candidates = assemble_final(
            &ranked,
            options.limit,
            config.query.max_per_primary_tag,
            snapshot.profiles(),
        );
        for candidate in &mut candidates {
            candidate.geo = snapshot.geo().resolve(candidate.artist_id);
        }

        let seed_reports: Vec<SeedReport> = partition
            .resolutions
            .iter()
            .map(|resolution| {
                let mut report = SeedReport::bare(resolution);
                // unresolved seeds carry no canonical id and get no context
                if let Some(id) = resolution.canonical {
                    if let Some(profile) = snapshot.profiles().get(id) {
                        report.identity_labels = labeler.identity(profile, snapshot.references());
                    }
                    report.geo = snapshot.geo().resolve(id);
                }
                report
            })
            .collect();

        let resolved: Vec<ArtistId> = partition.resolved().collect();
        let seed_summary = SeedSummary::tally(&partition);
        let tag_cloud = build_tag_cloud(&resolved, snapshot.profiles());
        let buckets = bucket_candidates(
            &tag_cloud,
            &candidates,
            snapshot.profiles(),
            labeler.filter(),
            &config.buckets,
        );

        info!(
            query_id = %query_id,
            taste_enabled = seed_summary.taste_enabled,
            context_only = seed_summary.context_only,
            unresolved = seed_summary.unresolved,
            pool = ranked.len(),
            returned = candidates.len(),
            partial,
            "Retrieval finished"
        );

        Ok(RecommendationResult {
            query_id,
            snapshot_version: snapshot.version(),
            candidates,
            seeds: seed_reports,
            seed_summary,
            exploration_labels,
            tag_cloud,
            buckets,
            reranked: options.rerank,
            partial,
        })
    }
}

/// Look up every taste-enabled seed concurrently.
///
/// Returns what finished before the deadline and whether anything was cut off.
async fn fan_out(
    snapshot: &Arc<EngineSnapshot>,
    seeds: &[ArtistId],
    timeout: Duration,
    query_id: Uuid,
) -> (Vec<SeedContribution>, bool) {
    let deadline = Instant::now() + timeout;
    let mut tasks = JoinSet::new();
    for &seed in seeds {
        let snapshot = Arc::clone(snapshot);
        tasks.spawn(async move {
            SeedContribution {
                seed,
                neighbors: snapshot.taste().neighbors(seed).to_vec(),
                structure: snapshot
                    .structure()
                    .neighbors(seed)
                    .cloned()
                    .unwrap_or_default(),
            }
        });
    }

    let mut contributions = Vec::with_capacity(seeds.len());
    let mut partial = false;
    while !tasks.is_empty() {
        if Instant::now() >= deadline {
            partial = true;
            break;
        }
        match timeout_at(deadline, tasks.join_next()).await {
            Ok(Some(Ok(contribution))) => contributions.push(contribution),
            Ok(Some(Err(e))) => {
                warn!(query_id = %query_id, error = %e, "Seed lookup failed");
                partial = true;
            }
            Ok(None) => break,
            Err(_) => {
                partial = true;
                break;
            }
        }
    }

    if partial && !tasks.is_empty() {
        warn!(
            query_id = %query_id,
            outstanding = tasks.len(),
            completed = contributions.len(),
            "Query timeout, returning partial merge"
        );
        tasks.abort_all();
    }
    (contributions, partial)
}
