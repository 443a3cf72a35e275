//! Versioned engine snapshots
//!
//! All graphs and indexes are built offline into one immutable
//! [`EngineSnapshot`]. Queries hold an `Arc` to the snapshot they started with;
//! [`SnapshotStore::publish`] verifies a replacement and swaps the pointer, so
//! readers never see a half-built snapshot and the previous one stays valid
//! until its last reader drops it.
//!
//! # Build order
//! 1. Tag profiles (normalize, cap, rank)
//! 2. Tag reference index (pre-truncation counts, external counts merged)
//! 3. Taste graph
//! 4. Structure graph
//! 5. Geo resolver and identity directory
//! 6. [`EngineSnapshot::verify`]

use atlas_common::config::AtlasConfig;
use atlas_common::ArtistId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::BuildError;
use crate::geo::{Area, ArtistArea, GeoResolver};
use crate::identity::{ArtistName, IdentityDirectory, Redirect};
use crate::labels::MacroTagLabeler;
use crate::structure::{EdgeType, RelationRecord, StructureGraph};
use crate::tags::{ArtistTags, TagFilter, TagProfileIndex, TagReferenceIndex};
use crate::taste::{HubReport, TasteGraph, TasteGraphBuilder};

/// Raw ingestion bundle a snapshot is built from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotInputs {
    pub artist_tags: Vec<ArtistTags>,
    /// Global per-tag counts known to ingestion (merged, larger wins)
    pub tag_reference_counts: HashMap<String, u32>,
    /// Catalog size when larger than the set of profiled artists
    pub total_artists: Option<usize>,
    pub relations: Vec<RelationRecord>,
    pub areas: Vec<Area>,
    pub artist_areas: Vec<ArtistArea>,
    pub redirects: Vec<Redirect>,
    pub artist_names: Vec<ArtistName>,
}

impl SnapshotInputs {
    /// Decode a JSON input bundle
    pub fn from_json(raw: &str) -> atlas_common::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Read and decode a JSON input bundle file
    pub fn load(path: &Path) -> atlas_common::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}

/// Prebuilt components, assembled without running the builders
#[derive(Debug, Clone, Default)]
pub struct SnapshotParts {
    pub profiles: TagProfileIndex,
    pub references: TagReferenceIndex,
    pub taste: TasteGraph,
    pub hub_report: HubReport,
    pub structure: StructureGraph,
    pub geo: GeoResolver,
    pub identity: IdentityDirectory,
}

/// Summary statistics of one snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildStats {
    pub artists: usize,
    pub tags: usize,
    pub hub_capped_tags: usize,
    pub max_tag_considered: usize,
    pub taste_edges: usize,
    pub isolated_artists: usize,
    pub structure_edges: BTreeMap<EdgeType, usize>,
    pub structure_dropped: BTreeMap<EdgeType, usize>,
    pub areas: usize,
    pub known_artists: usize,
}

impl BuildStats {
    fn collect(parts: &SnapshotParts) -> Self {
        let isolated_artists = parts
            .profiles
            .artist_ids()
            .into_iter()
            .filter(|id| !parts.taste.is_source(*id))
            .count();
        Self {
            artists: parts.profiles.len(),
            tags: parts.references.tag_count(),
            hub_capped_tags: parts.hub_report.capped_tags(),
            max_tag_considered: parts.hub_report.max_considered(),
            taste_edges: parts.taste.edge_count(),
            isolated_artists,
            structure_edges: parts.structure.stats().kept.clone(),
            structure_dropped: parts.structure.stats().dropped_by_cap.clone(),
            areas: parts.geo.area_count(),
            known_artists: parts.identity.known_count(),
        }
    }
}

/// Immutable, versioned set of everything a query reads
#[derive(Debug)]
pub struct EngineSnapshot {
    version: Uuid,
    built_at: DateTime<Utc>,
    config: AtlasConfig,
    profiles: TagProfileIndex,
    references: TagReferenceIndex,
    taste: TasteGraph,
    hub_report: HubReport,
    structure: StructureGraph,
    geo: GeoResolver,
    identity: IdentityDirectory,
    labeler: MacroTagLabeler,
    stats: BuildStats,
}

impl EngineSnapshot {
    /// Run every builder over `inputs`, then verify the result
    pub fn build(inputs: SnapshotInputs, config: &AtlasConfig) -> Result<Self, BuildError> {
        config.validate()?;
        let filter = TagFilter::from_config(config);

        let profiles =
            TagProfileIndex::from_raw(&inputs.artist_tags, config.taste.profile_cap, &filter);

        let mut references = TagReferenceIndex::from_profiles(&profiles);
        references.merge_external(&inputs.tag_reference_counts);
        if let Some(total) = inputs.total_artists.filter(|t| *t > profiles.len()) {
            references = TagReferenceIndex::from_counts(total, references.into_counts());
        }

        let taste_build = TasteGraphBuilder::from_config(&config.taste).build(&profiles, &references);
        let structure = StructureGraph::build(&inputs.relations, &config.structure.caps);
        let geo = GeoResolver::new(inputs.areas, inputs.artist_areas);

        let known: Vec<ArtistId> = profiles
            .artist_ids()
            .into_iter()
            .chain(geo.artists())
            .chain(structure.artists())
            .collect();
        let identity = IdentityDirectory::new(known, inputs.redirects, inputs.artist_names);

        let snapshot = Self::from_parts(
            SnapshotParts {
                profiles,
                references,
                taste: taste_build.graph,
                hub_report: taste_build.hub_report,
                structure,
                geo,
                identity,
            },
            config.clone(),
        );
        snapshot.verify()?;

        info!(
            version = %snapshot.version,
            artists = snapshot.stats.artists,
            taste_edges = snapshot.stats.taste_edges,
            isolated = snapshot.stats.isolated_artists,
            "Snapshot built"
        );
        Ok(snapshot)
    }

    /// Wrap prebuilt parts under a fresh version. Not verified.
    pub fn from_parts(parts: SnapshotParts, config: AtlasConfig) -> Self {
        let stats = BuildStats::collect(&parts);
        let labeler = MacroTagLabeler::new(TagFilter::from_config(&config), &config.labels);
        Self {
            version: Uuid::new_v4(),
            built_at: Utc::now(),
            config,
            profiles: parts.profiles,
            references: parts.references,
            taste: parts.taste,
            hub_report: parts.hub_report,
            structure: parts.structure,
            geo: parts.geo,
            identity: parts.identity,
            labeler,
            stats,
        }
    }

    /// Integrity checks that gate publication
    pub fn verify(&self) -> Result<(), BuildError> {
        self.config.validate()?;
        self.profiles.verify(self.config.taste.profile_cap)?;
        self.hub_report.verify(self.config.taste.tag_hub_cap)?;
        self.taste.verify(self.config.taste.neighbors)?;
        self.structure.verify(&self.config.structure.caps)?;
        Ok(())
    }

    pub fn version(&self) -> Uuid {
        self.version
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    pub fn profiles(&self) -> &TagProfileIndex {
        &self.profiles
    }

    pub fn references(&self) -> &TagReferenceIndex {
        &self.references
    }

    pub fn taste(&self) -> &TasteGraph {
        &self.taste
    }

    pub fn structure(&self) -> &StructureGraph {
        &self.structure
    }

    pub fn geo(&self) -> &GeoResolver {
        &self.geo
    }

    pub fn identity(&self) -> &IdentityDirectory {
        &self.identity
    }

    pub fn labeler(&self) -> &MacroTagLabeler {
        &self.labeler
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }
}

/// Holder of the live snapshot
///
/// Uses RwLock for a pointer swap; readers clone the `Arc` and release the
/// lock immediately.
#[derive(Debug)]
pub struct SnapshotStore {
    current: RwLock<Arc<EngineSnapshot>>,
}

impl SnapshotStore {
    /// Verify and install the initial snapshot
    pub fn new(initial: EngineSnapshot) -> Result<Self, BuildError> {
        initial.verify()?;
        Ok(Self {
            current: RwLock::new(Arc::new(initial)),
        })
    }

    /// Snapshot to serve the next query from
    pub async fn current(&self) -> Arc<EngineSnapshot> {
        self.current.read().await.clone()
    }

    /// Verify `snapshot` and make it current. On failure the live snapshot
    /// is left untouched.
    pub async fn publish(&self, snapshot: EngineSnapshot) -> Result<Uuid, BuildError> {
        if let Err(e) = snapshot.verify() {
            error!(version = %snapshot.version, error = %e, "Rejected snapshot");
            return Err(e);
        }

        let version = snapshot.version;
        let previous = {
            let mut guard = self.current.write().await;
            std::mem::replace(&mut *guard, Arc::new(snapshot))
        };
        info!(
            version = %version,
            previous = %previous.version,
            "Published snapshot"
        );
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taste::TasteEdge;

    fn corrupt_parts() -> SnapshotParts {
        let edges = (2..=52).map(|d| TasteEdge {
            src: ArtistId(1),
            dst: ArtistId(d),
            similarity: 0.5,
            overlap: 1,
        });
        SnapshotParts {
            taste: TasteGraph::from_edges(edges),
            ..SnapshotParts::default()
        }
    }

    #[tokio::test]
    async fn test_publish_rejects_corrupt_snapshot_and_keeps_current() {
        let store = SnapshotStore::new(EngineSnapshot::from_parts(
            SnapshotParts::default(),
            AtlasConfig::default(),
        ))
        .unwrap();
        let live = store.current().await.version();

        let corrupt = EngineSnapshot::from_parts(corrupt_parts(), AtlasConfig::default());
        let result = store.publish(corrupt).await;

        assert!(matches!(result, Err(BuildError::OutDegreeExceeded { .. })));
        assert_eq!(store.current().await.version(), live);
    }

    #[tokio::test]
    async fn test_publish_swaps_version() {
        let store = SnapshotStore::new(EngineSnapshot::from_parts(
            SnapshotParts::default(),
            AtlasConfig::default(),
        ))
        .unwrap();
        let held = store.current().await;

        let next = EngineSnapshot::from_parts(SnapshotParts::default(), AtlasConfig::default());
        let version = store.publish(next).await.unwrap();

        assert_eq!(store.current().await.version(), version);
        // readers keep the snapshot they started with
        assert_ne!(held.version(), version);
    }

    #[test]
    fn test_hub_report_violation_is_fatal() {
        let parts = SnapshotParts {
            hub_report: HubReport::from_considered(
                [("rock".to_string(), 900)].into_iter().collect(),
                0,
            ),
            ..SnapshotParts::default()
        };
        let snapshot = EngineSnapshot::from_parts(parts, AtlasConfig::default());
        assert!(matches!(
            snapshot.verify(),
            Err(BuildError::TagHubCapExceeded { .. })
        ));
    }
}
