//! Small hand-built snapshot around two mutually similar metal seeds
//!
//! Taste edges (similarity):
//! - Meshuggah ⇄ Tesseract 0.47
//! - Meshuggah → Labelmate 0.30 (plus a shared label, structure only)
//! - Tesseract → TasteMatch 0.40, Meshuggah → TasteMatch 0.20
//!
//! ContextOnly has a tag profile and an area but no taste edges.

#![allow(dead_code)]

use atlas_common::config::AtlasConfig;
use atlas_common::{AreaId, ArtistId};
use atlas_engine::geo::{Area, AreaKind, ArtistArea, GeoResolver};
use atlas_engine::identity::{ArtistName, IdentityDirectory, Redirect};
use atlas_engine::structure::{EdgeType, StructureEdge, StructureGraph};
use atlas_engine::tags::{TagEntry, TagProfile, TagProfileIndex, TagReferenceIndex};
use atlas_engine::taste::{TasteEdge, TasteGraph};
use atlas_engine::{EngineSnapshot, HybridRetrievalEngine, SnapshotParts, SnapshotStore};
use std::sync::Arc;

pub const MESHUGGAH: ArtistId = ArtistId(1);
pub const TESSERACT: ArtistId = ArtistId(2);
pub const LABELMATE: ArtistId = ArtistId(3);
pub const TASTE_MATCH: ArtistId = ArtistId(4);
pub const CONTEXT_ONLY: ArtistId = ArtistId(6);
pub const OLD_MESHUGGAH_ID: ArtistId = ArtistId(100);
pub const UNKNOWN: ArtistId = ArtistId(999);

pub fn profile(id: ArtistId, tags: &[(&str, u32)]) -> TagProfile {
    TagProfile::from_entries(
        id,
        tags.iter()
            .map(|(name, count)| TagEntry {
                name: name.to_string(),
                count: *count,
                weight: *count as f32,
                rank: 0,
            })
            .collect(),
    )
}

pub fn taste_edge(src: ArtistId, dst: ArtistId, similarity: f32) -> TasteEdge {
    TasteEdge {
        src,
        dst,
        similarity,
        overlap: 1,
    }
}

pub fn relation(a: ArtistId, b: ArtistId, edge_type: EdgeType) -> StructureEdge {
    StructureEdge {
        src: a,
        dst: b,
        edge_type,
        directed: false,
        weight: 1.0,
    }
}

fn area(id: u64, name: &str, kind: AreaKind, parent: Option<u64>) -> Area {
    Area {
        id: AreaId(id),
        name: name.to_string(),
        kind,
        parent: parent.map(AreaId),
    }
}

/// Baseline fixture; tests tweak `taste` / `structure` before building
pub fn metal_parts() -> SnapshotParts {
    let mut profiles = TagProfileIndex::default();
    profiles.insert(profile(
        MESHUGGAH,
        &[("djent", 40), ("progressive metal", 30), ("swedish", 25), ("math metal", 10)],
    ));
    profiles.insert(profile(
        TESSERACT,
        &[("djent", 35), ("progressive metal", 30), ("british", 20), ("ambient", 5)],
    ));
    profiles.insert(profile(LABELMATE, &[("progressive metal", 20), ("death metal", 15)]));
    profiles.insert(profile(TASTE_MATCH, &[("djent", 30), ("progressive metal", 10)]));
    profiles.insert(profile(
        CONTEXT_ONLY,
        &[("post-rock", 12), ("ambient", 8), ("icelandic", 5)],
    ));

    let references = TagReferenceIndex::from_counts(
        1_000,
        [
            ("djent", 40),
            ("progressive metal", 300),
            ("swedish", 200),
            ("math metal", 25),
            ("british", 500),
            ("ambient", 400),
            ("death metal", 350),
            ("post-rock", 120),
            ("icelandic", 30),
        ]
        .into_iter()
        .map(|(t, c)| (t.to_string(), c))
        .collect(),
    );

    let taste = TasteGraph::from_edges(vec![
        taste_edge(MESHUGGAH, TESSERACT, 0.47),
        taste_edge(TESSERACT, MESHUGGAH, 0.47),
        taste_edge(MESHUGGAH, LABELMATE, 0.30),
        taste_edge(TESSERACT, TASTE_MATCH, 0.40),
        taste_edge(MESHUGGAH, TASTE_MATCH, 0.20),
    ]);

    let structure = StructureGraph::from_edges(vec![relation(MESHUGGAH, LABELMATE, EdgeType::Labels)]);

    let geo = GeoResolver::new(
        vec![
            area(10, "Sweden", AreaKind::Country, None),
            area(11, "Umeå", AreaKind::City, Some(10)),
            area(20, "United Kingdom", AreaKind::Country, None),
            area(30, "Iceland", AreaKind::Country, None),
            area(31, "Reykjavík", AreaKind::City, Some(30)),
        ],
        vec![
            ArtistArea { artist_id: MESHUGGAH, area_id: AreaId(11) },
            ArtistArea { artist_id: TESSERACT, area_id: AreaId(20) },
            ArtistArea { artist_id: TASTE_MATCH, area_id: AreaId(20) },
            ArtistArea { artist_id: CONTEXT_ONLY, area_id: AreaId(31) },
        ],
    );

    let identity = IdentityDirectory::new(
        [MESHUGGAH, TESSERACT, LABELMATE, TASTE_MATCH, CONTEXT_ONLY],
        vec![Redirect { from: OLD_MESHUGGAH_ID, to: MESHUGGAH }],
        vec![
            ArtistName { artist_id: MESHUGGAH, name: "Meshuggah".into() },
            ArtistName { artist_id: TESSERACT, name: "TesseracT".into() },
        ],
    );

    SnapshotParts {
        profiles,
        references,
        taste,
        structure,
        geo,
        identity,
        ..SnapshotParts::default()
    }
}

pub fn store_for(parts: SnapshotParts) -> Arc<SnapshotStore> {
    let snapshot = EngineSnapshot::from_parts(parts, AtlasConfig::default());
    Arc::new(SnapshotStore::new(snapshot).expect("fixture snapshot must verify"))
}

pub fn engine_for(parts: SnapshotParts) -> HybridRetrievalEngine {
    HybridRetrievalEngine::new(store_for(parts))
}
