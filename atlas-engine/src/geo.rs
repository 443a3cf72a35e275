//! Geo Resolver
//!
//! Best-effort city / country for an artist from its area association,
//! walking the area hierarchy (city → subdivision → country). Missing data
//! yields missing fields; nothing is inferred. Geo is display context only and
//! never feeds similarity or reranking.

use atlas_common::{AreaId, ArtistId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Upper bound on parent hops, guarding against cyclic area data
const MAX_AREA_HOPS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaKind {
    City,
    Subdivision,
    Country,
    #[serde(other)]
    Other,
}

/// Area table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    pub kind: AreaKind,
    #[serde(default)]
    pub parent: Option<AreaId>,
}

/// Artist → area association
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistArea {
    pub artist_id: ArtistId,
    pub area_id: AreaId,
}

/// Resolved geo context for one artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeoLabel {
    pub artist_id: ArtistId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GeoResolver {
    areas: HashMap<AreaId, Area>,
    artist_areas: HashMap<ArtistId, AreaId>,
}

impl GeoResolver {
    /// Later associations for the same artist replace earlier ones
    pub fn new(areas: Vec<Area>, associations: Vec<ArtistArea>) -> Self {
        Self {
            areas: areas.into_iter().map(|a| (a.id, a)).collect(),
            artist_areas: associations
                .into_iter()
                .map(|a| (a.artist_id, a.area_id))
                .collect(),
        }
    }

    /// Nearest city and country above the artist's area.
    ///
    /// `None` when the artist has no known area or the walk finds neither.
    pub fn resolve(&self, artist: ArtistId) -> Option<GeoLabel> {
        let mut next = self.artist_areas.get(&artist).copied();
        let mut city = None;
        let mut country = None;

        for _ in 0..MAX_AREA_HOPS {
            let Some(area) = next.and_then(|id| self.areas.get(&id)) else {
                break;
            };
            match area.kind {
                AreaKind::City if city.is_none() => city = Some(area.name.clone()),
                AreaKind::Country => {
                    country = Some(area.name.clone());
                    break;
                }
                _ => {}
            }
            next = area.parent;
        }

        if city.is_none() && country.is_none() {
            debug!(artist_id = %artist, "No geo context");
            return None;
        }
        Some(GeoLabel {
            artist_id: artist,
            city,
            country,
        })
    }

    pub fn artists(&self) -> impl Iterator<Item = ArtistId> + '_ {
        self.artist_areas.keys().copied()
    }

    pub fn area_count(&self) -> usize {
        self.areas.len()
    }
}
