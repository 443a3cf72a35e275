//! Relation types and compact type sets

use atlas_common::config::{PerTypeCaps, PerTypeWeights};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Kind of structural relation between two artists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    Members,
    Credits,
    Labels,
    Events,
    Country,
}

impl EdgeType {
    pub const ALL: [EdgeType; 5] = [
        EdgeType::Members,
        EdgeType::Credits,
        EdgeType::Labels,
        EdgeType::Events,
        EdgeType::Country,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EdgeType::Members => "members",
            EdgeType::Credits => "credits",
            EdgeType::Labels => "labels",
            EdgeType::Events => "events",
            EdgeType::Country => "country",
        }
    }

    /// Rerank weight configured for this type
    pub fn weight(self, weights: &PerTypeWeights) -> f32 {
        match self {
            EdgeType::Members => weights.members,
            EdgeType::Credits => weights.credits,
            EdgeType::Labels => weights.labels,
            EdgeType::Events => weights.events,
            EdgeType::Country => weights.country,
        }
    }

    /// Hub cap configured for this type
    pub fn cap(self, caps: &PerTypeCaps) -> usize {
        match self {
            EdgeType::Members => caps.members,
            EdgeType::Credits => caps.credits,
            EdgeType::Labels => caps.labels,
            EdgeType::Events => caps.events,
            EdgeType::Country => caps.country,
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn bit(self) -> u8 {
        1 << self.index()
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeType {
    type Err = atlas_common::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EdgeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| atlas_common::Error::InvalidInput(format!("unknown edge type '{}'", s)))
    }
}

/// Set of relation types connecting one artist pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EdgeTypeSet(u8);

impl EdgeTypeSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, edge_type: EdgeType) {
        self.0 |= edge_type.bit();
    }

    pub fn contains(&self, edge_type: EdgeType) -> bool {
        self.0 & edge_type.bit() != 0
    }

    pub fn union(self, other: EdgeTypeSet) -> EdgeTypeSet {
        EdgeTypeSet(self.0 | other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in declaration order
    pub fn iter(&self) -> impl Iterator<Item = EdgeType> + '_ {
        EdgeType::ALL.into_iter().filter(move |t| self.contains(*t))
    }

    /// Highest-weight type in the set; ties keep the earlier type
    pub fn strongest(&self, weights: &PerTypeWeights) -> Option<(EdgeType, f32)> {
        self.iter()
            .map(|t| (t, t.weight(weights)))
            .fold(None, |best, (t, w)| match best {
                Some((_, bw)) if bw >= w => best,
                _ => Some((t, w)),
            })
    }
}

impl FromIterator<EdgeType> for EdgeTypeSet {
    fn from_iter<I: IntoIterator<Item = EdgeType>>(iter: I) -> Self {
        let mut set = EdgeTypeSet::empty();
        for t in iter {
            set.insert(t);
        }
        set
    }
}

impl Serialize for EdgeTypeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for t in self.iter() {
            seq.serialize_element(&t)?;
        }
        seq.end()
    }
}
