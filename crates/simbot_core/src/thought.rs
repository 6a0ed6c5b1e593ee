//! Thoughts: named conversational signals derived from a capsule.

use crate::capsule::{EntityRecord, NegationConflict};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;

/// Which extraction rule produced a thought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThoughtKind {
    #[serde(rename = "_trust")]
    Trust,
    #[serde(rename = "_statement_novelty")]
    StatementNovelty,
    #[serde(rename = "_overlaps")]
    Overlaps,
    #[serde(rename = "_entity_novelty")]
    EntityNovelty,
    #[serde(rename = "_subject_gaps")]
    SubjectGaps,
    #[serde(rename = "_complement_gaps")]
    ComplementGaps,
    #[serde(rename = "_complement_conflict")]
    ComplementConflict,
    #[serde(rename = "_negation_conflicts")]
    NegationConflicts,
}

impl ThoughtKind {
    pub const ALL: [ThoughtKind; 8] = [
        ThoughtKind::Trust,
        ThoughtKind::StatementNovelty,
        ThoughtKind::Overlaps,
        ThoughtKind::EntityNovelty,
        ThoughtKind::SubjectGaps,
        ThoughtKind::ComplementGaps,
        ThoughtKind::ComplementConflict,
        ThoughtKind::NegationConflicts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThoughtKind::Trust => "_trust",
            ThoughtKind::StatementNovelty => "_statement_novelty",
            ThoughtKind::Overlaps => "_overlaps",
            ThoughtKind::EntityNovelty => "_entity_novelty",
            ThoughtKind::SubjectGaps => "_subject_gaps",
            ThoughtKind::ComplementGaps => "_complement_gaps",
            ThoughtKind::ComplementConflict => "_complement_conflict",
            ThoughtKind::NegationConflicts => "_negation_conflicts",
        }
    }
}

impl std::fmt::Display for ThoughtKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `{subject, complement}` shape shared by overlap, gap and novelty payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePair<T> {
    pub subject: T,
    pub complement: T,
}

impl RolePair<Vec<EntityRecord>> {
    pub fn subject_only(records: Vec<EntityRecord>) -> Self {
        Self {
            subject: records,
            complement: Vec::new(),
        }
    }

    pub fn complement_only(records: Vec<EntityRecord>) -> Self {
        Self {
            subject: Vec::new(),
            complement: records,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ThoughtPayload {
    Trust(Value),
    StatementNovelty(bool),
    /// Overlaps and gaps: the records that triggered the thought.
    Entities(RolePair<Vec<EntityRecord>>),
    EntityNovelty(RolePair<bool>),
    /// At most one conflicting item.
    ComplementConflict(Vec<Value>),
    /// One positive and one negative claim, in that order.
    NegationConflict(NegationConflict, NegationConflict),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thought {
    pub kind: ThoughtKind,
    pub payload: ThoughtPayload,
}

impl Thought {
    pub fn new(kind: ThoughtKind, payload: ThoughtPayload) -> Self {
        Self { kind, payload }
    }
}

// ============================================================================
// ThoughtsMap
// ============================================================================

/// Thoughts keyed by name.
///
/// Iteration order is randomized when the map is built and carries no
/// meaning: equality ignores it, and consumers must select by name or kind.
#[derive(Debug, Clone, Default)]
pub struct ThoughtsMap {
    entries: Vec<(String, Thought)>,
}

impl ThoughtsMap {
    /// Build from a keyed set of thoughts, scrambling the enumeration order.
    pub fn shuffled<R: Rng + ?Sized>(thoughts: HashMap<String, Thought>, rng: &mut R) -> Self {
        let mut entries: Vec<(String, Thought)> = thoughts.into_iter().collect();
        // HashMap order depends on its own hasher seed; sort so the shuffle
        // alone decides the order and a seeded rng reproduces it.
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.shuffle(rng);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Thought> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, thought)| thought)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Thought)> {
        self.entries.iter().map(|(n, t)| (n.as_str(), t))
    }

    /// All thoughts produced by one rule.
    pub fn of_kind(&self, kind: ThoughtKind) -> impl Iterator<Item = (&str, &Thought)> {
        self.iter().filter(move |(_, t)| t.kind == kind)
    }

    pub fn into_hash_map(self) -> HashMap<String, Thought> {
        self.entries.into_iter().collect()
    }
}

impl PartialEq for ThoughtsMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, thought)| other.get(name) == Some(thought))
    }
}

impl IntoIterator for ThoughtsMap {
    type Item = (String, Thought);
    type IntoIter = std::vec::IntoIter<(String, Thought)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for ThoughtsMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, thought) in &self.entries {
            map.serialize_entry(name, thought)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capsule::{Entity, Polarity};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn sample() -> HashMap<String, Thought> {
        let mut thoughts = HashMap::new();
        for i in 0..20 {
            thoughts.insert(
                format!("thought {}", i),
                Thought::new(ThoughtKind::Trust, ThoughtPayload::Trust(json!(i))),
            );
        }
        thoughts.insert(
            "statement_novelty".to_string(),
            Thought::new(
                ThoughtKind::StatementNovelty,
                ThoughtPayload::StatementNovelty(false),
            ),
        );
        thoughts
    }

    #[test]
    fn test_same_seed_same_order() {
        let a = ThoughtsMap::shuffled(sample(), &mut StdRng::seed_from_u64(7));
        let b = ThoughtsMap::shuffled(sample(), &mut StdRng::seed_from_u64(7));
        assert!(a.names().eq(b.names()));
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = ThoughtsMap::shuffled(sample(), &mut StdRng::seed_from_u64(1));
        let b = ThoughtsMap::shuffled(sample(), &mut StdRng::seed_from_u64(2));
        assert!(!a.names().eq(b.names()), "21 entries should not shuffle identically");
        assert_eq!(a, b);
    }

    #[test]
    fn test_lookup_and_kind_filter() {
        let map = ThoughtsMap::shuffled(sample(), &mut StdRng::seed_from_u64(3));
        assert_eq!(map.len(), 21);
        assert!(map.contains("thought 4"));
        assert!(!map.contains("thought 40"));
        assert_eq!(map.of_kind(ThoughtKind::StatementNovelty).count(), 1);
        assert_eq!(map.of_kind(ThoughtKind::Overlaps).count(), 0);
    }

    #[test]
    fn test_serialize_shape() {
        let mut thoughts = HashMap::new();
        let record = EntityRecord::new(Entity::new(["animal"]));
        thoughts.insert(
            "overlap animal".to_string(),
            Thought::new(
                ThoughtKind::Overlaps,
                ThoughtPayload::Entities(RolePair::subject_only(vec![record])),
            ),
        );
        thoughts.insert(
            "negation_conflict".to_string(),
            Thought::new(
                ThoughtKind::NegationConflicts,
                ThoughtPayload::NegationConflict(
                    NegationConflict::new(Polarity::Positive),
                    NegationConflict::new(Polarity::Negative),
                ),
            ),
        );
        let map = ThoughtsMap::shuffled(thoughts, &mut StdRng::seed_from_u64(0));
        let value = serde_json::to_value(&map).unwrap();
        assert_eq!(
            value["overlap animal"],
            json!({
                "kind": "_overlaps",
                "payload": {"subject": [{"entity": {"types": ["animal"]}}], "complement": []}
            })
        );
        assert_eq!(
            value["negation_conflict"]["payload"],
            json!([{"polarity_value": "POSITIVE"}, {"polarity_value": "NEGATIVE"}])
        );
    }

    #[test]
    fn test_kind_strings() {
        for kind in ThoughtKind::ALL {
            let serialized = serde_json::to_value(kind).unwrap();
            assert_eq!(serialized, json!(kind.as_str()));
        }
    }
}
