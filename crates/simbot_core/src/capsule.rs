//! Typed schema for the brain response produced by the reasoning component.
//!
//! Field names follow the plain form (`trust`, `overlaps`, `types`, ...). The
//! reasoning component itself emits the same fields with a leading underscore
//! (`_trust`, `_overlaps`, `_types`, ...), so each one carries an alias.
//! Overlap, gap and negation-conflict records are handed on to the reply
//! generator and serialize back with the spelling they arrived in.
//! Required fields have no defaults: a missing field fails deserialization.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Top-level response
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainResponse {
    /// The utterance the capsule was computed for.
    pub statement: Statement,
    /// The capsule: every reasoning signal about the statement.
    pub thoughts: Capsule,
}

impl BrainResponse {
    /// Parse a brain response from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Convert an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub triple: Triple,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triple {
    #[serde(alias = "_subject")]
    pub subject: Entity,
    #[serde(alias = "_complement")]
    pub complement: Entity,
}

// ============================================================================
// Entities
// ============================================================================

/// An entity with its type labels.
///
/// Types are expected most general first, most specific last. That ordering is
/// a convention of the reasoning component and is not checked here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Entity {
    pub types: Vec<String>,
    /// Labels, ids and anything else the reasoning component attached.
    pub extra: Map<String, Value>,
    style: KeyStyle,
}

impl Entity {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
            extra: Map::new(),
            style: KeyStyle::Plain,
        }
    }

    /// First label of the type sequence.
    pub fn first_type(&self) -> Option<&str> {
        self.types.first().map(String::as_str)
    }

    /// Last label of the type sequence.
    pub fn most_specific_type(&self) -> Option<&str> {
        self.types.last().map(String::as_str)
    }
}

impl TryFrom<Map<String, Value>> for Entity {
    type Error = String;

    fn try_from(mut map: Map<String, Value>) -> std::result::Result<Self, String> {
        let (style, types) = take_field(&mut map, "types")?;
        Ok(Self {
            types,
            extra: map,
            style,
        })
    }
}

impl From<Entity> for Map<String, Value> {
    fn from(entity: Entity) -> Self {
        let mut map = entity.extra;
        map.insert(entity.style.key("types"), Value::from(entity.types));
        map
    }
}

/// An overlap or gap record. Provenance and other upstream fields are kept
/// verbatim, key spelling included, so they reach the reply generator untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct EntityRecord {
    pub entity: Entity,
    pub extra: Map<String, Value>,
    style: KeyStyle,
}

impl EntityRecord {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            extra: Map::new(),
            style: KeyStyle::Plain,
        }
    }

    pub fn most_specific_type(&self) -> Option<&str> {
        self.entity.most_specific_type()
    }
}

impl TryFrom<Map<String, Value>> for EntityRecord {
    type Error = String;

    fn try_from(mut map: Map<String, Value>) -> std::result::Result<Self, String> {
        let (style, entity) = take_field(&mut map, "entity")?;
        Ok(Self {
            entity,
            extra: map,
            style,
        })
    }
}

impl From<EntityRecord> for Map<String, Value> {
    fn from(record: EntityRecord) -> Self {
        let mut map = record.extra;
        map.insert(
            record.style.key("entity"),
            Value::Object(record.entity.into()),
        );
        map
    }
}

// ============================================================================
// Key spelling
// ============================================================================

/// How the producer spelled the typed keys of a record: `types` or `_types`.
/// Records serialize back under the spelling they were read with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum KeyStyle {
    #[default]
    Plain,
    Underscored,
}

impl KeyStyle {
    fn key(self, name: &str) -> String {
        match self {
            KeyStyle::Plain => name.to_string(),
            KeyStyle::Underscored => format!("_{}", name),
        }
    }
}

/// Remove a required field under either spelling and decode it.
fn take_field<T: DeserializeOwned>(
    map: &mut Map<String, Value>,
    name: &'static str,
) -> std::result::Result<(KeyStyle, T), String> {
    let (style, value) = match map.remove(name) {
        Some(value) => (KeyStyle::Plain, value),
        None => match map.remove(&KeyStyle::Underscored.key(name)) {
            Some(value) => (KeyStyle::Underscored, value),
            None => return Err(format!("missing field `{}`", name)),
        },
    };
    let decoded =
        serde_json::from_value(value).map_err(|e| format!("invalid field `{}`: {}", name, e))?;
    Ok((style, decoded))
}

// ============================================================================
// Capsule
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capsule {
    /// Opaque, passed through to the `_trust` thought unchanged.
    #[serde(alias = "_trust")]
    pub trust: Value,
    /// True when the statement matches a previous claim.
    #[serde(alias = "_statement_novelty")]
    pub statement_novelty: bool,
    #[serde(alias = "_overlaps")]
    pub overlaps: RoleLists,
    #[serde(alias = "_entity_novelty")]
    pub entity_novelty: EntityNovelty,
    #[serde(alias = "_subject_gaps")]
    pub subject_gaps: RoleLists,
    #[serde(alias = "_complement_gaps")]
    pub complement_gaps: RoleLists,
    #[serde(alias = "_complement_conflict")]
    pub complement_conflict: Vec<Value>,
    #[serde(alias = "_negation_conflicts")]
    pub negation_conflicts: Vec<NegationConflict>,
}

/// Records grouped by the role they were found in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleLists {
    #[serde(alias = "_subject")]
    pub subject: Vec<EntityRecord>,
    #[serde(alias = "_complement")]
    pub complement: Vec<EntityRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityNovelty {
    #[serde(alias = "_subject")]
    pub subject: bool,
    #[serde(alias = "_complement")]
    pub complement: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Polarity {
    Positive,
    Negative,
    /// Any other upstream polarity. Never part of a negation conflict.
    #[serde(other)]
    Other,
}

impl Polarity {
    fn parse(label: &str) -> Self {
        match label {
            "POSITIVE" => Polarity::Positive,
            "NEGATIVE" => Polarity::Negative,
            _ => Polarity::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Polarity::Positive => "POSITIVE",
            Polarity::Negative => "NEGATIVE",
            Polarity::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct NegationConflict {
    pub polarity_value: Polarity,
    pub extra: Map<String, Value>,
    style: KeyStyle,
    /// Upstream label behind `Polarity::Other`.
    other_label: Option<String>,
}

impl NegationConflict {
    pub fn new(polarity_value: Polarity) -> Self {
        Self {
            polarity_value,
            extra: Map::new(),
            style: KeyStyle::Plain,
            other_label: None,
        }
    }
}

impl TryFrom<Map<String, Value>> for NegationConflict {
    type Error = String;

    fn try_from(mut map: Map<String, Value>) -> std::result::Result<Self, String> {
        let (style, label): (_, String) = take_field(&mut map, "polarity_value")?;
        let polarity_value = Polarity::parse(&label);
        Ok(Self {
            polarity_value,
            extra: map,
            style,
            other_label: (polarity_value == Polarity::Other).then_some(label),
        })
    }
}

impl From<NegationConflict> for Map<String, Value> {
    fn from(conflict: NegationConflict) -> Self {
        let label = match (conflict.polarity_value, conflict.other_label) {
            (Polarity::Other, Some(label)) => label,
            (polarity, _) => polarity.as_str().to_string(),
        };
        let mut map = conflict.extra;
        map.insert(conflict.style.key("polarity_value"), Value::String(label));
        map
    }
}

// ============================================================================
// Tests
// ============================================================================
