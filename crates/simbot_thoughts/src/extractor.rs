//! Thought extraction: capsule signals → named thoughts for the reply generator.
//!
//! Every rule runs on every call and writes into one name-keyed map. A name
//! emitted twice keeps the later emission (same-typed overlaps, colliding
//! entity-novelty types). The finished map is shuffled so that nothing
//! downstream can lean on emission order.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use simbot_core::{
    BrainResponse, Capsule, EntityRecord, ExtractorConfig, Polarity, Result, RoleLists, RolePair,
    Thought, ThoughtError, ThoughtKind, ThoughtPayload, ThoughtsMap,
};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Extract thoughts using the thread-local random source.
pub fn extract(response: &BrainResponse) -> Result<ThoughtsMap> {
    extract_with_rng(response, &mut rand::thread_rng())
}

/// Extract thoughts, drawing the negation-conflict pick and the final shuffle
/// from `rng`.
pub fn extract_with_rng<R: Rng + ?Sized>(
    response: &BrainResponse,
    rng: &mut R,
) -> Result<ThoughtsMap> {
    let triple = &response.statement.triple;
    let capsule = &response.thoughts;

    let subject_type = triple
        .subject
        .first_type()
        .ok_or(ThoughtError::EmptyTypes {
            at: "statement.triple.subject.types",
        })?;
    let complement_type = triple
        .complement
        .first_type()
        .ok_or(ThoughtError::EmptyTypes {
            at: "statement.triple.complement.types",
        })?;

    let mut thoughts = Collector::default();
    trust(capsule, &mut thoughts);
    statement_novelty(capsule, &mut thoughts);
    single_overlaps(&capsule.overlaps, &mut thoughts)?;
    paired_overlaps(&capsule.overlaps, &mut thoughts)?;
    entity_novelty(capsule, subject_type, complement_type, &mut thoughts);
    gaps(
        GapRule {
            prefix: "subject_gap",
            kind: ThoughtKind::SubjectGaps,
            at_subject: "thoughts.subject_gaps.subject",
            at_complement: "thoughts.subject_gaps.complement",
        },
        subject_type,
        &capsule.subject_gaps,
        &mut thoughts,
    )?;
    gaps(
        GapRule {
            prefix: "object_gap",
            kind: ThoughtKind::ComplementGaps,
            at_subject: "thoughts.complement_gaps.subject",
            at_complement: "thoughts.complement_gaps.complement",
        },
        complement_type,
        &capsule.complement_gaps,
        &mut thoughts,
    )?;
    complement_conflict(capsule, &mut thoughts);
    negation_conflict(capsule, rng, &mut thoughts);

    tracing::debug!(
        thoughts = thoughts.map.len(),
        overwritten = thoughts.overwritten,
        "Extracted thoughts from brain response"
    );

    Ok(ThoughtsMap::shuffled(thoughts.map, rng))
}

/// Extractor with its random source fixed by configuration.
#[derive(Debug, Clone, Default)]
pub struct ThoughtExtractor {
    config: ExtractorConfig,
}

impl ThoughtExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// With a configured seed every call starts from the same generator state,
    /// so equal inputs give equal maps in equal order.
    pub fn extract(&self, response: &BrainResponse) -> Result<ThoughtsMap> {
        match self.config.seed {
            Some(seed) => extract_with_rng(response, &mut StdRng::seed_from_u64(seed)),
            None => extract(response),
        }
    }
}

// ============================================================================
// Collection
// ============================================================================

/// Name-keyed accumulator. Insert is overwrite-by-name.
#[derive(Default)]
struct Collector {
    map: HashMap<String, Thought>,
    overwritten: usize,
}

impl Collector {
    fn insert(&mut self, name: String, kind: ThoughtKind, payload: ThoughtPayload) {
        let thought = Thought::new(kind, payload);
        match self.map.entry(name) {
            Entry::Occupied(mut slot) => {
                tracing::trace!(
                    name = %slot.key(),
                    previous = %slot.get().kind,
                    "Thought name emitted twice, keeping the later one"
                );
                slot.insert(thought);
                self.overwritten += 1;
            }
            Entry::Vacant(slot) => {
                slot.insert(thought);
            }
        }
    }
}

fn most_specific<'a>(record: &'a EntityRecord, at: &'static str) -> Result<&'a str> {
    record
        .most_specific_type()
        .ok_or(ThoughtError::EmptyTypes { at })
}

// ============================================================================
// Rules
// ============================================================================

fn trust(capsule: &Capsule, thoughts: &mut Collector) {
    thoughts.insert(
        "_trust".to_string(),
        ThoughtKind::Trust,
        ThoughtPayload::Trust(capsule.trust.clone()),
    );
}

fn statement_novelty(capsule: &Capsule, thoughts: &mut Collector) {
    // The flag is set when the statement repeats a previous claim.
    let name = if capsule.statement_novelty {
        "no_statement_novelty"
    } else {
        "statement_novelty"
    };
    thoughts.insert(
        name.to_string(),
        ThoughtKind::StatementNovelty,
        ThoughtPayload::StatementNovelty(capsule.statement_novelty),
    );
}

/// `overlap <type>` for each overlap on its own.
fn single_overlaps(overlaps: &RoleLists, thoughts: &mut Collector) -> Result<()> {
    for overlap in &overlaps.subject {
        let name = format!(
            "overlap {}",
            most_specific(overlap, "thoughts.overlaps.subject")?
        );
        thoughts.insert(
            name,
            ThoughtKind::Overlaps,
            ThoughtPayload::Entities(RolePair::subject_only(vec![overlap.clone()])),
        );
    }
    for overlap in &overlaps.complement {
        let name = format!(
            "overlap {}",
            most_specific(overlap, "thoughts.overlaps.complement")?
        );
        thoughts.insert(
            name,
            ThoughtKind::Overlaps,
            ThoughtPayload::Entities(RolePair::complement_only(vec![overlap.clone()])),
        );
    }
    Ok(())
}

/// `overlap <a> <b>` for every unordered pair within one role, types sorted.
fn paired_overlaps(overlaps: &RoleLists, thoughts: &mut Collector) -> Result<()> {
    for (first, second) in pairs(&overlaps.subject) {
        let name = pair_name(first, second, "thoughts.overlaps.subject")?;
        thoughts.insert(
            name,
            ThoughtKind::Overlaps,
            ThoughtPayload::Entities(RolePair::subject_only(vec![
                first.clone(),
                second.clone(),
            ])),
        );
    }
    for (first, second) in pairs(&overlaps.complement) {
        let name = pair_name(first, second, "thoughts.overlaps.complement")?;
        thoughts.insert(
            name,
            ThoughtKind::Overlaps,
            ThoughtPayload::Entities(RolePair::complement_only(vec![
                first.clone(),
                second.clone(),
            ])),
        );
    }
    Ok(())
}

/// Index-ordered 2-combinations.
fn pairs<T>(items: &[T]) -> impl Iterator<Item = (&T, &T)> {
    items
        .iter()
        .enumerate()
        .flat_map(move |(i, first)| items[i + 1..].iter().map(move |second| (first, second)))
}

fn pair_name(first: &EntityRecord, second: &EntityRecord, at: &'static str) -> Result<String> {
    let mut types = [most_specific(first, at)?, most_specific(second, at)?];
    types.sort_unstable();
    Ok(format!("overlap {} {}", types[0], types[1]))
}

fn entity_novelty(
    capsule: &Capsule,
    subject_type: &str,
    complement_type: &str,
    thoughts: &mut Collector,
) {
    let novelty = capsule.entity_novelty;
    if novelty.subject {
        thoughts.insert(
            format!("entity_novelty {}", subject_type),
            ThoughtKind::EntityNovelty,
            ThoughtPayload::EntityNovelty(RolePair {
                subject: true,
                complement: false,
            }),
        );
    }
    if novelty.complement {
        thoughts.insert(
            format!("entity_novelty {}", complement_type),
            ThoughtKind::EntityNovelty,
            ThoughtPayload::EntityNovelty(RolePair {
                subject: false,
                complement: true,
            }),
        );
    }
}

struct GapRule {
    prefix: &'static str,
    kind: ThoughtKind,
    at_subject: &'static str,
    at_complement: &'static str,
}

/// `<prefix> <utterance type> <gap type>` for each gap in either role list.
fn gaps(
    rule: GapRule,
    utterance_type: &str,
    gaps: &RoleLists,
    thoughts: &mut Collector,
) -> Result<()> {
    for gap in &gaps.subject {
        let name = format!(
            "{} {} {}",
            rule.prefix,
            utterance_type,
            most_specific(gap, rule.at_subject)?
        );
        thoughts.insert(
            name,
            rule.kind,
            ThoughtPayload::Entities(RolePair::subject_only(vec![gap.clone()])),
        );
    }
    for gap in &gaps.complement {
        let name = format!(
            "{} {} {}",
            rule.prefix,
            utterance_type,
            most_specific(gap, rule.at_complement)?
        );
        thoughts.insert(
            name,
            rule.kind,
            ThoughtPayload::Entities(RolePair::complement_only(vec![gap.clone()])),
        );
    }
    Ok(())
}

/// Cardinality conflict. Only the first conflicting item is carried.
fn complement_conflict(capsule: &Capsule, thoughts: &mut Collector) {
    if let Some(first) = capsule.complement_conflict.first() {
        thoughts.insert(
            "complement_conflict".to_string(),
            ThoughtKind::ComplementConflict,
            ThoughtPayload::ComplementConflict(vec![first.clone()]),
        );
    }
}

/// One random positive claim against one random negative claim, when both exist.
fn negation_conflict<R: Rng + ?Sized>(capsule: &Capsule, rng: &mut R, thoughts: &mut Collector) {
    let (positives, negatives): (Vec<_>, Vec<_>) = capsule
        .negation_conflicts
        .iter()
        .filter(|c| c.polarity_value != Polarity::Other)
        .partition(|c| c.polarity_value == Polarity::Positive);

    if positives.is_empty() || negatives.is_empty() {
        return;
    }
    if let (Some(positive), Some(negative)) = (positives.choose(rng), negatives.choose(rng)) {
        thoughts.insert(
            "negation_conflict".to_string(),
            ThoughtKind::NegationConflicts,
            ThoughtPayload::NegationConflict((*positive).clone(), (*negative).clone()),
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
