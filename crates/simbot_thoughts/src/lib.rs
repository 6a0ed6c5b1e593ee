mod extractor;

pub use extractor::{extract, extract_with_rng, ThoughtExtractor};
pub use simbot_core::{Thought, ThoughtKind, ThoughtPayload, ThoughtsMap};
