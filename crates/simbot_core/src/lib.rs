pub mod capsule;
pub mod config;
pub mod error;
pub mod thought;

pub use capsule::{
    BrainResponse, Capsule, Entity, EntityNovelty, EntityRecord, NegationConflict, Polarity,
    RoleLists, Statement, Triple,
};
pub use config::{ExtractorConfig, LoggingConfig, SimbotConfig};
pub use error::{Result, ThoughtError};
pub use thought::{RolePair, Thought, ThoughtKind, ThoughtPayload, ThoughtsMap};
