use thiserror::Error;

pub type Result<T> = std::result::Result<T, ThoughtError>;

/// Malformed input is the only failure class. Nothing is defaulted and no
/// partial thoughts map is ever returned.
#[derive(Error, Debug)]
pub enum ThoughtError {
    #[error("Malformed brain response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Empty type sequence at {at}")]
    EmptyTypes { at: &'static str },
}
