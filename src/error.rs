use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The input schema is unusable (missing required columns). Cell-level
    /// garbage is never fatal; it degrades to an absent value instead.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Unknown scope: {0}. Use: planning, execution, sprint_review, delivery, risk, team")]
    InvalidScope(String),

    #[error("Sprint review requires a sprint label (pass --sprint)")]
    MissingSprintLabel,

    #[error("No work items remain after applying the '{scope}' scope filter")]
    EmptyResult { scope: String },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Csv(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
