use thiserror::Error;

pub type CompletionResult<T> = Result<T, CompletionError>;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Pattern too long: {length} characters (limit: {limit})")]
    PatternTooLong { length: usize, limit: usize },
}

impl CompletionError {
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        CompletionError::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }
}
