use thiserror::Error;

/// Failures raised while converting between nested and flat state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    #[error("Conflicting path: `{0}` is both a value and a branch")]
    ConflictingPath(String),
    #[error("Empty segment in path `{0}`")]
    EmptySegment(String),
    #[error("Invalid key `{0}`: keys must be non-empty and contain no `.`")]
    InvalidKey(String),
}

/// Failures raised while building or driving a state binder.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BinderError {
    #[error("Missing binding path on discovered node #{index}")]
    MissingBindingPath { index: usize },
    #[error("Duplicate binding path `{0}`")]
    DuplicateBindingPath(String),
    #[error(transparent)]
    Path(#[from] PathError),
}

pub type PathResult<T> = Result<T, PathError>;

pub type BinderResult<T> = Result<T, BinderError>;
