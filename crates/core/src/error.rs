use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("expected a TaskRun, got kind {0:?}")]
    UnexpectedKind(String),
    #[error("malformed TaskRun: {0}")]
    Malformed(String),
    #[error("decoding TaskRun JSON")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
