use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("fetching posts failed: {0}")]
    FetchFailed(String),
    #[error("resolving groups failed: {0}")]
    ResolutionFailed(String),
    #[error("malformed event record {id}: {reason}")]
    MalformedEventRecord { id: i64, reason: String },
}
