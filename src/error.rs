use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Coordinate could not be matched to the street network")]
    ResolutionFailure,
    #[error("No transit stop reachable from the origin within the access budget")]
    NoSourceStop,
    #[error("No transit stop reachable from the destination within the access budget")]
    NoTargetStop,
    #[error("No transit journey found within the departure window")]
    NoJourneyFound,
    #[error("Request cancelled")]
    Cancelled,
    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(&'static str),
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}
