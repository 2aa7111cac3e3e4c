use thiserror::Error;

/// Errors surfaced to the event loop / UI. All of these are recoverable;
/// the session keeps running and reports them on screen or in the log.
#[derive(Debug, Error)]
pub enum GameError {
    /// A round start was attempted while every spawn quadrant is disabled.
    #[error("no spawn quadrant is enabled")]
    NoQuadrantEnabled,
}

/// Errors from the results store. Individual save/load failures never abort
/// the session; the in-memory round data is unaffected by a failed save.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("results i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("results csv error: {0}")]
    Csv(#[from] csv::Error),
}
