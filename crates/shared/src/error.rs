use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures of a draw command. All variants are recoverable at the
/// presentation boundary; a failed draw leaves the selection set and the
/// last-drawn marker untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawError {
    #[error("no students selected")]
    EmptySelection,
    #[error("selection holds {have} students but {need} were requested")]
    InsufficientPool { have: usize, need: usize },
    #[error("student catalog is empty")]
    EmptyCatalog,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("student catalog unavailable: {0}")]
    Unavailable(String),
}
