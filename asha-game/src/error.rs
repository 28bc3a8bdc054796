use thiserror::Error;

/// Errors raised while resolving or driving a mission session.
///
/// Both lookup failures are recoverable: the presentation layer renders a
/// fallback view and the host keeps running.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MissionError {
    #[error("mission {id} not found")]
    NotFound { id: u32 },
    #[error("unknown simulation type '{tag}'")]
    UnknownSimulationType { tag: String },
    #[error("no mission is open")]
    NoActiveMission,
}

/// Errors raised while loading a mission catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("mission catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("mission id {id} appears more than once")]
    DuplicateMission { id: u32 },
    #[error("realm id {id} appears more than once")]
    DuplicateRealm { id: u32 },
}
