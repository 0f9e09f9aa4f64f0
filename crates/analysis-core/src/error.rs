use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider timed out after {0:?}")]
    Timeout(Duration),

    /// A collaborator the evaluation depends on was never configured.
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),
}

impl AnalysisError {
    /// Errors that describe the upstream fetch rather than the caller's setup.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            AnalysisError::Provider(_) | AnalysisError::Timeout(_) | AnalysisError::InvalidData(_)
        )
    }
}
