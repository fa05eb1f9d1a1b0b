use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidConfiguration,
    InvalidState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

impl WorkflowErrorBody {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("a workflow needs at least one step")]
    NoSteps,
    #[error("cannot complete from step {current} of {total}")]
    NotAtFinalStep { current: usize, total: usize },
    #[error("workflow was already completed")]
    AlreadyCompleted,
    #[error("step {step} is not complete")]
    IncompleteStep { step: usize },
    #[error("action belongs to step {step} but the workflow is on step {current}")]
    WrongStep { step: usize, current: usize },
    #[error("evidence item id '{0}' appears more than once")]
    DuplicateItem(String),
    #[error("evidence item '{item}' has confidence {confidence}, above 100")]
    ConfidenceOutOfRange { item: String, confidence: u8 },
}

impl WorkflowError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NoSteps | Self::DuplicateItem(_) | Self::ConfidenceOutOfRange { .. } => {
                ErrorCode::InvalidConfiguration
            }
            Self::NotAtFinalStep { .. }
            | Self::AlreadyCompleted
            | Self::IncompleteStep { .. }
            | Self::WrongStep { .. } => ErrorCode::InvalidState,
        }
    }
}

impl From<&WorkflowError> for WorkflowErrorBody {
    fn from(value: &WorkflowError) -> Self {
        Self {
            code: value.code(),
            message: value.to_string(),
        }
    }
}
