//! Build orchestration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum OpsError {
    #[error("component not found: {component}")]
    MissingComponent { component: String },

    #[error("{unit} task failed: {message}")]
    TaskFailed { unit: String, message: String },

    #[error("template failed: {message}")]
    TemplateFailed { message: String },
}

impl UserFacingError for OpsError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::MissingComponent { .. } => "ops.missing_component",
            Self::TaskFailed { .. } => "ops.task_failed",
            Self::TemplateFailed { .. } => "ops.template_failed",
        };
        Some(code)
    }
}
