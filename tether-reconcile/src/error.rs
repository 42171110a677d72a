use http::StatusCode;
use tether_client::ClientError;
use tether_core::TetherError;
use thiserror::Error;

/// Failure of one reconcile operation.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("error while {action} plugin: {source}")]
    Transport {
        action: &'static str,
        #[source]
        source: ClientError,
    },

    #[error("error while {action} plugin: gateway returned an empty body")]
    EmptyResponse { action: &'static str },

    #[error("409 Conflict - use `tether import` to manage this plugin")]
    Conflict,

    #[error("unexpected status code received: {0}")]
    UnexpectedStatus(StatusCode),

    #[error(transparent)]
    Invalid(#[from] TetherError),
}

impl ReconcileError {
    pub(crate) fn transport(action: &'static str) -> impl FnOnce(ClientError) -> Self {
        move |source| ReconcileError::Transport { action, source }
    }

    /// Status code for status-driven failures.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ReconcileError::Conflict => Some(StatusCode::CONFLICT),
            ReconcileError::UnexpectedStatus(status) => Some(*status),
            _ => None,
        }
    }
}
