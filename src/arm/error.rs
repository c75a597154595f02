use thiserror::Error;

/// Failure to obtain a credential from the ambient environment.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A single strategy in the chain failed or was not configured.
    #[error("{strategy}: {message}")]
    Strategy {
        strategy: &'static str,
        message: String,
    },

    /// Every strategy in the chain failed.
    #[error("no usable Azure credential found; tried:\n{0}")]
    ChainExhausted(String),
}

impl AuthError {
    pub(crate) fn strategy(strategy: &'static str, message: impl Into<String>) -> Self {
        AuthError::Strategy {
            strategy,
            message: message.into(),
        }
    }
}

/// Failure of an Azure Resource Manager operation.
#[derive(Debug, Error)]
pub enum ArmError {
    /// The HTTP client could not be constructed.
    #[error("failed to construct ARM client: {0}")]
    Client(String),

    /// ARM answered with an error envelope.
    #[error("{method} {path}: HTTP {status} {code}: {message}")]
    Api {
        method: &'static str,
        path: String,
        status: u16,
        code: String,
        message: String,
    },

    /// The request never produced an ARM response.
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// ARM answered 2xx but the body did not deserialize.
    #[error("unexpected response from {path}: {message}")]
    Payload { path: String, message: String },

    #[error("resource group '{0}' not found")]
    NotFound(String),
}

impl ArmError {
    /// HTTP status of the ARM error response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ArmError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
