use gatepass_util::GatepassError;
use thiserror::Error;

/// Errors talking to the visitor API
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("No visitor API configured; set [api] base_url or --api-url")]
    NotConfigured,

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Visitor API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response body: {message}")]
    Deserialization { message: String, body: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

impl From<ClientError> for GatepassError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Api { status, message } => GatepassError::api(status, message),
            ClientError::Deserialization { message, .. } => GatepassError::decode(message),
            ClientError::Http(e) if e.is_decode() => GatepassError::decode(e.to_string()),
            ClientError::Http(e) => GatepassError::transport(e.to_string()),
            other => GatepassError::internal(other.to_string()),
        }
    }
}
