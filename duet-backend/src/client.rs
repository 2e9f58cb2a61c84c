#[derive(Debug)]
/// An error that can occur when interacting with the client.
pub enum ClientError {
    /// An error that occurred when making a request.
    ReqwestError(reqwest::Error),
    /// An error that occurred when serializing a request or deserializing a response.
    DeserializationError(serde_json::Error),
    /// The backend rejected the request.
    BackendError {
        /// The HTTP status code.
        status: u16,
        /// The backend-specific error code, if any.
        code: Option<String>,
        /// The error message, if any.
        message: Option<String>,
    },
}
impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::ReqwestError(e) => write!(f, "Reqwest error: {e}"),
            ClientError::DeserializationError(e) => write!(f, "Deserialization error: {e}"),
            ClientError::BackendError {
                status,
                code,
                message,
            } => {
                write!(f, "Backend error: {status}")?;
                if let Some(code) = code {
                    write!(f, " ({code})")?;
                }
                if let Some(message) = message {
                    write!(f, ": {message}")?;
                }
                Ok(())
            }
        }
    }
}
impl std::error::Error for ClientError {}
impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::ReqwestError(e)
    }
}
impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::DeserializationError(e)
    }
}
/// A result type for the client.
pub type ClientResult<T> = Result<T, ClientError>;

/// A client for the managed backend.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone)]
pub struct Client {
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) access_token: Option<String>,
    pub(crate) client: reqwest::Client,
}
impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.access_token.is_some())
            .finish_non_exhaustive()
    }
}
impl Client {
    /// Create a new anonymous client. `api_key` is the project's public key; it is
    /// sent with every request and used as the bearer token until a user signs in.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            access_token: None,
            client: reqwest::Client::new(),
        }
    }

    /// Returns a copy of this client that authenticates as the user owning `access_token`.
    pub fn with_access_token(&self, access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            ..self.clone()
        }
    }

    /// Returns a copy of this client with any user access token removed.
    pub fn anonymous(&self) -> Self {
        Self {
            access_token: None,
            ..self.clone()
        }
    }

    /// Whether requests from this client carry a user access token.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// The base URL of the backend, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
