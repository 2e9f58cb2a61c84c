use serde::{Deserialize, de::DeserializeOwned};

use crate::{Client, ClientError, ClientResult};

/// Making requests to the backend.
impl Client {
    pub(crate) fn rest_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{collection}", self.base_url)
    }

    pub(crate) fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{endpoint}", self.base_url)
    }

    /// Attaches the project key and the bearer token to a request.
    pub(crate) fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        request.header("apikey", &self.api_key).bearer_auth(bearer)
    }

    /// Sends a request and decodes its JSON body as `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend answers with a
    /// non-success status, or the body is not valid for `T`.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> ClientResult<T> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        Self::parse_response(status, &bytes)
    }

    pub(crate) fn parse_response<T: DeserializeOwned>(status: u16, bytes: &[u8]) -> ClientResult<T> {
        if !(200..300).contains(&status) {
            let mut error = serde_json::from_slice::<ResponseError>(bytes).unwrap_or_else(|_| {
                let text = String::from_utf8_lossy(bytes).trim().to_string();
                ResponseError {
                    code: None,
                    message: (!text.is_empty()).then_some(text),
                    details: None,
                    hint: None,
                }
            });
            tracing::debug!(status, ?error, "backend returned an error");
            return Err(ClientError::BackendError {
                status,
                code: error.code.take().map(|code| match code {
                    serde_json::Value::String(code) => code,
                    other => other.to_string(),
                }),
                message: error.into_message(),
            });
        }

        // Mutations with `return=minimal` and sign-out answer with an empty body.
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_slice(b"null")?);
        }

        Ok(serde_json::from_slice(bytes)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
/// The error body returned by the query and auth APIs.
struct ResponseError {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default, alias = "msg", alias = "error_description")]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}
impl ResponseError {
    fn into_message(self) -> Option<String> {
        let mut message = self.message?;
        if let Some(details) = self.details.filter(|d| !d.is_empty()) {
            message.push_str(&format!(" ({details})"));
        }
        if let Some(hint) = self.hint.filter(|h| !h.is_empty()) {
            message.push_str(&format!(" [hint: {hint}]"));
        }
        Some(message)
    }
}
