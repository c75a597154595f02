use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::auth::Credential;
use super::error::ArmError;

/// Default Azure Resource Manager endpoint (public cloud).
pub const MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

/// Azure Resource Manager API client, scoped to one subscription.
pub struct ArmClient {
    http: Client,
    token: String,
    subscription_id: String,
    endpoint: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl ArmClient {
    /// Create a client for the given credential and subscription.
    /// `endpoint` is the management endpoint base; pass
    /// [`MANAGEMENT_ENDPOINT`] outside of tests and sovereign clouds.
    pub fn new(
        credential: &Credential,
        subscription_id: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self, ArmError> {
        let http = Client::builder()
            .user_agent(concat!("armrg/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ArmError::Client(e.to_string()))?;

        Ok(Self {
            http,
            token: credential.token().to_string(),
            subscription_id: subscription_id.into(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// GET an endpoint-relative path and deserialize the response.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ArmError> {
        tracing::debug!(path, "GET");
        let resp = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| ArmError::Transport {
                path: path.to_string(),
                source: e,
            })?;
        read_json("GET", path, resp).await
    }

    /// GET an absolute URL returned by ARM itself (nextLink pagination).
    pub(crate) async fn get_next<T: DeserializeOwned>(&self, link: &str) -> Result<T, ArmError> {
        tracing::debug!(link, "GET nextLink");
        let resp = self
            .http
            .get(link)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| ArmError::Transport {
                path: link.to_string(),
                source: e,
            })?;
        read_json("GET", link, resp).await
    }

    /// PUT a JSON body and deserialize the response.
    pub(crate) async fn put_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ArmError> {
        tracing::debug!(path, "PUT");
        let resp = self
            .http
            .put(self.url(path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| ArmError::Transport {
                path: path.to_string(),
                source: e,
            })?;
        read_json("PUT", path, resp).await
    }

    /// HEAD request, returning the raw status for existence checks.
    pub(crate) async fn head(&self, path: &str) -> Result<StatusCode, ArmError> {
        tracing::debug!(path, "HEAD");
        let resp = self
            .http
            .head(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| ArmError::Transport {
                path: path.to_string(),
                source: e,
            })?;
        Ok(resp.status())
    }
}

async fn read_json<T: DeserializeOwned>(
    method: &'static str,
    path: &str,
    resp: Response,
) -> Result<T, ArmError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let (code, message) = parse_error_envelope(&body);
        return Err(ArmError::Api {
            method,
            path: path.to_string(),
            status: status.as_u16(),
            code,
            message,
        });
    }

    resp.json::<T>().await.map_err(|e| ArmError::Payload {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Extract (code, message) from ARM's `{"error": {"code", "message"}}`
/// envelope, falling back to the raw body for non-conforming responses.
fn parse_error_envelope(body: &str) -> (String, String) {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if let Some(err) = envelope.error {
            return (
                err.code.unwrap_or_else(|| "UnknownError".to_string()),
                err.message.unwrap_or_else(|| "no message".to_string()),
            );
        }
    }

    let trimmed = body.trim();
    let message = if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.chars().take(200).collect()
    };
    ("UnknownError".to_string(), message)
}
