//! MockThis HTTP API client.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::descriptor::{EndpointDescriptor, EndpointPatch};
use crate::error::ApiError;

/// Production API base URL.
pub const DEFAULT_API_URL: &str = "https://dev.api.mockthis.io/api/v1";

/// Timeout for a single HTTP round trip.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Response to `POST /login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginTicket {
    #[serde(default)]
    pub message: String,
    pub login_hash: String,
}

/// Response to `GET /login/hash`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginStatus {
    #[serde(default)]
    pub login_hash_verified: bool,
    #[serde(default)]
    pub token: Option<String>,
}

/// Body of `POST /register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub github_handle: String,
    pub country: String,
}

/// Response to `POST /endpoints`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEndpoint {
    pub mock_url: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub endpoint: Option<Value>,
}

#[derive(Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: String,
}

/// Client for the MockThis API.
///
/// Each call issues one request; the connection goes back to the pool when
/// the call's future completes or is dropped.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for `base_url` with no credentials.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidBaseUrl` if `base_url` is not an absolute
    /// URL with a path, and `ApiError::Transport` if the HTTP client cannot
    /// be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let base = Url::parse(&base_url).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.clone(),
            message: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url,
                message: "URL cannot carry a path".into(),
            });
        }
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("mockthis/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ApiError::Transport {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self {
            http,
            base,
            base_url,
            token: None,
        })
    }

    /// Attach a session token sent as `Authorization: Bearer`.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `{base}/endpoints/{id}` with `id` percent-encoded as one path segment.
    fn endpoint_url(&self, id: &str) -> Result<String, ApiError> {
        if matches!(id, "" | "." | "..") {
            return Err(ApiError::InvalidEndpointId { id: id.to_string() });
        }
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl {
                url: self.base_url.clone(),
                message: "URL cannot carry a path".into(),
            })?
            .pop_if_empty()
            .push("endpoints")
            .push(id);
        Ok(url.into())
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, url: &str) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        debug!(url, status = response.status().as_u16(), "api response");
        Ok(response)
    }

    async fn body(&self, response: Response, url: &str) -> Result<Vec<u8>, ApiError> {
        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })
    }

    fn parse<T: DeserializeOwned>(bytes: &[u8], url: &str) -> Result<T, ApiError> {
        serde_json::from_slice(bytes).map_err(|e| ApiError::InvalidResponse {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response, url: &str) -> Result<T, ApiError> {
        let bytes = self.body(response, url).await?;
        Self::parse(&bytes, url)
    }

    fn expect_status(response: &Response, expected: StatusCode, action: &'static str) -> Result<(), ApiError> {
        if response.status() == expected {
            Ok(())
        } else {
            Err(ApiError::UnexpectedStatus {
                action,
                status: response.status().as_u16(),
            })
        }
    }

    /// `POST /register`; expects 201 and returns the server message.
    pub async fn register(&self, registration: &Registration) -> Result<String, ApiError> {
        let url = self.url("/register");
        let response = self
            .send(self.request(Method::POST, &url).json(registration), &url)
            .await?;
        Self::expect_status(&response, StatusCode::CREATED, "register")?;
        let body: MessageBody = self.decode(response, &url).await?;
        Ok(body.message)
    }

    /// `POST /login`; returns the one-time login hash.
    ///
    /// # Errors
    ///
    /// Any status other than 200 is `ApiError::LoginRejected`.
    pub async fn initiate_login(&self, email: &str) -> Result<LoginTicket, ApiError> {
        let url = self.url("/login");
        let response = self
            .send(
                self.request(Method::POST, &url)
                    .json(&serde_json::json!({ "email": email })),
                &url,
            )
            .await?;
        if response.status() != StatusCode::OK {
            return Err(ApiError::LoginRejected {
                status: response.status().as_u16(),
            });
        }
        self.decode(response, &url).await
    }

    /// `GET /login/hash?email=&hash=`.
    pub async fn login_status(&self, email: &str, hash: &str) -> Result<LoginStatus, ApiError> {
        let url = self.url("/login/hash");
        let response = self
            .send(
                self.request(Method::GET, &url)
                    .query(&[("email", email), ("hash", hash)]),
                &url,
            )
            .await?;
        self.decode(response, &url).await
    }

    /// `POST /endpoints`.
    pub async fn create_endpoint(&self, descriptor: &EndpointDescriptor) -> Result<CreatedEndpoint, ApiError> {
        let url = self.url("/endpoints");
        let response = self
            .send(self.request(Method::POST, &url).json(descriptor), &url)
            .await?;
        Self::expect_status(&response, StatusCode::OK, "create endpoint")?;
        self.decode(response, &url).await
    }

    /// `GET /endpoints`.
    pub async fn list_endpoints(&self) -> Result<Vec<Value>, ApiError> {
        let url = self.url("/endpoints");
        let response = self.send(self.request(Method::GET, &url), &url).await?;
        Self::expect_status(&response, StatusCode::OK, "list endpoints")?;
        self.decode(response, &url).await
    }

    /// Find an endpoint by `id` or `mockIdentifier`.
    pub async fn find_endpoint(&self, id: &str) -> Result<Value, ApiError> {
        self.list_endpoints()
            .await?
            .into_iter()
            .find(|record| {
                ["id", "mockIdentifier"]
                    .iter()
                    .any(|key| record.get(*key).and_then(Value::as_str) == Some(id))
            })
            .ok_or_else(|| ApiError::EndpointNotFound { id: id.to_string() })
    }

    /// `PATCH /endpoints/{id}`; returns the updated record, or `Null` if the
    /// server sent no body.
    pub async fn update_endpoint(&self, id: &str, patch: &EndpointPatch) -> Result<Value, ApiError> {
        let url = self.endpoint_url(id)?;
        let response = self
            .send(self.request(Method::PATCH, &url).json(patch), &url)
            .await?;
        Self::expect_status(&response, StatusCode::OK, "update endpoint")?;
        let bytes = self.body(response, &url).await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Self::parse(&bytes, &url)
    }

    /// `DELETE /endpoints/{id}`; expects 204.
    pub async fn delete_endpoint(&self, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint_url(id)?;
        let response = self.send(self.request(Method::DELETE, &url), &url).await?;
        Self::expect_status(&response, StatusCode::NO_CONTENT, "delete endpoint")
    }
}
