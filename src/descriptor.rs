//! Wire types sent to the MockThis API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_METHOD: &str = "GET";
pub const DEFAULT_HTTP_STATUS: u16 = 200;
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Normalized description of one mock endpoint.
///
/// Optional fields are omitted from the JSON payload when absent, never sent
/// as `null` or an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDescriptor {
    pub method: String,
    pub http_status: u16,
    pub response_content_type: String,
    pub charset: String,
    pub response_body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body_schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body_schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_credentials: Option<AuthCredential>,
}

/// Partial update for an existing endpoint. Only fields the user set are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body_schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body_schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_credentials: Option<AuthCredential>,
}

impl EndpointPatch {
    pub fn is_empty(&self) -> bool {
        *self == EndpointPatch::default()
    }
}

/// Credentials a caller must present to the mock endpoint.
///
/// Each scheme carries only its own fields. Properties the user did not
/// supply are sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum AuthCredential {
    Basic {
        username: Option<String>,
        password: Option<String>,
    },
    ApiKey {
        name: Option<String>,
        value: Option<String>,
        /// Where the key is sent (`header`, `query`).
        #[serde(rename = "in")]
        location: Option<String>,
    },
    BearerToken {
        token: Option<String>,
    },
    #[serde(rename = "oauth2")]
    OAuth2 {
        access_token: Option<String>,
        token_type: Option<String>,
        expires_in: Option<String>,
        refresh_token: Option<String>,
    },
    Jwt {
        token: Option<String>,
    },
}
