//! Authentication credential building.
//!
//! `--auth-properties` is either a JSON object or a list of comma-separated
//! `key=value` pairs. The same property syntax is used by `--headers`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::descriptor::AuthCredential;
use crate::error::ConfigError;
use crate::loader::sniff;
use crate::types::{Format, RawValue};

/// Supported authentication schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthScheme {
    Basic,
    ApiKey,
    BearerToken,
    OAuth2,
    Jwt,
}

impl AuthScheme {
    pub const ALL: [AuthScheme; 5] = [
        AuthScheme::Basic,
        AuthScheme::ApiKey,
        AuthScheme::BearerToken,
        AuthScheme::OAuth2,
        AuthScheme::Jwt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthScheme::Basic => "basic",
            AuthScheme::ApiKey => "api-key",
            AuthScheme::BearerToken => "bearer-token",
            AuthScheme::OAuth2 => "oauth2",
            AuthScheme::Jwt => "jwt",
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuthScheme::ALL
            .into_iter()
            .find(|scheme| scheme.as_str() == s)
            .ok_or_else(|| ConfigError::UnsupportedAuthType {
                value: s.to_string(),
            })
    }
}

/// Parse a properties string into a key/value map.
///
/// A JSON object is decoded directly; scalar values are stringified and
/// nested values kept as compact JSON. Anything else is split on commas
/// into `key=value` pairs, trimming both sides. Pairs without exactly one
/// `=` are discarded.
pub fn parse_properties(input: &str) -> BTreeMap<String, String> {
    if sniff(input) == Format::Json {
        if let Ok(obj) = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(input) {
            return obj
                .into_iter()
                .filter_map(|(key, value)| {
                    let raw = RawValue::from(value);
                    let text = match &raw {
                        RawValue::Null => return None,
                        RawValue::List(_) | RawValue::Map(_) => serde_json::to_string(&raw).ok()?,
                        scalar => scalar.scalar_text()?,
                    };
                    Some((key, text))
                })
                .collect();
        }
    }

    input
        .split(',')
        .filter_map(|pair| {
            let mut parts = pair.split('=');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(key), Some(value), None) => {
                    Some((key.trim().to_string(), value.trim().to_string()))
                }
                _ => {
                    if !pair.trim().is_empty() {
                        debug!(pair, "discarding malformed property pair");
                    }
                    None
                }
            }
        })
        .collect()
}

/// Build the credential for `auth_type` from a properties string.
///
/// Only the properties relevant to the scheme are kept.
///
/// # Errors
///
/// Returns `ConfigError::UnsupportedAuthType` for an unknown scheme.
pub fn build_credential(auth_type: &str, auth_properties: &str) -> Result<AuthCredential, ConfigError> {
    let scheme: AuthScheme = auth_type.parse()?;
    let mut props = parse_properties(auth_properties);
    let mut take = |key: &str| props.remove(key);

    let credential = match scheme {
        AuthScheme::Basic => AuthCredential::Basic {
            username: take("username"),
            password: take("password"),
        },
        AuthScheme::ApiKey => AuthCredential::ApiKey {
            name: take("name"),
            value: take("value"),
            location: take("in"),
        },
        AuthScheme::BearerToken => AuthCredential::BearerToken {
            token: take("token"),
        },
        AuthScheme::OAuth2 => AuthCredential::OAuth2 {
            access_token: take("accessToken"),
            token_type: take("tokenType"),
            expires_in: take("expiresIn"),
            refresh_token: take("refreshToken"),
        },
        AuthScheme::Jwt => AuthCredential::Jwt {
            token: take("token"),
        },
    };

    if !props.is_empty() {
        debug!(
            scheme = %scheme,
            dropped = ?props.keys().collect::<Vec<_>>(),
            "ignoring properties not used by scheme"
        );
    }

    Ok(credential)
}
