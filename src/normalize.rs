//! Normalization of endpoint flags into wire descriptors.
//!
//! Steps, in order:
//!
//! 1. rename flag names to wire keys (table below, camelCase otherwise)
//! 2. coerce `httpStatus` to an integer, failing on malformed input
//! 3. require `authType` and `authProperties` together
//! 4. build `authCredentials`
//! 5. require a non-empty `responseBody`
//! 6. keep optional string fields only when present
//! 7. default `method`, `responseContentType` and `charset`
//!
//! | Flag | Wire key |
//! |------|----------|
//! | `body` | `responseBody` |
//! | `content-type` | `responseContentType` |
//! | `request-content-type` | `requestContentType` |
//! | `schema` | `responseBodySchema` |
//! | `request-schema` | `requestBodySchema` |
//! | `headers` | `httpHeaders` |

use std::collections::BTreeMap;

use tracing::debug;

use crate::auth::{build_credential, parse_properties};
use crate::descriptor::{
    AuthCredential, EndpointDescriptor, EndpointPatch, DEFAULT_CHARSET, DEFAULT_CONTENT_TYPE,
    DEFAULT_HTTP_STATUS, DEFAULT_METHOD,
};
use crate::error::ConfigError;
use crate::flags::FlagSet;
use crate::loader::sniff;
use crate::types::Format;

const KEY_RENAMES: &[(&str, &str)] = &[
    ("body", "responseBody"),
    ("content-type", "responseContentType"),
    ("request-content-type", "requestContentType"),
    ("schema", "responseBodySchema"),
    ("request-schema", "requestBodySchema"),
    ("headers", "httpHeaders"),
];

/// Map a flag name to its wire key.
pub fn rename_key(flag: &str) -> String {
    KEY_RENAMES
        .iter()
        .find(|(from, _)| *from == flag)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or_else(|| to_camel_case(flag))
}

/// Convert `dash-case` to `camelCase`.
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, part) in s.split('-').enumerate() {
        if i == 0 {
            out.push_str(part);
            continue;
        }
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out
}

/// Parse a status code. Malformed input is an error, never a default.
pub fn parse_status(raw: &str) -> Result<u16, ConfigError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix(['-', '+']).unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::validation(
            "httpStatus",
            format!("\"{}\" is not an integer", raw),
        ));
    }
    match trimmed.parse::<i64>() {
        Ok(status) if (100..=599).contains(&status) => Ok(status as u16),
        _ => Err(ConfigError::validation(
            "httpStatus",
            format!("{} is outside 100-599", trimmed),
        )),
    }
}

/// Parse `--headers` (JSON object or `key=value` pairs).
pub fn parse_headers(raw: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let headers = parse_properties(raw);
    if headers.is_empty() && sniff(raw) != Format::Json {
        return Err(ConfigError::validation(
            "httpHeaders",
            "expected a JSON object or comma-separated key=value pairs",
        ));
    }
    Ok(headers)
}

/// Flags renamed to wire keys. Empty values count as unset.
fn wire_fields(flags: &FlagSet) -> BTreeMap<String, String> {
    flags
        .changed()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| (rename_key(name), value.to_string()))
        .collect()
}

fn auth_from(fields: &BTreeMap<String, String>) -> Result<Option<AuthCredential>, ConfigError> {
    match (fields.get("authType"), fields.get("authProperties")) {
        (Some(auth_type), Some(properties)) => build_credential(auth_type, properties).map(Some),
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::AuthPairing {
            missing: "auth-properties",
        }),
        (None, Some(_)) => Err(ConfigError::AuthPairing {
            missing: "auth-type",
        }),
    }
}

fn headers_from(fields: &BTreeMap<String, String>) -> Result<Option<BTreeMap<String, String>>, ConfigError> {
    fields
        .get("httpHeaders")
        .map(|raw| parse_headers(raw))
        .transpose()
}

/// Normalize the flags of a `create` command into a descriptor.
///
/// # Errors
///
/// Returns `ConfigError::Validation` for a malformed status or a missing
/// body, `ConfigError::AuthPairing` if only one of the auth flags is set,
/// and `ConfigError::UnsupportedAuthType` for an unknown scheme.
pub fn normalize(flags: &FlagSet) -> Result<EndpointDescriptor, ConfigError> {
    let mut fields = wire_fields(flags);
    debug!(keys = ?fields.keys().collect::<Vec<_>>(), "normalizing endpoint flags");

    let http_status = match fields.get("httpStatus") {
        Some(raw) => parse_status(raw)?,
        None => DEFAULT_HTTP_STATUS,
    };

    let auth_credentials = auth_from(&fields)?;
    let http_headers = headers_from(&fields)?.filter(|h| !h.is_empty());

    let response_body = fields.remove("responseBody").ok_or_else(|| {
        ConfigError::validation("responseBody", "a response body is required (--body)")
    })?;

    Ok(EndpointDescriptor {
        method: fields
            .remove("method")
            .unwrap_or_else(|| DEFAULT_METHOD.to_string()),
        http_status,
        response_content_type: fields
            .remove("responseContentType")
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        charset: fields
            .remove("charset")
            .unwrap_or_else(|| DEFAULT_CHARSET.to_string()),
        response_body,
        response_body_schema: fields.remove("responseBodySchema"),
        request_content_type: fields.remove("requestContentType"),
        request_body_schema: fields.remove("requestBodySchema"),
        http_headers,
        auth_credentials,
    })
}

/// Normalize the flags of an `update` command into a partial update.
///
/// Applies the same renames, status coercion and auth pairing as
/// [`normalize`] but no defaults.
///
/// # Errors
///
/// Returns `ConfigError::Validation` if no field was set.
pub fn normalize_patch(flags: &FlagSet) -> Result<EndpointPatch, ConfigError> {
    let mut fields = wire_fields(flags);

    let patch = EndpointPatch {
        http_status: fields
            .get("httpStatus")
            .map(|raw| parse_status(raw))
            .transpose()?,
        auth_credentials: auth_from(&fields)?,
        http_headers: headers_from(&fields)?,
        method: fields.remove("method"),
        response_content_type: fields.remove("responseContentType"),
        charset: fields.remove("charset"),
        response_body: fields.remove("responseBody"),
        response_body_schema: fields.remove("responseBodySchema"),
        request_content_type: fields.remove("requestContentType"),
        request_body_schema: fields.remove("requestBodySchema"),
    };

    if patch.is_empty() {
        return Err(ConfigError::validation(
            "update",
            "nothing to update; set at least one endpoint flag",
        ));
    }
    Ok(patch)
}
