//! MockThis client
//!
//! Turns endpoint definitions from command-line flags or a JSON/YAML file
//! into the wire descriptor the MockThis API accepts, and drives the
//! passwordless login handshake.
//!
//! # Example
//!
//! ```
//! use mockthis::{decode_auto, flatten_into, normalize, FlagSet};
//!
//! let file = r#"
//! endpoint:
//!   method: POST
//!   response:
//!     http-status: 201
//!     body: '{"ok": true}'
//! "#;
//!
//! let endpoint = decode_auto(file).unwrap();
//! let endpoint = endpoint["endpoint"].as_map().unwrap();
//!
//! let mut flags = FlagSet::endpoint();
//! flatten_into(endpoint, &mut flags).unwrap();
//!
//! let descriptor = normalize(&flags).unwrap();
//! assert_eq!(descriptor.method, "POST");
//! assert_eq!(descriptor.http_status, 201);
//! assert_eq!(descriptor.response_content_type, "application/json");
//! ```
//!
//! # Pipeline
//!
//! | Stage | Input | Output |
//! |-------|-------|--------|
//! | [`load_endpoint_file`] | `.json` / `.yaml` file | `endpoint` mapping |
//! | [`flatten_into`] | nested mapping | dash-joined flags |
//! | [`normalize`] | flags | [`EndpointDescriptor`] |
//! | [`check_descriptor`] | descriptor | schema violations |
//! | [`ApiClient`] | descriptor | created endpoint |

mod api;
mod auth;
mod descriptor;
mod error;
mod flags;
mod loader;
mod login;
mod normalize;
mod register;
mod session;
mod types;
mod validator;

pub use api::{ApiClient, CreatedEndpoint, LoginStatus, LoginTicket, Registration, DEFAULT_API_URL};
pub use auth::{build_credential, parse_properties, AuthScheme};
pub use descriptor::{
    AuthCredential, EndpointDescriptor, EndpointPatch, DEFAULT_CHARSET, DEFAULT_CONTENT_TYPE,
    DEFAULT_HTTP_STATUS, DEFAULT_METHOD,
};
pub use error::{ApiError, ConfigError, SchemaError, SessionError};
pub use flags::{flatten_into, FlagSet, ENDPOINT_FLAGS};
pub use loader::{decode, decode_auto, load_endpoint_file, sniff};
pub use login::{HandshakeState, HandshakeTiming, LoginHandshake, LoginTransport};
pub use normalize::{normalize, normalize_patch, parse_headers, parse_status, rename_key, to_camel_case};
pub use register::{
    check_country, check_email, check_full_name, check_github_handle, prompt_until_valid,
    registration,
};
pub use session::SessionStore;
pub use types::{Format, LoginSession, RawMap, RawValue};
pub use validator::{check_descriptor, validate_against_schema};
