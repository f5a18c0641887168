//! Endpoint file loading.
//!
//! Detects whether a text blob is JSON or YAML and decodes it into a
//! [`RawMap`]. JSON is always tried first: YAML parsers accept most JSON,
//! so trying YAML first would classify well-formed JSON as YAML.

use std::path::Path;

use tracing::debug;

use crate::error::ConfigError;
use crate::types::{Format, RawMap, RawValue};

/// File extensions accepted by [`load_endpoint_file`]. An empty extension is
/// also accepted and left to content sniffing.
const SUPPORTED_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// Detect the format of `data` by attempted parse.
///
/// Returns `Json` if `data` parses as a JSON object, otherwise `Yaml` if it
/// parses as a YAML mapping, otherwise `Unknown`.
pub fn sniff(data: &str) -> Format {
    if serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(data).is_ok() {
        Format::Json
    } else if serde_yaml::from_str::<serde_yaml::Mapping>(data).is_ok() {
        Format::Yaml
    } else {
        Format::Unknown
    }
}

/// Decode `data` as a mapping in the given format.
///
/// # Errors
///
/// Returns `ConfigError::Decode` with the parser's message if the input is
/// malformed, or `ConfigError::UnsupportedFormat` for `Format::Unknown`.
pub fn decode(data: &str, format: Format) -> Result<RawMap, ConfigError> {
    let value = match format {
        Format::Json => serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(data)
            .map(|obj| RawValue::from(serde_json::Value::Object(obj)))
            .map_err(|e| ConfigError::Decode {
                format,
                message: e.to_string(),
            })?,
        Format::Yaml => serde_yaml::from_str::<serde_yaml::Mapping>(data)
            .map(|mapping| RawValue::from(serde_yaml::Value::Mapping(mapping)))
            .map_err(|e| ConfigError::Decode {
                format,
                message: e.to_string(),
            })?,
        Format::Unknown => {
            return Err(ConfigError::UnsupportedFormat {
                detail: "content is neither JSON nor YAML".to_string(),
            })
        }
    };

    match value {
        RawValue::Map(map) => Ok(map),
        other => Err(ConfigError::Decode {
            format,
            message: format!("expected a mapping, got {}", other.type_name()),
        }),
    }
}

/// Sniff and decode in one step.
pub fn decode_auto(data: &str) -> Result<RawMap, ConfigError> {
    let format = sniff(data);
    debug!(%format, "sniffed input format");
    decode(data, format)
}

/// Load an endpoint definition file and return its `endpoint` mapping.
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if the file doesn't exist,
/// `ConfigError::UnsupportedFormat` for a foreign extension (or unparseable
/// content in a file without one), `ConfigError::Decode` with the parser's
/// message for a malformed `.json`, `.yaml` or `.yml` file,
/// and `ConfigError::MissingEndpoint` if the document has no `endpoint` mapping.
pub fn load_endpoint_file(path: &Path) -> Result<RawMap, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let declared = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => {
            let ext = ext.to_ascii_lowercase();
            if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
                return Err(ConfigError::UnsupportedFormat {
                    detail: format!(".{}", ext),
                });
            }
            if ext == "json" {
                Format::Json
            } else {
                Format::Yaml
            }
        }
        None => Format::Unknown,
    };

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    // Content wins over the extension; the extension only picks which
    // parser reports the error when neither accepts the content.
    let format = match sniff(&content) {
        Format::Unknown => declared,
        sniffed => sniffed,
    };
    debug!(%format, path = %path.display(), "decoding endpoint file");
    let mut document = decode(&content, format)?;
    match document.remove("endpoint") {
        Some(RawValue::Map(endpoint)) => Ok(endpoint),
        _ => Err(ConfigError::MissingEndpoint),
    }
}
