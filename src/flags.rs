//! Flag set and structural flattening.
//!
//! A [`FlagSet`] holds the endpoint flags a command understands. Values come
//! from the command line or from an endpoint file flattened with
//! [`flatten_into`]; the normalizer then reads back the flags that were set.
//!
//! # Flattening
//!
//! Nested keys are joined with `-` to form flag names. The `response`
//! object is the default object, so its direct children are promoted to
//! top-level names:
//!
//! ```text
//! endpoint:                         flags:
//!   response:                       --method GET
//!     method: GET            =>     --auth-type basic
//!   auth:                           --auth-properties '{"username":"a"}'
//!     type: basic
//!     properties: {username: a}
//! ```
//!
//! A nested mapping whose name is itself a flag, with no deeper flags below
//! it, is stored in that flag as compact JSON (`auth-properties` above).

use tracing::debug;

use crate::error::ConfigError;
use crate::types::{RawMap, RawValue};

/// Recursion root whose children are emitted without a prefix.
const RESPONSE_ROOT: &str = "response";

/// Flags shared by `create` and `update`, in display order.
pub const ENDPOINT_FLAGS: &[&str] = &[
    "method",
    "http-status",
    "content-type",
    "charset",
    "headers",
    "schema",
    "body",
    "auth-type",
    "auth-properties",
    "request-content-type",
    "request-schema",
];

#[derive(Debug, Clone)]
struct Flag {
    name: String,
    value: Option<String>,
}

/// Named string flags with "changed" tracking.
///
/// Setting an undeclared flag is an error; the set never invents flags.
#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    flags: Vec<Flag>,
}

impl FlagSet {
    /// Create a flag set declaring `names`.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            flags: names
                .into_iter()
                .map(|name| Flag {
                    name: name.into(),
                    value: None,
                })
                .collect(),
        }
    }

    /// The flag set used by endpoint commands.
    pub fn endpoint() -> Self {
        Self::new(ENDPOINT_FLAGS.iter().copied())
    }

    /// Whether a flag with this name is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f.name == name)
    }

    /// Whether any declared flag lives below `prefix` (`<prefix>-...`).
    fn has_flags_below(&self, prefix: &str) -> bool {
        self.flags.iter().any(|f| {
            f.name
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('-'))
        })
    }

    /// Set a declared flag, marking it changed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::FlagBinding` if no flag named `name` exists.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), ConfigError> {
        let flag = self
            .flags
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| ConfigError::FlagBinding {
                flag: name.to_string(),
            })?;
        flag.value = Some(value.into());
        Ok(())
    }

    /// Value of a flag if it was set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.flags
            .iter()
            .find(|f| f.name == name)
            .and_then(|f| f.value.as_deref())
    }

    /// Flags that were set, in declaration order.
    pub fn changed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.flags
            .iter()
            .filter_map(|f| f.value.as_deref().map(|v| (f.name.as_str(), v)))
    }

    pub fn is_empty(&self) -> bool {
        self.changed().next().is_none()
    }
}

/// Flatten the `endpoint` mapping of a decoded file into `flags`.
///
/// # Errors
///
/// Returns `ConfigError::FlagBinding` for the first produced name that has
/// no declared flag. Flags set before the failure keep their new values;
/// callers treat the error as fatal.
pub fn flatten_into(endpoint: &RawMap, flags: &mut FlagSet) -> Result<(), ConfigError> {
    flatten_level(endpoint, None, flags)
}

fn flatten_level(map: &RawMap, root: Option<&str>, flags: &mut FlagSet) -> Result<(), ConfigError> {
    for (key, value) in map {
        let full_key = match root {
            Some(RESPONSE_ROOT) | None => key.clone(),
            Some(prefix) => format!("{}-{}", prefix, key),
        };

        match value {
            RawValue::Map(nested) if nested.is_empty() => {}
            RawValue::Map(nested) => {
                if flags.contains(&full_key) && !flags.has_flags_below(&full_key) {
                    let json = serde_json::to_string(value).map_err(|e| {
                        ConfigError::validation(full_key.clone(), e.to_string())
                    })?;
                    debug!(flag = %full_key, "storing nested mapping as JSON");
                    flags.set(&full_key, json)?;
                } else {
                    flatten_level(nested, Some(&full_key), flags)?;
                }
            }
            RawValue::List(_) => {
                let json = serde_json::to_string(value)
                    .map_err(|e| ConfigError::validation(full_key.clone(), e.to_string()))?;
                flags.set(&full_key, json)?;
            }
            RawValue::Null => {}
            scalar => {
                if let Some(text) = scalar.scalar_text() {
                    flags.set(&full_key, text)?;
                }
            }
        }
    }
    Ok(())
}
