//! Account registration input.
//!
//! Each field has a check that trims, normalizes and validates one value.
//! The CLI runs the checks on flag values directly and on prompted values
//! through [`prompt_until_valid`], which re-asks until the check passes.

use std::io::{self, BufRead, Write};

use crate::api::Registration;
use crate::error::ConfigError;

const MIN_NAME_LEN: usize = 3;
const MIN_HANDLE_LEN: usize = 3;

pub fn check_full_name(raw: &str) -> Result<String, ConfigError> {
    let name = raw.trim();
    if name.chars().count() < MIN_NAME_LEN {
        return Err(ConfigError::validation(
            "fullName",
            "full name must be at least 3 characters long",
        ));
    }
    Ok(name.to_string())
}

/// Shape check only: `local@domain.tld`, no whitespace.
pub fn check_email(raw: &str) -> Result<String, ConfigError> {
    let email = raw.trim();
    let invalid = || ConfigError::validation("email", format!("\"{}\" is not a valid email address", email));

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }
    Ok(email.to_string())
}

pub fn check_github_handle(raw: &str) -> Result<String, ConfigError> {
    let handle = raw.trim();
    if handle.len() < MIN_HANDLE_LEN {
        return Err(ConfigError::validation(
            "githubHandle",
            "GitHub handle must be at least 3 characters long",
        ));
    }
    if !handle.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ConfigError::validation(
            "githubHandle",
            "GitHub handle may only contain letters, digits and hyphens",
        ));
    }
    Ok(handle.to_string())
}

/// Two ASCII letters, upper-cased.
pub fn check_country(raw: &str) -> Result<String, ConfigError> {
    let country = raw.trim().to_ascii_uppercase();
    if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ConfigError::validation(
            "country",
            "expected a 2-letter country code",
        ));
    }
    Ok(country)
}

/// Build a registration, checking every field.
pub fn registration(
    full_name: &str,
    email: &str,
    github_handle: &str,
    country: &str,
) -> Result<Registration, ConfigError> {
    Ok(Registration {
        full_name: check_full_name(full_name)?,
        email: check_email(email)?,
        github_handle: check_github_handle(github_handle)?,
        country: check_country(country)?,
    })
}

/// Ask for a value until `check` accepts it.
///
/// Rejections are written to `output` and the question is asked again.
///
/// # Errors
///
/// Returns an `UnexpectedEof` error if `input` closes before a valid answer.
pub fn prompt_until_valid<R, W, F>(
    input: &mut R,
    output: &mut W,
    question: &str,
    check: F,
) -> io::Result<String>
where
    R: BufRead,
    W: Write,
    F: Fn(&str) -> Result<String, ConfigError>,
{
    loop {
        write!(output, "{}: ", question)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no answer for \"{}\"", question),
            ));
        }

        match check(&line) {
            Ok(value) => return Ok(value),
            Err(ConfigError::Validation { message, .. }) => {
                writeln!(output, "{}. Please try again.", capitalize(&message))?;
            }
            Err(e) => writeln!(output, "{}. Please try again.", e)?,
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn full_name_length() {
        assert_eq!(check_full_name("  Ada L  ").unwrap(), "Ada L");
        assert!(check_full_name("Al").is_err());
        assert!(check_full_name("   ").is_err());
    }

    #[test]
    fn email_shapes() {
        assert_eq!(check_email(" dev@example.com\n").unwrap(), "dev@example.com");
        assert!(check_email("dev@sub.example.io").is_ok());

        for bad in ["", "dev", "@example.com", "dev@", "dev@example", "dev@@example.com", "d ev@example.com", "dev@example..com"] {
            assert!(check_email(bad).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn github_handle_charset() {
        assert_eq!(check_github_handle("octo-cat").unwrap(), "octo-cat");
        assert!(check_github_handle("ab").is_err());
        assert!(check_github_handle("octo_cat").is_err());
        assert!(check_github_handle("octo cat").is_err());
    }

    #[test]
    fn country_is_upper_cased() {
        assert_eq!(check_country(" us ").unwrap(), "US");
        assert!(check_country("USA").is_err());
        assert!(check_country("1A").is_err());
    }

    #[test]
    fn registration_checks_every_field() {
        let reg = registration("Ada Lovelace", "ada@example.com", "ada", "gb").unwrap();
        assert_eq!(reg.country, "GB");

        let err = registration("Ada Lovelace", "ada@example.com", "a", "gb").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { field, .. } if field == "githubHandle"));
    }

    #[test]
    fn prompt_retries_until_valid() {
        let mut input = Cursor::new("x\nde\n");
        let mut output = Vec::new();

        let country = prompt_until_valid(&mut input, &mut output, "Country", check_country).unwrap();
        assert_eq!(country, "DE");

        let transcript = String::from_utf8(output).unwrap();
        assert_eq!(transcript.matches("Country: ").count(), 2);
        assert!(transcript.contains("Expected a 2-letter country code. Please try again."));
    }

    #[test]
    fn prompt_fails_on_closed_input() {
        let mut input = Cursor::new("ab\n");
        let mut output = Vec::new();
        let err = prompt_until_valid(&mut input, &mut output, "Full name", check_full_name).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
