//! Building the payload to seal from command-line input.

use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use common::ContactPayload;
use serde_json::Value;

/// Assemble a [`ContactPayload`] from the contact flags.
///
/// # Errors
///
/// Fails when nothing would be sealed, or when a `--field` key shadows
/// `email`, `phone`, or an earlier field.
pub fn from_flags(
    email: Option<String>,
    phone: Option<String>,
    fields: Vec<(String, String)>,
) -> Result<ContactPayload> {
    let mut contact = ContactPayload {
        email,
        phone,
        ..Default::default()
    };
    for (key, value) in fields {
        if key == "email" || key == "phone" {
            bail!("use --{key} instead of --field {key}=...");
        }
        if contact.extra.insert(key.clone(), Value::String(value)).is_some() {
            bail!("field `{key}` given more than once");
        }
    }
    if contact.is_empty() && contact.extra.is_empty() {
        bail!("nothing to seal: pass --email, --phone, --field or --json");
    }
    Ok(contact)
}

/// Read a JSON document from `path`, or from stdin when `path` is `-`.
pub fn read_json(path: &Path) -> Result<Value> {
    let text = read_source(path)?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))
}

/// The envelope given on the command line, or stdin when it is `-`.
pub fn read_source_or_literal(arg: &str) -> Result<String> {
    if arg == "-" {
        read_source(Path::new(arg))
    } else {
        Ok(arg.to_owned())
    }
}

/// Read all of `path`, or stdin when `path` is `-`.
pub fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_contact_with_extra_fields() {
        let c = from_flags(
            Some("a@b.com".into()),
            None,
            vec![("signal".into(), "@alice".into())],
        )
        .unwrap();
        assert_eq!(c.email.as_deref(), Some("a@b.com"));
        assert_eq!(c.extra["signal"], "@alice");
    }

    #[test]
    fn rejects_empty_payload() {
        let err = from_flags(None, None, Vec::new()).unwrap_err();
        assert!(err.to_string().contains("nothing to seal"));
    }

    #[test]
    fn blank_contact_flags_count_as_empty() {
        let err = from_flags(Some(String::new()), Some(String::new()), Vec::new()).unwrap_err();
        assert!(err.to_string().contains("nothing to seal"));
        assert!(from_flags(Some(String::new()), None, vec![("signal".into(), "@a".into())]).is_ok());
    }

    #[test]
    fn rejects_shadowing_fields() {
        assert!(from_flags(None, None, vec![("email".into(), "x".into())]).is_err());
        let dup = vec![("a".into(), "1".into()), ("a".into(), "2".into())];
        assert!(from_flags(None, None, dup).is_err());
    }

    #[test]
    fn literal_envelope_passes_through() {
        assert_eq!(read_source_or_literal("a:b:c").unwrap(), "a:b:c");
    }

    #[test]
    fn read_json_reports_missing_file() {
        let err = read_json(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
