//! `seal` and `open` command implementations.

use anyhow::{bail, Context, Result};
use common::ContactPayload;
use serde_json::Value;
use tracing::{debug, info};

use crate::cli::{OpenArgs, OutputFormat, SealArgs};
use crate::{password, payload};

/// Element id the page script reads the envelope from.
pub const ENVELOPE_ELEMENT_ID: &str = "encrypted-contact-data";

/// Seal the requested payload and print the envelope to stdout.
pub fn seal(args: SealArgs) -> Result<()> {
    let document = match &args.json {
        Some(path) => payload::read_json(path)?,
        None => {
            let contact = payload::from_flags(args.email, args.phone, args.fields)?;
            serde_json::to_value(contact).context("failed to encode contact")?
        }
    };

    let password = password::obtain(&args.password, true)?;
    let envelope = common::encrypt(&document, &password).context("failed to seal payload")?;
    info!(envelope_len = envelope.len(), "payload sealed");

    println!("{}", render(&envelope, args.format));
    Ok(())
}

/// Open an envelope and print its JSON contents to stdout.
pub fn open(args: OpenArgs) -> Result<()> {
    let envelope = payload::read_source_or_literal(&args.envelope)?;
    let password = password::obtain(&args.password, false)?;

    let Some(document) = common::decrypt::<Value>(envelope.trim(), &password) else {
        bail!("Incorrect password");
    };
    debug!("envelope opened");

    println!(
        "{}",
        serde_json::to_string_pretty(&document).context("failed to format payload")?
    );
    if args.links {
        match serde_json::from_value::<ContactPayload>(document) {
            Ok(contact) => contact.links().iter().for_each(|l| println!("{}", l.href)),
            Err(_) => debug!("payload is not a contact object; no links"),
        }
    }
    Ok(())
}

/// Format an envelope for output.
pub fn render(envelope: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Raw => envelope.to_owned(),
        OutputFormat::Html => {
            format!(r#"<input type="hidden" id="{ENVELOPE_ELEMENT_ID}" value="{envelope}">"#)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_render_is_the_envelope() {
        assert_eq!(render("a:b:c", OutputFormat::Raw), "a:b:c");
    }

    #[test]
    fn html_render_is_hidden_input() {
        assert_eq!(
            render("YQ==:Yg==:Yw==", OutputFormat::Html),
            r#"<input type="hidden" id="encrypted-contact-data" value="YQ==:Yg==:Yw==">"#
        );
    }
}
