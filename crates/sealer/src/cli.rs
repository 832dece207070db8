//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Sealer - seal contact details into password-gated envelopes for static pages
#[derive(Debug, Parser)]
#[command(name = "sealer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Diagnostic log level (written to stderr)
    #[arg(long, global = true, env = "SEALER_LOG", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encrypt contact details and print the envelope
    Seal(SealArgs),
    /// Decrypt an envelope and print its contents
    Open(OpenArgs),
}

/// Arguments for the `seal` command
#[derive(Debug, Args)]
pub struct SealArgs {
    /// Email address to reveal
    #[arg(long)]
    pub email: Option<String>,

    /// Phone number to reveal
    #[arg(long)]
    pub phone: Option<String>,

    /// Additional field (repeatable)
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,

    /// Seal an arbitrary JSON document from FILE (`-` for stdin)
    #[arg(long, value_name = "FILE", conflicts_with_all = ["email", "phone", "fields"])]
    pub json: Option<PathBuf>,

    #[command(flatten)]
    pub password: PasswordArgs,

    /// How to print the envelope
    #[arg(long, value_enum, default_value_t = OutputFormat::Raw)]
    pub format: OutputFormat,
}

/// Arguments for the `open` command
#[derive(Debug, Args)]
pub struct OpenArgs {
    /// Envelope string, or `-` to read it from stdin
    #[arg(value_name = "ENVELOPE")]
    pub envelope: String,

    #[command(flatten)]
    pub password: PasswordArgs,

    /// Also print the mailto:/tel: links for the contact
    #[arg(long)]
    pub links: bool,
}

#[derive(Debug, Args)]
pub struct PasswordArgs {
    /// Read the password from this environment variable instead of prompting
    #[arg(long, value_name = "VAR")]
    pub password_env: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The bare envelope string
    Raw,
    /// A hidden `<input>` element ready to paste into the page
    Html,
}

/// Parse a `KEY=VALUE` pair. The value may itself contain `=`.
pub fn parse_field(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("field key must not be empty".into());
    }
    Ok((key.to_owned(), value.to_owned()))
}
