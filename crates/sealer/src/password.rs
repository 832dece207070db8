//! Obtaining the sealing password without echoing it.

use anyhow::{bail, Context, Result};
use zeroize::Zeroizing;

use crate::cli::PasswordArgs;

/// Read the password from the configured environment variable, or prompt on
/// the terminal. With `confirm`, the prompt asks twice and requires a match.
pub fn obtain(args: &PasswordArgs, confirm: bool) -> Result<Zeroizing<String>> {
    if let Some(var) = &args.password_env {
        let password = std::env::var(var)
            .with_context(|| format!("environment variable {var} is not set or not UTF-8"))?;
        return Ok(Zeroizing::new(password));
    }

    let password = Zeroizing::new(
        rpassword::prompt_password("Password: ").context("failed to read password")?,
    );
    if confirm {
        let again = Zeroizing::new(
            rpassword::prompt_password("Confirm password: ")
                .context("failed to read password")?,
        );
        if *password != *again {
            bail!("passwords do not match");
        }
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_from_named_env_var() {
        std::env::set_var("SEALER_UNIT_TEST_PASSWORD", "hunter2");
        let args = PasswordArgs {
            password_env: Some("SEALER_UNIT_TEST_PASSWORD".into()),
        };
        assert_eq!(obtain(&args, true).unwrap().as_str(), "hunter2");
    }

    #[test]
    fn missing_env_var_is_an_error() {
        let args = PasswordArgs {
            password_env: Some("SEALER_UNIT_TEST_UNSET_VARIABLE".into()),
        };
        assert!(obtain(&args, false).is_err());
    }
}
