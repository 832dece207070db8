//! `encrypt` / `decrypt` of JSON payloads to and from envelope strings.

use rand::{rngs::OsRng, RngCore};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use super::envelope::{Envelope, IV_LEN};
use super::kdf::{derive_key, SALT_LEN};
use crate::error::CodecError;

/// Serialise `payload` to compact JSON and seal it under `password`.
///
/// A fresh salt and nonce are drawn from the OS CSPRNG on every call, so two
/// calls with identical inputs produce different envelopes.
///
/// # Errors
///
/// Returns [`CodecError::EmptyPassword`] for an empty password,
/// [`CodecError::Serialize`] if the payload cannot be represented as JSON, and
/// [`CodecError::CryptoUnavailable`] if the random source or cipher fails.
pub fn encrypt<T>(payload: &T, password: &str) -> Result<String, CodecError>
where
    T: Serialize + ?Sized,
{
    if password.is_empty() {
        return Err(CodecError::EmptyPassword);
    }
    let plaintext = Zeroizing::new(serde_json::to_vec(payload).map_err(CodecError::Serialize)?);

    let salt: [u8; SALT_LEN] = random_bytes()?;
    let iv: [u8; IV_LEN] = random_bytes()?;
    let key = derive_key(password, &salt);

    let envelope = Envelope::seal(&key, salt, iv, &plaintext)?;
    Ok(envelope.to_string())
}

/// Open `envelope` with `password` and parse the plaintext as `T`.
///
/// Every failure, whether a malformed envelope, a wrong password, tampered
/// data or unparseable JSON, yields `None`. The failure kind is only logged
/// at `debug`.
pub fn decrypt<T>(envelope: &str, password: &str) -> Option<T>
where
    T: DeserializeOwned,
{
    match open_envelope(envelope, password) {
        Ok(payload) => Some(payload),
        Err(e) => {
            debug!(error = %e, "envelope rejected");
            None
        }
    }
}

/// Typed counterpart of [`decrypt`].
///
/// Format errors return before any key derivation; authentication errors
/// return after the full PBKDF2 and GCM work.
///
/// # Errors
///
/// [`CodecError::Format`], [`CodecError::Authentication`] or [`CodecError::Parse`].
pub(crate) fn open_envelope<T>(envelope: &str, password: &str) -> Result<T, CodecError>
where
    T: DeserializeOwned,
{
    let envelope: Envelope = envelope.parse()?;
    let key = derive_key(password, &envelope.salt);
    let plaintext = envelope.open(&key)?;
    serde_json::from_slice(&plaintext).map_err(|_| CodecError::Parse)
}

fn random_bytes<const N: usize>() -> Result<[u8; N], CodecError> {
    let mut buf = [0u8; N];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| CodecError::CryptoUnavailable(format!("os random source: {e}")))?;
    Ok(buf)
}
