//! The `salt:iv:ciphertext` envelope and the AES-256-GCM operations on it.

use std::fmt;
use std::str::FromStr;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{
    alphabet,
    engine::{
        general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD},
        DecodePaddingMode,
    },
    Engine as _,
};
use zeroize::Zeroizing;

use super::kdf::{DerivedKey, SALT_LEN};
use crate::error::CodecError;

/// Byte length of the AES-GCM nonce (12 bytes = 96 bits).
pub const IV_LEN: usize = 12;

/// Byte length of the GCM authentication tag appended to the ciphertext.
pub const TAG_LEN: usize = 16;

/// Separator between the three base64 parts.
pub const DELIMITER: char = ':';

/// Standard alphabet that accepts input with or without `=` padding.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A parsed envelope.
///
/// The string representation is `base64(salt):base64(iv):base64(ciphertext+tag)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// PBKDF2 salt, fresh per encryption.
    pub salt: [u8; SALT_LEN],
    /// AES-GCM nonce, fresh per encryption.
    pub iv: [u8; IV_LEN],
    /// Raw ciphertext followed by the 16-byte authentication tag.
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Encrypt `plaintext` under `key` with the given nonce.
    ///
    /// The caller owns freshness of `salt` and `iv`. A (key, iv) pair must
    /// never seal two different plaintexts.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::CryptoUnavailable`] if the AEAD primitive fails.
    pub fn seal(
        key: &DerivedKey,
        salt: [u8; SALT_LEN],
        iv: [u8; IV_LEN],
        plaintext: &[u8],
    ) -> Result<Self, CodecError> {
        let cipher = build_cipher(key)?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&iv), plaintext)
            .map_err(|_| CodecError::CryptoUnavailable("aes-256-gcm encryption failed".into()))?;
        Ok(Self {
            salt,
            iv,
            ciphertext,
        })
    }

    /// Decrypt and authenticate the ciphertext under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Authentication`] if the tag does not verify (wrong
    /// key or tampered data).
    pub fn open(&self, key: &DerivedKey) -> Result<Zeroizing<Vec<u8>>, CodecError> {
        let cipher = build_cipher(key)?;
        cipher
            .decrypt(Nonce::from_slice(&self.iv), self.ciphertext.as_ref())
            .map(Zeroizing::new)
            .map_err(|_| CodecError::Authentication)
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{DELIMITER}{}{DELIMITER}{}",
            STANDARD.encode(self.salt),
            STANDARD.encode(self.iv),
            STANDARD.encode(&self.ciphertext),
        )
    }
}

impl FromStr for Envelope {
    type Err = CodecError;

    /// Parse an envelope string. Whitespace around the whole string is
    /// ignored since envelopes are usually copied out of HTML attributes.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Format`] on a wrong part count, invalid base64,
    /// a salt or nonce of the wrong length, or a ciphertext shorter than the tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(DELIMITER).collect();
        let [salt, iv, ciphertext] = parts.as_slice() else {
            return Err(CodecError::Format);
        };

        let salt = decode_fixed::<SALT_LEN>(salt)?;
        let iv = decode_fixed::<IV_LEN>(iv)?;
        let ciphertext = LENIENT
            .decode(ciphertext)
            .map_err(|_| CodecError::Format)?;
        if ciphertext.len() < TAG_LEN {
            return Err(CodecError::Format);
        }

        Ok(Self {
            salt,
            iv,
            ciphertext,
        })
    }
}

fn decode_fixed<const N: usize>(part: &str) -> Result<[u8; N], CodecError> {
    LENIENT
        .decode(part)
        .map_err(|_| CodecError::Format)?
        .try_into()
        .map_err(|_| CodecError::Format)
}

fn build_cipher(key: &DerivedKey) -> Result<Aes256Gcm, CodecError> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|_| CodecError::CryptoUnavailable("invalid aes-256 key length".into()))
}
