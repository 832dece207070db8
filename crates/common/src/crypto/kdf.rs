//! PBKDF2-HMAC-SHA256 key derivation.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Iteration count. Envelopes and their salts are public in page source, so
/// every offline guess has to pay for this many HMAC rounds.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Byte length of the per-envelope salt.
pub const SALT_LEN: usize = 16;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// A 256-bit AES key derived from a password.
///
/// The buffer is zeroed on drop. Lives only for a single encrypt or decrypt.
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive the envelope key for `password` and `salt`.
///
/// Deterministic: the same inputs always yield the same key. The password is
/// used as raw UTF-8 bytes with no normalisation.
pub fn derive_key(password: &str, salt: &[u8; SALT_LEN]) -> DerivedKey {
    derive_with_rounds(password.as_bytes(), salt, PBKDF2_ITERATIONS)
}

pub(crate) fn derive_with_rounds(password: &[u8], salt: &[u8], rounds: u32) -> DerivedKey {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password, salt, rounds, key.as_mut_slice());
    DerivedKey(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn rfc7914_single_round_vector() {
        // RFC 7914 §11: PBKDF2-HMAC-SHA256("passwd", "salt", c=1), first 32 bytes.
        let key = derive_with_rounds(b"passwd", b"salt", 1);
        assert_eq!(
            hex(key.as_bytes()),
            "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc"
        );
    }

    #[test]
    fn full_iteration_count_vector() {
        let salt: [u8; SALT_LEN] = core::array::from_fn(|i| i as u8);
        let key = derive_key("hunter2", &salt);
        assert_eq!(
            hex(key.as_bytes()),
            "844d6e092def956a3d2773e41d721bf2d95a1d8f524d970ca76cd20528a03679"
        );
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let salt = [7u8; SALT_LEN];
        let a = derive_key("correct horse", &salt);
        let b = derive_key("correct horse", &salt);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn salt_changes_key() {
        let a = derive_key("pw", &[1u8; SALT_LEN]);
        let b = derive_key("pw", &[2u8; SALT_LEN]);
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn debug_is_redacted() {
        let key = derive_with_rounds(b"pw", b"salt", 1);
        assert_eq!(format!("{key:?}"), "DerivedKey([REDACTED])");
    }
}
