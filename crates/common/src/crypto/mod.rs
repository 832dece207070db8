//! Password-derived AES-256-GCM envelope codec.
//!
//! This module is intentionally free of HTTP and terminal dependencies.
//! It provides the key derivation, the envelope wire format, and the
//! `encrypt` / `decrypt` pair used by both binaries.
//!
//! # Envelope format
//!
//! ```text
//! <base64(salt:16B)>:<base64(iv:12B)>:<base64(ciphertext+tag)>
//! ```
//!
//! Standard base64 alphabet with padding, PBKDF2-HMAC-SHA256 at 100 000
//! iterations, 128-bit GCM tag appended to the ciphertext. Envelopes already
//! embedded in published pages depend on this format staying bit-exact.

pub mod codec;
pub mod envelope;
pub mod kdf;

pub use codec::{decrypt, encrypt};
pub use envelope::{Envelope, IV_LEN};
pub use kdf::{derive_key, DerivedKey, KEY_LEN, PBKDF2_ITERATIONS, SALT_LEN};
