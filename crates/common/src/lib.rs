//! Password-derived envelope codec, contact model, protocol types, and errors
//! shared across `contact-shield` crates.

pub mod contact;
pub mod crypto;
pub mod error;
pub mod protocol;

pub use contact::{ContactLink, ContactPayload, LinkKind};
pub use crypto::{decrypt, encrypt, Envelope};
pub use error::{CodecError, ServiceError};
