//! The contact details sealed inside an envelope, and the links shown for them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Decrypted contact details.
///
/// `email` and `phone` are the fields rendered as links. Any other fields the
/// author sealed are kept in `extra` and survive a round trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Additional author-defined fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// What a [`ContactLink`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Email,
    Phone,
}

/// A clickable link for one revealed contact field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactLink {
    pub kind: LinkKind,
    /// `mailto:` or `tel:` URI.
    pub href: String,
    /// Text shown to the viewer.
    pub label: String,
}

impl ContactPayload {
    /// Returns `true` if neither `email` nor `phone` carries a non-empty value.
    /// Extra fields are not considered.
    pub fn is_empty(&self) -> bool {
        self.links().is_empty()
    }

    /// Links for the revealed fields, email first. Absent or empty values are skipped.
    pub fn links(&self) -> Vec<ContactLink> {
        let fields = [
            (LinkKind::Email, "mailto:", &self.email),
            (LinkKind::Phone, "tel:", &self.phone),
        ];
        fields
            .into_iter()
            .filter_map(|(kind, scheme, value)| {
                let value = value.as_deref().filter(|v| !v.is_empty())?;
                Some(ContactLink {
                    kind,
                    href: format!("{scheme}{value}"),
                    label: value.to_owned(),
                })
            })
            .collect()
    }
}
