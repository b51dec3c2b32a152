//! Mailslot naming: the reserved prefix rule and case-insensitive identity.

use crate::error::SlotError;
use std::fmt::{self, Debug, Display, Formatter};

/// The reserved path prefix every mailslot name must carry at creation time, compared
/// case-insensitively.
pub const RESERVED_PREFIX: &str = "mailslot\\";

/// A validated mailslot name.
///
/// Only creation goes through validation; opening an existing slot looks the raw string up
/// directly, so a prefixless name is simply never found rather than rejected. Two names are
/// the same slot if they case-fold to the same string.
#[derive(Clone)]
pub struct SlotName {
    raw: Box<str>,
    key: Box<str>,
}

impl SlotName {
    /// Validates `name` for mailslot creation.
    ///
    /// Fails with [`SlotError::NameInvalid`] when the reserved prefix is missing or nothing
    /// follows it.
    pub fn new(name: impl Into<String>) -> Result<Self, SlotError> {
        let raw = name.into();
        let prefix = raw.as_bytes().get(..RESERVED_PREFIX.len());
        let valid = raw.len() > RESERVED_PREFIX.len()
            && prefix.is_some_and(|p| p.eq_ignore_ascii_case(RESERVED_PREFIX.as_bytes()));
        if !valid {
            return Err(SlotError::NameInvalid);
        }
        let key = fold_case(&raw);
        Ok(Self { raw: raw.into(), key: key.into() })
    }

    /// The name as it was supplied, casing preserved.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
    pub(crate) fn key(&self) -> &str {
        &self.key
    }
}

/// Folds a name into the form the registry hashes and compares.
pub(crate) fn fold_case(name: &str) -> String {
    name.to_lowercase()
}

impl PartialEq for SlotName {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}
impl Eq for SlotName {}

impl Display for SlotName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
impl Debug for SlotName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SlotName").field(&self.raw).finish()
    }
}
