//! Deny-set composition.
//!
//! Identity and audit columns are never writable from client input. The only
//! way to build a [`DenySet`] is [`compose`], which always starts from
//! [`DEFAULT_DENY_COLUMNS`], so a call-site that forgets its own relational
//! denials still cannot reach them.

use std::collections::BTreeSet;

pub const DEFAULT_DENY_COLUMNS: [&str; 3] = ["id", "created_at", "updated_at"];

/// Columns excluded from client-writable input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenySet {
    columns: BTreeSet<String>,
}

/// `DEFAULT_DENY_COLUMNS ∪ extra`.
pub fn compose<I, S>(extra: I) -> DenySet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut columns: BTreeSet<String> = DEFAULT_DENY_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(extra.into_iter().map(Into::into));
    DenySet { columns }
}

impl DenySet {
    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// A new set with `extra` added on top of this one.
    pub fn with<I, S>(&self, extra: I) -> DenySet
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut columns = self.columns.clone();
        columns.extend(extra.into_iter().map(Into::into));
        DenySet { columns }
    }
}

impl Default for DenySet {
    fn default() -> Self {
        compose(std::iter::empty::<String>())
    }
}
