//! Canonical column and member names.
//!
//! Databases and Rust code spell the same column in different ways
//! (`user_id`, `UserId`, `USER_ID`). Every name that takes part in mapping is
//! first reduced to a [`CanonicalName`] by a [`Canonicalizer`], and all lookups
//! compare canonical forms only.

use dashmap::DashMap;
use heck::ToShoutySnakeCase;
use serde::Deserialize;
use std::{borrow::Borrow, fmt, sync::Arc};

/// A normalized identifier.
///
/// Names produced by the same [`Canonicalizer`] for the same canonical text
/// share one allocation, so [`CanonicalName::ptr_eq`] is a valid fast path.
/// Equality and hashing compare the text and never depend on identity.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalName(Arc<str>);

impl CanonicalName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if both names share the same allocation.
    pub fn ptr_eq(&self, other: &CanonicalName) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl Borrow<str> for CanonicalName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CanonicalName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for CanonicalName {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for CanonicalName {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// How raw identifiers are reduced to canonical form.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalPolicy {
    /// Drop every non-alphanumeric character and upper-case the rest.
    ///
    /// `user_id`, `UserId` and `USER_ID` all become `USERID`.
    #[default]
    AlphanumericUpper,

    /// Upper snake case: `studentId` and `student_id` become `STUDENT_ID`.
    UpperSnake,
}

impl CanonicalPolicy {
    /// Applies the policy without consulting any cache.
    pub fn apply(self, raw: &str) -> String {
        match self {
            CanonicalPolicy::AlphanumericUpper => raw
                .chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_uppercase)
                .collect(),
            CanonicalPolicy::UpperSnake => raw.to_shouty_snake_case(),
        }
    }
}

/// Memoizing canonicalizer.
///
/// Safe to share between threads; the first caller for a given raw name
/// computes its canonical form and every later caller gets the cached
/// instance.
#[derive(Debug, Default)]
pub struct Canonicalizer {
    policy: CanonicalPolicy,

    /// Raw spelling to canonical name
    by_raw: DashMap<Box<str>, CanonicalName>,

    /// Canonical text to its single shared instance
    interned: DashMap<Box<str>, CanonicalName>,
}

impl Canonicalizer {
    pub fn new(policy: CanonicalPolicy) -> Canonicalizer {
        Canonicalizer {
            policy,
            by_raw: DashMap::new(),
            interned: DashMap::new(),
        }
    }

    pub fn policy(&self) -> CanonicalPolicy {
        self.policy
    }

    pub fn canonicalize(&self, raw: &str) -> CanonicalName {
        if let Some(name) = self.by_raw.get(raw) {
            return name.clone();
        }

        let canonical = self.policy.apply(raw);
        let name = self.intern(canonical);

        self.by_raw
            .entry(raw.into())
            .or_insert_with(|| name.clone())
            .clone()
    }

    /// Returns `true` if both raw names canonicalize to the same name.
    pub fn equals(&self, a: &str, b: &str) -> bool {
        self.canonicalize(a) == self.canonicalize(b)
    }

    /// Returns `true` if any of `names` canonicalizes to `name`.
    pub fn contains<'a>(&self, names: impl IntoIterator<Item = &'a str>, name: &str) -> bool {
        let target = self.canonicalize(name);
        names
            .into_iter()
            .any(|candidate| self.canonicalize(candidate) == target)
    }

    /// Number of distinct raw spellings seen so far.
    pub fn len(&self) -> usize {
        self.by_raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_raw.is_empty()
    }

    fn intern(&self, canonical: String) -> CanonicalName {
        if let Some(name) = self.interned.get(canonical.as_str()) {
            return name.clone();
        }

        let name = CanonicalName(Arc::from(canonical.as_str()));
        self.interned
            .entry(canonical.into_boxed_str())
            .or_insert(name)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphanumeric_upper_strips_separators() {
        let names = Canonicalizer::default();

        for raw in ["user_id", "UserId", "USER_ID", "user-id", "User Id"] {
            assert_eq!(names.canonicalize(raw), "USERID", "raw={raw}");
        }
    }

    #[test]
    fn upper_snake_splits_words() {
        let names = Canonicalizer::new(CanonicalPolicy::UpperSnake);

        assert_eq!(names.canonicalize("studentId"), "STUDENT_ID");
        assert_eq!(names.canonicalize("student_id"), "STUDENT_ID");
        assert_eq!(names.canonicalize("STUDENT_ID"), "STUDENT_ID");
    }

    #[test]
    fn spellings_share_one_instance() {
        let names = Canonicalizer::default();

        let a = names.canonicalize("user_id");
        let b = names.canonicalize("UserId");
        let c = names.canonicalize("user_id");

        assert!(a.ptr_eq(&b));
        assert!(a.ptr_eq(&c));
        assert_eq!(names.len(), 2);
    }
}
