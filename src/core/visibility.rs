//! Visibility rules: tombstones and TTL expiry, evaluated lazily at read time

use crate::core::temporal::Timestamp;
use crate::core::version::{Version, VersionKind};

/// How a field looks to a query at a given timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility<'a> {
    /// The field holds this value
    Visible(&'a str),
    /// The governing version's TTL has lapsed
    Expired,
    /// The governing version is a tombstone
    Deleted,
    /// No version exists at or before the query timestamp
    Missing,
}

impl<'a> Visibility<'a> {
    /// The observable value, collapsing every absent state to `None`
    pub fn value(self) -> Option<&'a str> {
        match self {
            Visibility::Visible(v) => Some(v),
            Visibility::Expired | Visibility::Deleted | Visibility::Missing => None,
        }
    }

    pub fn is_visible(self) -> bool {
        matches!(self, Visibility::Visible(_))
    }
}

/// Classify the floor version of a field as seen from `ts`.
///
/// Expiry never falls back to an older version: once the governing write has
/// lapsed, the field stays absent until a later write.
pub fn resolve(version: Option<&Version>, ts: Timestamp) -> Visibility<'_> {
    let Some(version) = version else {
        return Visibility::Missing;
    };
    match &version.kind {
        VersionKind::Tombstone => Visibility::Deleted,
        VersionKind::Value(_) if version.is_expired_at(ts) => Visibility::Expired,
        VersionKind::Value(v) => Visibility::Visible(v),
    }
}

/// The value visible at `ts`, if any
pub fn visible(version: Option<&Version>, ts: Timestamp) -> Option<&str> {
    resolve(version, ts).value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::version::Sequence;

    fn ttl_version(value: &str, at: i64, expires: i64) -> Version {
        Version::value(
            Timestamp::new(at),
            Sequence(1),
            value.to_string(),
            Some(Timestamp::new(expires)),
        )
    }

    #[test]
    fn test_missing() {
        assert_eq!(resolve(None, Timestamp::new(5)), Visibility::Missing);
        assert_eq!(visible(None, Timestamp::new(5)), None);
    }

    #[test]
    fn test_tombstone_is_deleted() {
        let t = Version::tombstone(Timestamp::new(100), Sequence(1));
        assert_eq!(resolve(Some(&t), Timestamp::new(100)), Visibility::Deleted);
        assert_eq!(visible(Some(&t), Timestamp::new(100)), None);
    }

    #[test]
    fn test_ttl_boundary() {
        let v = ttl_version("x", 100, 150);
        assert_eq!(resolve(Some(&v), Timestamp::new(149)), Visibility::Visible("x"));
        assert_eq!(resolve(Some(&v), Timestamp::new(150)), Visibility::Expired);
        assert!(!resolve(Some(&v), Timestamp::new(200)).is_visible());
    }

    #[test]
    fn test_zero_ttl_invisible_at_write_time() {
        let v = ttl_version("x", 100, 100);
        assert_eq!(resolve(Some(&v), Timestamp::new(100)), Visibility::Expired);
    }

    #[test]
    fn test_empty_string_is_visible() {
        let v = Version::value(Timestamp::new(1), Sequence(1), String::new(), None);
        assert_eq!(visible(Some(&v), Timestamp::new(1)), Some(""));
    }
}
