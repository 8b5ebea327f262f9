//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a product record.
///
/// Issued by the store, monotonically increasing and never reused. Zero is
/// never a valid id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ProductId(u64);

impl ProductId {
    /// Wrap a raw id. Returns `None` for zero.
    pub fn new(raw: u64) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// The next id in issue order.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// The first id a fresh store hands out.
    pub const FIRST: ProductId = ProductId(1);
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<ProductId> for u64 {
    fn from(value: ProductId) -> Self {
        value.0
    }
}

impl TryFrom<u64> for ProductId {
    type Error = DomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        ProductId::new(value).ok_or_else(|| DomainError::invalid_id("ProductId: must be positive"))
    }
}

impl TryFrom<i64> for ProductId {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .ok()
            .and_then(ProductId::new)
            .ok_or_else(|| DomainError::invalid_id(format!("ProductId: {value} is not positive")))
    }
}

impl TryFrom<ProductId> for i64 {
    type Error = DomainError;

    fn try_from(value: ProductId) -> Result<Self, Self::Error> {
        i64::try_from(value.0)
            .map_err(|_| DomainError::invalid_id(format!("ProductId: {} out of range", value.0)))
    }
}

impl FromStr for ProductId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = u64::from_str(s.trim())
            .map_err(|e| DomainError::invalid_id(format!("ProductId: {e}")))?;
        ProductId::new(raw).ok_or_else(|| DomainError::invalid_id("ProductId: must be positive"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_ids() {
        let id: ProductId = "42".parse().unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn rejects_zero_negative_and_garbage() {
        for raw in ["0", "-1", "abc", ""] {
            let err = raw.parse::<ProductId>().unwrap_err();
            assert!(matches!(err, DomainError::InvalidId(_)), "{raw}: {err:?}");
        }
    }

    #[test]
    fn converts_from_storage_integers() {
        assert_eq!(ProductId::try_from(7_i64).unwrap().get(), 7);
        assert!(ProductId::try_from(0_i64).is_err());
        assert!(ProductId::try_from(-3_i64).is_err());
        assert_eq!(i64::try_from(ProductId::FIRST).unwrap(), 1);
    }

    #[test]
    fn ids_are_ordered_by_issue() {
        let first = ProductId::FIRST;
        assert!(first < first.next());
        assert_eq!(first.next().get(), 2);
    }

    #[test]
    fn serializes_as_a_bare_number() {
        let id = ProductId::new(9).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "9");
        let back: ProductId = serde_json::from_str("9").unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<ProductId>("0").is_err());
    }
}
