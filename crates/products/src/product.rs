use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{Entity, ProductId};

/// Product lifecycle state.
///
/// Derived solely from `deleted_at`; it is never stored separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductState {
    Active,
    Deleted,
}

/// The caller-supplied, mutable part of a product.
///
/// Create and update both take a full `ProductDetails`: an update is a full
/// replace, not a patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub name: String,
    pub description: Option<String>,
    /// Non-negative by convention; not enforced here.
    pub price: f64,
    pub quantity: u64,
    /// Filter key. Matched exactly and case-sensitively.
    pub category: String,
}

impl ProductDetails {
    pub fn new(
        name: impl Into<String>,
        price: f64,
        quantity: u64,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            quantity,
            category: category.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Entity: Product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    details: ProductDetails,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    /// A freshly created, active product.
    pub fn new(id: ProductId, details: ProductDetails, now: DateTime<Utc>) -> Self {
        Self {
            id,
            details,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Rebuild a product from its stored columns.
    pub fn rehydrate(
        id: ProductId,
        details: ProductDetails,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            details,
            created_at,
            updated_at,
            deleted_at,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn details(&self) -> &ProductDetails {
        &self.details
    }

    pub fn name(&self) -> &str {
        &self.details.name
    }

    pub fn description(&self) -> Option<&str> {
        self.details.description.as_deref()
    }

    pub fn price(&self) -> f64 {
        self.details.price
    }

    pub fn quantity(&self) -> u64 {
        self.details.quantity
    }

    pub fn category(&self) -> &str {
        &self.details.category
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn state(&self) -> ProductState {
        match self.deleted_at {
            None => ProductState::Active,
            Some(_) => ProductState::Deleted,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.state() == ProductState::Deleted
    }

    /// Overwrite all mutable fields and refresh `updated_at`.
    ///
    /// Allowed on deleted products too; the record stays deleted.
    pub fn apply_details(&mut self, details: ProductDetails, now: DateTime<Utc>) {
        self.details = details;
        self.updated_at = now;
    }

    /// Active -> Deleted. On an already-deleted product only the timestamp moves.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        self.deleted_at = Some(now);
    }

    /// Deleted -> Active. No-op on an active product.
    pub fn restore(&mut self) {
        self.deleted_at = None;
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn widget() -> ProductDetails {
        ProductDetails::new("Widget", 9.99, 10, "tools").with_description("A widget")
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn new_product_is_active_with_matching_timestamps() {
        let p = Product::new(ProductId::FIRST, widget(), t0());

        assert_eq!(p.id(), ProductId::FIRST);
        assert_eq!(p.name(), "Widget");
        assert_eq!(p.description(), Some("A widget"));
        assert_eq!(p.price(), 9.99);
        assert_eq!(p.quantity(), 10);
        assert_eq!(p.category(), "tools");
        assert_eq!(p.state(), ProductState::Active);
        assert_eq!(p.created_at(), p.updated_at());
        assert!(p.deleted_at().is_none());
    }

    #[test]
    fn apply_details_replaces_every_mutable_field() {
        let mut p = Product::new(ProductId::FIRST, widget(), t0());
        let later = t0() + Duration::minutes(5);

        p.apply_details(ProductDetails::new("Widget Pro", 19.99, 5, "tools"), later);

        assert_eq!(p.name(), "Widget Pro");
        assert_eq!(p.description(), None);
        assert_eq!(p.price(), 19.99);
        assert_eq!(p.quantity(), 5);
        assert_eq!(p.id(), ProductId::FIRST);
        assert_eq!(p.created_at(), t0());
        assert_eq!(p.updated_at(), later);
    }

    #[test]
    fn soft_delete_then_restore_round_trips_state() {
        let mut p = Product::new(ProductId::FIRST, widget(), t0());

        p.soft_delete(t0() + Duration::seconds(1));
        assert!(p.is_deleted());
        assert_eq!(p.state(), ProductState::Deleted);

        p.restore();
        assert_eq!(p.state(), ProductState::Active);
        assert!(p.deleted_at().is_none());
    }

    #[test]
    fn repeated_soft_delete_only_moves_the_timestamp() {
        let mut p = Product::new(ProductId::FIRST, widget(), t0());
        let first = t0() + Duration::seconds(1);
        let second = t0() + Duration::seconds(2);

        p.soft_delete(first);
        p.soft_delete(second);

        assert!(p.is_deleted());
        assert_eq!(p.deleted_at(), Some(second));
        assert_eq!(p.updated_at(), t0());
    }

    #[test]
    fn restore_on_active_product_is_a_no_op() {
        let mut p = Product::new(ProductId::FIRST, widget(), t0());
        let before = p.clone();

        p.restore();
        p.restore();

        assert_eq!(p, before);
    }

    #[test]
    fn updating_a_deleted_product_keeps_it_deleted() {
        let mut p = Product::new(ProductId::FIRST, widget(), t0());
        p.soft_delete(t0());

        p.apply_details(ProductDetails::new("Renamed", 1.0, 1, "misc"), t0());

        assert!(p.is_deleted());
        assert_eq!(p.name(), "Renamed");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Delete,
            Restore,
            Update(String, u64),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                Just(Op::Delete),
                Just(Op::Restore),
                ("[A-Za-z][A-Za-z0-9 ]{0,30}", 0u64..10_000).prop_map(|(n, q)| Op::Update(n, q)),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: state is decided by the last delete/restore, and identity never moves.
            #[test]
            fn lifecycle_follows_last_transition(ops in proptest::collection::vec(op(), 0..40)) {
                let mut p = Product::new(ProductId::FIRST, widget(), t0());
                let mut expect_deleted = false;

                for (i, op) in ops.iter().enumerate() {
                    let now = t0() + Duration::seconds(i as i64 + 1);
                    match op {
                        Op::Delete => {
                            p.soft_delete(now);
                            expect_deleted = true;
                        }
                        Op::Restore => {
                            p.restore();
                            expect_deleted = false;
                        }
                        Op::Update(name, qty) => {
                            p.apply_details(ProductDetails::new(name.clone(), 1.0, *qty, "tools"), now);
                        }
                    }

                    prop_assert_eq!(p.is_deleted(), expect_deleted);
                    prop_assert_eq!(p.is_deleted(), p.deleted_at().is_some());
                    prop_assert_eq!(p.id(), ProductId::FIRST);
                    prop_assert_eq!(p.created_at(), t0());
                }
            }
        }
    }
}
