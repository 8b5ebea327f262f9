use serde::Deserialize;

use catalog_products::{Product, ProductDetails};

// -------------------------
// Request DTOs
// -------------------------

/// Body of create and update requests. Update is a full replace, so the
/// same shape serves both.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub quantity: u64,
    pub category: String,
}

impl From<ProductRequest> for ProductDetails {
    fn from(req: ProductRequest) -> Self {
        ProductDetails {
            name: req.name,
            description: req.description,
            price: req.price,
            quantity: req.quantity,
            category: req.category,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn product_to_json(p: &Product) -> serde_json::Value {
    serde_json::json!({
        "id": p.id_typed(),
        "name": p.name(),
        "description": p.description(),
        "price": p.price(),
        "quantity": p.quantity(),
        "category": p.category(),
        "deleted": p.is_deleted(),
        "created_at": p.created_at(),
        "updated_at": p.updated_at(),
        "deleted_at": p.deleted_at(),
    })
}

pub fn products_to_json(products: &[Product]) -> serde_json::Value {
    let items = products.iter().map(product_to_json).collect::<Vec<_>>();
    serde_json::json!({ "items": items })
}
