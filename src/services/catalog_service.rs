//! Read-only product browsing over the in-memory catalog: substring search,
//! price bounds, sorting and pagination, all applied client-side.

use std::cmp::Ordering;

use crate::models::Product;
use crate::params::{ProductQuery, ProductSortBy, SortOrder};
use crate::response::{Meta, Page};
use crate::store::{KvStore, KvStoreExt, PRODUCTS_KEY};

pub struct CatalogService {
    products: Vec<Product>,
}

impl CatalogService {
    /// Hydrates from the `products` key; absent or malformed data means an
    /// empty catalog.
    pub fn load(store: &dyn KvStore) -> Self {
        let products = match store.read::<Vec<Product>>(PRODUCTS_KEY) {
            Ok(Some(products)) => products,
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to load catalog");
                Vec::new()
            }
        };
        Self { products }
    }

    pub fn from_products(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    pub fn list(&self, query: &ProductQuery) -> Page<Product> {
        let (page, per_page, offset) = query.pagination.normalize();
        let needle = query
            .q
            .as_deref()
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        let mut matches: Vec<&Product> = self
            .products
            .iter()
            .filter(|product| {
                if let Some(needle) = &needle {
                    let hit = product.name.to_lowercase().contains(needle)
                        || product
                            .description
                            .as_deref()
                            .is_some_and(|d| d.to_lowercase().contains(needle));
                    if !hit {
                        return false;
                    }
                }
                if query.min_price.is_some_and(|min| product.price < min) {
                    return false;
                }
                if query.max_price.is_some_and(|max| product.price > max) {
                    return false;
                }
                true
            })
            .collect();

        let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
        let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
        matches.sort_by(|a, b| {
            let ordering: Ordering = match sort_by {
                ProductSortBy::CreatedAt => a.created_at.cmp(&b.created_at),
                ProductSortBy::Price => a.price.cmp(&b.price),
                ProductSortBy::Name => a.name.cmp(&b.name),
            };
            match sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = matches.len() as i64;
        let items = matches
            .into_iter()
            .skip(offset as usize)
            .take(per_page as usize)
            .cloned()
            .collect();

        Page {
            items,
            meta: Meta::new(page, per_page, total),
        }
    }
}
