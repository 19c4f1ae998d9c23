//! The cart & pricing engine.
//!
//! All operations are total over the in-memory state: unknown ids are no-ops
//! and out-of-range quantities are clamped (or refused, under
//! [`QuantityPolicy::Reject`]). The only `Err` a mutation can produce is a
//! failed durable write. Every mutation synchronously rewrites the `cart` key
//! so a reload reflects the change.

use std::sync::Arc;

use tokio::sync::watch;

use crate::config::QuantityPolicy;
use crate::coupon;
use crate::error::AppResult;
use crate::models::{CartLine, Product};
use crate::store::{CART_KEY, KvStore, KvStoreExt};

/// Snapshot published to subscribers after every mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub line_count: usize,
    pub subtotal: i64,
}

/// What a mutation did. Business-rule refusals are reported, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    Applied,
    /// The request exceeded the line's stock limit and was capped there.
    Clamped { limit: u32 },
    /// Reject policy only: the request exceeded the limit and nothing changed.
    Rejected { limit: u32 },
    Removed,
    /// Unknown product id; nothing changed.
    Ignored,
}

pub struct CartService {
    store: Arc<dyn KvStore>,
    lines: Vec<CartLine>,
    coupon_code: Option<String>,
    discount: f64,
    tax_rate: f64,
    policy: QuantityPolicy,
    changes: watch::Sender<CartSummary>,
}

impl CartService {
    /// Rehydrates the cart from the durable store. Absent or malformed data
    /// starts an empty cart; coupon state always starts reset, it is never
    /// persisted.
    pub fn open(store: Arc<dyn KvStore>, tax_rate: f64, policy: QuantityPolicy) -> Self {
        let lines = match store.read::<Vec<CartLine>>(CART_KEY) {
            Ok(Some(lines)) => lines,
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to load cart, starting empty");
                Vec::new()
            }
        };
        let (changes, _) = watch::channel(summarize(&lines));
        Self {
            store,
            lines,
            coupon_code: None,
            discount: 0.0,
            tax_rate,
            policy,
            changes,
        }
    }

    /// Merge-or-append. An existing line for the product has its quantity
    /// incremented; otherwise a new line snapshots the product's price, copy
    /// and stock limit. Quantities land in `[1, stock_limit]`.
    pub fn add_item(&mut self, product: &Product, quantity: u32) -> AppResult<CartChange> {
        if product.stock == 0 {
            tracing::debug!(product_id = %product.id, "ignoring add of out-of-stock product");
            return Ok(CartChange::Rejected { limit: 0 });
        }
        let quantity = quantity.max(1);
        let policy = self.policy;

        let change = if let Some(line) = self.find_mut(&product.id) {
            let requested = line.quantity.saturating_add(quantity);
            apply_quantity(line, requested, policy)
        } else {
            let limit = product.stock;
            let clamped = quantity.min(limit);
            let change = if clamped < quantity {
                match policy {
                    QuantityPolicy::Clamp => CartChange::Clamped { limit },
                    QuantityPolicy::Reject => return Ok(CartChange::Rejected { limit }),
                }
            } else {
                CartChange::Applied
            };
            self.lines.push(CartLine {
                product_id: product.id.clone(),
                name: product.name.clone(),
                image: product.image.clone(),
                category: product.category.clone(),
                unit_price: product.price,
                quantity: clamped,
                stock_limit: limit,
            });
            change
        };

        if matches!(change, CartChange::Rejected { .. }) {
            return Ok(change);
        }
        self.persist()?;
        tracing::info!(product_id = %product.id, ?change, "cart_update");
        Ok(change)
    }

    /// No-op for ids not in the cart.
    pub fn remove_item(&mut self, product_id: &str) -> AppResult<CartChange> {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        if self.lines.len() == before {
            return Ok(CartChange::Ignored);
        }
        self.persist()?;
        tracing::info!(product_id, "cart_remove");
        Ok(CartChange::Removed)
    }

    /// Quantity 0 removes the line; a line never sits at quantity 0. Unknown
    /// ids are no-ops.
    pub fn set_quantity(&mut self, product_id: &str, quantity: u32) -> AppResult<CartChange> {
        if quantity < 1 {
            return self.remove_item(product_id);
        }
        let policy = self.policy;
        let Some(line) = self.find_mut(product_id) else {
            return Ok(CartChange::Ignored);
        };
        let change = apply_quantity(line, quantity, policy);
        if matches!(change, CartChange::Rejected { .. }) {
            return Ok(change);
        }
        self.persist()?;
        tracing::info!(product_id, quantity, ?change, "cart_update");
        Ok(change)
    }

    /// Empties the cart, resets coupon state and deletes the durable key.
    pub fn clear(&mut self) -> AppResult<()> {
        self.lines.clear();
        self.coupon_code = None;
        self.discount = 0.0;
        self.store.remove(CART_KEY)?;
        self.notify();
        tracing::info!("cart_clear");
        Ok(())
    }

    /// Case-insensitive lookup against the fixed table. A miss resets the
    /// discount to zero and reports failure; a hit returns the fraction.
    pub fn apply_coupon(&mut self, code: &str) -> Option<f64> {
        match coupon::lookup(code) {
            Some(fraction) => {
                self.discount = fraction;
                self.coupon_code = Some(code.trim().to_uppercase());
                tracing::info!(code = %code.trim(), fraction, "coupon_applied");
                Some(fraction)
            }
            None => {
                self.discount = 0.0;
                self.coupon_code = None;
                tracing::info!(code = %code.trim(), "coupon_rejected");
                None
            }
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct lines, not total units.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Exact minor-unit sum; no rounding happens before display formatting.
    pub fn subtotal(&self) -> i64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }

    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon_code.as_deref()
    }

    pub fn tax_rate(&self) -> f64 {
        self.tax_rate
    }

    pub fn total(&self) -> f64 {
        self.total_with_rate(self.tax_rate)
    }

    /// Tax applies to the pre-discount subtotal and the discount then reduces
    /// the tax-inclusive amount, so the coupon reduces tax paid too. Shipping
    /// is always free.
    pub fn total_with_rate(&self, tax_rate: f64) -> f64 {
        self.subtotal() as f64 * (1.0 + tax_rate) * (1.0 - self.discount)
    }

    /// Subscribe to post-mutation snapshots. This is the one notification
    /// mechanism; there is no ambient global state to watch.
    pub fn subscribe(&self) -> watch::Receiver<CartSummary> {
        self.changes.subscribe()
    }

    /// Re-reads the durable key, adopting whatever was last written
    /// (last-writer-wins). Writes from other store handles are not observed
    /// until this is called.
    pub fn reload(&mut self) -> AppResult<()> {
        self.lines = self.store.read(CART_KEY)?.unwrap_or_default();
        self.notify();
        Ok(())
    }

    fn find_mut(&mut self, product_id: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.product_id == product_id)
    }

    fn persist(&self) -> AppResult<()> {
        self.store.write(CART_KEY, &self.lines)?;
        self.notify();
        Ok(())
    }

    fn notify(&self) {
        self.changes.send_replace(summarize(&self.lines));
    }
}

fn summarize(lines: &[CartLine]) -> CartSummary {
    CartSummary {
        lines: lines.to_vec(),
        line_count: lines.len(),
        subtotal: lines.iter().map(CartLine::line_total).sum(),
    }
}

fn apply_quantity(line: &mut CartLine, requested: u32, policy: QuantityPolicy) -> CartChange {
    if requested <= line.stock_limit {
        line.quantity = requested;
        return CartChange::Applied;
    }
    match policy {
        QuantityPolicy::Clamp => {
            line.quantity = line.stock_limit;
            CartChange::Clamped {
                limit: line.stock_limit,
            }
        }
        QuantityPolicy::Reject => CartChange::Rejected {
            limit: line.stock_limit,
        },
    }
}
