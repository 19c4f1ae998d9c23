use serde::{Deserialize, Serialize};

use crate::models::{CartLine, ShippingDetails};

/// Raw shipping form input, validated by [`crate::validate::validate_shipping`].
#[derive(Debug, Clone, Default)]
pub struct ShippingForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// Raw payment form input, validated by [`crate::validate::validate_payment`].
#[derive(Debug, Clone, Default)]
pub struct PaymentForm {
    pub payment_method: String,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
}

/// Transient navigation state carried from Checkout to Payment. Never
/// persisted; if it is missing, the payment screen redirects back to Cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub shipping: ShippingDetails,
    pub cart: Vec<CartLine>,
    pub discount: f64,
    pub coupon: String,
}

impl OrderDraft {
    pub fn subtotal(&self) -> i64 {
        self.cart.iter().map(CartLine::line_total).sum()
    }

    /// Tax applies to the pre-discount subtotal; the discount then reduces
    /// the tax-inclusive amount.
    pub fn total(&self, tax_rate: f64) -> f64 {
        self.subtotal() as f64 * (1.0 + tax_rate) * (1.0 - self.discount)
    }
}
