use serde::{Deserialize, Serialize};

use crate::models::{OrderItem, PaymentDetails, ShippingDetails};

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderItem>,
    pub shipping: ShippingDetails,
    pub payment: PaymentDetails,
    pub coupon: String,
    pub discount: f64,
    pub total: f64,
}

/// Response of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order_id: String,
}
