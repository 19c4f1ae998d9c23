//! Client-side storefront core for the pickle shop.
//!
//! The crate owns the cart/pricing/coupon engine, its durable key-value
//! persistence, and the Cart -> Checkout -> Payment -> Confirmation handoff.
//! Rendering and the real backend live elsewhere; the backend is consumed
//! through [`services::order_backend::OrderBackend`].

pub mod config;
pub mod coupon;
pub mod dto;
pub mod error;
pub mod flow;
pub mod format;
pub mod models;
pub mod params;
pub mod response;
pub mod services;
pub mod state;
pub mod store;
pub mod validate;
