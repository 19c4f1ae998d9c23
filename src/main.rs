use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pickle_storefront::{
    config::AppConfig,
    dto::auth::LoginRequest,
    dto::checkout::{PaymentForm, ShippingForm},
    flow::{CheckoutFlow, CheckoutGate, PaymentOutcome, ShippingOutcome},
    format::format_price,
    params::ProductQuery,
    state::AppState,
};

/// Scripted shopper journey against the configured store/backend: browse,
/// fill the cart, apply a coupon, check out, pay, confirm.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pickle_storefront=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let mut state = AppState::from_config(&config)?;

    if state.catalog.is_empty() {
        tracing::warn!("catalog is empty; run the seed binary first");
        return Ok(());
    }

    let page = state.catalog.list(&ProductQuery::default());
    for product in &page.items {
        tracing::info!(
            id = %product.id,
            name = %product.name,
            price = %format_price(product.price as f64),
            "product"
        );
    }

    if let Some(first) = page.items.first() {
        state.cart.add_item(first, 2)?;
    }
    if let Some(second) = page.items.get(1) {
        state.cart.add_item(second, 1)?;
    }
    if let Some(fraction) = state.cart.apply_coupon("pickle10") {
        tracing::info!(fraction, "coupon accepted");
    }
    tracing::info!(
        lines = state.cart.line_count(),
        subtotal = %format_price(state.cart.subtotal() as f64),
        total = %format_price(state.cart.total()),
        "cart ready"
    );

    let session = state
        .session
        .login(
            state.backend.as_ref(),
            LoginRequest {
                email: "shopper@example.com".into(),
                password: "hunter2".into(),
            },
        )
        .await?;
    tracing::info!(user = %session.user.email, "signed in");

    let mut flow = CheckoutFlow::new();
    match flow.proceed_to_checkout(&state.cart, &state.session) {
        CheckoutGate::Proceed => {}
        gate => {
            tracing::warn!(?gate, "cannot proceed to checkout");
            return Ok(());
        }
    }

    let shipping = ShippingForm {
        name: "Pat Shopper".into(),
        email: "shopper@example.com".into(),
        phone: "555-0101".into(),
        address: "1 Brine Way".into(),
        city: "Portland".into(),
        state: "OR".into(),
        zip_code: "97201".into(),
        country: "US".into(),
    };
    match flow.submit_shipping(&state.cart, &shipping) {
        ShippingOutcome::Continue => {}
        other => {
            tracing::warn!(?other, "shipping step did not continue");
            return Ok(());
        }
    }

    let payment = PaymentForm {
        payment_method: "credit_card".into(),
        card_number: "4242 4242 4242 4242".into(),
        expiry_date: "12/29".into(),
        cvv: "123".into(),
    };
    let backend = Arc::clone(&state.backend);
    match flow
        .submit_payment(&mut state.cart, backend.as_ref(), &payment)
        .await
    {
        PaymentOutcome::Placed { order_id } => match backend.fetch_order(&order_id).await? {
            Some(order) => tracing::info!(
                invoice = %order.invoice_number,
                total = %format_price(order.total),
                "order confirmed"
            ),
            None => tracing::warn!(order_id = %order_id, "placed order not found"),
        },
        other => tracing::warn!(?other, "payment did not complete"),
    }

    Ok(())
}
