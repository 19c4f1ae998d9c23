use std::sync::Arc;

use chrono::Utc;
use pickle_storefront::{
    config::QuantityPolicy,
    models::{CartLine, Product},
    services::cart_service::{CartChange, CartService},
    store::{CART_KEY, FileStore, KvStore, MemoryStore},
};

fn product(id: &str, price: i64, stock: u32) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Pickle {id}"),
        description: None,
        image: format!("/images/{id}.jpg"),
        category: "Dill".to_string(),
        price,
        stock,
        created_at: Utc::now(),
    }
}

fn cart_over(store: Arc<dyn KvStore>) -> CartService {
    CartService::open(store, 0.08, QuantityPolicy::Clamp)
}

fn memory_cart() -> CartService {
    cart_over(Arc::new(MemoryStore::new()))
}

#[test]
fn adding_same_product_twice_merges_lines() -> anyhow::Result<()> {
    let mut cart = memory_cart();
    let dill = product("dill", 899, 10);

    assert_eq!(cart.add_item(&dill, 2)?, CartChange::Applied);
    assert_eq!(cart.add_item(&dill, 3)?, CartChange::Applied);

    assert_eq!(cart.line_count(), 1);
    assert_eq!(cart.lines()[0].quantity, 5);
    Ok(())
}

#[test]
fn over_limit_add_is_silently_clamped() -> anyhow::Result<()> {
    let mut cart = memory_cart();
    let dill = product("dill", 899, 3);

    assert_eq!(cart.add_item(&dill, 5)?, CartChange::Clamped { limit: 3 });
    assert_eq!(cart.lines()[0].quantity, 3);

    // Incrementing past the limit stays pinned there.
    assert_eq!(cart.add_item(&dill, 1)?, CartChange::Clamped { limit: 3 });
    assert_eq!(cart.lines()[0].quantity, 3);
    Ok(())
}

#[test]
fn reject_policy_leaves_the_line_unchanged() -> anyhow::Result<()> {
    let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
    let mut cart = CartService::open(store, 0.08, QuantityPolicy::Reject);
    let dill = product("dill", 899, 3);

    assert_eq!(cart.add_item(&dill, 2)?, CartChange::Applied);
    assert_eq!(cart.add_item(&dill, 5)?, CartChange::Rejected { limit: 3 });
    assert_eq!(cart.lines()[0].quantity, 2);

    assert_eq!(cart.set_quantity("dill", 9)?, CartChange::Rejected { limit: 3 });
    assert_eq!(cart.lines()[0].quantity, 2);

    // A brand-new over-limit line is refused outright.
    let gherkin = product("gherkin", 699, 2);
    assert_eq!(cart.add_item(&gherkin, 5)?, CartChange::Rejected { limit: 2 });
    assert_eq!(cart.line_count(), 1);
    Ok(())
}

#[test]
fn out_of_stock_product_cannot_be_added() -> anyhow::Result<()> {
    let mut cart = memory_cart();
    let gone = product("gone", 500, 0);
    assert_eq!(cart.add_item(&gone, 1)?, CartChange::Rejected { limit: 0 });
    assert!(cart.is_empty());
    Ok(())
}

#[test]
fn zero_quantity_add_counts_as_one() -> anyhow::Result<()> {
    let mut cart = memory_cart();
    cart.add_item(&product("dill", 899, 5), 0)?;
    assert_eq!(cart.lines()[0].quantity, 1);
    Ok(())
}

#[test]
fn set_quantity_zero_removes_the_line() -> anyhow::Result<()> {
    let mut cart = memory_cart();
    cart.add_item(&product("dill", 899, 5), 2)?;

    assert_eq!(cart.set_quantity("dill", 0)?, CartChange::Removed);
    assert_eq!(cart.line_count(), 0);
    Ok(())
}

#[test]
fn set_quantity_never_leaves_the_valid_range() -> anyhow::Result<()> {
    let mut cart = memory_cart();
    cart.add_item(&product("dill", 899, 4), 1)?;

    assert_eq!(cart.set_quantity("dill", 99)?, CartChange::Clamped { limit: 4 });
    assert_eq!(cart.lines()[0].quantity, 4);

    assert_eq!(cart.set_quantity("dill", 2)?, CartChange::Applied);
    assert_eq!(cart.lines()[0].quantity, 2);
    Ok(())
}

#[test]
fn unknown_ids_are_no_ops() -> anyhow::Result<()> {
    let mut cart = memory_cart();
    cart.add_item(&product("dill", 899, 5), 1)?;

    assert_eq!(cart.set_quantity("nope", 3)?, CartChange::Ignored);
    assert_eq!(cart.remove_item("nope")?, CartChange::Ignored);
    assert_eq!(cart.line_count(), 1);
    Ok(())
}

#[test]
fn subtotal_is_the_exact_line_sum() -> anyhow::Result<()> {
    let mut cart = memory_cart();
    cart.add_item(&product("a", 899, 10), 3)?;
    cart.add_item(&product("b", 1249, 10), 2)?;
    cart.add_item(&product("c", 501, 10), 7)?;

    assert_eq!(cart.subtotal(), 899 * 3 + 1249 * 2 + 501 * 7);
    Ok(())
}

#[test]
fn coupon_lookup_is_case_insensitive() {
    let mut cart = memory_cart();
    assert_eq!(cart.apply_coupon("picklE10"), Some(0.10));
    assert_eq!(cart.discount(), 0.10);
    assert_eq!(cart.coupon_code(), Some("PICKLE10"));
}

#[test]
fn bogus_coupon_resets_the_discount() {
    let mut cart = memory_cart();
    assert_eq!(cart.apply_coupon("PICKLE20"), Some(0.20));
    assert_eq!(cart.discount(), 0.20);

    assert_eq!(cart.apply_coupon("BOGUS"), None);
    assert_eq!(cart.discount(), 0.0);
    assert_eq!(cart.coupon_code(), None);
}

#[test]
fn total_applies_tax_before_the_discount() -> anyhow::Result<()> {
    let mut cart = memory_cart();
    // Subtotal of exactly $100.00.
    cart.add_item(&product("dill", 10_000, 5), 1)?;
    assert_eq!(cart.apply_coupon("PICKLE10"), Some(0.10));

    // 100 * 1.08 * 0.90 = 97.20, the discount reduces tax paid too.
    let total = cart.total_with_rate(0.08);
    assert!((total - 9720.0).abs() < 1e-6, "got {total}");
    Ok(())
}

#[test]
fn persisted_cart_round_trips_through_the_store() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let expected: Vec<CartLine>;
    {
        let store: Arc<dyn KvStore> = Arc::new(FileStore::open(dir.path())?);
        let mut cart = cart_over(store);
        cart.add_item(&product("a", 899, 10), 2)?;
        cart.add_item(&product("b", 1249, 10), 1)?;
        cart.add_item(&product("c", 501, 10), 4)?;
        expected = cart.lines().to_vec();
    }

    let store: Arc<dyn KvStore> = Arc::new(FileStore::open(dir.path())?);
    let cart = cart_over(store);
    assert_eq!(cart.lines(), expected.as_slice());
    Ok(())
}

#[test]
fn malformed_stored_cart_starts_empty() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    store.put_raw(CART_KEY, "{{definitely not json".to_string())?;
    let cart = cart_over(store);
    assert!(cart.is_empty());
    Ok(())
}

#[test]
fn clear_empties_cart_and_durable_store() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let mut cart = cart_over(store.clone());
    cart.add_item(&product("dill", 899, 5), 2)?;
    assert_eq!(cart.apply_coupon("PICKLE10"), Some(0.10));

    cart.clear()?;

    assert_eq!(cart.line_count(), 0);
    assert_eq!(cart.discount(), 0.0);
    assert_eq!(store.get_raw(CART_KEY)?, None);
    Ok(())
}

#[test]
fn reload_adopts_the_last_write() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let mut first = cart_over(store.clone());
    let mut second = cart_over(store.clone());

    first.add_item(&product("dill", 899, 5), 2)?;
    // No automatic cross-instance sync.
    assert!(second.is_empty());

    second.reload()?;
    assert_eq!(second.line_count(), 1);
    assert_eq!(second.lines(), first.lines());
    Ok(())
}

#[test]
fn subscribers_see_every_mutation() -> anyhow::Result<()> {
    let mut cart = memory_cart();
    let rx = cart.subscribe();

    cart.add_item(&product("dill", 899, 5), 2)?;
    assert_eq!(rx.borrow().line_count, 1);
    assert_eq!(rx.borrow().subtotal, 899 * 2);

    cart.clear()?;
    assert_eq!(rx.borrow().line_count, 0);
    Ok(())
}
