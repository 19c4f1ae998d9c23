use chrono::{Duration, Utc};

use pickle_storefront::{
    config::AppConfig,
    models::Product,
    store::{FileStore, KvStoreExt, PRODUCTS_KEY},
};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let store = FileStore::open(&config.data_dir)?;
    let products = catalog();
    store.write(PRODUCTS_KEY, &products)?;

    println!(
        "Seed completed. {} products written to {}",
        products.len(),
        config.data_dir.display()
    );
    Ok(())
}

fn catalog() -> Vec<Product> {
    vec![
        pickle("dill-classic", "Classic Dill Pickles", "Dill", 899, 24, 30,
            "Crisp cucumbers in a garlic-dill brine."),
        pickle("bread-butter", "Bread & Butter Chips", "Sweet", 749, 18, 21,
            "Sweet and tangy chips, sliced thin."),
        pickle("spicy-habanero", "Spicy Habanero Spears", "Spicy", 999, 12, 14,
            "Spears with a serious habanero kick."),
        pickle("garlic-whole", "Whole Garlic Pickles", "Dill", 949, 16, 10,
            "Whole pickles packed with roasted garlic."),
        pickle("kosher-spear", "Kosher Spears", "Dill", 849, 30, 7,
            "Deli-style kosher spears."),
        pickle("sweet-gherkin", "Sweet Gherkins", "Sweet", 699, 20, 3,
            "Petite gherkins in a sweet brine."),
    ]
}

fn pickle(
    id: &str,
    name: &str,
    category: &str,
    price: i64,
    stock: u32,
    days_ago: i64,
    description: &str,
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        image: format!("/images/{id}.jpg"),
        category: category.to_string(),
        price,
        stock,
        created_at: Utc::now() - Duration::days(days_ago),
    }
}
