//! Repository example for litorm
//!
//! Run with: cargo run --example repository -p litorm
//!
//! Set DB_HOST, DB_PORT, DB_USER, DB_PASSWORD and DB_NAME in a .env file or
//! the environment. `RUST_LOG=litorm.sql=debug` prints every statement.

use std::sync::Arc;

use litorm::{
    Adapter, DbConfig, JoinType, Model, Modificator, OrderParam, OrmResult, PostgresAdapter,
    Recorder, Repository, values,
};

#[derive(Debug, Model)]
struct Product {
    #[orm(key)]
    id: i64,
    name: String,
    price: i32,
    category: Option<String>,
    in_stock: bool,
}

#[tokio::main]
async fn main() -> OrmResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let db = Arc::new(PostgresAdapter::postgres(DbConfig::from_env("DB")?));

    db.exec(
        "CREATE TABLE IF NOT EXISTS categories (
            id BIGSERIAL PRIMARY KEY,
            slug TEXT UNIQUE NOT NULL,
            title TEXT NOT NULL
        )",
    )
    .await?;
    db.exec(
        "CREATE TABLE IF NOT EXISTS products (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            price INTEGER NOT NULL,
            category TEXT,
            in_stock BOOLEAN NOT NULL DEFAULT true
        )",
    )
    .await?;
    db.exec("DELETE FROM products").await?;

    let mut products = Repository::<Product, _>::new(Arc::clone(&db), "products").auto_id("id");

    println!("=== create ===");
    for (name, price, category) in [("Laptop", 999, "tech"), ("Mouse", 25, "tech"), ("Desk", 300, "home")] {
        let product = products
            .create(values! { "name" => name, "price" => price, "category" => category })
            .await?;
        println!("{product:?}");
    }

    println!("=== find ===");
    let cheap = products
        .find(
            &values! { "price<" => 500, "category" => vec!["tech", "home"] },
            &Modificator::new()
                .order(OrderParam::asc("price"))
                .limit(10),
        )
        .await?;
    for product in &cheap {
        println!("{} {}", product.name, product.price);
    }

    println!("=== update ===");
    let updated = products
        .update(&values! { "name" => "Mouse" }, &values! { "in_stock" => false })
        .await?;
    println!("{updated:?}");

    println!("=== upsert ===");
    let mut qb = db.builder();
    qb.save("categories")
        .values(values! { "slug" => "tech", "title" => "Technology" })
        .on_conflict_fields(["slug"])
        .on_conflict_action("update");
    db.exec(&qb.build()).await?;

    println!("=== join ===");
    products.join("categories", "slug", "category", JoinType::Left, &["title"]);
    let joined = products
        .find(&values! {}, &Modificator::new().fields(["name", "title"]))
        .await?;
    println!("{joined:?}");

    println!("=== delete ===");
    let deleted = products.delete(&values! { "in_stock" => false }).await?;
    println!("deleted {} row(s)", deleted.rows_affected);

    Ok(())
}
