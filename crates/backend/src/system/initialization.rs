use anyhow::{Context, Result};
use chrono::Utc;
use contracts::domain::a001_product::aggregate::Product;
use contracts::domain::a002_address::aggregate::AddressDto;
use contracts::system::users::User;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

use crate::domain::{a001_product, a002_address};
use crate::shared::config::Config;
use crate::system::auth::jwt;
use crate::system::users::repository;

struct DemoProduct {
    name: &'static str,
    slug: &'static str,
    price_cents: i64,
    stock: i32,
    images: &'static [&'static str],
}

const DEMO_PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        name: "Ceramic Mug",
        slug: "ceramic-mug",
        price_cents: 1250,
        stock: 25,
        images: &["/images/ceramic-mug.jpg", "/images/ceramic-mug-side.jpg"],
    },
    DemoProduct {
        name: "Cotton T-Shirt",
        slug: "cotton-t-shirt",
        price_cents: 1999,
        stock: 10,
        images: &["/images/cotton-t-shirt.jpg"],
    },
    DemoProduct {
        name: "Enamel Pin",
        slug: "enamel-pin",
        price_cents: 450,
        stock: 1,
        images: &["/images/enamel-pin.jpg"],
    },
];

fn demo_user(email: &str, name: &str, is_admin: bool) -> User {
    User {
        id: uuid::Uuid::new_v4().to_string(),
        email: email.to_string(),
        name: Some(name.to_string()),
        is_admin,
        created_at: Utc::now().to_rfc3339(),
    }
}

/// Fill an empty database with demo accounts, products and an address.
///
/// Does nothing unless `[seed] demo_data` is on and `sys_users` is empty.
/// Returns whether anything was written.
pub async fn seed_demo_data(db: &DatabaseConnection, config: &Config) -> Result<bool> {
    if !config.seed.demo_data {
        return Ok(false);
    }
    if repository::count_users(db).await? > 0 {
        tracing::info!("Users already exist, skipping demo data");
        return Ok(false);
    }

    tracing::info!("Seeding demo data...");

    let admin = demo_user("admin@example.com", "Shop Admin", true);
    let customer = demo_user("customer@example.com", "Demo Customer", false);
    repository::insert(db, &admin).await?;
    repository::insert(db, &customer).await?;

    for demo in DEMO_PRODUCTS {
        let product = Product::new_for_insert(
            demo.name.to_string(),
            demo.slug.to_string(),
            Decimal::new(demo.price_cents, 2),
            demo.stock,
        );
        a001_product::repository::insert(db, &product)
            .await
            .with_context(|| format!("Failed to seed product {}", demo.slug))?;
        for (sort_order, url) in demo.images.iter().enumerate() {
            a001_product::repository::insert_image(db, &product.id, url, sort_order as i32).await?;
        }
        tracing::info!("  product {} ({}), stock {}", demo.name, product.id, demo.stock);
    }

    let address = AddressDto {
        recipient_name: "Demo Customer".into(),
        phone: Some("+1 555 0100".into()),
        address_line1: "1 Market Street".into(),
        address_line2: None,
        city: "Springfield".into(),
        state: "IL".into(),
        postal_code: "62701".into(),
        country: "US".into(),
        is_default: true,
    };
    let address = a002_address::service::create(db, &customer.id, address).await?;

    let hours = config.auth.access_token_hours;
    let admin_token = jwt::generate_access_token(&config.auth.jwt_secret, &admin, hours)?;
    let customer_token = jwt::generate_access_token(&config.auth.jwt_secret, &customer, hours)?;

    tracing::warn!("Demo data created (valid for {} hours):", hours);
    tracing::warn!("  admin    {} token: {}", admin.email, admin_token);
    tracing::warn!("  customer {} token: {}", customer.email, customer_token);
    tracing::warn!("  customer default address id: {}", address.id);

    Ok(true)
}
