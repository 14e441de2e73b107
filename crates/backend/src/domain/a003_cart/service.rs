//! Cart store.
//!
//! Every mutation re-checks the live product and stock and returns the
//! refreshed cart. Nothing is reserved: checkout validates again against
//! the stock it actually decrements.

use contracts::domain::a001_product::aggregate::{Product, ProductId};
use contracts::domain::a003_cart::aggregate::{
    AddToCartDto, Cart, CartId, CartItem, CartItemId, CartProductSummary,
};
use contracts::domain::common::AggregateId;
use sea_orm::ConnectionTrait;

use super::repository::{self, cart};
use crate::domain::a001_product::repository as product_repository;
use crate::shared::error::AppError;

/// How many times `add_item` re-reads a line that changed under it
const ADD_ITEM_ATTEMPTS: usize = 5;

fn check_quantity(quantity: i32) -> Result<(), AppError> {
    if quantity < 1 {
        return Err(AppError::Validation("Quantity must be at least 1".into()));
    }
    Ok(())
}

fn check_stock(product: &Product, quantity: i32) -> Result<(), AppError> {
    if quantity > product.stock {
        return Err(AppError::InsufficientStock {
            product_name: product.name.clone(),
            available: product.stock,
        });
    }
    Ok(())
}

/// Cart with every line joined to its live product and primary image
pub(crate) async fn load_cart<C: ConnectionTrait>(db: &C, cart: cart::Model) -> Result<Cart, AppError> {
    let rows = repository::list_items(db, &cart.id).await?;
    let product_ids: Vec<ProductId> = rows
        .iter()
        .filter_map(|row| ProductId::from_string(&row.product_id).ok())
        .collect();
    let products = product_repository::get_many(db, &product_ids).await?;
    let mut images = product_repository::primary_images(db, &product_ids).await?;

    let items = rows
        .into_iter()
        .filter_map(|row| {
            let id = CartItemId::from_string(&row.id).ok()?;
            let product_id = ProductId::from_string(&row.product_id).ok()?;
            let product = products.get(&product_id)?;
            Some(CartItem {
                id,
                product_id,
                quantity: row.quantity,
                product: CartProductSummary {
                    id: product.id,
                    name: product.name.clone(),
                    slug: product.slug.clone(),
                    price: product.price,
                    stock: product.stock,
                    is_active: product.is_purchasable(),
                    image: images.remove(&product_id),
                },
            })
        })
        .collect();

    let id = CartId::from_string(&cart.id)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Cart {} has a malformed id: {}", cart.id, e)))?;

    Ok(Cart {
        id,
        user_id: cart.user_id,
        items,
        created_at: cart.created_at,
        updated_at: cart.updated_at,
    })
}

/// Idempotent: the first call creates an empty cart, later calls return it
pub async fn get_or_create_cart<C: ConnectionTrait>(db: &C, user_id: &str) -> Result<Cart, AppError> {
    let cart = repository::get_or_create_cart(db, user_id).await?;
    load_cart(db, cart).await
}

/// Add `quantity` units, merging into the existing line for the product
pub async fn add_item<C: ConnectionTrait>(db: &C, user_id: &str, dto: AddToCartDto) -> Result<Cart, AppError> {
    check_quantity(dto.quantity)?;

    let product_id = ProductId::from_string(&dto.product_id).map_err(|_| AppError::ProductNotFound)?;
    let product = product_repository::get_by_id(db, &product_id)
        .await?
        .filter(|p| !p.is_deleted())
        .ok_or(AppError::ProductNotFound)?;
    if !product.is_active {
        return Err(AppError::ProductInactive);
    }

    let cart = repository::get_or_create_cart(db, user_id).await?;
    for _ in 0..ADD_ITEM_ATTEMPTS {
        let applied = match repository::find_item_by_product(db, &cart.id, &product_id).await? {
            Some(item) => {
                let new_quantity = item
                    .quantity
                    .checked_add(dto.quantity)
                    .ok_or_else(|| AppError::Validation("Quantity is too large".into()))?;
                check_stock(&product, new_quantity)?;
                repository::replace_item_quantity(db, &item.id, item.quantity, new_quantity).await?
            }
            None => {
                check_stock(&product, dto.quantity)?;
                repository::insert_item_if_absent(db, &cart.id, &product_id, dto.quantity).await?
            }
        };
        if applied {
            repository::touch_cart(db, &cart.id).await?;
            return load_cart(db, cart).await;
        }
    }

    tracing::warn!(
        "Cart {} line for product {} kept changing, add rejected",
        cart.id,
        product_id
    );
    Err(AppError::CartChanged)
}

/// Replace the quantity of one line
pub async fn update_item_quantity<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    item_id: &str,
    quantity: i32,
) -> Result<Cart, AppError> {
    check_quantity(quantity)?;
    let item_id = CartItemId::from_string(item_id).map_err(|_| AppError::CartItemNotFound)?;

    let cart = repository::get_or_create_cart(db, user_id).await?;
    let item = repository::find_item(db, &cart.id, &item_id)
        .await?
        .ok_or(AppError::CartItemNotFound)?;
    let product_id = ProductId::from_string(&item.product_id).map_err(|_| AppError::ProductNotFound)?;
    let product = product_repository::get_by_id(db, &product_id)
        .await?
        .ok_or(AppError::ProductNotFound)?;
    check_stock(&product, quantity)?;

    repository::set_item_quantity(db, &item.id, quantity).await?;
    repository::touch_cart(db, &cart.id).await?;

    load_cart(db, cart).await
}

pub async fn remove_item<C: ConnectionTrait>(db: &C, user_id: &str, item_id: &str) -> Result<Cart, AppError> {
    let item_id = CartItemId::from_string(item_id).map_err(|_| AppError::CartItemNotFound)?;

    let cart = repository::get_or_create_cart(db, user_id).await?;
    if !repository::delete_item(db, &cart.id, &item_id).await? {
        return Err(AppError::CartItemNotFound);
    }
    repository::touch_cart(db, &cart.id).await?;

    load_cart(db, cart).await
}

/// Remove every line; clearing an empty cart is not an error
pub async fn clear<C: ConnectionTrait>(db: &C, user_id: &str) -> Result<Cart, AppError> {
    let cart = repository::get_or_create_cart(db, user_id).await?;
    let removed = repository::delete_all_items(db, &cart.id).await?;
    if removed > 0 {
        repository::touch_cart(db, &cart.id).await?;
    }
    load_cart(db, cart).await
}
