use std::collections::HashMap;

use contracts::domain::a001_product::aggregate::{Product, ProductId, ProductImage};
use contracts::domain::common::AggregateId;
use contracts::shared::money::{from_minor_units, to_minor_units};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::shared::error::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "a001_products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub slug: String,
    pub price_cents: i64,
    pub stock: i32,
    pub is_active: bool,
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(m: Model) -> Self {
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::nil());
        Product {
            id: ProductId(uuid),
            name: m.name,
            slug: m.slug,
            price: from_minor_units(m.price_cents),
            stock: m.stock,
            is_active: m.is_active,
            deleted_at: m.deleted_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Product images, one row per picture
pub mod image {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "a001_product_images")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub product_id: String,
        pub url: String,
        pub sort_order: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for contracts::domain::a001_product::aggregate::ProductImage {
        fn from(m: Model) -> Self {
            Self {
                id: m.id,
                url: m.url,
                sort_order: m.sort_order,
            }
        }
    }
}

/// Lookup including inactive and soft-deleted products
pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: &ProductId) -> Result<Option<Product>, DbErr> {
    let result = Entity::find_by_id(id.as_string()).one(db).await?;
    Ok(result.map(Into::into))
}

pub async fn get_many<C: ConnectionTrait>(
    db: &C,
    ids: &[ProductId],
) -> Result<HashMap<ProductId, Product>, DbErr> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let keys: Vec<String> = ids.iter().map(|id| id.as_string()).collect();
    let products = Entity::find()
        .filter(Column::Id.is_in(keys))
        .all(db)
        .await?
        .into_iter()
        .map(Product::from)
        .map(|p| (p.id, p))
        .collect();
    Ok(products)
}

/// First image (lowest `sort_order`) of every requested product that has one
pub async fn primary_images<C: ConnectionTrait>(
    db: &C,
    ids: &[ProductId],
) -> Result<HashMap<ProductId, ProductImage>, DbErr> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let keys: Vec<String> = ids.iter().map(|id| id.as_string()).collect();
    let rows = image::Entity::find()
        .filter(image::Column::ProductId.is_in(keys))
        .order_by_asc(image::Column::SortOrder)
        .order_by_asc(image::Column::Id)
        .all(db)
        .await?;

    let mut result = HashMap::new();
    for row in rows {
        let Ok(uuid) = Uuid::parse_str(&row.product_id) else {
            continue;
        };
        result
            .entry(ProductId(uuid))
            .or_insert_with(|| ProductImage::from(row));
    }
    Ok(result)
}

pub async fn insert<C: ConnectionTrait>(db: &C, product: &Product) -> Result<(), AppError> {
    product.validate().map_err(AppError::Validation)?;
    let active = ActiveModel {
        id: Set(product.id.as_string()),
        name: Set(product.name.clone()),
        slug: Set(product.slug.clone()),
        price_cents: Set(to_minor_units(product.price)?),
        stock: Set(product.stock),
        is_active: Set(product.is_active),
        deleted_at: Set(product.deleted_at),
        created_at: Set(product.created_at),
        updated_at: Set(product.updated_at),
    };
    active.insert(db).await?;
    Ok(())
}

pub async fn insert_image<C: ConnectionTrait>(
    db: &C,
    product_id: &ProductId,
    url: &str,
    sort_order: i32,
) -> Result<ProductImage, DbErr> {
    let active = image::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        product_id: Set(product_id.as_string()),
        url: Set(url.to_string()),
        sort_order: Set(sort_order),
    };
    let model = active.insert(db).await?;
    Ok(model.into())
}
