use chrono::Utc;
use contracts::domain::a002_address::aggregate::{Address, AddressId};
use contracts::domain::common::AggregateId;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "a002_addresses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub recipient_name: String,
    pub phone: Option<String>,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Address {
    fn from(m: Model) -> Self {
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::nil());
        Address {
            id: AddressId(uuid),
            user_id: m.user_id,
            recipient_name: m.recipient_name,
            phone: m.phone,
            address_line1: m.address_line1,
            address_line2: m.address_line2,
            city: m.city,
            state: m.state,
            postal_code: m.postal_code,
            country: m.country,
            is_default: m.is_default,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn to_active(address: &Address) -> ActiveModel {
    ActiveModel {
        id: Set(address.id.as_string()),
        user_id: Set(address.user_id.clone()),
        recipient_name: Set(address.recipient_name.clone()),
        phone: Set(address.phone.clone()),
        address_line1: Set(address.address_line1.clone()),
        address_line2: Set(address.address_line2.clone()),
        city: Set(address.city.clone()),
        state: Set(address.state.clone()),
        postal_code: Set(address.postal_code.clone()),
        country: Set(address.country.clone()),
        is_default: Set(address.is_default),
        created_at: Set(address.created_at),
        updated_at: Set(address.updated_at),
    }
}

/// All addresses of the user, default first, then oldest first
pub async fn list_for_user<C: ConnectionTrait>(db: &C, user_id: &str) -> Result<Vec<Address>, DbErr> {
    let items = Entity::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_desc(Column::IsDefault)
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Address scoped to its owner; someone else's address is `None`
pub async fn get_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    id: &AddressId,
) -> Result<Option<Address>, DbErr> {
    let result = Entity::find_by_id(id.as_string())
        .filter(Column::UserId.eq(user_id))
        .one(db)
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert<C: ConnectionTrait>(db: &C, address: &Address) -> Result<(), DbErr> {
    to_active(address).insert(db).await?;
    Ok(())
}

pub async fn update<C: ConnectionTrait>(db: &C, address: &Address) -> Result<(), DbErr> {
    let mut active = to_active(address);
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(db).await?;
    Ok(())
}

pub async fn delete<C: ConnectionTrait>(db: &C, user_id: &str, id: &AddressId) -> Result<bool, DbErr> {
    let result = Entity::delete_many()
        .filter(Column::Id.eq(id.as_string()))
        .filter(Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Clear the default flag on every address of the user except `keep`
pub async fn unset_defaults<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    keep: Option<&AddressId>,
) -> Result<u64, DbErr> {
    let mut query = Entity::update_many()
        .col_expr(Column::IsDefault, Expr::value(false))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::UserId.eq(user_id))
        .filter(Column::IsDefault.eq(true));
    if let Some(keep) = keep {
        query = query.filter(Column::Id.ne(keep.as_string()));
    }
    let result = query.exec(db).await?;
    Ok(result.rows_affected)
}

pub async fn mark_default<C: ConnectionTrait>(db: &C, user_id: &str, id: &AddressId) -> Result<bool, DbErr> {
    let result = Entity::update_many()
        .col_expr(Column::IsDefault, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.as_string()))
        .filter(Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}
