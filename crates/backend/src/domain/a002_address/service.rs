use contracts::domain::a002_address::aggregate::{Address, AddressDto, AddressId, UpdateAddressDto};
use contracts::domain::common::AggregateId;
use sea_orm::{DatabaseConnection, TransactionTrait};

use super::repository;
use crate::shared::error::AppError;

fn parse_id(id: &str) -> Result<AddressId, AppError> {
    AddressId::from_string(id).map_err(|_| AppError::AddressNotFound)
}

/// Addresses of the user, default first
pub async fn list(db: &DatabaseConnection, user_id: &str) -> Result<Vec<Address>, AppError> {
    Ok(repository::list_for_user(db, user_id).await?)
}

pub async fn get(db: &DatabaseConnection, user_id: &str, id: &str) -> Result<Address, AppError> {
    let id = parse_id(id)?;
    repository::get_for_user(db, user_id, &id)
        .await?
        .ok_or(AppError::AddressNotFound)
}

/// A new default address clears the flag on the others
pub async fn create(db: &DatabaseConnection, user_id: &str, dto: AddressDto) -> Result<Address, AppError> {
    let address = Address::new_for_insert(user_id.to_string(), dto);
    address.validate().map_err(AppError::Validation)?;

    let txn = db.begin().await?;
    if address.is_default {
        repository::unset_defaults(&txn, user_id, None).await?;
    }
    repository::insert(&txn, &address).await?;
    txn.commit().await?;

    Ok(address)
}

/// Partial update; fields left out keep their value
pub async fn update(
    db: &DatabaseConnection,
    user_id: &str,
    id: &str,
    dto: UpdateAddressDto,
) -> Result<Address, AppError> {
    let mut address = get(db, user_id, id).await?;
    address.apply(dto);
    address.validate().map_err(AppError::Validation)?;

    let txn = db.begin().await?;
    if address.is_default {
        repository::unset_defaults(&txn, user_id, Some(&address.id)).await?;
    }
    repository::update(&txn, &address).await?;
    txn.commit().await?;

    Ok(address)
}

/// Hard delete; orders keep their own address snapshot
pub async fn remove(db: &DatabaseConnection, user_id: &str, id: &str) -> Result<(), AppError> {
    let id = parse_id(id)?;
    if repository::delete(db, user_id, &id).await? {
        Ok(())
    } else {
        Err(AppError::AddressNotFound)
    }
}

pub async fn set_default(db: &DatabaseConnection, user_id: &str, id: &str) -> Result<Address, AppError> {
    let id = parse_id(id)?;
    if repository::get_for_user(db, user_id, &id).await?.is_none() {
        return Err(AppError::AddressNotFound);
    }

    let txn = db.begin().await?;
    repository::unset_defaults(&txn, user_id, Some(&id)).await?;
    if !repository::mark_default(&txn, user_id, &id).await? {
        // deleted in the meantime
        txn.rollback().await?;
        return Err(AppError::AddressNotFound);
    }
    txn.commit().await?;

    repository::get_for_user(db, user_id, &id)
        .await?
        .ok_or(AppError::AddressNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_support::{self, address_dto, TestDb};

    async fn default_count(db: &DatabaseConnection, user_id: &str) -> usize {
        list(db, user_id)
            .await
            .unwrap()
            .iter()
            .filter(|a| a.is_default)
            .count()
    }

    #[tokio::test]
    async fn test_create_and_get_scoped_to_owner() {
        let t = TestDb::new().await;
        let ada = test_support::create_user(&t.db, "ada@example.com", false).await;
        let bob = test_support::create_user(&t.db, "bob@example.com", false).await;

        let address = create(&t.db, &ada.id, address_dto("London", false)).await.unwrap();
        let id = address.id.as_string();

        assert_eq!(get(&t.db, &ada.id, &id).await.unwrap().city, "London");
        let err = get(&t.db, &bob.id, &id).await.unwrap_err();
        assert_eq!(err.code(), "ADDRESS_NOT_FOUND");
        let err = get(&t.db, &ada.id, "not-an-id").await.unwrap_err();
        assert_eq!(err.code(), "ADDRESS_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_address() {
        let t = TestDb::new().await;
        let ada = test_support::create_user(&t.db, "ada@example.com", false).await;

        let mut dto = address_dto("London", false);
        dto.country = String::new();
        let err = create(&t.db, &ada.id, dto).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(list(&t.db, &ada.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exactly_one_default_after_any_sequence() {
        let t = TestDb::new().await;
        let ada = test_support::create_user(&t.db, "ada@example.com", false).await;

        let first = create(&t.db, &ada.id, address_dto("London", true)).await.unwrap();
        let second = create(&t.db, &ada.id, address_dto("Bath", true)).await.unwrap();
        assert_eq!(default_count(&t.db, &ada.id).await, 1);

        let third = create(&t.db, &ada.id, address_dto("York", false)).await.unwrap();
        update(
            &t.db,
            &ada.id,
            &third.id.as_string(),
            UpdateAddressDto {
                is_default: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(default_count(&t.db, &ada.id).await, 1);

        set_default(&t.db, &ada.id, &first.id.as_string()).await.unwrap();
        let addresses = list(&t.db, &ada.id).await.unwrap();
        assert_eq!(addresses.iter().filter(|a| a.is_default).count(), 1);
        // default is listed first
        assert_eq!(addresses[0].id, first.id);
        assert!(!get(&t.db, &ada.id, &second.id.as_string()).await.unwrap().is_default);
    }

    #[tokio::test]
    async fn test_default_flags_are_per_user() {
        let t = TestDb::new().await;
        let ada = test_support::create_user(&t.db, "ada@example.com", false).await;
        let bob = test_support::create_user(&t.db, "bob@example.com", false).await;

        create(&t.db, &ada.id, address_dto("London", true)).await.unwrap();
        create(&t.db, &bob.id, address_dto("Leeds", true)).await.unwrap();

        assert_eq!(default_count(&t.db, &ada.id).await, 1);
        assert_eq!(default_count(&t.db, &bob.id).await, 1);
    }

    #[tokio::test]
    async fn test_set_default_on_foreign_address_changes_nothing() {
        let t = TestDb::new().await;
        let ada = test_support::create_user(&t.db, "ada@example.com", false).await;
        let bob = test_support::create_user(&t.db, "bob@example.com", false).await;

        let own = create(&t.db, &ada.id, address_dto("London", true)).await.unwrap();
        let foreign = create(&t.db, &bob.id, address_dto("Leeds", false)).await.unwrap();

        let err = set_default(&t.db, &ada.id, &foreign.id.as_string()).await.unwrap_err();
        assert_eq!(err.code(), "ADDRESS_NOT_FOUND");
        assert!(get(&t.db, &ada.id, &own.id.as_string()).await.unwrap().is_default);
    }

    #[tokio::test]
    async fn test_partial_update_and_remove() {
        let t = TestDb::new().await;
        let ada = test_support::create_user(&t.db, "ada@example.com", false).await;
        let address = create(&t.db, &ada.id, address_dto("London", false)).await.unwrap();
        let id = address.id.as_string();

        let updated = update(
            &t.db,
            &ada.id,
            &id,
            UpdateAddressDto {
                address_line2: Some("Flat 3".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.address_line2.as_deref(), Some("Flat 3"));
        assert_eq!(updated.city, "London");

        remove(&t.db, &ada.id, &id).await.unwrap();
        let err = remove(&t.db, &ada.id, &id).await.unwrap_err();
        assert_eq!(err.code(), "ADDRESS_NOT_FOUND");
    }
}
