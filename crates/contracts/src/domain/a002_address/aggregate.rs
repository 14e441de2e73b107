use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::uuid_id!(
    /// Unique address identifier
    AddressId
);

/// Shipping address owned by a user.
///
/// At most one address per user carries `is_default`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Address {
    pub fn new_for_insert(user_id: String, dto: AddressDto) -> Self {
        let now = Utc::now();
        Self {
            id: AddressId::new_v4(),
            user_id,
            recipient_name: dto.recipient_name,
            phone: dto.phone,
            address_line1: dto.address_line1,
            address_line2: dto.address_line2,
            city: dto.city,
            state: dto.state,
            postal_code: dto.postal_code,
            country: dto.country,
            is_default: dto.is_default,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update; absent fields keep their value
    pub fn apply(&mut self, dto: UpdateAddressDto) {
        if let Some(v) = dto.recipient_name {
            self.recipient_name = v;
        }
        if let Some(v) = dto.phone {
            self.phone = Some(v);
        }
        if let Some(v) = dto.address_line1 {
            self.address_line1 = v;
        }
        if let Some(v) = dto.address_line2 {
            self.address_line2 = Some(v);
        }
        if let Some(v) = dto.city {
            self.city = v;
        }
        if let Some(v) = dto.state {
            self.state = v;
        }
        if let Some(v) = dto.postal_code {
            self.postal_code = v;
        }
        if let Some(v) = dto.country {
            self.country = v;
        }
        if let Some(v) = dto.is_default {
            self.is_default = v;
        }
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), String> {
        required("recipientName", &self.recipient_name, 100)?;
        required("addressLine1", &self.address_line1, 200)?;
        required("city", &self.city, 100)?;
        required("state", &self.state, 100)?;
        required("postalCode", &self.postal_code, 20)?;
        required("country", &self.country, 100)?;
        optional("phone", self.phone.as_deref(), 20)?;
        optional("addressLine2", self.address_line2.as_deref(), 200)?;
        Ok(())
    }

    /// Copy of the postal fields, detached from this row
    pub fn snapshot(&self) -> ShippingAddressSnapshot {
        ShippingAddressSnapshot {
            recipient_name: self.recipient_name.clone(),
            phone: self.phone.clone(),
            address_line1: self.address_line1.clone(),
            address_line2: self.address_line2.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.clone(),
        }
    }
}

fn required(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }
    if value.chars().count() > max {
        return Err(format!("{} must be at most {} characters", field, max));
    }
    Ok(())
}

fn optional(field: &str, value: Option<&str>, max: usize) -> Result<(), String> {
    match value {
        Some(v) if v.chars().count() > max => {
            Err(format!("{} must be at most {} characters", field, max))
        }
        _ => Ok(()),
    }
}

/// Postal fields frozen into an order at checkout time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressSnapshot {
    pub recipient_name: String,
    pub phone: Option<String>,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO for creating an address
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AddressDto {
    pub recipient_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

/// DTO for a partial address update
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAddressDto {
    pub recipient_name: Option<String>,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub is_default: Option<bool>,
}
