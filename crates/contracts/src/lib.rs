//! Shared storefront contracts: aggregates, DTOs and wire payloads used by the backend
//! and its clients.

pub mod domain;
pub mod shared;
pub mod system;
