pub mod inventory;
pub mod repository;
