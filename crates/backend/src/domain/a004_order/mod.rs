pub mod checkout;
pub mod repository;
pub mod service;
