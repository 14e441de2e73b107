pub mod a001_product;
pub mod a002_address;
pub mod a003_cart;
pub mod a004_order;
