pub mod errors;
pub mod db;
pub mod product;
pub mod store;
pub mod store_product;
