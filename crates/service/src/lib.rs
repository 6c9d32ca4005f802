//! Service layer providing the store-product operations on top of models.
//! - Separates business rules (validation, existence checks) from data access.
//! - Reuses field validation and entity definitions from the `models` crate.
//! - Maps every persistence failure into [`errors::ServiceError`].

pub mod errors;
#[cfg(test)]
pub mod test_support;
pub mod store_product;
