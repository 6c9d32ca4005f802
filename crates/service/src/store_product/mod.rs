//! Store-product module: domain inputs and views, composable query steps,
//! repository seam with a SeaORM implementation, and the application service.

pub mod domain;
pub mod query;
pub mod repository;
pub mod repo;
pub mod service;

pub use service::StoreProductService;
