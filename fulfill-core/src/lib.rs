pub mod calculations;
pub mod db;
pub mod models;

pub use db::repository::{FulfillmentRepository, RepositoryError};
pub use models::*;
