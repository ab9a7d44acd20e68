pub mod decimal;
pub mod factory;
pub mod repository;

pub use factory::{SEEDS_DIR_ENV, SqliteRepositoryFactory, seeds_dir};
pub use repository::{IN_MEMORY, SqliteRepository};
