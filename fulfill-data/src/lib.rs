pub mod loader;

pub use loader::{RateCardLoader, RateCardLoaderError, RateCardRecord};
