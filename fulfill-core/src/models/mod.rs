mod calculator_state;
mod quote_request;
mod rate_card;
mod service_types;

pub use calculator_state::{CustomRequirementsState, StandardFulfillmentState};
pub use quote_request::{NewQuoteRequest, QuoteRequest};
pub use rate_card::{
    DEFAULT_RATE_CARD, PickPackRates, RATE_KEYS, RateCard, RateCardError, ReceivingRates,
    StandardFulfillmentRates, StorageRates,
};
pub use service_types::{PackagingType, ReceivingType, StorageType};
