//! Pricing calculators for 3PL fulfillment services.
//!
//! Every calculator takes its rates by reference, validates its input and
//! returns either a result record or the collected [`ValidationErrors`].

pub mod common;
pub mod custom_requirements;
pub mod free_shipping;
pub mod pick_pack;
pub mod receiving;
pub mod standard_fulfillment;
pub mod storage;
pub mod validation;

pub use common::Projection;
pub use custom_requirements::CustomRequirementsForm;
pub use free_shipping::{
    ConversionImpact, FreeShippingCalculator, FreeShippingInput, FreeShippingResult, Product,
    ProductBreakdown,
};
pub use pick_pack::{PickPackCalculator, PickPackInput, PickPackResult};
pub use receiving::{ReceivingCalculator, ReceivingInput, ReceivingResult};
pub use standard_fulfillment::{
    StandardFulfillmentCalculator, StandardFulfillmentInput, StandardFulfillmentResult,
};
pub use storage::{StorageCalculator, StorageInput, StorageResult};
pub use validation::{FieldError, GENERAL_FIELD, TOO_LARGE_MESSAGE, ValidationErrors};
