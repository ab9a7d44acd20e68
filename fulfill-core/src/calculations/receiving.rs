//! Inbound receiving cost estimate.
//!
//! Each pallet, carton and loose unit is charged at a flat fee, an optional
//! dock appointment is added, and the subtotal is marked up for expedited or
//! weekend receiving.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use fulfill_core::calculations::{ReceivingCalculator, ReceivingInput};
//! use fulfill_core::ReceivingRates;
//!
//! let rates = ReceivingRates::default();
//! let input = ReceivingInput {
//!     pallets: 2,
//!     ..ReceivingInput::default()
//! };
//!
//! let result = ReceivingCalculator::new(&rates).calculate(&input).unwrap();
//!
//! assert_eq!(result.total_cost, dec!(50.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::checked_sum;
use crate::calculations::validation::{GENERAL_FIELD, ValidationErrors};
use crate::models::{ReceivingRates, ReceivingType};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivingInput {
    pub pallets: u32,
    pub cartons: u32,
    pub units: u32,
    pub appointment_required: bool,
    pub receiving_type: ReceivingType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivingResult {
    pub pallet_cost: Decimal,
    pub carton_cost: Decimal,
    pub unit_cost: Decimal,
    pub appointment_cost: Decimal,
    /// Sum of the handling fees and appointment, before any surcharge.
    pub subtotal: Decimal,
    pub surcharge_amount: Decimal,
    pub total_cost: Decimal,
}

#[derive(Debug, Clone)]
pub struct ReceivingCalculator<'a> {
    rates: &'a ReceivingRates,
}

impl<'a> ReceivingCalculator<'a> {
    pub fn new(rates: &'a ReceivingRates) -> Self {
        Self { rates }
    }

    /// Checks that something is actually being received.
    pub fn validate(
        &self,
        input: &ReceivingInput,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(
            input.pallets == 0 && input.cartons == 0 && input.units == 0,
            GENERAL_FIELD,
            "Please enter at least one value for pallets, cartons, or units",
        );
        errors.into_result()
    }

    /// # Errors
    ///
    /// Returns [`ValidationErrors`] when pallets, cartons and units are all zero,
    /// or when the costs are too large to represent.
    pub fn calculate(
        &self,
        input: &ReceivingInput,
    ) -> Result<ReceivingResult, ValidationErrors> {
        self.validate(input)?;
        let result = self.price(input).ok_or_else(ValidationErrors::too_large)?;

        debug!(
            pallets = input.pallets,
            cartons = input.cartons,
            units = input.units,
            receiving_type = input.receiving_type.as_str(),
            total_cost = %result.total_cost,
            "receiving cost calculated"
        );

        Ok(result)
    }

    fn price(
        &self,
        input: &ReceivingInput,
    ) -> Option<ReceivingResult> {
        let pallet_cost = Decimal::from(input.pallets).checked_mul(self.rates.pallet_fee)?;
        let carton_cost = Decimal::from(input.cartons).checked_mul(self.rates.carton_fee)?;
        let unit_cost = Decimal::from(input.units).checked_mul(self.rates.unit_fee)?;
        let appointment_cost = self.appointment_cost(input.appointment_required);

        let subtotal = checked_sum([pallet_cost, carton_cost, unit_cost, appointment_cost])?;
        let surcharge_amount = subtotal.checked_mul(self.rates.surcharge(input.receiving_type))?;
        let total_cost = subtotal.checked_add(surcharge_amount)?;

        Some(ReceivingResult {
            pallet_cost,
            carton_cost,
            unit_cost,
            appointment_cost,
            subtotal,
            surcharge_amount,
            total_cost,
        })
    }

    fn appointment_cost(
        &self,
        required: bool,
    ) -> Decimal {
        if required {
            self.rates.appointment_fee
        } else {
            Decimal::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::validation::TOO_LARGE_MESSAGE;

    fn calculate(input: &ReceivingInput) -> Result<ReceivingResult, ValidationErrors> {
        ReceivingCalculator::new(&ReceivingRates::default()).calculate(input)
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn empty_shipment_is_rejected() {
        let errors = calculate(&ReceivingInput::default()).unwrap_err();

        assert_eq!(
            errors.message_for(GENERAL_FIELD),
            Some("Please enter at least one value for pallets, cartons, or units")
        );
    }

    #[test]
    fn appointment_alone_is_not_a_shipment() {
        let input = ReceivingInput {
            appointment_required: true,
            ..ReceivingInput::default()
        };

        assert!(calculate(&input).is_err());
    }

    // =========================================================================
    // Costs
    // =========================================================================

    #[test]
    fn two_standard_pallets_cost_fifty() {
        let input = ReceivingInput {
            pallets: 2,
            ..ReceivingInput::default()
        };

        let result = calculate(&input).unwrap();

        assert_eq!(result.pallet_cost, dec!(50.00));
        assert_eq!(result.surcharge_amount, dec!(0));
        assert_eq!(result.total_cost, dec!(50.00));
    }

    #[test]
    fn mixed_shipment_sums_each_fee() {
        let input = ReceivingInput {
            pallets: 1,
            cartons: 10,
            units: 25,
            appointment_required: true,
            receiving_type: ReceivingType::Standard,
        };

        let result = calculate(&input).unwrap();

        assert_eq!(result.pallet_cost, dec!(25.00));
        assert_eq!(result.carton_cost, dec!(30.00));
        assert_eq!(result.unit_cost, dec!(12.50));
        assert_eq!(result.appointment_cost, dec!(50.00));
        assert_eq!(result.subtotal, dec!(117.50));
        assert_eq!(result.total_cost, dec!(117.50));
    }

    #[test]
    fn expedited_adds_half_the_subtotal() {
        let input = ReceivingInput {
            cartons: 10,
            receiving_type: ReceivingType::Expedited,
            ..ReceivingInput::default()
        };

        let result = calculate(&input).unwrap();

        assert_eq!(result.surcharge_amount, dec!(15.00));
        assert_eq!(result.total_cost, dec!(45.00));
    }

    #[test]
    fn weekend_doubles_the_subtotal_including_appointment() {
        let input = ReceivingInput {
            pallets: 1,
            appointment_required: true,
            receiving_type: ReceivingType::Weekend,
            ..ReceivingInput::default()
        };

        let result = calculate(&input).unwrap();

        assert_eq!(result.surcharge_amount, dec!(75.00));
        assert_eq!(result.total_cost, dec!(150.00));
    }

    #[test]
    fn total_never_decreases_as_volume_grows() {
        let mut previous = Decimal::ZERO;
        for pallets in 1..20 {
            let input = ReceivingInput {
                pallets,
                cartons: pallets * 2,
                ..ReceivingInput::default()
            };
            let total = calculate(&input).unwrap().total_cost;
            assert!(total >= previous);
            previous = total;
        }
    }

    #[test]
    fn oversized_rates_report_an_error_instead_of_overflowing() {
        let rates = ReceivingRates {
            pallet_fee: Decimal::MAX,
            ..ReceivingRates::default()
        };
        let input = ReceivingInput {
            pallets: 2,
            ..ReceivingInput::default()
        };

        let errors = ReceivingCalculator::new(&rates).calculate(&input).unwrap_err();

        assert_eq!(errors.message_for(GENERAL_FIELD), Some(TOO_LARGE_MESSAGE));
    }
}
