//! All-in-one monthly fulfillment estimate.
//!
//! Combines receiving labor, cubic-foot storage, per-order pick and pack, and
//! weight-based shipping into one monthly figure. The persisted calculator
//! state stores only the inputs; results always come from this module.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::checked_sum;
use crate::calculations::validation::ValidationErrors;
use crate::models::StandardFulfillmentRates;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardFulfillmentInput {
    /// Cubic feet of inventory received and stored each month.
    pub monthly_inventory_volume: Decimal,
    pub monthly_order_volume: u32,
    /// Average shipped weight in pounds.
    pub average_order_weight: Decimal,
}

impl Default for StandardFulfillmentInput {
    fn default() -> Self {
        Self {
            monthly_inventory_volume: dec!(100),
            monthly_order_volume: 500,
            average_order_weight: dec!(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardFulfillmentResult {
    pub receiving_cost: Decimal,
    pub storage_cost: Decimal,
    pub pick_pack_cost: Decimal,
    pub shipping_cost: Decimal,
    pub total_monthly_cost: Decimal,
    pub monthly_storage_fee: Decimal,
}

#[derive(Debug, Clone)]
pub struct StandardFulfillmentCalculator<'a> {
    rates: &'a StandardFulfillmentRates,
}

impl<'a> StandardFulfillmentCalculator<'a> {
    pub fn new(rates: &'a StandardFulfillmentRates) -> Self {
        Self { rates }
    }

    pub fn validate(
        &self,
        input: &StandardFulfillmentInput,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(
            input.monthly_inventory_volume <= Decimal::ZERO,
            "monthly_inventory_volume",
            "Please enter a valid inventory volume",
        );
        errors.check(
            input.monthly_order_volume == 0,
            "monthly_order_volume",
            "Please enter a valid order volume",
        );
        errors.check(
            input.average_order_weight <= Decimal::ZERO,
            "average_order_weight",
            "Please enter a valid weight",
        );
        errors.into_result()
    }

    pub fn calculate(
        &self,
        input: &StandardFulfillmentInput,
    ) -> Result<StandardFulfillmentResult, ValidationErrors> {
        self.validate(input)?;
        let result = self.price(input).ok_or_else(ValidationErrors::too_large)?;

        debug!(
            volume = %input.monthly_inventory_volume,
            orders = input.monthly_order_volume,
            total_monthly_cost = %result.total_monthly_cost,
            "standard fulfillment cost calculated"
        );

        Ok(result)
    }

    fn price(
        &self,
        input: &StandardFulfillmentInput,
    ) -> Option<StandardFulfillmentResult> {
        let orders = Decimal::from(input.monthly_order_volume);
        let volume = input.monthly_inventory_volume;

        let receiving_cost = self.receiving_cost(volume)?;
        let storage_cost = volume.checked_mul(self.rates.storage_rate_per_cubic_foot)?;
        let pick_pack_cost = orders.checked_mul(self.rates.pick_pack_rate_per_order)?;
        let shipping_per_order = self.shipping_per_order(input.average_order_weight)?;
        let shipping_cost = orders.checked_mul(shipping_per_order)?;
        let total_monthly_cost =
            checked_sum([receiving_cost, storage_cost, pick_pack_cost, shipping_cost])?;

        Some(StandardFulfillmentResult {
            receiving_cost,
            storage_cost,
            pick_pack_cost,
            shipping_cost,
            total_monthly_cost,
            monthly_storage_fee: storage_cost,
        })
    }

    /// Labor hours to receive `volume` cubic feet, billed hourly.
    fn receiving_cost(
        &self,
        volume: Decimal,
    ) -> Option<Decimal> {
        if self.rates.cubic_feet_per_hour <= Decimal::ZERO {
            return Some(Decimal::ZERO);
        }
        volume
            .checked_div(self.rates.cubic_feet_per_hour)?
            .checked_mul(self.rates.receiving_hourly_rate)
    }

    fn shipping_per_order(
        &self,
        weight: Decimal,
    ) -> Option<Decimal> {
        weight
            .checked_mul(self.rates.shipping_rate_per_pound)?
            .checked_add(self.rates.base_shipping_rate)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::calculations::validation::{GENERAL_FIELD, TOO_LARGE_MESSAGE};

    fn calculate(
        input: &StandardFulfillmentInput
    ) -> Result<StandardFulfillmentResult, ValidationErrors> {
        StandardFulfillmentCalculator::new(&StandardFulfillmentRates::default()).calculate(input)
    }

    #[test]
    fn defaults_produce_expected_breakdown() {
        let result = calculate(&StandardFulfillmentInput::default()).unwrap();

        assert_eq!(result.receiving_cost, dec!(70.00));
        assert_eq!(result.storage_cost, dec!(150.00));
        assert_eq!(result.pick_pack_cost, dec!(1500.00));
        assert_eq!(result.shipping_cost, dec!(4500.00));
        assert_eq!(result.total_monthly_cost, dec!(6220.00));
        assert_eq!(result.monthly_storage_fee, result.storage_cost);
    }

    #[test]
    fn partial_receiving_hours_are_prorated() {
        let input = StandardFulfillmentInput {
            monthly_inventory_volume: dec!(25),
            monthly_order_volume: 1,
            average_order_weight: dec!(1),
        };

        let result = calculate(&input).unwrap();

        assert_eq!(result.receiving_cost, dec!(17.50));
        assert_eq!(result.shipping_cost, dec!(8.50));
    }

    #[test]
    fn every_non_positive_input_is_reported() {
        let input = StandardFulfillmentInput {
            monthly_inventory_volume: dec!(0),
            monthly_order_volume: 0,
            average_order_weight: dec!(-1),
        };

        let errors = calculate(&input).unwrap_err();

        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.message_for("average_order_weight"),
            Some("Please enter a valid weight")
        );
    }

    #[test]
    fn heavier_orders_never_cost_less() {
        let light = calculate(&StandardFulfillmentInput::default()).unwrap();
        let heavy = calculate(&StandardFulfillmentInput {
            average_order_weight: dec!(10),
            ..StandardFulfillmentInput::default()
        })
        .unwrap();

        assert!(heavy.total_monthly_cost > light.total_monthly_cost);
    }

    #[test]
    fn total_never_decreases_as_volume_grows() {
        let mut previous = Decimal::ZERO;
        for cubic_feet in (5..400).step_by(13) {
            let input = StandardFulfillmentInput {
                monthly_inventory_volume: Decimal::from(cubic_feet),
                ..StandardFulfillmentInput::default()
            };
            let total = calculate(&input).unwrap().total_monthly_cost;
            assert!(total >= previous);
            previous = total;
        }

        let mut previous = Decimal::ZERO;
        for monthly_order_volume in (1..2000).step_by(37) {
            let input = StandardFulfillmentInput {
                monthly_order_volume,
                ..StandardFulfillmentInput::default()
            };
            let total = calculate(&input).unwrap().total_monthly_cost;
            assert!(total >= previous);
            previous = total;
        }
    }

    #[test]
    fn maximum_inventory_volume_reports_an_error_instead_of_overflowing() {
        let input = StandardFulfillmentInput {
            monthly_inventory_volume: Decimal::MAX,
            ..StandardFulfillmentInput::default()
        };

        let errors = calculate(&input).unwrap_err();

        assert_eq!(errors.message_for(GENERAL_FIELD), Some(TOO_LARGE_MESSAGE));
    }
}
