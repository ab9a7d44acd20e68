//! Per-order pick and pack estimate.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{Projection, checked_sum};
use crate::calculations::validation::ValidationErrors;
use crate::models::{PackagingType, PickPackRates};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickPackInput {
    pub monthly_order_volume: u32,
    /// Average line items per order; fractional averages are allowed.
    pub items_per_order: Decimal,
    pub packaging_type: PackagingType,
    pub special_handling: bool,
}

impl Default for PickPackInput {
    fn default() -> Self {
        Self {
            monthly_order_volume: 100,
            items_per_order: dec!(1.5),
            packaging_type: PackagingType::PolyMailer,
            special_handling: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickPackResult {
    pub total_items: Decimal,
    pub pick_cost: Decimal,
    pub pack_cost: Decimal,
    pub packaging_cost: Decimal,
    pub special_handling_cost: Decimal,
    pub cost_per_order: Decimal,
    pub projection: Projection,
}

impl PickPackResult {
    pub fn monthly_total(&self) -> Decimal {
        self.projection.monthly
    }
}

#[derive(Debug, Clone)]
pub struct PickPackCalculator<'a> {
    rates: &'a PickPackRates,
}

impl<'a> PickPackCalculator<'a> {
    pub fn new(rates: &'a PickPackRates) -> Self {
        Self { rates }
    }

    pub fn validate(
        &self,
        input: &PickPackInput,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(
            input.monthly_order_volume == 0,
            "monthly_order_volume",
            "Please enter a valid monthly order volume",
        );
        errors.check(
            input.items_per_order <= Decimal::ZERO,
            "items_per_order",
            "Please enter a valid number of items per order",
        );
        errors.into_result()
    }

    pub fn calculate(
        &self,
        input: &PickPackInput,
    ) -> Result<PickPackResult, ValidationErrors> {
        self.validate(input)?;
        let result = self.price(input).ok_or_else(ValidationErrors::too_large)?;

        debug!(
            orders = input.monthly_order_volume,
            packaging = input.packaging_type.as_str(),
            monthly_total = %result.monthly_total(),
            "pick and pack cost calculated"
        );

        Ok(result)
    }

    fn price(
        &self,
        input: &PickPackInput,
    ) -> Option<PickPackResult> {
        let orders = Decimal::from(input.monthly_order_volume);
        let per_order = |fee: Decimal| orders.checked_mul(fee);

        let total_items = orders.checked_mul(input.items_per_order)?;
        let pick_cost = total_items.checked_mul(self.rates.pick_fee_per_item)?;
        let pack_cost = per_order(self.rates.pack_fee_per_order)?;
        let packaging_cost = per_order(self.rates.packaging_cost(input.packaging_type))?;
        let special_handling_cost = if input.special_handling {
            per_order(self.rates.special_handling_fee)?
        } else {
            Decimal::ZERO
        };

        let monthly_total =
            checked_sum([pick_cost, pack_cost, packaging_cost, special_handling_cost])?;

        Some(PickPackResult {
            total_items,
            pick_cost,
            pack_cost,
            packaging_cost,
            special_handling_cost,
            cost_per_order: monthly_total.checked_div(orders)?,
            projection: Projection::from_monthly(monthly_total)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::calculations::validation::{GENERAL_FIELD, TOO_LARGE_MESSAGE};

    fn calculate(input: &PickPackInput) -> Result<PickPackResult, ValidationErrors> {
        PickPackCalculator::new(&PickPackRates::default()).calculate(input)
    }

    #[test]
    fn zero_orders_and_items_are_rejected() {
        let input = PickPackInput {
            monthly_order_volume: 0,
            items_per_order: dec!(0),
            ..PickPackInput::default()
        };

        let errors = calculate(&input).unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.message_for("items_per_order"),
            Some("Please enter a valid number of items per order")
        );
    }

    #[test]
    fn defaults_price_a_hundred_poly_mailer_orders() {
        let result = calculate(&PickPackInput::default()).unwrap();

        assert_eq!(result.total_items, dec!(150));
        assert_eq!(result.pick_cost, dec!(112.50));
        assert_eq!(result.pack_cost, dec!(150.00));
        assert_eq!(result.packaging_cost, dec!(25.00));
        assert_eq!(result.special_handling_cost, dec!(0));
        assert_eq!(result.monthly_total(), dec!(287.50));
        assert_eq!(result.cost_per_order, dec!(2.875));
    }

    #[test]
    fn special_handling_charges_every_order() {
        let input = PickPackInput {
            monthly_order_volume: 40,
            items_per_order: dec!(2),
            packaging_type: PackagingType::LargeBox,
            special_handling: true,
        };

        let result = calculate(&input).unwrap();

        assert_eq!(result.packaging_cost, dec!(80.00));
        assert_eq!(result.special_handling_cost, dec!(80.00));
        assert_eq!(result.monthly_total(), dec!(280.00));
        assert_eq!(result.cost_per_order, dec!(7.00));
        assert_eq!(result.projection.annual, dec!(3360.00));
    }

    #[test]
    fn total_never_decreases_as_volume_grows() {
        let mut previous = Decimal::ZERO;
        for monthly_order_volume in (1..500).step_by(7) {
            let input = PickPackInput {
                monthly_order_volume,
                ..PickPackInput::default()
            };
            let total = calculate(&input).unwrap().monthly_total();
            assert!(total >= previous);
            previous = total;
        }

        let mut previous = Decimal::ZERO;
        for tenths in 1..60 {
            let input = PickPackInput {
                items_per_order: Decimal::new(tenths, 1),
                ..PickPackInput::default()
            };
            let total = calculate(&input).unwrap().monthly_total();
            assert!(total >= previous);
            previous = total;
        }
    }

    #[test]
    fn huge_order_counts_report_an_error_instead_of_overflowing() {
        let input = PickPackInput {
            monthly_order_volume: u32::MAX,
            items_per_order: Decimal::from_i128_with_scale(10_i128.pow(20), 0),
            ..PickPackInput::default()
        };

        let errors = calculate(&input).unwrap_err();

        assert_eq!(errors.message_for(GENERAL_FIELD), Some(TOO_LARGE_MESSAGE));
    }
}
