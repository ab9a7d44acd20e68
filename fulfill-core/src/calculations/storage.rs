//! Monthly pallet storage estimate.
//!
//! Pallet positions are billed by storage environment, each SKU carries a
//! management fee, and long stays pay a surcharge on the combined monthly
//! charge.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::Projection;
use crate::calculations::validation::ValidationErrors;
use crate::models::{StorageRates, StorageType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageInput {
    pub pallet_positions: u32,
    /// Months the inventory stays in the warehouse.
    pub storage_duration: u32,
    pub sku_count: u32,
    pub storage_type: StorageType,
}

impl Default for StorageInput {
    fn default() -> Self {
        Self {
            pallet_positions: 1,
            storage_duration: 1,
            sku_count: 1,
            storage_type: StorageType::Standard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageResult {
    pub monthly_storage_cost: Decimal,
    pub sku_management_cost: Decimal,
    pub long_term_surcharge: Decimal,
    pub monthly_total: Decimal,
    pub total_duration_cost: Decimal,
    pub projection: Projection,
}

#[derive(Debug, Clone)]
pub struct StorageCalculator<'a> {
    rates: &'a StorageRates,
}

impl<'a> StorageCalculator<'a> {
    pub fn new(rates: &'a StorageRates) -> Self {
        Self { rates }
    }

    pub fn validate(
        &self,
        input: &StorageInput,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(
            input.pallet_positions < 1,
            "pallet_positions",
            "Please enter at least 1 pallet position",
        );
        errors.check(
            input.storage_duration < 1,
            "storage_duration",
            "Please enter a valid storage duration",
        );
        errors.check(input.sku_count < 1, "sku_count", "Please enter at least 1 SKU");
        errors.into_result()
    }

    pub fn calculate(
        &self,
        input: &StorageInput,
    ) -> Result<StorageResult, ValidationErrors> {
        self.validate(input)?;
        let result = self.price(input).ok_or_else(ValidationErrors::too_large)?;

        debug!(
            pallet_positions = input.pallet_positions,
            storage_duration = input.storage_duration,
            storage_type = input.storage_type.as_str(),
            monthly_total = %result.monthly_total,
            "storage cost calculated"
        );

        Ok(result)
    }

    fn price(
        &self,
        input: &StorageInput,
    ) -> Option<StorageResult> {
        let monthly_storage_cost = Decimal::from(input.pallet_positions)
            .checked_mul(self.rates.pallet_rate(input.storage_type))?;
        let sku_management_cost =
            Decimal::from(input.sku_count).checked_mul(self.rates.sku_management_fee)?;
        let monthly_base = monthly_storage_cost.checked_add(sku_management_cost)?;
        let long_term_surcharge = self.long_term_surcharge(input.storage_duration, monthly_base)?;

        let monthly_total = monthly_base.checked_add(long_term_surcharge)?;
        let total_duration_cost = monthly_total.checked_mul(Decimal::from(input.storage_duration))?;

        Some(StorageResult {
            monthly_storage_cost,
            sku_management_cost,
            long_term_surcharge,
            monthly_total,
            total_duration_cost,
            projection: Projection::from_monthly(monthly_total)?,
        })
    }

    fn long_term_surcharge(
        &self,
        duration: u32,
        monthly_base: Decimal,
    ) -> Option<Decimal> {
        if duration >= self.rates.long_term_min_months {
            monthly_base.checked_mul(self.rates.long_term_surcharge)
        } else {
            Some(Decimal::ZERO)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::validation::{GENERAL_FIELD, TOO_LARGE_MESSAGE};

    fn calculate(input: &StorageInput) -> Result<StorageResult, ValidationErrors> {
        StorageCalculator::new(&StorageRates::default()).calculate(input)
    }

    #[test]
    fn zero_fields_each_report_their_own_error() {
        let input = StorageInput {
            pallet_positions: 0,
            storage_duration: 0,
            sku_count: 0,
            storage_type: StorageType::Standard,
        };

        let errors = calculate(&input).unwrap_err();

        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.message_for("sku_count"),
            Some("Please enter at least 1 SKU")
        );
    }

    #[test]
    fn defaults_cost_one_standard_month() {
        let result = calculate(&StorageInput::default()).unwrap();

        assert_eq!(result.monthly_storage_cost, dec!(15.00));
        assert_eq!(result.sku_management_cost, dec!(2.00));
        assert_eq!(result.long_term_surcharge, dec!(0));
        assert_eq!(result.total_duration_cost, dec!(17.00));
    }

    #[test]
    fn six_months_triggers_long_term_surcharge() {
        let input = StorageInput {
            storage_duration: 6,
            ..StorageInput::default()
        };

        let result = calculate(&input).unwrap();

        assert_eq!(result.long_term_surcharge, dec!(4.25));
        assert_eq!(result.monthly_total, dec!(21.25));
        assert_eq!(result.total_duration_cost, dec!(127.50));
    }

    #[test]
    fn five_months_has_no_surcharge() {
        let input = StorageInput {
            storage_duration: 5,
            ..StorageInput::default()
        };

        let result = calculate(&input).unwrap();

        assert_eq!(result.long_term_surcharge, dec!(0));
        assert_eq!(result.total_duration_cost, dec!(85.00));
    }

    #[test]
    fn hazmat_pallets_use_hazmat_rate() {
        let input = StorageInput {
            pallet_positions: 10,
            sku_count: 4,
            storage_type: StorageType::Hazmat,
            ..StorageInput::default()
        };

        let result = calculate(&input).unwrap();

        assert_eq!(result.monthly_storage_cost, dec!(400.00));
        assert_eq!(result.monthly_total, dec!(408.00));
        assert_eq!(result.projection.quarterly, dec!(1224.00));
        assert_eq!(result.projection.annual, dec!(4896.00));
    }

    #[test]
    fn climate_controlled_uses_its_own_rate() {
        let input = StorageInput {
            pallet_positions: 2,
            storage_type: StorageType::ClimateControlled,
            ..StorageInput::default()
        };

        assert_eq!(calculate(&input).unwrap().monthly_storage_cost, dec!(50.00));
    }

    #[test]
    fn total_never_decreases_as_volume_grows() {
        let mut previous = Decimal::ZERO;
        for pallet_positions in 1..30 {
            let input = StorageInput {
                pallet_positions,
                ..StorageInput::default()
            };
            let total = calculate(&input).unwrap().monthly_total;
            assert!(total >= previous);
            previous = total;
        }

        let mut previous = Decimal::ZERO;
        for sku_count in 1..30 {
            let input = StorageInput {
                sku_count,
                ..StorageInput::default()
            };
            let total = calculate(&input).unwrap().monthly_total;
            assert!(total >= previous);
            previous = total;
        }
    }

    #[test]
    fn longer_stays_never_cost_less() {
        let mut previous_monthly = Decimal::ZERO;
        let mut previous_total = Decimal::ZERO;
        // Crosses the surcharge step between five and six months.
        for storage_duration in 1..13 {
            let input = StorageInput {
                pallet_positions: 3,
                storage_duration,
                sku_count: 5,
                ..StorageInput::default()
            };
            let result = calculate(&input).unwrap();
            assert!(result.monthly_total >= previous_monthly);
            assert!(result.total_duration_cost >= previous_total);
            previous_monthly = result.monthly_total;
            previous_total = result.total_duration_cost;
        }
    }

    #[test]
    fn oversized_rates_report_an_error_instead_of_overflowing() {
        let rates = StorageRates {
            standard_pallet_rate: Decimal::MAX,
            ..StorageRates::default()
        };
        let input = StorageInput {
            pallet_positions: 3,
            ..StorageInput::default()
        };

        let errors = StorageCalculator::new(&rates).calculate(&input).unwrap_err();

        assert_eq!(errors.message_for(GENERAL_FIELD), Some(TOO_LARGE_MESSAGE));
    }
}
