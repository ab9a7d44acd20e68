use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::ValidationErrors;
use crate::models::{PackagingType, ReceivingType, StorageType};

/// Name of the card installed by the seed data and used when none is configured.
pub const DEFAULT_RATE_CARD: &str = "standard";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateCardError {
    #[error("unknown rate '{0}'")]
    UnknownRate(String),

    #[error("rate '{rate}' must be a whole number of at least 1, got {amount}")]
    NotACount { rate: String, amount: Decimal },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivingRates {
    pub pallet_fee: Decimal,
    pub carton_fee: Decimal,
    pub unit_fee: Decimal,
    pub appointment_fee: Decimal,
    /// Fraction of the subtotal added for expedited receiving (0.50 = 50 %).
    pub expedited_surcharge: Decimal,
    /// Fraction of the subtotal added for weekend receiving.
    pub weekend_surcharge: Decimal,
}

impl ReceivingRates {
    pub fn surcharge(
        &self,
        receiving_type: ReceivingType,
    ) -> Decimal {
        match receiving_type {
            ReceivingType::Standard => Decimal::ZERO,
            ReceivingType::Expedited => self.expedited_surcharge,
            ReceivingType::Weekend => self.weekend_surcharge,
        }
    }
}

impl Default for ReceivingRates {
    fn default() -> Self {
        Self {
            pallet_fee: dec!(25.00),
            carton_fee: dec!(3.00),
            unit_fee: dec!(0.50),
            appointment_fee: dec!(50.00),
            expedited_surcharge: dec!(0.50),
            weekend_surcharge: dec!(1.00),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageRates {
    pub standard_pallet_rate: Decimal,
    pub climate_controlled_rate: Decimal,
    pub hazmat_rate: Decimal,
    pub sku_management_fee: Decimal,
    pub long_term_surcharge: Decimal,
    /// Storage durations of at least this many months pay the long-term surcharge.
    pub long_term_min_months: u32,
}

impl StorageRates {
    pub fn pallet_rate(
        &self,
        storage_type: StorageType,
    ) -> Decimal {
        match storage_type {
            StorageType::Standard => self.standard_pallet_rate,
            StorageType::ClimateControlled => self.climate_controlled_rate,
            StorageType::Hazmat => self.hazmat_rate,
        }
    }
}

impl Default for StorageRates {
    fn default() -> Self {
        Self {
            standard_pallet_rate: dec!(15.00),
            climate_controlled_rate: dec!(25.00),
            hazmat_rate: dec!(40.00),
            sku_management_fee: dec!(2.00),
            long_term_surcharge: dec!(0.25),
            long_term_min_months: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickPackRates {
    pub pick_fee_per_item: Decimal,
    pub pack_fee_per_order: Decimal,
    pub poly_mailer_cost: Decimal,
    pub small_box_cost: Decimal,
    pub medium_box_cost: Decimal,
    pub large_box_cost: Decimal,
    pub special_handling_fee: Decimal,
}

impl PickPackRates {
    pub fn packaging_cost(
        &self,
        packaging_type: PackagingType,
    ) -> Decimal {
        match packaging_type {
            PackagingType::PolyMailer => self.poly_mailer_cost,
            PackagingType::SmallBox => self.small_box_cost,
            PackagingType::MediumBox => self.medium_box_cost,
            PackagingType::LargeBox => self.large_box_cost,
        }
    }
}

impl Default for PickPackRates {
    fn default() -> Self {
        Self {
            pick_fee_per_item: dec!(0.75),
            pack_fee_per_order: dec!(1.50),
            poly_mailer_cost: dec!(0.25),
            small_box_cost: dec!(0.75),
            medium_box_cost: dec!(1.25),
            large_box_cost: dec!(2.00),
            special_handling_fee: dec!(2.00),
        }
    }
}

/// Per-unit rates behind the all-in-one standard fulfillment estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardFulfillmentRates {
    pub receiving_hourly_rate: Decimal,
    /// Cubic feet of inbound inventory received per labor hour.
    pub cubic_feet_per_hour: Decimal,
    pub storage_rate_per_cubic_foot: Decimal,
    pub pick_pack_rate_per_order: Decimal,
    pub base_shipping_rate: Decimal,
    pub shipping_rate_per_pound: Decimal,
}

impl Default for StandardFulfillmentRates {
    fn default() -> Self {
        Self {
            receiving_hourly_rate: dec!(35.00),
            cubic_feet_per_hour: dec!(50),
            storage_rate_per_cubic_foot: dec!(1.50),
            pick_pack_rate_per_order: dec!(3.00),
            base_shipping_rate: dec!(8.00),
            shipping_rate_per_pound: dec!(0.50),
        }
    }
}

/// Every price used by the calculators, grouped under a name.
///
/// `RateCard::default()` carries the published prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateCard {
    pub name: String,
    pub receiving: ReceivingRates,
    pub storage: StorageRates,
    pub pick_pack: PickPackRates,
    pub standard: StandardFulfillmentRates,
}

impl Default for RateCard {
    fn default() -> Self {
        Self::named(DEFAULT_RATE_CARD)
    }
}

/// Keys accepted by [`RateCard::set_rate`], in display order.
pub const RATE_KEYS: [&str; 25] = [
    "receiving.pallet_fee",
    "receiving.carton_fee",
    "receiving.unit_fee",
    "receiving.appointment_fee",
    "receiving.expedited_surcharge",
    "receiving.weekend_surcharge",
    "storage.standard_pallet_rate",
    "storage.climate_controlled_rate",
    "storage.hazmat_rate",
    "storage.sku_management_fee",
    "storage.long_term_surcharge",
    "storage.long_term_min_months",
    "pick_pack.pick_fee_per_item",
    "pick_pack.pack_fee_per_order",
    "pick_pack.poly_mailer_cost",
    "pick_pack.small_box_cost",
    "pick_pack.medium_box_cost",
    "pick_pack.large_box_cost",
    "pick_pack.special_handling_fee",
    "standard.receiving_hourly_rate",
    "standard.cubic_feet_per_hour",
    "standard.storage_rate_per_cubic_foot",
    "standard.pick_pack_rate_per_order",
    "standard.base_shipping_rate",
    "standard.shipping_rate_per_pound",
];

impl RateCard {
    /// A card with the published prices under a different name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            receiving: ReceivingRates::default(),
            storage: StorageRates::default(),
            pick_pack: PickPackRates::default(),
            standard: StandardFulfillmentRates::default(),
        }
    }

    /// Looks up a rate by its dotted key.
    pub fn rate(
        &self,
        key: &str,
    ) -> Option<Decimal> {
        let value = match key {
            "receiving.pallet_fee" => self.receiving.pallet_fee,
            "receiving.carton_fee" => self.receiving.carton_fee,
            "receiving.unit_fee" => self.receiving.unit_fee,
            "receiving.appointment_fee" => self.receiving.appointment_fee,
            "receiving.expedited_surcharge" => self.receiving.expedited_surcharge,
            "receiving.weekend_surcharge" => self.receiving.weekend_surcharge,
            "storage.standard_pallet_rate" => self.storage.standard_pallet_rate,
            "storage.climate_controlled_rate" => self.storage.climate_controlled_rate,
            "storage.hazmat_rate" => self.storage.hazmat_rate,
            "storage.sku_management_fee" => self.storage.sku_management_fee,
            "storage.long_term_surcharge" => self.storage.long_term_surcharge,
            "storage.long_term_min_months" => Decimal::from(self.storage.long_term_min_months),
            "pick_pack.pick_fee_per_item" => self.pick_pack.pick_fee_per_item,
            "pick_pack.pack_fee_per_order" => self.pick_pack.pack_fee_per_order,
            "pick_pack.poly_mailer_cost" => self.pick_pack.poly_mailer_cost,
            "pick_pack.small_box_cost" => self.pick_pack.small_box_cost,
            "pick_pack.medium_box_cost" => self.pick_pack.medium_box_cost,
            "pick_pack.large_box_cost" => self.pick_pack.large_box_cost,
            "pick_pack.special_handling_fee" => self.pick_pack.special_handling_fee,
            "standard.receiving_hourly_rate" => self.standard.receiving_hourly_rate,
            "standard.cubic_feet_per_hour" => self.standard.cubic_feet_per_hour,
            "standard.storage_rate_per_cubic_foot" => self.standard.storage_rate_per_cubic_foot,
            "standard.pick_pack_rate_per_order" => self.standard.pick_pack_rate_per_order,
            "standard.base_shipping_rate" => self.standard.base_shipping_rate,
            "standard.shipping_rate_per_pound" => self.standard.shipping_rate_per_pound,
            _ => return None,
        };
        Some(value)
    }

    /// Overwrites a single rate by its dotted key.
    pub fn set_rate(
        &mut self,
        key: &str,
        amount: Decimal,
    ) -> Result<(), RateCardError> {
        let slot = match key {
            "receiving.pallet_fee" => &mut self.receiving.pallet_fee,
            "receiving.carton_fee" => &mut self.receiving.carton_fee,
            "receiving.unit_fee" => &mut self.receiving.unit_fee,
            "receiving.appointment_fee" => &mut self.receiving.appointment_fee,
            "receiving.expedited_surcharge" => &mut self.receiving.expedited_surcharge,
            "receiving.weekend_surcharge" => &mut self.receiving.weekend_surcharge,
            "storage.standard_pallet_rate" => &mut self.storage.standard_pallet_rate,
            "storage.climate_controlled_rate" => &mut self.storage.climate_controlled_rate,
            "storage.hazmat_rate" => &mut self.storage.hazmat_rate,
            "storage.sku_management_fee" => &mut self.storage.sku_management_fee,
            "storage.long_term_surcharge" => &mut self.storage.long_term_surcharge,
            "storage.long_term_min_months" => {
                self.storage.long_term_min_months = amount
                    .to_u32()
                    .filter(|months| *months >= 1 && amount.fract().is_zero())
                    .ok_or_else(|| RateCardError::NotACount {
                        rate: key.to_string(),
                        amount,
                    })?;
                return Ok(());
            }
            "pick_pack.pick_fee_per_item" => &mut self.pick_pack.pick_fee_per_item,
            "pick_pack.pack_fee_per_order" => &mut self.pick_pack.pack_fee_per_order,
            "pick_pack.poly_mailer_cost" => &mut self.pick_pack.poly_mailer_cost,
            "pick_pack.small_box_cost" => &mut self.pick_pack.small_box_cost,
            "pick_pack.medium_box_cost" => &mut self.pick_pack.medium_box_cost,
            "pick_pack.large_box_cost" => &mut self.pick_pack.large_box_cost,
            "pick_pack.special_handling_fee" => &mut self.pick_pack.special_handling_fee,
            "standard.receiving_hourly_rate" => &mut self.standard.receiving_hourly_rate,
            "standard.cubic_feet_per_hour" => &mut self.standard.cubic_feet_per_hour,
            "standard.storage_rate_per_cubic_foot" => {
                &mut self.standard.storage_rate_per_cubic_foot
            }
            "standard.pick_pack_rate_per_order" => &mut self.standard.pick_pack_rate_per_order,
            "standard.base_shipping_rate" => &mut self.standard.base_shipping_rate,
            "standard.shipping_rate_per_pound" => &mut self.standard.shipping_rate_per_pound,
            _ => return Err(RateCardError::UnknownRate(key.to_string())),
        };
        *slot = amount;
        Ok(())
    }

    /// Every rate as `(key, amount)` pairs, in [`RATE_KEYS`] order.
    pub fn rates(&self) -> Vec<(&'static str, Decimal)> {
        RATE_KEYS
            .iter()
            .filter_map(|key| self.rate(key).map(|amount| (*key, amount)))
            .collect()
    }

    /// Reports every negative rate and a non-positive receiving throughput.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for (key, amount) in self.rates() {
            errors.check(amount < Decimal::ZERO, key, "Rate must not be negative");
        }
        errors.check(
            self.standard.cubic_feet_per_hour <= Decimal::ZERO,
            "standard.cubic_feet_per_hour",
            "Receiving throughput must be greater than 0",
        );
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn rate_keys_cover_every_rate() {
        let card = RateCard::default();

        assert_eq!(card.rates().len(), RATE_KEYS.len());
        for key in RATE_KEYS {
            assert!(card.rate(key).is_some(), "missing rate {key}");
        }
    }

    #[test]
    fn default_card_is_valid() {
        assert_eq!(RateCard::default().validate(), Ok(()));
        assert_eq!(RateCard::default().name, DEFAULT_RATE_CARD);
    }

    #[test]
    fn set_rate_updates_the_named_field() {
        let mut card = RateCard::default();
        card.set_rate("storage.hazmat_rate", dec!(55)).unwrap();

        assert_eq!(card.storage.pallet_rate(StorageType::Hazmat), dec!(55));
    }

    #[test]
    fn set_rate_rejects_unknown_keys() {
        let mut card = RateCard::default();

        assert_eq!(
            card.set_rate("storage.moon_rate", dec!(1)),
            Err(RateCardError::UnknownRate("storage.moon_rate".to_string()))
        );
    }

    #[test]
    fn long_term_months_must_be_a_whole_count() {
        let mut card = RateCard::default();

        assert!(card.set_rate("storage.long_term_min_months", dec!(4.5)).is_err());
        assert!(card.set_rate("storage.long_term_min_months", dec!(0)).is_err());
        card.set_rate("storage.long_term_min_months", dec!(12)).unwrap();
        assert_eq!(card.storage.long_term_min_months, 12);
    }

    #[test]
    fn validate_reports_negative_rates() {
        let mut card = RateCard::default();
        card.receiving.unit_fee = dec!(-0.10);
        card.standard.cubic_feet_per_hour = Decimal::ZERO;

        let errors = card.validate().unwrap_err();

        assert_eq!(
            errors.message_for("receiving.unit_fee"),
            Some("Rate must not be negative")
        );
        assert_eq!(
            errors.message_for("standard.cubic_feet_per_hour"),
            Some("Receiving throughput must be greater than 0")
        );
    }

    #[test]
    fn surcharge_follows_receiving_type() {
        let rates = ReceivingRates::default();

        assert_eq!(rates.surcharge(ReceivingType::Standard), dec!(0));
        assert_eq!(rates.surcharge(ReceivingType::Expedited), dec!(0.50));
        assert_eq!(rates.surcharge(ReceivingType::Weekend), dec!(1.00));
    }
}
