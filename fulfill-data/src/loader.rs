use std::collections::BTreeMap;
use std::io::Read;

use fulfill_core::calculations::ValidationErrors;
use fulfill_core::{FulfillmentRepository, RateCard, RateCardError, RepositoryError};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading rate card data.
#[derive(Debug, Error)]
pub enum RateCardLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Rate card '{card}', line {line}: {source}")]
    Rate {
        card: String,
        line: usize,
        source: RateCardError,
    },

    #[error("Rate card '{card}' is invalid: {errors}")]
    InvalidCard {
        card: String,
        errors: ValidationErrors,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for RateCardLoaderError {
    fn from(err: csv::Error) -> Self {
        RateCardLoaderError::CsvParse(err.to_string())
    }
}

/// One `card,rate,amount` line.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RateCardRecord {
    pub card: String,
    pub rate: String,
    pub amount: Decimal,
}

/// Loads rate cards from CSV into any [`FulfillmentRepository`].
///
/// Each line sets one rate, e.g. `standard,receiving.pallet_fee,25.00`.
/// Rates a card does not mention keep their published value.
pub struct RateCardLoader;

impl RateCardLoader {
    /// Parse rate records from a CSV reader with a `card,rate,amount` header.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<RateCardRecord>, RateCardLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: RateCardRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Groups records by card and applies them on top of the published rates.
    ///
    /// Cards come back sorted by name. Every card is validated.
    pub fn build(records: &[RateCardRecord]) -> Result<Vec<RateCard>, RateCardLoaderError> {
        let mut cards: BTreeMap<&str, RateCard> = BTreeMap::new();

        for (index, record) in records.iter().enumerate() {
            let card = cards
                .entry(record.card.as_str())
                .or_insert_with(|| RateCard::named(&record.card));
            card.set_rate(&record.rate, record.amount)
                .map_err(|source| RateCardLoaderError::Rate {
                    card: record.card.clone(),
                    // Header is line 1.
                    line: index + 2,
                    source,
                })?;
        }

        cards
            .into_values()
            .map(|card| match card.validate() {
                Ok(()) => Ok(card),
                Err(errors) => Err(RateCardLoaderError::InvalidCard {
                    card: card.name.clone(),
                    errors,
                }),
            })
            .collect()
    }

    /// Build the cards and save each one, replacing any stored card of the
    /// same name. Loading the same file twice gives the same result.
    ///
    /// Returns the number of cards saved.
    pub async fn load<R: FulfillmentRepository + ?Sized>(
        repo: &R,
        records: &[RateCardRecord],
    ) -> Result<usize, RateCardLoaderError> {
        let cards = Self::build(records)?;

        for card in &cards {
            debug!(card = %card.name, "saving rate card");
            repo.save_rate_card(card).await?;
        }

        info!(cards = cards.len(), records = records.len(), "rate cards loaded");
        Ok(cards.len())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const TEST_CSV: &str = "card,rate,amount
peak, receiving.weekend_surcharge ,1.50
peak,storage.hazmat_rate,48.00
budget,pick_pack.pick_fee_per_item,0.60
";

    #[test]
    fn parse_trims_fields() {
        let records = RateCardLoader::parse(TEST_CSV.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0],
            RateCardRecord {
                card: "peak".to_string(),
                rate: "receiving.weekend_surcharge".to_string(),
                amount: dec!(1.50),
            }
        );
    }

    #[test]
    fn parse_rejects_non_numeric_amount() {
        let csv = "card,rate,amount\npeak,storage.hazmat_rate,lots\n";

        assert!(matches!(
            RateCardLoader::parse(csv.as_bytes()),
            Err(RateCardLoaderError::CsvParse(_))
        ));
    }

    #[test]
    fn build_groups_by_card_in_name_order() {
        let records = RateCardLoader::parse(TEST_CSV.as_bytes()).unwrap();

        let cards = RateCardLoader::build(&records).unwrap();

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].name, "budget");
        assert_eq!(cards[0].pick_pack.pick_fee_per_item, dec!(0.60));
        assert_eq!(cards[1].name, "peak");
        assert_eq!(cards[1].storage.hazmat_rate, dec!(48.00));
        // Untouched rates stay at the published value.
        assert_eq!(cards[1].storage.standard_pallet_rate, dec!(15.00));
    }

    #[test]
    fn build_reports_line_of_unknown_rate() {
        let csv = "card,rate,amount\npeak,storage.hazmat_rate,48\npeak,storage.lunar_rate,1\n";
        let records = RateCardLoader::parse(csv.as_bytes()).unwrap();

        let err = RateCardLoader::build(&records).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Rate card 'peak', line 3: unknown rate 'storage.lunar_rate'"
        );
    }

    #[test]
    fn build_rejects_negative_rates() {
        let csv = "card,rate,amount\npeak,receiving.unit_fee,-1\n";
        let records = RateCardLoader::parse(csv.as_bytes()).unwrap();

        assert!(matches!(
            RateCardLoader::build(&records),
            Err(RateCardLoaderError::InvalidCard { card, .. }) if card == "peak"
        ));
    }
}
