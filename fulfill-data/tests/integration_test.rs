//! Integration tests for rate card loading using the SQLite backend.

use fulfill_core::{FulfillmentRepository, RateCard};
use fulfill_data::{RateCardLoader, RateCardLoaderError};
use fulfill_db_sqlite::SqliteRepository;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use sqlx::sqlite::SqlitePoolOptions;

const TEST_CSV: &str = include_str!("../test-data/rate_cards.csv");

/// Migrated database with no seed data.
async fn setup_test_db() -> SqliteRepository {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    let repo = SqliteRepository::new_with_pool(pool).await;
    repo.run_migrations()
        .await
        .expect("Failed to run migrations");

    repo
}

#[tokio::test]
async fn test_load_all_cards() {
    let repo = setup_test_db().await;

    let records = RateCardLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");
    let saved = RateCardLoader::load(&repo, &records)
        .await
        .expect("Failed to load rate cards");

    assert_eq!(records.len(), 30);
    assert_eq!(saved, 2);
    assert_eq!(
        repo.list_rate_cards().await.unwrap(),
        vec!["peak-season", "standard"]
    );
}

#[tokio::test]
async fn test_full_card_matches_published_prices() {
    let repo = setup_test_db().await;

    let records = RateCardLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");
    RateCardLoader::load(&repo, &records)
        .await
        .expect("Failed to load rate cards");

    assert_eq!(repo.get_rate_card("standard").await.unwrap(), RateCard::default());
}

#[tokio::test]
async fn test_partial_card_overrides_only_listed_rates() {
    let repo = setup_test_db().await;

    let records = RateCardLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");
    RateCardLoader::load(&repo, &records)
        .await
        .expect("Failed to load rate cards");

    let peak = repo.get_rate_card("peak-season").await.unwrap();
    assert_eq!(peak.receiving.weekend_surcharge, dec!(1.50));
    assert_eq!(peak.storage.standard_pallet_rate, dec!(18.00));
    assert_eq!(peak.storage.long_term_min_months, 4);
    assert_eq!(peak.standard.base_shipping_rate, dec!(9.25));
    assert_eq!(peak.pick_pack, RateCard::default().pick_pack);
}

#[tokio::test]
async fn test_load_is_idempotent() {
    let repo = setup_test_db().await;

    let records = RateCardLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");
    RateCardLoader::load(&repo, &records).await.unwrap();
    let first = repo.get_rate_card("peak-season").await.unwrap();
    RateCardLoader::load(&repo, &records).await.unwrap();

    assert_eq!(repo.get_rate_card("peak-season").await.unwrap(), first);
    assert_eq!(repo.list_rate_cards().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_reload_replaces_earlier_overrides() {
    let repo = setup_test_db().await;

    let first = RateCardLoader::parse("card,rate,amount\npromo,receiving.unit_fee,0.40\n".as_bytes())
        .unwrap();
    RateCardLoader::load(&repo, &first).await.unwrap();
    let second = RateCardLoader::parse("card,rate,amount\npromo,receiving.carton_fee,2.50\n".as_bytes())
        .unwrap();
    RateCardLoader::load(&repo, &second).await.unwrap();

    let promo = repo.get_rate_card("promo").await.unwrap();
    assert_eq!(promo.receiving.carton_fee, dec!(2.50));
    assert_eq!(promo.receiving.unit_fee, dec!(0.50));
}

#[tokio::test]
async fn test_invalid_file_saves_nothing() {
    let repo = setup_test_db().await;

    let records = RateCardLoader::parse(
        "card,rate,amount\ngood,receiving.unit_fee,0.40\nbad,receiving.surprise_fee,1\n".as_bytes(),
    )
    .unwrap();
    let result = RateCardLoader::load(&repo, &records).await;

    assert!(matches!(result, Err(RateCardLoaderError::Rate { .. })));
    assert!(repo.list_rate_cards().await.unwrap().is_empty());
}
